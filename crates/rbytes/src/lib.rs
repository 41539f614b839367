//! Binary streaming engine for the ROOT on-disk format.
//!
//! This crate provides the paired read and write cursors that decode and
//! encode ROOT `TBuffer` payloads: big-endian primitives, strings, arrays,
//! narrow floats, versioned byte-counted records and polymorphic object
//! references with class-tag compression.
//!
//! # Overview
//!
//! - [`RBuffer`] - Reads from a byte slice, with a sticky error
//! - [`WBuffer`] - Writes to an auto-growing buffer, with a sticky error
//! - [`Header`] - Framing of a versioned, byte-counted record
//! - [`Factory`] - Registry of object constructors keyed by class name
//! - [`StreamerInfoContext`] - Schema lookup used to resolve versions
//!
//! # Example
//!
//! ```
//! use rootio_rbytes::{RBuffer, WBuffer};
//!
//! let mut w = WBuffer::default();
//! let hdr = w.write_header("TPoint", 2);
//! w.write_f64(1.5);
//! w.write_string("origin");
//! w.set_header(&hdr);
//!
//! let mut r = RBuffer::from_bytes(w.bytes());
//! let hdr = r.read_header("TPoint", 2);
//! assert_eq!(hdr.vers, 2);
//! assert_eq!(r.read_f64(), 1.5);
//! assert_eq!(r.read_string(), "origin");
//! r.check_header(&hdr);
//! assert!(r.err().is_none());
//! ```

mod array;
mod error;
mod header;
mod object;
mod rbuffer;
mod refs;
mod rtypes;
mod streamer;
mod wbuffer;

pub mod constants;
pub mod float;

pub use error::RBytesError;
pub use header::Header;
pub use object::{downcast_ref, new_ref, Marshaler, Object, ObjectRef, Unmarshaler};
pub use rbuffer::RBuffer;
pub use refs::{ReadRefs, RefValue};
pub use rtypes::{Factory, FactoryFn};
pub use streamer::{StreamerElement, StreamerInfo, StreamerInfoContext};
pub use wbuffer::WBuffer;
