//! Streamer info store for the rootio cursors.
//!
//! ROOT files describe the on-disk layout of every class they contain with
//! `TStreamerInfo` records. This crate keeps such descriptions in memory and
//! serves them to [`rootio_rbytes`] buffers through the
//! [`StreamerInfoContext`](rootio_rbytes::StreamerInfoContext) capability,
//! which the buffers use to resolve checksummed class versions and the
//! parameters of narrow float members.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rootio_rbytes::RBuffer;
//! use rootio_rdict::{ElementType, StreamerElement, StreamerInfo, Streamers};
//!
//! let db = Streamers::new();
//! db.add(
//!     StreamerInfo::new("TPoint", 2, 0xcafe_babe)
//!         .with_element(StreamerElement::new("fX", ElementType::Double, "double")),
//! );
//!
//! // A record written with version 0 and the class checksum.
//! let data = [0x40, 0, 0, 6, 0, 0, 0xca, 0xfe, 0xba, 0xbe];
//! let mut r = RBuffer::new(&data, None, 0, Some(Arc::new(db)));
//! let hdr = r.read_version("TPoint");
//! assert_eq!(hdr.vers, 2);
//! ```

mod element;
mod error;
mod info;
mod streamers;

pub use element::{ElementType, StreamerElement, OFFSET_L, OFFSET_P};
pub use error::RDictError;
pub use info::StreamerInfo;
pub use streamers::Streamers;
