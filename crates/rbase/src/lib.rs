//! ROOT base objects.
//!
//! - [`BaseObject`] - `TObject`, the common header of streamable objects
//! - [`Named`] - `TNamed`, an object with a name and a title
//! - [`ObjString`] - `TObjString`, a string wrapped into an object
//!
//! Call [`register_global`] once at startup so that buffers can materialize
//! these classes from new-class tags.
//!
//! # Example
//!
//! ```
//! use rootio_rbase::{register_global, Named};
//! use rootio_rbytes::{downcast_ref, new_ref, RBuffer, WBuffer};
//!
//! register_global();
//!
//! let obj = new_ref(Named::new("h1", "my histogram"));
//! let mut w = WBuffer::default();
//! w.write_object_any(Some(&obj));
//! w.write_object_any(Some(&obj));
//!
//! let mut r = RBuffer::from_bytes(w.bytes());
//! let first = r.read_object_any().unwrap();
//! let again = r.read_object_any().unwrap();
//! assert!(r.err().is_none());
//!
//! let named = downcast_ref::<Named>(&first).unwrap();
//! assert_eq!(named.name(), "h1");
//! assert_eq!(named.title(), "my histogram");
//! assert!(std::rc::Rc::ptr_eq(&first, &again));
//! ```

mod named;
mod object;
mod objstring;
mod register;

pub use named::Named;
pub use object::{BaseObject, NOT_DELETED};
pub use objstring::ObjString;
pub use register::{register, register_global};
