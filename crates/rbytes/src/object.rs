//! Streamable objects and the handle type used for object references.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::{RBuffer, RBytesError, WBuffer};

/// Implemented by values that can encode themselves into a [`WBuffer`].
pub trait Marshaler {
    /// Writes the value and returns the number of bytes produced.
    fn marshal_root(&self, w: &mut WBuffer) -> Result<usize, RBytesError>;
}

/// Implemented by values that can decode themselves from an [`RBuffer`].
pub trait Unmarshaler {
    fn unmarshal_root(&mut self, r: &mut RBuffer<'_>) -> Result<(), RBytesError>;
}

/// A ROOT object that can take part in the polymorphic object protocol.
pub trait Object: Marshaler + Unmarshaler + Any + fmt::Debug {
    /// ROOT class name, e.g. `"TNamed"`.
    fn class(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a streamed object.
///
/// Back-references in a stream resolve to clones of the same handle, and the
/// write side uses the handle address as the object identity.
pub type ObjectRef = Rc<RefCell<dyn Object>>;

/// Wraps a value into an [`ObjectRef`].
pub fn new_ref<T: Object>(obj: T) -> ObjectRef {
    Rc::new(RefCell::new(obj))
}

/// Borrows the concrete value behind a handle, if it has type `T`.
///
/// ```
/// use std::any::Any;
/// use rootio_rbytes::{
///     downcast_ref, new_ref, Marshaler, Object, RBuffer, RBytesError, Unmarshaler, WBuffer,
/// };
///
/// #[derive(Debug, Default)]
/// struct Counter {
///     n: u32,
/// }
///
/// impl Marshaler for Counter {
///     fn marshal_root(&self, w: &mut WBuffer) -> Result<usize, RBytesError> {
///         w.write_u32(self.n);
///         w.check().map(|_| 4)
///     }
/// }
///
/// impl Unmarshaler for Counter {
///     fn unmarshal_root(&mut self, r: &mut RBuffer<'_>) -> Result<(), RBytesError> {
///         self.n = r.read_u32();
///         r.check()
///     }
/// }
///
/// impl Object for Counter {
///     fn class(&self) -> &str {
///         "Counter"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let obj = new_ref(Counter { n: 7 });
/// assert_eq!(downcast_ref::<Counter>(&obj).map(|c| c.n), Some(7));
/// ```
pub fn downcast_ref<T: Object>(obj: &ObjectRef) -> Option<Ref<'_, T>> {
    Ref::filter_map(obj.borrow(), |o| o.as_any().downcast_ref::<T>()).ok()
}

/// Address used as the identity of a handle in write-side reference tables.
pub(crate) fn identity(obj: &ObjectRef) -> usize {
    Rc::as_ptr(obj) as *const () as usize
}
