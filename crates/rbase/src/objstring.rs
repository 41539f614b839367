use std::any::Any;
use std::fmt;

use rootio_rbytes::{Marshaler, Object, RBuffer, RBytesError, Unmarshaler, WBuffer};

use crate::BaseObject;

/// `TObjString`: a string usable where a ROOT object is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjString {
    pub obj: BaseObject,
    value: String,
}

impl ObjString {
    pub const VERSION: i16 = 1;

    pub fn new(value: impl Into<String>) -> Self {
        Self {
            obj: BaseObject::new(),
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ObjString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Marshaler for ObjString {
    fn marshal_root(&self, w: &mut WBuffer) -> Result<usize, RBytesError> {
        w.check()?;
        let hdr = w.write_header("TObjString", Self::VERSION);
        self.obj.marshal_root(w)?;
        w.write_string(&self.value);
        let n = w.set_header(&hdr);
        w.check()?;
        Ok(n)
    }
}

impl Unmarshaler for ObjString {
    fn unmarshal_root(&mut self, r: &mut RBuffer<'_>) -> Result<(), RBytesError> {
        r.check()?;
        let hdr = r.read_header("TObjString", Self::VERSION);
        self.obj.unmarshal_root(r)?;
        self.value = r.read_string();
        r.check_header(&hdr);
        r.check()
    }
}

impl Object for ObjString {
    fn class(&self) -> &str {
        "TObjString"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let want = ObjString::new("hello");
        let mut w = WBuffer::default();
        assert_eq!(want.marshal_root(&mut w).expect("marshal"), 6 + 10 + 6);

        let mut r = RBuffer::from_bytes(w.bytes());
        let mut got = ObjString::default();
        got.unmarshal_root(&mut r).expect("unmarshal");
        assert_eq!(got, want);
        assert_eq!(got.to_string(), "hello");
    }
}
