use std::any::Any;

use rootio_rbytes::{Marshaler, Object, RBuffer, RBytesError, Unmarshaler, WBuffer};

use crate::BaseObject;

/// `TNamed`: the base of most ROOT objects that carry a name and a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Named {
    pub obj: BaseObject,
    name: String,
    title: String,
}

impl Named {
    pub const VERSION: i16 = 1;

    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            obj: BaseObject::new(),
            name: name.into(),
            title: title.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

impl Marshaler for Named {
    fn marshal_root(&self, w: &mut WBuffer) -> Result<usize, RBytesError> {
        w.check()?;
        let hdr = w.write_header("TNamed", Self::VERSION);
        self.obj.marshal_root(w)?;
        w.write_string(&self.name);
        w.write_string(&self.title);
        let n = w.set_header(&hdr);
        w.check()?;
        Ok(n)
    }
}

impl Unmarshaler for Named {
    fn unmarshal_root(&mut self, r: &mut RBuffer<'_>) -> Result<(), RBytesError> {
        r.check()?;
        let hdr = r.read_header("TNamed", Self::VERSION);
        self.obj.unmarshal_root(r)?;
        self.name = r.read_string();
        self.title = r.read_string();
        r.check_header(&hdr);
        r.check()
    }
}

impl Object for Named {
    fn class(&self) -> &str {
        "TNamed"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
