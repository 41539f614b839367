//! Polymorphic object references and class-tag compression.
//!
//! Every object reference starts with a 32-bit tag word:
//!
//! | tag                         | meaning                                       |
//! |-----------------------------|-----------------------------------------------|
//! | `0`                         | null                                          |
//! | `1`                         | self reference (not supported)                |
//! | other, bit 31 clear         | back-reference to an object at that position  |
//! | `0xFFFFFFFF`                | new class: NUL-terminated name then payload   |
//! | other, bit 31 set           | back-reference to a class, then payload      |
//!
//! Non-null references are wrapped in a byte count, so the tag is preceded by
//! a `u32` with bit 30 set.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::constants::{BYTE_COUNT_MASK, CLASS_MASK, MAP_OFFSET, MAX_CLASS_NAME_LEN, NEW_CLASS_TAG};
use crate::object::identity;
use crate::wbuffer::WriteRef;
use crate::{FactoryFn, Object, ObjectRef, RBuffer, RBytesError, WBuffer};

/// An entry of the read-side reference table.
#[derive(Clone)]
pub enum RefValue {
    /// A class seen in the stream, with its constructor.
    Class { name: String, factory: FactoryFn },
    /// An object decoded from the stream.
    Object(ObjectRef),
}

impl fmt::Debug for RefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefValue::Class { name, .. } => f.debug_tuple("Class").field(name).finish(),
            RefValue::Object(obj) => match obj.try_borrow() {
                Ok(obj) => f.debug_tuple("Object").field(&obj.class()).finish(),
                Err(_) => f.write_str("Object(<decoding>)"),
            },
        }
    }
}

/// Read-side reference table, keyed by stream position.
pub type ReadRefs = HashMap<i64, RefValue>;

impl RBuffer<'_> {
    /// Reads a polymorphic object reference.
    ///
    /// Returns `None` for a null reference and once the buffer has failed.
    /// Back-references return a clone of the handle decoded earlier.
    pub fn read_object_any(&mut self) -> Option<ObjectRef> {
        if self.err().is_some() {
            return None;
        }

        let beg = self.position();
        let bcnt = self.read_u32();
        let (tag, count, start) = if bcnt & BYTE_COUNT_MASK == 0 || bcnt == NEW_CLASS_TAG {
            (bcnt, 0, None)
        } else {
            let start = self.position();
            let tag = self.read_u32();
            (tag, (bcnt & !BYTE_COUNT_MASK) as i32, Some(start))
        };
        if self.err().is_some() {
            return None;
        }

        if tag & CLASS_MASK == 0 {
            return match tag {
                0 => None,
                1 => {
                    self.set_err(RBytesError::SelfReference);
                    None
                }
                _ => self.lookup_object(i64::from(tag)),
            };
        }

        let (class, factory) = if tag == NEW_CLASS_TAG {
            let class = self.read_c_string(MAX_CLASS_NAME_LEN);
            if self.err().is_some() {
                return None;
            }
            let Some(factory) = self.factory.get(&class) else {
                self.set_err(RBytesError::UnknownClass(class));
                return None;
            };
            let key = match start {
                Some(start) => start + MAP_OFFSET,
                None => self.refs.len() as i64 + 1,
            };
            tracing::trace!(class = %class, key, "rbytes: new class");
            self.refs.insert(
                key,
                RefValue::Class {
                    name: class.clone(),
                    factory: Arc::clone(&factory),
                },
            );
            (class, factory)
        } else {
            let key = i64::from(tag & !CLASS_MASK);
            match self.refs.get(&key) {
                Some(RefValue::Class { name, factory }) => (name.clone(), Arc::clone(factory)),
                Some(RefValue::Object(_)) => {
                    self.set_err(RBytesError::NotAClass(key));
                    return None;
                }
                None => {
                    self.set_err(RBytesError::UnresolvedClass(key));
                    return None;
                }
            }
        };

        let obj = factory();
        // Registered before decoding so that nested references to it resolve.
        let key = match start {
            Some(_) => beg + MAP_OFFSET,
            None => self.refs.len() as i64 + 1,
        };
        self.refs.insert(key, RefValue::Object(Rc::clone(&obj)));

        let res = obj.borrow_mut().unmarshal_root(self);
        if let Err(err) = res {
            self.set_err(err);
            return None;
        }
        if start.is_some() {
            self.check_byte_count(beg, count, beg, &class);
        }
        if self.err().is_some() {
            return None;
        }
        Some(obj)
    }

    fn lookup_object(&mut self, key: i64) -> Option<ObjectRef> {
        match self.refs.get(&key) {
            Some(RefValue::Object(obj)) => {
                tracing::trace!(key, "rbytes: object back-reference");
                Some(Rc::clone(obj))
            }
            Some(RefValue::Class { .. }) => {
                self.set_err(RBytesError::NotAnObject(key));
                None
            }
            None => {
                self.set_err(RBytesError::UnresolvedReference(key));
                None
            }
        }
    }

    /// Decodes a fresh instance of `class` directly, without a tag word.
    pub fn read_object(&mut self, class: &str) -> Option<ObjectRef> {
        if self.err().is_some() {
            return None;
        }
        let Some(factory) = self.factory.get(class) else {
            self.set_err(RBytesError::UnknownClass(class.to_string()));
            return None;
        };
        let obj = factory();
        let res = obj.borrow_mut().unmarshal_root(self);
        if let Err(err) = res {
            self.set_err(err);
            return None;
        }
        Some(obj)
    }
}

impl WBuffer {
    /// Writes a polymorphic object reference; `None` is the null tag.
    ///
    /// An object already written to this buffer, compared by handle, is
    /// written as a back-reference to its first occurrence.
    pub fn write_object_any(&mut self, obj: Option<&ObjectRef>) {
        if self.err().is_some() {
            return;
        }
        let Some(obj) = obj else {
            self.write_u32(0);
            return;
        };

        if let Some(&pos) = self.refs.get(&WriteRef::Object(identity(obj))) {
            tracing::trace!(pos, "rbytes: object back-reference");
            self.write_u32(pos as u32);
            return;
        }

        let pos = self.position();
        self.write_u32(0); // byte count, patched below
        let bcnt = self.write_class(pos, obj);
        if self.err().is_some() {
            return;
        }
        let end = self.position();
        self.set_position(pos);
        self.write_u32(bcnt);
        self.set_position(end);
    }

    /// Writes the class tag of `obj` followed by its payload.
    ///
    /// `beg` is the position of the enclosing byte count. Returns that byte
    /// count with the framing bit set.
    pub fn write_class(&mut self, beg: i64, obj: &ObjectRef) -> u32 {
        if self.err().is_some() {
            return 0;
        }
        let start = self.position();
        let class = obj.borrow().class().to_string();

        match self.refs.get(&WriteRef::Class(class.clone())).copied() {
            Some(tag) => self.write_u32(tag as u32),
            None => {
                if class.len() >= MAX_CLASS_NAME_LEN {
                    self.set_err(RBytesError::object(class, "class name too long"));
                    return 0;
                }
                self.write_u32(NEW_CLASS_TAG);
                self.write_c_string(&class);
                let tag = ((start + MAP_OFFSET) as u32) | CLASS_MASK;
                tracing::trace!(class = %class, tag, "rbytes: new class");
                self.refs.insert(WriteRef::Class(class.clone()), i64::from(tag));
            }
        }

        // Registered before encoding so that nested references to it compress.
        self.refs
            .insert(WriteRef::Object(identity(obj)), beg + MAP_OFFSET);
        self.pin(obj);

        let res = obj.borrow().marshal_root(self);
        if let Err(err) = res {
            self.set_err(err);
            return 0;
        }

        let bcnt = self.position() - start;
        if bcnt >= i64::from(BYTE_COUNT_MASK) {
            self.set_err(RBytesError::ByteCountTooLarge { class, count: bcnt });
            return 0;
        }
        bcnt as u32 | BYTE_COUNT_MASK
    }

    /// Writes the payload of `obj` without a tag word.
    pub fn write_object(&mut self, obj: &dyn Object) -> usize {
        if self.err().is_some() {
            return 0;
        }
        match obj.marshal_root(self) {
            Ok(n) => n,
            Err(err) => {
                self.set_err(err);
                0
            }
        }
    }
}
