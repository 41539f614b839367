use std::any::Any;

use rootio_rbytes::constants::{IS_ON_HEAP, IS_REFERENCED};
use rootio_rbytes::{Marshaler, Object, RBuffer, RBytesError, Unmarshaler, WBuffer};

/// Bit set on every live object.
pub const NOT_DELETED: u32 = 0x0200_0000;

/// `TObject`: unique ID and status bits shared by all ROOT objects.
///
/// The header is written with a bare version (no byte count). When the
/// referenced bit is set, a process-ID slot follows the bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseObject {
    pub id: u32,
    pub bits: u32,
    pub pid: u16,
}

impl BaseObject {
    pub const VERSION: i16 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_referenced(&self) -> bool {
        self.bits & IS_REFERENCED != 0
    }
}

impl Default for BaseObject {
    fn default() -> Self {
        Self {
            id: 0,
            bits: NOT_DELETED | IS_ON_HEAP,
            pid: 0,
        }
    }
}

impl Marshaler for BaseObject {
    fn marshal_root(&self, w: &mut WBuffer) -> Result<usize, RBytesError> {
        w.check()?;
        let pos = w.position();
        w.write_i16(Self::VERSION);
        w.write_u32(self.id);
        w.write_u32(self.bits);
        if self.is_referenced() {
            w.write_u16(self.pid);
        }
        w.check()?;
        Ok((w.position() - pos) as usize)
    }
}

impl Unmarshaler for BaseObject {
    fn unmarshal_root(&mut self, r: &mut RBuffer<'_>) -> Result<(), RBytesError> {
        r.check()?;
        let hdr = r.read_header("TObject", Self::VERSION);
        self.id = r.read_u32();
        self.bits = r.read_u32() | IS_ON_HEAP;
        self.pid = if self.is_referenced() { r.read_u16() } else { 0 };
        r.check_header(&hdr);
        r.check()
    }
}

impl Object for BaseObject {
    fn class(&self) -> &str {
        "TObject"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
