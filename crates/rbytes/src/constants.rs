//! Wire-level constants shared by the read and write cursors.
//!
//! Both directions share one 32-bit tag space, so these values must agree
//! bit for bit between [`RBuffer`](crate::RBuffer) and
//! [`WBuffer`](crate::WBuffer).

/// Set on the leading word of a record when it carries a byte count.
pub const BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// Byte-count bit as seen from the high half of the leading word.
pub const BYTE_COUNT_VMASK: u16 = 0x4000;

/// Set on a tag word that refers to a previously streamed class.
pub const CLASS_MASK: u32 = 0x8000_0000;

/// Tag announcing the first occurrence of a class in the stream.
pub const NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;

/// Added to stream positions before they are used as reference keys, so a
/// key can never collide with the null tag.
pub const MAP_OFFSET: i64 = 2;

/// `TObject` bit marking an object allocated on the heap.
pub const IS_ON_HEAP: u32 = 0x0100_0000;

/// `TObject` bit marking an object that carries a process-ID slot.
pub const IS_REFERENCED: u32 = 1 << 4;

/// Record version used for `std::string` and `std::vector<T>` payloads.
pub const STREAMER_INFO_VERSION: i16 = 9;

/// Longest class name accepted after a new-class tag.
pub const MAX_CLASS_NAME_LEN: usize = 80;

/// Mantissa width used by Float16 when the schema does not specify one.
pub const DEFAULT_FLOAT16_NBITS: u32 = 12;
