//! Growable write cursor producing ROOT buffers.

use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::Arc;

use crate::float::{pack_scaled, pack_truncated, Encoding};
use crate::{ObjectRef, RBytesError, StreamerElement, StreamerInfo, StreamerInfoContext};

/// Allocation granularity once a buffer outgrows one page.
const GROW_PAGE: usize = 4096;

/// Key of the write-side reference table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum WriteRef {
    /// An object, keyed by the address of its handle.
    Object(usize),
    /// A class, keyed by name.
    Class(String),
}

/// A growable ROOT buffer for streaming.
///
/// Mirrors [`RBuffer`](crate::RBuffer): everything written here reads back to
/// the same values. The first failure is sticky and turns later writes into
/// no-ops.
///
/// # Example
///
/// ```
/// use rootio_rbytes::{RBuffer, WBuffer};
///
/// let mut w = WBuffer::default();
/// w.write_i16(42);
/// w.write_string("abc");
/// assert_eq!(w.bytes(), &[0x00, 0x2a, 0x03, b'a', b'b', b'c']);
///
/// let mut r = RBuffer::from_bytes(w.bytes());
/// assert_eq!(r.read_i16(), 42);
/// assert_eq!(r.read_string(), "abc");
/// ```
#[derive(Default)]
pub struct WBuffer {
    p: Vec<u8>,
    c: usize,
    offset: u32,
    err: Option<RBytesError>,
    pub(crate) refs: HashMap<WriteRef, i64>,
    // Keeps referenced handles alive so their addresses stay unique.
    pub(crate) pinned: Vec<ObjectRef>,
    ctx: Option<Arc<dyn StreamerInfoContext>>,
}

impl WBuffer {
    /// Creates a buffer writing over the allocation of `data`, starting at
    /// its first byte. `offset` is the file position of that byte.
    pub fn new(data: Vec<u8>, offset: u32, ctx: Option<Arc<dyn StreamerInfoContext>>) -> Self {
        Self {
            p: data,
            offset,
            ctx,
            ..Self::default()
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self::new(vec![0; n], 0, None)
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_context(mut self, ctx: Arc<dyn StreamerInfoContext>) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Returns the named schema entry. A negative `version` asks for the latest.
    pub fn streamer_info(
        &self,
        name: &str,
        version: i32,
    ) -> Result<Arc<dyn StreamerInfo>, RBytesError> {
        match &self.ctx {
            Some(ctx) => ctx.streamer_info(name, version),
            None => Err(RBytesError::NoStreamers),
        }
    }

    /// Current file-absolute position.
    pub fn position(&self) -> i64 {
        self.c as i64 + i64::from(self.offset)
    }

    /// Moves the cursor to a file-absolute position.
    ///
    /// A position before the start of the buffer sets the sticky error. Moving
    /// past the allocated bytes zero-fills the gap.
    pub fn set_position(&mut self, pos: i64) {
        let c = pos - i64::from(self.offset);
        if c < 0 {
            self.set_err(RBytesError::InvalidPosition(pos));
            return;
        }
        let c = c as usize;
        if c > self.p.len() {
            self.reserve(c - self.c);
        }
        self.c = c;
    }

    /// Number of bytes currently allocated.
    pub fn capacity(&self) -> usize {
        self.p.len()
    }

    pub fn err(&self) -> Option<&RBytesError> {
        self.err.as_ref()
    }

    /// Records `err` unless an earlier error is already set.
    pub fn set_err(&mut self, err: RBytesError) {
        if self.err.is_some() {
            return;
        }
        tracing::debug!(pos = self.position(), error = %err, "rbytes: write buffer failed");
        self.err = Some(err);
    }

    /// Returns the sticky error, if any, as a `Result`.
    pub fn check(&self) -> Result<(), RBytesError> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Bytes written so far, up to the cursor.
    pub fn bytes(&self) -> &[u8] {
        &self.p[..self.c]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.p.truncate(self.c);
        self.p
    }

    /// Ensures at least `n` bytes can be written after the cursor.
    ///
    /// # Panics
    ///
    /// Panics if `n` is negative.
    pub fn grow(&mut self, n: isize) {
        assert!(n >= 0, "rbytes: negative count");
        self.reserve(n as usize);
    }

    fn reserve(&mut self, n: usize) {
        let need = self.c + n;
        if need <= self.p.len() {
            return;
        }
        let mut size = (2 * self.p.len()).max(need);
        if size > GROW_PAGE {
            size = size.div_ceil(GROW_PAGE) * GROW_PAGE;
        }
        self.p.resize(size, 0);
    }

    pub(crate) fn put(&mut self, b: &[u8]) {
        self.reserve(b.len());
        self.p[self.c..self.c + b.len()].copy_from_slice(b);
        self.c += b.len();
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, b: &[u8]) {
        if self.err.is_some() {
            return;
        }
        self.put(b);
    }

    #[inline]
    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    #[inline]
    pub fn write_i8(&mut self, v: i8) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i16(&mut self, v: i16) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    #[inline]
    pub fn write_u16(&mut self, v: u16) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, v: f32) {
        self.write_bytes(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Writes a ROOT string: one length byte, or `255` followed by a `u32`
    /// length for strings of 255 bytes or more.
    pub fn write_string(&mut self, v: &str) {
        self.write_string_bytes(v.as_bytes());
    }

    /// Writes raw bytes with the ROOT string length prefix.
    pub fn write_string_bytes(&mut self, b: &[u8]) {
        if self.err.is_some() {
            return;
        }
        if b.len() < 255 {
            self.reserve(1 + b.len());
            self.put(&[b.len() as u8]);
        } else {
            self.reserve(5 + b.len());
            self.put(&[255]);
            self.put(&(b.len() as u32).to_be_bytes());
        }
        self.put(b);
    }

    /// Writes a `std::string` record (framed with version 9).
    pub fn write_stl_string(&mut self, v: &str) {
        if self.err.is_some() {
            return;
        }
        let hdr = self.write_header("string", crate::constants::STREAMER_INFO_VERSION);
        self.write_string(v);
        self.set_header(&hdr);
    }

    /// Writes `v` up to its first NUL, then a NUL terminator.
    pub fn write_c_string(&mut self, v: &str) {
        self.write_c_string_bytes(v.as_bytes());
    }

    pub fn write_c_string_bytes(&mut self, b: &[u8]) {
        if self.err.is_some() {
            return;
        }
        let b = match b.iter().position(|&c| c == 0) {
            Some(i) => &b[..i],
            None => b,
        };
        self.reserve(b.len() + 1);
        self.put(b);
        self.put(&[0]);
    }

    /// Writes a Float16 value, following the encoding of `elm`.
    pub fn write_f16(&mut self, v: f32, elm: Option<&dyn StreamerElement>) {
        if self.err.is_some() {
            return;
        }
        match Encoding::float16(elm) {
            Encoding::Scaled { factor, xmin, xmax } => {
                self.write_u32(pack_scaled(f64::from(v), factor, xmin, xmax))
            }
            Encoding::Truncated { nbits } => self.write_truncated(v, nbits),
            Encoding::Float => self.write_f32(v),
        }
    }

    /// Writes a Double32 value, following the encoding of `elm`.
    pub fn write_d32(&mut self, v: f64, elm: Option<&dyn StreamerElement>) {
        if self.err.is_some() {
            return;
        }
        match Encoding::double32(elm) {
            Encoding::Scaled { factor, xmin, xmax } => {
                self.write_u32(pack_scaled(v, factor, xmin, xmax))
            }
            Encoding::Truncated { nbits } => self.write_truncated(v as f32, nbits),
            Encoding::Float => self.write_f32(v as f32),
        }
    }

    fn write_truncated(&mut self, v: f32, nbits: u32) {
        let (exp, man) = pack_truncated(v, nbits);
        self.write_u8(exp);
        self.write_u16(man);
    }

    pub fn write_array_f16(&mut self, v: &[f32], elm: Option<&dyn StreamerElement>) {
        for &x in v {
            self.write_f16(x, elm);
        }
    }

    pub fn write_array_d32(&mut self, v: &[f64], elm: Option<&dyn StreamerElement>) {
        for &x in v {
            self.write_d32(x, elm);
        }
    }

    /// Writes an `i32` count followed by the values.
    pub fn write_fixed_size_array_i32(&mut self, v: &[i32]) {
        if self.err.is_some() {
            return;
        }
        self.write_i32(v.len() as i32);
        self.write_array_i32(v);
    }

    pub(crate) fn pin(&mut self, obj: &ObjectRef) {
        self.pinned.push(Rc::clone(obj));
    }
}

impl io::Write for WBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check().map_err(io::Error::other)?;
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check().map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow() {
        let mut w = WBuffer::default();
        w.grow(8);
        assert_eq!(w.capacity(), 8);
        w.grow(8);
        assert_eq!(w.capacity(), 8);

        w.write_u64(1);
        w.write_u8(2);
        assert_eq!(w.capacity(), 16);
        assert_eq!(w.bytes().len(), 9);

        let mut w = WBuffer::default();
        w.grow(5000);
        assert_eq!(w.capacity(), 8192);
        assert!(w.bytes().is_empty());
    }

    #[test]
    #[should_panic(expected = "negative count")]
    fn test_grow_negative_panics() {
        WBuffer::default().grow(-1);
    }

    #[test]
    fn test_write_over_provided_storage() {
        let mut w = WBuffer::new(vec![0xff; 4], 0, None);
        w.write_u16(0x0102);
        assert_eq!(w.bytes(), &[0x01, 0x02]);
        assert_eq!(w.into_bytes(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_offset_positions() {
        let mut w = WBuffer::default().with_offset(100);
        assert_eq!(w.position(), 100);
        w.write_u32(7);
        assert_eq!(w.position(), 104);
        w.set_position(99);
        assert_eq!(w.err(), Some(&RBytesError::InvalidPosition(99)));
        w.write_u8(1);
        assert_eq!(w.position(), 104);
    }

    #[test]
    fn test_seek_past_end_zero_fills() {
        let mut w = WBuffer::default();
        w.write_u32(1);
        w.set_position(100);
        assert!(w.err().is_none());
        assert_eq!(w.bytes().len(), 100);
        assert_eq!(&w.bytes()[..4], &[0, 0, 0, 1]);
        assert!(w.bytes()[4..].iter().all(|&b| b == 0));

        w.write_u8(0xff);
        w.set_position(2);
        w.write_u8(0xaa);
        w.set_position(101);
        let data = w.into_bytes();
        assert_eq!(data.len(), 101);
        assert_eq!(&data[..4], &[0, 0, 0xaa, 1]);
        assert_eq!(data[100], 0xff);
    }

    #[test]
    fn test_io_write() {
        use std::io::Write;

        let mut w = WBuffer::default();
        w.write_all(b"root").expect("write");
        write!(w, "{}", 42).expect("format");
        w.flush().expect("flush");
        assert_eq!(w.bytes(), b"root42");

        w.set_err(RBytesError::NoStreamers);
        assert!(w.write_all(b"x").is_err());
        assert_eq!(w.bytes(), b"root42");
    }

    #[test]
    fn test_write_string_lengths() {
        let mut w = WBuffer::default();
        w.write_string("");
        assert_eq!(w.bytes(), &[0]);

        let mut w = WBuffer::default();
        w.write_string(&"x".repeat(254));
        assert_eq!(w.bytes().len(), 255);
        assert_eq!(w.bytes()[0], 254);

        let mut w = WBuffer::default();
        w.write_string(&"x".repeat(255));
        assert_eq!(w.bytes().len(), 260);
        assert_eq!(&w.bytes()[..5], &[255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_write_c_string_truncates_at_nul() {
        let mut w = WBuffer::default();
        w.write_c_string("ab\0cd");
        assert_eq!(w.bytes(), b"ab\0");
    }

    #[test]
    fn test_sticky_error_blocks_writes() {
        let mut w = WBuffer::default();
        w.set_err(RBytesError::NoStreamers);
        w.set_err(RBytesError::SelfReference);
        w.write_u32(1);
        w.write_string("abc");
        assert!(w.bytes().is_empty());
        assert_eq!(w.check(), Err(RBytesError::NoStreamers));
    }
}
