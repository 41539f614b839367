//! Read cursor over an immutable ROOT buffer.

use std::io;
use std::sync::Arc;

use crate::constants::{BYTE_COUNT_VMASK, IS_ON_HEAP, IS_REFERENCED, STREAMER_INFO_VERSION};
use crate::float::{unpack_scaled, unpack_truncated, Encoding};
use crate::{Factory, RBytesError, ReadRefs, StreamerElement, StreamerInfo, StreamerInfoContext};

/// A read-only ROOT buffer for streaming.
///
/// The buffer decodes big-endian primitives, strings, arrays, framed records
/// and object references from a byte slice. The first failure is kept as a
/// sticky error: every later read is a no-op returning the zero value, so a
/// caller can decode a whole object and check [`err`](Self::err) once.
///
/// # Example
///
/// ```
/// use rootio_rbytes::RBuffer;
///
/// let data = [0x00, 0x2a, 0x03, b'a', b'b', b'c'];
/// let mut r = RBuffer::from_bytes(&data);
///
/// assert_eq!(r.read_i16(), 42);
/// assert_eq!(r.read_string(), "abc");
/// assert_eq!(r.position(), 6);
///
/// // Reading past the end sets the sticky error.
/// assert_eq!(r.read_u32(), 0);
/// assert!(r.err().is_some());
/// ```
pub struct RBuffer<'a> {
    data: &'a [u8],
    c: i64,
    offset: u32,
    err: Option<RBytesError>,
    pub(crate) refs: ReadRefs,
    ctx: Option<Arc<dyn StreamerInfoContext>>,
    pub(crate) factory: &'a Factory,
}

impl<'a> RBuffer<'a> {
    /// Creates a buffer over `data`.
    ///
    /// `offset` is the file position of `data[0]`, so that positions reported
    /// by the buffer are file-absolute. A reference table is created when
    /// `refs` is `None`.
    pub fn new(
        data: &'a [u8],
        refs: Option<ReadRefs>,
        offset: u32,
        ctx: Option<Arc<dyn StreamerInfoContext>>,
    ) -> Self {
        Self {
            data,
            c: 0,
            offset,
            err: None,
            refs: refs.unwrap_or_default(),
            ctx,
            factory: Factory::global(),
        }
    }

    /// Creates a buffer with no offset, no schema context and a fresh
    /// reference table.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(data, None, 0, None)
    }

    /// Resolves class names through `factory` instead of the global registry.
    pub fn with_factory(mut self, factory: &'a Factory) -> Self {
        self.factory = factory;
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

    pub(crate) fn context(&self) -> Option<Arc<dyn StreamerInfoContext>> {
        self.ctx.clone()
    }

    /// Current file-absolute position.
    pub fn position(&self) -> i64 {
        self.c + i64::from(self.offset)
    }

    /// Moves the cursor to a file-absolute position. No bounds are checked
    /// until the next read.
    pub fn set_position(&mut self, pos: i64) {
        self.c = pos - i64::from(self.offset);
    }

    /// Number of bytes between the cursor and the end of the slice.
    pub fn remaining(&self) -> i64 {
        self.data.len() as i64 - self.c
    }

    pub fn err(&self) -> Option<&RBytesError> {
        self.err.as_ref()
    }

    /// Records `err` unless an earlier error is already set.
    pub fn set_err(&mut self, err: RBytesError) {
        if self.err.is_some() {
            return;
        }
        tracing::debug!(pos = self.position(), error = %err, "rbytes: read buffer failed");
        self.err = Some(err);
    }

    /// Returns the sticky error, if any, as a `Result`.
    pub fn check(&self) -> Result<(), RBytesError> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn refs(&self) -> &ReadRefs {
        &self.refs
    }

    /// Consumes the buffer and returns its reference table.
    pub fn into_refs(self) -> ReadRefs {
        self.refs
    }

    pub(crate) fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.err.is_some() {
            return None;
        }
        let have = self.remaining();
        if self.c < 0 || n as i64 > have {
            self.set_err(RBytesError::Eof {
                pos: self.position(),
                want: n,
                have: if self.c < 0 { 0 } else { have },
            });
            return None;
        }
        let beg = self.c as usize;
        self.c += n as i64;
        Some(&self.data[beg..beg + n])
    }

    fn take_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut raw = [0u8; N];
        raw.copy_from_slice(self.take(N)?);
        Some(raw)
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) {
        let _ = self.take(n);
    }

    /// Returns the next `n` raw bytes; empty once the buffer has failed.
    pub fn read_bytes(&mut self, n: usize) -> &'a [u8] {
        self.take(n).unwrap_or_default()
    }

    #[inline]
    pub fn read_bool(&mut self) -> bool {
        self.read_u8() != 0
    }

    #[inline]
    pub fn read_i8(&mut self) -> i8 {
        self.take_array().map(i8::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_i16(&mut self) -> i16 {
        self.take_array().map(i16::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_i32(&mut self) -> i32 {
        self.take_array().map(i32::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_i64(&mut self) -> i64 {
        self.take_array().map(i64::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_u8(&mut self) -> u8 {
        self.take_array().map(u8::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_u16(&mut self) -> u16 {
        self.take_array().map(u16::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_u32(&mut self) -> u32 {
        self.take_array().map(u32::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_u64(&mut self) -> u64 {
        self.take_array().map(u64::from_be_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn read_f32(&mut self) -> f32 {
        self.take_array().map(f32::from_be_bytes).unwrap_or(0.0)
    }

    #[inline]
    pub fn read_f64(&mut self) -> f64 {
        self.take_array().map(f64::from_be_bytes).unwrap_or(0.0)
    }

    /// Reads a ROOT string: a length byte (`255` escapes to a `u32` length)
    /// followed by that many bytes.
    ///
    /// Invalid UTF-8 is replaced; use [`read_string_bytes`](Self::read_string_bytes)
    /// to keep the stored bytes.
    pub fn read_string(&mut self) -> String {
        String::from_utf8_lossy(self.read_string_bytes()).into_owned()
    }

    /// Reads the raw bytes of a ROOT string.
    pub fn read_string_bytes(&mut self) -> &'a [u8] {
        if self.err.is_some() {
            return &[];
        }
        let mut n = usize::from(self.read_u8());
        if n == 255 {
            n = self.read_u32() as usize;
        }
        if n == 0 {
            return &[];
        }
        self.read_bytes(n)
    }

    /// Reads a `std::string` record (framed with version 9).
    pub fn read_stl_string(&mut self) -> String {
        if self.err.is_some() {
            return String::new();
        }
        let start = self.position();
        let hdr = self.read_version("string");
        if self.err.is_none() && hdr.vers != STREAMER_INFO_VERSION {
            self.set_err(RBytesError::InvalidVersion {
                class: "string".into(),
                got: hdr.vers,
                want: STREAMER_INFO_VERSION,
            });
        }
        let s = self.read_string();
        self.check_byte_count(hdr.pos, hdr.count, start, "string");
        if self.err.is_some() {
            return String::new();
        }
        s
    }

    /// Reads at most `n` bytes, stopping after the first NUL.
    pub fn read_c_string(&mut self, n: usize) -> String {
        String::from_utf8_lossy(&self.read_c_string_bytes(n)).into_owned()
    }

    /// Raw form of [`read_c_string`](Self::read_c_string), without the NUL.
    pub fn read_c_string_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(n);
        for _ in 0..n {
            let b = self.read_u8();
            if self.err.is_some() {
                return Vec::new();
            }
            if b == 0 {
                break;
            }
            buf.push(b);
        }
        buf
    }

    /// Reads a Float16 value, following the encoding of `elm`.
    pub fn read_f16(&mut self, elm: Option<&dyn StreamerElement>) -> f32 {
        let v = match Encoding::float16(elm) {
            Encoding::Scaled { factor, xmin, .. } => {
                unpack_scaled(self.read_u32(), factor, xmin) as f32
            }
            Encoding::Truncated { nbits } => self.read_truncated(nbits),
            Encoding::Float => self.read_f32(),
        };
        if self.err.is_some() {
            return 0.0;
        }
        v
    }

    /// Reads a Double32 value, following the encoding of `elm`.
    pub fn read_d32(&mut self, elm: Option<&dyn StreamerElement>) -> f64 {
        let v = match Encoding::double32(elm) {
            Encoding::Scaled { factor, xmin, .. } => unpack_scaled(self.read_u32(), factor, xmin),
            Encoding::Truncated { nbits } => f64::from(self.read_truncated(nbits)),
            Encoding::Float => f64::from(self.read_f32()),
        };
        if self.err.is_some() {
            return 0.0;
        }
        v
    }

    fn read_truncated(&mut self, nbits: u32) -> f32 {
        let exp = self.read_u8();
        let man = self.read_u16();
        unpack_truncated(exp, man, nbits)
    }

    pub fn read_array_f16(&mut self, dst: &mut [f32], elm: Option<&dyn StreamerElement>) {
        for v in dst.iter_mut() {
            *v = self.read_f16(elm);
        }
    }

    pub fn read_array_d32(&mut self, dst: &mut [f64], elm: Option<&dyn StreamerElement>) {
        for v in dst.iter_mut() {
            *v = self.read_d32(elm);
        }
    }

    /// Reads an `i32` count followed by that many `i32` values.
    ///
    /// A non-positive count, or one larger than what is left in the buffer,
    /// yields an empty vector without setting an error.
    pub fn read_fixed_size_array_i32(&mut self) -> Vec<i32> {
        if self.err.is_some() {
            return Vec::new();
        }
        let n = self.read_i32();
        if n <= 0 || i64::from(n) * 4 > self.remaining() {
            return Vec::new();
        }
        let mut arr = vec![0; n as usize];
        self.read_array_i32(&mut arr);
        if self.err.is_some() {
            return Vec::new();
        }
        arr
    }

    /// Skips a `TObject` header without decoding it.
    pub fn skip_object(&mut self) {
        if self.err.is_some() {
            return;
        }
        let vers = self.read_u16();
        if vers & BYTE_COUNT_VMASK != 0 {
            self.skip(4);
        }
        let _id = self.read_u32();
        let bits = self.read_u32() | IS_ON_HEAP;
        if bits & IS_REFERENCED != 0 {
            self.skip(2);
        }
    }
}

impl io::Read for RBuffer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check().map_err(io::Error::other)?;
        let n = buf.len().min(self.remaining().max(0) as usize);
        let src = self.read_bytes(n);
        self.check().map_err(io::Error::other)?;
        buf[..n].copy_from_slice(src);
        Ok(n)
    }
}
