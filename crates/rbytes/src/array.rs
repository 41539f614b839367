//! Contiguous arrays and `std::vector<T>` records.
//!
//! A raw array is just its elements back to back; the caller knows the
//! length. A vector record is framed with version 9 and carries an `i32`
//! element count before the elements.

use crate::constants::STREAMER_INFO_VERSION;
use crate::{Header, RBuffer, RBytesError, WBuffer};

impl RBuffer<'_> {
    /// Reads the framing and element count of a vector record.
    ///
    /// `min_size` is the smallest encoded size of one element, used to reject
    /// counts the remaining bytes cannot hold before allocating.
    fn read_vector_header(&mut self, class: &str, min_size: usize) -> Option<(Header, usize)> {
        if self.err().is_some() {
            return None;
        }
        let hdr = self.read_version(class);
        if self.err().is_some() {
            return None;
        }
        if hdr.vers != STREAMER_INFO_VERSION {
            self.set_err(RBytesError::InvalidVersion {
                class: class.to_string(),
                got: hdr.vers,
                want: STREAMER_INFO_VERSION,
            });
            return None;
        }
        let n = self.read_i32();
        if self.err().is_some() {
            return None;
        }
        if n < 0 {
            self.set_err(RBytesError::InvalidCount {
                class: class.to_string(),
                count: n,
            });
            return None;
        }
        let want = n as usize * min_size;
        if want as i64 > self.remaining() {
            self.set_err(RBytesError::Eof {
                pos: self.position(),
                want,
                have: self.remaining(),
            });
            return None;
        }
        Some((hdr, n as usize))
    }

    pub fn read_array_bool(&mut self, dst: &mut [bool]) {
        if dst.is_empty() {
            return;
        }
        let Some(raw) = self.take(dst.len()) else {
            return;
        };
        for (v, &b) in dst.iter_mut().zip(raw) {
            *v = b != 0;
        }
    }

    pub fn read_vector_bool(&mut self, dst: &mut Vec<bool>) {
        let Some((hdr, n)) = self.read_vector_header("vector<bool>", 1) else {
            return;
        };
        dst.resize(n, false);
        self.read_array_bool(dst);
        self.check_header(&hdr);
    }

    pub fn read_array_string(&mut self, dst: &mut [String]) {
        for v in dst.iter_mut() {
            *v = self.read_string();
        }
    }

    pub fn read_vector_string(&mut self, dst: &mut Vec<String>) {
        let Some((hdr, n)) = self.read_vector_header("vector<string>", 1) else {
            return;
        };
        dst.resize(n, String::new());
        self.read_array_string(dst);
        self.check_header(&hdr);
    }
}

impl WBuffer {
    pub fn write_array_bool(&mut self, v: &[bool]) {
        if self.err().is_some() {
            return;
        }
        self.grow(v.len() as isize);
        for &b in v {
            self.put(&[u8::from(b)]);
        }
    }

    pub fn write_vector_bool(&mut self, v: &[bool]) {
        if self.err().is_some() {
            return;
        }
        let hdr = self.write_header("vector<bool>", STREAMER_INFO_VERSION);
        self.write_i32(v.len() as i32);
        self.write_array_bool(v);
        self.set_header(&hdr);
    }

    pub fn write_array_string(&mut self, v: &[String]) {
        for s in v {
            self.write_string(s);
        }
    }

    pub fn write_vector_string(&mut self, v: &[String]) {
        if self.err().is_some() {
            return;
        }
        let hdr = self.write_header("vector<string>", STREAMER_INFO_VERSION);
        self.write_i32(v.len() as i32);
        self.write_array_string(v);
        self.set_header(&hdr);
    }
}

macro_rules! impl_numeric_arrays {
    ($($ty:ty, $size:literal, $class:literal => $read_array:ident, $read_vector:ident, $write_array:ident, $write_vector:ident;)*) => {
        impl RBuffer<'_> {
            $(
                #[doc = concat!("Reads `dst.len()` big-endian `", stringify!($ty), "` values.")]
                pub fn $read_array(&mut self, dst: &mut [$ty]) {
                    if dst.is_empty() {
                        return;
                    }
                    let Some(raw) = self.take(dst.len() * $size) else {
                        return;
                    };
                    for (v, chunk) in dst.iter_mut().zip(raw.chunks_exact($size)) {
                        let mut b = [0u8; $size];
                        b.copy_from_slice(chunk);
                        *v = <$ty>::from_be_bytes(b);
                    }
                }

                #[doc = concat!("Reads a `", $class, "` record, resizing `dst` to its length.")]
                pub fn $read_vector(&mut self, dst: &mut Vec<$ty>) {
                    let Some((hdr, n)) = self.read_vector_header($class, $size) else {
                        return;
                    };
                    dst.resize(n, <$ty>::default());
                    self.$read_array(dst);
                    self.check_header(&hdr);
                }
            )*
        }

        impl WBuffer {
            $(
                #[doc = concat!("Writes the `", stringify!($ty), "` values back to back.")]
                pub fn $write_array(&mut self, v: &[$ty]) {
                    if self.err().is_some() {
                        return;
                    }
                    self.grow((v.len() * $size) as isize);
                    for x in v {
                        self.put(&x.to_be_bytes());
                    }
                }

                #[doc = concat!("Writes a `", $class, "` record.")]
                pub fn $write_vector(&mut self, v: &[$ty]) {
                    if self.err().is_some() {
                        return;
                    }
                    let hdr = self.write_header($class, STREAMER_INFO_VERSION);
                    self.write_i32(v.len() as i32);
                    self.$write_array(v);
                    self.set_header(&hdr);
                }
            )*
        }
    };
}

impl_numeric_arrays! {
    i8, 1, "vector<int8>" => read_array_i8, read_vector_i8, write_array_i8, write_vector_i8;
    i16, 2, "vector<int16>" => read_array_i16, read_vector_i16, write_array_i16, write_vector_i16;
    i32, 4, "vector<int32>" => read_array_i32, read_vector_i32, write_array_i32, write_vector_i32;
    i64, 8, "vector<int64>" => read_array_i64, read_vector_i64, write_array_i64, write_vector_i64;
    u8, 1, "vector<uint8>" => read_array_u8, read_vector_u8, write_array_u8, write_vector_u8;
    u16, 2, "vector<uint16>" => read_array_u16, read_vector_u16, write_array_u16, write_vector_u16;
    u32, 4, "vector<uint32>" => read_array_u32, read_vector_u32, write_array_u32, write_vector_u32;
    u64, 8, "vector<uint64>" => read_array_u64, read_vector_u64, write_array_u64, write_vector_u64;
    f32, 4, "vector<float32>" => read_array_f32, read_vector_f32, write_array_f32, write_vector_f32;
    f64, 8, "vector<float64>" => read_array_f64, read_vector_f64, write_array_f64, write_vector_f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_layout() {
        let mut w = WBuffer::default();
        w.write_vector_i16(&[1, -1]);
        assert_eq!(
            w.bytes(),
            &[0x40, 0x00, 0x00, 0x0a, 0x00, 0x09, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0xff, 0xff]
        );

        let mut r = RBuffer::from_bytes(w.bytes());
        let mut got = vec![7; 5];
        r.read_vector_i16(&mut got);
        assert!(r.err().is_none());
        assert_eq!(got, vec![1, -1]);
    }

    #[test]
    fn test_vector_bad_version() {
        let data = [0x40, 0x00, 0x00, 0x06, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00];
        let mut r = RBuffer::from_bytes(&data);
        let mut got = Vec::<u32>::new();
        r.read_vector_u32(&mut got);
        assert!(matches!(
            r.err(),
            Some(RBytesError::InvalidVersion { got: 8, want: 9, .. })
        ));
    }

    #[test]
    fn test_vector_count_past_end() {
        let data = [0x40, 0x00, 0x00, 0x0a, 0x00, 0x09, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00];
        let mut r = RBuffer::from_bytes(&data);
        let mut got = Vec::<f64>::new();
        r.read_vector_f64(&mut got);
        assert!(matches!(r.err(), Some(RBytesError::Eof { .. })));
        assert!(got.is_empty());
    }

    #[test]
    fn test_bool_and_string_vectors() {
        let bools = vec![true, false, true];
        let strs = vec!["".to_string(), "hello".to_string(), "x".repeat(300)];

        let mut w = WBuffer::default();
        w.write_vector_bool(&bools);
        w.write_vector_string(&strs);

        let mut r = RBuffer::from_bytes(w.bytes());
        let mut got_bools = Vec::new();
        let mut got_strs = Vec::new();
        r.read_vector_bool(&mut got_bools);
        r.read_vector_string(&mut got_strs);
        assert!(r.err().is_none());
        assert_eq!(got_bools, bools);
        assert_eq!(got_strs, strs);
        assert_eq!(r.remaining(), 0);
    }
}
