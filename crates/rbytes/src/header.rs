//! Versioned, byte-counted record framing.
//!
//! A framed record starts with a `u32` whose bit 30 is set and whose low 30
//! bits count the bytes that follow it, then an `i16` class version. Older
//! records omit the count and start directly with the version.

use std::cmp::Ordering;

use crate::constants::BYTE_COUNT_MASK;
use crate::{RBuffer, RBytesError, WBuffer};

/// Framing information of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Class name, used for schema lookups and error messages.
    pub name: String,
    /// Position of the record start.
    pub pos: i64,
    /// Bytes after the count word; zero when the record has no count.
    pub count: i32,
    pub vers: i16,
}

impl RBuffer<'_> {
    /// Reads a record header for `class`.
    ///
    /// A non-positive version is resolved through the schema context: when
    /// the latest entry for `class` has a different version, a `u32` checksum
    /// follows and a match substitutes the entry's version.
    pub fn read_version(&mut self, class: &str) -> Header {
        let mut hdr = Header {
            name: class.to_string(),
            ..Header::default()
        };
        if self.err().is_some() {
            return hdr;
        }

        hdr.pos = self.position();
        let bcnt = self.read_u32();
        if bcnt & BYTE_COUNT_MASK != 0 {
            hdr.count = (bcnt & !BYTE_COUNT_MASK) as i32;
            hdr.vers = self.read_u16() as i16;
        } else {
            // No byte count: the version is the first two bytes of the record.
            self.set_position(hdr.pos);
            hdr.vers = self.read_u16() as i16;
        }

        if hdr.vers <= 0 && !class.is_empty() {
            if let Some(ctx) = self.context() {
                if let Ok(si) = ctx.streamer_info(class, -1) {
                    if si.class_version() != i32::from(hdr.vers) {
                        let chksum = self.read_u32();
                        if si.checksum() == chksum {
                            hdr.vers = si.class_version() as i16;
                        }
                    }
                }
            }
        }
        hdr
    }

    /// Checks that the cursor sits exactly at the end of the record that
    /// started at `pos` with byte count `count`. A zero count is not checked.
    pub fn check_byte_count(&mut self, pos: i64, count: i32, start: i64, class: &str) {
        if self.err().is_some() || count <= 0 {
            return;
        }
        let want = pos + i64::from(count) + 4;
        let got = self.position();
        match got.cmp(&want) {
            Ordering::Equal => {}
            Ordering::Greater => self.set_err(RBytesError::TooManyBytes {
                got,
                want,
                pos,
                count,
                start,
                class: class.to_string(),
            }),
            Ordering::Less => self.set_err(RBytesError::TooFewBytes {
                got,
                want,
                pos,
                count,
                start,
                class: class.to_string(),
            }),
        }
    }

    /// Reads a record header and checks its version does not exceed `max_vers`.
    pub fn read_header(&mut self, class: &str, max_vers: i16) -> Header {
        let hdr = self.read_version(class);
        if self.err().is_none() && hdr.vers > max_vers {
            self.set_err(RBytesError::InvalidVersion {
                class: class.to_string(),
                got: hdr.vers,
                want: max_vers,
            });
        }
        hdr
    }

    /// Checks that the record described by `hdr` was fully consumed.
    pub fn check_header(&mut self, hdr: &Header) {
        self.check_byte_count(hdr.pos, hdr.count, hdr.pos, &hdr.name);
    }
}

impl WBuffer {
    /// Writes a byte-count placeholder and `vers`, returning the record start.
    pub fn write_version(&mut self, vers: i16) -> i64 {
        let pos = self.position();
        if self.err().is_some() {
            return pos;
        }
        self.grow(6);
        self.write_u32(0);
        self.write_u16(vers as u16);
        pos
    }

    /// Patches the placeholder written at `start` with the number of bytes
    /// written since, and returns the full record size.
    pub fn set_byte_count(&mut self, start: i64, class: &str) -> usize {
        if self.err().is_some() {
            return 0;
        }
        let cur = self.position();
        let bcnt = cur - start - 4;
        if bcnt < 0 {
            self.set_err(RBytesError::InvalidPosition(start));
            return 0;
        }
        if bcnt >= i64::from(BYTE_COUNT_MASK) {
            self.set_err(RBytesError::ByteCountTooLarge {
                class: class.to_string(),
                count: bcnt,
            });
            return 0;
        }
        self.set_position(start);
        self.write_u32(bcnt as u32 | BYTE_COUNT_MASK);
        self.set_position(cur);
        (bcnt + 4) as usize
    }

    /// Starts a framed record for `class`.
    pub fn write_header(&mut self, class: &str, vers: i16) -> Header {
        Header {
            name: class.to_string(),
            pos: self.write_version(vers),
            count: 0,
            vers,
        }
    }

    /// Closes the record started by [`write_header`](Self::write_header).
    pub fn set_header(&mut self, hdr: &Header) -> usize {
        self.set_byte_count(hdr.pos, &hdr.name)
    }
}
