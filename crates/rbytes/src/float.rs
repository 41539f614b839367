//! Narrow floating point encodings (Float16 and Double32).
//!
//! ROOT stores `Float16_t` and `Double32_t` members with fewer bits than their
//! in-memory `f32`/`f64` form. Two on-wire layouts exist:
//!
//! - *scaled*: the value is clamped to `[xmin, xmax]` and stored as the
//!   unsigned integer `0.5 + factor * (x - xmin)`;
//! - *truncated*: an `[u8 exponent][u16 mantissa]` pair keeping the top `nbits`
//!   bits of the IEEE mantissa, with the sign folded into bit `nbits + 1`.
//!
//! Which layout applies is decided per schema element, see [`Encoding`].

use crate::constants::DEFAULT_FLOAT16_NBITS;
use crate::StreamerElement;

/// Encoding selected for a narrow float member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// Linear rescaling into a `u32`.
    Scaled { factor: f64, xmin: f64, xmax: f64 },
    /// Truncated mantissa with the given number of bits.
    Truncated { nbits: u32 },
    /// Plain 4-byte IEEE float (Double32 without a bit width).
    Float,
}

impl Encoding {
    /// Selects the Float16 encoding for an optional schema element.
    pub fn float16(elm: Option<&dyn StreamerElement>) -> Self {
        match elm {
            Some(elm) if elm.factor() != 0.0 => Encoding::Scaled {
                factor: elm.factor(),
                xmin: elm.xmin(),
                xmax: elm.xmax(),
            },
            _ => {
                let nbits = elm.map(|e| e.xmin() as u32).unwrap_or(0);
                Encoding::Truncated {
                    nbits: if nbits == 0 {
                        DEFAULT_FLOAT16_NBITS
                    } else {
                        nbits
                    },
                }
            }
        }
    }

    /// Selects the Double32 encoding for an optional schema element.
    pub fn double32(elm: Option<&dyn StreamerElement>) -> Self {
        match elm {
            Some(elm) if elm.factor() != 0.0 => Encoding::Scaled {
                factor: elm.factor(),
                xmin: elm.xmin(),
                xmax: elm.xmax(),
            },
            Some(elm) if elm.xmin() as u32 != 0 => Encoding::Truncated {
                nbits: elm.xmin() as u32,
            },
            _ => Encoding::Float,
        }
    }
}

/// Packs a value with linear rescaling.
///
/// ```
/// use rootio_rbytes::float::{pack_scaled, unpack_scaled};
///
/// let v = pack_scaled(5.0, 100.0, 0.0, 10.0);
/// assert_eq!(v, 500);
/// assert_eq!(unpack_scaled(v, 100.0, 0.0), 5.0);
///
/// // Out-of-range values are clamped.
/// assert_eq!(pack_scaled(42.0, 100.0, 0.0, 10.0), 1000);
/// assert_eq!(pack_scaled(-1.0, 100.0, 0.0, 10.0), 0);
/// ```
pub fn pack_scaled(x: f64, factor: f64, xmin: f64, xmax: f64) -> u32 {
    let x = if x < xmin {
        xmin
    } else if x > xmax {
        xmax
    } else {
        x
    };
    (0.5 + factor * (x - xmin)) as u32
}

/// Inverse of [`pack_scaled`].
pub fn unpack_scaled(v: u32, factor: f64, xmin: f64) -> f64 {
    f64::from(v) / factor + xmin
}

/// Widest truncated mantissa: the sign lands in bit `nbits + 1` of a `u16`.
pub const MAX_TRUNCATED_NBITS: u32 = 14;

fn clamp_nbits(nbits: u32) -> u32 {
    nbits.clamp(1, MAX_TRUNCATED_NBITS)
}

/// Packs a value into an exponent byte and a truncated mantissa word.
///
/// ```
/// use rootio_rbytes::float::{pack_truncated, unpack_truncated};
///
/// let (exp, man) = pack_truncated(1.5, 12);
/// assert_eq!(exp, 127);
/// assert_eq!(unpack_truncated(exp, man, 12), 1.5);
///
/// let (exp, man) = pack_truncated(-2.0, 12);
/// assert_eq!(unpack_truncated(exp, man, 12), -2.0);
/// ```
pub fn pack_truncated(x: f32, nbits: u32) -> (u8, u16) {
    let nbits = clamp_nbits(nbits);
    let bits = x.to_bits();
    let exp = ((bits << 1) >> 24) as u8;
    let mut man = ((1u32 << (nbits + 1)) - 1) & (bits >> (23 - nbits - 1));
    man += 1;
    man >>= 1;
    if man & (1 << nbits) != 0 {
        man = (1 << nbits) - 1;
    }
    if x < 0.0 {
        man |= 1 << (nbits + 1);
    }
    (exp, man as u16)
}

/// Inverse of [`pack_truncated`], up to the precision kept by `nbits`.
pub fn unpack_truncated(exp: u8, man: u16, nbits: u32) -> f32 {
    let nbits = clamp_nbits(nbits);
    let man = u32::from(man);
    let mut val = u32::from(exp) << 23;
    val |= (man & ((1 << (nbits + 1)) - 1)) << (23 - nbits);
    let f = f32::from_bits(val);
    if (1 << (nbits + 1)) & man != 0 {
        -f
    } else {
        f
    }
}
