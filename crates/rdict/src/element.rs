//! Streamer elements: the per-member part of a class layout.

use rootio_rbytes as rbytes;
use serde::{Deserialize, Serialize};

use crate::RDictError;

/// Offset added to a basic type code for a fixed-size array of it.
pub const OFFSET_L: i32 = 20;
/// Offset added to a basic type code for a pointer to an array of it.
pub const OFFSET_P: i32 = 40;

/// ROOT member type codes (`TStreamerInfo::EReadWrite`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Base,
    Char,
    Short,
    Int,
    Long,
    Float,
    Counter,
    CharStar,
    Double,
    Double32,
    LegacyChar,
    UChar,
    UShort,
    UInt,
    ULong,
    Bits,
    Long64,
    ULong64,
    Bool,
    Float16,
    Object,
    Any,
    ObjectPtr,
    ObjectPtrNonNull,
    TString,
    TObject,
    TNamed,
    AnyPtr,
    AnyPtrNonNull,
    AnyPtrNoVt,
    StlPtr,
    Stl,
    StlString,
    Streamer,
    StreamLoop,
}

impl ElementType {
    pub fn code(self) -> i32 {
        match self {
            ElementType::Base => 0,
            ElementType::Char => 1,
            ElementType::Short => 2,
            ElementType::Int => 3,
            ElementType::Long => 4,
            ElementType::Float => 5,
            ElementType::Counter => 6,
            ElementType::CharStar => 7,
            ElementType::Double => 8,
            ElementType::Double32 => 9,
            ElementType::LegacyChar => 10,
            ElementType::UChar => 11,
            ElementType::UShort => 12,
            ElementType::UInt => 13,
            ElementType::ULong => 14,
            ElementType::Bits => 15,
            ElementType::Long64 => 16,
            ElementType::ULong64 => 17,
            ElementType::Bool => 18,
            ElementType::Float16 => 19,
            ElementType::Object => 61,
            ElementType::Any => 62,
            ElementType::ObjectPtr => 63,
            ElementType::ObjectPtrNonNull => 64,
            ElementType::TString => 65,
            ElementType::TObject => 66,
            ElementType::TNamed => 67,
            ElementType::AnyPtr => 68,
            ElementType::AnyPtrNonNull => 69,
            ElementType::AnyPtrNoVt => 70,
            ElementType::StlPtr => 71,
            ElementType::Stl => 300,
            ElementType::StlString => 365,
            ElementType::Streamer => 500,
            ElementType::StreamLoop => 501,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let t = match code {
            0 => ElementType::Base,
            1 => ElementType::Char,
            2 => ElementType::Short,
            3 => ElementType::Int,
            4 => ElementType::Long,
            5 => ElementType::Float,
            6 => ElementType::Counter,
            7 => ElementType::CharStar,
            8 => ElementType::Double,
            9 => ElementType::Double32,
            10 => ElementType::LegacyChar,
            11 => ElementType::UChar,
            12 => ElementType::UShort,
            13 => ElementType::UInt,
            14 => ElementType::ULong,
            15 => ElementType::Bits,
            16 => ElementType::Long64,
            17 => ElementType::ULong64,
            18 => ElementType::Bool,
            19 => ElementType::Float16,
            61 => ElementType::Object,
            62 => ElementType::Any,
            63 => ElementType::ObjectPtr,
            64 => ElementType::ObjectPtrNonNull,
            65 => ElementType::TString,
            66 => ElementType::TObject,
            67 => ElementType::TNamed,
            68 => ElementType::AnyPtr,
            69 => ElementType::AnyPtrNonNull,
            70 => ElementType::AnyPtrNoVt,
            71 => ElementType::StlPtr,
            300 => ElementType::Stl,
            365 => ElementType::StlString,
            500 => ElementType::Streamer,
            501 => ElementType::StreamLoop,
            _ => return None,
        };
        Some(t)
    }
}

impl From<ElementType> for i32 {
    fn from(t: ElementType) -> i32 {
        t.code()
    }
}

impl TryFrom<i32> for ElementType {
    type Error = RDictError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        ElementType::from_code(code).ok_or(RDictError::InvalidType(code))
    }
}

/// Describes one member of a class layout.
///
/// `type_code` is the raw ROOT code, which for arrays of basic types is the
/// basic code plus [`OFFSET_L`] or [`OFFSET_P`]. It is kept and serialized as
/// an integer since those array codes have no [`ElementType`] of their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamerElement {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub type_code: i32,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub size: i32,
    #[serde(default)]
    pub array_len: i32,
    #[serde(default)]
    pub xmin: f64,
    #[serde(default)]
    pub xmax: f64,
    #[serde(default)]
    pub factor: f64,
}

impl StreamerElement {
    pub fn new(name: impl Into<String>, etype: ElementType, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_code: etype.code(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Marks the member as a fixed-size array of `n` values.
    pub fn with_array_len(mut self, n: i32) -> Self {
        if (1..OFFSET_L).contains(&self.type_code) {
            self.type_code += OFFSET_L;
        }
        self.array_len = n;
        self
    }

    /// Sets a `[xmin, xmax, nbits]` range for a narrow float member.
    ///
    /// With a non-empty range the value is stored rescaled on `nbits` bits.
    /// An empty range with fewer than 15 bits selects a truncated mantissa of
    /// `nbits` bits instead.
    pub fn with_range(mut self, xmin: f64, xmax: f64, nbits: u32) -> Self {
        let nbits = if !(2..=32).contains(&nbits) { 32 } else { nbits };
        self.xmin = xmin;
        self.xmax = xmax;
        self.factor = 0.0;
        if xmin < xmax {
            let bigint = if nbits < 32 {
                f64::from(1u32 << nbits)
            } else {
                f64::from(u32::MAX)
            };
            self.factor = bigint / (xmax - xmin);
        } else if nbits < 15 {
            self.xmin = f64::from(nbits) + 0.1;
        }
        self
    }

    /// Basic type of the member, with any array offset removed.
    pub fn element_type(&self) -> Option<ElementType> {
        let code = self.type_code;
        if code > OFFSET_L && code < OFFSET_P {
            ElementType::from_code(code - OFFSET_L)
        } else if code > OFFSET_P && code < OFFSET_P + OFFSET_L {
            ElementType::from_code(code - OFFSET_P)
        } else {
            ElementType::from_code(code)
        }
    }

    pub fn is_array(&self) -> bool {
        self.type_code > OFFSET_L
            && self.type_code < OFFSET_P + OFFSET_L
            && self.type_code != OFFSET_P
    }
}

impl rbytes::StreamerElement for StreamerElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn factor(&self) -> f64 {
        self.factor
    }

    fn xmin(&self) -> f64 {
        self.xmin
    }

    fn xmax(&self) -> f64 {
        self.xmax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootio_rbytes::float::Encoding;

    #[test]
    fn test_type_codes() {
        for code in (0..20).chain(61..72).chain([300, 365, 500, 501]) {
            let t = ElementType::from_code(code).expect("known code");
            assert_eq!(t.code(), code);
        }
        assert!(ElementType::from_code(20).is_none());
        assert!(ElementType::try_from(42).is_err());
    }

    #[test]
    fn test_array_types() {
        let e = StreamerElement::new("fArr", ElementType::Int, "int").with_array_len(3);
        assert_eq!(e.type_code, 23);
        assert_eq!(e.element_type(), Some(ElementType::Int));
        assert!(e.is_array());

        let e = StreamerElement {
            type_code: 48,
            ..StreamerElement::default()
        };
        assert_eq!(e.element_type(), Some(ElementType::Double));
        assert!(e.is_array());

        let e = StreamerElement::new("fX", ElementType::Double, "double");
        assert!(!e.is_array());
    }

    #[test]
    fn test_with_range() {
        let e = StreamerElement::new("fX", ElementType::Double32, "Double32_t")
            .with_range(-10.0, 10.0, 16);
        assert_eq!(e.factor, 65536.0 / 20.0);
        assert!(matches!(
            Encoding::double32(Some(&e)),
            Encoding::Scaled { xmin, xmax, .. } if xmin == -10.0 && xmax == 10.0
        ));

        let e = StreamerElement::new("fX", ElementType::Double32, "Double32_t")
            .with_range(0.0, 1.0, 32);
        assert_eq!(e.factor, f64::from(u32::MAX));

        // Out-of-range widths fall back to 32 bits.
        let e = StreamerElement::new("fX", ElementType::Float16, "Float16_t")
            .with_range(0.0, 1.0, 1);
        assert_eq!(e.factor, f64::from(u32::MAX));

        let e = StreamerElement::new("fX", ElementType::Float16, "Float16_t")
            .with_range(0.0, 0.0, 10);
        assert_eq!(e.factor, 0.0);
        assert_eq!(e.xmin, 10.1);
        assert_eq!(
            Encoding::float16(Some(&e)),
            Encoding::Truncated { nbits: 10 }
        );

        let e = StreamerElement::new("fX", ElementType::Double32, "Double32_t")
            .with_range(0.0, 0.0, 20);
        assert_eq!(Encoding::double32(Some(&e)), Encoding::Float);
    }

    #[test]
    fn test_json_shape() {
        let e = StreamerElement::new("fN", ElementType::Int, "int").with_title("count");
        let v = serde_json::to_value(&e).expect("serialize");
        assert_eq!(v["type"], 3);
        assert_eq!(v["title"], "count");

        let back: StreamerElement =
            serde_json::from_str(r#"{"name":"fN","type":3}"#).expect("deserialize");
        assert_eq!(back.name, "fN");
        assert_eq!(back.element_type(), Some(ElementType::Int));
    }

    #[test]
    fn test_json_keeps_raw_type_codes() {
        let e = StreamerElement::new("fArr", ElementType::Double, "double").with_array_len(4);
        let v = serde_json::to_value(&e).expect("serialize");
        assert_eq!(v["type"], 28);

        let back: StreamerElement = serde_json::from_value(v).expect("deserialize");
        assert_eq!(back, e);
        assert_eq!(back.element_type(), Some(ElementType::Double));

        // Codes outside the known set still load; only the typed view is empty.
        let odd: StreamerElement =
            serde_json::from_str(r#"{"name":"fZ","type":42}"#).expect("deserialize");
        assert_eq!(odd.type_code, 42);
        assert_eq!(odd.element_type(), None);
        assert!(matches!(
            ElementType::try_from(odd.type_code),
            Err(RDictError::InvalidType(42))
        ));
    }
}
