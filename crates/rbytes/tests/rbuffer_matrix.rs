use proptest::prelude::*;
use rootio_rbytes::{RBuffer, RBytesError, WBuffer};

#[test]
fn zero_buffer_read_i16_matrix() {
    let data = [0u8; 32];
    let mut r = RBuffer::from_bytes(&data);
    assert_eq!(r.read_i16(), 0);
    assert_eq!(r.position(), 2);
    assert!(r.err().is_none());
}

#[test]
fn paired_widths_advance_matrix() {
    let data = [0u8; 2 * (2 + 4 + 8)];
    let mut r = RBuffer::from_bytes(&data);
    let mut pos = 0;
    for n in [2i64, 4, 8] {
        match n {
            2 => {
                r.read_i16();
                r.read_u16();
            }
            4 => {
                r.read_i32();
                r.read_u32();
            }
            _ => {
                r.read_i64();
                r.read_u64();
            }
        }
        pos += 2 * n;
        assert_eq!(r.position(), pos);
    }
    assert!(r.err().is_none());
}

#[test]
fn string_boundary_matrix() {
    for n in [0usize, 1, 2, 8, 16, 32, 64, 128, 253, 254, 255, 256, 512] {
        let s: String = (0..n).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let mut w = WBuffer::default();
        w.write_string(&s);
        w.write_stl_string(&s);
        let header = if n < 255 { 1 } else { 5 };
        assert_eq!(w.bytes().len(), 2 * (header + n) + 6, "len={n}");

        let mut r = RBuffer::from_bytes(w.bytes());
        assert_eq!(r.read_string(), s, "len={n}");
        assert_eq!(r.read_stl_string(), s, "len={n}");
        assert!(r.err().is_none(), "len={n}");
        assert_eq!(r.remaining(), 0);
    }
}

#[test]
fn c_string_matrix() {
    let mut w = WBuffer::default();
    w.write_c_string("hello world");
    w.write_c_string("");
    let mut r = RBuffer::from_bytes(w.bytes());
    assert_eq!(r.read_c_string("hello world".len() + 1), "hello world");
    assert_eq!(r.read_c_string(8), "");
    assert_eq!(r.remaining(), 0);

    // Capped reads leave the remainder in place.
    let mut r = RBuffer::from_bytes(b"hello world\0");
    assert_eq!(r.read_c_string("hello".len()), "hello");
    assert_eq!(r.position(), 5);
}

#[test]
fn framing_count_matrix() {
    for payload in [0usize, 1, 7, 300] {
        let mut w = WBuffer::default();
        let start = w.write_version(4);
        w.write_bytes(&vec![0xab; payload]);
        assert_eq!(w.set_byte_count(start, "TDummy"), payload + 6);
        let good = w.into_bytes();

        let mut r = RBuffer::from_bytes(&good);
        let hdr = r.read_version("TDummy");
        assert_eq!(hdr.vers, 4);
        assert_eq!(hdr.count as usize, payload + 2);
        r.skip(payload);
        r.check_byte_count(hdr.pos, hdr.count, hdr.pos, "TDummy");
        assert!(r.err().is_none(), "payload={payload}");

        // Declared count one too large: the record ends early.
        let mut bad = good.clone();
        bad[3] = bad[3].wrapping_add(1);
        let mut r = RBuffer::from_bytes(&bad);
        let hdr = r.read_version("TDummy");
        r.skip(payload);
        r.check_header(&hdr);
        assert!(
            matches!(r.err(), Some(RBytesError::TooFewBytes { .. })),
            "payload={payload}: {:?}",
            r.err()
        );

        // Declared count one too small: the record overruns.
        let mut bad = good.clone();
        bad[3] = bad[3].wrapping_sub(1);
        let mut r = RBuffer::from_bytes(&bad);
        let hdr = r.read_version("TDummy");
        r.skip(payload);
        r.check_header(&hdr);
        assert!(
            matches!(r.err(), Some(RBytesError::TooManyBytes { .. })),
            "payload={payload}: {:?}",
            r.err()
        );
    }
}

#[test]
fn sticky_error_matrix() {
    let data = [0x00, 0x01];
    let mut r = RBuffer::from_bytes(&data);
    assert_eq!(r.read_i64(), 0);
    let err = r.err().cloned().expect("underflow");

    assert_eq!(r.read_i16(), 0);
    assert_eq!(r.read_f64(), 0.0);
    assert_eq!(r.read_string(), "");
    assert_eq!(r.read_stl_string(), "");
    assert!(r.read_object_any().is_none());
    let hdr = r.read_version("TDummy");
    assert_eq!(hdr.vers, 0);
    let mut v = vec![1i32; 2];
    r.read_vector_i32(&mut v);
    assert_eq!(v, vec![1, 1]);

    assert_eq!(r.position(), 0);
    assert_eq!(r.check(), Err(err));
}

#[test]
fn vector_matrix() {
    let mut w = WBuffer::default();
    w.write_vector_i8(&[-1, 0, 1]);
    w.write_vector_u16(&[]);
    w.write_vector_i64(&[i64::MIN, i64::MAX]);
    w.write_vector_f32(&[1.5, -0.0]);
    w.write_vector_u64(&[u64::MAX]);

    let mut r = RBuffer::from_bytes(w.bytes());
    let (mut a, mut b, mut c, mut d, mut e) = (vec![], vec![9u16], vec![], vec![], vec![]);
    r.read_vector_i8(&mut a);
    r.read_vector_u16(&mut b);
    r.read_vector_i64(&mut c);
    r.read_vector_f32(&mut d);
    r.read_vector_u64(&mut e);
    assert!(r.err().is_none());
    assert_eq!(a, vec![-1, 0, 1]);
    assert!(b.is_empty());
    assert_eq!(c, vec![i64::MIN, i64::MAX]);
    assert_eq!(d[0], 1.5);
    assert!(d[1].is_sign_negative());
    assert_eq!(e, vec![u64::MAX]);
}

#[test]
fn fixed_size_array_matrix() {
    let mut w = WBuffer::default();
    w.write_fixed_size_array_i32(&[3, -4, 5]);
    w.write_fixed_size_array_i32(&[]);
    let mut r = RBuffer::from_bytes(w.bytes());
    assert_eq!(r.read_fixed_size_array_i32(), vec![3, -4, 5]);
    assert!(r.read_fixed_size_array_i32().is_empty());
    assert!(r.err().is_none());
    assert_eq!(r.remaining(), 0);
}

#[derive(Debug, Clone)]
enum Prim {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
}

fn prim() -> impl Strategy<Value = Prim> {
    prop_oneof![
        any::<bool>().prop_map(Prim::Bool),
        any::<i8>().prop_map(Prim::I8),
        any::<i16>().prop_map(Prim::I16),
        any::<i32>().prop_map(Prim::I32),
        any::<i64>().prop_map(Prim::I64),
        any::<u8>().prop_map(Prim::U8),
        any::<u16>().prop_map(Prim::U16),
        any::<u32>().prop_map(Prim::U32),
        any::<u64>().prop_map(Prim::U64),
        any::<u32>().prop_map(|b| Prim::F32(f32::from_bits(b))),
        any::<u64>().prop_map(|b| Prim::F64(f64::from_bits(b))),
        ".{0,300}".prop_map(Prim::Str),
    ]
}

fn write(w: &mut WBuffer, v: &Prim) {
    match v {
        Prim::Bool(v) => w.write_bool(*v),
        Prim::I8(v) => w.write_i8(*v),
        Prim::I16(v) => w.write_i16(*v),
        Prim::I32(v) => w.write_i32(*v),
        Prim::I64(v) => w.write_i64(*v),
        Prim::U8(v) => w.write_u8(*v),
        Prim::U16(v) => w.write_u16(*v),
        Prim::U32(v) => w.write_u32(*v),
        Prim::U64(v) => w.write_u64(*v),
        Prim::F32(v) => w.write_f32(*v),
        Prim::F64(v) => w.write_f64(*v),
        Prim::Str(v) => w.write_string(v),
    }
}

fn read_matches(r: &mut RBuffer<'_>, v: &Prim) -> bool {
    match v {
        Prim::Bool(v) => r.read_bool() == *v,
        Prim::I8(v) => r.read_i8() == *v,
        Prim::I16(v) => r.read_i16() == *v,
        Prim::I32(v) => r.read_i32() == *v,
        Prim::I64(v) => r.read_i64() == *v,
        Prim::U8(v) => r.read_u8() == *v,
        Prim::U16(v) => r.read_u16() == *v,
        Prim::U32(v) => r.read_u32() == *v,
        Prim::U64(v) => r.read_u64() == *v,
        // Bit equality covers NaN payloads and signed zeros.
        Prim::F32(v) => r.read_f32().to_bits() == v.to_bits(),
        Prim::F64(v) => r.read_f64().to_bits() == v.to_bits(),
        Prim::Str(v) => r.read_string() == *v,
    }
}

proptest! {
    #[test]
    fn primitive_roundtrip(values in proptest::collection::vec(prim(), 0..32), offset in 0u32..1024) {
        let mut w = WBuffer::default().with_offset(offset);
        for v in &values {
            write(&mut w, v);
        }
        prop_assert!(w.err().is_none());
        let data = w.into_bytes();

        let mut r = RBuffer::new(&data, None, offset, None);
        for v in &values {
            prop_assert!(read_matches(&mut r, v), "{:?}", v);
        }
        prop_assert!(r.err().is_none());
        prop_assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn array_roundtrip(a in proptest::collection::vec(any::<i32>(), 0..64), b in proptest::collection::vec(any::<u64>(), 0..64)) {
        let mut w = WBuffer::default();
        w.write_array_i32(&a);
        w.write_vector_u64(&b);
        let data = w.into_bytes();

        let mut r = RBuffer::from_bytes(&data);
        let mut got_a = vec![0; a.len()];
        let mut got_b = Vec::new();
        r.read_array_i32(&mut got_a);
        r.read_vector_u64(&mut got_b);
        prop_assert!(r.err().is_none());
        prop_assert_eq!(got_a, a);
        prop_assert_eq!(got_b, b);
    }
}
