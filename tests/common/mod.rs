//! Byte-level builders for test files.

#![allow(dead_code)]

use igor::layout::{StructValue, Value};
use igor::util::checksum;
use igor::wave::headers::{BIN_HEADER2, BIN_HEADER5, WAVE_HEADER2, WAVE_HEADER5};
use igor::{ByteOrder, NumericType};

fn name_bytes(name: &str, len: usize) -> Value {
    let mut b = vec![0u8; len];
    b[..name.len()].copy_from_slice(name.as_bytes());
    Value::chars(&b)
}

fn put_i16(order: ByteOrder, v: i16) -> [u8; 2] {
    if order.is_little() { v.to_le_bytes() } else { v.to_be_bytes() }
}

/// Patch the checksum field so the header region sums to zero.
pub fn fix_checksum(buf: &mut [u8], at: usize, region: usize, order: ByteOrder) {
    buf[at..at + 2].copy_from_slice(&[0, 0]);
    let c = checksum(buf, order, 0, region) as i16;
    let bytes = put_i16(order, c.wrapping_neg());
    buf[at..at + 2].copy_from_slice(&bytes);
}

/// Version 2 double precision wave followed by its note.
pub fn v2_float64(name: &str, values: &[f64], order: ByteOrder, note: &str) -> Vec<u8> {
    let data: Vec<u8> = values
        .iter()
        .flat_map(|v| if order.is_little() { v.to_le_bytes() } else { v.to_be_bytes() })
        .collect();
    let bin = StructValue::new()
        .with("version", 2i16)
        .with("wfmSize", (WAVE_HEADER2.size() + data.len()) as i32)
        .with("noteSize", note.len() as i32)
        .with("checksum", 0i16);
    let wave = StructValue::new()
        .with("type", NumericType::Float64.code())
        .with("bname", name_bytes(name, 20))
        .with("npnts", values.len() as i32)
        .with("hsA", 1.0)
        .with("hsB", 0.0)
        .with("fsValid", 0i16)
        .with("topFullScale", 0.0)
        .with("botFullScale", 0.0)
        .with("creationDate", 0u32)
        .with("modDate", 0u32)
        .with("wData", Value::array([0.0f32; 4]));
    let mut out = BIN_HEADER2.pack(&bin, order).unwrap();
    let wave = WAVE_HEADER2.pack(&wave, order).unwrap();
    out.extend_from_slice(&wave[..110]);
    out.extend_from_slice(&data);
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(note.as_bytes());
    fix_checksum(&mut out, 14, 142, order);
    out
}

/// Version 5 wave with raw sample bytes and optional string indices.
pub fn v5_wave(
    name: &str,
    ty: NumericType,
    n_dim: [i32; 4],
    data: &[u8],
    indices: &[i32],
    order: ByteOrder,
) -> Vec<u8> {
    let npnts: i32 = if n_dim[0] == 0 { 0 } else { n_dim.iter().take_while(|&&n| n > 0).product() };
    let v = StructValue::new()
        .with("version", 5i16)
        .with("checksum", 0i16)
        .with("wfmSize", (320 + data.len()) as i32)
        .with("formulaSize", 0i32)
        .with("noteSize", 0i32)
        .with("dataEUnitsSize", 0i32)
        .with("dimEUnitsSize", Value::array([0i32; 4]))
        .with("dimLabelsSize", Value::array([0i32; 4]))
        .with("sIndicesSize", (indices.len() * 4) as i32)
        .with("type", ty.code())
        .with("npnts", npnts)
        .with("nDim", Value::array(n_dim))
        .with("bname", name_bytes(name, 32))
        .with("creationDate", 0u32)
        .with("modDate", 0u32)
        .with("sfA", Value::array([1.0f64; 4]))
        .with("sfB", Value::array([0.0f64; 4]))
        .with("fsValid", 0i16)
        .with("topFullScale", 0.0)
        .with("botFullScale", 0.0)
        .with("wData", 0.0f32);
    let mut out = BIN_HEADER5.pack(&v, order).unwrap();
    out.extend_from_slice(&WAVE_HEADER5.pack(&v, order).unwrap()[..320]);
    out.extend_from_slice(data);
    for i in indices {
        out.extend(if order.is_little() { i.to_le_bytes() } else { i.to_be_bytes() });
    }
    fix_checksum(&mut out, 2, 384, order);
    out
}

/// Append one packed experiment record.
pub fn record(out: &mut Vec<u8>, order: ByteOrder, code: u16, version: i16, data: &[u8]) {
    let len = data.len() as i32;
    if order.is_little() {
        out.extend(code.to_le_bytes());
        out.extend(version.to_le_bytes());
        out.extend(len.to_le_bytes());
    } else {
        out.extend(code.to_be_bytes());
        out.extend(version.to_be_bytes());
        out.extend(len.to_be_bytes());
    }
    out.extend_from_slice(data);
}
