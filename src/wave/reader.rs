//! Binary wave (`.ibw`) decoding.
//!
//! A wave file is a `BinHeader`, a `WaveHeader` whose trailing `wData`
//! field holds the first sample bytes, the rest of the samples, and a
//! version-dependent list of optional sections. The whole file is read in
//! one forward pass, so the same decoder serves standalone files and wave
//! records embedded in packed experiments.

use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use tracing::{debug, trace, warn};

use super::headers::{VersionLayout, BIN_HEADER_COMMON, POST_DATA_PADDING};
use super::{BinaryWave, WaveArray, WaveSections, WaveValues};
use crate::layout::{latin1, StructValue};
use crate::util::{
    assert_null, byte_order, checksum, need_to_reorder_bytes, open_file, read_at_most, read_exact_vec, read_up_to, ByteOrder,
    Dimensions, Error, NumericType, Result,
};

/// Load a binary wave from a file.
///
/// With `strict` set, non-zero post-data padding and truncated trailing
/// sections are errors; otherwise they are logged and skipped.
pub fn load_wave(path: impl AsRef<Path>, strict: bool) -> Result<BinaryWave> {
    let path = path.as_ref();
    debug!("loading binary wave {}", path.display());
    let mut reader = open_file(path)?;
    decode_wave(&mut reader, strict)
}

/// Decode a binary wave from a byte stream.
pub fn decode_wave<R: Read>(mut reader: R, strict: bool) -> Result<BinaryWave> {
    let mut probe = [0u8; 2];
    let got = read_up_to(&mut reader, &mut probe)?;
    if got < probe.len() {
        return Err(Error::short(BIN_HEADER_COMMON.name(), probe.len(), got));
    }
    let mut version = ByteOrder::Native.read_i16(&probe);
    let reorder = need_to_reorder_bytes(version);
    let order = byte_order(reorder);
    if reorder {
        version = order.read_i16(&probe);
    }
    let layout = VersionLayout::for_version(version)?;
    trace!(version, %order, "binary wave");

    // Both headers, wData tail included. A zero-point wave may stop short.
    let mut header = vec![0u8; layout.header_size()];
    header[..2].copy_from_slice(&probe);
    let got = 2 + read_up_to(&mut reader, &mut header[2..])?;
    let bin_size = layout.bin.size();
    let bin_header = layout.bin.unpack(&header[..got], order)?;
    let wave_header = layout.wave.unpack_from(&header[..got], bin_size, order)?;

    // missing bytes are zero and do not change the sum
    let c = checksum(&header, order, 0, layout.checksum_size);
    if c != 0 {
        return Err(Error::Checksum(c));
    }

    let npnts = wave_header.int("npnts")?;
    let type_code = wave_header.int("type")? as i16;
    let data_size = layout.data_size(bin_header.int("wfmSize")?);
    let data_len = usize::try_from(data_size).unwrap_or(0);
    let points = usize::try_from(npnts).unwrap_or(0);

    let numeric_type = match NumericType::from_code(type_code) {
        Some(t) => Some(t),
        None if npnts > 0 => return Err(Error::UnsupportedNumericType(type_code)),
        // formula waves
        None => None,
    };
    if let Some(t) = numeric_type {
        if !t.is_text() && points != 0 && data_len != points * t.item_size() {
            return Err(Error::SizeMismatch {
                data_bytes: data_len,
                npnts: points,
                item_size: t.item_size(),
            });
        }
    }

    // The wData tail holds the first sample bytes. Tail bytes past the
    // samples already belong to the trailing sections.
    let tail_start = bin_size + layout.wave_header_prefix();
    let tail = header.get(tail_start..got).unwrap_or(&[]);
    let from_tail = data_len.min(tail.len());
    let mut samples = tail[..from_tail].to_vec();
    if data_len > from_tail {
        samples.extend(read_exact_vec(&mut reader, data_len - from_tail, "wave data")?);
    }
    let mut rest = Cursor::new(tail[from_tail..].to_vec()).chain(reader);

    let sections = read_sections(&mut rest, version, &bin_header, numeric_type, order, strict)?;

    let data = match numeric_type {
        Some(NumericType::Text) => {
            let bytes = if points > 0 { samples.as_slice() } else { &[] };
            let strings = split_text(bytes, &sections.string_indices, version)?;
            let shape = Dimensions::from_leading_nonzero(&wave_header.ints("nDim").unwrap_or_default())?;
            let shape = if shape.num_points() == strings.len() {
                shape
            } else {
                Dimensions::d1(strings.len())
            };
            WaveArray::new(shape, WaveValues::Text(strings))
        }
        Some(t) if points > 0 => WaveArray::new(
            sample_shape(version, &wave_header, points)?,
            WaveValues::decode(t, &samples, order),
        ),
        _ => WaveArray::new(
            sample_shape(version, &wave_header, 0)?,
            WaveValues::Int8(Vec::new()),
        ),
    };

    Ok(BinaryWave {
        version,
        byte_order: order,
        bin_header,
        wave_header,
        sections,
        data,
    })
}

/// Shape of a numeric wave: the leading non-zero `nDim` entries for
/// version 5, `(npnts,)` before that.
fn sample_shape(version: i16, wave_header: &StructValue, points: usize) -> Result<Dimensions> {
    if version == 5 {
        let shape = Dimensions::from_leading_nonzero(&wave_header.ints("nDim")?)?;
        if shape.num_points() == points {
            return Ok(shape);
        }
        if points != 0 {
            return Err(Error::invalid(format!(
                "nDim {} does not match {} points",
                shape, points
            )));
        }
    }
    Ok(Dimensions::d1(points))
}

fn read_sections<R: Read>(
    reader: &mut R,
    version: i16,
    bin: &StructValue,
    numeric_type: Option<NumericType>,
    order: ByteOrder,
    strict: bool,
) -> Result<WaveSections> {
    let mut sections = WaveSections::default();
    match version {
        2 | 3 => {
            let pad = read_section(reader, POST_DATA_PADDING as i64, "post-data padding", strict)?;
            assert_null(&pad, strict)?;
            sections.note = section_text(&read_section(reader, bin.int("noteSize")?, "wave note", strict)?);
            if version == 3 {
                let formula = read_section(reader, bin.int("formulaSize")?, "dependency formula", strict)?;
                sections.formula = section_text(&formula);
            }
        }
        5 => {
            let formula = read_section(reader, bin.int("formulaSize")?, "dependency formula", strict)?;
            sections.formula = section_text(&formula);
            sections.note = section_text(&read_section(reader, bin.int("noteSize")?, "wave note", strict)?);
            let units = read_section(reader, bin.int("dataEUnitsSize")?, "extended data units", strict)?;
            sections.data_e_units = section_text(&units);
            for size in bin.ints("dimEUnitsSize")? {
                let units = read_section(reader, size, "extended dimension units", strict)?;
                sections.dim_e_units.push(section_text(&units));
            }
            for size in bin.ints("dimLabelsSize")? {
                let labels = read_section(reader, size, "dimension labels", strict)?;
                sections.dim_labels.push(
                    labels
                        .split(|&b| b == 0)
                        .filter(|l| !l.is_empty())
                        .map(latin1)
                        .collect(),
                );
            }
            if numeric_type == Some(NumericType::Text) {
                let raw = read_section(reader, bin.int("sIndicesSize")?, "string indices", strict)?;
                sections.string_indices = decode_i32s(&raw, order);
            }
        }
        _ => {}
    }
    Ok(sections)
}

/// Read one optional section of `size` bytes. Negative sizes read nothing.
fn read_section<R: Read>(reader: &mut R, size: i64, what: &str, strict: bool) -> Result<Vec<u8>> {
    let len = usize::try_from(size).unwrap_or(0);
    let buf = read_at_most(reader, len)?;
    if buf.len() < len {
        if strict {
            return Err(Error::short(what, len, buf.len()));
        }
        warn!("{}: expected {} bytes, found {}", what, len, buf.len());
    }
    Ok(buf)
}

fn section_text(bytes: &[u8]) -> String {
    latin1(bytes).trim().to_string()
}

fn decode_i32s(bytes: &[u8], order: ByteOrder) -> Vec<i32> {
    let mut out = vec![0i32; bytes.len() / 4];
    let src = &bytes[..out.len() * 4];
    if order.is_little() {
        LittleEndian::read_i32_into(src, &mut out);
    } else {
        BigEndian::read_i32_into(src, &mut out);
    }
    out
}

/// Split text wave bytes at the end offsets of the string index table.
///
/// Versions before 5 carry no index table; their text is one string.
fn split_text(data: &[u8], indices: &[i32], version: i16) -> Result<Vec<String>> {
    if version != 5 {
        return Ok(if data.is_empty() { Vec::new() } else { vec![latin1(data)] });
    }
    let mut strings = Vec::with_capacity(indices.len());
    let mut start = 0usize;
    for &index in indices {
        let offset = usize::try_from(index)
            .map_err(|_| Error::invalid(format!("negative string index {}", index)))?;
        if offset >= start {
            let bytes = data.get(start..offset).ok_or_else(|| {
                Error::invalid(format!("string index {} past {} bytes of text", offset, data.len()))
            })?;
            strings.push(latin1(bytes));
            start = offset;
        } else if offset == 0 {
            strings.push(String::new());
        } else {
            return Err(Error::invalid(format!(
                "string index {} precedes previous index {}",
                offset, start
            )));
        }
    }
    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Value;
    use crate::wave::headers::{BIN_HEADER2, BIN_HEADER5, WAVE_HEADER2, WAVE_HEADER5};

    fn name_bytes(name: &str, len: usize) -> Value {
        let mut b = vec![0u8; len];
        b[..name.len()].copy_from_slice(name.as_bytes());
        Value::chars(&b)
    }

    /// Patch the checksum field so the header region sums to zero.
    fn fix_checksum(buf: &mut [u8], at: usize, region: usize, order: ByteOrder) {
        buf[at..at + 2].copy_from_slice(&[0, 0]);
        let c = checksum(buf, order, 0, region) as u16;
        let fix = 0u16.wrapping_sub(c);
        let bytes = if order.is_little() { fix.to_le_bytes() } else { fix.to_be_bytes() };
        buf[at..at + 2].copy_from_slice(&bytes);
    }

    fn v2_float64(values: &[f64], order: ByteOrder, note: &str) -> Vec<u8> {
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
            .with("bname", name_bytes("wave0", 20))
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

    #[test]
    fn test_v2_float64() {
        let bytes = v2_float64(&[5.0, 4.0, 3.0, 2.0, 1.0], ByteOrder::Little, " a note\r");
        let wave = decode_wave(Cursor::new(bytes), true).unwrap();
        assert_eq!(wave.version, 2);
        assert_eq!(wave.name(), "wave0");
        assert_eq!(wave.npnts(), 5);
        assert_eq!(wave.numeric_type(), Some(NumericType::Float64));
        assert_eq!(wave.shape(), &Dimensions::d1(5));
        assert_eq!(wave.data.as_f64(), Some(&[5.0, 4.0, 3.0, 2.0, 1.0][..]));
        assert_eq!(wave.note(), "a note");
    }

    #[test]
    fn test_byte_orders_agree() {
        let values = [1.5, -2.0, 1e10];
        let le = decode_wave(Cursor::new(v2_float64(&values, ByteOrder::Little, "")), true).unwrap();
        let be = decode_wave(Cursor::new(v2_float64(&values, ByteOrder::Big, "")), true).unwrap();
        assert_eq!(le.byte_order, ByteOrder::Little);
        assert_eq!(be.byte_order, ByteOrder::Big);
        assert_eq!(le.data, be.data);
        // wData holds raw sample bytes, so only the other fields agree
        let mut le_header = le.wave_header.clone();
        let mut be_header = be.wave_header.clone();
        assert!(le_header.remove("wData").is_some());
        assert!(be_header.remove("wData").is_some());
        assert_eq!(le_header, be_header);
    }

    #[test]
    fn test_short_wave_replays_tail() {
        // one sample: the other 8 tail bytes are the start of the padding
        let bytes = v2_float64(&[7.0], ByteOrder::Big, "n");
        let wave = decode_wave(Cursor::new(bytes), true).unwrap();
        assert_eq!(wave.data.as_f64(), Some(&[7.0][..]));
        assert_eq!(wave.note(), "n");
    }

    #[test]
    fn test_bad_checksum() {
        let mut bytes = v2_float64(&[1.0, 2.0], ByteOrder::Little, "");
        bytes[20] ^= 0x01;
        assert!(matches!(decode_wave(Cursor::new(bytes), true), Err(Error::Checksum(c)) if c != 0));
    }

    #[test]
    fn test_padding_strictness() {
        let mut bytes = v2_float64(&[1.0, 2.0], ByteOrder::Little, "");
        let pad = bytes.len() - 16;
        bytes[pad + 3] = 0x7F;
        assert!(matches!(decode_wave(Cursor::new(bytes.clone()), true), Err(Error::PaddingNotZero(_))));
        let wave = decode_wave(Cursor::new(bytes), false).unwrap();
        assert_eq!(wave.data.as_f64(), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_size_mismatch() {
        let mut bytes = v2_float64(&[1.0, 2.0], ByteOrder::Little, "");
        // npnts sits 16 + 2 + 4 + 20 + 2 + 2 + 4 + 4 + 4 bytes in
        bytes[58] = 3;
        fix_checksum(&mut bytes, 14, 142, ByteOrder::Little);
        assert!(matches!(
            decode_wave(Cursor::new(bytes), true),
            Err(Error::SizeMismatch { data_bytes: 16, npnts: 3, item_size: 8 })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let bytes = [4u8, 0, 0, 0];
        assert!(matches!(
            decode_wave(Cursor::new(bytes), true),
            Err(Error::UnsupportedVersion { version: 4, .. })
        ));
        assert!(matches!(decode_wave(Cursor::new([1u8]), true), Err(Error::ShortBuffer { .. })));
    }

    fn v5_header(ty: NumericType, npnts: i32, n_dim: [i32; 4], wfm: usize) -> StructValue {
        StructValue::new()
            .with("version", 5i16)
            .with("checksum", 0i16)
            .with("wfmSize", wfm as i32)
            .with("formulaSize", 0i32)
            .with("noteSize", 0i32)
            .with("dataEUnitsSize", 0i32)
            .with("dimEUnitsSize", Value::array([0i32; 4]))
            .with("dimLabelsSize", Value::array([0i32; 4]))
            .with("sIndicesSize", 0i32)
            .with("type", ty.code())
            .with("npnts", npnts)
            .with("nDim", Value::array(n_dim))
            .with("bname", name_bytes("zero", 32))
            .with("creationDate", 0u32)
            .with("modDate", 0u32)
            .with("sfA", Value::array([1.0f64; 4]))
            .with("sfB", Value::array([0.0f64; 4]))
            .with("fsValid", 0i16)
            .with("topFullScale", 0.0)
            .with("botFullScale", 0.0)
            .with("wData", 0.0f32)
    }

    #[test]
    fn test_v5_zero_point_without_wdata() {
        let order = ByteOrder::Big;
        let v = v5_header(NumericType::Float32, 0, [0; 4], 320);
        let mut bytes = BIN_HEADER5.pack(&v, order).unwrap();
        bytes.extend_from_slice(&WAVE_HEADER5.pack(&v, order).unwrap()[..320]);
        fix_checksum(&mut bytes, 2, 384, order);
        let wave = decode_wave(Cursor::new(bytes), true).unwrap();
        assert_eq!(wave.npnts(), 0);
        assert!(wave.data.is_empty());
        assert_eq!(wave.shape(), &Dimensions::d1(0));
        assert_eq!(wave.sections.dim_e_units.len(), 4);
    }

    #[test]
    fn test_v5_oversized_dimensions() {
        let order = ByteOrder::Little;
        let v = v5_header(NumericType::Float32, 0, [65536; 4], 320);
        let mut bytes = BIN_HEADER5.pack(&v, order).unwrap();
        bytes.extend_from_slice(&WAVE_HEADER5.pack(&v, order).unwrap()[..320]);
        fix_checksum(&mut bytes, 2, 384, order);
        assert!(matches!(decode_wave(Cursor::new(bytes), true), Err(Error::InvalidStructure(_))));
    }

    #[test]
    fn test_split_text() {
        let data = b"Marylamb";
        assert_eq!(split_text(data, &[4, 4, 8], 5).unwrap(), vec!["Mary", "", "lamb"]);
        assert_eq!(split_text(data, &[4, 0], 5).unwrap(), vec!["Mary", ""]);
        assert!(matches!(split_text(data, &[4, 2], 5), Err(Error::InvalidStructure(_))));
        assert!(matches!(split_text(data, &[9], 5), Err(Error::InvalidStructure(_))));
        assert_eq!(split_text(b"abc", &[], 2).unwrap(), vec!["abc"]);
    }
}
