//! Typed sample arrays.

use byteorder::{BigEndian, LittleEndian};

use crate::util::{ByteOrder, Dimensions, NumericType};

/// A complex sample stored as consecutive real and imaginary parts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}j", self.re, self.im)
    }
}

/// Flat sample storage, one variant per element type.
#[derive(Clone, Debug, PartialEq)]
pub enum WaveValues {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    ComplexInt8(Vec<Complex<i8>>),
    ComplexUInt8(Vec<Complex<u8>>),
    ComplexInt16(Vec<Complex<i16>>),
    ComplexUInt16(Vec<Complex<u16>>),
    ComplexInt32(Vec<Complex<i32>>),
    ComplexUInt32(Vec<Complex<u32>>),
    ComplexFloat32(Vec<Complex<f32>>),
    ComplexFloat64(Vec<Complex<f64>>),
    /// Strings of a text wave
    Text(Vec<String>),
}

fn pairs<T: Copy>(flat: Vec<T>) -> Vec<Complex<T>> {
    flat.chunks_exact(2).map(|p| Complex::new(p[0], p[1])).collect()
}

fn read_into<T: Default + Clone>(bytes: &[u8], size: usize, read: impl Fn(&[u8], &mut [T])) -> Vec<T> {
    let n = bytes.len() / size;
    let mut out = vec![T::default(); n];
    read(&bytes[..n * size], &mut out);
    out
}

impl WaveValues {
    /// Decode raw sample bytes. Text waves decode to one byte per element
    /// here; splitting into strings happens once the string index table
    /// has been read.
    pub fn decode(ty: NumericType, bytes: &[u8], order: ByteOrder) -> Self {
        if order.is_little() {
            Self::decode_with::<LittleEndian>(ty, bytes)
        } else {
            Self::decode_with::<BigEndian>(ty, bytes)
        }
    }

    fn decode_with<E: byteorder::ByteOrder>(ty: NumericType, bytes: &[u8]) -> Self {
        let i8s = || bytes.iter().map(|&b| b as i8).collect::<Vec<_>>();
        match ty {
            NumericType::Text | NumericType::UInt8 => Self::UInt8(bytes.to_vec()),
            NumericType::Int8 => Self::Int8(i8s()),
            NumericType::Int16 => Self::Int16(read_into(bytes, 2, E::read_i16_into)),
            NumericType::UInt16 => Self::UInt16(read_into(bytes, 2, E::read_u16_into)),
            NumericType::Int32 => Self::Int32(read_into(bytes, 4, E::read_i32_into)),
            NumericType::UInt32 => Self::UInt32(read_into(bytes, 4, E::read_u32_into)),
            NumericType::Float32 => Self::Float32(read_into(bytes, 4, E::read_f32_into)),
            NumericType::Float64 => Self::Float64(read_into(bytes, 8, E::read_f64_into)),
            NumericType::ComplexInt8 => Self::ComplexInt8(pairs(i8s())),
            NumericType::ComplexUInt8 => Self::ComplexUInt8(pairs(bytes.to_vec())),
            NumericType::ComplexInt16 => Self::ComplexInt16(pairs(read_into(bytes, 2, E::read_i16_into))),
            NumericType::ComplexUInt16 => Self::ComplexUInt16(pairs(read_into(bytes, 2, E::read_u16_into))),
            NumericType::ComplexInt32 => Self::ComplexInt32(pairs(read_into(bytes, 4, E::read_i32_into))),
            NumericType::ComplexUInt32 => Self::ComplexUInt32(pairs(read_into(bytes, 4, E::read_u32_into))),
            NumericType::Complex64 => Self::ComplexFloat32(pairs(read_into(bytes, 4, E::read_f32_into))),
            NumericType::Complex | NumericType::Complex128 => {
                Self::ComplexFloat64(pairs(read_into(bytes, 8, E::read_f64_into)))
            }
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::ComplexInt8(v) => v.len(),
            Self::ComplexUInt8(v) => v.len(),
            Self::ComplexInt16(v) => v.len(),
            Self::ComplexUInt16(v) => v.len(),
            Self::ComplexInt32(v) => v.len(),
            Self::ComplexUInt32(v) => v.len(),
            Self::ComplexFloat32(v) => v.len(),
            Self::ComplexFloat64(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real element at a flat offset widened to `f64`; `None` for complex
    /// and text values.
    pub fn real_at(&self, i: usize) -> Option<f64> {
        Some(match self {
            Self::Int8(v) => f64::from(*v.get(i)?),
            Self::UInt8(v) => f64::from(*v.get(i)?),
            Self::Int16(v) => f64::from(*v.get(i)?),
            Self::UInt16(v) => f64::from(*v.get(i)?),
            Self::Int32(v) => f64::from(*v.get(i)?),
            Self::UInt32(v) => f64::from(*v.get(i)?),
            Self::Float32(v) => f64::from(*v.get(i)?),
            Self::Float64(v) => *v.get(i)?,
            _ => return None,
        })
    }

    /// Element at a flat offset formatted for text output.
    pub fn format_at(&self, i: usize) -> Option<String> {
        Some(match self {
            Self::ComplexInt8(v) => v.get(i)?.to_string(),
            Self::ComplexUInt8(v) => v.get(i)?.to_string(),
            Self::ComplexInt16(v) => v.get(i)?.to_string(),
            Self::ComplexUInt16(v) => v.get(i)?.to_string(),
            Self::ComplexInt32(v) => v.get(i)?.to_string(),
            Self::ComplexUInt32(v) => v.get(i)?.to_string(),
            Self::ComplexFloat32(v) => v.get(i)?.to_string(),
            Self::ComplexFloat64(v) => v.get(i)?.to_string(),
            Self::Text(v) => v.get(i)?.clone(),
            real => real.real_at(i)?.to_string(),
        })
    }
}

/// Decoded samples plus their shape.
///
/// Elements are stored in column-major (Fortran) order: the row index
/// varies fastest, matching the layout IGOR writes.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveArray {
    pub shape: Dimensions,
    pub values: WaveValues,
}

impl WaveArray {
    pub fn new(shape: Dimensions, values: WaveValues) -> Self {
        Self { shape, values }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat offset of a multi-dimensional index.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        self.shape.column_major_offset(index)
    }

    /// Real element at a multi-dimensional index, widened to `f64`.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.values.real_at(self.offset(index)?)
    }

    /// String element of a text wave at a multi-dimensional index.
    pub fn get_text(&self, index: &[usize]) -> Option<&str> {
        match &self.values {
            WaveValues::Text(v) => v.get(self.offset(index)?).map(String::as_str),
            _ => None,
        }
    }

    /// All real elements in storage order, widened to `f64`.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        (0..self.len()).map(|i| self.values.real_at(i)).collect()
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.values {
            WaveValues::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.values {
            WaveValues::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match &self.values {
            WaveValues::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_float64_both_orders() {
        let le: Vec<u8> = [5.0f64, 4.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let be: Vec<u8> = [5.0f64, 4.0].iter().flat_map(|v| v.to_be_bytes()).collect();
        let a = WaveValues::decode(NumericType::Float64, &le, ByteOrder::Little);
        let b = WaveValues::decode(NumericType::Float64, &be, ByteOrder::Big);
        assert_eq!(a, WaveValues::Float64(vec![5.0, 4.0]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_complex() {
        let bytes: Vec<u8> = [1.0f32, 2.0, 3.0, 4.0].iter().flat_map(|v| v.to_be_bytes()).collect();
        let v = WaveValues::decode(NumericType::Complex64, &bytes, ByteOrder::Big);
        assert_eq!(v, WaveValues::ComplexFloat32(vec![Complex::new(1.0, 2.0), Complex::new(3.0, 4.0)]));
        assert_eq!(v.len(), 2);
        assert_eq!(v.real_at(0), None);
        assert_eq!(v.format_at(1).as_deref(), Some("3+4j"));

        let v = WaveValues::decode(NumericType::ComplexInt8, &[0xFF, 0x01], ByteOrder::Little);
        assert_eq!(v, WaveValues::ComplexInt8(vec![Complex::new(-1, 1)]));
    }

    #[test]
    fn test_column_major_get() {
        // 3 rows x 2 columns, stored column by column
        let arr = WaveArray::new(
            Dimensions::from([3, 2]),
            WaveValues::Int16(vec![0, 1, 2, 10, 11, 12]),
        );
        assert_eq!(arr.get(&[0, 0]), Some(0.0));
        assert_eq!(arr.get(&[2, 0]), Some(2.0));
        assert_eq!(arr.get(&[0, 1]), Some(10.0));
        assert_eq!(arr.get(&[2, 1]), Some(12.0));
        assert_eq!(arr.get(&[3, 1]), None);
    }

    #[test]
    fn test_text_access() {
        let arr = WaveArray::new(
            Dimensions::d1(2),
            WaveValues::Text(vec!["a".into(), "bc".into()]),
        );
        assert_eq!(arr.get_text(&[1]), Some("bc"));
        assert_eq!(arr.get(&[1]), None);
        assert_eq!(arr.to_f64_vec(), None);
    }
}
