//! IGOR numeric type codes.
//!
//! A wave's `type` field combines flag bits: `NT_CMPLX` (0x01), `NT_FP32`
//! (0x02), `NT_FP64` (0x04), `NT_I8` (0x08), `NT_I16` (0x10), `NT_I32`
//! (0x20) and `NT_UNSIGNED` (0x40). Zero marks a text wave.

use std::fmt;

/// Element type of a wave or numeric variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum NumericType {
    /// Text wave; elements are bytes split into strings afterwards
    Text = 0,
    /// Bare complex flag, stored as a pair of 64-bit floats
    Complex = 0x01,
    Float32 = 0x02,
    /// Pair of 32-bit floats
    Complex64 = 0x03,
    Float64 = 0x04,
    /// Pair of 64-bit floats
    Complex128 = 0x05,
    Int8 = 0x08,
    ComplexInt8 = 0x09,
    Int16 = 0x10,
    ComplexInt16 = 0x11,
    Int32 = 0x20,
    ComplexInt32 = 0x21,
    UInt8 = 0x48,
    ComplexUInt8 = 0x49,
    UInt16 = 0x50,
    ComplexUInt16 = 0x51,
    UInt32 = 0x60,
    ComplexUInt32 = 0x61,
}

impl NumericType {
    /// Look up a type code; `None` for codes outside the table.
    pub const fn from_code(code: i16) -> Option<Self> {
        Some(match code {
            0x00 => Self::Text,
            0x01 => Self::Complex,
            0x02 => Self::Float32,
            0x03 => Self::Complex64,
            0x04 => Self::Float64,
            0x05 => Self::Complex128,
            0x08 => Self::Int8,
            0x09 => Self::ComplexInt8,
            0x10 => Self::Int16,
            0x11 => Self::ComplexInt16,
            0x20 => Self::Int32,
            0x21 => Self::ComplexInt32,
            0x48 => Self::UInt8,
            0x49 => Self::ComplexUInt8,
            0x50 => Self::UInt16,
            0x51 => Self::ComplexUInt16,
            0x60 => Self::UInt32,
            0x61 => Self::ComplexUInt32,
            _ => return None,
        })
    }

    /// The on-disk type code.
    #[inline]
    pub const fn code(self) -> i16 {
        self as i16
    }

    /// Size in bytes of one element (both parts for complex types).
    pub const fn item_size(self) -> usize {
        match self {
            Self::Text | Self::Int8 | Self::UInt8 => 1,
            Self::ComplexInt8 | Self::ComplexUInt8 | Self::Int16 | Self::UInt16 => 2,
            Self::Float32 | Self::Int32 | Self::UInt32 => 4,
            Self::ComplexInt16 | Self::ComplexUInt16 => 4,
            Self::Float64 | Self::Complex64 => 8,
            Self::ComplexInt32 | Self::ComplexUInt32 => 8,
            Self::Complex | Self::Complex128 => 16,
        }
    }

    #[inline]
    pub const fn is_complex(self) -> bool {
        self.code() & 0x01 != 0
    }

    #[inline]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }

    /// Short type name in numpy-like spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Complex => "complex128",
            Self::Float32 => "float32",
            Self::Complex64 => "complex64",
            Self::Float64 => "float64",
            Self::Complex128 => "complex128",
            Self::Int8 => "int8",
            Self::ComplexInt8 => "complex_int8",
            Self::Int16 => "int16",
            Self::ComplexInt16 => "complex_int16",
            Self::Int32 => "int32",
            Self::ComplexInt32 => "complex_int32",
            Self::UInt8 => "uint8",
            Self::ComplexUInt8 => "complex_uint8",
            Self::UInt16 => "uint16",
            Self::ComplexUInt16 => "complex_uint16",
            Self::UInt32 => "uint32",
            Self::ComplexUInt32 => "complex_uint32",
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
