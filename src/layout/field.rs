//! Field declarations.

use std::sync::Arc;

use byteorder::ByteOrder as Endian;

use super::{Structure, Value};
use crate::util::{Dimensions, Error, Result};

/// Fixed-size scalar stored in a field.
///
/// Sizes are the standard (packed, unaligned) sizes; pointer-valued
/// fields of the C headers are stored as 4-byte unsigned integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ScalarKind {
    /// Size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Char | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Classic struct format character.
    pub const fn code(self) -> char {
        match self {
            Self::Char => 'c',
            Self::Int8 => 'b',
            Self::UInt8 => 'B',
            Self::Int16 => 'h',
            Self::UInt16 => 'H',
            Self::Int32 => 'l',
            Self::UInt32 => 'L',
            Self::Int64 => 'q',
            Self::UInt64 => 'Q',
            Self::Float32 => 'f',
            Self::Float64 => 'd',
        }
    }

    /// Decode one scalar from the front of `buf`.
    pub(crate) fn read<E: Endian>(self, buf: &[u8]) -> Value {
        match self {
            Self::Char => Value::Char(buf[0]),
            Self::Int8 => Value::Int(i64::from(buf[0] as i8)),
            Self::UInt8 => Value::UInt(u64::from(buf[0])),
            Self::Int16 => Value::Int(i64::from(E::read_i16(buf))),
            Self::UInt16 => Value::UInt(u64::from(E::read_u16(buf))),
            Self::Int32 => Value::Int(i64::from(E::read_i32(buf))),
            Self::UInt32 => Value::UInt(u64::from(E::read_u32(buf))),
            Self::Int64 => Value::Int(E::read_i64(buf)),
            Self::UInt64 => Value::UInt(E::read_u64(buf)),
            Self::Float32 => Value::Float(f64::from(E::read_f32(buf))),
            Self::Float64 => Value::Float(E::read_f64(buf)),
        }
    }

    /// Encode one scalar onto the end of `out`.
    pub(crate) fn write<E: Endian>(self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let mut buf = [0u8; 8];
        let size = self.size();
        match self {
            Self::Float32 => E::write_f32(&mut buf, float_of(value)? as f32),
            Self::Float64 => E::write_f64(&mut buf, float_of(value)?),
            Self::Char | Self::Int8 | Self::UInt8 => buf[0] = int_of(value)? as u8,
            Self::Int16 | Self::UInt16 => E::write_u16(&mut buf, int_of(value)? as u16),
            Self::Int32 | Self::UInt32 => E::write_u32(&mut buf, int_of(value)? as u32),
            Self::Int64 | Self::UInt64 => E::write_u64(&mut buf, int_of(value)? as u64),
        }
        out.extend_from_slice(&buf[..size]);
        Ok(())
    }
}

fn int_of(value: &Value) -> Result<i128> {
    match *value {
        Value::Int(v) => Ok(i128::from(v)),
        Value::UInt(v) => Ok(i128::from(v)),
        Value::Char(v) => Ok(i128::from(v)),
        _ => Err(Error::invalid(format!("expected an integer, got {:?}", value))),
    }
}

fn float_of(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::invalid(format!("expected a number, got {:?}", value)))
}

/// Repetition of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Count {
    /// A single item, unpacked as a bare value
    Scalar,
    /// A one-dimensional array
    Fixed(usize),
    /// A multi-dimensional array, outer dimension first
    Shape(Dimensions),
}

impl Count {
    /// Number of repeated items.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Fixed(n) => *n,
            Self::Shape(d) => d.num_points(),
        }
    }

    /// Array shape, `None` for scalar fields.
    pub fn dims(&self) -> Option<Dimensions> {
        match self {
            Self::Scalar => None,
            Self::Fixed(n) => Some(Dimensions::d1(*n)),
            Self::Shape(d) => Some(d.clone()),
        }
    }
}

impl From<usize> for Count {
    fn from(n: usize) -> Self {
        if n == 1 {
            Self::Scalar
        } else {
            Self::Fixed(n)
        }
    }
}

impl<const N: usize> From<[usize; N]> for Count {
    fn from(shape: [usize; N]) -> Self {
        Self::Shape(Dimensions::from(shape))
    }
}

impl From<Dimensions> for Count {
    fn from(d: Dimensions) -> Self {
        Self::Shape(d)
    }
}

/// What a field stores.
#[derive(Clone, Debug)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Struct(Arc<Structure>),
}

impl From<ScalarKind> for FieldKind {
    fn from(k: ScalarKind) -> Self {
        Self::Scalar(k)
    }
}

impl From<Arc<Structure>> for FieldKind {
    fn from(s: Arc<Structure>) -> Self {
        Self::Struct(s)
    }
}

/// A named binary slot in a [`Structure`].
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    kind: FieldKind,
    count: Count,
    default: Option<Value>,
    help: Option<String>,
}

impl Field {
    pub fn new(kind: impl Into<FieldKind>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            count: Count::Scalar,
            default: None,
            help: None,
        }
    }

    /// Scalar field of `kind`.
    pub fn scalar(kind: ScalarKind, name: impl Into<String>) -> Self {
        Self::new(kind, name)
    }

    pub fn count(mut self, count: impl Into<Count>) -> Self {
        self.count = count.into();
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn repeat(&self) -> &Count {
        &self.count
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Number of repeated items.
    pub fn item_count(&self) -> usize {
        self.count.item_count()
    }

    /// Number of flat scalars one item contributes.
    pub fn structure_count(&self) -> usize {
        match &self.kind {
            FieldKind::Scalar(_) => 1,
            FieldKind::Struct(s) => s.flat_count(),
        }
    }

    /// Number of flat scalars the whole field contributes.
    pub fn total_count(&self) -> usize {
        self.item_count() * self.structure_count()
    }

    /// Bytes the field occupies.
    pub fn size(&self) -> usize {
        let item = match &self.kind {
            FieldKind::Scalar(k) => k.size(),
            FieldKind::Struct(s) => s.size(),
        };
        item * self.item_count()
    }

    /// Append the scalar codes of this field to `out`.
    pub(crate) fn push_codes(&self, out: &mut Vec<ScalarKind>) {
        for _ in 0..self.item_count() {
            match &self.kind {
                FieldKind::Scalar(k) => out.push(*k),
                FieldKind::Struct(s) => out.extend_from_slice(s.codes()),
            }
        }
    }

    /// Linearize the field's value into flat scalar arguments.
    ///
    /// Array elements are visited row-major; missing elements fall back
    /// to the field default.
    pub(crate) fn pack_data(&self, structure: &str, data: Option<&Value>, out: &mut Vec<Value>) -> Result<()> {
        match self.count.dims() {
            None => self.pack_item(structure, data, out),
            Some(dims) => {
                let n = dims.num_points();
                let mut index = vec![0usize; dims.rank()];
                for _ in 0..n {
                    let item = data.and_then(|d| d.at(&index));
                    self.pack_item(structure, item, out)?;
                    increment_row_major(&mut index, dims.sizes());
                }
                Ok(())
            }
        }
    }

    fn pack_item(&self, structure: &str, item: Option<&Value>, out: &mut Vec<Value>) -> Result<()> {
        match &self.kind {
            FieldKind::Struct(sub) => {
                let item = match item {
                    None => None,
                    Some(Value::Struct(s)) => Some(s),
                    Some(other) => {
                        return Err(Error::invalid(format!(
                            "{}.{}: expected a structure, got {:?}",
                            structure, self.name, other
                        )))
                    }
                };
                sub.pack_item(item, out)
            }
            FieldKind::Scalar(_) => {
                let value = match item {
                    Some(Value::Array(_)) | Some(Value::Struct(_)) => {
                        return Err(Error::invalid(format!(
                            "{}.{}: expected a scalar",
                            structure, self.name
                        )))
                    }
                    Some(v) => v.clone(),
                    None => self.default.clone().ok_or_else(|| Error::MissingValue {
                        structure: structure.to_string(),
                        field: self.name.clone(),
                    })?,
                };
                out.push(value);
                Ok(())
            }
        }
    }

    /// Inverse of [`pack_data`](Self::pack_data) for exactly
    /// [`total_count`](Self::total_count) flat values.
    pub(crate) fn unpack_data(&self, items: &[Value]) -> Value {
        let unpacked: Vec<Value> = match &self.kind {
            FieldKind::Scalar(_) => items.to_vec(),
            // break into per-structure clumps
            FieldKind::Struct(sub) => items
                .chunks(sub.flat_count().max(1))
                .take(self.item_count())
                .map(|clump| Value::Struct(sub.unpack_item(clump)))
                .collect(),
        };
        match self.count.dims() {
            None => unpacked.into_iter().next().unwrap_or(Value::Array(Vec::new())),
            Some(dims) => reshape(unpacked, dims.sizes()),
        }
    }
}

fn increment_row_major(index: &mut [usize], sizes: &[usize]) {
    for d in (0..index.len()).rev() {
        index[d] += 1;
        if index[d] < sizes[d] {
            return;
        }
        index[d] = 0;
    }
}

/// Nest a flat row-major list into arrays of the given sizes.
fn reshape(items: Vec<Value>, sizes: &[usize]) -> Value {
    match sizes {
        [] | [_] => Value::Array(items),
        [outer, inner @ ..] => {
            let stride: usize = inner.iter().product();
            if stride == 0 {
                return Value::Array((0..*outer).map(|_| reshape(Vec::new(), inner)).collect());
            }
            let mut rows = Vec::with_capacity(*outer);
            let mut iter = items.into_iter();
            for _ in 0..*outer {
                let chunk: Vec<Value> = iter.by_ref().take(stride).collect();
                rows.push(reshape(chunk, inner));
            }
            Value::Array(rows)
        }
    }
}
