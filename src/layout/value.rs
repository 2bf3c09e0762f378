//! Structured values produced by unpacking a [`Structure`](super::Structure).

use serde_json::json;

use crate::util::{Error, Result};

/// One node of an unpacked value tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Signed integer field
    Int(i64),
    /// Unsigned integer field
    UInt(u64),
    /// Floating point field
    Float(f64),
    /// Single `char` byte
    Char(u8),
    /// Repeated field, nested once per declared dimension
    Array(Vec<Value>),
    /// Nested structure
    Struct(StructValue),
}

impl Value {
    /// Build a char array from raw bytes.
    pub fn chars(bytes: &[u8]) -> Self {
        Self::Array(bytes.iter().map(|&b| Self::Char(b)).collect())
    }

    /// Build an array from anything convertible to values.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Integer view of a scalar, if it has one.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Char(v) => Some(i64::from(v)),
            _ => None,
        }
    }

    /// Unsigned view of a scalar, if it has one.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Int(v) => u64::try_from(v).ok(),
            Self::UInt(v) => Some(v),
            Self::Char(v) => Some(u64::from(v)),
            _ => None,
        }
    }

    /// Float view of a numeric scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Char(v) => Some(f64::from(v)),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Element at a multi-dimensional index; an empty index is `self`.
    pub fn at(&self, index: &[usize]) -> Option<&Value> {
        match index.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.as_array()?.get(i)?.at(rest),
        }
    }

    /// Leaf scalars in row-major order.
    pub fn flatten(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Value>) {
        match self {
            Self::Array(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    /// JSON rendering; char arrays become strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Int(v) => json!(v),
            Self::UInt(v) => json!(v),
            Self::Float(v) => json!(v),
            Self::Char(v) => json!(latin1(&[*v])),
            Self::Array(items) => {
                if !items.is_empty() && items.iter().all(|i| matches!(i, Self::Char(_))) {
                    let bytes: Vec<u8> = items.iter().filter_map(|i| i.as_u64().map(|b| b as u8)).collect();
                    json!(null_terminated(&bytes))
                } else {
                    serde_json::Value::Array(items.iter().map(Self::to_json).collect())
                }
            }
            Self::Struct(s) => s.to_json(),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Self::Struct(v)
    }
}

/// Decode bytes as Latin-1, one char per byte.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Latin-1 text up to the first null byte.
pub fn null_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    latin1(&bytes[..end])
}

/// Named field values of one structure, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::invalid(format!("missing field '{}'", name)))
    }

    fn mismatch(name: &str, expected: &str) -> Error {
        Error::invalid(format!("field '{}' is not {}", name, expected))
    }

    /// Signed integer field.
    pub fn int(&self, name: &str) -> Result<i64> {
        self.require(name)?
            .as_i64()
            .ok_or_else(|| Self::mismatch(name, "an integer"))
    }

    /// Unsigned integer field.
    pub fn uint(&self, name: &str) -> Result<u64> {
        self.require(name)?
            .as_u64()
            .ok_or_else(|| Self::mismatch(name, "an unsigned integer"))
    }

    /// Floating point field (integers are widened).
    pub fn float(&self, name: &str) -> Result<f64> {
        self.require(name)?
            .as_f64()
            .ok_or_else(|| Self::mismatch(name, "a number"))
    }

    /// Integer array field, flattened row-major.
    pub fn ints(&self, name: &str) -> Result<Vec<i64>> {
        self.require(name)?
            .flatten()
            .into_iter()
            .map(|v| v.as_i64().ok_or_else(|| Self::mismatch(name, "an integer array")))
            .collect()
    }

    /// Float array field, flattened row-major.
    pub fn floats(&self, name: &str) -> Result<Vec<f64>> {
        self.require(name)?
            .flatten()
            .into_iter()
            .map(|v| v.as_f64().ok_or_else(|| Self::mismatch(name, "a number array")))
            .collect()
    }

    /// Raw bytes of a char array field.
    pub fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        self.require(name)?
            .flatten()
            .into_iter()
            .map(|v| match v {
                Value::Char(b) => Ok(*b),
                _ => Err(Self::mismatch(name, "a char array")),
            })
            .collect()
    }

    /// Null-terminated string held in a char array field.
    pub fn string(&self, name: &str) -> Result<String> {
        Ok(null_terminated(&self.bytes(name)?))
    }

    /// Nested structure field.
    pub fn structure(&self, name: &str) -> Result<&StructValue> {
        self.require(name)?
            .as_struct()
            .ok_or_else(|| Self::mismatch(name, "a structure"))
    }

    /// JSON object rendering in declaration order.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}
