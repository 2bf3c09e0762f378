//! Structure declarations and pack/unpack.

use byteorder::{BigEndian, LittleEndian};
use tracing::trace;

use super::{Field, ScalarKind, StructValue, Value};
use crate::util::{ByteOrder, Error, Result};

/// An ordered list of fields describing one fixed-size binary record.
///
/// The layout is immutable; the byte order is chosen per call, so one
/// `Structure` can be shared between threads and files of either order.
#[derive(Clone, Debug)]
pub struct Structure {
    name: String,
    fields: Vec<Field>,
    codes: Vec<ScalarKind>,
    size: usize,
    zero_point_recovery: bool,
}

impl Structure {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        let mut codes = Vec::new();
        for f in &fields {
            f.push_codes(&mut codes);
        }
        let size = codes.iter().map(|k| k.size()).sum();
        Self {
            name: name.into(),
            fields,
            codes,
            size,
            zero_point_recovery: false,
        }
    }

    /// Allow a short buffer when the trailing sample field is absent.
    ///
    /// Wave headers of zero-point waves may stop before their `wData`
    /// field. A structure flagged here pads a short buffer with zeros and
    /// accepts the result only if its `npnts` field is zero.
    pub fn with_zero_point_recovery(mut self) -> Self {
        self.zero_point_recovery = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Packed size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of flat scalars.
    #[inline]
    pub fn flat_count(&self) -> usize {
        self.codes.len()
    }

    pub(crate) fn codes(&self) -> &[ScalarKind] {
        &self.codes
    }

    /// Flat format descriptor in classic struct notation, e.g. `<hlh`.
    pub fn format(&self, order: ByteOrder) -> String {
        let mut s = String::with_capacity(self.codes.len() + 1);
        s.push(order.prefix());
        s.extend(self.codes.iter().map(|k| k.code()));
        s
    }

    /// Byte offset of a top-level field.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for f in &self.fields {
            if f.name() == name {
                return Some(offset);
            }
            offset += f.size();
        }
        None
    }

    // === Packing ===

    /// Pack `value` into a new buffer of exactly [`size`](Self::size) bytes.
    pub fn pack(&self, value: &StructValue, order: ByteOrder) -> Result<Vec<u8>> {
        let mut args = Vec::with_capacity(self.codes.len());
        self.pack_item(Some(value), &mut args)?;
        let mut out = Vec::with_capacity(self.size);
        if order.is_little() {
            self.encode::<LittleEndian>(&args, &mut out)?;
        } else {
            self.encode::<BigEndian>(&args, &mut out)?;
        }
        Ok(out)
    }

    /// Pack `value` into `buf` at `offset`.
    pub fn pack_into(&self, buf: &mut [u8], offset: usize, value: &StructValue, order: ByteOrder) -> Result<()> {
        let available = buf.len().saturating_sub(offset);
        if available < self.size {
            return Err(Error::short(&self.name, self.size, available));
        }
        let bytes = self.pack(value, order)?;
        buf[offset..offset + self.size].copy_from_slice(&bytes);
        Ok(())
    }

    /// Linearize one structure value into flat scalar arguments.
    pub(crate) fn pack_item(&self, item: Option<&StructValue>, out: &mut Vec<Value>) -> Result<()> {
        for f in &self.fields {
            let data = item.and_then(|s| s.get(f.name()));
            f.pack_data(&self.name, data, out)?;
        }
        Ok(())
    }

    fn encode<E: byteorder::ByteOrder>(&self, args: &[Value], out: &mut Vec<u8>) -> Result<()> {
        for (kind, value) in self.codes.iter().zip(args) {
            kind.write::<E>(value, out)?;
        }
        Ok(())
    }

    // === Unpacking ===

    /// Unpack a value from the start of `buf`.
    pub fn unpack(&self, buf: &[u8], order: ByteOrder) -> Result<StructValue> {
        self.unpack_from(buf, 0, order)
    }

    /// Unpack a value from `buf` at `offset`, consuming exactly
    /// [`size`](Self::size) bytes.
    pub fn unpack_from(&self, buf: &[u8], offset: usize, order: ByteOrder) -> Result<StructValue> {
        let available = buf.len().saturating_sub(offset);
        if available >= self.size {
            return Ok(self.decode(&buf[offset..offset + self.size], order));
        }
        let err = Error::short(&self.name, self.size, available);
        if !self.zero_point_recovery {
            return Err(err);
        }
        // missing wData? pad with zeros and require an empty wave
        trace!("{}: padding {} missing bytes", self.name, self.size - available);
        let mut padded = buf.get(offset..).unwrap_or(&[]).to_vec();
        padded.resize(self.size, 0);
        let value = self.decode(&padded, order);
        match value.int("npnts") {
            Ok(0) => Ok(value),
            _ => Err(err),
        }
    }

    fn decode(&self, bytes: &[u8], order: ByteOrder) -> StructValue {
        let args = if order.is_little() {
            self.decode_args::<LittleEndian>(bytes)
        } else {
            self.decode_args::<BigEndian>(bytes)
        };
        self.unpack_item(&args)
    }

    fn decode_args<E: byteorder::ByteOrder>(&self, bytes: &[u8]) -> Vec<Value> {
        let mut args = Vec::with_capacity(self.codes.len());
        let mut pos = 0;
        for kind in &self.codes {
            args.push(kind.read::<E>(&bytes[pos..]));
            pos += kind.size();
        }
        args
    }

    /// Inverse of [`pack_item`](Self::pack_item).
    pub(crate) fn unpack_item(&self, args: &[Value]) -> StructValue {
        let mut data = StructValue::new();
        let mut pos = 0;
        for f in &self.fields {
            let n = f.total_count();
            data.insert(f.name(), f.unpack_data(&args[pos..pos + n]));
            pos += n;
        }
        data
    }
}
