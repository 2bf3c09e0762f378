//! Record scanning.

use std::io::Read;

use tracing::{debug, trace, warn};

use crate::record::{Record, RecordHeader, PACKEDRECTYPE_MASK, PACKED_FILE_RECORD_HEADER};
use crate::util::{byte_order, need_to_reorder_bytes, read_at_most, read_up_to, ByteOrder, Error, Result};

/// Options for reading packed experiments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedOptions {
    /// Fail on a record whose payload is cut short by the end of the
    /// stream, instead of keeping the bytes that are there.
    pub strict: bool,
    /// Keep unused and unknown records as opaque records instead of
    /// failing with [`Error::UnknownRecordType`].
    pub ignore_unknown: bool,
}

impl Default for PackedOptions {
    fn default() -> Self {
        Self {
            strict: true,
            ignore_unknown: true,
        }
    }
}

impl PackedOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn ignore_unknown(mut self, ignore: bool) -> Self {
        self.ignore_unknown = ignore;
        self
    }
}

/// Read every record of a packed experiment stream.
///
/// The byte order is detected once, from the first record header with a
/// non-zero version. Records before that are read in native order.
pub fn scan_records<R: Read>(mut reader: R, options: &PackedOptions) -> Result<Vec<Record>> {
    let header_size = PACKED_FILE_RECORD_HEADER.size();
    let mut records = Vec::new();
    let mut order: Option<ByteOrder> = None;
    let mut buf = vec![0u8; header_size];
    loop {
        let got = read_up_to(&mut reader, &mut buf)?;
        if got == 0 {
            break;
        }
        let mut value = PACKED_FILE_RECORD_HEADER.unpack(&buf[..got], order.unwrap_or_default())?;
        let version = value.int("version")? as i16;
        if version != 0 && order.is_none() {
            let reorder = need_to_reorder_bytes(version);
            let detected = byte_order(reorder);
            debug!("packed experiment byte order: {}", detected);
            order = Some(detected);
            if reorder {
                value = PACKED_FILE_RECORD_HEADER.unpack(&buf, detected)?;
            }
        }
        let header = RecordHeader::from_struct(&value)?;
        trace!(
            "record {} type {} version {} ({} bytes)",
            records.len(),
            header.record_type,
            header.version,
            header.num_data_bytes
        );

        if header.record_type.is_opaque() && !options.ignore_unknown {
            return Err(Error::UnknownRecordType(header.raw_type & PACKEDRECTYPE_MASK));
        }

        let len = usize::try_from(header.num_data_bytes).map_err(|_| {
            Error::invalid(format!("negative record length {}", header.num_data_bytes))
        })?;
        let data = read_at_most(&mut reader, len)?;
        if data.len() < len {
            if options.strict {
                return Err(Error::short("record data", len, data.len()));
            }
            warn!("record {} truncated: {} of {} bytes", records.len(), data.len(), len);
        }
        records.push(Record::decode(header, order, data)?);
    }
    debug!("read {} records", records.len());
    Ok(records)
}
