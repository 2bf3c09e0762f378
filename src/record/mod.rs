//! Packed experiment records.
//!
//! Each record is an 8-byte [`RecordHeader`] followed by `numDataBytes`
//! of payload. Payloads of known kinds are decoded when the record is
//! built; everything else is kept as raw bytes.

mod header;
mod variables;

pub use header::*;
pub use variables::*;

use std::io::Cursor;
use std::sync::Arc;

use tracing::debug;

use crate::layout::{latin1, null_terminated};
use crate::util::{ByteOrder, Result};
use crate::wave::{decode_wave, BinaryWave};

/// Text-bearing record kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextKind {
    History,
    Recreation,
    Procedure,
    GetHistory,
}

/// Decoded payload of a record.
#[derive(Clone, Debug)]
pub enum RecordKind {
    Variables(Arc<Variables>),
    Wave(Arc<BinaryWave>),
    /// Folder name
    FolderStart(String),
    FolderEnd,
    Text(TextKind),
    PackedFile,
    Unused,
    Unknown,
}

/// One record of a packed experiment file.
#[derive(Clone, Debug)]
pub struct Record {
    pub header: RecordHeader,
    /// File byte order, once known
    pub byte_order: Option<ByteOrder>,
    /// Raw payload
    pub data: Vec<u8>,
    pub kind: RecordKind,
}

impl Record {
    /// Decode the payload of a record.
    ///
    /// Embedded waves are decoded leniently: their post-data padding is
    /// only checked for a warning.
    pub fn decode(header: RecordHeader, byte_order: Option<ByteOrder>, data: Vec<u8>) -> Result<Self> {
        let mut byte_order = byte_order;
        let kind = match header.record_type {
            RecordType::Variables => {
                let (vars, order) = decode_variables(&data, byte_order)?;
                byte_order.get_or_insert(order);
                RecordKind::Variables(Arc::new(vars))
            }
            RecordType::Wave => RecordKind::Wave(Arc::new(decode_wave(Cursor::new(&data), false)?)),
            RecordType::FolderStart => RecordKind::FolderStart(null_terminated(&data)),
            RecordType::FolderEnd => RecordKind::FolderEnd,
            RecordType::History => RecordKind::Text(TextKind::History),
            RecordType::Recreation => RecordKind::Text(TextKind::Recreation),
            RecordType::Procedure => RecordKind::Text(TextKind::Procedure),
            RecordType::GetHistory => RecordKind::Text(TextKind::GetHistory),
            RecordType::PackedFile => RecordKind::PackedFile,
            RecordType::Unused => RecordKind::Unused,
            RecordType::Unknown(code) => {
                debug!("keeping unknown record type {} ({} bytes)", code, data.len());
                RecordKind::Unknown
            }
        };
        Ok(Self {
            header,
            byte_order,
            data,
            kind,
        })
    }

    #[inline]
    pub fn record_type(&self) -> RecordType {
        self.header.record_type
    }

    /// Payload text with `\r\n` and `\r` line endings turned into `\n`,
    /// for text-bearing records.
    pub fn text(&self) -> Option<String> {
        match self.kind {
            RecordKind::Text(_) => Some(normalize_newlines(&latin1(&self.data))),
            _ => None,
        }
    }

    pub fn wave(&self) -> Option<&Arc<BinaryWave>> {
        match &self.kind {
            RecordKind::Wave(w) => Some(w),
            _ => None,
        }
    }

    pub fn variables(&self) -> Option<&Arc<Variables>> {
        match &self.kind {
            RecordKind::Variables(v) => Some(v),
            _ => None,
        }
    }

    pub fn folder_name(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::FolderStart(name) => Some(name),
            _ => None,
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(code: u16, len: usize) -> RecordHeader {
        RecordHeader {
            record_type: RecordType::from_code(code),
            raw_type: code,
            superceded: false,
            version: 0,
            num_data_bytes: len as i32,
        }
    }

    #[test]
    fn test_text_record() {
        let data = b"a\r\nb\rc\n".to_vec();
        let r = Record::decode(header(5, data.len()), None, data).unwrap();
        assert!(matches!(r.kind, RecordKind::Text(TextKind::Procedure)));
        assert_eq!(r.text().as_deref(), Some("a\nb\nc\n"));
    }

    #[test]
    fn test_folder_start() {
        let data = b"sub\0junk".to_vec();
        let r = Record::decode(header(9, data.len()), Some(ByteOrder::Big), data).unwrap();
        assert_eq!(r.folder_name(), Some("sub"));
        assert_eq!(r.text(), None);
    }

    #[test]
    fn test_unknown_record_kept() {
        let r = Record::decode(header(42, 3), None, vec![1, 2, 3]).unwrap();
        assert!(matches!(r.kind, RecordKind::Unknown));
        assert_eq!(r.record_type(), RecordType::Unknown(42));
        assert_eq!(r.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_variables_detects_order() {
        // version 1, no variables, big-endian
        let data = vec![0, 1, 0, 0, 0, 0, 0, 0];
        let r = Record::decode(header(1, data.len()), None, data).unwrap();
        assert_eq!(r.byte_order, Some(ByteOrder::Big));
        assert_eq!(r.variables().unwrap().version, 1);
    }
}
