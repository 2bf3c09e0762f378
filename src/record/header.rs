//! Packed experiment record headers and type codes.

use std::fmt;
use std::sync::LazyLock;

use crate::layout::ScalarKind::{Int16, Int32, UInt16};
use crate::layout::{Field, StructValue, Structure};
use crate::util::Result;

/// Record type = `recordType & PACKEDRECTYPE_MASK`.
pub const PACKEDRECTYPE_MASK: u16 = 0x7FFF;
/// Set if the record is superceded by a later record in the file.
pub const SUPERCEDED_MASK: u16 = 0x8000;

pub static PACKED_FILE_RECORD_HEADER: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "PackedFileRecordHeader",
        vec![
            Field::new(UInt16, "recordType").help("Record type plus superceded flag."),
            Field::new(Int16, "version").help("Version information depends on the type of record."),
            Field::new(Int32, "numDataBytes")
                .help("Number of data bytes in the record following this record header."),
        ],
    )
});

/// Kind of a packed experiment record.
///
/// Igor also writes pictures, page setups and other settings whose
/// format is undocumented; those map to [`RecordType::Unknown`] and are
/// skipped by readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    Unused,
    Variables,
    History,
    Wave,
    Recreation,
    Procedure,
    GetHistory,
    PackedFile,
    FolderStart,
    FolderEnd,
    Unknown(u16),
}

impl RecordType {
    /// Map a masked record type code.
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 | 6 => Self::Unused,
            1 => Self::Variables,
            2 => Self::History,
            3 => Self::Wave,
            4 => Self::Recreation,
            5 => Self::Procedure,
            7 => Self::GetHistory,
            8 => Self::PackedFile,
            9 => Self::FolderStart,
            10 => Self::FolderEnd,
            other => Self::Unknown(other),
        }
    }

    /// Types a reader should skip: unused slots and undocumented kinds.
    pub const fn is_opaque(self) -> bool {
        matches!(self, Self::Unused | Self::Unknown(_))
    }

    /// Record types whose payload is plain text.
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::History | Self::Recreation | Self::Procedure | Self::GetHistory
        )
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({})", code),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Decoded 8-byte record header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: RecordType,
    /// Raw `recordType` field, flag bit included
    pub raw_type: u16,
    pub superceded: bool,
    pub version: i16,
    pub num_data_bytes: i32,
}

impl RecordHeader {
    /// Build from an unpacked `PackedFileRecordHeader`.
    pub fn from_struct(value: &StructValue) -> Result<Self> {
        let raw_type = value.int("recordType")? as u16;
        Ok(Self {
            record_type: RecordType::from_code(raw_type & PACKEDRECTYPE_MASK),
            raw_type,
            superceded: raw_type & SUPERCEDED_MASK != 0,
            version: value.int("version")? as i16,
            num_data_bytes: value.int("numDataBytes")? as i32,
        })
    }
}
