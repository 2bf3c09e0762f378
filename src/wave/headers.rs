//! Binary wave header layouts (IGOR Technical Note 003).
//!
//! Pointer and handle fields are only meaningful in memory; on disk they
//! occupy four bytes and are declared as `UInt32`.

use std::sync::LazyLock;

use crate::layout::ScalarKind::{Char, Float32, Float64, Int16, Int32, UInt32};
use crate::layout::{Field, Structure};
use crate::util::{Error, Result, MAXDIMS};

/// Maximum length of a wave name in version 1–3 files, without the null.
pub const MAX_WAVE_NAME2: usize = 18;
/// Maximum length of a wave name in version 5 files, without the null.
pub const MAX_WAVE_NAME5: usize = 31;
/// Units fields hold up to three characters plus the null.
pub const MAX_UNIT_CHARS: usize = 3;

/// Bytes of sample data embedded at the end of `WaveHeader2`.
pub const WAVE_HEADER2_TAIL: usize = 16;
/// Bytes of sample data embedded at the end of `WaveHeader5`.
pub const WAVE_HEADER5_TAIL: usize = 4;
/// Zero padding after the samples of version 2 and 3 files.
pub const POST_DATA_PADDING: usize = 16;

/// Just the version field, used to probe byte order.
pub static BIN_HEADER_COMMON: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "BinHeaderCommon",
        vec![Field::new(Int16, "version").help("Version number for backwards compatibility.")],
    )
});

pub static BIN_HEADER1: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "BinHeader1",
        vec![
            Field::new(Int16, "version"),
            Field::new(Int32, "wfmSize")
                .help("The size of the WaveHeader2 data structure plus the wave data plus 16 bytes of padding."),
            Field::new(Int16, "checksum").help("Checksum over this header and the wave header."),
        ],
    )
});

pub static BIN_HEADER2: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "BinHeader2",
        vec![
            Field::new(Int16, "version"),
            Field::new(Int32, "wfmSize"),
            Field::new(Int32, "noteSize").help("The size of the note text."),
            Field::new(Int32, "pictSize").default(0i32).help("Reserved. Write zero. Ignore on read."),
            Field::new(Int16, "checksum"),
        ],
    )
});

pub static BIN_HEADER3: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "BinHeader3",
        vec![
            Field::new(Int16, "version"),
            Field::new(Int32, "wfmSize"),
            Field::new(Int32, "noteSize"),
            Field::new(Int32, "formulaSize").help("The size of the dependency formula, if any."),
            Field::new(Int32, "pictSize").default(0i32),
            Field::new(Int16, "checksum"),
        ],
    )
});

pub static BIN_HEADER5: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "BinHeader5",
        vec![
            Field::new(Int16, "version"),
            Field::new(Int16, "checksum"),
            Field::new(Int32, "wfmSize").help("The size of the WaveHeader5 data structure plus the wave data."),
            Field::new(Int32, "formulaSize"),
            Field::new(Int32, "noteSize"),
            Field::new(Int32, "dataEUnitsSize").help("The size of optional extended data units."),
            Field::new(Int32, "dimEUnitsSize").count(MAXDIMS),
            Field::new(Int32, "dimLabelsSize").count(MAXDIMS),
            Field::new(Int32, "sIndicesSize").help("The size of string indices if this is a text wave."),
            Field::new(Int32, "optionsSize1").default(0i32),
            Field::new(Int32, "optionsSize2").default(0i32),
        ],
    )
});

/// Header of version 1, 2 and 3 waves.
pub static WAVE_HEADER2: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "WaveHeader2",
        vec![
            Field::new(Int16, "type").help("See types (e.g. NT_FP64). Zero for text waves."),
            Field::new(UInt32, "next").default(0u32),
            Field::new(Char, "bname").count(MAX_WAVE_NAME2 + 2).help("Name of wave plus trailing null."),
            Field::new(Int16, "whVersion").default(0i16),
            Field::new(Int16, "srcFldr").default(0i16),
            Field::new(UInt32, "fileName").default(0u32),
            Field::new(Char, "dataUnits").count(MAX_UNIT_CHARS + 1).default(0i16),
            Field::new(Char, "xUnits").count(MAX_UNIT_CHARS + 1).default(0i16),
            Field::new(Int32, "npnts").help("Number of data points in wave."),
            Field::new(Int16, "aModified").default(0i16),
            Field::new(Float64, "hsA").help("X value for point p = hsA*p + hsB"),
            Field::new(Float64, "hsB"),
            Field::new(Int16, "wModified").default(0i16),
            Field::new(Int16, "swModified").default(0i16),
            Field::new(Int16, "fsValid").help("True if full scale values have meaning."),
            Field::new(Float64, "topFullScale"),
            Field::new(Float64, "botFullScale"),
            Field::new(Char, "useBits").default(0i16),
            Field::new(Char, "kindBits").default(0i16),
            Field::new(UInt32, "formula").default(0u32),
            Field::new(Int32, "depID").default(0i32),
            Field::new(UInt32, "creationDate").help("DateTime of creation. Not used in version 1 files."),
            Field::new(Char, "wUnused").count(2).default(0i16),
            Field::new(UInt32, "modDate"),
            Field::new(UInt32, "waveNoteH").default(0u32),
            Field::new(Float32, "wData").count(4).help("The start of the array of waveform data."),
        ],
    )
    .with_zero_point_recovery()
});

/// Header of version 5 waves.
pub static WAVE_HEADER5: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "WaveHeader5",
        vec![
            Field::new(UInt32, "next").default(0u32).help("Link to next wave in linked list."),
            Field::new(UInt32, "creationDate"),
            Field::new(UInt32, "modDate"),
            Field::new(Int32, "npnts").help("Total number of points (multiply dimensions up to first zero)."),
            Field::new(Int16, "type"),
            Field::new(Int16, "dLock").default(0i16),
            Field::new(Char, "whpad1").count(6).default(0i16),
            Field::new(Int16, "whVersion").default(1i16),
            Field::new(Char, "bname").count(MAX_WAVE_NAME5 + 1),
            Field::new(Int32, "whpad2").default(0i32),
            Field::new(UInt32, "dFolder").default(0u32),
            // Dimensioning info. [0] == rows, [1] == cols etc
            Field::new(Int32, "nDim").count(MAXDIMS).help("Number of items in a dimension -- 0 means no data."),
            Field::new(Float64, "sfA").count(MAXDIMS).help("Index value for element e of dimension d = sfA[d]*e + sfB[d]."),
            Field::new(Float64, "sfB").count(MAXDIMS),
            // SI units
            Field::new(Char, "dataUnits").count(MAX_UNIT_CHARS + 1).default(0i16),
            Field::new(Char, "dimUnits").count([MAXDIMS, MAX_UNIT_CHARS + 1]).default(0i16),
            Field::new(Int16, "fsValid"),
            Field::new(Int16, "whpad3").default(0i16),
            Field::new(Float64, "topFullScale"),
            Field::new(Float64, "botFullScale"),
            Field::new(UInt32, "dataEUnits").default(0u32),
            Field::new(UInt32, "dimEUnits").count(MAXDIMS).default(0u32),
            Field::new(UInt32, "dimLabels").count(MAXDIMS).default(0u32),
            Field::new(UInt32, "waveNoteH").default(0u32),
            Field::new(Int32, "whUnused").count(16).default(0i32),
            // private to Igor
            Field::new(Int16, "aModified").default(0i16),
            Field::new(Int16, "wModified").default(0i16),
            Field::new(Int16, "swModified").default(0i16),
            Field::new(Char, "useBits").default(0i16),
            Field::new(Char, "kindBits").default(0i16),
            Field::new(UInt32, "formula").default(0u32),
            Field::new(Int32, "depID").default(0i32),
            Field::new(Int16, "whpad4").default(0i16),
            Field::new(Int16, "srcFldr").default(0i16),
            Field::new(UInt32, "fileName").default(0u32),
            Field::new(UInt32, "sIndices").default(0u32),
            Field::new(Float32, "wData").count(WAVE_HEADER5_TAIL / 4).help("The start of the array of data."),
        ],
    )
    .with_zero_point_recovery()
});

/// Layouts selected by a binary wave version.
#[derive(Clone, Copy, Debug)]
pub struct VersionLayout {
    pub version: i16,
    pub bin: &'static Structure,
    pub wave: &'static Structure,
    /// Bytes of `bin + wave` covered by the checksum.
    pub checksum_size: usize,
    /// Sample bytes already embedded at the end of the wave header.
    pub tail: usize,
}

impl VersionLayout {
    /// Select the header layouts for a file version.
    pub fn for_version(version: i16) -> Result<Self> {
        let (bin, wave, tail): (&'static Structure, &'static Structure, usize) = match version {
            1 => (&*BIN_HEADER1, &*WAVE_HEADER2, WAVE_HEADER2_TAIL),
            2 => (&*BIN_HEADER2, &*WAVE_HEADER2, WAVE_HEADER2_TAIL),
            3 => (&*BIN_HEADER3, &*WAVE_HEADER2, WAVE_HEADER2_TAIL),
            5 => (&*BIN_HEADER5, &*WAVE_HEADER5, WAVE_HEADER5_TAIL),
            _ => {
                return Err(Error::UnsupportedVersion {
                    what: "binary wave",
                    version: i32::from(version),
                })
            }
        };
        let mut checksum_size = bin.size() + wave.size();
        if version == 5 {
            // the version 5 checksum does not include the wData field
            checksum_size -= WAVE_HEADER5_TAIL;
        }
        Ok(Self {
            version,
            bin,
            wave,
            checksum_size,
            tail,
        })
    }

    /// Bytes of both headers, `wData` tail included.
    pub fn header_size(&self) -> usize {
        self.bin.size() + self.wave.size()
    }

    /// Wave header size without its `wData` tail.
    pub fn wave_header_prefix(&self) -> usize {
        self.wave.size() - self.tail
    }

    /// Sample bytes described by `wfmSize`.
    ///
    /// For versions 1–3 `wfmSize` also counts the `wData` tail and the
    /// 16 bytes of padding that follow the samples.
    pub fn data_size(&self, wfm_size: i64) -> i64 {
        if self.version == 5 {
            wfm_size - self.wave_header_prefix() as i64
        } else {
            wfm_size - self.wave.size() as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_header_sizes() {
        assert_eq!(BIN_HEADER_COMMON.size(), 2);
        assert_eq!(BIN_HEADER1.size(), 8);
        assert_eq!(BIN_HEADER2.size(), 16);
        assert_eq!(BIN_HEADER3.size(), 20);
        assert_eq!(BIN_HEADER5.size(), 64);
    }

    #[test]
    fn test_wave_header_sizes() {
        assert_eq!(WAVE_HEADER2.size(), 126);
        assert_eq!(WAVE_HEADER5.size(), 324);
        assert_eq!(WAVE_HEADER2.offset_of("wData"), Some(110));
        assert_eq!(WAVE_HEADER5.offset_of("wData"), Some(320));
        assert_eq!(WAVE_HEADER5.offset_of("nDim"), Some(68));
    }

    #[test]
    fn test_version_layouts() {
        let v2 = VersionLayout::for_version(2).unwrap();
        assert_eq!(v2.checksum_size, 142);
        assert_eq!(v2.data_size(166), 40);
        let v5 = VersionLayout::for_version(5).unwrap();
        assert_eq!(v5.checksum_size, 384);
        assert_eq!(v5.data_size(338), 18);
        assert!(matches!(
            VersionLayout::for_version(4),
            Err(Error::UnsupportedVersion { version: 4, .. })
        ));
    }
}
