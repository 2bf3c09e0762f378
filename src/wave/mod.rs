//! IGOR binary wave files.
//!
//! A binary wave holds one array of samples plus its headers and optional
//! note, dependency formula, extended units and dimension labels. Versions
//! 1, 2, 3 and 5 are supported.
//!
//! # Example
//!
//! ```ignore
//! use igor::wave::load_wave;
//!
//! let wave = load_wave("mac-double.ibw", true)?;
//! println!("{} {} {}", wave.name(), wave.numeric_type().unwrap(), wave.shape());
//! ```

mod array;
pub mod headers;
mod reader;

pub use array::*;
pub use reader::{decode_wave, load_wave};

use crate::layout::StructValue;
use crate::util::{ByteOrder, Dimensions, NumericType};

/// Optional sections that follow the samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveSections {
    /// Wave note (versions 2, 3, 5)
    pub note: String,
    /// Dependency formula (versions 3, 5)
    pub formula: String,
    /// Extended data units (version 5)
    pub data_e_units: String,
    /// Extended units of each dimension (version 5)
    pub dim_e_units: Vec<String>,
    /// Labels of each dimension (version 5)
    pub dim_labels: Vec<Vec<String>>,
    /// End offsets of the strings of a version 5 text wave
    pub string_indices: Vec<i32>,
}

/// A decoded binary wave.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryWave {
    pub version: i16,
    /// Concrete byte order the file was written in
    pub byte_order: ByteOrder,
    pub bin_header: StructValue,
    pub wave_header: StructValue,
    pub sections: WaveSections,
    pub data: WaveArray,
}

impl BinaryWave {
    /// Wave name from the `bname` field.
    pub fn name(&self) -> String {
        self.wave_header.string("bname").unwrap_or_default()
    }

    pub fn npnts(&self) -> i64 {
        self.wave_header.int("npnts").unwrap_or(0)
    }

    /// Raw numeric type code.
    pub fn type_code(&self) -> i16 {
        self.wave_header.int("type").unwrap_or(0) as i16
    }

    /// Element type; `None` for formula waves with an unknown code.
    pub fn numeric_type(&self) -> Option<NumericType> {
        NumericType::from_code(self.type_code())
    }

    pub fn checksum(&self) -> i64 {
        self.bin_header.int("checksum").unwrap_or(0)
    }

    pub fn note(&self) -> &str {
        &self.sections.note
    }

    pub fn formula(&self) -> &str {
        &self.sections.formula
    }

    pub fn shape(&self) -> &Dimensions {
        &self.data.shape
    }

    /// Data units: the extended units when present, else the short field.
    pub fn data_units(&self) -> String {
        if !self.sections.data_e_units.is_empty() {
            return self.sections.data_e_units.clone();
        }
        self.wave_header.string("dataUnits").unwrap_or_default()
    }

    /// Headers and sections as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "version": self.version,
            "byte_order": self.byte_order.to_string(),
            "bin_header": self.bin_header.to_json(),
            "wave_header": self.wave_header.to_json(),
            "note": self.sections.note,
            "formula": self.sections.formula,
            "data_e_units": self.sections.data_e_units,
            "dim_e_units": self.sections.dim_e_units,
            "dim_labels": self.sections.dim_labels,
            "shape": self.data.shape.sizes(),
        })
    }
}
