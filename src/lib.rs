//! # IGOR
//!
//! Readers for WaveMetrics IGOR Pro binary wave (`.ibw`) and packed
//! experiment (`.pxp`) files.
//!
//! Both formats are built from fixed-size C structures whose byte order
//! is whatever the writing machine used. The [`layout`] module declares
//! those structures once and decodes them in either order; [`wave`] and
//! [`packed`] are the two file readers on top of it.
//!
//! ## Modules
//!
//! - [`util`] - Errors, byte order detection, checksums, shapes, type codes
//! - [`layout`] - Declarative binary structure layouts
//! - [`wave`] - Binary wave decoding
//! - [`record`] - Packed experiment records (variables, waves, folders, text)
//! - [`packed`] - Packed experiment scanning and the data folder tree
//!
//! ## Example
//!
//! ```ignore
//! use igor::prelude::*;
//!
//! let wave = load_wave("mac-double.ibw", true)?;
//! println!("{}: {:?}", wave.name(), wave.data.to_f64_vec());
//!
//! let exp = load_packed("polar-graphs-demo.pxp", PackedOptions::default())?;
//! for wave in exp.root.waves() {
//!     println!("{}", wave.name());
//! }
//! ```

pub mod util;
pub mod layout;
pub mod wave;
pub mod record;
pub mod packed;

// Re-export commonly used types
pub use util::{ByteOrder, Error, NumericType, Result};
pub use wave::{decode_wave, load_wave, BinaryWave};
pub use packed::{decode_packed, load_packed, PackedExperiment, PackedOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{ByteOrder, Dimensions, Error, NumericType, Result};
    pub use crate::layout::{Field, ScalarKind, StructValue, Structure, Value};
    pub use crate::wave::{decode_wave, load_wave, BinaryWave, WaveArray, WaveValues};
    pub use crate::record::{NumericValue, Record, RecordKind, RecordType, Variables};
    pub use crate::packed::{
        build_folder_tree, decode_packed, load_packed, scan_records, DataFolder, FolderEntry, PackedExperiment,
        PackedOptions,
    };
}
