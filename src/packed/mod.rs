//! IGOR packed experiment files (`.pxp`).
//!
//! A packed experiment is a flat sequence of records. Scanning yields
//! the records in file order; the data folder tree is rebuilt from the
//! folder start/end markers afterwards.
//!
//! ```ignore
//! use igor::packed::{load_packed, PackedOptions};
//!
//! let exp = load_packed("polar-graphs-demo.pxp", PackedOptions::default())?;
//! for (path, folder) in exp.root.walk() {
//!     println!("{}: {} waves", path, folder.waves().count());
//! }
//! ```

mod folder;
mod reader;

pub use folder::*;
pub use reader::*;

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::record::Record;
use crate::util::{open_file, Result};

/// Records of a packed experiment and the folder tree they describe.
#[derive(Clone, Debug)]
pub struct PackedExperiment {
    pub records: Vec<Record>,
    pub root: DataFolder,
}

/// Decode a packed experiment from a byte stream.
pub fn decode_packed<R: Read>(reader: R, options: PackedOptions) -> Result<PackedExperiment> {
    let records = scan_records(reader, &options)?;
    let root = build_folder_tree(&records)?;
    Ok(PackedExperiment { records, root })
}

/// Load a packed experiment from a file.
pub fn load_packed(path: impl AsRef<Path>, options: PackedOptions) -> Result<PackedExperiment> {
    let path = path.as_ref();
    debug!("loading packed experiment {}", path.display());
    let mut reader = open_file(path)?;
    decode_packed(&mut reader, options)
}
