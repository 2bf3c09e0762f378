//! Data folder tree rebuilt from a flat record sequence.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::record::{Record, RecordKind, Variables};
use crate::util::{Error, Result};
use crate::wave::BinaryWave;

/// Name of the implicit top-level folder.
pub const ROOT_FOLDER: &str = "root";

/// One child of a data folder.
#[derive(Clone, Debug)]
pub enum FolderEntry {
    Folder(DataFolder),
    Wave(Arc<BinaryWave>),
    Variables(Arc<Variables>),
}

/// A named namespace of waves, variables and sub-folders.
#[derive(Clone, Debug, Default)]
pub struct DataFolder {
    pub name: String,
    /// Children in record order
    pub entries: Vec<FolderEntry>,
}

impl DataFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Direct sub-folder by name.
    pub fn folder(&self, name: &str) -> Option<&DataFolder> {
        self.folders().find(|f| f.name == name)
    }

    /// Sub-folder by a `:`-separated path relative to this folder.
    pub fn folder_path(&self, path: &str) -> Option<&DataFolder> {
        path.split(':')
            .filter(|p| !p.is_empty())
            .try_fold(self, |f, name| f.folder(name))
    }

    pub fn folders(&self) -> impl Iterator<Item = &DataFolder> {
        self.entries.iter().filter_map(|e| match e {
            FolderEntry::Folder(f) => Some(f),
            _ => None,
        })
    }

    pub fn waves(&self) -> impl Iterator<Item = &Arc<BinaryWave>> {
        self.entries.iter().filter_map(|e| match e {
            FolderEntry::Wave(w) => Some(w),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &Arc<Variables>> {
        self.entries.iter().filter_map(|e| match e {
            FolderEntry::Variables(v) => Some(v),
            _ => None,
        })
    }

    /// Wave in this folder by name.
    pub fn wave(&self, name: &str) -> Option<&Arc<BinaryWave>> {
        self.waves().find(|w| w.name() == name)
    }

    /// This folder and all sub-folders, depth first, each with its
    /// `:`-joined path.
    pub fn walk(&self) -> Vec<(String, &DataFolder)> {
        let mut out = Vec::new();
        self.walk_into(self.name.clone(), &mut out);
        out
    }

    fn walk_into<'a>(&'a self, path: String, out: &mut Vec<(String, &'a DataFolder)>) {
        out.push((path.clone(), self));
        for child in self.folders() {
            child.walk_into(format!("{}:{}", path, child.name), out);
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|e| match e {
                FolderEntry::Folder(f) => f.to_json(),
                FolderEntry::Wave(w) => serde_json::json!({ "wave": w.name() }),
                FolderEntry::Variables(v) => serde_json::json!({ "variables": v.to_json() }),
            })
            .collect();
        serde_json::json!({ "folder": self.name, "entries": entries })
    }
}

/// An open folder on the build stack, with the position it was taken
/// from when an existing sibling is re-entered.
struct OpenFolder {
    folder: DataFolder,
    slot: Option<usize>,
}

fn close(stack: &mut Vec<OpenFolder>) -> Result<()> {
    if stack.len() <= 1 {
        return Err(Error::UnbalancedFolder);
    }
    let OpenFolder { folder, slot } = stack.pop().ok_or(Error::UnbalancedFolder)?;
    let parent = &mut stack.last_mut().ok_or(Error::UnbalancedFolder)?.folder;
    let entry = FolderEntry::Folder(folder);
    match slot {
        Some(i) => parent.entries.insert(i, entry),
        None => parent.entries.push(entry),
    }
    Ok(())
}

/// Rebuild the folder tree from records in file order.
///
/// Folder start records open a sub-folder of the innermost open folder
/// (re-entering an existing sub-folder of the same name), folder end
/// records close it, and wave and variables records are added to the
/// innermost open folder. Other records do not affect the tree. Folders
/// still open at the end are closed.
pub fn build_folder_tree(records: &[Record]) -> Result<DataFolder> {
    let mut stack = vec![OpenFolder {
        folder: DataFolder::new(ROOT_FOLDER),
        slot: None,
    }];
    for record in records {
        match &record.kind {
            RecordKind::FolderStart(name) => {
                trace!("enter folder {}", name);
                let parent = &mut stack.last_mut().ok_or(Error::UnbalancedFolder)?.folder;
                let existing = parent
                    .entries
                    .iter()
                    .position(|e| matches!(e, FolderEntry::Folder(f) if f.name == *name));
                let open = match existing.map(|i| (i, parent.entries.remove(i))) {
                    Some((i, FolderEntry::Folder(folder))) => OpenFolder { folder, slot: Some(i) },
                    _ => OpenFolder {
                        folder: DataFolder::new(name.clone()),
                        slot: None,
                    },
                };
                stack.push(open);
            }
            RecordKind::FolderEnd => close(&mut stack)?,
            RecordKind::Wave(w) => {
                let top = &mut stack.last_mut().ok_or(Error::UnbalancedFolder)?.folder;
                top.entries.push(FolderEntry::Wave(Arc::clone(w)));
            }
            RecordKind::Variables(v) => {
                let top = &mut stack.last_mut().ok_or(Error::UnbalancedFolder)?.folder;
                top.entries.push(FolderEntry::Variables(Arc::clone(v)));
            }
            _ => {}
        }
    }
    if stack.len() > 1 {
        warn!("{} folders left open at end of file", stack.len() - 1);
        while stack.len() > 1 {
            close(&mut stack)?;
        }
    }
    stack
        .pop()
        .map(|open| open.folder)
        .ok_or(Error::UnbalancedFolder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{StructValue, Value};
    use crate::record::{RecordHeader, RecordType};
    use crate::util::{ByteOrder, Dimensions};
    use crate::wave::{WaveArray, WaveSections, WaveValues};

    fn record(code: u16, kind: RecordKind) -> Record {
        Record {
            header: RecordHeader {
                record_type: RecordType::from_code(code),
                raw_type: code,
                superceded: false,
                version: 0,
                num_data_bytes: 0,
            },
            byte_order: Some(ByteOrder::Big),
            data: Vec::new(),
            kind,
        }
    }

    fn wave(name: &str) -> Record {
        let mut bname = name.as_bytes().to_vec();
        bname.push(0);
        let w = BinaryWave {
            version: 5,
            byte_order: ByteOrder::Big,
            bin_header: StructValue::new(),
            wave_header: StructValue::new().with("bname", Value::chars(&bname)),
            sections: WaveSections::default(),
            data: WaveArray::new(Dimensions::d1(0), WaveValues::Int8(Vec::new())),
        };
        record(3, RecordKind::Wave(Arc::new(w)))
    }

    fn vars(version: i16) -> Record {
        let v = Variables {
            version,
            ..Default::default()
        };
        record(1, RecordKind::Variables(Arc::new(v)))
    }

    fn start(name: &str) -> Record {
        record(9, RecordKind::FolderStart(name.to_string()))
    }

    fn end() -> Record {
        record(10, RecordKind::FolderEnd)
    }

    #[test]
    fn test_nested_folders() {
        let records = vec![start("A"), wave("w1"), start("B"), vars(1), end(), end()];
        let root = build_folder_tree(&records).unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.entries.len(), 1);
        let a = root.folder("A").unwrap();
        assert_eq!(a.waves().map(|w| w.name()).collect::<Vec<_>>(), vec!["w1"]);
        let b = a.folder("B").unwrap();
        assert_eq!(b.variables().count(), 1);
        assert_eq!(b.waves().count(), 0);
        assert!(root.folder_path("A:B").is_some());
        let paths: Vec<String> = root.walk().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["root", "root:A", "root:A:B"]);
    }

    #[test]
    fn test_unbalanced_end() {
        let records = vec![start("A"), end(), end()];
        assert!(matches!(build_folder_tree(&records), Err(Error::UnbalancedFolder)));
    }

    #[test]
    fn test_open_folders_closed_at_end() {
        let records = vec![vars(2), start("A"), start("B"), wave("w")];
        let root = build_folder_tree(&records).unwrap();
        assert_eq!(root.variables().count(), 1);
        assert!(root.folder_path("A:B").unwrap().wave("w").is_some());
    }

    #[test]
    fn test_reentered_folder_is_merged() {
        let records = vec![start("A"), wave("w1"), end(), wave("top"), start("A"), wave("w2"), end()];
        let root = build_folder_tree(&records).unwrap();
        assert_eq!(root.folders().count(), 1);
        let a = root.folder("A").unwrap();
        assert_eq!(a.waves().count(), 2);
        // the folder keeps its original position
        assert!(matches!(root.entries[0], FolderEntry::Folder(_)));
    }
}
