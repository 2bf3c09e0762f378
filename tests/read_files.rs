//! Integration tests for reading binary waves and packed experiments.

mod common;

use std::io::{Cursor, Write};

use common::{record, v2_float64, v5_wave};
use igor::packed::{FolderEntry, ROOT_FOLDER};
use igor::record::{RecordKind, RecordType};
use igor::wave::WaveValues;
use igor::{decode_packed, decode_wave, load_packed, load_wave, ByteOrder, Error, NumericType, PackedOptions};

const TEXT: &[u8] = b"Maryhadalittlelamb";
const TEXT_INDICES: [i32; 5] = [4, 7, 8, 14, 18];

#[test]
fn test_v2_double_little_endian() {
    let bytes = v2_float64("double", &[5.0, 4.0, 3.0, 2.0, 1.0], ByteOrder::Little, "");
    let wave = decode_wave(Cursor::new(bytes), true).expect("Failed to decode wave");
    assert_eq!(wave.version, 2);
    assert_eq!(wave.byte_order, ByteOrder::Little);
    assert_eq!(wave.name(), "double");
    assert_eq!(wave.numeric_type(), Some(NumericType::Float64));
    assert_eq!(wave.data.as_f64(), Some(&[5.0, 4.0, 3.0, 2.0, 1.0][..]));
    assert_eq!(wave.data.get(&[2]), Some(3.0));
}

#[test]
fn test_byte_order_does_not_change_values() {
    let values = [0.25, -8.0, 3.0e-7, 42.0];
    let mac = decode_wave(Cursor::new(v2_float64("w", &values, ByteOrder::Big, "note")), true).unwrap();
    let win = decode_wave(Cursor::new(v2_float64("w", &values, ByteOrder::Little, "note")), true).unwrap();
    assert_eq!(mac.byte_order, ByteOrder::Big);
    assert_eq!(win.byte_order, ByteOrder::Little);
    assert_eq!(mac.data, win.data);
    assert_eq!(mac.note(), win.note());
}

#[test]
fn test_v5_text_wave() {
    let bytes = v5_wave("text0", NumericType::Text, [5, 0, 0, 0], TEXT, &TEXT_INDICES, ByteOrder::Little);
    let wave = decode_wave(Cursor::new(bytes), true).unwrap();
    assert_eq!(wave.version, 5);
    assert_eq!(wave.name(), "text0");
    assert_eq!(wave.sections.string_indices, TEXT_INDICES.to_vec());
    let text: Vec<&str> = wave.data.as_text().unwrap().iter().map(String::as_str).collect();
    assert_eq!(text, vec!["Mary", "had", "a", "little", "lamb"]);
    assert_eq!(wave.data.get_text(&[4]), Some("lamb"));
}

#[test]
fn test_v5_matrix_is_column_major() {
    let values: Vec<u8> = (0..6i16).flat_map(|v| v.to_be_bytes()).collect();
    let bytes = v5_wave("m", NumericType::Int16, [2, 3, 0, 0], &values, &[], ByteOrder::Big);
    let wave = decode_wave(Cursor::new(bytes), true).unwrap();
    assert_eq!(wave.shape().sizes(), &[2, 3]);
    assert!(matches!(wave.data.values, WaveValues::Int16(_)));
    // element (1, 2) is the sixth value in file order
    assert_eq!(wave.data.get(&[1, 2]), Some(5.0));
    assert_eq!(wave.data.get(&[1, 0]), Some(1.0));
    assert_eq!(wave.data.get(&[2, 0]), None);
}

#[test]
fn test_v5_zero_point_wave() {
    let bytes = v5_wave("zero", NumericType::Float32, [0; 4], &[], &[], ByteOrder::Big);
    let wave = decode_wave(Cursor::new(bytes), true).unwrap();
    assert_eq!(wave.npnts(), 0);
    assert!(wave.data.is_empty());
}

#[test]
fn test_corrupted_header_fails_checksum() {
    let mut bytes = v2_float64("w", &[1.0, 2.0, 3.0], ByteOrder::Big, "");
    bytes[30] = bytes[30].wrapping_add(1);
    match decode_wave(Cursor::new(bytes), true) {
        Err(Error::Checksum(c)) => assert_ne!(c, 0),
        other => panic!("expected checksum error, got {:?}", other.map(|w| w.name())),
    }
}

#[test]
fn test_load_wave_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&v2_float64("disk", &[1.0, 2.0], ByteOrder::Little, "")).unwrap();
    let wave = load_wave(file.path(), true).unwrap();
    assert_eq!(wave.name(), "disk");
    assert_eq!(wave.data.to_f64_vec(), Some(vec![1.0, 2.0]));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ibw");
    assert!(matches!(load_wave(&path, true), Err(Error::FileNotFound(_))));
    assert!(matches!(load_packed(&path, PackedOptions::default()), Err(Error::FileNotFound(_))));
}

/// History, variables, then a folder holding a wave and a sub-folder.
fn experiment(order: ByteOrder) -> Vec<u8> {
    let vars: Vec<u8> = if order.is_little() {
        vec![1, 0, 0, 0, 0, 0, 0, 0]
    } else {
        vec![0, 1, 0, 0, 0, 0, 0, 0]
    };
    let mut b = Vec::new();
    record(&mut b, order, 2, 1, b"// Platform=Windows\r\nprint 1\r");
    record(&mut b, order, 1, 1, &vars);
    record(&mut b, order, 9, 1, b"data\0");
    record(&mut b, order, 3, 2, &v2_float64("wave0", &[1.0, 2.0, 3.0], order, ""));
    record(&mut b, order, 9, 1, b"sub\0");
    record(&mut b, order, 3, 5, &v5_wave("names", NumericType::Text, [5, 0, 0, 0], TEXT, &TEXT_INDICES, order));
    record(&mut b, order, 10, 1, b"");
    record(&mut b, order, 10, 1, b"");
    record(&mut b, order, 5, 1, b"Macro Demo()\rEnd\r");
    b
}

#[test]
fn test_packed_experiment() {
    let exp = decode_packed(Cursor::new(experiment(ByteOrder::Big)), PackedOptions::default()).unwrap();
    let types: Vec<RecordType> = exp.records.iter().map(|r| r.record_type()).collect();
    assert_eq!(
        types,
        vec![
            RecordType::History,
            RecordType::Variables,
            RecordType::FolderStart,
            RecordType::Wave,
            RecordType::FolderStart,
            RecordType::Wave,
            RecordType::FolderEnd,
            RecordType::FolderEnd,
            RecordType::Procedure,
        ]
    );
    assert_eq!(exp.records[0].text().as_deref(), Some("// Platform=Windows\nprint 1\n"));
    assert_eq!(exp.records[8].text().as_deref(), Some("Macro Demo()\nEnd\n"));
    assert!(exp.records.iter().all(|r| r.byte_order == Some(ByteOrder::Big)));

    let root = &exp.root;
    assert_eq!(root.name, ROOT_FOLDER);
    assert!(matches!(root.entries[0], FolderEntry::Variables(_)));
    let data = root.folder("data").expect("data folder");
    assert_eq!(data.wave("wave0").unwrap().data.as_f64(), Some(&[1.0, 2.0, 3.0][..]));
    let names = root.folder_path("data:sub").and_then(|f| f.wave("names")).unwrap();
    assert_eq!(names.data.get_text(&[1]), Some("had"));

    let paths: Vec<String> = root.walk().into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["root", "root:data", "root:data:sub"]);
}

#[test]
fn test_packed_byte_orders_agree() {
    let be = decode_packed(Cursor::new(experiment(ByteOrder::Big)), PackedOptions::default()).unwrap();
    let le = decode_packed(Cursor::new(experiment(ByteOrder::Little)), PackedOptions::default()).unwrap();
    assert_eq!(le.records.len(), be.records.len());
    assert!(le.records.iter().all(|r| r.byte_order == Some(ByteOrder::Little)));
    let w_be = be.root.folder("data").and_then(|f| f.wave("wave0")).unwrap();
    let w_le = le.root.folder("data").and_then(|f| f.wave("wave0")).unwrap();
    assert_eq!(w_be.data, w_le.data);
    assert_eq!(be.root.to_json(), le.root.to_json());
}

#[test]
fn test_unknown_record_policy() {
    let mut b = experiment(ByteOrder::Big);
    record(&mut b, ByteOrder::Big, 77, 1, &[9, 9]);
    let exp = decode_packed(Cursor::new(b.clone()), PackedOptions::default()).unwrap();
    let last = exp.records.last().unwrap();
    assert!(matches!(last.kind, RecordKind::Unknown));
    assert_eq!(last.data, vec![9, 9]);
    let strict = PackedOptions::default().ignore_unknown(false);
    assert!(matches!(decode_packed(Cursor::new(b), strict), Err(Error::UnknownRecordType(77))));
}

#[test]
fn test_load_packed_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.pxp");
    std::fs::write(&path, experiment(ByteOrder::Little)).unwrap();
    let exp = load_packed(&path, PackedOptions::default()).unwrap();
    assert_eq!(exp.records.len(), 9);
    assert_eq!(exp.root.folders().count(), 1);
}
