use std::collections::BTreeMap;
use std::io::Cursor;

use pretty_assertions::assert_eq;
use sfnt::tables::cmap::{CmapTable, Format4, Subtable};
use sfnt::tables::FontData;

fn cmap_with_format4(format4: Format4) -> Vec<u8> {
    let mut subtable = Vec::new();
    Subtable::Format4(format4).pack(&mut subtable, ()).unwrap();

    let mut data = vec![
        0x00, 0x00, 0x00, 0x01, // version, numTables
        0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0C, // Windows, Unicode BMP
    ];
    data.extend(subtable);
    data
}

#[test]
fn test_format4_delta_segment() {
    let data = cmap_with_format4(Format4 {
        language: 0,
        end_code: vec![70, 0xFFFF],
        start_code: vec![65, 0xFFFF],
        id_delta: vec![5, 1],
        id_range_offset: vec![0, 0],
        glyph_id_array: Vec::new(),
    });
    let cmap = CmapTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap();

    let expected: BTreeMap<u32, u16> = (65..=70).map(|code| (code, code as u16 + 5)).collect();
    assert_eq!(cmap.windows_code, expected);
    assert_eq!(cmap.glyph_id(0xFFFF), None);
}

#[test]
fn test_format4_glyph_index_array() {
    // the second segment reads from the glyph index array, whose middle slot is empty
    let data = cmap_with_format4(Format4 {
        language: 0,
        end_code: vec![70, 0x62, 0xFFFF],
        start_code: vec![65, 0x60, 0xFFFF],
        id_delta: vec![5, 10, 1],
        id_range_offset: vec![0, 4, 0],
        glyph_id_array: vec![20, 0, 22],
    });
    let cmap = CmapTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap();

    assert_eq!(cmap.glyph_id(65), Some(70));
    assert_eq!(cmap.glyph_id(0x60), Some(30));
    assert_eq!(cmap.glyph_id(0x61), Some(0));
    assert_eq!(cmap.glyph_id(0x62), Some(32));
    assert_eq!(cmap.windows_code.len(), 9);
}

#[test]
fn test_rebuilt_cmap_round_trip() {
    let mapping: BTreeMap<u32, u16> = [
        (0x20, 1),
        (0x41, 2),
        (0x42, 3),
        (0x43, 4),
        (0xE9, 9),
        (0x4E00, 12),
        (0x1F600, 13),
        (0x1F601, 14),
    ]
    .into_iter()
    .collect();
    let cmap = CmapTable {
        version: 0,
        encoding_records: Vec::new(),
        subtables: BTreeMap::new(),
        windows_code: BTreeMap::new(),
        warnings: Vec::new(),
    }
    .with_mapping(mapping.clone());

    let mut data = Vec::new();
    cmap.pack(&mut data, ()).unwrap();
    let decoded = CmapTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap();
    assert_eq!(decoded.windows_code, mapping);
    assert_eq!(
        decoded
            .encoding_records
            .iter()
            .map(|r| (r.platform_id, r.encoding_id))
            .collect::<Vec<_>>(),
        vec![(3, 1), (3, 10)]
    );
    assert_eq!(
        decoded
            .subtables
            .values()
            .map(Subtable::format)
            .collect::<Vec<_>>(),
        vec![4, 12]
    );
}
