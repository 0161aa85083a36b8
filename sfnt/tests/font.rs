mod common;

use std::collections::BTreeMap;

use common::{compound_glyph, init_logger, rect_glyph, simple_glyph, TestFont};
use pretty_assertions::assert_eq;
use sfnt::tables::glyf::{GlyfTable, Outline, Point};
use sfnt::tables::head::HeadTable;
use sfnt::tables::hhea::HheaTable;
use sfnt::tables::hmtx::{HmtxTable, LongHorMetric};
use sfnt::tables::kern::{Format0, KernPair, SubtableData};
use sfnt::tables::loca::Format;
use sfnt::tables::FontTable;
use sfnt::writer::check_sum;
use sfnt::{Error, FontInfo, Tag};

#[test]
fn test_decode_sample_font() {
    init_logger();
    let data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();

    assert_eq!(info.num_glyphs(), 7);
    assert_eq!(info.maxp.num_glyphs(), 7);
    assert_eq!(info.head.units_per_em, 1000);
    assert!(info.warnings.is_empty());

    let cmap = info.cmap.as_ref().unwrap();
    assert_eq!(cmap.glyph_id(u32::from('C')), Some(5));
    assert_eq!(cmap.glyph_id(u32::from('Z')), None);

    let hmtx = info.hmtx.as_ref().unwrap();
    assert_eq!(
        hmtx.metric(6),
        Some(LongHorMetric {
            advance_width: 530,
            lsb: 6
        })
    );
}

#[test]
fn test_round_trip_without_subsetting() {
    init_logger();
    let data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();
    let encoded = info.to_bytes().unwrap();
    let decoded = FontInfo::from_slice(&encoded.data).unwrap();

    let mut head = info.head.clone();
    let mut decoded_head = decoded.head.clone();
    head.check_sum_adjustment = 0;
    decoded_head.check_sum_adjustment = 0;
    assert_eq!(decoded_head, head);
    assert_eq!(decoded.maxp, info.maxp);
    assert_eq!(decoded.hhea, info.hhea);
    assert_eq!(decoded.hmtx, info.hmtx);
    assert_eq!(decoded.glyf, info.glyf);
    assert_eq!(decoded.kern, info.kern);
    assert_eq!(
        decoded.cmap.as_ref().map(|cmap| &cmap.windows_code),
        info.cmap.as_ref().map(|cmap| &cmap.windows_code)
    );

    // tables that were not part of the input are reported
    assert!(encoded
        .warnings
        .iter()
        .any(|warning| warning.contains("`name`")));
}

#[test]
fn test_loca_monotonicity() {
    let data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();
    let loca = info.loca.as_ref().unwrap();
    let glyf_len = info
        .directory
        .get_table_record(GlyfTable::TAG)
        .unwrap()
        .length;

    assert_eq!(loca.offsets.len(), info.num_glyphs() + 1);
    assert!(loca.offsets.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(loca.offsets.last().copied(), Some(glyf_len));
    // the space glyph is empty
    assert_eq!(loca.offsets[3], loca.offsets[4]);
}

#[test]
fn test_checksum_determinism() {
    let data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();
    let first = info.to_bytes().unwrap();
    let second = info.to_bytes().unwrap();
    assert_eq!(first.data, second.data);
    assert_eq!(first.data.len() % 4, 0);
    assert_eq!(check_sum(&first.data), 0xB1B0AFBA);

    let decoded = FontInfo::from_slice(&first.data).unwrap();
    for record in decoded.directory.tables.values() {
        assert_eq!(record.offset % 4, 0);
        let start = record.offset as usize;
        let table = &first.data[start..start + record.length as usize];
        if record.tag != Tag::new(b"head") {
            assert_eq!(record.check_sum, check_sum(table), "{}", record.tag);
        }
    }
}

#[test]
fn test_write_selected_tables() {
    let data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();
    let encoded = info
        .to_bytes_with(&[
            Tag::new(b"head"),
            Tag::new(b"maxp"),
            Tag::new(b"loca"),
            Tag::new(b"glyf"),
            Tag::new(b"GPOS"),
            Tag::new(b"glyf"),
        ])
        .unwrap();
    assert_eq!(encoded.warnings.len(), 1);
    assert!(encoded.warnings[0].contains("GPOS"));

    let decoded = FontInfo::from_slice(&encoded.data).unwrap();
    assert_eq!(decoded.directory.tables.len(), 4);
    assert_eq!(decoded.glyf, info.glyf);
    assert_eq!(decoded.cmap, None);
    assert_eq!(decoded.hmtx, None);
}

#[test]
fn test_missing_required_table() {
    let data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();
    let encoded = info
        .to_bytes_with(&[Tag::new(b"head"), Tag::new(b"maxp"), Tag::new(b"glyf")])
        .unwrap();
    assert!(matches!(
        FontInfo::from_slice(&encoded.data),
        Err(Error::MissingRequiredTable(tag)) if tag == Tag::new(b"loca")
    ));
}

#[test]
fn test_truncated_font() {
    let data = TestFont::sample().build();
    assert!(matches!(
        FontInfo::from_slice(&data[..data.len() - 8]),
        Err(Error::Truncated)
    ));
    assert!(matches!(FontInfo::from_slice(&data[..10]), Err(Error::Truncated)));
}

#[test]
fn test_broken_optional_table_is_skipped() {
    init_logger();
    let mut font = TestFont::sample();
    font.kern = None;
    let mut data = font.build();
    let info = FontInfo::from_slice(&data).unwrap();

    // point the cmap subtable to an unsupported format
    let record = info
        .directory
        .get_table_record(Tag::new(b"cmap"))
        .unwrap();
    let start = record.offset as usize;
    let subtable_offset = u32::from_be_bytes([
        data[start + 8],
        data[start + 9],
        data[start + 10],
        data[start + 11],
    ]) as usize;
    data[start + subtable_offset + 1] = 7;

    let info = FontInfo::from_slice(&data).unwrap();
    assert_eq!(info.cmap, None);
    assert_eq!(info.warnings.len(), 1);
    assert!(info.warnings[0].contains("cmap"));
}

#[test]
fn test_long_loca_font() {
    // glyph 0 with four contours followed by 10960 empty glyphs
    let points = (0..194u16)
        .map(|i| Point {
            x: (i * 7 % 300) as i16,
            y: (i * 13 % 500) as i16,
            on_curve: i % 3 != 0,
        })
        .collect();
    let mut glyphs = vec![simple_glyph(0, vec![58, 169, 173, 193], points)];
    glyphs.extend((1..10961).map(sfnt::tables::glyf::Glyph::empty));

    let font = TestFont {
        glyphs,
        mapping: BTreeMap::new(),
        loca_format: Format::Long,
        number_of_h_metrics: 1,
        kern: None,
    };
    let data = font.build();
    let info = FontInfo::from_slice(&data).unwrap();

    assert_eq!(info.head.index_to_loc_format, 1);
    assert_eq!(info.maxp.num_glyphs(), 10961);
    let loca = info.loca.as_ref().unwrap();
    assert_eq!(loca.format, Format::Long);
    assert_eq!(loca.offsets.len(), 10962);
    assert_eq!(loca.offsets[0], 0);
    assert_eq!(loca.offsets[1], loca.offsets[2]);
    assert_eq!(loca.offsets[2], loca.offsets[3]);
    let glyf_len = info
        .directory
        .get_table_record(GlyfTable::TAG)
        .unwrap()
        .length;
    assert_eq!(loca.offsets.last().copied(), Some(glyf_len));

    let glyph = info.glyf.glyph(0).unwrap();
    assert_eq!(glyph.common().unwrap().number_of_contours, 4);
    match &glyph.outline {
        Outline::Simple(simple) => {
            assert_eq!(simple.end_pts_of_contours, vec![58, 169, 173, 193]);
            assert_eq!(simple.points.len(), 194);
        }
        outline => panic!("expected a simple glyph, got {:?}", outline),
    }
    assert_eq!(info.glyf.glyph(1).unwrap().common(), None);
}

#[test]
fn test_subset_closure() {
    init_logger();
    let data = TestFont::sample().build();
    let mut info = FontInfo::from_slice(&data).unwrap();
    let old_ids = info.subset(&["C"]).unwrap();

    assert_eq!(old_ids, vec![0, 2, 4, 5]);
    assert_eq!(info.num_glyphs(), 4);
    assert_eq!(info.maxp.num_glyphs(), 4);
    assert_eq!(info.loca, None);
    for (i, glyph) in info.glyf.glyphs.iter().enumerate() {
        assert_eq!(usize::from(glyph.index), i);
    }

    // components point to the new ids of glyphs 2 and 4
    assert_eq!(
        info.glyf.glyph(3).unwrap().component_indices().collect::<Vec<_>>(),
        vec![1, 2]
    );

    let cmap = info.cmap.as_ref().unwrap();
    assert_eq!(
        cmap.windows_code,
        [(u32::from('B'), 1), (u32::from('C'), 3)].into_iter().collect()
    );

    let hmtx = info.hmtx.as_ref().unwrap();
    assert_eq!(hmtx.len(), 4);
    assert!(hmtx.left_side_bearings.is_empty());
    assert_eq!(
        hmtx.h_metrics
            .iter()
            .map(|m| (m.advance_width, m.lsb))
            .collect::<Vec<_>>(),
        vec![(500, 0), (520, 2), (530, 4), (530, 5)]
    );
    assert_eq!(info.hhea.as_ref().unwrap().number_of_h_metrics, 4);

    let kern = info.kern.as_ref().unwrap();
    assert_eq!(kern.subtables[0].kerning(1, 2), -30);
    assert_eq!(kern.subtables[0].kerning(0, 1), 0);

    // the written font is consistent
    let encoded = info.to_bytes().unwrap();
    let decoded = FontInfo::from_slice(&encoded.data).unwrap();
    assert_eq!(decoded.glyf, info.glyf);
    assert_eq!(decoded.hmtx, info.hmtx);
    assert_eq!(decoded.cmap.unwrap().windows_code, cmap.windows_code);
    assert_eq!(decoded.kern, info.kern);
}

#[test]
fn test_subset_keeps_notdef_only() {
    let data = TestFont::sample().build();
    let mut info = FontInfo::from_slice(&data).unwrap();
    assert_eq!(info.subset(&["xyz"]).unwrap(), vec![0]);
    assert_eq!(info.num_glyphs(), 1);
    assert!(info.cmap.as_ref().unwrap().windows_code.is_empty());
    assert_eq!(info.hmtx.as_ref().unwrap().len(), 1);
}

#[test]
fn test_subset_idempotence() {
    let data = TestFont::sample().build();
    let mut info = FontInfo::from_slice(&data).unwrap();
    info.subset(&["AC "]).unwrap();
    let first = info.to_bytes().unwrap();

    let mut info = FontInfo::from_slice(&first.data).unwrap();
    let old_ids = info.subset(&["AC "]).unwrap();
    assert_eq!(old_ids, (0..old_ids.len() as u16).collect::<Vec<_>>());
    let second = info.to_bytes().unwrap();

    let first = FontInfo::from_slice(&first.data).unwrap();
    let second = FontInfo::from_slice(&second.data).unwrap();
    assert_eq!(second.num_glyphs(), first.num_glyphs());
    assert_eq!(
        second.cmap.unwrap().windows_code,
        first.cmap.unwrap().windows_code
    );
    assert_eq!(second.glyf, first.glyf);
}

#[test]
fn test_subset_updates_bounding_box() {
    let font = TestFont {
        glyphs: vec![
            rect_glyph(0, 10, 10, 20, 20),
            rect_glyph(1, -100, -50, 900, 800),
            rect_glyph(2, 0, 0, 300, 400),
            compound_glyph(3, &[(2, 0, 0)]),
        ],
        mapping: [(0x61, 1), (0x62, 3)].into_iter().collect(),
        loca_format: Format::Short,
        number_of_h_metrics: 4,
        kern: None,
    };
    let mut info = FontInfo::from_slice(&font.build()).unwrap();
    info.subset(&["b"]).unwrap();

    // the compound glyph's own box (0, 0, 1200, 700) counts as well
    assert_eq!(
        (info.head.x_min, info.head.y_min, info.head.x_max, info.head.y_max),
        (0, 0, 1200, 700)
    );
}

#[test]
fn test_subset_without_cmap() {
    let data = TestFont::sample().build();
    let mut info = FontInfo::from_slice(&data).unwrap();
    info.cmap = None;
    assert!(matches!(
        info.subset(&["A"]),
        Err(Error::InconsistentState(_))
    ));
}

#[test]
fn test_subset_without_outlines_resets_bounding_box() {
    let mut font = TestFont::sample();
    font.glyphs[0] = sfnt::tables::glyf::Glyph::empty(0);
    let mut info = FontInfo::from_slice(&font.build()).unwrap();
    assert_ne!(info.head.x_max, 0);

    assert_eq!(info.subset(&["  "]).unwrap(), vec![0, 3]);
    assert_eq!(
        (info.head.x_min, info.head.y_min, info.head.x_max, info.head.y_max),
        (0, 0, 0, 0)
    );
}

#[test]
fn test_large_kern_table() {
    init_logger();
    let mut font = TestFont::sample();
    let pairs: Vec<KernPair> = (0..11000u16)
        .map(|i| KernPair {
            left: i / 1000,
            right: i % 1000,
            value: -10,
        })
        .collect();
    if let Some(kern) = &mut font.kern {
        kern.subtables[0].data = SubtableData::Format0(Format0 { pairs });
    }

    let info = FontInfo::from_slice(&font.build()).unwrap();
    let kern = info.kern.as_ref().unwrap();
    assert!(info.warnings.is_empty());
    let SubtableData::Format0(format0) = &kern.subtables[0].data else {
        panic!("expected format 0");
    };
    assert_eq!(format0.pairs.len(), 11000);
    assert_eq!(kern.subtables[0].kerning(10, 999), -10);

    let decoded = FontInfo::from_slice(&info.to_bytes().unwrap().data).unwrap();
    assert_eq!(decoded.kern, info.kern);
}

#[test]
fn test_corrected_subtable_length_is_reported() {
    init_logger();
    let mut data = TestFont::sample().build();
    let info = FontInfo::from_slice(&data).unwrap();
    assert!(info.warnings.is_empty());

    // format 4 length field of the only cmap subtable, after 4 + 8 bytes of header
    let record = info.directory.get_table_record(Tag::new(b"cmap")).unwrap();
    let at = record.offset as usize + 12 + 2;
    data[at..at + 2].copy_from_slice(&[0xFF, 0xF0]);

    let info = FontInfo::from_slice(&data).unwrap();
    assert_eq!(info.warnings.len(), 1);
    assert!(info.warnings[0].starts_with("cmap format 4 subtable length 65520 exceeds the table"));
    assert_eq!(info.cmap.unwrap().glyph_id(0x41), Some(1));
}

#[test]
fn test_too_many_horizontal_metrics() {
    let data = TestFont::sample().build();
    let mut info = FontInfo::from_slice(&data).unwrap();
    info.hmtx = Some(HmtxTable {
        h_metrics: vec![
            LongHorMetric {
                advance_width: 500,
                lsb: 0,
            };
            65536
        ],
        left_side_bearings: Vec::new(),
    });

    let encoded = info
        .to_bytes_with(&[HeadTable::TAG, HheaTable::TAG])
        .unwrap();
    assert_eq!(
        encoded.warnings,
        vec!["Skipping table `hhea`: Cannot write more than 65535 horizontal metrics"]
    );
}
