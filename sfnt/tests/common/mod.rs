#![allow(dead_code)]

use std::collections::BTreeMap;

use sfnt::tables::cmap::CmapTable;
use sfnt::tables::glyf::{
    Component, ComponentFlags, CompoundGlyph, GlyfTable, Glyph, GlyphCommon, Outline, Point,
    SimpleGlyph, Transform,
};
use sfnt::tables::head::HeadTable;
use sfnt::tables::hhea::HheaTable;
use sfnt::tables::hmtx::{HmtxTable, LongHorMetric};
use sfnt::tables::kern::{Format0, KernPair, KernTable, Subtable, SubtableData, Version};
use sfnt::tables::loca::{Format, LocaTable};
use sfnt::tables::maxp::{CffMaxpTable, MaxpTable};
use sfnt::tables::offset::SfntVersion;
use sfnt::tables::FontTable;
use sfnt::writer::FontWriter;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn simple_glyph(index: u16, end_pts_of_contours: Vec<u16>, points: Vec<Point>) -> Glyph {
    let x_min = points.iter().map(|p| p.x).min().unwrap_or(0);
    let y_min = points.iter().map(|p| p.y).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.x).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.y).max().unwrap_or(0);
    Glyph {
        index,
        outline: Outline::Simple(SimpleGlyph {
            common: GlyphCommon {
                number_of_contours: end_pts_of_contours.len() as i16,
                x_min,
                y_min,
                x_max,
                y_max,
            },
            end_pts_of_contours,
            instructions: Vec::new(),
            points,
        }),
    }
}

pub fn rect_glyph(index: u16, x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Glyph {
    let point = |x, y| Point {
        x,
        y,
        on_curve: true,
    };
    simple_glyph(
        index,
        vec![3],
        vec![
            point(x_min, y_min),
            point(x_min, y_max),
            point(x_max, y_max),
            point(x_max, y_min),
        ],
    )
}

pub fn compound_glyph(index: u16, components: &[(u16, i32, i32)]) -> Glyph {
    Glyph {
        index,
        outline: Outline::Compound(CompoundGlyph {
            common: GlyphCommon {
                number_of_contours: -1,
                x_min: 0,
                y_min: 0,
                x_max: 1200,
                y_max: 700,
            },
            components: components
                .iter()
                .map(|(glyph_index, dx, dy)| Component {
                    flags: ComponentFlags::ARGS_ARE_XY_VALUES,
                    glyph_index: *glyph_index,
                    argument1: *dx,
                    argument2: *dy,
                    transform: Transform::None,
                })
                .collect(),
            instructions: Vec::new(),
        }),
    }
}

/// A small TrueType font assembled in memory.
pub struct TestFont {
    pub glyphs: Vec<Glyph>,
    pub mapping: BTreeMap<u32, u16>,
    pub loca_format: Format,
    pub number_of_h_metrics: u16,
    pub kern: Option<KernTable>,
}

impl TestFont {
    /// Glyphs:
    /// 0 .notdef, 1 'A', 2 'B', 3 ' ' (empty), 4 'o', 5 'C' (compound of 2 and 4), 6 'D'
    pub fn sample() -> Self {
        TestFont {
            glyphs: vec![
                rect_glyph(0, 50, 0, 450, 700),
                simple_glyph(
                    1,
                    vec![2],
                    vec![
                        Point {
                            x: 0,
                            y: 0,
                            on_curve: true,
                        },
                        Point {
                            x: 300,
                            y: 700,
                            on_curve: true,
                        },
                        Point {
                            x: 600,
                            y: 0,
                            on_curve: true,
                        },
                    ],
                ),
                rect_glyph(2, 80, 0, 520, 700),
                Glyph::empty(3),
                simple_glyph(
                    4,
                    vec![3, 7],
                    vec![
                        Point {
                            x: 250,
                            y: 0,
                            on_curve: false,
                        },
                        Point {
                            x: 0,
                            y: 250,
                            on_curve: false,
                        },
                        Point {
                            x: 250,
                            y: 500,
                            on_curve: false,
                        },
                        Point {
                            x: 500,
                            y: 250,
                            on_curve: false,
                        },
                        Point {
                            x: 250,
                            y: 100,
                            on_curve: false,
                        },
                        Point {
                            x: 400,
                            y: 250,
                            on_curve: false,
                        },
                        Point {
                            x: 250,
                            y: 400,
                            on_curve: false,
                        },
                        Point {
                            x: 100,
                            y: 250,
                            on_curve: false,
                        },
                    ],
                ),
                compound_glyph(5, &[(2, 0, 0), (4, 700, -300)]),
                rect_glyph(6, 60, 0, 540, 700),
            ],
            mapping: [(0x20, 3), (0x41, 1), (0x42, 2), (0x43, 5), (0x44, 6)]
                .into_iter()
                .collect(),
            loca_format: Format::Short,
            number_of_h_metrics: 4,
            kern: Some(KernTable {
                version: Version::Windows,
                is_mac_new_kern: false,
                subtables: vec![Subtable {
                    coverage: 0x01,
                    tuple_index: 0,
                    data: SubtableData::Format0(Format0 {
                        pairs: vec![
                            KernPair {
                                left: 1,
                                right: 2,
                                value: -50,
                            },
                            KernPair {
                                left: 2,
                                right: 4,
                                value: -30,
                            },
                        ],
                    }),
                }],
                warnings: Vec::new(),
            }),
        }
    }

    pub fn head(&self) -> HeadTable {
        HeadTable {
            version: "1.0".to_string(),
            font_revision: 1.5,
            check_sum_adjustment: 0,
            magic_number: HeadTable::MAGIC_NUMBER,
            flags: 0x000B,
            units_per_em: 1000,
            created: 1_600_000_000,
            modified: 1_700_000_000,
            x_min: 0,
            y_min: -300,
            x_max: 1200,
            y_max: 700,
            mac_style: 0,
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: self.loca_format.index_to_loc_format(),
            glyph_data_format: 0,
        }
    }

    pub fn hhea(&self) -> HheaTable {
        HheaTable {
            version: "1.0".to_string(),
            ascent: 800,
            descent: -200,
            line_gap: 0,
            advance_width_max: 600,
            min_left_side_bearing: 0,
            min_right_side_bearing: 0,
            x_max_extent: 1200,
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            metric_data_format: 0,
            number_of_h_metrics: self.number_of_h_metrics,
        }
    }

    /// Glyph `i` has the left side bearing `i`; the long metrics have advance widths
    /// 500, 510, 520, ...
    pub fn hmtx(&self) -> HmtxTable {
        let num_glyphs = self.glyphs.len() as u16;
        HmtxTable {
            h_metrics: (0..self.number_of_h_metrics)
                .map(|i| LongHorMetric {
                    advance_width: 500 + i * 10,
                    lsb: i as i16,
                })
                .collect(),
            left_side_bearings: (self.number_of_h_metrics..num_glyphs)
                .map(|i| i as i16)
                .collect(),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let glyf = GlyfTable {
            glyphs: self.glyphs.clone(),
        };
        let (glyf_data, offsets) = glyf.pack_with_offsets().unwrap();
        let loca = LocaTable {
            offsets,
            format: self.loca_format,
        };
        let cmap = CmapTable {
            version: 0,
            encoding_records: Vec::new(),
            subtables: BTreeMap::new(),
            windows_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
        .with_mapping(self.mapping.clone());

        let mut writer = FontWriter::new();
        writer.pack(&self.head(), ()).unwrap();
        writer
            .pack(
                &MaxpTable::Cff(CffMaxpTable {
                    num_glyphs: self.glyphs.len() as u16,
                }),
                (),
            )
            .unwrap();
        writer.pack(&self.hhea(), ()).unwrap();
        writer.pack(&self.hmtx(), ()).unwrap();
        writer.pack(&loca, ()).unwrap();
        writer.insert(GlyfTable::TAG, glyf_data);
        writer.pack(&cmap, ()).unwrap();
        if let Some(kern) = &self.kern {
            writer.pack(kern, ()).unwrap();
        }
        writer.finish(SfntVersion::TrueType).unwrap()
    }
}
