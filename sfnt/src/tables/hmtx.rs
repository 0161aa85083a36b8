use std::io::{self, Cursor};

use super::hhea::HheaTable;
use super::maxp::MaxpTable;
use super::{FontData, FontTable};
use crate::codec::{self, Tag};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table contains glyph metrics used for horizontal text layout.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hmtx.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct HmtxTable {
    /// Paired advance width and left side bearing values for each glyph. Records are indexed by
    /// glyph ID.
    pub h_metrics: Vec<LongHorMetric>,
    /// Left side bearings for glyph IDs greater than or equal to numberOfHMetrics.
    pub left_side_bearings: Vec<i16>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct LongHorMetric {
    /// Advance width, in font design units.
    pub advance_width: u16,
    /// Glyph left side bearing, in font design units.
    pub lsb: i16,
}

impl HmtxTable {
    /// Number of glyphs covered by this table.
    pub fn len(&self) -> usize {
        self.h_metrics.len() + self.left_side_bearings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The metric of `glyph_id`; glyphs in the bearing-only tail share the advance width of the
    /// last long metric.
    pub fn metric(&self, glyph_id: u16) -> Option<LongHorMetric> {
        let index = usize::from(glyph_id);
        if let Some(metric) = self.h_metrics.get(index) {
            return Some(*metric);
        }
        let last = self.h_metrics.last()?;
        self.left_side_bearings
            .get(index - self.h_metrics.len())
            .map(|lsb| LongHorMetric {
                advance_width: last.advance_width,
                lsb: *lsb,
            })
    }
}

impl<'a> FontTable<'a> for HmtxTable {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl<'a> FontData<'a> for HmtxTable {
    type UnpackDep = (&'a HheaTable, &'a MaxpTable);
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        (hhea, maxp): Self::UnpackDep,
    ) -> Result<Self, Error> {
        let num_glyphs = maxp.num_glyphs();
        let number_of_h_metrics = hhea.number_of_h_metrics;
        if number_of_h_metrics > num_glyphs || (number_of_h_metrics == 0 && num_glyphs > 0) {
            return Err(Error::malformed(
                "hmtx",
                format!(
                    "{} long metrics for {} glyphs",
                    number_of_h_metrics, num_glyphs
                ),
            ));
        }

        codec::ensure_remaining(rd, usize::from(number_of_h_metrics) * 4)?;
        let mut h_metrics = Vec::with_capacity(usize::from(number_of_h_metrics));
        for _ in 0..number_of_h_metrics {
            h_metrics.push(LongHorMetric::unpack(rd, ())?);
        }

        let lsb_count = usize::from(num_glyphs - number_of_h_metrics);
        codec::ensure_remaining(rd, lsb_count * 2)?;
        let mut left_side_bearings = vec![0; lsb_count];
        rd.read_i16_into::<BigEndian>(&mut left_side_bearings)?;

        Ok(HmtxTable {
            h_metrics,
            left_side_bearings,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        if self.len() > usize::from(u16::MAX) {
            return Err(Error::TooMany {
                what: "horizontal metrics",
                max: u32::from(u16::MAX),
            });
        }
        for metric in &self.h_metrics {
            metric.pack(wr, ())?;
        }
        for bearing in &self.left_side_bearings {
            wr.write_i16::<BigEndian>(*bearing)?;
        }
        Ok(())
    }
}

impl<'a> FontData<'a> for LongHorMetric {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(LongHorMetric {
            advance_width: rd.read_u16::<BigEndian>()?,
            lsb: rd.read_i16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.advance_width)?;
        wr.write_i16::<BigEndian>(self.lsb)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::tables::maxp::CffMaxpTable;
    use pretty_assertions::assert_eq;

    fn deps(number_of_h_metrics: u16, num_glyphs: u16) -> (HheaTable, MaxpTable) {
        let hhea = HheaTable {
            version: "1.0".to_string(),
            ascent: 0,
            descent: 0,
            line_gap: 0,
            advance_width_max: 0,
            min_left_side_bearing: 0,
            min_right_side_bearing: 0,
            x_max_extent: 0,
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            metric_data_format: 0,
            number_of_h_metrics,
        };
        (hhea, MaxpTable::Cff(CffMaxpTable { num_glyphs }))
    }

    #[test]
    fn test_hmtx_table_encode_decode() {
        #[rustfmt::skip]
        let data = vec![
            0x01, 0xF4, 0x00, 0x32, // 500, 50
            0x02, 0x58, 0xFF, 0xF6, // 600, -10
            0x00, 0x14, // 20
        ];
        let (hhea, maxp) = deps(2, 3);
        let hmtx_table = HmtxTable::unpack(&mut Cursor::new(&data[..]), (&hhea, &maxp)).unwrap();
        assert_eq!(
            hmtx_table,
            HmtxTable {
                h_metrics: vec![
                    LongHorMetric {
                        advance_width: 500,
                        lsb: 50
                    },
                    LongHorMetric {
                        advance_width: 600,
                        lsb: -10
                    },
                ],
                left_side_bearings: vec![20],
            }
        );
        assert_eq!(hmtx_table.len(), usize::from(maxp.num_glyphs()));
        assert_eq!(
            hmtx_table.metric(2),
            Some(LongHorMetric {
                advance_width: 600,
                lsb: 20
            })
        );
        assert_eq!(hmtx_table.metric(3), None);

        // re-pack and compare
        let mut buffer = Vec::new();
        hmtx_table.pack(&mut buffer, ()).unwrap();
        assert_eq!(buffer, data);
    }

    #[test]
    fn test_hmtx_table_inconsistent_counts() {
        let data = vec![0; 16];
        let (hhea, maxp) = deps(4, 2);
        assert!(matches!(
            HmtxTable::unpack(&mut Cursor::new(&data[..]), (&hhea, &maxp)),
            Err(Error::Malformed { table: "hmtx", .. })
        ));

        let (hhea, maxp) = deps(1, 10);
        assert!(matches!(
            HmtxTable::unpack(&mut Cursor::new(&data[..]), (&hhea, &maxp)),
            Err(Error::Truncated)
        ));
    }
}
