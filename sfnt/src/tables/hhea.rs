use std::io::{self, Cursor};

use super::{FontData, FontTable};
use crate::codec::{ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table contains information for horizontal layout.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/hhea
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hhea.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct HheaTable {
    /// Table version as `major.minor`, set to `1.0`.
    pub version: String,
    /// Distance from baseline of highest ascender.
    pub ascent: i16,
    /// Distance from baseline of lowest descender
    pub descent: i16,
    /// Typographic line gap.
    pub line_gap: i16,
    /// Maximum advance width value in 'hmtx' table.
    pub advance_width_max: u16,
    /// Minimum left sidebearing value in 'hmtx' table.
    pub min_left_side_bearing: i16,
    /// Minimum right sidebearing value; calculated as Min(aw - lsb - (xMax - xMin)).
    pub min_right_side_bearing: i16,
    /// Max(lsb + (xMax - xMin)).
    pub x_max_extent: i16,
    /// Used to calculate the slope of the cursor (rise/run); 1 for vertical.
    pub caret_slope_rise: i16,
    /// 0 for vertical.
    pub caret_slope_run: i16,
    /// The amount by which a slanted highlight on a glyph needs to be shifted to produce the best
    /// appearance.
    pub caret_offset: i16,
    /// 0 for current format.
    pub metric_data_format: i16,
    /// Number of hMetric entries in 'hmtx' table
    pub number_of_h_metrics: u16,
}

impl<'a> FontTable<'a> for HheaTable {
    const TAG: Tag = Tag::new(b"hhea");
}

impl<'a> FontData<'a> for HheaTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_version()?;
        let ascent = rd.read_fword()?;
        let descent = rd.read_fword()?;
        let line_gap = rd.read_fword()?;
        let advance_width_max = rd.read_ufword()?;
        let min_left_side_bearing = rd.read_fword()?;
        let min_right_side_bearing = rd.read_fword()?;
        let x_max_extent = rd.read_fword()?;
        let caret_slope_rise = rd.read_i16::<BigEndian>()?;
        let caret_slope_run = rd.read_i16::<BigEndian>()?;
        let caret_offset = rd.read_i16::<BigEndian>()?;
        // 4 times reserved
        for _ in 0..4 {
            rd.read_i16::<BigEndian>()?;
        }

        Ok(HheaTable {
            version,
            ascent,
            descent,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format: rd.read_i16::<BigEndian>()?,
            number_of_h_metrics: rd.read_u16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_version(&self.version)?;
        wr.write_fword(self.ascent)?;
        wr.write_fword(self.descent)?;
        wr.write_fword(self.line_gap)?;
        wr.write_ufword(self.advance_width_max)?;
        wr.write_fword(self.min_left_side_bearing)?;
        wr.write_fword(self.min_right_side_bearing)?;
        wr.write_fword(self.x_max_extent)?;
        wr.write_i16::<BigEndian>(self.caret_slope_rise)?;
        wr.write_i16::<BigEndian>(self.caret_slope_run)?;
        wr.write_i16::<BigEndian>(self.caret_offset)?;
        // 4 times reserved
        for _ in 0..4 {
            wr.write_i16::<BigEndian>(0)?;
        }
        wr.write_i16::<BigEndian>(self.metric_data_format)?;
        wr.write_u16::<BigEndian>(self.number_of_h_metrics)?;
        Ok(())
    }
}
