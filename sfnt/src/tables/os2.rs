use std::io::{self, Cursor, Read};

use super::{FontData, FontTable};
use crate::codec::{ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table consists of a set of metrics and other data that are required for a font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/os2
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6OS2.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Os2Table {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ul_unicode_range: [u32; 4],
    pub ach_vend_id: Tag,
    pub fs_selection: u16,
    /// The minimum Unicode index (character code) in this font.
    pub us_first_char_index: u16,
    /// The maximum Unicode index (character code) in this font.
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    /// Available for version >= 1.
    pub code_page_range: Option<[u32; 2]>,
    /// Available for version >= 2.
    pub metrics: Option<Os2Metrics>,
    /// Available for version >= 5.
    pub optical_size: Option<OpticalSize>,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize)]
pub struct Os2Metrics {
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize)]
pub struct OpticalSize {
    pub us_lower_optical_point_size: u16,
    pub us_upper_optical_point_size: u16,
}

impl Os2Table {
    /// Sets the first and last char index from the smallest and largest mapped code points;
    /// values beyond the BMP are clamped to 0xFFFF.
    pub fn update_char_range(&mut self, first: u32, last: u32) {
        self.us_first_char_index = u16::try_from(first).unwrap_or(u16::MAX);
        self.us_last_char_index = u16::try_from(last).unwrap_or(u16::MAX);
    }
}

impl<'a> FontTable<'a> for Os2Table {
    const TAG: Tag = Tag::new(b"OS/2");
}

impl<'a> FontData<'a> for Os2Table {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_u16::<BigEndian>()?;
        let x_avg_char_width = rd.read_i16::<BigEndian>()?;
        let us_weight_class = rd.read_u16::<BigEndian>()?;
        let us_width_class = rd.read_u16::<BigEndian>()?;
        let fs_type = rd.read_u16::<BigEndian>()?;
        let y_subscript_x_size = rd.read_i16::<BigEndian>()?;
        let y_subscript_y_size = rd.read_i16::<BigEndian>()?;
        let y_subscript_x_offset = rd.read_i16::<BigEndian>()?;
        let y_subscript_y_offset = rd.read_i16::<BigEndian>()?;
        let y_superscript_x_size = rd.read_i16::<BigEndian>()?;
        let y_superscript_y_size = rd.read_i16::<BigEndian>()?;
        let y_superscript_x_offset = rd.read_i16::<BigEndian>()?;
        let y_superscript_y_offset = rd.read_i16::<BigEndian>()?;
        let y_strikeout_size = rd.read_i16::<BigEndian>()?;
        let y_strikeout_position = rd.read_i16::<BigEndian>()?;
        let s_family_class = rd.read_i16::<BigEndian>()?;
        let mut panose = [0; 10];
        rd.read_exact(&mut panose)?;
        let mut ul_unicode_range = [0; 4];
        rd.read_u32_into::<BigEndian>(&mut ul_unicode_range)?;
        let ach_vend_id = rd.read_tag()?;
        let fs_selection = rd.read_u16::<BigEndian>()?;
        let us_first_char_index = rd.read_u16::<BigEndian>()?;
        let us_last_char_index = rd.read_u16::<BigEndian>()?;
        let s_typo_ascender = rd.read_i16::<BigEndian>()?;
        let s_typo_descender = rd.read_i16::<BigEndian>()?;
        let s_typo_line_gap = rd.read_i16::<BigEndian>()?;
        let us_win_ascent = rd.read_u16::<BigEndian>()?;
        let us_win_descent = rd.read_u16::<BigEndian>()?;

        let code_page_range = if version >= 1 {
            Some([rd.read_u32::<BigEndian>()?, rd.read_u32::<BigEndian>()?])
        } else {
            None
        };

        let metrics = if version >= 2 {
            Some(Os2Metrics {
                sx_height: rd.read_i16::<BigEndian>()?,
                s_cap_height: rd.read_i16::<BigEndian>()?,
                us_default_char: rd.read_u16::<BigEndian>()?,
                us_break_char: rd.read_u16::<BigEndian>()?,
                us_max_context: rd.read_u16::<BigEndian>()?,
            })
        } else {
            None
        };

        let optical_size = if version >= 5 {
            Some(OpticalSize {
                us_lower_optical_point_size: rd.read_u16::<BigEndian>()?,
                us_upper_optical_point_size: rd.read_u16::<BigEndian>()?,
            })
        } else {
            None
        };

        Ok(Os2Table {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            y_subscript_x_size,
            y_subscript_y_size,
            y_subscript_x_offset,
            y_subscript_y_offset,
            y_superscript_x_size,
            y_superscript_y_size,
            y_superscript_x_offset,
            y_superscript_y_offset,
            y_strikeout_size,
            y_strikeout_position,
            s_family_class,
            panose,
            ul_unicode_range,
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            code_page_range,
            metrics,
            optical_size,
        })
    }

    /// Fields are written according to `version`; missing optional groups are written as zeros.
    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.version)?;
        wr.write_i16::<BigEndian>(self.x_avg_char_width)?;
        wr.write_u16::<BigEndian>(self.us_weight_class)?;
        wr.write_u16::<BigEndian>(self.us_width_class)?;
        wr.write_u16::<BigEndian>(self.fs_type)?;
        wr.write_i16::<BigEndian>(self.y_subscript_x_size)?;
        wr.write_i16::<BigEndian>(self.y_subscript_y_size)?;
        wr.write_i16::<BigEndian>(self.y_subscript_x_offset)?;
        wr.write_i16::<BigEndian>(self.y_subscript_y_offset)?;
        wr.write_i16::<BigEndian>(self.y_superscript_x_size)?;
        wr.write_i16::<BigEndian>(self.y_superscript_y_size)?;
        wr.write_i16::<BigEndian>(self.y_superscript_x_offset)?;
        wr.write_i16::<BigEndian>(self.y_superscript_y_offset)?;
        wr.write_i16::<BigEndian>(self.y_strikeout_size)?;
        wr.write_i16::<BigEndian>(self.y_strikeout_position)?;
        wr.write_i16::<BigEndian>(self.s_family_class)?;
        wr.write_all(&self.panose)?;
        for range in &self.ul_unicode_range {
            wr.write_u32::<BigEndian>(*range)?;
        }
        wr.write_tag(self.ach_vend_id)?;
        wr.write_u16::<BigEndian>(self.fs_selection)?;
        wr.write_u16::<BigEndian>(self.us_first_char_index)?;
        wr.write_u16::<BigEndian>(self.us_last_char_index)?;
        wr.write_i16::<BigEndian>(self.s_typo_ascender)?;
        wr.write_i16::<BigEndian>(self.s_typo_descender)?;
        wr.write_i16::<BigEndian>(self.s_typo_line_gap)?;
        wr.write_u16::<BigEndian>(self.us_win_ascent)?;
        wr.write_u16::<BigEndian>(self.us_win_descent)?;

        if self.version >= 1 {
            for range in self.code_page_range.unwrap_or_default() {
                wr.write_u32::<BigEndian>(range)?;
            }
        }

        if self.version >= 2 {
            let metrics = self.metrics.clone().unwrap_or_default();
            wr.write_i16::<BigEndian>(metrics.sx_height)?;
            wr.write_i16::<BigEndian>(metrics.s_cap_height)?;
            wr.write_u16::<BigEndian>(metrics.us_default_char)?;
            wr.write_u16::<BigEndian>(metrics.us_break_char)?;
            wr.write_u16::<BigEndian>(metrics.us_max_context)?;
        }

        if self.version >= 5 {
            let optical_size = self.optical_size.clone().unwrap_or_default();
            wr.write_u16::<BigEndian>(optical_size.us_lower_optical_point_size)?;
            wr.write_u16::<BigEndian>(optical_size.us_upper_optical_point_size)?;
        }

        Ok(())
    }
}
