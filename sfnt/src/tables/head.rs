use std::io::{self, Cursor};

use super::{FontData, FontTable};
use crate::codec::{ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table gives global information about the font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/head
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct HeadTable {
    /// Table version as `major.minor`, expected to be `1.0`.
    pub version: String,
    pub font_revision: f64,
    /// Recomputed whenever the font is written.
    pub check_sum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    /// Seconds since the Unix epoch.
    pub created: i64,
    /// Seconds since the Unix epoch.
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

impl HeadTable {
    pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

    /// Byte offset of `check_sum_adjustment` within the encoded table.
    pub(crate) const CHECK_SUM_ADJUSTMENT_OFFSET: usize = 8;
}

impl<'a> FontTable<'a> for HeadTable {
    const TAG: Tag = Tag::new(b"head");
}

impl<'a> FontData<'a> for HeadTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_version()?;
        let font_revision = rd.read_fixed()?;
        let check_sum_adjustment = rd.read_u32::<BigEndian>()?;
        let magic_number = rd.read_u32::<BigEndian>()?;
        if magic_number != Self::MAGIC_NUMBER {
            log::warn!("Unexpected head magic number {:#010x}", magic_number);
        }

        Ok(HeadTable {
            version,
            font_revision,
            check_sum_adjustment,
            magic_number,
            flags: rd.read_u16::<BigEndian>()?,
            units_per_em: rd.read_u16::<BigEndian>()?,
            created: rd.read_long_date_time()?,
            modified: rd.read_long_date_time()?,
            x_min: rd.read_i16::<BigEndian>()?,
            y_min: rd.read_i16::<BigEndian>()?,
            x_max: rd.read_i16::<BigEndian>()?,
            y_max: rd.read_i16::<BigEndian>()?,
            mac_style: rd.read_u16::<BigEndian>()?,
            lowest_rec_ppem: rd.read_u16::<BigEndian>()?,
            font_direction_hint: rd.read_i16::<BigEndian>()?,
            index_to_loc_format: rd.read_i16::<BigEndian>()?,
            glyph_data_format: rd.read_i16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_version(&self.version)?;
        wr.write_fixed(self.font_revision)?;
        wr.write_u32::<BigEndian>(self.check_sum_adjustment)?;
        wr.write_u32::<BigEndian>(self.magic_number)?;
        wr.write_u16::<BigEndian>(self.flags)?;
        wr.write_u16::<BigEndian>(self.units_per_em)?;
        wr.write_long_date_time(self.created)?;
        wr.write_long_date_time(self.modified)?;
        wr.write_i16::<BigEndian>(self.x_min)?;
        wr.write_i16::<BigEndian>(self.y_min)?;
        wr.write_i16::<BigEndian>(self.x_max)?;
        wr.write_i16::<BigEndian>(self.y_max)?;
        wr.write_u16::<BigEndian>(self.mac_style)?;
        wr.write_u16::<BigEndian>(self.lowest_rec_ppem)?;
        wr.write_i16::<BigEndian>(self.font_direction_hint)?;
        wr.write_i16::<BigEndian>(self.index_to_loc_format)?;
        wr.write_i16::<BigEndian>(self.glyph_data_format)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    #[rustfmt::skip]
    const HEAD: [u8; 54] = [
        0x00, 0x01, 0x00, 0x00, // version
        0x00, 0x03, 0x07, 0xEF, // font revision
        0xD3, 0x6B, 0x01, 0x0B, // check sum adjustment
        0x5F, 0x0F, 0x3C, 0xF5, // magic number
        0x00, 0x0D, // flags
        0x03, 0xE8, // units per em
        0x00, 0x00, 0x00, 0x00, 0xD4, 0x58, 0x40, 0x5F, // created
        0x00, 0x00, 0x00, 0x00, 0xDB, 0x3A, 0x81, 0x7A, // modified
        0xFC, 0x18, // x min
        0xFE, 0x07, // y min
        0x04, 0x6E, // x max
        0x04, 0xA4, // y max
        0x00, 0x00, // mac style
        0x00, 0x08, // lowest rec ppem
        0x00, 0x00, // font direction hint
        0x00, 0x01, // index to loc format
        0x00, 0x00, // glyph data format
    ];

    #[test]
    fn test_head_table_encode_decode() {
        let head_table = HeadTable::unpack(&mut Cursor::new(&HEAD[..]), ()).unwrap();

        assert_eq!(head_table.version, "1.0");
        assert_eq!(head_table.font_revision, 3.0 + f64::from(0x07EF) / 65536.0);
        assert_eq!(head_table.check_sum_adjustment, 3547005195);
        assert_eq!(head_table.magic_number, HeadTable::MAGIC_NUMBER);
        assert_eq!(head_table.flags, 13);
        assert_eq!(head_table.units_per_em, 1000);
        assert_eq!(head_table.created, 3562553439 - 2_082_844_800);
        assert_eq!(head_table.modified, 3678044538 - 2_082_844_800);
        assert_eq!(head_table.x_min, -1000);
        assert_eq!(head_table.y_min, -505);
        assert_eq!(head_table.x_max, 1134);
        assert_eq!(head_table.y_max, 1188);
        assert_eq!(head_table.mac_style, 0);
        assert_eq!(head_table.lowest_rec_ppem, 8);
        assert_eq!(head_table.font_direction_hint, 0);
        assert_eq!(head_table.index_to_loc_format, 1);
        assert_eq!(head_table.glyph_data_format, 0);

        // re-pack and compare
        let mut buffer = Vec::new();
        head_table.pack(&mut buffer, ()).unwrap();
        assert_eq!(&buffer[..], &HEAD[..]);
    }

    #[test]
    fn test_truncated_head_table() {
        let result = HeadTable::unpack(&mut Cursor::new(&HEAD[..40]), ());
        assert!(matches!(result, Err(Error::Truncated)));
    }
}
