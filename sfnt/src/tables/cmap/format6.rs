use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::{checked_u16, FontData};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Trimmed table mapping: a dense range of 16-bit character codes.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format6 {
    pub language: u16,
    /// First character code of subrange.
    pub first_code: u16,
    /// Glyph index values for the character codes in the range.
    pub glyph_id_array: Vec<u16>,
}

impl Format6 {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let index = codepoint.checked_sub(u32::from(self.first_code))?;
        self.glyph_id_array
            .get(usize::try_from(index).ok()?)
            .copied()
    }

    pub fn mapping(&self) -> Vec<(u32, u16)> {
        self.glyph_id_array
            .iter()
            .enumerate()
            .map(|(i, glyph_id)| (u32::from(self.first_code) + i as u32, *glyph_id))
            .collect()
    }
}

impl<'a> FontData<'a> for Format6 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u16::<BigEndian>()?;
        let first_code = rd.read_u16::<BigEndian>()?;
        let entry_count = usize::from(rd.read_u16::<BigEndian>()?);
        codec::ensure_remaining(rd, entry_count * 2)?;
        let mut glyph_id_array = vec![0; entry_count];
        rd.read_u16_into::<BigEndian>(&mut glyph_id_array)?;
        Ok(Format6 {
            language,
            first_code,
            glyph_id_array,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.language)?;
        wr.write_u16::<BigEndian>(self.first_code)?;
        wr.write_u16::<BigEndian>(checked_u16(
            self.glyph_id_array.len(),
            "format 6 glyph ids",
        )?)?;
        for glyph_id in &self.glyph_id_array {
            wr.write_u16::<BigEndian>(*glyph_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cmap_subtable_format6_encode_decode() {
        let data = [
            0x00, 0x00, // language
            0x00, 0x41, // firstCode
            0x00, 0x03, // entryCount
            0x00, 0x05, 0x00, 0x00, 0x00, 0x07,
        ];
        let format6 = Format6::unpack(&mut Cursor::new(&data[..]), ()).unwrap();
        assert_eq!(format6.glyph_id(0x41), Some(5));
        assert_eq!(format6.glyph_id(0x40), None);
        assert_eq!(format6.glyph_id(0x44), None);
        assert_eq!(format6.mapping(), vec![(0x41, 5), (0x42, 0), (0x43, 7)]);

        // re-pack and compare
        let mut buffer = Vec::new();
        format6.pack(&mut buffer, ()).unwrap();
        assert_eq!(buffer, data);
    }
}
