use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::{checked_u32, FontData};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Trimmed array: a dense range of 32-bit character codes.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format10 {
    pub language: u32,
    /// First character code covered.
    pub start_char_code: u32,
    /// Array of glyph indices for the character codes covered.
    pub glyphs: Vec<u16>,
}

impl Format10 {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let index = codepoint.checked_sub(self.start_char_code)?;
        self.glyphs.get(usize::try_from(index).ok()?).copied()
    }

    pub fn mapping(&self) -> Vec<(u32, u16)> {
        (self.start_char_code..)
            .zip(&self.glyphs)
            .map(|(codepoint, glyph_id)| (codepoint, *glyph_id))
            .collect()
    }
}

impl<'a> FontData<'a> for Format10 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u32::<BigEndian>()?;
        let start_char_code = rd.read_u32::<BigEndian>()?;
        let num_chars = rd.read_u32::<BigEndian>()? as usize;
        codec::ensure_remaining(rd, num_chars.saturating_mul(2))?;
        let mut glyphs = vec![0; num_chars];
        rd.read_u16_into::<BigEndian>(&mut glyphs)?;
        Ok(Format10 {
            language,
            start_char_code,
            glyphs,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.language)?;
        wr.write_u32::<BigEndian>(self.start_char_code)?;
        wr.write_u32::<BigEndian>(checked_u32(self.glyphs.len(), "format 10 glyph ids")?)?;
        for glyph_id in &self.glyphs {
            wr.write_u16::<BigEndian>(*glyph_id)?;
        }
        Ok(())
    }
}
