use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::FontData;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Byte encoding table: a one-to-one mapping of the single byte character codes 0..=255.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format0 {
    pub language: u16,
    /// 256 glyph ids, one per character code.
    pub glyph_id_array: Vec<u8>,
}

impl Format0 {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let codepoint = usize::try_from(codepoint).ok()?;
        self.glyph_id_array.get(codepoint).map(|id| u16::from(*id))
    }

    pub fn mapping(&self) -> Vec<(u32, u16)> {
        self.glyph_id_array
            .iter()
            .enumerate()
            .map(|(codepoint, glyph_id)| (codepoint as u32, u16::from(*glyph_id)))
            .collect()
    }
}

impl<'a> FontData<'a> for Format0 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u16::<BigEndian>()?;
        let glyph_id_array = codec::read_bytes(rd, 256)?;
        Ok(Format0 {
            language,
            glyph_id_array,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        if self.glyph_id_array.len() != 256 {
            return Err(Error::malformed(
                "cmap",
                format!(
                    "format 0 requires 256 glyph ids, found {}",
                    self.glyph_id_array.len()
                ),
            ));
        }
        wr.write_u16::<BigEndian>(self.language)?;
        wr.write_all(&self.glyph_id_array)?;
        Ok(())
    }
}
