use std::io::{self, Cursor};

use super::format12::{self, SequentialMapGroup};
use crate::codec;
use crate::error::Error;
use crate::tables::FontData;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

const IS32_LEN: usize = 8192;

/// Mixed 16-bit and 32-bit coverage.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format8 {
    pub language: u32,
    /// Tightly packed array of bits indicating whether the particular 16-bit (index) value is
    /// the start of a 32-bit character code.
    #[serde(skip)]
    pub is32: Vec<u8>,
    pub groups: Vec<SequentialMapGroup>,
}

impl Format8 {
    pub fn mapping(&self) -> Result<Vec<(u32, u16)>, Error> {
        format12::map_groups(&self.groups, false)
    }
}

impl<'a> FontData<'a> for Format8 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u32::<BigEndian>()?;
        let is32 = codec::read_bytes(rd, IS32_LEN)?;
        let groups = format12::unpack_groups(rd)?;
        Ok(Format8 {
            language,
            is32,
            groups,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        if self.is32.len() != IS32_LEN {
            return Err(Error::malformed(
                "cmap",
                format!("format 8 is32 must have {} bytes", IS32_LEN),
            ));
        }
        wr.write_u32::<BigEndian>(self.language)?;
        wr.write_all(&self.is32)?;
        format12::pack_groups(wr, &self.groups)
    }
}
