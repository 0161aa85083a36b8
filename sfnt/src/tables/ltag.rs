use std::io::{self, Cursor};

use super::{checked_u16, checked_u32, FontData, FontTable};
use crate::codec::{self, Tag};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// The language tag table lists IETF BCP 47 language tags, referenced by index from the `name`
/// records of the Unicode platform.
/// See spec: https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6ltag.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LtagTable {
    /// Table version; set to 1.
    pub version: u32,
    /// Table flags; set to 0.
    pub flags: u32,
    pub tags: Vec<String>,
}

impl LtagTable {
    pub fn tag(&self, index: u16) -> Option<&str> {
        self.tags.get(usize::from(index)).map(String::as_str)
    }
}

impl<'a> FontTable<'a> for LtagTable {
    const TAG: Tag = Tag::new(b"ltag");
}

impl<'a> FontData<'a> for LtagTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_u32::<BigEndian>()?;
        if version != 1 {
            return Err(Error::UnsupportedVersion {
                table: "ltag",
                version,
            });
        }
        let flags = rd.read_u32::<BigEndian>()?;
        let num_tags = rd.read_u32::<BigEndian>()? as usize;

        codec::ensure_remaining(rd, num_tags.saturating_mul(4))?;
        let mut ranges = Vec::with_capacity(num_tags);
        for _ in 0..num_tags {
            let offset = rd.read_u16::<BigEndian>()?;
            let length = rd.read_u16::<BigEndian>()?;
            ranges.push((usize::from(offset), usize::from(length)));
        }

        let data = rd.get_ref().as_ref();
        let tags = ranges
            .into_iter()
            .map(|(offset, length)| {
                codec::sub_slice(data, offset, length)
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LtagTable {
            version,
            flags,
            tags,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.version)?;
        wr.write_u32::<BigEndian>(self.flags)?;
        wr.write_u32::<BigEndian>(checked_u32(self.tags.len(), "language tags")?)?;

        let mut offset = 12 + self.tags.len() * 4;
        for tag in &self.tags {
            wr.write_u16::<BigEndian>(checked_u16(offset, "bytes of language tags")?)?;
            wr.write_u16::<BigEndian>(checked_u16(tag.len(), "bytes of a language tag")?)?;
            offset += tag.len();
        }
        for tag in &self.tags {
            wr.write_all(tag.as_bytes())?;
        }

        Ok(())
    }
}
