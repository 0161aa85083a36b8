use std::io::{self, Cursor};

use super::head::HeadTable;
use super::maxp::MaxpTable;
use super::{FontData, FontTable};
use crate::codec::{self, Tag};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table stores the offsets to the locations of the glyphs in the font, relative to the
/// beginning of the glyph data table.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/loca
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6loca.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LocaTable {
    /// Offsets indexed by glyph id. The size of a glyph data block is inferred from the difference
    /// between two consecutive offsets. The last offset marks the end of the last glyph.
    pub offsets: Vec<u32>,
    // not part of the table itself, but mirrors head.index_to_loc_format
    pub format: Format,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Format {
    /// Offsets divided by 2, stored as u16.
    Short,
    /// Offsets stored as u32.
    Long,
}

impl Format {
    pub fn from_index_to_loc_format(index_to_loc_format: i16) -> Self {
        if index_to_loc_format == 0 {
            Format::Short
        } else {
            Format::Long
        }
    }

    pub fn index_to_loc_format(self) -> i16 {
        match self {
            Format::Short => 0,
            Format::Long => 1,
        }
    }
}

impl LocaTable {
    /// Builds a table for freshly laid out glyph data. The short format is kept if it was
    /// `preferred` and every offset is representable in it.
    pub fn from_offsets(offsets: Vec<u32>, preferred: Format) -> Self {
        let fits_short = offsets.last().map_or(true, |last| *last <= 0x1FFFE)
            && offsets.iter().all(|offset| offset % 2 == 0);
        let format = if preferred == Format::Short && fits_short {
            Format::Short
        } else {
            Format::Long
        };
        LocaTable { offsets, format }
    }

    /// Number of glyphs located by this table.
    pub fn num_glyphs(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// The byte range of `glyph_id` within the glyf table.
    pub fn glyph_range(&self, glyph_id: usize) -> Option<(u32, u32)> {
        let start = *self.offsets.get(glyph_id)?;
        let end = *self.offsets.get(glyph_id + 1)?;
        Some((start, end))
    }
}

impl<'a> FontTable<'a> for LocaTable {
    const TAG: Tag = Tag::new(b"loca");
}

impl<'a> FontData<'a> for LocaTable {
    type UnpackDep = (&'a HeadTable, &'a MaxpTable);
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        (head, maxp): Self::UnpackDep,
    ) -> Result<Self, Error> {
        let format = Format::from_index_to_loc_format(head.index_to_loc_format);
        let n = usize::from(maxp.num_glyphs()) + 1;
        let entry_size = match format {
            Format::Short => 2,
            Format::Long => 4,
        };
        codec::ensure_remaining(rd, n * entry_size)?;

        let mut offsets = Vec::with_capacity(n);
        for _ in 0..n {
            offsets.push(match format {
                Format::Short => u32::from(rd.read_u16::<BigEndian>()?) * 2,
                Format::Long => rd.read_u32::<BigEndian>()?,
            });
        }

        if let Some(i) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::malformed(
                "loca",
                format!("offset of glyph {} precedes offset of glyph {}", i + 1, i),
            ));
        }

        Ok(LocaTable { offsets, format })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        for offset in &self.offsets {
            match self.format {
                Format::Short => {
                    let half = u16::try_from(offset / 2)
                        .map_err(|_| Error::malformed("loca", "offset exceeds the short format"))?;
                    wr.write_u16::<BigEndian>(half)?
                }
                Format::Long => wr.write_u32::<BigEndian>(*offset)?,
            }
        }
        Ok(())
    }
}
