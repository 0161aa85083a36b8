use std::collections::BTreeMap;
use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::{checked_u32, FontData};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Highest Unicode scalar value; groups reaching beyond it are cut off when enumerated.
const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Segmented coverage (format 12) and many-to-one range mappings (format 13) share this layout.
/// Format 8 uses the same groups, preceded by its `is32` bitmap.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format12 {
    pub language: u32,
    pub groups: Vec<SequentialMapGroup>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct SequentialMapGroup {
    /// First character code in this group.
    pub start_char_code: u32,
    /// Last character code in this group.
    pub end_char_code: u32,
    /// Glyph index of the first character code (format 12) or of all character codes
    /// (format 13).
    pub start_glyph_id: u32,
}

impl Format12 {
    pub fn glyph_id(&self, codepoint: u32, many_to_one: bool) -> Option<u16> {
        let ix = self
            .groups
            .partition_point(|group| group.end_char_code < codepoint);
        let group = self.groups.get(ix)?;
        if group.start_char_code > codepoint {
            return None;
        }
        group.glyph_id(codepoint, many_to_one).ok()
    }

    pub fn mapping(&self, many_to_one: bool) -> Result<Vec<(u32, u16)>, Error> {
        map_groups(&self.groups, many_to_one)
    }

    /// Builds format 12 groups of consecutive code points mapped to consecutive glyphs.
    pub fn from_mapping(mapping: &BTreeMap<u32, u16>) -> Self {
        let mut groups: Vec<SequentialMapGroup> = Vec::new();
        for (codepoint, glyph_id) in mapping {
            let glyph_id = u32::from(*glyph_id);
            if let Some(prev) = groups.last_mut() {
                let len = prev.end_char_code - prev.start_char_code;
                if prev.end_char_code.checked_add(1) == Some(*codepoint)
                    && prev.start_glyph_id + len + 1 == glyph_id
                {
                    prev.end_char_code = *codepoint;
                    continue;
                }
            }
            groups.push(SequentialMapGroup {
                start_char_code: *codepoint,
                end_char_code: *codepoint,
                start_glyph_id: glyph_id,
            });
        }

        Format12 {
            language: 0,
            groups,
        }
    }
}

impl SequentialMapGroup {
    fn glyph_id(&self, codepoint: u32, many_to_one: bool) -> Result<u16, Error> {
        let glyph_id = if many_to_one {
            self.start_glyph_id
        } else {
            self.start_glyph_id
                .saturating_add(codepoint - self.start_char_code)
        };
        u16::try_from(glyph_id).map_err(|_| {
            Error::malformed(
                "cmap",
                format!("glyph index {} of U+{:04X} is out of range", glyph_id, codepoint),
            )
        })
    }
}

pub(super) fn map_groups(
    groups: &[SequentialMapGroup],
    many_to_one: bool,
) -> Result<Vec<(u32, u16)>, Error> {
    let mut mapping = Vec::new();
    for group in groups {
        if group.start_char_code > group.end_char_code {
            return Err(Error::malformed(
                "cmap",
                format!(
                    "group {}..{} ends before it starts",
                    group.start_char_code, group.end_char_code
                ),
            ));
        }
        for codepoint in group.start_char_code..=group.end_char_code.min(MAX_CODEPOINT) {
            mapping.push((codepoint, group.glyph_id(codepoint, many_to_one)?));
        }
    }
    Ok(mapping)
}

pub(super) fn unpack_groups<R: AsRef<[u8]>>(
    rd: &mut Cursor<R>,
) -> Result<Vec<SequentialMapGroup>, Error> {
    let num_groups = rd.read_u32::<BigEndian>()? as usize;
    codec::ensure_remaining(rd, num_groups.saturating_mul(12))?;
    let mut groups = Vec::with_capacity(num_groups);
    for _ in 0..num_groups {
        groups.push(SequentialMapGroup::unpack(rd, ())?);
    }
    Ok(groups)
}

pub(super) fn pack_groups<W: io::Write>(
    wr: &mut W,
    groups: &[SequentialMapGroup],
) -> Result<(), Error> {
    wr.write_u32::<BigEndian>(checked_u32(groups.len(), "cmap groups")?)?;
    for group in groups {
        group.pack(wr, ())?;
    }
    Ok(())
}

impl<'a> FontData<'a> for Format12 {
    type UnpackDep = ();
    type PackDep = ();

    /// Reads the subtable following its format, reserved and length fields.
    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u32::<BigEndian>()?;
        let groups = unpack_groups(rd)?;
        Ok(Format12 { language, groups })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.language)?;
        pack_groups(wr, &self.groups)
    }
}

impl<'a> FontData<'a> for SequentialMapGroup {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(SequentialMapGroup {
            start_char_code: rd.read_u32::<BigEndian>()?,
            end_char_code: rd.read_u32::<BigEndian>()?,
            start_glyph_id: rd.read_u32::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.start_char_code)?;
        wr.write_u32::<BigEndian>(self.end_char_code)?;
        wr.write_u32::<BigEndian>(self.start_glyph_id)?;
        Ok(())
    }
}
