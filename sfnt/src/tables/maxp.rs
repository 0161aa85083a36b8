use std::io::{self, Cursor};

use super::{FontData, FontTable};
use crate::codec::Tag;
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table establishes the memory requirements for this font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/maxp
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum MaxpTable {
    // Version 0.5
    Cff(CffMaxpTable),
    // Version 1.0
    TrueType(TrueTypeMaxpTable),
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct CffMaxpTable {
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct TrueTypeMaxpTable {
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
    /// Maximum points in a non-composite glyph.
    pub max_points: u16,
    /// Maximum contours in a non-composite glyph.
    pub max_contours: u16,
    /// Maximum points in a composite glyph.
    pub max_component_points: u16,
    /// Maximum contours in a composite glyph.
    pub max_component_contours: u16,
    /// 1 if instructions do not use the twilight zone (Z0), or 2 if instructions do use Z0.
    pub max_zones: u16,
    /// Maximum points used in Z0.
    pub max_twilight_points: u16,
    /// Number of Storage Area locations.
    pub max_storage: u16,
    /// Number of FDEFs, equal to the highest function number + 1.
    pub max_function_defs: u16,
    /// Number of IDEFs.
    pub max_instruction_defs: u16,
    /// Maximum stack depth across Font Program, CVT Program and all glyph instructions.
    pub max_stack_elements: u16,
    /// Maximum byte count for glyph instructions.
    pub max_size_of_instructions: u16,
    /// Maximum number of components referenced at “top level” for any composite glyph.
    pub max_component_elements: u16,
    /// Maximum levels of recursion; 1 for simple components.
    pub max_component_depth: u16,
}

impl MaxpTable {
    pub fn num_glyphs(&self) -> u16 {
        match self {
            MaxpTable::Cff(table) => table.num_glyphs,
            MaxpTable::TrueType(table) => table.num_glyphs,
        }
    }

    pub fn set_num_glyphs(&mut self, num_glyphs: u16) {
        match self {
            MaxpTable::Cff(table) => table.num_glyphs = num_glyphs,
            MaxpTable::TrueType(table) => table.num_glyphs = num_glyphs,
        }
    }

    /// The table version formatted as `major.minor`.
    pub fn version(&self) -> &'static str {
        match self {
            MaxpTable::Cff(_) => "0.5",
            MaxpTable::TrueType(_) => "1.0",
        }
    }
}

impl<'a> FontTable<'a> for MaxpTable {
    const TAG: Tag = Tag::new(b"maxp");
}

impl<'a> FontData<'a> for MaxpTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_u32::<BigEndian>()?;
        match version {
            0x00005000 => Ok(MaxpTable::Cff(CffMaxpTable {
                num_glyphs: rd.read_u16::<BigEndian>()?,
            })),
            0x00010000 => Ok(MaxpTable::TrueType(TrueTypeMaxpTable::unpack(rd, ())?)),
            _ => Err(Error::UnsupportedVersion {
                table: "maxp",
                version,
            }),
        }
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        match self {
            MaxpTable::Cff(table) => {
                // version
                wr.write_u32::<BigEndian>(0x00005000)?;
                wr.write_u16::<BigEndian>(table.num_glyphs)?;
            }
            MaxpTable::TrueType(table) => {
                // version
                wr.write_u32::<BigEndian>(0x00010000)?;
                table.pack(wr, ())?;
            }
        }

        Ok(())
    }
}

impl<'a> FontData<'a> for TrueTypeMaxpTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(TrueTypeMaxpTable {
            num_glyphs: rd.read_u16::<BigEndian>()?,
            max_points: rd.read_u16::<BigEndian>()?,
            max_contours: rd.read_u16::<BigEndian>()?,
            max_component_points: rd.read_u16::<BigEndian>()?,
            max_component_contours: rd.read_u16::<BigEndian>()?,
            max_zones: rd.read_u16::<BigEndian>()?,
            max_twilight_points: rd.read_u16::<BigEndian>()?,
            max_storage: rd.read_u16::<BigEndian>()?,
            max_function_defs: rd.read_u16::<BigEndian>()?,
            max_instruction_defs: rd.read_u16::<BigEndian>()?,
            max_stack_elements: rd.read_u16::<BigEndian>()?,
            max_size_of_instructions: rd.read_u16::<BigEndian>()?,
            max_component_elements: rd.read_u16::<BigEndian>()?,
            max_component_depth: rd.read_u16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.num_glyphs)?;
        wr.write_u16::<BigEndian>(self.max_points)?;
        wr.write_u16::<BigEndian>(self.max_contours)?;
        wr.write_u16::<BigEndian>(self.max_component_points)?;
        wr.write_u16::<BigEndian>(self.max_component_contours)?;
        wr.write_u16::<BigEndian>(self.max_zones)?;
        wr.write_u16::<BigEndian>(self.max_twilight_points)?;
        wr.write_u16::<BigEndian>(self.max_storage)?;
        wr.write_u16::<BigEndian>(self.max_function_defs)?;
        wr.write_u16::<BigEndian>(self.max_instruction_defs)?;
        wr.write_u16::<BigEndian>(self.max_stack_elements)?;
        wr.write_u16::<BigEndian>(self.max_size_of_instructions)?;
        wr.write_u16::<BigEndian>(self.max_component_elements)?;
        wr.write_u16::<BigEndian>(self.max_component_depth)?;
        Ok(())
    }
}
