use std::collections::BTreeMap;
use std::io::{self, Cursor};

use crate::codec::{self, ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use crate::tables::{FontData, FontTable};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table contains a dictionary of all font tables included in the file.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/otff
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct OffsetTable {
    /// OpenType fonts that contain TrueType outlines should use the value of 0x00010000. OpenType
    /// fonts containing CFF data (version 1 or 2) should use 0x4F54544F ('OTTO', when
    /// re-interpreted as a Tag).
    pub sfnt_version: SfntVersion,
    /// Number of tables.
    pub num_tables: u16,
    /// (Maximum power of 2 <= numTables) x 16.
    pub search_range: u16,
    /// Log2(maximum power of 2 <= numTables).
    pub entry_selector: u16,
    /// NumTables x 16-searchRange.
    pub range_shift: u16,
    /// Table records of the font, keyed (and thereby sorted) by their tag.
    pub tables: BTreeMap<Tag, TableRecord>,
}

/// The binary search helpers `(search_range, entry_selector, range_shift)` for `num_tables`.
pub fn search_params(num_tables: u16) -> (u16, u16, u16) {
    if num_tables == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector).saturating_mul(16);
    let range_shift = num_tables.saturating_mul(16).saturating_sub(search_range);
    (search_range, entry_selector, range_shift)
}

impl OffsetTable {
    pub fn new(sfnt_version: SfntVersion, tables: BTreeMap<Tag, TableRecord>) -> Self {
        let num_tables = u16::try_from(tables.len()).unwrap_or(u16::MAX);
        let (search_range, entry_selector, range_shift) = search_params(num_tables);
        OffsetTable {
            sfnt_version,
            num_tables,
            search_range,
            entry_selector,
            range_shift,
            tables,
        }
    }

    pub fn get_table_record(&self, tag: Tag) -> Option<&TableRecord> {
        self.tables.get(&tag)
    }

    /// The raw bytes of the table `tag`, bounds checked against `data`.
    pub fn table_data<'d>(&self, tag: Tag, data: &'d [u8]) -> Result<Option<&'d [u8]>, Error> {
        match self.get_table_record(tag) {
            Some(record) => {
                codec::sub_slice(data, record.offset as usize, record.length as usize).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn unpack_table<'a, T>(&self, data: &[u8], dep: T::UnpackDep) -> Result<Option<T>, Error>
    where
        T: FontTable<'a>,
    {
        let table_data = match self.table_data(T::TAG, data)? {
            Some(table_data) => table_data,
            None => return Ok(None),
        };
        Ok(Some(T::unpack(&mut Cursor::new(table_data), dep)?))
    }

    pub fn unpack_required_table<'a, T>(&self, data: &[u8], dep: T::UnpackDep) -> Result<T, Error>
    where
        T: FontTable<'a>,
    {
        self.unpack_table::<T>(data, dep)?
            .ok_or(Error::MissingRequiredTable(T::TAG))
    }
}

impl<'a> FontData<'a> for OffsetTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let sfnt_version = SfntVersion::unpack(rd, ())?;
        let num_tables = rd.read_u16::<BigEndian>()?;
        let search_range = rd.read_u16::<BigEndian>()?;
        let entry_selector = rd.read_u16::<BigEndian>()?;
        let range_shift = rd.read_u16::<BigEndian>()?;

        codec::ensure_remaining(rd, usize::from(num_tables) * 16)?;
        let mut tables = BTreeMap::new();
        for _ in 0..num_tables {
            let record = TableRecord::unpack(rd, ())?;
            if record.offset % 4 != 0 {
                log::debug!("Table `{}` is not 4-byte aligned", record.tag);
            }
            if tables.insert(record.tag, record).is_some() {
                return Err(Error::DuplicateTable(record.tag));
            }
        }

        Ok(OffsetTable {
            sfnt_version,
            num_tables,
            search_range,
            entry_selector,
            range_shift,
            tables,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        self.sfnt_version.pack(wr, ())?;
        wr.write_u16::<BigEndian>(self.num_tables)?;
        wr.write_u16::<BigEndian>(self.search_range)?;
        wr.write_u16::<BigEndian>(self.entry_selector)?;
        wr.write_u16::<BigEndian>(self.range_shift)?;
        for record in self.tables.values() {
            record.pack(wr, ())?;
        }
        Ok(())
    }
}

/// The scaler type of the font.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum SfntVersion {
    /// 0x00010000
    TrueType,
    /// 'true', used by some older Apple fonts
    AppleTrueType,
    /// 'OTTO'
    Cff,
    /// 'typ1'
    Type1,
    Unknown(u32),
}

impl SfntVersion {
    pub fn to_u32(self) -> u32 {
        match self {
            SfntVersion::TrueType => 0x00010000,
            SfntVersion::AppleTrueType => 0x74727565,
            SfntVersion::Cff => 0x4F54544F,
            SfntVersion::Type1 => 0x74797031,
            SfntVersion::Unknown(v) => v,
        }
    }
}

impl From<u32> for SfntVersion {
    fn from(v: u32) -> Self {
        match v {
            0x00010000 => SfntVersion::TrueType,
            0x74727565 => SfntVersion::AppleTrueType,
            0x4F54544F => SfntVersion::Cff,
            0x74797031 => SfntVersion::Type1,
            v => SfntVersion::Unknown(v),
        }
    }
}

impl<'a> FontData<'a> for SfntVersion {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = SfntVersion::from(rd.read_u32::<BigEndian>()?);
        if let SfntVersion::Unknown(v) = version {
            log::warn!("Unknown sfnt version {:#010x}", v);
        }
        Ok(version)
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.to_u32())?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct TableRecord {
    pub tag: Tag,
    pub check_sum: u32,
    /// Offset from beginning of the font file.
    pub offset: u32,
    /// Length of the table, excluding padding.
    pub length: u32,
}

impl<'a> FontData<'a> for TableRecord {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(TableRecord {
            tag: rd.read_tag()?,
            check_sum: rd.read_u32::<BigEndian>()?,
            offset: rd.read_u32::<BigEndian>()?,
            length: rd.read_u32::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_tag(self.tag)?;
        wr.write_u32::<BigEndian>(self.check_sum)?;
        wr.write_u32::<BigEndian>(self.offset)?;
        wr.write_u32::<BigEndian>(self.length)?;
        Ok(())
    }
}
