mod format0;
mod format10;
mod format12;
mod format14;
mod format2;
mod format4;
mod format6;
mod format8;

use std::collections::BTreeMap;
use std::io::{self, Cursor};

use super::{checked_u16, checked_u32, FontData, FontTable};
use crate::codec::{self, Tag};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

pub use format0::Format0;
pub use format10::Format10;
pub use format12::{Format12, SequentialMapGroup};
pub use format14::{Format14, UnicodeRange, UvsMapping, VariationSelector};
pub use format2::{Format2, SubHeader};
pub use format4::Format4;
pub use format6::Format6;
pub use format8::Format8;

/// A font's CMAP table, which defines the mapping of character codes to the glyph index values
/// used in the font. All subtable formats are decoded; the Unicode mapping used for subsetting
/// (`windows_code`) is derived from them in the following order of preference:
/// | platform ID | encoding ID | format |                                          |
/// |-------------|-------------|--------|------------------------------------------|
/// | 3           | 10          | 12     | Windows, full Unicode                    |
/// | 3           | 1           | 4      | Windows, Unicode BMP                     |
/// | 3           | 3           | 2      | Windows, PRC                             |
/// | 0           | 4 or 6      | 12     | Unicode >= 2.0, non-BMP allowed          |
/// | 0           | any         | 4      | Unicode, BMP only                        |
///
/// Format 0 subtables and the non-default sequences of a (0, 5) format 14 subtable fill in code
/// points the preferred subtable does not map.
///
/// See OpenType spec: https://docs.microsoft.com/en-us/typography/opentype/spec/cmap
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct CmapTable {
    pub version: u16,
    pub encoding_records: Vec<EncodingRecord>,
    /// Subtables by the offset they were read from. Several encoding records may share one.
    pub subtables: BTreeMap<u32, Subtable>,
    /// Unicode code point to glyph index.
    pub windows_code: BTreeMap<u32, u16>,
    /// Subtable lengths that had to be corrected while decoding.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Byte offset from beginning of table to the subtable for this encoding; the key into
    /// [`CmapTable::subtables`].
    pub offset: u32,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Subtable {
    Format0(Format0),
    Format2(Format2),
    Format4(Format4),
    Format6(Format6),
    Format8(Format8),
    Format10(Format10),
    Format12(Format12),
    Format13(Format12),
    Format14(Format14),
}

impl CmapTable {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        self.windows_code.get(&codepoint).copied()
    }

    fn find_record(&self, platform_id: u16, encoding_ids: &[u16], format: u16) -> Option<&Subtable> {
        self.encoding_records
            .iter()
            .filter(|record| {
                record.platform_id == platform_id
                    && (encoding_ids.is_empty() || encoding_ids.contains(&record.encoding_id))
            })
            .filter_map(|record| self.subtables.get(&record.offset))
            .find(|subtable| subtable.format() == format)
    }

    /// Derives the Unicode mapping from the decoded subtables.
    pub fn derive_windows_code(&self) -> Result<BTreeMap<u32, u16>, Error> {
        let primary = self
            .find_record(3, &[10], 12)
            .or_else(|| self.find_record(3, &[1], 4))
            .or_else(|| self.find_record(3, &[3], 2))
            .or_else(|| self.find_record(0, &[4, 6], 12))
            .or_else(|| self.find_record(0, &[], 4));

        let mut windows_code = BTreeMap::new();
        if let Some(subtable) = primary {
            windows_code.extend(subtable.mapping()?);
        } else {
            log::debug!("cmap has no Unicode subtable");
        }

        for record in &self.encoding_records {
            let Some(subtable) = self.subtables.get(&record.offset) else {
                continue;
            };
            let is_supplement = match subtable {
                Subtable::Format0(_) => true,
                Subtable::Format14(_) => record.platform_id == 0 && record.encoding_id == 5,
                _ => false,
            };
            if is_supplement {
                for (codepoint, glyph_id) in subtable.mapping()? {
                    windows_code.entry(codepoint).or_insert(glyph_id);
                }
            }
        }

        Ok(windows_code)
    }

    /// Builds a table for the given Unicode mapping, as needed after subsetting. Unicode and
    /// Windows format 4 and format 12 encoding records are kept and point to the rebuilt
    /// subtables; all other records are removed. A (3, 1) record is added if missing, and a (3, 10) one if the mapping contains
    /// code points beyond the BMP.
    pub fn with_mapping(&self, windows_code: BTreeMap<u32, u16>) -> CmapTable {
        const FORMAT4_KEY: u32 = 0;
        const FORMAT12_KEY: u32 = 1;

        let mut encoding_records: Vec<EncodingRecord> = self
            .encoding_records
            .iter()
            .filter(|record| matches!(record.platform_id, 0 | 3))
            .filter_map(|record| {
                let offset = match self.subtables.get(&record.offset)? {
                    Subtable::Format4(_) => FORMAT4_KEY,
                    Subtable::Format12(_) => FORMAT12_KEY,
                    _ => return None,
                };
                Some(EncodingRecord { offset, ..*record })
            })
            .collect();

        let has_record = |records: &[EncodingRecord], platform_id, encoding_id| {
            records
                .iter()
                .any(|r| r.platform_id == platform_id && r.encoding_id == encoding_id)
        };
        if !has_record(&encoding_records, 3, 1) {
            encoding_records.push(EncodingRecord {
                platform_id: 3,
                encoding_id: 1,
                offset: FORMAT4_KEY,
            });
        }
        let has_supplementary = windows_code.keys().any(|codepoint| *codepoint > 0xFFFF);
        if has_supplementary && !has_record(&encoding_records, 3, 10) {
            encoding_records.push(EncodingRecord {
                platform_id: 3,
                encoding_id: 10,
                offset: FORMAT12_KEY,
            });
        }
        encoding_records.sort_by_key(|r| (r.platform_id, r.encoding_id));
        encoding_records.dedup_by_key(|r| (r.platform_id, r.encoding_id));

        let mut subtables = BTreeMap::new();
        subtables.insert(
            FORMAT4_KEY,
            Subtable::Format4(Format4::from_mapping(&windows_code)),
        );
        if encoding_records.iter().any(|r| r.offset == FORMAT12_KEY) {
            subtables.insert(
                FORMAT12_KEY,
                Subtable::Format12(Format12::from_mapping(&windows_code)),
            );
        }

        CmapTable {
            version: self.version,
            encoding_records,
            subtables,
            windows_code,
            warnings: Vec::new(),
        }
    }
}

impl<'a> FontTable<'a> for CmapTable {
    const TAG: Tag = Tag::new(b"cmap");
}

impl<'a> FontData<'a> for CmapTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_u16::<BigEndian>()?;
        let num_tables = rd.read_u16::<BigEndian>()?;

        codec::ensure_remaining(rd, usize::from(num_tables) * 8)?;
        let mut encoding_records = Vec::with_capacity(usize::from(num_tables));
        for _ in 0..num_tables {
            encoding_records.push(EncodingRecord::unpack(rd, ())?);
        }

        let mut subtables = BTreeMap::new();
        let mut warnings = Vec::new();
        for record in &encoding_records {
            if subtables.contains_key(&record.offset) {
                continue;
            }
            rd.set_position(u64::from(record.offset));
            let subtable = Subtable::unpack(rd, &mut warnings)?;
            subtables.insert(record.offset, subtable);
        }

        let mut table = CmapTable {
            version,
            encoding_records,
            subtables,
            windows_code: BTreeMap::new(),
            warnings,
        };
        table.windows_code = table.derive_windows_code()?;
        Ok(table)
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        // subtables are written once, in the order of their keys
        let mut offsets = BTreeMap::new();
        let mut data = Vec::new();
        let header_len = 4 + self.encoding_records.len() * 8;
        for (key, subtable) in &self.subtables {
            if !self.encoding_records.iter().any(|r| r.offset == *key) {
                continue;
            }
            offsets.insert(*key, checked_u32(header_len + data.len(), "bytes of cmap")?);
            subtable.pack(&mut data, ())?;
        }

        wr.write_u16::<BigEndian>(self.version)?;
        wr.write_u16::<BigEndian>(checked_u16(self.encoding_records.len(), "cmap encoding records")?)?;
        for record in &self.encoding_records {
            let offset = offsets.get(&record.offset).ok_or_else(|| {
                Error::malformed(
                    "cmap",
                    format!(
                        "encoding record {}/{} has no subtable",
                        record.platform_id, record.encoding_id
                    ),
                )
            })?;
            EncodingRecord {
                offset: *offset,
                ..*record
            }
            .pack(wr, ())?;
        }
        wr.write_all(&data)?;
        Ok(())
    }
}

impl<'a> FontData<'a> for EncodingRecord {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(EncodingRecord {
            platform_id: rd.read_u16::<BigEndian>()?,
            encoding_id: rd.read_u16::<BigEndian>()?,
            offset: rd.read_u32::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.platform_id)?;
        wr.write_u16::<BigEndian>(self.encoding_id)?;
        wr.write_u32::<BigEndian>(self.offset)?;
        Ok(())
    }
}

impl Subtable {
    pub fn format(&self) -> u16 {
        match self {
            Subtable::Format0(_) => 0,
            Subtable::Format2(_) => 2,
            Subtable::Format4(_) => 4,
            Subtable::Format6(_) => 6,
            Subtable::Format8(_) => 8,
            Subtable::Format10(_) => 10,
            Subtable::Format12(_) => 12,
            Subtable::Format13(_) => 13,
            Subtable::Format14(_) => 14,
        }
    }

    /// All character codes mapped by this subtable with their glyph index.
    pub fn mapping(&self) -> Result<Vec<(u32, u16)>, Error> {
        match self {
            Subtable::Format0(subtable) => Ok(subtable.mapping()),
            Subtable::Format2(subtable) => subtable.mapping(),
            Subtable::Format4(subtable) => subtable.mapping(),
            Subtable::Format6(subtable) => Ok(subtable.mapping()),
            Subtable::Format8(subtable) => subtable.mapping(),
            Subtable::Format10(subtable) => Ok(subtable.mapping()),
            Subtable::Format12(subtable) => subtable.mapping(false),
            Subtable::Format13(subtable) => subtable.mapping(true),
            Subtable::Format14(subtable) => Ok(subtable.mapping()),
        }
    }

    /// Length of the format specific header preceding the data each format reads itself.
    fn header_len(format: u16) -> usize {
        match format {
            0 | 2 | 4 | 6 => 4,
            14 => 6,
            _ => 8,
        }
    }
}

impl<'a> FontData<'a> for Subtable {
    /// Collects length corrections.
    type UnpackDep = &'a mut Vec<String>;
    type PackDep = ();

    /// Reads the subtable at the cursor position. The cursor must cover the whole cmap table.
    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, warnings: Self::UnpackDep) -> Result<Self, Error> {
        let start = rd.position() as usize;
        let format = rd.read_u16::<BigEndian>()?;
        let length = match format {
            0 | 2 | 4 | 6 => usize::from(rd.read_u16::<BigEndian>()?),
            8 | 10 | 12 | 13 => {
                rd.read_u16::<BigEndian>()?; // reserved
                rd.read_u32::<BigEndian>()? as usize
            }
            14 => rd.read_u32::<BigEndian>()? as usize,
            format => {
                return Err(Error::UnsupportedFormat {
                    table: "cmap",
                    format,
                })
            }
        };

        let header_len = Self::header_len(format);
        if length < header_len {
            return Err(Error::malformed(
                "cmap",
                format!("format {} subtable length {} is too short", format, length),
            ));
        }
        let data = rd.get_ref().as_ref();
        let available = data.len().saturating_sub(start);
        let length = if length > available {
            let warning = format!(
                "cmap format {} subtable length {} exceeds the table, using the remaining {} bytes",
                format, length, available
            );
            log::warn!("{}", warning);
            warnings.push(warning);
            available
        } else {
            length
        };

        let mut rd = Cursor::new(codec::sub_slice(data, start, length)?);
        rd.set_position(header_len as u64);
        Ok(match format {
            0 => Subtable::Format0(Format0::unpack(&mut rd, ())?),
            2 => Subtable::Format2(Format2::unpack(&mut rd, ())?),
            4 => Subtable::Format4(Format4::unpack(&mut rd, ())?),
            6 => Subtable::Format6(Format6::unpack(&mut rd, ())?),
            8 => Subtable::Format8(Format8::unpack(&mut rd, ())?),
            10 => Subtable::Format10(Format10::unpack(&mut rd, ())?),
            12 => Subtable::Format12(Format12::unpack(&mut rd, ())?),
            13 => Subtable::Format13(Format12::unpack(&mut rd, ())?),
            _ => Subtable::Format14(Format14::unpack(&mut rd, ())?),
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let mut buf = Vec::new();
        match self {
            Subtable::Format0(subtable) => subtable.pack(&mut buf, ())?,
            Subtable::Format2(subtable) => subtable.pack(&mut buf, ())?,
            Subtable::Format4(subtable) => subtable.pack(&mut buf, ())?,
            Subtable::Format6(subtable) => subtable.pack(&mut buf, ())?,
            Subtable::Format8(subtable) => subtable.pack(&mut buf, ())?,
            Subtable::Format10(subtable) => subtable.pack(&mut buf, ())?,
            Subtable::Format12(subtable) | Subtable::Format13(subtable) => {
                subtable.pack(&mut buf, ())?
            }
            Subtable::Format14(subtable) => subtable.pack(&mut buf, ())?,
        }

        let format = self.format();
        let length = buf.len() + Self::header_len(format);
        wr.write_u16::<BigEndian>(format)?;
        match format {
            0 | 2 | 4 | 6 => {
                wr.write_u16::<BigEndian>(checked_u16(length, "bytes per cmap subtable")?)?;
            }
            14 => {
                wr.write_u32::<BigEndian>(checked_u32(length, "bytes per cmap subtable")?)?;
            }
            _ => {
                wr.write_u16::<BigEndian>(0)?; // reserved
                wr.write_u32::<BigEndian>(checked_u32(length, "bytes per cmap subtable")?)?;
            }
        }

        wr.write_all(&buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    fn format4(mapping: &[(u32, u16)]) -> Subtable {
        Subtable::Format4(Format4::from_mapping(&mapping.iter().copied().collect()))
    }

    fn format12(mapping: &[(u32, u16)]) -> Subtable {
        Subtable::Format12(Format12::from_mapping(&mapping.iter().copied().collect()))
    }

    fn format0(mapping: &[(u32, u16)]) -> Subtable {
        let mut glyph_id_array = vec![0; 256];
        for (codepoint, glyph_id) in mapping {
            glyph_id_array[*codepoint as usize] = *glyph_id as u8;
        }
        Subtable::Format0(Format0 {
            language: 0,
            glyph_id_array,
        })
    }

    fn cmap(records: &[(u16, u16, u32)], subtables: Vec<(u32, Subtable)>) -> CmapTable {
        let mut table = CmapTable {
            version: 0,
            encoding_records: records
                .iter()
                .map(|(platform_id, encoding_id, offset)| EncodingRecord {
                    platform_id: *platform_id,
                    encoding_id: *encoding_id,
                    offset: *offset,
                })
                .collect(),
            subtables: subtables.into_iter().collect(),
            windows_code: BTreeMap::new(),
            warnings: Vec::new(),
        };
        table.windows_code = table.derive_windows_code().unwrap();
        table
    }

    #[test]
    fn test_cmap_table_encode_decode() {
        let table = cmap(
            &[(0, 3, 0), (0, 4, 1), (3, 1, 0), (3, 10, 1)],
            vec![
                (0, format4(&[(0x41, 1), (0x42, 2)])),
                (1, format12(&[(0x41, 1), (0x42, 2), (0x1F600, 3)])),
            ],
        );

        let mut buffer = Vec::new();
        table.pack(&mut buffer, ()).unwrap();

        // the shared subtables are written once, right after the 4 encoding records
        let unpacked = CmapTable::unpack(&mut Cursor::new(&buffer[..]), ()).unwrap();
        assert_eq!(
            unpacked
                .encoding_records
                .iter()
                .map(|r| r.offset)
                .collect::<Vec<_>>(),
            vec![36, 68, 36, 68]
        );
        assert_eq!(unpacked.subtables.len(), 2);
        assert_eq!(
            unpacked.windows_code,
            [(0x41, 1), (0x42, 2), (0x1F600, 3)].into_iter().collect()
        );
        assert_eq!(unpacked.glyph_id(0x1F600), Some(3));
    }

    #[test]
    fn test_cmap_windows_code_preference() {
        // format 12 (3, 10) wins over format 4 (3, 1)
        let table = cmap(
            &[(3, 1, 0), (3, 10, 1)],
            vec![
                (0, format4(&[(0x41, 5)])),
                (1, format12(&[(0x41, 1), (0x1F600, 3)])),
            ],
        );
        assert_eq!(
            table.windows_code,
            [(0x41, 1), (0x1F600, 3)].into_iter().collect()
        );

        // format 0 only fills in missing code points
        let table = cmap(
            &[(1, 0, 0), (3, 1, 1)],
            vec![
                (0, format0(&[(0x41, 7), (0x42, 8)])),
                (1, format4(&[(0x41, 1)])),
            ],
        );
        assert_eq!(table.windows_code.get(&0x41), Some(&1));
        assert_eq!(table.windows_code.get(&0x42), Some(&8));
        assert_eq!(table.windows_code.get(&0x43), Some(&0));

        // Unicode platform fallback
        let table = cmap(&[(0, 3, 0)], vec![(0, format4(&[(0x41, 1)]))]);
        assert_eq!(table.windows_code, [(0x41, 1)].into_iter().collect());
    }

    #[test]
    fn test_cmap_variation_sequences() {
        let format14 = Subtable::Format14(Format14 {
            var_selector_records: vec![VariationSelector {
                var_selector: 0xFE0F,
                default_uvs: None,
                non_default_uvs: Some(vec![
                    UvsMapping {
                        unicode_value: 0x41,
                        glyph_id: 9,
                    },
                    UvsMapping {
                        unicode_value: 0x2764,
                        glyph_id: 4,
                    },
                ]),
            }],
        });
        let table = cmap(
            &[(0, 5, 1), (3, 1, 0)],
            vec![(0, format4(&[(0x41, 1)])), (1, format14)],
        );
        assert_eq!(
            table.windows_code,
            [(0x41, 1), (0x2764, 4)].into_iter().collect()
        );

        // re-pack and compare
        let mut buffer = Vec::new();
        table.pack(&mut buffer, ()).unwrap();
        let unpacked = CmapTable::unpack(&mut Cursor::new(&buffer[..]), ()).unwrap();
        assert_eq!(unpacked.windows_code, table.windows_code);
        assert_eq!(
            unpacked.subtables.values().collect::<Vec<_>>(),
            table.subtables.values().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_cmap_with_mapping() {
        // the Macintosh records do not describe Unicode and are dropped
        let table = cmap(
            &[(0, 3, 0), (1, 0, 2), (1, 1, 0)],
            vec![(0, format4(&[(0x41, 1)])), (2, format0(&[(0x41, 1)]))],
        );
        let mapping: BTreeMap<u32, u16> = [(0x41, 1), (0x1F600, 2)].into_iter().collect();
        let rebuilt = table.with_mapping(mapping.clone());

        assert_eq!(
            rebuilt
                .encoding_records
                .iter()
                .map(|r| (r.platform_id, r.encoding_id))
                .collect::<Vec<_>>(),
            vec![(0, 3), (3, 1), (3, 10)]
        );
        assert_eq!(rebuilt.subtables.len(), 2);

        let mut buffer = Vec::new();
        rebuilt.pack(&mut buffer, ()).unwrap();
        let unpacked = CmapTable::unpack(&mut Cursor::new(&buffer[..]), ()).unwrap();
        assert_eq!(unpacked.windows_code, mapping);
    }

    #[test]
    fn test_cmap_subtable_length_exceeds_table() {
        let data = [
            0x00, 0x00, 0x00, 0x01, // version, numTables
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, // record
            0x00, 0x06, 0x00, 0x20, // format 6, length 32
            0x00, 0x00, 0x00, 0x41, 0x00, 0x01, // language, firstCode, entryCount
            0x00, 0x05,
        ];
        let table = CmapTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap();
        assert_eq!(
            table.warnings,
            vec!["cmap format 6 subtable length 32 exceeds the table, using the remaining 12 bytes"]
        );
        let Some(Subtable::Format6(format6)) = table.subtables.get(&12) else {
            panic!("expected format 6");
        };
        assert_eq!(format6.glyph_id(0x41), Some(5));
    }

    #[test]
    fn test_cmap_unsupported_subtable_format() {
        let data = [
            0x00, 0x00, 0x00, 0x01, // version, numTables
            0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0C, // record
            0x00, 0x07, 0x00, 0x00, // format 7
        ];
        assert!(matches!(
            CmapTable::unpack(&mut Cursor::new(&data[..]), ()),
            Err(Error::UnsupportedFormat { table: "cmap", format: 7 })
        ));
    }
}
