pub mod encoding;
pub mod language;

use std::collections::BTreeMap;
use std::io::{self, Cursor};

use super::ltag::LtagTable;
use super::{checked_u16, FontData, FontTable};
use crate::codec::{self, Tag};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use encoding::Encoding;
use serde::Serialize;

/// This table includes human-readable names for features and settings, copyright notices,
/// font names, style names, and other information related to the font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/name
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6name.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct NameTable {
    /// 0 or 1; format 1 adds language-tag records.
    pub format: u16,
    /// The name records.
    pub name_records: Vec<NameRecord>,
    /// The language-tag records (format 1 only).
    pub lang_tag_records: Vec<LangTagRecord>,
    /// Raw storage area the records point into.
    #[serde(skip)]
    pub string_data: Vec<u8>,
    /// Decoded strings by property (e.g. `fontFamily`) and language tag. Derived while
    /// unpacking; the records and storage area are what gets written.
    pub names: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct NameRecord {
    /// Platform ID.
    pub platform_id: u16,
    /// Platform-specific encoding ID.
    pub encoding_id: u16,
    /// Language ID.
    pub language_id: u16,
    /// Name ID.
    pub name_id: u16,
    /// String length (in bytes).
    pub length: u16,
    /// String offset from start of storage area (in bytes).
    pub offset: u16,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LangTagRecord {
    /// Language-tag string length (in bytes)
    pub length: u16,
    /// Language-tag string offset from start of storage area (in bytes).
    pub offset: u16,
}

const PROPERTY_NAMES: [&str; 26] = [
    "copyright",
    "fontFamily",
    "fontSubfamily",
    "uniqueID",
    "fullName",
    "version",
    "postScriptName",
    "trademark",
    "manufacturer",
    "designer",
    "description",
    "manufacturerURL",
    "designerURL",
    "license",
    "licenseURL",
    "reserved",
    "preferredFamily",
    "preferredSubfamily",
    "compatibleFullName",
    "sampleText",
    "postScriptFindFontName",
    "wwsFamily",
    "wwsSubfamily",
    "lightPalette",
    "darkPalette",
    "variationsPostScriptNamePrefix",
];

/// The property a name id is stored under; ids without a well-known meaning use their decimal
/// value.
pub fn property_name(name_id: u16) -> String {
    PROPERTY_NAMES
        .get(usize::from(name_id))
        .map(|name| name.to_string())
        .unwrap_or_else(|| name_id.to_string())
}

impl NameTable {
    /// The string stored for `property` and `language`, e.g. `("fontFamily", "en")`.
    pub fn get(&self, property: &str, language: &str) -> Option<&str> {
        self.names
            .get(property)
            .and_then(|names| names.get(language))
            .map(String::as_str)
    }

    /// Decodes all records with a known encoding. Records pointing outside of the storage area
    /// are skipped.
    pub fn decode_names(&self, ltag: Option<&LtagTable>) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut names: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for record in &self.name_records {
            let encoding = match Encoding::for_record(
                record.platform_id,
                record.encoding_id,
                record.language_id,
            ) {
                Some(encoding) => encoding,
                None => {
                    log::debug!(
                        "Skipping name {} with unsupported encoding {}/{}",
                        record.name_id,
                        record.platform_id,
                        record.encoding_id
                    );
                    continue;
                }
            };
            let bytes = match codec::sub_slice(
                &self.string_data,
                usize::from(record.offset),
                usize::from(record.length),
            ) {
                Ok(bytes) => bytes,
                Err(_) => {
                    log::warn!("Name {} points outside of the storage area", record.name_id);
                    continue;
                }
            };

            names
                .entry(property_name(record.name_id))
                .or_default()
                .insert(self.language_tag(record, ltag), encoding.decode(bytes));
        }
        names
    }

    fn language_tag(&self, record: &NameRecord, ltag: Option<&LtagTable>) -> String {
        let id = record.language_id;
        let tag = match record.platform_id {
            0 if id == 0xFFFF => Some("und".to_string()),
            0 => ltag.and_then(|ltag| ltag.tag(id)).map(str::to_string),
            _ if id >= 0x8000 => self.lang_tag(usize::from(id - 0x8000)),
            1 => language::mac_language(id).map(str::to_string),
            3 => language::windows_language(id).map(str::to_string),
            _ => None,
        };
        tag.unwrap_or_else(|| id.to_string())
    }

    fn lang_tag(&self, index: usize) -> Option<String> {
        let record = self.lang_tag_records.get(index)?;
        codec::sub_slice(
            &self.string_data,
            usize::from(record.offset),
            usize::from(record.length),
        )
        .ok()
        .map(encoding::decode_utf16_be)
    }

    fn storage_offset(&self) -> Result<u16, Error> {
        let mut len = 6 + self.name_records.len() * 12;
        if self.format == 1 {
            len += 2 + self.lang_tag_records.len() * 4;
        }
        checked_u16(len, "bytes of name records")
    }
}

impl<'a> FontTable<'a> for NameTable {
    const TAG: Tag = Tag::new(b"name");
}

impl<'a> FontData<'a> for NameTable {
    type UnpackDep = Option<&'a LtagTable>;
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, ltag: Self::UnpackDep) -> Result<Self, Error> {
        let format = rd.read_u16::<BigEndian>()?;
        if format > 1 {
            return Err(Error::UnsupportedFormat {
                table: "name",
                format,
            });
        }
        let count = rd.read_u16::<BigEndian>()?;
        let storage_offset = rd.read_u16::<BigEndian>()?;

        codec::ensure_remaining(rd, usize::from(count) * 12)?;
        let mut name_records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            name_records.push(NameRecord::unpack(rd, ())?);
        }

        let mut lang_tag_records = Vec::new();
        if format == 1 {
            let lang_tag_count = rd.read_u16::<BigEndian>()?;
            codec::ensure_remaining(rd, usize::from(lang_tag_count) * 4)?;
            for _ in 0..lang_tag_count {
                lang_tag_records.push(LangTagRecord::unpack(rd, ())?);
            }
        }

        let data = rd.get_ref().as_ref();
        let storage_offset = usize::from(storage_offset);
        let string_data = codec::sub_slice(
            data,
            storage_offset,
            data.len().saturating_sub(storage_offset),
        )?
        .to_vec();

        let mut table = NameTable {
            format,
            name_records,
            lang_tag_records,
            string_data,
            names: BTreeMap::new(),
        };
        table.names = table.decode_names(ltag);
        Ok(table)
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.format)?;
        wr.write_u16::<BigEndian>(checked_u16(self.name_records.len(), "name records")?)?;
        wr.write_u16::<BigEndian>(self.storage_offset()?)?;
        for record in &self.name_records {
            record.pack(wr, ())?;
        }
        if self.format == 1 {
            wr.write_u16::<BigEndian>(checked_u16(
                self.lang_tag_records.len(),
                "language-tag records",
            )?)?;
            for record in &self.lang_tag_records {
                record.pack(wr, ())?;
            }
        }
        wr.write_all(&self.string_data)?;
        Ok(())
    }
}

impl<'a> FontData<'a> for NameRecord {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(NameRecord {
            platform_id: rd.read_u16::<BigEndian>()?,
            encoding_id: rd.read_u16::<BigEndian>()?,
            language_id: rd.read_u16::<BigEndian>()?,
            name_id: rd.read_u16::<BigEndian>()?,
            length: rd.read_u16::<BigEndian>()?,
            offset: rd.read_u16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.platform_id)?;
        wr.write_u16::<BigEndian>(self.encoding_id)?;
        wr.write_u16::<BigEndian>(self.language_id)?;
        wr.write_u16::<BigEndian>(self.name_id)?;
        wr.write_u16::<BigEndian>(self.length)?;
        wr.write_u16::<BigEndian>(self.offset)?;
        Ok(())
    }
}

impl<'a> FontData<'a> for LangTagRecord {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(LangTagRecord {
            length: rd.read_u16::<BigEndian>()?,
            offset: rd.read_u16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.length)?;
        wr.write_u16::<BigEndian>(self.offset)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    /// Builds a table from `(platform, encoding, language, name id, bytes)` entries.
    fn name_table(format: u16, entries: &[(u16, u16, u16, u16, Vec<u8>)], lang_tags: &[&str]) -> NameTable {
        let mut string_data = Vec::new();
        let mut name_records = Vec::new();
        for (platform_id, encoding_id, language_id, name_id, bytes) in entries {
            name_records.push(NameRecord {
                platform_id: *platform_id,
                encoding_id: *encoding_id,
                language_id: *language_id,
                name_id: *name_id,
                length: bytes.len() as u16,
                offset: string_data.len() as u16,
            });
            string_data.extend_from_slice(bytes);
        }
        let mut lang_tag_records = Vec::new();
        for tag in lang_tags {
            let bytes = utf16(tag);
            lang_tag_records.push(LangTagRecord {
                length: bytes.len() as u16,
                offset: string_data.len() as u16,
            });
            string_data.extend_from_slice(&bytes);
        }
        NameTable {
            format,
            name_records,
            lang_tag_records,
            string_data,
            names: BTreeMap::new(),
        }
    }

    #[test]
    fn test_name_table_encode_decode() {
        let table = name_table(
            0,
            &[
                (3, 1, 0x0409, 1, utf16("Test Sans")),
                (3, 1, 0x0407, 1, utf16("Test Grotesk")),
                (1, 0, 0, 2, b"Caf\x8E".to_vec()),
                (3, 1, 0x0409, 256, utf16("Swash")),
                (3, 1, 0x7C04, 4, utf16("Test Sans")),
                (2, 0, 0, 5, b"ignored".to_vec()),
            ],
            &[],
        );
        let mut buffer = Vec::new();
        table.pack(&mut buffer, ()).unwrap();
        assert_eq!(&buffer[..6], &[0x00, 0x00, 0x00, 0x06, 0x00, 0x4E]);

        let unpacked = NameTable::unpack(&mut Cursor::new(&buffer[..]), None).unwrap();
        assert_eq!(unpacked.name_records, table.name_records);
        assert_eq!(unpacked.string_data, table.string_data);
        assert_eq!(unpacked.get("fontFamily", "en"), Some("Test Sans"));
        assert_eq!(unpacked.get("fontFamily", "de"), Some("Test Grotesk"));
        assert_eq!(unpacked.get("fontSubfamily", "en"), Some("Café"));
        assert_eq!(unpacked.get("256", "en"), Some("Swash"));
        assert_eq!(unpacked.get("fullName", "31748"), Some("Test Sans"));
        assert_eq!(unpacked.names.get("version"), None);

        // re-pack and compare
        let mut repacked = Vec::new();
        unpacked.pack(&mut repacked, ()).unwrap();
        assert_eq!(repacked, buffer);
    }

    #[test]
    fn test_name_table_language_tags() {
        let table = name_table(
            1,
            &[
                (0, 4, 0, 1, utf16("Unicode")),
                (0, 4, 0xFFFF, 1, utf16("Undetermined")),
                (3, 1, 0x8000, 1, utf16("Tagged")),
            ],
            &["en-x-demo"],
        );
        let mut buffer = Vec::new();
        table.pack(&mut buffer, ()).unwrap();

        let ltag = LtagTable {
            version: 1,
            flags: 0,
            tags: vec!["de-CH".to_string()],
        };
        let unpacked = NameTable::unpack(&mut Cursor::new(&buffer[..]), Some(&ltag)).unwrap();
        assert_eq!(unpacked.lang_tag_records, table.lang_tag_records);
        assert_eq!(unpacked.get("fontFamily", "de-CH"), Some("Unicode"));
        assert_eq!(unpacked.get("fontFamily", "und"), Some("Undetermined"));
        assert_eq!(unpacked.get("fontFamily", "en-x-demo"), Some("Tagged"));

        // without an ltag table the id is used
        let unpacked = NameTable::unpack(&mut Cursor::new(&buffer[..]), None).unwrap();
        assert_eq!(unpacked.get("fontFamily", "0"), Some("Unicode"));
    }

    #[test]
    fn test_name_table_unsupported_format() {
        let data = [0x00, 0x02, 0x00, 0x00, 0x00, 0x06];
        assert!(matches!(
            NameTable::unpack(&mut Cursor::new(&data[..]), None),
            Err(Error::UnsupportedFormat { table: "name", format: 2 })
        ));
    }
}
