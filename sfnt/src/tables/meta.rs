use std::io::{self, Cursor};

use super::{checked_u32, FontData, FontTable};
use crate::codec::{self, ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// The metadata table contains various metadata values for the font, e.g. the languages the
/// font was designed for.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/meta
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6meta.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct MetaTable {
    /// Version number of the metadata table; set to 1.
    pub version: u32,
    /// Flags; currently unused, set to 0.
    pub flags: u32,
    pub data_maps: Vec<DataMap>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct DataMap {
    pub tag: Tag,
    pub data: Vec<u8>,
}

/// Design languages.
pub const DLNG: Tag = Tag::new(b"dlng");
/// Supported languages.
pub const SLNG: Tag = Tag::new(b"slng");

impl MetaTable {
    pub fn data(&self, tag: Tag) -> Option<&[u8]> {
        self.data_maps
            .iter()
            .find(|map| map.tag == tag)
            .map(|map| map.data.as_slice())
    }

    /// The data of `tag` as text. Only `dlng` and `slng` are defined to be UTF-8.
    pub fn text(&self, tag: Tag) -> Option<String> {
        self.data(tag)
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    /// The comma separated ScriptLangTags of a `dlng` or `slng` entry.
    pub fn languages(&self, tag: Tag) -> Vec<String> {
        self.text(tag)
            .map(|text| {
                text.split(',')
                    .map(str::trim)
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<'a> FontTable<'a> for MetaTable {
    const TAG: Tag = Tag::new(b"meta");
}

impl<'a> FontData<'a> for MetaTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_u32::<BigEndian>()?;
        if version != 1 {
            return Err(Error::UnsupportedVersion {
                table: "meta",
                version,
            });
        }
        let flags = rd.read_u32::<BigEndian>()?;
        rd.read_u32::<BigEndian>()?; // reserved
        let data_maps_count = rd.read_u32::<BigEndian>()? as usize;

        codec::ensure_remaining(rd, data_maps_count.saturating_mul(12))?;
        let mut records = Vec::with_capacity(data_maps_count);
        for _ in 0..data_maps_count {
            let tag = rd.read_tag()?;
            let data_offset = rd.read_u32::<BigEndian>()? as usize;
            let data_length = rd.read_u32::<BigEndian>()? as usize;
            records.push((tag, data_offset, data_length));
        }

        let data = rd.get_ref().as_ref();
        let data_maps = records
            .into_iter()
            .map(|(tag, offset, length)| {
                Ok(DataMap {
                    tag,
                    data: codec::sub_slice(data, offset, length)?.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(MetaTable {
            version,
            flags,
            data_maps,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.version)?;
        wr.write_u32::<BigEndian>(self.flags)?;
        wr.write_u32::<BigEndian>(0)?; // reserved
        wr.write_u32::<BigEndian>(checked_u32(self.data_maps.len(), "meta data maps")?)?;

        let mut offset = 16 + self.data_maps.len() * 12;
        for map in &self.data_maps {
            wr.write_tag(map.tag)?;
            wr.write_u32::<BigEndian>(checked_u32(offset, "bytes of meta data")?)?;
            wr.write_u32::<BigEndian>(checked_u32(map.data.len(), "bytes of meta data")?)?;
            offset += map.data.len();
        }
        for map in &self.data_maps {
            wr.write_all(&map.data)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_meta_encode_decode() {
        let mut data = vec![
            0x00, 0x00, 0x00, 0x01, // version
            0x00, 0x00, 0x00, 0x00, // flags
            0x00, 0x00, 0x00, 0x00, // reserved
            0x00, 0x00, 0x00, 0x02, // dataMapsCount
            b'd', b'l', b'n', b'g', 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0x00, 0x04, //
            b's', b'l', b'n', b'g', 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x0F, //
        ];
        data.extend_from_slice(b"Latn");
        data.extend_from_slice(b"Latn, Cyrl, Grk");

        let table = MetaTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap();
        assert_eq!(table.text(DLNG).as_deref(), Some("Latn"));
        assert_eq!(table.languages(SLNG), vec!["Latn", "Cyrl", "Grk"]);
        assert_eq!(table.data(Tag::new(b"appl")), None);

        // re-pack and compare
        let mut buffer = Vec::new();
        table.pack(&mut buffer, ()).unwrap();
        assert_eq!(buffer, data);
    }

    #[test]
    fn test_meta_data_outside_of_table() {
        let data = vec![
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, b'd', b'l', b'n', b'g', 0x00, 0x00, 0x00, 0x1C, 0x00, 0x00, 0x00, 0x04,
        ];
        assert!(matches!(
            MetaTable::unpack(&mut Cursor::new(&data[..]), ()),
            Err(Error::Truncated)
        ));
    }
}
