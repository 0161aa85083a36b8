use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::{checked_u32, FontData};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Format, length and record count precede the variation selector records.
const HEADER_LEN: usize = 10;
const RECORD_LEN: usize = 11;

/// Unicode variation sequences.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format14 {
    pub var_selector_records: Vec<VariationSelector>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct VariationSelector {
    /// Variation selector (24-bit).
    pub var_selector: u32,
    /// Base characters whose sequence uses the default glyph from the Unicode cmap.
    pub default_uvs: Option<Vec<UnicodeRange>>,
    /// Sequences mapped to a specific glyph.
    pub non_default_uvs: Option<Vec<UvsMapping>>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct UnicodeRange {
    pub start_unicode_value: u32,
    pub additional_count: u8,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct UvsMapping {
    pub unicode_value: u32,
    pub glyph_id: u16,
}

impl Format14 {
    /// Base characters and glyphs of all non-default variation sequences.
    pub fn mapping(&self) -> Vec<(u32, u16)> {
        self.var_selector_records
            .iter()
            .flat_map(|record| record.non_default_uvs.iter().flatten())
            .map(|mapping| (mapping.unicode_value, mapping.glyph_id))
            .collect()
    }
}

fn unpack_list<T>(
    subtable: &[u8],
    offset: u32,
    item_len: usize,
    mut unpack_item: impl FnMut(&mut Cursor<&[u8]>) -> Result<T, Error>,
) -> Result<Option<Vec<T>>, Error> {
    if offset == 0 {
        return Ok(None);
    }
    let data = codec::sub_slice(subtable, offset as usize, 4)?;
    let count = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let data = codec::sub_slice(subtable, offset as usize + 4, count.saturating_mul(item_len))?;
    let mut rd = Cursor::new(data);
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(unpack_item(&mut rd)?);
    }
    Ok(Some(items))
}

impl<'a> FontData<'a> for Format14 {
    type UnpackDep = ();
    type PackDep = ();

    /// Reads the subtable following its format and length fields. Offsets are resolved against
    /// the start of the cursor's data.
    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let num_records = rd.read_u32::<BigEndian>()? as usize;
        codec::ensure_remaining(rd, num_records.saturating_mul(RECORD_LEN))?;
        let mut offsets = Vec::with_capacity(num_records);
        for _ in 0..num_records {
            let var_selector = rd.read_u24::<BigEndian>()?;
            let default_uvs_offset = rd.read_u32::<BigEndian>()?;
            let non_default_uvs_offset = rd.read_u32::<BigEndian>()?;
            offsets.push((var_selector, default_uvs_offset, non_default_uvs_offset));
        }

        let subtable = rd.get_ref().as_ref();
        let mut var_selector_records = Vec::with_capacity(num_records);
        for (var_selector, default_uvs_offset, non_default_uvs_offset) in offsets {
            let default_uvs = unpack_list(subtable, default_uvs_offset, 4, |rd| {
                Ok(UnicodeRange {
                    start_unicode_value: rd.read_u24::<BigEndian>()?,
                    additional_count: rd.read_u8()?,
                })
            })?;
            let non_default_uvs = unpack_list(subtable, non_default_uvs_offset, 5, |rd| {
                Ok(UvsMapping {
                    unicode_value: rd.read_u24::<BigEndian>()?,
                    glyph_id: rd.read_u16::<BigEndian>()?,
                })
            })?;
            var_selector_records.push(VariationSelector {
                var_selector,
                default_uvs,
                non_default_uvs,
            });
        }

        Ok(Format14 {
            var_selector_records,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let mut data = Vec::new();
        let base = HEADER_LEN + self.var_selector_records.len() * RECORD_LEN;

        wr.write_u32::<BigEndian>(checked_u32(
            self.var_selector_records.len(),
            "variation selector records",
        )?)?;
        for record in &self.var_selector_records {
            wr.write_u24::<BigEndian>(record.var_selector)?;

            match &record.default_uvs {
                Some(ranges) => {
                    wr.write_u32::<BigEndian>(checked_u32(base + data.len(), "bytes of UVS tables")?)?;
                    data.write_u32::<BigEndian>(checked_u32(ranges.len(), "Unicode ranges")?)?;
                    for range in ranges {
                        data.write_u24::<BigEndian>(range.start_unicode_value)?;
                        data.write_u8(range.additional_count)?;
                    }
                }
                None => wr.write_u32::<BigEndian>(0)?,
            }

            match &record.non_default_uvs {
                Some(mappings) => {
                    wr.write_u32::<BigEndian>(checked_u32(base + data.len(), "bytes of UVS tables")?)?;
                    data.write_u32::<BigEndian>(checked_u32(mappings.len(), "UVS mappings")?)?;
                    for mapping in mappings {
                        data.write_u24::<BigEndian>(mapping.unicode_value)?;
                        data.write_u16::<BigEndian>(mapping.glyph_id)?;
                    }
                }
                None => wr.write_u32::<BigEndian>(0)?,
            }
        }
        wr.write_all(&data)?;

        Ok(())
    }
}
