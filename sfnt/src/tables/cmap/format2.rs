use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::FontData;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Offset of the first sub-header from the start of the subtable.
const SUB_HEADERS_OFFSET: usize = 6 + 256 * 2;

/// High-byte mapping through table, used for mixed 8/16-bit encodings of CJK fonts.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format2 {
    pub language: u16,
    /// Maps each high byte to its sub-header; the value is the sub-header index times 8.
    pub sub_header_keys: Vec<u16>,
    pub sub_headers: Vec<SubHeader>,
    pub glyph_id_array: Vec<u16>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct SubHeader {
    /// First valid low byte for this sub-header.
    pub first_code: u16,
    /// Number of valid low bytes for this sub-header.
    pub entry_count: u16,
    pub id_delta: i16,
    /// Byte offset from the `id_range_offset` field itself into `glyph_id_array`.
    pub id_range_offset: u16,
}

impl Format2 {
    fn lookup(&self, sub_header_index: usize, low_byte: u16) -> Result<u16, Error> {
        let sub_header = &self.sub_headers[sub_header_index];
        let field = SUB_HEADERS_OFFSET + sub_header_index * 8 + 6;
        let array_start = SUB_HEADERS_OFFSET + self.sub_headers.len() * 8;
        let target = field
            + usize::from(sub_header.id_range_offset)
            + usize::from(low_byte - sub_header.first_code) * 2;
        let value = target
            .checked_sub(array_start)
            .and_then(|pos| self.glyph_id_array.get(pos / 2))
            .ok_or_else(|| {
                Error::malformed(
                    "cmap",
                    format!(
                        "format 2 sub-header {} points outside of the glyph index array",
                        sub_header_index
                    ),
                )
            })?;
        if *value == 0 {
            Ok(0)
        } else {
            Ok(value.wrapping_add_signed(sub_header.id_delta))
        }
    }

    pub fn mapping(&self) -> Result<Vec<(u32, u16)>, Error> {
        let mut mapping = Vec::new();
        for (high_byte, key) in self.sub_header_keys.iter().enumerate() {
            let index = usize::from(key / 8);
            let sub_header = self.sub_headers.get(index).ok_or_else(|| {
                Error::malformed("cmap", format!("format 2 sub-header {} is missing", index))
            })?;
            let first = sub_header.first_code;
            let end = first.saturating_add(sub_header.entry_count).min(256);
            if index == 0 {
                // single byte character code
                let code = high_byte as u16;
                if code >= first && code < end {
                    mapping.push((u32::from(code), self.lookup(0, code)?));
                }
            } else {
                for low_byte in first..end {
                    let code = (high_byte as u32) << 8 | u32::from(low_byte);
                    mapping.push((code, self.lookup(index, low_byte)?));
                }
            }
        }
        Ok(mapping)
    }

    fn sub_header_count(sub_header_keys: &[u16]) -> usize {
        usize::from(sub_header_keys.iter().copied().max().unwrap_or(0) / 8) + 1
    }
}

impl<'a> FontData<'a> for Format2 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u16::<BigEndian>()?;
        let mut sub_header_keys = vec![0; 256];
        rd.read_u16_into::<BigEndian>(&mut sub_header_keys)?;

        let count = Self::sub_header_count(&sub_header_keys);
        codec::ensure_remaining(rd, count * 8)?;
        let mut sub_headers = Vec::with_capacity(count);
        for _ in 0..count {
            sub_headers.push(SubHeader {
                first_code: rd.read_u16::<BigEndian>()?,
                entry_count: rd.read_u16::<BigEndian>()?,
                id_delta: rd.read_i16::<BigEndian>()?,
                id_range_offset: rd.read_u16::<BigEndian>()?,
            });
        }

        let mut glyph_id_array = vec![0; codec::remaining(rd) / 2];
        rd.read_u16_into::<BigEndian>(&mut glyph_id_array)?;

        Ok(Format2 {
            language,
            sub_header_keys,
            sub_headers,
            glyph_id_array,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        if self.sub_header_keys.len() != 256 {
            return Err(Error::malformed(
                "cmap",
                "format 2 requires 256 sub-header keys",
            ));
        }
        if Self::sub_header_count(&self.sub_header_keys) != self.sub_headers.len() {
            return Err(Error::malformed(
                "cmap",
                "format 2 sub-header keys do not match the sub-headers",
            ));
        }

        wr.write_u16::<BigEndian>(self.language)?;
        for key in &self.sub_header_keys {
            wr.write_u16::<BigEndian>(*key)?;
        }
        for sub_header in &self.sub_headers {
            wr.write_u16::<BigEndian>(sub_header.first_code)?;
            wr.write_u16::<BigEndian>(sub_header.entry_count)?;
            wr.write_i16::<BigEndian>(sub_header.id_delta)?;
            wr.write_u16::<BigEndian>(sub_header.id_range_offset)?;
        }
        for glyph_id in &self.glyph_id_array {
            wr.write_u16::<BigEndian>(*glyph_id)?;
        }
        Ok(())
    }
}
