use std::collections::HashMap;
use std::io::{self, Cursor};

use super::{checked_u16, checked_u32, FontData, FontTable};
use crate::codec::{self, Tag};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// The kerning table contains the values that control the inter-character spacing for the glyphs in
/// a font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/kern
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6kern.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct KernTable {
    pub version: Version,
    /// Mac tables whose 16-bit table count is 0 and which store a 32-bit count instead.
    pub is_mac_new_kern: bool,
    pub subtables: Vec<Subtable>,
    /// Subtable lengths that had to be corrected while decoding.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub enum Version {
    Windows,
    Mac,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Subtable {
    /// The coverage bits without the format byte. Their meaning depends on the table version.
    pub coverage: u8,
    /// The tuple index of variation fonts (Mac only).
    pub tuple_index: u16,
    pub data: SubtableData,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum SubtableData {
    Format0(Format0),
    Format2(Format2),
    Format3(Format3),
}

/// Ordered list of kerning pairs.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format0 {
    pub pairs: Vec<KernPair>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct KernPair {
    pub left: u16,
    pub right: u16,
    pub value: i16,
}

/// Two-dimensional array of kerning values, indexed by glyph classes.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format2 {
    /// The width, in bytes, of a row in the table.
    pub row_width: u16,
    /// Byte offsets of the rows, relative to the start of `values`.
    pub left_class: ClassTable,
    /// Byte offsets of the columns within a row.
    pub right_class: ClassTable,
    pub values: Vec<i16>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ClassTable {
    pub first_glyph: u16,
    pub offsets: Vec<u16>,
}

/// Kerning values indexed by per-glyph class arrays.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format3 {
    pub flags: u8,
    pub values: Vec<i16>,
    /// Left class of each glyph.
    pub left_class: Vec<u8>,
    /// Right class of each glyph.
    pub right_class: Vec<u8>,
    pub left_class_count: u8,
    pub right_class_count: u8,
    /// `left_class_count * right_class_count` indices into `values`.
    pub kern_index: Vec<u8>,
}

const WINDOWS_HEADER_LEN: usize = 6;
const MAC_HEADER_LEN: usize = 8;
/// nPairs and the three binary search fields of format 0.
const FORMAT0_HEADER_LEN: usize = 8;

impl Version {
    fn header_len(self) -> usize {
        match self {
            Version::Windows => WINDOWS_HEADER_LEN,
            Version::Mac => MAC_HEADER_LEN,
        }
    }
}

impl Subtable {
    pub fn format(&self) -> u8 {
        match self.data {
            SubtableData::Format0(_) => 0,
            SubtableData::Format2(_) => 2,
            SubtableData::Format3(_) => 3,
        }
    }

    /// `true` if the subtable has horizontal kerning values.
    pub fn is_horizontal(&self, version: Version) -> bool {
        match version {
            Version::Windows => self.coverage & 0x01 != 0,
            Version::Mac => self.coverage & 0x80 == 0,
        }
    }

    /// The kerning value between two glyphs.
    pub fn kerning(&self, left: u16, right: u16) -> i16 {
        match &self.data {
            SubtableData::Format0(format0) => format0
                .pairs
                .binary_search_by_key(&(left, right), |pair| (pair.left, pair.right))
                .map(|i| format0.pairs[i].value)
                .unwrap_or(0),
            SubtableData::Format2(format2) => format2.kerning(left, right),
            SubtableData::Format3(format3) => format3.kerning(left, right),
        }
    }
}

impl KernTable {
    /// Rewrites the subtables for a font that only contains `glyph_ids` (old ids in their new
    /// order). Class-table subtables cannot be rebuilt and are removed.
    pub fn subset(&mut self, glyph_ids: &[u16]) {
        let new_ids: HashMap<u16, u16> = glyph_ids
            .iter()
            .enumerate()
            .map(|(new_id, old_id)| (*old_id, new_id as u16))
            .collect();

        self.subtables.retain_mut(|subtable| match &mut subtable.data {
            SubtableData::Format0(format0) => {
                format0.pairs = format0
                    .pairs
                    .iter()
                    .filter_map(|pair| {
                        Some(KernPair {
                            left: *new_ids.get(&pair.left)?,
                            right: *new_ids.get(&pair.right)?,
                            value: pair.value,
                        })
                    })
                    .collect();
                format0.pairs.sort_by_key(|pair| (pair.left, pair.right));
                true
            }
            SubtableData::Format2(_) => {
                log::warn!("Removing kern format 2 subtable while subsetting");
                false
            }
            SubtableData::Format3(format3) => {
                let class_of = |classes: &[u8], old_id: u16| {
                    classes.get(usize::from(old_id)).copied().unwrap_or(0)
                };
                format3.left_class = glyph_ids
                    .iter()
                    .map(|old_id| class_of(&format3.left_class, *old_id))
                    .collect();
                format3.right_class = glyph_ids
                    .iter()
                    .map(|old_id| class_of(&format3.right_class, *old_id))
                    .collect();
                true
            }
        });
    }
}

impl Format2 {
    pub fn kerning(&self, left: u16, right: u16) -> i16 {
        let (Some(row), Some(column)) = (self.left_class.get(left), self.right_class.get(right))
        else {
            return 0;
        };
        let index = (usize::from(row) + usize::from(column)) / 2;
        self.values.get(index).copied().unwrap_or(0)
    }
}

impl ClassTable {
    fn get(&self, glyph_id: u16) -> Option<u16> {
        let index = glyph_id.checked_sub(self.first_glyph)?;
        self.offsets.get(usize::from(index)).copied()
    }

    fn len(&self) -> usize {
        4 + self.offsets.len() * 2
    }

    fn unpack(subtable: &[u8], offset: u16) -> Result<Self, Error> {
        let mut rd = Cursor::new(codec::sub_slice(subtable, usize::from(offset), 4)?);
        let first_glyph = rd.read_u16::<BigEndian>()?;
        let n_glyphs = usize::from(rd.read_u16::<BigEndian>()?);
        let mut rd = Cursor::new(codec::sub_slice(
            subtable,
            usize::from(offset) + 4,
            n_glyphs * 2,
        )?);
        let mut offsets = vec![0; n_glyphs];
        rd.read_u16_into::<BigEndian>(&mut offsets)?;
        Ok(ClassTable {
            first_glyph,
            offsets,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, base: u16) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(self.first_glyph)?;
        wr.write_u16::<BigEndian>(checked_u16(self.offsets.len(), "kern class entries")?)?;
        for offset in &self.offsets {
            let offset = offset.checked_add(base).ok_or_else(|| {
                Error::malformed("kern", "class offset exceeds the subtable")
            })?;
            wr.write_u16::<BigEndian>(offset)?;
        }
        Ok(())
    }
}

impl Format3 {
    pub fn kerning(&self, left: u16, right: u16) -> i16 {
        let (Some(left), Some(right)) = (
            self.left_class.get(usize::from(left)),
            self.right_class.get(usize::from(right)),
        ) else {
            return 0;
        };
        let index = usize::from(*left) * usize::from(self.right_class_count) + usize::from(*right);
        self.kern_index
            .get(index)
            .and_then(|i| self.values.get(usize::from(*i)))
            .copied()
            .unwrap_or(0)
    }
}

impl<'a> FontTable<'a> for KernTable {
    const TAG: Tag = Tag::new(b"kern");
}

impl<'a> FontData<'a> for KernTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let (version, is_mac_new_kern, n_tables) = match rd.read_u16::<BigEndian>()? {
            0 => (Version::Windows, false, rd.read_u16::<BigEndian>()? as usize),
            1 => match rd.read_u16::<BigEndian>()? {
                0 => (Version::Mac, true, rd.read_u32::<BigEndian>()? as usize),
                n => (Version::Mac, false, n as usize),
            },
            version => {
                return Err(Error::UnsupportedVersion {
                    table: "kern",
                    version: version.into(),
                })
            }
        };

        codec::ensure_remaining(rd, n_tables.saturating_mul(version.header_len()))?;
        let mut subtables = Vec::with_capacity(n_tables);
        let mut warnings = Vec::new();
        for _ in 0..n_tables {
            subtables.push(Subtable::unpack(rd, (version, &mut warnings))?);
        }

        Ok(KernTable {
            version,
            is_mac_new_kern,
            subtables,
            warnings,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        match self.version {
            Version::Windows => {
                wr.write_u16::<BigEndian>(0)?; // version
                wr.write_u16::<BigEndian>(checked_u16(self.subtables.len(), "kern subtables")?)?;
            }
            Version::Mac if self.is_mac_new_kern => {
                wr.write_u16::<BigEndian>(1)?; // version
                wr.write_u16::<BigEndian>(0)?;
                wr.write_u32::<BigEndian>(checked_u32(self.subtables.len(), "kern subtables")?)?;
            }
            Version::Mac => {
                wr.write_u16::<BigEndian>(1)?; // version
                wr.write_u16::<BigEndian>(checked_u16(self.subtables.len(), "kern subtables")?)?;
            }
        }

        for subtable in &self.subtables {
            subtable.pack(wr, self.version)?;
        }

        Ok(())
    }
}

impl<'a> FontData<'a> for Subtable {
    /// The table version and a sink for length corrections.
    type UnpackDep = (Version, &'a mut Vec<String>);
    type PackDep = Version;

    fn unpack<R: AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        (version, warnings): Self::UnpackDep,
    ) -> Result<Self, Error> {
        let start = rd.position() as usize;
        let (length, format, coverage, tuple_index) = match version {
            Version::Windows => {
                let version = rd.read_u16::<BigEndian>()?;
                if version != 0 {
                    return Err(Error::UnsupportedVersion {
                        table: "kern subtable",
                        version: version.into(),
                    });
                }
                let length = rd.read_u16::<BigEndian>()? as usize;
                let format = rd.read_u8()?;
                let coverage = rd.read_u8()?;
                // the 16-bit length wraps for large pair lists, so nPairs decides the extent
                let length = if format == 0 {
                    let n_pairs = rd.read_u16::<BigEndian>()? as usize;
                    rd.set_position(rd.position() - 2);
                    length.max(WINDOWS_HEADER_LEN + FORMAT0_HEADER_LEN + n_pairs * 6)
                } else {
                    length
                };
                (length, format, coverage, 0)
            }
            Version::Mac => {
                let length = rd.read_u32::<BigEndian>()? as usize;
                let coverage = rd.read_u8()?;
                let format = rd.read_u8()?;
                let tuple_index = rd.read_u16::<BigEndian>()?;
                (length, format, coverage, tuple_index)
            }
        };

        let data = rd.get_ref().as_ref();
        let available = data.len() - start;
        if length < version.header_len() {
            return Err(Error::malformed(
                "kern",
                format!("subtable length {} is shorter than its header", length),
            ));
        }
        let length = if length > available {
            let warning = format!(
                "kern subtable length {} exceeds the table, using the remaining {} bytes",
                length, available
            );
            log::warn!("{}", warning);
            warnings.push(warning);
            available
        } else {
            length
        };
        let subtable = codec::sub_slice(data, start, length)?;
        let header_len = version.header_len();

        let data = match format {
            0 => SubtableData::Format0(Format0::unpack(
                &mut Cursor::new(&subtable[header_len..]),
                (),
            )?),
            2 => SubtableData::Format2(Format2::unpack(
                &mut Cursor::new(subtable),
                header_len,
            )?),
            3 => SubtableData::Format3(Format3::unpack(
                &mut Cursor::new(&subtable[header_len..]),
                (),
            )?),
            format => {
                return Err(Error::UnsupportedFormat {
                    table: "kern",
                    format: format.into(),
                })
            }
        };

        rd.set_position((start + length) as u64);
        Ok(Subtable {
            coverage,
            tuple_index,
            data,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, version: Self::PackDep) -> Result<(), Error> {
        let header_len = version.header_len();
        let mut body = Vec::new();
        match &self.data {
            SubtableData::Format0(format0) => format0.pack(&mut body, ())?,
            SubtableData::Format2(format2) => format2.pack(&mut body, header_len)?,
            SubtableData::Format3(format3) => format3.pack(&mut body, ())?,
        }
        let length = header_len + body.len();

        match version {
            Version::Windows => {
                wr.write_u16::<BigEndian>(0)?; // version
                let length = match self.data {
                    // readers take the extent of format 0 from nPairs
                    SubtableData::Format0(_) => (length & 0xFFFF) as u16,
                    _ => checked_u16(length, "bytes per kern subtable")?,
                };
                wr.write_u16::<BigEndian>(length)?;
                wr.write_u8(self.format())?;
                wr.write_u8(self.coverage)?;
            }
            Version::Mac => {
                wr.write_u32::<BigEndian>(checked_u32(length, "bytes per kern subtable")?)?;
                wr.write_u8(self.coverage)?;
                wr.write_u8(self.format())?;
                wr.write_u16::<BigEndian>(self.tuple_index)?;
            }
        }
        wr.write_all(&body)?;

        Ok(())
    }
}

impl<'a> FontData<'a> for Format0 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let n_pairs = rd.read_u16::<BigEndian>()? as usize;
        rd.read_u16::<BigEndian>()?; // search_range
        rd.read_u16::<BigEndian>()?; // entry_selector
        rd.read_u16::<BigEndian>()?; // range_shift

        codec::ensure_remaining(rd, n_pairs * 6)?;
        let mut pairs = Vec::with_capacity(n_pairs);
        for _ in 0..n_pairs {
            pairs.push(KernPair {
                left: rd.read_u16::<BigEndian>()?,
                right: rd.read_u16::<BigEndian>()?,
                value: rd.read_i16::<BigEndian>()?,
            });
        }

        Ok(Format0 { pairs })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let n_pairs = checked_u16(self.pairs.len(), "kern pairs")?;
        let (search_range, entry_selector, range_shift) = pair_search_params(n_pairs);

        wr.write_u16::<BigEndian>(n_pairs)?;
        wr.write_u16::<BigEndian>(search_range)?;
        wr.write_u16::<BigEndian>(entry_selector)?;
        wr.write_u16::<BigEndian>(range_shift)?;

        for pair in &self.pairs {
            wr.write_u16::<BigEndian>(pair.left)?;
            wr.write_u16::<BigEndian>(pair.right)?;
            wr.write_i16::<BigEndian>(pair.value)?;
        }

        Ok(())
    }
}

/// Binary search parameters over 6 byte kerning pairs.
fn pair_search_params(n_pairs: u16) -> (u16, u16, u16) {
    if n_pairs == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - n_pairs.leading_zeros();
    let search_range = (1u32 << entry_selector) * 6;
    let range_shift = u32::from(n_pairs) * 6 - search_range;
    (
        u16::try_from(search_range).unwrap_or(u16::MAX),
        entry_selector as u16,
        u16::try_from(range_shift).unwrap_or(u16::MAX),
    )
}

impl<'a> FontData<'a> for Format2 {
    /// The length of the subtable header; the cursor covers the whole subtable.
    type UnpackDep = usize;
    type PackDep = usize;

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, header_len: Self::UnpackDep) -> Result<Self, Error> {
        rd.set_position(header_len as u64);
        let row_width = rd.read_u16::<BigEndian>()?;
        let left_offset = rd.read_u16::<BigEndian>()?;
        let right_offset = rd.read_u16::<BigEndian>()?;
        let array_offset = rd.read_u16::<BigEndian>()?;

        let subtable = rd.get_ref().as_ref();
        let mut left_class = ClassTable::unpack(subtable, left_offset)?;
        let right_class = ClassTable::unpack(subtable, right_offset)?;

        // left offsets include the offset of the array from the start of the subtable
        for offset in &mut left_class.offsets {
            *offset = offset.saturating_sub(array_offset);
        }

        let max_left = left_class.offsets.iter().copied().max();
        let max_right = right_class.offsets.iter().copied().max();
        let len = match (max_left, max_right) {
            (Some(left), Some(right)) => (usize::from(left) + usize::from(right)) / 2 + 1,
            _ => 0,
        };
        let mut rd = Cursor::new(codec::sub_slice(subtable, usize::from(array_offset), len * 2)?);
        let mut values = vec![0; len];
        rd.read_i16_into::<BigEndian>(&mut values)?;

        Ok(Format2 {
            row_width,
            left_class,
            right_class,
            values,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, header_len: Self::PackDep) -> Result<(), Error> {
        let left_offset = header_len + 8;
        let right_offset = left_offset + self.left_class.len();
        let array_offset = right_offset + self.right_class.len();
        let array_offset = checked_u16(array_offset, "bytes of kern class tables")?;

        wr.write_u16::<BigEndian>(self.row_width)?;
        wr.write_u16::<BigEndian>(checked_u16(left_offset, "bytes of kern class tables")?)?;
        wr.write_u16::<BigEndian>(checked_u16(right_offset, "bytes of kern class tables")?)?;
        wr.write_u16::<BigEndian>(array_offset)?;
        self.left_class.pack(wr, array_offset)?;
        self.right_class.pack(wr, 0)?;
        for value in &self.values {
            wr.write_i16::<BigEndian>(*value)?;
        }

        Ok(())
    }
}

impl<'a> FontData<'a> for Format3 {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let glyph_count = usize::from(rd.read_u16::<BigEndian>()?);
        let kern_value_count = usize::from(rd.read_u8()?);
        let left_class_count = rd.read_u8()?;
        let right_class_count = rd.read_u8()?;
        let flags = rd.read_u8()?;

        let index_count = usize::from(left_class_count) * usize::from(right_class_count);
        codec::ensure_remaining(rd, kern_value_count * 2 + glyph_count * 2 + index_count)?;
        let mut values = vec![0; kern_value_count];
        rd.read_i16_into::<BigEndian>(&mut values)?;
        let left_class = codec::read_bytes(rd, glyph_count)?;
        let right_class = codec::read_bytes(rd, glyph_count)?;
        let kern_index = codec::read_bytes(rd, index_count)?;

        Ok(Format3 {
            flags,
            values,
            left_class,
            right_class,
            left_class_count,
            right_class_count,
            kern_index,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        if self.left_class.len() != self.right_class.len() {
            return Err(Error::malformed(
                "kern",
                "left and right class arrays differ in length",
            ));
        }
        let index_count =
            usize::from(self.left_class_count) * usize::from(self.right_class_count);
        if self.kern_index.len() != index_count {
            return Err(Error::malformed(
                "kern",
                format!(
                    "expected {} kern indices, found {}",
                    index_count,
                    self.kern_index.len()
                ),
            ));
        }
        let kern_value_count = u8::try_from(self.values.len()).map_err(|_| Error::TooMany {
            what: "kern values",
            max: u8::MAX.into(),
        })?;

        wr.write_u16::<BigEndian>(checked_u16(self.left_class.len(), "glyphs")?)?;
        wr.write_u8(kern_value_count)?;
        wr.write_u8(self.left_class_count)?;
        wr.write_u8(self.right_class_count)?;
        wr.write_u8(self.flags)?;
        for value in &self.values {
            wr.write_i16::<BigEndian>(*value)?;
        }
        wr.write_all(&self.left_class)?;
        wr.write_all(&self.right_class)?;
        wr.write_all(&self.kern_index)?;

        Ok(())
    }
}
