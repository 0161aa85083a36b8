use std::collections::BTreeMap;
use std::io::{self, Cursor};

use crate::codec;
use crate::error::Error;
use crate::tables::{checked_u16, FontData};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Segment mapping to delta values, the standard subtable for the Unicode BMP.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Format4 {
    /// Should be `0` for all but Macintosh subtables.
    pub language: u16,
    /// End characterCode for each segment, last=0xFFFF.
    pub end_code: Vec<u16>,
    /// Start character code for each segment.
    pub start_code: Vec<u16>,
    /// Delta for all character codes in segment.
    pub id_delta: Vec<i16>,
    /// Offsets into glyph_id_array or 0
    pub id_range_offset: Vec<u16>,
    /// Glyph index array (arbitrary length)
    pub glyph_id_array: Vec<u16>,
}

impl Format4 {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        // Return None for codepoints > `u16::MAX`
        let codepoint = u16::try_from(codepoint).ok()?;

        // Search for the first end_code that is greater than or equal to the character code
        let ix = match self.end_code.binary_search(&codepoint) {
            // Found a direct match
            Ok(ix) => ix,
            // No direct match, `ix` represents the position where the codepoint could be inserted
            // while maintaining sorted order -> the index represents the first end code that is
            // greater than the character code
            Err(ix) => ix,
        };
        let start_code = *self.start_code.get(ix)?;

        if start_code <= codepoint {
            self.lookup(ix, codepoint).ok()
        } else {
            None
        }
    }

    /// The glyph of `codepoint` within segment `ix`. A zero entry in the glyph index array maps
    /// to the missing glyph.
    fn lookup(&self, ix: usize, codepoint: u16) -> Result<u16, Error> {
        let (Some(&id_delta), Some(&id_range_offset)) =
            (self.id_delta.get(ix), self.id_range_offset.get(ix))
        else {
            return Err(Error::malformed(
                "cmap",
                "format 4 segment arrays differ in length",
            ));
        };
        if id_range_offset == 0 {
            return Ok(codepoint.wrapping_add_signed(id_delta));
        }

        // the offset is relative to the position of `id_range_offset[ix]` itself
        let pos = ix
            + usize::from(id_range_offset / 2)
            + usize::from(codepoint - self.start_code[ix]);
        let seg_count = self.id_range_offset.len();
        let value = if pos < seg_count {
            self.id_range_offset[pos]
        } else {
            *self.glyph_id_array.get(pos - seg_count).ok_or_else(|| {
                Error::malformed(
                    "cmap",
                    format!(
                        "format 4 glyph index {} of U+{:04X} is out of range",
                        pos - seg_count,
                        codepoint
                    ),
                )
            })?
        };

        if value == 0 {
            Ok(0)
        } else {
            Ok(value.wrapping_add_signed(id_delta))
        }
    }

    /// All code points mapped by this subtable. The terminating 0xFFFF is never included.
    pub fn mapping(&self) -> Result<Vec<(u32, u16)>, Error> {
        let mut mapping = Vec::new();
        for (ix, (start, end)) in self.start_code.iter().zip(&self.end_code).enumerate() {
            for codepoint in *start..=*end {
                if codepoint == 0xFFFF {
                    break;
                }
                mapping.push((u32::from(codepoint), self.lookup(ix, codepoint)?));
            }
        }
        Ok(mapping)
    }

    /// Builds a subtable for all BMP code points in `mapping`. Consecutive code points mapped to
    /// consecutive glyphs share a segment.
    pub fn from_mapping(mapping: &BTreeMap<u32, u16>) -> Self {
        struct Segment {
            start: u16,
            end: u16,
            id_delta: i16,
        }

        let mut segments: Vec<Segment> = Vec::new();
        for (codepoint, glyph_id) in mapping {
            let Ok(codepoint) = u16::try_from(*codepoint) else {
                break;
            };
            if codepoint == 0xFFFF {
                break;
            }
            let id_delta = glyph_id.wrapping_sub(codepoint) as i16;
            if let Some(prev) = segments.last_mut() {
                if prev.id_delta == id_delta && prev.end + 1 == codepoint {
                    prev.end = codepoint;
                    continue;
                }
            }
            segments.push(Segment {
                start: codepoint,
                end: codepoint,
                id_delta,
            });
        }
        // End segment must always exist
        segments.push(Segment {
            start: 0xFFFF,
            end: 0xFFFF,
            id_delta: 1,
        });

        Format4 {
            language: 0,
            end_code: segments.iter().map(|s| s.end).collect(),
            start_code: segments.iter().map(|s| s.start).collect(),
            id_delta: segments.iter().map(|s| s.id_delta).collect(),
            id_range_offset: vec![0; segments.len()],
            glyph_id_array: Vec::new(),
        }
    }
}

impl<'a> FontData<'a> for Format4 {
    type UnpackDep = ();
    type PackDep = ();

    /// Reads the subtable following its format and length fields; the cursor ends with the
    /// subtable.
    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let language = rd.read_u16::<BigEndian>()?;
        let seg_count_x2 = rd.read_u16::<BigEndian>()?;
        let seg_count = (seg_count_x2 / 2) as usize;
        rd.read_u16::<BigEndian>()?; // search_range
        rd.read_u16::<BigEndian>()?; // entry_selector
        rd.read_u16::<BigEndian>()?; // range_shift

        codec::ensure_remaining(rd, seg_count * 8 + 2)?;
        let mut end_code = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut end_code)?;
        rd.read_u16::<BigEndian>()?; // reserved_pad
        let mut start_code = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut start_code)?;
        let mut id_delta = vec![0; seg_count];
        rd.read_i16_into::<BigEndian>(&mut id_delta)?;
        let mut id_range_offset = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut id_range_offset)?;

        let mut glyph_id_array = vec![0; codec::remaining(rd) / 2];
        rd.read_u16_into::<BigEndian>(&mut glyph_id_array)?;

        if let Some((start, end)) = start_code.iter().zip(&end_code).find(|(s, e)| s > e) {
            return Err(Error::malformed(
                "cmap",
                format!("format 4 segment {}..{} ends before it starts", start, end),
            ));
        }

        Ok(Format4 {
            language,
            end_code,
            start_code,
            id_delta,
            id_range_offset,
            glyph_id_array,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let seg_count = self.end_code.len();
        if self.start_code.len() != seg_count
            || self.id_delta.len() != seg_count
            || self.id_range_offset.len() != seg_count
        {
            return Err(Error::malformed(
                "cmap",
                "format 4 segment arrays differ in length",
            ));
        }
        let seg_count_x2 = checked_u16(seg_count * 2, "format 4 segments")?;
        let entry_selector = if seg_count == 0 {
            0
        } else {
            seg_count.ilog2() as u16
        };
        let search_range = if seg_count == 0 {
            0
        } else {
            2 * (1 << entry_selector)
        };

        wr.write_u16::<BigEndian>(self.language)?;
        wr.write_u16::<BigEndian>(seg_count_x2)?;
        wr.write_u16::<BigEndian>(search_range)?;
        wr.write_u16::<BigEndian>(entry_selector)?;
        wr.write_u16::<BigEndian>(seg_count_x2 - search_range)?;
        for end_code in &self.end_code {
            wr.write_u16::<BigEndian>(*end_code)?;
        }
        wr.write_u16::<BigEndian>(0)?; // reserved_pad
        for start_code in &self.start_code {
            wr.write_u16::<BigEndian>(*start_code)?;
        }
        for id_delta in &self.id_delta {
            wr.write_i16::<BigEndian>(*id_delta)?;
        }
        for range_offset in &self.id_range_offset {
            wr.write_u16::<BigEndian>(*range_offset)?;
        }
        for glyph_id in &self.glyph_id_array {
            wr.write_u16::<BigEndian>(*glyph_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cmap_subtable_format4_codepoint_to_glyph_id_without_range_offset() {
        let format4 = Format4 {
            language: 0,
            end_code: vec![20, 90, 480, 0xFFFF],
            start_code: vec![10, 30, 153, 0xFFFF],
            id_delta: vec![-9, -18, -27, 1],
            id_range_offset: vec![0, 0, 0, 0],
            glyph_id_array: Vec::new(),
        };

        assert_eq!(format4.glyph_id(10), Some(1));
        assert_eq!(format4.glyph_id(20), Some(11));
        assert_eq!(format4.glyph_id(30), Some(12));
        assert_eq!(format4.glyph_id(90), Some(72));
        assert_eq!(format4.glyph_id(25), None);

        let mapping = format4.mapping().unwrap();
        assert_eq!(mapping.len(), 11 + 61 + 328);
        assert_eq!(mapping.last(), Some(&(480, 453)));
    }

    #[test]
    fn test_cmap_subtable_format4_codepoint_to_glyph_id_with_range_offset() {
        let format4 = Format4 {
            language: 0,
            end_code: vec![12, 0xFFFF],
            start_code: vec![10, 0xFFFF],
            id_delta: vec![0, 1],
            id_range_offset: vec![4, 0],
            glyph_id_array: vec![1, 2, 0],
        };

        assert_eq!(format4.glyph_id(0), None);
        assert_eq!(format4.glyph_id(10), Some(1));
        assert_eq!(format4.glyph_id(11), Some(2));
        assert_eq!(format4.glyph_id(12), Some(0));
        assert_eq!(format4.glyph_id(13), None);
        assert_eq!(format4.mapping().unwrap(), vec![(10, 1), (11, 2), (12, 0)]);

        // re-pack and compare
        let mut buffer = Vec::new();
        format4.pack(&mut buffer, ()).unwrap();
        assert_eq!(
            &buffer[..10],
            &[0x00, 0x00, 0x00, 0x04, 0x00, 0x04, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            Format4::unpack(&mut Cursor::new(&buffer[..]), ()).unwrap(),
            format4
        );
    }

    #[test]
    fn test_cmap_subtable_format4_range_offset_out_of_range() {
        let format4 = Format4 {
            language: 0,
            end_code: vec![12, 0xFFFF],
            start_code: vec![10, 0xFFFF],
            id_delta: vec![0, 1],
            id_range_offset: vec![4, 0],
            glyph_id_array: vec![1],
        };
        assert_eq!(format4.glyph_id(11), None);
        assert!(matches!(
            format4.mapping(),
            Err(Error::Malformed { table: "cmap", .. })
        ));
    }

    #[test]
    fn test_cmap_subtable_format4_from_mapping() {
        let mapping: BTreeMap<u32, u16> = [
            (0x20, 1),
            (0x41, 2),
            (0x42, 3),
            (0x43, 4),
            (0x45, 5),
            (0x61, 9),
            (0x1F600, 6),
        ]
        .into_iter()
        .collect();
        let format4 = Format4::from_mapping(&mapping);

        assert_eq!(format4.start_code, vec![0x20, 0x41, 0x45, 0x61, 0xFFFF]);
        assert_eq!(format4.end_code, vec![0x20, 0x43, 0x45, 0x61, 0xFFFF]);
        assert_eq!(*format4.id_delta.last().unwrap(), 1);
        for (codepoint, glyph_id) in mapping.iter().filter(|(c, _)| **c <= 0xFFFF) {
            assert_eq!(format4.glyph_id(*codepoint), Some(*glyph_id));
        }
        assert_eq!(format4.glyph_id(0xFFFF), Some(0));
        assert_eq!(format4.mapping().unwrap().len(), 6);

        // should update header
        let mut buffer = Vec::new();
        format4.pack(&mut buffer, ()).unwrap();
        assert_eq!(
            &buffer[..10],
            &[0x00, 0x00, 0x00, 0x0A, 0x00, 0x08, 0x00, 0x02, 0x00, 0x02]
        );
    }
}
