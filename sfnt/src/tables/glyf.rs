use std::io::{self, Cursor};

use super::loca::LocaTable;
use super::{checked_u16, checked_u32, FontData, FontTable};
use crate::codec::{self, ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use bitflags::bitflags;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// The 'glyf' table is comprised of a list of glyph data blocks, each of which provides the
/// description for a single glyph. Glyphs are referenced by identifiers (glyph IDs), which are
/// sequential integers beginning at zero.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/glyf
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6glyf.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct GlyfTable {
    pub glyphs: Vec<Glyph>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Glyph {
    pub index: u16,
    pub outline: Outline,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Outline {
    /// The glyph has no data block (e.g. the space glyph).
    Empty,
    Simple(SimpleGlyph),
    Compound(CompoundGlyph),
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct GlyphCommon {
    /// If the number of contours is greater than or equal to zero, this is a simple glyph. If
    /// negative, this is a composite glyph.
    pub number_of_contours: i16,
    /// Minimum x for coordinate data.
    pub x_min: i16,
    /// Minimum y for coordinate data.
    pub y_min: i16,
    /// Maximum x for coordinate data.
    pub x_max: i16,
    /// Maximum y for coordinate data.
    pub y_max: i16,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct SimpleGlyph {
    pub common: GlyphCommon,
    /// Point indices for the last point of each contour, in increasing numeric order.
    pub end_pts_of_contours: Vec<u16>,
    /// Array of instruction byte code for the glyph.
    pub instructions: Vec<u8>,
    /// Points with absolute coordinates.
    pub points: Vec<Point>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct CompoundGlyph {
    pub common: GlyphCommon,
    pub components: Vec<Component>,
    /// Instructions of the whole composite, present if the last component has
    /// `WE_HAVE_INSTRUCTIONS` set.
    pub instructions: Vec<u8>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Component {
    pub flags: ComponentFlags,
    /// Glyph index of the component.
    pub glyph_index: u16,
    /// X offset, or the point number of the parent glyph if `ARGS_ARE_XY_VALUES` is not set.
    pub argument1: i32,
    /// Y offset, or the point number of the component if `ARGS_ARE_XY_VALUES` is not set.
    pub argument2: i32,
    pub transform: Transform,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub enum Transform {
    None,
    Scale(f32),
    XyScale {
        x: f32,
        y: f32,
    },
    TwoByTwo {
        xscale: f32,
        scale01: f32,
        scale10: f32,
        yscale: f32,
    },
}

bitflags! {
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    struct SimpleGlyphFlags: u8 {
        const ON_CURVE_POINT = 0x01;
        const X_SHORT_VECTOR = 0x02;
        const Y_SHORT_VECTOR = 0x04;
        const REPEAT_FLAG = 0x08;
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        const OVERLAP_SIMPLE = 0x40;
    }
}

bitflags! {
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
    pub struct ComponentFlags: u16 {
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        const ARGS_ARE_XY_VALUES = 0x0002;
        const ROUND_XY_TO_GRID = 0x0004;
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
        const SCALED_COMPONENT_OFFSET = 0x0800;
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

impl Glyph {
    pub fn empty(index: u16) -> Self {
        Glyph {
            index,
            outline: Outline::Empty,
        }
    }

    pub fn common(&self) -> Option<&GlyphCommon> {
        match &self.outline {
            Outline::Empty => None,
            Outline::Simple(glyph) => Some(&glyph.common),
            Outline::Compound(glyph) => Some(&glyph.common),
        }
    }

    /// Glyph ids referenced by the components of a compound glyph.
    pub fn component_indices(&self) -> impl Iterator<Item = u16> + '_ {
        let components: &[Component] = match &self.outline {
            Outline::Compound(glyph) => &glyph.components,
            _ => &[],
        };
        components.iter().map(|c| c.glyph_index)
    }
}

impl GlyfTable {
    pub fn glyph(&self, index: u16) -> Option<&Glyph> {
        self.glyphs.get(usize::from(index))
    }

    /// Union of the bounding boxes of all non-empty glyphs as `(x_min, y_min, x_max, y_max)`.
    pub fn bounding_box(&self) -> Option<(i16, i16, i16, i16)> {
        self.glyphs
            .iter()
            .filter_map(Glyph::common)
            .fold(None, |bbox, c| {
                Some(match bbox {
                    None => (c.x_min, c.y_min, c.x_max, c.y_max),
                    Some((x_min, y_min, x_max, y_max)) => (
                        c.x_min.min(x_min),
                        c.y_min.min(y_min),
                        c.x_max.max(x_max),
                        c.y_max.max(y_max),
                    ),
                })
            })
    }

    /// Encodes all glyphs and returns the glyph data together with the loca offsets (one more
    /// than there are glyphs). Every glyph is padded to an even length.
    pub fn pack_with_offsets(&self) -> Result<(Vec<u8>, Vec<u32>), Error> {
        let mut data = Vec::new();
        let mut offsets = Vec::with_capacity(self.glyphs.len() + 1);
        offsets.push(0);
        for glyph in &self.glyphs {
            glyph.pack(&mut data, ())?;
            if data.len() % 2 != 0 {
                data.push(0);
            }
            offsets.push(checked_u32(data.len(), "bytes of glyph data")?);
        }
        Ok((data, offsets))
    }
}

impl<'a> FontTable<'a> for GlyfTable {
    const TAG: Tag = Tag::new(b"glyf");
}

impl<'a> FontData<'a> for GlyfTable {
    type UnpackDep = &'a LocaTable;
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, loca: Self::UnpackDep) -> Result<Self, Error> {
        let data = rd.get_ref().as_ref();
        let mut glyphs = Vec::with_capacity(loca.num_glyphs());

        for (i, offsets) in loca.offsets.windows(2).enumerate() {
            let index = checked_u16(i, "glyphs")?;
            let (start, end) = (offsets[0] as usize, offsets[1] as usize);
            if end < start {
                return Err(Error::malformed("glyf", "glyph offsets are not increasing"));
            }
            if start == end {
                glyphs.push(Glyph::empty(index));
                continue;
            }

            let glyph_data = codec::sub_slice(data, start, end - start)?;
            let mut glyph = Glyph::unpack(&mut Cursor::new(glyph_data), ())?;
            glyph.index = index;
            glyphs.push(glyph);
        }

        Ok(GlyfTable { glyphs })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let (data, _) = self.pack_with_offsets()?;
        wr.write_all(&data)?;
        Ok(())
    }
}

impl<'a> FontData<'a> for Glyph {
    type UnpackDep = ();
    type PackDep = ();

    /// Unpacks a non-empty glyph data block. The index is left at 0 and set by the caller.
    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let common = GlyphCommon::unpack(rd, ())?;
        let outline = if common.number_of_contours >= 0 {
            Outline::Simple(SimpleGlyph::unpack(rd, common)?)
        } else {
            Outline::Compound(CompoundGlyph::unpack(rd, common)?)
        };
        Ok(Glyph { index: 0, outline })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        match &self.outline {
            Outline::Empty => Ok(()),
            Outline::Simple(glyph) => glyph.pack(wr, ()),
            Outline::Compound(glyph) => glyph.pack(wr, ()),
        }
    }
}

impl<'a> FontData<'a> for GlyphCommon {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        Ok(GlyphCommon {
            number_of_contours: rd.read_i16::<BigEndian>()?,
            x_min: rd.read_i16::<BigEndian>()?,
            y_min: rd.read_i16::<BigEndian>()?,
            x_max: rd.read_i16::<BigEndian>()?,
            y_max: rd.read_i16::<BigEndian>()?,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_i16::<BigEndian>(self.number_of_contours)?;
        wr.write_i16::<BigEndian>(self.x_min)?;
        wr.write_i16::<BigEndian>(self.y_min)?;
        wr.write_i16::<BigEndian>(self.x_max)?;
        wr.write_i16::<BigEndian>(self.y_max)?;
        Ok(())
    }
}

impl<'a> FontData<'a> for SimpleGlyph {
    type UnpackDep = GlyphCommon;
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, common: Self::UnpackDep) -> Result<Self, Error> {
        let number_of_contours = common.number_of_contours as usize;
        codec::ensure_remaining(rd, number_of_contours * 2)?;
        let mut end_pts_of_contours = vec![0; number_of_contours];
        rd.read_u16_into::<BigEndian>(&mut end_pts_of_contours)?;
        if end_pts_of_contours.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::malformed(
                "glyf",
                "contour end points are not increasing",
            ));
        }
        let num_points = end_pts_of_contours
            .last()
            .map_or(0, |last| usize::from(*last) + 1);

        let instruction_length = rd.read_u16::<BigEndian>()?;
        let instructions = codec::read_bytes(rd, usize::from(instruction_length))?;

        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = SimpleGlyphFlags::from_bits_retain(rd.read_u8()?);
            flags.push(flag);
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let count = rd.read_u8()?;
                for _ in 0..count {
                    flags.push(flag);
                }
            }
        }
        if flags.len() > num_points {
            return Err(Error::malformed(
                "glyf",
                format!("{} flags for {} points", flags.len(), num_points),
            ));
        }

        let xs = read_coordinates(
            rd,
            &flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        )?;
        let ys = read_coordinates(
            rd,
            &flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        )?;
        let points = flags
            .iter()
            .zip(xs.into_iter().zip(ys))
            .map(|(flag, (x, y))| Point {
                x,
                y,
                on_curve: flag.contains(SimpleGlyphFlags::ON_CURVE_POINT),
            })
            .collect();

        Ok(SimpleGlyph {
            common,
            end_pts_of_contours,
            instructions,
            points,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let num_points = self
            .end_pts_of_contours
            .last()
            .map_or(0, |last| usize::from(*last) + 1);
        if num_points != self.points.len() {
            return Err(Error::malformed(
                "glyf",
                format!(
                    "contours end at point {} but the glyph has {} points",
                    num_points,
                    self.points.len()
                ),
            ));
        }

        let number_of_contours = i16::try_from(self.end_pts_of_contours.len()).map_err(|_| {
            Error::TooMany {
                what: "contours",
                max: i16::MAX as u32,
            }
        })?;
        GlyphCommon {
            number_of_contours,
            ..self.common
        }
        .pack(wr, ())?;
        for end_pt in &self.end_pts_of_contours {
            wr.write_u16::<BigEndian>(*end_pt)?;
        }
        wr.write_u16::<BigEndian>(checked_u16(self.instructions.len(), "instruction bytes")?)?;
        wr.write_all(&self.instructions)?;

        let mut flags = Vec::with_capacity(self.points.len());
        let mut xs = Vec::with_capacity(self.points.len());
        let mut ys = Vec::with_capacity(self.points.len());
        let (mut prev_x, mut prev_y) = (0i16, 0i16);
        for point in &self.points {
            let mut flag = if point.on_curve {
                SimpleGlyphFlags::ON_CURVE_POINT
            } else {
                SimpleGlyphFlags::empty()
            };
            write_delta(
                point.x.wrapping_sub(prev_x),
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
                &mut flag,
                &mut xs,
            )?;
            write_delta(
                point.y.wrapping_sub(prev_y),
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
                &mut flag,
                &mut ys,
            )?;
            flags.push(flag);
            prev_x = point.x;
            prev_y = point.y;
        }

        let mut i = 0;
        while i < flags.len() {
            let flag = flags[i];
            let mut repeat = 0;
            while repeat < 255 && flags.get(i + 1 + repeat) == Some(&flag) {
                repeat += 1;
            }
            if repeat > 1 {
                wr.write_u8((flag | SimpleGlyphFlags::REPEAT_FLAG).bits())?;
                wr.write_u8(repeat as u8)?;
                i += repeat + 1;
            } else {
                wr.write_u8(flag.bits())?;
                i += 1;
            }
        }
        wr.write_all(&xs)?;
        wr.write_all(&ys)?;
        Ok(())
    }
}

fn read_coordinates<R: AsRef<[u8]>>(
    rd: &mut Cursor<R>,
    flags: &[SimpleGlyphFlags],
    short_vector: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<Vec<i16>, Error> {
    let mut value = 0i16;
    let mut coordinates = Vec::with_capacity(flags.len());
    for flag in flags {
        let delta = if flag.contains(short_vector) {
            let magnitude = i16::from(rd.read_u8()?);
            if flag.contains(same_or_positive) {
                magnitude
            } else {
                -magnitude
            }
        } else if flag.contains(same_or_positive) {
            0
        } else {
            rd.read_i16::<BigEndian>()?
        };
        value = value.wrapping_add(delta);
        coordinates.push(value);
    }
    Ok(coordinates)
}

fn write_delta(
    delta: i16,
    short_vector: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
    flag: &mut SimpleGlyphFlags,
    data: &mut Vec<u8>,
) -> Result<(), Error> {
    if delta == 0 {
        *flag |= same_or_positive;
    } else if delta.unsigned_abs() <= 255 {
        *flag |= short_vector;
        if delta > 0 {
            *flag |= same_or_positive;
        }
        data.push(delta.unsigned_abs() as u8);
    } else {
        data.write_i16::<BigEndian>(delta)?;
    }
    Ok(())
}

impl<'a> FontData<'a> for CompoundGlyph {
    type UnpackDep = GlyphCommon;
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, common: Self::UnpackDep) -> Result<Self, Error> {
        let mut components = Vec::new();
        loop {
            let component = Component::unpack(rd, ())?;
            let more = component.flags.contains(ComponentFlags::MORE_COMPONENTS);
            components.push(component);
            if !more {
                break;
            }
        }

        let has_instructions = components
            .last()
            .map_or(false, |c| c.flags.contains(ComponentFlags::WE_HAVE_INSTRUCTIONS));
        let instructions = if has_instructions {
            let len = rd.read_u16::<BigEndian>()?;
            codec::read_bytes(rd, usize::from(len))?
        } else {
            Vec::new()
        };

        Ok(CompoundGlyph {
            common,
            components,
            instructions,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        if self.components.is_empty() {
            return Err(Error::malformed("glyf", "compound glyph without components"));
        }

        GlyphCommon {
            number_of_contours: self.common.number_of_contours.min(-1),
            ..self.common
        }
        .pack(wr, ())?;

        let mut has_instructions = false;
        for (i, component) in self.components.iter().enumerate() {
            let is_last = i + 1 == self.components.len();
            let mut flags = component.flags
                - (ComponentFlags::MORE_COMPONENTS
                    | ComponentFlags::WE_HAVE_A_SCALE
                    | ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE
                    | ComponentFlags::WE_HAVE_A_TWO_BY_TWO);
            if !is_last {
                flags |= ComponentFlags::MORE_COMPONENTS;
            } else if !self.instructions.is_empty() {
                flags |= ComponentFlags::WE_HAVE_INSTRUCTIONS;
            }
            if is_last {
                has_instructions = flags.contains(ComponentFlags::WE_HAVE_INSTRUCTIONS);
            }
            flags |= match component.transform {
                Transform::None => ComponentFlags::empty(),
                Transform::Scale(_) => ComponentFlags::WE_HAVE_A_SCALE,
                Transform::XyScale { .. } => ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE,
                Transform::TwoByTwo { .. } => ComponentFlags::WE_HAVE_A_TWO_BY_TWO,
            };
            Component { flags, ..*component }.pack(wr, ())?;
        }

        if has_instructions {
            wr.write_u16::<BigEndian>(checked_u16(self.instructions.len(), "instruction bytes")?)?;
            wr.write_all(&self.instructions)?;
        }
        Ok(())
    }
}

impl<'a> FontData<'a> for Component {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let flags = ComponentFlags::from_bits_retain(rd.read_u16::<BigEndian>()?);
        let glyph_index = rd.read_u16::<BigEndian>()?;

        let xy_values = flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES);
        let (argument1, argument2) = if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) {
            if xy_values {
                (
                    i32::from(rd.read_i16::<BigEndian>()?),
                    i32::from(rd.read_i16::<BigEndian>()?),
                )
            } else {
                (
                    i32::from(rd.read_u16::<BigEndian>()?),
                    i32::from(rd.read_u16::<BigEndian>()?),
                )
            }
        } else if xy_values {
            (i32::from(rd.read_i8()?), i32::from(rd.read_i8()?))
        } else {
            (i32::from(rd.read_u8()?), i32::from(rd.read_u8()?))
        };

        let transform = if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
            Transform::Scale(rd.read_f2dot14()?)
        } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            Transform::XyScale {
                x: rd.read_f2dot14()?,
                y: rd.read_f2dot14()?,
            }
        } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
            Transform::TwoByTwo {
                xscale: rd.read_f2dot14()?,
                scale01: rd.read_f2dot14()?,
                scale10: rd.read_f2dot14()?,
                yscale: rd.read_f2dot14()?,
            }
        } else {
            Transform::None
        };

        Ok(Component {
            flags,
            glyph_index,
            argument1,
            argument2,
            transform,
        })
    }

    /// Writes the component as is, except that byte arguments are widened to words if they no
    /// longer fit.
    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let mut flags = self.flags;
        let args = [self.argument1, self.argument2];
        let xy_values = flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES);
        let fits_bytes = if xy_values {
            args.iter().all(|a| i8::try_from(*a).is_ok())
        } else {
            args.iter().all(|a| u8::try_from(*a).is_ok())
        };
        if !fits_bytes {
            flags |= ComponentFlags::ARG_1_AND_2_ARE_WORDS;
        }

        wr.write_u16::<BigEndian>(flags.bits())?;
        wr.write_u16::<BigEndian>(self.glyph_index)?;
        let out_of_range = || Error::malformed("glyf", "component argument out of range");
        for arg in args {
            match (flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS), xy_values) {
                (true, true) => {
                    wr.write_i16::<BigEndian>(i16::try_from(arg).map_err(|_| out_of_range())?)?
                }
                (true, false) => {
                    wr.write_u16::<BigEndian>(u16::try_from(arg).map_err(|_| out_of_range())?)?
                }
                (false, true) => wr.write_i8(arg as i8)?,
                (false, false) => wr.write_u8(arg as u8)?,
            }
        }

        match self.transform {
            Transform::None => {}
            Transform::Scale(scale) => wr.write_f2dot14(scale)?,
            Transform::XyScale { x, y } => {
                wr.write_f2dot14(x)?;
                wr.write_f2dot14(y)?;
            }
            Transform::TwoByTwo {
                xscale,
                scale01,
                scale10,
                yscale,
            } => {
                wr.write_f2dot14(xscale)?;
                wr.write_f2dot14(scale01)?;
                wr.write_f2dot14(scale10)?;
                wr.write_f2dot14(yscale)?;
            }
        }
        Ok(())
    }
}
