use std::io::{self, Cursor};

use super::{checked_u16, FontData, FontTable};
use crate::codec::{self, ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

const HEADER_SIZE: u16 = 16;
const AXIS_SIZE: u16 = 20;

/// The font variations table allows font variation axes and named instances to be defined.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/fvar
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6fvar.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FvarTable {
    /// Table version as `major.minor`, set to `1.0`.
    pub version: String,
    pub axes: Vec<VariationAxis>,
    pub instances: Vec<InstanceRecord>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct VariationAxis {
    /// Tag identifying the design variation for the axis.
    pub axis_tag: Tag,
    /// The minimum coordinate value for the axis.
    pub min_value: f64,
    /// The default coordinate value for the axis.
    pub default_value: f64,
    /// The maximum coordinate value for the axis.
    pub max_value: f64,
    /// Axis qualifiers; 0x0001 hides the axis from user interfaces.
    pub flags: u16,
    /// The name ID for entries in the 'name' table that provide a display name for this axis.
    pub axis_name_id: u16,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct InstanceRecord {
    /// The name ID for entries in the 'name' table that provide subfamily names for this
    /// instance.
    pub subfamily_name_id: u16,
    /// Reserved for future use; set to 0.
    pub flags: u16,
    /// One coordinate per axis.
    pub coordinates: Vec<f64>,
    /// The name ID for entries in the 'name' table that provide PostScript names for this
    /// instance.
    pub post_script_name_id: Option<u16>,
}

impl<'a> FontTable<'a> for FvarTable {
    const TAG: Tag = Tag::new(b"fvar");
}

impl<'a> FontData<'a> for FvarTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_version()?;
        // some fonts set 0 instead of the header size
        let offset_to_data = rd.read_u16::<BigEndian>()?.max(HEADER_SIZE);
        rd.read_u16::<BigEndian>()?; // countSizePairs
        let axis_count = rd.read_u16::<BigEndian>()?;
        let axis_size = rd.read_u16::<BigEndian>()?;
        let instance_count = rd.read_u16::<BigEndian>()?;
        let instance_size = rd.read_u16::<BigEndian>()?;

        if axis_size < AXIS_SIZE {
            return Err(Error::malformed(
                "fvar",
                format!("axis records of {} bytes are too small", axis_size),
            ));
        }
        let coordinates_size = usize::from(axis_count) * 4;
        if usize::from(instance_size) < coordinates_size + 4 {
            return Err(Error::malformed(
                "fvar",
                format!(
                    "instance records of {} bytes are too small for {} axes",
                    instance_size, axis_count
                ),
            ));
        }
        let has_post_script_name_id = usize::from(instance_size) >= coordinates_size + 6;

        let data = rd.get_ref().as_ref();
        let mut offset = usize::from(offset_to_data);

        let mut axes = Vec::with_capacity(usize::from(axis_count));
        for _ in 0..axis_count {
            let mut rd = Cursor::new(codec::sub_slice(data, offset, usize::from(axis_size))?);
            axes.push(VariationAxis {
                axis_tag: rd.read_tag()?,
                min_value: rd.read_fixed()?,
                default_value: rd.read_fixed()?,
                max_value: rd.read_fixed()?,
                flags: rd.read_u16::<BigEndian>()?,
                axis_name_id: rd.read_u16::<BigEndian>()?,
            });
            offset += usize::from(axis_size);
        }

        let mut instances = Vec::with_capacity(usize::from(instance_count));
        for _ in 0..instance_count {
            let mut rd = Cursor::new(codec::sub_slice(data, offset, usize::from(instance_size))?);
            let subfamily_name_id = rd.read_u16::<BigEndian>()?;
            let flags = rd.read_u16::<BigEndian>()?;
            let mut coordinates = Vec::with_capacity(usize::from(axis_count));
            for _ in 0..axis_count {
                coordinates.push(rd.read_fixed()?);
            }
            let post_script_name_id = if has_post_script_name_id {
                Some(rd.read_u16::<BigEndian>()?)
            } else {
                None
            };
            instances.push(InstanceRecord {
                subfamily_name_id,
                flags,
                coordinates,
                post_script_name_id,
            });
            offset += usize::from(instance_size);
        }

        Ok(FvarTable {
            version,
            axes,
            instances,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        let axis_count = checked_u16(self.axes.len(), "variation axes")?;
        let with_post_script_name_id = self
            .instances
            .iter()
            .filter(|instance| instance.post_script_name_id.is_some())
            .count();
        if with_post_script_name_id != 0 && with_post_script_name_id != self.instances.len() {
            return Err(Error::malformed(
                "fvar",
                "either all or no instances must have a PostScript name id",
            ));
        }
        let mut instance_size = 4 + self.axes.len() * 4;
        if with_post_script_name_id > 0 {
            instance_size += 2;
        }

        wr.write_version(&self.version)?;
        wr.write_u16::<BigEndian>(HEADER_SIZE)?;
        wr.write_u16::<BigEndian>(2)?; // countSizePairs
        wr.write_u16::<BigEndian>(axis_count)?;
        wr.write_u16::<BigEndian>(AXIS_SIZE)?;
        wr.write_u16::<BigEndian>(checked_u16(self.instances.len(), "named instances")?)?;
        wr.write_u16::<BigEndian>(checked_u16(instance_size, "bytes per instance")?)?;

        for axis in &self.axes {
            wr.write_tag(axis.axis_tag)?;
            wr.write_fixed(axis.min_value)?;
            wr.write_fixed(axis.default_value)?;
            wr.write_fixed(axis.max_value)?;
            wr.write_u16::<BigEndian>(axis.flags)?;
            wr.write_u16::<BigEndian>(axis.axis_name_id)?;
        }

        for instance in &self.instances {
            if instance.coordinates.len() != self.axes.len() {
                return Err(Error::malformed(
                    "fvar",
                    format!(
                        "instance has {} coordinates for {} axes",
                        instance.coordinates.len(),
                        self.axes.len()
                    ),
                ));
            }
            wr.write_u16::<BigEndian>(instance.subfamily_name_id)?;
            wr.write_u16::<BigEndian>(instance.flags)?;
            for coordinate in &instance.coordinates {
                wr.write_fixed(*coordinate)?;
            }
            if let Some(id) = instance.post_script_name_id {
                wr.write_u16::<BigEndian>(id)?;
            }
        }

        Ok(())
    }
}
