//! Big-endian primitives shared by all table codecs.
//!
//! Integers are read and written through `byteorder`; the SFNT specific number formats
//! (Fixed, F2Dot14, LONGDATETIME, version pairs and tags) are added on top as extension
//! traits, so every table reads from a `Cursor` over its own byte slice. Reading past the end
//! of that slice surfaces as [`Error::Truncated`].

use std::fmt;
use std::io::{self, Cursor};
use std::str::FromStr;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Serialize, Serializer};

use crate::error::Error;

/// Seconds between the LONGDATETIME epoch (1904-01-01) and the Unix epoch.
pub const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// A four byte table or axis tag, e.g. `glyf` or `OS/2`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const fn new(tag: &[u8; 4]) -> Self {
        Tag(*tag)
    }

    pub const fn from_u32(tag: u32) -> Self {
        Tag(tag.to_be_bytes())
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl FromStr for Tag {
    type Err = String;

    /// Parses a tag, padding tags shorter than four bytes with spaces (e.g. `cvt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 || !s.is_ascii() {
            return Err(format!("`{}` is not a valid table tag", s));
        }
        let mut tag = [b' '; 4];
        tag[..bytes.len()].copy_from_slice(bytes);
        Ok(Tag(tag))
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub trait ReadSfntExt: io::Read {
    /// 16.16 fixed-point number.
    fn read_fixed(&mut self) -> io::Result<f64> {
        Ok(f64::from(self.read_i32::<BigEndian>()?) / 65536.0)
    }

    /// 2.14 fixed-point number.
    fn read_f2dot14(&mut self) -> io::Result<f32> {
        Ok(f32::from(self.read_i16::<BigEndian>()?) / 16384.0)
    }

    fn read_fword(&mut self) -> io::Result<i16> {
        self.read_i16::<BigEndian>()
    }

    fn read_ufword(&mut self) -> io::Result<u16> {
        self.read_u16::<BigEndian>()
    }

    /// Seconds since 1904-01-01, converted to seconds since the Unix epoch.
    fn read_long_date_time(&mut self) -> io::Result<i64> {
        Ok(self.read_i64::<BigEndian>()?.wrapping_sub(MAC_EPOCH_OFFSET))
    }

    /// Two u16 values formatted as `major.minor`.
    fn read_version(&mut self) -> io::Result<String> {
        let major = self.read_u16::<BigEndian>()?;
        let minor = self.read_u16::<BigEndian>()?;
        Ok(format!("{}.{}", major, minor))
    }

    fn read_tag(&mut self) -> io::Result<Tag> {
        let mut tag = [0; 4];
        self.read_exact(&mut tag)?;
        Ok(Tag(tag))
    }
}

impl<R: io::Read + ?Sized> ReadSfntExt for R {}

pub trait WriteSfntExt: io::Write {
    fn write_fixed(&mut self, value: f64) -> io::Result<()> {
        self.write_i32::<BigEndian>((value * 65536.0).round() as i32)
    }

    fn write_f2dot14(&mut self, value: f32) -> io::Result<()> {
        self.write_i16::<BigEndian>((value * 16384.0).round() as i16)
    }

    fn write_fword(&mut self, value: i16) -> io::Result<()> {
        self.write_i16::<BigEndian>(value)
    }

    fn write_ufword(&mut self, value: u16) -> io::Result<()> {
        self.write_u16::<BigEndian>(value)
    }

    fn write_long_date_time(&mut self, unix_time: i64) -> io::Result<()> {
        self.write_i64::<BigEndian>(unix_time.wrapping_add(MAC_EPOCH_OFFSET))
    }

    /// Inverse of [`ReadSfntExt::read_version`]; unparsable parts are written as 0.
    fn write_version(&mut self, version: &str) -> io::Result<()> {
        let (major, minor) = version.split_once('.').unwrap_or((version, "0"));
        self.write_u16::<BigEndian>(major.trim().parse().unwrap_or(0))?;
        self.write_u16::<BigEndian>(minor.trim().parse().unwrap_or(0))
    }

    fn write_tag(&mut self, tag: Tag) -> io::Result<()> {
        self.write_all(&tag.0)
    }
}

impl<W: io::Write + ?Sized> WriteSfntExt for W {}

/// Number of unread bytes left in the cursor.
pub(crate) fn remaining<R: AsRef<[u8]>>(rd: &Cursor<R>) -> usize {
    let len = rd.get_ref().as_ref().len() as u64;
    len.saturating_sub(rd.position()) as usize
}

/// Fails with [`Error::Truncated`] unless at least `len` bytes are left. Used before
/// allocating for counts read from the font.
pub(crate) fn ensure_remaining<R: AsRef<[u8]>>(rd: &Cursor<R>, len: usize) -> Result<(), Error> {
    if remaining(rd) < len {
        Err(Error::Truncated)
    } else {
        Ok(())
    }
}

pub(crate) fn read_bytes<R: AsRef<[u8]>>(rd: &mut Cursor<R>, len: usize) -> Result<Vec<u8>, Error> {
    ensure_remaining(rd, len)?;
    let mut buf = vec![0; len];
    io::Read::read_exact(rd, &mut buf)?;
    Ok(buf)
}

/// Bounds checked `&data[offset..offset + len]`.
pub(crate) fn sub_slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8], Error> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::Truncated)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixed_point_numbers() {
        let data = [0x00, 0x01, 0x80, 0x00, 0xC0, 0x00, 0x70, 0x00];
        let mut rd = Cursor::new(&data[..]);
        assert_eq!(rd.read_fixed().unwrap(), 1.5);
        assert_eq!(rd.read_f2dot14().unwrap(), -1.0);
        assert_eq!(rd.read_f2dot14().unwrap(), 1.75);

        let mut buffer = Vec::new();
        buffer.write_fixed(1.5).unwrap();
        buffer.write_f2dot14(-1.0).unwrap();
        buffer.write_f2dot14(1.75).unwrap();
        assert_eq!(buffer, data);
    }

    #[test]
    fn test_long_date_time() {
        // 2000-01-01T00:00:00Z
        let mac = 3_029_529_600i64;
        let data = mac.to_be_bytes();
        let unix = Cursor::new(&data[..]).read_long_date_time().unwrap();
        assert_eq!(unix, 946_684_800);

        let mut buffer = Vec::new();
        buffer.write_long_date_time(unix).unwrap();
        assert_eq!(buffer, data);
    }

    #[test]
    fn test_version() {
        let data = [0x00, 0x01, 0x00, 0x00];
        assert_eq!(Cursor::new(&data[..]).read_version().unwrap(), "1.0");

        let mut buffer = Vec::new();
        buffer.write_version("1.0").unwrap();
        buffer.write_version("garbage").unwrap();
        assert_eq!(buffer, [0, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_u24() {
        let data = [0x01, 0x02, 0x03];
        assert_eq!(
            Cursor::new(&data[..]).read_u24::<BigEndian>().unwrap(),
            0x010203
        );
    }

    #[test]
    fn test_truncated_read() {
        let data = [0x00, 0x01];
        let mut rd = Cursor::new(&data[..]);
        let err = Error::from(rd.read_u32::<BigEndian>().unwrap_err());
        assert!(matches!(err, Error::Truncated));
        assert!(matches!(read_bytes(&mut rd, 3), Err(Error::Truncated)));
        assert!(matches!(sub_slice(&data, 1, 2), Err(Error::Truncated)));
        assert_eq!(sub_slice(&data, 1, 1).unwrap(), &[0x01]);
    }

    #[test]
    fn test_tag() {
        let tag: Tag = "OS/2".parse().unwrap();
        assert_eq!(tag, Tag::new(b"OS/2"));
        assert_eq!(tag.to_string(), "OS/2");
        assert_eq!("cvt".parse::<Tag>().unwrap(), Tag::new(b"cvt "));
        assert!("toolong".parse::<Tag>().is_err());
        assert_eq!(Tag::from_u32(0x676C7966), Tag::new(b"glyf"));
    }
}
