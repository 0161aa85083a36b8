pub mod cmap;
pub mod fvar;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod kern;
pub mod loca;
pub mod ltag;
pub mod maxp;
pub mod meta;
pub mod name;
pub mod offset;
pub mod os2;
pub mod post;

use std::io::{self, Cursor};

use crate::codec::Tag;
use crate::error::Error;

/// A record (or a whole table) that can be read from and written to font data.
///
/// `UnpackDep` and `PackDep` carry values of other, already decoded tables a record depends
/// on, e.g. `loca` needs `head` and `maxp` to know its format and length.
pub trait FontData<'a>: Sized {
    type UnpackDep;
    type PackDep;

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, dep: Self::UnpackDep) -> Result<Self, Error>;
    fn pack<W: io::Write>(&self, wr: &mut W, dep: Self::PackDep) -> Result<(), Error>;
}

/// A top-level table that is referenced from the table directory.
pub trait FontTable<'a>: FontData<'a> {
    const TAG: Tag;
}

/// Packs a table into a fresh buffer.
pub(crate) fn pack_table<'a, T: FontTable<'a>>(table: &T, dep: T::PackDep) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    table.pack(&mut buffer, dep)?;
    Ok(buffer)
}

pub(crate) fn checked_u16(len: usize, what: &'static str) -> Result<u16, Error> {
    u16::try_from(len).map_err(|_| Error::TooMany {
        what,
        max: u32::from(u16::MAX),
    })
}

pub(crate) fn checked_u32(len: usize, what: &'static str) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::TooMany {
        what,
        max: u32::MAX,
    })
}
