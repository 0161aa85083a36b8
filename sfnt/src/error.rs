use std::io;
use std::path::PathBuf;

use crate::codec::Tag;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unexpected end of font data")]
    Truncated,
    #[error("Unsupported {table} table version {version:#x}")]
    UnsupportedVersion { table: &'static str, version: u32 },
    #[error("Unsupported {table} format {format}")]
    UnsupportedFormat { table: &'static str, format: u16 },
    #[error("Required table `{0}` is missing")]
    MissingRequiredTable(Tag),
    #[error("Table `{0}` is listed more than once in the table directory")]
    DuplicateTable(Tag),
    #[error("Cannot write font to {0:?}: only .ttf output is supported")]
    UnsupportedOutputFormat(PathBuf),
    #[error("{0}")]
    InconsistentState(&'static str),
    #[error("Malformed {table} table: {reason}")]
    Malformed { table: &'static str, reason: String },
    #[error("Cannot write more than {max} {what}")]
    TooMany { what: &'static str, max: u32 },
    #[error("Error reading or writing font file")]
    Io(#[source] io::Error),
}

impl Error {
    pub(crate) fn malformed(table: &'static str, reason: impl Into<String>) -> Self {
        Error::Malformed {
            table,
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated
        } else {
            Error::Io(err)
        }
    }
}
