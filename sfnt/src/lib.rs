//! Reading, subsetting and writing of SFNT (TrueType) fonts.
//!
//! ```no_run
//! # fn main() -> Result<(), sfnt::Error> {
//! let mut font = sfnt::Font::open("fonts/Roboto-Regular.ttf")?;
//! println!("{} glyphs", font.info()?.num_glyphs());
//! font.subset(&["Hello World"])?;
//! font.write("out/Roboto-Subset.ttf")?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod error;
mod font;
mod subset;
pub mod tables;
mod utils;
pub mod writer;

use std::fs;
use std::path::Path;

pub use codec::Tag;
pub use error::Error;
pub use font::{EncodedFont, FontInfo, WRITABLE_TABLES};
pub use subset::glyph_closure;

/// A font file, decoded on first access.
#[derive(Debug)]
pub struct Font {
    data: Vec<u8>,
    info: Option<FontInfo>,
}

impl Font {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("Reading font {}", path.display());
        Ok(Font::from_bytes(fs::read(path)?))
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Font {
            data: data.into(),
            info: None,
        }
    }

    /// The decoded font. Decoding happens once; later calls return the same (possibly
    /// subsetted) tables.
    pub fn info(&mut self) -> Result<&FontInfo, Error> {
        let info = match self.info.take() {
            Some(info) => info,
            None => FontInfo::from_slice(&self.data)?,
        };
        Ok(self.info.insert(info))
    }

    /// Reduces the font to the glyphs needed for `texts`. [`Font::info`] must have been called
    /// before.
    pub fn subset<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<Vec<u16>, Error> {
        let info = self.info.as_mut().ok_or(Error::InconsistentState(
            "font must be decoded before it can be subset",
        ))?;
        info.subset(texts)
    }

    /// Writes the font to `path`, which must have a `.ttf` extension. Missing parent
    /// directories are created. Returns the warnings for tables that were skipped.
    pub fn write(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>, Error> {
        self.write_with(path, &WRITABLE_TABLES)
    }

    /// Like [`Font::write`], but only writes the given tables.
    pub fn write_with(
        &mut self,
        path: impl AsRef<Path>,
        tables: &[Tag],
    ) -> Result<Vec<String>, Error> {
        let path = path.as_ref();
        let is_ttf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("ttf"));
        if !is_ttf {
            return Err(Error::UnsupportedOutputFormat(path.to_path_buf()));
        }

        let encoded = self.info()?.to_bytes_with(tables)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &encoded.data)?;
        log::debug!("Wrote {} bytes to {}", encoded.data.len(), path.display());

        Ok(encoded.warnings)
    }
}
