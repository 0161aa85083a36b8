use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use super::{checked_u16, FontData, FontTable};
use crate::codec::{self, ReadSfntExt, Tag, WriteSfntExt};
use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// This table contains additional information needed to use TrueType fonts on PostScript
/// printers.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/post
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6post.html
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PostTable {
    /// 0x00010000, 0x00020000, 0x00025000, 0x00030000 or 0x00040000.
    pub version: u32,
    /// Italic angle in counter-clockwise degrees from the vertical. Zero for upright text, negative
    /// for text that leans to the right (forward).
    pub italic_angle: f64,
    /// This is the suggested distance of the top of the underline from the baseline (negative
    /// values indicate below baseline).
    pub underline_position: i16,
    /// Suggested values for the underline thickness.
    pub underline_thickness: i16,
    /// Set to 0 if the font is proportionally spaced, non-zero if the font is not proportionally
    /// spaced (i.e. monospaced).
    pub is_fixed_pitch: u32,
    /// Minimum memory usage when an OpenType font is downloaded.
    pub min_mem_type42: u32,
    /// Maximum memory usage when an OpenType font is downloaded.
    pub max_mem_type42: u32,
    /// Minimum memory usage when an OpenType font is downloaded as a Type 1 font.
    pub min_mem_type1: u32,
    /// Maximum memory usage when an OpenType font is downloaded as a Type 1 font.
    pub max_mem_type1: u32,
    /// Glyph names of a version 2.0 table.
    pub glyph_names: Option<GlyphNames>,
    /// Data following the header of any other version, kept as is.
    #[serde(skip)]
    pub tail: Vec<u8>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct GlyphNames {
    /// Indices into the standard Macintosh names (< 258) or into `names` (>= 258), indexed by
    /// glyph id.
    pub glyph_name_index: Vec<u16>,
    /// Names not found in the standard Macintosh set.
    pub names: Vec<String>,
}

impl PostTable {
    pub const VERSION_2: u32 = 0x00020000;
    pub const VERSION_3: u32 = 0x00030000;

    /// The PostScript name of `glyph_id`, if the table carries names.
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        let names = self.glyph_names.as_ref()?;
        let index = usize::from(*names.glyph_name_index.get(usize::from(glyph_id))?);
        if index < STANDARD_MAC_NAMES.len() {
            Some(STANDARD_MAC_NAMES[index])
        } else {
            names
                .names
                .get(index - STANDARD_MAC_NAMES.len())
                .map(String::as_str)
        }
    }

    /// Keeps the names of `glyph_ids` (old ids in their new order). Custom names that are no
    /// longer referenced are dropped. Tables with per-glyph data in other versions cannot be
    /// remapped and are converted to version 3.0.
    pub fn subset(&mut self, glyph_ids: &[u16]) {
        if let Some(names) = &self.glyph_names {
            let mut new_names = Vec::new();
            let mut reindexed: HashMap<usize, u16> = HashMap::new();
            let glyph_name_index = glyph_ids
                .iter()
                .map(|id| {
                    let index = names
                        .glyph_name_index
                        .get(usize::from(*id))
                        .copied()
                        .unwrap_or(0);
                    let custom = usize::from(index).checked_sub(STANDARD_MAC_NAMES.len());
                    match custom.and_then(|i| names.names.get(i).map(|name| (i, name))) {
                        Some((i, name)) => *reindexed.entry(i).or_insert_with(|| {
                            new_names.push(name.clone());
                            (STANDARD_MAC_NAMES.len() + new_names.len() - 1) as u16
                        }),
                        None if custom.is_some() => 0,
                        None => index,
                    }
                })
                .collect();
            self.glyph_names = Some(GlyphNames {
                glyph_name_index,
                names: new_names,
            });
        } else if !self.tail.is_empty() {
            log::warn!(
                "Dropping glyph names of post table version {:#010x}",
                self.version
            );
            self.version = Self::VERSION_3;
            self.tail.clear();
        }
    }
}

impl<'a> FontTable<'a> for PostTable {
    const TAG: Tag = Tag::new(b"post");
}

impl<'a> FontData<'a> for PostTable {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let version = rd.read_u32::<BigEndian>()?;
        let italic_angle = rd.read_fixed()?;
        let underline_position = rd.read_fword()?;
        let underline_thickness = rd.read_fword()?;
        let is_fixed_pitch = rd.read_u32::<BigEndian>()?;
        let min_mem_type42 = rd.read_u32::<BigEndian>()?;
        let max_mem_type42 = rd.read_u32::<BigEndian>()?;
        let min_mem_type1 = rd.read_u32::<BigEndian>()?;
        let max_mem_type1 = rd.read_u32::<BigEndian>()?;

        let mut glyph_names = None;
        let mut tail = Vec::new();
        if version == Self::VERSION_2 {
            glyph_names = Some(GlyphNames::unpack(rd, ())?);
        } else {
            rd.read_to_end(&mut tail)?;
        }

        Ok(PostTable {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
            min_mem_type42,
            max_mem_type42,
            min_mem_type1,
            max_mem_type1,
            glyph_names,
            tail,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u32::<BigEndian>(self.version)?;
        wr.write_fixed(self.italic_angle)?;
        wr.write_fword(self.underline_position)?;
        wr.write_fword(self.underline_thickness)?;
        wr.write_u32::<BigEndian>(self.is_fixed_pitch)?;
        wr.write_u32::<BigEndian>(self.min_mem_type42)?;
        wr.write_u32::<BigEndian>(self.max_mem_type42)?;
        wr.write_u32::<BigEndian>(self.min_mem_type1)?;
        wr.write_u32::<BigEndian>(self.max_mem_type1)?;
        match &self.glyph_names {
            Some(names) if self.version == Self::VERSION_2 => names.pack(wr, ())?,
            _ => wr.write_all(&self.tail)?,
        }
        Ok(())
    }
}

impl<'a> FontData<'a> for GlyphNames {
    type UnpackDep = ();
    type PackDep = ();

    fn unpack<R: AsRef<[u8]>>(rd: &mut Cursor<R>, _: Self::UnpackDep) -> Result<Self, Error> {
        let num_glyphs = rd.read_u16::<BigEndian>()?;
        codec::ensure_remaining(rd, usize::from(num_glyphs) * 2)?;
        let mut glyph_name_index = vec![0; usize::from(num_glyphs)];
        rd.read_u16_into::<BigEndian>(&mut glyph_name_index)?;

        // Pascal strings until the end of the table
        let mut names = Vec::new();
        while codec::remaining(rd) > 0 {
            let len = rd.read_u8()?;
            let bytes = codec::read_bytes(rd, usize::from(len))?;
            names.push(bytes.into_iter().map(char::from).collect());
        }

        let referenced = glyph_name_index
            .iter()
            .filter(|i| usize::from(**i) >= STANDARD_MAC_NAMES.len())
            .map(|i| usize::from(*i) - STANDARD_MAC_NAMES.len() + 1)
            .max()
            .unwrap_or(0);
        if referenced > names.len() {
            log::warn!(
                "post table references {} glyph names but only contains {}",
                referenced,
                names.len()
            );
        }

        Ok(GlyphNames {
            glyph_name_index,
            names,
        })
    }

    fn pack<W: io::Write>(&self, wr: &mut W, _: Self::PackDep) -> Result<(), Error> {
        wr.write_u16::<BigEndian>(checked_u16(self.glyph_name_index.len(), "glyph names")?)?;
        for index in &self.glyph_name_index {
            wr.write_u16::<BigEndian>(*index)?;
        }
        for name in &self.names {
            let bytes = name
                .chars()
                .map(u8::try_from)
                .collect::<Result<Vec<u8>, _>>()
                .map_err(|_| Error::malformed("post", format!("glyph name `{}`", name)))?;
            let len = u8::try_from(bytes.len())
                .map_err(|_| Error::malformed("post", format!("glyph name `{}` too long", name)))?;
            wr.write_u8(len)?;
            wr.write_all(&bytes)?;
        }
        Ok(())
    }
}

/// The 258 glyph names of the standard Macintosh character set.
pub const STANDARD_MAC_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign",
    "dollar", "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk",
    "plus", "comma", "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five",
    "six", "seven", "eight", "nine", "colon", "semicolon", "less", "equal", "greater",
    "question", "at", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
    "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft", "backslash",
    "bracketright", "asciicircum", "underscore", "grave", "a", "b", "c", "d", "e", "f", "g",
    "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y",
    "z", "braceleft", "bar", "braceright", "asciitilde", "Adieresis", "Aring", "Ccedilla",
    "Eacute", "Ntilde", "Odieresis", "Udieresis", "aacute", "agrave", "acircumflex",
    "adieresis", "atilde", "aring", "ccedilla", "eacute", "egrave", "ecircumflex", "edieresis",
    "iacute", "igrave", "icircumflex", "idieresis", "ntilde", "oacute", "ograve", "ocircumflex",
    "odieresis", "otilde", "uacute", "ugrave", "ucircumflex", "udieresis", "dagger", "degree",
    "cent", "sterling", "section", "bullet", "paragraph", "germandbls", "registered",
    "copyright", "trademark", "acute", "dieresis", "notequal", "AE", "Oslash", "infinity",
    "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff", "summation",
    "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae", "oslash",
    "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal", "Delta",
    "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered",
    "quotesinglbase", "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute",
    "Edieresis", "Egrave", "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute",
    "Ocircumflex", "apple", "Ograve", "Uacute", "Ucircumflex", "Ugrave", "dotlessi",
    "circumflex", "tilde", "macron", "breve", "dotaccent", "ring", "cedilla", "hungarumlaut",
    "ogonek", "caron", "Lslash", "lslash", "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar",
    "Eth", "eth", "Yacute", "yacute", "Thorn", "thorn", "minus", "multiply", "onesuperior",
    "twosuperior", "threesuperior", "onehalf", "onequarter", "threequarters", "franc", "Gbreve",
    "gbreve", "Idotaccent", "Scedilla", "scedilla", "Cacute", "cacute", "Ccaron", "ccaron",
    "dcroat",
];
