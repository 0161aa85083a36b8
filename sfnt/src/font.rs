use std::collections::BTreeSet;
use std::io::Cursor;

use crate::codec::Tag;
use crate::error::Error;
use crate::tables::cmap::CmapTable;
use crate::tables::fvar::FvarTable;
use crate::tables::glyf::GlyfTable;
use crate::tables::head::HeadTable;
use crate::tables::hhea::HheaTable;
use crate::tables::hmtx::HmtxTable;
use crate::tables::kern::KernTable;
use crate::tables::loca::{self, LocaTable};
use crate::tables::ltag::LtagTable;
use crate::tables::maxp::MaxpTable;
use crate::tables::meta::MetaTable;
use crate::tables::name::NameTable;
use crate::tables::offset::{OffsetTable, SfntVersion};
use crate::tables::os2::Os2Table;
use crate::tables::post::PostTable;
use crate::tables::{checked_u16, pack_table, FontData, FontTable};
use crate::writer::FontWriter;
use serde::Serialize;

/// Tables that can be written, in the order they are encoded.
pub const WRITABLE_TABLES: [Tag; 14] = [
    CmapTable::TAG,
    FvarTable::TAG,
    GlyfTable::TAG,
    HeadTable::TAG,
    HheaTable::TAG,
    HmtxTable::TAG,
    KernTable::TAG,
    LtagTable::TAG,
    LocaTable::TAG,
    MaxpTable::TAG,
    MetaTable::TAG,
    NameTable::TAG,
    Os2Table::TAG,
    PostTable::TAG,
];

/// All decoded tables of a font.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FontInfo {
    pub sfnt_version: SfntVersion,
    /// The table directory the font was read from.
    pub directory: OffsetTable,
    pub head: HeadTable,
    pub maxp: MaxpTable,
    /// Regenerated from `glyf` on write; cleared by subsetting.
    pub loca: Option<LocaTable>,
    pub glyf: GlyfTable,
    pub hhea: Option<HheaTable>,
    pub hmtx: Option<HmtxTable>,
    pub cmap: Option<CmapTable>,
    pub os2: Option<Os2Table>,
    pub post: Option<PostTable>,
    pub name: Option<NameTable>,
    pub kern: Option<KernTable>,
    pub fvar: Option<FvarTable>,
    pub meta: Option<MetaTable>,
    pub ltag: Option<LtagTable>,
    /// Optional tables that were skipped while decoding.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// The result of encoding a font: the file contents and the tables that could not be written.
#[derive(Debug, PartialEq, Clone)]
pub struct EncodedFont {
    pub data: Vec<u8>,
    pub warnings: Vec<String>,
}

fn unpack_optional<'a, T: FontTable<'a>>(
    directory: &OffsetTable,
    data: &[u8],
    dep: T::UnpackDep,
    warnings: &mut Vec<String>,
) -> Result<Option<T>, Error> {
    match directory.unpack_table::<T>(data, dep) {
        Ok(table) => Ok(table),
        Err(Error::Truncated) => Err(Error::Truncated),
        Err(err) => {
            let warning = format!("Skipping table `{}`: {}", T::TAG, err);
            log::warn!("{}", warning);
            warnings.push(warning);
            Ok(None)
        }
    }
}

impl FontInfo {
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let directory = OffsetTable::unpack(&mut Cursor::new(data), ())?;
        log::debug!(
            "Reading font with tables {:?}",
            directory.tables.keys().collect::<Vec<_>>()
        );

        let head: HeadTable = directory.unpack_required_table(data, ())?;
        let maxp: MaxpTable = directory.unpack_required_table(data, ())?;
        let loca: LocaTable = directory.unpack_required_table(data, (&head, &maxp))?;
        let glyf: GlyfTable = directory.unpack_required_table(data, &loca)?;

        let mut warnings = Vec::new();
        let hhea: Option<HheaTable> = unpack_optional(&directory, data, (), &mut warnings)?;
        let hmtx: Option<HmtxTable> = match &hhea {
            Some(hhea) => unpack_optional(&directory, data, (hhea, &maxp), &mut warnings)?,
            None => {
                if directory.get_table_record(HmtxTable::TAG).is_some() {
                    let warning = "Skipping table `hmtx`: hhea table is missing".to_string();
                    log::warn!("{}", warning);
                    warnings.push(warning);
                }
                None
            }
        };
        let ltag: Option<LtagTable> = unpack_optional(&directory, data, (), &mut warnings)?;
        let name: Option<NameTable> = unpack_optional(&directory, data, ltag.as_ref(), &mut warnings)?;
        let cmap: Option<CmapTable> = unpack_optional(&directory, data, (), &mut warnings)?;
        let kern: Option<KernTable> = unpack_optional(&directory, data, (), &mut warnings)?;
        if let Some(cmap) = &cmap {
            warnings.extend(cmap.warnings.iter().cloned());
        }
        if let Some(kern) = &kern {
            warnings.extend(kern.warnings.iter().cloned());
        }

        Ok(FontInfo {
            sfnt_version: directory.sfnt_version,
            head,
            maxp,
            loca: Some(loca),
            glyf,
            hhea,
            hmtx,
            cmap,
            os2: unpack_optional(&directory, data, (), &mut warnings)?,
            post: unpack_optional(&directory, data, (), &mut warnings)?,
            name,
            kern,
            fvar: unpack_optional(&directory, data, (), &mut warnings)?,
            meta: unpack_optional(&directory, data, (), &mut warnings)?,
            ltag,
            directory,
            warnings,
        })
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyf.glyphs.len()
    }

    /// Encodes all writable tables.
    pub fn to_bytes(&self) -> Result<EncodedFont, Error> {
        self.to_bytes_with(&WRITABLE_TABLES)
    }

    /// Encodes the given tables. Tables that are absent or fail to encode are skipped with a
    /// warning; the result is a valid font without them.
    pub fn to_bytes_with(&self, tables: &[Tag]) -> Result<EncodedFont, Error> {
        let mut warnings = Vec::new();
        let mut warn = |warning: String| {
            log::warn!("{}", warning);
            warnings.push(warning);
        };

        let (glyf, offsets) = self.glyf.pack_with_offsets()?;
        let preferred = match &self.loca {
            Some(loca) => loca.format,
            None => loca::Format::from_index_to_loc_format(self.head.index_to_loc_format),
        };
        let loca = LocaTable::from_offsets(offsets, preferred);

        let mut writer = FontWriter::new();
        let mut seen = BTreeSet::new();
        for tag in tables {
            if !seen.insert(*tag) {
                continue;
            }
            if !WRITABLE_TABLES.contains(tag) {
                warn(format!("Skipping table `{}`: writing it is not supported", tag));
                continue;
            }
            let data = if *tag == GlyfTable::TAG {
                Ok(Some(glyf.clone()))
            } else {
                self.pack_table(*tag, &loca)
            };
            match data {
                Ok(Some(data)) => writer.insert(*tag, data),
                Ok(None) => warn(format!("Skipping table `{}`: not present in font", tag)),
                Err(err) => warn(format!("Skipping table `{}`: {}", tag, err)),
            }
        }

        let data = writer.finish(self.sfnt_version)?;
        Ok(EncodedFont { data, warnings })
    }

    /// Encodes a single table other than `glyf`, with the counts and formats synced to the
    /// glyph data that is written alongside it.
    fn pack_table(&self, tag: Tag, loca: &LocaTable) -> Result<Option<Vec<u8>>, Error> {
        fn pack<'a, T: FontTable<'a, PackDep = ()>>(table: Option<&T>) -> Result<Option<Vec<u8>>, Error> {
            table.map(|table| pack_table(table, ())).transpose()
        }

        let num_glyphs = checked_u16(self.num_glyphs(), "glyphs")?;
        match tag {
            HeadTable::TAG => {
                let mut head = self.head.clone();
                head.check_sum_adjustment = 0;
                head.index_to_loc_format = loca.format.index_to_loc_format();
                pack(Some(&head))
            }
            MaxpTable::TAG => {
                let mut maxp = self.maxp.clone();
                maxp.set_num_glyphs(num_glyphs);
                pack(Some(&maxp))
            }
            LocaTable::TAG => pack(Some(loca)),
            HheaTable::TAG => {
                let hhea = match &self.hhea {
                    Some(hhea) => {
                        let mut hhea = hhea.clone();
                        if let Some(hmtx) = &self.hmtx {
                            hhea.number_of_h_metrics =
                                checked_u16(hmtx.h_metrics.len(), "horizontal metrics")?;
                        }
                        Some(hhea)
                    }
                    None => None,
                };
                pack(hhea.as_ref())
            }
            HmtxTable::TAG => {
                if let Some(hmtx) = &self.hmtx {
                    if hmtx.len() != self.num_glyphs() {
                        return Err(Error::malformed(
                            "hmtx",
                            format!("{} metrics for {} glyphs", hmtx.len(), num_glyphs),
                        ));
                    }
                }
                pack(self.hmtx.as_ref())
            }
            CmapTable::TAG => pack(self.cmap.as_ref()),
            Os2Table::TAG => pack(self.os2.as_ref()),
            PostTable::TAG => pack(self.post.as_ref()),
            NameTable::TAG => pack(self.name.as_ref()),
            KernTable::TAG => pack(self.kern.as_ref()),
            FvarTable::TAG => pack(self.fvar.as_ref()),
            MetaTable::TAG => pack(self.meta.as_ref()),
            LtagTable::TAG => pack(self.ltag.as_ref()),
            _ => Ok(None),
        }
    }
}
