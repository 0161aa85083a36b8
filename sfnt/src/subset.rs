use std::collections::{BTreeMap, BTreeSet};

use crate::error::Error;
use crate::font::FontInfo;
use crate::tables::glyf::{GlyfTable, Glyph, Outline};
use crate::tables::hmtx::HmtxTable;
use crate::tables::checked_u16;

/// The glyphs needed to render `roots`: glyph 0, the roots themselves and all glyphs
/// referenced by compound glyphs, transitively.
pub fn glyph_closure(
    glyf: &GlyfTable,
    roots: impl IntoIterator<Item = u16>,
) -> Result<BTreeSet<u16>, Error> {
    let mut closure = BTreeSet::new();
    let mut pending = vec![0];
    pending.extend(roots);

    while let Some(glyph_id) = pending.pop() {
        if !closure.insert(glyph_id) {
            continue;
        }
        let glyph = glyf.glyph(glyph_id).ok_or_else(|| {
            Error::malformed(
                "glyf",
                format!(
                    "glyph {} is referenced but the font has only {} glyphs",
                    glyph_id,
                    glyf.glyphs.len()
                ),
            )
        })?;
        pending.extend(
            glyph
                .component_indices()
                .filter(|index| !closure.contains(index)),
        );
    }

    Ok(closure)
}

/// Maps old glyph ids to their rank among the kept glyphs.
struct GlyphMap {
    new_ids: BTreeMap<u16, u16>,
}

impl GlyphMap {
    fn new(old_ids: &[u16]) -> Result<Self, Error> {
        let mut new_ids = BTreeMap::new();
        for (new_id, old_id) in old_ids.iter().enumerate() {
            new_ids.insert(*old_id, checked_u16(new_id, "glyphs")?);
        }
        Ok(GlyphMap { new_ids })
    }

    fn get(&self, old_id: u16) -> Option<u16> {
        self.new_ids.get(&old_id).copied()
    }

    fn remap_glyph(&self, glyph: &Glyph, new_id: u16) -> Result<Glyph, Error> {
        let mut glyph = glyph.clone();
        glyph.index = new_id;
        if let Outline::Compound(compound) = &mut glyph.outline {
            for component in &mut compound.components {
                component.glyph_index = self.get(component.glyph_index).ok_or(
                    Error::InconsistentState("compound glyph component outside of the subset"),
                )?;
            }
        }
        Ok(glyph)
    }
}

/// Metrics of the kept glyphs, all with an explicit advance width.
fn subset_hmtx(hmtx: &HmtxTable, old_ids: &[u16]) -> Result<HmtxTable, Error> {
    let h_metrics = old_ids
        .iter()
        .map(|old_id| {
            hmtx.metric(*old_id).ok_or_else(|| {
                Error::malformed("hmtx", format!("no metrics for glyph {}", old_id))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HmtxTable {
        h_metrics,
        left_side_bearings: Vec::new(),
    })
}

impl FontInfo {
    /// Reduces the font to the glyphs needed for the characters of `texts` and renumbers them.
    /// Returns the old ids of the kept glyphs, indexed by their new id.
    pub fn subset<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<Vec<u16>, Error> {
        let cmap = self
            .cmap
            .as_ref()
            .ok_or(Error::InconsistentState("font has no cmap table to subset"))?;

        let num_glyphs = self.glyf.glyphs.len();
        let mut roots = Vec::new();
        for text in texts {
            for c in text.as_ref().chars() {
                match cmap.glyph_id(u32::from(c)) {
                    Some(glyph_id) if usize::from(glyph_id) < num_glyphs => roots.push(glyph_id),
                    Some(glyph_id) => {
                        log::warn!("U+{:04X} maps to missing glyph {}", u32::from(c), glyph_id)
                    }
                    None => log::debug!("U+{:04X} is not mapped", u32::from(c)),
                }
            }
        }

        let old_ids: Vec<u16> = glyph_closure(&self.glyf, roots)?.into_iter().collect();
        let map = GlyphMap::new(&old_ids)?;
        log::debug!("Keeping {} of {} glyphs", old_ids.len(), num_glyphs);

        let glyphs = old_ids
            .iter()
            .enumerate()
            .map(|(new_id, old_id)| {
                let glyph = self
                    .glyf
                    .glyph(*old_id)
                    .ok_or(Error::InconsistentState("glyph outside of the font"))?;
                map.remap_glyph(glyph, new_id as u16)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let windows_code: BTreeMap<u32, u16> = cmap
            .windows_code
            .iter()
            .filter_map(|(codepoint, glyph_id)| Some((*codepoint, map.get(*glyph_id)?)))
            .collect();
        let cmap = cmap.with_mapping(windows_code);

        let hmtx = self
            .hmtx
            .as_ref()
            .map(|hmtx| subset_hmtx(hmtx, &old_ids))
            .transpose()?;

        // replace
        let count = checked_u16(old_ids.len(), "glyphs")?;
        self.glyf = GlyfTable { glyphs };
        self.loca = None;
        self.maxp.set_num_glyphs(count);
        if let (Some(hhea), Some(hmtx)) = (&mut self.hhea, &hmtx) {
            hhea.number_of_h_metrics = checked_u16(hmtx.h_metrics.len(), "horizontal metrics")?;
        }
        self.hmtx = hmtx;

        let (x_min, y_min, x_max, y_max) = self.glyf.bounding_box().unwrap_or((0, 0, 0, 0));
        self.head.x_min = x_min;
        self.head.y_min = y_min;
        self.head.x_max = x_max;
        self.head.y_max = y_max;
        if let Some(os2) = &mut self.os2 {
            let first = cmap.windows_code.keys().next();
            let last = cmap.windows_code.keys().next_back();
            if let (Some(first), Some(last)) = (first, last) {
                os2.update_char_range(*first, *last);
            }
        }
        self.cmap = Some(cmap);
        if let Some(post) = &mut self.post {
            post.subset(&old_ids);
        }
        if let Some(kern) = &mut self.kern {
            kern.subset(&old_ids);
        }

        Ok(old_ids)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tables::glyf::{
        CompoundGlyph, Component, ComponentFlags, GlyphCommon, Point, SimpleGlyph, Transform,
    };
    use pretty_assertions::assert_eq;

    fn simple(index: u16) -> Glyph {
        Glyph {
            index,
            outline: Outline::Simple(SimpleGlyph {
                common: GlyphCommon {
                    number_of_contours: 1,
                    x_min: 0,
                    y_min: 0,
                    x_max: 10,
                    y_max: 10,
                },
                end_pts_of_contours: vec![0],
                instructions: Vec::new(),
                points: vec![Point {
                    x: 10,
                    y: 10,
                    on_curve: true,
                }],
            }),
        }
    }

    fn compound(index: u16, components: &[u16]) -> Glyph {
        Glyph {
            index,
            outline: Outline::Compound(CompoundGlyph {
                common: GlyphCommon {
                    number_of_contours: -1,
                    x_min: 0,
                    y_min: 0,
                    x_max: 10,
                    y_max: 10,
                },
                components: components
                    .iter()
                    .map(|glyph_index| Component {
                        flags: ComponentFlags::ARGS_ARE_XY_VALUES,
                        glyph_index: *glyph_index,
                        argument1: 0,
                        argument2: 0,
                        transform: Transform::None,
                    })
                    .collect(),
                instructions: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_glyph_closure() {
        let glyf = GlyfTable {
            glyphs: vec![
                simple(0),
                simple(1),
                compound(2, &[4]),
                simple(3),
                compound(4, &[1, 3]),
            ],
        };
        assert_eq!(
            glyph_closure(&glyf, [2]).unwrap().into_iter().collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        assert_eq!(
            glyph_closure(&glyf, [3]).unwrap().into_iter().collect::<Vec<_>>(),
            vec![0, 3]
        );
    }

    #[test]
    fn test_glyph_closure_missing_component() {
        let glyf = GlyfTable {
            glyphs: vec![simple(0), compound(1, &[7])],
        };
        assert!(matches!(
            glyph_closure(&glyf, [1]),
            Err(Error::Malformed { table: "glyf", .. })
        ));
    }

    #[test]
    fn test_remap_compound_glyph() {
        let map = GlyphMap::new(&[0, 3, 8]).unwrap();
        let glyph = map.remap_glyph(&compound(8, &[3, 0]), 2).unwrap();
        assert_eq!(glyph.index, 2);
        assert_eq!(glyph.component_indices().collect::<Vec<_>>(), vec![1, 0]);

        assert!(matches!(
            map.remap_glyph(&compound(8, &[5]), 2),
            Err(Error::InconsistentState(_))
        ));
    }
}
