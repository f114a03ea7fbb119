//! Species identity, kill-effectiveness, and display colors.
//!
//! Grid cells store a compact [`SpeciesId`] rather than the real-valued tag
//! itself; the tag lives in the [`SpeciesTable`] and is only consulted for
//! color derivation and fill weighting. This keeps float equality out of
//! every per-site comparison.

/// Index into the [`SpeciesTable`]. Id 0 is always the empty site.
pub type SpeciesId = u32;

/// The empty site
pub const EMPTY: SpeciesId = 0;
/// Red bacteria (two-species mode)
pub const RED: SpeciesId = 1;
/// Blue bacteria (two-species mode)
pub const BLUE: SpeciesId = 2;

/// Tag value behind the red species; chosen so the derived color lands on
/// pure red.
pub const RED_TAG: f64 = 0.2295;
/// Tag value behind the blue species
pub const BLUE_TAG: f64 = 0.00254;

/// Per-species data: the real-valued tag, the kill-effectiveness in [0, 1),
/// and the display color derived from the tag.
#[derive(Clone, Copy, Debug)]
pub struct SpeciesInfo {
    pub tag: f64,
    pub kill: f64,
    pub color: [u8; 3],
}

/// Registry of every species present in a lattice.
///
/// Entry 0 is the empty site and always has kill-effectiveness 0.
#[derive(Clone, Debug)]
pub struct SpeciesTable {
    entries: Vec<SpeciesInfo>,
}

impl SpeciesTable {
    /// Table for two-species mode: empty, red, and blue only.
    pub fn two_species() -> Self {
        Self {
            entries: vec![
                SpeciesInfo {
                    tag: 0.0,
                    kill: 0.0,
                    color: [0, 0, 0],
                },
                SpeciesInfo {
                    tag: RED_TAG,
                    kill: 0.0,
                    color: tag_color(RED_TAG),
                },
                SpeciesInfo {
                    tag: BLUE_TAG,
                    kill: 0.0,
                    color: tag_color(BLUE_TAG),
                },
            ],
        }
    }

    /// Table for free-color mode, holding only the empty entry; species are
    /// registered while the initial grid is seeded.
    pub fn free() -> Self {
        Self {
            entries: vec![SpeciesInfo {
                tag: 0.0,
                kill: 0.0,
                color: [0, 0, 0],
            }],
        }
    }

    /// Register a new species and return its id.
    pub fn register(&mut self, tag: f64, kill: f64) -> SpeciesId {
        let id = self.entries.len() as SpeciesId;
        self.entries.push(SpeciesInfo {
            tag,
            kill,
            color: tag_color(tag),
        });
        id
    }

    #[inline]
    pub fn info(&self, id: SpeciesId) -> &SpeciesInfo {
        &self.entries[id as usize]
    }

    /// Kill-effectiveness of a species; 0 for the empty site.
    #[inline]
    pub fn kill(&self, id: SpeciesId) -> f64 {
        self.entries[id as usize].kill
    }

    #[inline]
    pub fn color(&self, id: SpeciesId) -> [u8; 3] {
        self.entries[id as usize].color
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive a display color from a real-valued tag.
///
/// Each channel folds a different magnification of the tag into 0..255, so
/// nearby tags land on visually distinct colors. The red and blue tag
/// constants map onto (229, 0, 0) and (2, 25, 254).
pub fn tag_color(tag: f64) -> [u8; 3] {
    [
        ((1000.0 * tag) % 255.0) as u8,
        ((10000.0 * tag) % 255.0) as u8,
        ((100000.0 * tag) % 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_red_blue_colors() {
        assert_eq!(tag_color(RED_TAG), [229, 0, 0]);
        assert_eq!(tag_color(BLUE_TAG), [2, 25, 254]);
    }

    #[test]
    fn test_empty_tag_is_black() {
        assert_eq!(tag_color(0.0), [0, 0, 0]);
    }

    #[test]
    fn test_empty_species_never_kills() {
        assert_eq!(SpeciesTable::two_species().kill(EMPTY), 0.0);
        assert_eq!(SpeciesTable::free().kill(EMPTY), 0.0);
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut table = SpeciesTable::free();
        let a = table.register(0.42, 0.1);
        let b = table.register(0.87, 0.9);
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.info(b).tag, 0.87);
    }
}
