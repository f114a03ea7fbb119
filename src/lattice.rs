//! Lattice simulation engine - grid state and the site-update rule.
//!
//! The lattice is a 2D grid of bacteria competing for space. Each evolve
//! attempt touches a single random site: either the site suffers random
//! death (it copies a uniformly chosen neighborhood value) or the
//! competitive kill/fill rule runs against its 3x3 neighborhood. The RGB
//! image buffer and the color counts are maintained incrementally through
//! a single set-cell primitive, so the steady-state hot path never rescans
//! the grid.

use crate::config::{Config, ConfigError};
use crate::species::{SpeciesId, SpeciesTable, BLUE, EMPTY, RED};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Classification threshold: a channel above this value counts the cell
/// toward the matching color bucket.
const CHANNEL_THRESHOLD: u8 = 100;

/// Running tally of color-classified sites.
///
/// A cell is classified per channel of its display color: red when R is
/// above the threshold, blue when B is, other when G is. The channels are
/// counted independently, so a single cell may land in several buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorCounts {
    pub red: usize,
    pub blue: usize,
    pub other: usize,
}

impl ColorCounts {
    fn add(&mut self, color: [u8; 3]) {
        if color[0] > CHANNEL_THRESHOLD {
            self.red += 1;
        }
        if color[2] > CHANNEL_THRESHOLD {
            self.blue += 1;
        }
        if color[1] > CHANNEL_THRESHOLD {
            self.other += 1;
        }
    }

    fn remove(&mut self, color: [u8; 3]) {
        if color[0] > CHANNEL_THRESHOLD {
            self.red -= 1;
        }
        if color[2] > CHANNEL_THRESHOLD {
            self.blue -= 1;
        }
        if color[1] > CHANNEL_THRESHOLD {
            self.other -= 1;
        }
    }
}

/// Consistent copy-out of the display state: generation counter, color
/// counts, and the RGB image buffer.
#[derive(Clone, Debug)]
pub struct LatticeSnapshot {
    pub generation: u64,
    pub counts: ColorCounts,
    /// Columns of the image
    pub width: usize,
    /// Rows of the image
    pub height: usize,
    /// Row-major RGB triples, one per cell
    pub pixels: Vec<u8>,
}

/// The simulation grid
pub struct Lattice {
    /// Rows
    x: usize,
    /// Columns
    y: usize,
    cells: Vec<SpeciesId>,
    species: SpeciesTable,
    /// Row-major RGB buffer kept in lockstep with `cells`
    rgb: Vec<u8>,
    counts: ColorCounts,
    generation: u64,

    two_species: bool,
    slider: f64,
    def_killers: bool,
    red_advantage: f64,
    blue_advantage: f64,
    red_growth: f64,
    blue_growth: f64,

    rng: ChaCha8Rng,
    seed: u64,
}

impl Lattice {
    /// Create a new lattice with a random seed.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let seed: u64 = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new lattice with a specific seed for reproducibility.
    pub fn new_with_seed(config: &Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let (x, y) = config.grid.size.dims();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let density = config.grid.density;
        let num_ratio = config.grid.num_ratio;
        let two_species = config.rule.only_red_blue;

        // Defective killers rule out random death as well
        let slider = if config.rule.def_killers {
            0.0
        } else {
            config.rule.slider
        };

        let mut cells = vec![EMPTY; x * y];
        let species = if two_species {
            let table = SpeciesTable::two_species();
            for cell in &mut cells {
                if rng.gen::<f64>() < density {
                    *cell = if rng.gen::<f64>() < num_ratio { BLUE } else { RED };
                }
            }
            table
        } else {
            let mut table = SpeciesTable::free();
            for cell in &mut cells {
                if rng.gen::<f64>() < density {
                    let tag = rng.gen::<f64>();
                    let kill = rng.gen::<f64>();
                    *cell = table.register(tag, kill);
                }
            }
            table
        };

        let mut lattice = Self {
            x,
            y,
            cells,
            species,
            rgb: vec![0; x * y * 3],
            counts: ColorCounts::default(),
            generation: 0,
            two_species,
            slider,
            def_killers: config.rule.def_killers,
            red_advantage: config.rule.red_advantage,
            blue_advantage: config.rule.blue_advantage,
            red_growth: config.rule.red_growth,
            blue_growth: config.rule.blue_growth,
            rng,
            seed,
        };
        lattice.rebuild();
        Ok(lattice)
    }

    /// Move the lattice forward `n_steps` single-site update attempts.
    ///
    /// The generation counter advances once per attempt whether or not the
    /// attempt mutated a cell.
    pub fn evolve(&mut self, n_steps: u64) {
        for _ in 0..n_steps {
            self.generation += 1;
            self.step_site();
        }
        debug_assert_eq!(self.counts, self.scan_counts());
    }

    fn step_site(&mut self) {
        let (i, j) = self.pick_site();

        // Random death: the site copies a uniformly chosen value from its
        // own neighborhood, itself included
        if self.slider > self.rng.gen::<f64>() {
            let (neigh, len) = self.neighborhood(i, j);
            let pick = neigh[self.rng.gen_range(0..len)];
            self.set(i, j, pick);
            return;
        }

        let center = self.cells[i * self.y + j];
        let (neigh, len) = self.neighborhood(i, j);
        let neigh = &neigh[..len];

        let n_red = neigh.iter().filter(|&&c| c == RED).count();
        let n_blue = neigh.iter().filter(|&&c| c == BLUE).count();
        // Differently valued cells in the neighborhood, empties included
        let n_enemy = neigh.iter().filter(|&&c| c != center).count();

        // One-dimensional lattices see a far smaller neighborhood
        let thresh = if self.x == 1 { 0.5 } else { 2.0 };

        if self.two_species && center == RED {
            if !self.def_killers
                && n_blue as f64 * self.rng.gen::<f64>() * self.blue_advantage > thresh
            {
                self.set(i, j, EMPTY);
            }
        } else if self.two_species && center == BLUE {
            if !self.def_killers
                && n_red as f64 * self.rng.gen::<f64>() * self.red_advantage > thresh
            {
                self.set(i, j, EMPTY);
            }
        } else if center != EMPTY && n_enemy > 0 {
            // Free-color killing: enemies gang up with their summed
            // kill-effectiveness, one contribution per cell
            let enemy_weight: f64 = neigh
                .iter()
                .filter(|&&c| c != EMPTY && c != center)
                .map(|&c| self.species.kill(c))
                .sum();
            if enemy_weight * self.rng.gen::<f64>() > 2.0 {
                self.set(i, j, EMPTY);
            }
        } else if center == EMPTY && n_enemy > 0 {
            if self.two_species {
                if n_red + n_blue > 0 {
                    self.growth_fill(i, j, n_red, n_blue);
                }
            } else {
                self.weighted_fill(i, j, neigh);
            }
        }
    }

    /// Fill an empty site with red or blue, weighted by neighborhood
    /// presence and the growth scalars. The site may also stay empty.
    fn growth_fill(&mut self, i: usize, j: usize, n_red: usize, n_blue: usize) {
        let red_pressure = n_red as f64 * self.red_growth;
        let blue_pressure = n_blue as f64 * self.blue_growth;
        if (red_pressure + blue_pressure) * self.rng.gen::<f64>() > 2.0 {
            let winner = if red_pressure * self.rng.gen::<f64>()
                > blue_pressure * self.rng.gen::<f64>()
            {
                RED
            } else {
                BLUE
            };
            self.set(i, j, winner);
        }
    }

    /// Fill an empty site with one of the surrounding species, each weighted
    /// by `tag * (1 - kill)`; the residual probability mass leaves the site
    /// empty.
    fn weighted_fill(&mut self, i: usize, j: usize, neigh: &[SpeciesId]) {
        let mut candidates = [EMPTY; 9];
        let mut len = 0;
        for &c in neigh {
            if c != EMPTY {
                candidates[len] = c;
                len += 1;
            }
        }
        if len == 0 {
            // No neighbors to grow from: the site stays empty
            return;
        }

        let norm = len as f64;
        let mut draw = self.rng.gen::<f64>();
        for &c in &candidates[..len] {
            let info = self.species.info(c);
            let weight = info.tag * (1.0 - info.kill) / norm;
            if draw < weight {
                self.set(i, j, c);
                return;
            }
            draw -= weight;
        }
        // Residual mass: stay empty
    }

    /// Pick the site for the next update attempt: uniform over the interior
    /// band, with degenerate one-dimensional grids falling back to the full
    /// row or column.
    fn pick_site(&mut self) -> (usize, usize) {
        if self.x >= 3 && self.y >= 3 {
            (
                self.rng.gen_range(1..self.x - 1),
                self.rng.gen_range(1..self.y - 1),
            )
        } else if self.x == 1 {
            (0, self.rng.gen_range(0..self.y))
        } else if self.y == 1 {
            (self.rng.gen_range(0..self.x), 0)
        } else {
            // Two-wide grids have no interior band; sample everything
            (
                self.rng.gen_range(0..self.x),
                self.rng.gen_range(0..self.y),
            )
        }
    }

    /// Collect the 3x3 neighborhood of a site (center included), clamped at
    /// the grid edges.
    fn neighborhood(&self, i: usize, j: usize) -> ([SpeciesId; 9], usize) {
        let mut cells = [EMPTY; 9];
        let mut len = 0;
        let i1 = (i + 1).min(self.x - 1);
        let j1 = (j + 1).min(self.y - 1);
        for ii in i.saturating_sub(1)..=i1 {
            for jj in j.saturating_sub(1)..=j1 {
                cells[len] = self.cells[ii * self.y + jj];
                len += 1;
            }
        }
        (cells, len)
    }

    /// Write a cell through the single mutation primitive: store the id,
    /// refresh that cell's RGB triple, and adjust the running counts by the
    /// classification delta. Never rescans the grid.
    pub fn set(&mut self, i: usize, j: usize, id: SpeciesId) {
        let idx = i * self.y + j;
        let old = self.cells[idx];
        if old == id {
            return;
        }
        let old_color = self.species.color(old);
        let new_color = self.species.color(id);
        self.counts.remove(old_color);
        self.counts.add(new_color);
        self.cells[idx] = id;
        self.rgb[idx * 3..idx * 3 + 3].copy_from_slice(&new_color);
    }

    /// Rebuild the RGB buffer and counts from scratch with a full-grid scan.
    ///
    /// Used at construction and for explicit rebuilds only; the steady-state
    /// path goes through [`Lattice::set`].
    pub fn rebuild(&mut self) {
        self.counts = ColorCounts::default();
        for idx in 0..self.cells.len() {
            let color = self.species.color(self.cells[idx]);
            self.rgb[idx * 3..idx * 3 + 3].copy_from_slice(&color);
            self.counts.add(color);
        }
    }

    fn scan_counts(&self) -> ColorCounts {
        let mut counts = ColorCounts::default();
        for &cell in &self.cells {
            counts.add(self.species.color(cell));
        }
        counts
    }

    /// Copy out the display state as one consistent snapshot.
    pub fn snapshot(&self) -> LatticeSnapshot {
        LatticeSnapshot {
            generation: self.generation,
            counts: self.counts,
            width: self.y,
            height: self.x,
            pixels: self.rgb.clone(),
        }
    }

    /// Update attempts performed so far
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn counts(&self) -> ColorCounts {
        self.counts
    }

    /// (rows, columns)
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Row-major RGB buffer, one triple per cell
    #[inline]
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// Row-major species ids
    #[inline]
    pub fn cells(&self) -> &[SpeciesId] {
        &self.cells
    }

    #[inline]
    pub fn species(&self) -> &SpeciesTable {
        &self.species
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
