//! Score grids that rank empty cells as sites for new city tiles.
//!
//! Grids are rebuilt from the [`World`] every turn and never kept. Each pass
//! is a plain function over a [`ScoreGrid`], so a caller can compose its own
//! pipeline; [`SiteSurvey`] holds the two pipelines the planner uses.

mod clump;
mod passes;

pub use clump::{clump_score, research_adjusted_value};
pub use passes::{
    anti_city_debuff, city_distance_decay, city_distance_field, raw_resource_score,
    remove_invalid_locations, small_city_incentive,
};

use std::cmp::Ordering;
use std::fmt::Write as _;

use tracing::debug;

use crate::config::Tuning;
use crate::world::{Coord, World};

/// A width x height raster of non-negative scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    width: u16,
    height: u16,
    values: Vec<f64>,
}

impl ScoreGrid {
    /// Grid of zeros.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; usize::from(width) * usize::from(height)],
        }
    }

    /// Grid of zeros matching the map of `world`.
    #[must_use]
    pub fn for_world(world: &World) -> Self {
        Self::new(world.map.width(), world.map.height())
    }

    /// Grid width.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Score of a cell; zero off the grid.
    #[must_use]
    pub fn get(&self, coord: Coord) -> f64 {
        self.index_of(coord).map_or(0.0, |idx| self.values[idx])
    }

    /// Overwrite the score of a cell. Off-grid writes are ignored.
    pub fn set(&mut self, coord: Coord, value: f64) {
        if let Some(idx) = self.index_of(coord) {
            self.values[idx] = value;
        }
    }

    /// Multiply the score of a cell.
    pub fn scale(&mut self, coord: Coord, factor: f64) {
        if let Some(idx) = self.index_of(coord) {
            self.values[idx] *= factor;
        }
    }

    /// Scores in row-major order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable scores in row-major order.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Highest score, or zero for an empty grid.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Coordinate of a row-major index.
    #[must_use]
    pub fn coord_of(&self, idx: usize) -> Coord {
        let width = usize::from(self.width.max(1));
        Coord::new(
            u16::try_from(idx % width).unwrap_or(u16::MAX),
            u16::try_from(idx / width).unwrap_or(u16::MAX),
        )
    }

    /// Text table of the scores normalized to the grid maximum.
    ///
    /// One line per row, column indices on top.
    #[must_use]
    pub fn render(&self) -> String {
        let max = self.max();
        let mut out = String::from("    ");
        for x in 0..self.width {
            let _ = write!(out, "{x:<5}");
        }
        out.push('\n');

        for y in 0..self.height {
            let _ = write!(out, "{y:<4}");
            for x in 0..self.width {
                let value = self.get(Coord::new(x, y));
                let normalized = if max > 0.0 { value / max } else { 0.0 };
                let _ = write!(out, "{normalized:.2} ");
            }
            out.push('\n');
        }
        out
    }

    fn index_of(&self, coord: Coord) -> Option<usize> {
        (coord.x < self.width && coord.y < self.height)
            .then(|| usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
    }
}

/// The `k` best cells by descending score, ties broken by ascending (x, y).
///
/// Keeps a sorted buffer of at most `k` cells while scanning the grid.
#[must_use]
pub fn top_k(grid: &ScoreGrid, k: usize) -> Vec<Coord> {
    if k == 0 {
        return Vec::new();
    }
    let mut best: Vec<(Coord, f64)> = Vec::with_capacity(k.min(grid.values().len()) + 1);

    for (idx, &score) in grid.values().iter().enumerate() {
        let coord = grid.coord_of(idx);
        let pos = best.partition_point(|&(other, other_score)| {
            rank(other, other_score, coord, score) == Ordering::Less
        });
        if pos < k {
            best.insert(pos, (coord, score));
            best.truncate(k);
        }
    }

    best.into_iter().map(|(coord, _)| coord).collect()
}

/// Ordering of ranked cells: higher score first, then smaller coordinate.
fn rank(a: Coord, a_score: f64, b: Coord, b_score: f64) -> Ordering {
    b_score.total_cmp(&a_score).then_with(|| a.cmp(&b))
}

/// Site selection pipelines over one turn's world.
#[derive(Debug, Clone, Copy)]
pub struct SiteSurvey<'a> {
    world: &'a World,
    tuning: Tuning,
}

impl<'a> SiteSurvey<'a> {
    /// Survey `world` with the given weights.
    #[must_use]
    pub const fn new(world: &'a World, tuning: &Tuning) -> Self {
        Self {
            world,
            tuning: *tuning,
        }
    }

    /// The placement grid: raw resource score, city distance decay, small
    /// city incentive, isolated cell debuff, invalid cells removed.
    #[must_use]
    pub fn placement_grid(&self) -> ScoreGrid {
        let mut grid = raw_resource_score(self.world, self.tuning.resource_decay);
        city_distance_decay(self.world, &mut grid, self.tuning.placement_decay);
        small_city_incentive(self.world, &mut grid, self.tuning.small_city_incentive);
        anti_city_debuff(self.world, &mut grid, self.tuning.isolated_cell_debuff);
        remove_invalid_locations(self.world, &mut grid);
        grid
    }

    /// The `k` best placement sites with a positive score.
    ///
    /// Cells scoring zero are dropped, so fewer than `k` sites come back when
    /// fewer cells score. A zero means no minable resource within reach or a
    /// cell too far from our cities, and the colony phase should not race
    /// for it.
    #[must_use]
    pub fn find_k_potential_city_locations(&self, k: usize) -> Vec<Coord> {
        let grid = self.placement_grid();
        let sites: Vec<Coord> = top_k(&grid, k)
            .into_iter()
            .filter(|&site| grid.get(site) > 0.0)
            .collect();
        debug!(requested = k, found = sites.len(), "ranked city sites");
        sites
    }

    /// The clump grid with invalid cells removed and city distance decay.
    #[must_use]
    pub fn clump_grid(&self) -> ScoreGrid {
        let mut grid = clump_score(self.world, self.tuning.clump_spread);
        remove_invalid_locations(self.world, &mut grid);
        city_distance_decay(self.world, &mut grid, self.tuning.clump_decay);
        grid
    }

    /// Up to `growth + explore` sites from the clump grid.
    ///
    /// The first `explore` come from a copy decayed further and cleared near
    /// our cities; the rest are the best of the plain clump grid. Sites are
    /// unique and only positive scores count.
    #[must_use]
    pub fn growth_and_explore_sites(&self, growth: usize, explore: usize) -> Vec<Coord> {
        let grid = self.clump_grid();

        let mut far = grid.clone();
        city_distance_decay(self.world, &mut far, self.tuning.explore_decay);
        let distance = city_distance_field(self.world);
        for (idx, value) in far.values_mut().iter_mut().enumerate() {
            if distance[idx] <= self.tuning.explore_min_city_distance {
                *value = 0.0;
            }
        }

        let mut sites: Vec<Coord> = top_k(&far, explore)
            .into_iter()
            .filter(|&site| far.get(site) > 0.0)
            .collect();
        let wanted = growth.saturating_add(explore).saturating_sub(sites.len());
        for site in top_k(&grid, wanted) {
            if grid.get(site) > 0.0 && !sites.contains(&site) {
                sites.push(site);
            }
        }

        debug!(growth, explore, found = sites.len(), "ranked growth and explore sites");
        sites
    }
}
