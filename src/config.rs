//! Game rules and tuning knobs.
//!
//! [`GameConstants`] mirrors the rules of the game and normally arrives inside
//! the snapshot. [`Tuning`] holds the bot's own empirically chosen weights;
//! none of them has a derivation, so they are kept as overridable fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{read_json, Result};
use crate::world::ResourceKind;

/// Fixed rules of the game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConstants {
    /// Turns of daylight per cycle.
    pub day_length: u32,
    /// Turns of night per cycle.
    pub night_length: u32,
    /// Total turns in a game.
    pub max_days: u32,
    /// Cargo capacity of a worker.
    pub worker_capacity: u32,
    /// Fuel per unit of wood.
    pub wood_fuel_rate: u32,
    /// Fuel per unit of coal.
    pub coal_fuel_rate: u32,
    /// Fuel per unit of uranium.
    pub uranium_fuel_rate: u32,
    /// Wood a worker collects per turn.
    pub wood_collection_rate: u32,
    /// Coal a worker collects per turn.
    pub coal_collection_rate: u32,
    /// Uranium a worker collects per turn.
    pub uranium_collection_rate: u32,
    /// Research points needed to mine coal.
    pub coal_research: u32,
    /// Research points needed to mine uranium.
    pub uranium_research: u32,
    /// Light upkeep of a city tile with no neighbors.
    pub city_base_upkeep: u32,
    /// Upkeep discount per adjacent tile of the same city.
    pub city_adjacency_discount: u32,
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            day_length: 30,
            night_length: 10,
            max_days: 360,
            worker_capacity: 100,
            wood_fuel_rate: 1,
            coal_fuel_rate: 10,
            uranium_fuel_rate: 40,
            wood_collection_rate: 20,
            coal_collection_rate: 5,
            uranium_collection_rate: 2,
            coal_research: 50,
            uranium_research: 200,
            city_base_upkeep: 23,
            city_adjacency_discount: 5,
        }
    }
}

impl GameConstants {
    /// Fuel produced by one unit of the given resource.
    #[must_use]
    pub const fn fuel_rate(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood_fuel_rate,
            ResourceKind::Coal => self.coal_fuel_rate,
            ResourceKind::Uranium => self.uranium_fuel_rate,
        }
    }

    /// Fuel a worker gathers per turn standing next to the given resource.
    #[must_use]
    pub const fn fuel_per_turn(&self, kind: ResourceKind) -> u32 {
        let collected = match kind {
            ResourceKind::Wood => self.wood_collection_rate,
            ResourceKind::Coal => self.coal_collection_rate,
            ResourceKind::Uranium => self.uranium_collection_rate,
        };
        collected * self.fuel_rate(kind)
    }

    /// Research points required before the resource can be mined.
    #[must_use]
    pub const fn research_requirement(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => 0,
            ResourceKind::Coal => self.coal_research,
            ResourceKind::Uranium => self.uranium_research,
        }
    }

    /// Length of a full day/night cycle.
    #[must_use]
    pub const fn cycle_length(&self) -> u32 {
        self.day_length + self.night_length
    }

    /// Night turns remaining from `turn` until the end of the game.
    ///
    /// Counts whole cycles left plus the night part of the trailing partial
    /// cycle, capped at one night.
    #[must_use]
    pub fn night_turns_left(&self, turn: u32) -> u32 {
        let turns_left = self.max_days.saturating_sub(turn);
        let cycle = self.cycle_length().max(1);
        turns_left / cycle * self.night_length + self.night_length.min(turns_left % cycle)
    }
}

/// Empirical weights used by routing, scoring and fuel assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Timed layers in each routing graph.
    pub time_layers: usize,
    /// Per-hop decay of the raw resource flood fill.
    pub resource_decay: f64,
    /// City distance decay used when ranking settlement sites.
    pub placement_decay: f64,
    /// City distance decay applied to the clump score.
    pub clump_decay: f64,
    /// Extra city distance decay for the exploration ranking.
    pub explore_decay: f64,
    /// Scale of the secondary clump spread next to friendly cities.
    pub clump_spread: f64,
    /// Multiplier for cells next to a single-tile city.
    pub small_city_incentive: f64,
    /// Multiplier for diagonal cells not joined to the city.
    pub isolated_cell_debuff: f64,
    /// Cost of a step leaving a city that can already survive the night.
    pub leave_penalty: i64,
    /// Sink cost per step of distance from the nearest resource.
    pub resource_distance_cost: i64,
    /// Night turns of upkeep a city tries to stock up for.
    pub fuel_horizon_nights: u32,
    /// Candidate sites offered to the colony phase.
    pub candidate_sites: usize,
    /// Exploration sites must be farther than this from own cities.
    pub explore_min_city_distance: u32,
    /// Grid the colony phase draws its candidate sites from.
    pub site_ranking: SiteRanking,
    /// Sites near our cities taken from the clump grid.
    pub growth_sites: usize,
    /// Far sites taken from the clump grid.
    pub explore_sites: usize,
}

/// Which score grid ranks candidate city sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteRanking {
    /// Resource closeness with city incentives, best `candidate_sites`.
    #[default]
    Placement,
    /// Resource clumps, `growth_sites` near and `explore_sites` far.
    Clumps,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            time_layers: 5,
            resource_decay: 0.75,
            placement_decay: 0.9,
            clump_decay: 0.7,
            explore_decay: 0.95,
            clump_spread: 0.95,
            small_city_incentive: 1.5,
            isolated_cell_debuff: 0.4,
            leave_penalty: 3,
            resource_distance_cost: 50,
            fuel_horizon_nights: 10,
            candidate_sites: 5,
            explore_min_city_distance: 5,
            site_ranking: SiteRanking::Placement,
            growth_sites: 3,
            explore_sites: 2,
        }
    }
}

impl Tuning {
    /// Load tuning overrides from a JSON file. Missing fields keep defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}
