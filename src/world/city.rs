//! Cities and their fuel economy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConstants;
use crate::world::{Coord, Map, TeamId};

/// Stable identifier of a city.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub String);

impl CityId {
    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A city: a group of connected city tiles sharing one fuel bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    /// Stable identity.
    pub id: CityId,
    /// Owning team.
    pub team: TeamId,
    /// Cells covered by the city.
    pub tiles: Vec<Coord>,
    /// Banked fuel.
    pub fuel: u32,
    /// Fuel burned per night turn across all tiles.
    pub light_upkeep: u32,
}

impl City {
    /// Fuel burned over one full night.
    #[must_use]
    pub const fn night_cost(&self, constants: &GameConstants) -> u32 {
        self.light_upkeep.saturating_mul(constants.night_length)
    }

    /// Whether the banked fuel already covers the coming night.
    #[must_use]
    pub const fn survives_night(&self, constants: &GameConstants) -> bool {
        self.fuel >= self.night_cost(constants)
    }

    /// Fuel the city wants over the next `horizon` night turns.
    ///
    /// Counts only the night turns that are still left in the game.
    #[must_use]
    pub fn fuel_needed(&self, turn: u32, horizon: u32, constants: &GameConstants) -> u32 {
        self.light_upkeep
            .saturating_mul(constants.night_turns_left(turn).min(horizon))
    }

    /// Upkeep computed from tile adjacency: tiles with more siblings are cheaper.
    #[must_use]
    pub fn derived_upkeep(&self, map: &Map, constants: &GameConstants) -> u32 {
        self.tiles
            .iter()
            .map(|tile| {
                let (adjacent, count) = map.adjacent(*tile);
                let siblings = adjacent[..count as usize]
                    .iter()
                    .filter(|coord| self.tiles.contains(coord))
                    .count();
                let discount = constants.city_adjacency_discount * u32::try_from(siblings).unwrap_or(0);
                constants.city_base_upkeep.saturating_sub(discount)
            })
            .sum()
    }
}
