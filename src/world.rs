//! Read-only world state handed to the core each turn.
//!
//! - Map of cells (empty, resource, or city tile)
//! - Own and opposing units with their cargo
//! - Own cities with banked fuel and upkeep
//! - Snapshot ingestion and validation

mod city;
mod map;
mod snapshot;
mod unit;

pub use city::{City, CityId};
pub use map::{Cell, CityTile, Coord, Direction, Map, Resource, ResourceKind, TeamId};
pub use snapshot::{CityEntry, ResourceEntry, Snapshot, UnitEntry};
pub use unit::{Cargo, Unit, UnitId};

use std::path::Path;

use crate::config::GameConstants;
use crate::error::{read_json, Result};

/// Everything the core knows about the current turn.
#[derive(Debug, Clone)]
pub struct World {
    /// The game map.
    pub map: Map,
    /// Our team.
    pub team: TeamId,
    /// Our units.
    pub units: Vec<Unit>,
    /// Opposing units.
    pub opponents: Vec<Unit>,
    /// Our cities, sorted by id.
    pub cities: Vec<City>,
    /// Current turn number (0-indexed).
    pub turn: u32,
    /// Our research points.
    pub research_points: u32,
    /// Rules of the game.
    pub constants: GameConstants,
}

impl World {
    /// Create an empty world around a map.
    #[must_use]
    pub fn new(map: Map, team: TeamId) -> Self {
        Self {
            map,
            team,
            units: Vec::new(),
            opponents: Vec::new(),
            cities: Vec::new(),
            turn: 0,
            research_points: 0,
            constants: GameConstants::default(),
        }
    }

    /// Read a JSON snapshot from disk and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// describes an impossible world.
    pub fn load(path: &Path) -> Result<Self> {
        let snapshot: Snapshot = read_json(path)?;
        Ok(Self::from_snapshot(snapshot)?)
    }

    /// Whether we may mine the given resource.
    #[must_use]
    pub fn has_researched(&self, kind: ResourceKind) -> bool {
        self.research_points >= self.constants.research_requirement(kind)
    }

    /// Look up one of our units.
    #[must_use]
    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    /// Look up one of our cities.
    #[must_use]
    pub fn city(&self, id: &CityId) -> Option<&City> {
        self.cities.iter().find(|c| &c.id == id)
    }

    /// Our units followed by the opponent's.
    pub fn all_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().chain(self.opponents.iter())
    }

    /// Check if a cell holds one of our city tiles.
    #[must_use]
    pub fn is_friendly_city_tile(&self, coord: Coord) -> bool {
        self.map
            .get(coord)
            .and_then(Cell::city_tile)
            .is_some_and(|tile| tile.team == self.team)
    }

    /// Check if a cell holds an opposing city tile.
    #[must_use]
    pub fn is_enemy_city_tile(&self, coord: Coord) -> bool {
        self.map
            .get(coord)
            .and_then(Cell::city_tile)
            .is_some_and(|tile| tile.team != self.team)
    }

    /// The city owning a friendly tile at `coord`, if any.
    #[must_use]
    pub fn friendly_city_at(&self, coord: Coord) -> Option<&City> {
        let tile = self.map.get(coord)?.city_tile()?;
        if tile.team != self.team {
            return None;
        }
        self.city(&tile.city)
    }

    /// Total number of city tiles we own.
    #[must_use]
    pub fn city_tile_count(&self) -> usize {
        self.cities.iter().map(|c| c.tiles.len()).sum()
    }

    /// Resource cells we are able to mine.
    #[must_use]
    pub fn minable_resources(&self) -> Vec<Coord> {
        self.map
            .iter()
            .filter_map(|(coord, cell)| cell.resource().map(|r| (coord, r.kind)))
            .filter(|&(_, kind)| self.has_researched(kind))
            .map(|(coord, _)| coord)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> World {
        Snapshot {
            width: 4,
            height: 4,
            team: 0,
            research_points: 60,
            resources: vec![
                ResourceEntry::new(0, 0, ResourceKind::Wood, 500),
                ResourceEntry::new(1, 0, ResourceKind::Coal, 300),
                ResourceEntry::new(2, 0, ResourceKind::Uranium, 300),
            ],
            cities: vec![
                CityEntry::new("c_1", 0, 100, &[(1, 2)]),
                CityEntry::new("c_2", 1, 100, &[(3, 3)]),
            ],
            ..Snapshot::default()
        }
        .into_world()
        .unwrap()
    }

    #[test]
    fn test_minable_resources_respect_research() {
        let world = sample_world();
        let minable = world.minable_resources();
        assert_eq!(minable, vec![Coord::new(0, 0), Coord::new(1, 0)]);
    }

    #[test]
    fn test_city_tile_ownership() {
        let world = sample_world();
        assert!(world.is_friendly_city_tile(Coord::new(1, 2)));
        assert!(!world.is_enemy_city_tile(Coord::new(1, 2)));
        assert!(world.is_enemy_city_tile(Coord::new(3, 3)));
        assert!(world.friendly_city_at(Coord::new(3, 3)).is_none());
        assert_eq!(
            world.friendly_city_at(Coord::new(1, 2)).map(|c| c.id.as_str()),
            Some("c_1")
        );
    }

    #[test]
    fn test_only_own_cities_are_kept() {
        let world = sample_world();
        assert_eq!(world.cities.len(), 1);
        assert_eq!(world.city_tile_count(), 1);
    }
}
