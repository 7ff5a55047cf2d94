//! Per-phase obstacle policies.

use std::collections::HashSet;

use crate::world::{Coord, UnitId, World};

/// Cells a routing phase may not enter, by row-major index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMap {
    width: u16,
    blocked: Vec<bool>,
}

impl ObstacleMap {
    /// Nothing blocked.
    #[must_use]
    pub fn open(world: &World) -> Self {
        Self {
            width: world.map.width(),
            blocked: vec![false; world.map.len()],
        }
    }

    /// Obstacles for resource, city and leftover phases.
    ///
    /// Enemy city tiles always block. Cells holding a unit block unless the
    /// unit is in `exempt` or stands on one of our city tiles.
    #[must_use]
    pub fn for_routing(world: &World, exempt: &HashSet<UnitId>) -> Self {
        let mut obstacles = Self::open(world);

        for (coord, _) in world.map.iter() {
            if world.is_enemy_city_tile(coord) {
                obstacles.block(coord);
            }
        }
        for unit in world.all_units() {
            if exempt.contains(&unit.id) || world.is_friendly_city_tile(unit.pos) {
                continue;
            }
            obstacles.block(unit.pos);
        }

        obstacles
    }

    /// Obstacles for the colony phase: the routing policy plus our own city
    /// tiles, since stepping on one unloads the founder's cargo.
    #[must_use]
    pub fn for_colony(world: &World, exempt: &HashSet<UnitId>) -> Self {
        let mut obstacles = Self::for_routing(world, exempt);
        for city in &world.cities {
            for &tile in &city.tiles {
                obstacles.block(tile);
            }
        }
        obstacles
    }

    /// Mark a cell as blocked.
    pub fn block(&mut self, coord: Coord) {
        if let Some(idx) = self.index_of(coord) {
            self.blocked[idx] = true;
        }
    }

    /// Clear a cell.
    pub fn unblock(&mut self, coord: Coord) {
        if let Some(idx) = self.index_of(coord) {
            self.blocked[idx] = false;
        }
    }

    /// Check a cell by row-major index. Out-of-range indices are blocked.
    #[must_use]
    pub fn is_blocked(&self, idx: usize) -> bool {
        self.blocked.get(idx).copied().unwrap_or(true)
    }

    /// Check a cell by coordinate.
    #[must_use]
    pub fn is_blocked_at(&self, coord: Coord) -> bool {
        self.index_of(coord).is_none_or(|idx| self.blocked[idx])
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    fn index_of(&self, coord: Coord) -> Option<usize> {
        if coord.x >= self.width {
            return None;
        }
        let idx = usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x);
        (idx < self.blocked.len()).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CityEntry, Snapshot, UnitEntry};

    fn world() -> World {
        Snapshot {
            width: 4,
            height: 2,
            team: 0,
            cities: vec![
                CityEntry::new("c_1", 0, 0, &[(0, 0)]),
                CityEntry::new("c_2", 1, 0, &[(3, 0)]),
            ],
            units: vec![
                UnitEntry::new("u_1", 0, 0, 0),
                UnitEntry::new("u_2", 0, 1, 1),
                UnitEntry::new("u_3", 0, 2, 1),
                UnitEntry::new("u_9", 1, 3, 1),
            ],
            ..Snapshot::default()
        }
        .into_world()
        .unwrap()
    }

    #[test]
    fn test_routing_policy() {
        let world = world();
        let exempt: HashSet<UnitId> = [UnitId::from("u_2")].into_iter().collect();
        let obstacles = ObstacleMap::for_routing(&world, &exempt);

        // Enemy city
        assert!(obstacles.is_blocked_at(Coord::new(3, 0)));
        // Own unit on own city does not block
        assert!(!obstacles.is_blocked_at(Coord::new(0, 0)));
        // Exempt unit
        assert!(!obstacles.is_blocked_at(Coord::new(1, 1)));
        // Other units
        assert!(obstacles.is_blocked_at(Coord::new(2, 1)));
        assert!(obstacles.is_blocked_at(Coord::new(3, 1)));
        assert_eq!(obstacles.blocked_count(), 3);
    }

    #[test]
    fn test_colony_policy_blocks_own_cities() {
        let world = world();
        let obstacles = ObstacleMap::for_colony(&world, &HashSet::new());
        assert!(obstacles.is_blocked_at(Coord::new(0, 0)));
        assert!(obstacles.is_blocked_at(Coord::new(1, 1)));
    }

    #[test]
    fn test_out_of_range_is_blocked() {
        let world = world();
        let obstacles = ObstacleMap::open(&world);
        assert!(obstacles.is_blocked(8));
        assert!(obstacles.is_blocked_at(Coord::new(4, 0)));
        assert!(!obstacles.is_blocked(7));
    }
}
