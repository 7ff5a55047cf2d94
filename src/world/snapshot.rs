//! JSON snapshot of a turn, as handed over by the ingestion layer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::GameConstants;
use crate::error::WorldError;
use crate::world::{
    Cargo, Cell, City, CityId, CityTile, Coord, Map, Resource, ResourceKind, TeamId, Unit, World,
};

/// A resource deposit in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Tier.
    pub kind: ResourceKind,
    /// Units left.
    pub amount: u32,
}

impl ResourceEntry {
    /// Create a resource entry.
    #[must_use]
    pub const fn new(x: u16, y: u16, kind: ResourceKind, amount: u32) -> Self {
        Self { x, y, kind, amount }
    }
}

/// A city in a snapshot, ours or the opponent's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityEntry {
    /// City id.
    pub id: CityId,
    /// Owning team.
    pub team: TeamId,
    /// Banked fuel.
    #[serde(default)]
    pub fuel: u32,
    /// Light upkeep per night turn; derived from the tiles when absent.
    #[serde(default)]
    pub light_upkeep: Option<u32>,
    /// Cells covered.
    pub tiles: Vec<Coord>,
}

impl CityEntry {
    /// Create a city entry with derived upkeep.
    #[must_use]
    pub fn new(id: &str, team: TeamId, fuel: u32, tiles: &[(u16, u16)]) -> Self {
        Self {
            id: CityId::from(id),
            team,
            fuel,
            light_upkeep: None,
            tiles: tiles.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        }
    }
}

/// A unit in a snapshot, ours or the opponent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEntry {
    /// Unit id.
    pub id: String,
    /// Owning team.
    pub team: TeamId,
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Resources carried.
    #[serde(default)]
    pub cargo: Cargo,
    /// Turns until the unit may act again.
    #[serde(default)]
    pub cooldown: f64,
}

impl UnitEntry {
    /// Create an empty, ready unit entry.
    #[must_use]
    pub fn new(id: &str, team: TeamId, x: u16, y: u16) -> Self {
        Self {
            id: id.to_string(),
            team,
            x,
            y,
            cargo: Cargo::default(),
            cooldown: 0.0,
        }
    }

    /// Same entry carrying `cargo`.
    #[must_use]
    pub fn with_cargo(mut self, cargo: Cargo) -> Self {
        self.cargo = cargo;
        self
    }
}

/// Full description of one turn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Map width.
    pub width: u16,
    /// Map height.
    pub height: u16,
    /// Our team.
    #[serde(default)]
    pub team: TeamId,
    /// Current turn.
    #[serde(default)]
    pub turn: u32,
    /// Our research points.
    #[serde(default)]
    pub research_points: u32,
    /// Rules of the game.
    #[serde(default)]
    pub constants: GameConstants,
    /// Resource deposits.
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    /// Cities of every team.
    #[serde(default)]
    pub cities: Vec<CityEntry>,
    /// Units of every team.
    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

impl Snapshot {
    /// Validate the snapshot and build a [`World`].
    ///
    /// # Errors
    ///
    /// Returns an error if the map is empty, anything lies off the map, a
    /// cell is claimed twice, or an id repeats.
    pub fn into_world(self) -> Result<World, WorldError> {
        World::from_snapshot(self)
    }
}

impl World {
    /// Validate a snapshot and build a [`World`] from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is empty, anything lies off the map, a
    /// cell is claimed twice, or an id repeats.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, WorldError> {
        let Snapshot {
            width,
            height,
            team,
            turn,
            research_points,
            constants,
            resources,
            cities,
            units,
        } = snapshot;

        let mut map = Map::new(width, height).ok_or(WorldError::EmptyMap { width, height })?;
        let check_bounds = |what: &'static str, coord: Coord| {
            if map_in_bounds(width, height, coord) {
                Ok(())
            } else {
                Err(WorldError::OutOfBounds {
                    what,
                    coord,
                    width,
                    height,
                })
            }
        };

        for entry in &resources {
            let coord = Coord::new(entry.x, entry.y);
            check_bounds("resource", coord)?;
            place(
                &mut map,
                coord,
                Cell::Resource(Resource {
                    kind: entry.kind,
                    amount: entry.amount,
                }),
            )?;
        }

        let mut seen_cities = HashSet::new();
        let mut own_cities = Vec::new();
        for entry in cities {
            if !seen_cities.insert(entry.id.clone()) {
                return Err(WorldError::DuplicateCity(entry.id));
            }
            for &coord in &entry.tiles {
                check_bounds("city tile", coord)?;
                place(
                    &mut map,
                    coord,
                    Cell::CityTile(CityTile {
                        team: entry.team,
                        city: entry.id.clone(),
                    }),
                )?;
            }
            if entry.team == team {
                own_cities.push(entry);
            }
        }

        let mut cities: Vec<City> = own_cities
            .into_iter()
            .map(|entry| {
                let mut city = City {
                    id: entry.id,
                    team: entry.team,
                    tiles: entry.tiles,
                    fuel: entry.fuel,
                    light_upkeep: 0,
                };
                city.light_upkeep = entry
                    .light_upkeep
                    .unwrap_or_else(|| city.derived_upkeep(&map, &constants));
                city
            })
            .collect();
        cities.sort_by(|a, b| a.id.cmp(&b.id));

        let mut seen_units = HashSet::new();
        let mut own_units = Vec::new();
        let mut opponents = Vec::new();
        for entry in units {
            let coord = Coord::new(entry.x, entry.y);
            check_bounds("unit", coord)?;
            let unit = Unit {
                id: entry.id.as_str().into(),
                team: entry.team,
                pos: coord,
                cargo: entry.cargo,
                can_act: entry.cooldown < 1.0,
            };
            if !seen_units.insert(unit.id.clone()) {
                return Err(WorldError::DuplicateUnit(unit.id));
            }
            if unit.team == team {
                own_units.push(unit);
            } else {
                opponents.push(unit);
            }
        }

        Ok(Self {
            map,
            team,
            units: own_units,
            opponents,
            cities,
            turn,
            research_points,
            constants,
        })
    }
}

const fn map_in_bounds(width: u16, height: u16, coord: Coord) -> bool {
    coord.x < width && coord.y < height
}

/// Put `cell` on an empty map cell.
fn place(map: &mut Map, coord: Coord, cell: Cell) -> Result<(), WorldError> {
    let existing = map.get(coord).map_or(Cell::Empty.label(), Cell::label);
    if map.get(coord).is_some_and(|c| *c != Cell::Empty) {
        return Err(WorldError::CellTaken {
            coord,
            existing,
            placed: cell.label(),
        });
    }
    map.set(coord, cell);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "width": 3,
            "height": 2,
            "team": 1,
            "turn": 12,
            "resources": [{"x": 0, "y": 0, "kind": "wood", "amount": 400}],
            "cities": [
                {"id": "c_1", "team": 1, "fuel": 50, "tiles": [{"x": 2, "y": 1}]},
                {"id": "c_2", "team": 0, "fuel": 10, "light_upkeep": 20, "tiles": [{"x": 0, "y": 1}]}
            ],
            "units": [
                {"id": "u_1", "team": 1, "x": 1, "y": 0, "cargo": {"wood": 40}},
                {"id": "u_2", "team": 0, "x": 1, "y": 1, "cooldown": 2.0}
            ]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let world = snapshot.into_world().unwrap();

        assert_eq!(world.turn, 12);
        assert_eq!(world.units.len(), 1);
        assert_eq!(world.units[0].cargo.wood, 40);
        assert!(world.units[0].can_act);
        assert_eq!(world.opponents.len(), 1);
        assert!(!world.opponents[0].can_act);
        assert_eq!(world.cities.len(), 1);
        assert_eq!(world.cities[0].light_upkeep, 23);
        assert!(world.is_enemy_city_tile(Coord::new(0, 1)));
    }

    #[test]
    fn test_rejects_out_of_bounds_unit() {
        let snapshot = Snapshot {
            width: 2,
            height: 2,
            units: vec![UnitEntry::new("u_1", 0, 2, 0)],
            ..Snapshot::default()
        };
        assert!(matches!(
            snapshot.into_world(),
            Err(WorldError::OutOfBounds { what: "unit", .. })
        ));
    }

    #[test]
    fn test_rejects_city_on_resource() {
        let snapshot = Snapshot {
            width: 2,
            height: 2,
            resources: vec![ResourceEntry::new(1, 1, ResourceKind::Wood, 10)],
            cities: vec![CityEntry::new("c_1", 0, 0, &[(1, 1)])],
            ..Snapshot::default()
        };
        let err = snapshot.into_world().unwrap_err();
        assert_eq!(
            err,
            WorldError::CellTaken {
                coord: Coord::new(1, 1),
                existing: "a resource",
                placed: "a city tile",
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_units() {
        let snapshot = Snapshot {
            width: 2,
            height: 2,
            units: vec![UnitEntry::new("u_1", 0, 0, 0), UnitEntry::new("u_1", 0, 1, 0)],
            ..Snapshot::default()
        };
        assert!(matches!(
            snapshot.into_world(),
            Err(WorldError::DuplicateUnit(_))
        ));
    }

    #[test]
    fn test_rejects_empty_map() {
        assert_eq!(
            Snapshot::default().into_world().unwrap_err(),
            WorldError::EmptyMap {
                width: 0,
                height: 0
            }
        );
    }
}
