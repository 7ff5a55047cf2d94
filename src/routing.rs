//! Multi-unit routing over time-expanded flow graphs.
//!
//! Each routing phase builds a [`RoutingGraph`] with one node pair per
//! (time step, cell) plus an untimed "arrived" layer, solves it as a min-cost
//! max-flow problem and decodes one [`Move`] per routed unit. Capacity-1
//! occupancy edges keep two units from standing on the same cell at the same
//! time; [`Reservations`] carry that guarantee across phases of one turn.

pub mod colony;
mod extract;
mod graph;
mod obstacles;

pub use extract::{extract_moves, extract_routes, Route};
pub use graph::{GraphNode, Reservations, RoutingGraph};
pub(crate) use graph::routed_units;
pub use obstacles::ObstacleMap;

pub use crate::world::Direction;

use serde::{Deserialize, Serialize};

use crate::world::{CityId, Coord, UnitId};

/// A one-step command for a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Unit to move.
    pub unit: UnitId,
    /// Direction of the step.
    pub direction: Direction,
}

impl Move {
    /// Create a move command.
    #[must_use]
    pub const fn new(unit: UnitId, direction: Direction) -> Self {
        Self { unit, direction }
    }
}

/// Where a routing phase sends its units.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Towards the nearest minable resource.
    Resources,
    /// Into any tile of one of our cities.
    City(CityId),
    /// Onto candidate city sites, one founder per site.
    Sites(Vec<Coord>),
    /// Idle units; same bias as [`Target::Resources`].
    Leftover,
}
