//! Units and their cargo.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConstants;
use crate::world::{Coord, ResourceKind, TeamId};

/// Stable identifier of a unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Resources carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cargo {
    /// Wood carried.
    pub wood: u32,
    /// Coal carried.
    pub coal: u32,
    /// Uranium carried.
    pub uranium: u32,
}

impl Cargo {
    /// Create cargo from per-tier amounts.
    #[must_use]
    pub const fn new(wood: u32, coal: u32, uranium: u32) -> Self {
        Self {
            wood,
            coal,
            uranium,
        }
    }

    /// Total resource units carried, regardless of tier. Saturates.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.wood.saturating_add(self.coal).saturating_add(self.uranium)
    }

    /// Amount carried of one tier.
    #[must_use]
    pub const fn amount(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Coal => self.coal,
            ResourceKind::Uranium => self.uranium,
        }
    }

    /// Fuel this cargo burns for once delivered to a city.
    #[must_use]
    pub fn fuel_value(&self, constants: &GameConstants) -> u32 {
        [ResourceKind::Wood, ResourceKind::Coal, ResourceKind::Uranium]
            .into_iter()
            .map(|kind| self.amount(kind).saturating_mul(constants.fuel_rate(kind)))
            .fold(0, u32::saturating_add)
    }
}

/// A mobile unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Stable identity.
    pub id: UnitId,
    /// Owning team.
    pub team: TeamId,
    /// Current position.
    pub pos: Coord,
    /// Resources carried.
    pub cargo: Cargo,
    /// Whether the unit may act this turn.
    pub can_act: bool,
}

impl Unit {
    /// Create an empty, ready unit.
    #[must_use]
    pub fn new(id: impl Into<String>, team: TeamId, pos: Coord) -> Self {
        Self {
            id: UnitId(id.into()),
            team,
            pos,
            cargo: Cargo::default(),
            can_act: true,
        }
    }

    /// Same unit carrying `cargo`.
    #[must_use]
    pub fn with_cargo(mut self, cargo: Cargo) -> Self {
        self.cargo = cargo;
        self
    }

    /// Space left in the cargo hold.
    #[must_use]
    pub fn cargo_space_left(&self, constants: &GameConstants) -> u32 {
        constants.worker_capacity.saturating_sub(self.cargo.total())
    }

    /// Check if the cargo hold is full.
    #[must_use]
    pub fn is_full(&self, constants: &GameConstants) -> bool {
        self.cargo_space_left(constants) == 0
    }
}
