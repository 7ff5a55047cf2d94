//! Units committed to founding a new city tile.
//!
//! This is the one piece of state that lives across turns. The caller owns
//! the registry and hands it to [`plan_turn`](crate::planner::plan_turn)
//! each turn. Entries are:
//! - added when a colony phase routes a founder to a site
//! - removed when the founder builds on its site
//! - dropped by [`ColonizerRegistry::refresh`] when the unit is gone, the
//!   site already holds a city tile, or the unit can no longer act while
//!   still carrying cargo

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{read_json, write_json, Result};
use crate::world::{Coord, UnitId, World};

/// Founders and the site each one is heading for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonizerRegistry {
    sites: BTreeMap<UnitId, Coord>,
}

impl ColonizerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a registry saved by [`ColonizerRegistry::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Read a registry, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the registry as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Commit `unit` to founding a city tile at `site`.
    pub fn commit(&mut self, unit: UnitId, site: Coord) {
        info!(%unit, %site, "committed colonizer");
        self.sites.insert(unit, site);
    }

    /// Forget a founder that built its tile.
    pub fn complete(&mut self, unit: &UnitId) -> Option<Coord> {
        self.sites.remove(unit)
    }

    /// Site a unit is committed to.
    #[must_use]
    pub fn site_of(&self, unit: &UnitId) -> Option<Coord> {
        self.sites.get(unit).copied()
    }

    /// Check if a unit is a committed founder.
    #[must_use]
    pub fn contains(&self, unit: &UnitId) -> bool {
        self.sites.contains_key(unit)
    }

    /// Founders and their sites, by unit id.
    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, Coord)> {
        self.sites.iter().map(|(unit, &site)| (unit, site))
    }

    /// Number of founders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Check if nobody is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Drop commitments that can no longer be carried out.
    pub fn refresh(&mut self, world: &World) {
        self.sites.retain(|unit_id, site| {
            let Some(unit) = world.unit(unit_id) else {
                debug!(unit = %unit_id, "colonizer is gone");
                return false;
            };
            if world.map.get(*site).is_none_or(|cell| cell.has_city_tile()) {
                debug!(unit = %unit_id, %site, "colony site already taken");
                return false;
            }
            if !unit.can_act && unit.cargo.total() > 0 {
                debug!(unit = %unit_id, "colonizer stuck with cargo");
                return false;
            }
            true
        });
    }
}
