// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Lantern: flow-based routing and site scoring for a grid settlement game bot.
//!
//! Every turn the bot receives a fresh [`World`] and has to produce one command
//! per unit within a tight compute budget. This crate is the part of the bot
//! that does real graph work:
//! - A min-cost max-flow solver
//! - Time-expanded routing graphs that assign units to destinations without
//!   two units claiming the same cell at the same time
//! - Score grids that rank cells for new city tiles
//! - A flow formulation that sends full units to the cities that need fuel
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        Turn Planner                 │
//! ├──────────────┬──────────┬───────────┤
//! │   Routing    │  Survey  │  Supply   │
//! ├──────────────┴──────────┴───────────┤
//! │         Flow Solver                 │
//! ├─────────────────────────────────────┤
//! │         World Snapshot              │
//! └─────────────────────────────────────┘
//! ```

pub mod colonizers;
pub mod config;
pub mod error;
pub mod flow;
pub mod planner;
pub mod routing;
pub mod supply;
pub mod survey;
pub mod world;

pub use error::{Error, Result, WorldError};

// Re-export key types at crate root for convenience
pub use colonizers::ColonizerRegistry;
pub use config::{GameConstants, SiteRanking, Tuning};
pub use planner::{plan_turn, Phase, TurnPlan};
pub use routing::{Direction, Move};
pub use world::{Cell, City, CityId, Coord, Map, ResourceKind, Unit, UnitId, World};
