//! Output formatting utilities for CLI.

use lantern::{Coord, Phase, TurnPlan};
use serde::Serialize;

/// JSON-serializable ranked site.
#[derive(Debug, Serialize)]
pub(super) struct JsonSite {
    /// Column.
    pub(super) x: u16,
    /// Row.
    pub(super) y: u16,
    /// Score of the cell.
    pub(super) score: f64,
}

impl JsonSite {
    /// Create from a ranked cell.
    pub(super) const fn new(coord: Coord, score: f64) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            score,
        }
    }
}

/// Name of a phase as printed next to its moves.
const fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Resource => "resource",
        Phase::City => "city",
        Phase::Colony => "colony",
        Phase::Founder => "founder",
        Phase::Leftover => "leftover",
    }
}

/// Format a plan as game commands, one per line, followed by the fuel
/// assignments as comments.
pub(super) fn format_plan(plan: &TurnPlan) -> String {
    let mut output = String::new();

    output.push_str(&format!("# turn {}\n", plan.turn));
    for planned in &plan.moves {
        output.push_str(&format!(
            "m {} {}  # {}\n",
            planned.unit,
            planned.direction,
            phase_name(planned.phase)
        ));
    }
    for build in &plan.builds {
        output.push_str(&format!("bcity {}\n", build.unit));
    }
    for assignment in &plan.assignments {
        output.push_str(&format!(
            "# {} feeds {} with {}\n",
            assignment.unit, assignment.city, assignment.amount
        ));
    }

    output
}

/// Format ranked sites as a numbered list.
pub(super) fn format_sites(sites: &[JsonSite]) -> String {
    let mut output = String::new();

    if sites.is_empty() {
        output.push_str("No city sites with a positive score\n");
        return output;
    }
    for (rank, site) in sites.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. ({}, {})  {:.3}\n",
            rank + 1,
            site.x,
            site.y,
            site.score
        ));
    }

    output
}
