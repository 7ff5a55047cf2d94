//! Clump-based scoring: connected same-tier deposits count as one prize.

use std::collections::VecDeque;

use crate::survey::ScoreGrid;
use crate::world::{Cell, ResourceKind, World};

/// Turns within which research still counts for coal and uranium.
const RESEARCH_WINDOW: f64 = 50.0;

/// Value of one unit of a resource, weighted by how soon we can mine it.
///
/// Research speed is estimated at one point per twelve city tiles per turn.
/// Tiers already researched count as reachable now.
#[must_use]
pub fn research_adjusted_value(world: &World, kind: ResourceKind) -> f64 {
    let weight = match kind {
        ResourceKind::Wood => return 10.0,
        ResourceKind::Coal => 6.0,
        ResourceKind::Uranium => 4.0,
    };

    let turns = if world.has_researched(kind) {
        0.0
    } else {
        let per_turn = f64::from(u32::try_from(world.city_tile_count()).unwrap_or(u32::MAX)) / 12.0;
        let missing = world.constants.research_requirement(kind) - world.research_points;
        if per_turn > 0.0 {
            f64::from(missing) / per_turn
        } else {
            f64::INFINITY
        }
    };

    let closeness = (RESEARCH_WINDOW - turns).max(0.0) / RESEARCH_WINDOW;
    weight * closeness * closeness
}

/// Label connected same-tier resource cells. Returns the label of each cell
/// (`None` off resources) and the value of each clump.
fn label_clumps(world: &World) -> (Vec<Option<usize>>, Vec<f64>) {
    let map = &world.map;
    let mut labels = vec![None; map.len()];
    let mut values = Vec::new();
    let mut queue = VecDeque::new();

    for (start, cell) in map.iter() {
        let Some(kind) = cell.resource().map(|r| r.kind) else {
            continue;
        };
        let Some(start_idx) = map.index_of(start) else {
            continue;
        };
        if labels[start_idx].is_some() {
            continue;
        }

        let label = values.len();
        let unit_value = research_adjusted_value(world, kind);
        let mut total = 0.0;
        labels[start_idx] = Some(label);
        queue.push_back(start);

        while let Some(coord) = queue.pop_front() {
            if let Some(resource) = map.get(coord).and_then(Cell::resource) {
                total += unit_value * f64::from(resource.amount);
            }
            let (adjacent, count) = map.adjacent(coord);
            for &next in &adjacent[..count as usize] {
                let Some(idx) = map.index_of(next) else {
                    continue;
                };
                let same_kind = map
                    .get(next)
                    .and_then(Cell::resource)
                    .is_some_and(|r| r.kind == kind);
                if labels[idx].is_none() && same_kind {
                    labels[idx] = Some(label);
                    queue.push_back(next);
                }
            }
        }

        values.push(total);
    }

    (labels, values)
}

/// Clump score of every non-resource cell.
///
/// Each cell gets the value of every distinct clump it touches. Cells left
/// at zero that touch one of our cities then take the mean of their scored
/// neighbors, scaled by `spread`.
#[must_use]
pub fn clump_score(world: &World, spread: f64) -> ScoreGrid {
    let map = &world.map;
    let (labels, values) = label_clumps(world);
    let mut grid = ScoreGrid::for_world(world);

    for (coord, cell) in map.iter() {
        if cell.has_resource() {
            continue;
        }
        let (adjacent, count) = map.adjacent(coord);
        let mut touched: Vec<usize> = adjacent[..count as usize]
            .iter()
            .filter_map(|&next| map.index_of(next).and_then(|idx| labels[idx]))
            .collect();
        touched.sort_unstable();
        touched.dedup();
        grid.set(coord, touched.iter().map(|&label| values[label]).sum());
    }

    let mut extra = ScoreGrid::for_world(world);
    for (coord, cell) in map.iter() {
        if cell.has_resource() || grid.get(coord) > 0.0 {
            continue;
        }
        let (adjacent, count) = map.adjacent(coord);
        let neighbors = &adjacent[..count as usize];
        if !neighbors.iter().any(|&next| world.is_friendly_city_tile(next)) {
            continue;
        }
        let (sum, scored) = neighbors
            .iter()
            .map(|&next| grid.get(next))
            .filter(|&score| score > 0.0)
            .fold((0.0, 0.0), |(sum, n), score| (sum + score, n + 1.0));
        if scored > 0.0 {
            extra.set(coord, sum / scored * spread);
        }
    }

    for (value, add) in grid.values_mut().iter_mut().zip(extra.values()) {
        *value += add;
    }
    grid
}
