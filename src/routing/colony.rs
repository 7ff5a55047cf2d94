//! Single-unit stepping for founders already committed to a site.

use std::collections::HashSet;

use tracing::warn;

use crate::routing::Reservations;
use crate::world::{Coord, Direction, Unit, World};

/// First step of a shortest path from `unit` to `site`.
///
/// The path avoids every city tile and every cell holding another unit, and
/// the first step never lands on a cell `reservations` already claims for
/// time step 1. Ties go to the first of north, east, south, west. Without any
/// path the unit heads straight for the site and a warning is logged; if that
/// cell is claimed too, the unit holds.
#[must_use]
pub fn step_toward_site(
    world: &World,
    unit: &Unit,
    site: Coord,
    reservations: &Reservations,
) -> Direction {
    if unit.pos == site {
        return Direction::Center;
    }

    let map = &world.map;
    let occupied: HashSet<Coord> = world
        .all_units()
        .filter(|other| other.id != unit.id)
        .map(|other| other.pos)
        .collect();
    let distance = map.distance_field([site], |coord| {
        map.get(coord).is_some_and(|cell| !cell.has_city_tile()) && !occupied.contains(&coord)
    });

    let best = Direction::CARDINAL
        .into_iter()
        .filter_map(|direction| {
            let next = unit.pos.step(direction, map.width(), map.height())?;
            let idx = map.index_of(next)?;
            (distance[idx] != u32::MAX && !reservations.is_reserved(1, idx))
                .then_some((direction, distance[idx]))
        })
        .min_by_key(|&(_, steps)| steps);

    match best {
        Some((direction, _)) => direction,
        None => {
            warn!(
                unit = %unit.id,
                from = %unit.pos,
                site = %site,
                turn = world.turn,
                "no path to city site, heading straight for it"
            );
            let direction = unit.pos.direction_to(site);
            let claimed = unit
                .pos
                .step(direction, map.width(), map.height())
                .and_then(|next| map.index_of(next))
                .is_some_and(|idx| reservations.is_reserved(1, idx));
            if claimed { Direction::Center } else { direction }
        }
    }
}
