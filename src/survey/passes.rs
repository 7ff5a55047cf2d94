//! Individual scoring passes.

use crate::survey::ScoreGrid;
use crate::world::{Cell, Coord, World};

/// Resource closeness: every minable resource spreads its fuel per turn
/// times its amount over the whole map, decaying by `decay` per step.
#[must_use]
pub fn raw_resource_score(world: &World, decay: f64) -> ScoreGrid {
    let map = &world.map;
    let mut grid = ScoreGrid::for_world(world);

    // Longest possible step distance on the map
    let longest = usize::from(map.width()) + usize::from(map.height());
    let mut falloff = Vec::with_capacity(longest + 1);
    let mut factor = 1.0;
    for _ in 0..=longest {
        falloff.push(factor);
        factor *= decay;
    }

    for coord in world.minable_resources() {
        let Some(resource) = map.get(coord).and_then(Cell::resource) else {
            continue;
        };
        let base =
            f64::from(resource.amount) * f64::from(world.constants.fuel_per_turn(resource.kind));
        let distance = map.distance_field([coord], |_| true);
        for (value, &steps) in grid.values_mut().iter_mut().zip(&distance) {
            if let Some(&f) = falloff.get(steps as usize) {
                *value += base * f;
            }
        }
    }

    grid
}

/// Step distance from our nearest city tile, walking around enemy city
/// tiles. Unreachable cells hold `u32::MAX`.
#[must_use]
pub fn city_distance_field(world: &World) -> Vec<u32> {
    let tiles = world.cities.iter().flat_map(|city| city.tiles.iter().copied());
    world
        .map
        .distance_field(tiles, |coord| !world.is_enemy_city_tile(coord))
}

/// Scale each cell by `factor^(d - 1)`, `d` being its distance from our
/// nearest city tile.
///
/// Cells at `d - 1 >= 2 * width`, or out of reach, drop to zero.
pub fn city_distance_decay(world: &World, grid: &mut ScoreGrid, factor: f64) {
    let cap = 2 * usize::from(world.map.width());
    let mut powers = Vec::with_capacity(cap + 1);
    let mut power = 1.0;
    for _ in 0..=cap {
        powers.push(power);
        power *= factor;
    }
    powers[cap] = 0.0;

    let distance = city_distance_field(world);
    for (value, &d) in grid.values_mut().iter_mut().zip(&distance) {
        let steps = (d as usize).saturating_sub(1).min(cap);
        *value *= powers[steps];
    }
}

/// Scale the orthogonal neighbors of every single-tile city by `factor`.
pub fn small_city_incentive(world: &World, grid: &mut ScoreGrid, factor: f64) {
    for city in world.cities.iter().filter(|city| city.tiles.len() == 1) {
        for &tile in &city.tiles {
            let (adjacent, count) = world.map.adjacent(tile);
            for &neighbor in &adjacent[..count as usize] {
                grid.scale(neighbor, factor);
            }
        }
    }
}

/// Scale cells diagonal to one of our city tiles but not orthogonally
/// touching any of them by `factor`.
pub fn anti_city_debuff(world: &World, grid: &mut ScoreGrid, factor: f64) {
    let map = &world.map;
    for city in &world.cities {
        for &tile in &city.tiles {
            let (diagonal, count) = tile.diagonal(map.width(), map.height());
            for &corner in &diagonal[..count as usize] {
                if !touches_own_city(world, corner) {
                    grid.scale(corner, factor);
                }
            }
        }
    }
}

fn touches_own_city(world: &World, coord: Coord) -> bool {
    let (adjacent, count) = world.map.adjacent(coord);
    adjacent[..count as usize]
        .iter()
        .any(|&neighbor| world.is_friendly_city_tile(neighbor))
}

/// Zero every cell that holds a resource or a city tile.
pub fn remove_invalid_locations(world: &World, grid: &mut ScoreGrid) {
    for (coord, cell) in world.map.iter() {
        if cell.has_resource() || cell.has_city_tile() {
            grid.set(coord, 0.0);
        }
    }
}
