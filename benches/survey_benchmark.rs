//! Benchmarks for site scoring.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use lantern::survey::{SiteSurvey, top_k};
use lantern::world::{CityEntry, ResourceEntry, ResourceKind, Snapshot};
use lantern::{Tuning, World};

/// 32x32 board with scattered deposits of every tier.
fn board() -> World {
    let mut snapshot = Snapshot {
        width: 32,
        height: 32,
        research_points: 60,
        ..Snapshot::default()
    };
    for n in 0..90u16 {
        let (x, y) = ((n * 11) % 32, (n * 7 + n / 4) % 32);
        if snapshot.resources.iter().any(|r| r.x == x && r.y == y) {
            continue;
        }
        let kind = match n % 5 {
            0 => ResourceKind::Coal,
            1 => ResourceKind::Uranium,
            _ => ResourceKind::Wood,
        };
        snapshot.resources.push(ResourceEntry::new(x, y, kind, 350));
    }
    let free = |x: u16, y: u16| !snapshot.resources.iter().any(|r| r.x == x && r.y == y);
    let tiles: Vec<(u16, u16)> = [(15, 15), (15, 16), (16, 15), (3, 28)]
        .into_iter()
        .filter(|&(x, y)| free(x, y))
        .collect();
    snapshot.cities = tiles
        .iter()
        .enumerate()
        .map(|(n, &tile)| CityEntry::new(&format!("c_{n}"), 0, 100, &[tile]))
        .collect();
    snapshot.into_world().unwrap()
}

fn bench_placement(c: &mut Criterion) {
    let world = board();
    let tuning = Tuning::default();

    c.bench_function("placement_sites_32x32", |b| {
        b.iter(|| {
            let survey = SiteSurvey::new(black_box(&world), &tuning);
            black_box(survey.find_k_potential_city_locations(tuning.candidate_sites))
        });
    });
}

fn bench_clumps(c: &mut Criterion) {
    let world = board();
    let tuning = Tuning::default();

    c.bench_function("clump_sites_32x32", |b| {
        b.iter(|| {
            let survey = SiteSurvey::new(black_box(&world), &tuning);
            black_box(survey.growth_and_explore_sites(tuning.growth_sites, tuning.explore_sites))
        });
    });
}

fn bench_top_k(c: &mut Criterion) {
    let world = board();
    let tuning = Tuning::default();
    let grid = SiteSurvey::new(&world, &tuning).placement_grid();

    c.bench_function("top_k_32x32", |b| {
        b.iter(|| black_box(top_k(black_box(&grid), 20)));
    });
}

criterion_group!(benches, bench_placement, bench_clumps, bench_top_k);
criterion_main!(benches);
