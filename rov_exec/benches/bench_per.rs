//! # Perception Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};

use rov_lib::{
    map::WorldMap,
    nav::{Mode, NavCtrl, NavParams},
    per::{rover_coords, to_polar_coords, PerMgr, PerParams},
    state::RoverState,
};

fn per_benchmark(c: &mut Criterion) {
    // ---- Build a dummy frame ----

    // Bright ground in the lower half, dark rock wall across the top and a yellow sample on the
    // right, roughly what the rover sees when driving along a canyon
    let frame = RgbImage::from_fn(320, 160, |x, y| {
        if y < 70 {
            Rgb([60, 45, 40])
        } else if x > 230 && x < 250 && y > 100 && y < 115 {
            Rgb([200, 170, 20])
        } else {
            Rgb([210, 190, 170])
        }
    });

    let per_mgr = PerMgr::new(PerParams::default()).unwrap();
    let mut state = RoverState::new(Mode::Forward);
    state.pos = [100.0, 100.0];
    let mut world_map = WorldMap::new(per_mgr.params.world_size);

    c.bench_function("Calibration::warp", |b| {
        b.iter(|| per_mgr.calibration().warp(&frame).unwrap())
    });

    let masks = per_mgr.classify(&frame).unwrap();

    c.bench_function("rover_coords + to_polar_coords", |b| {
        b.iter(|| to_polar_coords(&rover_coords(&masks.navigable)))
    });

    c.bench_function("PerMgr::step", |b| {
        b.iter(|| per_mgr.step(&frame, &mut state, &mut world_map).unwrap())
    });

    let nav_ctrl = NavCtrl::new(NavParams::default());

    c.bench_function("NavCtrl::step", |b| {
        b.iter(|| {
            let mut s = state.clone();
            nav_ctrl.step(&mut s)
        })
    });
}

criterion_group!(benches, per_benchmark);
criterion_main!(benches);
