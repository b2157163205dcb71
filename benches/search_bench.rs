use criterion::{criterion_group, criterion_main, Criterion};
use glam::{Vec2, Vec3};
use grid_util::{SimpleValueGrid, ValueGrid};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use terrain_pathfinding::{
    blur::blur_penalties, Grid, GridConfig, ObstacleMap, Pathfinder, SearchConfig, TerrainRule,
};

const N: i32 = 128;

/// Square world of unit cells scattered with small obstacles and a few patches of rough terrain.
fn random_world(rng: &mut StdRng) -> (GridConfig, ObstacleMap) {
    let mut map = ObstacleMap::new();
    map.add_terrain(Vec2::ZERO, Vec2::splat(N as f32), 0.0, 0);
    for _ in 0..N * N / 10 {
        let x = rng.gen_range(0..N) as f32;
        let y = rng.gen_range(0..N) as f32;
        map.add_obstacle(Vec3::new(x + 0.1, -1.0, y + 0.1), Vec3::new(x + 0.9, 1.0, y + 0.9));
    }
    for _ in 0..20 {
        let min = Vec2::new(rng.gen_range(0..N) as f32, rng.gen_range(0..N) as f32);
        map.add_terrain(min, min + Vec2::splat(12.0), 0.1, 1);
    }
    let config = GridConfig {
        center: Vec3::new(N as f32 / 2.0, 0.0, N as f32 / 2.0),
        world_size: Vec2::splat(N as f32),
        node_radius: 0.5,
        terrain_rules: vec![TerrainRule::new(1 << 1, 20)],
        ..Default::default()
    };
    (config, map)
}

fn grid_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let (config, map) = random_world(&mut rng);
    c.bench_function(format!("build {N}x{N} grid").as_str(), |b| {
        b.iter(|| black_box(Grid::new(&config, &map).unwrap()))
    });

    let mut field: SimpleValueGrid<i32> = SimpleValueGrid::new(N as usize, N as usize, 0);
    for x in 0..N {
        for y in 0..N {
            field.set(x, y, rng.gen_range(0..100));
        }
    }
    for radius in [1, 3, 8] {
        c.bench_function(format!("blur {N}x{N}, radius {radius}").as_str(), |b| {
            b.iter(|| black_box(blur_penalties(&field, radius)))
        });
    }
}

fn search_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let (config, map) = random_world(&mut rng);
    let pathfinder = Pathfinder::new(Grid::new(&config, &map).unwrap(), SearchConfig::default());
    let scenarios: Vec<(Vec3, Vec3)> = (0..50)
        .map(|_| {
            let mut p = || {
                Vec3::new(
                    rng.gen_range(0.0..N as f32),
                    0.0,
                    rng.gen_range(0.0..N as f32),
                )
            };
            (p(), p())
        })
        .collect();
    c.bench_function(format!("astar {N}x{N}, 50 queries").as_str(), |b| {
        b.iter(|| {
            for (start, end) in &scenarios {
                let _ = black_box(pathfinder.find_path(*start, *end));
            }
        })
    });
}

criterion_group!(benches, grid_bench, search_bench);
criterion_main!(benches);
