use glam::{Vec2, Vec3};
use terrain_pathfinding::{Grid, GridConfig, ObstacleMap, Pathfinder, SearchConfig};

// Terrain layers make some ground more expensive to cross. Here a swamp (layer 2) covers the
// straight line between start and end, and a road (layer 1) runs around it. The blurred
// penalties push the path away from the swamp's edge as well.

const CONFIG: &str = r#"
center = [15.0, 0.0, 10.0]
world_size = [30.0, 20.0]
node_radius = 0.5
obstacle_proximity_penalty = 10
blur_radius = 2

[[terrain_rules]]
layer_mask = 2   # road
penalty = 0

[[terrain_rules]]
layer_mask = 4   # swamp
penalty = 60

[[terrain_rules]]
layer_mask = 1   # grass
penalty = 5
"#;

fn main() {
    env_logger::init();
    let config = GridConfig::from_toml_str(CONFIG).expect("valid grid configuration");
    let mut map = ObstacleMap::new();
    map.add_terrain(Vec2::ZERO, Vec2::new(30.0, 20.0), 0.0, 0)
        .add_terrain(Vec2::new(8.0, 0.0), Vec2::new(22.0, 16.0), 0.1, 2)
        .add_terrain(Vec2::new(0.0, 17.0), Vec2::new(30.0, 19.0), 0.2, 1);
    map.add_obstacle(Vec3::new(24.0, -1.0, 4.0), Vec3::new(26.0, 1.0, 12.0));

    let grid = Grid::new(&config, &map).expect("valid grid configuration");
    println!("{}", grid);
    let (min, max) = grid.penalty_range();
    println!("Penalties range from {} to {}", min, max);

    let search = SearchConfig {
        max_expansions: Some(10_000),
        ..Default::default()
    };
    let pathfinder = Pathfinder::new(grid, search);
    let path = pathfinder
        .find_path(Vec3::new(1.0, 0.0, 2.0), Vec3::new(29.0, 0.0, 2.0))
        .unwrap();
    println!("Path of {} cells with cost {}", path.len(), path.cost);
    for p in path.waypoints() {
        println!("{:?}", p);
    }
}
