use glam::{Vec2, Vec3};
use terrain_pathfinding::{Error, Grid, GridConfig, ObstacleMap, Pathfinder, SearchConfig};

// When the target cell is itself blocked, for example an agent walking up to a crate, an exact
// search fails. The approximate search ends next to the target instead.

fn main() {
    env_logger::init();
    let mut map = ObstacleMap::new();
    map.add_obstacle(Vec3::new(6.2, -1.0, 6.2), Vec3::new(6.8, 1.0, 6.8));
    let config = GridConfig {
        center: Vec3::new(5.0, 0.0, 5.0),
        world_size: Vec2::new(10.0, 10.0),
        node_radius: 0.5,
        blur_radius: 1,
        ..Default::default()
    };
    let pathfinder = Pathfinder::new(Grid::new(&config, &map).unwrap(), SearchConfig::default());
    let start = Vec3::new(0.5, 0.0, 0.5);
    let crate_position = Vec3::new(6.5, 0.0, 6.5);

    match pathfinder.find_path(start, crate_position) {
        Err(Error::NoPathFound { start, target }) => {
            println!("No exact path from {:?} to {:?}", start, target)
        }
        other => println!("Unexpected result: {:?}", other),
    }
    let path = pathfinder.find_path_approximate(start, crate_position).unwrap();
    println!("Approximate path with cost {}:", path.cost);
    for p in &path.cells {
        println!("{:?}", p);
    }
}
