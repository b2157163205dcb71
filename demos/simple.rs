use glam::{Vec2, Vec3};
use terrain_pathfinding::{Grid, GridConfig, ObstacleMap, Pathfinder, SearchConfig};

// In this example a path is found on a 10x10 grid of unit cells with a wall across the middle
// that has a single gap on the right:
//  __________
// |         E|
// |          |
// |#########.|
// |          |
// |S         |
//  __________
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end

fn main() {
    env_logger::init();
    let mut map = ObstacleMap::new();
    map.add_obstacle(Vec3::new(0.0, -1.0, 4.2), Vec3::new(8.9, 1.0, 4.8));
    let config = GridConfig {
        center: Vec3::new(5.0, 0.0, 5.0),
        world_size: Vec2::new(10.0, 10.0),
        node_radius: 0.5,
        ..Default::default()
    };
    let grid = Grid::new(&config, &map).expect("valid grid configuration");
    println!("{}", grid);
    let pathfinder = Pathfinder::new(grid, SearchConfig::default());
    match pathfinder.find_path(Vec3::new(0.5, 0.0, 0.5), Vec3::new(9.5, 0.0, 9.5)) {
        Ok(path) => {
            println!("Path with cost {}:", path.cost);
            for p in &path.cells {
                println!("{:?}", p);
            }
            println!("Waypoints: {:?}", path.waypoints());
        }
        Err(e) => println!("{}", e),
    }
}
