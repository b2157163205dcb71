//! # terrain_pathfinding
//!
//! Pathfinding over a weighted grid sampled from a continuous world. A [Grid] is built by
//! querying an [Environment] once per cell for obstructions and for the terrain layer below the
//! cell. Terrain layers map to movement penalties, and the penalty field is smoothed with a
//! [box blur](https://en.wikipedia.org/wiki/Box_blur) so that agents keep their distance from
//! expensive ground and obstacles.
//!
//! Paths are found with [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) on the
//! 8-connected grid using the octile distance as heuristic. The open set is a [PriorityHeap]
//! which supports raising the priority of an item in place. Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! to avoid flood-filling behaviour if no path exists.
pub mod blur;
pub mod config;
pub mod environment;
pub mod error;
pub mod grid;
pub mod heap;
pub mod node;
pub mod pathfinder;

use grid_util::Point;

pub use config::{GridConfig, SearchConfig, TerrainRule};
pub use environment::{Environment, ObstacleMap, RaycastHit};
pub use error::{Error, Result};
pub use grid::Grid;
pub use heap::{HeapItem, PriorityHeap};
pub use node::Node;
pub use pathfinder::{Path, Pathfinder, SearchContext};

/// Cost of a straight move.
pub const C: i32 = 10;
/// Cost of a diagonal move, approximating `C * sqrt(2)`.
pub const D: i32 = 14;
/// `2C - D`, the saving of one diagonal step over two straight ones, used by the octile formula.
pub const E: i32 = 2 * C - D;

/// Reduces a step-by-step path to the cells where its direction changes, keeping both ends.
pub fn simplify_path(path: &[Point]) -> Vec<Point> {
    let mut waypoints: Vec<Point> = Vec::new();
    let mut last_dir = None;
    for (i, w) in path.windows(2).enumerate() {
        let dir = (w[1].x - w[0].x, w[1].y - w[0].y);
        if last_dir != Some(dir) {
            waypoints.push(path[i]);
            last_dir = Some(dir);
        }
    }
    if let Some(&last) = path.last() {
        waypoints.push(last);
    }
    waypoints
}
