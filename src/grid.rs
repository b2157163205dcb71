use core::fmt;

use glam::{Vec2, Vec3};
use grid_util::{SimpleValueGrid, ValueGrid};
use itertools::{iproduct, Itertools};
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::blur::blur_penalties;
use crate::config::GridConfig;
use crate::environment::Environment;
use crate::error::Result;
use crate::node::Node;

/// Height above a cell centre from which the terrain ray is cast.
const RAYCAST_HEIGHT: f32 = 50.0;
const RAYCAST_DISTANCE: f32 = 100.0;

/// [Grid] discretizes a rectangle of the world into square cells, each a [Node] with a walkable
/// flag and a smoothed movement penalty. Connected components of walkable cells are computed
/// up front with a [UnionFind] so that searches between disconnected cells can be rejected
/// without flood-filling the grid.
///
/// Cells are stored row by row: the cell at `(x, y)` has index `y * size_x + x`, where `x`
/// runs along world x and `y` along world z.
#[derive(Clone, Debug)]
pub struct Grid {
    nodes: Vec<Node>,
    size_x: usize,
    size_y: usize,
    node_radius: f32,
    world_bottom_left: Vec3,
    penalty_min: i32,
    penalty_max: i32,
    components: UnionFind<usize>,
}

impl Grid {
    /// Samples `env` once per cell to build the grid.
    pub fn new<E: Environment + ?Sized>(config: &GridConfig, env: &E) -> Result<Grid> {
        config.validate()?;
        let (size_x, size_y) = config.grid_size();
        let radius = config.node_radius;
        let diameter = radius * 2.0;
        let world_bottom_left = config.center
            - Vec3::new(config.world_size.x / 2.0, 0.0, config.world_size.y / 2.0);

        let mut raw_penalties: SimpleValueGrid<i32> = SimpleValueGrid::new(size_x, size_y, 0);
        let mut cells = Vec::with_capacity(size_x * size_y);
        for (y, x) in iproduct!(0..size_y as i32, 0..size_x as i32) {
            let world_point = world_bottom_left
                + Vec3::new(x as f32 * diameter + radius, 0.0, y as f32 * diameter + radius);
            let walkable = !env.is_obstructed(world_point, radius);

            // Obstruction and terrain are independent signals; both contribute
            let mut penalty = env
                .raycast_down(world_point + Vec3::Y * RAYCAST_HEIGHT, RAYCAST_DISTANCE)
                .and_then(|hit| config.terrain_penalty(hit.layer))
                .unwrap_or(0);
            if !walkable {
                penalty += config.obstacle_proximity_penalty;
            }
            raw_penalties.set(x, y, penalty);
            cells.push((x, y, world_point, walkable));
        }

        let penalties = blur_penalties(&raw_penalties, config.blur_radius);
        let nodes: Vec<Node> = cells
            .into_iter()
            .map(|(x, y, world_position, walkable)| Node {
                grid_x: x,
                grid_y: y,
                world_position,
                walkable,
                movement_penalty: penalties.get(x, y),
            })
            .collect();
        let (penalty_min, penalty_max) = nodes
            .iter()
            .map(|n| n.movement_penalty)
            .minmax()
            .into_option()
            .unwrap_or((0, 0));

        let mut grid = Grid {
            nodes,
            size_x,
            size_y,
            node_radius: radius,
            world_bottom_left,
            penalty_min,
            penalty_max,
            components: UnionFind::new(size_x * size_y),
        };
        grid.generate_components();
        info!(
            "Built {}x{} grid with {} blocked cells, penalties in [{}, {}]",
            size_x,
            size_y,
            grid.nodes.iter().filter(|n| !n.walkable).count(),
            penalty_min,
            penalty_max
        );
        Ok(grid)
    }

    /// Links every walkable cell to its walkable 8-neighbours.
    fn generate_components(&mut self) {
        self.components = UnionFind::new(self.nodes.len());
        for ix in 0..self.nodes.len() {
            if !self.nodes[ix].walkable {
                continue;
            }
            let (x, y) = (self.nodes[ix].grid_x, self.nodes[ix].grid_y);
            // Half of the neighbourhood suffices as union is symmetric
            for (dx, dy) in [(1, 0), (0, 1), (1, 1), (-1, 1)] {
                if let Some(n) = self.index_of(x + dx, y + dy) {
                    if self.nodes[n].walkable {
                        self.components.union(ix, n);
                    }
                }
            }
        }
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// Total number of cells, which bounds the size of any search frontier.
    pub fn max_size(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    pub fn node_diameter(&self) -> f32 {
        self.node_radius * 2.0
    }

    /// Smallest and largest blurred penalty, for shading debug views.
    pub fn penalty_range(&self) -> (i32, i32) {
        (self.penalty_min, self.penalty_max)
    }

    /// All cells in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_by_index(&self, ix: usize) -> &Node {
        &self.nodes[ix]
    }

    pub fn node(&self, x: i32, y: i32) -> Option<&Node> {
        self.index_of(x, y).map(|ix| &self.nodes[ix])
    }

    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.size_x && (y as usize) < self.size_y {
            Some(y as usize * self.size_x + x as usize)
        } else {
            None
        }
    }

    pub fn index_of_node(&self, node: &Node) -> usize {
        node.grid_y as usize * self.size_x + node.grid_x as usize
    }

    /// Indices of the in-bounds cells in the Moore neighbourhood of `ix`. Walkability is not
    /// checked.
    pub fn neighbor_indices(&self, ix: usize) -> SmallVec<[usize; 8]> {
        let (x, y) = (self.nodes[ix].grid_x, self.nodes[ix].grid_y);
        iproduct!(-1..=1, -1..=1)
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(|(dx, dy)| self.index_of(x + dx, y + dy))
            .collect()
    }

    /// The up to 8 cells surrounding `node`.
    pub fn neighbors(&self, node: &Node) -> SmallVec<[&Node; 8]> {
        self.neighbor_indices(self.index_of_node(node))
            .into_iter()
            .map(|ix| &self.nodes[ix])
            .collect()
    }

    /// Index of the cell whose centre is nearest to `world_position`, ignoring height. Points
    /// outside the grid are clamped to the closest edge cell.
    pub fn cell_index_at(&self, world_position: Vec3) -> usize {
        let extent = Vec2::new(self.size_x as f32, self.size_y as f32) * self.node_diameter();
        let offset = Vec2::new(
            world_position.x - self.world_bottom_left.x,
            world_position.z - self.world_bottom_left.z,
        );
        let fraction = offset / extent;
        let clamped = fraction.clamp(Vec2::ZERO, Vec2::ONE);
        if clamped != fraction {
            debug!("{} lies outside the grid, clamping to the nearest edge cell", world_position);
        }
        let to_index = |f: f32, size: usize| {
            ((f * size as f32 - 0.5).round() as i32).clamp(0, size as i32 - 1)
        };
        let x = to_index(clamped.x, self.size_x);
        let y = to_index(clamped.y, self.size_y);
        y as usize * self.size_x + x as usize
    }

    pub fn cell_at(&self, world_position: Vec3) -> &Node {
        &self.nodes[self.cell_index_at(world_position)]
    }

    /// Whether a path could exist from cell `start` to cell `target`. A blocked start cell can
    /// still be left through a walkable neighbour, but a blocked target can never be entered.
    pub fn connected(&self, start: usize, target: usize) -> bool {
        if start == target {
            return true;
        }
        if !self.nodes[target].walkable {
            return false;
        }
        if self.nodes[start].walkable {
            return self.components.equiv(start, target);
        }
        self.neighbor_indices(start)
            .into_iter()
            .any(|n| self.nodes[n].walkable && self.components.equiv(n, target))
    }
}

impl fmt::Display for Grid {
    /// Renders the grid with world z pointing up: `#` for blocked cells, otherwise a digit
    /// shading the penalty between the minimum and maximum.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let span = (self.penalty_max - self.penalty_min).max(1) as i64;
        for y in (0..self.size_y).rev() {
            let row = self.nodes[y * self.size_x..(y + 1) * self.size_x]
                .iter()
                .map(|n| {
                    if n.walkable {
                        let shade = (n.movement_penalty - self.penalty_min) as i64 * 9 / span;
                        char::from(b'0' + shade as u8)
                    } else {
                        '#'
                    }
                })
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
