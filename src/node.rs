use glam::Vec3;
use grid_util::Point;

/// A single grid cell. Nodes are created once by [Grid](crate::grid::Grid) and never change
/// afterwards; search state lives in a [SearchContext](crate::pathfinder::SearchContext).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub grid_x: i32,
    pub grid_y: i32,
    /// Centre of the cell in world space.
    pub world_position: Vec3,
    pub walkable: bool,
    /// Extra traversal cost on top of the base move cost, after blurring.
    pub movement_penalty: i32,
}

impl Node {
    pub fn point(&self) -> Point {
        Point::new(self.grid_x, self.grid_y)
    }

    /// Whether moving from `self` to the adjacent `other` is a diagonal step.
    pub fn is_diagonal_to(&self, other: &Node) -> bool {
        self.grid_x != other.grid_x && self.grid_y != other.grid_y
    }
}
