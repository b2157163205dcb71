//! The world queries a [Grid](crate::grid::Grid) is sampled from.
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Surface hit by a downward ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// Layer index of the surface, in `0..32`.
    pub layer: u32,
    pub point: Vec3,
}

/// Collision and terrain queries supplied by whatever owns the physical world. Both queries are
/// expected to be synchronous and free of side effects.
pub trait Environment {
    /// Whether a sphere of `radius` around `point` overlaps any obstacle.
    fn is_obstructed(&self, point: Vec3, radius: f32) -> bool;
    /// First surface hit by a ray cast straight down from `origin`, up to `max_distance` away.
    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> Option<RaycastHit>;
}

/// Axis-aligned box that blocks movement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
}

/// Flat rectangle of terrain on the xz plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainPatch {
    pub min: Vec2,
    pub max: Vec2,
    pub height: f32,
    pub layer: u32,
}

/// In-memory [Environment] made of obstacle boxes and terrain patches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObstacleMap {
    pub obstacles: Vec<Obstacle>,
    pub terrain: Vec<TerrainPatch>,
}

impl ObstacleMap {
    pub fn new() -> ObstacleMap {
        ObstacleMap::default()
    }

    pub fn add_obstacle(&mut self, min: Vec3, max: Vec3) -> &mut Self {
        self.obstacles.push(Obstacle {
            min: min.min(max),
            max: min.max(max),
        });
        self
    }

    pub fn add_terrain(&mut self, min: Vec2, max: Vec2, height: f32, layer: u32) -> &mut Self {
        self.terrain.push(TerrainPatch {
            min: min.min(max),
            max: min.max(max),
            height,
            layer,
        });
        self
    }
}

impl Environment for ObstacleMap {
    /// Spheres that merely touch a box do not count as obstructed.
    fn is_obstructed(&self, point: Vec3, radius: f32) -> bool {
        self.obstacles.iter().any(|o| {
            let closest = point.clamp(o.min, o.max);
            closest.distance_squared(point) < radius * radius
        })
    }

    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let xz = Vec2::new(origin.x, origin.z);
        self.terrain
            .iter()
            .filter(|t| {
                xz.cmpge(t.min).all()
                    && xz.cmple(t.max).all()
                    && t.height <= origin.y
                    && origin.y - t.height <= max_distance
            })
            // Highest surface is hit first; earlier patches win ties
            .fold(None::<&TerrainPatch>, |best, t| match best {
                Some(b) if b.height >= t.height => Some(b),
                _ => Some(t),
            })
            .map(|t| RaycastHit {
                layer: t.layer,
                point: Vec3::new(origin.x, t.height, origin.z),
            })
    }
}
