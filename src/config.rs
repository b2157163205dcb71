//! Grid construction and search settings.

use glam::{Vec2, Vec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::D;

/// Penalty applied to cells whose ground surface lies on one of the layers in `layer_mask`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainRule {
    /// Bit `n` set means layer `n` matches.
    pub layer_mask: u32,
    pub penalty: i32,
}

impl TerrainRule {
    pub fn new(layer_mask: u32, penalty: i32) -> TerrainRule {
        TerrainRule {
            layer_mask,
            penalty,
        }
    }

    pub fn matches(&self, layer: u32) -> bool {
        layer < u32::BITS && self.layer_mask & (1 << layer) != 0
    }
}

/// Parameters for building a [Grid](crate::grid::Grid).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space centre of the covered rectangle.
    pub center: Vec3,
    /// Width (world x) and depth (world z) of the covered rectangle.
    pub world_size: Vec2,
    pub node_radius: f32,
    /// Checked in order; the first rule matching a surface decides its penalty.
    pub terrain_rules: Vec<TerrainRule>,
    /// Added to the penalty of every obstructed cell before blurring.
    pub obstacle_proximity_penalty: i32,
    /// Half-width of the penalty blur kernel.
    pub blur_radius: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            world_size: Vec2::new(10.0, 10.0),
            node_radius: 0.5,
            terrain_rules: Vec::new(),
            obstacle_proximity_penalty: 10,
            blur_radius: 3,
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(s: &str) -> Result<GridConfig> {
        let config: GridConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the penalty of the first rule matching `layer`.
    pub fn terrain_penalty(&self, layer: u32) -> Option<i32> {
        self.terrain_rules
            .iter()
            .find(|rule| rule.matches(layer))
            .map(|rule| rule.penalty)
    }

    /// Number of cells along world x and world z.
    pub fn grid_size(&self) -> (usize, usize) {
        let diameter = self.node_radius * 2.0;
        (
            (self.world_size.x / diameter).round() as usize,
            (self.world_size.y / diameter).round() as usize,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !self.node_radius.is_finite() || self.node_radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "node radius must be positive, got {}",
                self.node_radius
            )));
        }
        if !self.world_size.is_finite() || self.world_size.cmple(Vec2::ZERO).any() {
            return Err(Error::InvalidConfig(format!(
                "world size must be positive, got {}",
                self.world_size
            )));
        }
        if !self.center.is_finite() {
            return Err(Error::InvalidConfig("world centre is not finite".to_owned()));
        }
        let (size_x, size_y) = self.grid_size();
        if size_x == 0 || size_y == 0 {
            return Err(Error::InvalidConfig(format!(
                "world size {} with node radius {} gives a {size_x}x{size_y} grid",
                self.world_size, self.node_radius
            )));
        }
        if self.obstacle_proximity_penalty < 0 {
            return Err(Error::InvalidConfig(format!(
                "obstacle proximity penalty must not be negative, got {}",
                self.obstacle_proximity_penalty
            )));
        }
        for rule in &self.terrain_rules {
            if rule.penalty < 0 {
                return Err(Error::InvalidConfig(format!(
                    "terrain penalty must not be negative, got {}",
                    rule.penalty
                )));
            }
            if rule.layer_mask == 0 {
                warn!("Terrain rule with penalty {} has an empty layer mask", rule.penalty);
            }
        }
        // A path visits each cell at most once, so its cost stays below cells * (D + penalty)
        let cell_penalty = self.max_cell_penalty();
        let cells = (size_x as i64).saturating_mul(size_y as i64);
        if cells.saturating_mul(D as i64 + cell_penalty) > i32::MAX as i64 {
            return Err(Error::InvalidConfig(format!(
                "cell penalty of up to {cell_penalty} over {cells} cells overflows path costs"
            )));
        }
        Ok(())
    }

    /// Largest raw penalty a single cell can receive, before blurring.
    fn max_cell_penalty(&self) -> i64 {
        let terrain = self
            .terrain_rules
            .iter()
            .map(|rule| rule.penalty as i64)
            .max()
            .unwrap_or(0);
        terrain + self.obstacle_proximity_penalty as i64
    }
}

/// Per-query search settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Scales the heuristic. Values above 1.0 give weighted A*, which expands fewer cells but may
    /// return a more expensive path.
    pub heuristic_factor: f32,
    /// Maximum number of cells expanded before a query gives up.
    pub max_expansions: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic_factor: 1.0,
            max_expansions: None,
        }
    }
}

impl SearchConfig {
    pub fn from_toml_str(s: &str) -> Result<SearchConfig> {
        let config: SearchConfig = toml::from_str(s)?;
        if !config.heuristic_factor.is_finite() || config.heuristic_factor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "heuristic factor must be non-negative, got {}",
                config.heuristic_factor
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_rounds() {
        let config = GridConfig {
            world_size: Vec2::new(10.4, 3.0),
            node_radius: 0.5,
            ..Default::default()
        };
        assert_eq!(config.grid_size(), (10, 3));
    }

    #[test]
    fn rejects_degenerate_grids() {
        let config = GridConfig {
            world_size: Vec2::new(0.4, 10.0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = GridConfig {
            node_radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = GridConfig {
            world_size: Vec2::new(f32::NAN, 10.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GridConfig {
            terrain_rules: vec![TerrainRule::new(1, -5)],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(GridConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_penalties_that_overflow_path_costs() {
        let config = GridConfig {
            terrain_rules: vec![TerrainRule::new(1 << 2, i32::MAX)],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = GridConfig {
            terrain_rules: vec![TerrainRule::new(1, 1_000_000_000)],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = GridConfig {
            obstacle_proximity_penalty: i32::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // 100 cells * (14 + 20_000_000) still fits
        let config = GridConfig {
            terrain_rules: vec![TerrainRule::new(1, 20_000_000 - 10)],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn first_matching_rule_wins() {
        let config = GridConfig {
            terrain_rules: vec![
                TerrainRule::new(0b0110, 5),
                TerrainRule::new(0b0100, 20),
                TerrainRule::new(0b1000, 40),
            ],
            ..Default::default()
        };
        assert_eq!(config.terrain_penalty(1), Some(5));
        assert_eq!(config.terrain_penalty(2), Some(5));
        assert_eq!(config.terrain_penalty(3), Some(40));
        assert_eq!(config.terrain_penalty(0), None);
        assert_eq!(config.terrain_penalty(40), None);
    }

    #[test]
    fn parses_toml() {
        let config = GridConfig::from_toml_str(
            r#"
            center = [5.0, 0.0, 5.0]
            world_size = [20.0, 10.0]
            node_radius = 0.5
            blur_radius = 1

            [[terrain_rules]]
            layer_mask = 2
            penalty = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.center, Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(config.grid_size(), (20, 10));
        assert_eq!(config.obstacle_proximity_penalty, 10);
        assert_eq!(config.terrain_rules, vec![TerrainRule::new(2, 15)]);

        let search = SearchConfig::from_toml_str("max_expansions = 500").unwrap();
        assert_eq!(search.max_expansions, Some(500));
        assert_eq!(search.heuristic_factor, 1.0);

        assert!(matches!(
            GridConfig::from_toml_str("node_radius = \"wide\""),
            Err(Error::Parse(_))
        ));
        assert!(GridConfig::from_toml_str("node_radius = -1.0").is_err());
    }
}
