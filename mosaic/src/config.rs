use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterStrategy;

/// Tunables of a run. Every field has a default, a JSON config file only needs
/// the ones it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub min_point_distance: f64,

    /// Triangles with an area less than or equal to this are dropped. Denser
    /// point sets want a smaller value to keep fine details.
    pub min_area_threshold: f64,

    pub margin_x: u32,
    pub margin_y: u32,

    pub filter: FilterStrategy,

    /// Sample triangle colors on the rayon thread pool.
    pub parallel: bool,

    pub density: Density,
}

/// How many candidates the built-in proposers generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Density {
    /// Seed of the random proposer, a random one is picked and logged when
    /// missing.
    pub seed: Option<u64>,

    pub top_points: usize,
    pub middle_points: usize,
    pub bottom_points: usize,

    /// Side of the blocks the gradient proposer picks its peaks from, 0
    /// disables it.
    pub gradient_cell: u32,
    pub gradient_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_point_distance: 4.0,
            min_area_threshold: 5.0,
            margin_x: 10,
            margin_y: 10,
            filter: FilterStrategy::Grid,
            parallel: true,
            density: Density::default(),
        }
    }
}

impl Default for Density {
    fn default() -> Self {
        Density {
            seed: None,
            top_points: 800,
            middle_points: 400,
            bottom_points: 5000,
            gradient_cell: 8,
            gradient_threshold: 96.0,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("min_point_distance", self.min_point_distance),
            ("min_area_threshold", self.min_area_threshold),
            ("density.gradient_threshold", self.density.gradient_threshold),
        ];

        for &(name, v) in &non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non negative number, got {}",
                    name, v
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"min_point_distance": 8, "filter": "quadtree", "density": {"seed": 7}}"#,
        )
        .unwrap();

        assert_eq!(config.min_point_distance, 8.0);
        assert_eq!(config.filter, FilterStrategy::Quadtree);
        assert_eq!(config.density.seed, Some(7));
        assert_eq!(config.density.bottom_points, 5000);
        assert_eq!(config.margin_x, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        let mut config = Config::default();
        config.min_area_threshold = -1.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.min_point_distance = f64::NAN;
        assert!(config.validate().is_err());
    }
}
