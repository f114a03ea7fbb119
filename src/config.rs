//! Configuration system for the lattice simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration values.
///
/// Out-of-range values are rejected at construction time, never clamped.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid dimensions must be positive (got {x}x{y})")]
    EmptyGrid { x: usize, y: usize },
    #[error("{name} must lie within [0, 1] (got {value})")]
    UnitInterval { name: &'static str, value: f64 },
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("window size must be at least 1")]
    EmptyWindow,
}

/// Lattice size: either a single side length for a square grid or an
/// explicit `[rows, columns]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    /// Square grid with the given side length
    Square(usize),
    /// Rectangular grid as `[rows, columns]`
    Rect([usize; 2]),
}

impl SizeSpec {
    /// Resolve to (rows, columns).
    pub fn dims(self) -> (usize, usize) {
        match self {
            SizeSpec::Square(n) => (n, n),
            SizeSpec::Rect([x, y]) => (x, y),
        }
    }
}

impl Default for SizeSpec {
    fn default() -> Self {
        SizeSpec::Square(100)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    pub rule: RuleConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Grid geometry and initial seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Lattice size
    pub size: SizeSpec,
    /// Overall fill probability at initialization (0.0 - 1.0)
    pub density: f64,
    /// Blue fraction of the initially filled sites (0.0 - 1.0, two-species mode)
    pub num_ratio: f64,
}

/// Site-update rule parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Two-species mode: the lattice holds only red and blue bacteria.
    /// Otherwise every initial cell is an independently colored species.
    pub only_red_blue: bool,
    /// Probability of random death per attempt; the rest of the time the
    /// competitive kill/fill rule runs (0.0 - 1.0)
    pub slider: f64,
    /// Killing disparity in favor of red (1.0 = equal killers)
    pub red_advantage: f64,
    /// Killing disparity in favor of blue
    pub blue_advantage: f64,
    /// Growth disparity in favor of red (1.0 = equal growth)
    pub red_growth: f64,
    /// Growth disparity in favor of blue
    pub blue_growth: f64,
    /// Defective killers: red and blue cannot kill each other, and random
    /// death is disabled as well
    pub def_killers: bool,
}

/// Run control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Evolution budget for the simulation thread; 0 runs until stopped
    pub evolutions: u64,
    /// RNG seed for reproducible runs; omit for a random seed
    pub seed: Option<u64>,
    /// Milliseconds between progress reports in headless mode
    pub report_interval_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: SizeSpec::default(),
            density: 1.0,
            num_ratio: 0.5,
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            only_red_blue: true,
            slider: 0.0,
            red_advantage: 1.0,
            blue_advantage: 1.0,
            red_growth: 1.0,
            blue_growth: 1.0,
            def_killers: false,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            evolutions: 0,
            seed: None,
            report_interval_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (x, y) = self.grid.size.dims();
        if x == 0 || y == 0 {
            return Err(ConfigError::EmptyGrid { x, y });
        }
        unit("density", self.grid.density)?;
        unit("num_ratio", self.grid.num_ratio)?;
        unit("slider", self.rule.slider)?;
        positive("red_advantage", self.rule.red_advantage)?;
        positive("blue_advantage", self.rule.blue_advantage)?;
        positive("red_growth", self.rule.red_growth)?;
        positive("blue_growth", self.rule.blue_growth)?;
        Ok(())
    }
}

fn unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::UnitInterval { name, value });
    }
    Ok(())
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.grid.size = SizeSpec::Rect([40, 60]);
        config.run.seed = Some(7);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.grid.size, loaded.grid.size);
        assert_eq!(loaded.run.seed, Some(7));
    }

    #[test]
    fn test_size_spec_accepts_scalar_and_pair() {
        let square: SizeSpec = serde_yaml::from_str("100").unwrap();
        assert_eq!(square.dims(), (100, 100));

        let rect: SizeSpec = serde_yaml::from_str("[1, 40]").unwrap();
        assert_eq!(rect.dims(), (1, 40));
    }

    #[test]
    fn test_rejects_out_of_range_density() {
        let mut config = Config::default();
        config.grid.density = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnitInterval {
                name: "density",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let mut config = Config::default();
        config.grid.size = SizeSpec::Rect([0, 40]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_growth() {
        let mut config = Config::default();
        config.rule.red_growth = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "red_growth",
                value: 0.0
            })
        );
    }
}
