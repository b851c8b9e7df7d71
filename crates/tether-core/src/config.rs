use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_projection_tolerance() -> f64 {
    1e-4
}
const fn default_equality_threshold() -> f64 {
    1e-3
}

// ---------------------------------------------------------------------------
// ToleranceConfig
// ---------------------------------------------------------------------------

/// Numeric tolerances for constraint construction and evaluation.
///
/// The two values form a ladder: an axis counts as an equality when its
/// half-width is below `equality_threshold`, and the planner accepts a state
/// when `‖F(q)‖ < projection_tolerance`. The threshold must sit strictly
/// above the tolerance — an equality region narrower than the projection
/// tolerance makes every sampled state invalid downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Acceptance tolerance on the constraint function norm (default: 1e-4).
    #[serde(default = "default_projection_tolerance")]
    pub projection_tolerance: f64,

    /// Half-width below which a bounded axis is treated as an equality
    /// (default: 1e-3). Must be > `projection_tolerance`.
    #[serde(default = "default_equality_threshold")]
    pub equality_threshold: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            projection_tolerance: default_projection_tolerance(),
            equality_threshold: default_equality_threshold(),
        }
    }
}

impl ToleranceConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projection_tolerance <= 0.0 {
            return Err(ConfigError::InvalidProjectionTolerance(
                self.projection_tolerance,
            ));
        }
        if self.equality_threshold <= self.projection_tolerance {
            return Err(ConfigError::ThresholdNotAboveTolerance {
                threshold: self.equality_threshold,
                tolerance: self.projection_tolerance,
            });
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
