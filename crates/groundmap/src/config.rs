//! Configuration for ground map baking and depth mapping

use groundmap_common::{Error, Result};

/// Default maximum deviation, in pixels, for collapsing a boundary vertex
pub const DEFAULT_BOUNDARY_PRECISION: f64 = 2.0;

/// Parameters of one scene's ground map
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GroundMapConfig {
    /// Depth assigned to the darkest walkable grey (channel 0)
    pub front_z: i32,
    /// Depth assigned to the brightest walkable grey (channel 255)
    pub back_z: i32,
    /// Degree-2 boundary vertices closer than this to the line through their
    /// neighbours are collapsed during simplification
    pub precision: f64,
}

impl Default for GroundMapConfig {
    fn default() -> Self {
        Self {
            front_z: 0,
            back_z: 0,
            precision: DEFAULT_BOUNDARY_PRECISION,
        }
    }
}

impl GroundMapConfig {
    /// Creates a configuration with the default precision
    pub fn new(front_z: i32, back_z: i32) -> Self {
        Self {
            front_z,
            back_z,
            ..Default::default()
        }
    }

    /// Overrides the simplification precision
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "simplification precision must be a finite, non-negative number (got {})",
                self.precision
            )));
        }
        Ok(())
    }
}
