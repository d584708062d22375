use serde::{Deserialize, Serialize};

use crate::error::PipeError;

/// Pipe geometry and animation parameters.
///
/// Construction-time configuration; not runtime-mutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipeOptions {
    /// Number of spine nodes. Must be at least 2.
    pub node_count: u32,
    /// Spine length in world units. Must be positive.
    pub length: f32,
    /// Interior ring radius before animation. Must be non-negative.
    pub base_radius: f32,
    /// Run the optional twist-relaxation pass after frame propagation.
    pub twist_relaxation: bool,
}

impl Default for PipeOptions {
    fn default() -> Self {
        Self {
            node_count: 10,
            length: 10.0,
            base_radius: 1.0,
            twist_relaxation: false,
        }
    }
}

impl PipeOptions {
    /// Reject out-of-range parameters before any state is built.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::InvalidConfiguration`] if `node_count < 2`,
    /// `length` is not positive, or `base_radius` is negative.
    pub fn validate(&self) -> Result<(), PipeError> {
        if self.node_count < 2 {
            return Err(PipeError::InvalidConfiguration(format!(
                "node_count must be at least 2, got {}",
                self.node_count
            )));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(PipeError::InvalidConfiguration(format!(
                "length must be positive, got {}",
                self.length
            )));
        }
        if !self.base_radius.is_finite() || self.base_radius < 0.0 {
            return Err(PipeError::InvalidConfiguration(format!(
                "base_radius must be non-negative, got {}",
                self.base_radius
            )));
        }
        Ok(())
    }
}
