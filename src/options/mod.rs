//! Centralized runtime options with TOML file support.
//!
//! All tweakable settings (pipe geometry, motion policy, debug overlays)
//! are consolidated here. Options serialize to/from TOML; every sub-struct
//! uses `#[serde(default)]` so partial files (e.g. only overriding
//! `[pipe]`) work correctly.

mod debug;
mod pipe;

use std::path::Path;

pub use debug::DebugOptions;
pub use pipe::PipeOptions;
use serde::{Deserialize, Serialize};

use crate::error::PipeError;
use crate::spine::motion::MotionOptions;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Pipe geometry and animation parameters.
    pub pipe: PipeOptions,
    /// Spine motion policy.
    pub motion: MotionOptions,
    /// Debug overlay toggles.
    pub debug: DebugOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::Io`] if the file cannot be read and
    /// [`PipeError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, PipeError> {
        let content = std::fs::read_to_string(path).map_err(PipeError::Io)?;
        toml::from_str(&content)
            .map_err(|e| PipeError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::OptionsParse`] on serialization failure and
    /// [`PipeError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PipeError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PipeError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PipeError::Io)?;
        }
        std::fs::write(path, content).map_err(PipeError::Io)
    }

    /// Check the configuration surface before building any state.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::InvalidConfiguration`] for out-of-range pipe
    /// parameters.
    pub fn validate(&self) -> Result<(), PipeError> {
        self.pipe.validate()
    }
}
