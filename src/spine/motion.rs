//! Motion policies: how spine positions evolve over time.
//!
//! The controller owns a boxed [`Motion`] and invokes it once per frame
//! before frame propagation. The default policy holds the initial
//! straight-line layout; [`SineSweep`] drives a lateral traveling wave.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Per-frame position update over the spine.
pub trait Motion: Send + Sync {
    /// Update `positions` in place for the given animation clock (seconds).
    ///
    /// Implementations may move nodes freely but must keep neighboring
    /// nodes distinct; coincident neighbors are an invariant violation the
    /// frame propagator rejects.
    fn update(&self, positions: &mut [Vec3], clock: f32);
}

/// Static policy: positions keep their initial layout.
pub struct Hold;

impl Motion for Hold {
    fn update(&self, _positions: &mut [Vec3], _clock: f32) {}
}

/// Lateral traveling wave: node `i` at normalized spine position `t` is
/// displaced along X by `amplitude * t * sin(frequency * t * clock + 2πt)`,
/// leaving Y and Z untouched. The wave grows toward the far end of the
/// spine and vanishes at the near cap.
pub struct SineSweep {
    /// Peak lateral displacement at the far end of the spine.
    pub amplitude: f32,
    /// Temporal frequency scale of the wave.
    pub frequency: f32,
}

impl Motion for SineSweep {
    fn update(&self, positions: &mut [Vec3], clock: f32) {
        let n = positions.len();
        if n < 2 {
            return;
        }
        for (i, p) in positions.iter_mut().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            let phase = self.frequency * t * clock
                + 2.0 * std::f32::consts::PI * t;
            p.x = self.amplitude * t * phase.sin();
        }
    }
}

/// TOML-selectable motion policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MotionOptions {
    /// Keep the initial straight-line layout.
    #[default]
    Hold,
    /// Lateral traveling wave.
    SineSweep {
        /// Peak lateral displacement at the far end of the spine.
        amplitude: f32,
        /// Temporal frequency scale of the wave.
        frequency: f32,
    },
}

impl MotionOptions {
    /// Instantiate the configured policy.
    #[must_use]
    pub fn build(&self) -> Box<dyn Motion> {
        match *self {
            Self::Hold => Box::new(Hold),
            Self::SineSweep {
                amplitude,
                frequency,
            } => Box::new(SineSweep {
                amplitude,
                frequency,
            }),
        }
    }
}
