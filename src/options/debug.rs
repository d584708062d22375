use serde::{Deserialize, Serialize};

/// Debug overlay toggles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DebugOptions {
    /// Draw each node's frame as rays: normal in red, tangent in green.
    pub show_frames: bool,
    /// Draw the spine centerline through the node positions.
    pub show_spine: bool,
}
