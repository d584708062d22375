//! Rendering backend for the pipe.
//!
//! Consumes the controller's packed per-node vertex attributes and expands
//! them into a tube surface on the GPU, plus optional debug overlays.

pub mod pipe;
