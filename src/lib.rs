// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// GPU / graphics allowances: casts are intentional and safe
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// Float comparison: graphics math frequently compares against 0.0, 1.0
#![allow(clippy::float_cmp)]
// Pedantic allowances
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::use_self)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]

//! GPU-accelerated animated pipe rendering engine built on wgpu.
//!
//! Tubo inflates an animated spine (an ordered sequence of 3D points) into
//! a capped tube. The CPU side owns the hard part: propagating a
//! consistent (normal, tangent) frame to every spine node from local
//! neighbor geometry, handling straight and folded degenerate segments,
//! and modulating per-node radii without breaking frame continuity between
//! frames. The GPU side consumes one packed vertex per node (position,
//! normal, tangent + radius, color) and expands rings and strips in the
//! vertex shader.
//!
//! # Key entry points
//!
//! - [`engine::PipeRenderEngine`] - the rendering engine driving the frame
//!   loop
//! - [`controller::PipeController`] - the per-frame update cycle and vertex
//!   packing
//! - [`spine`] - spine state, frame propagation, radius animation, motion
//!   policies
//! - [`options::Options`] - runtime configuration (pipe geometry, motion,
//!   debug overlays)

pub mod camera;
pub mod controller;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod options;
pub mod renderer;
pub mod spine;
pub mod util;
