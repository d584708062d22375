//! Pipe controller: drives one full update cycle per frame.
//!
//! Order per frame: motion policy moves positions → frame propagation
//! recomputes normals/tangents → radius animation modulates interior radii
//! → per-node attributes are packed into the vertex layout the rendering
//! backend consumes → bounds are recalculated. If propagation reports an
//! invariant violation the frame is skipped: the error is logged and the
//! previously packed vertex data is retained, so no NaN ever reaches the
//! GPU.

use crate::error::PipeError;
use crate::options::Options;
use crate::spine::motion::Motion;
use crate::spine::{Bounds, Spine};

/// Packed per-node vertex attributes handed to the rendering backend.
///
/// The tangent's `w` component carries the ring radius, mirroring the
/// four-float tangent channel of the downstream expansion shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PipeVertex {
    /// Node position.
    pub position: [f32; 3],
    /// Unit ring-plane normal.
    pub normal: [f32; 3],
    /// xyz = unit ring tangent, w = ring radius.
    pub tangent: [f32; 4],
    /// RGBA color.
    pub color: [f32; 4],
}

/// Owns the spine and orchestrates the per-frame update cycle.
pub struct PipeController {
    spine: Spine,
    motion: Box<dyn Motion>,
    twist_relaxation: bool,
    vertices: Vec<PipeVertex>,
    bounds: Bounds,
}

impl PipeController {
    /// Build a controller from validated options, with the motion policy
    /// the options select.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::InvalidConfiguration`] for out-of-range
    /// options or if the initial update cannot produce a valid frame.
    pub fn new(options: &Options) -> Result<Self, PipeError> {
        Self::with_motion(options, options.motion.build())
    }

    /// Build a controller with an explicit motion policy, bypassing the
    /// options' policy selection.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PipeController::new`].
    pub fn with_motion(
        options: &Options,
        motion: Box<dyn Motion>,
    ) -> Result<Self, PipeError> {
        options.validate()?;
        let spine = Spine::straight(
            options.pipe.node_count as usize,
            options.pipe.length,
            options.pipe.base_radius,
        )?;
        let bounds = spine.bounds();

        let mut controller = Self {
            spine,
            motion,
            twist_relaxation: options.pipe.twist_relaxation,
            vertices: Vec::new(),
            bounds,
        };

        if !controller.update(0.0) {
            return Err(PipeError::InvalidConfiguration(
                "initial frame propagation failed; motion policy produces \
                 degenerate geometry at clock zero"
                    .to_owned(),
            ));
        }
        Ok(controller)
    }

    /// Run one update cycle at `clock` seconds.
    ///
    /// Returns `true` if new vertex data was emitted. On an internal
    /// invariant violation the frame is skipped (`false`): the previously
    /// packed vertices and bounds stay valid.
    pub fn update(&mut self, clock: f32) -> bool {
        self.motion.update(self.spine.positions_mut(), clock);

        if let Err(e) = self.spine.propagate_frames() {
            log::error!("frame propagation failed ({e}); skipping frame");
            return false;
        }
        if self.twist_relaxation {
            self.spine.relax_twist();
        }
        self.spine.animate_radii(clock);

        self.pack_vertices();
        self.bounds = self.spine.bounds();
        true
    }

    fn pack_vertices(&mut self) {
        let spine = &self.spine;
        self.vertices.clear();
        self.vertices.reserve(spine.node_count());
        for i in 0..spine.node_count() {
            let t = spine.tangents()[i];
            self.vertices.push(PipeVertex {
                position: spine.positions()[i].into(),
                normal: spine.normals()[i].into(),
                tangent: [t.x, t.y, t.z, spine.radii()[i]],
                color: spine.colors()[i].into(),
            });
        }
    }

    /// Packed vertex attributes from the last emitted frame.
    #[must_use]
    pub fn vertices(&self) -> &[PipeVertex] {
        &self.vertices
    }

    /// Static line-segment index list.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        self.spine.indices()
    }

    /// Number of spine nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.spine.node_count()
    }

    /// Bounding sphere from the last emitted frame.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Read access to the underlying spine.
    #[must_use]
    pub fn spine(&self) -> &Spine {
        &self.spine
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::options::PipeOptions;
    use crate::spine::motion::MotionOptions;

    fn options(node_count: u32, length: f32, base_radius: f32) -> Options {
        Options {
            pipe: PipeOptions {
                node_count,
                length,
                base_radius,
                twist_relaxation: false,
            },
            ..Options::default()
        }
    }

    #[test]
    fn test_initial_frame_is_packed() {
        let controller = PipeController::new(&options(4, 9.0, 1.0)).unwrap();
        let vertices = controller.vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(controller.indices(), &[0, 1, 1, 2, 2, 3]);

        // End caps carry zero radius in the tangent's w channel.
        assert_eq!(vertices[0].tangent[3], 0.0);
        assert_eq!(vertices[3].tangent[3], 0.0);
    }

    #[test]
    fn test_vertex_attributes_are_consistent() {
        let mut controller =
            PipeController::new(&options(6, 12.0, 0.8)).unwrap();
        assert!(controller.update(1.25));

        for v in controller.vertices() {
            let normal = Vec3::from(v.normal);
            let tangent =
                Vec3::new(v.tangent[0], v.tangent[1], v.tangent[2]);
            assert!((normal.length() - 1.0).abs() < 1e-5);
            assert!((tangent.length() - 1.0).abs() < 1e-5);
            assert!(normal.dot(tangent).abs() < 1e-5);
            assert!(v.tangent[3] >= 0.0);
        }
    }

    #[test]
    fn test_update_keeps_caps_closed() {
        let mut controller =
            PipeController::new(&options(8, 10.0, 1.0)).unwrap();
        for i in 0..30 {
            assert!(controller.update(i as f32 * 0.16));
            let vertices = controller.vertices();
            assert_eq!(vertices[0].tangent[3], 0.0);
            assert_eq!(vertices[7].tangent[3], 0.0);
        }
    }

    #[test]
    fn test_sine_sweep_update_emits_frames() {
        let mut opts = options(12, 10.0, 1.0);
        opts.motion = MotionOptions::SineSweep {
            amplitude: 2.0,
            frequency: 6.0,
        };
        let mut controller = PipeController::new(&opts).unwrap();
        for i in 1..60 {
            assert!(controller.update(i as f32 * 0.033));
        }
    }

    #[test]
    fn test_invalid_options_rejected() {
        assert!(PipeController::new(&options(1, 10.0, 1.0)).is_err());
        assert!(PipeController::new(&options(10, -1.0, 1.0)).is_err());
    }

    struct Collapse;

    impl Motion for Collapse {
        fn update(&self, positions: &mut [Vec3], _clock: f32) {
            for p in positions.iter_mut() {
                *p = Vec3::ZERO;
            }
        }
    }

    #[test]
    fn test_degenerate_motion_rejected_at_construction() {
        let result = PipeController::with_motion(
            &options(4, 9.0, 1.0),
            Box::new(Collapse),
        );
        assert!(matches!(result, Err(PipeError::InvalidConfiguration(_))));
    }

    struct CollapseAfter {
        threshold: f32,
    }

    impl Motion for CollapseAfter {
        fn update(&self, positions: &mut [Vec3], clock: f32) {
            if clock > self.threshold {
                for p in positions.iter_mut() {
                    *p = Vec3::ZERO;
                }
            }
        }
    }

    #[test]
    fn test_skipped_frame_retains_previous_vertices() {
        let mut controller = PipeController::with_motion(
            &options(5, 10.0, 1.0),
            Box::new(CollapseAfter { threshold: 1.0 }),
        )
        .unwrap();

        assert!(controller.update(0.5));
        let before = controller.vertices().to_vec();
        let bounds_before = controller.bounds();

        // Geometry collapses: the frame must be skipped, not emitted.
        assert!(!controller.update(2.0));
        assert_eq!(controller.vertices(), before.as_slice());
        assert_eq!(controller.bounds().radius, bounds_before.radius);
    }

    #[test]
    fn test_twist_relaxation_keeps_invariants() {
        let mut opts = options(10, 10.0, 1.0);
        opts.pipe.twist_relaxation = true;
        opts.motion = MotionOptions::SineSweep {
            amplitude: 1.5,
            frequency: 6.0,
        };
        let mut controller = PipeController::new(&opts).unwrap();
        assert!(controller.update(3.0));

        for v in controller.vertices() {
            let normal = Vec3::from(v.normal);
            let tangent =
                Vec3::new(v.tangent[0], v.tangent[1], v.tangent[2]);
            assert!(normal.dot(tangent).abs() < 1e-5);
        }
    }
}
