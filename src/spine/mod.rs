//! Spine state: the ordered point sequence a pipe is inflated around.
//!
//! A [`Spine`] is a fixed-length structure-of-arrays holding, per node, a
//! position, a ring-plane normal, an in-plane tangent, a ring radius, and a
//! color. The two boundary nodes keep a radius of zero at all times so the
//! expanded tube is closed by degenerate end-cap rings.

pub mod frame;
pub mod motion;
pub mod radius;

use glam::{Vec3, Vec4};

use crate::error::PipeError;

/// Initial tangent direction for every node. Arbitrary; the propagator
/// re-projects it into each node's ring plane on the first update.
const INITIAL_TANGENT: Vec3 = Vec3::X;

/// Axis-aligned bounding sphere of a point set.
///
/// Recomputed after every position update so the camera can keep the whole
/// pipe in view (the analog of a mesh bounds recalculation).
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    /// Center of the bounding box of the points.
    pub center: Vec3,
    /// Radius of the sphere around `center` containing all points.
    pub radius: f32,
}

impl Bounds {
    /// Compute bounds over a non-empty point slice.
    ///
    /// Returns a unit sphere at the origin for an empty slice.
    #[must_use]
    pub fn of(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self {
                center: Vec3::ZERO,
                radius: 1.0,
            };
        };

        let mut min = first;
        let mut max = first;
        for &p in &points[1..] {
            min = min.min(p);
            max = max.max(p);
        }

        let center = (min + max) * 0.5;
        let radius = points
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0_f32, f32::max);

        Self { center, radius }
    }
}

/// Ordered, fixed-length sequence of pipe nodes.
///
/// All five per-node arrays have identical length, fixed at construction.
/// Positions, normals, tangents, and interior radii mutate every frame;
/// colors are immutable after initialization.
pub struct Spine {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tangents: Vec<Vec3>,
    radii: Vec<f32>,
    colors: Vec<Vec4>,
    /// Line-segment index pairs `(i, i+1)`, derived once from the node
    /// count.
    indices: Vec<u32>,
    base_radius: f32,
}

impl Spine {
    /// Build a spine of `node_count` nodes laid out in a straight line from
    /// the origin to `(0, 0, length)`.
    ///
    /// Interior radii start at `base_radius`; the two boundary radii are
    /// zero. Colors are a fixed gradient over the normalized position along
    /// the spine.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::InvalidConfiguration`] if `node_count < 2`,
    /// `length <= 0`, or `base_radius < 0`. No partial spine is created.
    pub fn straight(
        node_count: usize,
        length: f32,
        base_radius: f32,
    ) -> Result<Self, PipeError> {
        if node_count < 2 {
            return Err(PipeError::InvalidConfiguration(format!(
                "node_count must be at least 2, got {node_count}"
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(PipeError::InvalidConfiguration(format!(
                "length must be positive, got {length}"
            )));
        }
        if !base_radius.is_finite() || base_radius < 0.0 {
            return Err(PipeError::InvalidConfiguration(format!(
                "base_radius must be non-negative, got {base_radius}"
            )));
        }

        let mut positions = Vec::with_capacity(node_count);
        let mut colors = Vec::with_capacity(node_count);
        for i in 0..node_count {
            let t = i as f32 / (node_count - 1) as f32;
            positions.push(Vec3::new(0.0, 0.0, length * t));
            colors.push(Vec4::new(t, 0.5, 0.1, 1.0));
        }

        let mut radii = vec![base_radius; node_count];
        radii[0] = 0.0;
        radii[node_count - 1] = 0.0;

        Ok(Self {
            positions,
            normals: vec![Vec3::ZERO; node_count],
            tangents: vec![INITIAL_TANGENT; node_count],
            radii,
            colors,
            indices: line_indices(node_count),
            base_radius,
        })
    }

    /// Number of nodes. Fixed after construction.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Node positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable node positions, for motion policies.
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Ring-plane normals. Zero until the first propagation pass.
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Ring reference tangents.
    #[must_use]
    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    /// Ring radii. The two boundary entries are always zero.
    #[must_use]
    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    /// Per-node RGBA colors, fixed at construction.
    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Line-segment indices: `2 * (N - 1)` entries pairing consecutive
    /// nodes.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Configured interior ring radius.
    #[must_use]
    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Recompute all normals and tangents from the current positions and
    /// the previous frame's tangents.
    ///
    /// # Errors
    ///
    /// Returns [`frame::FrameError`] on an internal invariant violation
    /// (zero-length edge or tangent outside the documented degenerate
    /// branches). The caller should skip the frame rather than propagate
    /// NaNs downstream.
    pub fn propagate_frames(&mut self) -> Result<(), frame::FrameError> {
        frame::propagate(&self.positions, &mut self.normals, &mut self.tangents)
    }

    /// Relax tangent twist against neighbors. Optional pass; see
    /// [`frame::relax_tangents`].
    pub fn relax_twist(&mut self) {
        frame::relax_tangents(&self.normals, &mut self.tangents);
    }

    /// Advance the radius animation to `clock` seconds. Boundary radii stay
    /// zero.
    pub fn animate_radii(&mut self, clock: f32) {
        radius::animate(&mut self.radii, self.base_radius, clock);
    }

    /// Bounding sphere of the current positions.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::of(&self.positions)
    }
}

/// Index pairs `(i, i+1)` for the line segments between consecutive nodes.
///
/// Derived once from the node count and resubmitted only when it changes.
#[must_use]
pub fn line_indices(node_count: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(2 * node_count.saturating_sub(1));
    for i in 0..node_count.saturating_sub(1) {
        indices.push(i as u32);
        indices.push(i as u32 + 1);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_spine_layout() {
        let spine = Spine::straight(4, 9.0, 1.0).unwrap();
        let expected = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(0.0, 0.0, 6.0),
            Vec3::new(0.0, 0.0, 9.0),
        ];
        for (p, e) in spine.positions().iter().zip(expected) {
            assert!((*p - e).length() < 1e-6);
        }
        assert_eq!(spine.radii(), &[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(spine.indices(), &[0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_end_caps_closed_for_all_sizes() {
        for n in 2..12 {
            let spine = Spine::straight(n, 5.0, 0.7).unwrap();
            let radii = spine.radii();
            assert_eq!(radii[0], 0.0);
            assert_eq!(radii[n - 1], 0.0);
            for &r in &radii[1..n - 1] {
                assert_eq!(r, 0.7);
            }
        }
    }

    #[test]
    fn test_array_lengths_match() {
        let spine = Spine::straight(7, 3.0, 0.5).unwrap();
        assert_eq!(spine.node_count(), 7);
        assert_eq!(spine.positions().len(), 7);
        assert_eq!(spine.normals().len(), 7);
        assert_eq!(spine.tangents().len(), 7);
        assert_eq!(spine.radii().len(), 7);
        assert_eq!(spine.colors().len(), 7);
        assert_eq!(spine.indices().len(), 12);
    }

    #[test]
    fn test_colors_follow_spine_position() {
        let spine = Spine::straight(3, 2.0, 0.5).unwrap();
        let colors = spine.colors();
        assert!((colors[0] - Vec4::new(0.0, 0.5, 0.1, 1.0)).length() < 1e-6);
        assert!((colors[1] - Vec4::new(0.5, 0.5, 0.1, 1.0)).length() < 1e-6);
        assert!((colors[2] - Vec4::new(1.0, 0.5, 0.1, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        assert!(matches!(
            Spine::straight(1, 10.0, 1.0),
            Err(PipeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Spine::straight(0, 10.0, 1.0),
            Err(PipeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Spine::straight(10, 0.0, 1.0),
            Err(PipeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Spine::straight(10, -4.0, 1.0),
            Err(PipeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Spine::straight(10, 10.0, -0.1),
            Err(PipeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_nan_length_rejected() {
        assert!(matches!(
            Spine::straight(10, f32::NAN, 1.0),
            Err(PipeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_minimal_two_node_spine() {
        let spine = Spine::straight(2, 1.0, 1.0).unwrap();
        assert_eq!(spine.radii(), &[0.0, 0.0]);
        assert_eq!(spine.indices(), &[0, 1]);
    }

    #[test]
    fn test_bounds_cover_all_positions() {
        let spine = Spine::straight(5, 8.0, 1.0).unwrap();
        let bounds = spine.bounds();
        assert!((bounds.center - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
        for &p in spine.positions() {
            assert!(p.distance(bounds.center) <= bounds.radius + 1e-5);
        }
    }

    #[test]
    fn test_bounds_of_empty_slice() {
        let bounds = Bounds::of(&[]);
        assert_eq!(bounds.radius, 1.0);
    }

    #[test]
    fn test_line_indices_pairs() {
        assert_eq!(line_indices(2), vec![0, 1]);
        assert_eq!(line_indices(4), vec![0, 1, 1, 2, 2, 3]);
        assert!(line_indices(1).is_empty());
        assert!(line_indices(0).is_empty());
    }
}
