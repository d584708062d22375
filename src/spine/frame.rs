//! Frame propagation along the spine.
//!
//! Each node carries a (normal, tangent) basis: the normal defines the
//! plane its expansion ring lies in, the tangent the ring's zero-angle
//! direction. Interior normals come from the plane that evenly splits the
//! angle between the incoming and outgoing spine edges, so adjacent
//! ring-to-ring strips meet without kinking. Tangents are carried over from
//! the previous frame and re-projected into the new ring plane, which keeps
//! ring orientation continuous frame-to-frame at the cost of uncorrected
//! long-run twist drift.
//!
//! Propagation is a pure function of the current positions and the previous
//! tangents; callers thread the state explicitly.

use std::fmt;

use glam::Vec3;

/// Tolerance for the degenerate bisector tests (`|bisector| ≈ 0` and
/// `≈ 2`) and for zero-length normalization guards.
const DEGENERACY_EPS: f32 = 1e-5;

/// Internal invariant violation during frame propagation.
///
/// These indicate corrupted input state (coincident neighbor positions, a
/// tangent collapsed onto its ring normal), not designed-for geometry.
/// Degenerate straight or folded spines are handled by fallback branches
/// and never produce an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A node coincides with the neighbor its normal is derived from.
    DegenerateEdge {
        /// Index of the affected node.
        node: usize,
    },
    /// A node's carried tangent lies entirely along its new normal, so the
    /// in-plane projection has zero length.
    DegenerateTangent {
        /// Index of the affected node.
        node: usize,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateEdge { node } => {
                write!(f, "zero-length spine edge at node {node}")
            }
            Self::DegenerateTangent { node } => {
                write!(f, "tangent collapsed onto ring normal at node {node}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Recompute every node's (normal, tangent) basis in place.
///
/// `positions` is read-only; `normals` is fully overwritten; `tangents`
/// holds the previous frame's tangents on entry and the re-projected ones
/// on exit. All three slices must have the same length N ≥ 2 (guaranteed by
/// [`Spine`](super::Spine) construction).
///
/// Boundary normals point outward along the single adjacent edge; interior
/// normals use the bisecting-plane construction with a fallback to the
/// incoming edge direction when the edges are parallel or anti-parallel.
///
/// # Errors
///
/// Returns [`FrameError`] on a zero-length normalize outside the documented
/// degenerate branches. On error the output slices are partially written;
/// callers must discard the frame.
pub fn propagate(
    positions: &[Vec3],
    normals: &mut [Vec3],
    tangents: &mut [Vec3],
) -> Result<(), FrameError> {
    let n = positions.len();
    debug_assert!(n >= 2);
    debug_assert_eq!(normals.len(), n);
    debug_assert_eq!(tangents.len(), n);

    normals[0] = unit(positions[0] - positions[1])
        .ok_or(FrameError::DegenerateEdge { node: 0 })?;
    for i in 1..n - 1 {
        let forward = positions[i - 1] - positions[i];
        let backward = positions[i + 1] - positions[i];
        normals[i] = bisecting_plane(forward, backward)
            .ok_or(FrameError::DegenerateEdge { node: i })?;
    }
    normals[n - 1] = unit(positions[n - 1] - positions[n - 2])
        .ok_or(FrameError::DegenerateEdge { node: n - 1 })?;

    // Re-orthogonalize carried tangents against the new normals.
    for i in 0..n {
        tangents[i] = unit(project_on_plane(tangents[i], normals[i]))
            .ok_or(FrameError::DegenerateTangent { node: i })?;
    }

    Ok(())
}

/// Normal of the plane that evenly splits the angle between `forward` and
/// `backward`, the two edges leaving an interior node.
///
/// When the edges are anti-parallel (spine runs straight through the node,
/// `|bisector| ≈ 0`) or parallel (fold-back, `|bisector| ≈ 2`) the bisector
/// construction is singular and the incoming edge direction is used as the
/// ring-plane normal instead.
///
/// Returns `None` only if either edge has zero length.
fn bisecting_plane(forward: Vec3, backward: Vec3) -> Option<Vec3> {
    let f = unit(forward)?;
    let b = unit(backward)?;

    let bisector = f + b;
    let mag = bisector.length();
    if mag < DEGENERACY_EPS || (mag - 2.0).abs() < DEGENERACY_EPS {
        return Some(f);
    }

    // Component of the incoming edge orthogonal to the bisector.
    let proj = bisector * (f.dot(bisector) / bisector.length_squared());
    unit(f - proj)
}

/// Remove the component of `v` along the (unit) plane normal `n`.
fn project_on_plane(v: Vec3, n: Vec3) -> Vec3 {
    v - n * v.dot(n)
}

/// Normalize, rejecting near-zero vectors.
fn unit(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    if len < DEGENERACY_EPS {
        None
    } else {
        Some(v / len)
    }
}

/// Optional twist-relaxation pass over the tangents.
///
/// Averages each tangent with its neighbors, re-projects into the node's
/// ring plane, and renormalizes. Reduces relative twist between adjacent
/// rings that accumulates over long animated sequences. Not run by default;
/// the baseline behavior leaves drift uncorrected.
///
/// A node whose relaxed tangent would collapse to zero keeps its current
/// tangent, so the unit/orthogonality invariants always hold on exit.
pub fn relax_tangents(normals: &[Vec3], tangents: &mut [Vec3]) {
    let n = tangents.len();
    if n < 3 {
        return;
    }

    let previous = tangents.to_vec();
    for i in 1..n - 1 {
        let blended = previous[i - 1] + previous[i] * 2.0 + previous[i + 1];
        if let Some(relaxed) = unit(project_on_plane(blended, normals[i])) {
            tangents[i] = relaxed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_z(n: usize, step: f32) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(0.0, 0.0, step * i as f32)).collect()
    }

    fn propagate_fresh(positions: &[Vec3]) -> (Vec<Vec3>, Vec<Vec3>) {
        let mut normals = vec![Vec3::ZERO; positions.len()];
        let mut tangents = vec![Vec3::X; positions.len()];
        propagate(positions, &mut normals, &mut tangents).unwrap();
        (normals, tangents)
    }

    #[test]
    fn test_collinear_spine_falls_back_without_nan() {
        let positions = straight_z(5, 1.0);
        let (normals, tangents) = propagate_fresh(&positions);

        for (n, t) in normals.iter().zip(&tangents) {
            assert!(n.is_finite());
            assert!(t.is_finite());
        }
        // Interior normals equal normalize(forward) = -Z.
        for normal in &normals[1..4] {
            assert!((*normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        }
    }

    #[test]
    fn test_three_node_worked_example() {
        // Nodes at (0,0,0),(0,0,1),(0,0,2): forward at node 1 is (0,0,-1)
        // in this sign convention, anti-parallel to backward, so the
        // fallback produces normalize(forward).
        let positions = straight_z(3, 1.0);
        let (normals, _) = propagate_fresh(&positions);
        assert!((normals[1] - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_boundary_normals_point_outward() {
        let positions = straight_z(4, 2.0);
        let (normals, _) = propagate_fresh(&positions);
        // Cap normals point away from the body of the pipe.
        assert!((normals[0] - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((normals[3] - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_folded_spine_triggers_fallback() {
        // position[2] == position[0]: both edges leave node 1 in the same
        // direction, |bisector| = 2.
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mut normals = vec![Vec3::ZERO; 3];
        let mut tangents = vec![Vec3::X; 3];
        propagate(&positions, &mut normals, &mut tangents).unwrap();

        assert!(normals[1].is_finite());
        assert!((normals[1] - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_bent_spine_frames_are_orthonormal() {
        // Right-angle bend in the XZ plane.
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
        ];
        let mut normals = vec![Vec3::ZERO; 3];
        let mut tangents = vec![Vec3::Y; 3];
        propagate(&positions, &mut normals, &mut tangents).unwrap();

        for (n, t) in normals.iter().zip(&tangents) {
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((t.length() - 1.0).abs() < 1e-5);
            assert!(n.dot(*t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_interior_normal_bisects_bend() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ];
        let mut normals = vec![Vec3::ZERO; 3];
        let mut tangents = vec![Vec3::Y; 3];
        propagate(&positions, &mut normals, &mut tangents).unwrap();

        // The bisecting plane's normal makes equal angles with both edges
        // leaving the bend node.
        let f = (positions[0] - positions[1]).normalize();
        let b = (positions[2] - positions[1]).normalize();
        assert!((normals[1].dot(f) + normals[1].dot(b)).abs() < 1e-5);
    }

    #[test]
    fn test_tangent_carries_over_between_frames() {
        let positions = straight_z(4, 1.0);
        let mut normals = vec![Vec3::ZERO; 4];
        let mut tangents = vec![Vec3::X; 4];
        propagate(&positions, &mut normals, &mut tangents).unwrap();
        let first = tangents.clone();

        // A second pass over unchanged geometry must not rotate tangents.
        propagate(&positions, &mut normals, &mut tangents).unwrap();
        for (a, b) in first.iter().zip(&tangents) {
            assert!((*a - *b).length() < 1e-6);
        }
    }

    #[test]
    fn test_coincident_nodes_error() {
        let positions = vec![Vec3::ZERO, Vec3::ZERO];
        let mut normals = vec![Vec3::ZERO; 2];
        let mut tangents = vec![Vec3::X; 2];
        assert_eq!(
            propagate(&positions, &mut normals, &mut tangents),
            Err(FrameError::DegenerateEdge { node: 0 })
        );
    }

    #[test]
    fn test_tangent_along_normal_errors() {
        // Spine along Z with tangents also along Z: projection onto the
        // ring plane is zero, which is an invariant violation, not a NaN.
        let positions = straight_z(3, 1.0);
        let mut normals = vec![Vec3::ZERO; 3];
        let mut tangents = vec![Vec3::Z; 3];
        assert_eq!(
            propagate(&positions, &mut normals, &mut tangents),
            Err(FrameError::DegenerateTangent { node: 0 })
        );
    }

    #[test]
    fn test_relax_preserves_invariants() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 1.0),
            Vec3::new(0.3, 0.5, 2.0),
            Vec3::new(0.3, 0.0, 3.0),
        ];
        let mut normals = vec![Vec3::ZERO; 4];
        let mut tangents = vec![Vec3::X; 4];
        propagate(&positions, &mut normals, &mut tangents).unwrap();

        relax_tangents(&normals, &mut tangents);
        for (n, t) in normals.iter().zip(&tangents) {
            assert!((t.length() - 1.0).abs() < 1e-5);
            assert!(n.dot(*t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_relax_keeps_aligned_tangents() {
        let positions = straight_z(5, 1.0);
        let mut normals = vec![Vec3::ZERO; 5];
        let mut tangents = vec![Vec3::X; 5];
        propagate(&positions, &mut normals, &mut tangents).unwrap();

        let before = tangents.clone();
        relax_tangents(&normals, &mut tangents);
        for (a, b) in before.iter().zip(&tangents) {
            assert!((*a - *b).length() < 1e-6);
        }
    }
}
