//! Radius animation along the spine.
//!
//! A squared-sine envelope travels along the pipe: interior node `i` at
//! normalized spine position `t` gets `3 * base * sin(t*clock + π*t)²`.
//! The envelope is non-negative for every clock value, and the two boundary
//! nodes are never touched so the end caps stay closed. Purely cosmetic;
//! layered on top of the frame data without affecting frame continuity.

use std::f32::consts::PI;

/// Modulated radius for a node at normalized spine position `t` at `clock`
/// seconds. Always `>= 0`.
#[must_use]
pub fn modulated(base_radius: f32, t: f32, clock: f32) -> f32 {
    let a = (t * clock + PI * t).sin();
    3.0 * base_radius * a * a
}

/// Animate all interior radii in place. `radii[0]` and `radii[N-1]` are
/// left untouched (zero by the end-cap invariant).
pub fn animate(radii: &mut [f32], base_radius: f32, clock: f32) {
    let n = radii.len();
    if n < 3 {
        return;
    }
    for (i, r) in radii.iter_mut().enumerate().take(n - 1).skip(1) {
        let t = i as f32 / (n - 1) as f32;
        *r = modulated(base_radius, t, clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_negative() {
        for i in 0..200 {
            let clock = i as f32 * 0.37 - 20.0;
            for j in 0..=10 {
                let t = j as f32 / 10.0;
                assert!(modulated(1.0, t, clock) >= 0.0);
            }
        }
    }

    #[test]
    fn test_bounded_by_three_times_base() {
        for i in 0..100 {
            let clock = i as f32 * 0.61;
            assert!(modulated(0.5, 0.4, clock) <= 1.5 + 1e-6);
        }
    }

    #[test]
    fn test_caps_left_untouched() {
        let mut radii = vec![0.0, 1.0, 1.0, 0.0];
        animate(&mut radii, 1.0, 12.3);
        assert_eq!(radii[0], 0.0);
        assert_eq!(radii[3], 0.0);
    }

    #[test]
    fn test_interior_follows_envelope() {
        let mut radii = vec![0.0, 1.0, 1.0, 0.0];
        animate(&mut radii, 1.0, 2.0);
        let t1 = 1.0 / 3.0;
        let t2 = 2.0 / 3.0;
        assert!((radii[1] - modulated(1.0, t1, 2.0)).abs() < 1e-6);
        assert!((radii[2] - modulated(1.0, t2, 2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_two_node_spine_is_noop() {
        let mut radii = vec![0.0, 0.0];
        animate(&mut radii, 1.0, 5.0);
        assert_eq!(radii, vec![0.0, 0.0]);
    }

    #[test]
    fn test_zero_base_radius_stays_zero() {
        let mut radii = vec![0.0; 6];
        animate(&mut radii, 0.0, 7.7);
        assert!(radii.iter().all(|&r| r == 0.0));
    }
}
