//! Motion law shared by the cam and every pulley wheel
//!
//! The cam turns at a constant angular speed. A wheel's string radius is the
//! cam profile `1.5 + sin(θ)` read at the wheel's starting phase minus the
//! cam's current angle, so the cam cut at t=0 and the follower radius are the
//! same curve evaluated at different phases.
//!
//! Time is carried as `f64` seconds and wrapped to one period before it is
//! narrowed, so the angle stays accurate however long the page stays open.

use glam::Vec2;
use std::f64::consts::{FRAC_PI_4, TAU};

use crate::consts::BASE_RADIUS;
use crate::error::{Result, SculptureError};

/// Cam angular speed (rad/s)
pub const ROTATION_SPEED_RAD_PER_SEC: f64 = FRAC_PI_4;
/// Seconds per cam revolution (8 s)
pub const ROTATION_PERIOD_SEC: f64 = TAU / ROTATION_SPEED_RAD_PER_SEC;

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// `count` evenly spaced samples from `start` toward `stop`
///
/// With `endpoint` the last sample is `stop`; without it the interval is
/// half-open and the samples tile a full turn without repeating the seam.
/// A single sample is always `[start]`.
pub fn linspace(start: f32, stop: f32, count: usize, endpoint: bool) -> Result<Vec<f32>> {
    if count == 0 {
        return Err(SculptureError::EmptySampleCount);
    }
    if count == 1 {
        return Ok(vec![start]);
    }

    let div = if endpoint { count - 1 } else { count };
    let step = (stop - start) / div as f32;
    Ok((0..count).map(|i| start + step * i as f32).collect())
}

/// Cam rotation angle at `t_sec`, always in [0, 2π)
pub fn angle_at_time(t_sec: f64) -> f32 {
    let wrapped = t_sec.rem_euclid(ROTATION_PERIOD_SEC);
    let angle = (ROTATION_SPEED_RAD_PER_SEC * wrapped) as f32;
    // Narrowing can round a value just under 2π up to it
    if angle >= std::f32::consts::TAU {
        0.0
    } else {
        angle
    }
}

/// String radius of a wheel whose phase at t=0 is `theta_at_t0`, in [0.5, 2.5]
pub fn radius_at_time(theta_at_t0: f32, t_sec: f64) -> f32 {
    let theta_at_t = theta_at_t0 - angle_at_time(t_sec);
    BASE_RADIUS + theta_at_t.sin()
}

/// Cam outline at t=0: `samples` points around one turn, seam not repeated
pub fn cam_outline(samples: usize) -> Result<Vec<Vec2>> {
    let thetas = linspace(0.0, std::f32::consts::TAU, samples, false)?;
    Ok(thetas
        .into_iter()
        .map(|theta| polar_to_cartesian(radius_at_time(theta, 0.0), theta))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn angular_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).abs();
        d.min(std::f32::consts::TAU - d)
    }

    #[test]
    fn test_polar_to_cartesian_axes() {
        for r in [0.0, 0.5, 1.5, 2.5, -3.0] {
            let p = polar_to_cartesian(r, 0.0);
            assert_eq!(p, Vec2::new(r, 0.0));

            let q = polar_to_cartesian(r, FRAC_PI_2);
            assert!(q.x.abs() < 1e-6);
            assert!((q.y - r).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linspace_with_endpoint() {
        let v = linspace(0.0, 1.0, 5, true).unwrap();
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_linspace_without_endpoint() {
        let v = linspace(0.0, 1.0, 4, false).unwrap();
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_linspace_rejects_zero_count() {
        assert!(matches!(
            linspace(0.0, 1.0, 0, true),
            Err(SculptureError::EmptySampleCount)
        ));
    }

    #[test]
    fn test_linspace_single_sample() {
        // No division by zero when the endpoint is requested
        assert_eq!(linspace(2.0, 5.0, 1, true).unwrap(), vec![2.0]);
        assert_eq!(linspace(2.0, 5.0, 1, false).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_linspace_descending() {
        let v = linspace(1.0, -1.0, 3, true).unwrap();
        assert_eq!(v, vec![1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_period_is_eight_seconds() {
        assert_eq!(ROTATION_PERIOD_SEC, 8.0);
    }

    #[test]
    fn test_angle_at_start_and_half_period() {
        assert_eq!(angle_at_time(0.0), 0.0);
        assert!((angle_at_time(4.0) - PI).abs() < 1e-6);
        assert!((angle_at_time(2.0) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_angle_wraps_at_full_period() {
        assert_eq!(angle_at_time(8.0), 0.0);
        assert!((angle_at_time(12.0) - PI).abs() < 1e-6);
    }

    #[test]
    fn test_angle_after_long_session() {
        // A week of uptime still lands on the same angle as t=4
        let week = 7.0 * 24.0 * 3600.0;
        assert_eq!(week % ROTATION_PERIOD_SEC, 0.0);
        assert!((angle_at_time(week + 4.0) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_radius_at_zero_phase_and_time() {
        assert_eq!(radius_at_time(0.0, 0.0), 1.5);
    }

    #[test]
    fn test_radius_extremes() {
        assert!((radius_at_time(FRAC_PI_2, 0.0) - 2.5).abs() < 1e-6);
        assert!((radius_at_time(-FRAC_PI_2, 0.0) - 0.5).abs() < 1e-6);
        // Two seconds later the cam has turned a quarter, so phase π/2 reads sin(0)
        assert!((radius_at_time(FRAC_PI_2, 2.0) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_cam_outline_matches_radius_law() {
        let outline = cam_outline(100).unwrap();
        assert_eq!(outline.len(), 100);
        assert!((outline[0] - Vec2::new(1.5, 0.0)).length() < 1e-6);
        for p in &outline {
            let r = p.length();
            assert!((0.5 - 1e-5..=2.5 + 1e-5).contains(&r));
        }
        // Widest lobe at θ = π/2 (sample 25 of 100)
        assert!((outline[25] - Vec2::new(0.0, 2.5)).length() < 1e-5);
    }

    #[test]
    fn test_cam_outline_rejects_zero_samples() {
        assert!(cam_outline(0).is_err());
    }

    proptest! {
        #[test]
        fn prop_radius_in_range(theta in -100.0f32..100.0, t in 0.0f64..1.0e6) {
            let r = radius_at_time(theta, t);
            prop_assert!((0.5..=2.5).contains(&r));
        }

        #[test]
        fn prop_angle_is_periodic(t in 0.0f64..1.0e6) {
            let a = angle_at_time(t);
            let b = angle_at_time(t + ROTATION_PERIOD_SEC);
            prop_assert!(angular_distance(a, b) < 1e-4);
        }

        #[test]
        fn prop_angle_in_one_turn(t in -1.0e6f64..1.0e6) {
            let a = angle_at_time(t);
            prop_assert!((0.0..std::f32::consts::TAU).contains(&a));
        }
    }
}
