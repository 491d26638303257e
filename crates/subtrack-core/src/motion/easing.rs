//! L4 Atomic Layer: Pure easing functions
//!
//! Maps normalized time [0, 1] to progress [0, 1]. Every curve satisfies
//! f(0) = 0, f(1) = 1 and is monotonically non-decreasing.

pub use crate::config::EasingType;

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value
    ///
    /// `t` is clamped to [0, 1] before the curve is evaluated.
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            EasingType::Linear => t,
            EasingType::EaseInOutQuad => ease_in_out_quad(t),
            EasingType::EaseOutCubic => ease_out_cubic(t),
        }
    }
}

/// Quadratic ease-in-out, symmetric around t = 0.5
///
/// `2t²` on the first half, `1 - (-2t + 2)² / 2` on the second.
#[inline]
pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let inv = -2.0 * t + 2.0;
        1.0 - inv * inv / 2.0
    }
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingType; 3] = [
        EasingType::Linear,
        EasingType::EaseInOutQuad,
        EasingType::EaseOutCubic,
    ];

    #[test]
    fn test_easing_boundaries() {
        for easing in ALL {
            assert!((easing.apply(0.0) - 0.0).abs() < 1e-9, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let t = i as f64 / 100.0;
                let v = easing.apply(t);
                assert!(v >= prev, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_ease_in_out_symmetry() {
        for i in 0..=50 {
            let t = i as f64 / 100.0;
            let sum = ease_in_out_quad(t) + ease_in_out_quad(1.0 - t);
            assert!((sum - 1.0).abs() < 1e-9, "asymmetric at t={}", t);
        }
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_ease_out_cubic_values() {
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-9);
        // Fast start: more than half done at a quarter of the time
        assert!(ease_out_cubic(0.25) > 0.5);
    }

    #[test]
    fn test_apply_clamps_out_of_range() {
        for easing in ALL {
            assert_eq!(easing.apply(-3.0), 0.0);
            assert!((easing.apply(7.5) - 1.0).abs() < 1e-9);
            assert_eq!(easing.apply(f64::NAN), 0.0);
        }
    }
}
