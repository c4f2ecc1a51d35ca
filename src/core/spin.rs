//! Spin planning for the flip animation
//!
//! The coin shows heads at multiples of 360° and tails at +180°. Every flip
//! spins at least MIN_SPIN_DEGREES from the current whole turn.

use crate::MIN_SPIN_DEGREES;

/// Cumulative rotation target for one flip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub from: f32,
    pub to: f32,
}

impl SpinPlan {
    /// Plan a spin from `current_deg` that lands on `heads`. `from` is the
    /// same angle folded into [0, 360), so chained plans stay small and
    /// every target is an exact multiple of 180.
    pub fn new(current_deg: f32, heads: bool) -> Self {
        let from = current_deg.rem_euclid(360.0);
        Self {
            from,
            to: target_rotation(from, heads),
        }
    }

    /// Degrees travelled
    pub fn travel(&self) -> f32 {
        self.to - self.from
    }
}

/// Next resting rotation for the requested face
pub fn target_rotation(current_deg: f32, heads: bool) -> f32 {
    let remainder = current_deg % 360.0;
    let base = current_deg + MIN_SPIN_DEGREES - remainder;
    if heads {
        base + 360.0
    } else {
        base + 180.0
    }
}

/// Which face a resting rotation shows
pub fn face_at(rotation_deg: f32) -> bool {
    rotation_deg.rem_euclid(360.0) < 90.0 || rotation_deg.rem_euclid(360.0) >= 270.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rest() {
        assert_eq!(target_rotation(0.0, true), 2160.0);
        assert_eq!(target_rotation(0.0, false), 1980.0);
    }

    #[test]
    fn test_from_tails_rest() {
        // 1980 % 360 = 180 → base = 1980 + 1800 - 180 = 3600
        assert_eq!(target_rotation(1980.0, true), 3960.0);
        assert_eq!(target_rotation(1980.0, false), 3780.0);
    }

    #[test]
    fn test_lands_on_requested_face() {
        let mut rotation = 0.0;
        for heads in [true, false, false, true, true, false] {
            let plan = SpinPlan::new(rotation, heads);
            assert!(plan.travel() >= MIN_SPIN_DEGREES);
            assert_eq!(face_at(plan.to), heads);
            rotation = plan.to;
        }
    }

    #[test]
    fn test_long_session_stays_on_face() {
        let mut rotation = 0.0;
        for i in 0..100_000u32 {
            let heads = i % 3 != 0;
            let plan = SpinPlan::new(rotation, heads);
            assert!(plan.to < 360.0 + MIN_SPIN_DEGREES + 360.0);
            assert_eq!(plan.to % 180.0, 0.0);
            assert_eq!(face_at(plan.to), heads);
            rotation = plan.to;
        }
    }

    #[test]
    fn test_plan_folds_start_angle() {
        let plan = SpinPlan::new(3960.0, false);
        assert_eq!(plan.from, 0.0);
        assert_eq!(plan.to, 1980.0);
    }
}
