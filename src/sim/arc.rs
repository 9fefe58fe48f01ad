//! Parabolic jump arc
//!
//! Offsets are in screen space (y grows downward), so the arc is negative
//! while airborne:
//! - offset(p) = -4 * peak * p * (1 - p), p in [0, 1]
//! - a double jump doubles the peak on the same clock, so the actor still
//!   lands at p = 1

use serde::{Deserialize, Serialize};

/// Raw arc shape: 0 at both ends, `-peak` at the midpoint
#[inline]
pub fn arc_offset(progress: f32, peak: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    -4.0 * peak * p * (1.0 - p)
}

/// One airborne phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpArc {
    /// Apex height above the road
    pub peak_height: f32,
    pub start_tick: u64,
    pub duration_ticks: u64,
}

impl JumpArc {
    pub fn single(peak_height: f32, start_tick: u64, duration_ticks: u64) -> Self {
        Self {
            peak_height,
            start_tick,
            duration_ticks: duration_ticks.max(1),
        }
    }

    /// Second jump fired mid-air; keeps the take-off tick of the first
    pub fn double(peak_height: f32, start_tick: u64, duration_ticks: u64) -> Self {
        Self::single(peak_height * 2.0, start_tick, duration_ticks)
    }

    /// Progress in [0, 1]
    pub fn progress(&self, now_tick: u64) -> f32 {
        let elapsed = now_tick.saturating_sub(self.start_tick) as f32;
        (elapsed / self.duration_ticks as f32).min(1.0)
    }

    pub fn offset_at(&self, progress: f32) -> f32 {
        arc_offset(progress, self.peak_height)
    }

    pub fn offset(&self, now_tick: u64) -> f32 {
        self.offset_at(self.progress(now_tick))
    }

    pub fn is_complete(&self, now_tick: u64) -> bool {
        self.progress(now_tick) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_arc_shape() {
        let arc = JumpArc::single(100.0, 10, 40);
        assert_eq!(arc.offset(10), 0.0);
        assert!((arc.offset(30) + 100.0).abs() < 1e-3);
        assert_eq!(arc.offset(50), 0.0);
        assert!(arc.is_complete(50));
        assert!(!arc.is_complete(49));
    }

    #[test]
    fn test_double_arc_peak() {
        let arc = JumpArc::double(100.0, 0, 40);
        assert!((arc.offset_at(0.5) + 200.0).abs() < 1e-3);
        assert_eq!(arc.offset_at(1.0), 0.0);
    }

    #[test]
    fn test_double_arc_shares_clock() {
        let single = JumpArc::single(100.0, 5, 40);
        let double = JumpArc::double(100.0, 5, 40);
        assert!((double.offset(25) + 200.0).abs() < 1e-3);
        assert!((double.offset(15) - 2.0 * single.offset(15)).abs() < 1e-3);
        assert!(double.is_complete(45));
    }

    #[test]
    fn test_progress_clamped_before_start() {
        let arc = JumpArc::single(100.0, 10, 40);
        assert_eq!(arc.progress(3), 0.0);
        assert_eq!(arc.progress(1000), 1.0);
    }

    proptest! {
        #[test]
        fn arc_never_below_road(p in 0.0f32..=1.0, peak in 1.0f32..500.0) {
            let offset = arc_offset(p, peak);
            prop_assert!(offset <= 0.0);
            prop_assert!(offset >= -peak - 1e-3);
        }

        #[test]
        fn arc_is_symmetric(p in 0.0f32..=1.0, peak in 1.0f32..500.0) {
            prop_assert!((arc_offset(p, peak) - arc_offset(1.0 - p, peak)).abs() < 1e-2);
        }
    }
}
