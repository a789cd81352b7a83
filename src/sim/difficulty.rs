//! Score-derived difficulty ramps
//!
//! Three quantities ramp with score: world scroll speed, moving-platform
//! speed, and the width of newly spawned platforms. Each has a log1p target
//! clamped to a fixed range, and the live value eases toward the target by a
//! fixed fraction per tick so difficulty never steps visibly.

/// Scroll speed ramps once score reaches this
pub const SCROLL_RAMP_START: u32 = 10;
pub const SCROLL_BASE_SPEED: f32 = 0.7;
pub const SCROLL_LOG_ACCEL: f32 = 0.2;
pub const SCROLL_MAX_SPEED: f32 = 2.1;
pub const SCROLL_SMOOTHING: f32 = 0.12;

/// Platforms start moving once score reaches this
pub const PLATFORM_RAMP_START: u32 = 100;
pub const PLATFORM_DIFFICULTY_INTERVAL: f32 = 10.0;
pub const PLATFORM_BASE_SPEED: f32 = 0.8;
pub const PLATFORM_MAX_SPEED: f32 = 2.0;
pub const PLATFORM_LOG_ACCEL: f32 = 0.45;
pub const PLATFORM_SPEED_SMOOTHING: f32 = 0.1;

pub const PLATFORM_BASE_WIDTH: f32 = 110.0;
pub const PLATFORM_MIN_WIDTH: f32 = 62.0;
pub const PLATFORM_WIDTH_LOG_FACTOR: f32 = 8.0;
pub const PLATFORM_WIDTH_SMOOTHING: f32 = 0.08;

/// Move `current` a fixed fraction of the remaining distance toward `target`.
#[inline]
pub fn ease_towards(current: f32, target: f32, smoothing: f32) -> f32 {
    current + (target - current) * smoothing
}

/// Target scroll speed for a score. Base below the ramp start, then
/// logarithmic growth capped at [`SCROLL_MAX_SPEED`].
pub fn target_scroll_speed(score: u32) -> f32 {
    if score < SCROLL_RAMP_START {
        return SCROLL_BASE_SPEED;
    }
    let ramp = (score - SCROLL_RAMP_START + 1) as f32;
    let target = SCROLL_BASE_SPEED + SCROLL_LOG_ACCEL * ramp.ln_1p();
    target.min(SCROLL_MAX_SPEED)
}

/// Target speed for moving platforms. Zero until the (late) ramp start,
/// then logarithmic growth capped at [`PLATFORM_MAX_SPEED`].
pub fn target_platform_speed(score: u32) -> f32 {
    if score < PLATFORM_RAMP_START {
        return 0.0;
    }
    let normalized = (score - PLATFORM_RAMP_START) as f32 / PLATFORM_DIFFICULTY_INTERVAL;
    let target = PLATFORM_BASE_SPEED + PLATFORM_LOG_ACCEL * normalized.max(0.0).ln_1p();
    target.min(PLATFORM_MAX_SPEED)
}

/// Target width for newly spawned platforms. Shrinks logarithmically from
/// [`PLATFORM_BASE_WIDTH`], floored at [`PLATFORM_MIN_WIDTH`]. The shrink is
/// keyed off the scroll ramp threshold, not the platform one.
pub fn target_platform_width(score: u32) -> f32 {
    if score == 0 {
        return PLATFORM_BASE_WIDTH;
    }
    let ramp = score.saturating_sub(SCROLL_RAMP_START) as f32;
    let reduction = PLATFORM_WIDTH_LOG_FACTOR * (ramp / PLATFORM_DIFFICULTY_INTERVAL).ln_1p();
    (PLATFORM_BASE_WIDTH - reduction).max(PLATFORM_MIN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_targets_at_ramp_boundaries() {
        assert_eq!(target_scroll_speed(0), SCROLL_BASE_SPEED);
        assert_eq!(target_scroll_speed(9), SCROLL_BASE_SPEED);
        assert!(target_scroll_speed(10) > SCROLL_BASE_SPEED);

        assert_eq!(target_platform_speed(99), 0.0);
        assert_eq!(target_platform_speed(100), PLATFORM_BASE_SPEED);

        assert_eq!(target_platform_width(0), PLATFORM_BASE_WIDTH);
        // No shrink until the scroll threshold is passed
        assert_eq!(target_platform_width(10), PLATFORM_BASE_WIDTH);
        assert!(target_platform_width(11) < PLATFORM_BASE_WIDTH);
    }

    #[test]
    fn test_smoothing_converges_geometrically() {
        let target = SCROLL_MAX_SPEED;
        let mut value = SCROLL_BASE_SPEED;
        let mut previous_gap = (target - value).abs();
        for _ in 0..200 {
            value = ease_towards(value, target, SCROLL_SMOOTHING);
            let gap = (target - value).abs();
            assert!(gap <= previous_gap);
            // Each tick closes exactly the smoothing fraction of the gap
            assert!((gap - previous_gap * (1.0 - SCROLL_SMOOTHING)).abs() < 1e-4);
            previous_gap = gap;
        }
        assert!(previous_gap < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_scroll_speed_bounded_and_monotone(score in 0u32..100_000) {
            let speed = target_scroll_speed(score);
            prop_assert!(speed >= SCROLL_BASE_SPEED);
            prop_assert!(speed <= SCROLL_MAX_SPEED);
            prop_assert!(target_scroll_speed(score + 1) >= speed);
        }

        #[test]
        fn prop_platform_speed_bounded_and_monotone(score in 0u32..100_000) {
            let speed = target_platform_speed(score);
            prop_assert!(speed >= 0.0);
            prop_assert!(speed <= PLATFORM_MAX_SPEED);
            prop_assert!(target_platform_speed(score + 1) >= speed);
        }

        #[test]
        fn prop_platform_width_bounded_and_monotone(score in 0u32..100_000) {
            let width = target_platform_width(score);
            prop_assert!(width >= PLATFORM_MIN_WIDTH);
            prop_assert!(width <= PLATFORM_BASE_WIDTH);
            prop_assert!(target_platform_width(score + 1) <= width);
        }
    }
}
