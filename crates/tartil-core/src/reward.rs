//! XP reward calculation.

const BASE_XP: f64 = 10.0;
const MIN_XP: u32 = 5;
const MAX_DURATION_FACTOR: f64 = 2.0;

/// Bytes per second assumed for compressed (m4a) uploads.
pub const AUDIO_BYTES_PER_SEC: usize = 4000;

/// Accuracy multiplier tiers, checked top-down. Highest qualifying tier wins.
const ACCURACY_TIERS: [(f64, f64); 5] = [
    (95.0, 3.0),
    (90.0, 2.5),
    (80.0, 2.0),
    (70.0, 1.5),
    (50.0, 1.0),
];
const FALLBACK_MULTIPLIER: f64 = 0.5;

/// Multiplier for a given accuracy percentage.
pub fn accuracy_multiplier(accuracy: f64) -> f64 {
    ACCURACY_TIERS
        .iter()
        .find(|(threshold, _)| accuracy >= *threshold)
        .map(|&(_, multiplier)| multiplier)
        .unwrap_or(FALLBACK_MULTIPLIER)
}

/// Linear ramp of +0.5 per minute, capped at 2.0 (reached at 120 seconds).
pub fn duration_factor(duration_secs: u64) -> f64 {
    (1.0 + (duration_secs as f64 / 60.0) * 0.5).min(MAX_DURATION_FACTOR)
}

/// Calculate the XP awarded for a recitation.
///
/// Accuracy outside `[0, 100]` is clamped (NaN counts as 0). The result is
/// never below 5 XP.
pub fn calculate_xp_reward(accuracy: f64, duration_secs: u64) -> u32 {
    let accuracy = if accuracy.is_nan() {
        0.0
    } else {
        accuracy.clamp(0.0, 100.0)
    };

    let xp = (BASE_XP * accuracy_multiplier(accuracy) * duration_factor(duration_secs)).floor();
    (xp as u32).max(MIN_XP)
}

/// Rough duration of an uploaded recording when no decoded length is known.
pub fn estimate_duration_secs(audio_bytes: usize) -> u64 {
    (audio_bytes / AUDIO_BYTES_PER_SEC) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_of_five() {
        assert_eq!(calculate_xp_reward(0.0, 0), 5);
        assert_eq!(calculate_xp_reward(10.0, 0), 5);
    }

    #[test]
    fn duration_cap() {
        assert_eq!(calculate_xp_reward(100.0, 120), calculate_xp_reward(100.0, 600));
        assert_eq!(calculate_xp_reward(100.0, 120), 60);
    }

    #[test]
    fn monotonic_across_tier_boundaries() {
        let points = [49.0, 50.0, 69.0, 70.0, 79.0, 80.0, 89.0, 90.0, 94.0, 95.0, 100.0];
        for duration in [0, 30, 60, 120, 600] {
            let xp: Vec<u32> = points
                .iter()
                .map(|&a| calculate_xp_reward(a, duration))
                .collect();
            assert!(
                xp.windows(2).all(|w| w[0] <= w[1]),
                "not monotonic at {duration}s: {xp:?}"
            );
        }
    }

    #[test]
    fn tier_values_at_zero_duration() {
        assert_eq!(calculate_xp_reward(49.99, 0), 5);
        assert_eq!(calculate_xp_reward(50.0, 0), 10);
        assert_eq!(calculate_xp_reward(70.0, 0), 15);
        assert_eq!(calculate_xp_reward(80.0, 0), 20);
        assert_eq!(calculate_xp_reward(90.0, 0), 25);
        assert_eq!(calculate_xp_reward(95.0, 0), 30);
    }

    #[test]
    fn duration_ramp_floors_fractional_xp() {
        // 10 * 1.5 * (1 + 45/60 * 0.5) = 20.625
        assert_eq!(calculate_xp_reward(75.0, 45), 20);
        // 10 * 3.0 * 1.5 = 45
        assert_eq!(calculate_xp_reward(99.0, 60), 45);
    }

    #[test]
    fn out_of_range_accuracy_is_clamped() {
        assert_eq!(calculate_xp_reward(250.0, 0), 30);
        assert_eq!(calculate_xp_reward(-20.0, 0), 5);
        assert_eq!(calculate_xp_reward(f64::NAN, 0), 5);
    }

    #[test]
    fn duration_factor_ramp() {
        assert_eq!(duration_factor(0), 1.0);
        assert_eq!(duration_factor(60), 1.5);
        assert_eq!(duration_factor(120), 2.0);
        assert_eq!(duration_factor(3600), 2.0);
    }

    #[test]
    fn estimates_duration_from_upload_size() {
        assert_eq!(estimate_duration_secs(0), 0);
        assert_eq!(estimate_duration_secs(3999), 0);
        assert_eq!(estimate_duration_secs(40_000), 10);
    }
}
