//! Tunable constants for score computation.

use crate::scoring::metrics::DAY_MS;

/// Upper bound of every score.
pub const MAX_SCORE: f64 = 100.0;

/// Window and scale constants used by the score engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    /// Trailing window length, measured on record creation time.
    pub window_days: u32,
    /// Positive records needed for a strength of 100.
    pub strength_target_days: u32,
    /// Momentum points per streak day.
    pub momentum_points_per_day: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            window_days: 30,
            strength_target_days: 30,
            momentum_points_per_day: 10,
        }
    }
}

impl ScoringPolicy {
    /// Earliest `created_at` (epoch ms) still inside the window ending at `now_ms`.
    pub fn window_start_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(i64::from(self.window_days).saturating_mul(DAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::ScoringPolicy;
    use crate::scoring::DAY_MS;

    #[test]
    fn default_window_is_thirty_days() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.window_start_ms(40 * DAY_MS), 10 * DAY_MS);
    }
}
