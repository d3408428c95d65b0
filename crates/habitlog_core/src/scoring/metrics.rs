//! Strength, momentum and consistency scoring.
//!
//! # Invariants
//! - A record is positive iff its status is `completed` or `partial`.
//! - Week buckets start on Sunday; day 1 of the year is always in week 1.

use crate::model::record::HabitRecord;
use crate::model::score::ScoreSet;
use crate::scoring::policy::{ScoringPolicy, MAX_SCORE};
use chrono::{Datelike, NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// Milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Computes all three scores for one window of records.
pub fn compute_scores(records: &[HabitRecord], now_ms: i64, policy: &ScoringPolicy) -> ScoreSet {
    ScoreSet {
        strength: strength_score(records, policy),
        momentum: momentum_score(records, now_ms, policy),
        consistency: consistency_score(records),
    }
}

/// Positive-record volume against a fixed target, capped at 100.
///
/// The denominator is `policy.strength_target_days`, not the number of
/// records or elapsed days, so a young habit cannot reach 100 early.
pub fn strength_score(records: &[HabitRecord], policy: &ScoringPolicy) -> f64 {
    if policy.strength_target_days == 0 {
        return 0.0;
    }
    let positive = records.iter().filter(|record| record.is_positive()).count();
    clamp_score(positive as f64 / f64::from(policy.strength_target_days) * MAX_SCORE)
}

/// Unbroken streak walking back from `now_ms`.
///
/// Records are visited newest date first. The streak continues while each
/// record is positive and lies at most one whole day before the previously
/// accepted point (initially `now_ms`).
pub fn momentum_score(records: &[HabitRecord], now_ms: i64, policy: &ScoringPolicy) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let mut ordered: Vec<&HabitRecord> = records.iter().collect();
    ordered.sort_by(|left, right| right.date.cmp(&left.date));

    let mut cursor_ms = now_ms;
    let mut streak: u32 = 0;
    for record in ordered {
        let record_ms = date_start_ms(record.date);
        let day_diff = cursor_ms.saturating_sub(record_ms).div_euclid(DAY_MS);
        if day_diff > 1 || !record.is_positive() {
            break;
        }
        streak += 1;
        cursor_ms = record_ms;
    }

    clamp_score(f64::from(streak) * f64::from(policy.momentum_points_per_day))
}

/// Mean per-week positive fraction, scaled to 100.
///
/// Only weeks holding at least one record take part in the mean.
pub fn consistency_score(records: &[HabitRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    // (positive, total) per week
    let mut weeks: BTreeMap<(i32, u32), (u32, u32)> = BTreeMap::new();
    for record in records {
        let bucket = weeks.entry(week_key(record.date)).or_insert((0, 0));
        if record.is_positive() {
            bucket.0 += 1;
        }
        bucket.1 += 1;
    }

    let fraction_sum: f64 = weeks
        .values()
        .map(|(positive, total)| f64::from(*positive) / f64::from(*total))
        .sum();
    clamp_score(fraction_sum / weeks.len() as f64 * MAX_SCORE)
}

/// Returns the `(year, week)` bucket of a date.
///
/// `week = ceil((day_of_year0 + weekday(jan 1) + 1) / 7)` with weekdays
/// counted from Sunday = 0, so weeks run Sunday through Saturday and
/// January 1st is always week 1.
pub fn week_key(date: NaiveDate) -> (i32, u32) {
    let day_of_year0 = date.ordinal0();
    let weekday = date.weekday().num_days_from_sunday();
    let jan1_weekday = (weekday + 7 - day_of_year0 % 7) % 7;
    let week = (day_of_year0 + jan1_weekday + 1 + 6) / 7;
    (date.year(), week)
}

fn date_start_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::{
        compute_scores, consistency_score, date_start_ms, momentum_score, strength_score,
        week_key, DAY_MS,
    };
    use crate::model::record::{HabitRecord, RecordStatus};
    use crate::scoring::ScoringPolicy;
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn record(on: NaiveDate, status: RecordStatus) -> HabitRecord {
        let created_at = date_start_ms(on);
        HabitRecord {
            id: Uuid::new_v4(),
            habit_id: Uuid::nil(),
            date: on,
            status,
            value: None,
            completion_rate: status.completion_rate(),
            note: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn daily_run(last: NaiveDate, days: i64, status: RecordStatus) -> Vec<HabitRecord> {
        (0..days)
            .map(|offset| record(last - Duration::days(offset), status))
            .collect()
    }

    fn noon(on: NaiveDate) -> i64 {
        date_start_ms(on) + DAY_MS / 2
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn strength_counts_completed_and_partial_only() {
        let today = date("2024-03-10");
        let records = vec![
            record(today, RecordStatus::Completed),
            record(today - Duration::days(1), RecordStatus::Partial),
            record(today - Duration::days(2), RecordStatus::Missed),
            record(today - Duration::days(3), RecordStatus::Skipped),
        ];
        assert_close(
            strength_score(&records, &ScoringPolicy::default()),
            2.0 / 30.0 * 100.0,
        );
    }

    #[test]
    fn strength_reaches_exactly_one_hundred_at_thirty_and_caps_above() {
        let policy = ScoringPolicy::default();
        let today = date("2024-03-10");
        let thirty = daily_run(today, 30, RecordStatus::Completed);
        assert_eq!(strength_score(&thirty, &policy), 100.0);

        let forty = daily_run(today, 40, RecordStatus::Completed);
        assert_eq!(strength_score(&forty, &policy), 100.0);
    }

    #[test]
    fn strength_is_monotone_in_positive_count() {
        let policy = ScoringPolicy::default();
        let today = date("2024-03-10");
        let mut previous = 0.0;
        for count in 0..=35 {
            let score = strength_score(&daily_run(today, count, RecordStatus::Partial), &policy);
            assert!(score >= previous);
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn momentum_saturates_after_ten_consecutive_days() {
        let today = date("2024-03-10");
        let records = daily_run(today, 12, RecordStatus::Completed);
        assert_eq!(
            momentum_score(&records, noon(today), &ScoringPolicy::default()),
            100.0
        );
    }

    #[test]
    fn momentum_counts_streak_ending_yesterday() {
        let today = date("2024-03-10");
        let records = daily_run(today - Duration::days(1), 4, RecordStatus::Completed);
        assert_eq!(
            momentum_score(&records, noon(today), &ScoringPolicy::default()),
            40.0
        );
    }

    #[test]
    fn momentum_is_zero_when_latest_record_is_two_days_old() {
        let today = date("2024-03-10");
        let records = daily_run(today - Duration::days(2), 5, RecordStatus::Completed);
        assert_eq!(
            momentum_score(&records, noon(today), &ScoringPolicy::default()),
            0.0
        );
    }

    #[test]
    fn momentum_stops_at_first_gap_or_negative_record() {
        let policy = ScoringPolicy::default();
        let today = date("2024-03-10");

        let gap = vec![
            record(today, RecordStatus::Completed),
            record(today - Duration::days(1), RecordStatus::Partial),
            record(today - Duration::days(3), RecordStatus::Completed),
        ];
        assert_eq!(momentum_score(&gap, noon(today), &policy), 20.0);

        let missed = vec![
            record(today, RecordStatus::Completed),
            record(today - Duration::days(1), RecordStatus::Missed),
            record(today - Duration::days(2), RecordStatus::Completed),
        ];
        assert_eq!(momentum_score(&missed, noon(today), &policy), 10.0);
    }

    #[test]
    fn momentum_handles_clock_extremes_without_overflow() {
        let records = vec![record(date("2024-03-10"), RecordStatus::Completed)];
        let policy = ScoringPolicy::default();

        assert_close(momentum_score(&records, i64::MAX, &policy), 0.0);
        // A saturated gap is negative, like a future-dated record.
        assert_close(momentum_score(&records, i64::MIN, &policy), 10.0);
    }

    #[test]
    fn momentum_ignores_input_order() {
        let today = date("2024-03-10");
        let mut records = daily_run(today, 3, RecordStatus::Completed);
        records.reverse();
        assert_eq!(
            momentum_score(&records, noon(today), &ScoringPolicy::default()),
            30.0
        );
    }

    #[test]
    fn consistency_averages_week_fractions() {
        // 2024-01-02 is a Tuesday of week 1, 2024-01-09 a Tuesday of week 2.
        let records = vec![
            record(date("2024-01-02"), RecordStatus::Completed),
            record(date("2024-01-09"), RecordStatus::Missed),
        ];
        assert_close(consistency_score(&records), 50.0);
    }

    #[test]
    fn consistency_single_week_uses_its_fraction() {
        let records = vec![
            record(date("2024-01-07"), RecordStatus::Completed),
            record(date("2024-01-08"), RecordStatus::Partial),
            record(date("2024-01-09"), RecordStatus::Completed),
            record(date("2024-01-10"), RecordStatus::Missed),
            record(date("2024-01-11"), RecordStatus::Skipped),
        ];
        assert_close(consistency_score(&records), 60.0);
    }

    #[test]
    fn consistency_weights_weeks_equally_regardless_of_record_count() {
        // Week 3 holds one positive record, week 4 holds four negative ones.
        let records = vec![
            record(date("2024-01-14"), RecordStatus::Completed),
            record(date("2024-01-21"), RecordStatus::Missed),
            record(date("2024-01-22"), RecordStatus::Missed),
            record(date("2024-01-23"), RecordStatus::Skipped),
            record(date("2024-01-24"), RecordStatus::Missed),
        ];
        assert_close(consistency_score(&records), 50.0);
    }

    #[test]
    fn empty_window_scores_zero() {
        let scores = compute_scores(&[], noon(date("2024-03-10")), &ScoringPolicy::default());
        assert_eq!(scores.strength, 0.0);
        assert_eq!(scores.momentum, 0.0);
        assert_eq!(scores.consistency, 0.0);
    }

    #[test]
    fn week_key_anchors_january_first_to_week_one() {
        assert_eq!(week_key(date("2024-01-01")), (2024, 1));
        assert_eq!(week_key(date("2023-01-01")), (2023, 1));
        assert_eq!(week_key(date("2022-01-01")), (2022, 1));
    }

    #[test]
    fn week_key_rolls_over_on_sunday() {
        // 2024-01-06 is a Saturday, 2024-01-07 a Sunday.
        assert_eq!(week_key(date("2024-01-06")), (2024, 1));
        assert_eq!(week_key(date("2024-01-07")), (2024, 2));
        assert_eq!(week_key(date("2024-01-13")), (2024, 2));
        assert_eq!(week_key(date("2024-12-31")), (2024, 53));
    }

    #[test]
    fn week_key_splits_weeks_across_year_boundary() {
        assert_ne!(week_key(date("2024-12-31")), week_key(date("2025-01-01")));
        assert_eq!(week_key(date("2025-01-01")), (2025, 1));
    }
}
