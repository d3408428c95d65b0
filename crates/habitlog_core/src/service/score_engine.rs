//! Score recomputation over the trailing record window.
//!
//! # Responsibility
//! - Scan a habit's recently created records.
//! - Derive strength, momentum and consistency and persist them.
//!
//! # Invariants
//! - The window is selected by record `created_at`, not by record date.
//! - Persistence is all-or-nothing: snapshot row and habit strength together.
//! - Recomputing twice over unchanged records yields identical scores.

use crate::model::habit::HabitId;
use crate::model::score::ScoreSet;
use crate::repo::habit_repo::RepoError;
use crate::repo::record_repo::RecordRepository;
use crate::repo::score_repo::ScoreRepository;
use crate::scoring::{compute_scores, ScoringPolicy};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Failure of one recompute cycle.
#[derive(Debug)]
pub enum RecomputeError {
    /// Reading the record window failed.
    Scan(RepoError),
    /// `now_ms` cannot be represented as a calendar date.
    InvalidClock(i64),
    /// Writing the snapshot or the habit strength failed.
    Persist(RepoError),
}

impl RecomputeError {
    /// Stable short code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Scan(_) => "score_scan_failed",
            Self::InvalidClock(_) => "score_clock_invalid",
            Self::Persist(_) => "score_persist_failed",
        }
    }
}

impl Display for RecomputeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan(err) => write!(f, "failed to scan score window: {err}"),
            Self::InvalidClock(now_ms) => write!(f, "timestamp {now_ms} is out of range"),
            Self::Persist(err) => write!(f, "failed to persist scores: {err}"),
        }
    }
}

impl Error for RecomputeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scan(err) | Self::Persist(err) => Some(err),
            Self::InvalidClock(_) => None,
        }
    }
}

/// Derives and stores the analytics scores of one habit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEngine {
    policy: ScoringPolicy,
}

impl ScoreEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Recomputes scores for `habit_id` as of `now_ms` and persists them.
    ///
    /// # Errors
    /// - `InvalidClock` before any read when `now_ms` has no calendar date.
    ///
    /// # Side effects
    /// - Appends one `habit_scores` row dated on the UTC day of `now_ms`.
    /// - Overwrites `habits.strength_score` with the new strength.
    pub fn recompute<R, S>(
        &self,
        records: &R,
        scores: &S,
        habit_id: HabitId,
        now_ms: i64,
    ) -> Result<ScoreSet, RecomputeError>
    where
        R: RecordRepository + ?Sized,
        S: ScoreRepository + ?Sized,
    {
        let started_at = Instant::now();
        let today = utc_date(now_ms).ok_or(RecomputeError::InvalidClock(now_ms))?;
        let since_ms = self.policy.window_start_ms(now_ms);
        let window = records
            .list_records_created_since(habit_id, since_ms)
            .map_err(RecomputeError::Scan)?;

        let computed = compute_scores(&window, now_ms, &self.policy);

        scores
            .save_score_snapshot(habit_id, today, &computed, now_ms)
            .map_err(RecomputeError::Persist)?;

        info!(
            "event=score_recompute module=scoring status=ok habit_id={} window_records={} strength={:.2} momentum={:.2} consistency={:.2} duration_ms={}",
            habit_id,
            window.len(),
            computed.strength,
            computed.momentum,
            computed.consistency,
            started_at.elapsed().as_millis()
        );
        Ok(computed)
    }
}

fn utc_date(now_ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(now_ms).map(|instant| instant.date_naive())
}
