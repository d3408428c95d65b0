//! Check-in recording with create-or-toggle semantics.
//!
//! # Responsibility
//! - Turn one check-in request into exactly one `HabitRecord` state.
//! - Trigger a score recompute after every successful write.
//!
//! # Invariants
//! - The record key is `(habit_id, date)`; a second check-in never inserts.
//! - An existing record is toggled and the caller-supplied status is ignored.
//!   This is intentional: repeated taps alternate between done and not done.
//! - Recompute failures are logged and never fail the check-in.

use crate::model::habit::{parse_habit_id, HabitId};
use crate::model::record::{
    parse_record_date, HabitRecord, NewRecord, RecordStatus, RecordUpdate,
};
use crate::model::score::{HabitScore, ScoreSet};
use crate::repo::habit_repo::{RepoError, RepoResult};
use crate::repo::record_repo::RecordRepository;
use crate::repo::score_repo::ScoreRepository;
use crate::service::score_engine::ScoreEngine;
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors surfaced to check-in callers.
#[derive(Debug)]
pub enum CheckinError {
    /// Request was rejected before any storage call.
    InvalidInput(String),
    /// Target habit does not exist.
    HabitNotFound(HabitId),
    /// Persistence-layer failure of the record write.
    Storage(RepoError),
}

impl Display for CheckinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid check-in: {message}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::Storage(err) => write!(f, "check-in storage failure: {err}"),
        }
    }
}

impl Error for CheckinError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CheckinError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::HabitNotFound(id) => Self::HabitNotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Input of one check-in.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinRequest {
    pub habit_id: HabitId,
    /// Calendar date in `YYYY-MM-DD`.
    pub date: String,
    /// Status for a first check-in. Defaults to `completed`; ignored on toggle.
    pub status: Option<RecordStatus>,
    /// Overwrites the stored value on both paths.
    pub value: Option<f64>,
    /// Overwrites the stored note on both paths.
    pub note: Option<String>,
}

impl CheckinRequest {
    pub fn new(habit_id: HabitId, date: impl Into<String>) -> Self {
        Self {
            habit_id,
            date: date.into(),
            status: None,
            value: None,
            note: None,
        }
    }

    /// Builds a request from a caller-supplied habit id string.
    ///
    /// # Errors
    /// - `InvalidInput` when `habit_id` is blank or not a UUID.
    pub fn parse(habit_id: &str, date: impl Into<String>) -> Result<Self, CheckinError> {
        if habit_id.trim().is_empty() {
            return Err(CheckinError::InvalidInput("habit id is required".to_string()));
        }
        let habit_id = parse_habit_id(habit_id).ok_or_else(|| {
            CheckinError::InvalidInput(format!("habit id `{}` is not a UUID", habit_id.trim()))
        })?;
        Ok(Self::new(habit_id, date))
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Result of a successful check-in.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinOutcome {
    /// Record state after the write.
    pub record: HabitRecord,
    /// `true` when the record was inserted, `false` when toggled.
    pub created: bool,
    /// Freshly computed scores, or `None` when the recompute failed.
    pub scores: Option<ScoreSet>,
}

/// Check-in recorder over record and score repositories.
pub struct CheckinService<R: RecordRepository, S: ScoreRepository> {
    records: R,
    scores: S,
    engine: ScoreEngine,
}

impl<R: RecordRepository, S: ScoreRepository> CheckinService<R, S> {
    /// Creates a service using the default scoring policy.
    pub fn new(records: R, scores: S) -> Self {
        Self::with_engine(records, scores, ScoreEngine::default())
    }

    pub fn with_engine(records: R, scores: S, engine: ScoreEngine) -> Self {
        Self {
            records,
            scores,
            engine,
        }
    }

    /// Records a check-in as of the current wall clock.
    pub fn checkin(&self, request: &CheckinRequest) -> Result<CheckinOutcome, CheckinError> {
        self.checkin_at(request, Utc::now().timestamp_millis())
    }

    /// Records a check-in as of `now_ms` (epoch milliseconds).
    ///
    /// # Contract
    /// - No record for the key: inserts with the requested status
    ///   (default `completed`); `completion_rate` is 1 only for `completed`.
    /// - Existing record: `completed` flips to `missed`, anything else flips
    ///   to `completed`; `value` and `note` are overwritten.
    /// - Both paths then recompute scores; see `CheckinOutcome::scores`.
    ///
    /// # Errors
    /// - `InvalidInput` when `date` is blank or not `YYYY-MM-DD`.
    /// - `HabitNotFound` when the habit does not exist.
    /// - `Storage` for any other persistence failure.
    pub fn checkin_at(
        &self,
        request: &CheckinRequest,
        now_ms: i64,
    ) -> Result<CheckinOutcome, CheckinError> {
        let started_at = Instant::now();
        let date = validate_date(&request.date)?;

        let (record, created) = match self.write_record(request, date, now_ms) {
            Ok(written) => written,
            Err(err) => {
                error!(
                    "event=checkin module=service status=error habit_id={} date={} duration_ms={} error={}",
                    request.habit_id,
                    date,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        info!(
            "event=checkin module=service status=ok habit_id={} date={} record_status={} created={} duration_ms={}",
            record.habit_id,
            date,
            record.status.as_str(),
            created,
            started_at.elapsed().as_millis()
        );

        let scores = self.recompute_scores(request.habit_id, now_ms);
        Ok(CheckinOutcome {
            record,
            created,
            scores,
        })
    }

    /// Lists the habit's records between two dates, inclusive.
    pub fn records_between(
        &self,
        habit_id: HabitId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<HabitRecord>> {
        self.records.list_records_between(habit_id, from, to)
    }

    /// Lists score snapshots newest first.
    pub fn score_history(
        &self,
        habit_id: HabitId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<HabitScore>> {
        self.scores.list_scores(habit_id, limit)
    }

    fn write_record(
        &self,
        request: &CheckinRequest,
        date: NaiveDate,
        now_ms: i64,
    ) -> RepoResult<(HabitRecord, bool)> {
        match self.records.find_record(request.habit_id, date)? {
            None => {
                let status = request.status.unwrap_or_default();
                let mut new_record = NewRecord::new(request.habit_id, date, status, now_ms);
                new_record.value = request.value;
                new_record.note = request.note.clone();
                let record = self.records.create_record(&new_record)?;
                Ok((record, true))
            }
            Some(existing) => {
                let status = existing.status.toggled();
                let update = RecordUpdate {
                    status,
                    value: request.value,
                    note: request.note.clone(),
                    completion_rate: status.completion_rate(),
                    updated_at: now_ms,
                };
                let record = self.records.update_record(existing.id, &update)?;
                Ok((record, false))
            }
        }
    }

    fn recompute_scores(&self, habit_id: HabitId, now_ms: i64) -> Option<ScoreSet> {
        let recomputed = self
            .engine
            .recompute(&self.records, &self.scores, habit_id, now_ms);
        match recomputed {
            Ok(scores) => Some(scores),
            Err(err) => {
                warn!(
                    "event=score_recompute module=scoring status=error habit_id={} error_code={} error={}",
                    habit_id,
                    err.code(),
                    err
                );
                None
            }
        }
    }
}

fn validate_date(value: &str) -> Result<NaiveDate, CheckinError> {
    if value.trim().is_empty() {
        return Err(CheckinError::InvalidInput("date is required".to_string()));
    }
    parse_record_date(value).ok_or_else(|| {
        CheckinError::InvalidInput(format!("date must be YYYY-MM-DD, got `{value}`"))
    })
}
