//! Daily habit record model.
//!
//! # Responsibility
//! - Define the per-day completion record and its status values.
//! - Own the status-derived rules: positivity, completion rate, toggle.
//!
//! # Invariants
//! - `completion_rate` is `1.0` iff the record was written as `Completed`.
//! - Toggle only ever produces `Completed` or `Missed`.

use crate::model::habit::HabitId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a habit record.
pub type RecordId = Uuid;

/// Calendar date format used for record dates and storage.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Completion state of one habit on one date.
///
/// Absence of a record means the day is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Completed,
    Partial,
    Missed,
    Skipped,
}

impl RecordStatus {
    /// Positive records count towards every score.
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Completed | Self::Partial)
    }

    /// Completion rate stored alongside a freshly written status.
    pub fn completion_rate(self) -> f64 {
        if self == Self::Completed {
            1.0
        } else {
            0.0
        }
    }

    /// Status produced by checking in again on an existing record.
    ///
    /// `Completed` flips to `Missed`; every other status flips to `Completed`.
    pub fn toggled(self) -> Self {
        if self == Self::Completed {
            Self::Missed
        } else {
            Self::Completed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Missed => "missed",
            Self::Skipped => "skipped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" => Some(Self::Completed),
            "partial" => Some(Self::Partial),
            "missed" => Some(Self::Missed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

/// One entry per `(habit_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: RecordId,
    pub habit_id: HabitId,
    /// Logical calendar date the record is about.
    pub date: NaiveDate,
    pub status: RecordStatus,
    /// Optional measurement for quantity/duration habits. Not scored.
    pub value: Option<f64>,
    /// `1.0` or `0.0`, derived from `status` at write time.
    pub completion_rate: f64,
    pub note: Option<String>,
    /// Epoch ms of first write. Drives the scoring window.
    pub created_at: i64,
    /// Epoch ms of last write.
    pub updated_at: i64,
}

impl HabitRecord {
    pub fn is_positive(&self) -> bool {
        self.status.is_positive()
    }
}

/// Insert payload for a first check-in on a date.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub status: RecordStatus,
    pub value: Option<f64>,
    pub note: Option<String>,
    pub completion_rate: f64,
    /// Epoch ms stamped as both `created_at` and `updated_at`.
    pub created_at: i64,
}

impl NewRecord {
    /// Builds an insert payload with `completion_rate` derived from `status`.
    pub fn new(habit_id: HabitId, date: NaiveDate, status: RecordStatus, created_at: i64) -> Self {
        Self {
            habit_id,
            date,
            status,
            value: None,
            note: None,
            completion_rate: status.completion_rate(),
            created_at,
        }
    }
}

/// Full replacement of the mutable fields of an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub status: RecordStatus,
    pub value: Option<f64>,
    pub note: Option<String>,
    pub completion_rate: f64,
    pub updated_at: i64,
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), RECORD_DATE_FORMAT).ok()
}

/// Formats a calendar date the way it is stored.
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}
