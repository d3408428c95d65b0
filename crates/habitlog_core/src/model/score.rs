//! Score snapshot model.

use crate::model::habit::HabitId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three derived analytics scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSet {
    /// Trailing completion volume.
    pub strength: f64,
    /// Unbroken recent streak.
    pub momentum: f64,
    /// Week-to-week evenness.
    pub consistency: f64,
}

/// Immutable snapshot written on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitScore {
    /// Storage sequence id; higher means newer.
    pub id: i64,
    pub habit_id: HabitId,
    /// UTC date the snapshot was computed on, not a record date.
    pub date: NaiveDate,
    pub strength_score: f64,
    pub momentum_score: f64,
    pub consistency_score: f64,
    /// Epoch ms of computation.
    pub created_at: i64,
}

impl HabitScore {
    pub fn scores(&self) -> ScoreSet {
        ScoreSet {
            strength: self.strength_score,
            momentum: self.momentum_score,
            consistency: self.consistency_score,
        }
    }
}
