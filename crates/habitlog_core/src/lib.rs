//! Core domain logic for Habitlog.
//! This crate owns the check-in and scoring invariants; storage is reached
//! through repository traits with SQLite implementations in `repo`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::habit::{
    parse_habit_id, FrequencyType, Habit, HabitId, HabitValidationError, TrackingType,
};
pub use model::record::{
    format_record_date, parse_record_date, HabitRecord, NewRecord, RecordId, RecordStatus,
    RecordUpdate,
};
pub use model::score::{HabitScore, ScoreSet};
pub use repo::habit_repo::{
    HabitListQuery, HabitOverview, HabitRepository, RepoError, RepoResult,
    SqliteHabitRepository,
};
pub use repo::record_repo::{RecordRepository, SqliteRecordRepository};
pub use repo::score_repo::{ScoreRepository, SqliteScoreRepository};
pub use scoring::{week_key, ScoringPolicy};
pub use service::checkin_service::{
    CheckinError, CheckinOutcome, CheckinRequest, CheckinService,
};
pub use service::habit_service::{HabitPatch, HabitService, HabitServiceError, NewHabit};
pub use service::score_engine::{RecomputeError, ScoreEngine};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
