//! Domain model for habits, daily records and score snapshots.
//!
//! # Responsibility
//! - Define canonical data structures used by check-in and scoring logic.
//! - Own status semantics (positivity, completion rate, toggle direction).
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - At most one `HabitRecord` exists per `(habit_id, date)`.
//! - `HabitScore` rows are append-only snapshots.

pub mod habit;
pub mod record;
pub mod score;
