//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contracts consumed by check-in and scoring services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Habit writes call `Habit::validate()` before persistence.
//! - Repository APIs return semantic errors (`HabitNotFound`, `RecordNotFound`)
//!   in addition to DB transport errors.
//! - `(habit_id, date)` uniqueness is enforced by the schema, not by callers.

pub mod habit_repo;
pub mod record_repo;
mod schema;
pub mod score_repo;
