//! Pure score computations over a window of habit records.
//!
//! # Responsibility
//! - Derive strength, momentum and consistency from record history.
//! - Stay free of storage and clock access; callers pass `now` explicitly.
//!
//! # Invariants
//! - Every score is clamped to `[0, 100]`.
//! - Empty input yields zero for every score.

pub mod metrics;
pub mod policy;

pub use metrics::{
    compute_scores, consistency_score, momentum_score, strength_score, week_key, DAY_MS,
};
pub use policy::ScoringPolicy;
