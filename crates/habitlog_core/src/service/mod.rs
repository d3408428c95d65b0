//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into check-in, scoring and habit APIs.
//! - Keep callers decoupled from storage details.

pub mod checkin_service;
pub mod habit_service;
pub mod score_engine;
