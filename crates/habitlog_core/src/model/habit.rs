//! Habit domain model.
//!
//! # Responsibility
//! - Define the tracked behavior definition and its descriptive fields.
//! - Validate user-editable fields before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `strength_score` stays within `[0, 100]` and is written only by scoring.
//! - `frequency_days` is non-empty when `frequency_type == Custom`.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a habit.
pub type HabitId = Uuid;

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));
static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

/// How a habit's daily value is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingType {
    /// Done / not done.
    #[default]
    Binary,
    /// Counted amount, e.g. glasses of water.
    Quantity,
    /// Time spent, e.g. minutes of reading.
    Duration,
}

/// Intended cadence of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyType {
    #[default]
    Daily,
    Weekly,
    /// Specific weekdays listed in `Habit::frequency_days`.
    Custom,
}

/// Validation failures for user-editable habit fields.
#[derive(Debug, Clone, PartialEq)]
pub enum HabitValidationError {
    BlankName,
    NonPositiveTarget(f64),
    MissingFrequencyDays,
    InvalidFrequencyDay(u8),
    InvalidColor(String),
    InvalidReminderTime(String),
    StrengthOutOfRange(f64),
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "habit name must not be blank"),
            Self::NonPositiveTarget(value) => {
                write!(f, "target value must be greater than zero, got {value}")
            }
            Self::MissingFrequencyDays => {
                write!(f, "custom frequency requires at least one weekday")
            }
            Self::InvalidFrequencyDay(day) => {
                write!(f, "frequency day must be within 0..=6, got {day}")
            }
            Self::InvalidColor(value) => write!(f, "color must be `#RRGGBB`, got `{value}`"),
            Self::InvalidReminderTime(value) => {
                write!(f, "reminder time must be `HH:MM`, got `{value}`")
            }
            Self::StrengthOutOfRange(value) => {
                write!(f, "strength score must be within [0, 100], got {value}")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Tracked behavior definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub description: Option<String>,
    pub tracking_type: TrackingType,
    /// Goal amount for quantity/duration habits.
    pub target_value: Option<f64>,
    pub target_unit: Option<String>,
    pub frequency_type: FrequencyType,
    /// Weekday indexes, Sunday = 0.
    pub frequency_days: Vec<u8>,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// Local reminder time in `HH:MM`.
    pub reminder_time: Option<String>,
    /// Latest computed strength in `[0, 100]`.
    pub strength_score: f64,
    /// Archived habits are excluded from active views.
    pub archived: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Habit {
    /// Creates a daily binary habit with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a habit with a caller-provided stable ID.
    fn with_id(id: HabitId, name: impl Into<String>) -> Self {
        let now_ms = Utc::now().timestamp_millis();
        Self {
            id,
            name: name.into(),
            description: None,
            tracking_type: TrackingType::Binary,
            target_value: None,
            target_unit: None,
            frequency_type: FrequencyType::Daily,
            frequency_days: Vec::new(),
            color: None,
            icon: None,
            reminder_time: None,
            strength_score: 0.0,
            archived: false,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Validates user-editable fields and the stored strength range.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::BlankName);
        }
        if let Some(target) = self.target_value {
            if target.is_nan() || target <= 0.0 {
                return Err(HabitValidationError::NonPositiveTarget(target));
            }
        }
        if self.frequency_type == FrequencyType::Custom && self.frequency_days.is_empty() {
            return Err(HabitValidationError::MissingFrequencyDays);
        }
        if let Some(day) = self.frequency_days.iter().copied().find(|day| *day > 6) {
            return Err(HabitValidationError::InvalidFrequencyDay(day));
        }
        if let Some(color) = self.color.as_deref() {
            if !COLOR_RE.is_match(color) {
                return Err(HabitValidationError::InvalidColor(color.to_string()));
            }
        }
        if let Some(time) = self.reminder_time.as_deref() {
            if !REMINDER_TIME_RE.is_match(time) {
                return Err(HabitValidationError::InvalidReminderTime(time.to_string()));
            }
        }
        if !(0.0..=100.0).contains(&self.strength_score) {
            return Err(HabitValidationError::StrengthOutOfRange(self.strength_score));
        }
        Ok(())
    }
}

/// Parses a caller-supplied habit id.
///
/// Returns `None` for blank or malformed input.
pub fn parse_habit_id(value: &str) -> Option<HabitId> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Uuid::parse_str(trimmed).ok()
}
