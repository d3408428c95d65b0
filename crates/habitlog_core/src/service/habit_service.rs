//! Habit management use-cases.
//!
//! # Invariants
//! - Habit edits never touch `strength_score`.
//! - Active listings exclude archived habits.

use crate::model::habit::{FrequencyType, Habit, HabitId, HabitValidationError, TrackingType};
use crate::repo::habit_repo::{HabitListQuery, HabitOverview, HabitRepository, RepoError};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum HabitServiceError {
    Validation(HabitValidationError),
    HabitNotFound(HabitId),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent habit state: {details}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::HabitNotFound(id) => Self::HabitNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Input for creating a habit. Unset enums fall back to binary/daily.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub tracking_type: Option<TrackingType>,
    pub target_value: Option<f64>,
    pub target_unit: Option<String>,
    pub frequency_type: Option<FrequencyType>,
    pub frequency_days: Vec<u8>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub reminder_time: Option<String>,
}

impl NewHabit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update. Outer `None` keeps the field; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub tracking_type: Option<TrackingType>,
    pub target_value: Option<Option<f64>>,
    pub target_unit: Option<Option<String>>,
    pub frequency_type: Option<FrequencyType>,
    pub frequency_days: Option<Vec<u8>>,
    pub color: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub reminder_time: Option<Option<String>>,
    pub archived: Option<bool>,
}

impl HabitPatch {
    fn apply_to(self, habit: &mut Habit) {
        if let Some(name) = self.name {
            habit.name = name;
        }
        if let Some(description) = self.description {
            habit.description = description;
        }
        if let Some(tracking_type) = self.tracking_type {
            habit.tracking_type = tracking_type;
        }
        if let Some(target_value) = self.target_value {
            habit.target_value = target_value;
        }
        if let Some(target_unit) = self.target_unit {
            habit.target_unit = target_unit;
        }
        if let Some(frequency_type) = self.frequency_type {
            habit.frequency_type = frequency_type;
        }
        if let Some(frequency_days) = self.frequency_days {
            habit.frequency_days = frequency_days;
        }
        if let Some(color) = self.color {
            habit.color = color;
        }
        if let Some(icon) = self.icon {
            habit.icon = icon;
        }
        if let Some(reminder_time) = self.reminder_time {
            habit.reminder_time = reminder_time;
        }
        if let Some(archived) = self.archived {
            habit.archived = archived;
        }
    }
}

/// Habit service facade over repository implementations.
pub struct HabitService<H: HabitRepository> {
    repo: H,
}

impl<H: HabitRepository> HabitService<H> {
    pub fn new(repo: H) -> Self {
        Self { repo }
    }

    /// Creates a habit with zero strength.
    pub fn create_habit(&self, input: NewHabit) -> Result<Habit, HabitServiceError> {
        let mut habit = Habit::new(input.name.trim());
        habit.description = input.description;
        habit.tracking_type = input.tracking_type.unwrap_or_default();
        habit.target_value = input.target_value;
        habit.target_unit = input.target_unit;
        habit.frequency_type = input.frequency_type.unwrap_or_default();
        habit.frequency_days = normalize_frequency_days(input.frequency_days);
        habit.color = input.color;
        habit.icon = input.icon;
        habit.reminder_time = input.reminder_time;

        let habit_id = self.repo.create_habit(&habit)?;
        info!("event=habit_create module=service status=ok habit_id={habit_id}");
        self.repo
            .get_habit(habit_id)?
            .ok_or(HabitServiceError::InconsistentState(
                "created habit not found in read-back",
            ))
    }

    pub fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitServiceError> {
        Ok(self.repo.get_habit(id)?)
    }

    /// Lists every habit, archived ones included.
    pub fn list_habits(&self) -> Result<Vec<Habit>, HabitServiceError> {
        let query = HabitListQuery {
            include_archived: true,
            ..HabitListQuery::default()
        };
        Ok(self.repo.list_habits(&query)?)
    }

    /// Lists non-archived habits, newest first, with their record on `today`.
    pub fn list_active_habits(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<HabitOverview>, HabitServiceError> {
        Ok(self.repo.list_active_with_record(today)?)
    }

    /// Applies a partial update and returns the stored habit.
    pub fn update_habit(
        &self,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<Habit, HabitServiceError> {
        let mut habit = self
            .repo
            .get_habit(id)?
            .ok_or(HabitServiceError::HabitNotFound(id))?;
        patch.apply_to(&mut habit);
        habit.frequency_days = normalize_frequency_days(habit.frequency_days);

        self.repo.update_habit(&habit)?;
        info!("event=habit_update module=service status=ok habit_id={id}");
        self.repo
            .get_habit(id)?
            .ok_or(HabitServiceError::InconsistentState(
                "updated habit not found in read-back",
            ))
    }

    pub fn set_archived(&self, id: HabitId, archived: bool) -> Result<Habit, HabitServiceError> {
        self.update_habit(
            id,
            HabitPatch {
                archived: Some(archived),
                ..HabitPatch::default()
            },
        )
    }

    /// Deletes a habit with all of its records and score snapshots.
    pub fn delete_habit(&self, id: HabitId) -> Result<(), HabitServiceError> {
        self.repo.delete_habit(id)?;
        info!("event=habit_delete module=service status=ok habit_id={id}");
        Ok(())
    }
}

fn normalize_frequency_days(mut days: Vec<u8>) -> Vec<u8> {
    days.sort_unstable();
    days.dedup();
    days
}
