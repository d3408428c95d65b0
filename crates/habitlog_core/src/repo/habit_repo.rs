//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `habits` table.
//! - Project active habits together with their record for one date.
//!
//! # Invariants
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - `update_habit` never writes `strength_score`; only scoring does.
//! - Deleting a habit cascades to its records and score snapshots.

use crate::db::DbError;
use crate::model::habit::{FrequencyType, Habit, HabitId, HabitValidationError, TrackingType};
use crate::model::record::{format_record_date, HabitRecord, RecordId};
use crate::repo::record_repo::parse_record_columns;
use crate::repo::schema::{bool_to_int, ensure_connection_ready, parse_bool, parse_uuid};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    tracking_type,
    target_value,
    target_unit,
    frequency_type,
    frequency_days,
    color,
    icon,
    reminder_time,
    strength_score,
    archived,
    created_at,
    updated_at
FROM habits";

// One row per active habit; record columns are NULL when the day is pending.
const ACTIVE_WITH_RECORD_SQL: &str = "SELECT
    h.id AS id,
    h.name AS name,
    h.description AS description,
    h.tracking_type AS tracking_type,
    h.target_value AS target_value,
    h.target_unit AS target_unit,
    h.frequency_type AS frequency_type,
    h.frequency_days AS frequency_days,
    h.color AS color,
    h.icon AS icon,
    h.reminder_time AS reminder_time,
    h.strength_score AS strength_score,
    h.archived AS archived,
    h.created_at AS created_at,
    h.updated_at AS updated_at,
    r.id AS record_id,
    r.habit_id AS record_habit_id,
    r.date AS record_date,
    r.status AS record_status,
    r.value AS record_value,
    r.completion_rate AS record_completion_rate,
    r.note AS record_note,
    r.created_at AS record_created_at,
    r.updated_at AS record_updated_at
FROM habits h
LEFT JOIN habit_records r
    ON r.habit_id = h.id
   AND r.date = ?1
WHERE h.archived = 0
ORDER BY h.created_at DESC, h.id ASC;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by habit, record and score persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(HabitValidationError),
    Db(DbError),
    HabitNotFound(HabitId),
    RecordNotFound(RecordId),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::RecordNotFound(id) => write!(f, "habit record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "habit repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "habit repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing habits.
#[derive(Debug, Clone, Default)]
pub struct HabitListQuery {
    pub include_archived: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Active-view projection: one habit plus its record for the requested date.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitOverview {
    pub habit: Habit,
    /// `None` means the day is still pending.
    pub record: Option<HabitRecord>,
}

/// Repository interface for habit CRUD operations.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Writes descriptive fields and `archived`; leaves `strength_score` alone.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists habits ordered by `created_at DESC, id ASC`.
    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>>;
    /// Lists non-archived habits with their record on `date`, if any.
    fn list_active_with_record(&self, date: NaiveDate) -> RepoResult<Vec<HabitOverview>>;
    /// Hard-deletes a habit together with its records and score history.
    fn delete_habit(&self, id: HabitId) -> RepoResult<()>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        self.conn.execute(
            "INSERT INTO habits (
                id,
                name,
                description,
                tracking_type,
                target_value,
                target_unit,
                frequency_type,
                frequency_days,
                color,
                icon,
                reminder_time,
                strength_score,
                archived,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                habit.id.to_string(),
                habit.name.trim(),
                habit.description.as_deref(),
                tracking_type_to_db(habit.tracking_type),
                habit.target_value,
                habit.target_unit.as_deref(),
                frequency_type_to_db(habit.frequency_type),
                frequency_days_to_db(&habit.frequency_days),
                habit.color.as_deref(),
                habit.icon.as_deref(),
                habit.reminder_time.as_deref(),
                habit.strength_score,
                bool_to_int(habit.archived),
                habit.created_at,
                habit.updated_at,
            ],
        )?;

        Ok(habit.id)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?1,
                description = ?2,
                tracking_type = ?3,
                target_value = ?4,
                target_unit = ?5,
                frequency_type = ?6,
                frequency_days = ?7,
                color = ?8,
                icon = ?9,
                reminder_time = ?10,
                archived = ?11,
                updated_at = ?12
             WHERE id = ?13;",
            params![
                habit.name.trim(),
                habit.description.as_deref(),
                tracking_type_to_db(habit.tracking_type),
                habit.target_value,
                habit.target_unit.as_deref(),
                frequency_type_to_db(habit.frequency_type),
                frequency_days_to_db(&habit.frequency_days),
                habit.color.as_deref(),
                habit.icon.as_deref(),
                habit.reminder_time.as_deref(),
                bool_to_int(habit.archived),
                Utc::now().timestamp_millis(),
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::HabitNotFound(habit.id));
        }

        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }

        Ok(None)
    }

    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>> {
        let mut sql = format!("{HABIT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_archived {
            sql.push_str(" AND archived = 0");
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut habits = Vec::new();

        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }

        Ok(habits)
    }

    fn list_active_with_record(&self, date: NaiveDate) -> RepoResult<Vec<HabitOverview>> {
        let mut stmt = self.conn.prepare(ACTIVE_WITH_RECORD_SQL)?;
        let mut rows = stmt.query([format_record_date(date)])?;
        let mut overviews = Vec::new();

        while let Some(row) = rows.next()? {
            let habit = parse_habit_row(row)?;
            let record = match row.get::<_, Option<String>>("record_id")? {
                Some(_) => Some(parse_record_columns(row, "record_")?),
                None => None,
            };
            overviews.push(HabitOverview { habit, record });
        }

        Ok(overviews)
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::HabitNotFound(id));
        }

        Ok(())
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "habits.id")?;

    let tracking_text: String = row.get("tracking_type")?;
    let tracking_type = parse_tracking_type(&tracking_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid tracking type `{tracking_text}` in habits.tracking_type"
        ))
    })?;

    let frequency_text: String = row.get("frequency_type")?;
    let frequency_type = parse_frequency_type(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency type `{frequency_text}` in habits.frequency_type"
        ))
    })?;

    let frequency_days = match row.get::<_, Option<String>>("frequency_days")? {
        Some(value) => parse_frequency_days(&value)?,
        None => Vec::new(),
    };

    let habit = Habit {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        tracking_type,
        target_value: row.get("target_value")?,
        target_unit: row.get("target_unit")?,
        frequency_type,
        frequency_days,
        color: row.get("color")?,
        icon: row.get("icon")?,
        reminder_time: row.get("reminder_time")?,
        strength_score: row.get("strength_score")?,
        archived: parse_bool(row.get("archived")?, "habits.archived")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    habit.validate()?;
    Ok(habit)
}

fn tracking_type_to_db(kind: TrackingType) -> &'static str {
    match kind {
        TrackingType::Binary => "binary",
        TrackingType::Quantity => "quantity",
        TrackingType::Duration => "duration",
    }
}

fn parse_tracking_type(value: &str) -> Option<TrackingType> {
    match value {
        "binary" => Some(TrackingType::Binary),
        "quantity" => Some(TrackingType::Quantity),
        "duration" => Some(TrackingType::Duration),
        _ => None,
    }
}

fn frequency_type_to_db(kind: FrequencyType) -> &'static str {
    match kind {
        FrequencyType::Daily => "daily",
        FrequencyType::Weekly => "weekly",
        FrequencyType::Custom => "custom",
    }
}

fn parse_frequency_type(value: &str) -> Option<FrequencyType> {
    match value {
        "daily" => Some(FrequencyType::Daily),
        "weekly" => Some(FrequencyType::Weekly),
        "custom" => Some(FrequencyType::Custom),
        _ => None,
    }
}

/// Weekdays are stored as a comma-separated list, e.g. `1,3,5`.
fn frequency_days_to_db(days: &[u8]) -> Option<String> {
    if days.is_empty() {
        return None;
    }
    Some(
        days.iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn parse_frequency_days(value: &str) -> RepoResult<Vec<u8>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>().map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid weekday `{part}` in habits.frequency_days"
                ))
            })
        })
        .collect()
}
