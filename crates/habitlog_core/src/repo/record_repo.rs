//! Habit record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up, insert and rewrite the single record of a `(habit, date)` key.
//! - Scan records by creation time for the scoring window.
//!
//! # Invariants
//! - `status` and `completion_rate` are always written by the same statement.
//! - Inserting for an unknown habit yields `RepoError::HabitNotFound`.
//! - A second insert for an existing key fails at the UNIQUE constraint.

use crate::model::habit::HabitId;
use crate::model::record::{
    format_record_date, HabitRecord, NewRecord, RecordId, RecordStatus, RecordUpdate,
};
use crate::repo::habit_repo::{RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, is_foreign_key_violation, parse_date, parse_uuid};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    habit_id,
    date,
    status,
    value,
    completion_rate,
    note,
    created_at,
    updated_at
FROM habit_records";

/// Storage contract for daily habit records.
pub trait RecordRepository {
    /// Returns the record for `(habit_id, date)`, if any.
    fn find_record(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<HabitRecord>>;
    /// Inserts a new record and returns it as stored.
    fn create_record(&self, record: &NewRecord) -> RepoResult<HabitRecord>;
    /// Rewrites status, rate, value and note of an existing record.
    fn update_record(&self, record_id: RecordId, update: &RecordUpdate)
        -> RepoResult<HabitRecord>;
    /// Returns every record of a habit with `created_at >= since_ms`.
    fn list_records_created_since(
        &self,
        habit_id: HabitId,
        since_ms: i64,
    ) -> RepoResult<Vec<HabitRecord>>;
    /// Returns records with `from <= date <= to`, oldest date first.
    fn list_records_between(
        &self,
        habit_id: HabitId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<HabitRecord>>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn find_record(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<HabitRecord>> {
        find_record_by_key(self.conn, habit_id, date)
    }

    fn create_record(&self, record: &NewRecord) -> RepoResult<HabitRecord> {
        let id = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO habit_records (
                id,
                habit_id,
                date,
                status,
                value,
                completion_rate,
                note,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
            params![
                id.to_string(),
                record.habit_id.to_string(),
                format_record_date(record.date),
                record.status.as_str(),
                record.value,
                record.completion_rate,
                record.note.as_deref(),
                record.created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(RepoError::HabitNotFound(record.habit_id));
            }
            Err(err) => return Err(err.into()),
        }

        Ok(HabitRecord {
            id,
            habit_id: record.habit_id,
            date: record.date,
            status: record.status,
            value: record.value,
            completion_rate: record.completion_rate,
            note: record.note.clone(),
            created_at: record.created_at,
            updated_at: record.created_at,
        })
    }

    fn update_record(
        &self,
        record_id: RecordId,
        update: &RecordUpdate,
    ) -> RepoResult<HabitRecord> {
        let changed = self.conn.execute(
            "UPDATE habit_records
             SET
                status = ?1,
                value = ?2,
                completion_rate = ?3,
                note = ?4,
                updated_at = ?5
             WHERE id = ?6;",
            params![
                update.status.as_str(),
                update.value,
                update.completion_rate,
                update.note.as_deref(),
                update.updated_at,
                record_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::RecordNotFound(record_id));
        }

        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([record_id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_record_row(row),
            None => Err(RepoError::RecordNotFound(record_id)),
        }
    }

    fn list_records_created_since(
        &self,
        habit_id: HabitId,
        since_ms: i64,
    ) -> RepoResult<Vec<HabitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE habit_id = ?1
               AND created_at >= ?2
             ORDER BY created_at ASC, date ASC;"
        ))?;
        let mut rows = stmt.query(params![habit_id.to_string(), since_ms])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn list_records_between(
        &self,
        habit_id: HabitId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<HabitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE habit_id = ?1
               AND date >= ?2
               AND date <= ?3
             ORDER BY date ASC;"
        ))?;
        let mut rows = stmt.query(params![
            habit_id.to_string(),
            format_record_date(from),
            format_record_date(to),
        ])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }
}

fn find_record_by_key(
    conn: &Connection,
    habit_id: HabitId,
    date: NaiveDate,
) -> RepoResult<Option<HabitRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{RECORD_SELECT_SQL}
         WHERE habit_id = ?1
           AND date = ?2;"
    ))?;
    let mut rows = stmt.query(params![habit_id.to_string(), format_record_date(date)])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_record_row(row)?));
    }
    Ok(None)
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<HabitRecord> {
    parse_record_columns(row, "")
}

/// Reads a record from columns named `{prefix}id`, `{prefix}status`, ...
///
/// Lets joined queries alias record columns next to habit columns.
pub(crate) fn parse_record_columns(row: &Row<'_>, prefix: &str) -> RepoResult<HabitRecord> {
    let column = |name: &str| format!("{prefix}{name}");

    let id_text: String = row.get(column("id").as_str())?;
    let habit_text: String = row.get(column("habit_id").as_str())?;
    let date_text: String = row.get(column("date").as_str())?;

    let status_text: String = row.get(column("status").as_str())?;
    let status = RecordStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid record status `{status_text}` in habit_records.status"
        ))
    })?;

    let completion_rate: f64 = row.get(column("completion_rate").as_str())?;
    if completion_rate != 0.0 && completion_rate != 1.0 {
        return Err(RepoError::InvalidData(format!(
            "invalid completion rate `{completion_rate}` in habit_records.completion_rate"
        )));
    }

    Ok(HabitRecord {
        id: parse_uuid(&id_text, "habit_records.id")?,
        habit_id: parse_uuid(&habit_text, "habit_records.habit_id")?,
        date: parse_date(&date_text, "habit_records.date")?,
        status,
        value: row.get(column("value").as_str())?,
        completion_rate,
        note: row.get(column("note").as_str())?,
        created_at: row.get(column("created_at").as_str())?,
        updated_at: row.get(column("updated_at").as_str())?,
    })
}
