//! Score persistence: current strength and append-only snapshots.
//!
//! # Invariants
//! - `habit_scores` rows are only ever inserted, never updated.
//! - `save_score_snapshot` writes the snapshot and the habit strength in one
//!   transaction; on failure neither is visible.

use crate::model::habit::{HabitId, HabitValidationError};
use crate::model::record::format_record_date;
use crate::model::score::{HabitScore, ScoreSet};
use crate::repo::habit_repo::{RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, parse_date, parse_uuid};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Storage contract for derived score state.
pub trait ScoreRepository {
    /// Overwrites `habits.strength_score`.
    fn update_habit_strength(&self, habit_id: HabitId, strength: f64) -> RepoResult<()>;
    /// Appends one immutable snapshot row.
    fn append_score_snapshot(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        scores: &ScoreSet,
        created_at: i64,
    ) -> RepoResult<()>;
    /// Appends a snapshot and updates the current strength atomically.
    fn save_score_snapshot(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        scores: &ScoreSet,
        created_at: i64,
    ) -> RepoResult<()>;
    /// Lists snapshots newest first.
    fn list_scores(&self, habit_id: HabitId, limit: Option<u32>) -> RepoResult<Vec<HabitScore>>;
}

/// SQLite-backed score repository.
pub struct SqliteScoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScoreRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ScoreRepository for SqliteScoreRepository<'_> {
    fn update_habit_strength(&self, habit_id: HabitId, strength: f64) -> RepoResult<()> {
        write_strength(self.conn, habit_id, strength)
    }

    fn append_score_snapshot(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        scores: &ScoreSet,
        created_at: i64,
    ) -> RepoResult<()> {
        insert_snapshot(self.conn, habit_id, date, scores, created_at)
    }

    fn save_score_snapshot(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        scores: &ScoreSet,
        created_at: i64,
    ) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        write_strength(&tx, habit_id, scores.strength)?;
        insert_snapshot(&tx, habit_id, date, scores, created_at)?;
        tx.commit()?;
        Ok(())
    }

    fn list_scores(&self, habit_id: HabitId, limit: Option<u32>) -> RepoResult<Vec<HabitScore>> {
        let mut sql = String::from(
            "SELECT
                id,
                habit_id,
                date,
                strength_score,
                momentum_score,
                consistency_score,
                created_at
             FROM habit_scores
             WHERE habit_id = ?
             ORDER BY id DESC",
        );
        let mut bind_values = vec![Value::Text(habit_id.to_string())];
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut scores = Vec::new();
        while let Some(row) = rows.next()? {
            scores.push(parse_score_row(row)?);
        }
        Ok(scores)
    }
}

fn write_strength(conn: &Connection, habit_id: HabitId, strength: f64) -> RepoResult<()> {
    if !(0.0..=100.0).contains(&strength) {
        return Err(HabitValidationError::StrengthOutOfRange(strength).into());
    }

    let changed = conn.execute(
        "UPDATE habits SET strength_score = ?1 WHERE id = ?2;",
        params![strength, habit_id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::HabitNotFound(habit_id));
    }
    Ok(())
}

fn insert_snapshot(
    conn: &Connection,
    habit_id: HabitId,
    date: NaiveDate,
    scores: &ScoreSet,
    created_at: i64,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO habit_scores (
            habit_id,
            date,
            strength_score,
            momentum_score,
            consistency_score,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            habit_id.to_string(),
            format_record_date(date),
            scores.strength,
            scores.momentum,
            scores.consistency,
            created_at,
        ],
    )?;
    Ok(())
}

fn parse_score_row(row: &Row<'_>) -> RepoResult<HabitScore> {
    let habit_text: String = row.get("habit_id")?;
    let date_text: String = row.get("date")?;
    Ok(HabitScore {
        id: row.get("id")?,
        habit_id: parse_uuid(&habit_text, "habit_scores.habit_id")?,
        date: parse_date(&date_text, "habit_scores.date")?,
        strength_score: row.get("strength_score")?,
        momentum_score: row.get("momentum_score")?,
        consistency_score: row.get("consistency_score")?,
        created_at: row.get("created_at")?,
    })
}
