//! Command-line probe for `habitlog_core`.
//!
//! # Responsibility
//! - Verify core crate wiring without any UI runtime.
//! - Drive habits, check-ins and score history against a database file.

use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use habitlog_core::db::open_db;
use habitlog_core::{
    default_log_level, init_logging, parse_habit_id, parse_record_date, CheckinRequest,
    CheckinService, FrequencyType, HabitId, HabitService, NewHabit, RecordStatus,
    SqliteHabitRepository, SqliteRecordRepository, SqliteScoreRepository, TrackingType,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "habitlog")]
#[command(about = "Track daily habits and their strength, momentum and consistency", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "habitlog.db")]
    db: PathBuf,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core ping and version
    Ping,
    /// Create a habit
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum, default_value_t = Tracking::Binary)]
        tracking: Tracking,
        #[arg(long)]
        target: Option<f64>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, value_enum, default_value_t = Frequency::Daily)]
        frequency: Frequency,
        /// Weekdays for custom frequency, Sunday = 0 (e.g. `1,3,5`)
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        reminder: Option<String>,
    },
    /// List active habits with their record for a date
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Archive (or restore) a habit
    Archive {
        habit_id: String,
        #[arg(long)]
        restore: bool,
    },
    /// Delete a habit with its records and score history
    Delete { habit_id: String },
    /// Record or toggle a day's completion
    Checkin {
        habit_id: String,
        /// `YYYY-MM-DD`, defaults to today (UTC)
        #[arg(long)]
        date: Option<String>,
        /// completed | partial | missed | skipped (first check-in only)
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show score snapshots, newest first
    Scores {
        habit_id: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Show records between two dates, inclusive
    Records {
        habit_id: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Tracking {
    Binary,
    Quantity,
    Duration,
}

impl From<Tracking> for TrackingType {
    fn from(value: Tracking) -> Self {
        match value {
            Tracking::Binary => TrackingType::Binary,
            Tracking::Quantity => TrackingType::Quantity,
            Tracking::Duration => TrackingType::Duration,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Frequency {
    Daily,
    Weekly,
    Custom,
}

impl From<Frequency> for FrequencyType {
    fn from(value: Frequency) -> Self {
        match value {
            Frequency::Daily => FrequencyType::Daily,
            Frequency::Weekly => FrequencyType::Weekly,
            Frequency::Custom => FrequencyType::Custom,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    if let Commands::Ping = cli.command {
        println!("habitlog_core ping={}", habitlog_core::ping());
        println!("habitlog_core version={}", habitlog_core::core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let habits = HabitService::new(SqliteHabitRepository::try_new(&conn)?);
    let checkins = CheckinService::new(
        SqliteRecordRepository::try_new(&conn)?,
        SqliteScoreRepository::try_new(&conn)?,
    );

    match cli.command {
        Commands::Ping => {}
        Commands::Add {
            name,
            description,
            tracking,
            target,
            unit,
            frequency,
            days,
            color,
            reminder,
        } => {
            let habit = habits.create_habit(NewHabit {
                name,
                description,
                tracking_type: Some(tracking.into()),
                target_value: target,
                target_unit: unit,
                frequency_type: Some(frequency.into()),
                frequency_days: days,
                color,
                icon: None,
                reminder_time: reminder,
            })?;
            println!("created {} {}", habit.id, habit.name);
        }
        Commands::List { date } => {
            let date = date_or_today(date.as_deref())?;
            for overview in habits.list_active_habits(date)? {
                let state = overview
                    .record
                    .map(|record| record.status.as_str())
                    .unwrap_or("pending");
                println!(
                    "{} {:<24} strength={:>6.2} {}={}",
                    overview.habit.id, overview.habit.name, overview.habit.strength_score, date, state
                );
            }
        }
        Commands::Archive { habit_id, restore } => {
            let habit = habits.set_archived(habit_arg(&habit_id)?, !restore)?;
            println!("{} archived={}", habit.id, habit.archived);
        }
        Commands::Delete { habit_id } => {
            let habit_id = habit_arg(&habit_id)?;
            habits.delete_habit(habit_id)?;
            println!("deleted {habit_id}");
        }
        Commands::Checkin {
            habit_id,
            date,
            status,
            value,
            note,
        } => {
            let date = date_or_today(date.as_deref())?;
            let mut request = CheckinRequest::parse(&habit_id, date.to_string())?;
            if let Some(status) = status.as_deref() {
                request.status = Some(
                    RecordStatus::parse(status)
                        .ok_or_else(|| anyhow!("unknown status `{status}`"))?,
                );
            }
            request.value = value;
            request.note = note;

            let outcome = checkins.checkin(&request)?;
            let action = if outcome.created { "created" } else { "toggled" };
            println!(
                "{action} {} {}",
                outcome.record.date,
                outcome.record.status.as_str()
            );
            match outcome.scores {
                Some(scores) => println!(
                    "strength={:.2} momentum={:.2} consistency={:.2}",
                    scores.strength, scores.momentum, scores.consistency
                ),
                None => println!("scores unavailable; see logs"),
            }
        }
        Commands::Scores { habit_id, limit } => {
            for score in checkins.score_history(habit_arg(&habit_id)?, Some(limit))? {
                println!(
                    "{} strength={:.2} momentum={:.2} consistency={:.2}",
                    score.date, score.strength_score, score.momentum_score, score.consistency_score
                );
            }
        }
        Commands::Records { habit_id, from, to } => {
            let from = date_arg(&from)?;
            let to = date_arg(&to)?;
            for record in checkins.records_between(habit_arg(&habit_id)?, from, to)? {
                println!(
                    "{} {:<9} value={} note={}",
                    record.date,
                    record.status.as_str(),
                    record
                        .value
                        .map(|value| value.to_string())
                        .unwrap_or_default(),
                    record.note.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn habit_arg(value: &str) -> anyhow::Result<HabitId> {
    parse_habit_id(value).ok_or_else(|| anyhow!("invalid habit id `{value}`"))
}

fn date_arg(value: &str) -> anyhow::Result<NaiveDate> {
    parse_record_date(value).ok_or_else(|| anyhow!("date must be YYYY-MM-DD, got `{value}`"))
}

fn date_or_today(value: Option<&str>) -> anyhow::Result<NaiveDate> {
    match value {
        Some(value) => date_arg(value),
        None => Ok(Utc::now().date_naive()),
    }
}
