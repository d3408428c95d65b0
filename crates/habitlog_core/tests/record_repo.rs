use chrono::NaiveDate;
use habitlog_core::db::open_db_in_memory;
use habitlog_core::{
    Habit, HabitId, HabitRepository, NewRecord, RecordRepository, RecordStatus, RecordUpdate,
    RepoError, SqliteHabitRepository, SqliteRecordRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_habit(conn: &Connection) -> HabitId {
    let repo = SqliteHabitRepository::try_new(conn).unwrap();
    repo.create_habit(&Habit::new("Meditate")).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteRecordRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn create_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let habit_id = seed_habit(&conn);
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    let mut new_record = NewRecord::new(habit_id, day(2024, 5, 1), RecordStatus::Partial, 1_000);
    new_record.value = Some(2.0);
    new_record.note = Some("short session".to_string());
    let created = repo.create_record(&new_record).unwrap();

    let found = repo.find_record(habit_id, day(2024, 5, 1)).unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found.completion_rate, 0.0);
    assert!(repo.find_record(habit_id, day(2024, 5, 2)).unwrap().is_none());
}

#[test]
fn duplicate_key_insert_fails() {
    let conn = open_db_in_memory().unwrap();
    let habit_id = seed_habit(&conn);
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let new_record = NewRecord::new(habit_id, day(2024, 5, 1), RecordStatus::Completed, 1_000);

    repo.create_record(&new_record).unwrap();
    let err = repo.create_record(&new_record).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn insert_for_unknown_habit_maps_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo
        .create_record(&NewRecord::new(missing, day(2024, 5, 1), RecordStatus::Completed, 0))
        .unwrap_err();
    assert!(matches!(err, RepoError::HabitNotFound(id) if id == missing));
}

#[test]
fn update_unknown_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();
    let update = RecordUpdate {
        status: RecordStatus::Missed,
        value: None,
        note: None,
        completion_rate: 0.0,
        updated_at: 0,
    };

    let err = repo.update_record(missing, &update).unwrap_err();
    assert!(matches!(err, RepoError::RecordNotFound(id) if id == missing));
}

#[test]
fn created_since_filters_on_creation_time() {
    let conn = open_db_in_memory().unwrap();
    let habit_id = seed_habit(&conn);
    let other_habit = seed_habit(&conn);
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    for (date, created_at) in [(day(2024, 1, 1), 500), (day(2023, 6, 1), 2_000)] {
        repo.create_record(&NewRecord::new(habit_id, date, RecordStatus::Completed, created_at))
            .unwrap();
    }
    repo.create_record(&NewRecord::new(
        other_habit,
        day(2024, 1, 1),
        RecordStatus::Completed,
        3_000,
    ))
    .unwrap();

    let recent = repo.list_records_created_since(habit_id, 1_000).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].date, day(2023, 6, 1));

    let inclusive = repo.list_records_created_since(habit_id, 500).unwrap();
    assert_eq!(inclusive.len(), 2);
}

#[test]
fn records_between_are_inclusive_and_date_ordered() {
    let conn = open_db_in_memory().unwrap();
    let habit_id = seed_habit(&conn);
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    for d in [9, 3, 5, 12] {
        repo.create_record(&NewRecord::new(
            habit_id,
            day(2024, 2, d),
            RecordStatus::Completed,
            0,
        ))
        .unwrap();
    }

    let listed = repo
        .list_records_between(habit_id, day(2024, 2, 3), day(2024, 2, 9))
        .unwrap();
    let dates: Vec<NaiveDate> = listed.iter().map(|record| record.date).collect();
    assert_eq!(dates, vec![day(2024, 2, 3), day(2024, 2, 5), day(2024, 2, 9)]);
}

#[test]
fn corrupted_status_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let habit_id = seed_habit(&conn);
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    repo.create_record(&NewRecord::new(habit_id, day(2024, 2, 1), RecordStatus::Completed, 0))
        .unwrap();
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE habit_records SET status = 'done';", [])
        .unwrap();

    let err = repo.find_record(habit_id, day(2024, 2, 1)).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
