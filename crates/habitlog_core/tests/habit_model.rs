use habitlog_core::{
    parse_habit_id, parse_record_date, week_key, FrequencyType, Habit, HabitValidationError,
    RecordStatus, TrackingType,
};
use uuid::Uuid;

#[test]
fn record_status_serializes_as_snake_case() {
    let json = serde_json::to_string(&RecordStatus::Completed).unwrap();
    assert_eq!(json, "\"completed\"");

    let parsed: RecordStatus = serde_json::from_str("\"skipped\"").unwrap();
    assert_eq!(parsed, RecordStatus::Skipped);
}

#[test]
fn habit_serializes_enum_fields_as_snake_case() {
    let mut habit = Habit::new("Pushups");
    habit.tracking_type = TrackingType::Quantity;
    habit.frequency_type = FrequencyType::Weekly;

    let value = serde_json::to_value(&habit).unwrap();
    assert_eq!(value["tracking_type"], "quantity");
    assert_eq!(value["frequency_type"], "weekly");
    assert_eq!(value["strength_score"], 0.0);
}

#[test]
fn toggle_only_produces_completed_or_missed() {
    assert_eq!(RecordStatus::Completed.toggled(), RecordStatus::Missed);
    assert_eq!(RecordStatus::Missed.toggled(), RecordStatus::Completed);
    assert_eq!(RecordStatus::Partial.toggled(), RecordStatus::Completed);
    assert_eq!(RecordStatus::Skipped.toggled(), RecordStatus::Completed);
}

#[test]
fn completion_rate_is_one_only_for_completed() {
    assert_eq!(RecordStatus::Completed.completion_rate(), 1.0);
    for status in [RecordStatus::Partial, RecordStatus::Missed, RecordStatus::Skipped] {
        assert_eq!(status.completion_rate(), 0.0);
    }
}

#[test]
fn positivity_covers_completed_and_partial() {
    assert!(RecordStatus::Completed.is_positive());
    assert!(RecordStatus::Partial.is_positive());
    assert!(!RecordStatus::Missed.is_positive());
    assert!(!RecordStatus::Skipped.is_positive());
}

#[test]
fn status_parse_is_case_insensitive() {
    assert_eq!(RecordStatus::parse(" Partial "), Some(RecordStatus::Partial));
    assert_eq!(RecordStatus::parse("pending"), None);
}

#[test]
fn habit_validation_checks_reminder_time_and_target() {
    let mut habit = Habit::new("Sleep early");
    habit.reminder_time = Some("24:00".to_string());
    assert!(matches!(
        habit.validate(),
        Err(HabitValidationError::InvalidReminderTime(_))
    ));

    habit.reminder_time = Some("22:15".to_string());
    habit.target_value = Some(0.0);
    assert!(matches!(
        habit.validate(),
        Err(HabitValidationError::NonPositiveTarget(_))
    ));

    habit.target_value = Some(8.0);
    habit.frequency_days = vec![7];
    assert!(matches!(
        habit.validate(),
        Err(HabitValidationError::InvalidFrequencyDay(7))
    ));

    habit.frequency_days = vec![0, 6];
    assert!(habit.validate().is_ok());
}

#[test]
fn parse_habit_id_rejects_blank_and_garbled_input() {
    let id = Uuid::new_v4();
    assert_eq!(parse_habit_id(&format!(" {id} ")), Some(id));
    assert_eq!(parse_habit_id(""), None);
    assert_eq!(parse_habit_id("habit-1"), None);
}

#[test]
fn week_key_is_shared_within_a_sunday_started_week() {
    let sunday = parse_record_date("2024-03-03").unwrap();
    let saturday = parse_record_date("2024-03-09").unwrap();
    let next_sunday = parse_record_date("2024-03-10").unwrap();
    assert_eq!(week_key(sunday), week_key(saturday));
    assert_ne!(week_key(saturday), week_key(next_sunday));
}
