mod common;

use chrono::Duration;
use examroom_api::services::deadline::{grading_lock_status, is_released};

use common::{at, published_exam};

#[test]
fn no_deadline_configured_means_grading_stays_open() {
    let exam = published_exam();
    // years later, still open
    let lock = grading_lock_status(&exam, at("2030-01-01", "09:00")).unwrap();
    assert!(!lock.is_locked);
    assert!(lock.message.contains("No grading deadline"));
    assert!(lock.remaining_or_elapsed.is_none());
}

#[test]
fn lock_flips_strictly_after_the_deadline() {
    let mut exam = published_exam();
    exam.grading_deadline_date = Some("2025-03-12".into());
    exam.grading_deadline_time = Some("17:00".into());

    let before = grading_lock_status(&exam, at("2025-03-12", "16:59")).unwrap();
    assert!(!before.is_locked);

    let at_deadline = grading_lock_status(&exam, at("2025-03-12", "17:00")).unwrap();
    assert!(!at_deadline.is_locked);

    let after = grading_lock_status(&exam, at("2025-03-12", "17:01")).unwrap();
    assert!(after.is_locked);
}

#[test]
fn lock_message_reports_days_and_hours() {
    let mut exam = published_exam();
    exam.grading_deadline_date = Some("2025-03-12".into());
    exam.grading_deadline_time = Some("17:00".into());

    let lock = grading_lock_status(&exam, at("2025-03-10", "11:00")).unwrap();
    let remaining = lock.remaining_or_elapsed.expect("open lock reports time");
    assert_eq!(remaining.days, 2);
    assert_eq!(remaining.hours, 6);

    let lock = grading_lock_status(&exam, at("2025-03-15", "20:00")).unwrap();
    assert!(lock.is_locked);
    let elapsed = lock.remaining_or_elapsed.expect("locked reports time");
    assert_eq!(elapsed.days, 3);
    assert_eq!(elapsed.hours, 3);
}

#[test]
fn finalized_exam_is_locked_under_every_code_path() {
    let mut exam = published_exam();
    exam.results_finalized = true;
    // even with a deadline far in the future
    exam.grading_deadline_date = Some("2030-01-01".into());
    exam.grading_deadline_time = Some("12:00".into());

    let lock = grading_lock_status(&exam, at("2025-03-10", "11:00")).unwrap();
    assert!(lock.is_locked);
    assert!(lock.message.contains("finalized"));
}

#[test]
fn release_gate_is_fail_closed_without_a_date() {
    let exam = published_exam();
    assert!(!is_released(&exam, at("2030-01-01", "09:00")).unwrap());
}

#[test]
fn release_boundary_at_midnight() {
    let mut exam = published_exam();
    exam.result_release_date = Some("2025-06-01".into());
    // release time defaults to 00:00

    let one_second_before = at("2025-05-31", "23:59") + Duration::seconds(59);
    assert!(!is_released(&exam, one_second_before).unwrap());

    assert!(is_released(&exam, at("2025-06-01", "00:00")).unwrap());
    assert!(is_released(&exam, at("2025-06-01", "00:01")).unwrap());
}

#[test]
fn explicit_release_time_is_honored() {
    let mut exam = published_exam();
    exam.result_release_date = Some("2025-06-01".into());
    exam.result_release_time = Some("18:00".into());

    assert!(!is_released(&exam, at("2025-06-01", "17:59")).unwrap());
    assert!(is_released(&exam, at("2025-06-01", "18:00")).unwrap());
}

#[test]
fn malformed_deadline_surfaces_a_format_error() {
    let mut exam = published_exam();
    exam.grading_deadline_date = Some("12-03-2025".into());
    exam.grading_deadline_time = Some("17:00".into());
    assert!(grading_lock_status(&exam, at("2025-03-10", "11:00")).is_err());
}
