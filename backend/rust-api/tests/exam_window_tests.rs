mod common;

use chrono::Duration;
use examroom_api::models::AccessStatus;
use examroom_api::services::exam_window::{
    classify_access, compute_window, exam_window, GRACE_MINUTES,
};

use common::{at, offset, published_exam};

#[test]
fn hard_end_is_start_plus_duration_plus_buffer() {
    for duration in [10i64, 60, 90, 180] {
        let window = compute_window("2025-03-10", "10:00", duration, GRACE_MINUTES, offset()).unwrap();
        assert_eq!(
            window.hard_end - window.opens_at,
            Duration::minutes(duration + GRACE_MINUTES)
        );
    }
}

#[test]
fn boundary_values_around_start_and_hard_end() {
    let exam = published_exam();
    let window = exam_window(&exam, offset()).unwrap();

    // one second before start
    let status = classify_access(&exam, false, window.opens_at - Duration::seconds(1))
        .unwrap()
        .status;
    assert_eq!(status, AccessStatus::BeforeStart);

    // exactly at start
    let response = classify_access(&exam, false, window.opens_at).unwrap();
    assert_eq!(response.status, AccessStatus::Active);
    assert!(response.can_access);

    // exactly at the hard end (inclusive)
    let response = classify_access(&exam, false, window.hard_end).unwrap();
    assert_eq!(response.status, AccessStatus::Active);
    assert_eq!(response.time_remaining_seconds, Some(0));

    // one second past the hard end
    let status = classify_access(&exam, false, window.hard_end + Duration::seconds(1))
        .unwrap()
        .status;
    assert_eq!(status, AccessStatus::Ended);
}

#[test]
fn status_is_monotonic_in_time() {
    let exam = published_exam();

    fn ordinal(status: AccessStatus) -> u8 {
        match status {
            AccessStatus::BeforeStart => 0,
            AccessStatus::Active => 1,
            AccessStatus::Ended => 2,
            other => panic!("unexpected status {other:?}"),
        }
    }

    // sweep the whole day at one-minute steps; the classification must only
    // ever move forward
    let mut previous = 0;
    let mut now = at("2025-03-10", "00:00");
    let end_of_day = at("2025-03-10", "23:59");
    while now <= end_of_day {
        let status = classify_access(&exam, false, now).unwrap().status;
        let current = ordinal(status);
        assert!(
            current >= previous,
            "access state went backwards at {now}: {previous} -> {current}"
        );
        previous = current;
        now += Duration::minutes(1);
    }
}

#[test]
fn grace_buffer_keeps_the_window_open_past_stated_duration() {
    let exam = published_exam();
    // 60 minute exam starting 10:00: stated end 11:00, hard end 11:05
    let response = classify_access(&exam, false, at("2025-03-10", "11:03")).unwrap();
    assert_eq!(response.status, AccessStatus::Active);

    let response = classify_access(&exam, false, at("2025-03-10", "11:06")).unwrap();
    assert_eq!(response.status, AccessStatus::Ended);
}

#[test]
fn countdowns_are_recomputed_not_cached() {
    let exam = published_exam();
    let first = classify_access(&exam, false, at("2025-03-10", "09:00")).unwrap();
    let second = classify_access(&exam, false, at("2025-03-10", "09:30")).unwrap();
    assert_eq!(first.time_until_start_seconds, Some(3600));
    assert_eq!(second.time_until_start_seconds, Some(1800));
}

#[test]
fn unparsable_exam_date_is_a_format_error() {
    let mut exam = published_exam();
    exam.exam_date = "10/03/2025".into();
    assert!(exam_window(&exam, offset()).is_err());
}
