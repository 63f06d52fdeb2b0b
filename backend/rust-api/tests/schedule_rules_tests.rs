mod common;

use examroom_api::services::schedule_rules::{
    error_messages, has_errors, validate_schedule, ScheduleInput, ScheduleRule, Severity,
};

use common::at;

fn base_input<'a>() -> ScheduleInput<'a> {
    ScheduleInput {
        exam_date: "2025-01-01",
        exam_end_time: "10:00",
        deadline_date: "2025-01-02",
        deadline_time: "11:00",
        release: Some(("2025-01-02", "13:00")),
    }
}

fn violated(input: &ScheduleInput<'_>) -> Vec<ScheduleRule> {
    validate_schedule(input, at("2024-12-31", "09:00"))
        .unwrap()
        .iter()
        .map(|v| v.rule)
        .collect()
}

#[test]
fn a_clean_schedule_has_no_violations() {
    assert!(violated(&base_input()).is_empty());
}

#[test]
fn deadline_equal_to_exam_end_breaks_ordering() {
    let mut input = base_input();
    input.deadline_date = "2025-01-01";
    input.deadline_time = "10:00";
    input.release = None;
    let rules = violated(&input);
    assert!(rules.contains(&ScheduleRule::DeadlineNotAfterExamEnd));
}

#[test]
fn twenty_three_hour_grading_gap_is_too_short() {
    let mut input = base_input();
    input.deadline_date = "2025-01-02";
    input.deadline_time = "09:00";
    input.release = None;
    let rules = violated(&input);
    assert_eq!(rules, vec![ScheduleRule::GradingGapTooShort]);
}

#[test]
fn thirty_minute_release_gap_flags_rule_four_only() {
    let mut input = base_input();
    input.release = Some(("2025-01-02", "11:30"));
    let rules = violated(&input);
    assert_eq!(rules, vec![ScheduleRule::ReleaseGapTooShort]);
}

#[test]
fn release_before_deadline_breaks_ordering() {
    let mut input = base_input();
    input.release = Some(("2025-01-02", "10:00"));
    let rules = violated(&input);
    assert!(rules.contains(&ScheduleRule::ReleaseNotAfterDeadline));
    assert!(rules.contains(&ScheduleRule::ReleaseGapTooShort));
}

#[test]
fn schedules_too_far_in_the_past_are_rejected() {
    let input = ScheduleInput {
        exam_date: "2020-01-01",
        exam_end_time: "10:00",
        deadline_date: "2020-01-02",
        deadline_time: "11:00",
        release: Some(("2020-01-02", "13:00")),
    };
    let rules = violated(&input);
    assert!(rules.contains(&ScheduleRule::DeadlineInPast));
    assert!(rules.contains(&ScheduleRule::ReleaseInPast));
}

#[test]
fn release_more_than_thirty_days_out_is_too_long() {
    let mut input = base_input();
    input.release = Some(("2025-02-05", "13:00"));
    let rules = violated(&input);
    assert!(rules.contains(&ScheduleRule::SpanTooLong));
}

#[test]
fn grading_period_over_fourteen_days_warns_but_passes() {
    let mut input = base_input();
    input.deadline_date = "2025-01-20";
    input.release = Some(("2025-01-20", "15:00"));

    let violations = validate_schedule(&input, at("2024-12-31", "09:00")).unwrap();
    let long_period = violations
        .iter()
        .find(|v| v.rule == ScheduleRule::GradingPeriodLong)
        .expect("long grading period flagged");
    assert_eq!(long_period.severity, Severity::Warning);
    assert!(!has_errors(&violations));
    assert!(error_messages(&violations).is_empty());
}

#[test]
fn multiple_independent_violations_are_all_reported() {
    let input = ScheduleInput {
        exam_date: "2025-01-01",
        exam_end_time: "10:00",
        deadline_date: "2025-01-01",
        deadline_time: "10:00",
        release: Some(("2025-01-01", "09:00")),
    };
    let rules = violated(&input);
    assert!(rules.len() >= 4, "expected every broken rule reported, got {rules:?}");
}

#[test]
fn bad_date_format_short_circuits_with_a_format_error() {
    let mut input = base_input();
    input.deadline_date = "2025/01/02";
    assert!(validate_schedule(&input, at("2024-12-31", "09:00")).is_err());
}
