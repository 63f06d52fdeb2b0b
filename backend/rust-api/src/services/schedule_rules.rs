use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use crate::errors::ApiError;
use crate::utils::time::combine_date_time;

pub const MIN_GRADING_GAP_HOURS: i64 = 24;
pub const MIN_RELEASE_GAP_HOURS: i64 = 1;
pub const PAST_GRACE_HOURS: i64 = 1;
pub const MAX_SPAN_DAYS: i64 = 30;
pub const LONG_GRADING_PERIOD_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleRule {
    DeadlineNotAfterExamEnd,
    GradingGapTooShort,
    ReleaseNotAfterDeadline,
    ReleaseGapTooShort,
    DeadlineInPast,
    ReleaseInPast,
    SpanTooLong,
    GradingPeriodLong,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleViolation {
    pub rule: ScheduleRule,
    pub severity: Severity,
    pub message: String,
}

impl ScheduleViolation {
    fn error(rule: ScheduleRule, message: String) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(rule: ScheduleRule, message: String) -> Self {
        Self {
            rule,
            severity: Severity::Warning,
            message,
        }
    }
}

/// Raw boundary strings for one exam's grading/release schedule. The release
/// pair is optional; release rules are only evaluated when it is present.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleInput<'a> {
    pub exam_date: &'a str,
    pub exam_end_time: &'a str,
    pub deadline_date: &'a str,
    pub deadline_time: &'a str,
    pub release: Option<(&'a str, &'a str)>,
}

pub fn has_errors(violations: &[ScheduleViolation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Error)
}

pub fn error_messages(violations: &[ScheduleViolation]) -> Vec<String> {
    violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .map(|v| v.message.clone())
        .collect()
}

/// Check the ordering and gap rules across exam end, grading deadline and
/// result release. Every rule is evaluated independently so a caller gets the
/// complete list in one pass; only unparsable input short-circuits.
pub fn validate_schedule(
    input: &ScheduleInput<'_>,
    now: DateTime<FixedOffset>,
) -> Result<Vec<ScheduleViolation>, ApiError> {
    let offset = *now.offset();
    let exam_end = combine_date_time(input.exam_date, input.exam_end_time, offset)?;
    let deadline = combine_date_time(input.deadline_date, input.deadline_time, offset)?;
    let release = input
        .release
        .map(|(date, time)| combine_date_time(date, time, offset))
        .transpose()?;

    let mut violations = Vec::new();

    if deadline <= exam_end {
        violations.push(ScheduleViolation::error(
            ScheduleRule::DeadlineNotAfterExamEnd,
            "Grading deadline must be after the exam ends".to_string(),
        ));
    }

    let grading_gap = deadline - exam_end;
    if grading_gap < Duration::hours(MIN_GRADING_GAP_HOURS) {
        violations.push(ScheduleViolation::error(
            ScheduleRule::GradingGapTooShort,
            format!(
                "Grading deadline must leave at least {MIN_GRADING_GAP_HOURS} hours after the exam ends"
            ),
        ));
    }

    if deadline < now - Duration::hours(PAST_GRACE_HOURS) {
        violations.push(ScheduleViolation::error(
            ScheduleRule::DeadlineInPast,
            "Grading deadline is in the past".to_string(),
        ));
    }

    if grading_gap > Duration::days(LONG_GRADING_PERIOD_DAYS) {
        violations.push(ScheduleViolation::warning(
            ScheduleRule::GradingPeriodLong,
            format!(
                "Grading period is longer than {LONG_GRADING_PERIOD_DAYS} days; students wait a long time for marks"
            ),
        ));
    }

    if let Some(release) = release {
        if release <= deadline {
            violations.push(ScheduleViolation::error(
                ScheduleRule::ReleaseNotAfterDeadline,
                "Result release must be after the grading deadline".to_string(),
            ));
        }

        if release - deadline < Duration::hours(MIN_RELEASE_GAP_HOURS) {
            violations.push(ScheduleViolation::error(
                ScheduleRule::ReleaseGapTooShort,
                format!(
                    "Result release must leave at least {MIN_RELEASE_GAP_HOURS} hour after the grading deadline"
                ),
            ));
        }

        if release < now - Duration::hours(PAST_GRACE_HOURS) {
            violations.push(ScheduleViolation::error(
                ScheduleRule::ReleaseInPast,
                "Result release is in the past".to_string(),
            ));
        }

        if release - exam_end > Duration::days(MAX_SPAN_DAYS) {
            violations.push(ScheduleViolation::error(
                ScheduleRule::SpanTooLong,
                format!(
                    "Results must be released within {MAX_SPAN_DAYS} days of the exam ending"
                ),
            ));
        }
    }

    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        combine_date_time("2024-12-31", "09:00", offset).unwrap()
    }

    fn rules(violations: &[ScheduleViolation]) -> Vec<ScheduleRule> {
        violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn equal_deadline_violates_ordering() {
        let input = ScheduleInput {
            exam_date: "2025-01-01",
            exam_end_time: "10:00",
            deadline_date: "2025-01-01",
            deadline_time: "10:00",
            release: None,
        };
        let violations = validate_schedule(&input, now()).unwrap();
        assert!(rules(&violations).contains(&ScheduleRule::DeadlineNotAfterExamEnd));
    }

    #[test]
    fn twenty_three_hour_gap_is_too_short() {
        let input = ScheduleInput {
            exam_date: "2025-01-01",
            exam_end_time: "10:00",
            deadline_date: "2025-01-02",
            deadline_time: "09:00",
            release: None,
        };
        let violations = validate_schedule(&input, now()).unwrap();
        let rules = rules(&violations);
        assert!(rules.contains(&ScheduleRule::GradingGapTooShort));
        assert!(!rules.contains(&ScheduleRule::DeadlineNotAfterExamEnd));
    }

    #[test]
    fn thirty_minute_release_gap_flags_only_that_rule() {
        let input = ScheduleInput {
            exam_date: "2025-01-01",
            exam_end_time: "10:00",
            deadline_date: "2025-01-02",
            deadline_time: "11:00",
            release: Some(("2025-01-02", "11:30")),
        };
        let violations = validate_schedule(&input, now()).unwrap();
        assert_eq!(rules(&violations), vec![ScheduleRule::ReleaseGapTooShort]);
    }

    #[test]
    fn independent_rules_accumulate() {
        // deadline equal to exam end AND release before deadline
        let input = ScheduleInput {
            exam_date: "2025-01-01",
            exam_end_time: "10:00",
            deadline_date: "2025-01-01",
            deadline_time: "10:00",
            release: Some(("2025-01-01", "09:00")),
        };
        let violations = validate_schedule(&input, now()).unwrap();
        let rules = rules(&violations);
        assert!(rules.contains(&ScheduleRule::DeadlineNotAfterExamEnd));
        assert!(rules.contains(&ScheduleRule::GradingGapTooShort));
        assert!(rules.contains(&ScheduleRule::ReleaseNotAfterDeadline));
        assert!(rules.contains(&ScheduleRule::ReleaseGapTooShort));
    }

    #[test]
    fn long_grading_period_is_a_warning_not_an_error() {
        let input = ScheduleInput {
            exam_date: "2025-01-01",
            exam_end_time: "10:00",
            deadline_date: "2025-01-20",
            deadline_time: "10:00",
            release: Some(("2025-01-20", "12:00")),
        };
        let violations = validate_schedule(&input, now()).unwrap();
        let warning = violations
            .iter()
            .find(|v| v.rule == ScheduleRule::GradingPeriodLong)
            .expect("long grading period should be flagged");
        assert_eq!(warning.severity, Severity::Warning);
        assert!(!has_errors(&violations));
    }

    #[test]
    fn unparsable_input_is_a_format_error() {
        let input = ScheduleInput {
            exam_date: "01-01-2025",
            exam_end_time: "10:00",
            deadline_date: "2025-01-02",
            deadline_time: "11:00",
            release: None,
        };
        assert!(validate_schedule(&input, now()).is_err());
    }
}
