use chrono::{DateTime, Duration, FixedOffset};

use crate::errors::ApiError;
use crate::models::{AccessCheckResponse, AccessStatus, Exam, ExamStatus};
use crate::utils::time::combine_date_time;

/// Students keep write access for this long past the stated duration; the
/// hard end includes it.
pub const GRACE_MINUTES: i64 = 5;

/// Half-open access interval for one exam sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamWindow {
    pub opens_at: DateTime<FixedOffset>,
    pub hard_end: DateTime<FixedOffset>,
}

/// Derive the access window from date, start time and duration. The stored
/// `end_time` is advisory display data and is deliberately ignored here.
pub fn compute_window(
    exam_date: &str,
    start_time: &str,
    duration_minutes: i64,
    grace_minutes: i64,
    offset: FixedOffset,
) -> Result<ExamWindow, ApiError> {
    let opens_at = combine_date_time(exam_date, start_time, offset)?;
    let hard_end = opens_at + Duration::minutes(duration_minutes + grace_minutes);
    Ok(ExamWindow { opens_at, hard_end })
}

pub fn exam_window(exam: &Exam, offset: FixedOffset) -> Result<ExamWindow, ApiError> {
    compute_window(
        &exam.exam_date,
        &exam.start_time,
        exam.duration_minutes,
        GRACE_MINUTES,
        offset,
    )
}

/// Classify whether a student may enter the exam at `now`. Evaluated fresh on
/// every call; the countdown fields are plain subtractions, never cached.
pub fn classify_access(
    exam: &Exam,
    has_submission: bool,
    now: DateTime<FixedOffset>,
) -> Result<AccessCheckResponse, ApiError> {
    if exam.status != ExamStatus::Published {
        return Ok(AccessCheckResponse::denied(AccessStatus::NotPublished));
    }
    // an existing submission wins over any window state
    if has_submission {
        return Ok(AccessCheckResponse::denied(AccessStatus::Submitted));
    }

    let window = exam_window(exam, *now.offset())?;
    if now < window.opens_at {
        Ok(AccessCheckResponse::before_start(
            (window.opens_at - now).num_seconds(),
        ))
    } else if now <= window.hard_end {
        Ok(AccessCheckResponse::active(
            (window.hard_end - now).num_seconds(),
        ))
    } else {
        Ok(AccessCheckResponse::denied(AccessStatus::Ended))
    }
}
