use chrono::{DateTime, Duration, FixedOffset};

use crate::errors::ApiError;
use crate::models::{DaysHours, Exam, LockCheckResponse};
use crate::utils::time::combine_date_time;

fn days_hours(duration: Duration) -> DaysHours {
    DaysHours {
        days: duration.num_days(),
        hours: duration.num_hours() % 24,
    }
}

/// Whether grading writes are still accepted for this exam.
///
/// An exam with no grading deadline configured stays open indefinitely — the
/// one documented fail-open case, so legacy exams are never blocked. A
/// finalized exam is locked no matter what the deadline says.
pub fn grading_lock_status(
    exam: &Exam,
    now: DateTime<FixedOffset>,
) -> Result<LockCheckResponse, ApiError> {
    if exam.results_finalized {
        return Ok(LockCheckResponse {
            is_locked: true,
            message: "Results have been finalized; grading is permanently closed".to_string(),
            remaining_or_elapsed: None,
        });
    }

    let (date, time) = match (&exam.grading_deadline_date, &exam.grading_deadline_time) {
        (Some(date), Some(time)) => (date.as_str(), time.as_str()),
        _ => {
            return Ok(LockCheckResponse {
                is_locked: false,
                message: "No grading deadline set; grading remains open".to_string(),
                remaining_or_elapsed: None,
            });
        }
    };

    let deadline = combine_date_time(date, time, *now.offset())?;
    if now > deadline {
        let elapsed = days_hours(now - deadline);
        Ok(LockCheckResponse {
            message: format!(
                "Grading deadline passed {}d {}h ago",
                elapsed.days, elapsed.hours
            ),
            is_locked: true,
            remaining_or_elapsed: Some(elapsed),
        })
    } else {
        let remaining = days_hours(deadline - now);
        Ok(LockCheckResponse {
            message: format!(
                "Grading open; {}d {}h until the deadline",
                remaining.days, remaining.hours
            ),
            is_locked: false,
            remaining_or_elapsed: Some(remaining),
        })
    }
}

/// Whether a student may see their own result yet. No release date configured
/// means not released — fail-closed, the opposite of the grading deadline.
pub fn is_released(exam: &Exam, now: DateTime<FixedOffset>) -> Result<bool, ApiError> {
    let Some(date) = &exam.result_release_date else {
        return Ok(false);
    };
    let time = exam.result_release_time.as_deref().unwrap_or("00:00");
    let release_at = combine_date_time(date, time, *now.offset())?;
    Ok(now >= release_at)
}
