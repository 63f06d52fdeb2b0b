use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ClassStatistics;

/// Exam model stored in the MongoDB "exams" collection.
///
/// Date and time fields are kept in their boundary string forms
/// (`YYYY-MM-DD`, `HH:MM`) and parsed on use; anything else is rejected as a
/// format error at that point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    pub exam_date: String,
    pub start_time: String,
    /// Display-only. The access window is derived from `start_time` plus
    /// `duration_minutes`; this field never participates in it.
    pub end_time: String,
    pub duration_minutes: i64,
    pub status: ExamStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_deadline_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_deadline_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_release_time: Option<String>,
    /// One-way flag: set by finalization together with `statistics`, never
    /// cleared.
    #[serde(default)]
    pub results_finalized: bool,
    #[serde(
        rename = "finalizedAt",
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::bson_datetime_as_chrono_option"
    )]
    pub finalized_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ClassStatistics>,
    pub created_by: String,
    #[serde(rename = "createdAt", with = "super::bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "super::bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
}

impl Exam {
    /// New exams always start as an unfinalized draft with no statistics.
    pub fn new(req: CreateExamRequest, created_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            description: req.description,
            instructions: req.instructions,
            exam_date: req.exam_date,
            start_time: req.start_time,
            end_time: req.end_time,
            duration_minutes: req.duration_minutes,
            status: ExamStatus::Draft,
            grading_deadline_date: None,
            grading_deadline_time: None,
            result_release_date: None,
            result_release_time: None,
            results_finalized: false,
            finalized_at: None,
            finalized_by: None,
            statistics: None,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Draft,
    Published,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Published => "published",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    pub exam_date: String,
    pub start_time: String,
    pub end_time: String,
    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration_minutes: i64,
}

/// Grading deadline is required as a pair; the release pair is optional and
/// may be set later.
#[derive(Debug, Deserialize)]
pub struct ScheduleUpdateRequest {
    pub grading_deadline_date: String,
    pub grading_deadline_time: String,
    #[serde(default)]
    pub result_release_date: Option<String>,
    #[serde(default)]
    pub result_release_time: Option<String>,
}

/// Terminal classification of "can this student enter the exam right now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    NotFound,
    NotPublished,
    BeforeStart,
    Active,
    Ended,
    Submitted,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessCheckResponse {
    pub can_access: bool,
    pub status: AccessStatus,
    pub time_until_start_seconds: Option<i64>,
    pub time_remaining_seconds: Option<i64>,
}

impl AccessCheckResponse {
    pub fn denied(status: AccessStatus) -> Self {
        Self {
            can_access: false,
            status,
            time_until_start_seconds: None,
            time_remaining_seconds: None,
        }
    }

    pub fn before_start(seconds_until_start: i64) -> Self {
        Self {
            can_access: false,
            status: AccessStatus::BeforeStart,
            time_until_start_seconds: Some(seconds_until_start),
            time_remaining_seconds: None,
        }
    }

    pub fn active(seconds_remaining: i64) -> Self {
        Self {
            can_access: true,
            status: AccessStatus::Active,
            time_until_start_seconds: None,
            time_remaining_seconds: Some(seconds_remaining),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DaysHours {
    pub days: i64,
    pub hours: i64,
}

/// Whether grading writes are still accepted for an exam, with a
/// human-readable account of the remaining or elapsed time.
#[derive(Debug, Clone, Serialize)]
pub struct LockCheckResponse {
    pub is_locked: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_or_elapsed: Option<DaysHours>,
}

/// Exam as shown to students: schedule and metadata, no grading internals.
#[derive(Debug, Serialize)]
pub struct StudentExamView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub exam_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub status: ExamStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_release_time: Option<String>,
}

impl From<&Exam> for StudentExamView {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            description: exam.description.clone(),
            instructions: exam.instructions.clone(),
            exam_date: exam.exam_date.clone(),
            start_time: exam.start_time.clone(),
            end_time: exam.end_time.clone(),
            duration_minutes: exam.duration_minutes,
            status: exam.status,
            result_release_date: exam.result_release_date.clone(),
            result_release_time: exam.result_release_time.clone(),
        }
    }
}
