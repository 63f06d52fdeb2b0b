use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CombinedScore, LetterGrade, McqGradingResult, ShortAnswerGrade};

/// Submission model stored in the MongoDB "submissions" collection.
///
/// At most one submission exists per (exam_id, student_id); a unique index
/// backs the invariant so concurrent double submissions collapse to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: String,
    pub exam_id: String,
    pub student_id: String,
    /// Raw answers keyed by the question's answer key (`mcq_3`, `sa_1`).
    pub answers: HashMap<String, String>,
    #[serde(rename = "submittedAt", with = "super::bson_datetime_as_chrono")]
    pub submitted_at: DateTime<Utc>,
    /// True when the hard deadline, not the student, triggered submission.
    pub auto_submitted: bool,
    pub mcq_result: McqGradingResult,
    /// One entry per graded short-answer question, keyed like `answers`.
    #[serde(default)]
    pub sa_grades: HashMap<String, ShortAnswerGrade>,
    pub mcq_graded: bool,
    /// True only when every short-answer question on the exam has an entry;
    /// vacuously true when the exam has none.
    pub sa_graded: bool,
    pub combined: CombinedScore,
}

impl Submission {
    pub fn is_fully_graded(&self) -> bool {
        self.mcq_graded && self.sa_graded
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    #[serde(default)]
    pub answers: HashMap<String, String>,
    /// Set by the client when the countdown reaching the hard end, not the
    /// student, triggered the submission.
    #[serde(default)]
    pub auto_submit: bool,
}

/// Deliberately score-free: results stay hidden until the release gate opens.
#[derive(Debug, Serialize)]
pub struct SubmitExamResponse {
    pub submission_id: String,
    pub submitted_at: DateTime<Utc>,
    pub auto_submitted: bool,
    pub answered_count: usize,
    pub question_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct GradeEntry {
    pub question_no: u32,
    pub awarded_marks: f64,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordGradesRequest {
    pub grades: Vec<GradeEntry>,
}

/// Lecturer-facing grading progress row.
#[derive(Debug, Serialize)]
pub struct SubmissionSummary {
    pub student_id: String,
    pub submitted_at: DateTime<Utc>,
    pub auto_submitted: bool,
    pub mcq_graded: bool,
    pub sa_graded: bool,
    pub overall_percentage: f64,
}

impl From<&Submission> for SubmissionSummary {
    fn from(submission: &Submission) -> Self {
        Self {
            student_id: submission.student_id.clone(),
            submitted_at: submission.submitted_at,
            auto_submitted: submission.auto_submitted,
            mcq_graded: submission.mcq_graded,
            sa_graded: submission.sa_graded,
            overall_percentage: submission.combined.overall_percentage,
        }
    }
}

/// A student's own result. Unreleased scores are masked with `None`, never
/// with zero — zero is a real score.
#[derive(Debug, Serialize)]
pub struct StudentResultResponse {
    pub exam_id: String,
    pub exam_title: String,
    pub released: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obtained_marks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<LetterGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fully_graded: Option<bool>,
}
