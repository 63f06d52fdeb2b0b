use anyhow::Context;
use chrono::{Duration, Utc};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::metrics::{ACCESS_CHECKS_TOTAL, SUBMISSIONS_TOTAL};
use crate::models::{
    AccessCheckResponse, AccessStatus, Exam, ExamStatus, Submission, SubmitExamRequest,
};
use crate::services::exam_window::{classify_access, exam_window};
use crate::services::grading::{combine_scores, score_mcq, short_answer_total};
use crate::services::question_service::QuestionService;
use crate::utils::time::Clock;

/// How far past the hard end an auto-triggered submission is still accepted.
/// Covers the client countdown firing plus network delivery.
const AUTO_SUBMIT_LEEWAY_SECONDS: i64 = 60;

pub struct SubmissionService {
    mongo: Database,
    clock: Clock,
}

impl SubmissionService {
    pub fn new(mongo: Database, clock: Clock) -> Self {
        Self { mongo, clock }
    }

    /// Classify "can this student enter the exam right now". Stateless: every
    /// call re-reads the exam and re-derives the window from the clock.
    pub async fn check_access(
        &self,
        exam_id: &str,
        student_id: &str,
    ) -> Result<AccessCheckResponse, ApiError> {
        let exam = self
            .mongo
            .collection::<Exam>("exams")
            .find_one(doc! { "_id": exam_id })
            .await
            .context("Failed to query exam")?;

        let response = match exam {
            None => AccessCheckResponse::denied(AccessStatus::NotFound),
            Some(exam) => {
                let has_submission = self.find(exam_id, student_id).await?.is_some();
                classify_access(&exam, has_submission, self.clock.now())?
            }
        };

        ACCESS_CHECKS_TOTAL
            .with_label_values(&[access_label(response.status)])
            .inc();
        Ok(response)
    }

    /// Accept a submission, scoring the multiple-choice part immediately.
    ///
    /// The existence pre-check is best effort only; the unique index on
    /// (exam_id, student_id) is what actually guarantees at-most-one
    /// submission when the same student races against themselves.
    pub async fn submit(
        &self,
        exam_id: &str,
        student_id: &str,
        req: SubmitExamRequest,
    ) -> Result<(Submission, usize), ApiError> {
        let exam = self
            .mongo
            .collection::<Exam>("exams")
            .find_one(doc! { "_id": exam_id })
            .await
            .context("Failed to query exam")?
            .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

        if exam.status != ExamStatus::Published {
            return Err(ApiError::Forbidden("Exam is not published".to_string()));
        }

        if self.find(exam_id, student_id).await?.is_some() {
            return Err(ApiError::Conflict(
                "A submission already exists for this exam".to_string(),
            ));
        }

        let now = self.clock.now();
        let window = exam_window(&exam, self.clock.offset())?;
        if now < window.opens_at {
            return Err(ApiError::Lock("Exam has not started yet".to_string()));
        }
        if now > window.hard_end {
            let within_leeway =
                now <= window.hard_end + Duration::seconds(AUTO_SUBMIT_LEEWAY_SECONDS);
            if !(req.auto_submit && within_leeway) {
                return Err(ApiError::Lock("Exam window has closed".to_string()));
            }
        }

        let questions = QuestionService::new(self.mongo.clone())
            .questions_for_exam(exam_id)
            .await?;

        let mcq_result = score_mcq(&questions, &req.answers);
        let sa_total = short_answer_total(&questions);
        let combined = combine_scores(
            mcq_result.obtained_marks,
            mcq_result.total_marks,
            0.0,
            sa_total,
        );

        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            exam_id: exam_id.to_string(),
            student_id: student_id.to_string(),
            answers: req.answers,
            submitted_at: Utc::now(),
            auto_submitted: req.auto_submit,
            mcq_result,
            sa_grades: Default::default(),
            mcq_graded: true,
            // vacuously complete when the exam has no short-answer questions
            sa_graded: sa_total == 0.0,
            combined,
        };

        if let Err(err) = self.collection().insert_one(&submission).await {
            if is_duplicate_key(&err) {
                return Err(ApiError::Conflict(
                    "A submission already exists for this exam".to_string(),
                ));
            }
            return Err(ApiError::Internal(
                anyhow::Error::new(err).context("Failed to insert submission"),
            ));
        }

        let auto_label = if submission.auto_submitted {
            "true"
        } else {
            "false"
        };
        SUBMISSIONS_TOTAL.with_label_values(&[auto_label]).inc();

        tracing::info!(
            "Submission {} recorded for exam {} student {} (auto={})",
            submission.id,
            exam_id,
            student_id,
            submission.auto_submitted
        );
        Ok((submission, questions.len()))
    }

    pub async fn find(
        &self,
        exam_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>, ApiError> {
        let submission = self
            .collection()
            .find_one(doc! { "exam_id": exam_id, "student_id": student_id })
            .await
            .context("Failed to query submission")?;
        Ok(submission)
    }

    pub async fn get(&self, exam_id: &str, student_id: &str) -> Result<Submission, ApiError> {
        self.find(exam_id, student_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
    }

    pub async fn list_for_exam(&self, exam_id: &str) -> Result<Vec<Submission>, ApiError> {
        let cursor = self
            .collection()
            .find(doc! { "exam_id": exam_id })
            .sort(doc! { "submittedAt": 1 })
            .await
            .context("Failed to query submissions")?;
        let submissions = cursor
            .try_collect()
            .await
            .context("Failed to read submissions cursor")?;
        Ok(submissions)
    }

    fn collection(&self) -> mongodb::Collection<Submission> {
        self.mongo.collection::<Submission>("submissions")
    }
}

fn access_label(status: AccessStatus) -> &'static str {
    match status {
        AccessStatus::NotFound => "not_found",
        AccessStatus::NotPublished => "not_published",
        AccessStatus::BeforeStart => "before_start",
        AccessStatus::Active => "active",
        AccessStatus::Ended => "ended",
        AccessStatus::Submitted => "submitted",
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref we)) =
        *err.kind
    {
        return we.code == 11000;
    }
    false
}
