use anyhow::Context;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;

use crate::errors::ApiError;
use crate::models::{CreateExamRequest, Exam, ExamStatus, Question, ScheduleUpdateRequest};
use crate::services::schedule_rules::{
    error_messages, has_errors, validate_schedule, ScheduleInput, ScheduleViolation,
};
use crate::utils::time::{combine_date_time, Clock};

pub struct ExamService {
    mongo: Database,
    clock: Clock,
}

impl ExamService {
    pub fn new(mongo: Database, clock: Clock) -> Self {
        Self { mongo, clock }
    }

    /// Create a draft exam. The stated end_time is checked against the
    /// duration for display consistency only; a mismatch is reported as a
    /// warning, never rejected, because duration alone defines the window.
    pub async fn create_exam(
        &self,
        req: CreateExamRequest,
        created_by: &str,
    ) -> Result<(Exam, Vec<String>), ApiError> {
        let offset = self.clock.offset();
        let opens_at = combine_date_time(&req.exam_date, &req.start_time, offset)?;
        let stated_end = combine_date_time(&req.exam_date, &req.end_time, offset)?;

        let mut warnings = Vec::new();
        let stated_span = (stated_end - opens_at).num_minutes();
        if stated_span <= 0 {
            warnings.push(format!(
                "end_time {} is not after start_time {}; it is display-only and will be ignored",
                req.end_time, req.start_time
            ));
        } else if (stated_span - req.duration_minutes).abs() > 1 {
            warnings.push(format!(
                "end_time implies {} minutes but duration_minutes is {}; duration is authoritative",
                stated_span, req.duration_minutes
            ));
        }

        let exam = Exam::new(req, created_by, Utc::now());
        self.collection()
            .insert_one(&exam)
            .await
            .context("Failed to insert exam")?;

        tracing::info!("Exam created: {} by {}", exam.id, created_by);
        Ok((exam, warnings))
    }

    pub async fn list_exams(&self, include_drafts: bool) -> Result<Vec<Exam>, ApiError> {
        let filter = if include_drafts {
            doc! {}
        } else {
            doc! { "status": ExamStatus::Published.as_str() }
        };
        let cursor = self
            .collection()
            .find(filter)
            .sort(doc! { "exam_date": 1, "start_time": 1 })
            .await
            .context("Failed to query exams")?;
        let exams = cursor
            .try_collect()
            .await
            .context("Failed to read exams cursor")?;
        Ok(exams)
    }

    pub async fn get_exam(&self, exam_id: &str) -> Result<Exam, ApiError> {
        self.collection()
            .find_one(doc! { "_id": exam_id })
            .await
            .context("Failed to query exam")?
            .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
    }

    /// One-way draft -> published transition. The write is conditional on the
    /// exam still being a draft so concurrent publishes collapse to one.
    pub async fn publish_exam(&self, exam_id: &str) -> Result<Exam, ApiError> {
        let exam = self.get_exam(exam_id).await?;
        if exam.status == ExamStatus::Published {
            return Err(ApiError::Conflict("Exam is already published".to_string()));
        }

        let question_count = self
            .mongo
            .collection::<Question>("questions")
            .count_documents(doc! { "exam_id": exam_id })
            .await
            .context("Failed to count questions")?;
        if question_count == 0 {
            return Err(ApiError::validation(
                "Cannot publish an exam with no questions",
            ));
        }

        let result = self
            .collection()
            .update_one(
                doc! { "_id": exam_id, "status": ExamStatus::Draft.as_str() },
                doc! { "$set": {
                    "status": ExamStatus::Published.as_str(),
                    "updatedAt": crate::utils::time::chrono_to_bson(Utc::now()),
                } },
            )
            .await
            .context("Failed to publish exam")?;
        if result.modified_count == 0 {
            return Err(ApiError::Conflict("Exam is already published".to_string()));
        }

        tracing::info!("Exam published: {}", exam_id);
        self.get_exam(exam_id).await
    }

    /// Set the grading deadline and (optionally) the result release moment.
    /// Error-severity violations reject the whole update; warnings are
    /// returned alongside the updated exam.
    pub async fn update_schedule(
        &self,
        exam_id: &str,
        req: &ScheduleUpdateRequest,
    ) -> Result<(Exam, Vec<ScheduleViolation>), ApiError> {
        let exam = self.get_exam(exam_id).await?;
        if exam.results_finalized {
            return Err(ApiError::Lock(
                "Results have been finalized; the schedule can no longer change".to_string(),
            ));
        }

        let violations = self.check_schedule(&exam, req)?;
        if has_errors(&violations) {
            return Err(ApiError::Validation(error_messages(&violations)));
        }

        let mut set = doc! {
            "grading_deadline_date": &req.grading_deadline_date,
            "grading_deadline_time": &req.grading_deadline_time,
            "updatedAt": crate::utils::time::chrono_to_bson(Utc::now()),
        };
        if let (Some(date), Some(time)) = (&req.result_release_date, &req.result_release_time) {
            set.insert("result_release_date", date);
            set.insert("result_release_time", time);
        }

        self.collection()
            .update_one(doc! { "_id": exam_id }, doc! { "$set": set })
            .await
            .context("Failed to update exam schedule")?;

        tracing::info!("Schedule updated for exam {}", exam_id);
        let updated = self.get_exam(exam_id).await?;
        Ok((updated, violations))
    }

    /// Dry-run of the schedule rules for the configuration UI.
    pub async fn preview_schedule(
        &self,
        exam_id: &str,
        req: &ScheduleUpdateRequest,
    ) -> Result<Vec<ScheduleViolation>, ApiError> {
        let exam = self.get_exam(exam_id).await?;
        self.check_schedule(&exam, req)
    }

    fn check_schedule(
        &self,
        exam: &Exam,
        req: &ScheduleUpdateRequest,
    ) -> Result<Vec<ScheduleViolation>, ApiError> {
        let release = match (&req.result_release_date, &req.result_release_time) {
            (Some(date), Some(time)) => Some((date.as_str(), time.as_str())),
            (None, None) => None,
            _ => {
                return Err(ApiError::validation(
                    "Result release date and time must be provided together",
                ))
            }
        };

        let input = ScheduleInput {
            exam_date: &exam.exam_date,
            exam_end_time: &exam.end_time,
            deadline_date: &req.grading_deadline_date,
            deadline_time: &req.grading_deadline_time,
            release,
        };
        validate_schedule(&input, self.clock.now())
    }

    fn collection(&self) -> mongodb::Collection<Exam> {
        self.mongo.collection::<Exam>("exams")
    }
}
