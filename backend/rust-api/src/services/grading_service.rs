use std::collections::HashMap;

use anyhow::Context;
use chrono::Utc;
use mongodb::bson::{doc, to_bson};
use mongodb::Database;

use crate::errors::ApiError;
use crate::metrics::{EXAMS_FINALIZED_TOTAL, GRADES_RECORDED_TOTAL};
use crate::models::{
    ClassStatistics, Exam, Question, QuestionKind, RecordGradesRequest, ShortAnswerGrade,
    Submission,
};
use crate::services::deadline::grading_lock_status;
use crate::services::grading::{
    class_statistics, combine_scores, is_sa_complete, short_answer_obtained,
    validate_awarded_marks,
};
use crate::services::question_service::QuestionService;
use crate::services::submission_service::SubmissionService;
use crate::utils::time::Clock;

/// At most this many offending students are named in a finalize rejection;
/// the count is always exact.
const UNGRADED_DISPLAY_LIMIT: usize = 10;

pub struct GradingService {
    mongo: Database,
    clock: Clock,
}

impl GradingService {
    pub fn new(mongo: Database, clock: Clock) -> Self {
        Self { mongo, clock }
    }

    /// Record short-answer grades for one submission. Validation problems are
    /// aggregated across the whole request and reported together; nothing is
    /// written unless every entry passes.
    pub async fn record_short_answer_grades(
        &self,
        exam: &Exam,
        student_id: &str,
        grader_id: &str,
        req: RecordGradesRequest,
    ) -> Result<Submission, ApiError> {
        let lock = grading_lock_status(exam, self.clock.now())?;
        if lock.is_locked {
            return Err(ApiError::Lock(lock.message));
        }
        if req.grades.is_empty() {
            return Err(ApiError::validation("No grades supplied"));
        }

        let questions = QuestionService::new(self.mongo.clone())
            .questions_for_exam(&exam.id)
            .await?;
        let sa_questions: HashMap<u32, &Question> = questions
            .iter()
            .filter(|q| q.kind() == QuestionKind::ShortAnswer)
            .map(|q| (q.question_no, q))
            .collect();

        let submission_service = SubmissionService::new(self.mongo.clone(), self.clock);
        let mut submission = submission_service.get(&exam.id, student_id).await?;

        let mut problems = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for entry in &req.grades {
            if !seen.insert(entry.question_no) {
                problems.push(format!(
                    "Question {}: graded twice in one request",
                    entry.question_no
                ));
                continue;
            }
            match sa_questions.get(&entry.question_no) {
                None => problems.push(format!(
                    "Question {}: no such short-answer question",
                    entry.question_no
                )),
                Some(question) => problems.extend(validate_awarded_marks(
                    entry.question_no,
                    entry.awarded_marks,
                    question.marks,
                )),
            }
        }
        if !problems.is_empty() {
            return Err(ApiError::Validation(problems));
        }

        let now = Utc::now();
        for entry in req.grades {
            let question = sa_questions[&entry.question_no];
            submission.sa_grades.insert(
                question.answer_key(),
                ShortAnswerGrade {
                    awarded_marks: entry.awarded_marks,
                    max_marks: question.marks,
                    feedback: entry.feedback,
                    graded_by: grader_id.to_string(),
                    graded_at: now,
                },
            );
        }

        submission.sa_graded = is_sa_complete(&questions, &submission.sa_grades);
        submission.combined = combine_scores(
            submission.mcq_result.obtained_marks,
            submission.mcq_result.total_marks,
            short_answer_obtained(&submission.sa_grades),
            submission.combined.sa_total,
        );

        self.mongo
            .collection::<Submission>("submissions")
            .update_one(
                doc! { "_id": &submission.id },
                doc! { "$set": {
                    "sa_grades": to_bson(&submission.sa_grades)
                        .context("Failed to serialize grades")?,
                    "sa_graded": submission.sa_graded,
                    "combined": to_bson(&submission.combined)
                        .context("Failed to serialize combined score")?,
                } },
            )
            .await
            .context("Failed to persist grades")?;

        GRADES_RECORDED_TOTAL.inc();
        tracing::info!(
            "Short-answer grades recorded for exam {} student {} by {} (complete={})",
            exam.id,
            student_id,
            grader_id,
            submission.sa_graded
        );
        Ok(submission)
    }

    /// One-way finalization: snapshot class statistics and permanently close
    /// grading. The flag write is conditional on `results_finalized` still
    /// being false, so two concurrent finalizes cannot both succeed.
    pub async fn finalize(
        &self,
        exam: &Exam,
        finalized_by: &str,
    ) -> Result<ClassStatistics, ApiError> {
        if exam.results_finalized {
            return Err(ApiError::Conflict(
                "Results are already finalized".to_string(),
            ));
        }

        let submissions = SubmissionService::new(self.mongo.clone(), self.clock)
            .list_for_exam(&exam.id)
            .await?;
        if submissions.is_empty() {
            return Err(ApiError::validation(
                "Cannot finalize an exam with no submissions",
            ));
        }

        let ungraded: Vec<&str> = submissions
            .iter()
            .filter(|s| !s.is_fully_graded())
            .map(|s| s.student_id.as_str())
            .collect();
        if !ungraded.is_empty() {
            let mut display: Vec<String> = ungraded
                .iter()
                .take(UNGRADED_DISPLAY_LIMIT)
                .map(|s| s.to_string())
                .collect();
            if ungraded.len() > UNGRADED_DISPLAY_LIMIT {
                display.push(format!(
                    "... and {} more",
                    ungraded.len() - UNGRADED_DISPLAY_LIMIT
                ));
            }
            let mut problems =
                vec![format!("{} submission(s) are not fully graded", ungraded.len())];
            problems.push(format!("Ungraded students: {}", display.join(", ")));
            return Err(ApiError::Validation(problems));
        }

        let percentages: Vec<f64> = submissions
            .iter()
            .map(|s| s.combined.overall_percentage)
            .collect();
        let statistics = class_statistics(&percentages);

        let result = self
            .mongo
            .collection::<Exam>("exams")
            .update_one(
                doc! { "_id": &exam.id, "results_finalized": false },
                doc! { "$set": {
                    "results_finalized": true,
                    "finalizedAt": crate::utils::time::chrono_to_bson(Utc::now()),
                    "finalized_by": finalized_by,
                    "statistics": to_bson(&statistics)
                        .context("Failed to serialize statistics")?,
                    "updatedAt": crate::utils::time::chrono_to_bson(Utc::now()),
                } },
            )
            .await
            .context("Failed to finalize exam")?;
        if result.modified_count == 0 {
            // lost the race: another finalize got there first
            return Err(ApiError::Conflict(
                "Results are already finalized".to_string(),
            ));
        }

        EXAMS_FINALIZED_TOTAL.inc();
        tracing::info!(
            "Exam {} finalized by {} ({} submissions)",
            exam.id,
            finalized_by,
            statistics.total_students
        );
        Ok(statistics)
    }
}
