use mongodb::Database;

use crate::errors::ApiError;
use crate::metrics::RESULTS_VIEWED_TOTAL;
use crate::models::{ClassStatistics, Exam, StudentResultResponse};
use crate::services::deadline::is_released;
use crate::services::grading::class_statistics;
use crate::services::submission_service::SubmissionService;
use crate::utils::time::Clock;

pub struct ResultsService {
    mongo: Database,
    clock: Clock,
}

impl ResultsService {
    pub fn new(mongo: Database, clock: Clock) -> Self {
        Self { mongo, clock }
    }

    /// A student's own result. Before the release moment every score field is
    /// masked with `None` — a placeholder, not a zero, since zero is a real
    /// score.
    pub async fn student_result(
        &self,
        exam: &Exam,
        student_id: &str,
    ) -> Result<StudentResultResponse, ApiError> {
        let submission = SubmissionService::new(self.mongo.clone(), self.clock)
            .get(&exam.id, student_id)
            .await
            .map_err(|_| ApiError::NotFound("No submission found for this exam".to_string()))?;

        let released = is_released(exam, self.clock.now())?;
        let released_label = if released { "true" } else { "false" };
        RESULTS_VIEWED_TOTAL
            .with_label_values(&[released_label])
            .inc();

        if !released {
            return Ok(StudentResultResponse {
                exam_id: exam.id.clone(),
                exam_title: exam.title.clone(),
                released: false,
                message: "Results have not been released yet".to_string(),
                obtained_marks: None,
                total_marks: None,
                percentage: None,
                grade: None,
                passed: None,
                fully_graded: None,
            });
        }

        let combined = &submission.combined;
        Ok(StudentResultResponse {
            exam_id: exam.id.clone(),
            exam_title: exam.title.clone(),
            released: true,
            message: "Results released".to_string(),
            obtained_marks: Some(combined.overall_obtained),
            total_marks: Some(combined.overall_total),
            percentage: Some(combined.overall_percentage),
            grade: Some(combined.grade),
            passed: Some(combined.passed),
            fully_graded: Some(submission.is_fully_graded()),
        })
    }

    /// Lecturer-facing class statistics: the finalized snapshot when one
    /// exists, otherwise computed live from current submissions.
    pub async fn class_statistics(&self, exam: &Exam) -> Result<ClassStatistics, ApiError> {
        if let Some(statistics) = &exam.statistics {
            return Ok(statistics.clone());
        }

        let submissions = SubmissionService::new(self.mongo.clone(), self.clock)
            .list_for_exam(&exam.id)
            .await?;
        let percentages: Vec<f64> = submissions
            .iter()
            .map(|s| s.combined.overall_percentage)
            .collect();
        Ok(class_statistics(&percentages))
    }
}
