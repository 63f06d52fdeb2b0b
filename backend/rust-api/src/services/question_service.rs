use anyhow::Context;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{
    CreateQuestionRequest, Exam, Question, QuestionDetails, QuestionKind,
};

pub struct QuestionService {
    mongo: Database,
}

impl QuestionService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    /// Append a question with the next dense number for its kind. Callers
    /// must hold the per-exam lock so numbering races with deletes cannot
    /// interleave.
    pub async fn add_question(
        &self,
        exam: &Exam,
        req: CreateQuestionRequest,
    ) -> Result<Question, ApiError> {
        if exam.results_finalized {
            return Err(ApiError::Lock(
                "Results have been finalized; questions can no longer change".to_string(),
            ));
        }
        if req.marks <= 0.0 {
            return Err(ApiError::validation("Marks must be a positive number"));
        }
        if let QuestionDetails::Mcq { options, .. } = &req.details {
            if [&options.a, &options.b, &options.c, &options.d]
                .iter()
                .any(|o| o.trim().is_empty())
            {
                return Err(ApiError::validation("All four options are required"));
            }
        }
        if let QuestionDetails::ShortAnswer { sample_answer } = &req.details {
            if sample_answer.trim().is_empty() {
                return Err(ApiError::validation("A sample answer is required"));
            }
        }

        let kind = match req.details {
            QuestionDetails::Mcq { .. } => QuestionKind::Mcq,
            QuestionDetails::ShortAnswer { .. } => QuestionKind::ShortAnswer,
        };
        let existing = self
            .collection()
            .count_documents(doc! { "exam_id": &exam.id, "kind": kind.as_str() })
            .await
            .context("Failed to count questions")?;

        let question = Question {
            id: Uuid::new_v4().to_string(),
            exam_id: exam.id.clone(),
            question_no: existing as u32 + 1,
            text: req.text,
            marks: req.marks,
            details: req.details,
            created_at: Utc::now(),
        };

        self.collection()
            .insert_one(&question)
            .await
            .context("Failed to insert question")?;

        tracing::info!(
            "Question {} added to exam {} as {} #{}",
            question.id,
            exam.id,
            kind.as_str(),
            question.question_no
        );
        Ok(question)
    }

    /// Delete a question and close the numbering gap it leaves. Callers must
    /// hold the per-exam lock: the delete and the renumber of every
    /// higher-numbered question of the same kind form one logical unit.
    pub async fn delete_question(&self, exam: &Exam, question_id: &str) -> Result<(), ApiError> {
        if exam.results_finalized {
            return Err(ApiError::Lock(
                "Results have been finalized; questions can no longer change".to_string(),
            ));
        }

        let question = self
            .collection()
            .find_one(doc! { "_id": question_id, "exam_id": &exam.id })
            .await
            .context("Failed to query question")?
            .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

        self.collection()
            .delete_one(doc! { "_id": question_id })
            .await
            .context("Failed to delete question")?;

        self.collection()
            .update_many(
                doc! {
                    "exam_id": &exam.id,
                    "kind": question.kind().as_str(),
                    "question_no": { "$gt": question.question_no as i64 },
                },
                doc! { "$inc": { "question_no": -1 } },
            )
            .await
            .context("Failed to renumber questions")?;

        tracing::info!(
            "Question {} deleted from exam {}; {} questions renumbered from #{}",
            question_id,
            exam.id,
            question.kind().as_str(),
            question.question_no
        );
        Ok(())
    }

    pub async fn questions_for_exam(&self, exam_id: &str) -> Result<Vec<Question>, ApiError> {
        let cursor = self
            .collection()
            .find(doc! { "exam_id": exam_id })
            .sort(doc! { "kind": 1, "question_no": 1 })
            .await
            .context("Failed to query questions")?;
        let questions = cursor
            .try_collect()
            .await
            .context("Failed to read questions cursor")?;
        Ok(questions)
    }

    fn collection(&self) -> mongodb::Collection<Question> {
        self.mongo.collection::<Question>("questions")
    }
}
