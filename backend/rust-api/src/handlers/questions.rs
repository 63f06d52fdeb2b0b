use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::ApiError,
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::{AccessStatus, CreateQuestionRequest, StudentQuestionView},
    services::{
        exam_service::ExamService, question_service::QuestionService,
        submission_service::SubmissionService, AppState,
    },
};

use super::{ensure_staff, is_staff};

/// GET /api/v1/exams/{id}/questions
///
/// Staff see everything. Students only get the sanitized view, and only while
/// the access gate reports the exam as active for them.
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<Response, ApiError> {
    let question_service = QuestionService::new(state.mongo.clone());

    if is_staff(&claims) {
        // 404 before listing so staff get a clean error for bad ids
        ExamService::new(state.mongo.clone(), state.clock)
            .get_exam(&exam_id)
            .await?;
        let questions = question_service.questions_for_exam(&exam_id).await?;
        return Ok(Json(questions).into_response());
    }

    let access = SubmissionService::new(state.mongo.clone(), state.clock)
        .check_access(&exam_id, &claims.sub)
        .await?;
    match access.status {
        AccessStatus::Active => {}
        AccessStatus::NotFound => {
            return Err(ApiError::NotFound("Exam not found".to_string()));
        }
        _ => {
            return Err(ApiError::Forbidden(
                "Exam is not currently accessible".to_string(),
            ));
        }
    }

    let questions = question_service.questions_for_exam(&exam_id).await?;
    let views: Vec<StudentQuestionView> = questions.iter().map(StudentQuestionView::from).collect();
    Ok(Json(views).into_response())
}

/// POST /api/v1/exams/{id}/questions
pub async fn add_question(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
    AppJson(req): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;
    if let Err(e) = req.validate() {
        return Err(ApiError::validation(format!("Validation error: {e}")));
    }

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;

    // numbering shares the renumber lock so adds and deletes cannot interleave
    let lock = state.exam_lock(&exam_id);
    let _guard = lock.lock().await;

    let question = QuestionService::new(state.mongo.clone())
        .add_question(&exam, req)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// DELETE /api/v1/exams/{id}/questions/{question_id}
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((exam_id, question_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;

    // delete + renumber is one logical unit, serialized per exam
    let lock = state.exam_lock(&exam_id);
    let _guard = lock.lock().await;

    QuestionService::new(state.mongo.clone())
        .delete_question(&exam, &question_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
