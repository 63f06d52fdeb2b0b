use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::ApiError,
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::RecordGradesRequest,
    services::{
        deadline::grading_lock_status, exam_service::ExamService, grading_service::GradingService,
        submission_service::SubmissionService, AppState,
    },
};

use super::ensure_staff;

/// GET /api/v1/exams/{id}/submissions/{student_id} — one submission with its
/// answers and grading state, for the grading screen.
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((exam_id, student_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;
    let submission = SubmissionService::new(state.mongo.clone(), state.clock)
        .get(&exam_id, &student_id)
        .await?;
    Ok(Json(submission))
}

/// PUT /api/v1/exams/{id}/submissions/{student_id}/grades
pub async fn record_grades(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((exam_id, student_id)): Path<(String, String)>,
    AppJson(req): AppJson<RecordGradesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;
    let submission = GradingService::new(state.mongo.clone(), state.clock)
        .record_short_answer_grades(&exam, &student_id, &claims.sub, req)
        .await?;
    Ok(Json(submission))
}

/// GET /api/v1/exams/{id}/grading-lock
pub async fn grading_lock(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;
    let lock = grading_lock_status(&exam, state.clock.now())?;
    Ok(Json(lock))
}

/// POST /api/v1/exams/{id}/finalize — one-way; snapshots class statistics.
pub async fn finalize_exam(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;
    let statistics = GradingService::new(state.mongo.clone(), state.clock)
        .finalize(&exam, &claims.sub)
        .await?;
    Ok(Json(json!({ "finalized": true, "statistics": statistics })))
}
