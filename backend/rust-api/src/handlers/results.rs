use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    errors::ApiError,
    middlewares::auth::JwtClaims,
    models::ExamStatus,
    services::{exam_service::ExamService, results_service::ResultsService, AppState},
};

use super::{ensure_staff, ensure_student};

/// GET /api/v1/exams/{id}/results/me — the student's own result, masked
/// until the release gate opens.
pub async fn my_result(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_student(&claims)?;

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;
    if exam.status != ExamStatus::Published {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let result = ResultsService::new(state.mongo.clone(), state.clock)
        .student_result(&exam, &claims.sub)
        .await?;
    Ok(Json(result))
}

/// GET /api/v1/exams/{id}/statistics — finalized snapshot when present,
/// otherwise computed live.
pub async fn class_statistics(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    let exam = ExamService::new(state.mongo.clone(), state.clock)
        .get_exam(&exam_id)
        .await?;
    let statistics = ResultsService::new(state.mongo.clone(), state.clock)
        .class_statistics(&exam)
        .await?;
    Ok(Json(statistics))
}
