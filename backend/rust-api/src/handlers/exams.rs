use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::ApiError,
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::{CreateExamRequest, ExamStatus, ScheduleUpdateRequest, StudentExamView},
    services::{exam_service::ExamService, AppState},
};

use super::{ensure_staff, is_staff};

fn exam_service(state: &AppState) -> ExamService {
    ExamService::new(state.mongo.clone(), state.clock)
}

/// POST /api/v1/exams
pub async fn create_exam(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<CreateExamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;
    if let Err(e) = req.validate() {
        return Err(ApiError::validation(format!("Validation error: {e}")));
    }

    let (exam, warnings) = exam_service(&state).create_exam(req, &claims.sub).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "exam": exam, "warnings": warnings })),
    ))
}

/// GET /api/v1/exams — students only see published exams.
pub async fn list_exams(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Response, ApiError> {
    let staff = is_staff(&claims);
    let exams = exam_service(&state).list_exams(staff).await?;

    if staff {
        Ok(Json(exams).into_response())
    } else {
        let views: Vec<StudentExamView> = exams.iter().map(StudentExamView::from).collect();
        Ok(Json(views).into_response())
    }
}

/// GET /api/v1/exams/{id}
pub async fn get_exam(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<Response, ApiError> {
    let exam = exam_service(&state).get_exam(&exam_id).await?;

    if is_staff(&claims) {
        return Ok(Json(exam).into_response());
    }
    // drafts do not exist as far as students are concerned
    if exam.status != ExamStatus::Published {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }
    Ok(Json(StudentExamView::from(&exam)).into_response())
}

/// POST /api/v1/exams/{id}/publish
pub async fn publish_exam(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;
    let exam = exam_service(&state).publish_exam(&exam_id).await?;
    Ok(Json(exam))
}

/// PUT /api/v1/exams/{id}/schedule
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
    AppJson(req): AppJson<ScheduleUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;
    let (exam, violations) = exam_service(&state).update_schedule(&exam_id, &req).await?;
    Ok(Json(json!({ "exam": exam, "warnings": violations })))
}

/// POST /api/v1/exams/{id}/schedule/validate — dry run, writes nothing.
pub async fn validate_schedule_preview(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
    AppJson(req): AppJson<ScheduleUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;
    let violations = exam_service(&state).preview_schedule(&exam_id, &req).await?;
    Ok(Json(json!({ "violations": violations })))
}
