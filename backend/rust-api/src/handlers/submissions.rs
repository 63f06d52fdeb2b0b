use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    errors::ApiError,
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::{AccessStatus, SubmissionSummary, SubmitExamRequest, SubmitExamResponse},
    services::{submission_service::SubmissionService, AppState},
};

use super::{ensure_staff, ensure_student};

/// GET /api/v1/exams/{id}/access — the student's view of the timing gate.
pub async fn check_access(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_student(&claims)?;

    let response = SubmissionService::new(state.mongo.clone(), state.clock)
        .check_access(&exam_id, &claims.sub)
        .await?;

    let status_code = if response.status == AccessStatus::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    Ok((status_code, Json(response)))
}

/// POST /api/v1/exams/{id}/submissions
///
/// Scores the multiple-choice part immediately; the response stays
/// score-free because visibility is governed by the release gate.
pub async fn submit_exam(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
    AppJson(req): AppJson<SubmitExamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_student(&claims)?;

    let (submission, question_count) = SubmissionService::new(state.mongo.clone(), state.clock)
        .submit(&exam_id, &claims.sub, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitExamResponse {
            submission_id: submission.id,
            submitted_at: submission.submitted_at,
            auto_submitted: submission.auto_submitted,
            answered_count: submission.answers.len(),
            question_count,
        }),
    ))
}

/// GET /api/v1/exams/{id}/submissions — grading progress for staff.
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;

    let submissions = SubmissionService::new(state.mongo.clone(), state.clock)
        .list_for_exam(&exam_id)
        .await?;
    let summaries: Vec<SubmissionSummary> =
        submissions.iter().map(SubmissionSummary::from).collect();
    Ok(Json(summaries))
}
