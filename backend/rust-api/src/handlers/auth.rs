use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::ApiError,
    extractors::AppJson,
    middlewares::auth::{JwtClaims, JwtService},
    models::{LoginRequest, RegisterRequest},
    services::{auth_service::AuthService, AppState},
};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.mongo.clone(),
        JwtService::new(&state.config.jwt_secret),
        state.config.staff_signup_code.clone(),
    )
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::validation(format!("Validation error: {e}")));
    }

    tracing::info!("Registering new user: {}", req.email);
    let response = auth_service(&state).register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::validation(format!("Validation error: {e}")));
    }

    tracing::info!("Login attempt for user: {}", req.email);
    let response = auth_service(&state).login(req).await?;
    Ok(Json(response))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = auth_service(&state).profile(&claims.sub).await?;
    Ok(Json(profile))
}
