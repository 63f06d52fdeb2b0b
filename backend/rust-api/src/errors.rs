use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<String>>,
}

/// Failure taxonomy for every fallible operation in the API. Each variant maps
/// to a distinct HTTP status so callers can render specific messages instead
/// of a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Date/time input that does not match the documented wire format.
    #[error("{0}")]
    Format(String),
    #[error("{0}")]
    NotFound(String),
    /// Aggregated validation failures, reported together rather than one at a
    /// time.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),
    /// The data may be fine, but the action is no longer permitted
    /// (deadline passed or results finalized). Distinct from `Validation`.
    #[error("{0}")]
    Lock(String),
    /// Double submission, double finalize and similar lost races.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Format(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Lock(_) | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (detail, violations) = match self {
            ApiError::Internal(err) => {
                tracing::error!("Internal server error: {:#}", err);
                ("Internal server error".to_string(), None)
            }
            ApiError::Validation(list) => ("Validation failed".to_string(), Some(list)),
            other => (other.to_string(), None),
        };

        (
            status,
            Json(ErrorBody {
                status: status.as_u16(),
                detail,
                violations,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_kind_to_its_status() {
        assert_eq!(
            ApiError::Format("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Lock("closed".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("twice".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::validation("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn lock_is_distinguishable_from_validation() {
        let lock = ApiError::Lock("grading deadline passed".into());
        let validation = ApiError::validation("marks out of range");
        assert!(matches!(lock, ApiError::Lock(_)));
        assert!(matches!(validation, ApiError::Validation(_)));
    }
}
