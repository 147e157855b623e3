//! API error types with structured JSON responses.
//!
//! Every domain rejection maps to one HTTP status and a stable error code:
//! `{"error": {"code": "...", "message": "..."}}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::lifecycle::TransitionError;
use crate::reports::ReportError;
use crate::users::UserError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { code: &'static str, message: String },
    #[error("{message}")]
    Unprocessable { code: &'static str, message: String },
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone()),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, *code, message.clone()),
            ApiError::Unprocessable { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, *code, message.clone())
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Retry after {retry_after}s"),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(val) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        let message = err.to_string();
        match err {
            TransitionError::Unauthorized { .. } => ApiError::Forbidden(message),
            TransitionError::InvalidTransition { .. } => ApiError::Conflict {
                code: "INVALID_TRANSITION",
                message,
            },
            TransitionError::UnknownTransition(_) => ApiError::Conflict {
                code: "INVALID_TRANSITION",
                message,
            },
            TransitionError::TerminalState { .. } => ApiError::Conflict {
                code: "TERMINAL_STATE",
                message,
            },
            TransitionError::MissingRequiredField(_) => ApiError::Unprocessable {
                code: "MISSING_REQUIRED_FIELD",
                message,
            },
            TransitionError::InactiveAssignee(_) => ApiError::Unprocessable {
                code: "INACTIVE_ASSIGNEE",
                message,
            },
            TransitionError::InvalidAssignee(_) => ApiError::Unprocessable {
                code: "INVALID_ASSIGNEE",
                message,
            },
            TransitionError::NotFound { .. } => ApiError::NotFound(message),
            TransitionError::Store(e) => e.into(),
        }
    }
}

/// Malformed request bodies keep the structured error shape. A body that
/// parses but does not fit the target type is 422, anything else 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::Unprocessable {
                code: "INVALID_BODY",
                message,
            },
            _ => ApiError::BadRequest(message),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let message = err.to_string();
        match err {
            ReportError::Unauthorized { .. } => ApiError::Forbidden(message),
            ReportError::MissingRequiredField(_) => ApiError::Unprocessable {
                code: "MISSING_REQUIRED_FIELD",
                message,
            },
            ReportError::NotFound(_) => ApiError::NotFound(message),
            ReportError::Store(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::Unauthorized(_) => ApiError::Forbidden(message),
            UserError::MissingRequiredField(_) => ApiError::Unprocessable {
                code: "MISSING_REQUIRED_FIELD",
                message,
            },
            UserError::WeakPassword => ApiError::Unprocessable {
                code: "WEAK_PASSWORD",
                message,
            },
            UserError::DuplicateEmail(_) => ApiError::Conflict {
                code: "DUPLICATE_EMAIL",
                message,
            },
            UserError::NotFound(_) => ApiError::NotFound(message),
            UserError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::lifecycle::TransitionKind;
    use crate::models::enums::{ReportStatus, Role};

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn rate_limited_returns_429_with_retry_after() {
        let response = ApiError::RateLimited { retry_after: 60 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
        assert_eq!(body_json(response).await["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "An internal error occurred"
        );
    }

    #[tokio::test]
    async fn transition_errors_map_to_statuses() {
        let cases: Vec<(TransitionError, StatusCode, &str)> = vec![
            (
                TransitionError::Unauthorized {
                    role: Role::Citizen,
                    transition: TransitionKind::Approve,
                },
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (
                TransitionError::InvalidTransition {
                    current: ReportStatus::Approved,
                    transition: TransitionKind::Reject,
                },
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
            ),
            (
                TransitionError::UnknownTransition("teleport".into()),
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
            ),
            (
                TransitionError::TerminalState {
                    id: "MED-1".into(),
                    status: ReportStatus::Completed,
                },
                StatusCode::CONFLICT,
                "TERMINAL_STATE",
            ),
            (
                TransitionError::MissingRequiredField("volunteer_id"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "MISSING_REQUIRED_FIELD",
            ),
            (
                TransitionError::InactiveAssignee(uuid::Uuid::nil()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "INACTIVE_ASSIGNEE",
            ),
            (
                TransitionError::NotFound {
                    entity: "Report",
                    id: "MED-1".into(),
                },
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                TransitionError::Store(DatabaseError::LockPoisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
            ),
        ];

        for (err, status, code) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_json(response).await["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let response = ApiError::from(UserError::DuplicateEmail("a@b.c".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
