//! Session endpoints.
//!
//! `POST /api/auth/login` - Unprotected: email + password → bearer token
//! `POST /api/auth/logout` - Protected: revoke the current token
//! `GET /api/auth/me` - Protected: the authenticated user

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::models::User;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/auth/login`
///
/// Unknown email, wrong password and deactivated accounts all answer
/// the same 401.
pub async fn login(
    State(ctx): State<ApiContext>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;
    let (user, credential) = ctx
        .core
        .store()
        .find_credential(&request.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !credential.verify(&request.password) || !user.is_active() {
        tracing::warn!(email = %request.email.trim(), "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.issue(user.id)
    };

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse { token, user }))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    sessions.revoke(&auth.token_hash);
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<User> {
    Json(auth.user)
}
