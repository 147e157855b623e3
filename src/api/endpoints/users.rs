//! User administration endpoints (dispatcher only).
//!
//! - `GET /api/users` - list, filterable by role / status
//! - `POST /api/users` - create
//! - `GET /api/users/response-teams` - assignment picker
//! - `PUT /api/users/:id/status` - activate / deactivate

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::models::enums::UserStatus;
use crate::models::{User, UserFilter};
use crate::users::{self, NewUser};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<UserFilter>, QueryRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let Query(filter) = query?;
    Ok(Json(users::list_users(ctx.core.store(), &auth.actor(), &filter)?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(new_user) = body?;
    let user = users::create_user(ctx.core.store(), &auth.actor(), new_user)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn response_teams(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(users::list_response_teams(ctx.core.store(), &auth.actor())?))
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: UserStatus,
}

pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = path?;
    let Json(body) = body?;
    let user = users::set_user_status(ctx.core.store(), &auth.actor(), &id, body.status)?;

    if user.status == UserStatus::Inactive {
        let revoked = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?
            .revoke_user(&user.id);
        tracing::info!(user_id = %user.id, revoked, "Sessions revoked for deactivated user");
    }
    Ok(Json(user))
}
