//! `GET /api/analytics/summary` - leadership dashboard statistics.

use axum::extract::State;
use axum::{Extension, Json};

use crate::access;
use crate::analytics::{self, Summary};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository::{ReportStore, UserStore};
use crate::models::{ReportFilter, UserFilter};

pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Summary>, ApiError> {
    if !access::can_view_statistics(auth.user.role) {
        return Err(ApiError::Forbidden(format!(
            "Role {} may not view statistics",
            auth.user.role
        )));
    }
    let store = ctx.core.store();
    let reports = store.list_reports(&ReportFilter::default())?;
    let users = store.list_users(&UserFilter::default())?;
    Ok(Json(analytics::summarize(&reports, &users)))
}
