//! Report endpoints.
//!
//! - `GET /api/reports` - reports visible to the caller (query filters)
//! - `POST /api/reports` - citizen submits a report
//! - `GET /api/reports/:id` - one report, if visible, with the transitions
//!   the caller may take on it
//! - `DELETE /api/reports/:id` - dispatcher only
//! - `POST /api/reports/:id/transitions` - lifecycle transition

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::lifecycle::{rules, Transition, TransitionKind, TransitionRequest};
use crate::models::enums::ReportStatus;
use crate::models::{Report, ReportFilter, VolunteerReport};
use crate::reports::{self, NewReport};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ReportFilter>, QueryRejection>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let Query(filter) = query?;
    let reports = reports::list_reports(ctx.core.store(), &auth.actor(), filter)?;
    Ok(Json(reports))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<NewReport>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let Json(draft) = body?;
    let report = reports::create_report(ctx.core.store(), &auth.user, draft)?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<ReportDetail>, ApiError> {
    let actor = auth.actor();
    let report = reports::get_report(ctx.core.store(), &actor, &id)?;
    Ok(Json(ReportDetail {
        allowed_transitions: rules::allowed_transitions(&report, &actor),
        report,
    }))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    reports::delete_report(ctx.core.store(), &auth.actor(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub allowed_transitions: Vec<TransitionKind>,
}

/// Transition request body. `transition` stays a plain string so that an
/// unknown name is answered with the lifecycle error taxonomy.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub transition: String,
    pub expected_status: ReportStatus,
    #[serde(default)]
    pub volunteer_id: Option<Uuid>,
    #[serde(default)]
    pub volunteer_report: Option<VolunteerReport>,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransitionBody {
    fn into_request(self, kind: TransitionKind) -> TransitionRequest {
        TransitionRequest {
            transition: Transition::from_parts(kind, self.volunteer_id, self.volunteer_report),
            expected_status: self.expected_status,
            note: self.note,
        }
    }
}

pub async fn transition(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<TransitionBody>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
    let Json(body) = body?;
    let engine = ctx.core.engine();
    let kind = match body.transition.parse::<TransitionKind>() {
        Ok(kind) => kind,
        Err(_) => return Err(engine.reject_unknown(&id, &body.transition).into()),
    };
    let report = engine.apply_transition(&id, &auth.actor(), body.into_request(kind))?;
    Ok(Json(report))
}
