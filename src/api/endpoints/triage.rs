//! `POST /api/triage/classify` - advisory classification for a draft.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::models::enums::{IncidentCategory, Urgency};
use crate::triage;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: IncidentCategory,
    pub category_label: &'static str,
    pub urgency: Urgency,
    /// False when the description was too short and defaults were returned.
    pub classified: bool,
}

pub async fn classify(
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(request) = body?;
    let (result, classified) = match triage::classify_if_ready(&request.description) {
        Some(t) => (t, true),
        None => (triage::Triage::default(), false),
    };
    Ok(Json(ClassifyResponse {
        category: result.category,
        category_label: result.category.label(),
        urgency: result.urgency,
        classified,
    }))
}
