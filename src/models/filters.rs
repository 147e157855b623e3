use serde::Deserialize;
use uuid::Uuid;

use super::enums::{IncidentCategory, ReportStatus, Role, Urgency, UserStatus};

/// Report list filter. Every `Some` field narrows the result (AND).
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub urgency: Option<Urgency>,
    pub category: Option<IncidentCategory>,
    pub assigned_volunteer_id: Option<Uuid>,
    pub reporter_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}
