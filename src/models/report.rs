use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{IncidentCategory, ReportStatus, Urgency};

/// One emergency request, tracked from submission to hand-over.
///
/// `status`, `assigned_volunteer_id`, `admin_notes`, `volunteer_report` and
/// `updated_at` are only ever changed by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub status: ReportStatus,
    pub urgency: Urgency,
    pub category: IncidentCategory,
    pub reporter_id: Uuid,
    pub reporter_name: String,
    /// WhatsApp / phone number that receives status notifications.
    pub reporter_contact: String,
    pub patient_name: String,
    pub patient_age: Option<u16>,
    pub location: String,
    pub location_link: Option<String>,
    pub description: String,
    pub chronology: Option<String>,
    pub urgent_needs: Vec<String>,
    pub evidence_photo: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub assigned_volunteer_id: Option<Uuid>,
    /// Append-only audit log, one line per status change.
    pub admin_notes: String,
    pub volunteer_report: Option<VolunteerReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field report filed by the assigned team when handing the patient over.
///
/// Every field deserializes to empty when absent so that blank and missing
/// values both surface as `MissingRequiredField` from the lifecycle checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolunteerReport {
    pub action_taken: String,
    pub hospital_name: String,
    /// Reference to the hand-over photo (upload id or data URL).
    pub photo: String,
}

impl VolunteerReport {
    /// Name of the first required field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.action_taken.trim().is_empty() {
            return Some("volunteer_report.action_taken");
        }
        if self.photo.trim().is_empty() {
            return Some("volunteer_report.photo");
        }
        None
    }
}
