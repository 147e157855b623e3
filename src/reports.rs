//! Report submission and read access.
//!
//! Creation is the only mutation a citizen performs. Everything after that
//! goes through `lifecycle::LifecycleEngine`; deletion is a separate
//! dispatcher-only administrative action.

use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};
use rand::Rng;
use serde::Deserialize;

use crate::access;
use crate::db::repository::{format_timestamp, ReportStore};
use crate::db::DatabaseError;
use crate::models::enums::{IncidentCategory, ReportStatus, Role, Urgency};
use crate::models::{Actor, Report, ReportFilter, User};
use crate::triage;

/// Fresh ids tried before giving up on a colliding id.
const MAX_ID_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Role {role} may not {action}")]
    Unauthorized { role: Role, action: &'static str },

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

/// Citizen-submitted report form.
///
/// `category` / `urgency` are the reporter's overrides; missing values are
/// filled in by the triage classifier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReport {
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
    pub category: Option<IncidentCategory>,
    pub urgency: Option<Urgency>,
}

impl NewReport {
    fn check_required(&self) -> Result<(), ReportError> {
        if self.patient_name.trim().is_empty() {
            return Err(ReportError::MissingRequiredField("patient_name"));
        }
        if self.location.trim().is_empty() {
            return Err(ReportError::MissingRequiredField("location"));
        }
        if self.description.trim().is_empty() {
            return Err(ReportError::MissingRequiredField("description"));
        }
        Ok(())
    }

    /// Reporter overrides first, then the classifier, then `{Other, Stable}`.
    fn resolve_triage(&self) -> triage::Triage {
        let mut draft = triage::DraftTriage::default();
        if let Some(category) = self.category {
            draft.override_category(category);
        }
        if let Some(urgency) = self.urgency {
            draft.override_urgency(urgency);
        }
        draft.apply_description(&self.description);
        draft.triage
    }
}

/// `MED-<YYYYMMDD>-<4 random digits>`
pub fn generate_report_id(at: &DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("MED-{}-{:04}", at.format("%Y%m%d"), suffix)
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Submit a new report on behalf of `reporter`.
pub fn create_report(
    store: &dyn ReportStore,
    reporter: &User,
    draft: NewReport,
) -> Result<Report, ReportError> {
    if !access::can_create_reports(reporter.role) {
        return Err(ReportError::Unauthorized {
            role: reporter.role,
            action: "submit reports",
        });
    }
    draft.check_required()?;

    let triage = draft.resolve_triage();
    let now = Utc::now().trunc_subsecs(3);
    let mut report = Report {
        id: generate_report_id(&now),
        status: ReportStatus::AwaitingTriage,
        urgency: triage.urgency,
        category: triage.category,
        reporter_id: reporter.id,
        reporter_name: reporter.name.clone(),
        reporter_contact: reporter.phone.clone(),
        patient_name: draft.patient_name.trim().to_string(),
        patient_age: draft.patient_age,
        location: draft.location.trim().to_string(),
        location_link: clean_optional(draft.location_link),
        description: draft.description.trim().to_string(),
        chronology: clean_optional(draft.chronology),
        urgent_needs: draft
            .urgent_needs
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
        evidence_photo: clean_optional(draft.evidence_photo),
        event_date: draft.event_date,
        event_time: draft.event_time,
        assigned_volunteer_id: None,
        admin_notes: format!(
            "[{}]: {}",
            ReportStatus::AwaitingTriage.note_tag(),
            format_timestamp(&now)
        ),
        volunteer_report: None,
        created_at: now,
        updated_at: now,
    };

    let mut attempt = 1;
    loop {
        match store.create_report(&report) {
            Ok(created) => {
                tracing::info!(
                    report_id = %created.id,
                    urgency = %created.urgency,
                    category = %created.category,
                    "Report submitted"
                );
                return Ok(created);
            }
            Err(DatabaseError::Conflict { id, .. }) if attempt < MAX_ID_ATTEMPTS => {
                tracing::debug!(report_id = %id, attempt, "Report id collision, retrying");
                report.id = generate_report_id(&now);
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Reports visible to `actor`, newest first.
pub fn list_reports(
    store: &dyn ReportStore,
    actor: &Actor,
    filter: ReportFilter,
) -> Result<Vec<Report>, ReportError> {
    let mut reports = store.list_reports(&access::scope_filter(actor, filter))?;
    reports.retain(|r| access::check_report_access(actor, r).allowed);
    Ok(reports)
}

pub fn get_report(store: &dyn ReportStore, actor: &Actor, id: &str) -> Result<Report, ReportError> {
    let report = store
        .get_report(id)?
        .ok_or_else(|| ReportError::NotFound(id.to_string()))?;

    let decision = access::check_report_access(actor, &report);
    if !decision.allowed {
        tracing::warn!(
            report_id = id,
            actor = %actor.user_id,
            role = %actor.role,
            "Report read denied"
        );
        return Err(ReportError::Unauthorized {
            role: actor.role,
            action: "view this report",
        });
    }
    Ok(report)
}

pub fn delete_report(store: &dyn ReportStore, actor: &Actor, id: &str) -> Result<(), ReportError> {
    if !access::can_delete_reports(actor.role) {
        return Err(ReportError::Unauthorized {
            role: actor.role,
            action: "delete reports",
        });
    }
    match store.delete_report(id) {
        Ok(()) => {
            tracing::info!(report_id = id, actor = %actor.user_id, "Report deleted");
            Ok(())
        }
        Err(DatabaseError::NotFound { .. }) => Err(ReportError::NotFound(id.to_string())),
        Err(e) => Err(e.into()),
    }
}
