//! Read access and administrative capabilities per role.
//!
//! Report visibility is a short cascade, checked in order:
//! 1. Dispatcher / Leadership → every report
//! 2. Reporter reading their own report → allowed
//! 3. Response team assigned to the report → allowed
//! 4. Response team, report still open (awaiting triage or approved) → allowed
//! 5. Default → DENY
//!
//! Status transitions are not decided here; see `lifecycle::rules`.

use crate::models::enums::{ReportStatus, Role};
use crate::models::{Actor, Report, ReportFilter};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Why access was granted (or denied), for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// Dispatcher or leadership oversight of all reports.
    Oversight,
    /// Citizen reading a report they submitted.
    OwnReport,
    /// Response team reading a report assigned to them.
    AssignedTeam,
    /// Response team reading an open report for situational awareness.
    OpenReport,
    /// No matching rule.
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            reason: AccessReason::Denied,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Report visibility
// ═══════════════════════════════════════════════════════════

pub fn check_report_access(actor: &Actor, report: &Report) -> AccessDecision {
    match actor.role {
        Role::Dispatcher | Role::Leadership => AccessDecision::allow(AccessReason::Oversight),
        Role::Citizen if report.reporter_id == actor.user_id => {
            AccessDecision::allow(AccessReason::OwnReport)
        }
        Role::ResponseTeam if report.assigned_volunteer_id == Some(actor.user_id) => {
            AccessDecision::allow(AccessReason::AssignedTeam)
        }
        Role::ResponseTeam
            if matches!(
                report.status,
                ReportStatus::AwaitingTriage | ReportStatus::Approved
            ) =>
        {
            AccessDecision::allow(AccessReason::OpenReport)
        }
        _ => AccessDecision::deny(),
    }
}

/// Narrow a list filter to what the store can pre-select for this actor.
/// Rows must still pass `check_report_access`.
pub fn scope_filter(actor: &Actor, filter: ReportFilter) -> ReportFilter {
    match actor.role {
        Role::Citizen => ReportFilter {
            reporter_id: Some(actor.user_id),
            ..filter
        },
        _ => filter,
    }
}

// ═══════════════════════════════════════════════════════════
// Administrative capabilities
// ═══════════════════════════════════════════════════════════

/// Only citizens submit reports.
pub fn can_create_reports(role: Role) -> bool {
    role == Role::Citizen
}

pub fn can_delete_reports(role: Role) -> bool {
    role == Role::Dispatcher
}

pub fn can_manage_users(role: Role) -> bool {
    role == Role::Dispatcher
}

pub fn can_view_statistics(role: Role) -> bool {
    matches!(role, Role::Dispatcher | Role::Leadership)
}
