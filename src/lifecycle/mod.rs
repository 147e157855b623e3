//! Report lifecycle: the status state machine and its engine.
//!
//! `rules` holds the transition table (who may move a report from which
//! status to which) as pure functions. `engine` looks up the report and
//! assignee, validates against the table, writes the new snapshot with a
//! compare-and-swap on status, then emits a best-effort notification.

pub mod engine;
pub mod rules;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{ReportStatus, Role};
use crate::models::VolunteerReport;

pub use engine::LifecycleEngine;

// ═══════════════════════════════════════════════════════════
// Transitions
// ═══════════════════════════════════════════════════════════

/// Name of a transition, as accepted over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Approve,
    Reject,
    RequestClarification,
    ReturnToTriage,
    DepartToScene,
    ArriveOnScene,
    DepartToHospital,
    Complete,
    Cancel,
}

impl TransitionKind {
    pub const ALL: &'static [TransitionKind] = &[
        Self::Approve,
        Self::Reject,
        Self::RequestClarification,
        Self::ReturnToTriage,
        Self::DepartToScene,
        Self::ArriveOnScene,
        Self::DepartToHospital,
        Self::Complete,
        Self::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RequestClarification => "request_clarification",
            Self::ReturnToTriage => "return_to_triage",
            Self::DepartToScene => "depart_to_scene",
            Self::ArriveOnScene => "arrive_on_scene",
            Self::DepartToHospital => "depart_to_hospital",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

impl std::str::FromStr for TransitionKind {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TransitionError::UnknownTransition(s.to_string()))
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition together with its payload.
///
/// Payloads are optional at the type level so that a missing volunteer or
/// field report is reported as `MissingRequiredField` after the role checks,
/// not as a malformed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Approve { volunteer_id: Option<Uuid> },
    Reject,
    RequestClarification,
    ReturnToTriage,
    DepartToScene,
    ArriveOnScene,
    DepartToHospital,
    Complete { volunteer_report: Option<VolunteerReport> },
    Cancel,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Approve { .. } => TransitionKind::Approve,
            Self::Reject => TransitionKind::Reject,
            Self::RequestClarification => TransitionKind::RequestClarification,
            Self::ReturnToTriage => TransitionKind::ReturnToTriage,
            Self::DepartToScene => TransitionKind::DepartToScene,
            Self::ArriveOnScene => TransitionKind::ArriveOnScene,
            Self::DepartToHospital => TransitionKind::DepartToHospital,
            Self::Complete { .. } => TransitionKind::Complete,
            Self::Cancel => TransitionKind::Cancel,
        }
    }

    /// Build a transition from its name and the optional payload fields.
    pub fn from_parts(
        kind: TransitionKind,
        volunteer_id: Option<Uuid>,
        volunteer_report: Option<VolunteerReport>,
    ) -> Self {
        match kind {
            TransitionKind::Approve => Self::Approve { volunteer_id },
            TransitionKind::Reject => Self::Reject,
            TransitionKind::RequestClarification => Self::RequestClarification,
            TransitionKind::ReturnToTriage => Self::ReturnToTriage,
            TransitionKind::DepartToScene => Self::DepartToScene,
            TransitionKind::ArriveOnScene => Self::ArriveOnScene,
            TransitionKind::DepartToHospital => Self::DepartToHospital,
            TransitionKind::Complete => Self::Complete { volunteer_report },
            TransitionKind::Cancel => Self::Cancel,
        }
    }
}

/// One call to the engine: what to do, and the status the caller believes
/// the report is in.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub transition: Transition,
    pub expected_status: ReportStatus,
    /// Optional free-text remark appended to the audit line.
    pub note: Option<String>,
}

impl TransitionRequest {
    pub fn new(transition: Transition, expected_status: ReportStatus) -> Self {
        Self {
            transition,
            expected_status,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Typed rejection of a transition. Nothing is written when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Role {role} may not {transition} this report")]
    Unauthorized {
        role: Role,
        transition: TransitionKind,
    },

    #[error("Cannot {transition} a report that is {current}")]
    InvalidTransition {
        current: ReportStatus,
        transition: TransitionKind,
    },

    #[error("Unknown transition: {0}")]
    UnknownTransition(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Report {id} is {status} and can no longer change")]
    TerminalState { id: String, status: ReportStatus },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Volunteer {0} is not active")]
    InactiveAssignee(Uuid),

    #[error("User {0} is not a response team")]
    InvalidAssignee(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}
