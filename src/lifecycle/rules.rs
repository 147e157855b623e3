//! Transition table and snapshot computation.
//!
//! | Transition            | Roles                        | From                              | To                  |
//! |-----------------------|------------------------------|-----------------------------------|---------------------|
//! | approve               | Dispatcher                   | AwaitingTriage, NeedsClarification| Approved            |
//! | reject                | Dispatcher                   | AwaitingTriage                    | Rejected            |
//! | request_clarification | Dispatcher                   | AwaitingTriage                    | NeedsClarification  |
//! | return_to_triage      | Dispatcher                   | NeedsClarification                | AwaitingTriage      |
//! | depart_to_scene       | ResponseTeam (assigned)      | Approved                          | EnRouteToScene      |
//! | arrive_on_scene       | ResponseTeam (assigned)      | EnRouteToScene                    | OnScene             |
//! | depart_to_hospital    | ResponseTeam (assigned)      | OnScene                           | EnRouteToHospital   |
//! | complete              | ResponseTeam (assigned)      | EnRouteToHospital                 | Completed           |
//! | cancel                | Dispatcher, ResponseTeam (assigned) | any non-terminal           | Cancelled           |
//!
//! Citizens and Leadership hold no transition rights.

use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::{Transition, TransitionError, TransitionKind, TransitionRequest};
use crate::db::repository::format_timestamp;
use crate::models::enums::{ReportStatus, Role};
use crate::models::{Actor, Report, User};

use ReportStatus::*;

const NON_TERMINAL: &[ReportStatus] = &[
    AwaitingTriage,
    NeedsClarification,
    Approved,
    EnRouteToScene,
    OnScene,
    EnRouteToHospital,
];

pub fn allowed_roles(kind: TransitionKind) -> &'static [Role] {
    match kind {
        TransitionKind::Approve
        | TransitionKind::Reject
        | TransitionKind::RequestClarification
        | TransitionKind::ReturnToTriage => &[Role::Dispatcher],
        TransitionKind::DepartToScene
        | TransitionKind::ArriveOnScene
        | TransitionKind::DepartToHospital
        | TransitionKind::Complete => &[Role::ResponseTeam],
        TransitionKind::Cancel => &[Role::Dispatcher, Role::ResponseTeam],
    }
}

pub fn source_statuses(kind: TransitionKind) -> &'static [ReportStatus] {
    match kind {
        TransitionKind::Approve => &[AwaitingTriage, NeedsClarification],
        TransitionKind::Reject | TransitionKind::RequestClarification => &[AwaitingTriage],
        TransitionKind::ReturnToTriage => &[NeedsClarification],
        TransitionKind::DepartToScene => &[Approved],
        TransitionKind::ArriveOnScene => &[EnRouteToScene],
        TransitionKind::DepartToHospital => &[OnScene],
        TransitionKind::Complete => &[EnRouteToHospital],
        TransitionKind::Cancel => NON_TERMINAL,
    }
}

pub fn target_status(kind: TransitionKind) -> ReportStatus {
    match kind {
        TransitionKind::Approve => Approved,
        TransitionKind::Reject => Rejected,
        TransitionKind::RequestClarification => NeedsClarification,
        TransitionKind::ReturnToTriage => AwaitingTriage,
        TransitionKind::DepartToScene => EnRouteToScene,
        TransitionKind::ArriveOnScene => OnScene,
        TransitionKind::DepartToHospital => EnRouteToHospital,
        TransitionKind::Complete => Completed,
        TransitionKind::Cancel => Cancelled,
    }
}

/// Transitions an actor in `role` could take from `status`, ignoring
/// assignment ownership.
pub fn available_transitions(status: ReportStatus, role: Role) -> Vec<TransitionKind> {
    TransitionKind::ALL
        .iter()
        .copied()
        .filter(|k| allowed_roles(*k).contains(&role) && source_statuses(*k).contains(&status))
        .collect()
}

/// Transitions `actor` may take on `report` right now. A response team only
/// gets field transitions on reports assigned to it.
pub fn allowed_transitions(report: &Report, actor: &Actor) -> Vec<TransitionKind> {
    if actor.role == Role::ResponseTeam && report.assigned_volunteer_id != Some(actor.user_id) {
        return Vec::new();
    }
    available_transitions(report.status, actor.role)
}

/// State, precondition, role and ownership checks, in that order.
/// Payload checks happen in the engine once these pass.
pub fn check_rights(
    report: &Report,
    actor: &Actor,
    request: &TransitionRequest,
) -> Result<(), TransitionError> {
    let kind = request.transition.kind();

    if report.status.is_terminal() {
        return Err(TransitionError::TerminalState {
            id: report.id.clone(),
            status: report.status,
        });
    }

    if request.expected_status != report.status {
        return Err(TransitionError::InvalidTransition {
            current: report.status,
            transition: kind,
        });
    }

    if !allowed_roles(kind).contains(&actor.role) {
        return Err(TransitionError::Unauthorized {
            role: actor.role,
            transition: kind,
        });
    }

    if !source_statuses(kind).contains(&report.status) {
        return Err(TransitionError::InvalidTransition {
            current: report.status,
            transition: kind,
        });
    }

    // Field transitions belong to the assigned team only.
    if actor.role == Role::ResponseTeam && report.assigned_volunteer_id != Some(actor.user_id) {
        return Err(TransitionError::Unauthorized {
            role: actor.role,
            transition: kind,
        });
    }

    Ok(())
}

/// Assignee must be an active response-team user.
pub fn check_assignee(volunteer: &User) -> Result<(), TransitionError> {
    if volunteer.role != Role::ResponseTeam {
        return Err(TransitionError::InvalidAssignee(volunteer.id));
    }
    if !volunteer.is_active() {
        return Err(TransitionError::InactiveAssignee(volunteer.id));
    }
    Ok(())
}

/// `[STATUS]: <timestamp>` with an optional ` - <note>` on the same line.
pub fn note_line(status: ReportStatus, at: &DateTime<Utc>, note: Option<&str>) -> String {
    let mut line = format!("[{}]: {}", status.note_tag(), format_timestamp(at));
    let flattened = note
        .map(|n| n.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|n| !n.is_empty());
    if let Some(n) = flattened {
        line.push_str(" - ");
        line.push_str(&n);
    }
    line
}

/// Millisecond timestamp strictly after `previous`.
pub fn next_timestamp(previous: &DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(3);
    let floor = previous.trunc_subsecs(3) + Duration::milliseconds(1);
    now.max(floor)
}

/// New snapshot after a validated transition.
pub fn advance(report: &Report, request: &TransitionRequest, at: DateTime<Utc>) -> Report {
    let target = target_status(request.transition.kind());
    let mut next = report.clone();
    next.status = target;

    match &request.transition {
        Transition::Approve {
            volunteer_id: Some(id),
        } => next.assigned_volunteer_id = Some(*id),
        Transition::Complete {
            volunteer_report: Some(vr),
        } => next.volunteer_report = Some(vr.clone()),
        _ => {}
    }

    let line = note_line(target, &at, request.note.as_deref());
    if !next.admin_notes.is_empty() {
        next.admin_notes.push('\n');
    }
    next.admin_notes.push_str(&line);
    next.updated_at = at;
    next
}
