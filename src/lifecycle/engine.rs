use std::sync::Arc;

use chrono::Utc;

use super::rules;
use super::{Transition, TransitionError, TransitionRequest};
use crate::db::repository::{ReportStore, UserStore};
use crate::db::DatabaseError;
use crate::models::{Actor, Report};
use crate::notification::{NotificationIntent, Notifier};

/// Applies lifecycle transitions against the report and user stores.
pub struct LifecycleEngine {
    reports: Arc<dyn ReportStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
}

impl LifecycleEngine {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            reports,
            users,
            notifier,
        }
    }

    /// Validate and apply one transition.
    ///
    /// All checks run before anything is written. The write itself is a
    /// compare-and-swap on the status the report was read in, so a concurrent
    /// writer that got there first turns this call into `InvalidTransition`.
    pub fn apply_transition(
        &self,
        report_id: &str,
        actor: &Actor,
        request: TransitionRequest,
    ) -> Result<Report, TransitionError> {
        let kind = request.transition.kind();
        let current = self
            .reports
            .get_report(report_id)?
            .ok_or_else(|| TransitionError::NotFound {
                entity: "Report",
                id: report_id.to_string(),
            })?;

        rules::check_rights(&current, actor, &request)?;
        self.check_payload(&request.transition)?;

        let at = rules::next_timestamp(&current.updated_at, Utc::now());
        let next = rules::advance(&current, &request, at);

        let stored = match self.reports.update_report(&next, current.status) {
            Ok(stored) => stored,
            Err(DatabaseError::Conflict { .. }) => {
                tracing::info!(
                    report_id,
                    transition = %kind,
                    "Transition lost a concurrent update race"
                );
                return Err(TransitionError::InvalidTransition {
                    current: current.status,
                    transition: kind,
                });
            }
            Err(DatabaseError::NotFound { .. }) => {
                return Err(TransitionError::NotFound {
                    entity: "Report",
                    id: report_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            report_id,
            actor = %actor.user_id,
            role = %actor.role,
            from = %current.status,
            to = %stored.status,
            "Report transitioned"
        );

        self.notify_reporter(&stored);
        Ok(stored)
    }

    /// Reject a transition name the state machine does not define. The
    /// report still gets its existence and terminal checks first, so the
    /// caller sees the same error a known transition would have produced.
    pub fn reject_unknown(&self, report_id: &str, name: &str) -> TransitionError {
        let current = match self.reports.get_report(report_id) {
            Ok(Some(report)) => report,
            Ok(None) => {
                return TransitionError::NotFound {
                    entity: "Report",
                    id: report_id.to_string(),
                }
            }
            Err(e) => return e.into(),
        };
        if current.status.is_terminal() {
            return TransitionError::TerminalState {
                id: current.id,
                status: current.status,
            };
        }
        tracing::info!(report_id, transition = name, "Unknown transition requested");
        TransitionError::UnknownTransition(name.to_string())
    }

    fn check_payload(&self, transition: &Transition) -> Result<(), TransitionError> {
        match transition {
            Transition::Approve { volunteer_id } => {
                let id = volunteer_id.ok_or(TransitionError::MissingRequiredField("volunteer_id"))?;
                let volunteer = self
                    .users
                    .get_user(&id)?
                    .ok_or_else(|| TransitionError::NotFound {
                        entity: "User",
                        id: id.to_string(),
                    })?;
                rules::check_assignee(&volunteer)
            }
            Transition::Complete { volunteer_report } => {
                let vr = volunteer_report
                    .as_ref()
                    .ok_or(TransitionError::MissingRequiredField("volunteer_report"))?;
                match vr.missing_field() {
                    Some(field) => Err(TransitionError::MissingRequiredField(field)),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    fn notify_reporter(&self, report: &Report) {
        let intent = NotificationIntent {
            report_id: report.id.clone(),
            new_status: report.status,
            recipient_contact: report.reporter_contact.clone(),
        };
        if let Err(e) = self.notifier.notify(&intent) {
            tracing::warn!(report_id = %report.id, error = %e, "Reporter notification failed");
        }
    }
}
