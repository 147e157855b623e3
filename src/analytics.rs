//! Aggregate statistics for the leadership dashboard.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::enums::{IncidentCategory, ReportStatus, Role, Urgency};
use crate::models::{Report, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamPerformance {
    pub user_id: Uuid,
    pub name: String,
    pub completed_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_reports: usize,
    /// Reports not yet in a terminal status.
    pub active: usize,
    pub completed: usize,
    pub rejected: usize,
    pub cancelled: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_urgency: BTreeMap<&'static str, usize>,
    pub by_category: BTreeMap<&'static str, usize>,
    /// One entry per response team, most completed first.
    pub team_performance: Vec<TeamPerformance>,
}

/// Every enum value gets a key, zero if no report has it.
fn zeroed<T: Copy>(values: &[T], key: fn(&T) -> &'static str) -> BTreeMap<&'static str, usize> {
    values.iter().map(|v| (key(v), 0)).collect()
}

pub fn summarize(reports: &[Report], users: &[User]) -> Summary {
    let mut by_status = zeroed(ReportStatus::ALL, ReportStatus::as_str);
    let mut by_urgency = zeroed(Urgency::ALL, Urgency::as_str);
    let mut by_category = zeroed(IncidentCategory::ALL, IncidentCategory::as_str);
    let mut completed_by_team: BTreeMap<Uuid, usize> = BTreeMap::new();

    for report in reports {
        *by_status.entry(report.status.as_str()).or_default() += 1;
        *by_urgency.entry(report.urgency.as_str()).or_default() += 1;
        *by_category.entry(report.category.as_str()).or_default() += 1;

        if report.status == ReportStatus::Completed {
            if let Some(team) = report.assigned_volunteer_id {
                *completed_by_team.entry(team).or_default() += 1;
            }
        }
    }

    let mut team_performance: Vec<TeamPerformance> = users
        .iter()
        .filter(|u| u.role == Role::ResponseTeam)
        .map(|u| TeamPerformance {
            user_id: u.id,
            name: u.name.clone(),
            completed_tasks: completed_by_team.get(&u.id).copied().unwrap_or(0),
        })
        .collect();
    team_performance.sort_by(|a, b| {
        b.completed_tasks
            .cmp(&a.completed_tasks)
            .then_with(|| a.name.cmp(&b.name))
    });

    let count = |status: ReportStatus| by_status[status.as_str()];

    Summary {
        total_reports: reports.len(),
        active: reports.iter().filter(|r| !r.status.is_terminal()).count(),
        completed: count(ReportStatus::Completed),
        rejected: count(ReportStatus::Rejected),
        cancelled: count(ReportStatus::Cancelled),
        by_status,
        by_urgency,
        by_category,
        team_performance,
    }
}
