use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const REPORT_COLUMNS: &str = "id, status, urgency, category, reporter_id, reporter_name,
     reporter_contact, patient_name, patient_age, location, location_link, description,
     chronology, urgent_needs, evidence_photo, event_date, event_time, assigned_volunteer_id,
     admin_notes, volunteer_report, created_at, updated_at";

/// RFC 3339 with millisecond precision, the storage format for every timestamp.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidValue {
            field: field.into(),
            value: value.into(),
        })
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidValue {
        field: field.into(),
        value: value.into(),
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Insert a new report. A taken id surfaces as `DatabaseError::Conflict`
/// so the caller can retry with a fresh one.
pub fn insert_report(conn: &Connection, report: &Report) -> Result<(), DatabaseError> {
    let result = conn.execute(
        &format!(
            "INSERT INTO reports ({REPORT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22)"
        ),
        params![
            report.id,
            report.status.as_str(),
            report.urgency.as_str(),
            report.category.as_str(),
            report.reporter_id.to_string(),
            report.reporter_name,
            report.reporter_contact,
            report.patient_name,
            report.patient_age,
            report.location,
            report.location_link,
            report.description,
            report.chronology,
            serde_json::to_string(&report.urgent_needs)?,
            report.evidence_photo,
            report.event_date.map(|d| d.to_string()),
            report.event_time.map(|t| t.format("%H:%M").to_string()),
            report.assigned_volunteer_id.map(|id| id.to_string()),
            report.admin_notes,
            report
                .volunteer_report
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            format_timestamp(&report.created_at),
            format_timestamp(&report.updated_at),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) && report_exists(conn, &report.id)? => {
            Err(DatabaseError::Conflict {
                entity_type: "Report".into(),
                id: report.id.clone(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

pub fn report_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_report(conn: &Connection, id: &str) -> Result<Option<Report>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"))?;
    let result = stmt.query_row(params![id], report_row_from_rusqlite);

    match result {
        Ok(row) => Ok(Some(report_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List reports matching the filter, newest first.
pub fn list_reports(
    conn: &Connection,
    filter: &ReportFilter,
) -> Result<Vec<Report>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(status) = &filter.status {
        clauses.push("status = ?");
        values.push(status.as_str().to_string());
    }
    if let Some(urgency) = &filter.urgency {
        clauses.push("urgency = ?");
        values.push(urgency.as_str().to_string());
    }
    if let Some(category) = &filter.category {
        clauses.push("category = ?");
        values.push(category.as_str().to_string());
    }
    if let Some(assignee) = &filter.assigned_volunteer_id {
        clauses.push("assigned_volunteer_id = ?");
        values.push(assignee.to_string());
    }
    if let Some(reporter) = &filter.reporter_id {
        clauses.push("reporter_id = ?");
        values.push(reporter.to_string());
    }

    let mut sql = format!("SELECT {REPORT_COLUMNS} FROM reports");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), report_row_from_rusqlite)?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(report_from_row(row?)?);
    }
    Ok(reports)
}

/// Persist the engine-owned fields of `report`, but only if the stored
/// status still equals `expected`. Returns the stored row.
pub fn update_report_if_status(
    conn: &Connection,
    report: &Report,
    expected: ReportStatus,
) -> Result<Report, DatabaseError> {
    let changed = conn.execute(
        "UPDATE reports SET status = ?1, urgency = ?2, category = ?3,
         assigned_volunteer_id = ?4, admin_notes = ?5, volunteer_report = ?6, updated_at = ?7
         WHERE id = ?8 AND status = ?9",
        params![
            report.status.as_str(),
            report.urgency.as_str(),
            report.category.as_str(),
            report.assigned_volunteer_id.map(|id| id.to_string()),
            report.admin_notes,
            report
                .volunteer_report
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            format_timestamp(&report.updated_at),
            report.id,
            expected.as_str(),
        ],
    )?;

    if changed == 0 {
        return if report_exists(conn, &report.id)? {
            Err(DatabaseError::Conflict {
                entity_type: "Report".into(),
                id: report.id.clone(),
            })
        } else {
            Err(DatabaseError::NotFound {
                entity_type: "Report".into(),
                id: report.id.clone(),
            })
        };
    }

    get_report(conn, &report.id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Report".into(),
        id: report.id.clone(),
    })
}

pub fn delete_report(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM reports WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Report".into(),
            id: id.into(),
        });
    }
    Ok(())
}

struct ReportRow {
    id: String,
    status: String,
    urgency: String,
    category: String,
    reporter_id: String,
    reporter_name: String,
    reporter_contact: String,
    patient_name: String,
    patient_age: Option<u16>,
    location: String,
    location_link: Option<String>,
    description: String,
    chronology: Option<String>,
    urgent_needs: String,
    evidence_photo: Option<String>,
    event_date: Option<String>,
    event_time: Option<String>,
    assigned_volunteer_id: Option<String>,
    admin_notes: String,
    volunteer_report: Option<String>,
    created_at: String,
    updated_at: String,
}

fn report_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        id: row.get(0)?,
        status: row.get(1)?,
        urgency: row.get(2)?,
        category: row.get(3)?,
        reporter_id: row.get(4)?,
        reporter_name: row.get(5)?,
        reporter_contact: row.get(6)?,
        patient_name: row.get(7)?,
        patient_age: row.get(8)?,
        location: row.get(9)?,
        location_link: row.get(10)?,
        description: row.get(11)?,
        chronology: row.get(12)?,
        urgent_needs: row.get(13)?,
        evidence_photo: row.get(14)?,
        event_date: row.get(15)?,
        event_time: row.get(16)?,
        assigned_volunteer_id: row.get(17)?,
        admin_notes: row.get(18)?,
        volunteer_report: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

fn report_from_row(row: ReportRow) -> Result<Report, DatabaseError> {
    Ok(Report {
        status: ReportStatus::from_str(&row.status)?,
        urgency: Urgency::from_str(&row.urgency)?,
        category: IncidentCategory::from_str(&row.category)?,
        reporter_id: parse_uuid("reporter_id", &row.reporter_id)?,
        reporter_name: row.reporter_name,
        reporter_contact: row.reporter_contact,
        patient_name: row.patient_name,
        patient_age: row.patient_age,
        location: row.location,
        location_link: row.location_link,
        description: row.description,
        chronology: row.chronology,
        urgent_needs: serde_json::from_str(&row.urgent_needs)?,
        evidence_photo: row.evidence_photo,
        event_date: row
            .event_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        event_time: row
            .event_time
            .and_then(|t| NaiveTime::parse_from_str(&t, "%H:%M").ok()),
        assigned_volunteer_id: row
            .assigned_volunteer_id
            .map(|s| parse_uuid("assigned_volunteer_id", &s))
            .transpose()?,
        admin_notes: row.admin_notes,
        volunteer_report: row
            .volunteer_report
            .map(|json| serde_json::from_str::<VolunteerReport>(&json))
            .transpose()?,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
        id: row.id,
    })
}
