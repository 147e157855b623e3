//! Repository layer - entity-scoped database operations.
//!
//! Free functions take a borrowed `Connection` (one module per entity).
//! `ReportStore` / `UserStore` are the collaborator contracts the
//! lifecycle engine and report service depend on; `SqliteStore` is the
//! production implementation over a single shared connection.

mod report;
mod user;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use super::DatabaseError;
use crate::auth::Credential;
use crate::models::enums::{ReportStatus, Role, UserStatus};
use crate::models::{Report, ReportFilter, User, UserFilter};

pub use report::*;
pub use user::*;

/// Persistence contract for reports.
pub trait ReportStore: Send + Sync {
    fn get_report(&self, id: &str) -> Result<Option<Report>, DatabaseError>;
    fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, DatabaseError>;
    /// Insert; `DatabaseError::Conflict` if the id is already taken.
    fn create_report(&self, report: &Report) -> Result<Report, DatabaseError>;
    /// Compare-and-swap on `status`: writes only if the stored status is
    /// still `expected`, otherwise `DatabaseError::Conflict`.
    fn update_report(&self, report: &Report, expected: ReportStatus)
        -> Result<Report, DatabaseError>;
    fn delete_report(&self, id: &str) -> Result<(), DatabaseError>;
}

/// Persistence contract for users.
pub trait UserStore: Send + Sync {
    fn get_user(&self, id: &Uuid) -> Result<Option<User>, DatabaseError>;
    fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError>;

    fn list_by_role(&self, role: Role) -> Result<Vec<User>, DatabaseError> {
        self.list_users(&UserFilter {
            role: Some(role),
            status: None,
        })
    }
}

/// SQLite-backed store shared by the HTTP layer and the engine.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(super::open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(super::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    pub fn create_user(&self, user: &User, credential: &Credential) -> Result<(), DatabaseError> {
        insert_user(&*self.connection()?, user, credential)
    }

    pub fn find_credential(
        &self,
        email: &str,
    ) -> Result<Option<(User, Credential)>, DatabaseError> {
        get_user_with_credential(&*self.connection()?, email)
    }

    pub fn set_user_status(&self, id: &Uuid, status: UserStatus) -> Result<(), DatabaseError> {
        update_user_status(&*self.connection()?, id, status)
    }

    pub fn user_count(&self) -> Result<i64, DatabaseError> {
        count_users(&*self.connection()?)
    }
}

impl ReportStore for SqliteStore {
    fn get_report(&self, id: &str) -> Result<Option<Report>, DatabaseError> {
        report::get_report(&*self.connection()?, id)
    }

    fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, DatabaseError> {
        report::list_reports(&*self.connection()?, filter)
    }

    fn create_report(&self, report: &Report) -> Result<Report, DatabaseError> {
        let conn = self.connection()?;
        insert_report(&conn, report)?;
        report::get_report(&conn, &report.id)?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Report".into(),
            id: report.id.clone(),
        })
    }

    fn update_report(
        &self,
        report: &Report,
        expected: ReportStatus,
    ) -> Result<Report, DatabaseError> {
        update_report_if_status(&*self.connection()?, report, expected)
    }

    fn delete_report(&self, id: &str) -> Result<(), DatabaseError> {
        report::delete_report(&*self.connection()?, id)
    }
}

impl UserStore for SqliteStore {
    fn get_user(&self, id: &Uuid) -> Result<Option<User>, DatabaseError> {
        user::get_user(&*self.connection()?, id)
    }

    fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
        user::list_users(&*self.connection()?, filter)
    }
}
