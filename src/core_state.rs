//! Shared application state handed to the HTTP layer.
//!
//! One `SqliteStore` backs both the report and user collaborator traits;
//! the lifecycle engine holds trait-object handles to the same store.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::BootstrapAdmin;
use crate::db::repository::SqliteStore;
use crate::db::DatabaseError;
use crate::lifecycle::LifecycleEngine;
use crate::models::enums::Role;
use crate::models::User;
use crate::notification::Notifier;
use crate::users::{self, NewUser, UserError};

pub struct CoreState {
    store: Arc<SqliteStore>,
    engine: LifecycleEngine,
    started_at: Instant,
}

impl CoreState {
    pub fn new(store: Arc<SqliteStore>, notifier: Arc<dyn Notifier>) -> Self {
        let engine = LifecycleEngine::new(store.clone(), store.clone(), notifier);
        Self {
            store,
            engine,
            started_at: Instant::now(),
        }
    }

    pub fn open(path: &Path, notifier: Arc<dyn Notifier>) -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?), notifier))
    }

    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(SqliteStore::open_in_memory()?), notifier))
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Create the first dispatcher account when the user table is empty.
    /// Returns `None` if users already exist.
    pub fn ensure_bootstrap_admin(
        &self,
        admin: &BootstrapAdmin,
    ) -> Result<Option<User>, UserError> {
        if self.store.user_count()? > 0 {
            return Ok(None);
        }
        let user = users::register_user(
            &self.store,
            NewUser {
                name: "Dispatcher".into(),
                email: admin.email.clone(),
                phone: String::new(),
                role: Role::Dispatcher,
                expertise: None,
                address: None,
                password: admin.password.clone(),
            },
        )?;
        tracing::info!(user_id = %user.id, email = %user.email, "Bootstrap dispatcher created");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::LogNotifier;

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            email: "admin@dinkes.test".into(),
            password: "ambulans-siaga".into(),
        }
    }

    #[test]
    fn bootstrap_runs_once() {
        let core = CoreState::in_memory(Arc::new(LogNotifier)).unwrap();

        let created = core.ensure_bootstrap_admin(&admin()).unwrap().unwrap();
        assert_eq!(created.role, Role::Dispatcher);

        assert!(core.ensure_bootstrap_admin(&admin()).unwrap().is_none());
        assert_eq!(core.store().user_count().unwrap(), 1);
    }

    #[test]
    fn open_on_disk_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dispatch.db");
        let core = CoreState::open(&path, Arc::new(LogNotifier)).unwrap();
        assert!(path.exists());
        assert_eq!(core.store().user_count().unwrap(), 0);
        assert!(core.uptime_secs() < 5);
    }
}
