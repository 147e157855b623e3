//! Dispatcher-only user administration.
//!
//! Role is fixed at creation. Deactivating a response team keeps its past
//! assignments but makes it ineligible for new ones.

use chrono::{SubsecRound, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::access;
use crate::auth::Credential;
use crate::db::repository::{SqliteStore, UserStore};
use crate::db::DatabaseError;
use crate::models::enums::{Role, UserStatus};
use crate::models::{Actor, User, UserFilter};

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Role {0} may not manage users")]
    Unauthorized(Role),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Password must be at least {MIN_PASSWORD_CHARS} characters")]
    WeakPassword,

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub password: String,
}

fn ensure_manager(actor: &Actor) -> Result<(), UserError> {
    if access::can_manage_users(actor.role) {
        Ok(())
    } else {
        Err(UserError::Unauthorized(actor.role))
    }
}

/// Create a user without a role check. Used for the bootstrap account.
pub fn register_user(store: &SqliteStore, new_user: NewUser) -> Result<User, UserError> {
    if new_user.name.trim().is_empty() {
        return Err(UserError::MissingRequiredField("name"));
    }
    let email = new_user.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(UserError::MissingRequiredField("email"));
    }
    if new_user.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(UserError::WeakPassword);
    }

    let user = User {
        id: Uuid::new_v4(),
        name: new_user.name.trim().to_string(),
        email: email.clone(),
        phone: new_user.phone.trim().to_string(),
        role: new_user.role,
        status: UserStatus::Active,
        expertise: new_user.expertise.filter(|v| !v.trim().is_empty()),
        address: new_user.address.filter(|v| !v.trim().is_empty()),
        created_at: Utc::now().trunc_subsecs(3),
    };

    match store.create_user(&user, &Credential::derive(&new_user.password)) {
        Ok(()) => {
            tracing::info!(user_id = %user.id, role = %user.role, "User registered");
            Ok(user)
        }
        Err(DatabaseError::Conflict { .. }) => Err(UserError::DuplicateEmail(email)),
        Err(e) => Err(e.into()),
    }
}

pub fn create_user(
    store: &SqliteStore,
    actor: &Actor,
    new_user: NewUser,
) -> Result<User, UserError> {
    ensure_manager(actor)?;
    register_user(store, new_user)
}

pub fn list_users(
    store: &SqliteStore,
    actor: &Actor,
    filter: &UserFilter,
) -> Result<Vec<User>, UserError> {
    ensure_manager(actor)?;
    Ok(store.list_users(filter)?)
}

/// Response teams, for the assignment picker. Dispatchers only.
pub fn list_response_teams(store: &SqliteStore, actor: &Actor) -> Result<Vec<User>, UserError> {
    ensure_manager(actor)?;
    Ok(store.list_by_role(Role::ResponseTeam)?)
}

pub fn set_user_status(
    store: &SqliteStore,
    actor: &Actor,
    id: &Uuid,
    status: UserStatus,
) -> Result<User, UserError> {
    ensure_manager(actor)?;
    match store.set_user_status(id, status) {
        Ok(()) => {}
        Err(DatabaseError::NotFound { .. }) => return Err(UserError::NotFound(*id)),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(user_id = %id, status = %status, by = %actor.user_id, "User status changed");
    store.get_user(id)?.ok_or(UserError::NotFound(*id))
}
