//! API endpoint handlers.
//!
//! Each module corresponds to one resource. Handlers are thin: they pull
//! the `AuthContext` injected by the auth middleware and delegate to the
//! domain modules, converting their errors through `ApiError`.

pub mod analytics;
pub mod auth;
pub mod health;
pub mod reports;
pub mod triage;
pub mod users;
