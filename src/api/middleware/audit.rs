//! Audit logging middleware.
//!
//! Logs every API request with actor id, role, method, path and
//! response status. Runs innermost (after auth has injected AuthContext).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::AuthContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let actor = req.extensions().get::<AuthContext>().map(AuthContext::actor);

    let response = next.run(req).await;
    let status = response.status().as_u16();

    match actor {
        Some(actor) => tracing::info!(
            actor = %actor.user_id,
            role = %actor.role,
            %method,
            %path,
            status,
            "API access"
        ),
        None => tracing::info!(%method, %path, status, "API access (anonymous)"),
    }

    response
}
