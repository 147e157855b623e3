//! Per-client rate limiting middleware.
//!
//! Sliding window of 100 requests per 15 minutes per client key. A bearer
//! token that resolves to a live session keys on that user; anything else,
//! including made-up tokens, keys on the peer address.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::middleware::auth::bearer_token;
use crate::api::types::ApiContext;

/// Extract a rate-limit key from the request.
fn rate_key(ctx: &ApiContext, req: &Request<axum::body::Body>) -> Result<String, ApiError> {
    if let Some(token) = bearer_token(req) {
        let resolved = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?
            .resolve(token);
        if let Some((user_id, _)) = resolved {
            return Ok(format!("user:{user_id}"));
        }
    }
    Ok(req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "anonymous".to_string()))
}

/// Returns 429 with `Retry-After` once a client exceeds its budget.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&ctx, &req)?;

    // MutexGuard is !Send - must drop before .await via block scope
    {
        let mut limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter.check(&key).map_err(|retry_after| {
            tracing::warn!(key = %key, retry_after, "Rate limit exceeded");
            ApiError::RateLimited { retry_after }
        })?;
    }

    Ok(next.run(req).await)
}
