//! Shared types for the HTTP API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config;
use crate::core_state::CoreState;
use crate::models::{Actor, User};

// ═══════════════════════════════════════════════════════════
// API context - shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus API-specific caches.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            sessions: Arc::new(Mutex::new(SessionRegistry::new())),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Auth context - injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token resolved to an active user.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub token_hash: [u8; 32],
}

impl AuthContext {
    pub fn actor(&self) -> Actor {
        self.user.actor()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Session registry - bearer tokens issued at login
// ═══════════════════════════════════════════════════════════

struct SessionEntry {
    user_id: Uuid,
    expires_at: Instant,
}

/// In-memory bearer sessions keyed by token hash. Raw tokens are never stored.
pub struct SessionRegistry {
    sessions: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_ttl(config::SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Issue a new token for `user_id`. Returns the raw token.
    pub fn issue(&mut self, user_id: Uuid) -> String {
        self.cleanup();
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                user_id,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Resolve a raw token to its user. Expired sessions are dropped.
    pub fn resolve(&mut self, token: &str) -> Option<(Uuid, [u8; 32])> {
        let hash = hash_token(token);
        let entry = self.sessions.get(&hash)?;
        if Instant::now() >= entry.expires_at {
            self.sessions.remove(&hash);
            return None;
        }
        Some((entry.user_id, hash))
    }

    pub fn revoke(&mut self, token_hash: &[u8; 32]) -> bool {
        self.sessions.remove(token_hash).is_some()
    }

    /// Drop every session of a user (e.g. after deactivation).
    pub fn revoke_user(&mut self, user_id: &Uuid) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| &s.user_id != user_id);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, s| now < s.expires_at);
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter - per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Per-client sliding-window limiter (100 requests / 15 minutes by default).
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    max_requests: usize,
    window: Duration,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(config::RATE_LIMIT_MAX_REQUESTS, config::RATE_LIMIT_WINDOW)
    }

    pub fn with_limits(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: HashMap::new(),
            max_requests,
            window,
            last_sweep: Instant::now(),
        }
    }

    /// Check if a client is within its budget. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let window = self.window;
        if now.duration_since(self.last_sweep) >= window {
            self.sweep(now);
        }

        let entries = self.windows.entry(key.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < window);

        if entries.len() >= self.max_requests {
            let oldest = entries.first().copied().unwrap_or(now);
            let wait = window.saturating_sub(now.duration_since(oldest));
            return Err(wait.as_secs().max(1));
        }

        entries.push(now);
        Ok(())
    }

    /// Number of clients with requests inside the current window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Drop clients whose every request has aged out of the window.
    fn sweep(&mut self, now: Instant) {
        let window = self.window;
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < window);
            !entries.is_empty()
        });
        self.last_sweep = now;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
