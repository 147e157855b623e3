use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "AmbulanceDispatch";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Descriptions shorter than this (after trimming) are not classified.
pub const TRIAGE_MIN_DESCRIPTION_CHARS: usize = 6;

/// Quiet period before a draft description is re-classified.
pub const TRIAGE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Session lifetime for issued bearer tokens.
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Per-client request budget over `RATE_LIMIT_WINDOW`.
pub const RATE_LIMIT_MAX_REQUESTS: usize = 100;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Get the application data directory
/// ~/AmbulanceDispatch/ on all platforms, falling back to the working
/// directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location
pub fn database_path() -> PathBuf {
    app_data_dir().join("dispatch.db")
}

/// Tracing filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "ambulance_dispatch=info,tower_http=info"
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Bootstrap dispatcher account created on first start with an empty database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Runtime configuration for the HTTP server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub bootstrap: Option<BootstrapAdmin>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            database_path: database_path(),
            bootstrap: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Recognised keys: `DISPATCH_BIND`, `DISPATCH_PORT`, `DISPATCH_DB_PATH`,
    /// `DISPATCH_BOOTSTRAP_EMAIL`, `DISPATCH_BOOTSTRAP_PASSWORD`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("DISPATCH_BIND") {
            config.bind = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DISPATCH_BIND",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("DISPATCH_PORT") {
            config.port = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DISPATCH_PORT",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("DISPATCH_DB_PATH") {
            if raw.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "DISPATCH_DB_PATH",
                    value: raw,
                });
            }
            config.database_path = PathBuf::from(raw);
        }

        let email = lookup("DISPATCH_BOOTSTRAP_EMAIL").filter(|v| !v.trim().is_empty());
        let password = lookup("DISPATCH_BOOTSTRAP_PASSWORD").filter(|v| !v.is_empty());
        config.bootstrap = match (email, password) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email: email.trim().to_string(),
                password,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(
                    "DISPATCH_BOOTSTRAP_EMAIL",
                    "DISPATCH_BOOTSTRAP_PASSWORD",
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(
                    "DISPATCH_BOOTSTRAP_PASSWORD",
                    "DISPATCH_BOOTSTRAP_EMAIL",
                ))
            }
        };

        Ok(config)
    }
}
