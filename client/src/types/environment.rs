//! Environment configuration for different deployment stages

use std::env;
use std::path::PathBuf;

use tracing::Level;

/// Base URL of a locally running API during development
const DEVELOPMENT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Directory holding the persisted session when `SESSION_DIR` is unset
const DEFAULT_SESSION_DIR: &str = ".gallery-session";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local API server)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the base URL of the remote API, including the `/api` prefix
    ///
    /// # Panics
    ///
    /// Panics if the `API_BASE_URL` environment variable is not set outside development
    #[must_use]
    pub fn api_base_url(&self) -> String {
        let base_url = match self {
            Self::Production | Self::Staging => {
                env::var("API_BASE_URL").expect("API_BASE_URL environment variable is not set")
            }
            Self::Development => {
                env::var("API_BASE_URL").unwrap_or_else(|_| DEVELOPMENT_API_BASE_URL.to_string())
            }
        };

        base_url.trim_end_matches('/').to_string()
    }

    /// Returns the directory where the session is persisted between runs
    #[must_use]
    pub fn session_dir(&self) -> PathBuf {
        env::var_os("SESSION_DIR").map_or_else(|| PathBuf::from(DEFAULT_SESSION_DIR), PathBuf::from)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Default log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}
