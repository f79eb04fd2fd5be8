//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default key the session is persisted under.
pub const DEFAULT_SESSION_KEY: &str = "persist:root";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend host; role prefixes (`/_cl`, `/_ow`, `/_ad`) are appended to it
    pub api_base_url: String,
    /// File the session store is persisted to
    pub session_file: PathBuf,
    /// Storage key of the session inside that file
    pub session_key: String,
    /// Per-request timeout; `None` leaves it to the HTTP client
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_string(),
            session_file: PathBuf::from(".turf-session.json"),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("TURF_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("TURF_API_BASE_URL"))?;
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "TURF_API_BASE_URL",
                value: api_base_url,
            });
        }

        let request_timeout = match env::var("TURF_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "TURF_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => Some(Duration::from_secs(30)),
        };

        Ok(Self {
            api_base_url,
            session_file: env::var("TURF_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".turf-session.json")),
            session_key: env::var("TURF_SESSION_KEY")
                .unwrap_or_else(|_| DEFAULT_SESSION_KEY.to_string()),
            request_timeout,
        })
    }

    /// Config pointing at a local backend, for tests.
    pub fn test_default() -> Self {
        Self::default()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
