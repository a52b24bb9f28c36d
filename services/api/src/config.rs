//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    /// When set (or when no API key is configured), AI adapters are replaced
    /// by deterministic mocks.
    pub mock_ai: bool,
    pub suggest_model: String,
    pub curation_model: String,
    pub editorial_model: String,
    pub admin_api_key: String,
    /// Requests allowed per IP per window on the suggest endpoint.
    pub suggest_rate_limit: u32,
    pub suggest_rate_window: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to keep tests
    /// hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- AI Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let mock_ai = std::env::var("MOCK_AI")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
            || openai_api_key.is_none();

        let suggest_model =
            std::env::var("SUGGEST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let curation_model =
            std::env::var("CURATION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let editorial_model =
            std::env::var("EDITORIAL_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        // --- Admin and Rate Limiting ---
        let admin_api_key = std::env::var("ADMIN_API_KEY")
            .map_err(|_| ConfigError::MissingVar("ADMIN_API_KEY".to_string()))?;

        let suggest_rate_limit = match std::env::var("SUGGEST_RATE_LIMIT") {
            Ok(s) => s.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("SUGGEST_RATE_LIMIT".to_string(), e.to_string())
            })?,
            Err(_) => 10,
        };
        let suggest_rate_window = match std::env::var("SUGGEST_RATE_WINDOW_SECS") {
            Ok(s) => {
                let secs = s.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("SUGGEST_RATE_WINDOW_SECS".to_string(), e.to_string())
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(60),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            mock_ai,
            suggest_model,
            curation_model,
            editorial_model,
            admin_api_key,
            suggest_rate_limit,
            suggest_rate_window,
        })
    }
}
