//! Configuration module for the promotion authoring client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::Months;
use thiserror::Error;

/// Months a promotion stays valid when the author leaves the end date open.
pub const DEFAULT_VALIDITY_DURATION_WHEN_OPEN_ENDED: Months = Months::new(12);

/// Freshness window of the metadata catalog.
pub const DEFAULT_METADATA_TTL: Duration = Duration::from_secs(60 * 60);

/// Configuration could not be read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the promotion service and its metadata catalog
    pub api_base_url: String,
    /// Pre-shared key sent as `x-api-key` (enforced by the mock backend when set)
    pub api_key: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long fetched condition/action kinds stay fresh
    pub metadata_ttl: Duration,
    /// Validity granted to promotions without an end date
    pub open_ended_validity: Months,
    /// Address the mock backend binds to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            metadata_ttl: DEFAULT_METADATA_TTL,
            open_ended_validity: DEFAULT_VALIDITY_DURATION_WHEN_OPEN_ENDED,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base_url = env::var("PROMO_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let api_key = env::var("PROMO_API_KEY").ok().filter(|k| !k.is_empty());

        let request_timeout = parse_var::<u64>("PROMO_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let metadata_ttl = parse_var::<u64>("PROMO_METADATA_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.metadata_ttl);

        let open_ended_validity = parse_var::<u32>("PROMO_OPEN_ENDED_VALIDITY_MONTHS")?
            .map(Months::new)
            .unwrap_or(defaults.open_ended_validity);

        let bind_addr = parse_var::<SocketAddr>("PROMO_BIND_ADDR")?.unwrap_or(defaults.bind_addr);

        let log_level = env::var("PROMO_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match env::var("PROMO_LOG_FORMAT").ok().as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PROMO_LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            api_base_url,
            api_key,
            request_timeout,
            metadata_ttl,
            open_ended_validity,
            bind_addr,
            log_level,
            log_format,
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(None),
    }
}
