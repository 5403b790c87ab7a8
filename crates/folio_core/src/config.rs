//! Runtime configuration for the composition root.
//!
//! # Responsibility
//! - Describe which backend to talk to, cache freshness and logging setup.
//! - Read all of it from `FOLIO_*` environment variables.
//!
//! # Invariants
//! - The remote backend is chosen only when both URL and anon key are set;
//!   setting one without the other is an error.
//! - Without a remote backend the embedded store is used, file-backed when
//!   `FOLIO_LOCAL_DB` is set and in-memory otherwise.

use crate::cache::CacheConfig;
use crate::logging::default_log_level;
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SUPABASE_URL: &str = "FOLIO_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "FOLIO_SUPABASE_ANON_KEY";
pub const ENV_LOCAL_DB: &str = "FOLIO_LOCAL_DB";
pub const ENV_LOCAL_ADMIN_EMAIL: &str = "FOLIO_LOCAL_ADMIN_EMAIL";
pub const ENV_LOCAL_ADMIN_PASSWORD: &str = "FOLIO_LOCAL_ADMIN_PASSWORD";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "FOLIO_HTTP_TIMEOUT_SECS";
pub const ENV_CACHE_STALE_SECS: &str = "FOLIO_CACHE_STALE_SECS";
pub const ENV_LOG_LEVEL: &str = "FOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FOLIO_LOG_DIR";

/// Which data service backs the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Remote {
        url: String,
        anon_key: String,
        /// Per-request timeout; `None` keeps the HTTP client default.
        timeout: Option<Duration>,
    },
    Local {
        /// `None` opens an in-memory database.
        db_path: Option<PathBuf>,
        /// Admin account registered at startup as `(email, password)`.
        admin: Option<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioConfig {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Local {
                db_path: None,
                admin: None,
            },
            cache: CacheConfig::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One variable of a required pair is set without the other.
    IncompletePair {
        present: &'static str,
        missing: &'static str,
    },
    InvalidUrl { value: String, reason: String },
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompletePair { present, missing } => {
                write!(f, "`{present}` is set but `{missing}` is not")
            }
            Self::InvalidUrl { value, reason } => {
                write!(f, "invalid backend url `{value}`: {reason}")
            }
            Self::InvalidNumber { key, value } => {
                write!(f, "`{key}` must be a whole number of seconds, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

impl PortfolioConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match (get(ENV_SUPABASE_URL), get(ENV_SUPABASE_ANON_KEY)) {
            (Some(url), Some(anon_key)) => {
                Url::parse(&url).map_err(|err| ConfigError::InvalidUrl {
                    value: url.clone(),
                    reason: err.to_string(),
                })?;
                BackendConfig::Remote {
                    url,
                    anon_key,
                    timeout: parse_secs(ENV_HTTP_TIMEOUT_SECS, get(ENV_HTTP_TIMEOUT_SECS))?,
                }
            }
            (Some(_), None) => {
                return Err(ConfigError::IncompletePair {
                    present: ENV_SUPABASE_URL,
                    missing: ENV_SUPABASE_ANON_KEY,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompletePair {
                    present: ENV_SUPABASE_ANON_KEY,
                    missing: ENV_SUPABASE_URL,
                })
            }
            (None, None) => {
                let admin = match (get(ENV_LOCAL_ADMIN_EMAIL), get(ENV_LOCAL_ADMIN_PASSWORD)) {
                    (Some(email), Some(password)) => Some((email, password)),
                    (Some(_), None) => {
                        return Err(ConfigError::IncompletePair {
                            present: ENV_LOCAL_ADMIN_EMAIL,
                            missing: ENV_LOCAL_ADMIN_PASSWORD,
                        })
                    }
                    (None, Some(_)) => {
                        return Err(ConfigError::IncompletePair {
                            present: ENV_LOCAL_ADMIN_PASSWORD,
                            missing: ENV_LOCAL_ADMIN_EMAIL,
                        })
                    }
                    (None, None) => None,
                };
                BackendConfig::Local {
                    db_path: get(ENV_LOCAL_DB).map(PathBuf::from),
                    admin,
                }
            }
        };

        let stale_time = parse_secs(ENV_CACHE_STALE_SECS, get(ENV_CACHE_STALE_SECS))?
            .unwrap_or(Duration::ZERO);

        Ok(Self {
            backend,
            cache: CacheConfig { stale_time },
            log_level: get(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

fn parse_secs(key: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|value| {
            value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber { key, value })
        })
        .transpose()
}
