//! Process configuration from the environment

use crate::llm::DEFAULT_ENDPOINT;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = non_blank("REPHRASE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let db_path = non_blank("REPHRASE_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".rephrase-trainer/settings.db")
            },
            PathBuf::from,
        );

        let endpoint = non_blank("REPHRASE_ENDPOINT")
            .map_or_else(|| DEFAULT_ENDPOINT.to_string(), |e| e.trim().to_string());

        let timeout_secs = non_blank("REPHRASE_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            port,
            db_path,
            endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
