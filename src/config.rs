use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const API_URL_VAR: &str = "INSIGHT_API_URL";
pub const TIMEOUT_VAR: &str = "INSIGHT_API_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the analysis backend, without a trailing slash.
    pub api_url: String,
    /// `None` leaves requests without a client-side timeout.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = match lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => {
                log::warn!("{API_URL_VAR} is not set, using default: {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            }
        };

        let request_timeout = match lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{TIMEOUT_VAR} must be whole seconds, got {raw:?}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_url,
            request_timeout,
        })
    }
}

/// Load a `.env` file from the working directory if there is one. Runs before
/// the logger exists, so a malformed file is handed back for later reporting.
pub fn load_dotenv() -> Option<dotenvy::Error> {
    dotenvy::dotenv().err().filter(|e| !e.not_found())
}
