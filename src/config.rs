//! Runtime configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use client::net::api::{DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GRADE_PATH, HttpBackendConfig};

pub const PREFS_DIR: &str = ".docassist";
pub const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub prefs_path: PathBuf,
    pub grade_path: String,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `DOCASSIST_BASE_URL`: default `http://localhost:5000`
    /// - `DOCASSIST_CONNECT_TIMEOUT_SECS`: default 10
    /// - `DOCASSIST_REQUEST_TIMEOUT_SECS`: unset means no overall timeout
    /// - `DOCASSIST_PREFS_PATH`: default `$HOME/.docassist/prefs.json`
    /// - `DOCASSIST_GRADE_PATH`: default `/challenge`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeconds`] for a non-numeric timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("DOCASSIST_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let connect_timeout_secs =
            parse_secs("DOCASSIST_CONNECT_TIMEOUT_SECS", lookup("DOCASSIST_CONNECT_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let request_timeout_secs =
            parse_secs("DOCASSIST_REQUEST_TIMEOUT_SECS", lookup("DOCASSIST_REQUEST_TIMEOUT_SECS"))?;
        let prefs_path = lookup("DOCASSIST_PREFS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_prefs_path(lookup("HOME")));
        let grade_path = lookup("DOCASSIST_GRADE_PATH").unwrap_or_else(|| DEFAULT_GRADE_PATH.to_owned());

        Ok(Self { base_url, connect_timeout_secs, request_timeout_secs, prefs_path, grade_path })
    }

    #[must_use]
    pub fn backend_config(&self) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            grade_path: self.grade_path.clone(),
        }
    }
}

fn parse_secs(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidSeconds { var, value }),
    }
}

fn default_prefs_path(home: Option<String>) -> PathBuf {
    let base = home.map_or_else(PathBuf::new, PathBuf::from);
    base.join(PREFS_DIR).join(PREFS_FILE)
}
