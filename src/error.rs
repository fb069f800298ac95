//! Top-level error for the `docassist` binary.

use std::path::PathBuf;

use client::net::api::ApiError;
use client::state::error::FlowError;
use client::util::preferences::PrefsError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("backend error: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Flow(#[from] FlowError),
    #[error("preferences error: {0}")]
    Prefs(#[from] PrefsError),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("expected {expected} answers on stdin, got {got}")]
    MissingAnswers { expected: usize, got: usize },
}
