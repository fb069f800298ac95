//! Flow-level errors shared by upload, ask, and challenge.
//!
//! DESIGN
//! ======
//! The `Display` text of each variant is the inline message a view shows.
//! Backend failures keep their [`ApiError`] as the source for logging but
//! render as one generic message per flow, never exposing status codes.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt;

use crate::net::api::ApiError;

/// Which interaction flow produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Upload,
    Ask,
    Challenge,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Ask => "ask",
            Self::Challenge => "challenge",
        })
    }
}

/// Coarse error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-side check failed; no request was sent.
    Validation,
    /// The flow already has a request outstanding; no request was sent.
    Busy,
    /// The backend call failed.
    Connectivity,
}

/// Errors produced by flow operations.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Please upload only PDF or TXT files.")]
    UnsupportedFileType { mime: String },

    #[error("File size must be less than 10MB.")]
    FileTooLarge { size: u64 },

    #[error("Please choose a file first.")]
    NoFileSelected,

    #[error("Please enter a question.")]
    EmptyQuestion,

    /// The document context is empty.
    #[error("No document uploaded. Please upload a document first.")]
    NoDocument,

    #[error("Load challenge questions before submitting.")]
    NoQuestions,

    #[error("Please answer all questions before submitting.")]
    IncompleteAnswers { missing: Vec<String> },

    /// The round already has a result; only a reload starts a new one.
    #[error("This round has been graded. Start a new challenge to answer again.")]
    RoundGraded,

    #[error("Unknown question id `{id}`.")]
    UnknownQuestion { id: String },

    #[error("The {flow} request is still in progress.")]
    Busy { flow: Flow },

    #[error("{message}")]
    Backend {
        flow: Flow,
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

impl FlowError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Busy { .. } => ErrorKind::Busy,
            Self::Backend { .. } => ErrorKind::Connectivity,
            _ => ErrorKind::Validation,
        }
    }

    /// `true` for failures caused by missing prerequisites (no document, no
    /// file, no questions) rather than bad input.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NoDocument | Self::NoFileSelected | Self::NoQuestions)
    }
}
