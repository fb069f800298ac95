//! Wire DTOs for the document backend.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's camelCase JSON exactly. Optional response
//! fields stay `Option` here; the flows decide on fallback text so the wire
//! layer never invents content.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Answers keyed by challenge question id (`q1`, `q2`, ...).
pub type AnswerMap = HashMap<String, String>;

// =============================================================================
// UPLOAD
// =============================================================================

/// A file chosen by the user, held in memory until upload. Sent as the
/// multipart `file` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: mime.into(), bytes }
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Response to `POST /upload`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Full extracted text of the uploaded document.
    pub document_text: String,
    #[serde(default)]
    pub summary: Option<String>,
}

// =============================================================================
// ASK
// =============================================================================

/// Body of `POST /ask`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    /// Outgoing question, memory-augmented when prior turns exist.
    pub question: String,
    pub document_text: String,
}

/// Response to `POST /ask`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
}

// =============================================================================
// CHALLENGE
// =============================================================================

/// Body of the question-generation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeQuestionsRequest {
    pub document_text: String,
}

/// Raw generated question lines, possibly still carrying `Q1:` markers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeQuestionsResponse {
    pub questions: Vec<String>,
}

/// One question of a challenge round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeQuestion {
    /// Positional id, `q1..qN`.
    pub id: String,
    pub text: String,
}

/// Body of the grading call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub document_text: String,
    pub questions: Vec<ChallengeQuestion>,
    pub answers: AnswerMap,
}

/// Per-question grading verdict.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// Result of one grading call. Replaces any earlier result wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResult {
    /// Percentage score, 0 to 100.
    pub score: f64,
    #[serde(default)]
    pub feedback: HashMap<String, Feedback>,
}

impl ChallengeResult {
    /// Feedback for one question, if the grader returned any.
    #[must_use]
    pub fn feedback_for(&self, id: &str) -> Option<&Feedback> {
        self.feedback.get(id)
    }
}

// =============================================================================
// HEALTH
// =============================================================================

/// Response to `GET /`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}
