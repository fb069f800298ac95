//! Ask-anything flow: multi-turn questions over the document.
//!
//! DESIGN
//! ======
//! The backend is stateless per call. Conversational memory is carried
//! entirely by the outgoing question: every prior turn is replayed as
//! `Q{i}: ...\nA{i}: ...`, blocks separated by a blank line, followed by
//! `Q{n+1}: {question}`. Payload size grows linearly with the conversation.
//!
//! History is append-only; a turn is recorded only after a successful call
//! and always stores the question as the user typed it.

#[cfg(test)]
#[path = "ask_test.rs"]
mod ask_test;

use std::sync::Arc;

use super::document::DocumentReader;
use super::error::{Flow, FlowError};
use super::in_flight::{Completion, InFlight, Ticket};
use crate::net::api::{ApiError, Backend};
use crate::net::types::{AskRequest, AskResponse};

pub const DEFAULT_ANSWER: &str = "No answer provided.";
pub const DEFAULT_JUSTIFICATION: &str = "Derived from document content.";
const ASK_FAILED: &str = "Failed to get an answer. Please ensure the backend server is running.";

/// Starter prompts offered while the history is empty.
pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "What are the main themes discussed in this document?",
    "Can you summarize the key findings?",
    "What methodology was used in this research?",
    "What are the implications of these results?",
    "Are there any limitations mentioned?",
];

/// One answered question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub justification: String,
}

/// Transcript of prior turns, or an empty string when there are none.
#[must_use]
pub fn build_memory(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, turn)| format!("Q{n}: {q}\nA{n}: {a}", n = i + 1, q = turn.question, a = turn.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The question actually sent: `raw` verbatim on the first turn, otherwise
/// the transcript followed by `Q{n+1}: {raw}`.
#[must_use]
pub fn memory_augmented_question(history: &[ConversationTurn], raw: &str) -> String {
    if history.is_empty() {
        return raw.to_owned();
    }
    format!("{}\n\nQ{}: {raw}", build_memory(history), history.len() + 1)
}

/// Request issued by [`AskFlow::begin_question`].
#[derive(Debug)]
pub struct PendingAsk {
    ticket: Ticket,
    /// The question as entered, recorded in history on success.
    pub question: String,
    pub request: AskRequest,
}

pub struct AskFlow {
    backend: Arc<dyn Backend>,
    document: DocumentReader,
    history: Vec<ConversationTurn>,
    input: String,
    error: Option<String>,
    in_flight: InFlight,
}

impl AskFlow {
    pub fn new(backend: Arc<dyn Backend>, document: DocumentReader) -> Self {
        Self {
            backend,
            document,
            history: Vec::new(),
            input: String::new(),
            error: None,
            in_flight: InFlight::new(Flow::Ask),
        }
    }

    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Current draft question.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Suggestions are offered only before the first turn.
    #[must_use]
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.history.is_empty() { &SUGGESTED_QUESTIONS[..] } else { &[] }
    }

    /// Validate `raw` and build the outgoing request.
    ///
    /// # Errors
    ///
    /// [`FlowError::Busy`], [`FlowError::EmptyQuestion`], or
    /// [`FlowError::NoDocument`]. No request is issued in any of these cases.
    pub fn begin_question(&mut self, raw: &str) -> Result<PendingAsk, FlowError> {
        self.in_flight.ensure_idle()?;
        if raw.trim().is_empty() {
            self.error = Some(FlowError::EmptyQuestion.to_string());
            return Err(FlowError::EmptyQuestion);
        }
        if self.document.is_empty() {
            self.error = Some(FlowError::NoDocument.to_string());
            return Err(FlowError::NoDocument);
        }
        let ticket = self.in_flight.begin()?;
        self.error = None;
        let request = AskRequest {
            question: memory_augmented_question(&self.history, raw),
            document_text: self.document.text(),
        };
        tracing::debug!(turn = self.history.len() + 1, question_len = request.question.len(), "asking");
        Ok(PendingAsk { ticket, question: raw.to_owned(), request })
    }

    /// Record the turn (on success) or the error (on failure).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Backend`] when `result` is an error; history is
    /// left unchanged.
    pub fn finish_question(
        &mut self,
        pending: PendingAsk,
        result: Result<AskResponse, ApiError>,
    ) -> Result<Completion, FlowError> {
        if !self.in_flight.finish(pending.ticket) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(response) => {
                let turn = ConversationTurn {
                    question: pending.question,
                    answer: non_empty_or(response.answer, DEFAULT_ANSWER),
                    justification: non_empty_or(response.justification, DEFAULT_JUSTIFICATION),
                };
                self.history.push(turn);
                self.input.clear();
                tracing::info!(turns = self.history.len(), "answer recorded");
                Ok(Completion::Applied)
            }
            Err(source) => {
                tracing::warn!(error = %source, "ask failed");
                self.error = Some(ASK_FAILED.to_owned());
                Err(FlowError::Backend { flow: Flow::Ask, message: ASK_FAILED, source })
            }
        }
    }

    /// Ask `raw` with the full conversation as memory.
    ///
    /// # Errors
    ///
    /// See [`AskFlow::begin_question`] and [`AskFlow::finish_question`].
    pub async fn submit_question(&mut self, raw: &str) -> Result<(), FlowError> {
        let pending = self.begin_question(raw)?;
        let result = self.backend.ask(&pending.request).await;
        self.finish_question(pending, result).map(|_| ())
    }

    /// Submit the current draft.
    ///
    /// # Errors
    ///
    /// See [`AskFlow::submit_question`].
    pub async fn submit_input(&mut self) -> Result<(), FlowError> {
        let raw = self.input.clone();
        self.submit_question(&raw).await
    }

    /// Empty the history, draft, and error. A pending call is invalidated.
    pub fn clear_history(&mut self) {
        self.in_flight.invalidate();
        self.history.clear();
        self.input.clear();
        self.error = None;
        tracing::debug!("ask history cleared");
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}
