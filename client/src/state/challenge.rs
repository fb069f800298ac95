//! Challenge flow: generated comprehension questions, answers, grading.
//!
//! DESIGN
//! ======
//! A round is one load → answer → submit cycle. Loading replaces the whole
//! round (questions, answers, result); nothing is appended or versioned.
//! Grading replaces the result in one assignment, which is what flips the
//! flow from [`ChallengeMode::Answering`] to [`ChallengeMode::Reviewing`].

#[cfg(test)]
#[path = "challenge_test.rs"]
mod challenge_test;

use std::sync::Arc;

use super::document::DocumentReader;
use super::error::{Flow, FlowError};
use super::in_flight::{Completion, InFlight, Ticket};
use crate::net::api::{ApiError, Backend};
use crate::net::types::{
    AnswerMap, ChallengeQuestion, ChallengeQuestionsRequest, ChallengeQuestionsResponse, ChallengeResult,
    GradeRequest,
};

const LOAD_FAILED: &str = "Failed to load challenge questions. Please ensure the backend server is running.";
const SUBMIT_FAILED: &str = "Failed to submit answers. Please try again.";

// =============================================================================
// QUESTION PARSING
// =============================================================================

/// Strip a leading `Q<digits>` marker, one optional `:` or `.`, and any
/// whitespace after it. Lines without the marker are returned unchanged.
///
/// ```text
/// prefix := "Q" digit+ ( ":" | "." )? whitespace*
/// ```
#[must_use]
pub fn strip_enumeration_prefix(line: &str) -> &str {
    let Some(rest) = line.strip_prefix('Q') else {
        return line;
    };
    let after_digits = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == rest.len() {
        return line;
    }
    after_digits
        .strip_prefix([':', '.'])
        .unwrap_or(after_digits)
        .trim_start()
}

/// Assign positional ids `q1..qN` to raw question lines.
#[must_use]
pub fn derive_questions(lines: &[String]) -> Vec<ChallengeQuestion> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| ChallengeQuestion {
            id: format!("q{}", i + 1),
            text: strip_enumeration_prefix(line).to_owned(),
        })
        .collect()
}

// =============================================================================
// SCORE BANDS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    KeepLearning,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else {
            Self::KeepLearning
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent work! You have strong logical reasoning skills.",
            Self::Good => "Good job! Keep practicing to improve your logical thinking.",
            Self::KeepLearning => "Keep learning! Logic puzzles take practice to master.",
        }
    }
}

// =============================================================================
// FLOW
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeMode {
    Answering,
    Reviewing,
}

/// Request issued by [`ChallengeFlow::begin_load`].
#[derive(Debug)]
pub struct PendingLoad {
    ticket: Ticket,
    pub request: ChallengeQuestionsRequest,
}

/// Request issued by [`ChallengeFlow::begin_submit`].
#[derive(Debug)]
pub struct PendingSubmit {
    ticket: Ticket,
    pub request: GradeRequest,
}

pub struct ChallengeFlow {
    backend: Arc<dyn Backend>,
    document: DocumentReader,
    questions: Vec<ChallengeQuestion>,
    answers: AnswerMap,
    result: Option<ChallengeResult>,
    error: Option<String>,
    in_flight: InFlight,
}

impl ChallengeFlow {
    pub fn new(backend: Arc<dyn Backend>, document: DocumentReader) -> Self {
        Self {
            backend,
            document,
            questions: Vec::new(),
            answers: AnswerMap::new(),
            result: None,
            error: None,
            in_flight: InFlight::new(Flow::Challenge),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[ChallengeQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, id: &str) -> Option<&str> {
        self.answers.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn result(&self) -> Option<&ChallengeResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    #[must_use]
    pub fn mode(&self) -> ChallengeMode {
        if self.result.is_some() { ChallengeMode::Reviewing } else { ChallengeMode::Answering }
    }

    /// Question ids that have no entry in the answer map, in question order.
    #[must_use]
    pub fn missing_answers(&self) -> Vec<String> {
        self.questions
            .iter()
            .filter(|q| !self.answers.contains_key(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    /// Whether a submit would pass the client-side checks right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_busy()
            && self.result.is_none()
            && !self.questions.is_empty()
            && self.missing_answers().is_empty()
    }

    /// Record the answer for question `id`. Empty text counts as answered.
    ///
    /// # Errors
    ///
    /// [`FlowError::RoundGraded`] once the round has a result, or
    /// [`FlowError::UnknownQuestion`] if `id` is not in the current round.
    pub fn set_answer(&mut self, id: &str, text: impl Into<String>) -> Result<(), FlowError> {
        if self.result.is_some() {
            return Err(FlowError::RoundGraded);
        }
        if !self.questions.iter().any(|q| q.id == id) {
            return Err(FlowError::UnknownQuestion { id: id.to_owned() });
        }
        self.answers.insert(id.to_owned(), text.into());
        Ok(())
    }

    /// Start a new round. Any displayed result is discarded immediately.
    ///
    /// # Errors
    ///
    /// [`FlowError::Busy`] or [`FlowError::NoDocument`]; no request is issued.
    pub fn begin_load(&mut self) -> Result<PendingLoad, FlowError> {
        self.in_flight.ensure_idle()?;
        if self.document.is_empty() {
            self.error = Some(FlowError::NoDocument.to_string());
            return Err(FlowError::NoDocument);
        }
        let ticket = self.in_flight.begin()?;
        self.result = None;
        self.error = None;
        Ok(PendingLoad { ticket, request: ChallengeQuestionsRequest { document_text: self.document.text() } })
    }

    /// Install the generated questions, resetting answers.
    ///
    /// # Errors
    ///
    /// [`FlowError::Backend`] on failure; the previous question set is kept.
    pub fn finish_load(
        &mut self,
        pending: PendingLoad,
        result: Result<ChallengeQuestionsResponse, ApiError>,
    ) -> Result<Completion, FlowError> {
        if !self.in_flight.finish(pending.ticket) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(response) => {
                self.questions = derive_questions(&response.questions);
                self.answers.clear();
                self.result = None;
                tracing::info!(questions = self.questions.len(), "challenge round loaded");
                Ok(Completion::Applied)
            }
            Err(source) => {
                tracing::warn!(error = %source, "loading challenge questions failed");
                self.error = Some(LOAD_FAILED.to_owned());
                Err(FlowError::Backend { flow: Flow::Challenge, message: LOAD_FAILED, source })
            }
        }
    }

    /// Fetch a fresh round of questions.
    ///
    /// # Errors
    ///
    /// See [`ChallengeFlow::begin_load`] and [`ChallengeFlow::finish_load`].
    pub async fn load_questions(&mut self) -> Result<(), FlowError> {
        let pending = self.begin_load()?;
        let result = self.backend.challenge_questions(&pending.request).await;
        self.finish_load(pending, result).map(|_| ())
    }

    /// Validate the answer set and build the grading request.
    ///
    /// Only presence is checked: an empty string is a valid answer.
    ///
    /// # Errors
    ///
    /// [`FlowError::Busy`], [`FlowError::RoundGraded`], [`FlowError::NoDocument`],
    /// [`FlowError::NoQuestions`] or [`FlowError::IncompleteAnswers`]; no
    /// request is issued.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, FlowError> {
        self.in_flight.ensure_idle()?;
        let err = if self.result.is_some() {
            Some(FlowError::RoundGraded)
        } else if self.document.is_empty() {
            Some(FlowError::NoDocument)
        } else if self.questions.is_empty() {
            Some(FlowError::NoQuestions)
        } else {
            let missing = self.missing_answers();
            (!missing.is_empty()).then_some(FlowError::IncompleteAnswers { missing })
        };
        if let Some(err) = err {
            self.error = Some(err.to_string());
            return Err(err);
        }
        let ticket = self.in_flight.begin()?;
        self.error = None;
        let request = GradeRequest {
            document_text: self.document.text(),
            questions: self.questions.clone(),
            answers: self.answers.clone(),
        };
        tracing::debug!(questions = request.questions.len(), "submitting answers");
        Ok(PendingSubmit { ticket, request })
    }

    /// Swap in the grading result.
    ///
    /// # Errors
    ///
    /// [`FlowError::Backend`] on failure; the flow stays in answering mode.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmit,
        result: Result<ChallengeResult, ApiError>,
    ) -> Result<Completion, FlowError> {
        if !self.in_flight.finish(pending.ticket) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(graded) => {
                tracing::info!(score = graded.score, "challenge graded");
                self.result = Some(graded);
                Ok(Completion::Applied)
            }
            Err(source) => {
                tracing::warn!(error = %source, "grading failed");
                self.error = Some(SUBMIT_FAILED.to_owned());
                Err(FlowError::Backend { flow: Flow::Challenge, message: SUBMIT_FAILED, source })
            }
        }
    }

    /// Submit every answer for grading.
    ///
    /// # Errors
    ///
    /// See [`ChallengeFlow::begin_submit`] and [`ChallengeFlow::finish_submit`].
    pub async fn submit_answers(&mut self) -> Result<(), FlowError> {
        let pending = self.begin_submit()?;
        let result = self.backend.grade_answers(&pending.request).await;
        self.finish_submit(pending, result).map(|_| ())
    }
}
