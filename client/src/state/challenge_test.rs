use std::collections::HashMap;

use super::*;
use crate::net::types::Feedback;
use crate::state::document::DocumentStore;
use crate::state::error::ErrorKind;
use crate::state::test_helpers::{MockBackend, document_with};

fn graded(score: f64, verdicts: &[(&str, bool)]) -> Result<ChallengeResult, u16> {
    let feedback: HashMap<String, Feedback> = verdicts
        .iter()
        .map(|(id, correct)| ((*id).to_owned(), Feedback { correct: *correct, ..Feedback::default() }))
        .collect();
    Ok(ChallengeResult { score, feedback })
}

async fn loaded_flow(backend: &Arc<MockBackend>, store: &DocumentStore) -> ChallengeFlow {
    backend.reply_questions(Ok(vec!["Q1: Is the sky blue?", "Q2. Name a color."]));
    let mut flow = ChallengeFlow::new(backend.clone(), store.reader());
    flow.load_questions().await.unwrap();
    flow
}

// =============================================================
// strip_enumeration_prefix
// =============================================================

#[test]
fn strips_colon_and_dot_markers() {
    assert_eq!(strip_enumeration_prefix("Q1: Is the sky blue?"), "Is the sky blue?");
    assert_eq!(strip_enumeration_prefix("Q2. Name a color."), "Name a color.");
    assert_eq!(strip_enumeration_prefix("Q12:\t  Multi digit"), "Multi digit");
}

#[test]
fn strips_bare_marker_without_punctuation() {
    assert_eq!(strip_enumeration_prefix("Q3 What next?"), "What next?");
    assert_eq!(strip_enumeration_prefix("Q4"), "");
}

#[test]
fn leaves_lines_without_marker_unchanged() {
    assert_eq!(strip_enumeration_prefix("What is it?"), "What is it?");
    assert_eq!(strip_enumeration_prefix("Q: no digits"), "Q: no digits");
    assert_eq!(strip_enumeration_prefix("q1: lower case"), "q1: lower case");
    assert_eq!(strip_enumeration_prefix("Quantum physics?"), "Quantum physics?");
    assert_eq!(strip_enumeration_prefix(" Q1: leading space"), " Q1: leading space");
}

#[test]
fn strips_only_one_punctuation_mark() {
    assert_eq!(strip_enumeration_prefix("Q1:: double"), ": double");
}

#[test]
fn derive_questions_assigns_positional_ids() {
    let lines = vec!["Q1: Is the sky blue?".to_owned(), "Q2. Name a color.".to_owned()];
    assert_eq!(
        derive_questions(&lines),
        vec![
            ChallengeQuestion { id: "q1".into(), text: "Is the sky blue?".into() },
            ChallengeQuestion { id: "q2".into(), text: "Name a color.".into() },
        ]
    );
}

// =============================================================
// Score bands
// =============================================================

#[test]
fn score_bands_use_eighty_and_sixty_thresholds() {
    assert_eq!(ScoreBand::from_score(100.0), ScoreBand::Excellent);
    assert_eq!(ScoreBand::from_score(80.0), ScoreBand::Excellent);
    assert_eq!(ScoreBand::from_score(79.9), ScoreBand::Good);
    assert_eq!(ScoreBand::from_score(60.0), ScoreBand::Good);
    assert_eq!(ScoreBand::from_score(33.0), ScoreBand::KeepLearning);
    assert!(ScoreBand::KeepLearning.message().starts_with("Keep learning!"));
}

// =============================================================
// load_questions
// =============================================================

#[tokio::test]
async fn load_derives_question_set() {
    let backend = MockBackend::new();
    let store = document_with("The sky is blue.");
    let flow = loaded_flow(&backend, &store).await;

    assert_eq!(flow.questions().len(), 2);
    assert_eq!(flow.questions()[0].id, "q1");
    assert_eq!(flow.questions()[1].text, "Name a color.");
    assert_eq!(flow.mode(), ChallengeMode::Answering);
    assert_eq!(backend.question_requests.lock().unwrap()[0].document_text, "The sky is blue.");
}

#[tokio::test]
async fn load_without_document_sends_nothing() {
    let backend = MockBackend::new();
    let store = DocumentStore::new();
    let mut flow = ChallengeFlow::new(backend.clone(), store.reader());
    let err = flow.load_questions().await.unwrap_err();
    assert!(matches!(err, FlowError::NoDocument));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn failed_first_load_leaves_set_empty() {
    let backend = MockBackend::new();
    backend.reply_questions(Err(500));
    let store = document_with("doc");
    let mut flow = ChallengeFlow::new(backend.clone(), store.reader());
    let err = flow.load_questions().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(flow.questions().is_empty());
    assert_eq!(flow.error(), Some(LOAD_FAILED));
}

// =============================================================
// submit_answers
// =============================================================

#[tokio::test]
async fn submit_requires_every_id_present() {
    let backend = MockBackend::new();
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;

    flow.set_answer("q1", "Yes").unwrap();
    let err = flow.submit_answers().await.unwrap_err();
    assert!(matches!(err, FlowError::IncompleteAnswers { ref missing } if missing == &["q2".to_owned()]));
    assert_eq!(flow.error(), Some("Please answer all questions before submitting."));
    assert!(backend.grades.lock().unwrap().is_empty());
    assert!(!flow.can_submit());
}

#[tokio::test]
async fn empty_string_answers_count_as_present() {
    let backend = MockBackend::new();
    backend.reply_grade(graded(50.0, &[("q1", true), ("q2", false)]));
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;

    flow.set_answer("q1", "Yes").unwrap();
    flow.set_answer("q2", "").unwrap();
    assert!(flow.can_submit());
    flow.submit_answers().await.unwrap();

    let grades = backend.grades.lock().unwrap();
    assert_eq!(grades[0].answers.get("q2").map(String::as_str), Some(""));
    assert_eq!(grades[0].questions.len(), 2);
}

#[tokio::test]
async fn submit_without_questions_is_rejected() {
    let backend = MockBackend::new();
    let store = document_with("doc");
    let mut flow = ChallengeFlow::new(backend.clone(), store.reader());
    assert!(matches!(flow.submit_answers().await, Err(FlowError::NoQuestions)));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn unknown_answer_id_is_rejected() {
    let backend = MockBackend::new();
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    assert!(matches!(flow.set_answer("q9", "?"), Err(FlowError::UnknownQuestion { .. })));
    assert!(flow.answers().is_empty());
}

#[tokio::test]
async fn successful_submit_switches_to_review() {
    let backend = MockBackend::new();
    backend.reply_grade(graded(100.0, &[("q1", true), ("q2", true)]));
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    flow.set_answer("q1", "Yes").unwrap();
    flow.set_answer("q2", "Blue").unwrap();

    flow.submit_answers().await.unwrap();
    assert_eq!(flow.mode(), ChallengeMode::Reviewing);
    let result = flow.result().unwrap();
    assert!((result.score - 100.0).abs() < f64::EPSILON);
    assert!(result.feedback_for("q2").unwrap().correct);
}

#[tokio::test]
async fn graded_round_is_read_only_until_reload() {
    let backend = MockBackend::new();
    backend.reply_grade(graded(50.0, &[("q1", true), ("q2", false)]));
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    flow.set_answer("q1", "Yes").unwrap();
    flow.set_answer("q2", "Red").unwrap();
    flow.submit_answers().await.unwrap();

    let err = flow.set_answer("q2", "Blue").unwrap_err();
    assert!(matches!(err, FlowError::RoundGraded));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(flow.answer("q2"), Some("Red"));
    assert!(!flow.can_submit());

    assert!(matches!(flow.submit_answers().await, Err(FlowError::RoundGraded)));
    assert_eq!(backend.grades.lock().unwrap().len(), 1);
    assert_eq!(flow.mode(), ChallengeMode::Reviewing);
    assert!((flow.result().unwrap().score - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn submit_without_document_uses_shared_message() {
    let backend = MockBackend::new();
    let store = DocumentStore::new();
    let mut flow = ChallengeFlow::new(backend.clone(), store.reader());
    assert!(matches!(flow.submit_answers().await, Err(FlowError::NoDocument)));
    assert_eq!(flow.error(), Some("No document uploaded. Please upload a document first."));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn failed_submit_stays_in_answering_mode() {
    let backend = MockBackend::new();
    backend.reply_grade(Err(500));
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    flow.set_answer("q1", "a").unwrap();
    flow.set_answer("q2", "b").unwrap();

    let err = flow.submit_answers().await.unwrap_err();
    assert_eq!(err.to_string(), SUBMIT_FAILED);
    assert_eq!(flow.mode(), ChallengeMode::Answering);
    assert!(flow.result().is_none());
    assert_eq!(flow.answer("q2"), Some("b"));
}

#[tokio::test]
async fn overlapping_submit_is_busy() {
    let backend = MockBackend::new();
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    flow.set_answer("q1", "a").unwrap();
    flow.set_answer("q2", "b").unwrap();

    let _pending = flow.begin_submit().unwrap();
    assert!(matches!(flow.begin_submit(), Err(FlowError::Busy { flow: Flow::Challenge })));
    assert!(matches!(flow.begin_load(), Err(FlowError::Busy { .. })));
}

// =============================================================
// Reload
// =============================================================

#[tokio::test]
async fn reload_discards_result_and_round() {
    let backend = MockBackend::new();
    backend.reply_grade(graded(0.0, &[("q1", false), ("q2", false)]));
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    flow.set_answer("q1", "a").unwrap();
    flow.set_answer("q2", "b").unwrap();
    flow.submit_answers().await.unwrap();
    assert_eq!(flow.mode(), ChallengeMode::Reviewing);

    backend.reply_questions(Ok(vec!["Q1: Fresh question?"]));
    let pending = flow.begin_load().unwrap();
    // The result is gone as soon as the reload starts.
    assert_eq!(flow.mode(), ChallengeMode::Answering);
    let response = backend.challenge_questions(&pending.request).await;
    flow.finish_load(pending, response).unwrap();

    assert!(flow.result().is_none());
    assert!(flow.answers().is_empty());
    assert_eq!(flow.questions(), &[ChallengeQuestion { id: "q1".into(), text: "Fresh question?".into() }]);
}

#[tokio::test]
async fn failed_reload_still_hides_previous_result() {
    let backend = MockBackend::new();
    backend.reply_grade(graded(100.0, &[("q1", true), ("q2", true)]));
    let store = document_with("doc");
    let mut flow = loaded_flow(&backend, &store).await;
    flow.set_answer("q1", "a").unwrap();
    flow.set_answer("q2", "b").unwrap();
    flow.submit_answers().await.unwrap();

    backend.reply_questions(Err(503));
    assert!(flow.load_questions().await.is_err());
    assert_eq!(flow.mode(), ChallengeMode::Answering);
    assert_eq!(flow.questions().len(), 2);
}
