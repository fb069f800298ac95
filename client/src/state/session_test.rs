use super::*;
use crate::net::types::{AskResponse, UploadResponse};
use crate::state::error::FlowError;
use crate::state::test_helpers::{MockBackend, text_file};
use crate::state::upload::SelectionSource;

#[tokio::test]
async fn every_flow_refuses_to_send_before_upload() {
    let backend = MockBackend::new();
    let mut session = Session::new(backend.clone());
    assert!(!session.has_document());

    let upload = session.upload.upload().await.unwrap_err();
    let ask = session.ask.submit_question("Anything?").await.unwrap_err();
    let load = session.challenge.load_questions().await.unwrap_err();
    let submit = session.challenge.submit_answers().await.unwrap_err();

    assert!(matches!(upload, FlowError::NoFileSelected));
    assert!(matches!(ask, FlowError::NoDocument));
    assert!(matches!(load, FlowError::NoDocument));
    assert!(matches!(submit, FlowError::NoDocument));
    for err in [&upload, &ask, &load, &submit] {
        assert!(err.is_precondition());
    }
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn upload_feeds_ask_and_challenge() {
    let backend = MockBackend::new();
    backend.reply_upload(Ok(UploadResponse { document_text: "Shared text.".into(), summary: None }));
    backend.reply_ask(Ok(AskResponse { answer: Some("A.".into()), justification: None }));
    backend.reply_questions(Ok(vec!["Q1: One?"]));
    let mut session = Session::new(backend.clone());

    session
        .upload
        .select_file(text_file("raw"), SelectionSource::Picker)
        .unwrap();
    session.upload.upload().await.unwrap();
    assert!(session.has_document());

    session.ask.submit_question("Q?").await.unwrap();
    session.challenge.load_questions().await.unwrap();

    assert_eq!(backend.asks.lock().unwrap()[0].document_text, "Shared text.");
    assert_eq!(backend.question_requests.lock().unwrap()[0].document_text, "Shared text.");
    assert_eq!(session.live_previews(), 1);
}

#[tokio::test]
async fn clearing_one_flow_leaves_the_others_alone() {
    let backend = MockBackend::new();
    backend.reply_upload(Ok(UploadResponse { document_text: "doc".into(), summary: Some("s".into()) }));
    backend.reply_ask(Ok(AskResponse::default()));
    let mut session = Session::new(backend.clone());
    session
        .upload
        .select_file(text_file("raw"), SelectionSource::Picker)
        .unwrap();
    session.upload.upload().await.unwrap();
    session.ask.submit_question("Q?").await.unwrap();

    session.upload.reset_upload();
    assert_eq!(session.ask.history().len(), 1);
    assert!(session.has_document());
    assert_eq!(session.live_previews(), 0);

    session.ask.clear_history();
    assert_eq!(session.upload.phase(), crate::state::upload::UploadPhase::Idle);
    assert_eq!(session.document().text(), "doc");
}
