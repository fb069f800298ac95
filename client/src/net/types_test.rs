use super::*;

#[test]
fn selected_file_size_is_byte_length() {
    let file = SelectedFile::new("notes.txt", "text/plain", "héllo".as_bytes().to_vec());
    assert_eq!(file.size(), 6);
}

// =============================================================
// Request shapes
// =============================================================

#[test]
fn ask_request_uses_camel_case_document_text() {
    let req = AskRequest { question: "why?".to_owned(), document_text: "doc".to_owned() };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value, serde_json::json!({ "question": "why?", "documentText": "doc" }));
}

#[test]
fn challenge_questions_request_carries_only_document_text() {
    let req = ChallengeQuestionsRequest { document_text: "doc".to_owned() };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value, serde_json::json!({ "documentText": "doc" }));
}

#[test]
fn grade_request_serializes_questions_and_answers() {
    let mut answers = AnswerMap::new();
    answers.insert("q1".to_owned(), "blue".to_owned());
    let req = GradeRequest {
        document_text: "doc".to_owned(),
        questions: vec![ChallengeQuestion { id: "q1".to_owned(), text: "Sky colour?".to_owned() }],
        answers,
    };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "documentText": "doc",
            "questions": [{ "id": "q1", "text": "Sky colour?" }],
            "answers": { "q1": "blue" }
        })
    );
}

// =============================================================
// Response tolerance
// =============================================================

#[test]
fn upload_response_summary_is_optional() {
    let resp: UploadResponse = serde_json::from_str(r#"{"documentText":"hello"}"#).unwrap();
    assert_eq!(resp.document_text, "hello");
    assert!(resp.summary.is_none());
}

#[test]
fn upload_response_requires_document_text() {
    assert!(serde_json::from_str::<UploadResponse>(r#"{"summary":"s"}"#).is_err());
}

#[test]
fn ask_response_accepts_empty_object() {
    let resp: AskResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(resp, AskResponse::default());
}

#[test]
fn challenge_result_reads_feedback_by_id() {
    let raw = r#"{
        "score": 50,
        "feedback": {
            "q1": { "correct": true, "explanation": "Matches the text." },
            "q2": { "correct": false, "correctAnswer": "Red" }
        }
    }"#;
    let result: ChallengeResult = serde_json::from_str(raw).unwrap();
    assert!((result.score - 50.0).abs() < f64::EPSILON);
    assert!(result.feedback_for("q1").unwrap().correct);
    assert_eq!(result.feedback_for("q2").unwrap().correct_answer.as_deref(), Some("Red"));
    assert!(result.feedback_for("q3").is_none());
}

#[test]
fn health_response_defaults_missing_status() {
    let resp: HealthResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.status.is_empty());
}
