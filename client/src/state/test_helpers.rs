//! Scripted in-process [`Backend`] for flow tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::document::DocumentStore;
use super::upload::SelectedFile;
use crate::net::api::{ApiError, Backend};
use crate::net::types::{
    AskRequest, AskResponse, ChallengeQuestionsRequest, ChallengeQuestionsResponse, ChallengeResult, GradeRequest,
    HealthResponse, UploadResponse,
};

/// Replies are consumed front to back. `Err(status)` simulates a non-2xx
/// response; an empty script answers 503.
#[derive(Default)]
pub struct MockBackend {
    pub uploads: Mutex<Vec<SelectedFile>>,
    pub asks: Mutex<Vec<AskRequest>>,
    pub question_requests: Mutex<Vec<ChallengeQuestionsRequest>>,
    pub grades: Mutex<Vec<GradeRequest>>,
    upload_replies: Mutex<VecDeque<Result<UploadResponse, u16>>>,
    ask_replies: Mutex<VecDeque<Result<AskResponse, u16>>>,
    question_replies: Mutex<VecDeque<Result<ChallengeQuestionsResponse, u16>>>,
    grade_replies: Mutex<VecDeque<Result<ChallengeResult, u16>>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_upload(&self, reply: Result<UploadResponse, u16>) {
        self.upload_replies.lock().unwrap().push_back(reply);
    }

    pub fn reply_ask(&self, reply: Result<AskResponse, u16>) {
        self.ask_replies.lock().unwrap().push_back(reply);
    }

    pub fn reply_questions(&self, reply: Result<Vec<&str>, u16>) {
        let reply = reply.map(|lines| ChallengeQuestionsResponse {
            questions: lines.into_iter().map(str::to_owned).collect(),
        });
        self.question_replies.lock().unwrap().push_back(reply);
    }

    pub fn reply_grade(&self, reply: Result<ChallengeResult, u16>) {
        self.grade_replies.lock().unwrap().push_back(reply);
    }

    /// Total requests received across every operation.
    pub fn request_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
            + self.asks.lock().unwrap().len()
            + self.question_requests.lock().unwrap().len()
            + self.grades.lock().unwrap().len()
    }
}

fn next<T>(script: &Mutex<VecDeque<Result<T, u16>>>) -> Result<T, ApiError> {
    match script.lock().unwrap().pop_front() {
        Some(Ok(value)) => Ok(value),
        Some(Err(status)) => Err(ApiError::Status { status }),
        None => Err(ApiError::Status { status: 503 }),
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        self.uploads.lock().unwrap().push(file.clone());
        next(&self.upload_replies)
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.asks.lock().unwrap().push(request.clone());
        next(&self.ask_replies)
    }

    async fn challenge_questions(
        &self,
        request: &ChallengeQuestionsRequest,
    ) -> Result<ChallengeQuestionsResponse, ApiError> {
        self.question_requests.lock().unwrap().push(request.clone());
        next(&self.question_replies)
    }

    async fn grade_answers(&self, request: &GradeRequest) -> Result<ChallengeResult, ApiError> {
        self.grades.lock().unwrap().push(request.clone());
        next(&self.grade_replies)
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        Ok(HealthResponse { status: "ok".to_owned() })
    }
}

/// Document store pre-loaded with `text`.
pub fn document_with(text: &str) -> DocumentStore {
    let store = DocumentStore::new();
    store.writer().set_text(text);
    store
}

pub fn text_file(contents: &str) -> SelectedFile {
    SelectedFile::new("notes.txt", "text/plain", contents.as_bytes().to_vec())
}
