//! Backend HTTP contract: upload, ask, challenge questions, grading, health.
//!
//! DESIGN
//! ======
//! Flows talk to the backend only through the [`Backend`] trait so they can be
//! driven by an in-process mock in tests. [`HttpBackend`] is the reqwest
//! implementation used by the binary.
//!
//! ERROR HANDLING
//! ==============
//! Every failure (transport, non-2xx status, undecodable body) becomes an
//! [`ApiError`]. Flows collapse all of them into one connectivity message, so
//! no response-body error schema is parsed here.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    AskRequest, AskResponse, ChallengeQuestionsRequest, ChallengeQuestionsResponse, ChallengeResult, GradeRequest,
    HealthResponse, SelectedFile, UploadResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const UPLOAD_PATH: &str = "/upload";
pub const ASK_PATH: &str = "/ask";
pub const CHALLENGE_PATH: &str = "/challenge";
pub const DEFAULT_GRADE_PATH: &str = CHALLENGE_PATH;
/// Multipart field carrying the raw file bytes.
pub const UPLOAD_FIELD: &str = "file";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend responded with status {status}")]
    Status { status: u16 },

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// The opaque document backend. One method per operation; the question
/// generation and grading calls are distinct even when served by one route.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Upload raw file bytes and receive the extracted text plus summary.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or a
    /// malformed response.
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError>;

    /// Ask one (possibly memory-augmented) question about the document.
    ///
    /// # Errors
    ///
    /// See [`Backend::upload`].
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError>;

    /// Generate a fresh set of challenge questions.
    ///
    /// # Errors
    ///
    /// See [`Backend::upload`].
    async fn challenge_questions(
        &self,
        request: &ChallengeQuestionsRequest,
    ) -> Result<ChallengeQuestionsResponse, ApiError>;

    /// Grade a complete answer set.
    ///
    /// # Errors
    ///
    /// See [`Backend::upload`].
    async fn grade_answers(&self, request: &GradeRequest) -> Result<ChallengeResult, ApiError>;

    /// Liveness check.
    ///
    /// # Errors
    ///
    /// See [`Backend::upload`].
    async fn health(&self) -> Result<HealthResponse, ApiError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout. `None` leaves calls unbounded.
    pub request_timeout: Option<Duration>,
    pub grade_path: String,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: None,
            grade_path: DEFAULT_GRADE_PATH.to_owned(),
        }
    }
}

/// reqwest-backed [`Backend`].
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    grade_path: String,
}

impl HttpBackend {
    /// Build a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the reqwest client fails to build.
    pub fn new(config: HttpBackendConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            grade_path: config.grade_path,
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path);
        tracing::debug!(%url, "POST json");
        let response = self.http.post(url).json(body).send().await?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);
        let url = endpoint(&self.base_url, UPLOAD_PATH);
        tracing::debug!(%url, name = %file.name, size = file.size(), "POST multipart");
        let response = self.http.post(url).multipart(form).send().await?;
        read_json(response).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.post_json(ASK_PATH, request).await
    }

    async fn challenge_questions(
        &self,
        request: &ChallengeQuestionsRequest,
    ) -> Result<ChallengeQuestionsResponse, ApiError> {
        self.post_json(CHALLENGE_PATH, request).await
    }

    async fn grade_answers(&self, request: &GradeRequest) -> Result<ChallengeResult, ApiError> {
        self.post_json(&self.grade_path, request).await
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = endpoint(&self.base_url, "/");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16() });
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
