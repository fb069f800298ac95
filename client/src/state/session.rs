//! Session root: owns the document context and wires the flows.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the app shell's context providers. The session builds each flow
//! with exactly the capability it needs: upload gets the writer, ask and
//! challenge get readers. Flow state is otherwise disjoint.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use super::ask::AskFlow;
use super::challenge::ChallengeFlow;
use super::document::{DocumentReader, DocumentStore};
use super::upload::{PreviewRegistry, UploadFlow};
use crate::net::api::Backend;

pub struct Session {
    backend: Arc<dyn Backend>,
    document: DocumentStore,
    previews: PreviewRegistry,
    pub upload: UploadFlow,
    pub ask: AskFlow,
    pub challenge: ChallengeFlow,
}

impl Session {
    /// Start a session with an empty document context.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let document = DocumentStore::new();
        let previews = PreviewRegistry::new();
        let upload = UploadFlow::new(Arc::clone(&backend), document.writer(), previews.clone());
        let ask = AskFlow::new(Arc::clone(&backend), document.reader());
        let challenge = ChallengeFlow::new(Arc::clone(&backend), document.reader());
        Self { backend, document, previews, upload, ask, challenge }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Read-only view of the document text.
    #[must_use]
    pub fn document(&self) -> DocumentReader {
        self.document.reader()
    }

    #[must_use]
    pub fn has_document(&self) -> bool {
        !self.document.reader().is_empty()
    }

    /// Outstanding file previews; at most one while the session is alive.
    #[must_use]
    pub fn live_previews(&self) -> usize {
        self.previews.live()
    }
}
