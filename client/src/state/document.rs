//! Document context: the extracted text of the active document.
//!
//! DESIGN
//! ======
//! One [`DocumentStore`] exists per session. It hands out two capabilities:
//! a [`DocumentWriter`] for the upload flow and cloneable [`DocumentReader`]s
//! for ask and challenge. Nothing else can mutate the text.
//!
//! An empty string means "no document yet". The store itself never
//! validates; consumers check [`DocumentReader::is_empty`] before sending.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::sync::{Arc, PoisonError, RwLock};

/// Session-root owner of the document text.
#[derive(Debug, Default)]
pub struct DocumentStore {
    text: Arc<RwLock<String>>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only handle for consuming flows.
    #[must_use]
    pub fn reader(&self) -> DocumentReader {
        DocumentReader { text: Arc::clone(&self.text) }
    }

    /// Write handle. Intended for the upload flow only.
    #[must_use]
    pub fn writer(&self) -> DocumentWriter {
        DocumentWriter { reader: self.reader() }
    }
}

/// Read access to the document text.
#[derive(Clone, Debug)]
pub struct DocumentReader {
    text: Arc<RwLock<String>>,
}

impl DocumentReader {
    /// Current document text; empty when nothing has been uploaded.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.read().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    /// Length of the document text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Write access to the document text.
#[derive(Debug)]
pub struct DocumentWriter {
    reader: DocumentReader,
}

impl DocumentWriter {
    /// Replace the document text. Accepts any string, including empty.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(len = text.len(), "document text replaced");
        *self.reader.text.write().unwrap_or_else(PoisonError::into_inner) = text;
    }

    #[must_use]
    pub fn reader(&self) -> &DocumentReader {
        &self.reader
    }
}
