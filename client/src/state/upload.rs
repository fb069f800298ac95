//! Upload flow: select, validate, send, summarize.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only writer of the document context. A successful upload stores the
//! backend's extracted text so the ask and challenge flows can use it.
//!
//! DESIGN
//! ======
//! Phases are derived from the fields rather than stored:
//!
//! ```text
//! Idle ──select──▶ FileSelected ──upload──▶ Uploading ──ok──▶ Summarized
//!                       ▲                       │
//!                       └────────── err ────────┘
//! ```
//!
//! `reset_upload` returns to `Idle` from any phase and invalidates an upload
//! that is still in flight. Every accepted selection holds a
//! [`PreviewHandle`]; dropping the selection (supersede, reset, teardown)
//! releases it.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use super::document::DocumentWriter;
use super::error::{Flow, FlowError};
use super::in_flight::{Completion, InFlight, Ticket};
use crate::net::api::{ApiError, Backend};
pub use crate::net::types::SelectedFile;
use crate::net::types::UploadResponse;

/// Largest accepted upload, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["application/pdf", "text/plain"];
/// Shown when the backend omits a summary.
pub const DEFAULT_SUMMARY: &str = "Document uploaded successfully!";
const UPLOAD_FAILED: &str = "Failed to upload document. Please ensure the backend server is running.";

/// How the user picked the file. Both sources share one validation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSource {
    Picker,
    DragDrop,
}

/// Check MIME type and size.
///
/// # Errors
///
/// Returns [`FlowError::UnsupportedFileType`] or [`FlowError::FileTooLarge`].
pub fn validate_file(file: &SelectedFile) -> Result<(), FlowError> {
    validate_metadata(&file.mime, file.size())
}

/// [`validate_file`] for a file that has not been read yet.
///
/// # Errors
///
/// Same as [`validate_file`].
pub fn validate_metadata(mime: &str, size: u64) -> Result<(), FlowError> {
    if !ACCEPTED_MIME_TYPES.contains(&mime) {
        return Err(FlowError::UnsupportedFileType { mime: mime.to_owned() });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(FlowError::FileTooLarge { size });
    }
    Ok(())
}

/// Render a byte count as megabytes with two decimals, e.g. `1.50 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

// =============================================================================
// PREVIEW HANDLES
// =============================================================================

/// Tracks outstanding preview handles so leaks are observable.
#[derive(Clone, Debug, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn acquire(&self) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        PreviewHandle { id, registry: self.clone() }
    }

    /// Number of handles not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, id: Uuid) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Locally generated preview for the selected file. Released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
        tracing::trace!(id = %self.id, "preview released");
    }
}

// =============================================================================
// FLOW
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    Uploading,
    Summarized,
}

/// Request issued by [`UploadFlow::begin_upload`].
#[derive(Debug)]
pub struct PendingUpload {
    ticket: Ticket,
    pub file: Arc<SelectedFile>,
}

pub struct UploadFlow {
    backend: Arc<dyn Backend>,
    document: DocumentWriter,
    previews: PreviewRegistry,
    file: Option<Arc<SelectedFile>>,
    preview: Option<PreviewHandle>,
    summary: Option<String>,
    error: Option<String>,
    in_flight: InFlight,
}

impl UploadFlow {
    pub fn new(backend: Arc<dyn Backend>, document: DocumentWriter, previews: PreviewRegistry) -> Self {
        Self {
            backend,
            document,
            previews,
            file: None,
            preview: None,
            summary: None,
            error: None,
            in_flight: InFlight::new(Flow::Upload),
        }
    }

    #[must_use]
    pub fn phase(&self) -> UploadPhase {
        if self.in_flight.is_busy() {
            UploadPhase::Uploading
        } else if self.file.is_none() {
            UploadPhase::Idle
        } else if self.summary.is_some() {
            UploadPhase::Summarized
        } else {
            UploadPhase::FileSelected
        }
    }

    #[must_use]
    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_deref()
    }

    #[must_use]
    pub fn preview_id(&self) -> Option<Uuid> {
        self.preview.as_ref().map(PreviewHandle::id)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Accept a newly chosen file.
    ///
    /// A valid selection supersedes the previous one (and any upload still in
    /// flight), clearing summary and error. An invalid one leaves the current
    /// phase untouched.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`validate_file`].
    pub fn select_file(&mut self, file: SelectedFile, source: SelectionSource) -> Result<(), FlowError> {
        if let Err(err) = validate_file(&file) {
            tracing::debug!(
                name = %file.name,
                mime = %file.mime,
                size = file.size(),
                ?source,
                error = %err,
                "file rejected"
            );
            return Err(self.reject_selection(err));
        }
        tracing::debug!(name = %file.name, size = file.size(), ?source, "file selected");
        self.in_flight.invalidate();
        // Release the superseded preview before acquiring the new one.
        self.preview = None;
        self.preview = Some(self.previews.acquire());
        self.file = Some(Arc::new(file));
        self.summary = None;
        self.error = None;
        Ok(())
    }

    /// Record a selection that failed validation before its bytes were read.
    /// The current phase is left untouched.
    pub fn reject_selection(&mut self, err: FlowError) -> FlowError {
        self.error = Some(err.to_string());
        err
    }

    /// Start an upload of the selected file.
    ///
    /// # Errors
    ///
    /// [`FlowError::Busy`] while another upload is outstanding, or
    /// [`FlowError::NoFileSelected`].
    pub fn begin_upload(&mut self) -> Result<PendingUpload, FlowError> {
        self.in_flight.ensure_idle()?;
        let Some(file) = self.file.clone() else {
            self.error = Some(FlowError::NoFileSelected.to_string());
            return Err(FlowError::NoFileSelected);
        };
        let ticket = self.in_flight.begin()?;
        self.error = None;
        Ok(PendingUpload { ticket, file })
    }

    /// Apply the backend outcome of `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Backend`] when `result` is an error. The file
    /// selection is kept so the user can retry.
    pub fn finish_upload(
        &mut self,
        pending: PendingUpload,
        result: Result<UploadResponse, ApiError>,
    ) -> Result<Completion, FlowError> {
        if !self.in_flight.finish(pending.ticket) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(response) => {
                self.document.set_text(response.document_text);
                let summary = response
                    .summary
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_SUMMARY.to_owned());
                tracing::info!(name = %pending.file.name, summary_len = summary.len(), "document uploaded");
                self.summary = Some(summary);
                Ok(Completion::Applied)
            }
            Err(source) => {
                tracing::warn!(name = %pending.file.name, error = %source, "upload failed");
                self.error = Some(UPLOAD_FAILED.to_owned());
                Err(FlowError::Backend { flow: Flow::Upload, message: UPLOAD_FAILED, source })
            }
        }
    }

    /// Upload the selected file and store the extracted text.
    ///
    /// # Errors
    ///
    /// See [`UploadFlow::begin_upload`] and [`UploadFlow::finish_upload`].
    pub async fn upload(&mut self) -> Result<(), FlowError> {
        let pending = self.begin_upload()?;
        let result = self.backend.upload(&pending.file).await;
        self.finish_upload(pending, result).map(|_| ())
    }

    /// Return to `Idle`, discarding file, preview, summary, and error.
    pub fn reset_upload(&mut self) {
        self.in_flight.invalidate();
        self.file = None;
        self.preview = None;
        self.summary = None;
        self.error = None;
        tracing::debug!("upload reset");
    }
}
