//! Local file loading for the upload flow.
//!
//! The MIME type comes from the extension only. Type and size are checked
//! against the file's metadata with the upload flow's own validator before
//! any bytes are read, so an oversized file is never buffered.

#[cfg(test)]
#[path = "files_test.rs"]
mod files_test;

use std::ffi::OsStr;
use std::path::Path;

use client::state::upload::{SelectedFile, validate_metadata};

use crate::error::CliError;

#[must_use]
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt" | "text" | "log") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Read `path` into memory as a [`SelectedFile`].
///
/// # Errors
///
/// [`CliError::ReadFile`] if the file cannot be read, or [`CliError::Flow`]
/// carrying the validation error when its type or size is not accepted.
pub async fn read_selected_file(path: &Path) -> Result<SelectedFile, CliError> {
    let read_err = |source| CliError::ReadFile { path: path.to_path_buf(), source };
    let mime = mime_for_path(path);
    let metadata = tokio::fs::metadata(path).await.map_err(read_err)?;
    validate_metadata(mime, metadata.len())?;
    let bytes = tokio::fs::read(path).await.map_err(read_err)?;
    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("document")
        .to_owned();
    Ok(SelectedFile::new(name, mime, bytes))
}
