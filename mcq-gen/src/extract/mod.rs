//! Obtaining source text from a URL or an uploaded document.

mod docx;
mod pdf;
mod url;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{McqError, Result};

pub use url::fetch_text;

/// Where the source text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// Pick the source from CLI arguments. A URL wins over a file, as it
    /// did for the upload form.
    pub fn from_args(url: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        match (url.filter(|u| !u.trim().is_empty()), file) {
            (Some(url), _) => Ok(Source::Url(url)),
            (None, Some(path)) => Ok(Source::File(path)),
            (None, None) => Err(McqError::NoInput),
        }
    }

    /// Human-readable identifier, used as the default Source column value
    pub fn label(&self) -> String {
        match self {
            Source::Url(url) => url.clone(),
            Source::File(path) => path
                .file_name()
                .and_then(OsStr::to_str)
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("txt") => Ok(Self::Text),
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            _ => Err(McqError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Extract the text of a source. Empty results are rejected.
pub async fn extract(source: &Source) -> Result<String> {
    let text = match source {
        Source::Url(url) => fetch_text(url).await?,
        Source::File(path) => extract_file(path)?,
    };

    if text.trim().is_empty() {
        return Err(McqError::EmptyText);
    }

    log::info!(
        "Extracted {} words from {}",
        text.split_whitespace().count(),
        source.label()
    );
    Ok(text)
}

/// Extract text from a local document, dispatching on its extension.
pub fn extract_file(path: &Path) -> Result<String> {
    let kind = DocumentKind::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| McqError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let document_error = |message: String| McqError::Document {
        path: path.to_path_buf(),
        message,
    };

    match kind {
        DocumentKind::Text => {
            String::from_utf8(bytes).map_err(|e| document_error(format!("invalid UTF-8: {}", e)))
        }
        DocumentKind::Pdf => pdf::extract_text(&bytes).map_err(document_error),
        DocumentKind::Docx => docx::extract_text(&bytes).map_err(document_error),
    }
}
