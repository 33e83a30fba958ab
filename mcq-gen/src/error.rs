use std::path::PathBuf;
use thiserror::Error;

use llm_client::LlmError;

#[derive(Error, Debug)]
pub enum McqError {
    #[error("No input provided. Pass --url or --file.")]
    NoInput,

    #[error("Unsupported file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from {}: {message}", .path.display())]
    Document { path: PathBuf, message: String },

    #[error("No text data provided")]
    EmptyText,

    #[error("Generation failed for chunk {chunk}: {source}")]
    Generation {
        chunk: usize,
        #[source]
        source: LlmError,
    },

    #[error("Unsupported export format: {0}. Expected csv, json or txt.")]
    UnsupportedExportFormat(String),

    #[error("Invalid JSON data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used to decide who is at fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable text could be obtained from the request
    InputUnavailable,
    /// The LLM call failed; the batch was aborted
    GenerationFailure,
    ExportFormatInvalid,
    InvalidData,
    Config,
    Io,
}

impl McqError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            McqError::NoInput
            | McqError::UnsupportedFormat { .. }
            | McqError::Fetch { .. }
            | McqError::ReadFile { .. }
            | McqError::Document { .. }
            | McqError::EmptyText => ErrorKind::InputUnavailable,
            McqError::Generation { .. } => ErrorKind::GenerationFailure,
            McqError::UnsupportedExportFormat(_) => ErrorKind::ExportFormatInvalid,
            McqError::InvalidData(_) => ErrorKind::InvalidData,
            McqError::Config(_) => ErrorKind::Config,
            McqError::Csv(_) | McqError::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the caller supplied something unusable, as opposed to a
    /// failure on our side or in the LLM service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InputUnavailable
                | ErrorKind::ExportFormatInvalid
                | ErrorKind::InvalidData
                | ErrorKind::Config
        )
    }
}

pub type Result<T> = std::result::Result<T, McqError>;
