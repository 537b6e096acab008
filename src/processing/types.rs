//! Core error definitions for the summarization pipeline.

use crate::extract::ExtractError;
use crate::summarizer::SummarizationClientError;
use thiserror::Error;

/// Errors emitted by the summarization pipeline.
///
/// Each variant carries a tag a caller can match on programmatically; the
/// request boundary maps them to HTTP statuses and detail messages.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Uploaded file's declared extension (or lack of one) is not supported.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    /// Upload could not be spooled to its scoped temporary location.
    #[error("Error saving file: {0}")]
    Storage(#[from] std::io::Error),
    /// Format extractor failed while reading the stored document.
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractError),
    /// Extraction succeeded but recovered no usable text.
    #[error("No readable text found")]
    NoReadableText,
    /// Summarization provider failed to produce a summary.
    #[error("Failed to generate summary: {0}")]
    Summarization(#[from] SummarizationClientError),
}
