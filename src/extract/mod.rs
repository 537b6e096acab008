//! Format-specific document text extraction.
//!
//! Each supported format exposes the same capability: given a stored file, recover its
//! textual content as a single newline-joined string. Extractors that open a document but
//! find no text return [`NO_TEXT_SENTINEL`]; the dispatcher treats the sentinel the same
//! as an empty result. The PDF extractor falls back to OCR for pages without a text layer.

mod docx;
mod ocr;
mod pdf;
mod pptx;
mod text;

use std::path::Path;
use thiserror::Error;

/// Literal returned by extractors that opened a document but recovered no text.
pub const NO_TEXT_SENTINEL: &str = "No readable text found.";

/// Errors raised while extracting text from a stored document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Plain-text file contained bytes that are not valid UTF-8.
    #[error("file is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// Document could not be opened or walked by the format parser.
    #[error("failed to read {format} content: {source}")]
    Extraction {
        /// Short tag naming the extractor that failed (`txt`, `pdf`, `pptx`, `docx`).
        format: &'static str,
        /// Underlying error raised by the parsing library or OCR engine.
        #[source]
        source: anyhow::Error,
    },
}

/// Document families the dispatcher knows how to extract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// UTF-8 plain text (`txt`).
    PlainText,
    /// Portable Document Format (`pdf`), with OCR fallback for scanned pages.
    Pdf,
    /// Slide decks (`ppt`, `pptx`).
    Presentation,
    /// Word documents (`doc`, `docx`).
    Word,
}

impl DocumentFormat {
    /// Resolve a lower-cased file extension to a format, or `None` when unsupported.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "ppt" | "pptx" => Some(Self::Presentation),
            "doc" | "docx" => Some(Self::Word),
            _ => None,
        }
    }

    /// Short tag used in error messages and logs.
    pub fn tag(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Pdf => "pdf",
            Self::Presentation => "pptx",
            Self::Word => "docx",
        }
    }
}

/// Extract the textual content of a stored document.
///
/// Dispatches to the extractor matching `format`. The result is trimmed by each
/// extractor; callers should still reject empty or sentinel results via
/// [`is_empty_result`] before using the text.
pub fn extract_text(path: &Path, format: DocumentFormat) -> Result<String, ExtractError> {
    tracing::debug!(format = format.tag(), path = %path.display(), "Extracting document text");
    match format {
        DocumentFormat::PlainText => text::extract(path),
        DocumentFormat::Pdf => pdf::extract(path),
        DocumentFormat::Presentation => pptx::extract(path),
        DocumentFormat::Word => docx::extract(path),
    }
}

/// Whether an extraction result carries no usable text.
///
/// The sentinel only counts as empty for formats whose extractors emit it; a
/// plain-text file whose content happens to spell the sentinel is real text.
pub fn is_empty_result(format: DocumentFormat, text: &str) -> bool {
    let trimmed = text.trim();
    match format {
        DocumentFormat::PlainText => trimmed.is_empty(),
        _ => trimmed.is_empty() || trimmed == NO_TEXT_SENTINEL,
    }
}

/// Trim an accumulated extraction result, substituting the sentinel when nothing remains.
pub(crate) fn finish_accumulated(text: String) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        NO_TEXT_SENTINEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Last segment of a possibly namespace-prefixed XML element name.
pub(crate) fn xml_local_name(name: &[u8]) -> &[u8] {
    name.rsplit(|byte| *byte == b':').next().unwrap_or(name)
}
