//! Summarization service coordinating upload dispatch, extraction, and the model adapter.

use crate::{
    config::get_config,
    extract::{self, DocumentFormat},
    metrics::{MetricsSnapshot, ServiceMetrics},
    processing::types::SummarizeError,
    summarizer::{
        MIN_SUMMARY_TOKENS, SummarizationClient, SummarizationRequest, get_summarization_client,
    },
};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tiktoken_rs::CoreBPE;

/// Coordinates the full request pipeline: format dispatch, scoped spooling,
/// extraction (with OCR fallback inside the PDF path), and summarization.
///
/// The service owns the long-lived summarization client handle and the metrics
/// registry. Construct it once near process start and share it through an `Arc`.
pub struct SummarizeService {
    summarizer: Box<dyn SummarizationClient + Send + Sync>,
    token_counter: CoreBPE,
    metrics: Arc<ServiceMetrics>,
}

/// Abstraction over the summarization pipeline used by the HTTP surface.
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Summarize raw text submitted by the caller.
    async fn summarize_text(&self, text: String) -> Result<String, SummarizeError>;

    /// Extract text from an uploaded file and summarize it.
    async fn summarize_file(&self, filename: &str, bytes: Vec<u8>)
    -> Result<String, SummarizeError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummarizeService {
    /// Build the service with the configured summarization provider.
    pub fn new() -> Self {
        tracing::info!("Initializing summarization client");
        Self::with_client(get_summarization_client())
    }

    /// Build the service around an explicit summarization client.
    ///
    /// This is the injection seam: the client handle is created once at startup
    /// and shared read-only across requests.
    pub fn with_client(summarizer: Box<dyn SummarizationClient + Send + Sync>) -> Self {
        let token_counter =
            tiktoken_rs::cl100k_base().expect("Failed to load summarizer token counter");
        Self {
            summarizer,
            token_counter,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Summarize raw text submitted by the caller.
    pub async fn summarize_text(&self, text: String) -> Result<String, SummarizeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SummarizeError::NoReadableText);
        }
        let summary = self.summarize(trimmed).await?;
        self.metrics.record_text(trimmed.chars().count() as u64);
        tracing::info!(input_chars = trimmed.chars().count(), "Text summarized");
        Ok(summary)
    }

    /// Extract text from an uploaded file and summarize it.
    pub async fn summarize_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SummarizeError> {
        let extension = declared_extension(filename)
            .ok_or_else(|| SummarizeError::UnsupportedFormat(filename.to_string()))?;
        let format = DocumentFormat::from_extension(&extension)
            .ok_or_else(|| SummarizeError::UnsupportedFormat(format!(".{extension}")))?;

        // Format resolution precedes spooling: unsupported uploads never touch disk.
        let spooled = spool_upload(&extension, &bytes)?;
        let extracted = extract::extract_text(spooled.path(), format);
        drop(spooled);
        let text = extracted?;

        if extract::is_empty_result(format, &text) {
            return Err(SummarizeError::NoReadableText);
        }

        let text = text.trim();
        let summary = self.summarize(text).await?;
        self.metrics.record_file(text.chars().count() as u64);
        tracing::info!(
            file = filename,
            format = format.tag(),
            input_chars = text.chars().count(),
            "File summarized"
        );
        Ok(summary)
    }

    /// Return the current request metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Hand non-empty text to the provider, honoring the short-input floor.
    ///
    /// Inputs already at or below [`MIN_SUMMARY_TOKENS`] are returned verbatim:
    /// there is nothing meaningful to reduce, and the provider's minimum-length
    /// decoding would otherwise pad the output.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let tokens = self.token_counter.encode_ordinary(text).len();
        if tokens <= MIN_SUMMARY_TOKENS {
            tracing::debug!(tokens, "Input at or below the summary floor; returning verbatim");
            return Ok(text.to_string());
        }

        let config = get_config();
        let summary = self
            .summarizer
            .generate_summary(SummarizationRequest {
                model: config.summarizer_model.clone(),
                text: text.to_string(),
            })
            .await?;
        Ok(summary)
    }
}

#[async_trait]
impl SummarizeApi for SummarizeService {
    async fn summarize_text(&self, text: String) -> Result<String, SummarizeError> {
        SummarizeService::summarize_text(self, text).await
    }

    async fn summarize_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SummarizeError> {
        SummarizeService::summarize_file(self, filename, bytes).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummarizeService::metrics_snapshot(self)
    }
}

/// Declared extension of an uploaded filename: the substring after the last
/// `.`, lower-cased. `None` when the name carries no usable extension.
fn declared_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Spool upload bytes to a uniquely named scoped temporary file.
///
/// The extension is preserved as the suffix for debuggability. Dropping the
/// returned handle deletes the file, so release happens exactly once on every
/// exit path.
fn spool_upload(extension: &str, bytes: &[u8]) -> Result<NamedTempFile, std::io::Error> {
    let mut file = tempfile::Builder::new()
        .prefix("docbrief-upload-")
        .suffix(&format!(".{extension}"))
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}
