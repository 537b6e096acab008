//! Abstractions for generating abstractive summaries via a local model runtime.
//!
//! The service treats summarization as an external capability: text in, shorter
//! text out. The Ollama-backed client issues plain HTTP requests to the runtime
//! with fixed length bounds and deterministic decoding, so identical input
//! always yields an identical summary.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Upper bound on generated summary length, in tokens.
pub const MAX_SUMMARY_TOKENS: usize = 100;
/// Inputs at or below this token count are returned unchanged instead of summarized.
pub const MIN_SUMMARY_TOKENS: usize = 30;
/// Fixed sampling seed; combined with zero temperature this pins the decoding path.
const DECODING_SEED: u64 = 42;

/// Errors surfaced while attempting abstractive summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to the summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Fully qualified model identifier understood by the provider.
    pub model: String,
    /// Text to reduce to a summary.
    pub text: String,
}

/// Interface implemented by abstractive summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a concise summary using the configured model.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Build the summarization client from configuration.
///
/// Called once at startup; the resulting handle is shared read-only across
/// requests by the processing service.
pub fn get_summarization_client() -> Box<dyn SummarizationClient + Send + Sync> {
    let config = get_config();
    let base_url = config
        .summarizer_url
        .clone()
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
    Box::new(OllamaSummarizationClient::new(base_url))
}

struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
}

impl OllamaSummarizationClient {
    fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("docbrief/summary")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Summarize the following text in at most {MAX_SUMMARY_TOKENS} tokens and at least \
         {MIN_SUMMARY_TOKENS} tokens. Respond with only the summary.\n\n{text}"
    )
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": request.model,
            "prompt": build_prompt(&request.text),
            "stream": false,
            "options": {
                "temperature": 0.0,
                "seed": DECODING_SEED,
                "num_predict": MAX_SUMMARY_TOKENS,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach summarizer at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "summarizer endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "summarizer returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode summarizer response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "summarizer response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> OllamaSummarizationClient {
        OllamaSummarizationClient {
            http: Client::builder()
                .user_agent("docbrief-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
        }
    }

    #[tokio::test]
    async fn client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "  Summary text  ",
                    "done": true
                }));
            })
            .await;

        let summary = client
            .generate_summary(SummarizationRequest {
                model: "llama".into(),
                text: "A long document body".into(),
            })
            .await
            .expect("summary");

        mock.assert();
        assert_eq!(summary, "Summary text");
    }

    #[tokio::test]
    async fn client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client
            .generate_summary(SummarizationRequest {
                model: "llama".into(),
                text: "A long document body".into(),
            })
            .await
            .expect_err("error response");

        assert!(
            matches!(error, SummarizationClientError::GenerationFailed(message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn incomplete_response_is_invalid() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "partial",
                    "done": false
                }));
            })
            .await;

        let error = client
            .generate_summary(SummarizationRequest {
                model: "llama".into(),
                text: "A long document body".into(),
            })
            .await
            .expect_err("incomplete response");

        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[test]
    fn prompt_carries_both_length_bounds() {
        let prompt = build_prompt("body");
        assert!(prompt.contains("100 tokens"));
        assert!(prompt.contains("30 tokens"));
        assert!(prompt.ends_with("body"));
    }
}
