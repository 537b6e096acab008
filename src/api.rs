//! HTTP surface for Docbrief.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /summarize` – Summarize raw text. Accepts `{ "text": string }` and returns
//!   `{ "summary": string }`.
//! - `POST /upload` – Multipart file upload (`file` part). The declared extension selects
//!   an extractor (`txt`, `pdf`, `ppt`/`pptx`, `doc`/`docx`); the extracted text is
//!   summarized and returned as `{ "summary": string }`.
//! - `GET /metrics` – Observe request counters and the last input size.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Every pipeline error is reported as `{ "detail": string }` with a 400 for caller
//! mistakes (unsupported extension, no readable text) and a 500 for everything else.

use crate::metrics::MetricsSnapshot;
use crate::processing::{SummarizeApi, SummarizeError};
use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizeApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize_text::<S>))
        .route("/upload", post(upload_file::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Raw text to summarize.
    text: String,
}

/// Success response for both summarization endpoints.
#[derive(Serialize)]
struct SummaryResponse {
    /// Length-bounded abstractive summary.
    summary: String,
}

/// Summarize raw text.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: SummarizeApi,
{
    let summary = service.summarize_text(request.text).await?;
    tracing::info!(summary_chars = summary.chars().count(), "Summarize request completed");
    Ok(Json(SummaryResponse { summary }))
}

/// Upload a document, extract its text, and summarize it.
async fn upload_file<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: SummarizeApi,
{
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::bad_request(format!("malformed multipart body: {error}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("file part is missing a filename"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::bad_request(format!("failed to read file part: {error}")))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::bad_request("multipart body must include a 'file' part"))?;
    let summary = service.summarize_file(&filename, bytes).await?;
    tracing::info!(
        file = %filename,
        summary_chars = summary.chars().count(),
        "Upload request completed"
    );
    Ok(Json(SummaryResponse { summary }))
}

/// Return a concise metrics snapshot with request counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: SummarizeApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize raw text. Response returns { \"summary\": string }.",
                request_example: Some(json!({
                    "text": "Document contents"
                })),
            },
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/upload",
                description: "Upload a document (txt, pdf, ppt/pptx, doc/docx) as a multipart 'file' part and receive { \"summary\": string }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return request counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    BadRequest(String),
    Service(SummarizeError),
}

impl AppError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }
}

impl From<SummarizeError> for AppError {
    fn from(inner: SummarizeError) -> Self {
        Self::Service(inner)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Service(error) => (status_for(&error), error.to_string()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Map pipeline errors to HTTP statuses: caller mistakes are 400s, everything
/// else is a 500.
fn status_for(error: &SummarizeError) -> StatusCode {
    match error {
        SummarizeError::UnsupportedFormat(_) | SummarizeError::NoReadableText => {
            StatusCode::BAD_REQUEST
        }
        SummarizeError::Storage(_)
        | SummarizeError::Extraction(_)
        | SummarizeError::Summarization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
