//! End-to-end flow through the router with a real service and a mocked
//! summarization runtime.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use docbrief::api::create_router;
use docbrief::config::{CONFIG, Config};
use docbrief::processing::SummarizeService;
use httpmock::MockServer;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn long_text() -> String {
    "The committee reviewed the quarterly budget figures in detail and agreed that \
     infrastructure spending should be rebalanced toward maintenance of the existing \
     rail network before any new construction projects are approved next year. "
        .repeat(2)
}

fn multipart_request(filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "integration-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\ncontent-type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json body")
}

#[tokio::test]
async fn end_to_end_summarize_and_upload() {
    let server = MockServer::start_async().await;
    CONFIG
        .set(Config {
            summarizer_model: "test-model".into(),
            summarizer_url: Some(server.base_url()),
            server_port: None,
            ocr_language: "eng".into(),
        })
        .expect("config installed once");

    server
        .mock_async(|when, then| {
            when.method(httpmock::Method::POST).path("/api/generate");
            then.status(200).json_body(json!({
                "response": "A concise summary.",
                "done": true
            }));
        })
        .await;

    let app = create_router(Arc::new(SummarizeService::new()));

    // Raw text, twice: the summary is identical across calls.
    let mut summaries = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "text": long_text() }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        summaries.push(body["summary"].as_str().expect("summary").to_string());
    }
    assert_eq!(summaries[0], "A concise summary.");
    assert_eq!(summaries[0], summaries[1], "decoding must be deterministic");

    // Empty raw text is pinned to a 400.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/summarize")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":""}"#))
                .expect("request"),
        )
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Plain-text upload goes through extraction and summarization.
    let response = app
        .clone()
        .oneshot(multipart_request("notes.txt", long_text().as_bytes()))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["summary"], "A concise summary.");

    // Unknown extension fails fast with a descriptive detail.
    let response = app
        .clone()
        .oneshot(multipart_request("report.xyz", b"does not matter"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .expect("detail")
            .contains("Unsupported file type")
    );

    // Whitespace-only upload yields no readable text.
    let response = app
        .clone()
        .oneshot(multipart_request("blank.txt", b"  \n\t  "))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Counters reflect the two raw-text requests and the one successful upload.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/metrics")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["texts_summarized"], 2);
    assert_eq!(body["files_summarized"], 1);
    assert!(body["last_input_chars"].as_u64().expect("chars") > 0);
}
