#![deny(missing_docs)]

//! Core library for the Docbrief summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Format-specific document text extraction.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters for diagnostics.
pub mod metrics;
/// Upload dispatch and summarization pipeline.
pub mod processing;
/// Summarization client abstraction and the Ollama adapter.
pub mod summarizer;
