//! Summarization pipeline: upload dispatch, text extraction, and the model adapter.

mod service;
pub mod types;

pub use service::{SummarizeApi, SummarizeService};
pub use types::SummarizeError;
