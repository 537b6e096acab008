use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct ServiceMetrics {
    texts_summarized: AtomicU64,
    files_summarized: AtomicU64,
    last_input_chars: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw-text summarization and the character count of its input.
    pub fn record_text(&self, input_chars: u64) {
        self.texts_summarized.fetch_add(1, Ordering::Relaxed);
        self.last_input_chars.store(input_chars, Ordering::Relaxed);
    }

    /// Record a file summarization and the character count of its extracted text.
    pub fn record_file(&self, input_chars: u64) {
        self.files_summarized.fetch_add(1, Ordering::Relaxed);
        self.last_input_chars.store(input_chars, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let last_input_chars = self.last_input_chars.load(Ordering::Relaxed);
        MetricsSnapshot {
            texts_summarized: self.texts_summarized.load(Ordering::Relaxed),
            files_summarized: self.files_summarized.load(Ordering::Relaxed),
            last_input_chars: (last_input_chars > 0).then_some(last_input_chars),
        }
    }
}

/// Immutable view of request counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of raw-text requests summarized since startup.
    pub texts_summarized: u64,
    /// Number of uploaded files summarized since startup.
    pub files_summarized: u64,
    /// Character count of the most recent summarization input, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_input_chars: Option<u64>,
}
