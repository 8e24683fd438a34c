//! Error taxonomy for the ingestion/archival/replay data plane.
//!
//! Mirrors the error kinds a chunk/contract-level ingest loop needs to
//! distinguish: transient transport failures (retry), auth expiry (refresh
//! once), malformed payloads (skip the record, not the chunk), and fatal
//! configuration problems (skip the area until restart).

use thiserror::Error;

/// A single malformed-record note, carried alongside a parse result so a
/// batch can report how many records it had to drop.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    pub message: String,
}

impl ParseIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseIssue {}

/// Errors surfaced by the upstream HTTP client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport error after retries: {0}")]
    Transport(String),

    #[error("authentication expired and refresh failed: {0}")]
    AuthExpired(String),

    #[error("upstream rejected request ({status}): {body}")]
    RateLimitOrClientError { status: u16, body: String },

    #[error("upstream returned malformed payload: {0}")]
    Parse(String),

    #[error("missing upstream credentials")]
    MissingCredentials,
}

/// Errors that abort a single ingest chunk or per-contract unit of work.
/// Never propagated past the owning ingester loop — it is caught, truncated,
/// and persisted onto the relevant checkpoint/contract record.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

impl IngestError {
    /// Truncate to the ≤500-char budget the checkpoint tables allow for
    /// `last_error`.
    pub fn truncated_message(&self) -> String {
        let full = self.to_string();
        if full.len() <= 500 {
            return full;
        }
        let mut boundary = 500;
        while !full.is_char_boundary(boundary) {
            boundary -= 1;
        }
        full[..boundary].to_string()
    }
}

/// Fatal, process-level configuration errors. An area is skipped until
/// restart rather than retried.
#[derive(Debug, Error)]
pub enum FatalConfigError {
    #[error("missing or invalid database connection string")]
    Database,

    #[error("area '{0}' has no usable configuration")]
    Area(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_message_leaves_short_messages_untouched() {
        let err = IngestError::Other("short".to_string());
        assert_eq!(err.truncated_message(), "short");
    }

    #[test]
    fn truncated_message_never_splits_a_multibyte_char() {
        // A body of 2-byte chars whose raw length lands the 500-byte cut
        // mid-character; truncation must back off to the char boundary
        // instead of panicking.
        let body = "é".repeat(300);
        let err = IngestError::Upstream(UpstreamError::RateLimitOrClientError {
            status: 429,
            body,
        });
        let truncated = err.truncated_message();
        assert!(truncated.len() <= 500);
        assert!(truncated.is_char_boundary(truncated.len()));
    }
}
