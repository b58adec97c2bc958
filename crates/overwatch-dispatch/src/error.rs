//! Error types for CoT transmission.

/// Errors from a single transmission attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("CoT request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("CoT endpoint rejected the event with status {0}")]
    Rejected(reqwest::StatusCode),
}
