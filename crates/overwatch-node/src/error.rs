//! Error types for the node binary.

/// Top-level error for the node binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The snapshot source could not be built.
    #[error("snapshot source error: {source}")]
    Snapshot {
        /// The underlying synchronizer error.
        #[from]
        source: overwatch_sync::SyncError,
    },

    /// The CoT gateway could not be built.
    #[error("dispatch error: {source}")]
    Dispatch {
        /// The underlying dispatch error.
        #[from]
        source: overwatch_dispatch::DispatchError,
    },

    /// NATS connection or subscription failed.
    #[error("NATS error: {message}")]
    Nats {
        /// Description of the NATS failure.
        message: String,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying listener error.
        #[from]
        source: overwatch_observer::ServerError,
    },
}

/// Why a feed message could not become a live event.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The subject does not name a known event kind.
    #[error("unknown subject {0}")]
    UnknownSubject(String),

    /// The payload did not match the event kind's shape.
    #[error("undecodable {kind} payload: {source}")]
    Decode {
        /// Event kind named by the subject.
        kind: overwatch_types::LiveEventKind,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
