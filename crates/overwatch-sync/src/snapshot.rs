//! Snapshot merge state and snapshot sources.

use std::time::Duration;

use overwatch_types::MapStateSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::SyncError;

/// Where the startup snapshot merge stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SnapshotPhase {
    /// The snapshot has not arrived yet; live writes are being recorded.
    #[default]
    Pending,
    /// The snapshot has been merged.
    Applied,
    /// The fetch failed; the picture is built from live events alone.
    Failed,
}

/// Source of the startup map-state snapshot.
///
/// Dispatches to the concrete source implementation.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    /// GET the snapshot from the server.
    Http(HttpSnapshotSource),
    /// A snapshot held in memory.
    Static(MapStateSnapshot),
}

impl SnapshotSource {
    /// Fetch the snapshot.
    pub async fn fetch(&self) -> Result<MapStateSnapshot, SyncError> {
        match self {
            Self::Http(source) => source.fetch().await,
            Self::Static(snapshot) => Ok(snapshot.clone()),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Http(_) => "http",
            Self::Static(_) => "static",
        }
    }
}

/// Fetches the snapshot from the server's map-state endpoint.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    /// Create a source for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<MapStateSnapshot, SyncError> {
        debug!(url = %self.url, "Fetching map-state snapshot");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::SnapshotStatus(status));
        }

        let snapshot: MapStateSnapshot = response.json().await?;
        debug!(items = snapshot.len(), "Map-state snapshot received");
        Ok(snapshot)
    }
}
