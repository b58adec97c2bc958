//! Best-effort HTTP transmission of CoT events.
//!
//! Each event is written to XML and POSTed once. There is no retry and no
//! queue: a failed send is logged and reported to the caller, nothing more.

use std::time::Duration;

use overwatch_cot::{encode_detection, to_xml};
use overwatch_types::{CotEvent, RfDetection};
use tracing::{debug, info, warn};

use crate::error::DispatchError;

/// Content type of the POST body.
pub const COT_CONTENT_TYPE: &str = "application/xml";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to send CoT events.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Full URL of the CoT endpoint.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Config for `endpoint` with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Sends CoT events to the server.
#[derive(Debug, Clone)]
pub struct CotGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl CotGateway {
    /// Build a gateway from `config`.
    pub fn new(config: &GatewayConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Make one transmission attempt.
    pub async fn try_send(&self, event: &CotEvent) -> Result<(), DispatchError> {
        let body = to_xml(event);
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, COT_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected(status));
        }
        debug!(uid = %event.uid, status = %status, "CoT event accepted");
        Ok(())
    }

    /// Send one event, reporting only whether the server accepted it.
    pub async fn send(&self, event: &CotEvent) -> bool {
        match self.try_send(event).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    uid = %event.uid,
                    endpoint = %self.endpoint,
                    error = %e,
                    "CoT transmission failed"
                );
                false
            }
        }
    }

    /// Send events one after another and return how many were accepted.
    ///
    /// A failure does not stop the remaining sends.
    pub async fn send_batch(&self, events: &[CotEvent]) -> usize {
        let mut sent: usize = 0;
        for event in events {
            if self.send(event).await {
                sent = sent.saturating_add(1);
            }
        }
        info!(sent, total = events.len(), "CoT batch sent");
        sent
    }

    /// Encode detections and send them as a batch.
    pub async fn send_detections(&self, detections: &[RfDetection]) -> usize {
        let events: Vec<CotEvent> = detections.iter().map(encode_detection).collect();
        self.send_batch(&events).await
    }
}
