//! Overwatch node binary.
//!
//! Wires the live NATS feed, the map-state snapshot and the reconciliation
//! loop together, publishes the picture through the Observer API, and
//! exposes CoT transmission through the gateway.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `overwatch-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the CoT gateway and observer state
//! 4. Start the Observer API server
//! 5. Connect to NATS and start forwarding the live feed
//! 6. Run the reconciliation loop until the feed ends or `Ctrl-C`

mod config;
mod error;
mod live_feed;
mod observer_callback;

use std::sync::Arc;

use overwatch_dispatch::{CotGateway, GatewayConfig};
use overwatch_observer::{AppState, ServerConfig};
use overwatch_sync::{
    HttpSnapshotSource, SnapshotSource, SyncConfig, Synchronizer, run_reconciliation,
};
use overwatch_types::MapStateSnapshot;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, NodeConfig};
use crate::error::NodeError;
use crate::live_feed::LiveFeed;
use crate::observer_callback::ObserverCallback;

/// Application entry point for the node.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = NodeConfig::load().map_err(NodeError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("overwatch-node starting");
    info!(
        snapshot_url = config.server.snapshot_url.as_deref().unwrap_or("none"),
        cot_url = config.server.cot_url.as_deref().unwrap_or("none"),
        nats_url = %config.feed.nats_url,
        subject_prefix = %config.feed.subject_prefix,
        fov_range_m = config.picture.fov_range_m,
        "Configuration loaded"
    );

    // 3. CoT gateway and observer state.
    let timeout = config.server.request_timeout();
    let app_state = match &config.server.cot_url {
        Some(url) => {
            let gateway = CotGateway::new(&GatewayConfig {
                endpoint: url.clone(),
                timeout,
            })
            .map_err(NodeError::from)?;
            Arc::new(AppState::with_gateway(Arc::new(gateway)))
        }
        None => {
            warn!("No CoT endpoint configured, transmission disabled");
            Arc::new(AppState::new())
        }
    };

    // 4. Observer API server.
    let observer = if config.observer.enabled {
        let server_config = ServerConfig {
            host: config.observer.host.clone(),
            port: config.observer.port,
        };
        let handle = overwatch_observer::spawn_observer(&server_config, Arc::clone(&app_state))
            .await
            .map_err(NodeError::from)?;
        info!(addr = %handle.local_addr(), "Observer API started");
        Some(handle)
    } else {
        info!("Observer disabled");
        None
    };

    // 5. Live feed.
    let feed = LiveFeed::connect(&config.feed.nats_url, config.feed.subject_prefix.clone()).await?;
    let subscriber = feed.subscribe().await?;
    let (tx, rx) = mpsc::channel(config.feed.channel_capacity.max(1));
    let feed_task = tokio::spawn(live_feed::forward(
        subscriber,
        feed.prefix().to_owned(),
        tx,
    ));

    // 6. Reconciliation.
    let snapshot_source = match &config.server.snapshot_url {
        Some(url) => SnapshotSource::Http(
            HttpSnapshotSource::new(url.clone(), timeout).map_err(NodeError::from)?,
        ),
        None => {
            info!("No snapshot URL configured, starting from an empty picture");
            SnapshotSource::Static(MapStateSnapshot::default())
        }
    };
    let mut sync = Synchronizer::new(SyncConfig {
        fov_range_m: config.picture.fov_range_m,
    });
    let mut callback = ObserverCallback::new(Arc::clone(&app_state));

    info!("Entering reconciliation loop");
    tokio::select! {
        report = run_reconciliation(&mut sync, &snapshot_source, rx, &mut callback) => {
            info!(
                received = report.events_received,
                applied = report.events_applied,
                dropped = report.events_dropped,
                snapshot = ?report.snapshot_phase,
                "Live feed closed"
            );
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown requested");
        }
    }

    feed_task.abort();
    if let Some(handle) = observer {
        handle.shutdown().await;
    }
    info!(
        entities = sync.registry().len(),
        "overwatch-node shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber, preferring `RUST_LOG` over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
