//! Running the Observer API alongside the reconciliation loop.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// A running Observer API.
#[derive(Debug)]
pub struct ObserverHandle {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ObserverHandle {
    /// Address actually bound.
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, let in-flight requests finish, and wait for the
    /// server task.
    pub async fn shutdown(self) {
        // Err means the task already ended and dropped its receiver.
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "Observer task did not finish cleanly");
        }
        info!(addr = %self.addr, "Observer API stopped");
    }
}

/// Bind the Observer API and serve it on a background task.
///
/// Bind failures are returned here; failures after that are logged by the
/// task.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ObserverHandle, ServerError> {
    let requested = config.socket_addr()?;
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind {
            addr: requested,
            source,
        })?;

    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = stopped.await;
        };
        if let Err(e) = server::serve(listener, state, shutdown).await {
            error!(error = %e, "Observer API exited with error");
        }
    });

    Ok(ObserverHandle { addr, stop, task })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ephemeral_port_is_reported_and_released_on_shutdown() {
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        };
        let handle = spawn_observer(&config, Arc::new(AppState::new())).await;
        assert!(handle.is_ok());
        let Ok(handle) = handle else { return };

        let addr = handle.local_addr();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);

        handle.shutdown().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
