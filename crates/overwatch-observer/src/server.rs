//! Listener setup and the serve loop for the Observer API.
//!
//! Binding is split from serving so a caller learns about an unusable
//! address (or port 0's assigned port) before anything runs in the
//! background.

use std::future::Future;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Where the Observer API listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host or IP literal, e.g. `0.0.0.0`.
    pub host: String,
    /// TCP port; 0 asks the OS for a free one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Parse the configured host and port.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|source| ServerError::InvalidAddress { addr: raw, source })
    }
}

/// Failures of the Observer listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Host and port do not form a socket address.
    #[error("invalid observer address {addr}: {source}")]
    InvalidAddress {
        /// The rejected `host:port`.
        addr: String,
        /// Parse failure.
        source: AddrParseError,
    },

    /// The address is valid but could not be bound.
    #[error("cannot bind observer on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Socket error.
        source: io::Error,
    },

    /// The accept loop failed.
    #[error("observer stopped serving: {0}")]
    Serve(#[source] io::Error),
}

/// Bind the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the picture API on `listener` until `shutdown` resolves.
///
/// In-flight requests finish before this returns.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Observer API listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_all_interfaces() {
        let addr = ServerConfig::default().socket_addr();
        assert!(addr.is_ok_and(|a| a.port() == 8080 && a.ip().is_unspecified()));
    }

    #[test]
    fn bad_host_names_the_address() {
        let config = ServerConfig {
            host: "not a host".to_owned(),
            port: 1,
        };
        let err = config.socket_addr();
        assert!(matches!(
            &err,
            Err(ServerError::InvalidAddress { addr, .. }) if addr == "not a host:1"
        ));
    }

    #[tokio::test]
    async fn taken_port_is_a_bind_error() {
        let first = bind(&ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        })
        .await;
        let port = first
            .as_ref()
            .ok()
            .and_then(|l| l.local_addr().ok())
            .map_or(0, |a| a.port());
        assert_ne!(port, 0);

        let second = bind(&ServerConfig {
            host: "127.0.0.1".to_owned(),
            port,
        })
        .await;
        assert!(matches!(second, Err(ServerError::Bind { .. })));
    }
}
