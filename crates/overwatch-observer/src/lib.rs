//! Observer API server for the Overwatch tactical picture.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/picture`) streaming picture changes via
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for the current picture, single entities with their
//!   resolved symbology, and the picture in snapshot form
//! - **CoT endpoints** for previewing and transmitting encoded detections
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The observer reads from a published [`PictureView`] that the
//! reconciliation loop refreshes after every update, so REST reads never
//! touch the live registry.
//!
//! [`PictureView`]: state::PictureView

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve};
pub use startup::{ObserverHandle, spawn_observer};
pub use state::{AppState, BROADCAST_CAPACITY, PictureView};
