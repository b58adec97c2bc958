//! CoT transmission gateway.
//!
//! Sends encoded CoT events to the server's CoT endpoint, one at a time or
//! as a sequential batch.

pub mod error;
pub mod gateway;

pub use error::DispatchError;
pub use gateway::{COT_CONTENT_TYPE, CotGateway, DEFAULT_TIMEOUT, GatewayConfig};
