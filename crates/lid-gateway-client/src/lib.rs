//! HTTP client for live LID lookups through the bridge gateway.

mod client;
mod error;
mod types;

pub use client::LidGatewayClient;
pub use error::GatewayError;
pub use types::*;
