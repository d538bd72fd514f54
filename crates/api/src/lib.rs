//! Wire types and endpoint configuration for the kubo HTTP API.
//!
//! The node's RPC surface lives under `/api/v0/` and only accepts POST.
//! This crate holds the response shapes the rest of the workspace parses
//! plus the fixed endpoint defaults; it performs no I/O itself.

mod config;
mod types;

pub use config::{
    ApiConfig, DEFAULT_API_ADDR, DEFAULT_GATEWAY_HOST, DEFAULT_PROXY_PORT, DEFAULT_TIMEOUT,
    gateway_url, gateway_url_on,
};
pub use types::{AddResponse, ApiError, VersionResponse};
