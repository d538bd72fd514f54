//! Development CORS proxy.
//!
//! Browsers refuse cross-origin calls to the node's RPC port, so local
//! front-end development runs through this one-route pass-through: every
//! request under `/api` is forwarded verbatim to the node and the
//! response comes back with permissive CORS headers. Strictly a dev
//! tool — no retries, no balancing, one static upstream.

mod server;

pub use server::{ProxyConfig, ProxyServer};

/// Errors produced by the proxy server.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
