//! Async client for a local kubo node's HTTP RPC API.
//!
//! Thin by design: content addressing, chunking, and DAG construction all
//! happen on the node. This crate streams bytes in and out and reports
//! upload progress on the channel from `ipfsx-transfer`.

mod client;

pub use client::IpfsClient;
pub use ipfsx_api::ApiConfig;
pub use ipfsx_transfer::TransferError;
