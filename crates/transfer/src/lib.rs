//! Upload progress reporting and the transfer error taxonomy.
//!
//! Progress is a single channel per upload: producers (the byte-counting
//! body stream and the synthetic ramp) push an ordered, monotonically
//! increasing sequence of percentages, terminated by exactly one
//! completed-or-failed event. Consumers subscribe to the receiver; nothing
//! polls.

mod progress;
mod stream;

pub use progress::{
    PROGRESS_CAP, ProgressSender, TransferEvent, progress_channel, spawn_ramp,
};
pub use stream::CountingStream;

use serde::{Deserialize, Serialize};

/// Receipt for a successfully completed upload.
///
/// `name` and `size` are the selected file's logical metadata, not the
/// node's on-wire accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Content identifier assigned by the node.
    pub cid: String,
    pub name: String,
    pub size: u64,
}

/// Errors produced while exchanging bytes with the node.
///
/// There are no partial results: an operation yields a complete value or
/// one of these. Retrying is the caller's decision.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer timed out")]
    Timeout,

    #[error("upload failed: {0}")]
    Failed(String),

    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}
