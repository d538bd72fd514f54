//! Local CID v1 calculation.
//!
//! Computes the identity the node would assign to a file's bytes as a
//! single raw block: CID v1, raw codec, SHA2-256, canonical base32
//! rendering. Chunked DAG identities for large content remain the node's
//! business — this matches the node only for content it stores as one
//! raw block.

use std::io::Read;
use std::path::Path;

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use sha2::{Digest, Sha256};

/// Multicodec code for raw blocks.
const RAW_CODEC: u64 = 0x55;

/// Multihash code for SHA2-256.
const SHA2_256: u64 = 0x12;

/// Read buffer for streaming file digests.
const READ_BUF_SIZE: usize = 8192;

/// Errors from CID calculation.
#[derive(Debug, thiserror::Error)]
pub enum CidError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("digest error: {0}")]
    Digest(String),
}

/// CID v1 (raw, SHA2-256) of an in-memory byte slice.
pub fn cid_for_bytes(data: &[u8]) -> Cid {
    Cid::new_v1(RAW_CODEC, Code::Sha2_256.digest(data))
}

/// CID v1 (raw, SHA2-256) of a file, streamed with a fixed buffer.
pub fn cid_for_file(path: &Path) -> Result<Cid, CidError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    let mh = cid::multihash::Multihash::wrap(SHA2_256, digest.as_slice())
        .map_err(|e| CidError::Digest(e.to_string()))?;
    Ok(Cid::new_v1(RAW_CODEC, mh))
}
