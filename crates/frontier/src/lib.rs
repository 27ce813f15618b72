//! Merkle tree frontier for an append-only log
//!
//! A frontier is the minimal state needed to keep appending to a Merkle
//! tree: the roots of the complete subtrees covering the leaves appended so
//! far, one per set bit of the tree size. Appending is O(log n) and the
//! tree head is recomputed from the frontier alone.

mod crypto;
mod frontier;

pub use crypto::{leaf_hash, pair_hash};
pub use frontier::{Frontier, FrontierEntry, ENTRY_SIZE};

use thiserror::Error;

/// 32-byte hash
pub type Hash32 = [u8; 32];

#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("malformed frontier: {0} bytes is not a whole number of entries")]
    Malformed(usize),

    #[error("frontier entries are not in descending subtree-size order")]
    OutOfOrder,

    #[error("subtree size {0} is not a power of two")]
    NotPowerOfTwo(u64),
}

pub type Result<T> = std::result::Result<T, FrontierError>;
