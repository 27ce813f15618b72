//! Append-only Merkle log server
//!
//! Accepts certificate blobs over HTTP, appends each as a new leaf of a
//! global Merkle tree, and persists the blob together with the new tree
//! size and head through a transactional storage backend.

pub mod config;
pub mod outcome;
pub mod routes_chain;
pub mod server;
pub mod state;
pub mod telemetry;
