//! In-memory backend (for testing and demos)
//!
//! Mirrors the row-per-entry layout: certificate rows carry the tree head
//! and the frontier is kept as an ordered entry list. Writes are staged on
//! the transaction and applied on commit; a dropped or rolled-back
//! transaction leaves no trace.

use async_trait::async_trait;
use frontier::{Frontier, FrontierEntry, Hash32};
use std::sync::{Arc, RwLock};

use crate::{LogStore, LogTransaction, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemRow {
    pub timestamp: i64,
    pub tree_size: i64,
    pub tree_head: Hash32,
    pub cert: Vec<u8>,
}

#[derive(Default)]
struct MemInner {
    rows: Vec<MemRow>,
    frontier: Vec<FrontierEntry>,
}

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<RwLock<MemInner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed certificate rows, in insertion order. Test helper.
    pub fn rows(&self) -> Vec<MemRow> {
        self.inner.read().unwrap().rows.clone()
    }

    /// Committed tree size. Test helper.
    pub fn tree_size(&self) -> u64 {
        self.inner
            .read()
            .unwrap()
            .frontier
            .iter()
            .map(|e| e.subtree_size)
            .sum()
    }

    /// Committed frontier. Test helper.
    pub fn frontier(&self) -> Result<Frontier> {
        let entries = self.inner.read().unwrap().frontier.clone();
        Ok(Frontier::from_entries(entries)?)
    }
}

#[async_trait]
impl LogStore for MemStore {
    async fn begin(&self) -> Result<Box<dyn LogTransaction>> {
        Ok(Box::new(MemTransaction {
            inner: self.inner.clone(),
            staged_row: None,
            staged_frontier: None,
        }))
    }
}

struct MemTransaction {
    inner: Arc<RwLock<MemInner>>,
    staged_row: Option<MemRow>,
    staged_frontier: Option<Vec<FrontierEntry>>,
}

#[async_trait]
impl LogTransaction for MemTransaction {
    async fn read_frontier(&mut self) -> Result<Frontier> {
        let entries = self.inner.read().unwrap().frontier.clone();
        Ok(Frontier::from_entries(entries)?)
    }

    async fn insert_certificate(
        &mut self,
        timestamp: i64,
        tree_size: i64,
        tree_head: &Hash32,
        _frontier: &Frontier,
        cert: &[u8],
    ) -> Result<()> {
        self.staged_row = Some(MemRow {
            timestamp,
            tree_size,
            tree_head: *tree_head,
            cert: cert.to_vec(),
        });
        Ok(())
    }

    async fn write_frontier(&mut self, frontier: &Frontier) -> Result<()> {
        self.staged_frontier = Some(frontier.entries().to_vec());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(row) = self.staged_row {
            inner.rows.push(row);
        }
        if let Some(entries) = self.staged_frontier {
            inner.frontier = entries;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
