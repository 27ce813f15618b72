//! Transactional storage for the append-only log
//!
//! The append pipeline consumes storage through [`LogStore`] and
//! [`LogTransaction`]; which table layout holds the frontier is an
//! implementation detail of each backend. Two Postgres layouts are
//! provided (frontier blob inside the certificate row, or a separate
//! row-per-entry table), plus an in-memory store for testing and demos.

mod mem;
mod pg_blob;
mod pg_rows;

pub use mem::{MemRow, MemStore};
pub use pg_blob::PgBlobStore;
pub use pg_rows::PgRowStore;

use async_trait::async_trait;
use frontier::{Frontier, FrontierError, Hash32};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Frontier(#[from] FrontierError),

    #[error("frontier rows are not a contiguous prefix: gap at index {0}")]
    NonContiguous(i64),

    #[error("frontier subhead is {0} bytes, expected 32")]
    BadSubhead(usize),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to a backend. Shared across request handlers; connections are
/// pooled internally by the implementation.
#[async_trait]
pub trait LogStore: Send + Sync + 'static {
    async fn begin(&self) -> Result<Box<dyn LogTransaction>>;
}

/// One append transaction. Reads and writes are only visible to other
/// transactions after [`commit`](Self::commit); any failure path must end
/// in [`rollback`](Self::rollback), after which nothing persists.
#[async_trait]
pub trait LogTransaction: Send {
    /// Current persisted frontier, empty if nothing has been logged yet.
    /// Entries are delivered in canonical descending-size order.
    async fn read_frontier(&mut self) -> Result<Frontier>;

    /// Insert one certificate row. `frontier` is the post-append frontier;
    /// backends that keep the frontier inside the certificate row persist
    /// its marshaled form here, others persist `tree_head` instead.
    async fn insert_certificate(
        &mut self,
        timestamp: i64,
        tree_size: i64,
        tree_head: &Hash32,
        frontier: &Frontier,
        cert: &[u8],
    ) -> Result<()>;

    /// Replace the persisted frontier with `frontier`. A no-op for
    /// backends whose certificate rows already carry it.
    async fn write_frontier(&mut self, frontier: &Frontier) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
