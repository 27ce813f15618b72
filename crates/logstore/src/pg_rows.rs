//! Postgres backend, row-per-entry frontier layout
//!
//! Certificate rows carry the tree head; the frontier lives in its own
//! table, one row per entry, keyed by ordinal index. Reading verifies the
//! indices form a contiguous prefix and rewrites happen inside the same
//! transaction as the certificate insert.

use async_trait::async_trait;
use frontier::{Frontier, FrontierEntry, Hash32};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

use crate::{LogStore, LogTransaction, Result, StoreError};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

const FRONTIER_SELECT: &str =
    r#"SELECT "index", subtree_size, subhead FROM frontier ORDER BY "index""#;
const FRONTIER_DELETE: &str = "DELETE FROM frontier";
const FRONTIER_INSERT: &str =
    r#"INSERT INTO frontier ("index", subtree_size, subhead) VALUES ($1, $2, $3)"#;
const CERT_INSERT: &str =
    "INSERT INTO certificates (timestamp, tree_size, tree_head, cert) VALUES ($1, $2, $3, $4)";

#[derive(Clone)]
pub struct PgRowStore {
    pool: PgPool,
}

impl PgRowStore {
    pub async fn connect(conn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(conn)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/rows").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for PgRowStore {
    async fn begin(&self) -> Result<Box<dyn LogTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRowTransaction { tx }))
    }
}

struct PgRowTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LogTransaction for PgRowTransaction {
    async fn read_frontier(&mut self) -> Result<Frontier> {
        let rows: Vec<(i64, i64, Vec<u8>)> = sqlx::query_as(FRONTIER_SELECT)
            .fetch_all(&mut *self.tx)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (i, (index, subtree_size, subhead)) in rows.into_iter().enumerate() {
            if index != i as i64 {
                return Err(StoreError::NonContiguous(index));
            }
            let value: Hash32 = subhead
                .try_into()
                .map_err(|bad: Vec<u8>| StoreError::BadSubhead(bad.len()))?;
            entries.push(FrontierEntry {
                subtree_size: subtree_size as u64,
                value,
            });
        }

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
        sqlx::query(CERT_INSERT)
            .bind(timestamp)
            .bind(tree_size)
            .bind(tree_head.as_slice())
            .bind(cert)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn write_frontier(&mut self, frontier: &Frontier) -> Result<()> {
        sqlx::query(FRONTIER_DELETE).execute(&mut *self.tx).await?;

        for (i, entry) in frontier.entries().iter().enumerate() {
            sqlx::query(FRONTIER_INSERT)
                .bind(i as i64)
                .bind(entry.subtree_size as i64)
                .bind(entry.value.as_slice())
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
