//! Postgres backend, blob-frontier layout
//!
//! Single `certificates` table; the marshaled frontier rides in each row
//! and the current frontier is the one in the row with the largest tree
//! size.

use async_trait::async_trait;
use frontier::{Frontier, Hash32};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

use crate::{LogStore, LogTransaction, Result};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

const FRONTIER_SELECT: &str =
    "SELECT frontier FROM certificates ORDER BY tree_size DESC LIMIT 1";
const CERT_INSERT: &str =
    "INSERT INTO certificates (timestamp, tree_size, frontier, cert) VALUES ($1, $2, $3, $4)";

#[derive(Clone)]
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    pub async fn connect(conn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(conn)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/blob").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for PgBlobStore {
    async fn begin(&self) -> Result<Box<dyn LogTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgBlobTransaction { tx }))
    }
}

struct PgBlobTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LogTransaction for PgBlobTransaction {
    async fn read_frontier(&mut self) -> Result<Frontier> {
        let buf: Option<Vec<u8>> = sqlx::query_scalar(FRONTIER_SELECT)
            .fetch_optional(&mut *self.tx)
            .await?;

        match buf {
            None => Ok(Frontier::new()),
            Some(buf) => Ok(Frontier::unmarshal(&buf)?),
        }
    }

    async fn insert_certificate(
        &mut self,
        timestamp: i64,
        tree_size: i64,
        _tree_head: &Hash32,
        frontier: &Frontier,
        cert: &[u8],
    ) -> Result<()> {
        sqlx::query(CERT_INSERT)
            .bind(timestamp)
            .bind(tree_size)
            .bind(frontier.marshal())
            .bind(cert)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn write_frontier(&mut self, _frontier: &Frontier) -> Result<()> {
        // The frontier travels inside the certificate row in this layout.
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
