//! Per-user query history persisted in PostgreSQL

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

/// One persisted query fact
///
/// Created once per distinct `(user_id, company_name)` pair, on first
/// resolution. Never mutated, never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    /// LINE user the query came from
    pub user_id: String,

    /// Company name as typed, lowercased
    pub company_name: String,

    /// Resolved ticker symbol, uppercased
    pub ticker: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Store of per-user query records
///
/// Write-once, read-many: no update or delete operations are exposed.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Exact-match lookup by `(user_id, company_name)`
    async fn find_record(&self, user_id: &str, company_name: &str)
    -> Result<Option<QueryRecord>>;

    /// Append-only write
    async fn insert_record(&self, record: &QueryRecord) -> Result<()>;

    /// Up to `limit` records for a user, most recent first
    async fn recent_records(&self, user_id: &str, limit: i64) -> Result<Vec<QueryRecord>>;
}

/// PostgreSQL-backed history store
pub struct PgHistoryStore {
    pool: Pool,
}

impl PgHistoryStore {
    /// Create a new store and connect to the database
    pub async fn connect(database_url: &str) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        // Test connection
        let _ = pool.get().await?;

        Ok(Self { pool })
    }

    /// Create the schema if it does not exist yet
    ///
    /// No unique constraint on `(user_id, company_name)`: the resolver
    /// checks before inserting, and two near-simultaneous identical
    /// first-time queries may both insert. That race is an accepted
    /// limitation of the design.
    pub async fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get().await?;

        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS query_history (
                id BIGSERIAL PRIMARY KEY,
                user_id TEXT NOT NULL,
                company_name TEXT NOT NULL,
                ticker TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_query_history_user_recent
                ON query_history (user_id, created_at DESC);",
        )
        .await?;

        tracing::info!("history schema ready");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn find_record(
        &self,
        user_id: &str,
        company_name: &str,
    ) -> Result<Option<QueryRecord>> {
        let conn = self.pool.get().await?;

        let row = conn
            .query_opt(
                "SELECT user_id, company_name, ticker, created_at
                 FROM query_history
                 WHERE user_id = $1 AND company_name = $2
                 LIMIT 1",
                &[&user_id, &company_name],
            )
            .await?;

        Ok(row.map(|row| QueryRecord {
            user_id: row.get(0),
            company_name: row.get(1),
            ticker: row.get(2),
            created_at: row.get(3),
        }))
    }

    async fn insert_record(&self, record: &QueryRecord) -> Result<()> {
        let conn = self.pool.get().await?;

        conn.execute(
            "INSERT INTO query_history (user_id, company_name, ticker, created_at)
             VALUES ($1, $2, $3, $4)",
            &[
                &record.user_id,
                &record.company_name,
                &record.ticker,
                &record.created_at,
            ],
        )
        .await?;

        Ok(())
    }

    async fn recent_records(&self, user_id: &str, limit: i64) -> Result<Vec<QueryRecord>> {
        let conn = self.pool.get().await?;

        let rows = conn
            .query(
                "SELECT user_id, company_name, ticker, created_at
                 FROM query_history
                 WHERE user_id = $1
                 ORDER BY created_at DESC
                 LIMIT $2",
                &[&user_id, &limit],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| QueryRecord {
                user_id: row.get(0),
                company_name: row.get(1),
                ticker: row.get(2),
                created_at: row.get(3),
            })
            .collect())
    }
}
