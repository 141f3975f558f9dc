//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{Instrument, Span};

use currency_types::{CurrencyCode, ExchangeRate, RateReader, RateWriter, RepoError};

use crate::types::{SqliteRateRow, dedup_by_key};

// 4 binds per row, well under SQLITE_MAX_VARIABLE_NUMBER on every build.
const ROWS_PER_INSERT: usize = 200;

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
    span: Span,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        Self::connect(database_url, crate::DEFAULT_MAX_CONNECTIONS).await
    }

    /// Like [`new`](Self::new) with an explicit pool size.
    ///
    /// An in-memory database lives only as long as its connection, so for
    /// `:memory:` URLs the pool is pinned to one connection that never expires.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure on-disk SQLite target directory exists.
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self::from_pool(pool);
        repo.create_schema().await?;
        tracing::info!(parent: &repo.span, in_memory, "sqlite repository ready");

        Ok(repo)
    }

    /// Wraps an existing pool without touching the schema.
    pub fn from_pool(pool: SqlitePool) -> Self {
        let span = tracing::info_span!("repository", subsystem = "sqlite");
        Self { pool, span }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }

    async fn upsert(&self, rates: &[ExchangeRate]) -> Result<(), RepoError> {
        let rates = dedup_by_key(rates);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        for chunk in rates.chunks(ROWS_PER_INSERT) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO exchange_rates (currency, rate, date) ");
            query.push_values(chunk, |mut row, rate| {
                row.push_bind(rate.currency.as_str())
                    .push_bind(rate.rate.to_string())
                    .push_bind(rate.date.timestamp());
            });
            query.push(" ON CONFLICT (currency, date) DO UPDATE SET rate = excluded.rate");

            query
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        tracing::debug!(records = rates.len(), "upserted rates");
        Ok(())
    }
}

#[async_trait]
impl RateWriter for SqliteRepo {
    async fn save_rates(&self, rates: &[ExchangeRate]) -> Result<(), RepoError> {
        if rates.is_empty() {
            return Ok(());
        }
        self.upsert(rates).instrument(self.span.clone()).await
    }
}

#[async_trait]
impl RateReader for SqliteRepo {
    async fn latest_rates(&self) -> Result<Vec<ExchangeRate>, RepoError> {
        let rows: Vec<SqliteRateRow> = sqlx::query_as(
            r#"SELECT r.id, r.currency, r.rate, r.date
               FROM exchange_rates r
               JOIN (SELECT currency, MAX(date) AS max_date
                     FROM exchange_rates
                     GROUP BY currency) latest
                 ON r.currency = latest.currency AND r.date = latest.max_date
               ORDER BY r.currency"#,
        )
        .fetch_all(&self.pool)
        .instrument(self.span.clone())
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(ExchangeRate::try_from).collect()
    }

    async fn historical_rates(
        &self,
        currency: &CurrencyCode,
    ) -> Result<Vec<ExchangeRate>, RepoError> {
        let rows: Vec<SqliteRateRow> = sqlx::query_as(
            r#"SELECT id, currency, rate, date FROM exchange_rates WHERE currency = ? ORDER BY date ASC"#,
        )
        .bind(currency.as_str())
        .fetch_all(&self.pool)
        .instrument(self.span.clone())
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(ExchangeRate::try_from).collect()
    }
}
