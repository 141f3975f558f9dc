//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{Instrument, Span};

use currency_types::{CurrencyCode, ExchangeRate, RateReader, RateWriter, RepoError};

use crate::types::{PgRateRow, dedup_by_key};

// 3 binds per row; Postgres allows 65535 per statement.
const ROWS_PER_INSERT: usize = 1000;

/// PostgreSQL repository.
pub struct PostgresRepo {
    pool: PgPool,
    span: Span,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        Self::connect(database_url, crate::DEFAULT_MAX_CONNECTIONS).await
    }

    /// Like [`new`](Self::new) with an explicit pool size.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        run_migrations(&pool).await?;

        let repo = Self::from_pool(pool);
        tracing::info!(parent: &repo.span, max_connections, "postgres repository ready");
        Ok(repo)
    }

    /// Wraps an existing pool without running migrations.
    pub fn from_pool(pool: PgPool) -> Self {
        let span = tracing::info_span!("repository", subsystem = "postgres");
        Self { pool, span }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn upsert(&self, rates: &[ExchangeRate]) -> Result<(), RepoError> {
        let rates = dedup_by_key(rates);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        for chunk in rates.chunks(ROWS_PER_INSERT) {
            let mut query: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO exchange_rates (currency, rate, date) ");
            query.push_values(chunk, |mut row, rate| {
                row.push_bind(rate.currency.as_str())
                    .push_bind(rate.rate)
                    .push_bind(rate.date);
            });
            query.push(" ON CONFLICT (currency, date) DO UPDATE SET rate = EXCLUDED.rate");

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
impl RateWriter for PostgresRepo {
    async fn save_rates(&self, rates: &[ExchangeRate]) -> Result<(), RepoError> {
        if rates.is_empty() {
            return Ok(());
        }
        self.upsert(rates).instrument(self.span.clone()).await
    }
}

#[async_trait]
impl RateReader for PostgresRepo {
    async fn latest_rates(&self) -> Result<Vec<ExchangeRate>, RepoError> {
        let rows: Vec<PgRateRow> = sqlx::query_as(
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
        let rows: Vec<PgRateRow> = sqlx::query_as(
            r#"SELECT id, currency, rate, date FROM exchange_rates WHERE currency = $1 ORDER BY date ASC"#,
        )
        .bind(currency.as_str())
        .fetch_all(&self.pool)
        .instrument(self.span.clone())
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(ExchangeRate::try_from).collect()
    }
}
