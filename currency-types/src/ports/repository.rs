//! Repository port traits.
//!
//! Adapters (Postgres, SQLite, in-memory test doubles) implement these.
//! The write side is used by the fetch orchestrator, the read side by the
//! HTTP layer.

use crate::domain::{CurrencyCode, ExchangeRate};
use crate::error::RepoError;

/// Sink for fetched rates.
///
/// Saving is an upsert keyed on `(currency, date)`: re-saving a pair overwrites
/// its rate and never creates a duplicate row. Implementations must be safe to
/// call from several tasks at once.
#[async_trait::async_trait]
pub trait RateWriter: Send + Sync + 'static {
    /// Upserts a batch of rates in one statement.
    async fn save_rates(&self, rates: &[ExchangeRate]) -> Result<(), RepoError>;

    /// Upserts a single rate.
    async fn save_rate(&self, rate: &ExchangeRate) -> Result<(), RepoError> {
        self.save_rates(std::slice::from_ref(rate)).await
    }
}

/// Read side of rate storage.
#[async_trait::async_trait]
pub trait RateReader: Send + Sync + 'static {
    /// The most recent rate of every currency, ordered by currency code.
    async fn latest_rates(&self) -> Result<Vec<ExchangeRate>, RepoError>;

    /// Every stored rate of `currency`, oldest first.
    async fn historical_rates(&self, currency: &CurrencyCode)
    -> Result<Vec<ExchangeRate>, RepoError>;
}
