//! Rate feed port.
//!
//! This trait defines the interface for exchange rate sources.
//! Implementations can be RSS feed clients, mock providers, etc.

use crate::domain::{CurrencyCode, ExchangeRate};

/// Failure to get the feed document off the network.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("fetch RSS feed: {0}")]
    Request(String),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Error type for rate feed operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("decode XML: {0}")]
    Decode(String),

    /// The feed had no items, or an item yielded no parseable rate pairs.
    #[error("no rates found")]
    NoRatesFound,

    #[error("rate not found for currency '{0}'")]
    RateNotFound(CurrencyCode),

    #[error("deadline exceeded before the rate was fetched")]
    DeadlineExceeded,
}

/// Port trait for exchange rate sources.
///
/// Every call performs a fresh fetch; implementations keep no cache.
#[async_trait::async_trait]
pub trait RateFetcher: Send + Sync + 'static {
    /// All rates of the most recently published item.
    async fn latest_rates(&self) -> Result<Vec<ExchangeRate>, FeedError>;

    /// The rate of one currency from the most recently published item.
    async fn latest_currency_rate(
        &self,
        currency: &CurrencyCode,
    ) -> Result<ExchangeRate, FeedError>;

    /// Every rate the feed currently exposes, grouped by item.
    async fn all_rates(&self) -> Result<Vec<Vec<ExchangeRate>>, FeedError>;

    /// One rate per item that mentions `currency`, in feed order.
    async fn currency_rates(&self, currency: &CurrencyCode)
    -> Result<Vec<ExchangeRate>, FeedError>;
}
