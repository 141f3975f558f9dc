//! Concurrent fetch orchestration.
//!
//! Fans out one task per requested currency, waits for every task, then
//! persists what succeeded. A failing currency never cancels its siblings;
//! failures are collected and reported together.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, Span};

use currency_types::{CurrencyCode, ExchangeRate, FeedError, RateFetcher, RateWriter, RepoError};

/// How fetched rates are handed to the [`RateWriter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMode {
    /// One `save_rate` call per record.
    PerRecord,
    /// A single `save_rates` call with every record.
    #[default]
    Batched,
}

impl FromStr for SaveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-record" => Ok(Self::PerRecord),
            "batched" => Ok(Self::Batched),
            other => Err(format!(
                "unknown save mode '{other}', expected 'batched' or 'per-record'"
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Maximum number of currencies fetched at once. `None` fetches all at once.
    pub concurrency: Option<usize>,
    pub save_mode: SaveMode,
}

/// Why a currency did not make it into storage.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FailureCause {
    #[error(transparent)]
    Fetch(#[from] FeedError),

    #[error("save rate: {0}")]
    Save(#[from] RepoError),

    /// The fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{currency}: {cause}")]
pub struct CurrencyFailure {
    pub currency: CurrencyCode,
    pub cause: FailureCause,
}

/// Every failure of one [`FetchService::fetch_many`] call.
///
/// Displays as one line per failure.
#[derive(Debug, Clone)]
pub struct FetchErrors(Vec<CurrencyFailure>);

impl FetchErrors {
    pub fn failures(&self) -> &[CurrencyFailure] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Currencies that have at least one failure, in report order.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut seen = Vec::new();
        for failure in &self.0 {
            if !seen.contains(&failure.currency) {
                seen.push(failure.currency);
            }
        }
        seen
    }
}

impl fmt::Display for FetchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchErrors {}

impl IntoIterator for FetchErrors {
    type Item = CurrencyFailure;
    type IntoIter = std::vec::IntoIter<CurrencyFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Result of [`FetchService::fetch_many`].
///
/// `rates` holds every successfully fetched record in completion order,
/// including records whose save failed afterwards.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub rates: Vec<ExchangeRate>,
    pub error: Option<FetchErrors>,
}

/// Drives a [`RateFetcher`] for many currencies and stores the results.
pub struct FetchService<F: RateFetcher, W: RateWriter> {
    fetcher: Arc<F>,
    writer: W,
    options: FetchOptions,
    span: Span,
}

impl<F: RateFetcher, W: RateWriter> FetchService<F, W> {
    pub fn new(fetcher: F, writer: W) -> Self {
        Self::with_options(fetcher, writer, FetchOptions::default())
    }

    pub fn with_options(fetcher: F, writer: W, options: FetchOptions) -> Self {
        let span = tracing::info_span!(
            "fetch_service",
            save_mode = ?options.save_mode,
            concurrency = ?options.concurrency
        );
        Self {
            fetcher: Arc::new(fetcher),
            writer,
            options,
            span,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Fetches the latest rate of every currency in `currencies`, then saves
    /// the successes.
    ///
    /// Each currency is fetched in its own task and must finish before
    /// `deadline`; a task that does not is reported as
    /// [`FeedError::DeadlineExceeded`]. Dropping the returned future aborts
    /// every task still running.
    pub async fn fetch_many(&self, currencies: &[CurrencyCode], deadline: Instant) -> FetchOutcome {
        if currencies.is_empty() {
            return FetchOutcome::default();
        }

        async {
            let (rates, mut failures) = self.fetch_all(currencies, deadline).await;
            tracing::info!(
                requested = currencies.len(),
                fetched = rates.len(),
                failed = failures.len(),
                "fetch finished"
            );

            if !rates.is_empty() {
                failures.extend(self.save(&rates).await);
            }

            FetchOutcome {
                rates,
                error: (!failures.is_empty()).then(|| FetchErrors(failures)),
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn fetch_all(
        &self,
        currencies: &[CurrencyCode],
        deadline: Instant,
    ) -> (Vec<ExchangeRate>, Vec<CurrencyFailure>) {
        let limiter = self
            .options
            .concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(currencies.len());

        for &currency in currencies {
            let fetcher = Arc::clone(&self.fetcher);
            let limiter = limiter.clone();
            let span = tracing::debug_span!("fetch_currency", %currency);

            let unit = async move {
                let fetch = async {
                    // The semaphore is never closed, so acquire only fails if it is.
                    let _permit = match &limiter {
                        Some(semaphore) => semaphore.acquire().await.ok(),
                        None => None,
                    };
                    fetcher.latest_currency_rate(&currency).await
                };

                timeout_at(deadline, fetch)
                    .await
                    .unwrap_or(Err(FeedError::DeadlineExceeded))
            };

            let handle = tasks.spawn(unit.instrument(span));
            pending.insert(handle.id(), currency);
        }

        let mut rates = Vec::with_capacity(currencies.len());
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result.map_err(FailureCause::Fetch)),
                Err(e) => (e.id(), Err(FailureCause::Aborted(e.to_string()))),
            };
            let Some(currency) = pending.remove(&id) else {
                tracing::error!(task = %id, "finished task has no currency");
                continue;
            };

            match result {
                Ok(rate) => {
                    tracing::debug!(%currency, rate = %rate.rate, date = %rate.date, "fetched rate");
                    rates.push(rate);
                }
                Err(cause) => {
                    tracing::warn!(%currency, error = %cause, "failed to fetch rate");
                    failures.push(CurrencyFailure { currency, cause });
                }
            }
        }

        (rates, failures)
    }

    async fn save(&self, rates: &[ExchangeRate]) -> Vec<CurrencyFailure> {
        let mut failures = Vec::new();

        match self.options.save_mode {
            SaveMode::PerRecord => {
                for rate in rates {
                    if let Err(e) = self.writer.save_rate(rate).await {
                        tracing::error!(currency = %rate.currency, error = %e, "failed to save rate");
                        failures.push(CurrencyFailure {
                            currency: rate.currency,
                            cause: FailureCause::Save(e),
                        });
                    }
                }
            }
            SaveMode::Batched => {
                if let Err(e) = self.writer.save_rates(rates).await {
                    tracing::error!(records = rates.len(), error = %e, "failed to save rates");
                    failures.extend(rates.iter().map(|rate| CurrencyFailure {
                        currency: rate.currency,
                        cause: FailureCause::Save(e.clone()),
                    }));
                }
            }
        }

        failures
    }

    /// Stores every rate the feed currently exposes with one batched save.
    ///
    /// Returns the number of records saved.
    pub async fn store_feed(&self, deadline: Instant) -> Result<usize, FailureCause> {
        async {
            let groups = timeout_at(deadline, self.fetcher.all_rates())
                .await
                .unwrap_or(Err(FeedError::DeadlineExceeded))?;

            let rates: Vec<ExchangeRate> = groups.into_iter().flatten().collect();
            tracing::info!(records = rates.len(), "fetched full feed");

            if rates.is_empty() {
                return Ok(0);
            }

            self.writer.save_rates(&rates).await?;
            Ok(rates.len())
        }
        .instrument(self.span.clone())
        .await
    }
}
