//! Rate Application Service
//!
//! Serves stored rates through the repository port and turns repository
//! results into client-facing [`AppError`]s. Contains NO infrastructure logic.

use currency_types::{
    AppError, CurrencyCode, HistoricalRatesResponse, LatestRatesResponse, RateReader,
};

/// Read-side application service.
///
/// Generic over `R: RateReader` - the adapter is injected at compile time, so
/// tests can swap in an in-memory reader.
pub struct RateService<R: RateReader> {
    repo: R,
}

impl<R: RateReader> RateService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// The most recent rate of every stored currency.
    pub async fn latest_rates(&self) -> Result<LatestRatesResponse, AppError> {
        let rates = self.repo.latest_rates().await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch latest rates");
            AppError::Internal("failed to fetch latest rates".into())
        })?;

        let Some(updated_at) = rates.iter().map(|rate| rate.date).max() else {
            return Err(AppError::NotFound("no rates found".into()));
        };

        Ok(LatestRatesResponse { rates, updated_at })
    }

    /// Every stored rate of `currency`, oldest first.
    pub async fn historical_rates(
        &self,
        currency: CurrencyCode,
    ) -> Result<HistoricalRatesResponse, AppError> {
        let history = self.repo.historical_rates(&currency).await.map_err(|e| {
            tracing::error!(%currency, error = %e, "failed to fetch historical rates");
            AppError::Internal("failed to fetch historical rates".into())
        })?;

        if history.is_empty() {
            return Err(AppError::NotFound(format!(
                "no rates found for currency: {currency}"
            )));
        }

        Ok(HistoricalRatesResponse { currency, history })
    }
}
