//! [`RateFetcher`] implementation backed by the Bank of Latvia RSS feed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{Instrument, Span};

use currency_types::{CurrencyCode, ExchangeRate, FeedError, RateFetcher};

use crate::date::{UNPARSED_DATE, try_parse_date};
use crate::decoder::{self, FeedItem};
use crate::parser::parse_rates;
use crate::selector;
use crate::transport::FeedTransport;

/// Fetches and parses the rate feed on every call.
///
/// Logs go to the span the fetcher was built with, so every line carries the
/// fetcher name and feed URL.
#[derive(Debug, Clone)]
pub struct BankFeedFetcher {
    transport: FeedTransport,
    span: Span,
}

impl BankFeedFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self::from_transport(FeedTransport::new(client, url))
    }

    pub fn from_transport(transport: FeedTransport) -> Self {
        let span = tracing::info_span!(
            "fetcher",
            fetcher = "BankFeedFetcher",
            url = %transport.url()
        );
        Self { transport, span }
    }

    /// Replaces the logging span, e.g. to nest the fetcher under a command span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    async fn fetch_items(&self) -> Result<Vec<FeedItem>, FeedError> {
        let bytes = self.transport.fetch().await?;
        let items = decoder::decode(&bytes)?;
        tracing::debug!(bytes = bytes.len(), items = items.len(), "decoded feed");
        Ok(items)
    }

    fn published_at(&self, item: &FeedItem) -> DateTime<Utc> {
        match try_parse_date(&item.pub_date) {
            Ok(date) => date,
            Err(e) => {
                tracing::error!(date_str = %item.pub_date, error = %e, "failed to parse date");
                UNPARSED_DATE
            }
        }
    }

    async fn latest_item_rates(&self) -> Result<Vec<ExchangeRate>, FeedError> {
        let items = self.fetch_items().await?;
        if items.is_empty() {
            return Err(FeedError::NoRatesFound);
        }

        let item = selector::latest(items);
        let date = self.published_at(&item);
        tracing::debug!(%date, "selected latest item");

        parse_rates(&item.description, date)
    }
}

#[async_trait]
impl RateFetcher for BankFeedFetcher {
    async fn latest_rates(&self) -> Result<Vec<ExchangeRate>, FeedError> {
        self.latest_item_rates()
            .instrument(self.span.clone())
            .await
    }

    async fn latest_currency_rate(
        &self,
        currency: &CurrencyCode,
    ) -> Result<ExchangeRate, FeedError> {
        let span = tracing::debug_span!(parent: &self.span, "latest_currency_rate", %currency);

        async {
            self.latest_item_rates()
                .await?
                .into_iter()
                .find(|rate| rate.currency == *currency)
                .ok_or(FeedError::RateNotFound(*currency))
        }
        .instrument(span)
        .await
    }

    async fn all_rates(&self) -> Result<Vec<Vec<ExchangeRate>>, FeedError> {
        async {
            let items = self.fetch_items().await?;
            if items.is_empty() {
                return Err(FeedError::NoRatesFound);
            }

            let mut all_rates = Vec::with_capacity(items.len());
            for item in selector::all(items) {
                match parse_rates(&item.description, self.published_at(&item)) {
                    Ok(rates) => all_rates.push(rates),
                    Err(e) => {
                        tracing::warn!(date = %item.pub_date, error = %e, "failed to parse rates for item");
                    }
                }
            }

            Ok(all_rates)
        }
        .instrument(self.span.clone())
        .await
    }

    async fn currency_rates(
        &self,
        currency: &CurrencyCode,
    ) -> Result<Vec<ExchangeRate>, FeedError> {
        let span = tracing::debug_span!(parent: &self.span, "currency_rates", %currency);

        async {
            let items = self.fetch_items().await?;

            let currency_rates: Vec<ExchangeRate> = selector::all(items)
                .into_iter()
                .filter_map(|item| {
                    parse_rates(&item.description, self.published_at(&item))
                        .ok()?
                        .into_iter()
                        .find(|rate| rate.currency == *currency)
                })
                .collect();

            if currency_rates.is_empty() {
                return Err(FeedError::RateNotFound(*currency));
            }

            Ok(currency_rates)
        }
        .instrument(span)
        .await
    }
}
