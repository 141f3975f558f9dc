//! Exchange rate domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::CurrencyCode;

/// Storage-assigned identifier of a persisted rate.
///
/// Opaque to everything except the repository that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateId(i64);

impl RateId {
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    pub fn into_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published rate of one currency against EUR on one publication date.
///
/// The natural key is `(currency, date)`; several records share a date when they
/// come from the same feed item. `rate` keeps the exact decimal text of the feed,
/// scale included, so `1.70010000` is echoed back as `1.70010000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRate {
    /// Repository identifier, absent until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    pub id: Option<RateId>,
    /// Three-letter currency code
    #[schema(value_type = String, example = "USD")]
    pub currency: CurrencyCode,
    /// Units of `currency` per 1 EUR
    #[schema(value_type = String, example = "1.08450000")]
    pub rate: Decimal,
    /// Publication instant of the feed item, in UTC
    pub date: DateTime<Utc>,
}

impl ExchangeRate {
    /// Creates a rate that has not been persisted yet.
    pub fn new(currency: CurrencyCode, rate: Decimal, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            currency,
            rate,
            date,
        }
    }

    /// Reconstitutes a persisted rate (used by repository adapters).
    pub fn from_parts(id: RateId, currency: CurrencyCode, rate: Decimal, date: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            currency,
            rate,
            date,
        }
    }
}
