//! Data Transfer Objects (DTOs) for API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, ExchangeRate};

/// Response for `GET /api/v1/rates/latest`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LatestRatesResponse {
    /// The most recent rate of every stored currency
    pub rates: Vec<ExchangeRate>,
    /// Most recent publication date among `rates`
    pub updated_at: DateTime<Utc>,
}

/// Response for `GET /api/v1/rates/history/{currency}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoricalRatesResponse {
    #[schema(value_type = String, example = "USD")]
    pub currency: CurrencyCode,
    /// Every stored rate of `currency`, oldest first
    pub history: Vec<ExchangeRate>,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Client-safe description of the failure
    #[schema(example = "no rates found")]
    pub error: String,
    /// HTTP status code
    #[schema(example = 404)]
    pub code: u16,
}
