//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use utoipa::OpenApi;

use currency_types::{ErrorResponse, ExchangeRate, HistoricalRatesResponse, LatestRatesResponse};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Latest rate of every stored currency
#[utoipa::path(
    get,
    path = "/api/v1/rates/latest",
    tag = "rates",
    responses(
        (status = 200, description = "Latest rates", body = LatestRatesResponse),
        (status = 404, description = "No rates stored yet", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn latest_rates() {}

/// Every stored rate of one currency, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/rates/history/{currency}",
    tag = "rates",
    params(
        ("currency" = String, Path, description = "Three-letter currency code", example = "USD")
    ),
    responses(
        (status = 200, description = "Rate history", body = HistoricalRatesResponse),
        (status = 400, description = "Malformed currency code", body = ErrorResponse),
        (status = 404, description = "No rates stored for the currency", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn historical_rates() {}

/// OpenAPI documentation for the rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Rate Service API",
        version = "1.0.0",
        description = "EUR reference rates published by the Bank of Latvia, fetched from its RSS feed and served from storage.\n\nRates are decimal strings with the feed's scale preserved, e.g. `\"1.08450000\"`.",
        license(name = "MIT"),
    ),
    paths(health, latest_rates, historical_rates),
    components(
        schemas(
            ExchangeRate,
            LatestRatesResponse,
            HistoricalRatesResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Stored exchange rates"),
    )
)]
pub struct ApiDoc;
