//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use currency_types::{AppError, CurrencyCode, ErrorResponse, RateReader};

use crate::RateService;

/// Application state shared across handlers.
pub struct AppState<R: RateReader> {
    pub service: RateService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Latest rate of every currency.
#[tracing::instrument(skip(state))]
pub async fn latest_rates<R: RateReader>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.latest_rates().await?;
    Ok(Json(response))
}

/// Full history of one currency.
#[tracing::instrument(skip(state), fields(currency = %currency))]
pub async fn historical_rates<R: RateReader>(
    State(state): State<Arc<AppState<R>>>,
    Path(currency): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = CurrencyCode::new(&currency).map_err(AppError::from)?;

    let response = state.service.historical_rates(currency).await?;
    Ok(Json(response))
}
