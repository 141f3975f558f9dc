//! # Currency Hex
//!
//! Application services and HTTP adapter for the currency rate service.
//!
//! ## Architecture
//!
//! - `fetch` - Concurrent fetch orchestration (feed -> storage)
//! - `service` - Read-side application service
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Both services are generic over the port traits of `currency-types`, so
//! any fetcher or repository implementation can be injected.

pub mod fetch;
pub mod inbound;
pub mod openapi;
pub mod service;


pub use fetch::{
    CurrencyFailure, FailureCause, FetchErrors, FetchOptions, FetchOutcome, FetchService, SaveMode,
};
pub use service::RateService;
