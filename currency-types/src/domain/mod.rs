//! Domain models for the currency rate service.

pub mod currency;
pub mod rate;

pub use currency::CurrencyCode;
pub use rate::{ExchangeRate, RateId};
