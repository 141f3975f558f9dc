//! Database row structs and their conversion into domain values.
//!
//! SQLite has no decimal or timestamp type, so its row keeps the rate as text
//! and the date as unix seconds. Postgres stores both natively.

use sqlx::FromRow;

use currency_types::{CurrencyCode, ExchangeRate, RateId, RepoError};

fn currency(code: &str) -> Result<CurrencyCode, RepoError> {
    CurrencyCode::new(code.trim()).map_err(|e| RepoError::Corrupt(e.to_string()))
}

/// Exchange rate row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteRateRow {
    pub id: i64,
    pub currency: String,
    pub rate: String,
    pub date: i64,
}

#[cfg(feature = "sqlite")]
impl TryFrom<SqliteRateRow> for ExchangeRate {
    type Error = RepoError;

    fn try_from(row: SqliteRateRow) -> Result<Self, Self::Error> {
        let rate = rust_decimal::Decimal::from_str_exact(&row.rate)
            .map_err(|e| RepoError::Corrupt(format!("rate {:?}: {e}", row.rate)))?;
        let date = chrono::DateTime::from_timestamp(row.date, 0)
            .ok_or_else(|| RepoError::Corrupt(format!("date {} out of range", row.date)))?;

        Ok(ExchangeRate::from_parts(
            RateId::from_i64(row.id),
            currency(&row.currency)?,
            rate,
            date,
        ))
    }
}

/// Exchange rate row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgRateRow {
    pub id: i64,
    pub currency: String,
    pub rate: rust_decimal::Decimal,
    pub date: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRateRow> for ExchangeRate {
    type Error = RepoError;

    fn try_from(row: PgRateRow) -> Result<Self, Self::Error> {
        Ok(ExchangeRate::from_parts(
            RateId::from_i64(row.id),
            currency(&row.currency)?,
            row.rate,
            row.date,
        ))
    }
}

/// Collapses records sharing `(currency, date)` to the last one, keeping the
/// first-seen order otherwise.
///
/// Postgres refuses an upsert statement that touches the same row twice.
pub fn dedup_by_key(rates: &[ExchangeRate]) -> Vec<&ExchangeRate> {
    let mut unique: Vec<&ExchangeRate> = Vec::with_capacity(rates.len());
    for rate in rates {
        match unique
            .iter_mut()
            .find(|r| r.currency == rate.currency && r.date == rate.date)
        {
            Some(existing) => *existing = rate,
            None => unique.push(rate),
        }
    }
    unique
}
