//! Rate line parsing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use currency_types::{CurrencyCode, ExchangeRate, FeedError};

/// Parses a rate line such as `"AUD 1.70010000 BRL 6.22330000"`.
///
/// Tokens are read as `(code, value)` pairs from left to right. A pair whose
/// code is not three letters, or whose value is not an exact decimal, is
/// logged and skipped; the rest of the line is still used. A dangling final
/// token is dropped. Every record gets `date`.
///
/// # Errors
///
/// [`FeedError::NoRatesFound`] when no pair survives.
pub fn parse_rates(description: &str, date: DateTime<Utc>) -> Result<Vec<ExchangeRate>, FeedError> {
    let fields: Vec<&str> = description.split_whitespace().collect();
    let mut rates = Vec::with_capacity(fields.len() / 2);

    for pair in fields.chunks_exact(2) {
        let (code, rate_str) = (pair[0], pair[1]);

        let currency = match CurrencyCode::new(code) {
            Ok(currency) => currency,
            Err(e) => {
                tracing::warn!(currency = code, rate_str, error = %e, "skipping malformed currency code");
                continue;
            }
        };

        let rate = match parse_rate(rate_str) {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!(currency = code, rate_str, error = %e, "failed to parse rate");
                continue;
            }
        };

        rates.push(ExchangeRate::new(currency, rate, date));
    }

    if rates.is_empty() {
        return Err(FeedError::NoRatesFound);
    }

    Ok(rates)
}

// rust_decimal reads `_` as a digit separator; a feed value must be echoed
// exactly, so such tokens are rejected.
fn parse_rate(text: &str) -> Result<Decimal, rust_decimal::Error> {
    if text.contains('_') {
        return Err(rust_decimal::Error::ErrorString(
            "digit separators are not allowed".to_string(),
        ));
    }
    Decimal::from_str_exact(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap()
    }

    fn codes(rates: &[ExchangeRate]) -> Vec<&str> {
        rates.iter().map(|r| r.currency.as_str()).collect()
    }

    #[test]
    fn test_parse_rates_keeps_order_and_precision() {
        let rates = parse_rates("AUD 1.70010000 BRL 6.22330000 JPY 157.12000000", date()).unwrap();

        assert_eq!(codes(&rates), vec!["AUD", "BRL", "JPY"]);
        assert_eq!(rates[0].rate.to_string(), "1.70010000");
        assert_eq!(rates[2].rate.to_string(), "157.12000000");
        assert!(rates.iter().all(|r| r.date == date() && r.id.is_none()));
    }

    #[test]
    fn test_parse_rates_handles_irregular_whitespace() {
        let rates = parse_rates("\n  USD\t1.1\n\nGBP   0.86  ", date()).unwrap();
        assert_eq!(codes(&rates), vec!["USD", "GBP"]);
    }

    #[test]
    fn test_parse_rates_skips_malformed_value() {
        let rates = parse_rates("USD 1.1 GBP abc JPY 157.1", date()).unwrap();

        assert_eq!(codes(&rates), vec!["USD", "JPY"]);
        assert_eq!(rates[1].rate, Decimal::from_str("157.1").unwrap());
    }

    #[test]
    fn test_parse_rates_rejects_digit_separators() {
        let rates = parse_rates("USD 1_000 GBP 0.86 JPY 1e3", date()).unwrap();

        assert_eq!(codes(&rates), vec!["GBP"]);
        assert_eq!(rates[0].rate.to_string(), "0.86");
    }

    #[test]
    fn test_parse_rates_skips_malformed_code() {
        let rates = parse_rates("USD 1.1 U$D 2.2 GBP 0.86", date()).unwrap();
        assert_eq!(codes(&rates), vec!["USD", "GBP"]);
    }

    #[test]
    fn test_parse_rates_drops_dangling_token() {
        let rates = parse_rates("USD 1.1 GBP", date()).unwrap();
        assert_eq!(codes(&rates), vec!["USD"]);
    }

    #[test]
    fn test_parse_rates_all_malformed_is_no_rates() {
        assert!(matches!(
            parse_rates("USD one GBP two", date()),
            Err(FeedError::NoRatesFound)
        ));
    }

    #[test]
    fn test_parse_rates_empty_line_is_no_rates() {
        assert!(matches!(parse_rates("   ", date()), Err(FeedError::NoRatesFound)));
        assert!(matches!(parse_rates("USD", date()), Err(FeedError::NoRatesFound)));
    }

    #[test]
    fn test_parse_rates_rejects_values_that_would_round() {
        // 30 significant digits do not fit in a Decimal without rounding.
        let line = "USD 1.23456789012345678901234567890 GBP 0.86";
        let rates = parse_rates(line, date()).unwrap();
        assert_eq!(codes(&rates), vec!["GBP"]);
    }

    proptest! {
        #[test]
        fn prop_well_formed_lines_round_trip(
            pairs in prop::collection::vec(("[A-Z]{3}", 0u64..10_000_000_000u64, 0u32..=8u32), 1..40)
        ) {
            let line = pairs
                .iter()
                .map(|(code, mantissa, scale)| format!("{} {}", code, Decimal::new(*mantissa as i64, *scale)))
                .collect::<Vec<_>>()
                .join(" ");

            let rates = parse_rates(&line, date()).unwrap();

            prop_assert_eq!(rates.len(), pairs.len());
            for (rate, (code, mantissa, scale)) in rates.iter().zip(&pairs) {
                let expected = Decimal::new(*mantissa as i64, *scale);
                prop_assert_eq!(rate.currency.as_str(), code.as_str());
                prop_assert_eq!(rate.rate.to_string(), expected.to_string());
                prop_assert_eq!(rate.date, date());
            }
        }

        #[test]
        fn prop_one_bad_value_costs_exactly_one_record(
            good in prop::collection::vec(("[A-Z]{3}", 1u32..1_000_000u32), 1..20),
            bad_at in 0usize..20,
        ) {
            let mut tokens: Vec<String> = good
                .iter()
                .flat_map(|(code, value)| [code.clone(), format!("{value}.5")])
                .collect();
            let insert_at = (bad_at % (good.len() + 1)) * 2;
            tokens.insert(insert_at, "XXX".to_string());
            tokens.insert(insert_at + 1, "n/a".to_string());

            let rates = parse_rates(&tokens.join(" "), date()).unwrap();
            prop_assert_eq!(rates.len(), good.len());
        }
    }
}
