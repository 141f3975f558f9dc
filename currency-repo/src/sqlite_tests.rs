//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use currency_types::{CurrencyCode, ExchangeRate, RateReader, RateWriter};

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn rate(currency: &str, value: &str, day: u32) -> ExchangeRate {
        ExchangeRate::new(code(currency), Decimal::from_str(value).unwrap(), jan(day))
    }

    #[tokio::test]
    async fn test_save_and_read_history() {
        let repo = setup_repo().await;

        repo.save_rates(&[rate("USD", "1.3", 3), rate("USD", "1.1", 1), rate("GBP", "0.86", 1)])
            .await
            .unwrap();

        let history = repo.historical_rates(&code("USD")).await.unwrap();

        let dates: Vec<_> = history.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![jan(1), jan(3)]);
        assert!(history.iter().all(|r| r.id.is_some()));
    }

    #[tokio::test]
    async fn test_rate_scale_survives_storage() {
        let repo = setup_repo().await;

        repo.save_rate(&rate("AUD", "1.70010000", 3)).await.unwrap();

        let history = repo.historical_rates(&code("AUD")).await.unwrap();
        assert_eq!(history[0].rate.to_string(), "1.70010000");
    }

    #[tokio::test]
    async fn test_resave_overwrites_rate() {
        let repo = setup_repo().await;

        repo.save_rate(&rate("USD", "1.1", 1)).await.unwrap();
        repo.save_rate(&rate("USD", "1.2", 1)).await.unwrap();

        let history = repo.historical_rates(&code("USD")).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].rate, Decimal::from_str("1.2").unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_key_within_one_batch_keeps_last() {
        let repo = setup_repo().await;

        repo.save_rates(&[rate("USD", "1.1", 1), rate("USD", "1.15", 1)])
            .await
            .unwrap();

        let history = repo.historical_rates(&code("USD")).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].rate.to_string(), "1.15");
    }

    #[tokio::test]
    async fn test_latest_rates_one_per_currency_ordered_by_code() {
        let repo = setup_repo().await;

        repo.save_rates(&[
            rate("USD", "1.1", 1),
            rate("USD", "1.3", 3),
            rate("JPY", "157.1", 2),
            rate("GBP", "0.86", 1),
            rate("GBP", "0.87", 2),
        ])
        .await
        .unwrap();

        let latest = repo.latest_rates().await.unwrap();

        let summary: Vec<_> = latest
            .iter()
            .map(|r| (r.currency.as_str().to_string(), r.rate.to_string(), r.date))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("GBP".to_string(), "0.87".to_string(), jan(2)),
                ("JPY".to_string(), "157.1".to_string(), jan(2)),
                ("USD".to_string(), "1.3".to_string(), jan(3)),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_repository_reads_empty() {
        let repo = setup_repo().await;

        assert!(repo.latest_rates().await.unwrap().is_empty());
        assert!(repo.historical_rates(&code("USD")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_nothing_is_ok() {
        let repo = setup_repo().await;
        repo.save_rates(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_large_batch_spans_several_statements() {
        let repo = setup_repo().await;

        let rates: Vec<_> = (0..450)
            .map(|i| {
                ExchangeRate::new(
                    code("USD"),
                    Decimal::new(i, 2),
                    jan(1) + chrono::Duration::days(i),
                )
            })
            .collect();
        repo.save_rates(&rates).await.unwrap();

        let history = repo.historical_rates(&code("USD")).await.unwrap();
        assert_eq!(history.len(), 450);
        assert_eq!(history[449].rate, Decimal::new(449, 2));
    }

    #[tokio::test]
    async fn test_unparsed_date_sentinel_round_trips() {
        let repo = setup_repo().await;
        let sentinel = DateTime::<Utc>::MIN_UTC;

        repo.save_rate(&ExchangeRate::new(code("USD"), Decimal::ONE, sentinel))
            .await
            .unwrap();
        repo.save_rate(&rate("USD", "1.1", 1)).await.unwrap();

        let history = repo.historical_rates(&code("USD")).await.unwrap();
        assert_eq!(history[0].date, sentinel);
        assert_eq!(history[1].date, jan(1));
    }
}
