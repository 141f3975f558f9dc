//! Bank of Latvia exchange rate feed.
//!
//! The feed at `https://www.bank.lv/vk/ecb_rss.xml` publishes one RSS item per
//! business day. Each item's `description` is a flat rate line and its
//! `pubDate` an RFC 1123 timestamp with a numeric zone:
//!
//! ```text
//! <item>
//!   <pubDate>Wed, 03 Jan 2024 12:00:00 +0200</pubDate>
//!   <description>AUD 1.62200000 BRL 5.37430000 CAD 1.46230000 ...</description>
//! </item>
//! ```
//!
//! The pipeline is split into small stages so each can be tested on its own:
//!
//! ```text
//! transport -> decoder -> selector -> (date, parser) -> ExchangeRate
//! ```
//!
//! [`BankFeedFetcher`] wires the stages together and implements the
//! [`RateFetcher`](currency_types::RateFetcher) port.
//!
//! # Example
//! ```no_run
//! use currency_feed::BankFeedFetcher;
//! use currency_types::{CurrencyCode, RateFetcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = BankFeedFetcher::new(reqwest::Client::new(), currency_feed::DEFAULT_FEED_URL);
//! let usd = fetcher.latest_currency_rate(&CurrencyCode::new("USD")?).await?;
//! println!("{} {} on {}", usd.currency, usd.rate, usd.date);
//! # Ok(())
//! # }
//! ```

pub mod date;
pub mod decoder;
pub mod fetcher;
pub mod parser;
pub mod selector;
pub mod transport;

pub use decoder::FeedItem;
pub use fetcher::BankFeedFetcher;
pub use transport::FeedTransport;

/// Public ECB rate feed mirrored by the Bank of Latvia.
pub const DEFAULT_FEED_URL: &str = "https://www.bank.lv/vk/ecb_rss.xml";
