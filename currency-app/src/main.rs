//! # Currency Service
//!
//! Binary that wires together all the components:
//! - Load configuration from environment (and `.env`)
//! - Initialize the repository adapter
//! - `fetch`: pull rates from the feed and store them
//! - `serve`: start the HTTP server over stored rates

mod config;

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_feed::BankFeedFetcher;
use currency_hex::{FetchOptions, FetchService, RateService, SaveMode, inbound::HttpServer};
use currency_repo::build_repo;
use currency_types::CurrencyCode;

use config::Config;

const DEFAULT_LOG_FILTER: &str = "info,currency_app=debug,currency_hex=debug,currency_feed=debug";

#[derive(Parser)]
#[command(name = "currency-service")]
#[command(author, version, about = "Bank of Latvia exchange rate fetcher and API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the latest rates from the feed and store them
    Fetch(FetchArgs),
    /// Serve stored rates over HTTP
    Serve {
        /// Port to listen on (overrides CURRENCY_SERVICE_SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct FetchArgs {
    /// Comma-separated currency codes
    #[arg(long, value_delimiter = ',', default_value = "USD,GBP,JPY")]
    currencies: Vec<CurrencyCode>,

    /// Deadline for the whole fetch, in seconds
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,

    /// Maximum number of currencies fetched at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// How rates are written: batched or per-record
    #[arg(long, default_value = "batched")]
    save_mode: SaveMode,

    /// Store every rate the feed exposes instead of the latest ones
    #[arg(long, conflicts_with = "currencies")]
    all: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so `fetch` output stays clean on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Fetch(args) => fetch(config, args).await,
        Commands::Serve { port } => serve(config, port).await,
    }
}

async fn fetch(config: Config, args: FetchArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("failed to build HTTP client")?;
    let fetcher = BankFeedFetcher::new(client, config.feed_url.as_str());

    let repo = build_repo(&config.database_url, config.db_max_connections).await?;

    let options = FetchOptions {
        concurrency: args.concurrency,
        save_mode: args.save_mode,
    };
    let service = FetchService::with_options(fetcher, repo, options);
    let deadline = Instant::now() + Duration::from_secs(args.timeout_secs);

    if args.all {
        let saved = service
            .store_feed(deadline)
            .await
            .context("failed to store feed")?;
        println!("Stored {saved} rates");
        return Ok(());
    }

    tracing::info!(currencies = ?args.currencies, "fetching latest rates");
    let outcome = service.fetch_many(&args.currencies, deadline).await;

    let mut rates = outcome.rates;
    rates.sort_by_key(|rate| rate.currency);
    for rate in &rates {
        println!("Currency: {}, Rate: {}", rate.currency, rate.rate);
    }

    match outcome.error {
        Some(errors) => Err(anyhow::Error::new(errors).context("failed to fetch rates")),
        None => Ok(()),
    }
}

async fn serve(config: Config, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.port);
    tracing::info!("Starting currency server on port {}", port);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url, config.db_max_connections).await?;

    let server = HttpServer::new(RateService::new(repo));
    let addr = format!("0.0.0.0:{}", port);

    server.run(&addr).await
}
