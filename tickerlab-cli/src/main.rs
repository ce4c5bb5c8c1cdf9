//! TickerLab CLI: fetch or load a market snapshot and export it.
//!
//! Flow:
//! - load `--data-file` if it exists, otherwise fetch `--market-url` and cache
//!   the raw response there (`--refresh` always fetches)
//! - print the ranked snapshot
//! - `--plot-file` renders a bar chart of `--market-data`
//! - `--csv-file` writes the cache file as tab-separated values

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tickerlab_core::data::{CacheMeta, MarketFeed, TickerFeed};
use tickerlab_core::export::{export_csv, render_bar_chart};
use tickerlab_core::{MarketConfig, MarketField, MarketSnapshot};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickerlab",
    about = "TickerLab CLI: cryptocurrency market snapshots from a ticker endpoint"
)]
struct Cli {
    /// Path to the file containing the market data (or target file if it
    /// needs to be downloaded). Defaults to ./market_data.txt.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Increase the log level to debug.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// URL which should be used as market data source.
    #[arg(long)]
    market_url: Option<String>,

    /// Write the market data to this file as tab-separated values.
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// Write a bar chart of the selected market data to this PNG file.
    #[arg(long)]
    plot_file: Option<PathBuf>,

    /// Market data field to plot (e.g. price_usd, market_cap_usd, 24h_volume_usd).
    #[arg(long, default_value = "price_usd")]
    market_data: MarketField,

    /// Lowest rank of currencies to be considered (exclusive upper bound).
    #[arg(long)]
    limit: Option<usize>,

    /// First rank of currencies to be considered (0-based).
    #[arg(long)]
    start: Option<usize>,

    /// TOML config file; explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fetch from the market URL even if the data file already exists.
    #[arg(long, default_value_t = false)]
    refresh: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = resolve_config(&cli)?;
    debug!(?config, "resolved configuration");

    let mut snapshot = MarketSnapshot::from_config(&config)?;
    let feed = TickerFeed::new()?;
    load_snapshot(&mut snapshot, &config, cli.refresh, &feed)?;

    print_summary(&snapshot, cli.market_data);

    if let Some(plot_file) = &cli.plot_file {
        let series = snapshot.series(cli.market_data);
        render_bar_chart(&series, &axis_label(cli.market_data), plot_file)
            .with_context(|| format!("failed to write plot {}", plot_file.display()))?;
        println!("Plot saved to: {}", plot_file.display());
    }

    if let Some(csv_file) = &cli.csv_file {
        let rows = export_csv(&config.data_file, csv_file)
            .with_context(|| format!("failed to write CSV {}", csv_file.display()))?;
        println!("CSV saved to: {} ({rows} rows)", csv_file.display());
    }

    Ok(())
}

/// `--debug` forces debug output; otherwise RUST_LOG wins, falling back to info.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the cache file when it exists, otherwise (or with `refresh`) fetch
/// through `feed` and cache the body at the data file path.
fn load_snapshot(
    snapshot: &mut MarketSnapshot,
    config: &MarketConfig,
    refresh: bool,
    feed: &dyn MarketFeed,
) -> Result<()> {
    if config.data_file.exists() && !refresh {
        check_cache(config);
        snapshot
            .load_from_file(&config.data_file)
            .with_context(|| format!("failed to load {}", config.data_file.display()))?;
    } else {
        snapshot
            .load_from_feed(feed, &config.market_url, Some(&config.data_file))
            .with_context(|| format!("failed to fetch market data from {}", config.market_url))?;
    }
    Ok(())
}

/// Defaults, then the TOML file, then explicit flags.
fn resolve_config(cli: &Cli) -> Result<MarketConfig> {
    let mut config = match &cli.config {
        Some(path) => MarketConfig::from_file(path)?,
        None => MarketConfig::default(),
    };

    if let Some(url) = &cli.market_url {
        config.market_url = url.clone();
    }
    if let Some(data_file) = &cli.data_file {
        config.data_file = data_file.clone();
    }
    if let Some(start) = cli.start {
        config.start = start;
    }
    if let Some(limit) = cli.limit {
        config.limit = limit;
    }

    Ok(config)
}

/// Warn when a cache file no longer matches the sidecar written at fetch time.
fn check_cache(config: &MarketConfig) {
    let path = &config.data_file;
    let Some(meta) = CacheMeta::read(path) else {
        debug!(path = %path.display(), "no cache metadata, using file as-is");
        return;
    };

    match meta.verify(path) {
        Ok(true) => info!(
            path = %path.display(),
            fetched_at = %meta.fetched_at,
            url = %meta.url,
            "using cached market data"
        ),
        Ok(false) => warn!(
            path = %path.display(),
            "cache file changed since it was fetched; pass --refresh to refetch"
        ),
        Err(e) => warn!(path = %path.display(), error = %e, "could not verify cache file"),
    }
}

fn axis_label(field: MarketField) -> String {
    match field {
        MarketField::PriceUsd => "Price (USD)".to_string(),
        MarketField::PriceBtc => "Price (BTC)".to_string(),
        MarketField::MarketCapUsd => "Market cap (USD)".to_string(),
        MarketField::Volume24hUsd => "24h volume (USD)".to_string(),
        other => other.key().replace('_', " "),
    }
}

/// 1-based inclusive rank range, or "(none)" for an empty window.
fn rank_range(snapshot: &MarketSnapshot) -> String {
    let window = snapshot.window();
    if window.is_empty() {
        "(none)".to_string()
    } else {
        format!("{} to {}", window.start() + 1, window.limit())
    }
}

fn print_summary(snapshot: &MarketSnapshot, field: MarketField) {
    let window = snapshot.window();
    println!();
    println!("=== Market Snapshot ===");
    println!("Ranks:          {}", rank_range(snapshot));
    println!("Currencies:     {}", snapshot.len());
    println!();
    println!("{:<6} {:<24} {:>20}", "Rank", "Currency", field.key());
    println!("{}", "-".repeat(52));
    for (i, record) in snapshot.records().iter().enumerate() {
        let value = match record.value(field) {
            serde_json::Value::Null => "-".to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!(
            "{:<6} {:<24} {:>20}",
            window.start() + i + 1,
            record.id,
            value
        );
    }
    println!();
}
