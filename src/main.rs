//! Market Research - daily watchlist screener.
//!
//! One-shot batch run: load the YAML config, fetch OHLCV history for the
//! watchlist, screen and rank, then write the configured report files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use market_research::data::{CachedProvider, DataProvider, YahooProvider};
use market_research::report::{IndexSnapshot, ReportFormat, ResearchReport};
use market_research::screener::ScreenerEngine;
use market_research::{init_logging, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(Path::new(&config_path))?;

    init_logging("info");
    tracing::info!("Market Research v{}", env!("CARGO_PKG_VERSION"));

    let interval = config.data.interval()?;
    let provider = CachedProvider::new(YahooProvider::new(), config.data.cache_ttl_secs);

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        config = %config_path,
        "Initialized in {:?}",
        startup_duration
    );

    // Scan the watchlist
    let engine = ScreenerEngine::new(
        provider,
        config.watchlist.clone(),
        config.data.lookback_days,
        interval,
    );
    let scan = engine.run_scan().await?;

    // Reference indices for the report overview; failures here only thin
    // out the overview section
    let mut indices = Vec::new();
    for (name, ticker) in &config.index_tickers {
        match engine
            .provider()
            .fetch_ohlcv(ticker, config.data.lookback_days, interval)
            .await
        {
            Ok(series) => {
                if let Some(snap) = IndexSnapshot::from_series(name, &series) {
                    indices.push(snap);
                }
            }
            Err(e) => {
                tracing::warn!(index = %ticker, error = %e, "Skipping index in overview");
            }
        }
    }

    print_top_picks(&scan, config.report.top_n);

    // Write the configured report formats
    let report = ResearchReport::new(scan, indices, config.report.top_n);
    let stem = format!(
        "report_{}",
        report.scan().completed_at.format("%Y-%m-%d")
    );
    for raw in &config.report.formats {
        let format: ReportFormat = raw
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("Bad report format in config: {}", raw))?;
        let path = PathBuf::from(&config.report.out_dir).join(&stem);
        let saved = report.save_to_file(&path, format)?;
        tracing::info!(path = %saved.display(), format = %format, "Report written");
    }

    Ok(())
}

fn print_top_picks(scan: &market_research::ScanResult, top_n: usize) {
    println!("\n{}", scan.summary());
    println!("\nTop picks:");
    println!(
        "{:<14} {:>10} {:>8} {:>10} {:>6}  {}",
        "TICKER", "CLOSE", "RSI_14", "MACD_HIST", "SCORE", "SIGNALS"
    );
    for row in scan.top(top_n) {
        println!(
            "{:<14} {:>10.2} {:>8.1} {:>10.3} {:>6.0}  {}",
            row.ticker, row.close, row.rsi_14, row.macd_hist, row.score, row.signals
        );
    }
    println!();
}
