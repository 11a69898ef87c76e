use anyhow::{Context, Result};
use clap::Parser;
use session_edge::application::SessionAnalysisPipeline;
use session_edge::application::market_data::collect_all_days;
use session_edge::config::AnalysisConfig;
use session_edge::domain::market::Timeframe;
use session_edge::infrastructure::InMemoryCandleStore;
use session_edge::infrastructure::csv_loader::load_into_store;
use session_edge::infrastructure::signal_export::export_signals;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Intraday session analysis and signal report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Candle CSV with columns timestamp,open,high,low,close,volume
    #[arg(long)]
    input: PathBuf,

    /// TOML analysis config; environment variables are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Candle granularity of the input (1m, 5m, 15m, 1h)
    #[arg(long, default_value = "5m")]
    timeframe: String,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also export the emitted signals as CSV
    #[arg(long)]
    signals_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    let timeframe: Timeframe = args.timeframe.parse()?;

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::from_env()?,
    };
    let pipeline = SessionAnalysisPipeline::new(config).context("Invalid analysis configuration")?;

    let store = InMemoryCandleStore::new();
    let loaded = load_into_store(&args.input, &store, timeframe).await?;
    info!("Loaded {} candles from {}", loaded, args.input.display());

    let days = collect_all_days(&store, timeframe).await?;
    let report = tokio::task::spawn_blocking(move || pipeline.run(days))
        .await
        .context("Analysis task panicked")?;

    if let Some(path) = &args.signals_csv {
        export_signals(path, &report.signals)?;
    }

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
