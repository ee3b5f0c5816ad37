//! Courtside - Main Entry Point
//!
//! Polls the merged ESPN/Kalshi snapshot, runs every opportunity through the
//! decision engine and sends the resulting orders to Kalshi (or logs them in
//! dry-run mode).

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use courtside::config::load_config;
use courtside::{
    BankrollLedger, BoxedExecutionAdapter, DecisionEngine, DryRunExecutor, ExecutionAdapter,
    KalshiRestClient, PaperExecutor, SnapshotFeed, TradingLoop,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides settings.log_level
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Send real orders (asks for confirmation)
    #[arg(long)]
    live: bool,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Snapshot file to read instead of feed.snapshot_path
    #[arg(long)]
    snapshot: Option<String>,
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn confirm_live() -> Result<bool> {
    print!("LIVE TRADING: real orders will be sent to Kalshi. Type 'yes' to continue: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "yes")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config)).context("failed to load configuration")?;
    if let Some(path) = &args.snapshot {
        config.feed.snapshot_path = path.clone();
    }
    if args.live {
        config.trading.dry_run = false;
    }

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    init_logging(&level, args.log_json)?;

    info!("Starting Courtside");
    info!("Configuration file: {}", args.config);

    if !config.trading.dry_run && !confirm_live()? {
        bail!("live trading not confirmed");
    }

    let exchange: BoxedExecutionAdapter = if config.kalshi.has_credentials() {
        Box::new(KalshiRestClient::from_config(&config.kalshi)?)
    } else if config.trading.dry_run {
        warn!("no Kalshi credentials, positions come from the paper book");
        Box::new(PaperExecutor::new())
    } else {
        bail!("live trading requires KALSHI_API_KEY_ID and KALSHI_PRIVATE_KEY_PATH");
    };

    let adapter: BoxedExecutionAdapter = if config.trading.dry_run {
        Box::new(DryRunExecutor::new(exchange))
    } else {
        exchange
    };

    info!(
        adapter = adapter.name(),
        bankroll = %config.trading.bankroll,
        max_trade = %config.trading.max_trade,
        use_maker = config.trading.use_maker,
        snapshot = %config.feed.snapshot_path,
        "Application initialized successfully"
    );

    let mut trading = TradingLoop::new(
        SnapshotFeed::new(&config.feed.snapshot_path),
        adapter,
        DecisionEngine::new(config.trading.clone()),
        BankrollLedger::new(config.trading.bankroll),
        Duration::from_secs(config.settings.poll_interval_seconds),
    );

    if args.once {
        let summary = trading.run_tick().await?;
        info!(?summary, "single tick complete");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, finishing current tick...");
            let _ = shutdown_tx.send(true);
        }
    });

    trading.run(shutdown_rx).await?;
    Ok(())
}
