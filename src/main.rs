use anyhow::Context;
use api_client::{MarketDataClient, ReqwestTransport};
use assets::{create_handlers, HandlerContext, LogoCache};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use configuration::{init_logging, load_config, Config, FormattingConfig};
use display::format::{format_balance, format_optional_currency, NOT_AVAILABLE};
use display::{format_percent, PngDirectoryDriver, RenderPipeline, Slideshow, TokioPacer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracker::{PortfolioSummary, PortfolioTracker, SystemClock};

/// The main entry point for the inkfolio portfolio display.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; everything can come from config.toml.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_logging(&config.logging).context("Failed to initialise logging")?;

    let tracker = Arc::new(build_tracker(&config)?);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => handle_run(&config, tracker).await,
        Commands::Once => handle_once(&config, tracker).await,
        Commands::Snapshot { json } => handle_snapshot(&config, &tracker, json).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Values a crypto portfolio and shows it on a small e-ink panel.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run the slideshow until interrupted (the default).
    Run,
    /// Compose and show one deck without pausing between cards.
    Once,
    /// Print balances and positions without rendering anything.
    Snapshot {
        /// Print the summary as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

// ==============================================================================
// Wiring
// ==============================================================================

fn build_tracker(config: &Config) -> anyhow::Result<PortfolioTracker> {
    let transport = Arc::new(ReqwestTransport::new(&config.http).context("Failed to build the HTTP client")?);
    let logos = Arc::new(LogoCache::new(
        transport.clone(),
        config.display.palette.clone(),
        (config.display.logo_width, config.display.logo_height),
    ));
    let handlers = create_handlers(&HandlerContext::from_config(config, transport.clone(), logos));
    let rates = Arc::new(MarketDataClient::new(transport, &config.endpoints));

    PortfolioTracker::from_config(config, handlers, rates, Arc::new(SystemClock))
        .context("Failed to set up the portfolio tracker")
}

fn build_slideshow(config: &Config, tracker: Arc<PortfolioTracker>, delay: Duration) -> Slideshow {
    let driver = Arc::new(PngDirectoryDriver::from_config(&config.display));
    info!(directory = %driver.directory().display(), "Writing cards as PNG files");
    let pipeline = RenderPipeline::for_driver(
        tracker,
        driver.as_ref(),
        &config.display,
        config.formatting.clone(),
    );
    Slideshow::new(pipeline, driver, Arc::new(TokioPacer), delay)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_run(config: &Config, tracker: Arc<PortfolioTracker>) -> anyhow::Result<()> {
    let slideshow = build_slideshow(config, tracker, config.display.slide_delay);
    info!(delay = ?config.display.slide_delay, "Starting slideshow");

    tokio::select! {
        _ = slideshow.run_forever() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            warn!("Interrupted, stopping the slideshow");
        }
    }
    Ok(())
}

async fn handle_once(config: &Config, tracker: Arc<PortfolioTracker>) -> anyhow::Result<()> {
    let slideshow = build_slideshow(config, tracker, Duration::ZERO);
    let shown = slideshow.run_cycle().await.context("Failed to show the deck")?;
    info!(cards = shown, "Deck shown");
    Ok(())
}

async fn handle_snapshot(config: &Config, tracker: &PortfolioTracker, json: bool) -> anyhow::Result<()> {
    let summary = tracker.summary().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", snapshot_table(&summary, &config.formatting));
    }
    Ok(())
}

fn snapshot_table(summary: &PortfolioSummary, formatting: &FormattingConfig) -> Table {
    let snapshot = &summary.snapshot;
    let fiat = snapshot.fiat_currency.as_str();
    let local = summary.local_currency.as_str();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Asset".to_string(),
        "Balance".to_string(),
        format!("Price ({fiat})"),
        format!("Value ({fiat})"),
        format!("Value ({local})"),
    ]);

    for symbol in snapshot.held_assets() {
        let balance = snapshot.balance(symbol).map(format_balance);
        table.add_row(vec![
            Cell::new(symbol.display_name()),
            Cell::new(balance.as_deref().unwrap_or(NOT_AVAILABLE)).set_alignment(CellAlignment::Right),
            Cell::new(format_optional_currency(snapshot.rates.get(&symbol).copied(), fiat, formatting))
                .set_alignment(CellAlignment::Right),
            Cell::new(format_optional_currency(snapshot.position(symbol), fiat, formatting))
                .set_alignment(CellAlignment::Right),
            Cell::new(format_optional_currency(summary.local_position(symbol), local, formatting))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format_optional_currency(Some(snapshot.total()), fiat, formatting))
            .set_alignment(CellAlignment::Right),
        Cell::new(format_optional_currency(summary.local_total(), local, formatting))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("24h change"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format_percent(summary.change_24h)).set_alignment(CellAlignment::Right),
    ]);
    table
}
