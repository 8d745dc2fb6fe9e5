//! Wisdom Kiosk daemon
//!
//! A coin-operated fortune printer: insert coins, press the button, receive
//! wisdom in proportion to what you paid.

mod config;
mod devices;
mod kiosk;
mod shutdown;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::ConfigLoader;
use kiosk::{InputMode, run_kiosk};
use kiosk_core::fortunes::strfile::{STR_ROTATED, StrfileHeader, index_path};
use kiosk_core::fortunes::build_index;
use shutdown::spawn_shutdown_handler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Wisdom Kiosk - coin-operated fortune printer
#[derive(Parser, Debug)]
#[command(name = "kiosk-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./kiosk.toml", env = "KIOSK_CONFIG")]
    config: PathBuf,

    /// Take button presses and coins from stdin instead of GPIO, and print
    /// to stdout
    #[arg(long, default_value = "false")]
    simulate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the `.dat` index for a fortune database
    Index {
        /// Content file; the index is written next to it
        path: PathBuf,

        /// Entry delimiter character
        #[arg(short, long, default_value_t = '%')]
        delimiter: char,

        /// Mark the content as ROT13 encoded
        #[arg(long, default_value = "false")]
        rotated: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    if let Some(Command::Index {
        path,
        delimiter,
        rotated,
    }) = &args.command
    {
        return write_index(path, *delimiter, *rotated);
    }

    tracing::info!("Starting kiosk-daemon v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ConfigLoader::new(&args.config).load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let (shutdown_tx, _shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    spawn_shutdown_handler(shutdown_tx.clone());

    let mode = if args.simulate {
        InputMode::Simulated
    } else {
        InputMode::Gpio
    };
    let result = run_kiosk(config, mode, shutdown_tx).await;
    if let Err(e) = &result {
        tracing::error!("Kiosk stopped with error: {:#}", e);
    }

    tracing::info!("Kiosk shutdown complete");
    result
}

/// Write `<path>.dat` for the content file at `path`.
fn write_index(path: &Path, delimiter: char, rotated: bool) -> anyhow::Result<()> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {delimiter:?} is not an ASCII character"))?;
    let flags = if rotated { STR_ROTATED } else { 0 };

    let content =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let index = build_index(&content, delimiter, flags);
    let target = index_path(path);
    std::fs::write(&target, &index)
        .with_context(|| format!("failed to write {}", target.display()))?;

    if let Some(header) = StrfileHeader::parse(&index) {
        tracing::info!(
            entries = header.numstr,
            longest = header.longlen,
            shortest = header.shortlen,
            "Wrote {}",
            target.display()
        );
    }
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr; stdout belongs to the console display and printer.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
