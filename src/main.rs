//! packdex - Entry point
//!
//! Reads a batch of raw chat messages (JSONL, one JSON string per line),
//! reconciles the in-memory pack cache, runs an optional search, and
//! prints the results as JSON.

use clap::{Parser, ValueEnum};
use packdex::config;
use packdex::covers::{CoverTable, ManualCovers};
use packdex::model::AppError;
use packdex::source;
use packdex::store::{CacheStore, ScanMode};
use std::path::PathBuf;
use tracing::info;

/// Extract pack listings from chat exports and query them
#[derive(Parser, Debug)]
#[command(name = "packdex")]
#[command(version)]
#[command(about = "Parse pack listings from raw chat messages and search the cache")]
struct Args {
    /// Path to JSONL message file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Reconciliation mode; auto selects by scan depth
    #[arg(long, value_enum, default_value = "auto")]
    mode: Mode,

    /// Scan depth the batch was collected with (defaults to batch size)
    #[arg(long)]
    depth: Option<usize>,

    /// Search keywords (all must match)
    #[arg(short, long, default_value = "")]
    query: String,

    /// Keywords that reject a pack when found on a matched line
    #[arg(short = 'x', long, default_value = "")]
    exclude: String,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Keep only packs with display price >= this value
    #[arg(long)]
    price_min: Option<u64>,

    /// Keep only packs with display price <= this value
    #[arg(long)]
    price_max: Option<u64>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Incremental for shallow scans, full for deep ones
    Auto,
    /// Sync the cache against the observed window
    Incremental,
    /// Replace the cache wholesale
    Full,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(Args::parse())?;
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    let config_file = config::load_config(args.config.clone())?;
    let config = config::resolve(config_file);

    packdex::logging::init(&config.log_file_path)?;
    info!(version = env!("CARGO_PKG_VERSION"), "packdex starting");

    let covers = config
        .covers_path
        .as_deref()
        .map(CoverTable::load)
        .unwrap_or_default();
    let manual_covers = config
        .manual_covers_path
        .as_deref()
        .map(ManualCovers::load)
        .unwrap_or_default();
    let store = CacheStore::new(&config, covers, manual_covers);

    let input = source::detect_input_source(args.file.clone())?;
    let messages = input.read_messages()?;

    let depth = args.depth.unwrap_or(messages.len());
    let mode = match args.mode {
        Mode::Auto => ScanMode::for_depth(depth, config.incremental_threshold),
        Mode::Incremental => ScanMode::Incremental,
        Mode::Full => ScanMode::Full,
    };

    let report = store.ingest(&messages, mode)?;

    let limit = args.limit.unwrap_or(config.search_limit);
    let mut results = store.search(&args.query, &args.exclude, limit);

    // Price range is an API-boundary post-filter over display prices.
    if args.price_min.is_some() || args.price_max.is_some() {
        results.retain(|view| {
            args.price_min.is_none_or(|min| view.price_display >= min)
                && args.price_max.is_none_or(|max| view.price_display <= max)
        });
    }

    let output = serde_json::json!({
        "sync": report,
        "status": store.status(),
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
