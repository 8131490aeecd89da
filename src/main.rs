//! Wave-Harvest main entry point
//!
//! This is the command-line interface for the Wave-Harvest batch image fetcher.

use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wave_harvest::config::{load_config_with_hash, Config};
use wave_harvest::output::print_summary;
use wave_harvest::paths::Layout;
use wave_harvest::range::{list_stem, parse_index, IndexRange};
use wave_harvest::Engine;

/// Wave-Harvest: a batch image fetcher
///
/// Wave-Harvest walks numbered input lists of `<url> <destination>` lines,
/// downloads every image with a bounded number of concurrent requests, and
/// writes a failure log per list for later retry.
#[derive(Parser, Debug)]
#[command(name = "wave-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A batch image fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "crawl.toml")]
    config: PathBuf,

    /// First input list index (prompted for when omitted)
    #[arg(long)]
    start: Option<String>,

    /// Last input list index, inclusive (prompted for when omitted)
    #[arg(long)]
    end: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and list the input files the range would process
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let range = resolve_range(cli.start.as_deref(), cli.end.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, range);
        return Ok(());
    }

    handle_harvest(&config, range).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wave_harvest=info,warn"),
            1 => EnvFilter::new("wave_harvest=debug,info"),
            2 => EnvFilter::new("wave_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Takes the range from the command line, prompting for missing bounds
fn resolve_range(start: Option<&str>, end: Option<&str>) -> anyhow::Result<IndexRange> {
    let start = match start {
        Some(raw) => parse_index(raw)?,
        None => parse_index(&prompt("Start index (e.g. 1 for list 00001): ")?)?,
    };
    let end = match end {
        Some(raw) => parse_index(raw)?,
        None => parse_index(&prompt("End index (e.g. 10 for list 00010): ")?)?,
    };
    Ok(IndexRange::new(start, end)?)
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read index from stdin")?;
    anyhow::ensure!(read > 0, "no index given on stdin");
    Ok(line)
}

/// Handles the --dry-run mode: shows configuration and the lists in range
fn handle_dry_run(config: &Config, range: IndexRange) {
    println!("=== Wave-Harvest Dry Run ===\n");

    println!("Fetch Configuration:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Max concurrent: {}", config.fetch.max_concurrent);
    match config.proxy.active_url() {
        Some(url) => println!("  Proxy: {}", url),
        None => println!("  Proxy: none"),
    }
    println!(
        "  Minimum round interval: {}s",
        config.throttle.min_round_interval_secs
    );

    println!("\nPaths:");
    println!("  Input lists: {}", config.paths.urls_path.display());
    println!("  Failure logs: {}", config.paths.fail_path.display());
    println!("  Images: {}", config.paths.storage_path.display());
    println!("  Run logs: {}", config.paths.log_path.display());

    let layout = Layout::new(&config.paths);
    println!("\nInput lists ({}):", range.count());
    let mut present = 0;
    for index in range.iter() {
        let input = layout.input_file(&list_stem(&config.naming, index));
        if input.is_file() {
            present += 1;
            println!("  ✓ {}", input.display());
        } else {
            println!("  ✗ {} (missing, would be skipped)", input.display());
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would process {} of {} input lists", present, range.count());
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, range: IndexRange) -> anyhow::Result<()> {
    let mut engine = Engine::new(config).context("failed to initialize fetch engine")?;

    tracing::info!(
        "Harvesting lists {}..={} with at most {} concurrent fetches",
        range.start,
        range.end,
        engine.pool().ceiling()
    );

    let summary = engine.run_range(range).await?;
    print_summary(&summary);

    Ok(())
}
