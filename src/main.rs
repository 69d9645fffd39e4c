//! Immoharvest main entry point
//!
//! This is the command-line interface for the Immoharvest listing harvester.

use clap::Parser;
use immoharvest::config::load_config_with_hash;
use immoharvest::crawl::run_harvest;
use immoharvest::export::artifact_name;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Immoharvest: a real-estate listing harvester
///
/// Immoharvest walks paginated listing-site search results, extracts and
/// normalizes property details, geocodes addresses best-effort, and writes
/// one CSV dataset per configured source.
#[derive(Parser, Debug)]
#[command(name = "immoharvest")]
#[command(version = "1.0.0")]
#[command(about = "A real-estate listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl only the named source
    #[arg(long, value_name = "NAME")]
    source: Option<String>,

    /// Validate config and show what would be crawled without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Narrow to a single source when asked
    if let Some(name) = &cli.source {
        let configured = config.sources.len();
        config.sources.retain(|s| &s.name == name);
        if config.sources.is_empty() {
            anyhow::bail!(
                "no source named '{}' among the {} configured",
                name,
                configured
            );
        }
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("immoharvest=info,warn"),
            1 => EnvFilter::new("immoharvest=debug,info"),
            2 => EnvFilter::new("immoharvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &immoharvest::config::Config) -> anyhow::Result<()> {
    println!("=== Immoharvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Max attempts per property: {}", config.crawl.max_attempts);
    println!("  Request delay: {}ms", config.crawl.request_delay_ms);
    println!("  Workers: {}", config.crawl.max_workers);

    println!("\nEngine:");
    println!("  User agent: {}", config.engine.user_agent);
    println!(
        "  Navigation timeout: {}s",
        config.engine.navigation_timeout_secs
    );

    println!("\nGeocoding:");
    println!("  Endpoint: {}", config.geocoding.endpoint);
    println!("  User agent: {}", config.geocoding.user_agent);

    println!("\nOutput directory: {}", config.output.directory);

    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        println!("  - {} [{}]", source.name, source.profile);
        println!("    {}", source.url);
        println!(
            "    page size {}, first page {}",
            source.page_size, source.first_page
        );
        println!("    artifact: {}", artifact_name(&source.url));
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} source(s)", config.sources.len());

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: immoharvest::config::Config) -> anyhow::Result<()> {
    tracing::info!(
        "Sources: {}, workers: {}, request delay: {}ms",
        config.sources.len(),
        config.crawl.max_workers,
        config.crawl.request_delay_ms
    );

    // First interrupt cancels cleanly between pages and properties
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            interrupt.cancel();
        }
    });

    let runs = run_harvest(&config, cancel).await?;

    let total_records: usize = runs.iter().map(|r| r.records.len()).sum();
    let total_failures: usize = runs.iter().map(|r| r.failures.len()).sum();
    tracing::info!(
        "Harvest finished: {} source(s) completed, {} records, {} failed properties",
        runs.len(),
        total_records,
        total_failures
    );

    for run in &runs {
        if let Some(artifact) = &run.artifact {
            println!(
                "{}: {} records -> {}",
                run.source.name,
                run.records.len(),
                artifact.display()
            );
        }
    }

    Ok(())
}
