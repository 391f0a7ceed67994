//! Affiliate-Scout main entry point
//!
//! This is the command-line interface for the Affiliate-Scout site scanner.

use affiliate_scout::config::{load_config_with_hash, Config};
use affiliate_scout::follow::LoggingDriver;
use affiliate_scout::input::InputSource;
use affiliate_scout::job::{load_targets, run_follows, run_scan, write_reports};
use affiliate_scout::output::{print_statistics, ScanStatistics};
use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Affiliate-Scout: a polite partner-program and social-profile scanner
///
/// Affiliate-Scout visits each target website once, finds links to
/// affiliate/partner programs and social profiles, and writes the findings
/// to a timestamped CSV report.
#[derive(Parser, Debug)]
#[command(name = "affiliate-scout")]
#[command(version)]
#[command(about = "A polite partner-program and social-profile scanner", long_about = None)]
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

    /// Scan these URLs instead of the configured input (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Validate config and list the targets without scanning
    #[arg(long, conflicts_with_all = ["stats_only", "plan_follows"])]
    dry_run: bool,

    /// Scan and print statistics without writing reports
    #[arg(long, conflicts_with = "dry_run")]
    stats_only: bool,

    /// After scanning, walk the follow queue with the logging driver
    #[arg(long)]
    plan_follows: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let source = resolve_source(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &source).await
    } else {
        handle_scan(&cli, config, config_hash, source).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("affiliate_scout=info,warn"),
            1 => EnvFilter::new("affiliate_scout=debug,info"),
            2 => EnvFilter::new("affiliate_scout=trace,debug"),
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

/// `--url` wins over the configured input
fn resolve_source(cli: &Cli, config: &Config) -> anyhow::Result<InputSource> {
    if !cli.urls.is_empty() {
        return Ok(InputSource::Inline(cli.urls.clone()));
    }

    match InputSource::from_config(&config.input) {
        Some(source) => Ok(source),
        None => bail!("No targets: set csv-path or sheet-id in [input], or pass --url"),
    }
}

/// Handles the --dry-run mode: validates config and lists the targets
async fn handle_dry_run(config: &Config, source: &InputSource) -> anyhow::Result<()> {
    println!("=== Affiliate-Scout Dry Run ===\n");

    println!("Scanner Configuration:");
    println!("  User agent: {}", config.scanner.user_agent);
    println!("  Timeout: {}s", config.scanner.timeout_secs);
    println!(
        "  Delay between sites: {}ms (+ up to {}ms jitter)",
        config.scanner.min_delay_ms, config.scanner.jitter_ms
    );
    println!("  Max concurrent: {}", config.scanner.max_concurrent);
    println!("  Text fallback: {}", config.scanner.text_fallback);

    println!("\nClassifier:");
    println!("  Program keywords: {}", config.classifier.program_keywords.join(", "));
    println!("  Fallback platform: {}", config.classifier.fallback_platform);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File prefix: {}", config.output.file_prefix);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    let targets = load_targets(config, source)
        .await
        .with_context(|| format!("Failed to load targets from {}", source.describe()))?;

    println!("\nTargets ({}) from {}:", targets.len(), source.describe());
    for target in &targets {
        println!("  - {}", target);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would scan {} sites", targets.len());

    Ok(())
}

/// Handles the main scan: load, scan, report, optionally plan follows
async fn handle_scan(
    cli: &Cli,
    config: Config,
    config_hash: String,
    source: InputSource,
) -> anyhow::Result<()> {
    let outcome = run_scan(&config, &source, Some(config_hash))
        .await
        .with_context(|| format!("Scan of {} failed", source.describe()))?;

    print_statistics(&ScanStatistics::from_batch(&outcome.batch));

    if !cli.stats_only {
        let paths = write_reports(&config, &outcome, &std::env::temp_dir())
            .context("Failed to export CSV report")?;
        println!();
        for path in &paths {
            println!("✓ Report written to: {}", path.display());
        }
    }

    if cli.plan_follows {
        let mut driver = LoggingDriver::default();
        let summary = run_follows(&config, &outcome.batch, &mut driver)
            .await
            .context("Follow queue stopped")?;

        println!("\n=== Follow Plan ===\n");
        println!("  Would follow: {}", summary.followed.len());
        println!("  Failed: {}", summary.failed.len());
        println!("  Deferred (window full): {}", summary.deferred.len());
        for url in &summary.deferred {
            println!("    - {}", url);
        }
    }

    Ok(())
}
