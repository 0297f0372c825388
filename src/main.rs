//! Bonjourr-Quotes main entry point
//!
//! This is the command-line interface for collecting quotes and rendering
//! the repository README.

use anyhow::Context;
use bonjourr_quotes::config::{apply_env_overrides, load_config_with_hash, validate, Config};
use bonjourr_quotes::harvest::harvest;
use bonjourr_quotes::output::{
    checksum, list_directory, preview_lines, print_statistics, write_readme, write_run_report,
    Annotator, ReadmeContext, RunReport, StoreStatistics,
};
use bonjourr_quotes::{QuoteError, QuoteStore, RunMode, SourceRegistry};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Bonjourr-Quotes: a rotating Chinese quote collection
///
/// Polls public quote APIs for new unique quotes, merges them into a CSV
/// file, and renders Markdown summaries of the result.
#[derive(Parser, Debug)]
#[command(name = "bonjourr-quotes")]
#[command(version)]
#[command(about = "Collects Chinese quotes into a CSV file", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the number of new quotes to collect
    #[arg(long, value_name = "N")]
    target: Option<usize>,

    /// Append new quotes without pruning existing ones
    #[arg(long)]
    append: bool,

    /// Seed for source selection and pruning (reproducible runs)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Validate config and show the source registry without fetching
    #[arg(long, conflicts_with_all = ["stats", "readme"])]
    dry_run: bool,

    /// Show statistics for the quote file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "readme"])]
    stats: bool,

    /// Generate the README from the quote file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    readme: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let code = e
                .downcast_ref::<QuoteError>()
                .map(QuoteError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bonjourr_quotes=info,warn"),
            1 => EnvFilter::new("bonjourr_quotes=debug,info"),
            2 => EnvFilter::new("bonjourr_quotes=trace,debug"),
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

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .map_err(QuoteError::from)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(target) = cli.target {
        config.harvest.target_count = target;
    }
    if cli.append {
        config.harvest.mode = RunMode::Append;
    }
    validate(&config).map_err(QuoteError::from)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let annotator = Annotator::from_env();

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.readme {
        handle_readme(&config, &mut rng, annotator)
    } else {
        tokio::select! {
            result = handle_update(&config, config_hash, &mut rng, annotator) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, quote file left untouched");
                Err(QuoteError::Interrupted.into())
            }
        }
    }
}

/// Handles the --dry-run mode: shows the resolved configuration and sources
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let registry = SourceRegistry::from_config(config).map_err(QuoteError::from)?;

    println!("=== Bonjourr-Quotes Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Target count: {}", config.harvest.target_count);
    println!("  Max workers: {}", config.harvest.max_workers);
    println!(
        "  Request timeout: {}s",
        config.harvest.request_timeout_secs
    );
    match config.harvest.length_cap() {
        Some(max) => println!("  Max length: {} chars", max),
        None => println!("  Max length: unlimited"),
    }
    println!(
        "  Max consecutive failures: {}",
        config.harvest.max_consecutive_failures
    );
    println!("  Wrap around: {}", config.harvest.wrap_around);
    println!("  Mode: {:?}", config.harvest.mode);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  README: {}", config.output.readme_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\nSources ({}):", registry.len());
    for source in registry.iter() {
        println!("  - {}", source.name);
        println!("    * {}", source.request_url());
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics for the quote file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let csv_path = Path::new(&config.output.csv_path);
    println!("Quote file: {}\n", csv_path.display());

    let store = QuoteStore::load(csv_path).map_err(QuoteError::from)?;
    print_statistics(&StoreStatistics::from_store(&store, 10));

    Ok(())
}

/// Handles the --readme mode: renders the README from the quote file
fn handle_readme<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
    annotator: Annotator,
) -> anyhow::Result<()> {
    let csv_path = Path::new(&config.output.csv_path);
    let readme_path = Path::new(&config.output.readme_path);

    annotator.group("Inputs");
    tracing::info!("repository = {}", config.readme.repository);
    tracing::info!("branch     = {}", config.readme.branch);
    tracing::info!("quotes_csv = {}", config.output.csv_path);
    annotator.end_group();

    if !csv_path.exists() {
        log_workspace(csv_path, annotator);
        annotator.error(
            &format!("CSV not found: {}", config.output.csv_path),
            Some(&config.output.csv_path),
        );
        return Err(QuoteError::CsvMissing {
            path: csv_path.to_path_buf(),
        }
        .into());
    }

    let store = QuoteStore::load(csv_path).map_err(|e| {
        annotator.error(&e.to_string(), Some(&config.output.csv_path));
        QuoteError::from(e)
    })?;
    let bytes = std::fs::read(csv_path).map_err(QuoteError::from)?;

    annotator.group("CSV preview");
    for line in preview_lines(&String::from_utf8_lossy(&bytes), 5) {
        tracing::info!("{}", line);
    }
    annotator.end_group();

    let ctx = ReadmeContext {
        title: config.readme.title.clone(),
        repository: config.readme.repository.clone(),
        branch: config.readme.branch.clone(),
        csv_path: config.output.csv_path.clone(),
        count: store.len(),
        checksum: checksum(&bytes),
        sample: store.sample(rng).cloned(),
        generated_at: chrono::Utc::now(),
    };

    write_readme(&ctx, readme_path).map_err(QuoteError::from)?;

    tracing::info!(
        "README generated: {} ({} quotes)",
        readme_path.display(),
        ctx.count
    );
    annotator.notice(&format!("README generated: {}", readme_path.display()));

    Ok(())
}

/// Logs the directory that should have held the CSV
fn log_workspace(csv_path: &Path, annotator: Annotator) {
    let dir = match csv_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    annotator.group("Workspace listing");
    match list_directory(dir) {
        Ok(names) => {
            for name in names {
                tracing::info!("{}", name);
            }
        }
        Err(e) => tracing::warn!("Cannot list {}: {}", dir.display(), e),
    }
    annotator.end_group();
}

/// Handles the default mode: fetch, merge, write, report
async fn handle_update<R: Rng + ?Sized>(
    config: &Config,
    config_hash: Option<String>,
    rng: &mut R,
    annotator: Annotator,
) -> anyhow::Result<()> {
    let csv_path = Path::new(&config.output.csv_path);
    let mut store = QuoteStore::load(csv_path).map_err(QuoteError::from)?;
    tracing::info!("Loaded {} existing quotes", store.len());

    let outcome = harvest(config, store.keys(), rng).await?;
    if outcome.exhausted {
        annotator.warning(&format!(
            "Stopped early with {}/{} quotes",
            outcome.quotes.len(),
            config.harvest.target_count
        ));
    }

    let mut report = RunReport {
        new_quotes: outcome.quotes.clone(),
        total: store.len(),
        target: config.harvest.target_count,
        max_length: config.harvest.length_cap(),
        stats: outcome.stats.clone(),
        elapsed: outcome.elapsed,
        exhausted: outcome.exhausted,
        config_hash,
        ..RunReport::default()
    };

    if outcome.quotes.is_empty() {
        write_summary(config, &report);
        return Err(QuoteError::NoNewQuotes.into());
    }

    let merge = store.merge(outcome.new_quotes(), config.harvest.mode, rng);

    annotator.group("💾 写入 CSV 文件");
    store.save(csv_path).map_err(QuoteError::from)?;
    annotator.end_group();

    report.removed = merge.removed;
    report.total = store.len();
    write_summary(config, &report);

    tracing::info!(
        "Success! +{} / -{} ({} total)",
        merge.added,
        merge.removed,
        store.len()
    );

    Ok(())
}

/// Writes the run summary when a summary path is configured
fn write_summary(config: &Config, report: &RunReport) {
    let Some(path) = &config.output.summary_path else {
        return;
    };
    if let Err(e) = write_run_report(report, Path::new(path)) {
        tracing::warn!("Failed to write run summary: {}", e);
    }
}
