//! mdex-archiver main entry point
//!
//! This is the command-line interface for the MangaDex chapter archiver.

use anyhow::Context;
use clap::Parser;
use mdex_archiver::config::{load_config, validate, Config};
use mdex_archiver::resolver::resolve;
use mdex_archiver::Pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// mdex-archiver: download MangaDex chapters into comic archives
///
/// Each input is a series or chapter URL, a prefixed id (`title:`, `chapter:`) or a bare
/// series id. Chapters already listed in the cache file are skipped.
#[derive(Parser, Debug)]
#[command(name = "mdex-archiver")]
#[command(version = "1.0.0")]
#[command(about = "Download MangaDex chapters into comic archives", long_about = None)]
struct Cli {
    /// Series or chapter URLs or ids
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory for archives and covers
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path of the JSON cache of archived chapters
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Ignore the cache: download everything and record nothing
    #[arg(long = "override")]
    override_cache: bool,

    /// Download the series cover image
    #[arg(long)]
    cover: bool,

    /// Save one cover image per volume next to its first chapter
    #[arg(long)]
    chapter_cover: bool,

    /// List the chapters that would be downloaded and exit
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    let pipeline = Pipeline::new(config).context("failed to initialize the pipeline")?;

    if cli.dry_run {
        return handle_dry_run(&pipeline, &cli.inputs).await;
    }

    match pipeline.run(&cli.inputs).await {
        Ok(report) => {
            tracing::info!("Run completed successfully");
            report.print_summary();
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            if e.is_remote() {
                tracing::error!(
                    "Check network access to {}",
                    pipeline.config().gateway.api_base_url
                );
            }
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mdex_archiver=info,warn"),
            1 => EnvFilter::new("mdex_archiver=debug,info"),
            2 => EnvFilter::new("mdex_archiver=trace,debug"),
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

/// Loads the optional config file and applies command-line overrides on top of it
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("could not load {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
    if let Some(cache) = &cli.cache {
        config.output.cache_path = cache.clone();
    }
    config.features.override_cache |= cli.override_cache;
    config.features.download_cover |= cli.cover;
    config.features.chapter_cover |= cli.chapter_cover;

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: lists pending chapters per input
async fn handle_dry_run(pipeline: &Pipeline, inputs: &[String]) -> anyhow::Result<()> {
    println!("=== mdex-archiver Dry Run ===\n");
    println!("Output: {}", pipeline.config().output.directory.display());
    println!("Cache: {}", pipeline.cache().path().display());
    println!();

    for input in inputs {
        let resource = resolve(input)?;
        let chapters = pipeline.pending_chapters(&resource).await?;

        println!("{} {} ({} pending):", resource.kind, resource.id, chapters.len());
        for chapter in &chapters {
            println!("  - Chapter {}: {}", chapter.number_label(), chapter.title);
        }
        println!();
    }

    Ok(())
}
