//! yt-harvest main entry point
//!
//! This is the command-line interface for the YouTube Data API harvester.

use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use yt_harvest::api::{build_http_client, ApiError, HttpExecutor};
use yt_harvest::config::{load_config_with_hash, validate, Config};
use yt_harvest::harvest::{read_list_file, HarvestPlan, Harvester, Order, OutputTargets, YoutubeClient};
use yt_harvest::output::{print_summary, CsvTableWriter};
use yt_harvest::{ConfigError, HarvestError};

/// Environment variable consulted when the config has no API key
const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// yt-harvest: a resumable YouTube Data API harvester
///
/// Collects video IDs from channel searches, a keyword search and explicit
/// lists, then appends their comments and metadata to CSV tables. Videos
/// already present in the video table are not fetched again.
#[derive(Parser, Debug)]
#[command(name = "yt-harvest")]
#[command(version)]
#[command(about = "A resumable YouTube Data API harvester", long_about = None)]
#[command(group(
    ArgGroup::new("sources")
        .required(true)
        .multiple(true)
        .args(["search_channels", "search_keywords", "search_videos", "search_users"])
))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Path to file of channel ID per line
    #[arg(short = 'c', long, value_name = "FILE")]
    search_channels: Option<PathBuf>,

    /// Path to file of keyword per line
    #[arg(short = 'k', long, value_name = "FILE")]
    search_keywords: Option<PathBuf>,

    /// Path to file of video ID per line
    #[arg(short = 'v', long, value_name = "FILE")]
    search_videos: Option<PathBuf>,

    /// Path to file of username per line
    #[arg(short = 'u', long, value_name = "FILE")]
    search_users: Option<PathBuf>,

    /// Path to comments output
    #[arg(long, value_name = "PATH")]
    comments_output: Option<PathBuf>,

    /// Path to videos output
    #[arg(long, value_name = "PATH")]
    video_output: Option<PathBuf>,

    /// Path to channels output
    #[arg(long, value_name = "PATH")]
    channel_output: Option<PathBuf>,

    /// Do not search before this date
    #[arg(long, value_name = "DD/MM/YYYY")]
    since: Option<String>,

    /// Order in which to return IDs (date, rating, relevance, title, videoCount, viewCount)
    #[arg(long)]
    order: Option<Order>,

    /// Limit the number of video IDs returned from each search
    #[arg(long)]
    limit: Option<usize>,

    /// Limit the number of comments returned for each video
    #[arg(long)]
    limit_comments: Option<usize>,

    /// Fetch snippets only, without view and like counts
    #[arg(long)]
    no_statistics: bool,

    /// Increase logging verbosity (--verbose, --verbose --verbose, ...)
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    apply_overrides(&cli, &mut config);
    validate(&config)?;

    let plan = build_plan(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &plan);
        return Ok(());
    }

    handle_harvest(config, plan).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("yt_harvest=info,warn"),
            1 => EnvFilter::new("yt_harvest=debug,info"),
            2 => EnvFilter::new("yt_harvest=trace,debug"),
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

/// Applies command-line values over the configuration file
fn apply_overrides(cli: &Cli, config: &mut Config) {
    let path_string = |path: &Path| path.to_string_lossy().into_owned();

    if let Some(path) = &cli.comments_output {
        config.output.comment_path = path_string(path);
    }
    if let Some(path) = &cli.video_output {
        config.output.video_path = path_string(path);
    }
    if let Some(path) = &cli.channel_output {
        config.output.channel_path = path_string(path);
    }
    if let Some(since) = &cli.since {
        config.search.since = since.clone();
    }
    if let Some(order) = cli.order {
        config.search.order = order;
    }
    if cli.limit.is_some() {
        config.search.limit = cli.limit;
    }
    if cli.limit_comments.is_some() {
        config.search.comment_limit = cli.limit_comments;
    }
    if cli.no_statistics {
        config.search.fetch_statistics = false;
    }
}

/// Reads the seed files named on the command line into a plan
fn build_plan(cli: &Cli, config: &Config) -> Result<HarvestPlan, Box<dyn std::error::Error>> {
    let read = |path: &Path| {
        read_list_file(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
    };

    let mut plan = HarvestPlan::from_config(config)?;

    if let Some(path) = &cli.search_videos {
        tracing::info!("Reading video IDs from {}", path.display());
        plan.video_ids = read(path)?;
    }
    if let Some(path) = &cli.search_channels {
        tracing::info!("Reading channel IDs from {}", path.display());
        plan.channel_ids = read(path)?;
    }
    if let Some(path) = &cli.search_keywords {
        tracing::info!("Reading keywords from {}", path.display());
        plan = plan.with_keywords(&read(path)?);
    }
    if let Some(path) = &cli.search_users {
        tracing::info!("Reading usernames from {}", path.display());
        plan.usernames = read(path)?;
    }

    Ok(plan)
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, plan: &HarvestPlan) {
    let limit = |limit: Option<usize>| match limit {
        Some(n) => n.to_string(),
        None => "unbounded".to_string(),
    };

    println!("=== yt-harvest Dry Run ===\n");

    println!("API Configuration:");
    println!("  Base URL: {}", config.api.base_url);
    println!(
        "  API key: {}",
        if resolve_api_key(config).is_some() {
            "set"
        } else {
            "missing"
        }
    );
    println!("  Quota wait: {} minutes", config.api.quota_wait_minutes);
    println!("  Page size: {}", config.api.page_size);

    println!("\nSearch:");
    println!("  Since: {}", config.search.since);
    println!("  Order: {}", plan.order);
    println!("  Limit per search: {}", limit(plan.search_limit.get()));
    println!("  Limit per video's comments: {}", limit(plan.comment_limit.get()));
    println!("  Statistics: {}", plan.fetch_statistics);

    println!("\nOutput:");
    println!("  Comments: {}", config.output.comment_path);
    println!("  Videos: {}", config.output.video_path);
    println!("  Channels: {}", config.output.channel_path);
    for (name, value) in &config.output.extra_columns {
        println!("  Extra column: {} = {}", name, value);
    }

    println!("\nSeeds:");
    println!("  Video IDs: {}", plan.video_ids.len());
    println!("  Channels: {}", plan.channel_ids.len());
    for channel in &plan.channel_ids {
        println!("    * {}", channel);
    }
    println!("  Keywords: {}", plan.keywords.as_deref().unwrap_or("-"));
    println!("  Usernames: {}", plan.usernames.len());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, plan: HarvestPlan) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = resolve_api_key(&config).ok_or_else(|| {
        ConfigError::Validation(format!(
            "No API key: set api.api-key in the config or {}",
            API_KEY_ENV
        ))
    })?;

    let http = build_http_client(Duration::from_secs(config.api.request_timeout_secs))
        .map_err(HarvestError::from)?;
    let executor = HttpExecutor::new(http, &config.api.base_url, api_key);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping harvest");
            interrupt.cancel();
        }
    });

    let client = YoutubeClient::new(
        executor,
        Duration::from_secs(config.api.quota_wait_minutes * 60),
        config.api.page_size,
    )
    .with_cancellation(cancel.clone());
    let harvester = Harvester::new(
        client,
        CsvTableWriter::new(),
        OutputTargets::from_config(&config.output),
    );

    let result = tokio::select! {
        result = harvester.run(&plan) => result,
        _ = cancel.cancelled() => Err(HarvestError::Api(ApiError::Cancelled)),
    };

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// API key from the config, falling back to the environment
fn resolve_api_key(config: &Config) -> Option<String> {
    config
        .api
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
}
