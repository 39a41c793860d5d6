//! Shelf-Scout main entry point
//!
//! This is the command-line interface for the Shelf-Scout product crawler.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use shelf_scout::config::{load_config_with_hash, Config};
use shelf_scout::crawler::{CrawlOrchestrator, ProductCrawler, RunOptions};
use shelf_scout::output::{export_products, load_statistics, print_run_summary, print_statistics};
use shelf_scout::storage::Store;
use shelf_scout::url::load_url_list;
use tracing_subscriber::EnvFilter;

/// Shelf-Scout: an e-commerce product page harvester
///
/// Shelf-Scout fetches product pages one at a time, extracts product data,
/// variations and images, and stores them in SQLite. URLs that were stored
/// or ruled out before are skipped.
#[derive(Parser, Debug)]
#[command(name = "shelf-scout")]
#[command(version)]
#[command(about = "An e-commerce product page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// File with URLs to crawl (JSON array, XML sitemap, or one URL per line)
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    urls: Option<PathBuf>,

    /// Crawl a single URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and URL list without crawling
    #[arg(long, conflicts_with_all = ["stats", "export"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export"])]
    stats: bool,

    /// Export stored products as JSON to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.stats {
        handle_stats(&config)
    } else if let Some(path) = &cli.export {
        handle_export(&config, path)
    } else {
        let urls = read_urls(&cli)?;
        if cli.dry_run {
            handle_dry_run(&config, &urls);
            Ok(())
        } else {
            handle_crawl(&config, &urls).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scout=info,warn"),
            1 => EnvFilter::new("shelf_scout=debug,info"),
            2 => EnvFilter::new("shelf_scout=trace,debug"),
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

fn read_urls(cli: &Cli) -> anyhow::Result<Vec<String>> {
    match (&cli.urls, &cli.url) {
        (Some(path), _) => load_url_list(path)
            .with_context(|| format!("failed to read URL list {}", path.display())),
        (None, Some(url)) => Ok(vec![url.clone()]),
        (None, None) => bail!("nothing to crawl: pass --urls FILE or --url URL"),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::open(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open database {}", config.output.database_path))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Shelf-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Delay between URLs: {}s", config.crawler.delay_seconds);
    println!("  Max URLs: {}", config.crawler.max_urls);
    println!("  Stop on error: {}", config.crawler.stop_on_error);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_seconds);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!(
        "  Images: {} (download {})",
        config.output.image_directory,
        if config.output.download_images { "on" } else { "off" }
    );

    let limit = urls.len().min(config.crawler.max_urls);
    println!("\nURLs ({} of {}):", limit, urls.len());
    for url in urls.iter().take(limit) {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export mode: dumps stored products as JSON
fn handle_export(config: &Config, path: &Path) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let count = export_products(&store, path)
        .with_context(|| format!("failed to export to {}", path.display()))?;

    println!("✓ Exported {} products to: {}", count, path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    tracing::info!("Loaded {} URLs", urls.len());

    let store = open_store(config)?;
    let crawler = ProductCrawler::from_config(config, store)?;
    let mut orchestrator = CrawlOrchestrator::new(crawler, RunOptions::from(&config.crawler));

    let stats = orchestrator.run(urls).await.context("crawl failed")?;
    print_run_summary(&stats);

    Ok(())
}
