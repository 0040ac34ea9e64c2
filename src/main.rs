//! SpellSpider main entry point
//!
//! This is the command-line interface for page discovery and content fetching.

use anyhow::Context;
use clap::{Parser, Subcommand};
use spellspider::config::{load_config, Config};
use spellspider::crawler::{Discoverer, PageFetcher, Progress};
use spellspider::url::normalize_target;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SpellSpider: find a website's pages and read their text
///
/// Pages are reached directly when possible and through public CORS relay
/// proxies otherwise. Discovery reads sitemaps first and falls back to the
/// links on the target page.
#[derive(Parser, Debug)]
#[command(name = "spellspider")]
#[command(version)]
#[command(about = "Website content discovery for copy audits", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the pages of a site, one URL per line
    Discover {
        /// Any URL on the site; `https://` is assumed when no scheme is given
        url: String,
    },

    /// Fetch one page and print its extracted text
    Fetch {
        /// The page to fetch; `https://` is assumed when no scheme is given
        url: String,

        /// Print the raw HTML instead of the extracted text
        #[arg(long)]
        html: bool,
    },
}

impl Command {
    /// The target URL as typed, with a scheme added when missing
    fn target(&self) -> String {
        match self {
            Self::Discover { url } | Self::Fetch { url, .. } => normalize_target(url),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let target = cli.command.target();

    match cli.command {
        Command::Discover { .. } => handle_discover(&config, &target, cli.quiet).await,
        Command::Fetch { html, .. } => handle_fetch(&config, &target, html).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spellspider=info,warn"),
            1 => EnvFilter::new("spellspider=debug,info"),
            2 => EnvFilter::new("spellspider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `discover`: prints progress to stderr and URLs to stdout
async fn handle_discover(config: &Config, url: &str, quiet: bool) -> anyhow::Result<()> {
    let discoverer = Discoverer::from_config(config).context("Failed to build HTTP client")?;

    let report = move |progress: Progress| {
        if !quiet {
            eprintln!("  {}", progress);
        }
    };

    let urls = discoverer
        .discover_urls(url, &report)
        .await
        .with_context(|| format!("Cannot discover pages for {}", url))?;

    tracing::info!("Discovery finished with {} URL(s)", urls.len());
    for url in urls {
        println!("{}", url);
    }

    Ok(())
}

/// Handles `fetch`: prints the title, word count and text of one page
async fn handle_fetch(config: &Config, url: &str, raw_html: bool) -> anyhow::Result<()> {
    let fetcher = PageFetcher::from_config(config).context("Failed to build HTTP client")?;

    let page = fetcher
        .fetch_page_content(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    if raw_html {
        println!("{}", page.html);
    } else {
        println!("Title: {}", page.title);
        println!("Words: {}", page.word_count());
        println!();
        println!("{}", page.text);
    }

    Ok(())
}
