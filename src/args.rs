use clap::Parser;
use sitegauge::{AggregationScope, Collector, CollectError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitegauge")]
#[command(about = "Crawl a website and collect structured marketing data from every page")]
#[command(version)]
pub struct Args {
    /// Website to collect (http or https)
    pub url: String,

    /// Maximum number of pages to visit
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum link distance from the start page
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Per-page navigation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (overrides WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Crawl same-origin redirect targets instead of only recording them
    #[arg(long)]
    pub follow_redirects: bool,

    /// Score every collected page instead of the entry page only
    #[arg(long)]
    pub site_average: bool,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Build a collector from the config file (if any) and command-line overrides
pub fn build_collector(args: &Args) -> Result<Collector, CollectError> {
    let mut collector = Collector::new();
    if let Some(path) = &args.config {
        collector = collector.with_config_file(path)?;
    }
    if let Some(max_pages) = args.max_pages {
        collector = collector.with_max_pages(max_pages);
    }
    if let Some(max_depth) = args.max_depth {
        collector = collector.with_max_depth(max_depth);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        collector = collector.with_timeout_ms(timeout_ms);
    }
    if let Some(webdriver_url) = &args.webdriver_url {
        collector = collector.with_webdriver_url(webdriver_url);
    }
    if args.follow_redirects {
        collector = collector.with_follow_redirects(true);
    }
    if args.site_average {
        collector = collector.with_scope(AggregationScope::SiteAverage);
    }
    Ok(collector)
}
