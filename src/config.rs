use crate::error::{CollectError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration for one collector instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Maximum number of pages visited by the walker
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link distance from the seed URL
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Per-navigation timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Enqueue same-origin redirect targets instead of only recording them
    #[serde(default)]
    pub follow_redirects: bool,

    /// Page set the performance/SEO/technical/UX rollups are computed over
    #[serde(default)]
    pub scope: AggregationScope,

    /// Text fragments identifying block pages (matched case-insensitively)
    #[serde(default = "default_block_signatures")]
    pub block_signatures: Vec<String>,

    /// Extra regex patterns for URLs the walker must never enqueue
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Browser launch options
    #[serde(default)]
    pub browser: BrowserOptions,
}

/// Browser launch options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pass --no-sandbox; needed inside most containers
    #[serde(default = "default_true")]
    pub disable_sandbox: bool,

    /// Viewport applied to the shared page
    #[serde(default)]
    pub viewport: Viewport,

    /// Desktop user agent presented to the target
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Additional browser command-line arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Which pages feed the performance, SEO, technical and UX rollups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationScope {
    /// Only the entry (seed) page
    #[default]
    EntryPage,
    /// Every collected page; scores are per-page means
    SiteAverage,
}

fn default_max_pages() -> usize {
    50
}

fn default_max_depth() -> usize {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .to_string()
}

fn default_block_signatures() -> Vec<String> {
    [
        "Access Denied",
        "403 Forbidden",
        "Attention Required! | Cloudflare",
        "Just a moment...",
        "Request unsuccessful",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            disable_sandbox: true,
            viewport: Viewport::default(),
            user_agent: default_user_agent(),
            extra_args: Vec::new(),
        }
    }
}

impl BrowserOptions {
    /// Chrome command-line arguments derived from these options
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if self.disable_sandbox {
            args.push("--no-sandbox".to_string());
            args.push("--disable-setuid-sandbox".to_string());
        }
        args.push("--disable-dev-shm-usage".to_string());
        args.push("--disable-gpu".to_string());
        args.push("--disable-blink-features=AutomationControlled".to_string());
        args.push(format!(
            "--window-size={},{}",
            self.viewport.width, self.viewport.height
        ));
        args.push(format!("--user-agent={}", self.user_agent));
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            timeout_ms: default_timeout_ms(),
            follow_redirects: false,
            scope: AggregationScope::default(),
            block_signatures: default_block_signatures(),
            exclude_patterns: Vec::new(),
            browser: BrowserOptions::default(),
        }
    }
}

impl CollectorConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply the WEBDRIVER_URL environment override, if set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.browser.webdriver_url = webdriver_url;
            }
        }
    }
}

/// An origin URL plus the bounds of one collection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub max_pages: usize,
    pub max_depth: usize,
    pub timeout_ms: u64,
}

impl CrawlTarget {
    pub fn new(url: &str, max_pages: usize, max_depth: usize, timeout_ms: u64) -> Result<Self> {
        let mut parsed = Url::parse(url.trim())
            .map_err(|e| CollectError::InvalidTarget(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CollectError::InvalidTarget(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                url
            )));
        }
        if max_pages == 0 {
            return Err(CollectError::InvalidTarget(
                "max_pages must be at least 1".to_string(),
            ));
        }
        parsed.set_fragment(None);

        Ok(Self {
            url: parsed,
            max_pages,
            max_depth,
            timeout_ms,
        })
    }

    /// Build a target from a seed URL and the bounds in `config`
    pub fn from_config(url: &str, config: &CollectorConfig) -> Result<Self> {
        Self::new(url, config.max_pages, config.max_depth, config.timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
