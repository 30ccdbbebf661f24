use crate::utils::same_origin;
use regex::Regex;
use url::Url;

/// Assets a browser would download rather than render as a page
pub const ASSET_PATTERN: &str =
    r"(?i)\.(jpg|jpeg|png|gif|webp|avif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip|gz|mp4|mp3|xml|json)$";

/// Configuration for URL filtering in the walker
#[derive(Debug, Clone)]
pub struct UrlFilterConfig {
    /// Only URLs with exactly this origin are crawled
    pub origin: Url,

    /// Regex patterns for URLs to exclude, matched against the full URL
    pub exclude_patterns: Vec<String>,
}

impl UrlFilterConfig {
    /// Same-origin filter for `seed` with the default asset exclusions plus `extra`
    pub fn for_seed(seed: &Url, extra: &[String]) -> Self {
        let mut exclude_patterns = vec![ASSET_PATTERN.to_string()];
        exclude_patterns.extend(extra.iter().cloned());
        Self {
            origin: seed.clone(),
            exclude_patterns,
        }
    }
}

/// Decides which discovered URLs the walker may enqueue
#[derive(Debug)]
pub struct UrlFilter {
    origin: Url,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            origin: config.origin,
            exclude_regexes,
        })
    }

    /// Whether `url` shares the crawl's origin
    pub fn is_internal(&self, url: &Url) -> bool {
        same_origin(&self.origin, url)
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !self.is_internal(url) {
            return false;
        }

        // Exclusions are checked against the path so query strings don't hide extensions
        let path = url.path();
        let full = url.as_str();
        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(path) || regex.is_match(full))
    }

    /// Strip the fragment so `/a#x` and `/a#y` are the same page
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
