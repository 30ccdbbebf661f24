use crate::aggregate::aggregate;
use crate::browser::{Browser, BrowserLauncher, Page, WebDriverLauncher};
use crate::config::{AggregationScope, CollectorConfig, CrawlTarget};
use crate::crawlers::Walker;
use crate::error::{CollectError, Result};
use crate::extractor;
use crate::parsers::block;
use crate::results::{BlockedPage, ComprehensiveCollectionResult, SkippedPage};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main entry point: crawls a site and collects structured data from every page
///
/// Holds configuration only. Each [`Collector::collect`] call launches its
/// own browser and closes it before returning.
pub struct Collector {
    config: CollectorConfig,
    launcher: Arc<dyn BrowserLauncher>,
    cancel: Option<CancellationToken>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    /// Collector with default configuration driving Chrome over WebDriver
    pub fn new() -> Self {
        let mut config = CollectorConfig::default();
        config.apply_env();
        Self {
            config,
            launcher: Arc::new(WebDriverLauncher),
            cancel: None,
        }
    }

    /// Use a different browser driver
    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let mut config = CollectorConfig::from_file(path)?;
        config.apply_env();
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let mut config = CollectorConfig::from_json(config_str)?;
        config.apply_env();
        Ok(self.with_config(config))
    }

    /// Set the maximum number of pages visited
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the maximum link distance from the seed
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the per-navigation timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    pub fn with_scope(mut self, scope: AggregationScope) -> Self {
        self.config.scope = scope;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.config.browser.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Stop the run at the next page boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Crawl `url` and return the assembled result
    ///
    /// The browser is closed on every path out of this function.
    pub async fn collect(&self, url: &str) -> Result<ComprehensiveCollectionResult> {
        let target = CrawlTarget::from_config(url, &self.config)?;
        ::log::info!("Collecting {}", target.url);

        let mut browser = self
            .launcher
            .launch(&self.config.browser)
            .await
            .map_err(|e| match e {
                CollectError::BrowserLaunchFailed(_) => e,
                other => CollectError::BrowserLaunchFailed(other.to_string()),
            })?;

        let outcome = self.run(browser.as_mut(), &target).await;

        if let Err(e) = browser.close().await {
            ::log::warn!("Failed to close browser: {}", e);
        }

        outcome.map_err(|e| {
            if e.is_per_page() {
                CollectError::Unhandled(e.to_string())
            } else {
                e
            }
        })
    }

    async fn run(
        &self,
        browser: &mut dyn Browser,
        target: &CrawlTarget,
    ) -> Result<ComprehensiveCollectionResult> {
        let mut page = browser.new_page().await?;
        let outcome = self.run_on_page(page.as_mut(), target).await;
        if let Err(e) = page.close().await {
            ::log::debug!("Failed to close page: {}", e);
        }
        outcome
    }

    async fn run_on_page(
        &self,
        page: &mut dyn Page,
        target: &CrawlTarget,
    ) -> Result<ComprehensiveCollectionResult> {
        page.set_viewport(self.config.browser.viewport).await?;
        page.set_user_agent(&self.config.browser.user_agent).await?;

        let site_map = Walker::new(target, &self.config)?
            .with_cancellation(self.cancel.clone())
            .walk(page)
            .await?;

        let mut pages = Vec::new();
        let mut blocked_pages = Vec::new();
        let mut skipped_pages = Vec::new();

        for entry in site_map.sitemap.iter().take(target.max_pages) {
            if self.is_cancelled() {
                ::log::warn!("Collection of {} cancelled", target.url);
                return Err(CollectError::Cancelled);
            }

            let reason = match page.goto(&entry.url, target.timeout()).await {
                Ok(Some(response)) if response.is_redirect() || response.is_error() => {
                    Some(format!("HTTP {}", response.status))
                }
                Ok(Some(_)) => None,
                Ok(None) => Some("no response".to_string()),
                Err(CollectError::NavigationTimeout { .. }) => Some("timeout".to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = reason {
                ::log::warn!("Skipping {}: {}", entry.url, reason);
                skipped_pages.push(SkippedPage {
                    url: entry.url.clone(),
                    reason,
                });
                continue;
            }

            let data = extractor::extract(page, &entry.url, &target.url).await;
            match block::detect(&data.title, &data.content.text, &self.config.block_signatures) {
                Some(signature) => {
                    ::log::warn!("{} looks like a block page ({})", entry.url, signature);
                    blocked_pages.push(BlockedPage {
                        url: entry.url.clone(),
                        signature,
                    });
                }
                None => pages.push(data),
            }
        }

        if pages.is_empty() {
            if let Some(first) = blocked_pages.first() {
                return Err(CollectError::BlockedByTarget {
                    url: first.url.clone(),
                    signature: first.signature.clone(),
                });
            }
        }

        let aggregation = aggregate(&pages, self.config.scope);
        ::log::info!(
            "Collected {} pages from {} ({} blocked, {} skipped, overall score {})",
            pages.len(),
            target.url,
            blocked_pages.len(),
            skipped_pages.len(),
            aggregation.summary.overall_score
        );

        Ok(ComprehensiveCollectionResult {
            url: target.url.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            pages,
            site_map,
            performance: aggregation.performance,
            seo: aggregation.seo,
            content: aggregation.content,
            technical: aggregation.technical,
            user_experience: aggregation.user_experience,
            summary: aggregation.summary,
            blocked_pages,
            skipped_pages,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DEFAULT_SCORE;
    use crate::testing::{FakeLauncher, FakeSite, html_page};

    fn url(path: &str) -> String {
        format!("https://example.com{}", path)
    }

    fn collector(launcher: FakeLauncher) -> Collector {
        Collector::new().with_launcher(Arc::new(launcher))
    }

    fn three_pages() -> FakeSite {
        FakeSite::new()
            .page(
                &url("/"),
                &html_page(
                    "Home",
                    "Enterprise analytics platform for teams",
                    &["/pricing", "/about"],
                ),
            )
            .page(&url("/pricing"), &html_page("Pricing", "Plans and pricing", &["/"]))
            .page(&url("/about"), &html_page("About", "Our company", &["/pricing"]))
    }

    #[tokio::test]
    async fn test_three_page_site() {
        let launcher = FakeLauncher::new(three_pages());
        let log = launcher.log();
        let result = collector(launcher).collect("https://example.com").await.unwrap();

        assert_eq!(result.url, url("/"));
        assert_eq!(result.site_map.total_pages, 3);
        assert_eq!(result.pages.len(), 3);
        assert_eq!(result.summary.total_pages, 3);
        let urls: Vec<&str> = result.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec![url("/"), url("/pricing"), url("/about")]);
        for page in &result.pages {
            assert_eq!(
                result
                    .site_map
                    .sitemap
                    .iter()
                    .filter(|e| e.url == page.url)
                    .count(),
                1
            );
        }
        assert_eq!(result.pages[0].title, "Home");
        assert_eq!(result.pages[0].performance.load_time, 640.0);
        assert!(result.blocked_pages.is_empty());
        assert!(result.skipped_pages.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
        assert!(log.browser_closed());
        assert_eq!(log.launches(), 1);
    }

    #[tokio::test]
    async fn test_broken_link_recorded() {
        let site = FakeSite::new().page(&url("/"), &html_page("Home", "Hello", &["/gone"]));
        let result = collector(FakeLauncher::new(site))
            .collect("https://example.com/")
            .await
            .unwrap();

        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.site_map.broken_links.len(), 1);
        assert_eq!(result.site_map.broken_links[0].url, url("/gone"));
        assert_eq!(result.site_map.broken_links[0].status, Some(404));
    }

    #[tokio::test]
    async fn test_max_pages_one() {
        let result = collector(FakeLauncher::new(three_pages()))
            .with_max_pages(1)
            .collect("https://example.com/")
            .await
            .unwrap();
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.site_map.total_pages, 1);
    }

    #[tokio::test]
    async fn test_block_page_excluded() {
        let site = FakeSite::new()
            .page(&url("/"), &html_page("Home", "Welcome", &["/members"]))
            .page(
                &url("/members"),
                &html_page("Access Denied", "You don't have permission", &[]),
            );
        let result = collector(FakeLauncher::new(site))
            .collect("https://example.com/")
            .await
            .unwrap();

        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.blocked_pages.len(), 1);
        assert_eq!(result.blocked_pages[0].url, url("/members"));
        assert_eq!(result.blocked_pages[0].signature, "Access Denied");
        assert!(result.pages.iter().all(|p| p.title != "Access Denied"));
    }

    #[tokio::test]
    async fn test_fully_blocked_site_fails() {
        let site = FakeSite::new().page(
            &url("/"),
            &html_page("Just a moment...", "Checking your browser", &[]),
        );
        let launcher = FakeLauncher::new(site);
        let log = launcher.log();
        let result = collector(launcher).collect("https://example.com/").await;

        match result {
            Err(CollectError::BlockedByTarget { url: blocked, signature }) => {
                assert_eq!(blocked, url("/"));
                assert_eq!(signature, "Just a moment...");
            }
            other => panic!("expected BlockedByTarget, got {:?}", other.map(|r| r.url)),
        }
        assert!(log.browser_closed());
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let launcher = FakeLauncher::new(three_pages()).failing_launch();
        let result = collector(launcher).collect("https://example.com/").await;
        assert!(matches!(result, Err(CollectError::BrowserLaunchFailed(_))));
    }

    #[tokio::test]
    async fn test_browser_closed_when_page_setup_fails() {
        let launcher = FakeLauncher::new(three_pages()).failing_new_page();
        let log = launcher.log();
        let result = collector(launcher).collect("https://example.com/").await;

        assert!(matches!(result, Err(CollectError::Unhandled(_))));
        assert!(log.browser_closed());
    }

    #[tokio::test]
    async fn test_cancelled_run_closes_browser() {
        let token = CancellationToken::new();
        token.cancel();
        let launcher = FakeLauncher::new(three_pages());
        let log = launcher.log();
        let result = collector(launcher)
            .with_cancellation(token)
            .collect("https://example.com/")
            .await;

        assert!(matches!(result, Err(CollectError::Cancelled)));
        assert!(log.visits().is_empty());
        assert!(log.browser_closed());
    }

    #[tokio::test]
    async fn test_invalid_target_never_launches() {
        let launcher = FakeLauncher::new(three_pages());
        let log = launcher.log();
        let result = collector(launcher).collect("ftp://example.com/").await;

        assert!(matches!(result, Err(CollectError::InvalidTarget(_))));
        assert_eq!(log.launches(), 0);
    }

    #[tokio::test]
    async fn test_scope_changes_category_scores() {
        let site = FakeSite::new()
            .page(&url("/"), &html_page("Home", "Welcome", &["/bare"]))
            .page(&url("/bare"), "<html><body>bare</body></html>");

        let entry = collector(FakeLauncher::new(site.clone()))
            .collect("https://example.com/")
            .await
            .unwrap();
        let site_wide = collector(FakeLauncher::new(site))
            .with_scope(AggregationScope::SiteAverage)
            .collect("https://example.com/")
            .await
            .unwrap();

        assert_eq!(entry.pages.len(), 2);
        assert!(site_wide.summary.user_experience_score < entry.summary.user_experience_score);
        assert_eq!(entry.content, site_wide.content);
        assert_ne!(entry.summary.performance_score, DEFAULT_SCORE);
    }

    #[tokio::test]
    async fn test_config_string() {
        let collector = Collector::new()
            .with_config_str(r#"{"max_pages": 7, "follow_redirects": true, "scope": "site_average"}"#)
            .unwrap();
        assert_eq!(collector.config().max_pages, 7);
        assert_eq!(collector.config().max_depth, 3);
        assert!(collector.config().follow_redirects);
        assert_eq!(collector.config().scope, AggregationScope::SiteAverage);
    }
}
