use super::frontier::{Frontier, QueuedUrl};
use crate::browser::{Page, Response};
use crate::config::{CollectorConfig, CrawlTarget};
use crate::error::{CollectError, Result};
use crate::filter::{UrlFilter, UrlFilterConfig};
use crate::parsers::{self, ParserType};
use crate::results::{
    BrokenLink, ChangeFrequency, RedirectData, RedirectType, SiteMapData, SitemapEntry,
};
use crate::utils::{priority_for_depth, resolve_href, same_origin};
use scraper::Html;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Breadth-first walk over one site, producing its sitemap
pub struct Walker<'a> {
    target: &'a CrawlTarget,
    filter: UrlFilter,
    follow_redirects: bool,
    cancel: Option<CancellationToken>,
}

/// Mutable state of one walk
struct WalkState {
    frontier: Frontier,
    site_map: SiteMapData,
    /// URLs some crawled page linked to, other than itself
    linked: HashSet<String>,
}

impl<'a> Walker<'a> {
    pub fn new(target: &'a CrawlTarget, config: &CollectorConfig) -> Result<Self> {
        let filter = UrlFilter::new(UrlFilterConfig::for_seed(
            &target.url,
            &config.exclude_patterns,
        ))
        .map_err(|e| CollectError::Config(format!("invalid exclude pattern: {}", e)))?;

        Ok(Self {
            target,
            filter,
            follow_redirects: config.follow_redirects,
            cancel: None,
        })
    }

    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    /// Walk from the seed until the frontier drains or a bound is hit
    ///
    /// Per-page failures become broken-link entries; the only error is cancellation.
    pub async fn walk(&self, page: &mut dyn Page) -> Result<SiteMapData> {
        ::log::info!(
            "Walking {} (max {} pages, depth {})",
            self.target.url,
            self.target.max_pages,
            self.target.max_depth
        );

        let mut state = WalkState {
            frontier: Frontier::new(&self.target.url, self.target.max_pages, self.target.max_depth),
            site_map: SiteMapData::default(),
            linked: HashSet::new(),
        };

        loop {
            if self.cancel.as_ref().map(|t| t.is_cancelled()).unwrap_or(false) {
                ::log::warn!("Walk of {} cancelled", self.target.url);
                return Err(CollectError::Cancelled);
            }
            let Some(item) = state.frontier.next_url() else {
                break;
            };
            self.visit(page, item, &mut state).await;
        }

        Ok(self.finish(state))
    }

    async fn visit(&self, page: &mut dyn Page, item: QueuedUrl, state: &mut WalkState) {
        let url = item.url.to_string();
        ::log::debug!("Visiting {} (depth {})", url, item.depth);

        let response = match page.goto(&url, self.target.timeout()).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                ::log::warn!("No response for {}", url);
                state.site_map.broken_links.push(BrokenLink {
                    url,
                    status: None,
                    reason: "no response".to_string(),
                });
                return;
            }
            Err(e) => {
                ::log::warn!("Navigation to {} failed: {}", url, e);
                let reason = match e {
                    CollectError::NavigationTimeout { .. } => "timeout".to_string(),
                    other => other.to_string(),
                };
                state.site_map.broken_links.push(BrokenLink {
                    url,
                    status: None,
                    reason,
                });
                return;
            }
        };

        if response.is_redirect() {
            self.record_redirect(&item, &response, state);
            return;
        }

        if response.is_error() {
            ::log::info!("{} returned HTTP {}", url, response.status);
            state.site_map.broken_links.push(BrokenLink {
                url,
                status: Some(response.status),
                reason: format!("HTTP {}", response.status),
            });
            return;
        }

        // Drivers that follow redirects themselves report the landed document here
        let landed = response
            .final_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| item.url.clone());
        if !same_origin(&landed, &item.url) {
            ::log::info!("{} left the site for {}", url, landed);
            state.site_map.broken_links.push(BrokenLink {
                url,
                status: Some(response.status),
                reason: format!("landed off-site on {}", landed),
            });
            return;
        }

        state.site_map.sitemap.push(SitemapEntry {
            url: url.clone(),
            depth: item.depth,
            priority: priority_for_depth(item.depth),
            last_modified: response
                .header("last-modified")
                .or_else(|| response.header("date"))
                .map(str::to_string),
            change_frequency: ChangeFrequency::Weekly,
        });

        let parser_type = ParserType::detect(&url, response.header("content-type"));
        if !parser_type.should_extract_links() {
            ::log::debug!("Not extracting links from {:?} document {}", parser_type, url);
            return;
        }

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                ::log::warn!("Could not read {} for link discovery: {}", url, e);
                return;
            }
        };

        let mut queued = 0;
        for link in self.discover_links(&html, &landed) {
            if link != item.url {
                state.linked.insert(link.as_str().to_string());
            }
            if state.frontier.enqueue(link, item.depth + 1) {
                queued += 1;
            }
        }
        ::log::info!("Queued {} new links from {}", queued, url);
    }

    /// Same-origin crawlable links in `html`, normalised and de-duplicated in document order
    fn discover_links(&self, html: &str, base: &Url) -> Vec<Url> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        parsers::html::anchor_hrefs(&doc)
            .iter()
            .filter_map(|href| resolve_href(base, href))
            .filter(|resolved| {
                let accepted = self.filter.should_crawl(resolved);
                if !accepted {
                    ::log::trace!("URL filter rejected: {}", resolved);
                }
                accepted
            })
            .map(|resolved| self.filter.normalize_url(&resolved))
            .filter(|url| seen.insert(url.as_str().to_string()))
            .collect()
    }

    fn record_redirect(&self, item: &QueuedUrl, response: &Response, state: &mut WalkState) {
        let target = response
            .header("location")
            .and_then(|location| item.url.join(location).ok())
            .or_else(|| {
                response
                    .final_url
                    .as_deref()
                    .and_then(|u| Url::parse(u).ok())
            });

        ::log::info!(
            "{} redirected ({}) to {}",
            item.url,
            response.status,
            target.as_ref().map(Url::as_str).unwrap_or("<unknown>")
        );
        state.site_map.redirects.push(RedirectData {
            from: item.url.to_string(),
            to: target.as_ref().map(Url::to_string).unwrap_or_default(),
            status: response.status,
            redirect_type: RedirectType::from_status(response.status),
        });

        if !self.follow_redirects {
            return;
        }
        if let Some(target) = target {
            let target = self.filter.normalize_url(&target);
            if self.filter.should_crawl(&target) && state.frontier.enqueue(target.clone(), item.depth)
            {
                ::log::debug!("Following redirect to {}", target);
            }
        }
    }

    fn finish(&self, state: WalkState) -> SiteMapData {
        let WalkState {
            frontier,
            mut site_map,
            linked,
        } = state;

        let seed = self.target.url.as_str();
        site_map.orphaned_pages = site_map
            .sitemap
            .iter()
            .filter(|entry| entry.url != seed && !linked.contains(&entry.url))
            .map(|entry| entry.url.clone())
            .collect();
        site_map.total_pages = site_map.sitemap.len();
        site_map.depth = site_map.sitemap.iter().map(|e| e.depth).max().unwrap_or(0);

        ::log::info!(
            "Walk finished: {} pages, {} broken, {} redirects, {} visited",
            site_map.total_pages,
            site_map.broken_links.len(),
            site_map.redirects.len(),
            frontier.visited_count()
        );
        site_map
    }
}
