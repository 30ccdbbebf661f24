pub mod aggregate;
pub mod browser;
pub mod collector;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for convenience
pub use collector::Collector;
pub use config::{AggregationScope, CollectorConfig, CrawlTarget};
pub use error::{CollectError, Result};
pub use results::{ComprehensiveCollectionResult, PageData, SiteMapData};

/// Collect `url` with the default configuration over WebDriver
pub async fn collect(url: &str) -> Result<ComprehensiveCollectionResult> {
    Collector::new().collect(url).await
}
