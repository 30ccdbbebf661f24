use thiserror::Error;

/// Errors surfaced by a collection run.
///
/// Only `BrowserLaunchFailed`, `BlockedByTarget`, `InvalidTarget`, `Config`,
/// `Cancelled` and `Unhandled` ever escape [`crate::Collector::collect`].
/// Navigation and driver errors are per-page and end up in the broken-link
/// or skipped-page lists instead.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The browser (or WebDriver session) could not be started
    #[error("browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    /// A navigation did not settle within the configured timeout
    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// The target served a block page instead of real content
    #[error("blocked by target at {url} (matched \"{signature}\")")]
    BlockedByTarget { url: String, signature: String },

    /// A driver command failed
    #[error("driver error: {0}")]
    Driver(String),

    /// The seed URL or crawl bounds are unusable
    #[error("invalid crawl target: {0}")]
    InvalidTarget(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// The run was cancelled through its cancellation token
    #[error("collection cancelled")]
    Cancelled,

    /// Anything else; fatal for the run
    #[error("unhandled collection error: {0}")]
    Unhandled(String),
}

impl CollectError {
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Whether this error only affects a single page.
    pub fn is_per_page(&self) -> bool {
        matches!(self, Self::NavigationTimeout { .. } | Self::Driver(_))
    }
}

impl From<fantoccini::error::CmdError> for CollectError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        Self::Driver(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for CollectError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        Self::BrowserLaunchFailed(err.to_string())
    }
}

impl From<std::io::Error> for CollectError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CollectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CollectError>;
