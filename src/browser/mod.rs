//! Headless browser driver abstraction.
//!
//! The collector only talks to these traits. [`webdriver`] implements them
//! on top of a WebDriver session; tests implement them over an in-memory site.

pub mod webdriver;

use crate::config::{BrowserOptions, Viewport};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub use webdriver::WebDriverLauncher;

/// What a navigation reported back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// HTTP status of the document response
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: HashMap<String, String>,
    /// URL the browser ended up on, when known
    pub final_url: Option<String>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Starts browsers
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser; a failed launch must not leave a process behind
    async fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn Browser>>;
}

/// A running browser, exclusively owned by one collection run
#[async_trait]
pub trait Browser: Send {
    async fn new_page(&mut self) -> Result<Box<dyn Page>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// A single tab
#[async_trait]
pub trait Page: Send {
    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()>;

    /// Navigate and wait for the load to settle
    ///
    /// `Ok(None)` means the browser produced no response for the document.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<Option<Response>>;

    /// Serialized DOM of the current document
    async fn content(&mut self) -> Result<String>;

    /// Run a script body in the page (it must `return` its value) and get the JSON result
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value>;

    async fn close(self: Box<Self>) -> Result<()>;
}
