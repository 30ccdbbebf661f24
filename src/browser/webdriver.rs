//! WebDriver implementation of the browser traits, using fantoccini.
//!
//! WebDriver has no response object, so status, headers and the final URL are
//! read back from the Navigation Timing API and `current_url` after each load.

use super::{Browser, BrowserLauncher, Page, Response};
use crate::config::{BrowserOptions, Viewport};
use crate::error::{CollectError, Result};
use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Tried in order when the configured WebDriver URL refuses the session
const FALLBACK_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Reads the document response's status and headers after a navigation
///
/// `document.lastModified` falls back to the current time when the server sent
/// no `Last-Modified` header, so values within a second of now are dropped.
const NAVIGATION_SNAPSHOT_SCRIPT: &str = r#"
const nav = performance.getEntriesByType('navigation')[0];
const modified = Date.parse(document.lastModified);
const served = !isNaN(modified) && Math.abs(Date.now() - modified) > 1000;
return {
    status: nav && nav.responseStatus ? nav.responseStatus : null,
    redirectCount: nav ? nav.redirectCount : 0,
    lastModified: served ? new Date(modified).toUTCString() : null,
    contentType: document.contentType || null
};
"#;

/// Reported for a redirect the browser followed on its own; the real 3xx is not observable
pub const FOLLOWED_REDIRECT_STATUS: u16 = 302;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigationSnapshot {
    status: Option<u16>,
    #[serde(default)]
    redirect_count: u32,
    last_modified: Option<String>,
    content_type: Option<String>,
}

/// Launches Chrome through a WebDriver server
#[derive(Debug, Default, Clone, Copy)]
pub struct WebDriverLauncher;

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn Browser>> {
        let client = connect(options).await?;
        Ok(Box::new(WebDriverBrowser {
            client,
            user_agent: options.user_agent.clone(),
        }))
    }
}

/// Session capabilities: launch arguments plus removal of the automation switch
pub fn capabilities(options: &BrowserOptions) -> Capabilities {
    let caps = json!({
        "browserName": "chrome",
        "goog:chromeOptions": {
            "args": options.chrome_args(),
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false
        }
    });
    match caps {
        serde_json::Value::Object(map) => map,
        _ => Capabilities::new(),
    }
}

async fn connect(options: &BrowserOptions) -> Result<Client> {
    let caps = capabilities(options);

    let mut candidates = vec![options.webdriver_url.as_str()];
    candidates.extend(
        FALLBACK_URLS
            .iter()
            .copied()
            .filter(|url| *url != options.webdriver_url),
    );

    let mut last_error = None;
    for url in candidates {
        let mut builder = ClientBuilder::native();
        builder.capabilities(caps.clone());
        match builder.connect(url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", url);
                return Ok(client);
            }
            Err(e) => {
                if url == options.webdriver_url {
                    ::log::warn!("Failed to connect to WebDriver at {}: {}", url, e);
                } else {
                    ::log::debug!("Fallback WebDriver {} unavailable: {}", url, e);
                }
                last_error = Some(e.to_string());
            }
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(CollectError::BrowserLaunchFailed(last_error.unwrap_or_else(
        || "no WebDriver URL to try".to_string(),
    )))
}

/// Build the response for a settled navigation from where the browser landed
///
/// Landing anywhere other than `requested` (fragments aside) surfaces as a
/// redirect to the landed URL, so the walker records it instead of filing the
/// landed document under the requested URL.
fn navigation_response(
    requested: &str,
    mut landed: Url,
    snapshot: NavigationSnapshot,
) -> Response {
    landed.set_fragment(None);
    let moved = match Url::parse(requested) {
        Ok(mut requested) => {
            requested.set_fragment(None);
            requested != landed
        }
        Err(_) => requested != landed.as_str(),
    };

    if moved {
        ::log::debug!(
            "{} was redirected to {} ({} hop(s))",
            requested,
            landed,
            snapshot.redirect_count
        );
        let mut response =
            Response::new(FOLLOWED_REDIRECT_STATUS).with_header("location", landed.as_str());
        response.final_url = Some(landed.to_string());
        return response;
    }

    // Browsers without responseStatus only reach this point on a rendered document
    let mut response = Response::new(snapshot.status.unwrap_or(200));
    if let Some(last_modified) = snapshot.last_modified {
        response = response.with_header("last-modified", &last_modified);
    }
    if let Some(content_type) = snapshot.content_type {
        response = response.with_header("content-type", &content_type);
    }
    response.final_url = Some(landed.to_string());
    response
}

/// One WebDriver session
pub struct WebDriverBrowser {
    client: Client,
    user_agent: String,
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn new_page(&mut self) -> Result<Box<dyn Page>> {
        // A session drives one window; the page shares the session handle
        Ok(Box::new(WebDriverPage {
            client: self.client.clone(),
            user_agent: self.user_agent.clone(),
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        ::log::debug!("Closing WebDriver session");
        self.client.close().await?;
        Ok(())
    }
}

/// The session's window
pub struct WebDriverPage {
    client: Client,
    user_agent: String,
}

#[async_trait]
impl Page for WebDriverPage {
    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.client
            .set_window_size(viewport.width, viewport.height)
            .await?;
        Ok(())
    }

    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        // WebDriver only accepts the user agent as a launch argument
        if user_agent == self.user_agent {
            Ok(())
        } else {
            Err(CollectError::driver(
                "the user agent is fixed when the WebDriver session starts",
            ))
        }
    }

    async fn goto(&mut self, url: &str, limit: Duration) -> Result<Option<Response>> {
        match timeout(limit, self.client.goto(url)).await {
            Err(_) => {
                return Err(CollectError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                });
            }
            Ok(result) => result?,
        }

        let final_url = self.client.current_url().await?;
        if final_url.scheme() == "chrome-error" {
            ::log::debug!("Browser error page after navigating to {}", url);
            return Ok(None);
        }

        let snapshot = match self.client.execute(NAVIGATION_SNAPSHOT_SCRIPT, Vec::new()).await {
            Ok(value) => serde_json::from_value::<NavigationSnapshot>(value).unwrap_or_default(),
            Err(e) => {
                ::log::debug!("Navigation snapshot failed on {}: {}", url, e);
                NavigationSnapshot::default()
            }
        };
        ::log::trace!(
            "{} settled on {} after {} redirect(s)",
            url,
            final_url,
            snapshot.redirect_count
        );

        Ok(Some(navigation_response(url, final_url, snapshot)))
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        Ok(self.client.execute(script, Vec::new()).await?)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        // Closing the only window would end the session; Browser::close does that
        Ok(())
    }
}
