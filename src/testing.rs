//! In-memory site behind the browser traits, for tests.

use crate::browser::{Browser, BrowserLauncher, Page, Response};
use crate::config::{BrowserOptions, Viewport};
use crate::error::{CollectError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Resource {
    Document { status: u16, body: String },
    Redirect { status: u16, location: String },
    /// Followed inside the browser: answers 200 with the landed page's body
    Landed { url: String, body: String },
    Timeout,
    NoResponse,
}

/// URL to canned response map; unknown URLs answer 404
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    resources: HashMap<String, Resource>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, body: &str) -> Self {
        self.status(url, 200, body)
    }

    pub fn status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.resources.insert(
            url.to_string(),
            Resource::Document {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn redirect(mut self, url: &str, status: u16, location: &str) -> Self {
        self.resources.insert(
            url.to_string(),
            Resource::Redirect {
                status,
                location: location.to_string(),
            },
        );
        self
    }

    /// `url` redirects to `landed` without the 3xx ever reaching the caller
    pub fn lands_on(mut self, url: &str, landed: &str, body: &str) -> Self {
        self.resources.insert(
            url.to_string(),
            Resource::Landed {
                url: landed.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn timeout(mut self, url: &str) -> Self {
        self.resources.insert(url.to_string(), Resource::Timeout);
        self
    }

    pub fn no_response(mut self, url: &str) -> Self {
        self.resources.insert(url.to_string(), Resource::NoResponse);
        self
    }
}

/// Minimal HTML page linking to `links`
pub fn html_page(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><title>{}</title></head>\
         <body><main><h1>{}</h1><p>{}</p><nav>{}</nav></main></body></html>",
        title, title, body, anchors
    )
}

/// Shared view into what the fake browser did
#[derive(Debug, Clone, Default)]
pub struct FakeLog {
    visits: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    launches: Arc<AtomicUsize>,
}

impl FakeLog {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn browser_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

pub struct FakeLauncher {
    site: Arc<FakeSite>,
    log: FakeLog,
    fail_launch: bool,
    fail_new_page: bool,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            log: FakeLog::default(),
            fail_launch: false,
            fail_new_page: false,
        }
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_new_page(mut self) -> Self {
        self.fail_new_page = true;
        self
    }

    pub fn log(&self) -> FakeLog {
        self.log.clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _options: &BrowserOptions) -> Result<Box<dyn Browser>> {
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(CollectError::BrowserLaunchFailed(
                "chrome exited during startup".to_string(),
            ));
        }
        Ok(Box::new(FakeBrowser {
            site: self.site.clone(),
            log: self.log.clone(),
            fail_new_page: self.fail_new_page,
        }))
    }
}

pub struct FakeBrowser {
    site: Arc<FakeSite>,
    log: FakeLog,
    fail_new_page: bool,
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&mut self) -> Result<Box<dyn Page>> {
        if self.fail_new_page {
            return Err(CollectError::driver("target window already closed"));
        }
        Ok(Box::new(FakePage::new(self.site.clone(), self.log.clone())))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    site: Arc<FakeSite>,
    log: FakeLog,
    current: Option<String>,
}

impl FakePage {
    pub fn new(site: Arc<FakeSite>, log: FakeLog) -> Self {
        Self {
            site,
            log,
            current: None,
        }
    }

    /// A page over `site` with a fresh log
    pub fn over(site: FakeSite) -> (Self, FakeLog) {
        let log = FakeLog::default();
        (Self::new(Arc::new(site), log.clone()), log)
    }
}

#[async_trait]
impl Page for FakePage {
    async fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        Ok(())
    }

    async fn set_user_agent(&mut self, _user_agent: &str) -> Result<()> {
        Ok(())
    }

    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<Option<Response>> {
        if let Ok(mut visits) = self.log.visits.lock() {
            visits.push(url.to_string());
        }
        self.current = None;

        match self.site.resources.get(url) {
            Some(Resource::Document { status, body }) => {
                self.current = Some(body.clone());
                Ok(Some(
                    Response::new(*status)
                        .with_header("content-type", "text/html; charset=utf-8")
                        .with_header("last-modified", "Tue, 01 Oct 2024 10:00:00 GMT"),
                ))
            }
            Some(Resource::Redirect { status, location }) => {
                Ok(Some(Response::new(*status).with_header("location", location)))
            }
            Some(Resource::Landed { url: landed, body }) => {
                self.current = Some(body.clone());
                let mut response =
                    Response::new(200).with_header("content-type", "text/html; charset=utf-8");
                response.final_url = Some(landed.clone());
                Ok(Some(response))
            }
            Some(Resource::Timeout) => Err(CollectError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Some(Resource::NoResponse) => Ok(None),
            None => {
                self.current = Some("<html><head><title>Not Found</title></head></html>".to_string());
                Ok(Some(Response::new(404)))
            }
        }
    }

    async fn content(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| CollectError::driver("no document loaded"))
    }

    async fn evaluate(&mut self, _script: &str) -> Result<serde_json::Value> {
        Ok(json!({
            "loadTime": 640.0,
            "domContentLoaded": 310.0,
            "firstPaint": 120.0,
            "firstContentfulPaint": 150.0
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
