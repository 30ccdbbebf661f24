//! Turns one rendered page into [`PageData`].
//!
//! The async entry point only talks to the driver; everything else happens in
//! [`extract_document`] over the page source, so the parsed tree never lives
//! across an await.

use crate::browser::Page;
use crate::parsers::{
    accessibility, analytics, classify, html, keywords, structured, text,
};
use crate::results::{ContentData, PageData, PagePerformance};
use scraper::Html;
use serde::Deserialize;
use url::Url;

/// Navigation and paint timings relative to navigation start
const TIMING_SCRIPT: &str = r#"
const nav = performance.getEntriesByType('navigation')[0];
const paint = {};
for (const entry of performance.getEntriesByType('paint')) {
    paint[entry.name] = entry.startTime;
}
if (nav) {
    return {
        loadTime: nav.loadEventEnd > 0 ? nav.loadEventEnd : nav.duration,
        domContentLoaded: nav.domContentLoadedEventEnd,
        firstPaint: paint['first-paint'] ?? null,
        firstContentfulPaint: paint['first-contentful-paint'] ?? null
    };
}
const t = performance.timing;
return {
    loadTime: t.loadEventEnd > 0 ? t.loadEventEnd - t.navigationStart : 0,
    domContentLoaded: t.domContentLoadedEventEnd > 0 ? t.domContentLoadedEventEnd - t.navigationStart : 0,
    firstPaint: paint['first-paint'] ?? null,
    firstContentfulPaint: paint['first-contentful-paint'] ?? null
};
"#;

/// Raw timings as returned by [`TIMING_SCRIPT`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTimings {
    pub load_time: f64,
    pub dom_content_loaded: f64,
    pub first_paint: Option<f64>,
    pub first_contentful_paint: Option<f64>,
}

impl From<RawTimings> for PagePerformance {
    fn from(raw: RawTimings) -> Self {
        PagePerformance {
            load_time: raw.load_time.max(0.0),
            dom_content_loaded: raw.dom_content_loaded.max(0.0),
            first_paint: raw.first_paint,
            first_contentful_paint: raw.first_contentful_paint,
            largest_contentful_paint: None,
            cumulative_layout_shift: None,
        }
    }
}

/// Extract everything from the document currently loaded in `page`
///
/// Never fails. An unreadable source is treated as an empty document and
/// failed timings as zero, both noted in `technical.errors`.
pub async fn extract(page: &mut dyn Page, url: &str, origin: &Url) -> PageData {
    let mut errors = Vec::new();

    let source = match page.content().await {
        Ok(source) => source,
        Err(e) => {
            ::log::warn!("Could not read page source of {}: {}", url, e);
            errors.push(format!("page source: {}", e));
            String::new()
        }
    };

    let timings = match page.evaluate(TIMING_SCRIPT).await {
        Ok(value) => serde_json::from_value::<RawTimings>(value).unwrap_or_else(|e| {
            errors.push(format!("performance timings: {}", e));
            RawTimings::default()
        }),
        Err(e) => {
            ::log::debug!("Timing script failed on {}: {}", url, e);
            errors.push(format!("performance timings: {}", e));
            RawTimings::default()
        }
    };

    let mut data = extract_document(&source, url, origin, timings);
    errors.append(&mut data.technical.errors);
    data.technical.errors = errors;
    data
}

/// Build [`PageData`] from page source and timings
pub fn extract_document(source: &str, url: &str, origin: &Url, timings: RawTimings) -> PageData {
    let page_url = match Url::parse(url) {
        Ok(page_url) => page_url,
        Err(e) => {
            ::log::warn!("Extracting {} against the crawl origin: {}", url, e);
            origin.clone()
        }
    };
    let doc = Html::parse_document(source);
    let mut errors = Vec::new();

    let title = html::title(&doc);
    let meta_description = html::meta_description(&doc);
    let meta_tags = html::meta_tags(&doc);
    let headings = html::headings(&doc);
    let heading_levels = html::heading_levels(&doc);

    let body_text = text::visible_text(&doc);
    let images = html::images(&doc, &page_url);
    let links = html::links(&doc, &page_url, origin);

    let heading_texts: Vec<&str> = headings.all().map(String::as_str).collect();
    let alt_texts: Vec<&str> = images
        .iter()
        .filter_map(|img| img.alt.as_deref())
        .filter(|alt| !alt.is_empty())
        .collect();
    let keywords = keywords::keyword_data(
        meta_tags.get("keywords").map(String::as_str).unwrap_or_default(),
        &body_text,
        &heading_texts,
        &alt_texts,
    );

    let seo = structured::seo(&doc, &page_url, &mut errors);
    let mut technical = html::technical(&doc, &page_url);
    technical.errors = errors;

    let classification = classify::classify(&format!("{} {} {}", title, meta_description, body_text));

    ::log::debug!(
        "Extracted {}: {} words, {} links, {} images",
        url,
        text::word_count(&body_text),
        links.len(),
        images.len()
    );

    PageData {
        url: url.to_string(),
        title,
        meta_description,
        analytics: analytics::detect(&doc),
        accessibility: accessibility::accessibility(&doc, &heading_levels),
        content: ContentData {
            word_count: text::word_count(&body_text),
            text: body_text,
            images,
            links,
            forms: html::forms(&doc),
            buttons: html::buttons(&doc),
        },
        headings,
        meta_tags,
        keywords,
        performance: timings.into(),
        seo,
        technical,
        classification,
    }
}
