use crate::results::{ButtonData, FormData, Headings, ImageData, LinkData, TechnicalData};
use crate::utils::{resolve_href, same_origin};
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use url::Url;

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn attr(el: &ElementRef, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn title(doc: &Html) -> String {
    doc.select(selector!("title"))
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

pub fn meta_description(doc: &Html) -> String {
    doc.select(selector!("meta[name]"))
        .find(|el| {
            el.value()
                .attr("name")
                .map(|n| n.eq_ignore_ascii_case("description"))
                .unwrap_or(false)
        })
        .and_then(|el| attr(&el, "content"))
        .unwrap_or_default()
}

/// Every meta tag keyed by its lower-cased `name`, `property` or `http-equiv`
///
/// The first occurrence of a key wins.
pub fn meta_tags(doc: &Html) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for el in doc.select(selector!("meta")) {
        let key = el
            .value()
            .attr("name")
            .or_else(|| el.value().attr("property"))
            .or_else(|| el.value().attr("http-equiv"));
        let (Some(key), Some(content)) = (key, el.value().attr("content")) else {
            continue;
        };
        tags.entry(key.trim().to_ascii_lowercase())
            .or_insert_with(|| content.trim().to_string());
    }
    tags
}

pub fn headings(doc: &Html) -> Headings {
    let mut headings = Headings::default();
    for el in doc.select(selector!("h1, h2, h3, h4, h5, h6")) {
        let text = element_text(&el);
        if text.is_empty() {
            continue;
        }
        let level = heading_level(&el);
        if let Some(list) = level.and_then(|l| headings.level_mut(l)) {
            list.push(text);
        }
    }
    headings
}

/// Heading levels in document order, empty headings included
pub fn heading_levels(doc: &Html) -> Vec<u8> {
    doc.select(selector!("h1, h2, h3, h4, h5, h6"))
        .filter_map(|el| heading_level(&el))
        .collect()
}

fn heading_level(el: &ElementRef) -> Option<u8> {
    el.value().name().trim_start_matches('h').parse::<u8>().ok()
}

pub fn images(doc: &Html, page_url: &Url) -> Vec<ImageData> {
    doc.select(selector!("img"))
        .filter_map(|el| {
            let src = attr(&el, "src").or_else(|| attr(&el, "data-src"))?;
            let src = page_url
                .join(&src)
                .map(|u| u.to_string())
                .unwrap_or(src);
            Some(ImageData {
                src,
                alt: el.value().attr("alt").map(|a| a.trim().to_string()),
                width: el.value().attr("width").and_then(|w| w.trim().parse().ok()),
                height: el.value().attr("height").and_then(|h| h.trim().parse().ok()),
                loading: attr(&el, "loading"),
            })
        })
        .collect()
}

/// Every navigable anchor resolved against the page, classified against `origin`
pub fn links(doc: &Html, page_url: &Url, origin: &Url) -> Vec<LinkData> {
    let mut links = Vec::new();
    for el in doc.select(selector!("a[href]")) {
        let Some(resolved) = el
            .value()
            .attr("href")
            .and_then(|href| resolve_href(page_url, href))
        else {
            continue;
        };

        links.push(LinkData {
            is_internal: same_origin(origin, &resolved),
            href: resolved.to_string(),
            text: anchor_text(&el),
            is_broken: false,
        });
    }
    links
}

/// Visible text, falling back to aria-label, title, then a nested image's alt
fn anchor_text(el: &ElementRef) -> String {
    let text = element_text(el);
    if !text.is_empty() {
        return text;
    }
    if let Some(label) = attr(el, "aria-label").or_else(|| attr(el, "title")) {
        return label;
    }
    el.select(selector!("img[alt]"))
        .find_map(|img| attr(&img, "alt"))
        .unwrap_or_default()
}

/// Raw `href` values of every anchor, for link discovery
pub fn anchor_hrefs(doc: &Html) -> Vec<String> {
    let hrefs = doc
        .select(selector!("a[href]"))
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.to_string())
        .collect::<Vec<String>>();

    ::log::trace!("HTML parser found {} anchors", hrefs.len());
    hrefs
}

pub fn forms(doc: &Html) -> Vec<FormData> {
    doc.select(selector!("form"))
        .map(|form| {
            let input_count = form
                .select(selector!("input, select, textarea"))
                .filter(|input| {
                    !matches!(
                        input.value().attr("type").map(str::to_ascii_lowercase).as_deref(),
                        Some("hidden" | "submit" | "button" | "reset" | "image")
                    )
                })
                .count();
            let has_submit = form
                .select(selector!(
                    "button:not([type]), button[type='submit'], input[type='submit'], input[type='image']"
                ))
                .next()
                .is_some();

            FormData {
                action: attr(&form, "action"),
                method: attr(&form, "method")
                    .map(|m| m.to_ascii_uppercase())
                    .unwrap_or_else(|| "GET".to_string()),
                input_count,
                has_submit,
            }
        })
        .collect()
}

pub fn buttons(doc: &Html) -> Vec<ButtonData> {
    let mut buttons = Vec::new();

    for el in doc.select(selector!("button")) {
        buttons.push(ButtonData {
            text: element_text(&el),
            kind: attr(&el, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "submit".to_string()),
        });
    }

    for el in doc.select(selector!(
        "input[type='submit'], input[type='button'], input[type='reset']"
    )) {
        buttons.push(ButtonData {
            text: attr(&el, "value").unwrap_or_default(),
            kind: attr(&el, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_default(),
        });
    }

    for el in doc.select(selector!("a[role='button'], a.btn, a.button")) {
        buttons.push(ButtonData {
            text: anchor_text(&el),
            kind: "link".to_string(),
        });
    }

    buttons
}

/// Frameworks and platforms recognisable from markup and script sources
const FRAMEWORK_HINTS: [(&str, &str); 8] = [
    ("react", "React"),
    ("vue", "Vue"),
    ("angular", "Angular"),
    ("jquery", "jQuery"),
    ("_next/", "Next.js"),
    ("wp-content", "WordPress"),
    ("cdn.shopify.com", "Shopify"),
    ("gatsby", "Gatsby"),
];

pub fn technical(doc: &Html, page_url: &Url) -> TechnicalData {
    let script_sources: Vec<String> = doc
        .select(selector!("script[src], link[href]"))
        .filter_map(|el| el.value().attr("src").or_else(|| el.value().attr("href")))
        .map(|s| s.to_ascii_lowercase())
        .collect();

    let mut frameworks: Vec<String> = Vec::new();
    let mut note = |name: &str| {
        if !frameworks.iter().any(|f| f == name) {
            frameworks.push(name.to_string());
        }
    };
    for (hint, name) in FRAMEWORK_HINTS {
        if script_sources.iter().any(|src| src.contains(hint)) {
            note(name);
        }
    }
    if doc.select(selector!("[data-reactroot], #root[data-reactroot]")).next().is_some() {
        note("React");
    }
    if doc.select(selector!("#__next")).next().is_some() {
        note("Next.js");
    }
    if doc.select(selector!("[ng-version]")).next().is_some() {
        note("Angular");
    }
    if doc.select(selector!("[data-v-app]")).next().is_some() {
        note("Vue");
    }

    TechnicalData {
        https: page_url.scheme() == "https",
        has_viewport: doc.select(selector!("meta[name='viewport']")).next().is_some(),
        charset: charset(doc),
        script_count: doc.select(selector!("script")).count(),
        stylesheet_count: doc.select(selector!("link[rel~='stylesheet']")).count(),
        frameworks,
        errors: Vec::new(),
    }
}

fn charset(doc: &Html) -> Option<String> {
    if let Some(el) = doc.select(selector!("meta[charset]")).next() {
        return attr(&el, "charset").map(|c| c.to_ascii_lowercase());
    }
    doc.select(selector!("meta[http-equiv]"))
        .filter_map(|el| el.value().attr("content"))
        .find_map(|content| {
            let lower = content.to_ascii_lowercase();
            let (_, rest) = lower.split_once("charset=")?;
            Some(rest.trim().trim_matches(';').to_string())
        })
}
