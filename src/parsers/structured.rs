//! SEO metadata: canonical/robots, social cards, hreflang and structured data.

use crate::results::{Hreflang, MicrodataItem, SeoData, StructuredData};
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use url::Url;

/// Collect the page's SEO metadata
///
/// Malformed JSON-LD blocks are skipped and described in `errors`.
pub fn seo(doc: &Html, page_url: &Url, errors: &mut Vec<String>) -> SeoData {
    SeoData {
        canonical_url: canonical(doc, page_url),
        robots: robots(doc),
        open_graph: prefixed_meta(doc, "og:"),
        twitter_card: prefixed_meta(doc, "twitter:"),
        structured_data: StructuredData {
            json_ld: json_ld(doc, errors),
            microdata: microdata(doc),
        },
        hreflang: hreflang(doc, page_url),
        language: doc
            .select(selector!("html[lang]"))
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
    }
}

fn canonical(doc: &Html, page_url: &Url) -> Option<String> {
    doc.select(selector!("link[rel~='canonical'][href]"))
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| {
            page_url
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string())
        })
}

fn robots(doc: &Html) -> Option<String> {
    doc.select(selector!("meta[name][content]"))
        .find(|el| {
            el.value()
                .attr("name")
                .map(|n| n.eq_ignore_ascii_case("robots"))
                .unwrap_or(false)
        })
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
}

/// Meta tags whose `property` or `name` starts with `prefix`, keyed without it
fn prefixed_meta(doc: &Html, prefix: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for el in doc.select(selector!("meta[content]")) {
        let key = el
            .value()
            .attr("property")
            .or_else(|| el.value().attr("name"))
            .map(|k| k.trim().to_ascii_lowercase());
        let Some(key) = key else { continue };
        let Some(stripped) = key.strip_prefix(prefix) else {
            continue;
        };
        if let Some(content) = el.value().attr("content") {
            tags.entry(stripped.to_string())
                .or_insert_with(|| content.trim().to_string());
        }
    }
    tags
}

fn hreflang(doc: &Html, page_url: &Url) -> Vec<Hreflang> {
    doc.select(selector!("link[rel~='alternate'][hreflang][href]"))
        .filter_map(|el| {
            let lang = el.value().attr("hreflang")?.trim().to_string();
            let href = el.value().attr("href")?.trim();
            let href = page_url.join(href).ok()?.to_string();
            Some(Hreflang { lang, href })
        })
        .collect()
}

fn json_ld(doc: &Html, errors: &mut Vec<String>) -> Vec<serde_json::Value> {
    let mut blocks = Vec::new();
    for (index, el) in doc
        .select(selector!("script[type='application/ld+json']"))
        .enumerate()
    {
        let raw = el.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => blocks.push(value),
            Err(e) => {
                ::log::debug!("Skipping malformed JSON-LD block {}: {}", index, e);
                errors.push(format!("json-ld block {}: {}", index, e));
            }
        }
    }
    blocks
}

fn microdata(doc: &Html) -> Vec<MicrodataItem> {
    doc.select(selector!("[itemscope]"))
        .map(|item| {
            let mut properties = BTreeMap::new();
            for prop in item.select(selector!("[itemprop]")) {
                // Properties of nested items belong to those items
                if nearest_scope(&prop).map(|scope| scope.id()) != Some(item.id()) {
                    continue;
                }
                let Some(name) = prop.value().attr("itemprop") else {
                    continue;
                };
                let value = prop
                    .value()
                    .attr("content")
                    .or_else(|| prop.value().attr("href"))
                    .or_else(|| prop.value().attr("src"))
                    .map(|v| v.trim().to_string())
                    .unwrap_or_else(|| {
                        super::text::collapse_whitespace(&prop.text().collect::<Vec<_>>().join(" "))
                    });
                properties.entry(name.trim().to_string()).or_insert(value);
            }

            MicrodataItem {
                item_type: item
                    .value()
                    .attr("itemtype")
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
                properties,
            }
        })
        .collect()
}

/// Closest ancestor (excluding `el` itself) carrying `itemscope`
fn nearest_scope<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().attr("itemscope").is_some())
}
