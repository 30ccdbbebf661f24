use crate::results::AnalyticsData;
use regex::Regex;
use scraper::Html;
use std::collections::BTreeSet;
use std::sync::OnceLock;

struct Patterns {
    ga4: Regex,
    gtm: Regex,
    universal: Regex,
    pixel: Vec<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        ga4: Regex::new(r"\bG-[A-Z0-9]{10}\b").expect("static regex"),
        gtm: Regex::new(r"\bGTM-[A-Z0-9]{4,8}\b").expect("static regex"),
        universal: Regex::new(r"\bUA-\d{4,10}-\d{1,4}\b").expect("static regex"),
        pixel: vec![
            Regex::new(r#"fbq\(\s*['"]init['"]\s*,\s*['"]?(\d{6,20})"#).expect("static regex"),
            Regex::new(r"facebook\.com/tr/?\?id=(\d{6,20})").expect("static regex"),
        ],
    })
}

/// Scan inline scripts, script sources and tracking pixels for analytics IDs
pub fn detect(doc: &Html) -> AnalyticsData {
    let mut sources: Vec<String> = Vec::new();
    for script in doc.select(selector!("script")) {
        if let Some(src) = script.value().attr("src") {
            sources.push(src.to_string());
        }
        let inline = script.text().collect::<String>();
        if !inline.trim().is_empty() {
            sources.push(inline);
        }
    }
    for noscript in doc.select(selector!("noscript")) {
        sources.push(noscript.inner_html());
    }
    for img in doc.select(selector!("img[src], iframe[src]")) {
        if let Some(src) = img.value().attr("src") {
            sources.push(src.to_string());
        }
    }

    detect_in_sources(sources.iter().map(String::as_str))
}

/// Collect de-duplicated, sorted IDs from raw script text and URLs
pub fn detect_in_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> AnalyticsData {
    let patterns = patterns();
    let mut ga4 = BTreeSet::new();
    let mut gtm = BTreeSet::new();
    let mut universal = BTreeSet::new();
    let mut pixel = BTreeSet::new();

    for source in sources {
        ga4.extend(patterns.ga4.find_iter(source).map(|m| m.as_str().to_string()));
        gtm.extend(patterns.gtm.find_iter(source).map(|m| m.as_str().to_string()));
        universal.extend(
            patterns
                .universal
                .find_iter(source)
                .map(|m| m.as_str().to_string()),
        );
        for regex in &patterns.pixel {
            pixel.extend(
                regex
                    .captures_iter(source)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().to_string()),
            );
        }
    }

    AnalyticsData {
        google_analytics: ga4.into_iter().collect(),
        google_tag_manager: gtm.into_iter().collect(),
        facebook_pixel: pixel.into_iter().collect(),
        universal_analytics: universal.into_iter().collect(),
    }
}
