//! Site-wide rollups over the extracted pages.
//!
//! Every function here is a pure reduction over `&[PageData]`; running the
//! aggregation twice over the same pages gives the same result.

use crate::config::AggregationScope;
use crate::parsers::keywords::CONTENT_LIMIT;
use crate::results::{AnalyticsData, KeywordCount, PageData};
use crate::utils::{clamp_score, mean};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Placeholder for any score that cannot be computed
pub const DEFAULT_SCORE: u8 = 50;

/// Pages with fewer words count as thin content
pub const THIN_CONTENT_WORDS: usize = 300;

/// Site-wide keywords kept in [`ContentAnalysis::top_keywords`]
const TOP_SITE_KEYWORDS: usize = 20;

/// Load times above this are reported as slow
const SLOW_PAGE_MS: f64 = 3000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalysis {
    pub average_load_time: f64,
    pub average_dom_content_loaded: f64,
    pub average_first_contentful_paint: Option<f64>,
    pub slowest_page: Option<String>,
    pub slow_pages: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub pages_with_title: usize,
    pub pages_with_meta_description: usize,
    pub pages_with_h1: usize,
    pub pages_with_canonical: usize,
    pub pages_with_open_graph: usize,
    pub pages_with_structured_data: usize,
    pub structured_data_types: Vec<String>,
    pub missing_titles: Vec<String>,
    pub missing_descriptions: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub total_words: usize,
    pub average_words_per_page: f64,
    pub total_images: usize,
    pub total_links: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub total_forms: usize,
    pub top_keywords: Vec<KeywordCount>,
    pub thin_pages: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysis {
    pub https_pages: usize,
    pub pages_with_viewport: usize,
    pub frameworks: Vec<String>,
    pub analytics: AnalyticsData,
    pub total_scripts: usize,
    pub total_stylesheets: usize,
    pub errors: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExperienceAnalysis {
    pub total_forms: usize,
    pub total_buttons: usize,
    pub images_without_alt: usize,
    pub inputs_without_label: usize,
    pub pages_with_skip_link: usize,
    pub pages_with_valid_heading_order: usize,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub total_pages: usize,
    pub total_words: usize,
    pub total_images: usize,
    pub total_links: usize,
    pub average_load_time: f64,
    pub performance_score: u8,
    pub seo_score: u8,
    pub content_score: u8,
    pub technical_score: u8,
    pub user_experience_score: u8,
    pub overall_score: u8,
}

/// All rollups for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub performance: PerformanceAnalysis,
    pub seo: SeoAnalysis,
    pub content: ContentAnalysis,
    pub technical: TechnicalAnalysis,
    pub user_experience: UserExperienceAnalysis,
    pub summary: CollectionSummary,
}

/// Roll the pages up into category analyses and a summary
///
/// Content always spans every page. The other four categories look at the
/// pages selected by `scope`.
pub fn aggregate(pages: &[PageData], scope: AggregationScope) -> Aggregation {
    let scoped = scoped_pages(pages, scope);
    ::log::debug!(
        "Aggregating {} pages ({} in {:?} scope)",
        pages.len(),
        scoped.len(),
        scope
    );

    let performance = performance(scoped);
    let seo = seo(scoped);
    let content = content(pages);
    let technical = technical(scoped);
    let user_experience = user_experience(scoped);
    let summary = summary(
        pages,
        [
            performance.score,
            seo.score,
            content.score,
            technical.score,
            user_experience.score,
        ],
    );

    Aggregation {
        performance,
        seo,
        content,
        technical,
        user_experience,
        summary,
    }
}

fn scoped_pages(pages: &[PageData], scope: AggregationScope) -> &[PageData] {
    match scope {
        AggregationScope::EntryPage => &pages[..pages.len().min(1)],
        AggregationScope::SiteAverage => pages,
    }
}

/// Mean of the per-page scores, or the placeholder when there are no pages
fn mean_score(pages: &[PageData], score: fn(&PageData) -> f64) -> u8 {
    if pages.is_empty() {
        return DEFAULT_SCORE;
    }
    let scores: Vec<f64> = pages.iter().map(score).collect();
    clamp_score(mean(&scores))
}

pub fn performance(pages: &[PageData]) -> PerformanceAnalysis {
    let load_times: Vec<f64> = pages.iter().map(|p| p.performance.load_time).collect();
    let dom_loaded: Vec<f64> = pages
        .iter()
        .map(|p| p.performance.dom_content_loaded)
        .collect();
    let fcp: Vec<f64> = pages
        .iter()
        .filter_map(|p| p.performance.first_contentful_paint)
        .collect();

    let slowest_page = pages
        .iter()
        .filter(|p| p.performance.load_time > 0.0)
        .max_by(|a, b| a.performance.load_time.total_cmp(&b.performance.load_time))
        .map(|p| p.url.clone());

    PerformanceAnalysis {
        average_load_time: mean(&load_times),
        average_dom_content_loaded: mean(&dom_loaded),
        average_first_contentful_paint: (!fcp.is_empty()).then(|| mean(&fcp)),
        slowest_page,
        slow_pages: pages
            .iter()
            .filter(|p| p.performance.load_time > SLOW_PAGE_MS)
            .map(|p| p.url.clone())
            .collect(),
        score: mean_score(pages, page_performance_score),
    }
}

/// One point per 100ms past the first second, plus first-paint penalties
pub fn page_performance_score(page: &PageData) -> f64 {
    let perf = &page.performance;
    if perf.load_time <= 0.0 {
        return DEFAULT_SCORE as f64;
    }

    let mut score = 100.0;
    if perf.load_time > 1000.0 {
        score -= ((perf.load_time - 1000.0) / 100.0).min(60.0);
    }
    match perf.first_contentful_paint {
        Some(fcp) if fcp > 3000.0 => score -= 20.0,
        Some(fcp) if fcp > 1800.0 => score -= 10.0,
        _ => {}
    }
    score
}

pub fn seo(pages: &[PageData]) -> SeoAnalysis {
    let mut types = BTreeSet::new();
    for page in pages {
        types.extend(page.seo.structured_data.types());
    }

    SeoAnalysis {
        pages_with_title: pages.iter().filter(|p| !p.title.is_empty()).count(),
        pages_with_meta_description: pages
            .iter()
            .filter(|p| !p.meta_description.is_empty())
            .count(),
        pages_with_h1: pages.iter().filter(|p| !p.headings.h1.is_empty()).count(),
        pages_with_canonical: pages
            .iter()
            .filter(|p| p.seo.canonical_url.is_some())
            .count(),
        pages_with_open_graph: pages
            .iter()
            .filter(|p| !p.seo.open_graph.is_empty())
            .count(),
        pages_with_structured_data: pages
            .iter()
            .filter(|p| !p.seo.structured_data.is_empty())
            .count(),
        structured_data_types: types.into_iter().collect(),
        missing_titles: pages
            .iter()
            .filter(|p| p.title.is_empty())
            .map(|p| p.url.clone())
            .collect(),
        missing_descriptions: pages
            .iter()
            .filter(|p| p.meta_description.is_empty())
            .map(|p| p.url.clone())
            .collect(),
        score: mean_score(pages, page_seo_score),
    }
}

pub fn page_seo_score(page: &PageData) -> f64 {
    let mut score = 100.0;

    let title_len = page.title.chars().count();
    if title_len == 0 {
        score -= 20.0;
    } else if !(30..=60).contains(&title_len) {
        score -= 5.0;
    }

    let description_len = page.meta_description.chars().count();
    if description_len == 0 {
        score -= 15.0;
    } else if !(70..=160).contains(&description_len) {
        score -= 5.0;
    }

    match page.headings.h1.len() {
        0 => score -= 15.0,
        1 => {}
        _ => score -= 5.0,
    }
    if page.seo.canonical_url.is_none() {
        score -= 10.0;
    }
    if page.seo.open_graph.is_empty() {
        score -= 5.0;
    }
    if page.seo.structured_data.is_empty() {
        score -= 5.0;
    }
    score -= (page.accessibility.images_without_alt as f64 * 2.0).min(10.0);
    score
}

pub fn content(pages: &[PageData]) -> ContentAnalysis {
    let total_words: usize = pages.iter().map(|p| p.content.word_count).sum();
    let internal_links: usize = pages
        .iter()
        .map(|p| p.content.links.iter().filter(|l| l.is_internal).count())
        .sum();
    let total_links: usize = pages.iter().map(|p| p.content.links.len()).sum();

    ContentAnalysis {
        total_words,
        average_words_per_page: if pages.is_empty() {
            0.0
        } else {
            total_words as f64 / pages.len() as f64
        },
        total_images: pages.iter().map(|p| p.content.images.len()).sum(),
        total_links,
        internal_links,
        external_links: total_links - internal_links,
        total_forms: pages.iter().map(|p| p.content.forms.len()).sum(),
        top_keywords: site_keywords(pages),
        thin_pages: pages
            .iter()
            .filter(|p| p.content.word_count < THIN_CONTENT_WORDS)
            .map(|p| p.url.clone())
            .collect(),
        score: mean_score(pages, page_content_score),
    }
}

/// Content keyword counts summed over pages, ties kept in first-seen order
fn site_keywords(pages: &[PageData]) -> Vec<KeywordCount> {
    let mut totals: Vec<KeywordCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for keyword in pages
        .iter()
        .flat_map(|p| p.keywords.content_keywords.iter().take(CONTENT_LIMIT))
    {
        match index.get(keyword.word.as_str()) {
            Some(&i) => totals[i].count += keyword.count,
            None => {
                index.insert(keyword.word.as_str(), totals.len());
                totals.push(keyword.clone());
            }
        }
    }

    totals.sort_by(|a, b| b.count.cmp(&a.count));
    totals.truncate(TOP_SITE_KEYWORDS);
    totals
}

pub fn page_content_score(page: &PageData) -> f64 {
    let mut score: f64 = match page.content.word_count {
        0..100 => 30.0,
        100..THIN_CONTENT_WORDS => 60.0,
        THIN_CONTENT_WORDS..1000 => 85.0,
        _ => 100.0,
    };
    if page.headings.all().next().is_none() {
        score -= 10.0;
    }
    if page.content.images.is_empty() {
        score -= 5.0;
    }
    score
}

pub fn technical(pages: &[PageData]) -> TechnicalAnalysis {
    let mut frameworks: Vec<String> = Vec::new();
    for framework in pages.iter().flat_map(|p| &p.technical.frameworks) {
        if !frameworks.contains(framework) {
            frameworks.push(framework.clone());
        }
    }

    let mut analytics = AnalyticsData::default();
    for page in pages {
        merge_ids(&mut analytics.google_analytics, &page.analytics.google_analytics);
        merge_ids(&mut analytics.google_tag_manager, &page.analytics.google_tag_manager);
        merge_ids(&mut analytics.facebook_pixel, &page.analytics.facebook_pixel);
        merge_ids(&mut analytics.universal_analytics, &page.analytics.universal_analytics);
    }

    TechnicalAnalysis {
        https_pages: pages.iter().filter(|p| p.technical.https).count(),
        pages_with_viewport: pages.iter().filter(|p| p.technical.has_viewport).count(),
        frameworks,
        analytics,
        total_scripts: pages.iter().map(|p| p.technical.script_count).sum(),
        total_stylesheets: pages.iter().map(|p| p.technical.stylesheet_count).sum(),
        errors: pages
            .iter()
            .flat_map(|p| p.technical.errors.iter().map(move |e| format!("{}: {}", p.url, e)))
            .collect(),
        score: mean_score(pages, page_technical_score),
    }
}

fn merge_ids(into: &mut Vec<String>, ids: &[String]) {
    let merged: BTreeSet<String> = into.drain(..).chain(ids.iter().cloned()).collect();
    into.extend(merged);
}

pub fn page_technical_score(page: &PageData) -> f64 {
    let tech = &page.technical;
    let mut score = 100.0;
    if !tech.https {
        score -= 30.0;
    }
    if !tech.has_viewport {
        score -= 20.0;
    }
    if tech.charset.is_none() {
        score -= 10.0;
    }
    score -= (tech.errors.len() as f64 * 5.0).min(20.0);
    if tech.script_count > 30 {
        score -= 10.0;
    }
    score
}

pub fn user_experience(pages: &[PageData]) -> UserExperienceAnalysis {
    UserExperienceAnalysis {
        total_forms: pages.iter().map(|p| p.content.forms.len()).sum(),
        total_buttons: pages.iter().map(|p| p.content.buttons.len()).sum(),
        images_without_alt: pages
            .iter()
            .map(|p| p.accessibility.images_without_alt)
            .sum(),
        inputs_without_label: pages
            .iter()
            .map(|p| p.accessibility.inputs_without_label)
            .sum(),
        pages_with_skip_link: pages
            .iter()
            .filter(|p| p.accessibility.has_skip_link)
            .count(),
        pages_with_valid_heading_order: pages
            .iter()
            .filter(|p| p.accessibility.heading_order_valid)
            .count(),
        score: mean_score(pages, page_user_experience_score),
    }
}

pub fn page_user_experience_score(page: &PageData) -> f64 {
    let a11y = &page.accessibility;
    let mut score = 100.0;
    score -= (a11y.inputs_without_label as f64 * 5.0).min(20.0);
    score -= (a11y.images_without_alt as f64 * 2.0).min(20.0);
    if !a11y.has_lang_attribute {
        score -= 10.0;
    }
    if !a11y.heading_order_valid {
        score -= 10.0;
    }
    if a11y.landmark_count == 0 {
        score -= 10.0;
    }
    if !page.technical.has_viewport {
        score -= 10.0;
    }
    score
}

fn summary(pages: &[PageData], scores: [u8; 5]) -> CollectionSummary {
    let load_times: Vec<f64> = pages.iter().map(|p| p.performance.load_time).collect();
    let [performance, seo, content, technical, user_experience] = scores;

    CollectionSummary {
        total_pages: pages.len(),
        total_words: pages.iter().map(|p| p.content.word_count).sum(),
        total_images: pages.iter().map(|p| p.content.images.len()).sum(),
        total_links: pages.iter().map(|p| p.content.links.len()).sum(),
        average_load_time: mean(&load_times),
        performance_score: performance,
        seo_score: seo,
        content_score: content,
        technical_score: technical,
        user_experience_score: user_experience,
        overall_score: clamp_score(mean(&scores.map(f64::from))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ImageData, LinkData};

    fn page(url: &str, words: usize, load_time: f64) -> PageData {
        let mut page = PageData {
            url: url.to_string(),
            ..PageData::default()
        };
        page.content.word_count = words;
        page.performance.load_time = load_time;
        page
    }

    fn keyword(word: &str, count: usize) -> KeywordCount {
        KeywordCount {
            word: word.to_string(),
            count,
        }
    }

    #[test]
    fn test_empty_input_uses_placeholders() {
        let result = aggregate(&[], AggregationScope::EntryPage);
        let summary = &result.summary;
        assert_eq!(summary.total_pages, 0);
        assert_eq!(summary.average_load_time, 0.0);
        assert_eq!(summary.performance_score, DEFAULT_SCORE);
        assert_eq!(summary.seo_score, DEFAULT_SCORE);
        assert_eq!(summary.content_score, DEFAULT_SCORE);
        assert_eq!(summary.technical_score, DEFAULT_SCORE);
        assert_eq!(summary.user_experience_score, DEFAULT_SCORE);
        assert_eq!(summary.overall_score, DEFAULT_SCORE);
        assert_eq!(result.content.average_words_per_page, 0.0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let pages = vec![
            page("https://example.com/", 1200, 900.0),
            page("https://example.com/a", 150, 2500.0),
        ];
        let first = aggregate(&pages, AggregationScope::SiteAverage);
        let second = aggregate(&pages, AggregationScope::SiteAverage);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_totals() {
        let mut home = page("https://example.com/", 1000, 800.0);
        home.content.images.push(ImageData::default());
        home.content.links = vec![
            LinkData {
                href: "https://example.com/a".to_string(),
                text: "A".to_string(),
                is_internal: true,
                is_broken: false,
            },
            LinkData {
                href: "https://other.com/".to_string(),
                text: "Other".to_string(),
                is_internal: false,
                is_broken: false,
            },
        ];
        let pages = vec![home, page("https://example.com/a", 200, 1200.0)];

        let result = aggregate(&pages, AggregationScope::EntryPage);
        assert_eq!(result.summary.total_pages, 2);
        assert_eq!(result.summary.total_words, 1200);
        assert_eq!(result.summary.total_images, 1);
        assert_eq!(result.summary.total_links, 2);
        assert_eq!(result.summary.average_load_time, 1000.0);
        assert_eq!(result.content.internal_links, 1);
        assert_eq!(result.content.external_links, 1);
        assert_eq!(result.content.thin_pages, vec!["https://example.com/a"]);
        assert_eq!(result.content.average_words_per_page, 600.0);
    }

    #[test]
    fn test_scope_selects_pages() {
        let pages = vec![
            page("https://example.com/", 500, 1000.0),
            page("https://example.com/slow", 500, 5000.0),
        ];

        let entry = aggregate(&pages, AggregationScope::EntryPage);
        assert_eq!(entry.performance.score, 100);
        assert_eq!(entry.performance.average_load_time, 1000.0);
        assert!(entry.performance.slow_pages.is_empty());

        let site = aggregate(&pages, AggregationScope::SiteAverage);
        // (100 + (100 - 40)) / 2
        assert_eq!(site.performance.score, 80);
        assert_eq!(site.performance.slowest_page.as_deref(), Some("https://example.com/slow"));
        assert_eq!(site.performance.slow_pages, vec!["https://example.com/slow"]);

        // Content ignores the scope
        assert_eq!(entry.content, site.content);
    }

    #[test]
    fn test_unmeasured_load_time_scores_placeholder() {
        let unmeasured = page("https://example.com/", 500, 0.0);
        assert_eq!(page_performance_score(&unmeasured), DEFAULT_SCORE as f64);
    }

    #[test]
    fn test_site_keywords_sum_and_order() {
        let mut a = page("https://example.com/", 100, 0.0);
        a.keywords.content_keywords = vec![keyword("widgets", 3), keyword("pricing", 2)];
        let mut b = page("https://example.com/b", 100, 0.0);
        b.keywords.content_keywords = vec![keyword("pricing", 2), keyword("support", 4)];

        let top = content(&[a, b]).top_keywords;
        assert_eq!(
            top,
            vec![keyword("pricing", 4), keyword("support", 4), keyword("widgets", 3)]
        );
    }

    #[test]
    fn test_analytics_ids_merged_and_sorted() {
        let mut a = page("https://example.com/", 100, 0.0);
        a.analytics.google_tag_manager = vec!["GTM-BBBB".to_string()];
        let mut b = page("https://example.com/b", 100, 0.0);
        b.analytics.google_tag_manager = vec!["GTM-AAAA".to_string(), "GTM-BBBB".to_string()];

        let tech = technical(&[a, b]);
        assert_eq!(tech.analytics.google_tag_manager, vec!["GTM-AAAA", "GTM-BBBB"]);
    }

    #[test]
    fn test_seo_score_penalties() {
        let bare = page("https://example.com/", 0, 0.0);
        // title, description, h1, canonical, open graph, structured data
        assert_eq!(page_seo_score(&bare), 30.0);

        let mut good = bare.clone();
        good.title = "Acme Widgets | Industrial widgets since 1950".to_string();
        good.meta_description = "Acme builds industrial widgets for factories, warehouses and logistics teams worldwide.".to_string();
        good.headings.h1 = vec!["Industrial widgets".to_string()];
        good.seo.canonical_url = Some("https://example.com/".to_string());
        good.seo
            .open_graph
            .insert("og:title".to_string(), "Acme".to_string());
        good.seo
            .structured_data
            .json_ld
            .push(serde_json::json!({"@type": "Organization"}));
        assert_eq!(page_seo_score(&good), 100.0);
    }
}
