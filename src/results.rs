use crate::aggregate::{
    CollectionSummary, ContentAnalysis, PerformanceAnalysis, SeoAnalysis, TechnicalAnalysis,
    UserExperienceAnalysis,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything extracted from one rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    /// URL of the page as it appears in the sitemap
    pub url: String,

    /// Contents of the `<title>` element (empty if missing)
    pub title: String,

    /// Content of `<meta name="description">` (empty if missing)
    pub meta_description: String,

    pub headings: Headings,

    /// Every named meta tag (`name`, `property` or `http-equiv`) and its content
    pub meta_tags: BTreeMap<String, String>,

    pub analytics: AnalyticsData,
    pub keywords: KeywordData,
    pub content: ContentData,
    pub performance: PagePerformance,
    pub seo: SeoData,
    pub accessibility: AccessibilityData,
    pub technical: TechnicalData,
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    /// Mutable access to the list for heading level 1..=6
    pub fn level_mut(&mut self, level: u8) -> Option<&mut Vec<String>> {
        match level {
            1 => Some(&mut self.h1),
            2 => Some(&mut self.h2),
            3 => Some(&mut self.h3),
            4 => Some(&mut self.h4),
            5 => Some(&mut self.h5),
            6 => Some(&mut self.h6),
            _ => None,
        }
    }

    /// All heading texts, h1 first
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.h1
            .iter()
            .chain(&self.h2)
            .chain(&self.h3)
            .chain(&self.h4)
            .chain(&self.h5)
            .chain(&self.h6)
    }
}

/// Tracking identifiers found in the page's scripts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    /// GA4 measurement IDs (`G-XXXXXXXXXX`)
    pub google_analytics: Vec<String>,
    /// Tag Manager container IDs (`GTM-XXXXXXX`)
    pub google_tag_manager: Vec<String>,
    /// Facebook Pixel IDs
    pub facebook_pixel: Vec<String>,
    /// Legacy Universal Analytics properties (`UA-XXXX-Y`)
    pub universal_analytics: Vec<String>,
}

impl AnalyticsData {
    pub fn is_empty(&self) -> bool {
        self.google_analytics.is_empty()
            && self.google_tag_manager.is_empty()
            && self.facebook_pixel.is_empty()
            && self.universal_analytics.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordData {
    pub meta_keywords: Vec<String>,
    pub content_keywords: Vec<KeywordCount>,
    pub heading_keywords: Vec<KeywordCount>,
    pub alt_text_keywords: Vec<KeywordCount>,
    pub all_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    /// Visible body text with whitespace collapsed
    pub text: String,
    pub word_count: usize,
    pub images: Vec<ImageData>,
    pub links: Vec<LinkData>,
    pub forms: Vec<FormData>,
    pub buttons: Vec<ButtonData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub loading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkData {
    /// Absolute URL the anchor resolves to
    pub href: String,
    pub text: String,
    pub is_internal: bool,
    /// Always false; checking a link requires a request of its own
    pub is_broken: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub action: Option<String>,
    pub method: String,
    pub input_count: usize,
    pub has_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonData {
    pub text: String,
    /// `button`, `submit`, `reset` or `link` for anchors styled as buttons
    pub kind: String,
}

/// Raw timings in milliseconds relative to navigation start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePerformance {
    pub load_time: f64,
    pub dom_content_loaded: f64,
    pub first_paint: Option<f64>,
    pub first_contentful_paint: Option<f64>,
    /// Not measurable in a single evaluate pass; always `None`
    pub largest_contentful_paint: Option<f64>,
    /// Not measurable in a single evaluate pass; always `None`
    pub cumulative_layout_shift: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoData {
    pub canonical_url: Option<String>,
    pub robots: Option<String>,
    pub open_graph: BTreeMap<String, String>,
    pub twitter_card: BTreeMap<String, String>,
    pub structured_data: StructuredData,
    pub hreflang: Vec<Hreflang>,
    /// `lang` attribute of the root element
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredData {
    pub json_ld: Vec<serde_json::Value>,
    pub microdata: Vec<MicrodataItem>,
}

impl StructuredData {
    pub fn is_empty(&self) -> bool {
        self.json_ld.is_empty() && self.microdata.is_empty()
    }

    /// Declared schema types (`@type` / `itemtype`), in document order
    pub fn types(&self) -> Vec<String> {
        let mut types = Vec::new();
        for value in &self.json_ld {
            collect_json_ld_types(value, &mut types);
        }
        for item in &self.microdata {
            if let Some(item_type) = &item.item_type {
                types.push(item_type.clone());
            }
        }
        types
    }
}

fn collect_json_ld_types(value: &serde_json::Value, types: &mut Vec<String>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_json_ld_types(item, types);
            }
        }
        serde_json::Value::Object(map) => {
            match map.get("@type") {
                Some(serde_json::Value::String(t)) => types.push(t.clone()),
                Some(serde_json::Value::Array(ts)) => {
                    types.extend(ts.iter().filter_map(|t| t.as_str().map(str::to_string)))
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_json_ld_types(graph, types);
            }
        }
        _ => {}
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrodataItem {
    pub item_type: Option<String>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hreflang {
    pub lang: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityData {
    pub images_without_alt: usize,
    pub inputs_without_label: usize,
    pub aria_label_count: usize,
    pub landmark_count: usize,
    pub has_skip_link: bool,
    pub has_lang_attribute: bool,
    /// No heading skips a level on the way down (h2 -> h4)
    pub heading_order_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalData {
    pub https: bool,
    pub has_viewport: bool,
    pub charset: Option<String>,
    pub script_count: usize,
    pub stylesheet_count: usize,
    pub frameworks: Vec<String>,
    /// Field-level extraction failures; the fields themselves fall back to defaults
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessType {
    B2B,
    B2C,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub business_type: BusinessType,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    pub depth: usize,
    pub priority: f64,
    pub last_modified: Option<String>,
    pub change_frequency: ChangeFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectType {
    Permanent,
    Temporary,
}

impl RedirectType {
    pub fn from_status(status: u16) -> Self {
        match status {
            301 | 308 => RedirectType::Permanent,
            _ => RedirectType::Temporary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectData {
    pub from: String,
    pub to: String,
    pub status: u16,
    #[serde(rename = "type")]
    pub redirect_type: RedirectType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub url: String,
    pub status: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMapData {
    pub total_pages: usize,
    /// Deepest sitemap entry
    pub depth: usize,
    pub orphaned_pages: Vec<String>,
    pub broken_links: Vec<BrokenLink>,
    pub redirects: Vec<RedirectData>,
    pub sitemap: Vec<SitemapEntry>,
}

/// A page whose content matched a block-page signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedPage {
    pub url: String,
    pub signature: String,
}

/// A sitemap entry that could not be reloaded for extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPage {
    pub url: String,
    pub reason: String,
}

/// The single artifact handed to downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveCollectionResult {
    pub url: String,
    /// RFC 3339, taken when the result is assembled
    pub timestamp: String,
    pub pages: Vec<PageData>,
    pub site_map: SiteMapData,
    pub performance: PerformanceAnalysis,
    pub seo: SeoAnalysis,
    pub content: ContentAnalysis,
    pub technical: TechnicalAnalysis,
    pub user_experience: UserExperienceAnalysis,
    pub summary: CollectionSummary,
    pub blocked_pages: Vec<BlockedPage>,
    pub skipped_pages: Vec<SkippedPage>,
}
