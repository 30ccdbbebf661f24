/// Cached CSS selector for a literal pattern
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: std::sync::OnceLock<scraper::Selector> = std::sync::OnceLock::new();
        SELECTOR.get_or_init(|| scraper::Selector::parse($css).expect("static selector"))
    }};
}

pub mod accessibility;
pub mod analytics;
pub mod block;
pub mod classify;
pub mod html;
pub mod keywords;
pub mod structured;
pub mod text;


/// What kind of document a response holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML page
    Html,
    /// Plain text, YAML and similar
    Text,
    /// Anything else (PDF, images, feeds)
    Other,
}

impl ParserType {
    /// Classify a response, preferring its content type over the URL extension
    pub fn detect(url: &str, content_type: Option<&str>) -> Self {
        if let Some(content_type) = content_type {
            let mime = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            if mime == "text/html" || mime == "application/xhtml+xml" {
                return ParserType::Html;
            }
            if mime.starts_with("text/") {
                return ParserType::Text;
            }
            if !mime.is_empty() {
                ::log::debug!("Classifying as Other ({}): {}", mime, url);
                return ParserType::Other;
            }
        }

        Self::from_url(url)
    }

    /// Determines the parser type based on the URL alone
    pub fn from_url(url: &str) -> Self {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if path.ends_with(".txt") || path.ends_with(".yaml") || path.ends_with(".yml") {
            ParserType::Text
        } else if path.ends_with(".pdf")
            || path.ends_with(".xml")
            || path.ends_with(".json")
            || path.ends_with(".jpg")
            || path.ends_with(".png")
        {
            ParserType::Other
        } else {
            ParserType::Html
        }
    }

    /// Returns if the parser should extract links
    pub fn should_extract_links(&self) -> bool {
        matches!(self, ParserType::Html)
    }
}
