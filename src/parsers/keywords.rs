//! Keyword frequency extraction.
//!
//! Ordering is fully deterministic: counts descend and equal counts keep the
//! order in which the words first appeared.

use crate::results::{KeywordCount, KeywordData};
use std::collections::HashMap;

pub const CONTENT_LIMIT: usize = 50;
pub const HEADING_LIMIT: usize = 20;
pub const ALT_TEXT_LIMIT: usize = 20;

/// Per-pool share of `all_keywords`
const ALL_CONTENT_SHARE: usize = 20;
const ALL_HEADING_SHARE: usize = 10;
const ALL_ALT_TEXT_SHARE: usize = 10;

/// Tokens this short carry no topical signal
const MIN_TOKEN_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "been", "before", "being", "below",
    "between", "both", "but", "can", "cannot", "could", "does", "doing", "down", "during", "each",
    "even", "every", "from", "further", "have", "having", "here", "hers", "herself", "himself",
    "into", "itself", "just", "more", "most", "much", "must", "myself", "only", "other", "ours",
    "ourselves", "over", "same", "should", "some", "such", "than", "that", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "under",
    "until", "very", "were", "what", "when", "where", "which", "while", "whom", "will", "with",
    "would", "your", "yours", "yourself", "yourselves", "many", "make", "like", "want", "need",
    "well", "still", "because", "however", "within", "without", "across", "upon", "used",
    "using", "among", "since", "though", "dont", "cant", "wont", "youre", "thats", "its",
];

/// Lower-cased tokens with punctuation stripped, short words and stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !token.chars().all(|c| c.is_numeric()))
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// The `limit` most frequent keywords in `text`
pub fn top_keywords(text: &str, limit: usize) -> Vec<KeywordCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for token in tokenize(text) {
        match index.get(&token) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(token.clone(), counts.len());
                counts.push(KeywordCount {
                    word: token,
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Comma-separated `<meta name="keywords">` content, lower-cased and de-duplicated
pub fn meta_keywords(content: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in content.split(',') {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

/// Build the four keyword pools and their bounded union
pub fn keyword_data(meta: &str, body: &str, headings: &[&str], alt_texts: &[&str]) -> KeywordData {
    let meta_keywords = meta_keywords(meta);
    let content_keywords = top_keywords(body, CONTENT_LIMIT);
    let heading_keywords = top_keywords(&headings.join(" "), HEADING_LIMIT);
    let alt_text_keywords = top_keywords(&alt_texts.join(" "), ALT_TEXT_LIMIT);

    let mut all_keywords: Vec<String> = Vec::new();
    let candidates = meta_keywords
        .iter()
        .chain(content_keywords.iter().take(ALL_CONTENT_SHARE).map(|k| &k.word))
        .chain(heading_keywords.iter().take(ALL_HEADING_SHARE).map(|k| &k.word))
        .chain(alt_text_keywords.iter().take(ALL_ALT_TEXT_SHARE).map(|k| &k.word));
    for keyword in candidates {
        if !all_keywords.contains(keyword) {
            all_keywords.push(keyword.clone());
        }
    }

    KeywordData {
        meta_keywords,
        content_keywords,
        heading_keywords,
        alt_text_keywords,
        all_keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(counts: &[KeywordCount]) -> Vec<&str> {
        counts.iter().map(|k| k.word.as_str()).collect()
    }

    #[test]
    fn test_tokenize_filters() {
        let tokens = tokenize("The QUICK, brown fox's jumps over 2024 the lazy dog! Café's menu.");
        assert_eq!(tokens, vec!["quick", "brown", "foxs", "jumps", "lazy", "cafés", "menu"]);
    }

    #[test]
    fn test_frequency_order_with_stable_ties() {
        let text = "marketing growth analytics growth marketing strategy growth";
        let top = top_keywords(text, 10);
        assert_eq!(words(&top), vec!["growth", "marketing", "analytics", "strategy"]);
        assert_eq!(top[0].count, 3);
        assert_eq!(top[1].count, 2);
        assert_eq!(top[2].count, 1);
    }

    #[test]
    fn test_limit_and_determinism() {
        let text = (0..80)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let first = top_keywords(&text, CONTENT_LIMIT);
        assert_eq!(first.len(), CONTENT_LIMIT);
        assert_eq!(first[0].word, "word0");
        for _ in 0..5 {
            assert_eq!(top_keywords(&text, CONTENT_LIMIT), first);
        }
    }

    #[test]
    fn test_meta_keywords() {
        assert_eq!(
            meta_keywords(" SEO, Marketing ,seo,, analytics "),
            vec!["seo", "marketing", "analytics"]
        );
        assert!(meta_keywords("").is_empty());
    }

    #[test]
    fn test_keyword_union_is_bounded_and_deduplicated() {
        let body = (0..40)
            .map(|i| format!("content{} ", i).repeat(40 - i))
            .collect::<String>();
        let headings = ["Growth Marketing", "Marketing Automation"];
        let alts = ["growth chart", "team photo"];

        let data = keyword_data("growth, brand", &body, &headings, &alts);
        assert_eq!(data.meta_keywords, vec!["growth", "brand"]);
        assert_eq!(data.content_keywords.len(), 40);
        assert_eq!(words(&data.heading_keywords), vec!["marketing", "growth", "automation"]);

        // 2 meta + 20 content + "marketing", "automation" + "chart", "team", "photo"
        assert_eq!(data.all_keywords.len(), 27);
        assert_eq!(&data.all_keywords[..3], &["growth", "brand", "content0"]);
        assert!(!data.all_keywords.contains(&"content20".to_string()));
        let unique: std::collections::HashSet<_> = data.all_keywords.iter().collect();
        assert_eq!(unique.len(), data.all_keywords.len());
    }
}
