//! Keyword-bucket classification of the business behind a page.
//!
//! A label is only assigned when one bucket clearly dominates; weak or
//! balanced signal always yields no classification.

use crate::results::{BusinessType, Classification};
use std::collections::HashMap;

/// The leading bucket must beat the runner-up by more than this
const MARGIN: usize = 2;
/// The counted signal must exceed this before any label is assigned
const MIN_SIGNAL: usize = 2;

const B2B_CUES: &[&str] = &[
    "b2b", "enterprise", "enterprises", "business", "businesses", "solutions", "clients",
    "partners", "saas", "platform", "wholesale", "integration", "integrations", "workflow",
    "roi", "teams", "compliance", "procurement", "vendors", "demo",
];

const B2C_CUES: &[&str] = &[
    "b2c", "shop", "cart", "buy", "sale", "deals", "discount", "family", "personal", "shipping",
    "checkout", "gift", "gifts", "lifestyle", "fashion", "store", "customers", "kids", "home",
    "beauty",
];

const INDUSTRY_CUES: &[(&str, &[&str])] = &[
    (
        "technology",
        &["software", "cloud", "data", "developer", "developers", "api", "tech", "app", "ai"],
    ),
    (
        "healthcare",
        &["health", "medical", "clinic", "patient", "patients", "doctor", "care", "wellness"],
    ),
    (
        "finance",
        &["bank", "banking", "finance", "investment", "loan", "loans", "insurance", "credit"],
    ),
    (
        "retail",
        &["shop", "store", "fashion", "clothing", "products", "cart", "apparel", "shoes"],
    ),
    (
        "education",
        &["course", "courses", "learning", "students", "school", "university", "training"],
    ),
    (
        "real estate",
        &["property", "properties", "realty", "homes", "rent", "mortgage", "listings"],
    ),
    (
        "hospitality",
        &["hotel", "hotels", "travel", "restaurant", "booking", "menu", "dining", "rooms"],
    ),
    (
        "manufacturing",
        &["manufacturing", "industrial", "factory", "machinery", "equipment", "production"],
    ),
];

fn word_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    counts
}

fn bucket_score(counts: &HashMap<String, usize>, cues: &[&str]) -> usize {
    cues.iter().map(|cue| counts.get(*cue).copied().unwrap_or(0)).sum()
}

pub fn classify(text: &str) -> Classification {
    let counts = word_counts(text);
    Classification {
        business_type: business_type(&counts),
        industry: industry(&counts),
    }
}

fn business_type(counts: &HashMap<String, usize>) -> BusinessType {
    let b2b = bucket_score(counts, B2B_CUES);
    let b2c = bucket_score(counts, B2C_CUES);

    if b2b + b2c <= MIN_SIGNAL {
        return BusinessType::Unknown;
    }
    if b2b > b2c + MARGIN {
        BusinessType::B2B
    } else if b2c > b2b + MARGIN {
        BusinessType::B2C
    } else {
        BusinessType::Unknown
    }
}

fn industry(counts: &HashMap<String, usize>) -> Option<String> {
    let mut scores: Vec<(&str, usize)> = INDUSTRY_CUES
        .iter()
        .map(|(name, cues)| (*name, bucket_score(counts, cues)))
        .collect();
    // Stable: equal scores keep table order
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (best, best_score) = scores[0];
    let runner_up = scores.get(1).map(|s| s.1).unwrap_or(0);
    if best_score > MIN_SIGNAL && best_score > runner_up + MARGIN {
        Some(best.to_string())
    } else {
        None
    }
}
