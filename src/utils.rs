use url::Url;

/// Sitemap priority for a page at `depth` links from the seed
pub fn priority_for_depth(depth: usize) -> f64 {
    if depth == 0 {
        return 1.0;
    }
    let raw = (1.0 - depth as f64 * 0.2).max(0.1);
    // One decimal keeps 1.0 - 3 * 0.2 from serializing as 0.39999999999999997
    (raw * 10.0).round() / 10.0
}

/// Exact origin equality: scheme, host and (default-normalised) port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Resolve `href` against `base`, dropping non-navigational schemes and bare fragments
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Clamp a floating score into the 0..=100 range
pub fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}
