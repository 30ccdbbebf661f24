/// Return the first block-page signature found in the title or visible text
///
/// Matching is case-insensitive. A title that is exactly a 403 status also
/// counts as a block page.
pub fn detect(title: &str, text: &str, signatures: &[String]) -> Option<String> {
    let title_lower = title.to_lowercase();
    let text_lower = text.to_lowercase();

    for signature in signatures {
        let needle = signature.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        if title_lower.contains(&needle) || text_lower.contains(&needle) {
            return Some(signature.clone());
        }
    }

    let title_trimmed = title.trim();
    if title_trimmed == "403" || title_trimmed.starts_with("403 ") {
        return Some(title_trimmed.to_string());
    }

    None
}
