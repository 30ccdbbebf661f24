use crate::results::AccessibilityData;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

pub fn accessibility(doc: &Html, heading_levels: &[u8]) -> AccessibilityData {
    AccessibilityData {
        images_without_alt: doc
            .select(selector!("img"))
            .filter(|img| img.value().attr("alt").is_none())
            .count(),
        inputs_without_label: inputs_without_label(doc),
        aria_label_count: doc.select(selector!("[aria-label]")).count(),
        landmark_count: doc
            .select(selector!(
                "main, nav, header, footer, aside, [role='main'], [role='navigation'], \
                 [role='banner'], [role='contentinfo'], [role='complementary'], [role='search']"
            ))
            .count(),
        has_skip_link: doc.select(selector!("a[href^='#']")).any(|a| {
            a.text()
                .collect::<String>()
                .to_ascii_lowercase()
                .contains("skip")
        }),
        has_lang_attribute: doc
            .select(selector!("html[lang]"))
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|l| !l.trim().is_empty())
            .unwrap_or(false),
        heading_order_valid: heading_order_valid(heading_levels),
    }
}

fn inputs_without_label(doc: &Html) -> usize {
    let labelled_ids: HashSet<&str> = doc
        .select(selector!("label[for]"))
        .filter_map(|label| label.value().attr("for"))
        .collect();

    doc.select(selector!("input, select, textarea"))
        .filter(|input| {
            let kind = input
                .value()
                .attr("type")
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            !matches!(
                kind.as_str(),
                "hidden" | "submit" | "button" | "reset" | "image"
            )
        })
        .filter(|input| !is_labelled(input, &labelled_ids))
        .count()
}

fn is_labelled(input: &ElementRef, labelled_ids: &HashSet<&str>) -> bool {
    let el = input.value();
    if el.attr("aria-label").is_some()
        || el.attr("aria-labelledby").is_some()
        || el.attr("title").is_some()
    {
        return true;
    }
    if el.id().map(|id| labelled_ids.contains(id)).unwrap_or(false) {
        return true;
    }
    input
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "label")
}

/// Headings never skip a level when going deeper (h2 -> h4 is invalid)
pub fn heading_order_valid(levels: &[u8]) -> bool {
    levels
        .windows(2)
        .all(|pair| pair[1] <= pair[0] || pair[1] == pair[0] + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::heading_levels;

    #[test]
    fn test_heading_order() {
        assert!(heading_order_valid(&[]));
        assert!(heading_order_valid(&[2]));
        assert!(heading_order_valid(&[1, 2, 3, 2, 3, 1, 2]));
        assert!(!heading_order_valid(&[1, 3]));
        assert!(!heading_order_valid(&[1, 2, 4]));
    }

    #[test]
    fn test_accessibility_signals() {
        let doc = Html::parse_document(
            r##"<html lang="en"><body>
                <a href="#main">Skip to content</a>
                <header></header>
                <nav aria-label="Primary"></nav>
                <main id="main">
                    <h1>Title</h1><h3>Jump</h3>
                    <img src="a.png" alt="A">
                    <img src="b.png">
                    <img src="c.png" alt="">
                    <form>
                        <label for="email">Email</label><input id="email" type="email">
                        <label>Name <input type="text"></label>
                        <input type="text" aria-label="Phone">
                        <input type="text" name="unlabelled">
                        <textarea></textarea>
                        <input type="hidden" name="csrf">
                        <input type="submit">
                    </form>
                </main>
            </body></html>"##,
        );
        let levels = heading_levels(&doc);
        let data = accessibility(&doc, &levels);
        assert_eq!(data.images_without_alt, 1);
        assert_eq!(data.inputs_without_label, 2);
        assert_eq!(data.aria_label_count, 2);
        assert_eq!(data.landmark_count, 3);
        assert!(data.has_skip_link);
        assert!(data.has_lang_attribute);
        assert!(!data.heading_order_valid);
    }

    #[test]
    fn test_bare_document() {
        let doc = Html::parse_document("<p>text</p>");
        let data = accessibility(&doc, &[]);
        assert!(!data.has_lang_attribute);
        assert!(!data.has_skip_link);
        assert!(data.heading_order_valid);
        assert_eq!(data.landmark_count, 0);
    }
}
