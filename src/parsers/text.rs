use scraper::Html;

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "template", "svg", "iframe"];

/// Visible text of the document body, whitespace collapsed to single spaces
pub fn visible_text(doc: &Html) -> String {
    let Some(body) = doc.select(selector!("body")).next() else {
        return String::new();
    };

    let mut parts: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                .unwrap_or(false)
        });
        if !hidden {
            parts.push(&**text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Collapse every whitespace run into one space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let doc = Html::parse_document(
            r#"<html><head><title>T</title></head><body>
                <h1>Hello</h1>
                <script>var tracking = "ignored";</script>
                <style>.x { color: red }</style>
                <p>   world
                   again </p>
                <noscript>enable js</noscript>
            </body></html>"#,
        );
        assert_eq!(visible_text(&doc), "Hello world again");
    }

    #[test]
    fn test_visible_text_without_body_content() {
        let doc = Html::parse_document("<html><head><title>Only</title></head></html>");
        assert_eq!(visible_text(&doc), "");
    }

    #[test]
    fn test_collapse_and_count() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count("   "), 0);
    }
}
