use scraper::{ElementRef, Html};
use shared::constants::TRUNCATION_MARKER;

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Reduces an HTML document to the text a reader would see in its `<body>`.
///
/// Text nodes are whitespace-collapsed and joined with single spaces; empty
/// ones are dropped.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let body = document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body");
    let Some(body) = body else {
        return String::new();
    };

    let mut words: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
