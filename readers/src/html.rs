//! HTML helpers: readable-text extraction and entity decoding.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text is never part of the readable content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "noscript", "svg", "iframe", "form", "aside",
];

/// Candidate roots for the main content, tried in order before falling back to `body`.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", ".content", "#content"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "br", "tr", "blockquote", "pre",
    "section",
];

/// Extracts readable text from an HTML document: title first, then the main content with
/// noise elements removed and whitespace collapsed.
pub(crate) fn extract_text_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut output = String::new();

    if let Some(title) = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
    {
        let title: String = title.text().collect();
        let title = title.trim();
        if !title.is_empty() {
            output.push_str(title);
            output.push_str("\n\n");
        }
    }

    let noise: Vec<Selector> = NOISE_TAGS
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .collect();

    let root = CONTENT_SELECTORS
        .iter()
        .filter_map(|sel| Selector::parse(sel).ok())
        .find_map(|sel| document.select(&sel).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|sel| document.select(&sel).next())
        })
        .unwrap_or_else(|| document.root_element());

    collect_text(&root, &noise, &mut output);
    collapse_whitespace(&output)
}

fn collect_text(element: &ElementRef, noise: &[Selector], output: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    output.push_str(trimmed);
                    output.push(' ');
                }
            }
            Node::Element(_) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                if noise.iter().any(|sel| sel.matches(&child_ref)) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&child_ref.value().name());
                if is_block {
                    output.push('\n');
                }
                collect_text(&child_ref, noise, output);
                if is_block {
                    output.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trims every line, drops runs of blank lines beyond one.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        cleaned.push_str(&line);
        cleaned.push('\n');
    }
    cleaned.trim().to_string()
}

/// Decodes HTML/XML entities (`&amp;`, `&#39;`, ...) in a text fragment and strips inline tags.
pub(crate) fn decode_entities(fragment: &str) -> String {
    let decoded: String = Html::parse_fragment(fragment).root_element().text().collect();
    // Caption payloads are often escaped twice (`&amp;#39;`).
    if decoded.contains('&') && decoded != fragment {
        return Html::parse_fragment(&decoded).root_element().text().collect();
    }
    decoded
}
