//! Description normalisation: HTML fragment → one block.
//!
//! Catalog descriptions arrive as loose HTML authored in a CMS. A fragment
//! with list items becomes a bullet list; anything else is flattened to one
//! paragraph. Broken markup is parsed leniently by `scraper` and never
//! fails.

use crate::document::{Block, TextStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html, Selector};

/// Text used when a description is missing or empty.
pub const NO_DESCRIPTION: &str = "No description";

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LI_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());

/// Elements whose boundaries separate words.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p",
    "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose text is never shown.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Convert a raw description into a bullet list or a paragraph.
pub fn normalize(raw: Option<&str>) -> Block {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return no_description();
    };

    let fragment = Html::parse_fragment(raw);
    let list_items: Vec<ElementRef<'_>> = fragment.select(&LI_SELECTOR).collect();

    if !list_items.is_empty() {
        let items: Vec<String> = list_items
            .into_iter()
            .map(plain_text)
            .filter(|text| !text.is_empty())
            .collect();
        if items.is_empty() {
            return no_description();
        }
        return Block::BulletList {
            items,
            style: TextStyle::Description,
        };
    }

    let text = plain_text(fragment.root_element());
    if text.is_empty() {
        no_description()
    } else {
        Block::paragraph(text, TextStyle::Description)
    }
}

fn no_description() -> Block {
    Block::paragraph(NO_DESCRIPTION, TextStyle::Fallback)
}

/// Flatten an element to single-spaced, trimmed text.
fn plain_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push(' ');
                }
                collect_text(child_el, out);
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of whitespace (including NBSP) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullets(block: &Block) -> &[String] {
        match block {
            Block::BulletList { items, .. } => items,
            other => panic!("expected bullet list, got {other:?}"),
        }
    }

    #[test]
    fn empty_and_missing_yield_no_description() {
        for raw in [None, Some(""), Some("   \n ")] {
            assert_eq!(
                normalize(raw),
                Block::paragraph(NO_DESCRIPTION, TextStyle::Fallback)
            );
        }
    }

    #[test]
    fn list_items_become_bullets_and_empty_items_drop() {
        let block = normalize(Some("<ul><li>A</li><li></li><li>B</li></ul>"));
        assert_eq!(bullets(&block), ["A", "B"]);
    }

    #[test]
    fn list_item_text_is_trimmed_and_collapsed() {
        let block = normalize(Some("<ul><li>  Sterile,\n  <b>single</b>-use </li><li> 50 pcs</li></ul>"));
        assert_eq!(bullets(&block), ["Sterile, single-use", "50 pcs"]);
    }

    #[test]
    fn all_empty_items_fall_back() {
        let block = normalize(Some("<ul><li> </li><li></li></ul>"));
        assert_eq!(block.text(), Some(NO_DESCRIPTION));
    }

    #[test]
    fn markup_without_list_becomes_paragraph() {
        let block = normalize(Some("<p>Latex gloves</p><p>Powder <em>free</em></p>"));
        assert_eq!(
            block,
            Block::paragraph("Latex gloves Powder free", TextStyle::Description)
        );
    }

    #[test]
    fn line_breaks_separate_words() {
        let block = normalize(Some("Size M<br>Size L"));
        assert_eq!(block.text(), Some("Size M Size L"));
    }

    #[test]
    fn plain_text_passes_through() {
        let block = normalize(Some("  Disposable   face mask  "));
        assert_eq!(block.text(), Some("Disposable face mask"));
    }

    #[test]
    fn entities_are_decoded_and_scripts_skipped() {
        let block = normalize(Some("<p>Tom &amp; Jerry</p><script>alert(1)</script>"));
        assert_eq!(block.text(), Some("Tom & Jerry"));
    }

    #[test]
    fn markup_only_falls_back() {
        let block = normalize(Some("<p> </p><div></div>"));
        assert_eq!(block.text(), Some(NO_DESCRIPTION));
    }

    #[test]
    fn malformed_markup_is_text() {
        let block = normalize(Some("<p>Unclosed <b>bold"));
        assert_eq!(block.text(), Some("Unclosed bold"));
    }
}
