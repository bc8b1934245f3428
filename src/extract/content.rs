// src/extract/content.rs
// =============================================================================
// Main-text extraction.
//
// A small readability-style heuristic on top of `scraper`:
// 1. Boilerplate subtrees (scripts, styles, navigation, headers, footers,
//    sidebars, forms...) are never read.
// 2. If the page marks its main content (<article>, <main>, role="main"), the
//    longest such container wins.
// 3. Otherwise every paragraph-like block scores its text length for its
//    parent (full) and grandparent (half), and the best-scoring element wins.
// 4. Lines that are mostly link text (menus, tag clouds) are dropped.
//
// Finding nothing worth keeping is normal: the result is just an empty string.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

/// Extracted text shorter than this is treated as "no content"
pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;

// Elements whose whole subtree is ignored
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "template", "button", "select", "head",
];

// Elements that start a new line of output
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "tbody", "td", "th", "thead", "tr", "ul", "body",
];

const MAIN_CONTENT_SELECTOR: &str = "article, main, [role=main]";
const SCORED_BLOCK_SELECTOR: &str = "p, pre, blockquote, li, td, h1, h2, h3, h4, h5, h6";

// Blocks shorter than this do not vote for their parents
const MIN_SCORED_BLOCK_CHARS: usize = 25;

// Lines whose link text exceeds this share are dropped
const MAX_LINK_DENSITY: f64 = 0.5;

// Extracts main text with the default minimum length
#[cfg(test)]
pub fn extract_text(html: &str) -> String {
    ContentExtractor::default().extract(html)
}

// Readability-style extractor with a configurable "substantial content" bar
#[derive(Debug, Clone, Copy)]
pub struct ContentExtractor {
    min_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TEXT_CHARS)
    }
}

impl ContentExtractor {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    // Returns the primary readable text of `html`, or "" if there is none
    //
    // Output is one block per line, whitespace collapsed.
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let text = main_content(&document, self.min_chars)
            .or_else(|| best_scored(&document))
            .map(render_text)
            .unwrap_or_else(|| render_text(document.root_element()));

        if text.chars().count() < self.min_chars {
            String::new()
        } else {
            text
        }
    }
}

// The longest <article>/<main>/[role=main] container, if it is long enough
fn main_content(document: &Html, min_chars: usize) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(MAIN_CONTENT_SELECTOR).ok()?;

    document
        .select(&selector)
        .filter(|element| !inside_skipped(*element))
        .map(|element| (element, render_text(element).chars().count()))
        .filter(|(_, len)| *len >= min_chars)
        .fold(None, |best: Option<(ElementRef<'_>, usize)>, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        })
        .map(|(element, _)| element)
}

// The element whose paragraph-like descendants carry the most text
fn best_scored(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(SCORED_BLOCK_SELECTOR).ok()?;
    let mut scores: Vec<(ElementRef<'_>, f64)> = Vec::new();

    for block in document.select(&selector) {
        if inside_skipped(block) {
            continue;
        }
        let len = collapsed_len(block);
        if len < MIN_SCORED_BLOCK_CHARS {
            continue;
        }

        let parent = block.parent().and_then(ElementRef::wrap);
        let grandparent = parent
            .and_then(|parent| parent.parent())
            .and_then(ElementRef::wrap);

        if let Some(parent) = parent {
            add_score(&mut scores, parent, len as f64);
        }
        if let Some(grandparent) = grandparent {
            add_score(&mut scores, grandparent, len as f64 / 2.0);
        }
    }

    // First-seen wins ties, so the choice is stable for a given document
    scores
        .into_iter()
        .fold(None, |best: Option<(ElementRef<'_>, f64)>, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        })
        .map(|(element, _)| element)
}

fn add_score<'a>(scores: &mut Vec<(ElementRef<'a>, f64)>, element: ElementRef<'a>, score: f64) {
    match scores.iter_mut().find(|(seen, _)| seen.id() == element.id()) {
        Some((_, total)) => *total += score,
        None => scores.push((element, score)),
    }
}

fn inside_skipped(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| SKIPPED_TAGS.contains(&ancestor.value().name()))
}

fn collapsed_len(element: ElementRef<'_>) -> usize {
    element
        .text()
        .flat_map(str::split_whitespace)
        .map(|word| word.chars().count() + 1)
        .sum()
}

// Renders an element's readable text, one block per line
fn render_text(element: ElementRef<'_>) -> String {
    let mut collector = TextCollector::default();
    collector.walk(element);
    collector.finish()
}

// Accumulates lines of text while walking the DOM
#[derive(Default)]
struct TextCollector {
    lines: Vec<String>,
    current: String,
    current_link_chars: usize,
    link_depth: usize,
    pending_space: bool,
}

impl TextCollector {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.push_text(text);
                continue;
            }

            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };
            let name = child.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            if name == "br" {
                self.break_line();
                continue;
            }

            let is_block = BLOCK_TAGS.contains(&name);
            let is_link = name == "a";

            if is_block {
                self.break_line();
            }
            if is_link {
                self.link_depth += 1;
            }
            self.walk(child);
            if is_link {
                self.link_depth -= 1;
            }
            if is_block {
                self.break_line();
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        let starts_with_space = text.starts_with(char::is_whitespace);
        let before = self.current.chars().count();
        if (starts_with_space || self.pending_space) && !self.current.is_empty() {
            self.current.push(' ');
        }
        for (i, word) in words.enumerate() {
            if i > 0 {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
        if self.link_depth > 0 {
            self.current_link_chars += self.current.chars().count() - before;
        }
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        let link_chars = std::mem::take(&mut self.current_link_chars);
        self.pending_space = false;

        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let total = line.chars().count();
        if link_chars as f64 / total as f64 > MAX_LINK_DENSITY {
            return;
        }
        self.lines.push(line.to_string());
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_SENTENCE: &str = "Rust is a systems programming language that runs blazingly fast, \
        prevents segfaults, and guarantees thread safety for everyone.";

    #[test]
    fn test_article_wins_over_boilerplate() {
        let html = format!(
            r#"<html><head><title>T</title><style>body {{ color: red; }}</style></head>
            <body>
              <nav><a href="/">Home</a> <a href="/about">About</a></nav>
              <header>Site banner</header>
              <article><h1>Story</h1><p>{}</p><script>var x = 1;</script></article>
              <footer>Copyright 2024</footer>
            </body></html>"#,
            LONG_SENTENCE
        );

        let text = extract_text(&html);
        assert!(text.starts_with("Story\n"), "got: {}", text);
        assert!(text.contains("blazingly fast"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Site banner"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_scoring_picks_the_content_column() {
        let html = format!(
            r#"<html><body>
              <div id="sidebar"><p>Short note.</p></div>
              <div id="content"><p>{0}</p><p>{0}</p></div>
            </body></html>"#,
            LONG_SENTENCE
        );

        let text = extract_text(&html);
        assert!(text.contains("blazingly fast"));
        assert!(!text.contains("Short note"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_short_page_has_no_content() {
        let html = "<html><body><p>Hello there.</p></body></html>";
        assert_eq!(extract_text(html), "");
    }

    #[test]
    fn test_empty_document_has_no_content() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("<html><body><script>alert(1)</script></body></html>"), "");
    }

    #[test]
    fn test_link_heavy_lines_are_dropped() {
        let html = format!(
            r#"<html><body><div>
              <p>{}</p>
              <div><a href="/a">Alpha</a> <a href="/b">Beta</a> <a href="/c">Gamma</a></div>
              <p>Read <a href="/more">more</a> about it in the full documentation pages.</p>
            </div></body></html>"#,
            LONG_SENTENCE
        );

        let text = extract_text(&html);
        assert!(!text.contains("Alpha"));
        assert!(text.contains("Read more about it"));
    }

    #[test]
    fn test_inline_elements_keep_word_spacing() {
        let html = format!(
            "<html><body><p>Hello <b>bold</b> and <i>italic</i>world. {}</p></body></html>",
            LONG_SENTENCE
        );
        let text = extract_text(&html);
        assert!(text.starts_with("Hello bold and italicworld."), "got: {}", text);
    }

    #[test]
    fn test_custom_minimum() {
        let html = "<html><body><p>Hello there.</p></body></html>";
        assert_eq!(ContentExtractor::new(5).extract(html), "Hello there.");
    }

    #[test]
    fn test_page_without_paragraphs_falls_back_to_body() {
        let html = format!("<html><body><div>{}</div></body></html>", LONG_SENTENCE);
        let text = extract_text(&html);
        assert!(text.contains("guarantees thread safety"));
    }
}
