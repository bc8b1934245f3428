// src/extract/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Every href is resolved against the page it was found on with the same
// normalizer the crawl engine uses for its visited set, so the engine can
// compare the output directly against what it has already seen.
// =============================================================================

use scraper::{Html, Selector};

use crate::crawl::normalize_url;

// Extracts all hyperlink targets from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   source_url: the URL of the page (for resolving relative links)
//
// Returns: Vec<String> of normalized absolute http(s) URLs, in document order.
// Duplicates are kept; the engine dedups.
//
// Example:
//   html = "<a href='/docs/'>Docs</a><a href='#top'>Top</a>"
//   source_url = "https://example.com/index.html"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, source_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // "a[href]" is a constant, known-valid selector
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(source_url, href))
        .collect()
}

// Resolves one href to a normalized absolute URL
//
// Returns None for links that can never be crawled: in-page anchors,
// mailto:/tel:/javascript:/data: links and anything that is not http(s).
fn resolve_link(source_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("javascript:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = normalize_url(href, Some(source_url));
    if is_crawlable_link(&absolute) {
        Some(absolute)
    } else {
        None
    }
}

// Only HTTP and HTTPS can be fetched
fn is_crawlable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
