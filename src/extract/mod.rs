// src/extract/mod.rs
// =============================================================================
// This module turns fetched HTML into the two things the crawler needs:
//
// Submodules:
// - html: the outbound links of a page (what to crawl next)
// - content: the page's main readable text (what we keep)
//
// Both are pure functions of the HTML, recomputed for every page.
// =============================================================================

mod content;
mod html;

pub use content::{ContentExtractor, DEFAULT_MIN_TEXT_CHARS};
pub use html::extract_html_links;
