// src/crawl/result.rs
// =============================================================================
// What a crawl hands back: the extracted pages plus how the run ended.
//
// CrawlResult keeps pages in the order they were extracted so saved files are
// deterministic. The engine guarantees each URL appears once (its visited set
// is checked before anything is fetched), so a Vec is all we need.
// =============================================================================

use serde::Serialize;

use super::events::CrawlStatus;

// One page's extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedPage {
    /// Normalized URL of the page
    pub url: String,
    /// Main readable text
    pub text: String,
}

// Normalized URL -> extracted text, in extraction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CrawlResult {
    pages: Vec<ExtractedPage>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    // Records a page
    //
    // Returns false (and leaves the result untouched) if the URL is already
    // present.
    pub fn insert(&mut self, url: String, text: String) -> bool {
        if self.contains(&url) {
            return false;
        }
        self.pages.push(ExtractedPage { url, text });
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.iter().any(|page| page.url == url)
    }

    /// Text for `url`, if it was extracted
    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|page| page.url == url)
            .map(|page| page.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedPage> {
        self.pages.iter()
    }

    /// URLs in extraction order
    #[cfg(test)]
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.url.as_str())
    }
}

// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Frontier exhausted or page budget reached
    Completed,
    /// The caller asked the crawl to stop
    Stopped,
    /// The run aborted for a reason not tied to any single page
    Failed(String),
}

impl CrawlOutcome {
    /// The terminal status matching this outcome
    pub fn status(&self) -> CrawlStatus {
        match self {
            CrawlOutcome::Completed => CrawlStatus::Completed,
            CrawlOutcome::Stopped => CrawlStatus::Stopped,
            CrawlOutcome::Failed(_) => CrawlStatus::Failed,
        }
    }
}

// The final product of a run
//
// Partial results are kept on Stopped and Failed.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    #[serde(flatten)]
    pub outcome: CrawlOutcome,
    /// How many distinct normalized URLs were dequeued
    pub visited: usize,
    pub pages: CrawlResult,
}
