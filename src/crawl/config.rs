// src/crawl/config.rs
// =============================================================================
// Crawl parameters and crawler configuration.
//
// Two structs with two lifetimes:
// - CrawlParameters: what the caller asks for on one run (seed, depth, page
//   budget, delay). Validated before the run starts.
// - CrawlerConfig: how the crawler behaves on the wire (user agent, timeouts)
//   and how picky the text extractor is. Built with a builder.
// =============================================================================

use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::error::CrawlError;

/// Default depth, budget and delay for a run
pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_DELAY_SECS: f64 = 1.0;

// What to crawl on one run
//
// Immutable once the run starts.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlParameters {
    /// The URL the crawl starts from
    pub seed_url: String,
    /// Pages deeper than this are never fetched (seed is depth 0)
    pub max_depth: usize,
    /// Hard ceiling on the number of pages with extracted text
    pub max_pages: usize,
    /// Pause after each attempted fetch, in seconds
    pub delay_secs: f64,
}

impl CrawlParameters {
    /// Parameters for `seed_url` with the default depth, budget and delay
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            delay_secs: DEFAULT_DELAY_SECS,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_delay_secs(mut self, delay_secs: f64) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    /// The per-fetch delay as a Duration
    //
    // Values validate() rejects map to no delay at all.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }

    // Rejects parameters a run cannot start with
    //
    // Checked before any crawl state exists, so a rejection leaves nothing
    // behind.
    pub fn validate(&self) -> Result<(), CrawlError> {
        let seed = self.seed_url.trim();
        if seed.is_empty() {
            return Err(CrawlError::InvalidParameters(
                "seed URL is empty".to_string(),
            ));
        }

        let parsed = Url::parse(seed).map_err(|e| {
            CrawlError::InvalidParameters(format!("invalid seed URL '{}': {}", seed, e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CrawlError::InvalidParameters(format!(
                "seed URL must be http or https: {}",
                seed
            )));
        }
        if parsed.host_str().is_none() {
            return Err(CrawlError::InvalidParameters(format!(
                "seed URL has no host: {}",
                seed
            )));
        }

        if self.max_pages == 0 {
            return Err(CrawlError::InvalidParameters(
                "max pages must be greater than zero".to_string(),
            ));
        }
        if Duration::try_from_secs_f64(self.delay_secs).is_err() {
            return Err(CrawlError::InvalidParameters(format!(
                "delay must be a non-negative number of seconds, got {}",
                self.delay_secs
            )));
        }

        Ok(())
    }
}

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// User agent sent with every request and matched against robots.txt
    pub user_agent: String,

    /// Timeout for page requests
    pub request_timeout: Duration,

    /// Timeout for robots.txt requests
    pub robots_timeout: Duration,

    /// Extracted text shorter than this counts as "no content"
    pub min_text_chars: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "gleaner/{} (+https://github.com/gleaner-rs/gleaner)",
                env!("CARGO_PKG_VERSION")
            ),
            request_timeout: Duration::from_secs(10),
            robots_timeout: Duration::from_secs(5),
            min_text_chars: crate::extract::DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the timeout for page requests
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the timeout for robots.txt requests
    pub fn robots_timeout(mut self, timeout: Duration) -> Self {
        self.config.robots_timeout = timeout;
        self
    }

    /// Set the minimum length of extracted text
    pub fn min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.config.min_text_chars = min_text_chars;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::default()
    }
}
