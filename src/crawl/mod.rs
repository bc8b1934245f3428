// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Same-domain restriction (never leaves the seed's host)
// - Depth limit and a hard page budget
// - robots.txt compliance, cached per origin
// - Polite delay between requests, interruptible by a stop signal
// - Log, progress and status events for whoever is watching
//
// Submodules:
// - normalize: canonical URL form (the visited-set and result key)
// - robots: robots.txt fetching and caching
// - fetch: the HTTP client wrapper
// - queue: the frontier (FIFO queue + visited set)
// - engine: the crawl loop and the background-task front end
// - config / events / result / error: the types flowing through all of it
// =============================================================================

mod config;
mod engine;
mod error;
mod events;
mod fetch;
mod normalize;
mod queue;
mod result;
mod robots;

pub use config::{
    CrawlParameters, CrawlerConfig, DEFAULT_DELAY_SECS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES,
};
pub use engine::CrawlEngine;
pub use events::{CrawlEvent, CrawlStatus, LogLevel};
pub use normalize::normalize_url;
pub use result::{CrawlOutcome, CrawlReport, CrawlResult};
