// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// One command, one positional argument (the seed URL) and a handful of flags
// that map onto CrawlParameters and CrawlerConfig.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::crawl::{
    CrawlParameters, CrawlerConfig, DEFAULT_DELAY_SECS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES,
};
use crate::extract::DEFAULT_MIN_TEXT_CHARS;

// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "gleaner",
    version,
    about = "Crawl one website politely and keep the readable text of every page",
    long_about = "gleaner walks a website breadth-first from a seed URL, stays on the seed's host, \
                  honors robots.txt and pauses between requests. The main text of each HTML page \
                  is kept and written out when the crawl ends, or when you press Ctrl-C."
)]
pub struct Cli {
    /// URL the crawl starts from (e.g., https://example.com)
    pub seed_url: String,

    /// How many link hops to follow from the seed (0 = only the seed)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Stop after extracting text from this many pages
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Seconds to wait after each request
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay: f64,

    /// Save the extracted text to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the crawl report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// User agent for requests and robots.txt matching
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Pages with less extracted text than this many characters are skipped
    #[arg(long, default_value_t = DEFAULT_MIN_TEXT_CHARS)]
    pub min_chars: usize,

    /// Only print the final summary (no per-page log lines)
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    pub fn crawl_parameters(&self) -> CrawlParameters {
        CrawlParameters::new(self.seed_url.clone())
            .with_max_depth(self.max_depth)
            .with_max_pages(self.max_pages)
            .with_delay_secs(self.delay)
    }

    // robots.txt never gets longer than a page request, and at most 5s
    pub fn crawler_config(&self) -> CrawlerConfig {
        let mut builder = CrawlerConfig::builder()
            .request_timeout(Duration::from_secs(self.timeout.max(1)))
            .robots_timeout(Duration::from_secs(self.timeout.clamp(1, 5)))
            .min_text_chars(self.min_chars);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder.build()
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Option<String> for --user-agent?
//    - None means "flag not given", so the crawler keeps its own default
//    - default_value_t would force us to repeat that default here
//
// 2. Why PathBuf instead of String for --output?
//    - PathBuf is the owned path type; it handles non-UTF-8 file names
//    - clap parses straight into it
//
// 3. Why are the defaults constants from the crawl module?
//    - The library and the CLI must agree on them
//    - One definition, two users
// -----------------------------------------------------------------------------
