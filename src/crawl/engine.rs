// src/crawl/engine.rs
// =============================================================================
// The crawl engine: a breadth-first traversal bounded by depth and page count.
//
// One loop iteration:
//   dequeue -> normalize -> visited? -> too deep? -> robots.txt -> fetch
//   -> HTML? -> extract text -> (not at max depth) queue same-domain links
//   -> sleep for the politeness delay
//
// Per-page problems (fetch errors, 404s, PDFs, empty pages, robots blocks) are
// logged and skipped; they never end the run. The run ends when the frontier
// is empty, the page budget is spent, or the caller asks it to stop.
//
// Two entry points:
// - run_crawl: runs one crawl to the end on the current task
// - CrawlEngine::start: runs it on a spawned task and hands back a CrawlHandle
//   with the event stream and a stop button
// =============================================================================

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::config::{CrawlParameters, CrawlerConfig};
use super::error::CrawlError;
use super::events::{stop_channel, CrawlEvent, CrawlStatus, EventSink, StopHandle, StopSignal};
use super::fetch::Fetcher;
use super::normalize::{domain_of, normalize_url};
use super::queue::{Frontier, FrontierEntry};
use super::result::{CrawlOutcome, CrawlReport, CrawlResult};
use super::robots::RobotsChecker;
use crate::extract::{extract_html_links, ContentExtractor};

// Runs one crawl to completion
//
// Parameters:
//   params: seed, depth, page budget and delay for this run
//   config: user agent, timeouts, extraction threshold
//   stop: checked at the top of every iteration and raced against waits
//   events: where log/progress/status events go
//
// Returns: Err only when the parameters are invalid (nothing has started).
// Every started run returns a CrawlReport, including on Stopped and Failed.
#[instrument(skip_all, fields(seed = %params.seed_url))]
pub async fn run_crawl(
    params: &CrawlParameters,
    config: &CrawlerConfig,
    stop: StopSignal,
    events: EventSink,
) -> Result<CrawlReport, CrawlError> {
    params.validate()?;
    let seed = params.seed_url.trim();
    let base_domain = domain_of(seed).ok_or_else(|| {
        CrawlError::InvalidParameters(format!("seed URL has no host: {}", seed))
    })?;

    events.status(CrawlStatus::Running);
    events.info(format!("Starting crawl from: {}", seed));
    events.info(format!(
        "Max depth: {}, Max pages: {}, Delay: {}s",
        params.max_depth, params.max_pages, params.delay_secs
    ));

    let fetcher = match Fetcher::new(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            let report = CrawlReport {
                outcome: CrawlOutcome::Failed(e.to_string()),
                visited: 0,
                pages: CrawlResult::new(),
            };
            finish(&events, &report);
            return Ok(report);
        }
    };

    let mut crawl = Crawl {
        params,
        base_domain,
        robots: RobotsChecker::new(
            fetcher.client().clone(),
            &config.user_agent,
            config.robots_timeout,
        ),
        fetcher,
        extractor: ContentExtractor::new(config.min_text_chars),
        frontier: Frontier::new(seed),
        result: CrawlResult::new(),
        stop,
        events: events.clone(),
    };

    let outcome = match AssertUnwindSafe(crawl.run_loop()).catch_unwind().await {
        Ok(LoopEnd::Stopped) => CrawlOutcome::Stopped,
        Ok(LoopEnd::Exhausted) | Ok(LoopEnd::BudgetReached) => CrawlOutcome::Completed,
        Err(panic) => CrawlOutcome::Failed(panic_message(panic)),
    };

    let report = CrawlReport {
        outcome,
        visited: crawl.frontier.visited_count(),
        pages: crawl.result,
    };
    finish(&events, &report);
    Ok(report)
}

// Final log line and status event for a run
fn finish(events: &EventSink, report: &CrawlReport) {
    let pages = report.pages.len();
    match &report.outcome {
        CrawlOutcome::Completed => events.info(format!(
            "Crawl completed. Extracted text from {} pages.",
            pages
        )),
        CrawlOutcome::Stopped => events.info(format!(
            "Crawl stopped. Extracted text from {} pages.",
            pages
        )),
        CrawlOutcome::Failed(reason) => events.warn(format!(
            "Crawl failed: {}. Extracted text from {} pages.",
            reason, pages
        )),
    }
    events.status(report.outcome.status());
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("crawler panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("crawler panicked: {}", message)
    } else {
        "crawler panicked".to_string()
    }
}

// Why the loop ended
enum LoopEnd {
    Exhausted,
    BudgetReached,
    Stopped,
}

// What happened to one dequeued entry
enum Visit {
    /// Skipped before any page request was made
    Skipped,
    /// A page request was made (whatever its result)
    Attempted,
    /// The stop signal arrived mid-visit
    Interrupted,
}

// All state of one run; dropped when the run ends
struct Crawl<'a> {
    params: &'a CrawlParameters,
    base_domain: String,
    fetcher: Fetcher,
    robots: RobotsChecker,
    extractor: ContentExtractor,
    frontier: Frontier,
    result: CrawlResult,
    stop: StopSignal,
    events: EventSink,
}

impl Crawl<'_> {
    async fn run_loop(&mut self) -> LoopEnd {
        loop {
            if self.stop.is_stopped() {
                return LoopEnd::Stopped;
            }
            if self.result.len() >= self.params.max_pages {
                return LoopEnd::BudgetReached;
            }
            let Some(entry) = self.frontier.pop() else {
                return LoopEnd::Exhausted;
            };

            match self.visit(entry).await {
                Visit::Skipped => continue,
                Visit::Interrupted => return LoopEnd::Stopped,
                Visit::Attempted => {
                    if !self.polite_delay().await {
                        return LoopEnd::Stopped;
                    }
                }
            }
        }
    }

    async fn visit(&mut self, entry: FrontierEntry) -> Visit {
        let url = normalize_url(&entry.url, None);
        let depth = entry.depth;

        if !self.frontier.mark_visited(&url) {
            debug!("Already visited: {}", url);
            return Visit::Skipped;
        }
        if depth > self.params.max_depth {
            debug!("Beyond max depth ({}): {}", depth, url);
            return Visit::Skipped;
        }

        let allowed = tokio::select! {
            allowed = self.robots.can_fetch(&url) => allowed,
            _ = self.stop.stopped() => return Visit::Interrupted,
        };
        if !allowed {
            self.events
                .info(format!("Skipping (blocked by robots.txt): {}", url));
            return Visit::Skipped;
        }

        self.events.info(format!("Crawling ({}): {}", depth, url));
        let fetched = tokio::select! {
            fetched = self.fetcher.fetch(&url) => fetched,
            _ = self.stop.stopped() => return Visit::Interrupted,
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                self.events
                    .warn(format!("Error processing {}: {}", url, e));
                return Visit::Attempted;
            }
        };
        // Error pages still get extracted when they are HTML
        if !page.is_success() {
            self.events
                .info(format!("HTTP {} for {}", page.status, url));
        }
        if !page.is_html() {
            self.events
                .info(format!("Skipping (non-HTML content): {}", url));
            return Visit::Attempted;
        }

        let text = self.extractor.extract(&page.body);
        if text.is_empty() {
            self.events.info(format!("No content extracted: {}", url));
        } else if self.result.insert(url.clone(), text) {
            let done = self.result.len();
            self.events.info(format!(
                "Extracted content ({}/{})",
                done, self.params.max_pages
            ));
            self.events.progress(done, self.params.max_pages);
        }

        // Leaf level: fetched for its text, no further expansion
        if depth >= self.params.max_depth {
            return Visit::Attempted;
        }

        let links = extract_html_links(&page.body, &url);
        let queued = self
            .frontier
            .enqueue_links(links, depth + 1, &self.base_domain);
        self.events.info(format!("Found {} new links", queued));

        Visit::Attempted
    }

    // Sleeps for the configured delay after a page request
    //
    // Returns false if the stop signal arrived while sleeping. No sleep when
    // the loop is about to end anyway.
    async fn polite_delay(&self) -> bool {
        let delay = self.params.delay();
        let more_to_do =
            self.frontier.has_unvisited() && self.result.len() < self.params.max_pages;
        if delay.is_zero() || !more_to_do {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.stop.stopped() => false,
        }
    }
}

// Runs crawls on background tasks, one at a time
//
// The engine only tracks its status; all crawl state belongs to the task.
#[derive(Debug, Clone)]
pub struct CrawlEngine {
    config: CrawlerConfig,
    status: Arc<watch::Sender<CrawlStatus>>,
}

impl CrawlEngine {
    pub fn new(config: CrawlerConfig) -> Self {
        let (status, _) = watch::channel(CrawlStatus::Idle);
        Self {
            config,
            status: Arc::new(status),
        }
    }

    /// Current status: Idle before the first run, then the latest run's state
    #[cfg(test)]
    pub fn status(&self) -> CrawlStatus {
        *self.status.borrow()
    }

    // Starts a crawl on a new tokio task
    //
    // Errors:
    //   InvalidParameters: rejected before anything is created
    //   AlreadyRunning: a crawl from this engine has not finished yet
    pub fn start(&self, params: CrawlParameters) -> Result<CrawlHandle, CrawlError> {
        params.validate()?;

        let claimed = self.status.send_if_modified(|status| {
            if *status == CrawlStatus::Running {
                false
            } else {
                *status = CrawlStatus::Running;
                true
            }
        });
        if !claimed {
            return Err(CrawlError::AlreadyRunning);
        }

        let (stop, signal) = stop_channel();
        let (sink, events) = EventSink::channel();
        let guard = StatusGuard(Arc::clone(&self.status));
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            let report = match run_crawl(&params, &config, signal, sink).await {
                Ok(report) => report,
                Err(e) => CrawlReport {
                    outcome: CrawlOutcome::Failed(e.to_string()),
                    visited: 0,
                    pages: CrawlResult::new(),
                },
            };
            guard.0.send_replace(report.outcome.status());
            report
        });

        Ok(CrawlHandle { events, stop, task })
    }
}

// Marks the engine Failed if a crawl task ends without reporting a status
struct StatusGuard(Arc<watch::Sender<CrawlStatus>>);

impl Drop for StatusGuard {
    fn drop(&mut self) {
        self.0.send_if_modified(|status| {
            if *status == CrawlStatus::Running {
                *status = CrawlStatus::Failed;
                true
            } else {
                false
            }
        });
    }
}

// The caller's side of a running crawl
pub struct CrawlHandle {
    /// Log, progress and status events, in emission order. Closes when the
    /// crawl ends.
    pub events: mpsc::UnboundedReceiver<CrawlEvent>,
    stop: StopHandle,
    task: JoinHandle<CrawlReport>,
}

impl CrawlHandle {
    /// A clonable stop button, usable while `events` is being read
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Waits for the crawl to end and returns its report
    pub async fn join(self) -> CrawlReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => CrawlReport {
                outcome: CrawlOutcome::Failed(format!("crawl task ended abnormally: {}", e)),
                visited: 0,
                pages: CrawlResult::new(),
            },
        }
    }
}
