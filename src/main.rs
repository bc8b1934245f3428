// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Start the crawl on a background task
// 3. Print its log/progress events as they arrive; Ctrl-C asks it to stop
// 4. Save or print the extracted text
// 5. Exit with proper code (0 = completed, 1 = stopped, 2 = failed or error)
//
// Rust concepts used:
// - async/await: the crawl runs on a tokio task while we listen for events
// - tokio::select!: wait for "next event" and "Ctrl-C" at the same time
// - Result<T, E>: errors bubble up with ? and become exit code 2
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the crawl engine
mod extract; // src/extract/ - link and main-text extraction
mod output; // src/output.rs - text and JSON renderings

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter, Layer};

use cli::Cli;
use crawl::{CrawlEngine, CrawlEvent, CrawlOutcome, CrawlReport, CrawlStatus, LogLevel};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Diagnostics go to stderr and are off unless RUST_LOG asks for them
fn init_tracing() {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry().with(console_layer).init();
}

// This is the main application logic
// Returns:
//   Ok(0) = crawl completed
//   Ok(1) = crawl stopped by Ctrl-C
//   Ok(2) = crawl failed
//   Err = invalid input or an output error
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let console = Console {
        quiet: cli.quiet,
        to_stderr: cli.json,
    };

    let engine = CrawlEngine::new(cli.crawler_config());
    let mut handle = engine.start(cli.crawl_parameters())?;
    let stop = handle.stop_handle();

    // Ctrl-C once asks the crawl to stop; the event stream closes when it has
    let mut interrupted = false;
    loop {
        tokio::select! {
            event = handle.events.recv() => match event {
                Some(event) => console.event(&event),
                None => break,
            },
            result = tokio::signal::ctrl_c(), if !interrupted => {
                result?;
                interrupted = true;
                console.line("Stop requested, finishing the current page...");
                stop.stop();
            }
        }
    }

    let report = handle.join().await;

    if let Some(path) = &cli.output {
        output::save_text(&report.pages, path)?;
        console.line(&format!(
            "Saved {} pages to {}",
            report.pages.len(),
            path.display()
        ));
    }

    if cli.json {
        println!("{}", output::to_json(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(exit_code(&report.outcome))
}

fn exit_code(outcome: &CrawlOutcome) -> i32 {
    match outcome {
        CrawlOutcome::Completed => 0,
        CrawlOutcome::Stopped => 1,
        CrawlOutcome::Failed(_) => 2,
    }
}

// Where and how much to print while the crawl runs
//
// With --json, stdout is reserved for the report, so everything else moves to
// stderr.
struct Console {
    quiet: bool,
    to_stderr: bool,
}

impl Console {
    fn event(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Log { level, message } => match level {
                LogLevel::Info => {
                    if !self.quiet {
                        self.line(message);
                    }
                }
                LogLevel::Warn => eprintln!("⚠️  {}", message),
            },
            CrawlEvent::Progress {
                pages_done,
                max_pages,
            } => {
                if !self.quiet {
                    self.line(&format!("📄 Progress: {}/{} pages", pages_done, max_pages));
                }
            }
            CrawlEvent::Status { status } => {
                if status.is_terminal() && !self.quiet {
                    self.line(&format!("Status: {}", status_label(*status)));
                }
            }
        }
    }

    fn line(&self, message: &str) {
        if self.to_stderr {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }
}

fn status_label(status: CrawlStatus) -> &'static str {
    match status {
        CrawlStatus::Idle => "idle",
        CrawlStatus::Running => "running",
        CrawlStatus::Completed => "✅ completed",
        CrawlStatus::Stopped => "⏹️  stopped",
        CrawlStatus::Failed => "❌ failed",
    }
}

fn print_summary(report: &CrawlReport) {
    println!();
    println!("📊 Summary:");
    match &report.outcome {
        CrawlOutcome::Completed => println!("   ✅ Completed"),
        CrawlOutcome::Stopped => println!("   ⏹️  Stopped early"),
        CrawlOutcome::Failed(reason) => println!("   ❌ Failed: {}", reason),
    }
    println!("   🔗 URLs visited: {}", report.visited);
    if report.pages.is_empty() {
        println!("   📄 No page had enough text to keep");
    } else {
        println!("   📄 Pages with text: {}", report.pages.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&CrawlOutcome::Completed), 0);
        assert_eq!(exit_code(&CrawlOutcome::Stopped), 1);
        assert_eq!(exit_code(&CrawlOutcome::Failed("boom".into())), 2);
    }
}
