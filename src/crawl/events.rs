// src/crawl/events.rs
// =============================================================================
// How the crawl worker talks to whoever started it.
//
// Two one-way channels:
// - worker -> caller: CrawlEvent values (log lines, progress, status changes)
//   over an unbounded mpsc channel, so the worker never waits on the caller
// - caller -> worker: a stop flag over a tokio watch channel, checked at the
//   top of every loop iteration and raced against fetches and delays
//
// The caller never gets a reference into the engine's state. It only sees
// events and, at the end, the finished CrawlReport.
// =============================================================================

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

// Lifecycle of one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Idle,
    Running,
    Completed,
    Stopped,
    Failed,
}

impl CrawlStatus {
    /// Completed, Stopped and Failed are final for a run
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CrawlStatus::Completed | CrawlStatus::Stopped | CrawlStatus::Failed
        )
    }
}

// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
}

// Something the caller may want to show
//
// Crawl correctness never depends on anyone reading these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// A human-readable log line
    Log { level: LogLevel, message: String },
    /// A page was added to the result
    Progress { pages_done: usize, max_pages: usize },
    /// The run moved to a new state
    Status { status: CrawlStatus },
}

// Sending half of the event stream, owned by the worker
//
// A dropped receiver is fine: events are simply discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<CrawlEvent>,
}

impl EventSink {
    /// A new sink and the receiver the caller reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }

    pub fn status(&self, status: CrawlStatus) {
        self.emit(CrawlEvent::Status { status });
    }

    pub fn progress(&self, pages_done: usize, max_pages: usize) {
        self.emit(CrawlEvent::Progress {
            pages_done,
            max_pages,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.emit(CrawlEvent::Log {
            level: LogLevel::Info,
            message,
        });
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.emit(CrawlEvent::Log {
            level: LogLevel::Warn,
            message,
        });
    }
}

// Caller side of the stop flag
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Asks the crawl to stop. Calling it again has no further effect.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

// Worker side of the stop flag
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// True once stop() has been called
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    // Resolves when stop() is called
    //
    // If every StopHandle is dropped without stopping, this never resolves.
    pub async fn stopped(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Creates a connected stop handle/signal pair
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx: Arc::new(tx) }, StopSignal { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stop_is_observed() {
        let (handle, signal) = stop_channel();
        assert!(!signal.is_stopped());
        handle.stop();
        assert!(signal.is_stopped());
        handle.stop();
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() {
        let (handle, signal) = stop_channel();
        let waiter = tokio::spawn(async move { signal.stopped().await });
        handle.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("stop was not observed")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stopped_never_resolves_without_stop() {
        let (handle, signal) = stop_channel();
        drop(handle);
        let waited = tokio::time::timeout(Duration::from_millis(50), signal.stopped()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.status(CrawlStatus::Running);
        sink.info("hello");
        sink.progress(1, 10);

        assert_eq!(
            rx.try_recv().unwrap(),
            CrawlEvent::Status {
                status: CrawlStatus::Running
            }
        );
        assert!(matches!(rx.try_recv().unwrap(), CrawlEvent::Log { .. }));
        assert_eq!(
            rx.try_recv().unwrap(),
            CrawlEvent::Progress {
                pages_done: 1,
                max_pages: 10
            }
        );
    }

    #[test]
    fn test_sink_survives_dropped_receiver() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.info("nobody is listening");
        sink.warn("nor here");
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&CrawlEvent::Progress {
            pages_done: 2,
            max_pages: 5,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"progress","pages_done":2,"max_pages":5}"#);
    }
}
