// src/crawl/fetch.rs
// =============================================================================
// Fetches a single page.
//
// One GET, a fixed user agent, a bounded timeout, no retries. Whatever goes
// wrong is turned into a FetchError so the engine can log it and move on.
//
// Rust concepts:
// - thiserror: derive Display/Error for our error enum
// - reqwest::Error helpers (is_timeout, is_redirect, is_connect) to classify
//   failures into something worth logging
// =============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;

use super::config::CrawlerConfig;
use super::error::CrawlError;

// A fetched response
//
// The body is only read for HTML; anything else comes back with an empty body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header, empty when the server sent none
    pub content_type: String,
    /// Response body decoded as text, empty unless the response is HTML
    pub body: String,
}

impl FetchedPage {
    /// True for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the Content-Type says this is an HTML document
    pub fn is_html(&self) -> bool {
        is_html_content_type(&self.content_type)
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

// Why a single fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not finish within the timeout
    #[error("request timed out")]
    Timeout,

    /// Redirect loop or too many hops
    #[error("too many redirects")]
    TooManyRedirects,

    /// DNS failure, refused connection, TLS handshake failure...
    #[error("connection failed: {0}")]
    Connect(String),

    /// Headers arrived but the body could not be read or decoded
    #[error("failed to read body: {0}")]
    Body(String),

    /// Anything else reqwest reports
    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    // Classifies a reqwest error into one of our variants
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

// HTTP client wrapper used for every page request in a crawl
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    // Builds the underlying reqwest client from the crawler configuration
    //
    // The user agent and timeout apply to every request made with this client.
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(CrawlError::Client)?;

        Ok(Self { client })
    }

    /// The shared client, for the robots.txt checker
    pub fn client(&self) -> &Client {
        &self.client
    }

    // Performs one GET request
    //
    // Non-2xx statuses are NOT errors here; the caller decides what to do with
    // them. Only transport-level failures become FetchError.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // PDFs, images and archives are dropped unread
        let body = if is_html_content_type(&content_type) {
            response.text().await.map_err(FetchError::from_reqwest)?
        } else {
            String::new()
        };

        Ok(FetchedPage {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fetcher() -> Fetcher {
        let config = CrawlerConfig::builder()
            .request_timeout(Duration::from_secs(2))
            .build();
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_status_type_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _page = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><body>hi</body></html>")
            .create_async()
            .await;

        let page = fetcher()
            .fetch(&format!("{}/page", server.url()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert!(page.is_success());
        assert!(page.is_html());
        assert_eq!(page.body, "<html><body>hi</body></html>");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let page_mock = server
            .mock("GET", "/ua")
            .match_header("user-agent", "test-agent/1.0")
            .with_status(200)
            .create_async()
            .await;

        let config = CrawlerConfig::builder().user_agent("test-agent/1.0").build();
        let fetcher = Fetcher::new(&config).unwrap();
        fetcher.fetch(&format!("{}/ua", server.url())).await.unwrap();

        page_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_a_response_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let page = fetcher()
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap();

        assert_eq!(page.status, 404);
        assert!(!page.is_success());
    }

    #[tokio::test]
    async fn test_non_html_body_is_not_read() {
        let mut server = mockito::Server::new_async().await;
        let _pdf = server
            .mock("GET", "/doc.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(vec![b'%'; 64 * 1024])
            .create_async()
            .await;

        let page = fetcher()
            .fetch(&format!("{}/doc.pdf", server.url()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert!(!page.is_html());
        assert!(page.body.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        let result = fetcher().fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_content_type_gate() {
        let pdf = FetchedPage {
            status: 200,
            content_type: "application/pdf".to_string(),
            body: String::new(),
        };
        assert!(!pdf.is_html());

        let upper = FetchedPage {
            status: 200,
            content_type: "TEXT/HTML".to_string(),
            body: String::new(),
        };
        assert!(upper.is_html());
    }
}
