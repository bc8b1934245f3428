// src/crawl/robots.rs
// =============================================================================
// robots.txt compliance.
//
// For every origin (scheme://host[:port]) we fetch /robots.txt once, parse it
// with texting_robots and keep the answer for the rest of the crawl.
//
// Failure policy is fail-open: if robots.txt cannot be fetched or parsed we
// allow everything on that origin. A missing robots file must not block a
// crawl. The one exception is 401/403, which means the site refuses us
// outright, so the whole origin is disallowed.
// =============================================================================

use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use texting_robots::Robot;
use tracing::{debug, warn};

use super::normalize::origin_of;

// What we know about one origin
enum RobotsPolicy {
    /// No usable robots.txt: everything may be fetched
    AllowAll,
    /// robots.txt answered 401 or 403
    DisallowAll,
    /// Parsed rules for our user agent
    Rules(Robot),
}

impl RobotsPolicy {
    fn allows(&self, url: &str) -> bool {
        match self {
            RobotsPolicy::AllowAll => true,
            RobotsPolicy::DisallowAll => false,
            RobotsPolicy::Rules(robot) => robot.allowed(url),
        }
    }
}

// Answers "may we fetch this URL?" and caches robots.txt per origin
//
// One checker lives for exactly one crawl run.
pub struct RobotsChecker {
    client: Client,
    user_agent: String,
    timeout: Duration,
    cache: HashMap<String, RobotsPolicy>,
}

impl RobotsChecker {
    // Creates a checker with an empty cache
    //
    // Parameters:
    //   client: shared HTTP client (cheap to clone)
    //   user_agent: full user-agent string; its product token is matched
    //               against User-agent lines
    //   timeout: per-request timeout for robots.txt
    pub fn new(client: Client, user_agent: &str, timeout: Duration) -> Self {
        Self {
            client,
            user_agent: user_agent.to_string(),
            timeout,
            cache: HashMap::new(),
        }
    }

    // Returns true when robots.txt permits fetching `url`
    //
    // The first call for an origin performs one network request; later calls
    // for the same origin are answered from the cache.
    pub async fn can_fetch(&mut self, url: &str) -> bool {
        let origin = match origin_of(url) {
            Some(origin) => origin,
            // Nothing to look up; the fetch itself will report the problem
            None => return true,
        };

        if !self.cache.contains_key(&origin) {
            let policy = self.load_policy(&origin).await;
            self.cache.insert(origin.clone(), policy);
        }

        self.cache
            .get(&origin)
            .map(|policy| policy.allows(url))
            .unwrap_or(true)
    }

    // Number of origins whose policy has been resolved
    #[cfg(test)]
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    async fn load_policy(&self, origin: &str) -> RobotsPolicy {
        let robots_url = format!("{}/robots.txt", origin);
        debug!("Fetching {}", robots_url);

        let response = match self
            .client
            .get(&robots_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Could not fetch {} ({}), allowing all", robots_url, e);
                return RobotsPolicy::AllowAll;
            }
        };

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!("{} answered {}, disallowing origin", robots_url, status);
            return RobotsPolicy::DisallowAll;
        }
        if !status.is_success() {
            debug!("{} answered {}, allowing all", robots_url, status);
            return RobotsPolicy::AllowAll;
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not read {} ({}), allowing all", robots_url, e);
                return RobotsPolicy::AllowAll;
            }
        };

        match Robot::new(product_token(&self.user_agent), &body) {
            Ok(robot) => RobotsPolicy::Rules(robot),
            Err(e) => {
                warn!("Could not parse {} ({}), allowing all", robots_url, e);
                RobotsPolicy::AllowAll
            }
        }
    }
}

// "gleaner/0.1.0 (+https://...)" -> "gleaner"
//
// robots.txt groups name crawlers by product token, not full UA strings.
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .filter(|token| !token.is_empty())
        .unwrap_or(user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> RobotsChecker {
        RobotsChecker::new(Client::new(), "gleaner/0.1.0", Duration::from_secs(2))
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("gleaner/0.1.0 (+https://x.com)"), "gleaner");
        assert_eq!(product_token("SomeBot"), "SomeBot");
    }

    #[tokio::test]
    async fn test_disallow_rules_are_honored() {
        let mut server = mockito::Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: *\nDisallow: /private/\n")
            .create_async()
            .await;

        let mut robots = checker();
        let base = server.url();
        assert!(robots.can_fetch(&format!("{}/public/page", base)).await);
        assert!(!robots.can_fetch(&format!("{}/private/page", base)).await);
    }

    #[tokio::test]
    async fn test_longest_match_wins() {
        let mut server = mockito::Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: *\nDisallow: /docs/\nAllow: /docs/public/\n")
            .create_async()
            .await;

        let mut robots = checker();
        let base = server.url();
        assert!(!robots.can_fetch(&format!("{}/docs/secret", base)).await);
        assert!(robots.can_fetch(&format!("{}/docs/public/intro", base)).await);
    }

    #[tokio::test]
    async fn test_robots_is_fetched_once_per_origin() {
        let mut server = mockito::Server::new_async().await;
        let robots_mock = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: *\nDisallow: /private/\n")
            .expect(1)
            .create_async()
            .await;

        let mut robots = checker();
        let base = server.url();
        for path in ["/a", "/b", "/private/c", "/d"] {
            robots.can_fetch(&format!("{}{}", base, path)).await;
        }

        robots_mock.assert_async().await;
        assert_eq!(robots.cached_origins(), 1);
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let mut server = mockito::Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .create_async()
            .await;

        let mut robots = checker();
        assert!(robots.can_fetch(&format!("{}/anything", server.url())).await);
    }

    #[tokio::test]
    async fn test_server_error_allows_all() {
        let mut server = mockito::Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(500)
            .create_async()
            .await;

        let mut robots = checker();
        assert!(robots.can_fetch(&format!("{}/anything", server.url())).await);
    }

    #[tokio::test]
    async fn test_forbidden_robots_disallows_all() {
        let mut server = mockito::Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(403)
            .create_async()
            .await;

        let mut robots = checker();
        assert!(!robots.can_fetch(&format!("{}/anything", server.url())).await);
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_open() {
        // Port 9 (discard) on localhost is almost never listening
        let mut robots = checker();
        assert!(robots.can_fetch("http://127.0.0.1:9/page").await);
    }

    #[tokio::test]
    async fn test_rules_for_other_agents_do_not_apply() {
        let mut server = mockito::Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: otherbot\nDisallow: /\n")
            .create_async()
            .await;

        let mut robots = checker();
        assert!(robots.can_fetch(&format!("{}/page", server.url())).await);
    }
}
