// src/crawl/normalize.rs
// =============================================================================
// This module turns URLs into stable keys and decides which URLs are in scope.
//
// Two jobs:
// - normalize_url: resolve against a base, drop the #fragment, drop trailing
//   slashes. The result is what we store in the visited set and the results.
// - domain_of / is_same_domain: the host[:port] of a URL, compared against the
//   seed's host to keep the crawl on one site.
//
// Rust concepts:
// - Option<&str>: an optional borrowed base URL
// - Url::join: resolves relative links exactly the way a browser does
// =============================================================================

use url::Url;

// Canonicalizes a URL so that two spellings of the same page share one key
//
// Parameters:
//   url: the URL or href to normalize (may be relative when base is given)
//   base: the page the href was found on, if any
//
// Returns: the normalized URL as a String
//
// Examples:
//   ("https://x.com/a/", None)          -> "https://x.com/a"
//   ("https://x.com/a#top", None)       -> "https://x.com/a"
//   ("../b", Some("https://x.com/a/c")) -> "https://x.com/b"
//   ("https://x.com/", None)            -> "https://x.com"
//
// Never fails. Input that cannot be parsed comes back with the fragment and
// trailing slashes removed textually; fetching it will fail later instead.
pub fn normalize_url(url: &str, base: Option<&str>) -> String {
    let parsed = match base {
        Some(base) => Url::parse(base).and_then(|base| base.join(url)),
        None => Url::parse(url),
    };

    match parsed {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            let has_query = parsed.query().is_some();
            let serialized = String::from(parsed);
            if has_query {
                serialized
            } else {
                serialized.trim_end_matches('/').to_string()
            }
        }
        Err(_) => fallback_normalize(url),
    }
}

// Best-effort normalization for strings the URL parser rejects
fn fallback_normalize(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or_default();
    without_fragment.trim().trim_end_matches('/').to_string()
}

// Returns the lower-cased host of a URL, with the port when one is explicit
//
// Default ports are dropped by the parser, so "https://x.com:443/" and
// "https://x.com/" both give "x.com".
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

// Checks whether `url` lives on exactly the same host[:port] as the seed
//
// Subdomains do not count: "blog.example.com" is not "example.com".
pub fn is_same_domain(url: &str, base_domain: &str) -> bool {
    match domain_of(url) {
        Some(domain) => domain == base_domain.to_lowercase(),
        None => false,
    }
}

// Returns "scheme://host[:port]" for robots.txt lookups
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let domain = domain_of(url)?;
    Some(format!("{}://{}", parsed.scheme(), domain))
}
