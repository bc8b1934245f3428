// src/crawl/queue.rs
// =============================================================================
// The crawl frontier: a breadth-first queue plus the set of URLs already seen.
//
// How it works:
// 1. Start with the seed URL at depth 0
// 2. The engine pops entries in FIFO order (breadth-first)
// 3. Every popped URL is marked visited, whatever happens to it next
// 4. Links found on a page are queued at depth + 1, but only when they are on
//    the seed's host and have not been visited yet
//
// Rust concepts:
// - HashSet: To track visited URLs (O(1) lookup)
// - VecDeque: Double-ended queue for breadth-first crawling
// =============================================================================

use std::collections::{HashSet, VecDeque};

use super::normalize::{is_same_domain, normalize_url};

// Represents a page in the crawl queue
//
// Created once, consumed once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize, // How many link hops from the seed (seed = 0)
}

// Pending entries plus everything already dequeued
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    // Creates a frontier holding only the seed at depth 0
    pub fn new(seed_url: &str) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(FrontierEntry {
            url: seed_url.to_string(),
            depth: 0,
        });

        Self {
            queue,
            visited: HashSet::new(),
        }
    }

    /// Next entry in breadth-first order
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    // Records a normalized URL as visited
    //
    // Returns false if it had been visited before, in which case the caller
    // must skip it.
    pub fn mark_visited(&mut self, normalized_url: &str) -> bool {
        self.visited.insert(normalized_url.to_string())
    }

    pub fn is_visited(&self, normalized_url: &str) -> bool {
        self.visited.contains(normalized_url)
    }

    // Queues the links of one page
    //
    // Parameters:
    //   links: normalized absolute URLs, in document order
    //   depth: depth to give the new entries (page depth + 1)
    //   base_domain: the seed's host[:port]; other hosts are dropped
    //
    // Returns: how many entries were queued
    //
    // A link that is already waiting in the queue may be queued again; the
    // visited check on dequeue makes the second copy a no-op.
    pub fn enqueue_links<I>(&mut self, links: I, depth: usize, base_domain: &str) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut queued = 0;
        for link in links {
            if is_same_domain(&link, base_domain) && !self.is_visited(&link) {
                self.queue.push_back(FrontierEntry { url: link, depth });
                queued += 1;
            }
        }
        queued
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    // True if some pending entry has not been visited yet
    //
    // A queue holding only repeats will drain without another fetch.
    pub fn has_unvisited(&self) -> bool {
        self.queue
            .iter()
            .any(|entry| !self.is_visited(&normalize_url(&entry.url, None)))
    }

    /// Number of distinct URLs dequeued so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[cfg(test)]
    pub fn pending(&self) -> Vec<FrontierEntry> {
        self.queue.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_starts_at_depth_zero() {
        let mut frontier = Frontier::new("https://example.com/index.html");
        assert_eq!(
            frontier.pop(),
            Some(FrontierEntry {
                url: "https://example.com/index.html".to_string(),
                depth: 0,
            })
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_only_same_domain_links_are_queued() {
        let mut frontier = Frontier::new("https://example.com/index.html");
        let seed = frontier.pop().unwrap();
        frontier.mark_visited(&normalize_url(&seed.url, None));

        let links = vec![
            "https://example.com/a".to_string(),
            "https://other.com/b".to_string(),
        ];
        let queued = frontier.enqueue_links(links, seed.depth + 1, "example.com");

        assert_eq!(queued, 1);
        assert_eq!(
            frontier.pending(),
            vec![FrontierEntry {
                url: "https://example.com/a".to_string(),
                depth: 1,
            }]
        );
    }

    #[test]
    fn test_visited_links_are_not_queued() {
        let mut frontier = Frontier::new("https://example.com");
        frontier.pop();
        frontier.mark_visited("https://example.com");

        let queued = frontier.enqueue_links(
            vec!["https://example.com".to_string(), "https://example.com/x".to_string()],
            1,
            "example.com",
        );
        assert_eq!(queued, 1);
    }

    #[test]
    fn test_mark_visited_reports_repeats() {
        let mut frontier = Frontier::default();
        assert!(frontier.mark_visited("https://example.com/a"));
        assert!(!frontier.mark_visited("https://example.com/a"));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_queue_of_repeats_has_nothing_unvisited() {
        let mut frontier = Frontier::new("https://example.com");
        frontier.pop();
        frontier.mark_visited("https://example.com");
        frontier.enqueue_links(
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/a".to_string(),
            ],
            1,
            "example.com",
        );
        assert!(frontier.has_unvisited());

        let first = frontier.pop().unwrap();
        frontier.mark_visited(&first.url);
        assert!(!frontier.is_empty());
        assert!(!frontier.has_unvisited());
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new("https://example.com");
        frontier.pop();
        frontier.enqueue_links(
            vec![
                "https://example.com/1".to_string(),
                "https://example.com/2".to_string(),
            ],
            1,
            "example.com",
        );
        frontier.enqueue_links(vec!["https://example.com/3".to_string()], 2, "example.com");

        let order: Vec<_> = std::iter::from_fn(|| frontier.pop())
            .map(|entry| (entry.url, entry.depth))
            .collect();
        assert_eq!(
            order,
            vec![
                ("https://example.com/1".to_string(), 1),
                ("https://example.com/2".to_string(), 1),
                ("https://example.com/3".to_string(), 2),
            ]
        );
    }
}
