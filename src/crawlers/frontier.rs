use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be visited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: Url,
    pub depth: usize,
}

/// FIFO frontier with visit bookkeeping
///
/// A URL is enqueued at most once. Since the queue is FIFO, that first
/// enqueue carries the shortest link distance seen during the walk.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
    discovered: HashSet<String>,
    visited: HashSet<String>,
    max_pages: usize,
    max_depth: usize,
}

impl Frontier {
    pub fn new(seed: &Url, max_pages: usize, max_depth: usize) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            discovered: HashSet::new(),
            visited: HashSet::new(),
            max_pages,
            max_depth,
        };
        frontier.enqueue(seed.clone(), 0);
        frontier
    }

    /// Queue `url` unless it was already discovered or lies beyond the depth bound
    pub fn enqueue(&mut self, url: Url, depth: usize) -> bool {
        if depth > self.max_depth {
            return false;
        }
        if !self.discovered.insert(url.as_str().to_string()) {
            return false;
        }
        ::log::trace!("Queued {} at depth {}", url, depth);
        self.queue.push_back(QueuedUrl { url, depth });
        true
    }

    /// Pop the next URL to visit and mark it visited
    ///
    /// Returns `None` once the queue is drained or `max_pages` URLs were visited.
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        while self.visited.len() < self.max_pages {
            let item = self.queue.pop_front()?;
            if item.depth > self.max_depth || self.visited.contains(item.url.as_str()) {
                continue;
            }
            self.visited.insert(item.url.as_str().to_string());
            return Some(item);
        }
        None
    }

    pub fn is_discovered(&self, url: &Url) -> bool {
        self.discovered.contains(url.as_str())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(&url("/"), 10, 3);
        let seed = frontier.next_url().unwrap();
        assert_eq!(seed.depth, 0);

        frontier.enqueue(url("/a"), 1);
        frontier.enqueue(url("/b"), 1);
        frontier.enqueue(url("/a/child"), 2);

        let order: Vec<String> = std::iter::from_fn(|| frontier.next_url())
            .map(|q| q.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/a", "/b", "/a/child"]);
    }

    #[test]
    fn test_enqueue_once_and_depth_bound() {
        let mut frontier = Frontier::new(&url("/"), 10, 1);
        assert!(!frontier.enqueue(url("/"), 1), "seed is already discovered");
        assert!(frontier.enqueue(url("/a"), 1));
        assert!(!frontier.enqueue(url("/a"), 1));
        assert!(!frontier.enqueue(url("/deep"), 2));
        assert!(!frontier.is_discovered(&url("/deep")));
        assert_eq!(frontier.queued_count(), 2);
    }

    #[test]
    fn test_max_pages_caps_visits() {
        let mut frontier = Frontier::new(&url("/"), 2, 3);
        for path in ["/a", "/b", "/c"] {
            frontier.enqueue(url(path), 1);
        }
        assert!(frontier.next_url().is_some());
        assert!(frontier.next_url().is_some());
        assert!(frontier.next_url().is_none());
        assert_eq!(frontier.visited_count(), 2);
        assert_eq!(frontier.queued_count(), 2);
    }
}
