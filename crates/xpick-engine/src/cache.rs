//! Match-count cache
//!
//! Strategies ask for the same counts repeatedly (tag-only, class-token and
//! refined variants). The cache remembers how many nodes an expression
//! matched, bounded with oldest-first eviction.

use std::collections::{HashMap, VecDeque};

use tracing::trace;

use crate::query::{NodeQuery, QueryError};

/// Default number of remembered expressions
pub const DEFAULT_CAPACITY: usize = 100;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded expression -> match count cache with FIFO eviction
///
/// Entries are only valid for one document state; the owner clears the
/// cache when the document changes.
#[derive(Debug)]
pub struct MatchCountCache {
    counts: HashMap<String, usize>,
    order: VecDeque<String>,
    capacity: usize,
    stats: CacheStats,
}

impl MatchCountCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            counts: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Number of nodes `expression` matches in `doc`
    ///
    /// Evaluation errors are returned and not cached.
    pub fn count<D: NodeQuery>(&mut self, doc: &D, expression: &str) -> Result<usize, QueryError> {
        if let Some(&count) = self.counts.get(expression) {
            self.stats.hits += 1;
            return Ok(count);
        }
        self.stats.misses += 1;
        let count = doc.evaluate(expression)?.len();
        self.insert(expression, count);
        Ok(count)
    }

    /// Cached count, if present
    pub fn get(&self, expression: &str) -> Option<usize> {
        self.counts.get(expression).copied()
    }

    /// Remember a count, evicting the oldest entry when full
    pub fn insert(&mut self, expression: &str, count: usize) {
        if let Some(existing) = self.counts.get_mut(expression) {
            *existing = count;
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                trace!("evicting cached count for {}", oldest);
                self.counts.remove(&oldest);
                self.stats.evictions += 1;
            }
        }
        self.order.push_back(expression.to_string());
        self.counts.insert(expression.to_string(), count);
    }

    pub fn contains(&self, expression: &str) -> bool {
        self.counts.contains_key(expression)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry; counters are kept
    pub fn clear(&mut self) {
        self.counts.clear();
        self.order.clear();
    }
}

impl Default for MatchCountCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_eviction() {
        let mut cache = MatchCountCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        cache.insert("d", 4);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("a"));
        assert_eq!(cache.get("d"), Some(4));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_does_not_reorder() {
        let mut cache = MatchCountCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 5);
        cache.insert("c", 3);
        // "a" is still the oldest entry
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_count_hits_and_errors() {
        let doc = xpick_html::parse("<p>a</p><p>b</p>").expect("parse");
        let mut cache = MatchCountCache::default();
        assert_eq!(cache.count(&doc, "//p"), Ok(2));
        assert_eq!(cache.count(&doc, "//p"), Ok(2));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, evictions: 0 });

        assert!(cache.count(&doc, "//p[").is_err());
        assert!(!cache.contains("//p["));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    }
}
