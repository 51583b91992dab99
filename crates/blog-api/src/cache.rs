//! Short-lived cache of rendered pages.
//!
//! Entries are served until their TTL runs out even if the underlying data
//! changed; `invalidate` and `clear` expose the new state immediately.

use std::time::{Duration, Instant};

use blog_core::pagination::PageRequest;
use dashmap::DashMap;

pub const DEFAULT_TTL: Duration = Duration::from_secs(20);
/// Upper bound on stored pages; inserts beyond it are skipped.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
struct CachedPage {
    body: String,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct PageCache {
    entries: DashMap<String, CachedPage>,
    ttl: Duration,
    max_entries: usize,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Builds the key for a listing page as seen by `viewer`. Only the path
    /// and the parsed page number count, so extra query parameters map onto
    /// the same entry. Pages embed the viewer's name, so viewers never share
    /// entries; all anonymous visitors share one.
    pub fn key_for(path: &str, page: PageRequest, viewer: Option<&str>) -> String {
        format!("{}|{}?page={}", viewer.unwrap_or(""), path, page.requested())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh entry. Expired entries are dropped on the way.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.body.clone());
            }
        }
        let ttl = self.ttl;
        self.entries
            .remove_if(key, |_, entry| entry.stored_at.elapsed() >= ttl);
        None
    }

    /// Stores a page and returns whether it was kept. A full cache first
    /// sweeps expired entries; if it is still full, the page is not stored.
    /// Concurrent inserts for one key are fine: the last one wins.
    pub fn insert(&self, key: String, body: String) -> bool {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_expired();
            if self.entries.len() >= self.max_entries {
                log::debug!("page cache full, not storing {key}");
                return false;
            }
        }
        self.entries.insert(
            key,
            CachedPage {
                body,
                stored_at: Instant::now(),
            },
        );
        true
    }

    /// Drops every expired entry.
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    /// Returns whether an entry was removed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
        log::debug!("page cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PageCache {
    fn default() -> Self {
        PageCache::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = PageCache::default();
        let key = PageCache::key_for("/", PageRequest::first(), None);
        assert_eq!(cache.get(&key), None);

        cache.insert(key.clone(), "<html>v1</html>".into());
        assert_eq!(cache.get(&key).as_deref(), Some("<html>v1</html>"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entries_are_evicted_on_read() {
        let cache = PageCache::new(Duration::ZERO);
        cache.insert("k".into(), "stale".into());
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = PageCache::default();
        cache.insert("a".into(), "1".into());
        cache.insert("b".into(), "2".into());

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.get("a"), None);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_separate_pages_and_viewers() {
        let anon_page_1 = PageCache::key_for("/", PageRequest::first(), None);
        let anon_page_2 = PageCache::key_for("/", PageRequest::number(2), None);
        let leo_page_1 = PageCache::key_for("/", PageRequest::first(), Some("leo"));
        assert_ne!(anon_page_1, anon_page_2);
        assert_ne!(anon_page_1, leo_page_1);
    }

    #[test]
    fn test_unparseable_pages_share_the_first_page_key() {
        let first = PageCache::key_for("/", PageRequest::first(), None);
        assert_eq!(PageCache::key_for("/", PageRequest::parse(Some("abc")), None), first);
        assert_eq!(PageCache::key_for("/", PageRequest::parse(None), None), first);
    }

    #[test]
    fn test_full_cache_sweeps_expired_entries() {
        let cache = PageCache::new(Duration::ZERO).with_max_entries(4);
        for i in 0..300 {
            cache.insert(format!("k{i}"), "stale".into());
        }
        assert!(cache.len() <= 4);
    }

    #[test]
    fn test_full_cache_of_fresh_entries_skips_new_keys() {
        let cache = PageCache::default().with_max_entries(2);
        assert!(cache.insert("a".into(), "1".into()));
        assert!(cache.insert("b".into(), "2".into()));
        assert!(!cache.insert("c".into(), "3".into()));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("c"), None);

        // Refreshing a stored key still works when full.
        assert!(cache.insert("a".into(), "1b".into()));
        assert_eq!(cache.get("a").as_deref(), Some("1b"));
    }
}
