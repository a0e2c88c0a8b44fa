//! In-process cache for derived read views.
//!
//! Cached entries are keyed by the collection they are derived from, so a
//! mutation invalidates exactly the collections it affects rather than the
//! whole cache. Entries also carry a TTL as a backstop.

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

/// The cacheable view collections. A mutation names the subset it dirties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewCollection {
    Products,
    LowStock,
    Summary,
    Restocks,
    Analytics,
}

/// Collections dirtied by a product create/update/delete.
pub const PRODUCT_MUTATION: &[ViewCollection] = &[
    ViewCollection::Products,
    ViewCollection::LowStock,
    ViewCollection::Summary,
    ViewCollection::Analytics,
];

/// Collections dirtied by a restock (everything product mutations dirty,
/// plus the restock history itself).
pub const RESTOCK_MUTATION: &[ViewCollection] = &[
    ViewCollection::Products,
    ViewCollection::LowStock,
    ViewCollection::Summary,
    ViewCollection::Restocks,
    ViewCollection::Analytics,
];

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ViewCache {
    entries: DashMap<(ViewCollection, String), CacheEntry>,
    ttl: Duration,
}

impl ViewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, collection: ViewCollection, key: &str) -> Option<Value> {
        let entry_key = (collection, key.to_string());
        if let Some(entry) = self.entries.get(&entry_key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove(&entry_key);
        None
    }

    pub fn put(&self, collection: ViewCollection, key: impl Into<String>, value: Value) {
        self.entries.insert(
            (collection, key.into()),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drops every entry belonging to the given collections.
    pub fn invalidate(&self, collections: &[ViewCollection]) {
        self.entries
            .retain(|(collection, _), _| !collections.contains(collection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_what_was_put() {
        let cache = ViewCache::new(Duration::from_secs(60));
        cache.put(ViewCollection::Summary, "summary", json!({"totalProducts": 3}));

        let hit = cache.get(ViewCollection::Summary, "summary").unwrap();
        assert_eq!(hit["totalProducts"], 3);
        assert!(cache.get(ViewCollection::Summary, "other").is_none());
    }

    #[test]
    fn invalidation_is_scoped_to_named_collections() {
        let cache = ViewCache::new(Duration::from_secs(60));
        cache.put(ViewCollection::Summary, "summary", json!(1));
        cache.put(ViewCollection::Restocks, "limit:5", json!(2));
        cache.put(ViewCollection::Products, "list", json!(3));

        cache.invalidate(PRODUCT_MUTATION);

        // Restock history is not dirtied by a plain product mutation.
        assert!(cache.get(ViewCollection::Summary, "summary").is_none());
        assert!(cache.get(ViewCollection::Products, "list").is_none());
        assert!(cache.get(ViewCollection::Restocks, "limit:5").is_some());

        cache.invalidate(RESTOCK_MUTATION);
        assert!(cache.get(ViewCollection::Restocks, "limit:5").is_none());
    }

    #[test]
    fn expired_entries_miss() {
        let cache = ViewCache::new(Duration::from_millis(0));
        cache.put(ViewCollection::LowStock, "list", json!([]));
        assert!(cache.get(ViewCollection::LowStock, "list").is_none());
    }
}
