//! # Product Cache
//!
//! A small TTL cache for catalog product definitions.
//!
//! Product definitions change rarely and may be served slightly stale; stock
//! counters may not, so the cart store caches only the definition and always
//! asks the catalog for stock at decision time. Expiry is an explicit check
//! against the entry's insertion instant, keyed by product id.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bordado_core::types::Product;

/// Default definition TTL used by the cart store.
pub const DEFAULT_PRODUCT_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    product: Product,
    cached_at: Instant,
}

/// TTL cache of product definitions, keyed by product id.
pub struct ProductCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ProductCache {
    /// Creates a cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        ProductCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached product when its entry is still fresh.
    ///
    /// A stale entry is evicted on access and reported as a miss.
    pub fn get(&self, product_id: &str) -> Option<Product> {
        let mut entries = self.entries.lock().expect("product cache mutex poisoned");
        match entries.get(product_id) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => Some(entry.product.clone()),
            Some(_) => {
                entries.remove(product_id);
                None
            }
            None => None,
        }
    }

    /// Stores a product definition, resetting its expiry.
    pub fn insert(&self, product: Product) {
        let mut entries = self.entries.lock().expect("product cache mutex poisoned");
        entries.insert(
            product.id().to_string(),
            CacheEntry {
                product,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drops one entry, e.g. after an admin edit notification.
    pub fn invalidate(&self, product_id: &str) {
        self.entries
            .lock()
            .expect("product cache mutex poisoned")
            .remove(product_id);
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("product cache mutex poisoned")
            .clear();
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("product cache mutex poisoned")
            .len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product::Embroidered {
            id: id.to_string(),
            name: "Club Polo".to_string(),
            base_price_cents: 8500,
            discount_percent: 29,
            variants: vec![],
        }
    }

    #[test]
    fn test_fresh_entry_hits() {
        let cache = ProductCache::new(Duration::from_secs(3600));
        cache.insert(product("polo-1"));

        let hit = cache.get("polo-1").unwrap();
        assert_eq!(hit.id(), "polo-1");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = ProductCache::new(Duration::ZERO);
        cache.insert(product("polo-1"));

        assert!(cache.get("polo-1").is_none());
        // Stale entry was evicted on access
        assert!(cache.is_empty());
    }

    #[test]
    fn test_miss_on_unknown_id() {
        let cache = ProductCache::new(Duration::from_secs(3600));
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ProductCache::new(Duration::from_secs(3600));
        cache.insert(product("polo-1"));
        cache.insert(product("polo-2"));

        cache.invalidate("polo-1");
        assert!(cache.get("polo-1").is_none());
        assert!(cache.get("polo-2").is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}
