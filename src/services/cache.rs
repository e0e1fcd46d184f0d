use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use super::ServiceError;

/// Key/value store with optional expiry. `ttl_secs == 0` means no expiry.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ServiceError>;
}

/// In-process store backed by a concurrent map.
///
/// Expired entries are removed lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (String, Option<Instant>)>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => match entry.1 {
                Some(deadline) if deadline <= now => true,
                _ => return Ok(Some(entry.0.clone())),
            },
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ServiceError> {
        // a TTL too large for the clock is treated as no expiry
        let deadline = match ttl_secs {
            0 => None,
            secs => Instant::now().checked_add(Duration::from_secs(secs)),
        };
        self.entries
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }
}

/// Wrapper that turns store failures into misses and no-ops.
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to get value from cache");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        if let Err(e) = self.store.set(key, value, ttl_secs) {
            warn!(key = %key, error = %e, "Failed to set value in cache");
        }
    }
}
