//! Key-value cache with per-entry time-to-live.
//!
//! Sessions live here. The [`CacheStore`] trait is the seam the rest of the
//! crate depends on; [`MemoryCache`] is the in-process implementation.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{Result, StashError};

/// A string key-value store whose entries expire.
///
/// Errors mean the store itself is unavailable; a missing or expired key is
/// `Ok(None)` / `Ok(false)`.
pub trait CacheStore: Send + Sync {
    /// Get the live value for `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value`, replacing any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Set `key` only if it has no live entry. Returns whether it was set.
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Remove `key`. Returns whether a live entry was removed.
    fn delete(&self, key: &str) -> Result<bool>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-process TTL cache.
///
/// Expired entries are invisible immediately and physically removed either
/// lazily on access or by [`MemoryCache::purge_expired`].
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create a cache driven by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| StashError::Cache("cache lock poisoned".to_string()))
    }

    fn expiry(&self, ttl: Duration) -> Result<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StashError::Cache(format!("invalid ttl: {e}")))?;
        Ok(self.clock.now() + ttl)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the cache stores no entries at all.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = self.expiry(ttl)?;
        self.lock()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl)?;
        let mut entries = self.lock()?;
        if entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let now = self.clock.now();
        let removed = self.lock()?.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }
}
