//! Key-to-raster storage consulted before rendering.

use super::types::Bitmap;
use crate::shape::CacheKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Abstraction over where generated rasters are memoized.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<Bitmap>>;
    fn put(&self, key: CacheKey, bitmap: Arc<Bitmap>);
    /// Drops every cached raster, e.g. to free memory before a retry.
    fn clear(&self);
}

/// Process-local cache without eviction.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<CacheKey, Arc<Bitmap>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Bitmap>>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &CacheKey) -> Option<Arc<Bitmap>> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: CacheKey, bitmap: Arc<Bitmap>) {
        self.lock().insert(key, bitmap);
    }

    fn clear(&self) {
        let mut entries = self.lock();
        log::debug!("Clearing {} cached rasters", entries.len());
        entries.clear();
    }
}
