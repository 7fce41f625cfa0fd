use std::collections::HashMap;
use std::fmt;

use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use xxhash_rust::xxh3::Xxh3;

use crate::assets::loader::LoadError;
use crate::assets::reference::AssetRef;

/// Content-addressed cache key: xxh3 of the reference kind and canonical string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(pub u64);

impl AssetKey {
    /// Key for an asset reference.
    pub fn for_ref(asset: &AssetRef) -> Self {
        let mut h = Xxh3::new();
        h.update(asset.kind().as_bytes());
        h.update(&[0]);
        h.update(asset.as_str().as_bytes());
        Self(h.digest())
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Hit/miss counters for one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered by an existing (in-flight or completed) load.
    pub hits: u64,
    /// Requests that started a new load.
    pub misses: u64,
    /// Loads that failed and were evicted.
    pub failures: u64,
}

type SharedLoad<V> = Shared<BoxFuture<'static, Result<V, LoadError>>>;

struct Entry<V: Clone> {
    asset: AssetRef,
    load: SharedLoad<V>,
}

/// Cache with at most one in-flight load per key.
///
/// Successful loads stay cached until evicted or cleared. Failed loads are dropped once they
/// resolve, so the next request fetches again.
pub(crate) struct SingleFlightCache<V: Clone> {
    entries: Mutex<HashMap<AssetKey, Entry<V>>>,
    stats: Mutex<CacheStats>,
}

impl<V> SingleFlightCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Join the in-flight load for `asset`, or start one with `start`.
    pub(crate) async fn get_or_load(
        &self,
        asset: &AssetRef,
        start: impl FnOnce() -> BoxFuture<'static, Result<V, LoadError>>,
    ) -> Result<V, LoadError> {
        let key = AssetKey::for_ref(asset);
        let load = {
            let mut entries = self.entries.lock();
            let existing = entries
                .get(&key)
                .filter(|e| &e.asset == asset)
                .map(|e| e.load.clone());
            match existing {
                Some(load) => {
                    self.stats.lock().hits += 1;
                    tracing::debug!(%key, asset = %asset, "asset cache hit");
                    load
                }
                None => {
                    self.stats.lock().misses += 1;
                    tracing::debug!(%key, asset = %asset, "asset cache miss");
                    let load = start().shared();
                    entries.insert(
                        key,
                        Entry {
                            asset: asset.clone(),
                            load: load.clone(),
                        },
                    );
                    load
                }
            }
        };

        let out = load.clone().await;
        if out.is_err() {
            let mut entries = self.entries.lock();
            // A newer load may already own the slot.
            if entries.get(&key).is_some_and(|e| e.load.ptr_eq(&load)) {
                entries.remove(&key);
                self.stats.lock().failures += 1;
            }
        }
        out
    }

    pub(crate) fn evict(&self, asset: &AssetRef) -> bool {
        self.entries
            .lock()
            .remove(&AssetKey::for_ref(asset))
            .is_some()
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
