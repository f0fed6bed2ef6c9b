//! Per-bucket listing cache
//!
//! Holds one bucket's cached prefix listings and per-key ETag overrides.
//! Overrides are applied at read time rather than baked into the cached
//! listings, so a later SETETAG affects prefixes that were cached earlier
//! without having to locate and patch them.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::remote::ObjectInfo;

/// Cached state for a single bucket.
///
/// `listings` maps a prefix to the verbatim result of the last successful
/// remote listing for that exact prefix. `overrides` maps a key to an
/// explicitly assigned ETag; the empty string is a tombstone marking the key
/// as deleted. `key_index` is a flat key-to-ETag view derived from `listings`
/// so point lookups do not scan every cached prefix.
#[derive(Debug, Default)]
struct StoreInner {
    listings: HashMap<String, Vec<ObjectInfo>>,
    overrides: HashMap<String, String>,
    key_index: HashMap<String, String>,
}

impl StoreInner {
    /// Apply overrides to a cached listing and drop tombstoned keys.
    fn effective(&self, entries: &[ObjectInfo]) -> Vec<ObjectInfo> {
        entries
            .iter()
            .filter_map(|entry| {
                let etag = self
                    .overrides
                    .get(&entry.key)
                    .cloned()
                    .unwrap_or_else(|| entry.etag.clone());
                if etag.is_empty() {
                    None
                } else {
                    Some(ObjectInfo {
                        key: entry.key.clone(),
                        etag,
                    })
                }
            })
            .collect()
    }
}

/// One bucket's cache, created lazily by the registry and destroyed on
/// invalidation. The lock is scoped to this store, so operations on
/// different buckets never contend.
#[derive(Debug, Default)]
pub struct BucketStore {
    inner: RwLock<StoreInner>,
}

impl BucketStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the effective view of a cached listing, or None on a miss.
    ///
    /// The effective view substitutes the override ETag for each key that has
    /// one and skips keys whose effective ETag is empty (deleted).
    pub async fn cached(&self, prefix: &str) -> Option<Vec<ObjectInfo>> {
        let inner = self.inner.read().await;
        inner
            .listings
            .get(prefix)
            .map(|entries| inner.effective(entries))
    }

    /// Commit a freshly fetched listing for a prefix and return its
    /// effective view.
    ///
    /// The entries are stored verbatim; overrides stay separate and are
    /// applied on every read. Committing replaces any previous listing for
    /// the prefix, which is how a race between two concurrent misses
    /// resolves: both fetch, the later commit wins. The flat key index is
    /// kept consistent by dropping the replaced listing's keys first.
    pub async fn commit_listing(
        &self,
        prefix: &str,
        entries: Vec<ObjectInfo>,
    ) -> Vec<ObjectInfo> {
        let mut inner = self.inner.write().await;
        if let Some(old) = inner.listings.remove(prefix) {
            for entry in &old {
                inner.key_index.remove(&entry.key);
            }
        }
        for entry in &entries {
            inner
                .key_index
                .insert(entry.key.clone(), entry.etag.clone());
        }
        let view = inner.effective(&entries);
        debug!(prefix = %prefix, count = entries.len(), "Cached listing");
        inner.listings.insert(prefix.to_string(), entries);
        view
    }

    /// Record an explicit ETag for a key, superseding any cached value.
    pub async fn set_etag(&self, key: &str, etag: &str) {
        let mut inner = self.inner.write().await;
        inner.overrides.insert(key.to_string(), etag.to_string());
        debug!(key = %key, etag = %etag, "Recorded ETag override");
    }

    /// Look up a key's effective ETag.
    ///
    /// Overrides take precedence over cached listings; a key that is neither
    /// overridden nor present in any cached listing resolves to the empty
    /// string.
    pub async fn get_etag(&self, key: &str) -> String {
        let inner = self.inner.read().await;
        if let Some(etag) = inner.overrides.get(key) {
            return etag.clone();
        }
        inner.key_index.get(key).cloned().unwrap_or_default()
    }

    /// Mark a key as deleted by recording an empty-ETag tombstone.
    ///
    /// This is not a true removal: the key resolves to "deleted" until the
    /// bucket is invalidated or the key is set again.
    pub async fn delete(&self, key: &str) {
        self.set_etag(key, "").await;
    }
}
