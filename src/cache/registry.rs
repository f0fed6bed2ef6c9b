//! Bucket registry
//!
//! Maps bucket names to their stores, creating stores lazily on first use
//! and destroying them on invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::store::BucketStore;

/// Process-wide registry of per-bucket stores.
///
/// Exactly one [`BucketStore`] is live per bucket name at any time: lookups
/// take the read lock, and the creation path re-checks under the write lock
/// so concurrent creators for the same absent bucket all observe the same
/// store instance.
#[derive(Debug, Default)]
pub struct BucketRegistry {
    buckets: RwLock<HashMap<String, Arc<BucketStore>>>,
}

impl BucketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the store for a bucket, creating an empty one if none exists.
    pub async fn get_or_create(&self, bucket: &str) -> Arc<BucketStore> {
        {
            let buckets = self.buckets.read().await;
            if let Some(store) = buckets.get(bucket) {
                return Arc::clone(store);
            }
        }

        let mut buckets = self.buckets.write().await;
        let store = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(BucketStore::new()));
        debug!(bucket = %bucket, "Bucket store ready");
        Arc::clone(store)
    }

    /// Drop a bucket's store, discarding its cached listings and overrides.
    ///
    /// A subsequent [`get_or_create`](Self::get_or_create) for the same
    /// bucket starts from an empty store.
    pub async fn invalidate(&self, bucket: &str) {
        let removed = self.buckets.write().await.remove(bucket);
        if removed.is_some() {
            debug!(bucket = %bucket, "Invalidated bucket cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_store_lazily_and_reuses_it() {
        let registry = BucketRegistry::new();

        let first = registry.get_or_create("photos").await;
        let second = registry.get_or_create("photos").await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_discards_state() {
        let registry = BucketRegistry::new();

        let store = registry.get_or_create("photos").await;
        store.set_etag("a.jpg", "E1").await;

        registry.invalidate("photos").await;

        let fresh = registry.get_or_create("photos").await;
        assert!(!Arc::ptr_eq(&store, &fresh));
        assert_eq!(fresh.get_etag("a.jpg").await, "");
    }

    #[tokio::test]
    async fn test_invalidating_missing_bucket_is_a_noop() {
        let registry = BucketRegistry::new();
        registry.invalidate("never-seen").await;
    }

    #[tokio::test]
    async fn test_buckets_are_isolated() {
        let registry = BucketRegistry::new();

        let a = registry.get_or_create("bucket-a").await;
        let b = registry.get_or_create("bucket-b").await;
        a.set_etag("k", "E1").await;

        assert_eq!(b.get_etag("k").await, "");

        registry.invalidate("bucket-a").await;
        let b_again = registry.get_or_create("bucket-b").await;
        assert!(Arc::ptr_eq(&b, &b_again));
    }

    #[tokio::test]
    async fn test_concurrent_creators_share_one_store() {
        let registry = Arc::new(BucketRegistry::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.get_or_create("photos").await
            }));
        }

        let baseline = registry.get_or_create("photos").await;
        for handle in handles {
            let store = handle.await.unwrap();
            assert!(Arc::ptr_eq(&baseline, &store));
        }
    }
}
