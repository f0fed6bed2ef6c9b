//! Command dispatch and handlers
//!
//! Maps the five protocol commands (LIST, INVALIDATE, SETETAG, GETETAG,
//! DELETE) onto the bucket cache. Handlers validate arity before touching
//! any store and consult the remote lister only on a LIST cache miss.

pub mod error;

pub use error::CommandError;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::BucketRegistry;
use crate::remote::{ObjectInfo, RemoteLister};

/// Executes protocol commands against the bucket cache.
///
/// The registry and the remote listing capability are injected, so the
/// engine carries no ambient state and tests can drive it with a mock
/// lister.
pub struct CommandEngine<L: RemoteLister> {
    registry: Arc<BucketRegistry>,
    remote: L,
}

impl<L: RemoteLister> CommandEngine<L> {
    /// Create an engine over the given registry and remote lister.
    pub fn new(registry: Arc<BucketRegistry>, remote: L) -> Self {
        Self { registry, remote }
    }

    /// Dispatch a command by name.
    ///
    /// Command names are case-insensitive. The reply body is empty for
    /// INVALIDATE, SETETAG, and DELETE; LIST returns one `etag|key` line per
    /// object and GETETAG returns the raw fingerprint (possibly empty).
    pub async fn execute(&self, command: &str, args: &[String]) -> Result<String, CommandError> {
        match command.to_ascii_uppercase().as_str() {
            "LIST" => self.list(args).await,
            "INVALIDATE" => self.invalidate(args).await,
            "SETETAG" => self.set_etag(args).await,
            "GETETAG" => self.get_etag(args).await,
            "DELETE" => self.delete(args).await,
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    /// LIST bucket prefix — cached listing, fetched from the remote on a
    /// miss.
    async fn list(&self, args: &[String]) -> Result<String, CommandError> {
        let [bucket, prefix] = args else {
            return Err(CommandError::WrongArity {
                command: "LIST",
                expected: "bucket, prefix",
            });
        };

        let store = self.registry.get_or_create(bucket).await;
        if let Some(entries) = store.cached(prefix).await {
            debug!(bucket = %bucket, prefix = %prefix, count = entries.len(), "Listing served from cache");
            return Ok(render_listing(&entries));
        }

        // The remote call runs with no store lock held. Two concurrent
        // misses on the same prefix may both end up here; last commit wins.
        let objects = self.remote.list_objects(bucket, prefix).await?;
        let objects: Vec<ObjectInfo> = objects
            .into_iter()
            .filter(|object| !object.key.ends_with('/'))
            .collect();

        info!(bucket = %bucket, prefix = %prefix, count = objects.len(), "Fetched listing from remote");
        let entries = store.commit_listing(prefix, objects).await;
        Ok(render_listing(&entries))
    }

    /// INVALIDATE bucket — drop the bucket's entire cached state.
    async fn invalidate(&self, args: &[String]) -> Result<String, CommandError> {
        let [bucket] = args else {
            return Err(CommandError::WrongArity {
                command: "INVALIDATE",
                expected: "bucket",
            });
        };

        self.registry.invalidate(bucket).await;
        Ok(String::new())
    }

    /// SETETAG bucket key etag — record an explicit fingerprint.
    async fn set_etag(&self, args: &[String]) -> Result<String, CommandError> {
        let [bucket, key, etag] = args else {
            return Err(CommandError::WrongArity {
                command: "SETETAG",
                expected: "bucket, key, etag",
            });
        };

        let store = self.registry.get_or_create(bucket).await;
        store.set_etag(key, etag).await;
        Ok(String::new())
    }

    /// GETETAG bucket key — the key's effective fingerprint, empty if the
    /// key is unknown or deleted.
    async fn get_etag(&self, args: &[String]) -> Result<String, CommandError> {
        let [bucket, key] = args else {
            return Err(CommandError::WrongArity {
                command: "GETETAG",
                expected: "bucket, key",
            });
        };

        let store = self.registry.get_or_create(bucket).await;
        Ok(store.get_etag(key).await)
    }

    /// DELETE bucket key — tombstone the key.
    async fn delete(&self, args: &[String]) -> Result<String, CommandError> {
        let [bucket, key] = args else {
            return Err(CommandError::WrongArity {
                command: "DELETE",
                expected: "bucket, key",
            });
        };

        let store = self.registry.get_or_create(bucket).await;
        store.delete(key).await;
        Ok(String::new())
    }
}

/// Render a listing reply: one `etag|key` line per object, nothing for an
/// empty listing.
fn render_listing(entries: &[ObjectInfo]) -> String {
    let mut buf = String::new();
    for entry in entries {
        buf.push_str(&entry.etag);
        buf.push('|');
        buf.push_str(&entry.key);
        buf.push('\n');
    }
    buf
}
