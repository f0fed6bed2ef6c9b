//! Remote object listing capability
//!
//! The cache core consumes the remote store through the [`RemoteLister`]
//! trait; any mechanism that can enumerate (key, ETag) pairs under a prefix
//! satisfies it. The production implementation shells out to the aws cli.

pub mod aws_cli;
pub mod errors;
pub mod types;

pub use aws_cli::AwsCliLister;
pub use errors::RemoteError;
pub use types::ObjectInfo;

use std::future::Future;

/// Capability for enumerating objects in the backing store.
///
/// Implementations must return every key under the prefix, including
/// pseudo-directory markers (keys ending in `/`); filtering those out is the
/// caller's job.
pub trait RemoteLister: Send + Sync + 'static {
    /// List all objects in `bucket` whose key starts with `prefix`.
    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<ObjectInfo>, RemoteError>> + Send;
}
