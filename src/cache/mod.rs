//! Bucket metadata cache
//!
//! Per-bucket stores holding cached prefix listings and ETag overrides,
//! plus the registry that owns them.

pub mod registry;
pub mod store;

pub use registry::BucketRegistry;
pub use store::BucketStore;
