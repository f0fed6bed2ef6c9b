//! Remote listing error types

/// Failure modes of the remote listing call.
///
/// Every variant is surfaced verbatim to the requesting client; none of them
/// leave the cache in a partial state.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("failed to launch aws cli: {0}")]
    Launch(String),

    #[error("aws cli exited with code {code}: {stderr}")]
    CliFailed { code: i32, stderr: String },

    #[error("invalid listing output: {0}")]
    Parse(String),
}
