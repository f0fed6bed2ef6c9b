//! Command error types

use crate::remote::RemoteError;

/// Errors a command handler can surface to the client.
///
/// Arity and unknown-command failures happen before any store is touched, so
/// they never leave partial state behind. Remote failures propagate the
/// listing backend's message verbatim and commit nothing to the cache.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{command} requires param ({expected})")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
    },

    #[error("bad command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
