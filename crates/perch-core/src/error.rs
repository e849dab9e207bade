use thiserror::Error;

use crate::runtime::InstanceId;

/// Contract violations in effect and state bookkeeping.
///
/// These never happen in a correct program. The infallible entry points
/// (`StateCell::set`, `Cleanup::run`, ...) log them at `error` level; the
/// `try_*` variants hand them back to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("cleanup invoked more than once")]
    CleanupRepeated,
    #[error("state write after the owning component was torn down (cell at version {version})")]
    WriteAfterTeardown { version: u64 },
    #[error("state write while the same cell is mid-write (cell at version {version})")]
    ReentrantWrite { version: u64 },
    #[error("effect #{slot} changed its dependency count from {before} to {after}")]
    DependencyLengthChanged {
        slot: usize,
        before: usize,
        after: usize,
    },
    #[error("instance {0:?} is not mounted")]
    UnknownInstance(InstanceId),
}

/// Failure to route an input event to a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("instance {0:?} is not mounted")]
    UnknownInstance(InstanceId),
    #[error("no node `{0}` in the current view")]
    UnknownNode(String),
    #[error("node `{key}` does not handle `{event}`")]
    Unhandled { key: String, event: &'static str },
}
