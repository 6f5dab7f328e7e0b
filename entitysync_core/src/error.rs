//! Error kinds shared by the history buffer and the state interpolator.
//!
//! The policy for each variant is documented on the variant itself; callers
//! in `entitysync_server` / `entitysync_client` decide whether a given error
//! is fatal (propagated with `?`) or logged-and-dropped.

use thiserror::Error;

/// Errors raised by [`crate::history::TimestampedBuffer`] and the recursive
/// state interpolator in [`crate::state`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CoreError {
    /// `record` was called with a timestamp that does not strictly exceed
    /// the most recent entry. Fatal on the server: it indicates a tick-rate
    /// misconfiguration, not a recoverable condition.
    #[error("record({0}) is not strictly after the buffer's latest timestamp")]
    NonMonotonicTimestamp(u64),

    /// `rewrite` targeted a timestamp with no existing entry. Fatal:
    /// resimulation is expected to only ever touch timestamps it just read
    /// via `slice`.
    #[error("no history entry exists at timestamp {0}")]
    NoSuchTimestamp(u64),

    /// Two state trees being interpolated have incompatible shapes (field
    /// sets differ, or a leaf is neither numeric nor an object). Fatal at
    /// the call site: it indicates a schema mismatch between snapshots.
    #[error("field `{0}` cannot be interpolated (schema mismatch)")]
    NonInterpolableField(String),
}
