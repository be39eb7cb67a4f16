//! Error types for buffer operations.

use thiserror::Error;

/// Errors the buffer's fallible operations can return.
///
/// Producer operations (`push`/`push_batch`) cannot fail — a slow watcher is
/// evicted, not reported to the caller — so this type is only ever surfaced
/// by construction and watcher registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// `Buffer::new` was called with a non-positive capacity.
    #[error("buffer capacity must be at least 1, got {capacity}")]
    BadParameter {
        /// The rejected capacity.
        capacity: usize,
    },

    /// `new_watcher` was called after the buffer's scope was cancelled.
    #[error("buffer is closed")]
    BufferClosed,

    /// `new_watcher` could not even deliver the synthetic `Init` event —
    /// the queue configuration is inconsistent. Defensive; not expected
    /// under normal use, since a freshly created queue is always empty.
    #[error("buffer overflow: watcher queue rejected its initial event")]
    BufferOverflow,
}

impl BufferError {
    /// Returns `true` if the buffer is permanently unusable from this
    /// caller's perspective (as opposed to a one-off construction mistake).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::BufferClosed)
    }
}
