//! The `Buffer`: owner of the ring, the watcher set, and the parent
//! cancellation scope. This is the crate's single entry point.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::BufferError;
use crate::invariants::debug_assert_closed_before_removed;
use crate::ring::Ring;
use crate::watcher::{Watch, WatcherEntry, WatcherHandle};
use crate::Event;

/// A bounded ring of events that fans out each push to prefix-filtered
/// watchers.
///
/// A single mutex guards the ring and the watcher list (SPEC_FULL.md §5);
/// the dispatcher's sends to per-watcher queues are always non-blocking, so
/// the lock is held for bounded time regardless of how slow a consumer is.
pub struct Buffer {
    inner: Mutex<BufferInner>,
    root_token: CancellationToken,
    capacity: usize,
}

struct BufferInner {
    ring: Ring,
    watchers: Vec<WatcherEntry>,
}

impl Buffer {
    /// Creates a new buffer with room for `capacity` events.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::BadParameter`] if `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::BadParameter { capacity });
        }

        Ok(Self {
            inner: Mutex::new(BufferInner {
                ring: Ring::new(capacity),
                watchers: Vec::new(),
            }),
            root_token: CancellationToken::new(),
            capacity,
        })
    }

    /// The ring's fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `event` to the ring and fans it out to matching watchers.
    /// Never fails: a watcher whose queue is full is evicted, not retried.
    pub fn push(&self, event: Event) {
        let mut inner = self.lock();
        inner.push_and_dispatch(event, &self.root_token);
    }

    /// Pushes a sequence of events under a single mutex acquisition, so no
    /// watcher can observe a partial batch interleaved with other pushes.
    pub fn push_batch(&self, events: impl IntoIterator<Item = Event>) {
        let mut inner = self.lock();
        for event in events {
            inner.push_and_dispatch(event, &self.root_token);
        }
    }

    /// An oldest-to-newest snapshot of the currently retained events.
    pub fn events(&self) -> Vec<Event> {
        self.lock().ring.snapshot()
    }

    /// The number of events currently retained (`<= capacity`).
    pub fn size(&self) -> usize {
        self.lock().ring.size()
    }

    /// Registers a new watcher.
    ///
    /// `ctx` is the caller's own cancellation scope; the returned watcher's
    /// `done()` resolves when `ctx` is cancelled, when the watcher
    /// self-closes, or when this buffer is reset or closed.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::BufferClosed`] if this buffer has already been
    /// closed, or [`BufferError::BufferOverflow`] if the watcher's own fresh
    /// queue somehow rejected its initial event (defensive; not expected in
    /// normal use since `queue_size` is always normalized to at least 1).
    pub fn new_watcher(
        &self,
        ctx: &CancellationToken,
        watch: Watch,
    ) -> Result<WatcherHandle, BufferError> {
        let mut inner = self.lock();

        if self.root_token.is_cancelled() {
            return Err(BufferError::BufferClosed);
        }

        let queue_size = if watch.queue_size == 0 {
            self.capacity
        } else {
            watch.queue_size
        };

        let name: Arc<str> = Arc::from(watch.name.as_str());
        let prefixes: Arc<[Vec<u8>]> = Arc::from(watch.prefixes);
        let token = ctx.child_token();
        let (tx, rx) = mpsc::channel(queue_size);

        match tx.try_send(Event::init()) {
            Ok(()) => {
                inner.watchers.push(WatcherEntry {
                    name: Arc::clone(&name),
                    prefixes: Arc::clone(&prefixes),
                    tx,
                    token: token.clone(),
                });
                tracing::debug!(component = "buffer", watcher = %name, "watcher registered");
                Ok(WatcherHandle::new(rx, token, name, prefixes, queue_size))
            }
            Err(_) => {
                tracing::warn!(
                    component = "buffer",
                    watcher = %name,
                    "new watcher rejected its own init event"
                );
                token.cancel();
                Err(BufferError::BufferOverflow)
            }
        }
    }

    /// Closes every registered watcher and zeroes the ring. The buffer
    /// remains usable afterwards.
    pub fn reset(&self) {
        self.lock().reset_locked();
        tracing::debug!(component = "buffer", "buffer reset");
    }

    /// Cancels the buffer's scope (after which `new_watcher` always fails
    /// with [`BufferError::BufferClosed`]) and resets. Idempotent-safe:
    /// cancelling an already-cancelled scope, or resetting an already-empty
    /// buffer, is a no-op.
    pub fn close(&self) {
        self.root_token.cancel();
        self.lock().reset_locked();
        tracing::debug!(component = "buffer", "buffer closed");
    }

    fn lock(&self) -> MutexGuard<'_, BufferInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BufferInner {
    fn push_and_dispatch(&mut self, event: Event, root_token: &CancellationToken) {
        self.ring.push(event.clone());
        self.dispatch(event, root_token);
    }

    /// Iterates watchers in insertion order, delivering or evicting. Per
    /// SPEC_FULL.md §9's open question, eviction victims are collected
    /// during the pass and removed afterwards rather than mutating the
    /// list mid-iteration.
    fn dispatch(&mut self, event: Event, root_token: &CancellationToken) {
        let mut evicted = Vec::new();

        for (idx, watcher) in self.watchers.iter().enumerate() {
            if root_token.is_cancelled() {
                break;
            }

            if !event.matches(&watcher.prefixes) {
                continue;
            }

            match watcher.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        component = "buffer",
                        watcher = %watcher.name,
                        "evicting slow watcher"
                    );
                    watcher.token.cancel();
                    evicted.push(idx);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Consumer already dropped its handle; sweep it.
                    watcher.token.cancel();
                    evicted.push(idx);
                }
            }
        }

        for idx in evicted.into_iter().rev() {
            let watcher = self.watchers.remove(idx);
            debug_assert_closed_before_removed!(watcher.token.is_cancelled());
        }
    }

    fn reset_locked(&mut self) {
        for watcher in &self.watchers {
            watcher.token.cancel();
        }
        self.watchers.clear();
        self.ring.reset();
    }
}
