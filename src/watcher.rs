//! Subscriber-side types: the `Watch` registration request and the
//! `WatcherHandle` returned to a consumer by `Buffer::new_watcher`.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::Event;

/// Registration parameters for a new watcher.
///
/// An empty `prefixes` list means "accept every event" (spec.md §4.2). A
/// `queue_size` of `0` is normalized to the buffer's own ring capacity by
/// `Buffer::new_watcher`.
#[derive(Debug, Clone)]
pub struct Watch {
    pub(crate) name: String,
    pub(crate) prefixes: Vec<Vec<u8>>,
    pub(crate) queue_size: usize,
}

impl Watch {
    /// Creates a watch request with no prefix filter (accept-all) and a
    /// queue size of `0` (substituted with the buffer's capacity).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefixes: Vec::new(),
            queue_size: 0,
        }
    }

    /// Sets the prefix filter. An empty list (the default) accepts every
    /// event; an empty byte sequence inside a non-empty list also matches
    /// everything.
    #[must_use]
    pub fn with_prefixes(mut self, prefixes: Vec<Vec<u8>>) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Sets the bounded delivery queue's capacity. `0` substitutes the
    /// buffer's own ring capacity.
    #[must_use]
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }
}

/// A subscription handle returned by `Buffer::new_watcher`.
///
/// The first event read from [`WatcherHandle::events`] is always
/// `EventKind::Init`. After that, events matching the registered prefix
/// filter arrive in push order. Use [`WatcherHandle::done`] to detect
/// shutdown (self-close, parent close, buffer reset/close, or eviction) —
/// the queue itself is never explicitly closed, so a consumer should
/// `select!` between `events().recv()` and `done()`.
pub struct WatcherHandle {
    rx: mpsc::Receiver<Event>,
    token: CancellationToken,
    name: Arc<str>,
    prefixes: Arc<[Vec<u8>]>,
    capacity: usize,
}

impl WatcherHandle {
    pub(crate) fn new(
        rx: mpsc::Receiver<Event>,
        token: CancellationToken,
        name: Arc<str>,
        prefixes: Arc<[Vec<u8>]>,
        capacity: usize,
    ) -> Self {
        Self {
            rx,
            token,
            name,
            prefixes,
            capacity,
        }
    }

    /// The receive end of this watcher's delivery queue.
    pub fn events(&mut self) -> &mut mpsc::Receiver<Event> {
        &mut self.rx
    }

    /// Resolves exactly once when this watcher is closed, by any path.
    pub fn done(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// `true` if this watcher has already been closed.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Idempotent self-close.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// Free-form diagnostic identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered prefix filter.
    pub fn prefixes(&self) -> &[Vec<u8>] {
        &self.prefixes
    }

    /// The delivery queue's configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current queue depth, for diagnostics.
    pub fn size(&self) -> usize {
        self.rx.len()
    }
}

impl fmt::Display for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Watcher(name={}, prefixes={:?}, capacity={}, size={})",
            self.name,
            self.prefixes
                .iter()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .collect::<Vec<_>>(),
            self.capacity,
            self.size()
        )
    }
}

/// The buffer's own bookkeeping record for a registered watcher — the
/// producer side the Dispatcher fans events out to. Never handed to a
/// caller; `WatcherHandle` is the public surface.
pub(crate) struct WatcherEntry {
    pub(crate) name: Arc<str>,
    pub(crate) prefixes: Arc<[Vec<u8>]>,
    pub(crate) tx: mpsc::Sender<Event>,
    pub(crate) token: CancellationToken,
}
