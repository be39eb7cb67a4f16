//! fanout-buffer — a bounded, in-memory event ring with prefix-filtered
//! multi-watcher fan-out.
//!
//! A single producer pushes change events (`Put`/`Delete`, plus a synthetic
//! `Init` marker handed to each new subscriber) into a [`Buffer`]. The
//! buffer retains the last `capacity` events in a circular store and fans
//! every push out to a dynamic set of [`Watch`] subscriptions, each with its
//! own bounded delivery queue and an optional key-prefix filter. A watcher
//! that falls behind is evicted, not allowed to stall the producer.
//!
//! This crate has no notion of durability, transport, or replay from an
//! arbitrary offset — see `SPEC_FULL.md` for the full contract this
//! implements, including the concurrency and lifecycle guarantees.
//!
//! # Example
//!
//! ```
//! use fanout_buffer::{Buffer, Event, Watch};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let buffer = Buffer::new(16).unwrap();
//! let ctx = CancellationToken::new();
//! let mut watcher = buffer
//!     .new_watcher(&ctx, Watch::new("cache").with_prefixes(vec![b"/users/".to_vec()]))
//!     .unwrap();
//!
//! buffer.push(Event::put("/users/alice", "v1"));
//!
//! let init = watcher.events().recv().await.unwrap();
//! assert_eq!(init.kind, fanout_buffer::EventKind::Init);
//! let put = watcher.events().recv().await.unwrap();
//! assert_eq!(put.item.key, b"/users/alice");
//! # }
//! ```

mod buffer;
mod error;
mod event;
mod invariants;
mod ring;
mod watcher;

pub use buffer::Buffer;
pub use error::BufferError;
pub use event::{Event, EventKind, Item};
pub use watcher::{Watch, WatcherHandle};

// Re-exported so callers don't need a direct `tokio-util` dependency just
// to construct the cancellation scope `new_watcher` expects.
pub use tokio_util::sync::CancellationToken;
