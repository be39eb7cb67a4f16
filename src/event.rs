//! The record type the buffer stores, fans out, and filters on.

/// What kind of change an [`Event`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Synthetic marker delivered as the first event to every watcher.
    /// Never originates externally.
    Init,
    /// A key was created or updated.
    Put,
    /// A key was removed.
    Delete,
}

/// The payload of an [`Event`].
///
/// `revision` and `lease` are opaque to the buffer — it never reads or
/// validates them, only stores and forwards them — but a backend watch
/// feed carries them on every record, so the item keeps room for both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// The key the event is about. Used for prefix matching. May be empty
    /// for a synthetic [`EventKind::Init`].
    pub key: Vec<u8>,
    /// Opaque value payload.
    pub value: Vec<u8>,
    /// Opaque revision/version stamp from the backing store.
    pub revision: i64,
    /// Opaque lease id, `0` if the key carries no lease.
    pub lease: i64,
}

impl Item {
    /// Creates an item with the given key and an otherwise empty payload.
    pub fn with_key(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

/// An opaque record carrying a change (or synthetic marker) the buffer
/// stores and fans out to matching watchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub item: Item,
}

impl Event {
    /// Creates a `Put` event for `key`/`value`.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: EventKind::Put,
            item: Item {
                key: key.into(),
                value: value.into(),
                ..Item::default()
            },
        }
    }

    /// Creates a `Delete` event for `key`.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: EventKind::Delete,
            item: Item::with_key(key),
        }
    }

    /// Creates the synthetic `Init` marker delivered to every new watcher.
    pub(crate) fn init() -> Self {
        Self {
            kind: EventKind::Init,
            item: Item::default(),
        }
    }

    /// Returns `true` if `prefixes` is empty (accept-all) or at least one
    /// prefix is a byte-for-byte prefix of this event's key.
    pub(crate) fn matches(&self, prefixes: &[Vec<u8>]) -> bool {
        prefixes.is_empty() || prefixes.iter().any(|p| self.item.key.starts_with(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prefix_list_matches_everything() {
        let e = Event::put("/users/alice", "v");
        assert!(e.matches(&[]));
    }

    #[test]
    fn empty_prefix_bytes_match_everything() {
        let e = Event::put("/users/alice", "v");
        assert!(e.matches(&[Vec::new()]));
    }

    #[test]
    fn prefix_must_match_byte_for_byte() {
        let e = Event::put("/users/alice", "v");
        assert!(e.matches(&[b"/users/".to_vec()]));
        assert!(!e.matches(&[b"/nodes/".to_vec()]));
    }

    #[test]
    fn init_has_empty_key() {
        let e = Event::init();
        assert_eq!(e.kind, EventKind::Init);
        assert!(e.item.key.is_empty());
    }
}
