//! Cache Entry Module
//!
//! Defines individual cache entries and the handles that link them into the
//! recency list.

// == Entry Id ==
/// Stable handle to an entry slot inside a [`RecencyList`](super::RecencyList).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    /// Returns the slot index backing this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

// == Cache Entry ==
/// A single cached key/value pair plus its recency links.
///
/// The links are non-owning: the slot arena owns the entry, and `prev`/`next`
/// only name neighbouring slots.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    key: String,
    /// The stored value, replaced in place on overwrite
    pub value: V,
    pub(crate) prev: Option<EntryId>,
    pub(crate) next: Option<EntryId>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates a detached entry.
    pub fn new(key: String, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    /// Returns the entry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if the entry has no neighbours.
    pub fn is_detached(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }

    /// Consumes the entry, returning its key and value.
    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}
