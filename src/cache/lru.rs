//! Recency List Module
//!
//! Intrusive doubly-linked list that keeps cache entries in strict
//! most-to-least recently used order.
//!
//! Entries live in a slot arena and are linked by [`EntryId`] handles, so the
//! list never holds owning back-references:
//!
//! ```text
//!   slots: [ Some(b) | None | Some(a) | Some(c) ]    free: [1]
//!
//!   head ─► a ◄──► b ◄──► c ◄── tail
//!          (MRU)          (LRU)
//! ```
//!
//! All structural operations are O(1).

use crate::cache::entry::{Entry, EntryId};

// == Recency List ==
/// Arena-backed intrusive list of cache entries.
///
/// - Front (head) = most recently used
/// - Back (tail) = least recently used
#[derive(Debug)]
pub struct RecencyList<V> {
    /// Entry slots; `None` marks a free slot
    slots: Vec<Option<Entry<V>>>,
    /// Indices of free slots available for reuse
    free: Vec<usize>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    len: usize,
}

impl<V> RecencyList<V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Push Front ==
    /// Inserts a detached entry as the new head and returns its handle.
    ///
    /// If the list was empty the entry also becomes the tail.
    pub fn push_front(&mut self, entry: Entry<V>) -> EntryId {
        debug_assert!(entry.is_detached(), "entry must be detached");
        let id = self.alloc(entry);
        self.attach_front(id);
        self.len += 1;
        id
    }

    // == Remove ==
    /// Detaches the entry from wherever it sits and frees its slot.
    ///
    /// Returns `None` without touching the list if `id` is not live.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry<V>> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        let entry = self.slots.get_mut(id.0).and_then(Option::take)?;
        self.free.push(id.0);
        self.len -= 1;
        Some(entry)
    }

    // == Move To Front ==
    /// Marks an entry as most recently used.
    ///
    /// No-op if `id` is not live or is already the head.
    pub fn move_to_front(&mut self, id: EntryId) {
        if !self.contains(id) || self.head == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_front(id);
    }

    // == Evict Tail ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn evict_tail(&mut self) -> Option<Entry<V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Tail ==
    /// Returns the least recently used entry without removing it.
    pub fn peek_tail(&self) -> Option<&Entry<V>> {
        self.tail.and_then(|id| self.get(id))
    }

    // == Peek Head ==
    /// Returns the most recently used entry.
    #[allow(dead_code)]
    pub fn peek_head(&self) -> Option<&Entry<V>> {
        self.head.and_then(|id| self.get(id))
    }

    // == Get ==
    /// Returns the entry behind `id`, or None for a freed or unknown handle.
    pub fn get(&self, id: EntryId) -> Option<&Entry<V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to the entry behind `id`. Links are not exposed.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry<V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    // == Contains ==
    /// Returns `true` if `id` names a live entry.
    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    // == Length ==
    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entries are linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry and resets the list to empty.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            list: self,
            current: self.head,
        }
    }

    fn alloc(&mut self, entry: Entry<V>) -> EntryId {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                EntryId(idx)
            }
            None => {
                self.slots.push(Some(entry));
                EntryId(self.slots.len() - 1)
            }
        }
    }

    /// Links a live, unlinked slot in as the new head.
    fn attach_front(&mut self, id: EntryId) {
        let old_head = self.head;
        if let Some(entry) = self.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head.and_then(|head| self.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Unlinks a live slot, rewiring its neighbours and the endpoints.
    fn detach(&mut self, id: EntryId) {
        let (prev, next) = match self.get_mut(id) {
            Some(entry) => (entry.prev.take(), entry.next.take()),
            None => return,
        };

        match prev.and_then(|p| self.get_mut(p)) {
            Some(prev_entry) => prev_entry.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.get_mut(n)) {
            Some(next_entry) => next_entry.prev = prev,
            None => self.tail = prev,
        }
    }

    /// Panics if the links, endpoints or length disagree.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        let mut seen = 0usize;
        let mut prev: Option<EntryId> = None;
        let mut current = self.head;

        if let Some(head) = self.peek_head() {
            assert!(head.prev.is_none(), "head.prev must be empty");
        }
        while let Some(id) = current {
            let entry = self.get(id).expect("linked slot must be live");
            assert_eq!(entry.prev, prev, "broken back link");
            seen += 1;
            assert!(seen <= self.len, "cycle detected");
            prev = Some(id);
            current = entry.next;
        }

        assert_eq!(prev, self.tail, "tail must be the last reachable entry");
        assert_eq!(seen, self.len, "length mismatch");
        assert_eq!(
            self.slots.iter().filter(|slot| slot.is_some()).count(),
            self.len,
            "live slot count mismatch"
        );
    }
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Keys Iterator ==
/// Iterator over keys in most-to-least recently used order.
pub struct Keys<'a, V> {
    list: &'a RecencyList<V>,
    current: Option<EntryId>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.get(self.current?)?;
        self.current = entry.next;
        Some(entry.key())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(keys: &[&str]) -> (RecencyList<u32>, Vec<EntryId>) {
        let mut list = RecencyList::new();
        let ids = keys
            .iter()
            .enumerate()
            .map(|(i, key)| list.push_front(Entry::new(key.to_string(), i as u32)))
            .collect();
        (list, ids)
    }

    fn order(list: &RecencyList<u32>) -> Vec<&str> {
        list.keys().collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<u32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.peek_head().is_none());
        assert!(list.peek_tail().is_none());
    }

    #[test]
    fn test_push_front_single_is_head_and_tail() {
        let (list, _) = list_of(&["a"]);

        assert_eq!(list.peek_head().map(Entry::key), Some("a"));
        assert_eq!(list.peek_tail().map(Entry::key), Some("a"));
        list.debug_validate_invariants();
    }

    #[test]
    fn test_push_front_order() {
        let (list, _) = list_of(&["key1", "key2", "key3"]);

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), vec!["key3", "key2", "key1"]);
        // key1 is oldest (added first)
        assert_eq!(list.peek_tail().map(Entry::key), Some("key1"));
        list.debug_validate_invariants();
    }

    #[test]
    fn test_move_to_front() {
        let (mut list, ids) = list_of(&["a", "b", "c"]);

        list.move_to_front(ids[0]);

        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.peek_tail().map(Entry::key), Some("b"));
        list.debug_validate_invariants();
    }

    #[test]
    fn test_move_to_front_of_head_is_noop() {
        let (mut list, ids) = list_of(&["a", "b"]);

        list.move_to_front(ids[1]);

        assert_eq!(order(&list), vec!["b", "a"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_evict_tail() {
        let (mut list, _) = list_of(&["key1", "key2", "key3"]);

        let evicted = list.evict_tail().map(Entry::into_parts);
        assert_eq!(evicted, Some(("key1".to_string(), 0)));
        assert_eq!(list.len(), 2);

        let evicted = list.evict_tail().map(|e| e.key().to_string());
        assert_eq!(evicted, Some("key2".to_string()));
        assert_eq!(list.len(), 1);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_evict_empty() {
        let mut list: RecencyList<u32> = RecencyList::new();
        assert!(list.evict_tail().is_none());
    }

    #[test]
    fn test_remove_middle_and_endpoints() {
        let (mut list, ids) = list_of(&["a", "b", "c", "d"]);

        assert_eq!(list.remove(ids[1]).map(|e| e.value), Some(1));
        assert_eq!(order(&list), vec!["d", "c", "a"]);
        list.debug_validate_invariants();

        // Head
        list.remove(ids[3]);
        assert_eq!(order(&list), vec!["c", "a"]);
        list.debug_validate_invariants();

        // Tail
        list.remove(ids[0]);
        assert_eq!(order(&list), vec!["c"]);
        assert_eq!(list.peek_tail().map(Entry::key), Some("c"));
        list.debug_validate_invariants();
    }

    #[test]
    fn test_remove_stale_handle_is_noop() {
        let (mut list, ids) = list_of(&["a", "b"]);

        assert!(list.remove(ids[0]).is_some());
        assert!(list.remove(ids[0]).is_none());
        list.move_to_front(ids[0]);
        assert!(list.remove(EntryId(99)).is_none());

        assert_eq!(order(&list), vec!["b"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let (mut list, ids) = list_of(&["a", "b"]);

        list.remove(ids[0]);
        let reused = list.push_front(Entry::new("c".to_string(), 2));

        assert_eq!(reused, ids[0]);
        assert_eq!(order(&list), vec!["c", "b"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let (mut list, ids) = list_of(&["a", "b", "c"]);

        // front=[c, b, a] -> touch a, c, b -> front=[b, c, a]
        list.move_to_front(ids[0]);
        list.move_to_front(ids[2]);
        list.move_to_front(ids[1]);

        let evicted: Vec<String> = std::iter::from_fn(|| list.evict_tail())
            .map(|e| e.key().to_string())
            .collect();
        assert_eq!(evicted, vec!["a", "c", "b"]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_clear() {
        let (mut list, ids) = list_of(&["a", "b", "c"]);

        list.clear();

        assert!(list.is_empty());
        assert!(!list.contains(ids[0]));
        assert_eq!(order(&list), Vec::<&str>::new());
        list.debug_validate_invariants();
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let (mut list, ids) = list_of(&["a"]);

        if let Some(entry) = list.get_mut(ids[0]) {
            entry.value = 42;
        }

        assert_eq!(list.get(ids[0]).map(|e| e.value), Some(42));
    }
}
