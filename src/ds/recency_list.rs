//! Doubly linked recency list backed by a [`SlotArena`].
//!
//! Entries live in the arena and are linked by [`SlotId`], so moving an entry
//! to the front or unlinking it is O(1) given its handle, with no raw pointers
//! and no reference cycles.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Entry<K, V>>)
//!   ┌────────┬──────────────────────────────────────────────────┐
//!   │ SlotId │ Entry { key, value, prev, next }                 │
//!   ├────────┼──────────────────────────────────────────────────┤
//!   │ id_1   │ { a, 1, prev: None,       next: Some(id_2) }     │
//!   │ id_2   │ { b, 2, prev: Some(id_1), next: Some(id_3) }     │
//!   │ id_3   │ { c, 3, prev: Some(id_2), next: None }           │
//!   └────────┴──────────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//!           (MRU)                    (LRU)
//! ```
//!
//! ## Operations
//! - `add_first`: allocate + attach at head
//! - `move_to_head`: detach + attach at head (no-op if already head)
//! - `remove_tail`: detach tail + free slot
//! - `remove`: detach arbitrary entry + free slot
//! - `clear`: drop all entries, reset head/tail

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

/// One cache slot: the key, its value and the recency links.
#[derive(Debug)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

impl<K, V> Entry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Recency order from most recently used (head) to least recently used (tail).
#[derive(Debug)]
pub struct RecencyList<K, V> {
    arena: SlotArena<Entry<K, V>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<K, V> RecencyList<K, V> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn head_id(&self) -> Option<SlotId> {
        self.head
    }

    pub fn tail_id(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn get(&self, id: SlotId) -> Option<&Entry<K, V>> {
        self.arena.get(id)
    }

    /// Mutable access to the value only; key and links stay private to the list.
    pub fn value_mut(&mut self, id: SlotId) -> Option<&mut V> {
        self.arena.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Iterates `(handle, entry)` pairs from MRU to LRU.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Inserts a new entry as head and returns its handle.
    pub fn add_first(&mut self, key: K, value: V) -> SlotId {
        let id = self.arena.insert(Entry {
            key,
            value,
            prev: None,
            next: None,
        });
        self.attach_front(id);
        id
    }

    /// Moves an entry to the head; returns `false` if `id` is not linked.
    pub fn move_to_head(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Unlinks and returns the LRU entry.
    pub fn remove_tail(&mut self) -> Option<(K, V)> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks the entry behind `id` wherever it sits in the order.
    pub fn remove(&mut self, id: SlotId) -> Option<(K, V)> {
        self.detach(id)?;
        self.arena
            .remove(id)
            .map(|entry| (entry.key, entry.value))
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let entry = self.arena.get(id)?;
            (entry.prev, entry.next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_entry) = self.arena.get_mut(prev_id) {
                    prev_entry.next = next;
                }
            },
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_entry) = self.arena.get_mut(next_id) {
                    next_entry.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        let entry = self.arena.get_mut(id)?;
        entry.prev = None;
        entry.next = None;
        Some(())
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(entry) = self.arena.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        } else {
            return;
        }
        match old_head {
            Some(old_head) => {
                if let Some(head_entry) = self.arena.get_mut(old_head) {
                    head_entry.prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Walks the chain head to tail and checks links, ends and count.
    pub fn validate(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || !self.arena.is_empty() {
                return Err(InvariantError::new(
                    "empty list must have no head, no tail and no entries",
                ));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let entry = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("dangling link to slot {}", id.index())))?;
            if entry.prev != prev {
                return Err(InvariantError::new(format!(
                    "slot {} has a prev link that does not point back",
                    id.index()
                )));
            }
            count += 1;
            if count > self.arena.len() {
                return Err(InvariantError::new("cycle detected in recency list"));
            }
            if entry.next.is_none() && self.tail != Some(id) {
                return Err(InvariantError::new("chain ends before the tail"));
            }
            prev = Some(id);
            current = entry.next;
        }

        if count != self.arena.len() {
            return Err(InvariantError::new(format!(
                "reachable entries {} != stored entries {}",
                count,
                self.arena.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.validate() {
            panic!("recency list invariant violated: {err}");
        }
    }
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    current: Option<SlotId>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (SlotId, &'a Entry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let entry = self.list.arena.get(id)?;
        self.current = entry.next;
        Some((id, entry))
    }
}
