//! Slot storage with generation-checked handles.
//!
//! Entries are addressed by [`SlotId`] rather than by reference, which lets the
//! recency list express prev/next links without reference cycles. Freed slot
//! indices are recycled through a free list, so a long-running cache does not
//! grow its backing `Vec` past its peak occupancy.
//!
//! Every insert stamps its slot with a fresh generation taken from an
//! arena-wide counter, and the handle carries that stamp. A handle whose slot
//! was freed (and possibly refilled) no longer matches and resolves to nothing:
//!
//! ```text
//!   insert(a) ──► SlotId { index: 0, generation: 0 }
//!   remove(a)      slot 0 vacant, index 0 on the free list
//!   insert(c) ──► SlotId { index: 0, generation: 1 }
//!   get(a)    ──► None   (generation 0 != 1)
//! ```
//!
//! The counter survives [`SlotArena::clear`], so handles from before a clear
//! stay dead even though the slot indices start over at 0.

/// Handle to one occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl SlotId {
    /// Position in the backing storage. Reused after the slot is freed.
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Occupied<T> {
    generation: u64,
    value: T,
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<Occupied<T>>>,
    free_list: Vec<usize>,
    len: usize,
    next_generation: u64,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            next_generation: 0,
        }
    }

    /// Stores `value` in a free slot (reused first) and returns its handle.
    pub fn insert(&mut self, value: T) -> SlotId {
        let generation = self.next_generation;
        self.next_generation += 1;

        let occupied = Some(Occupied { generation, value });
        let index = if let Some(index) = self.free_list.pop() {
            self.slots[index] = occupied;
            index
        } else {
            self.slots.push(occupied);
            self.slots.len() - 1
        };
        self.len += 1;
        SlotId { index, generation }
    }

    /// Frees the slot behind `id`.
    ///
    /// Returns `None` and leaves the arena untouched for a vacant, unknown or
    /// stale handle.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.as_ref()?.generation != id.generation {
            return None;
        }
        let occupied = slot.take()?;
        self.free_list.push(id.index);
        self.len -= 1;
        Some(occupied.value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.index)? {
            Some(occupied) if occupied.generation == id.generation => Some(&occupied.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.index)? {
            Some(occupied) if occupied.generation == id.generation => Some(&mut occupied.value),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every stored value but keeps the allocation for reuse.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
