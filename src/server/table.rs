//! Bounded connection registry.
//!
//! Slots are kept packed: occupied entries form a prefix in insertion order
//! and empty ones trail behind. Position therefore encodes age, and slot 0 is
//! always the oldest live connection, which is what eviction relies on.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("connection table is full")]
pub struct Full;

#[derive(Debug)]
pub struct ConnectionTable<T> {
    slots: Vec<Option<T>>,
    count: usize,
}

impl<T> ConnectionTable<T> {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, count: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Puts `item` in the first free slot and returns that slot.
    ///
    /// On `Full` the item is handed back untouched.
    pub fn insert(&mut self, item: T) -> Result<usize, (Full, T)> {
        match self.slots.iter().position(Option::is_none) {
            Some(slot) => {
                self.slots[slot] = Some(item);
                self.count += 1;
                Ok(slot)
            }
            None => Err((Full, item)),
        }
    }

    /// Frees `slot` and packs the table. Returns the removed entry, if the
    /// slot was occupied.
    pub fn remove(&mut self, slot: usize) -> Option<T> {
        let item = self.slots.get_mut(slot)?.take()?;
        self.count -= 1;
        self.compact();
        Some(item)
    }

    /// Removes the oldest entry.
    pub fn evict_oldest(&mut self) -> Option<T> {
        self.remove(0)
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)?.as_ref()
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots[..self.count].iter().flatten()
    }

    /// Shifts occupied slots to the front, keeping their relative order.
    fn compact(&mut self) {
        let mut dest = 0;
        for src in 0..self.slots.len() {
            if self.slots[src].is_some() {
                self.slots.swap(dest, src);
                dest += 1;
            }
        }
        debug_assert_eq!(dest, self.count);
    }
}
