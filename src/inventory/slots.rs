//! Slot store and presence index.
//!
//! The store is a fixed array of `capacity` cells. Every write goes through
//! [`SlotStore::put`], [`SlotStore::take`] or [`SlotStore::set_quantity`], and
//! each of those keeps the presence index in step, so
//! `index.contains(id)` holds exactly when some cell holds `id`.
//!
//! Capacity is capped at [`MAX_CAPACITY`] so every cell is addressable by a
//! [`SlotIndex`].

use std::collections::HashMap;

use super::types::{ItemId, Quantity, SlotEntry, SlotIndex, MAX_CAPACITY};

/// Number of slots holding each item id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceIndex {
    counts: HashMap<ItemId, u32>,
}

impl PresenceIndex {
    pub fn contains(&self, id: ItemId) -> bool {
        self.counts.contains_key(&id)
    }

    /// Slots currently holding `id`.
    pub fn slot_count(&self, id: ItemId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.counts.keys().copied()
    }

    fn acquire(&mut self, id: ItemId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    fn release(&mut self, id: ItemId) {
        if let Some(count) = self.counts.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&id);
            }
        }
    }

    fn clear(&mut self) {
        self.counts.clear();
    }
}

/// Bounded inventory grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStore {
    cells: Vec<Option<SlotEntry>>,
    presence: PresenceIndex,
}

impl SlotStore {
    /// Store of `capacity` empty cells, capped at [`MAX_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: vec![None; capacity.min(MAX_CAPACITY)],
            presence: PresenceIndex::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn presence(&self) -> &PresenceIndex {
        &self.presence
    }

    pub fn in_range(&self, slot: SlotIndex) -> bool {
        (slot as usize) < self.cells.len()
    }

    pub fn get(&self, slot: SlotIndex) -> Option<SlotEntry> {
        self.cells.get(slot as usize).copied().flatten()
    }

    pub fn is_free(&self, slot: SlotIndex) -> bool {
        self.in_range(slot) && self.get(slot).is_none()
    }

    /// Lowest-indexed empty cell.
    pub fn first_free(&self) -> Option<SlotIndex> {
        self.cells
            .iter()
            .position(Option::is_none)
            .map(|idx| idx as SlotIndex)
    }

    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Occupied cells in ascending slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, SlotEntry)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.map(|entry| (idx as SlotIndex, entry)))
    }

    /// Slots holding `id`, ascending.
    pub fn slots_of(&self, id: ItemId) -> Vec<SlotIndex> {
        self.occupied()
            .filter(|(_, entry)| entry.item == id)
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn total_of(&self, id: ItemId) -> u64 {
        self.occupied()
            .filter(|(_, entry)| entry.item == id)
            .map(|(_, entry)| entry.quantity as u64)
            .sum()
    }

    /// Write `entry` into `slot`, replacing whatever was there.
    ///
    /// Returns the replaced entry. Out-of-range slots and zero quantities are
    /// refused and leave the store untouched.
    pub fn put(&mut self, slot: SlotIndex, entry: SlotEntry) -> Option<SlotEntry> {
        if entry.quantity == 0 {
            return None;
        }
        let cell = self.cells.get_mut(slot as usize)?;
        let previous = cell.replace(entry);
        match previous {
            Some(old) if old.item == entry.item => {}
            Some(old) => {
                self.presence.release(old.item);
                self.presence.acquire(entry.item);
            }
            None => self.presence.acquire(entry.item),
        }
        previous
    }

    /// Empty `slot`, returning what it held.
    pub fn take(&mut self, slot: SlotIndex) -> Option<SlotEntry> {
        let taken = self.cells.get_mut(slot as usize)?.take()?;
        self.presence.release(taken.item);
        Some(taken)
    }

    /// Change the quantity of an occupied slot; zero empties it.
    pub fn set_quantity(&mut self, slot: SlotIndex, quantity: Quantity) -> Option<SlotEntry> {
        let entry = self.get(slot)?;
        if quantity == 0 {
            self.take(slot);
            return None;
        }
        let updated = SlotEntry::new(entry.item, quantity);
        self.cells[slot as usize] = Some(updated);
        Some(updated)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.presence.clear();
    }
}
