//! Equipment map: at most one item per wear slot.

use std::collections::BTreeMap;

use super::types::{ItemId, WearSlot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Equipment {
    worn: BTreeMap<WearSlot, ItemId>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: WearSlot) -> Option<ItemId> {
        self.worn.get(&slot).copied()
    }

    pub fn is_worn(&self, slot: WearSlot) -> bool {
        self.worn.contains_key(&slot)
    }

    /// Equips `item`, returning whatever the slot held before.
    pub fn equip(&mut self, slot: WearSlot, item: ItemId) -> Option<ItemId> {
        self.worn.insert(slot, item)
    }

    pub fn unequip(&mut self, slot: WearSlot) -> Option<ItemId> {
        self.worn.remove(&slot)
    }

    /// Worn items ordered by wear slot.
    pub fn iter(&self) -> impl Iterator<Item = (WearSlot, ItemId)> + '_ {
        self.worn.iter().map(|(slot, item)| (*slot, *item))
    }

    pub fn len(&self) -> usize {
        self.worn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worn.is_empty()
    }
}

impl FromIterator<(WearSlot, ItemId)> for Equipment {
    fn from_iter<T: IntoIterator<Item = (WearSlot, ItemId)>>(iter: T) -> Self {
        Self {
            worn: iter.into_iter().collect(),
        }
    }
}
