//! The authoritative inventory engine.
//!
//! One engine exists per player session and owns that player's slot store,
//! presence index, equipment map and currency balance. Operations run to
//! completion synchronously and report every change to the session's
//! [`ViewSink`] before returning. Nothing here locks; a host that spreads
//! players across threads keeps each engine on exactly one of them.

use std::sync::Arc;

use log::{debug, warn};

use super::catalog::ItemCatalog;
use super::equipment::Equipment;
use super::errors::InventoryError;
use super::hooks::Hooks;
use super::record::PlayerRecord;
use super::sink::{InventorySnapshot, ViewSink};
use super::slots::{PresenceIndex, SlotStore};
use super::types::{
    ItemDefinition, ItemId, Quantity, SlotEntry, SlotIndex, WearSlot, MAX_CAPACITY,
};

/// Catalog handle shared by every session on a server.
pub type SharedCatalog = Arc<dyn ItemCatalog + Send + Sync>;

/// How much of an add request found a home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Every requested unit was placed.
    Complete,
    /// Free slots ran out part way through; `leftover` units were not placed.
    Partial { leftover: Quantity },
    /// Fresh-slot allocation found no free slot at all. Units may still have
    /// been merged into existing stacks first; `leftover` is what remains.
    NoFreeSlot { leftover: Quantity },
}

impl Placement {
    pub fn leftover(&self) -> Quantity {
        match self {
            Placement::Complete => 0,
            Placement::Partial { leftover } | Placement::NoFreeSlot { leftover } => *leftover,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Placement::Complete)
    }

    /// Units placed out of `requested`.
    pub fn placed(&self, requested: Quantity) -> Quantity {
        requested.saturating_sub(self.leftover())
    }
}

/// Result of an unwear attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwearOutcome {
    /// The item went back to the inventory at `slot`.
    Unworn { slot: SlotIndex },
    /// No room; the item stays equipped and the view was told so again.
    Retained,
}

pub struct InventoryEngine<S: ViewSink> {
    player: String,
    slots: SlotStore,
    equipment: Equipment,
    currency: i64,
    catalog: SharedCatalog,
    sink: S,
    hooks: Hooks,
}

impl<S: ViewSink> InventoryEngine<S> {
    /// Empty inventory of `capacity` slots, at most [`MAX_CAPACITY`].
    pub fn new(player: &str, capacity: usize, catalog: SharedCatalog, sink: S, hooks: Hooks) -> Self {
        if capacity > MAX_CAPACITY {
            warn!(
                "Capacity {} for player {} exceeds {}, capping",
                capacity, player, MAX_CAPACITY
            );
        }
        Self {
            player: player.to_string(),
            slots: SlotStore::with_capacity(capacity),
            equipment: Equipment::new(),
            currency: 0,
            catalog,
            sink,
            hooks,
        }
    }

    /// Session start: rebuild live state from a persisted record.
    ///
    /// Entries that could never have been produced by the engine are dropped
    /// with a warning: zero quantities, slots beyond capacity, items missing
    /// from the catalog, and worn items that do not fit their wear slot.
    /// Stacks above the item's stack limit are cut down to the limit.
    pub fn load(record: &PlayerRecord, catalog: SharedCatalog, sink: S, hooks: Hooks) -> Self {
        let mut engine = Self::new(
            &record.username,
            record.capacity as usize,
            Arc::clone(&catalog),
            sink,
            hooks,
        );
        for (&slot, &entry) in &record.items {
            if entry.quantity == 0 || !engine.slots.in_range(slot) {
                warn!(
                    "Dropping invalid slot {} (item {} x{}) for player {} (capacity {})",
                    slot, entry.item, entry.quantity, record.username, record.capacity
                );
                continue;
            }
            let Some(definition) = catalog.lookup(entry.item) else {
                warn!(
                    "Dropping unknown item {} x{} in slot {} for player {}",
                    entry.item, entry.quantity, slot, record.username
                );
                continue;
            };
            let limit = definition.stack_limit();
            let quantity = if entry.quantity > limit {
                warn!(
                    "Capping slot {} (item {} x{}) to stack limit {} for player {}",
                    slot, entry.item, entry.quantity, limit, record.username
                );
                limit
            } else {
                entry.quantity
            };
            engine.slots.put(slot, SlotEntry::new(entry.item, quantity));
        }
        engine.equipment = record
            .worn
            .iter()
            .filter(|&(&wear_slot, &item)| {
                let fits = catalog
                    .lookup(item)
                    .is_some_and(|definition| definition.fits(wear_slot));
                if !fits {
                    warn!(
                        "Dropping worn item {} in {:?} for player {}",
                        item, wear_slot, record.username
                    );
                }
                fits
            })
            .map(|(s, i)| (*s, *i))
            .collect();
        engine.currency = record.currency;
        debug!(
            "Loaded inventory for {}: {} occupied slots, {} worn items",
            engine.player,
            engine.slots.occupied().count(),
            engine.equipment.len()
        );
        engine
    }

    /// Write live state back into `record`.
    pub fn save_into(&self, record: &mut PlayerRecord) {
        record.items = self.slots.occupied().collect();
        record.worn = self.equipment.iter().collect();
        record.currency = self.currency;
        record.touch();
    }

    pub fn into_record(self, mut record: PlayerRecord) -> PlayerRecord {
        self.save_into(&mut record);
        record
    }

    /// Session end: release the engine and hand back its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn currency(&self) -> i64 {
        self.currency
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn presence(&self) -> &PresenceIndex {
        self.slots.presence()
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn has_any(&self, id: ItemId) -> bool {
        self.slots.presence().contains(id)
    }

    pub fn has_at_least(&self, id: ItemId, amount: Quantity) -> bool {
        self.has_any(id) && self.quantity_of(id) >= amount as u64
    }

    pub fn quantity_of(&self, id: ItemId) -> u64 {
        if !self.has_any(id) {
            return 0;
        }
        self.slots.total_of(id)
    }

    pub fn slot_contents(&self, slot: SlotIndex) -> Option<SlotEntry> {
        self.slots.get(slot)
    }

    pub fn has_exactly_in_slot(&self, slot: SlotIndex, id: ItemId, amount: Quantity) -> bool {
        self.slots.get(slot) == Some(SlotEntry::new(id, amount))
    }

    pub fn free_slots(&self) -> usize {
        self.slots.free_count()
    }

    pub fn worn_items(&self) -> Vec<(WearSlot, ItemId)> {
        self.equipment.iter().collect()
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            capacity: self.slots.capacity(),
            slots: self.slots.occupied().collect(),
            worn: self.worn_items(),
            currency: self.currency,
        }
    }

    // ------------------------------------------------------------------
    // Adding
    // ------------------------------------------------------------------

    /// Look `id` up in the catalog and add `amount` units of it.
    pub fn add_items(&mut self, id: ItemId, amount: Quantity) -> Result<Placement, InventoryError> {
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.lookup(id).ok_or(InventoryError::ItemNotFound(id))?;
        Ok(self.add_item(definition, amount))
    }

    /// Top up existing stacks first (stackables only), then take fresh slots
    /// in ascending order until `amount` is placed or the inventory is full.
    pub fn add_item(&mut self, definition: &ItemDefinition, amount: Quantity) -> Placement {
        if amount == 0 {
            return Placement::Complete;
        }
        let mut remaining = amount;
        if definition.stackable && self.has_any(definition.id) {
            for slot in self.slots.slots_of(definition.id) {
                if remaining == 0 {
                    break;
                }
                remaining = self.top_up(slot, definition, remaining);
            }
            if remaining == 0 {
                debug!(
                    "{}: stacked {} x{} into existing slots",
                    self.player, definition.id, amount
                );
                return Placement::Complete;
            }
        }
        self.fill_fresh_slots(definition, remaining)
    }

    /// Place into exactly `slot`, only if it is empty. Returns the units that
    /// did not fit there.
    pub fn add_item_at(
        &mut self,
        slot: SlotIndex,
        definition: &ItemDefinition,
        amount: Quantity,
    ) -> Quantity {
        if amount == 0 || !self.slots.is_free(slot) {
            return amount;
        }
        self.set_slot(slot, definition, amount)
    }

    fn top_up(&mut self, slot: SlotIndex, definition: &ItemDefinition, amount: Quantity) -> Quantity {
        let Some(entry) = self.slots.get(slot) else {
            return amount;
        };
        let limit = definition.stack_limit();
        if entry.quantity >= limit {
            return amount;
        }
        let added = amount.min(limit - entry.quantity);
        let total = entry.quantity + added;
        self.slots.set_quantity(slot, total);
        self.sink.item_added(definition.id, total, slot);
        amount - added
    }

    fn fill_fresh_slots(&mut self, definition: &ItemDefinition, amount: Quantity) -> Placement {
        let Some(mut slot) = self.slots.first_free() else {
            debug!(
                "{}: no free slot for item {} ({} units unplaced)",
                self.player, definition.id, amount
            );
            return Placement::NoFreeSlot { leftover: amount };
        };
        let mut remaining = amount;
        loop {
            remaining = self.set_slot(slot, definition, remaining);
            if remaining == 0 {
                return Placement::Complete;
            }
            match self.slots.first_free() {
                Some(next) => slot = next,
                None => {
                    debug!(
                        "{}: inventory filled while adding item {} ({} units unplaced)",
                        self.player, definition.id, remaining
                    );
                    return Placement::Partial {
                        leftover: remaining,
                    };
                }
            }
        }
    }

    /// Fill one empty slot with up to a stack of `definition`.
    fn set_slot(&mut self, slot: SlotIndex, definition: &ItemDefinition, amount: Quantity) -> Quantity {
        let placed = amount.min(definition.stack_limit());
        self.slots.put(slot, SlotEntry::new(definition.id, placed));
        self.sink.item_added(definition.id, placed, slot);
        amount - placed
    }

    /// Whether `amount` units could be placed without touching anything else.
    fn can_place(&self, definition: &ItemDefinition, amount: Quantity) -> bool {
        let limit = definition.stack_limit() as u64;
        let mut room = self.slots.free_count() as u64 * limit;
        if definition.stackable {
            room += self
                .slots
                .occupied()
                .filter(|(_, entry)| entry.item == definition.id)
                .map(|(_, entry)| limit.saturating_sub(entry.quantity as u64))
                .sum::<u64>();
        }
        room >= amount as u64
    }

    // ------------------------------------------------------------------
    // Removing
    // ------------------------------------------------------------------

    /// Empty a slot, reporting the full quantity as removed.
    pub fn clear_slot(&mut self, slot: SlotIndex) -> Option<SlotEntry> {
        let entry = self.slots.take(slot)?;
        self.sink.item_removed(slot, entry.quantity);
        Some(entry)
    }

    /// Delete every slot holding `id`. Returns the number of units removed.
    pub fn remove_all(&mut self, id: ItemId) -> u64 {
        if !self.has_any(id) {
            return 0;
        }
        let mut removed = 0u64;
        for slot in self.slots.slots_of(id) {
            if let Some(entry) = self.clear_slot(slot) {
                removed += entry.quantity as u64;
            }
        }
        debug!("{}: removed all of item {} ({} units)", self.player, id, removed);
        removed
    }

    /// Remove `amount` units of `id`, lowest slots first. Returns the part of
    /// the request that could not be satisfied.
    ///
    /// When the player holds no more than `amount`, everything is removed and
    /// the request counts as fully satisfied.
    pub fn remove_amount(&mut self, id: ItemId, amount: Quantity) -> Quantity {
        if !self.has_any(id) {
            return amount;
        }
        if amount == 0 {
            return 0;
        }
        if self.quantity_of(id) <= amount as u64 {
            self.remove_all(id);
            return 0;
        }
        let mut remaining = amount;
        for slot in self.slots.slots_of(id) {
            if remaining == 0 {
                break;
            }
            remaining = self.take_from_slot(slot, remaining);
        }
        debug!(
            "{}: removed {} of item {}",
            self.player,
            amount - remaining,
            id
        );
        remaining
    }

    fn take_from_slot(&mut self, slot: SlotIndex, amount: Quantity) -> Quantity {
        let Some(entry) = self.slots.get(slot) else {
            return amount;
        };
        if entry.quantity <= amount {
            self.slots.take(slot);
            self.sink.item_removed(slot, entry.quantity);
            amount - entry.quantity
        } else {
            self.slots.set_quantity(slot, entry.quantity - amount);
            self.sink.item_removed(slot, amount);
            0
        }
    }

    /// Drop the whole inventory and resync the view in one message.
    pub fn remove_all_items(&mut self) {
        self.slots.clear();
        let snapshot = self.snapshot();
        self.sink.inventory_reset(&snapshot);
        debug!("{}: inventory cleared", self.player);
    }

    // ------------------------------------------------------------------
    // Moving
    // ------------------------------------------------------------------

    /// Relocate a slot's entry into an empty slot.
    ///
    /// Only the destination placement is reported to the view.
    pub fn move_item(&mut self, from: SlotIndex, to: SlotIndex) -> Result<(), InventoryError> {
        for slot in [from, to] {
            if !self.slots.in_range(slot) {
                return Err(InventoryError::SlotOutOfRange(slot));
            }
        }
        let entry = self.slots.get(from).ok_or(InventoryError::SlotEmpty)?;
        if self.slots.get(to).is_some() {
            return Err(InventoryError::SlotOccupied(to));
        }
        self.slots.take(from);
        self.slots.put(to, entry);
        self.sink.item_added(entry.item, entry.quantity, to);
        debug!("{}: moved slot {} -> {}", self.player, from, to);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------

    /// Equip one unit from `from` into `wear_slot`.
    ///
    /// A previously worn item goes back into the inventory. Nothing changes
    /// unless every step can complete.
    pub fn wear(&mut self, wear_slot: WearSlot, from: SlotIndex) -> Result<(), InventoryError> {
        let entry = self.slots.get(from).ok_or(InventoryError::SlotEmpty)?;
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog
            .lookup(entry.item)
            .ok_or(InventoryError::ItemNotFound(entry.item))?;
        if !definition.fits(wear_slot) {
            return Err(InventoryError::IncompatibleEquipSlot { item: entry.item });
        }
        let displaced = match self.equipment.get(wear_slot) {
            Some(previous) => Some(
                catalog
                    .lookup(previous)
                    .ok_or(InventoryError::ItemNotFound(previous))?,
            ),
            None => None,
        };
        // A single-unit slot is vacated below, and taking one unit off a stack
        // of the displaced item leaves room for it in that stack.
        if let Some(previous) = displaced {
            if entry.quantity > 1 && previous.id != entry.item && !self.can_place(previous, 1) {
                warn!(
                    "{}: cannot wear item {}, no room to return item {}",
                    self.player, entry.item, previous.id
                );
                return Err(InventoryError::InventoryFull);
            }
        }

        self.slots.set_quantity(from, entry.quantity - 1);
        self.sink.item_removed(from, 1);
        if let Some(previous) = displaced {
            let placement = self.add_item(previous, 1);
            debug_assert!(placement.is_complete(), "room for displaced item was checked");
        }
        self.equipment.equip(wear_slot, definition.id);
        if definition.affects_stats || displaced.is_some_and(|d| d.affects_stats) {
            self.hooks.stats.recalculate(&self.player);
        }
        self.sink.item_worn(definition.id, wear_slot);
        debug!(
            "{}: wearing item {} in {:?}",
            self.player, definition.id, wear_slot
        );
        Ok(())
    }

    /// Take the item off `wear_slot`, preferring inventory slot `target`.
    pub fn unwear(
        &mut self,
        wear_slot: WearSlot,
        target: SlotIndex,
    ) -> Result<UnwearOutcome, InventoryError> {
        let item = self.equipment.get(wear_slot).ok_or(InventoryError::SlotEmpty)?;
        let catalog = Arc::clone(&self.catalog);
        let Some(definition) = catalog.lookup(item) else {
            self.sink.item_worn(item, wear_slot);
            return Err(InventoryError::ItemNotFound(item));
        };
        let destination = if self.slots.is_free(target) {
            Some(target)
        } else {
            self.slots.first_free()
        };
        match destination {
            Some(slot) if self.add_item_at(slot, definition, 1) == 0 => {
                self.equipment.unequip(wear_slot);
                self.sink.item_unworn(wear_slot);
                if definition.affects_stats {
                    self.hooks.stats.recalculate(&self.player);
                }
                debug!(
                    "{}: unworn item {} from {:?} into slot {}",
                    self.player, item, wear_slot, slot
                );
                Ok(UnwearOutcome::Unworn { slot })
            }
            _ => {
                // The client may already show the item as removed.
                self.sink.item_worn(item, wear_slot);
                debug!(
                    "{}: no room to unwear item {} from {:?}",
                    self.player, item, wear_slot
                );
                Ok(UnwearOutcome::Retained)
            }
        }
    }

    // ------------------------------------------------------------------
    // Use
    // ------------------------------------------------------------------

    /// Dispatch the use action of the item in `slot`. Does not consume it.
    pub fn use_item(&mut self, slot: SlotIndex) -> Result<ItemId, InventoryError> {
        let entry = self.slots.get(slot).ok_or(InventoryError::SlotEmpty)?;
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog
            .lookup(entry.item)
            .ok_or(InventoryError::ItemNotFound(entry.item))?;
        if !definition.usable {
            return Err(InventoryError::NotUsable(entry.item));
        }
        self.hooks.item_use.use_item(entry.item, &self.player);
        Ok(entry.item)
    }

    // ------------------------------------------------------------------
    // Currency
    // ------------------------------------------------------------------

    /// Apply `delta` (which may be negative) and report the new balance.
    pub fn add_currency(&mut self, delta: i64) -> i64 {
        self.currency = self.currency.saturating_add(delta);
        self.sink.currency_changed(self.currency);
        self.currency
    }

    /// Deduct `amount` without letting the balance go negative.
    pub fn spend_currency(&mut self, amount: i64) -> Result<i64, InventoryError> {
        if amount < 0 {
            return Err(InventoryError::InvalidAmount(amount));
        }
        if self.currency < amount {
            return Err(InventoryError::InsufficientCurrency {
                have: self.currency,
                need: amount,
            });
        }
        Ok(self.add_currency(-amount))
    }
}
