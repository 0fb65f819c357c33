//! Remote view replication.
//!
//! Every state change made by the engine is mirrored to a [`ViewSink`] in the
//! same operation. Delivery is fire-and-forget: the engine never waits on the
//! sink and sinks cannot fail.

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{ItemId, Quantity, SlotEntry, SlotIndex, WearSlot};

/// Full inventory state, sent when the client view must be replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub capacity: usize,
    pub slots: Vec<(SlotIndex, SlotEntry)>,
    pub worn: Vec<(WearSlot, ItemId)>,
    pub currency: i64,
}

/// Receiver of engine notifications, one call per semantic event.
pub trait ViewSink {
    /// `quantity` is the slot's resulting quantity.
    fn item_added(&mut self, item: ItemId, quantity: Quantity, slot: SlotIndex);
    /// `quantity` is the number of units taken away.
    fn item_removed(&mut self, slot: SlotIndex, quantity: Quantity);
    fn item_worn(&mut self, item: ItemId, wear_slot: WearSlot);
    fn item_unworn(&mut self, wear_slot: WearSlot);
    fn inventory_reset(&mut self, snapshot: &InventorySnapshot);
    fn currency_changed(&mut self, balance: i64);
}

impl<S: ViewSink + ?Sized> ViewSink for Box<S> {
    fn item_added(&mut self, item: ItemId, quantity: Quantity, slot: SlotIndex) {
        (**self).item_added(item, quantity, slot)
    }
    fn item_removed(&mut self, slot: SlotIndex, quantity: Quantity) {
        (**self).item_removed(slot, quantity)
    }
    fn item_worn(&mut self, item: ItemId, wear_slot: WearSlot) {
        (**self).item_worn(item, wear_slot)
    }
    fn item_unworn(&mut self, wear_slot: WearSlot) {
        (**self).item_unworn(wear_slot)
    }
    fn inventory_reset(&mut self, snapshot: &InventorySnapshot) {
        (**self).inventory_reset(snapshot)
    }
    fn currency_changed(&mut self, balance: i64) {
        (**self).currency_changed(balance)
    }
}

/// A captured notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    ItemAdded {
        item: ItemId,
        quantity: Quantity,
        slot: SlotIndex,
    },
    ItemRemoved {
        slot: SlotIndex,
        quantity: Quantity,
    },
    ItemWorn {
        item: ItemId,
        wear_slot: WearSlot,
    },
    ItemUnworn {
        wear_slot: WearSlot,
    },
    InventoryReset {
        snapshot: InventorySnapshot,
    },
    CurrencyChanged {
        balance: i64,
    },
}

/// Sink that keeps every notification in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<Notification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Notification] {
        &self.events
    }

    /// Hand back everything recorded so far and start over.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ViewSink for RecordingSink {
    fn item_added(&mut self, item: ItemId, quantity: Quantity, slot: SlotIndex) {
        self.events.push(Notification::ItemAdded {
            item,
            quantity,
            slot,
        });
    }

    fn item_removed(&mut self, slot: SlotIndex, quantity: Quantity) {
        self.events.push(Notification::ItemRemoved { slot, quantity });
    }

    fn item_worn(&mut self, item: ItemId, wear_slot: WearSlot) {
        self.events.push(Notification::ItemWorn { item, wear_slot });
    }

    fn item_unworn(&mut self, wear_slot: WearSlot) {
        self.events.push(Notification::ItemUnworn { wear_slot });
    }

    fn inventory_reset(&mut self, snapshot: &InventorySnapshot) {
        self.events.push(Notification::InventoryReset {
            snapshot: snapshot.clone(),
        });
    }

    fn currency_changed(&mut self, balance: i64) {
        self.events.push(Notification::CurrencyChanged { balance });
    }
}

/// Sink that only logs, for hosts without a connected client view.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    player: String,
}

impl LogSink {
    pub fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
        }
    }
}

impl ViewSink for LogSink {
    fn item_added(&mut self, item: ItemId, quantity: Quantity, slot: SlotIndex) {
        debug!("view[{}]: slot {} <- item {} x{}", self.player, slot, item, quantity);
    }

    fn item_removed(&mut self, slot: SlotIndex, quantity: Quantity) {
        debug!("view[{}]: slot {} -{}", self.player, slot, quantity);
    }

    fn item_worn(&mut self, item: ItemId, wear_slot: WearSlot) {
        debug!("view[{}]: wear {:?} <- item {}", self.player, wear_slot, item);
    }

    fn item_unworn(&mut self, wear_slot: WearSlot) {
        debug!("view[{}]: unwear {:?}", self.player, wear_slot);
    }

    fn inventory_reset(&mut self, snapshot: &InventorySnapshot) {
        debug!(
            "view[{}]: reset ({} occupied slots, {} worn)",
            self.player,
            snapshot.slots.len(),
            snapshot.worn.len()
        );
    }

    fn currency_changed(&mut self, balance: i64) {
        debug!("view[{}]: currency {}", self.player, balance);
    }
}
