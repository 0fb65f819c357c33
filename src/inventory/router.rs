//! Request routing for player-issued inventory requests.
//!
//! The transport layer decodes a [`Request`] and hands it here together with
//! the [`Caller`] that sent it. The router checks identity and access level,
//! calls into the engine, and turns the outcome into a [`Reply`] for the
//! sender. Requests that fail the identity check are dropped without a reply
//! and logged on the `security` target.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::engine::{InventoryEngine, Placement, UnwearOutcome};
use super::errors::InventoryError;
use super::sink::ViewSink;
use super::types::{ItemId, Quantity, SlotIndex, WearSlot};
use crate::config::InventoryConfig;
use crate::roles::role_name;

/// Decoded player request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    WornItems,
    AddItem { item: ItemId, amount: i64 },
    RemoveItem { slot: SlotIndex, amount: i64 },
    WearItem { wear_slot: u8, slot: SlotIndex },
    /// `wear_slot_base` is zero-based; the worn slot is `base + 1`.
    UnwearItem { wear_slot_base: u8, slot: SlotIndex },
    UseItem { slot: SlotIndex },
    MoveItem { from: SlotIndex, to: SlotIndex },
}

impl Request {
    fn is_mutating(&self) -> bool {
        !matches!(self, Request::WornItems)
    }
}

/// Who sent a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub access_level: u8,
}

impl Caller {
    pub fn new(username: &str, access_level: u8) -> Self {
        Self {
            username: username.to_string(),
            access_level,
        }
    }
}

/// What the sender gets back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reply", content = "body", rename_all = "snake_case")]
pub enum Reply {
    Silent,
    Announce(String),
    Error(String),
    WornItems(Vec<(WearSlot, ItemId)>),
}

pub struct RequestRouter {
    add_item_level: u8,
}

impl RequestRouter {
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            add_item_level: config.add_item_level,
        }
    }

    /// Apply `request` from `caller` to the session owning `engine`.
    pub fn dispatch<S: ViewSink>(
        &self,
        engine: &mut InventoryEngine<S>,
        caller: &Caller,
        request: &Request,
    ) -> Reply {
        if request.is_mutating() && !caller.username.eq_ignore_ascii_case(engine.player()) {
            warn!(
                target: "security",
                "Dropped {:?} from {} against inventory of {}",
                request,
                caller.username,
                engine.player()
            );
            return Reply::Silent;
        }
        debug!("{} -> {:?}", caller.username, request);

        match *request {
            Request::WornItems => Reply::WornItems(engine.worn_items()),
            Request::AddItem { item, amount } => self.add_item(engine, caller, item, amount),
            Request::RemoveItem { slot, amount } => remove_item(engine, slot, amount),
            Request::WearItem { wear_slot, slot } => wear_item(engine, wear_slot, slot),
            Request::UnwearItem {
                wear_slot_base,
                slot,
            } => unwear_item(engine, wear_slot_base, slot),
            Request::UseItem { slot } => use_item(engine, slot),
            Request::MoveItem { from, to } => {
                if let Err(e) = engine.move_item(from, to) {
                    debug!("{}: move {} -> {} ignored: {}", engine.player(), from, to, e);
                }
                Reply::Silent
            }
        }
    }

    fn add_item<S: ViewSink>(
        &self,
        engine: &mut InventoryEngine<S>,
        caller: &Caller,
        item: ItemId,
        amount: i64,
    ) -> Reply {
        if caller.access_level < self.add_item_level {
            warn!(
                target: "security",
                "{} ({}) attempted to add item {} x{}",
                caller.username,
                role_name(caller.access_level),
                item,
                amount
            );
            return error_reply(InventoryError::Unauthorized(
                "you don't have permission to add items".to_string(),
            ));
        }
        let amount = match requested_quantity(amount) {
            Ok(amount) => amount,
            Err(e) => return error_reply(e),
        };
        let name = match engine.catalog().lookup(item) {
            Some(definition) => definition.display_name(),
            None => return Reply::Error(format!("Item {} not found", item)),
        };
        match engine.add_items(item, amount) {
            Ok(Placement::Complete) => {
                info!("{} added item {} x{} to {}", caller.username, item, amount, engine.player());
                Reply::Announce(format!("Added item {} amount {}", name, amount))
            }
            Ok(placement) => Reply::Announce(format!(
                "Inventory full, added {}/{} items",
                placement.placed(amount),
                amount
            )),
            Err(e) => error_reply(e),
        }
    }
}

fn remove_item<S: ViewSink>(engine: &mut InventoryEngine<S>, slot: SlotIndex, amount: i64) -> Reply {
    let amount = match requested_quantity(amount) {
        Ok(amount) => amount,
        Err(e) => return error_reply(e),
    };
    let Some(entry) = engine.slot_contents(slot) else {
        return Reply::Error(format!("Inventory slot {} is empty", slot));
    };
    let leftover = engine.remove_amount(entry.item, amount);
    if leftover == 0 {
        Reply::Announce(format!(
            "Removed {} items {} from {}",
            amount, entry.item, slot
        ))
    } else {
        Reply::Announce(format!(
            "Error while removing items {} from {} removed {}/{}",
            entry.item,
            slot,
            amount - leftover,
            amount
        ))
    }
}

fn wear_item<S: ViewSink>(engine: &mut InventoryEngine<S>, wear_slot: u8, slot: SlotIndex) -> Reply {
    let Some(target) = WearSlot::from_byte(wear_slot) else {
        return error_reply(InventoryError::InvalidWearSlot(wear_slot));
    };
    let source = engine.slot_contents(slot).map(|entry| entry.item);
    match engine.wear(target, slot) {
        Ok(()) => Reply::Silent,
        Err(InventoryError::IncompatibleEquipSlot { item }) => Reply::Error(format!(
            "You can't wear item {} in slot {:?}",
            item_name(engine, item),
            target
        )),
        Err(InventoryError::SlotEmpty) => Reply::Error(format!("Inventory slot {} is empty", slot)),
        Err(InventoryError::ItemNotFound(item)) if source == Some(item) => {
            Reply::Error(format!("Inventory slot {} is empty", slot))
        }
        Err(e) => error_reply(e),
    }
}

fn unwear_item<S: ViewSink>(engine: &mut InventoryEngine<S>, base: u8, slot: SlotIndex) -> Reply {
    let Some(target) = WearSlot::from_base(base) else {
        return error_reply(InventoryError::InvalidWearSlot(base));
    };
    match engine.unwear(target, slot) {
        Ok(UnwearOutcome::Unworn { .. }) => {}
        Ok(UnwearOutcome::Retained) => {
            debug!("{}: unwear of {:?} kept, inventory full", engine.player(), target)
        }
        Err(e) => debug!("{}: unwear of {:?} ignored: {}", engine.player(), target, e),
    }
    Reply::Silent
}

fn use_item<S: ViewSink>(engine: &mut InventoryEngine<S>, slot: SlotIndex) -> Reply {
    match engine.use_item(slot) {
        Ok(_) => Reply::Silent,
        Err(InventoryError::NotUsable(item)) => {
            Reply::Error(format!("You can't use item {}", item_name(engine, item)))
        }
        Err(_) => Reply::Error(format!(
            "Inventory slot {} is empty or item not found",
            slot
        )),
    }
}

/// Wire amounts are signed; only positive values that fit a slot count pass.
fn requested_quantity(amount: i64) -> Result<Quantity, InventoryError> {
    match Quantity::try_from(amount) {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(InventoryError::InvalidAmount(amount)),
    }
}

fn item_name<S: ViewSink>(engine: &InventoryEngine<S>, item: ItemId) -> String {
    engine
        .catalog()
        .lookup(item)
        .map(|definition| definition.display_name())
        .unwrap_or_else(|| item.to_string())
}

fn error_reply(error: InventoryError) -> Reply {
    let message = error.to_string();
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => Reply::Error(first.to_uppercase().chain(chars).collect()),
        None => Reply::Error(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::catalog::StaticCatalog;
    use crate::inventory::hooks::Hooks;
    use crate::inventory::sink::RecordingSink;
    use crate::inventory::catalog::ItemCatalog;
    use crate::inventory::record::PlayerRecord;
    use crate::inventory::types::{EquipSlots, ItemDefinition, SlotEntry};
    use crate::roles::{LEVEL_PLAYER, LEVEL_TEAM_MEMBER};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn session() -> InventoryEngine<RecordingSink> {
        let catalog = StaticCatalog::from_definitions(vec![
            ItemDefinition::new(1, "Apple").with_stack(5),
            ItemDefinition::new(2, "Hat").with_equip_slots(EquipSlots::HEAD),
        ])
        .expect("catalog");
        InventoryEngine::new(
            "alice",
            2,
            Arc::new(catalog),
            RecordingSink::new(),
            Hooks::default(),
        )
    }

    fn router() -> RequestRouter {
        RequestRouter::new(&InventoryConfig::default())
    }

    #[test]
    fn foreign_mutations_are_dropped() {
        let mut inv = session();
        let reply = router().dispatch(
            &mut inv,
            &Caller::new("mallory", LEVEL_TEAM_MEMBER),
            &Request::AddItem { item: 1, amount: 3 },
        );
        assert_eq!(reply, Reply::Silent);
        assert!(!inv.has_any(1));
    }

    #[test]
    fn worn_items_query_is_open() {
        let mut inv = session();
        let reply = router().dispatch(&mut inv, &Caller::new("bob", LEVEL_PLAYER), &Request::WornItems);
        assert_eq!(reply, Reply::WornItems(Vec::new()));
    }

    #[test]
    fn add_requires_access_level() {
        let mut inv = session();
        let reply = router().dispatch(
            &mut inv,
            &Caller::new("alice", LEVEL_PLAYER),
            &Request::AddItem { item: 1, amount: 3 },
        );
        assert!(matches!(reply, Reply::Error(msg) if msg.contains("permission")));
        assert!(!inv.has_any(1));
    }

    #[test]
    fn add_reports_partial_placement() {
        let mut inv = session();
        let owner = Caller::new("Alice", LEVEL_TEAM_MEMBER);
        let reply = router().dispatch(&mut inv, &owner, &Request::AddItem { item: 1, amount: 12 });
        assert_eq!(reply, Reply::Announce("Inventory full, added 10/12 items".to_string()));

        let reply = router().dispatch(&mut inv, &owner, &Request::AddItem { item: 7, amount: 1 });
        assert_eq!(reply, Reply::Error("Item 7 not found".to_string()));
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let mut inv = session();
        let owner = Caller::new("alice", LEVEL_TEAM_MEMBER);
        let reply = router().dispatch(&mut inv, &owner, &Request::AddItem { item: 1, amount: 0 });
        assert_eq!(reply, Reply::Error("Invalid amount: 0".to_string()));
        let reply = router().dispatch(&mut inv, &owner, &Request::RemoveItem { slot: 0, amount: -3 });
        assert_eq!(reply, Reply::Error("Invalid amount: -3".to_string()));
    }

    #[test]
    fn remove_by_slot_removes_that_item() {
        let mut inv = session();
        inv.add_items(1, 8).unwrap();
        let owner = Caller::new("alice", LEVEL_PLAYER);
        let reply = router().dispatch(&mut inv, &owner, &Request::RemoveItem { slot: 1, amount: 6 });
        assert_eq!(reply, Reply::Announce("Removed 6 items 1 from 1".to_string()));
        assert_eq!(inv.quantity_of(1), 2);

        let reply = router().dispatch(&mut inv, &owner, &Request::RemoveItem { slot: 0, amount: 1 });
        assert_eq!(reply, Reply::Error("Inventory slot 0 is empty".to_string()));
    }

    #[test]
    fn wear_and_unwear_use_wire_slot_numbering() {
        let mut inv = session();
        inv.add_items(2, 1).unwrap();
        let owner = Caller::new("alice", LEVEL_PLAYER);

        let reply = router().dispatch(&mut inv, &owner, &Request::WearItem { wear_slot: 4, slot: 0 });
        assert_eq!(reply, Reply::Error("You can't wear item Hat in slot Body".to_string()));

        let reply = router().dispatch(&mut inv, &owner, &Request::WearItem { wear_slot: 1, slot: 0 });
        assert_eq!(reply, Reply::Silent);
        assert_eq!(inv.equipment().get(WearSlot::Head), Some(2));

        router().dispatch(
            &mut inv,
            &owner,
            &Request::UnwearItem { wear_slot_base: 0, slot: 1 },
        );
        assert!(inv.equipment().is_empty());
        assert_eq!(inv.slot_contents(1), Some(SlotEntry::new(2, 1)));
    }

    /// Catalog that can stop knowing one item after a session is loaded.
    struct RetiringCatalog {
        inner: StaticCatalog,
        retired: ItemId,
        retire: AtomicBool,
    }

    impl ItemCatalog for RetiringCatalog {
        fn lookup(&self, id: ItemId) -> Option<&ItemDefinition> {
            if id == self.retired && self.retire.load(Ordering::SeqCst) {
                return None;
            }
            self.inner.lookup(id)
        }
    }

    #[test]
    fn wear_over_a_retired_item_names_that_item() {
        let catalog = Arc::new(RetiringCatalog {
            inner: StaticCatalog::from_definitions(vec![
                ItemDefinition::new(2, "Hat").with_equip_slots(EquipSlots::HEAD),
                ItemDefinition::new(3, "Cap").with_equip_slots(EquipSlots::HEAD),
            ])
            .expect("catalog"),
            retired: 3,
            retire: AtomicBool::new(false),
        });
        let record = PlayerRecord::new("alice", "Alice", 2)
            .with_item(0, 2, 1)
            .with_worn(WearSlot::Head, 3);
        let mut inv = InventoryEngine::load(
            &record,
            catalog.clone(),
            RecordingSink::new(),
            Hooks::default(),
        );
        assert_eq!(inv.equipment().get(WearSlot::Head), Some(3));
        catalog.retire.store(true, Ordering::SeqCst);

        let owner = Caller::new("alice", LEVEL_PLAYER);
        let reply = router().dispatch(&mut inv, &owner, &Request::WearItem { wear_slot: 1, slot: 0 });
        assert_eq!(reply, Reply::Error("Item 3 not found".to_string()));
        assert_eq!(inv.slot_contents(0), Some(SlotEntry::new(2, 1)));

        let reply = router().dispatch(&mut inv, &owner, &Request::WearItem { wear_slot: 1, slot: 1 });
        assert_eq!(reply, Reply::Error("Inventory slot 1 is empty".to_string()));
    }

    #[test]
    fn invalid_wear_slot_is_rejected() {
        let mut inv = session();
        let owner = Caller::new("alice", LEVEL_PLAYER);
        let reply = router().dispatch(&mut inv, &owner, &Request::WearItem { wear_slot: 42, slot: 0 });
        assert_eq!(reply, Reply::Error("Invalid wear slot: 42".to_string()));
    }

    #[test]
    fn requests_decode_from_json() {
        let request: Request =
            serde_json::from_str(r#"{"request":"move_item","from":0,"to":3}"#).expect("decode");
        assert_eq!(request, Request::MoveItem { from: 0, to: 3 });
    }
}
