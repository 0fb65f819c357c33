/// Long operation walks checking that the presence index, stack limits and
/// the client view stay consistent with the slot store.
use std::collections::HashMap;
use std::sync::Arc;

use satchel::inventory::{
    Hooks, InventoryEngine, ItemCatalog, Notification, RecordingSink, SlotEntry, SlotIndex,
    StaticCatalog, WearSlot,
};

const SHIPPED_SEED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/seeds/items.json");
const CAPACITY: usize = 6;
const ITEM_IDS: [i32; 10] = [1, 2, 3, 10, 11, 12, 13, 14, 15, 20];

/// Small deterministic generator so walks are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn check_invariants(engine: &InventoryEngine<RecordingSink>, catalog: &StaticCatalog, step: usize) {
    let mut holders: HashMap<i32, u32> = HashMap::new();
    for slot in 0..CAPACITY as SlotIndex {
        if let Some(entry) = engine.slot_contents(slot) {
            assert!(entry.quantity >= 1, "step {}: empty entry stored in {}", step, slot);
            let def = catalog.lookup(entry.item).expect("known item");
            assert!(
                entry.quantity <= def.stack_limit(),
                "step {}: slot {} holds {} of {} (limit {})",
                step,
                slot,
                entry.quantity,
                def.name,
                def.stack_limit()
            );
            *holders.entry(entry.item).or_insert(0) += 1;
        }
    }
    for id in ITEM_IDS {
        let expected = holders.get(&id).copied().unwrap_or(0);
        assert_eq!(
            engine.has_any(id),
            expected > 0,
            "step {}: presence of {} disagrees with slots",
            step,
            id
        );
        assert_eq!(engine.presence().slot_count(id), expected, "step {}: count of {}", step, id);
    }
    assert_eq!(engine.presence().len(), holders.len());
}

/// Apply the view notifications to a client-side mirror of the slots.
fn replay_view(view: &mut HashMap<SlotIndex, SlotEntry>, events: Vec<Notification>) {
    for event in events {
        match event {
            Notification::ItemAdded { item, quantity, slot } => {
                view.insert(slot, SlotEntry::new(item, quantity));
            }
            Notification::ItemRemoved { slot, quantity } => {
                let remaining = view.get(&slot).map(|e| e.quantity).unwrap_or(0);
                assert!(remaining >= quantity, "view removed more than it held");
                if remaining == quantity {
                    view.remove(&slot);
                } else if let Some(entry) = view.get_mut(&slot) {
                    entry.quantity -= quantity;
                }
            }
            Notification::InventoryReset { snapshot } => {
                view.clear();
                view.extend(snapshot.slots);
            }
            _ => {}
        }
    }
}

fn walk(seed: u64, steps: usize) {
    let catalog = Arc::new(StaticCatalog::load_from_json(SHIPPED_SEED).expect("seed catalog"));
    let mut engine = InventoryEngine::new(
        "walker",
        CAPACITY,
        catalog.clone(),
        RecordingSink::new(),
        Hooks::default(),
    );
    let mut rng = Lcg(seed);
    let mut view: HashMap<SlotIndex, SlotEntry> = HashMap::new();

    for step in 0..steps {
        let id = ITEM_IDS[rng.below(ITEM_IDS.len() as u64) as usize];
        let slot = rng.below(CAPACITY as u64 + 1) as SlotIndex;
        let amount = rng.below(30) as u32 + 1;
        let moved_from = engine.slot_contents(slot);
        let mut moved = false;
        match rng.below(100) {
            0..=34 => {
                let _ = engine.add_items(id, amount);
            }
            35..=54 => {
                let leftover = engine.remove_amount(id, amount);
                assert!(leftover <= amount);
            }
            55..=59 => {
                engine.remove_all(id);
            }
            60..=64 => {
                engine.clear_slot(slot);
            }
            65..=79 => {
                let to = rng.below(CAPACITY as u64) as SlotIndex;
                moved = engine.move_item(slot, to).is_ok();
                if moved {
                    // Moves only announce the destination; the client clears the source itself.
                    view.remove(&slot);
                    assert_eq!(engine.slot_contents(to), moved_from);
                }
            }
            80..=89 => {
                let wear_slot = WearSlot::ALL[rng.below(9) as usize];
                let _ = engine.wear(wear_slot, slot);
            }
            90..=98 => {
                let wear_slot = WearSlot::ALL[rng.below(9) as usize];
                let _ = engine.unwear(wear_slot, slot);
            }
            _ => engine.remove_all_items(),
        }
        let events = engine.sink_mut().drain();
        if moved {
            assert_eq!(events.len(), 1, "step {}: move emits one notification", step);
        }
        replay_view(&mut view, events);
        check_invariants(&engine, &catalog, step);

        let actual: HashMap<SlotIndex, SlotEntry> = (0..CAPACITY as SlotIndex)
            .filter_map(|s| engine.slot_contents(s).map(|e| (s, e)))
            .collect();
        assert_eq!(view, actual, "step {}: client view diverged", step);
    }
}

#[test]
fn presence_tracks_slots_over_long_walks() {
    for seed in [1, 7, 42, 2024, 0xDEAD_BEEF] {
        walk(seed, 2_000);
    }
}

#[test]
fn conservation_after_remove_then_add() {
    let catalog = Arc::new(StaticCatalog::load_from_json(SHIPPED_SEED).expect("seed catalog"));
    let mut engine = InventoryEngine::new("keeper", 4, catalog, RecordingSink::new(), Hooks::default());
    engine.add_items(2, 150).expect("arrows");
    let before = engine.quantity_of(2);

    let leftover = engine.remove_amount(2, 120);
    assert_eq!(leftover, 0);
    assert_eq!(engine.quantity_of(2), before - 120);
    assert!(engine.has_any(2));

    let placement = engine.add_items(2, 120).expect("arrows");
    assert!(placement.is_complete());
    assert_eq!(engine.quantity_of(2), before);
}
