use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Catalog identifier of an item.
pub type ItemId = i32;
/// Index of a cell in the bounded inventory grid.
pub type SlotIndex = u8;
/// Number of units held in a slot.
pub type Quantity = u32;

/// Largest inventory a player may be configured with (slot indices are bytes).
pub const MAX_CAPACITY: usize = SlotIndex::MAX as usize;

/// One occupied inventory cell.
///
/// Empty cells are `None` wherever a `SlotEntry` is looked up; an entry with a
/// zero quantity is never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotEntry {
    pub item: ItemId,
    pub quantity: Quantity,
}

impl SlotEntry {
    pub fn new(item: ItemId, quantity: Quantity) -> Self {
        Self { item, quantity }
    }
}

bitflags! {
    /// Wear slots an item may be equipped into.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EquipSlots: u16 {
        const HEAD      = 1 << 0;
        const FACE      = 1 << 1;
        const NECK      = 1 << 2;
        const BODY      = 1 << 3;
        const BACK      = 1 << 4;
        const HANDS     = 1 << 5;
        const LEGS      = 1 << 6;
        const FEET      = 1 << 7;
        const ACCESSORY = 1 << 8;
    }
}

impl Default for EquipSlots {
    fn default() -> Self {
        Self::empty()
    }
}

/// Equipment attachment point, addressed on the wire by a 1-based byte.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WearSlot {
    Head = 1,
    Face = 2,
    Neck = 3,
    Body = 4,
    Back = 5,
    Hands = 6,
    Legs = 7,
    Feet = 8,
    Accessory = 9,
}

impl WearSlot {
    pub const ALL: [WearSlot; 9] = [
        WearSlot::Head,
        WearSlot::Face,
        WearSlot::Neck,
        WearSlot::Body,
        WearSlot::Back,
        WearSlot::Hands,
        WearSlot::Legs,
        WearSlot::Feet,
        WearSlot::Accessory,
    ];

    pub fn from_byte(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.as_byte() == value)
    }

    /// Unwear requests name the slot by its zero-based base value.
    pub fn from_base(base: u8) -> Option<Self> {
        base.checked_add(1).and_then(Self::from_byte)
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// The compatibility bit an item must carry to be worn here.
    pub fn mask(self) -> EquipSlots {
        EquipSlots::from_bits_truncate(1 << (self.as_byte() - 1))
    }
}

/// Static catalog metadata for an item. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub stackable: bool,
    /// Stack limit; ignored unless `stackable` is set.
    #[serde(default)]
    pub max_stack: Quantity,
    #[serde(default)]
    pub usable: bool,
    #[serde(default)]
    pub affects_stats: bool,
    #[serde(default)]
    pub equip_slots: EquipSlots,
}

impl ItemDefinition {
    pub fn new(id: ItemId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            stackable: false,
            max_stack: 1,
            usable: false,
            affects_stats: false,
            equip_slots: EquipSlots::empty(),
        }
    }

    pub fn with_stack(mut self, max_stack: Quantity) -> Self {
        self.stackable = true;
        self.max_stack = max_stack;
        self
    }

    pub fn with_equip_slots(mut self, slots: EquipSlots) -> Self {
        self.equip_slots = slots;
        self
    }

    pub fn usable(mut self) -> Self {
        self.usable = true;
        self
    }

    pub fn affecting_stats(mut self) -> Self {
        self.affects_stats = true;
        self
    }

    /// Most units one slot may hold: `max_stack` for stackables, 1 otherwise.
    pub fn stack_limit(&self) -> Quantity {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }

    pub fn fits(&self, wear_slot: WearSlot) -> bool {
        self.equip_slots.contains(wear_slot.mask())
    }

    /// Name shown in player-facing messages, falling back to the id.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wear_slot_bytes_round_trip_through_masks() {
        for slot in WearSlot::ALL {
            assert_eq!(WearSlot::from_byte(slot.as_byte()), Some(slot));
            assert_eq!(slot.mask().bits().count_ones(), 1);
        }
        assert_eq!(WearSlot::from_byte(0), None);
        assert_eq!(WearSlot::from_byte(10), None);
    }

    #[test]
    fn unwear_base_is_one_below_wear_slot() {
        assert_eq!(WearSlot::from_base(0), Some(WearSlot::Head));
        assert_eq!(WearSlot::from_base(3), Some(WearSlot::Body));
        assert_eq!(WearSlot::from_base(255), None);
    }

    #[test]
    fn stack_limit_is_one_for_non_stackables() {
        let helmet = ItemDefinition::new(10, "Helmet");
        assert_eq!(helmet.stack_limit(), 1);
        let apples = ItemDefinition::new(11, "Apple").with_stack(20);
        assert_eq!(apples.stack_limit(), 20);
    }

    #[test]
    fn fits_checks_mask_containment() {
        let hat = ItemDefinition::new(1, "Hat").with_equip_slots(EquipSlots::HEAD);
        assert!(hat.fits(WearSlot::Head));
        assert!(!hat.fits(WearSlot::Body));

        let cloak =
            ItemDefinition::new(2, "Cloak").with_equip_slots(EquipSlots::BODY | EquipSlots::BACK);
        assert!(cloak.fits(WearSlot::Back));
        assert!(cloak.fits(WearSlot::Body));
    }
}
