use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{ItemId, SlotEntry, SlotIndex, WearSlot};

pub const PLAYER_SCHEMA_VERSION: u8 = 1;

/// Persisted player state the inventory engine is loaded from and saved into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Privilege level, see [`crate::roles`].
    #[serde(default = "default_access_level")]
    pub access_level: u8,
    /// Number of inventory slots this player owns.
    pub capacity: u8,
    /// Occupied inventory slots only.
    #[serde(default)]
    pub items: BTreeMap<SlotIndex, SlotEntry>,
    #[serde(default)]
    pub worn: BTreeMap<WearSlot, ItemId>,
    #[serde(default)]
    pub currency: i64,
    pub schema_version: u8,
}

fn default_access_level() -> u8 {
    crate::roles::LEVEL_PLAYER
}

impl PlayerRecord {
    pub fn new(username: &str, display_name: &str, capacity: u8) -> Self {
        let now = Utc::now();
        Self {
            username: username.to_string(),
            display_name: display_name.to_string(),
            created_at: now,
            updated_at: now,
            access_level: default_access_level(),
            capacity,
            items: BTreeMap::new(),
            worn: BTreeMap::new(),
            currency: 0,
            schema_version: PLAYER_SCHEMA_VERSION,
        }
    }

    pub fn with_access_level(mut self, level: u8) -> Self {
        self.access_level = level;
        self
    }

    pub fn with_item(mut self, slot: SlotIndex, item: ItemId, quantity: u32) -> Self {
        self.items.insert(slot, SlotEntry::new(item, quantity));
        self
    }

    pub fn with_worn(mut self, wear_slot: WearSlot, item: ItemId) -> Self {
        self.worn.insert(wear_slot, item);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
