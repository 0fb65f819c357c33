use thiserror::Error;

use super::types::{ItemId, SlotIndex};

/// Recoverable failures reported by inventory operations.
///
/// None of these end a session; the request router turns them into a message
/// for the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The referenced item identifier has no catalog definition.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// An inventory or wear slot held nothing.
    #[error("slot is empty")]
    SlotEmpty,

    /// A move or placement target was already occupied.
    #[error("slot {0} is occupied")]
    SlotOccupied(SlotIndex),

    /// Slot index beyond the player's configured capacity.
    #[error("slot {0} is outside the inventory")]
    SlotOutOfRange(SlotIndex),

    /// The item cannot be worn in the requested wear slot.
    #[error("item {item} cannot be worn in that slot")]
    IncompatibleEquipSlot { item: ItemId },

    /// The item has no use action.
    #[error("item {0} is not usable")]
    NotUsable(ItemId),

    /// No free slot to complete a placement.
    #[error("inventory is full")]
    InventoryFull,

    /// Spending more currency than the player holds.
    #[error("insufficient currency: have {have}, need {need}")]
    InsufficientCurrency { have: i64, need: i64 },

    /// Request carried a zero or otherwise meaningless amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Request named a wear slot that does not exist.
    #[error("invalid wear slot: {0}")]
    InvalidWearSlot(u8),

    /// Sender is not the owning player or lacks the access level.
    #[error("permission denied: {0}")]
    Unauthorized(String),
}

/// Errors raised while building an item catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse item seeds: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),

    #[error("item {0} is stackable with a zero stack limit")]
    ZeroStack(ItemId),
}
