//! Inventory data model, engine, and request routing.
//!
//! A player session owns one [`InventoryEngine`], built from a persisted
//! [`PlayerRecord`] and a shared [`ItemCatalog`]. Requests arriving from the
//! player's client pass through [`RequestRouter`]; every state change is
//! mirrored to the session's [`ViewSink`].

pub mod catalog;
pub mod engine;
pub mod equipment;
pub mod errors;
pub mod hooks;
pub mod record;
pub mod router;
pub mod sink;
pub mod slots;
pub mod types;

pub use catalog::{ItemCatalog, StaticCatalog};
pub use engine::{InventoryEngine, Placement, SharedCatalog, UnwearOutcome};
pub use equipment::Equipment;
pub use errors::{CatalogError, InventoryError};
pub use hooks::{Hooks, ItemUseHook, NoopHooks, StatsHook};
pub use record::{PlayerRecord, PLAYER_SCHEMA_VERSION};
pub use router::{Caller, Reply, Request, RequestRouter};
pub use sink::{InventorySnapshot, LogSink, Notification, RecordingSink, ViewSink};
pub use slots::{PresenceIndex, SlotStore};
pub use types::*;
