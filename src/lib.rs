//! # Satchel - Authoritative Player Inventory Engine
//!
//! Satchel owns the ground truth for what a player carries in a multiplayer
//! game server: items in a bounded slot grid, worn equipment, and a currency
//! balance. It is the only component allowed to mutate that state in response
//! to player-issued requests, and it mirrors every change to the player's
//! client view as it happens.
//!
//! ## Features
//!
//! - **Slot Store**: bounded inventory grid with stacking, splitting and partial fills.
//! - **Presence Index**: O(1) "does the player hold any of item X" queries, kept exact.
//! - **Equipment**: wear/unwear with swap and rollback when the inventory is full.
//! - **View Replication**: one notification per change through a [`ViewSink`](inventory::ViewSink).
//! - **Request Routing**: identity and access-level checks for remote requests.
//! - **Persistence**: sled-backed player records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use satchel::config::Config;
//! use satchel::inventory::{Caller, Hooks, InventoryEngine, LogSink, Request, RequestRouter, StaticCatalog};
//! use satchel::storage::PlayerStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let catalog = Arc::new(StaticCatalog::load_from_json(&config.catalog.path)?);
//!     let store = PlayerStore::open(config.storage.players_path())?;
//!
//!     let record = store.get_or_create_player("alice", config.inventory.default_capacity)?;
//!     let mut engine = InventoryEngine::load(&record, catalog, LogSink::new("alice"), Hooks::default());
//!     let router = RequestRouter::new(&config.inventory);
//!
//!     let caller = Caller::new("alice", record.access_level);
//!     router.dispatch(&mut engine, &caller, &Request::MoveItem { from: 0, to: 1 });
//!
//!     store.put_player(engine.into_record(record))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`inventory`] - Data model, engine, view sinks and request routing
//! - [`storage`] - Player record persistence
//! - [`config`] - Configuration management and validation
//! - [`roles`] - Access level constants
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Request Router  │ ← Identity and access checks
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Inventory       │ ← Slots, presence, equipment, currency
//! │ Engine          │ ──→ View Sink, stats/use hooks
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Player Store    │ ← Data persistence
//! └─────────────────┘
//! ```

pub mod config;
pub mod inventory;
pub mod roles;
pub mod storage;
