//! # Storage Module - Player Persistence
//!
//! Player records (inventory slots, worn items, currency) are kept in a sled
//! database, bincode-encoded and keyed by lowercase username:
//!
//! ```text
//! data/
//! └── players/        ← sled database, tree `satchel_players`
//! ```
//!
//! When a session saves is up to the host; the store only reads and writes
//! whole records.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use satchel::storage::PlayerStore;
//!
//! fn main() -> Result<(), satchel::storage::StoreError> {
//!     let store = PlayerStore::open("./data/players")?;
//!     let record = store.get_or_create_player("alice", 32)?;
//!     store.put_player(record)?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod players;

pub use errors::StoreError;
pub use players::{PlayerStore, PlayerStoreBuilder};
