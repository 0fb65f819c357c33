use std::path::{Path, PathBuf};

use log::{debug, info};
use sled::IVec;

use super::errors::StoreError;
use crate::inventory::record::{PlayerRecord, PLAYER_SCHEMA_VERSION};
use crate::inventory::MAX_CAPACITY;

const TREE_PLAYERS: &str = "satchel_players";
const PLAYER_PREFIX: &str = "players:";

/// Builder so tests and the CLI can open stores at arbitrary paths.
pub struct PlayerStoreBuilder {
    path: PathBuf,
    flush_on_write: bool,
}

impl PlayerStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_on_write: true,
        }
    }

    /// Skip the explicit flush after each write and rely on sled's background flushing.
    pub fn without_flush(mut self) -> Self {
        self.flush_on_write = false;
        self
    }

    pub fn open(self) -> Result<PlayerStore, StoreError> {
        PlayerStore::open_with_options(self.path, self.flush_on_write)
    }
}

/// Sled-backed persistence for player records.
pub struct PlayerStore {
    _db: sled::Db,
    players: sled::Tree,
    flush_on_write: bool,
}

impl PlayerStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, flush_on_write: bool) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let players = db.open_tree(TREE_PLAYERS)?;
        debug!("Opened player store at {}", path_ref.display());
        Ok(Self {
            _db: db,
            players,
            flush_on_write,
        })
    }

    fn player_key(username: &str) -> Vec<u8> {
        format!("{}{}", PLAYER_PREFIX, username.to_ascii_lowercase()).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StoreError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn flush(&self) -> Result<(), StoreError> {
        if self.flush_on_write {
            self.players.flush()?;
        }
        Ok(())
    }

    /// Insert or update a player record.
    pub fn put_player(&self, mut player: PlayerRecord) -> Result<(), StoreError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        player.touch();
        let key = Self::player_key(&player.username);
        let bytes = Self::serialize(&player)?;
        self.players.insert(key, bytes)?;
        self.flush()
    }

    /// Fetch a player record by username (case-insensitive).
    pub fn get_player(&self, username: &str) -> Result<PlayerRecord, StoreError> {
        let key = Self::player_key(username);
        let Some(bytes) = self.players.get(&key)? else {
            return Err(StoreError::NotFound(format!("player: {}", username)));
        };
        let record: PlayerRecord = Self::deserialize(bytes)?;
        if record.schema_version != PLAYER_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "player",
                expected: PLAYER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Fetch a player, creating an empty inventory of `capacity` slots on first sight.
    pub fn get_or_create_player(
        &self,
        username: &str,
        capacity: usize,
    ) -> Result<PlayerRecord, StoreError> {
        match self.get_player(username) {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound(_)) => {
                if capacity == 0 || capacity > MAX_CAPACITY {
                    return Err(StoreError::InvalidCapacity(capacity));
                }
                let record = PlayerRecord::new(&username.to_ascii_lowercase(), username, capacity as u8);
                self.put_player(record.clone())?;
                info!("Created player record for {} with {} slots", username, capacity);
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove a player record. Returns whether one existed.
    pub fn delete_player(&self, username: &str) -> Result<bool, StoreError> {
        let existed = self.players.remove(Self::player_key(username))?.is_some();
        self.flush()?;
        Ok(existed)
    }

    /// List all stored usernames, sorted.
    pub fn list_players(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in self.players.scan_prefix(PLAYER_PREFIX.as_bytes()) {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(username) = text.strip_prefix(PLAYER_PREFIX) {
                ids.push(username.to_string());
            }
        }
        Ok(ids)
    }
}
