//! # Configuration Management Module
//!
//! Centralized configuration for the satchel inventory server: type-safe
//! sections with serde serialization, defaults, and validation on load.
//!
//! ## Configuration Structure
//!
//! - [`InventoryConfig`] - Slot capacity for new players and request gating
//! - [`StorageConfig`] - Where player records are persisted
//! - [`CatalogConfig`] - Item definition seed file
//! - [`LoggingConfig`] - Logging and security log settings
//!
//! ## Usage
//!
//! ```rust,no_run
//! use satchel::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Default capacity: {}", config.inventory.default_capacity);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [inventory]
//! default_capacity = 32
//! add_item_level = 5
//!
//! [storage]
//! data_dir = "./data"
//!
//! [catalog]
//! path = "data/seeds/items.json"
//!
//! [logging]
//! level = "info"
//! file = "satchel.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::inventory::MAX_CAPACITY;
use crate::roles::LEVEL_TEAM_MEMBER;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inventory: InventoryConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryConfig {
    /// Slots given to players created without an explicit capacity.
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,
    /// Minimum access level for the add-item request.
    #[serde(default = "default_add_item_level")]
    pub add_item_level: u8,
}

fn default_capacity() -> usize {
    32
}

fn default_add_item_level() -> u8 {
    LEVEL_TEAM_MEMBER
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
            add_item_level: default_add_item_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the player database path; defaults to `<data_dir>/players`.
    #[serde(default)]
    pub players_db_path: Option<String>,
}

impl StorageConfig {
    pub fn players_path(&self) -> String {
        self.players_db_path
            .clone()
            .unwrap_or_else(|| format!("{}/players", self.data_dir.trim_end_matches('/')))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "data/seeds/items.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default)]
    pub security_file: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let capacity = self.inventory.default_capacity;
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(anyhow!(
                "inventory.default_capacity must be between 1 and {}, got {}",
                MAX_CAPACITY,
                capacity
            ));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            inventory: InventoryConfig::default(),
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                players_db_path: None,
            },
            catalog: CatalogConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("satchel.log".to_string()),
                security_file: Some("satchel-security.log".to_string()),
            },
        }
    }
}
