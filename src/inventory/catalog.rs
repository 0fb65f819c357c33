//! Item catalog lookup.
//!
//! The engine only ever reads definitions through [`ItemCatalog`], so hosts can
//! back it with whatever content pipeline they already run. [`StaticCatalog`]
//! is the in-memory provider used by the binary and by tests; it can be seeded
//! from a JSON file such as `data/seeds/items.json`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;

use super::errors::CatalogError;
use super::types::{ItemDefinition, ItemId};

/// Read-only item definition source.
pub trait ItemCatalog {
    fn lookup(&self, id: ItemId) -> Option<&ItemDefinition>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: HashMap<ItemId, ItemDefinition>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of definitions, rejecting duplicates and zero stacks.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ItemDefinition>,
    {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Load definitions from a JSON array of item seeds.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let definitions: Vec<ItemDefinition> = serde_json::from_str(&contents)?;
        let catalog = Self::from_definitions(definitions)?;
        debug!(
            "Loaded {} item definitions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        if definition.stackable && definition.max_stack == 0 {
            return Err(CatalogError::ZeroStack(definition.id));
        }
        if self.items.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateId(definition.id));
        }
        self.items.insert(definition.id, definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Definitions ordered by id.
    pub fn definitions(&self) -> Vec<&ItemDefinition> {
        let mut all: Vec<&ItemDefinition> = self.items.values().collect();
        all.sort_by_key(|d| d.id);
        all
    }
}

impl ItemCatalog for StaticCatalog {
    fn lookup(&self, id: ItemId) -> Option<&ItemDefinition> {
        self.items.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::types::EquipSlots;
    use std::io::Write;

    #[test]
    fn rejects_duplicate_ids() {
        let result = StaticCatalog::from_definitions(vec![
            ItemDefinition::new(1, "Apple"),
            ItemDefinition::new(1, "Pear"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(1))));
    }

    #[test]
    fn rejects_stackable_with_zero_limit() {
        let mut bad = ItemDefinition::new(5, "Dust");
        bad.stackable = true;
        bad.max_stack = 0;
        let result = StaticCatalog::from_definitions(vec![bad]);
        assert!(matches!(result, Err(CatalogError::ZeroStack(5))));
    }

    #[test]
    fn loads_seed_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[
                {{"id": 1, "name": "Apple", "stackable": true, "max_stack": 20, "usable": true}},
                {{"id": 2, "name": "Straw Hat", "equip_slots": "HEAD", "affects_stats": true}}
            ]"#
        )
        .expect("write seeds");

        let catalog = StaticCatalog::load_from_json(file.path()).expect("catalog");
        assert_eq!(catalog.len(), 2);

        let apple = catalog.lookup(1).expect("apple");
        assert_eq!(apple.stack_limit(), 20);
        assert!(apple.usable);

        let hat = catalog.lookup(2).expect("hat");
        assert!(!hat.stackable);
        assert_eq!(hat.equip_slots, EquipSlots::HEAD);
        assert!(catalog.lookup(3).is_none());
    }
}
