//! Side-effect collaborators invoked synchronously by the engine.

use super::types::ItemId;

/// Recomputes derived player stats after equipment changes.
pub trait StatsHook {
    fn recalculate(&mut self, player: &str);
}

/// Runs the scripted effect of a usable item. Any consumption of the item is
/// up to the implementation.
pub trait ItemUseHook {
    fn use_item(&mut self, item: ItemId, player: &str);
}

/// Collaborators handed to the engine at construction.
pub struct Hooks {
    pub stats: Box<dyn StatsHook>,
    pub item_use: Box<dyn ItemUseHook>,
}

impl Hooks {
    pub fn new(stats: Box<dyn StatsHook>, item_use: Box<dyn ItemUseHook>) -> Self {
        Self { stats, item_use }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new(Box::new(NoopHooks), Box::new(NoopHooks))
    }
}

/// Hook that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl StatsHook for NoopHooks {
    fn recalculate(&mut self, _player: &str) {}
}

impl ItemUseHook for NoopHooks {
    fn use_item(&mut self, _item: ItemId, _player: &str) {}
}
