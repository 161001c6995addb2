pub mod types;
mod validator;

pub use types::*;
pub use validator::*;

use std::collections::BTreeSet;
use std::path::Path;
use anyhow::{Context, Result};
use log::{info, warn};

use crate::items::CommonItemsData;

/// Set of item class names known to the game
pub struct ItemRegistry {
    /// Known names, sorted
    items: BTreeSet<String>,
    /// Flag indicating if the registry has been loaded
    loaded: bool,
}

impl ItemRegistry {
    /// Create an empty, unloaded registry
    pub fn new() -> Self {
        Self {
            items: BTreeSet::new(),
            loaded: false,
        }
    }

    /// Create a loaded registry from a list of names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        registry.load_from_memory(names);
        registry
    }

    /// Replace the registry contents with `names`
    pub fn load_from_memory<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = names.into_iter()
            .map(|name| {
                let name: String = name.into();
                name.trim().to_string()
            })
            .filter(|name| !name.is_empty())
            .collect();
        self.loaded = true;
        info!("Loaded item registry with {} items", self.items.len());
    }

    /// Load names from a text file, one per line; `#` starts a comment line
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading item registry from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read item registry {}", path.display()))?;

        let names: Vec<&str> = content.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        if names.is_empty() {
            warn!("Item registry {} contains no items", path.display());
        }

        self.load_from_memory(names);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if an item exists
    pub fn item_exists(&self, name: &str) -> bool {
        if !self.loaded {
            warn!("Item registry not loaded");
            return false;
        }
        self.items.contains(name)
    }

    /// Report item names in `data` that the registry doesn't know
    pub fn check_items(&self, data: &CommonItemsData) -> Result<Vec<MissingItemInfo>> {
        validator::check_items(self, data)
    }

    /// Find known names similar to `name`
    pub fn find_similar_items(&self, name: &str) -> Vec<String> {
        validator::find_similar_items(self, name)
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
