//! Item kit configuration data
//!
//! [`CommonItemsData`] is the record a mod's configuration hands to the game:
//! a fixed list of item kits, plus groups of kit lists of which the game picks
//! one at random. Picking the group is the game's business, not ours.

use serde::{Deserialize, Serialize};

/// An ordered list of item class names, e.g. `["Apple", "Knife"]`
pub type ItemKit = Vec<String>;

/// A fixed set of kits
pub type ItemKitSet = Vec<ItemKit>;

/// Item kits shared by a mod configuration
///
/// Both fields always exist: construction and deserialization leave them
/// empty rather than unset. Populate the value fully before sharing it across
/// threads, then treat it as read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonItemsData {
    /// Kits that are always used as-is
    #[serde(default)]
    pub item_kits: ItemKitSet,
    /// Kit sets, one of which is chosen at random by the game
    #[serde(default, alias = "obfs_random_item_kits")]
    pub random_item_kit_groups: Vec<ItemKitSet>,
}

impl CommonItemsData {
    /// Creates an instance with no kits and no groups
    pub fn new() -> Self {
        Self {
            item_kits: Vec::new(),
            random_item_kit_groups: Vec::new(),
        }
    }

    /// True when neither field holds anything
    pub fn is_empty(&self) -> bool {
        self.item_kits.is_empty() && self.random_item_kit_groups.is_empty()
    }

    /// Every item name with the location it was found at, in field order
    pub fn item_references(&self) -> Vec<(String, &str)> {
        let mut refs = Vec::new();

        for (kit_idx, kit) in self.item_kits.iter().enumerate() {
            for (item_idx, item) in kit.iter().enumerate() {
                refs.push((format!("item_kits[{}][{}]", kit_idx, item_idx), item.as_str()));
            }
        }

        for (group_idx, group) in self.random_item_kit_groups.iter().enumerate() {
            for (kit_idx, kit) in group.iter().enumerate() {
                for (item_idx, item) in kit.iter().enumerate() {
                    refs.push((
                        format!("random_item_kit_groups[{}][{}][{}]", group_idx, kit_idx, item_idx),
                        item.as_str(),
                    ));
                }
            }
        }

        refs
    }

    /// Total number of item names across both fields
    pub fn item_count(&self) -> usize {
        let fixed: usize = self.item_kits.iter().map(Vec::len).sum();
        let grouped: usize = self.random_item_kit_groups
            .iter()
            .flat_map(|group| group.iter())
            .map(Vec::len)
            .sum();
        fixed + grouped
    }
}
