use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{ItemName, error::ConfigError};

/// Broad grouping of an item, mostly used for sorting and the key heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Key,
    Tool,
    Weapon,
    Treasure,
    Document,
    Consumable,
    QuestItem,
}

/// What an item does once the player holds enough of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemFunction {
    OpenDoor,
    UnlockChest,
    ControlShip,
    DefendSelf,
    GetInfo,
    Escape,
    Heal,
    Currency,
}

/// A gameplay permission granted by holding the required amount of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Opens doors whose target tag matches.
    CanOpen(String),
    CanUnlockChest,
    CanDefend,
    CanEscape,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::CanOpen(tag) => write!(f, "CanOpen_{}", tag),
            Capability::CanUnlockChest => write!(f, "CanUnlockChest"),
            Capability::CanDefend => write!(f, "CanDefend"),
            Capability::CanEscape => write!(f, "CanEscape"),
        }
    }
}

/// Static definition of a collectible item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTypeDefinition {
    /// Internal id, e.g. `RoomKey`.
    pub name: ItemName,
    /// Name shown to the player, e.g. `Room Key`. Defaults to `name`.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_required_amount")]
    pub required_amount: u32,
    pub category: ItemCategory,
    pub function: ItemFunction,
    /// Tag of the object this item acts on (door tag for `OpenDoor`).
    #[serde(default)]
    pub target_tag: String,
    #[serde(default = "default_true")]
    pub is_unique: bool,
    /// Whether the allocator places copies of this item on the deck.
    /// Rewards handed out by puzzles are not spawnable.
    #[serde(default = "default_true")]
    pub spawnable: bool,
}

fn default_required_amount() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl ItemTypeDefinition {
    pub fn new(
        name: impl Into<ItemName>,
        required_amount: u32,
        category: ItemCategory,
        function: ItemFunction,
    ) -> Self {
        let name = name.into();
        ItemTypeDefinition {
            display_name: name.clone(),
            name,
            description: String::new(),
            required_amount,
            category,
            function,
            target_tag: String::new(),
            is_unique: true,
            spawnable: true,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_target_tag(mut self, tag: impl Into<String>) -> Self {
        self.target_tag = tag.into();
        self
    }

    pub fn stackable(mut self) -> Self {
        self.is_unique = false;
        self
    }

    pub fn not_spawnable(mut self) -> Self {
        self.spawnable = false;
        self
    }

    /// Keys are recognised by category or by name.
    pub fn is_key(&self) -> bool {
        self.category == ItemCategory::Key || name_looks_like_key(&self.name)
    }

    /// The capability this item unlocks once `required_amount` copies are held.
    pub fn capability(&self) -> Option<Capability> {
        match self.function {
            ItemFunction::OpenDoor => Some(Capability::CanOpen(self.target_tag.clone())),
            ItemFunction::UnlockChest => Some(Capability::CanUnlockChest),
            ItemFunction::DefendSelf => Some(Capability::CanDefend),
            ItemFunction::Escape => Some(Capability::CanEscape),
            _ => None,
        }
    }
}

fn name_looks_like_key(name: &str) -> bool {
    name.to_lowercase().contains("key")
}

/// The read-only list of item types for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCatalog {
    items: Vec<ItemTypeDefinition>,
}

impl ItemCatalog {
    /// Builds a catalog, rejecting empty catalogs and empty or repeated names.
    pub fn new(mut items: Vec<ItemTypeDefinition>) -> Result<Self, ConfigError> {
        if items.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(ConfigError::EmptyItemName { index });
            }
            if !seen.insert(item.name.as_str()) {
                return Err(ConfigError::DuplicateItem(item.name.clone()));
            }
        }
        for item in items.iter_mut().filter(|item| item.display_name.is_empty()) {
            item.display_name = item.name.clone();
        }
        Ok(ItemCatalog { items })
    }

    pub fn get(&self, name: &str) -> Option<&ItemTypeDefinition> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemTypeDefinition> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `required_amount` over every item type.
    pub fn total_required(&self) -> u32 {
        self.items.iter().map(|item| item.required_amount).sum()
    }

    /// Unknown names fall back to the name heuristic alone.
    pub fn is_key_item(&self, name: &str) -> bool {
        match self.get(name) {
            Some(item) => item.is_key(),
            None => name_looks_like_key(name),
        }
    }

    /// Display name for `name`, or the name itself when unknown.
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name)
            .map(|item| item.display_name.as_str())
            .unwrap_or(name)
    }
}
