use crate::ItemName;

/// Configuration problems detected while building a session.
///
/// These are the only hard failures in the core. Everything that can go
/// wrong once a session is running degrades gracefully instead.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Item catalog is empty.")]
    EmptyCatalog,
    #[error("Item at index {index} has an empty name.")]
    EmptyItemName { index: usize },
    #[error("Item '{0}' is defined more than once.")]
    DuplicateItem(ItemName),
    #[error("Room '{0}' is defined more than once.")]
    DuplicateRoom(String),
    #[error("Room '{room}' has min_items {min} greater than max_items {max}.")]
    InvalidItemRange { room: String, min: u32, max: u32 },
    #[error("Room '{room}' has spawn chance {chance} outside [0, 1].")]
    InvalidSpawnChance { room: String, chance: f32 },
    #[error("Room '{0}' has inverted, non-finite or out-of-range bounds.")]
    InvalidBounds(String),
    #[error("Rule references item '{0}', which is not in the catalog.")]
    UnknownItem(ItemName),
    #[error("Setting '{name}' has value {value}, outside {min} to {max}.")]
    InvalidSetting {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("Combination '{0}' must be a non-empty string of digits.")]
    InvalidCombination(String),
    #[error("Failed to parse quest config: {0}")]
    Parse(#[from] serde_json::Error),
}
