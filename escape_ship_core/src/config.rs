use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    MAX_COORDINATE, MAX_DELAY_SECS, RoomBounds,
    catalog::{ItemCatalog, ItemCategory, ItemFunction, ItemTypeDefinition},
    dialogue::{DialogueScript, ParrotScript},
    door::DoorSettings,
    error::ConfigError,
    quest::QuestRules,
    spawn::{RoomArea, SpawnSettings},
};

/// Everything needed to set up a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestConfig {
    pub items: Vec<ItemTypeDefinition>,
    pub rooms: Vec<RoomArea>,
    #[serde(default)]
    pub spawn: SpawnSettings,
    #[serde(default)]
    pub rules: QuestRules,
    #[serde(default)]
    pub doors: DoorSettings,
    pub captain: DialogueScript,
    pub parrot: ParrotScript,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self::pirate_ship()
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|line| line.to_string()).collect()
}

impl QuestConfig {
    /// The built-in ship, matching the bundled deck map.
    pub fn pirate_ship() -> Self {
        let items = vec![
            ItemTypeDefinition::new("RoomKey", 1, ItemCategory::Key, ItemFunction::OpenDoor)
                .with_display_name("Room Key")
                .with_description("Opens the captain's locked quarters.")
                .with_target_tag("CaptainRoom"),
            ItemTypeDefinition::new("LifeboatKey", 1, ItemCategory::Key, ItemFunction::Escape)
                .with_display_name("Lifeboat Key")
                .with_description("Releases the lifeboat at the stern."),
            ItemTypeDefinition::new("GoldCoin", 3, ItemCategory::Treasure, ItemFunction::Currency)
                .with_display_name("Gold Coin")
                .stackable(),
            ItemTypeDefinition::new("Spyglass", 1, ItemCategory::Tool, ItemFunction::GetInfo)
                .with_display_name("Spyglass"),
            ItemTypeDefinition::new("MatchlockGun", 1, ItemCategory::Weapon, ItemFunction::DefendSelf)
                .with_display_name("Matchlock Gun")
                .with_description("The captain's prized gun, kept in her chest.")
                .not_spawnable(),
        ];

        let rooms = vec![
            RoomArea::new("CaptainRoom_Left_Locked", RoomBounds::new(1.0, 7.0, 1.0, 5.0))
                .with_items(0, 1, 0.6),
            RoomArea::new("CaptainRoom_Center", RoomBounds::new(8.0, 16.0, 1.0, 5.0))
                .with_items(1, 2, 0.8)
                .allow_keys(),
            RoomArea::new("Galley", RoomBounds::new(17.0, 25.0, 1.0, 5.0))
                .with_items(0, 2, 0.6)
                .allow_keys(),
            RoomArea::new("MainDeck", RoomBounds::new(1.0, 25.0, 6.0, 10.0)).with_items(0, 2, 0.5),
            RoomArea::new("Hold", RoomBounds::new(1.0, 11.0, 11.0, 13.0))
                .with_items(1, 2, 0.7)
                .allow_keys(),
            RoomArea::new("Quarters", RoomBounds::new(12.0, 19.0, 11.0, 13.0))
                .with_items(0, 1, 0.5)
                .allow_keys(),
            RoomArea::new("Stern", RoomBounds::new(20.0, 25.0, 11.0, 13.0)).with_items(0, 1, 0.3),
        ];

        let captain = DialogueScript {
            greetings: vec![
                lines(&[
                    "Who let you aboard my ship?",
                    "Nobody leaves the Crimson Gull without my say-so.",
                    "Keep your hands off my things!",
                ]),
                lines(&[
                    "I see you've been poking around.",
                    "Put that back where you found it!",
                ]),
                lines(&[
                    "More of my belongings in your pockets, eh?",
                    "You're bolder than you look.",
                ]),
                lines(&[
                    "You've turned my ship upside down!",
                    "What more could you possibly want?",
                ]),
            ],
            location_hints: vec![
                lines(&[
                    "You want location hints? Ha!",
                    "Search these areas: CaptainRoom_Center, Galley,",
                    "CaptainRoom_Left_Locked, Hold, Quarters",
                    "That's all you're getting from me!",
                ]),
                lines(&[
                    "You found one item. Fine.",
                    "Try the other captain room areas if you haven't already.",
                    "And don't forget below deck: the Hold and the Quarters.",
                    "Some areas might be locked though...",
                ]),
                lines(&[
                    "Two items... you're getting close.",
                    "Have you checked ALL the CaptainRoom areas?",
                    "CaptainRoom_Center, CaptainRoom_Left_Locked?",
                    "And the Galley and the Hold too?",
                ]),
                lines(&["Still not enough.", "Some treasures are well hidden."]),
            ],
            reveal_lines: lines(&[
                "Alright, alright! You win!",
                "The lifeboat key is located in: {room}",
                "Now take it and get out of here!",
                "But you'll never escape my ship alive!",
            ]),
            ..DialogueScript::new(Vec::new())
        };

        let parrot = ParrotScript {
            normal: lines(&[
                "Squawk! Hello there, sailor!",
                "The captain loves her treasures very much.",
                "She keeps everything locked up tight!",
                "Squawk!",
            ]),
            treasure_hint: lines(&[
                "Squawk! Looking for something?",
                "The captain's most precious treasure is in that chest!",
                "But it's locked with her favorite numbers...",
                "She always says {code} brings her luck!",
                "Don't tell her I told you! Squawk!",
            ]),
        };

        QuestConfig {
            items,
            rooms,
            spawn: SpawnSettings::default(),
            rules: QuestRules::default(),
            doors: DoorSettings::default(),
            captain,
            parrot,
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: QuestConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the catalog, failing on the first problem found.
    pub fn catalog(&self) -> Result<ItemCatalog, ConfigError> {
        ItemCatalog::new(self.items.clone())
    }

    /// Fails fast on anything that would make the session meaningless.
    ///
    /// A missing escape key is not an error: the captain falls back to
    /// other keys and eventually to "Unknown Location".
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = self.catalog()?;

        let mut names = HashSet::new();
        for room in &self.rooms {
            if !names.insert(room.name.as_str()) {
                return Err(ConfigError::DuplicateRoom(room.name.clone()));
            }
            room.validate()?;
        }

        let rules = &self.rules;
        for item in rules.essential_items.iter().chain(rules.reward_item.iter()) {
            if !catalog.contains(item) {
                return Err(ConfigError::UnknownItem(item.clone()));
            }
        }
        if rules.combination.is_empty() || !rules.combination.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidCombination(rules.combination.clone()));
        }

        let settings = [
            ("rules.lifeboat_notice_secs", rules.lifeboat_notice_secs, 0.0, MAX_DELAY_SECS),
            ("rules.engage_distance", rules.engage_distance, 0.0, MAX_COORDINATE),
            ("rules.catch_distance", rules.catch_distance, 0.0, MAX_COORDINATE),
            ("doors.motion_secs", self.doors.motion_secs, 0.0, MAX_DELAY_SECS),
            ("doors.auto_close_secs", self.doors.auto_close_secs, 0.0, MAX_DELAY_SECS),
            ("spawn.item_spacing", self.spawn.item_spacing, 0.0, MAX_COORDINATE),
            ("spawn.ground_offset", self.spawn.ground_offset, -MAX_COORDINATE, MAX_COORDINATE),
        ];
        for (name, value, min, max) in settings {
            check_setting(name, value, min, max)?;
        }
        Ok(())
    }
}

/// NaN and infinities fall outside every range.
fn check_setting(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting {
            name,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_ship_is_valid() {
        let config = QuestConfig::pirate_ship();
        config.validate().unwrap();
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.total_required(), 7);
        assert!(catalog.is_key_item("RoomKey"));
        assert!(!catalog.get("MatchlockGun").unwrap().spawnable);
        assert!(
            config
                .rooms
                .iter()
                .any(|room| room.name == "CaptainRoom_Left_Locked" && !room.can_have_keys)
        );
    }

    #[test]
    fn json_round_trip_keeps_content() {
        let config = QuestConfig::pirate_ship();
        let json = config.to_json_string().unwrap();
        assert_eq!(QuestConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let json = r#"{
            "items": [
                { "name": "LifeboatKey", "category": "Key", "function": "Escape" }
            ],
            "rooms": [
                { "name": "Hold", "bounds": { "min_x": 0, "max_x": 4, "min_z": 0, "max_z": 4 },
                  "can_have_keys": true }
            ],
            "rules": { "reward_item": null },
            "captain": { "greetings": [["Ahoy."]] },
            "parrot": { "normal": ["Squawk!"], "treasure_hint": [] }
        }"#;
        let config = QuestConfig::from_json_str(json).unwrap();
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.display_name("LifeboatKey"), "LifeboatKey");
        assert_eq!(catalog.total_required(), 1);
        assert_eq!(config.rules.combination, "739");
        assert_eq!(config.captain.choices_prompt, "What do you want?");
        assert_eq!(config.rooms[0].max_items, 2);
    }

    #[test]
    fn rejects_bad_rooms_and_rules() {
        let mut config = QuestConfig::pirate_ship();
        config.rooms.push(config.rooms[0].clone());
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateRoom(_))));

        let mut config = QuestConfig::pirate_ship();
        config.rooms[0].min_items = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidItemRange { min: 5, .. })
        ));

        let mut config = QuestConfig::pirate_ship();
        config.rooms[1].spawn_chance = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSpawnChance { .. })));

        let mut config = QuestConfig::pirate_ship();
        config.rules.essential_items = vec!["Compass".to_string()];
        assert!(matches!(config.validate(), Err(ConfigError::UnknownItem(_))));

        let mut config = QuestConfig::pirate_ship();
        config.rules.combination = "7a9".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCombination(_))));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let cases: [(&str, fn(&mut QuestConfig)); 7] = [
            ("rules.lifeboat_notice_secs", |c| c.rules.lifeboat_notice_secs = f32::INFINITY),
            ("rules.engage_distance", |c| c.rules.engage_distance = f32::NAN),
            ("rules.catch_distance", |c| c.rules.catch_distance = -1.0),
            ("doors.motion_secs", |c| c.doors.motion_secs = 1.0e30),
            ("doors.auto_close_secs", |c| c.doors.auto_close_secs = f32::NAN),
            ("spawn.item_spacing", |c| c.spawn.item_spacing = f32::INFINITY),
            ("spawn.ground_offset", |c| c.spawn.ground_offset = -1.0e9),
        ];
        for (expected, corrupt) in cases {
            let mut config = QuestConfig::pirate_ship();
            corrupt(&mut config);
            match config.validate() {
                Err(ConfigError::InvalidSetting { name, .. }) => assert_eq!(name, expected),
                other => panic!("{} was not rejected: {:?}", expected, other),
            }
        }
    }

    #[test]
    fn overflowing_json_numbers_fail_at_load() {
        let mut value: serde_json::Value =
            serde_json::from_str(&QuestConfig::pirate_ship().to_json_string().unwrap()).unwrap();
        value["rules"]["lifeboat_notice_secs"] = serde_json::json!(1e39);
        assert!(matches!(
            QuestConfig::from_json_str(&value.to_string()),
            Err(ConfigError::InvalidSetting {
                name: "rules.lifeboat_notice_secs",
                ..
            })
        ));

        let mut value: serde_json::Value =
            serde_json::from_str(&QuestConfig::pirate_ship().to_json_string().unwrap()).unwrap();
        value["rooms"][0]["bounds"]["min_x"] = serde_json::json!(-3.0e38);
        value["rooms"][0]["bounds"]["max_x"] = serde_json::json!(3.0e38);
        assert!(matches!(
            QuestConfig::from_json_str(&value.to_string()),
            Err(ConfigError::InvalidBounds(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            QuestConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
