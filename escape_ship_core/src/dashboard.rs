use std::fmt;

use log::info;

use crate::ledger::{CollectionLedger, Progress};

pub const QUEST_TITLE: &str = "ESCAPE THE SHIP";

/// Clues the player has picked up, in discovery order, without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClueBook {
    clues: Vec<String>,
}

impl ClueBook {
    /// Returns false if the clue was already known.
    pub fn add(&mut self, clue: impl Into<String>) -> bool {
        let clue = clue.into();
        if self.clues.contains(&clue) {
            return false;
        }
        info!("New clue added: {}", clue);
        self.clues.push(clue);
        true
    }

    /// Records the generic clues tied to how far the player has got.
    pub fn add_progress_clues(&mut self, collected: u32) {
        let clues: &[&str] = match collected {
            0 => &[
                "Captain refuses to give hints",
                "Search areas where a captain spends time",
            ],
            1 => &[
                "Captain suggests checking important captain areas",
                "Look in quarters and command areas",
            ],
            _ => &[
                "Captain hints at deck areas and unexpected places",
                "Some treasures are well hidden",
            ],
        };
        for clue in clues {
            self.add(*clue);
        }
    }

    pub fn add_key_location(&mut self, room: &str) -> bool {
        self.add(format!("Lifeboat key is hidden in {}", room))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.clues.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    pub fn clear(&mut self) {
        self.clues.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProgressLine {
    pub display_name: String,
    pub count: u32,
    pub required: u32,
}

impl ItemProgressLine {
    pub fn is_complete(&self) -> bool {
        self.count >= self.required
    }
}

/// Read-only snapshot of the quest for the dashboard panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestDashboard {
    pub title: &'static str,
    pub total: Progress,
    pub items: Vec<ItemProgressLine>,
    pub objective: Vec<String>,
    pub clues: Vec<String>,
}

impl QuestDashboard {
    pub fn build(ledger: &CollectionLedger, clues: &ClueBook, lifeboat_activated: bool) -> Self {
        let total = ledger.progress();
        let items = ledger
            .catalog()
            .iter()
            .map(|item| ItemProgressLine {
                display_name: item.display_name.clone(),
                count: ledger.count(&item.name),
                required: item.required_amount,
            })
            .collect();
        QuestDashboard {
            title: QUEST_TITLE,
            total,
            items,
            objective: objective(total, lifeboat_activated),
            clues: clues.iter().map(str::to_string).collect(),
        }
    }
}

fn objective(total: Progress, lifeboat_activated: bool) -> Vec<String> {
    if lifeboat_activated {
        vec![
            "Lifeboat is ready!".to_string(),
            "Escape using the lifeboat!".to_string(),
        ]
    } else if total.collected == 0 {
        vec![
            "Explore the ship and find hidden items".to_string(),
            "Talk to the Captain for hints".to_string(),
            "Search all rooms carefully".to_string(),
        ]
    } else if total.collected < total.required {
        vec![
            format!("Find {} more items", total.required - total.collected),
            "Ask the Captain about locations".to_string(),
            "Check areas you haven't explored yet".to_string(),
        ]
    } else {
        vec![
            "All items collected!".to_string(),
            "Ask Captain about lifeboat key location".to_string(),
            "Find the key and escape!".to_string(),
        ]
    }
}

impl fmt::Display for QuestDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        writeln!(f, "ITEM COLLECTION PROGRESS:")?;
        writeln!(f, "Total Items: {}", self.total)?;
        for item in &self.items {
            let status = if item.is_complete() {
                "[COMPLETE]"
            } else {
                "[NEEDED]"
            };
            writeln!(
                f,
                "• {}: {}/{} {}",
                item.display_name, item.count, item.required, status
            )?;
        }
        writeln!(f)?;
        writeln!(f, "CURRENT OBJECTIVE:")?;
        for line in &self.objective {
            writeln!(f, "• {}", line)?;
        }
        writeln!(f)?;
        writeln!(f, "DISCOVERED CLUES:")?;
        if self.clues.is_empty() {
            writeln!(f, "• No clues discovered yet")?;
            write!(f, "• Talk to the Captain to get hints")
        } else {
            for clue in &self.clues {
                writeln!(f, "• {}", clue)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::catalog::{ItemCatalog, ItemCategory, ItemFunction, ItemTypeDefinition};

    fn ledger() -> CollectionLedger {
        let catalog = ItemCatalog::new(vec![
            ItemTypeDefinition::new("RoomKey", 1, ItemCategory::Key, ItemFunction::OpenDoor)
                .with_display_name("Room Key"),
            ItemTypeDefinition::new("GoldCoin", 3, ItemCategory::Treasure, ItemFunction::Currency)
                .with_display_name("Gold Coin"),
        ])
        .unwrap();
        CollectionLedger::new(Rc::new(catalog))
    }

    #[test]
    fn clues_are_deduplicated() {
        let mut clues = ClueBook::default();
        clues.add_progress_clues(0);
        clues.add_progress_clues(0);
        assert_eq!(clues.len(), 2);
        assert!(clues.add_key_location("Hold"));
        assert!(!clues.add_key_location("Hold"));
        assert_eq!(clues.iter().last(), Some("Lifeboat key is hidden in Hold"));
    }

    #[test]
    fn objective_tracks_progress() {
        let mut ledger = ledger();
        let clues = ClueBook::default();
        let board = QuestDashboard::build(&ledger, &clues, false);
        assert_eq!(board.objective[0], "Explore the ship and find hidden items");

        ledger.report("GoldCoin");
        let board = QuestDashboard::build(&ledger, &clues, false);
        assert_eq!(board.objective[0], "Find 3 more items");

        ledger.report("RoomKey");
        ledger.report("GoldCoin");
        ledger.report("GoldCoin");
        let board = QuestDashboard::build(&ledger, &clues, false);
        assert_eq!(board.objective[0], "All items collected!");
        let board = QuestDashboard::build(&ledger, &clues, true);
        assert_eq!(board.objective[1], "Escape using the lifeboat!");
    }

    #[test]
    fn renders_item_lines() {
        let mut ledger = ledger();
        ledger.report("RoomKey");
        let text = QuestDashboard::build(&ledger, &ClueBook::default(), false).to_string();
        assert!(text.starts_with("ESCAPE THE SHIP"));
        assert!(text.contains("Total Items: 1/4"));
        assert!(text.contains("• Room Key: 1/1 [COMPLETE]"));
        assert!(text.contains("• Gold Coin: 0/3 [NEEDED]"));
        assert!(text.contains("No clues discovered yet"));
    }
}
