use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    ItemName,
    ledger::CollectionLedger,
    presentation::{Cue, Panel, Presenter},
};

/// Where the escape stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestPhase {
    #[default]
    Exploring,
    /// The captain is chasing the player.
    CaptainAggressive,
    /// The captain is within striking distance.
    CaptainEngaged,
    Won,
    Lost,
}

impl QuestPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuestPhase::Won | QuestPhase::Lost)
    }

    pub fn captain_hostile(&self) -> bool {
        matches!(
            self,
            QuestPhase::CaptainAggressive | QuestPhase::CaptainEngaged
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Escaped,
    CaptainDefeated,
    Caught,
}

/// Result of a quest operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestResult {
    Success,
    Failure(String),
    Won,
    Lost,
}

/// Tunable win/loss rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestRules {
    /// When false only `essential_items` gate the lifeboat.
    pub require_all_items: bool,
    pub essential_items: Vec<ItemName>,
    /// Key whose room the captain reveals at the end.
    pub escape_key: ItemName,
    /// Key that opens the captain's locked door.
    pub door_key: ItemName,
    pub combination: String,
    /// Handed over when the chest opens.
    pub reward_item: Option<ItemName>,
    /// Whether the chest must be open before boarding the lifeboat.
    pub require_chest: bool,
    pub engage_distance: f32,
    pub catch_distance: f32,
    /// Seconds the lifeboat notice stays up.
    pub lifeboat_notice_secs: f32,
}

impl Default for QuestRules {
    fn default() -> Self {
        QuestRules {
            require_all_items: true,
            essential_items: Vec::new(),
            escape_key: "LifeboatKey".to_string(),
            door_key: "RoomKey".to_string(),
            combination: "739".to_string(),
            reward_item: Some("MatchlockGun".to_string()),
            require_chest: true,
            engage_distance: 4.0,
            catch_distance: 1.5,
            lifeboat_notice_secs: 5.0,
        }
    }
}

/// Snapshot of the quest's flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSessionState {
    pub phase: QuestPhase,
    pub captain_aggressive: bool,
    pub lifeboat_activated: bool,
    /// One-way until restart; end-of-game effects only fire while unset.
    pub game_ended: bool,
    pub end_reason: Option<EndReason>,
}

/// Drives the escape from exploring to won or lost.
#[derive(Debug, Clone)]
pub struct QuestController {
    rules: QuestRules,
    state: QuestSessionState,
}

impl QuestController {
    pub fn new(rules: QuestRules) -> Self {
        QuestController {
            rules,
            state: QuestSessionState::default(),
        }
    }

    pub fn rules(&self) -> &QuestRules {
        &self.rules
    }

    pub fn state(&self) -> &QuestSessionState {
        &self.state
    }

    pub fn phase(&self) -> QuestPhase {
        self.state.phase
    }

    pub fn is_lifeboat_activated(&self) -> bool {
        self.state.lifeboat_activated
    }

    /// Someone grabbed the ship wheel.
    pub fn become_aggressive(&mut self, ui: &mut dyn Presenter) -> QuestResult {
        if self.state.phase != QuestPhase::Exploring {
            return QuestResult::Failure("The captain is already after you.".to_string());
        }
        self.state.phase = QuestPhase::CaptainAggressive;
        self.state.captain_aggressive = true;
        ui.play_cue(Cue::CaptainAngry);
        info!("Captain has become aggressive!");
        QuestResult::Success
    }

    /// Feeds the captain's current distance to the player.
    pub fn captain_distance(&mut self, distance: f32, ui: &mut dyn Presenter) -> QuestResult {
        if !self.state.phase.captain_hostile() {
            return QuestResult::Success;
        }
        if distance <= self.rules.catch_distance {
            return self.trigger_caught(ui);
        }
        let phase = if distance <= self.rules.engage_distance {
            QuestPhase::CaptainEngaged
        } else {
            QuestPhase::CaptainAggressive
        };
        if phase != self.state.phase {
            debug!("Captain {:?} at distance {:.1}", phase, distance);
            self.state.phase = phase;
        }
        QuestResult::Success
    }

    pub fn trigger_caught(&mut self, ui: &mut dyn Presenter) -> QuestResult {
        if let Some(result) = self.reject_hostile_end("caught") {
            return result;
        }
        info!("Game Over: Caught by the captain!");
        self.finish(QuestPhase::Lost, EndReason::Caught, ui);
        QuestResult::Lost
    }

    pub fn defeat_captain(&mut self, ui: &mut dyn Presenter) -> QuestResult {
        if let Some(result) = self.reject_hostile_end("defeat") {
            return result;
        }
        ui.play_cue(Cue::CaptainDefeated);
        info!("Captain defeated!");
        self.finish(QuestPhase::Won, EndReason::CaptainDefeated, ui);
        QuestResult::Won
    }

    fn reject_hostile_end(&self, what: &str) -> Option<QuestResult> {
        if self.state.game_ended {
            debug!("Ignoring {} after the game ended", what);
            return Some(QuestResult::Failure("The game has already ended.".to_string()));
        }
        if !self.state.phase.captain_hostile() {
            debug!("Ignoring {} while the captain is calm", what);
            return Some(QuestResult::Failure(
                "The captain is not after you.".to_string(),
            ));
        }
        None
    }

    /// Whether the collected items satisfy the lifeboat's requirements.
    pub fn lifeboat_ready(&self, ledger: &CollectionLedger) -> bool {
        if self.rules.require_all_items || self.rules.essential_items.is_empty() {
            ledger.all_complete()
        } else {
            self.rules
                .essential_items
                .iter()
                .all(|item| ledger.is_complete(item))
        }
    }

    /// Activates the lifeboat the first time the requirements are met.
    /// Returns true on activation.
    pub fn check_lifeboat(&mut self, ledger: &CollectionLedger, ui: &mut dyn Presenter) -> bool {
        if self.state.lifeboat_activated || self.state.game_ended || !self.lifeboat_ready(ledger) {
            return false;
        }
        self.state.lifeboat_activated = true;
        ui.play_cue(Cue::LifeboatActivated);
        ui.set_panel(Panel::LifeboatNotice, true);
        ui.set_panel_text(Panel::LifeboatNotice, "Lifeboat activated! You can now escape!");
        info!("Lifeboat activated! You can now escape!");
        info!("New Objective: Escape using the lifeboat!");
        true
    }

    /// Player tries to board the lifeboat.
    pub fn escape_with_lifeboat(
        &mut self,
        ledger: &CollectionLedger,
        chest_solved: bool,
        ui: &mut dyn Presenter,
    ) -> QuestResult {
        if self.state.game_ended {
            return QuestResult::Failure("The game has already ended.".to_string());
        }
        self.check_lifeboat(ledger, ui);
        if !self.state.lifeboat_activated {
            let message = format!(
                "Lifeboat is not activated yet! Still missing: {}",
                self.missing_for_lifeboat(ledger).join(", ")
            );
            info!("{}", message);
            ui.show_prompt(&message);
            return QuestResult::Failure(message);
        }
        if self.rules.require_chest && !chest_solved {
            let message = "The captain's treasure chest is still locked.".to_string();
            ui.show_prompt(&message);
            return QuestResult::Failure(message);
        }
        info!("Player escaped with the lifeboat!");
        self.finish(QuestPhase::Won, EndReason::Escaped, ui);
        QuestResult::Won
    }

    fn missing_for_lifeboat(&self, ledger: &CollectionLedger) -> Vec<String> {
        if self.rules.require_all_items || self.rules.essential_items.is_empty() {
            return ledger.missing_items();
        }
        self.rules
            .essential_items
            .iter()
            .filter(|item| !ledger.is_complete(item))
            .map(|item| ledger.catalog().display_name(item).to_string())
            .collect()
    }

    /// "Progress: c/t" against whatever gates the lifeboat.
    pub fn progress_text(&self, ledger: &CollectionLedger) -> String {
        if self.rules.require_all_items || self.rules.essential_items.is_empty() {
            format!("Progress: {}", ledger.progress())
        } else {
            let done = self
                .rules
                .essential_items
                .iter()
                .filter(|item| ledger.is_complete(item))
                .count();
            format!("Progress: {}/{}", done, self.rules.essential_items.len())
        }
    }

    fn finish(&mut self, phase: QuestPhase, reason: EndReason, ui: &mut dyn Presenter) {
        if self.state.game_ended {
            return;
        }
        self.state.game_ended = true;
        self.state.phase = phase;
        self.state.end_reason = Some(reason);
        let panel = match phase {
            QuestPhase::Won => Panel::Victory,
            _ => Panel::GameOver,
        };
        ui.set_panel(panel, true);
        ui.set_clock_paused(true);
        info!("{:?} triggered ({:?})", phase, reason);
    }

    /// Back to exploring. Hides end panels and resumes the clock.
    pub fn reset(&mut self, ui: &mut dyn Presenter) {
        self.state = QuestSessionState::default();
        ui.set_panel(Panel::Victory, false);
        ui.set_panel(Panel::GameOver, false);
        ui.set_panel(Panel::LifeboatNotice, false);
        ui.set_clock_paused(false);
    }
}
