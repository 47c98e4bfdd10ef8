use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    ItemName, Position, duration_from_secs,
    ledger::CollectionLedger,
    presentation::{Cue, Presenter},
    scheduler::{Scheduler, TimerToken},
};

/// Handle of a door within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Timed continuations a door schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorTimer {
    /// The current swing has finished.
    Motion(DoorId),
    AutoClose(DoorId),
}

impl DoorTimer {
    pub fn door(&self) -> DoorId {
        match self {
            DoorTimer::Motion(id) | DoorTimer::AutoClose(id) => *id,
        }
    }
}

/// Result of the player trying a door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoorInteraction {
    /// The key was accepted and the door started opening.
    Unlocked,
    Opening,
    Closing,
    Locked { required_item: ItemName },
    /// The door is mid-swing; the input was ignored.
    Busy,
}

/// Timing shared by every door on the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorSettings {
    /// Seconds a full swing takes.
    pub motion_secs: f32,
    pub close_automatically: bool,
    pub auto_close_secs: f32,
}

impl Default for DoorSettings {
    fn default() -> Self {
        DoorSettings {
            motion_secs: 0.5,
            close_automatically: true,
            auto_close_secs: 3.0,
        }
    }
}

impl DoorSettings {
    fn motion(&self) -> Duration {
        duration_from_secs(self.motion_secs)
    }

    fn auto_close(&self) -> Duration {
        duration_from_secs(self.auto_close_secs)
    }
}

#[derive(Debug, Clone)]
pub struct Door {
    pub id: DoorId,
    pub label: String,
    pub cell: Option<Position>,
    required_item: Option<ItemName>,
    locked: bool,
    state: DoorState,
    settings: DoorSettings,
    auto_close: Option<TimerToken>,
}

impl Door {
    /// A closed door, locked when it needs an item.
    pub fn new(id: DoorId, label: impl Into<String>, required_item: Option<ItemName>, settings: DoorSettings) -> Self {
        Door {
            id,
            label: label.into(),
            cell: None,
            locked: required_item.is_some(),
            required_item,
            state: DoorState::Closed,
            settings,
            auto_close: None,
        }
    }

    pub fn at(mut self, cell: Position) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, DoorState::Opening | DoorState::Closing)
    }

    pub fn required_item(&self) -> Option<&str> {
        self.required_item.as_deref()
    }

    /// Prompt for a player standing next to the door.
    pub fn prompt(&self, ledger: &CollectionLedger) -> String {
        let can_pass = !self.locked
            || self
                .required_item
                .as_deref()
                .is_some_and(|item| ledger.has_item(item, 1));
        match (can_pass, self.state) {
            (false, _) => format!(
                "{} is locked - need {}",
                self.label,
                self.required_item
                    .as_deref()
                    .map(|item| ledger.catalog().display_name(item))
                    .unwrap_or("a key")
            ),
            (true, DoorState::Open) => format!("Press [E] to close {}", self.label),
            (true, _) => format!("Press [E] to open {}", self.label),
        }
    }

    /// Player pressed the interact key at this door.
    pub fn interact<T: From<DoorTimer>>(
        &mut self,
        ledger: &CollectionLedger,
        scheduler: &mut Scheduler<T>,
        ui: &mut dyn Presenter,
    ) -> DoorInteraction {
        if self.is_moving() {
            debug!("{} is moving; ignoring input", self.label);
            return DoorInteraction::Busy;
        }
        if self.locked {
            let holds_key = self
                .required_item
                .as_deref()
                .is_some_and(|item| ledger.has_item(item, 1));
            if !holds_key {
                let required_item = self.required_item.clone().unwrap_or_default();
                ui.play_cue(Cue::DoorLocked);
                ui.show_prompt(&format!(
                    "The door is locked. I need to find a {}.",
                    ledger.catalog().display_name(&required_item)
                ));
                return DoorInteraction::Locked { required_item };
            }
            self.locked = false;
            ui.play_cue(Cue::DoorUnlocked);
            info!("{} unlocked", self.label);
            self.open(scheduler, ui);
            return DoorInteraction::Unlocked;
        }
        if self.is_open() {
            self.close(scheduler, ui);
            DoorInteraction::Closing
        } else {
            self.open(scheduler, ui);
            DoorInteraction::Opening
        }
    }

    /// Starts opening. No-op unless closed and unlocked.
    pub fn open<T: From<DoorTimer>>(&mut self, scheduler: &mut Scheduler<T>, ui: &mut dyn Presenter) -> bool {
        if self.state != DoorState::Closed || self.locked {
            return false;
        }
        self.state = DoorState::Opening;
        scheduler.schedule_after(self.settings.motion(), DoorTimer::Motion(self.id).into());
        ui.play_cue(Cue::DoorOpened);
        true
    }

    /// Starts closing. No-op unless fully open.
    pub fn close<T: From<DoorTimer>>(&mut self, scheduler: &mut Scheduler<T>, ui: &mut dyn Presenter) -> bool {
        if self.state != DoorState::Open {
            return false;
        }
        if let Some(token) = self.auto_close.take() {
            scheduler.cancel(token);
        }
        self.state = DoorState::Closing;
        scheduler.schedule_after(self.settings.motion(), DoorTimer::Motion(self.id).into());
        ui.play_cue(Cue::DoorClosed);
        true
    }

    /// Runs a continuation this door scheduled earlier.
    pub fn on_timer<T: From<DoorTimer>>(
        &mut self,
        timer: DoorTimer,
        scheduler: &mut Scheduler<T>,
        ui: &mut dyn Presenter,
    ) {
        match timer {
            DoorTimer::Motion(_) => match self.state {
                DoorState::Opening => {
                    self.state = DoorState::Open;
                    debug!("{} opened", self.label);
                    if self.settings.close_automatically {
                        // Re-opening supersedes any pending auto-close.
                        if let Some(token) = self.auto_close.take() {
                            scheduler.cancel(token);
                        }
                        self.auto_close = Some(scheduler.schedule_after(
                            self.settings.auto_close(),
                            DoorTimer::AutoClose(self.id).into(),
                        ));
                    }
                }
                DoorState::Closing => {
                    self.state = DoorState::Closed;
                    debug!("{} closed", self.label);
                }
                _ => {}
            },
            DoorTimer::AutoClose(_) => {
                self.auto_close = None;
                self.close(scheduler, ui);
            }
        }
    }

    /// Back to the initial closed state, dropping pending timers.
    pub fn reset<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(token) = self.auto_close.take() {
            scheduler.cancel(token);
        }
        self.state = DoorState::Closed;
        self.locked = self.required_item.is_some();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        catalog::{ItemCatalog, ItemCategory, ItemFunction, ItemTypeDefinition},
        presentation::RecordingPresenter,
    };

    fn ledger() -> CollectionLedger {
        let catalog = ItemCatalog::new(vec![
            ItemTypeDefinition::new("RoomKey", 1, ItemCategory::Key, ItemFunction::OpenDoor)
                .with_display_name("Room Key"),
        ])
        .unwrap();
        CollectionLedger::new(Rc::new(catalog))
    }

    fn door() -> Door {
        Door::new(DoorId(0), "cabin door", Some("RoomKey".into()), DoorSettings::default())
    }

    /// Advances time and feeds due timers back to the door.
    fn run(door: &mut Door, scheduler: &mut Scheduler<DoorTimer>, ui: &mut RecordingPresenter, secs: f32) {
        for timer in scheduler.advance(Duration::from_secs_f32(secs)) {
            door.on_timer(timer, scheduler, ui);
        }
    }

    #[test]
    fn locked_until_key_is_held() {
        let mut ledger = ledger();
        let mut scheduler: Scheduler<DoorTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();
        let mut door = door();

        assert_eq!(
            door.interact(&ledger, &mut scheduler, &mut ui),
            DoorInteraction::Locked {
                required_item: "RoomKey".into()
            }
        );
        assert_eq!(door.prompt(&ledger), "cabin door is locked - need Room Key");

        ledger.report("RoomKey");
        assert_eq!(door.interact(&ledger, &mut scheduler, &mut ui), DoorInteraction::Unlocked);
        assert_eq!(door.state(), DoorState::Opening);
        assert_eq!(ui.cue_count(Cue::DoorUnlocked), 1);
    }

    #[test]
    fn input_is_ignored_mid_swing() {
        let ledger = ledger();
        let mut scheduler: Scheduler<DoorTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();
        let mut door = Door::new(DoorId(1), "hatch", None, DoorSettings::default());

        assert_eq!(door.interact(&ledger, &mut scheduler, &mut ui), DoorInteraction::Opening);
        assert_eq!(door.interact(&ledger, &mut scheduler, &mut ui), DoorInteraction::Busy);
        run(&mut door, &mut scheduler, &mut ui, 0.5);
        assert!(door.is_open());
        assert_eq!(door.interact(&ledger, &mut scheduler, &mut ui), DoorInteraction::Closing);
        run(&mut door, &mut scheduler, &mut ui, 0.5);
        assert_eq!(door.state(), DoorState::Closed);
        // Closing by hand dropped the auto-close timer.
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn auto_close_is_single_and_restartable() {
        let ledger = ledger();
        let mut scheduler: Scheduler<DoorTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();
        let mut door = Door::new(DoorId(2), "galley door", None, DoorSettings::default());

        door.interact(&ledger, &mut scheduler, &mut ui);
        run(&mut door, &mut scheduler, &mut ui, 0.5);
        assert_eq!(scheduler.pending(), 1);

        // Two more seconds pass, then the door auto-closes a second later.
        run(&mut door, &mut scheduler, &mut ui, 2.0);
        assert!(door.is_open());
        run(&mut door, &mut scheduler, &mut ui, 1.0);
        assert_eq!(door.state(), DoorState::Closing);
        run(&mut door, &mut scheduler, &mut ui, 0.5);
        assert_eq!(door.state(), DoorState::Closed);

        // Opening again restarts the timer from scratch.
        door.interact(&ledger, &mut scheduler, &mut ui);
        run(&mut door, &mut scheduler, &mut ui, 0.5);
        assert_eq!(scheduler.pending(), 1);
        run(&mut door, &mut scheduler, &mut ui, 2.9);
        assert!(door.is_open());
    }

    #[test]
    fn reset_relocks_and_cancels() {
        let mut ledger = ledger();
        let mut scheduler: Scheduler<DoorTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();
        let mut door = door();
        ledger.report("RoomKey");
        door.interact(&ledger, &mut scheduler, &mut ui);
        run(&mut door, &mut scheduler, &mut ui, 0.5);
        door.reset(&mut scheduler);
        assert!(door.is_locked());
        assert_eq!(door.state(), DoorState::Closed);
        assert_eq!(scheduler.pending(), 0);
    }
}
