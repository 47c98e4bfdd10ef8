use std::time::Duration;

use log::info;

use crate::{
    ItemName,
    presentation::{Cue, Focus, Panel, Presenter},
    scheduler::{Scheduler, TimerToken},
};

const ENTER_COMBINATION: &str = "Enter the combination:";
const WRONG_COMBINATION: &str = "Wrong combination! Try again.";
const NEED_COMBINATION: &str = "I need to find out the combination... Maybe someone knows it?";
const PARROT_NUDGE: &str = "Wrong combination! Maybe I should talk to someone who knows the captain...";
const FEEDBACK_RESET: Duration = Duration::from_secs(2);

/// Timed continuations scheduled by the chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChestTimer {
    ResetFeedback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChestAttempt {
    Unlocked,
    Wrong,
    AlreadyOpen,
}

/// The captain's combination-locked treasure chest.
#[derive(Debug, Clone)]
pub struct ChestLock {
    combination: String,
    reward_item: Option<ItemName>,
    solved: bool,
    combination_known: bool,
    interface_open: bool,
    feedback: String,
    feedback_reset: Option<TimerToken>,
}

impl ChestLock {
    pub fn new(combination: impl Into<String>, reward_item: Option<ItemName>) -> Self {
        ChestLock {
            combination: combination.into(),
            reward_item,
            solved: false,
            combination_known: false,
            interface_open: false,
            feedback: ENTER_COMBINATION.to_string(),
            feedback_reset: None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_interface_open(&self) -> bool {
        self.interface_open
    }

    pub fn combination_known(&self) -> bool {
        self.combination_known
    }

    /// The combination as it would be read out by whoever knows it.
    pub fn combination(&self) -> &str {
        &self.combination
    }

    pub fn digits(&self) -> usize {
        self.combination.chars().count()
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// The item handed over when the chest opens.
    pub fn reward_item(&self) -> Option<&str> {
        self.reward_item.as_deref()
    }

    pub fn learn_combination(&mut self) {
        if !self.combination_known {
            info!("Chest combination learned");
        }
        self.combination_known = true;
    }

    pub fn prompt(&self) -> &'static str {
        if self.solved {
            "Chest is already open"
        } else {
            "Press [E] to open combination lock"
        }
    }

    /// Shows the lock panel. Does nothing once solved.
    pub fn open_interface(&mut self, ui: &mut dyn Presenter) -> bool {
        if self.solved {
            ui.show_prompt("The treasure chest is already open.");
            return false;
        }
        self.interface_open = true;
        self.feedback = if self.combination_known {
            ENTER_COMBINATION
        } else {
            NEED_COMBINATION
        }
        .to_string();
        ui.hide_prompt();
        ui.set_panel(Panel::CombinationLock, true);
        ui.set_panel_text(Panel::CombinationLock, &self.feedback);
        ui.set_focus(Focus::Interface);
        ui.set_clock_paused(true);
        true
    }

    pub fn close_interface(&mut self, ui: &mut dyn Presenter) {
        if !self.interface_open {
            return;
        }
        self.interface_open = false;
        ui.set_panel(Panel::CombinationLock, false);
        ui.set_focus(Focus::Gameplay);
        ui.set_clock_paused(false);
        ui.play_cue(Cue::Click);
    }

    /// Checks an entered code. The reward is not reported here; the caller
    /// routes it through the ledger on [`ChestAttempt::Unlocked`].
    pub fn submit<T: From<ChestTimer>>(
        &mut self,
        code: &str,
        scheduler: &mut Scheduler<T>,
        ui: &mut dyn Presenter,
    ) -> ChestAttempt {
        if self.solved {
            return ChestAttempt::AlreadyOpen;
        }
        info!("Combination entered: {}", code);
        if code == self.combination {
            self.solved = true;
            if let Some(token) = self.feedback_reset.take() {
                scheduler.cancel(token);
            }
            self.close_interface(ui);
            ui.play_cue(Cue::ChestUnlocked);
            info!("Treasure chest unlocked!");
            return ChestAttempt::Unlocked;
        }

        self.feedback = if self.combination_known {
            WRONG_COMBINATION
        } else {
            PARROT_NUDGE
        }
        .to_string();
        ui.set_panel_text(Panel::CombinationLock, &self.feedback);
        ui.play_cue(Cue::WrongCode);
        // A newer wrong guess restarts the feedback timer.
        if let Some(token) = self.feedback_reset.take() {
            scheduler.cancel(token);
        }
        self.feedback_reset = Some(scheduler.schedule_after(FEEDBACK_RESET, ChestTimer::ResetFeedback.into()));
        ChestAttempt::Wrong
    }

    pub fn on_timer(&mut self, timer: ChestTimer, ui: &mut dyn Presenter) {
        match timer {
            ChestTimer::ResetFeedback => {
                self.feedback_reset = None;
                self.feedback = ENTER_COMBINATION.to_string();
                if self.interface_open {
                    ui.set_panel_text(Panel::CombinationLock, &self.feedback);
                }
            }
        }
    }

    /// Relocks the chest and forgets the combination.
    pub fn reset<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(token) = self.feedback_reset.take() {
            scheduler.cancel(token);
        }
        self.solved = false;
        self.combination_known = false;
        self.interface_open = false;
        self.feedback = ENTER_COMBINATION.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingPresenter;

    #[test]
    fn correct_code_solves_once() {
        let mut chest = ChestLock::new("739", Some("MatchlockGun".into()));
        let mut scheduler: Scheduler<ChestTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();

        assert!(chest.open_interface(&mut ui));
        assert_eq!(chest.submit("739", &mut scheduler, &mut ui), ChestAttempt::Unlocked);
        assert!(chest.is_solved());
        assert!(!ui.panel_visible(Panel::CombinationLock));
        assert_eq!(chest.submit("739", &mut scheduler, &mut ui), ChestAttempt::AlreadyOpen);
        assert!(!chest.open_interface(&mut ui));
        assert_eq!(ui.cue_count(Cue::ChestUnlocked), 1);
    }

    #[test]
    fn wrong_code_feedback_depends_on_knowledge() {
        let mut chest = ChestLock::new("739", None);
        let mut scheduler: Scheduler<ChestTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();

        chest.open_interface(&mut ui);
        assert_eq!(chest.feedback(), NEED_COMBINATION);
        assert_eq!(chest.submit("123", &mut scheduler, &mut ui), ChestAttempt::Wrong);
        assert_eq!(chest.feedback(), PARROT_NUDGE);

        chest.learn_combination();
        chest.submit("000", &mut scheduler, &mut ui);
        assert_eq!(chest.feedback(), WRONG_COMBINATION);
        // The second guess superseded the first reset timer.
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn feedback_resets_after_delay() {
        let mut chest = ChestLock::new("739", None);
        let mut scheduler: Scheduler<ChestTimer> = Scheduler::new();
        let mut ui = RecordingPresenter::default();

        chest.open_interface(&mut ui);
        chest.submit("111", &mut scheduler, &mut ui);
        assert!(scheduler.advance(Duration::from_secs(1)).is_empty());
        for timer in scheduler.advance(Duration::from_secs(1)) {
            chest.on_timer(timer, &mut ui);
        }
        assert_eq!(chest.feedback(), ENTER_COMBINATION);
        assert_eq!(ui.last_text(Panel::CombinationLock), Some(ENTER_COMBINATION));
    }
}
