use log::debug;

/// UI panels the core can show or hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Dialogue,
    Choices,
    CombinationLock,
    LifeboatNotice,
    Victory,
    GameOver,
}

/// Fire-and-forget sound/animation cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    CaptainAngry,
    CaptainDefeated,
    ItemPickup,
    DoorUnlocked,
    DoorOpened,
    DoorClosed,
    DoorLocked,
    ChestUnlocked,
    WrongCode,
    Click,
    LifeboatActivated,
}

/// Who receives keyboard and pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Gameplay,
    Interface,
}

/// The presentation layer as seen from the core.
///
/// Every call is fire-and-forget; the core never reads anything back.
pub trait Presenter {
    fn show_prompt(&mut self, text: &str);
    fn hide_prompt(&mut self);
    fn set_panel(&mut self, panel: Panel, visible: bool);
    /// Replaces the text of a panel (dialogue line, lock feedback, ...).
    fn set_panel_text(&mut self, panel: Panel, text: &str);
    fn play_cue(&mut self, cue: Cue);
    fn set_focus(&mut self, focus: Focus);
    fn set_clock_paused(&mut self, paused: bool);
}

/// Presenter for running without any UI. Calls are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Presenter for Headless {
    fn show_prompt(&mut self, text: &str) {
        debug!("prompt: {}", text);
    }

    fn hide_prompt(&mut self) {}

    fn set_panel(&mut self, panel: Panel, visible: bool) {
        debug!("panel {:?} visible={}", panel, visible);
    }

    fn set_panel_text(&mut self, panel: Panel, text: &str) {
        debug!("panel {:?}: {}", panel, text);
    }

    fn play_cue(&mut self, cue: Cue) {
        debug!("cue {:?}", cue);
    }

    fn set_focus(&mut self, focus: Focus) {
        debug!("focus {:?}", focus);
    }

    fn set_clock_paused(&mut self, paused: bool) {
        debug!("clock paused={}", paused);
    }
}

/// One call received by a [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    ShowPrompt(String),
    HidePrompt,
    SetPanel(Panel, bool),
    SetPanelText(Panel, String),
    PlayCue(Cue),
    SetFocus(Focus),
    SetClockPaused(bool),
}

/// Presenter that keeps every call, for tests and replay logs.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
}

impl RecordingPresenter {
    pub fn count(&self, call: &PresenterCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn cue_count(&self, cue: Cue) -> usize {
        self.count(&PresenterCall::PlayCue(cue))
    }

    /// Last visibility set for `panel`, false if never touched.
    pub fn panel_visible(&self, panel: Panel) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|call| match call {
                PresenterCall::SetPanel(p, visible) if *p == panel => Some(*visible),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn last_prompt(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            PresenterCall::ShowPrompt(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn last_text(&self, panel: Panel) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            PresenterCall::SetPanelText(p, text) if *p == panel => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn last_focus(&self) -> Option<Focus> {
        self.calls.iter().rev().find_map(|call| match call {
            PresenterCall::SetFocus(focus) => Some(*focus),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn show_prompt(&mut self, text: &str) {
        self.calls.push(PresenterCall::ShowPrompt(text.to_string()));
    }

    fn hide_prompt(&mut self) {
        self.calls.push(PresenterCall::HidePrompt);
    }

    fn set_panel(&mut self, panel: Panel, visible: bool) {
        self.calls.push(PresenterCall::SetPanel(panel, visible));
    }

    fn set_panel_text(&mut self, panel: Panel, text: &str) {
        self.calls
            .push(PresenterCall::SetPanelText(panel, text.to_string()));
    }

    fn play_cue(&mut self, cue: Cue) {
        self.calls.push(PresenterCall::PlayCue(cue));
    }

    fn set_focus(&mut self, focus: Focus) {
        self.calls.push(PresenterCall::SetFocus(focus));
    }

    fn set_clock_paused(&mut self, paused: bool) {
        self.calls.push(PresenterCall::SetClockPaused(paused));
    }
}

/// Lets a shared handle stand in for the presenter it wraps, so a caller
/// can keep reading what the core presented.
impl<P: Presenter> Presenter for std::rc::Rc<std::cell::RefCell<P>> {
    fn show_prompt(&mut self, text: &str) {
        self.borrow_mut().show_prompt(text);
    }

    fn hide_prompt(&mut self) {
        self.borrow_mut().hide_prompt();
    }

    fn set_panel(&mut self, panel: Panel, visible: bool) {
        self.borrow_mut().set_panel(panel, visible);
    }

    fn set_panel_text(&mut self, panel: Panel, text: &str) {
        self.borrow_mut().set_panel_text(panel, text);
    }

    fn play_cue(&mut self, cue: Cue) {
        self.borrow_mut().play_cue(cue);
    }

    fn set_focus(&mut self, focus: Focus) {
        self.borrow_mut().set_focus(focus);
    }

    fn set_clock_paused(&mut self, paused: bool) {
        self.borrow_mut().set_clock_paused(paused);
    }
}
