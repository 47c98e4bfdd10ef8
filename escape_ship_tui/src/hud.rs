use std::collections::{HashMap, HashSet, VecDeque};

use escape_ship_core::presentation::{Cue, Focus, Panel, Presenter};

const MAX_MESSAGES: usize = 6;

/// Everything the core asked the screen to show.
#[derive(Debug)]
pub struct Hud {
    pub prompt: Option<String>,
    visible: HashSet<Panel>,
    texts: HashMap<Panel, String>,
    pub focus: Focus,
    pub clock_paused: bool,
    /// Recent pickups, cues and notices, newest last.
    pub messages: VecDeque<String>,
}

impl Default for Hud {
    fn default() -> Self {
        Hud {
            prompt: None,
            visible: HashSet::new(),
            texts: HashMap::new(),
            focus: Focus::Gameplay,
            clock_paused: false,
            messages: VecDeque::new(),
        }
    }
}

impl Hud {
    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible.contains(&panel)
    }

    pub fn text(&self, panel: Panel) -> &str {
        self.texts.get(&panel).map(String::as_str).unwrap_or("")
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push_back(message.into());
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }
}

fn cue_text(cue: Cue) -> Option<&'static str> {
    match cue {
        Cue::CaptainAngry => Some("The captain roars and gives chase!"),
        Cue::CaptainDefeated => Some("BANG! The captain goes down."),
        Cue::DoorUnlocked => Some("*clunk* The lock gives way."),
        Cue::DoorLocked => Some("*rattle*"),
        Cue::ChestUnlocked => Some("*click* The chest springs open!"),
        Cue::WrongCode => Some("*bzzt*"),
        Cue::LifeboatActivated => Some("The lifeboat winch creaks free."),
        Cue::ItemPickup | Cue::DoorOpened | Cue::DoorClosed | Cue::Click => None,
    }
}

impl Presenter for Hud {
    fn show_prompt(&mut self, text: &str) {
        self.prompt = Some(text.to_string());
    }

    fn hide_prompt(&mut self) {
        self.prompt = None;
    }

    fn set_panel(&mut self, panel: Panel, visible: bool) {
        if visible {
            self.visible.insert(panel);
        } else {
            self.visible.remove(&panel);
        }
    }

    fn set_panel_text(&mut self, panel: Panel, text: &str) {
        self.texts.insert(panel, text.to_string());
    }

    fn play_cue(&mut self, cue: Cue) {
        if let Some(text) = cue_text(cue) {
            self.push_message(text);
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    fn set_clock_paused(&mut self, paused: bool) {
        self.clock_paused = paused;
    }
}
