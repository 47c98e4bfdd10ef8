//! Progress-driven conversations.
//!
//! A [`DialogueEngine`] walks a speaker through
//! `Idle -> Greeting -> (Choices <-> LineSet) -> Idle`. Which lines are
//! shown depends on how much the player has collected. The captain's
//! location hints never name the room holding the escape key until every
//! required item is in the ledger; the reveal is the only path that does.
//!
//! Only one conversation runs at a time. Engines that share a
//! [`ConversationFloor`] refuse to start while another one holds it.

use std::{cell::Cell, rc::Rc};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    ledger::CollectionLedger,
    presentation::{Focus, Panel, Presenter},
    spawn::SpawnPlan,
};

/// Handle of a character the player can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeakerId(pub u32);

/// Shared token granting one speaker the right to hold a conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationFloor(Rc<Cell<Option<SpeakerId>>>);

impl ConversationFloor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holder(&self) -> Option<SpeakerId> {
        self.0.get()
    }

    pub fn is_taken(&self) -> bool {
        self.holder().is_some()
    }

    fn try_take(&self, speaker: SpeakerId) -> bool {
        match self.0.get() {
            Some(_) => false,
            None => {
                self.0.set(Some(speaker));
                true
            }
        }
    }

    fn release(&self, speaker: SpeakerId) {
        if self.0.get() == Some(speaker) {
            self.0.set(None);
        }
    }
}

/// How a conversation continues after the last line of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueStyle {
    /// Straight back to idle.
    Simple,
    /// Offers the ask-location / general-talk / end choices.
    Choices,
}

/// Which line set is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSetKind {
    Greeting,
    GeneralTalk,
    LocationHint,
    KeyReveal,
    Scripted,
}

/// Authored content for a progress-driven speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueScript {
    /// Greeting sets by tier. Tier `n` is used with `n` items collected;
    /// the last tier covers everything above.
    pub greetings: Vec<Vec<String>>,
    /// Location hints by tier, same indexing as greetings.
    #[serde(default)]
    pub location_hints: Vec<Vec<String>>,
    /// Lines revealing the escape key; `{room}` is replaced by its room.
    #[serde(default)]
    pub reveal_lines: Vec<String>,
    #[serde(default = "default_choices_prompt")]
    pub choices_prompt: String,
    /// Stands in for the escape key's room in any pre-completion line.
    #[serde(default = "default_redaction")]
    pub redaction: String,
    #[serde(default = "default_unknown_location")]
    pub unknown_location: String,
}

fn default_choices_prompt() -> String {
    "What do you want?".to_string()
}

fn default_redaction() -> String {
    "somewhere I won't tell you".to_string()
}

fn default_unknown_location() -> String {
    "Unknown Location".to_string()
}

impl DialogueScript {
    pub fn new(greetings: Vec<Vec<String>>) -> Self {
        DialogueScript {
            greetings,
            location_hints: Vec::new(),
            reveal_lines: Vec::new(),
            choices_prompt: default_choices_prompt(),
            redaction: default_redaction(),
            unknown_location: default_unknown_location(),
        }
    }
}

/// What the engine reads from the rest of the session.
#[derive(Clone, Copy)]
pub struct DialogueContext<'a> {
    pub ledger: &'a CollectionLedger,
    pub plan: &'a SpawnPlan,
    /// Item whose location the captain eventually gives away.
    pub escape_key: &'a str,
}

impl<'a> DialogueContext<'a> {
    /// The escape key's room, or failing that the room of any other key.
    pub fn escape_key_room(&self) -> Option<&'a str> {
        let plan = self.plan;
        plan.key_location(self.escape_key).or_else(|| {
            self.ledger
                .catalog()
                .iter()
                .filter(|item| item.is_key())
                .find_map(|item| plan.key_location(&item.name))
        })
    }

    fn tiered<'s>(&self, sets: &'s [Vec<String>]) -> &'s [String] {
        if sets.is_empty() {
            return &[];
        }
        let tier = (self.ledger.total_collected() as usize).min(sets.len() - 1);
        &sets[tier]
    }
}

/// Outcome of a dialogue input, mirroring what is now on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep {
    Line(String),
    Choices { prompt: String, ask_label: String },
    Ended,
    /// The input made no sense in the current state.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Lines {
        kind: LineSetKind,
        lines: Vec<String>,
        index: usize,
    },
    Choices,
}

/// Conversation state machine for one speaker.
#[derive(Debug, Clone)]
pub struct DialogueEngine {
    speaker: SpeakerId,
    name: String,
    style: DialogueStyle,
    script: DialogueScript,
    floor: ConversationFloor,
    phase: Phase,
    last_kind: Option<LineSetKind>,
}

impl DialogueEngine {
    pub fn new(
        speaker: SpeakerId,
        name: impl Into<String>,
        style: DialogueStyle,
        script: DialogueScript,
        floor: ConversationFloor,
    ) -> Self {
        DialogueEngine {
            speaker,
            name: name.into(),
            style,
            script,
            floor,
            phase: Phase::Idle,
            last_kind: None,
        }
    }

    pub fn speaker(&self) -> SpeakerId {
        self.speaker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_showing_choices(&self) -> bool {
        self.phase == Phase::Choices
    }

    pub fn current_line(&self) -> Option<&str> {
        match &self.phase {
            Phase::Lines { lines, index, .. } => lines.get(*index).map(String::as_str),
            Phase::Choices => Some(&self.script.choices_prompt),
            Phase::Idle => None,
        }
    }

    /// Kind of the most recent line set, kept after the conversation ends.
    pub fn last_line_set(&self) -> Option<LineSetKind> {
        self.last_kind
    }

    /// Label of the ask-location choice.
    pub fn ask_label(&self, ctx: &DialogueContext<'_>) -> String {
        if ctx.ledger.all_complete() {
            "Ask about key location".to_string()
        } else {
            format!(
                "Ask about locations ({}/{})",
                ctx.ledger.total_collected(),
                ctx.ledger.catalog().total_required()
            )
        }
    }

    /// Opens the conversation with the greeting for the current tier.
    pub fn start(&mut self, ctx: &DialogueContext<'_>, ui: &mut dyn Presenter) -> DialogueStep {
        if !self.take_floor() {
            return DialogueStep::Ignored;
        }
        let lines = self.greeting_lines(ctx);
        self.open_panel(ui);
        self.show_lines(LineSetKind::Greeting, lines, ctx, ui)
    }

    /// Opens the conversation with explicit lines.
    pub fn start_scripted(
        &mut self,
        lines: Vec<String>,
        ctx: &DialogueContext<'_>,
        ui: &mut dyn Presenter,
    ) -> DialogueStep {
        if !self.take_floor() {
            return DialogueStep::Ignored;
        }
        self.open_panel(ui);
        self.show_lines(LineSetKind::Scripted, lines, ctx, ui)
    }

    /// Next line, or the follow-up once the set runs out.
    pub fn advance(&mut self, ctx: &DialogueContext<'_>, ui: &mut dyn Presenter) -> DialogueStep {
        let next = match &mut self.phase {
            Phase::Lines { lines, index, .. } => {
                *index += 1;
                lines.get(*index).cloned()
            }
            _ => return DialogueStep::Ignored,
        };
        match next {
            Some(line) => {
                ui.set_panel_text(Panel::Dialogue, &line);
                DialogueStep::Line(line)
            }
            None => self.finish_lines(ctx, ui),
        }
    }

    /// The ask-location choice. Reveals the escape key's room only once
    /// every required item has been collected.
    pub fn ask_about_location(
        &mut self,
        ctx: &DialogueContext<'_>,
        ui: &mut dyn Presenter,
    ) -> DialogueStep {
        if self.phase != Phase::Choices {
            debug!("{}: ask-location outside choices ignored", self.name);
            return DialogueStep::Ignored;
        }
        let (kind, lines) = if ctx.ledger.all_complete() {
            let room = ctx
                .escape_key_room()
                .unwrap_or(self.script.unknown_location.as_str());
            let lines = self
                .script
                .reveal_lines
                .iter()
                .map(|line| line.replace("{room}", room))
                .collect();
            (LineSetKind::KeyReveal, lines)
        } else {
            (
                LineSetKind::LocationHint,
                ctx.tiered(&self.script.location_hints).to_vec(),
            )
        };
        self.show_lines(kind, lines, ctx, ui)
    }

    /// The general-talk choice: the tiered greeting again.
    pub fn general_talk(&mut self, ctx: &DialogueContext<'_>, ui: &mut dyn Presenter) -> DialogueStep {
        if self.phase != Phase::Choices {
            debug!("{}: general talk outside choices ignored", self.name);
            return DialogueStep::Ignored;
        }
        let lines = self.greeting_lines(ctx);
        self.show_lines(LineSetKind::GeneralTalk, lines, ctx, ui)
    }

    /// Ends the conversation from any state and hands input back to gameplay.
    pub fn end(&mut self, ui: &mut dyn Presenter) -> DialogueStep {
        if self.phase == Phase::Idle {
            return DialogueStep::Ignored;
        }
        self.phase = Phase::Idle;
        self.floor.release(self.speaker);
        ui.set_panel(Panel::Choices, false);
        ui.set_panel(Panel::Dialogue, false);
        ui.set_focus(Focus::Gameplay);
        info!("{}: dialogue ended", self.name);
        DialogueStep::Ended
    }

    fn take_floor(&mut self) -> bool {
        if self.is_active() || !self.floor.try_take(self.speaker) {
            info!(
                "{}: dialogue already active, cannot start new dialogue",
                self.name
            );
            return false;
        }
        info!("{}: starting dialogue", self.name);
        true
    }

    fn open_panel(&self, ui: &mut dyn Presenter) {
        ui.hide_prompt();
        ui.set_panel(Panel::Dialogue, true);
        ui.set_focus(Focus::Interface);
    }

    fn greeting_lines(&self, ctx: &DialogueContext<'_>) -> Vec<String> {
        ctx.tiered(&self.script.greetings).to_vec()
    }

    fn show_lines(
        &mut self,
        kind: LineSetKind,
        lines: Vec<String>,
        ctx: &DialogueContext<'_>,
        ui: &mut dyn Presenter,
    ) -> DialogueStep {
        let secret = match kind {
            LineSetKind::KeyReveal => None,
            _ if ctx.ledger.all_complete() => None,
            _ => ctx.escape_key_room(),
        };
        let lines: Vec<String> = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match secret {
                Some(room) => redact(&line, room, &self.script.redaction),
                None => line,
            })
            .collect();

        self.last_kind = Some(kind);
        ui.set_panel(Panel::Choices, false);
        let first = lines.first().cloned();
        self.phase = Phase::Lines {
            kind,
            lines,
            index: 0,
        };
        match first {
            Some(line) => {
                ui.set_panel_text(Panel::Dialogue, &line);
                DialogueStep::Line(line)
            }
            None => {
                debug!("{}: {:?} has nothing to show", self.name, kind);
                self.finish_lines(ctx, ui)
            }
        }
    }

    fn finish_lines(&mut self, ctx: &DialogueContext<'_>, ui: &mut dyn Presenter) -> DialogueStep {
        match self.style {
            DialogueStyle::Simple => self.end(ui),
            DialogueStyle::Choices => {
                self.phase = Phase::Choices;
                let prompt = self.script.choices_prompt.clone();
                ui.set_panel(Panel::Choices, true);
                ui.set_panel_text(Panel::Dialogue, &prompt);
                DialogueStep::Choices {
                    prompt,
                    ask_label: self.ask_label(ctx),
                }
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces every ASCII-case-insensitive, whole-word occurrence of `secret`.
///
/// A match inside a longer word ("A" in "Ahoy") is left alone.
fn redact(line: &str, secret: &str, replacement: &str) -> String {
    if secret.is_empty() {
        return line.to_string();
    }
    // ASCII lowercasing keeps byte offsets, so indices apply to `line` too.
    let haystack = line.to_ascii_lowercase();
    let needle = secret.to_ascii_lowercase();
    let starts_with_word = needle.chars().next().is_some_and(is_word_char);
    let ends_with_word = needle.chars().next_back().is_some_and(is_word_char);

    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(&needle) {
        let start = from + offset;
        let end = start + needle.len();
        let open = !starts_with_word || !haystack[..start].chars().next_back().is_some_and(is_word_char);
        let close = !ends_with_word || !haystack[end..].chars().next().is_some_and(is_word_char);
        if open && close {
            out.push_str(&line[last..start]);
            out.push_str(replacement);
            last = end;
            from = end;
        } else {
            from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    out.push_str(&line[last..]);
    out
}

/// The parrot's authored lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParrotScript {
    pub normal: Vec<String>,
    /// Given once per session; `{code}` becomes the dashed combination.
    pub treasure_hint: Vec<String>,
}

/// Decides when the parrot gives away the chest combination.
#[derive(Debug, Clone)]
pub struct TreasureHint {
    script: ParrotScript,
    given: bool,
}

impl TreasureHint {
    pub fn new(script: ParrotScript) -> Self {
        TreasureHint {
            script,
            given: false,
        }
    }

    pub fn given(&self) -> bool {
        self.given
    }

    /// Lines for the next parrot conversation and whether they carry the hint.
    ///
    /// The hint is offered once the player has examined the chest, holds
    /// the door key, or has everything.
    pub fn select(
        &mut self,
        chest_examined: bool,
        door_key: &str,
        combination: &str,
        ledger: &CollectionLedger,
    ) -> (Vec<String>, bool) {
        let curious = chest_examined || ledger.count(door_key) > 0 || ledger.all_complete();
        if curious && !self.given {
            self.given = true;
            info!("Parrot gives treasure chest hint!");
            let code = combination
                .chars()
                .map(String::from)
                .collect::<Vec<_>>()
                .join("-");
            let lines = self
                .script
                .treasure_hint
                .iter()
                .map(|line| line.replace("{code}", &code))
                .collect();
            (lines, true)
        } else {
            (self.script.normal.clone(), false)
        }
    }

    pub fn reset(&mut self) {
        self.given = false;
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        RoomBounds,
        catalog::{ItemCatalog, ItemCategory, ItemFunction, ItemTypeDefinition},
        presentation::RecordingPresenter,
        spawn::{OpenFloor, RoomArea, SpawnAllocator, SpawnSettings},
    };

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn script() -> DialogueScript {
        DialogueScript {
            greetings: vec![
                lines(&["Get off my ship!", "Now!"]),
                lines(&["One item, eh?"]),
                lines(&["Two items..."]),
            ],
            location_hints: vec![
                lines(&["Try the Cabin or the Hold.", "Or the hold again."]),
                lines(&["Keep looking."]),
            ],
            reveal_lines: lines(&["Fine!", "The lifeboat key is in: {room}"]),
            ..DialogueScript::new(vec![])
        }
    }

    struct Fixture {
        ledger: CollectionLedger,
        allocator: SpawnAllocator,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = Rc::new(
                ItemCatalog::new(vec![
                    ItemTypeDefinition::new("LifeboatKey", 1, ItemCategory::Key, ItemFunction::Escape),
                    ItemTypeDefinition::new("Rope", 2, ItemCategory::Tool, ItemFunction::ControlShip),
                ])
                .unwrap(),
            );
            let rooms = vec![
                RoomArea::new("Hold", RoomBounds::new(0.0, 4.0, 0.0, 4.0)).allow_keys(),
                RoomArea::new("Galley", RoomBounds::new(10.0, 14.0, 0.0, 4.0)),
            ];
            let mut allocator = SpawnAllocator::new(Rc::clone(&catalog), rooms, SpawnSettings::default());
            allocator.allocate(&mut StdRng::seed_from_u64(4), &OpenFloor);
            Fixture {
                ledger: CollectionLedger::new(catalog),
                allocator,
            }
        }

        fn ctx(&self) -> DialogueContext<'_> {
            DialogueContext {
                ledger: &self.ledger,
                plan: self.allocator.plan(),
                escape_key: "LifeboatKey",
            }
        }
    }

    fn captain(floor: &ConversationFloor) -> DialogueEngine {
        DialogueEngine::new(SpeakerId(0), "Captain", DialogueStyle::Choices, script(), floor.clone())
    }

    #[test]
    fn greeting_follows_progress_tier() {
        let mut fx = Fixture::new();
        let mut ui = RecordingPresenter::default();
        let mut engine = captain(&ConversationFloor::new());

        assert_eq!(engine.start(&fx.ctx(), &mut ui), DialogueStep::Line("Get off my ship!".into()));
        engine.end(&mut ui);

        for _ in 0..5 {
            fx.ledger.report("Rope");
        }
        // Past the last tier the final set is reused.
        assert_eq!(engine.start(&fx.ctx(), &mut ui), DialogueStep::Line("Two items...".into()));
    }

    #[test]
    fn lines_lead_to_choices_then_idle() {
        let fx = Fixture::new();
        let mut ui = RecordingPresenter::default();
        let mut engine = captain(&ConversationFloor::new());
        let ctx = fx.ctx();

        engine.start(&ctx, &mut ui);
        assert_eq!(engine.advance(&ctx, &mut ui), DialogueStep::Line("Now!".into()));
        assert_eq!(
            engine.advance(&ctx, &mut ui),
            DialogueStep::Choices {
                prompt: "What do you want?".into(),
                ask_label: "Ask about locations (0/3)".into()
            }
        );
        assert!(engine.is_showing_choices());
        assert_eq!(engine.advance(&ctx, &mut ui), DialogueStep::Ignored);
        assert_eq!(engine.general_talk(&ctx, &mut ui), DialogueStep::Line("Get off my ship!".into()));
        assert_eq!(engine.end(&mut ui), DialogueStep::Ended);
        assert!(!engine.is_active());
        assert_eq!(ui.last_focus(), Some(Focus::Gameplay));
        assert_eq!(engine.end(&mut ui), DialogueStep::Ignored);
    }

    #[test]
    fn hints_never_name_the_key_room_early() {
        let fx = Fixture::new();
        let mut ui = RecordingPresenter::default();
        let mut engine = captain(&ConversationFloor::new());
        let ctx = fx.ctx();
        assert_eq!(ctx.escape_key_room(), Some("Hold"));

        engine.start(&ctx, &mut ui);
        engine.advance(&ctx, &mut ui);
        engine.advance(&ctx, &mut ui);
        let mut shown = vec![];
        let mut step = engine.ask_about_location(&ctx, &mut ui);
        while let DialogueStep::Line(line) = step {
            shown.push(line);
            step = engine.advance(&ctx, &mut ui);
        }
        assert_eq!(shown.len(), 2);
        for line in &shown {
            assert!(!line.to_lowercase().contains("hold"), "leaked: {line}");
        }
        assert!(shown[0].contains("Cabin"));
        assert_eq!(engine.last_line_set(), Some(LineSetKind::LocationHint));
    }

    #[test]
    fn reveal_names_the_room_once_complete() {
        let mut fx = Fixture::new();
        fx.ledger.report("LifeboatKey");
        fx.ledger.report("Rope");
        fx.ledger.report("Rope");
        let mut ui = RecordingPresenter::default();
        let mut engine = captain(&ConversationFloor::new());
        let ctx = fx.ctx();

        engine.start(&ctx, &mut ui);
        engine.advance(&ctx, &mut ui);
        assert!(engine.is_showing_choices());
        assert_eq!(engine.ask_label(&ctx), "Ask about key location");
        engine.ask_about_location(&ctx, &mut ui);
        assert_eq!(
            engine.advance(&ctx, &mut ui),
            DialogueStep::Line("The lifeboat key is in: Hold".into())
        );
        assert_eq!(engine.last_line_set(), Some(LineSetKind::KeyReveal));
    }

    #[test]
    fn only_one_conversation_at_a_time() {
        let fx = Fixture::new();
        let mut ui = RecordingPresenter::default();
        let floor = ConversationFloor::new();
        let mut captain = captain(&floor);
        let mut parrot = DialogueEngine::new(
            SpeakerId(1),
            "Parrot",
            DialogueStyle::Simple,
            DialogueScript::new(vec![]),
            floor.clone(),
        );
        let ctx = fx.ctx();

        captain.start(&ctx, &mut ui);
        assert_eq!(captain.start(&ctx, &mut ui), DialogueStep::Ignored);
        assert_eq!(parrot.start_scripted(lines(&["Squawk!"]), &ctx, &mut ui), DialogueStep::Ignored);
        assert_eq!(floor.holder(), Some(SpeakerId(0)));

        captain.end(&mut ui);
        assert_eq!(
            parrot.start_scripted(lines(&["Squawk!"]), &ctx, &mut ui),
            DialogueStep::Line("Squawk!".into())
        );
        // Simple style goes straight back to idle and frees the floor.
        assert_eq!(parrot.advance(&ctx, &mut ui), DialogueStep::Ended);
        assert!(!floor.is_taken());
    }

    #[test]
    fn empty_sets_never_wedge() {
        let fx = Fixture::new();
        let mut ui = RecordingPresenter::default();
        let floor = ConversationFloor::new();
        let mut engine = DialogueEngine::new(
            SpeakerId(0),
            "Captain",
            DialogueStyle::Choices,
            DialogueScript::new(vec![vec![" ".to_string()]]),
            floor.clone(),
        );
        let ctx = fx.ctx();
        assert!(matches!(engine.start(&ctx, &mut ui), DialogueStep::Choices { .. }));

        let mut simple = DialogueEngine::new(
            SpeakerId(1),
            "Parrot",
            DialogueStyle::Simple,
            DialogueScript::new(vec![]),
            floor.clone(),
        );
        engine.end(&mut ui);
        assert_eq!(simple.start(&ctx, &mut ui), DialogueStep::Ended);
        assert!(!floor.is_taken());
    }

    #[test]
    fn redaction_is_case_insensitive() {
        assert_eq!(redact("Check the HOLD and hold on", "Hold", "???"), "Check the ??? and ??? on");
        assert_eq!(redact("Nothing here", "", "???"), "Nothing here");
    }

    #[test]
    fn redaction_matches_whole_words_only() {
        assert_eq!(redact("Ahoy. Try room A, not a barrel.", "A", "???"), "Ahoy. Try room ???, not ??? barrel.");
        assert_eq!(redact("The Holdings are dry", "Hold", "???"), "The Holdings are dry");
        assert_eq!(redact("Look in CaptainRoom_Center.", "CaptainRoom_Center", "???"), "Look in ???.");
        assert_eq!(redact("Galley_2 or Galley?", "Galley", "???"), "Galley_2 or ????");

        let redacted = redact("Ahoy! Room a is dusty.", "A", "somewhere");
        assert!(redacted.starts_with("Ahoy!"));
        assert!(!redacted.to_ascii_lowercase().contains(" a "));
    }

    #[test]
    fn parrot_hint_is_given_once() {
        let mut fx = Fixture::new();
        let mut hint = TreasureHint::new(ParrotScript {
            normal: lines(&["Squawk!"]),
            treasure_hint: lines(&["She always says {code} brings her luck!"]),
        });

        let (first, gave) = hint.select(false, "RoomKey", "739", &fx.ledger);
        assert!(!gave);
        assert_eq!(first, lines(&["Squawk!"]));

        fx.ledger.report("RoomKey");
        let (second, gave) = hint.select(false, "RoomKey", "739", &fx.ledger);
        assert!(gave);
        assert_eq!(second, lines(&["She always says 7-3-9 brings her luck!"]));

        let (_, gave) = hint.select(true, "RoomKey", "739", &fx.ledger);
        assert!(!gave);
        hint.reset();
        assert!(!hint.given());
    }
}
