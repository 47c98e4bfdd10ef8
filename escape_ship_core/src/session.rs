//! One playthrough of the escape.
//!
//! [`GameSession`] owns every service and is the only thing a front-end
//! talks to. It forwards player input to the right component, routes chest
//! rewards and pickups through the ledger, and runs timed continuations on
//! [`tick`](GameSession::tick).

use std::{rc::Rc, time::Duration};

use log::{info, warn};
use rand::rngs::StdRng;

use crate::{
    ItemName, Position, duration_from_secs,
    catalog::{Capability, ItemCatalog},
    chest::{ChestAttempt, ChestLock, ChestTimer},
    config::QuestConfig,
    dashboard::{ClueBook, QuestDashboard},
    deck::DeckPlan,
    dialogue::{
        ConversationFloor, DialogueContext, DialogueEngine, DialogueScript, DialogueStep,
        DialogueStyle, LineSetKind, SpeakerId, TreasureHint,
    },
    door::{Door, DoorId, DoorInteraction, DoorSettings, DoorTimer},
    error::ConfigError,
    ledger::{CollectionLedger, LedgerListener, ReportOutcome},
    presentation::{Cue, Panel, Presenter},
    quest::{QuestController, QuestResult},
    scheduler::{Scheduler, TimerToken},
    spawn::{OccupancyOracle, Placement, PlacementId, SpawnAllocator, SpawnPlan},
};

pub const CAPTAIN: SpeakerId = SpeakerId(0);
pub const PARROT: SpeakerId = SpeakerId(1);

/// Everything the session can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Door(DoorTimer),
    Chest(ChestTimer),
    HideLifeboatNotice,
}

impl From<DoorTimer> for Continuation {
    fn from(timer: DoorTimer) -> Self {
        Continuation::Door(timer)
    }
}

impl From<ChestTimer> for Continuation {
    fn from(timer: ChestTimer) -> Self {
        Continuation::Chest(timer)
    }
}

fn context<'a>(
    ledger: &'a CollectionLedger,
    allocator: &'a SpawnAllocator,
    quest: &'a QuestController,
) -> DialogueContext<'a> {
    DialogueContext {
        ledger,
        plan: allocator.plan(),
        escape_key: &quest.rules().escape_key,
    }
}

pub struct GameSession {
    allocator: SpawnAllocator,
    ledger: CollectionLedger,
    quest: QuestController,
    scheduler: Scheduler<Continuation>,
    door_settings: DoorSettings,
    doors: Vec<Door>,
    chest: ChestLock,
    floor: ConversationFloor,
    captain: DialogueEngine,
    parrot: DialogueEngine,
    treasure_hint: TreasureHint,
    chest_examined: bool,
    clues: ClueBook,
    lifeboat_notice: Option<TimerToken>,
    rng: StdRng,
    oracle: Box<dyn OccupancyOracle>,
    ui: Box<dyn Presenter>,
}

impl GameSession {
    /// Validates `config`, builds every service and spawns the first round
    /// of items.
    pub fn new(
        config: QuestConfig,
        oracle: Box<dyn OccupancyOracle>,
        ui: Box<dyn Presenter>,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = Rc::new(config.catalog()?);
        let rules = config.rules;
        if !catalog.contains(&rules.escape_key) {
            warn!(
                "Escape key '{}' is not in the catalog; the captain will fall back to other keys.",
                rules.escape_key
            );
        }

        let floor = ConversationFloor::new();
        let captain = DialogueEngine::new(
            CAPTAIN,
            "Captain",
            DialogueStyle::Choices,
            config.captain,
            floor.clone(),
        );
        let parrot = DialogueEngine::new(
            PARROT,
            "Parrot",
            DialogueStyle::Simple,
            DialogueScript::new(Vec::new()),
            floor.clone(),
        );

        let mut session = GameSession {
            allocator: SpawnAllocator::new(Rc::clone(&catalog), config.rooms, config.spawn),
            ledger: CollectionLedger::new(catalog),
            chest: ChestLock::new(rules.combination.clone(), rules.reward_item.clone()),
            quest: QuestController::new(rules),
            scheduler: Scheduler::new(),
            door_settings: config.doors,
            doors: Vec::new(),
            floor,
            captain,
            parrot,
            treasure_hint: TreasureHint::new(config.parrot),
            chest_examined: false,
            clues: ClueBook::default(),
            lifeboat_notice: None,
            rng,
            oracle,
            ui,
        };
        session.spawn_items();
        info!("Game initialized. Collect all items to activate the lifeboat!");
        info!("Current objective: {}", session.progress_text());
        Ok(session)
    }

    fn spawn_items(&mut self) {
        let plan = self.allocator.allocate(&mut self.rng, self.oracle.as_ref());
        info!(
            "Spawned {} items, {} keys assigned",
            plan.placements.len(),
            plan.assignment.len()
        );
    }

    pub fn catalog(&self) -> &ItemCatalog {
        self.ledger.catalog()
    }

    pub fn ledger(&self) -> &CollectionLedger {
        &self.ledger
    }

    pub fn quest(&self) -> &QuestController {
        &self.quest
    }

    pub fn plan(&self) -> &SpawnPlan {
        self.allocator.plan()
    }

    pub fn chest(&self) -> &ChestLock {
        &self.chest
    }

    pub fn clues(&self) -> &ClueBook {
        &self.clues
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Registers a listener for ledger events.
    pub fn subscribe(&mut self, listener: LedgerListener) {
        self.ledger.subscribe(listener);
    }

    /// Records one collected item, then checks whether the lifeboat is ready.
    pub fn report(&mut self, item: &str) -> ReportOutcome {
        let outcome = self.ledger.report(item);
        if self.quest.check_lifeboat(&self.ledger, self.ui.as_mut()) {
            if let Some(token) = self.lifeboat_notice.take() {
                self.scheduler.cancel(token);
            }
            let delay = duration_from_secs(self.quest.rules().lifeboat_notice_secs);
            self.lifeboat_notice = Some(
                self.scheduler
                    .schedule_after(delay, Continuation::HideLifeboatNotice),
            );
        }
        outcome
    }

    /// Placement lying on the given deck cell, if any.
    pub fn placement_at(&self, cell: Position) -> Option<&Placement> {
        self.plan()
            .placements
            .iter()
            .find(|placement| Position::from_world(placement.position) == Some(cell))
    }

    /// Removes a placed item from the deck and records it.
    pub fn pick_up(&mut self, id: PlacementId) -> Option<ReportOutcome> {
        let placement = self.allocator.plan_mut().take(id)?;
        self.ui.play_cue(Cue::ItemPickup);
        let outcome = self.report(&placement.item);
        let text = format!(
            "Collected: {} ({}/{})",
            self.catalog().display_name(&placement.item),
            outcome.count,
            self.catalog()
                .get(&placement.item)
                .map(|item| item.required_amount)
                .unwrap_or(0)
        );
        self.ui.show_prompt(&text);
        Some(outcome)
    }

    pub fn progress_text(&self) -> String {
        self.quest.progress_text(&self.ledger)
    }

    pub fn dashboard(&self) -> QuestDashboard {
        QuestDashboard::build(&self.ledger, &self.clues, self.quest.is_lifeboat_activated())
    }

    pub fn active_speaker(&self) -> Option<&DialogueEngine> {
        match self.floor.holder() {
            Some(CAPTAIN) => Some(&self.captain),
            Some(PARROT) => Some(&self.parrot),
            _ => None,
        }
    }

    pub fn is_dialogue_active(&self) -> bool {
        self.floor.is_taken()
    }

    pub fn ask_label(&self) -> String {
        let ctx = context(&self.ledger, &self.allocator, &self.quest);
        self.captain.ask_label(&ctx)
    }

    pub fn talk_to_captain(&mut self) -> DialogueStep {
        let ctx = context(&self.ledger, &self.allocator, &self.quest);
        self.captain.start(&ctx, self.ui.as_mut())
    }

    /// Starts the parrot's chatter, handing out the chest hint when due.
    pub fn talk_to_parrot(&mut self) -> DialogueStep {
        if self.floor.is_taken() {
            info!("Parrot: dialogue already active, cannot start new dialogue");
            return DialogueStep::Ignored;
        }
        let rules = self.quest.rules();
        let (lines, gave_hint) = self.treasure_hint.select(
            self.chest_examined,
            &rules.door_key,
            &rules.combination,
            &self.ledger,
        );
        if gave_hint {
            self.chest.learn_combination();
            self.clues
                .add("The parrot knows the captain's lucky numbers");
        }
        let ctx = context(&self.ledger, &self.allocator, &self.quest);
        self.parrot.start_scripted(lines, &ctx, self.ui.as_mut())
    }

    pub fn advance_dialogue(&mut self) -> DialogueStep {
        let engine = match self.floor.holder() {
            Some(CAPTAIN) => &mut self.captain,
            Some(PARROT) => &mut self.parrot,
            _ => return DialogueStep::Ignored,
        };
        let ctx = context(&self.ledger, &self.allocator, &self.quest);
        engine.advance(&ctx, self.ui.as_mut())
    }

    pub fn ask_about_location(&mut self) -> DialogueStep {
        if self.floor.holder() != Some(CAPTAIN) {
            return DialogueStep::Ignored;
        }
        let ctx = context(&self.ledger, &self.allocator, &self.quest);
        let step = self.captain.ask_about_location(&ctx, self.ui.as_mut());
        if step != DialogueStep::Ignored {
            match self.captain.last_line_set() {
                Some(LineSetKind::KeyReveal) => {
                    if let Some(room) = ctx.escape_key_room() {
                        self.clues.add_key_location(room);
                    }
                }
                Some(LineSetKind::LocationHint) => {
                    self.clues.add_progress_clues(self.ledger.total_collected());
                }
                _ => {}
            }
        }
        step
    }

    pub fn general_talk(&mut self) -> DialogueStep {
        if self.floor.holder() != Some(CAPTAIN) {
            return DialogueStep::Ignored;
        }
        let ctx = context(&self.ledger, &self.allocator, &self.quest);
        self.captain.general_talk(&ctx, self.ui.as_mut())
    }

    pub fn end_dialogue(&mut self) -> DialogueStep {
        let ui = &mut self.ui;
        match self.floor.holder() {
            Some(CAPTAIN) => self.captain.end(ui.as_mut()),
            Some(PARROT) => self.parrot.end(ui.as_mut()),
            _ => DialogueStep::Ignored,
        }
    }

    /// The player took the ship wheel.
    pub fn grab_ship_wheel(&mut self) -> QuestResult {
        if self.floor.is_taken() {
            self.end_dialogue();
        }
        self.quest.become_aggressive(self.ui.as_mut())
    }

    pub fn captain_distance(&mut self, distance: f32) -> QuestResult {
        self.quest.captain_distance(distance, self.ui.as_mut())
    }

    pub fn trigger_caught(&mut self) -> QuestResult {
        self.quest.trigger_caught(self.ui.as_mut())
    }

    pub fn defeat_captain(&mut self) -> QuestResult {
        self.quest.defeat_captain(self.ui.as_mut())
    }

    /// Fires the matchlock gun. Needs the defend capability.
    pub fn fire_gun(&mut self, captain_in_range: bool) -> QuestResult {
        if !self.ledger.has_capability(&Capability::CanDefend) {
            return QuestResult::Failure("You have nothing to shoot with.".to_string());
        }
        if !captain_in_range {
            info!("Shot fired but hit nothing.");
            return QuestResult::Failure("Shot fired but hit nothing.".to_string());
        }
        self.defeat_captain()
    }

    pub fn escape_with_lifeboat(&mut self) -> QuestResult {
        self.quest
            .escape_with_lifeboat(&self.ledger, self.chest.is_solved(), self.ui.as_mut())
    }

    pub fn add_door(
        &mut self,
        label: impl Into<String>,
        required_item: Option<ItemName>,
        cell: Option<Position>,
    ) -> DoorId {
        let id = DoorId(self.doors.len() as u32);
        let mut door = Door::new(id, label, required_item, self.door_settings.clone());
        if let Some(cell) = cell {
            door = door.at(cell);
        }
        self.doors.push(door);
        id
    }

    /// Adds a door for every door cell on the deck. Keyed doors need the
    /// configured door key.
    pub fn add_deck_doors(&mut self, deck: &DeckPlan) -> Vec<DoorId> {
        deck.doors()
            .into_iter()
            .map(|(cell, keyed)| {
                if keyed {
                    let key = self.quest.rules().door_key.clone();
                    self.add_door("the captain's door", Some(key), Some(cell))
                } else {
                    self.add_door("the door", None, Some(cell))
                }
            })
            .collect()
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.iter().find(|door| door.id == id)
    }

    pub fn door_at(&self, cell: Position) -> Option<&Door> {
        self.doors.iter().find(|door| door.cell == Some(cell))
    }

    pub fn door_prompt(&self, id: DoorId) -> Option<String> {
        self.door(id).map(|door| door.prompt(&self.ledger))
    }

    pub fn interact_door(&mut self, id: DoorId) -> Option<DoorInteraction> {
        let door = self.doors.iter_mut().find(|door| door.id == id)?;
        Some(door.interact(&self.ledger, &mut self.scheduler, self.ui.as_mut()))
    }

    /// The player looks at the chest, which opens the lock panel.
    pub fn examine_chest(&mut self) -> bool {
        if !self.chest_examined {
            info!("Player examined the treasure chest");
        }
        self.chest_examined = true;
        self.chest.open_interface(self.ui.as_mut())
    }

    pub fn chest_examined(&self) -> bool {
        self.chest_examined
    }

    pub fn close_chest(&mut self) {
        self.chest.close_interface(self.ui.as_mut());
    }

    /// Tries a code. A correct code hands the reward to the ledger.
    pub fn submit_combination(&mut self, code: &str) -> ChestAttempt {
        let attempt = self
            .chest
            .submit(code, &mut self.scheduler, self.ui.as_mut());
        if attempt == ChestAttempt::Unlocked {
            if let Some(reward) = self.chest.reward_item().map(str::to_string) {
                self.report(&reward);
                let text = format!("You found the {}!", self.catalog().display_name(&reward));
                self.ui.show_prompt(&text);
            }
        }
        attempt
    }

    /// Advances time and runs every continuation that fell due.
    pub fn tick(&mut self, dt: Duration) {
        for continuation in self.scheduler.advance(dt) {
            match continuation {
                Continuation::Door(timer) => {
                    match self.doors.iter_mut().find(|door| door.id == timer.door()) {
                        Some(door) => door.on_timer(timer, &mut self.scheduler, self.ui.as_mut()),
                        None => warn!("Timer for unknown door {:?}", timer.door()),
                    }
                }
                Continuation::Chest(timer) => self.chest.on_timer(timer, self.ui.as_mut()),
                Continuation::HideLifeboatNotice => {
                    self.lifeboat_notice = None;
                    self.ui.set_panel(Panel::LifeboatNotice, false);
                }
            }
        }
    }

    /// Starts over with fresh item placements. The only way out of a won
    /// or lost game.
    pub fn restart_game(&mut self) {
        self.end_dialogue();
        self.chest.close_interface(self.ui.as_mut());
        for door in &mut self.doors {
            door.reset(&mut self.scheduler);
        }
        self.chest.reset(&mut self.scheduler);
        self.scheduler.clear();
        self.lifeboat_notice = None;
        self.ledger.reset();
        self.treasure_hint.reset();
        self.chest_examined = false;
        self.clues.clear();
        self.quest.reset(self.ui.as_mut());
        self.ui.hide_prompt();
        self.spawn_items();
        info!("Game restarted");
    }
}
