mod hud;
mod render;

use std::{
    cell::RefCell,
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use escape_ship_core::{
    Position,
    chest::ChestAttempt,
    config::QuestConfig,
    deck::{DeckCell, DeckPlan, load_deck_from_string},
    ledger::LedgerEvent,
    presentation::Focus,
    quest::QuestResult,
    session::GameSession,
};
use log::info;
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};

use crate::hud::Hud;

const DEFAULT_DECK: &str = include_str!("../maps/deck01.txt");
const TICK_RATE: Duration = Duration::from_millis(250);
/// The captain moves one cell every this many ticks while chasing.
const CAPTAIN_STRIDE: u32 = 2;
/// Cells the matchlock gun can reach.
const GUN_RANGE: usize = 5;

#[derive(Parser, Debug)]
#[command(version, about = "Escape the captain's ship", long_about = None)]
struct Args {
    /// Quest config (JSON). Defaults to the built-in ship.
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Deck map to load. Defaults to the bundled deck.
    #[arg(short, long, value_name = "DECK_FILE")]
    deck: Option<PathBuf>,

    /// Seed for item placement, for reproducible runs.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where log output goes; the terminal is taken by the game.
    #[arg(long, value_name = "LOG_FILE", default_value = "escape_ship.log")]
    log_file: PathBuf,

    /// Print the built-in quest config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

pub struct App {
    session: GameSession,
    deck: DeckPlan,
    hud: Rc<RefCell<Hud>>,
    player: Position,
    captain: Position,
    code_entry: String,
    show_dashboard: bool,
    ticks: u32,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(config: QuestConfig, deck: DeckPlan, rng: StdRng) -> Result<Self> {
        let hud = Rc::new(RefCell::new(Hud::default()));
        let mut session = GameSession::new(
            config,
            Box::new(deck.clone()),
            Box::new(Rc::clone(&hud)),
            rng,
        )?;
        session.add_deck_doors(&deck);

        let messages = Rc::clone(&hud);
        session.subscribe(Box::new(move |event| {
            let text = match event {
                LedgerEvent::Collected { item, count } => format!("Picked up {} (x{})", item, count),
                LedgerEvent::CapabilityUnlocked(capability) => format!("Unlocked: {}", capability),
            };
            messages.borrow_mut().push_message(text);
        }));

        Ok(App {
            session,
            player: deck.player_start,
            captain: deck.captain_start,
            deck,
            hud,
            code_entry: String::new(),
            show_dashboard: true,
            ticks: 0,
            should_quit: false,
        })
    }

    /// Handles one step of the simulation.
    ///
    /// Timers run on wall-clock time, so lock feedback still resets while
    /// the panel pauses play. Only the chase stops.
    fn tick(&mut self) {
        self.session.tick(TICK_RATE);
        if self.hud.borrow().clock_paused {
            return;
        }
        self.ticks += 1;

        if !self.session.quest().phase().captain_hostile() {
            return;
        }
        if self.ticks % CAPTAIN_STRIDE == 0 {
            self.step_captain();
        }
        let distance = self
            .captain
            .to_world(0.0)
            .planar_distance(&self.player.to_world(0.0));
        self.session.captain_distance(distance);
    }

    /// Greedy chase: the neighbouring cell that gets closest to the player.
    fn step_captain(&mut self) {
        let here = self.captain;
        let best = self
            .deck
            .cells
            .neighbours(here)
            .filter(|cell| *cell != self.player && self.is_passable(*cell))
            .min_by_key(|cell| {
                let dx = cell.x.abs_diff(self.player.x);
                let dy = cell.y.abs_diff(self.player.y);
                (dx.max(dy), dx + dy)
            });
        if let Some(cell) = best {
            if cell.steps_to(self.player) < here.steps_to(self.player) {
                self.captain = cell;
            }
        }
    }

    fn is_passable(&self, cell: Position) -> bool {
        match self.deck.cell(cell) {
            Some(DeckCell::Floor) => true,
            Some(DeckCell::Door { .. }) => self.session.door_at(cell).is_some_and(|door| door.is_open()),
            _ => false,
        }
    }

    fn move_player(&mut self, dx: isize, dy: isize) {
        let (Some(x), Some(y)) = (
            self.player.x.checked_add_signed(dx),
            self.player.y.checked_add_signed(dy),
        ) else {
            return;
        };
        let target = Position { x, y };
        if target != self.captain && self.is_passable(target) {
            self.player = target;
            self.hud.borrow_mut().prompt = self.nearby_prompt();
        }
    }

    /// Prompt for whatever the player is standing next to.
    fn nearby_prompt(&self) -> Option<String> {
        if self.session.placement_at(self.player).is_some() {
            return Some("Press [E] to pick up".to_string());
        }
        for cell in self.deck.cells.neighbours(self.player) {
            match self.deck.cell(cell) {
                Some(DeckCell::Door { .. }) => {
                    let door = self.session.door_at(cell)?;
                    return self.session.door_prompt(door.id);
                }
                Some(DeckCell::Chest) => return Some(self.session.chest().prompt().to_string()),
                Some(DeckCell::Parrot) => return Some("Press [T] to talk to parrot".to_string()),
                Some(DeckCell::ShipWheel) if !self.session.quest().phase().captain_hostile() => {
                    return Some("Press [T] to take control of the ship".to_string());
                }
                Some(DeckCell::Lifeboat) => return Some("Press [L] to board the lifeboat".to_string()),
                _ => {}
            }
        }
        if self.captain.steps_to(self.player) <= 1 {
            return Some("Press [T] to talk to the captain".to_string());
        }
        None
    }

    fn adjacent(&self, prop: DeckCell) -> Option<Position> {
        self.deck
            .cells
            .neighbours(self.player)
            .find(|cell| self.deck.cell(*cell) == Some(prop))
    }

    fn interact(&mut self) {
        let placement = std::iter::once(self.player)
            .chain(self.deck.cells.neighbours(self.player))
            .find_map(|cell| self.session.placement_at(cell).map(|p| p.id));
        if let Some(id) = placement {
            self.session.pick_up(id);
            return;
        }
        let door = self
            .deck
            .cells
            .neighbours(self.player)
            .find_map(|cell| self.session.door_at(cell).map(|door| door.id));
        if let Some(id) = door {
            self.session.interact_door(id);
            return;
        }
        if self.adjacent(DeckCell::Chest).is_some() {
            self.code_entry.clear();
            self.session.examine_chest();
        }
    }

    fn talk(&mut self) {
        if self.adjacent(DeckCell::Parrot).is_some() {
            self.session.talk_to_parrot();
        } else if self.adjacent(DeckCell::ShipWheel).is_some() {
            info!("Player tried to take control of the ship!");
            self.session.grab_ship_wheel();
        } else if self.captain.steps_to(self.player) <= 1 {
            self.session.talk_to_captain();
        }
    }

    fn fire(&mut self) {
        let in_range = self.captain.steps_to(self.player) <= GUN_RANGE;
        if let QuestResult::Failure(reason) = self.session.fire_gun(in_range) {
            self.hud.borrow_mut().push_message(reason);
        }
    }

    fn board_lifeboat(&mut self) {
        if self.adjacent(DeckCell::Lifeboat).is_none() {
            self.hud
                .borrow_mut()
                .push_message("The lifeboat hangs at the stern.");
            return;
        }
        self.session.escape_with_lifeboat();
    }

    fn enter_digit(&mut self, digit: char) {
        self.code_entry.push(digit);
        if self.code_entry.chars().count() < self.session.chest().digits() {
            return;
        }
        let code = std::mem::take(&mut self.code_entry);
        if self.session.submit_combination(&code) == ChestAttempt::Unlocked {
            info!("Chest opened from the deck");
        }
    }

    fn restart(&mut self) {
        self.session.restart_game();
        self.player = self.deck.player_start;
        self.captain = self.deck.captain_start;
        self.code_entry.clear();
        self.ticks = 0;
        self.hud.borrow_mut().messages.clear();
    }

    fn handle_key(&mut self, code: KeyCode) {
        if code == KeyCode::Char('q') {
            self.quit();
            return;
        }
        if self.session.quest().state().game_ended {
            if code == KeyCode::Char('r') {
                self.restart();
            } else if code == KeyCode::Esc {
                self.quit();
            }
            return;
        }

        let focus = self.hud.borrow().focus;
        if focus == Focus::Interface {
            if self.session.chest().is_interface_open() {
                match code {
                    KeyCode::Char(c) if c.is_ascii_digit() => self.enter_digit(c),
                    KeyCode::Backspace => {
                        self.code_entry.pop();
                    }
                    KeyCode::Esc => self.session.close_chest(),
                    _ => {}
                }
                return;
            }
            if self.session.is_dialogue_active() {
                match code {
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        self.session.advance_dialogue();
                    }
                    KeyCode::Char('1') => {
                        self.session.ask_about_location();
                    }
                    KeyCode::Char('2') => {
                        self.session.general_talk();
                    }
                    KeyCode::Char('3') | KeyCode::Esc => {
                        self.session.end_dialogue();
                    }
                    _ => {}
                }
                return;
            }
        }

        match code {
            KeyCode::Esc => self.quit(),
            KeyCode::Up => self.move_player(0, -1),
            KeyCode::Down => self.move_player(0, 1),
            KeyCode::Left => self.move_player(-1, 0),
            KeyCode::Right => self.move_player(1, 0),
            KeyCode::Char('e') => self.interact(),
            KeyCode::Char('t') => self.talk(),
            KeyCode::Char('f') => self.fire(),
            KeyCode::Char('l') => self.board_lifeboat(),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Tab => self.show_dashboard = !self.show_dashboard,
            _ => {}
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<QuestConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Ok(QuestConfig::from_json_str(&json)?)
        }
        None => Ok(QuestConfig::pirate_ship()),
    }
}

fn load_deck(path: Option<&Path>) -> Result<DeckPlan> {
    let text = match path {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "Deck file does not exist: {}",
                    path.display()
                ));
            }
            std::fs::read_to_string(path)?
        }
        None => DEFAULT_DECK.to_string(),
    };
    Ok(load_deck_from_string(&text)?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.print_config {
        println!("{}", QuestConfig::pirate_ship().to_json_string()?);
        return Ok(());
    }

    init_logging(&args.log_file)?;
    let config = load_config(args.config.as_deref())?;
    let deck = load_deck(args.deck.as_deref())?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    // Build the session before touching the terminal so errors print cleanly.
    let mut app = App::new(config, deck, rng)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render::ui(f, app))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        // One key press per frame, handled before the simulation step.
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
