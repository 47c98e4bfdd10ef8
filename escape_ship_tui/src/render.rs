use escape_ship_core::{
    Position,
    catalog::ItemCategory,
    deck::DeckCell,
    door::DoorState,
    presentation::Panel,
    quest::EndReason,
    session::GameSession,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::App;

/// Renders the user interface.
pub fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(16),    // Deck and side panel
            Constraint::Length(8),  // Dialogue, lock or messages
            Constraint::Length(2),  // Status/help
        ])
        .split(frame.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_layout[0]);

    render_map(frame, top[0], app);
    if app.show_dashboard {
        render_dashboard(frame, top[1], &app.session);
    } else {
        render_inventory(frame, top[1], &app.session);
    }
    render_bottom_panel(frame, main_layout[1], app);

    let status = Paragraph::new(format!(
        "{}   [Arrows] move  [E] use  [T] talk  [F] fire  [L] lifeboat  [Tab] panel  [Q] quit",
        app.session.progress_text()
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, main_layout[2]);
}

fn item_span(category: ItemCategory) -> Span<'static> {
    match category {
        ItemCategory::Key => Span::styled("k", Style::default().fg(Color::Yellow).bold()),
        ItemCategory::Treasure => Span::styled("$", Style::default().fg(Color::Yellow)),
        ItemCategory::Weapon => Span::styled("!", Style::default().fg(Color::Red)),
        ItemCategory::Tool => Span::styled("%", Style::default().fg(Color::Cyan)),
        ItemCategory::Document => Span::styled("?", Style::default().fg(Color::White)),
        ItemCategory::Consumable | ItemCategory::QuestItem => {
            Span::styled("*", Style::default().fg(Color::Magenta))
        }
    }
}

fn tile_span(app: &App, pos: Position, tile: DeckCell) -> Span<'static> {
    match tile {
        DeckCell::Floor => Span::styled(".", Style::default().fg(Color::DarkGray)),
        DeckCell::Wall => Span::styled("#", Style::default().fg(Color::Gray)),
        DeckCell::Furniture => Span::styled("=", Style::default().fg(Color::Rgb(139, 90, 43))),
        DeckCell::Door { keyed } => {
            let door = app.session.door_at(pos);
            let glyph = match door.map(|door| door.state()) {
                Some(DoorState::Open) => "+",
                Some(DoorState::Opening | DoorState::Closing) => "/",
                Some(DoorState::Closed) | None => "|",
            };
            let style = match door {
                Some(door) if door.is_locked() => Style::default().fg(Color::Red),
                _ if keyed => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            };
            Span::styled(glyph, style)
        }
        DeckCell::Lifeboat => {
            let style = if app.session.quest().is_lifeboat_activated() {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default().fg(Color::Blue)
            };
            Span::styled("L", style)
        }
        DeckCell::Chest => {
            let style = if app.session.chest().is_solved() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Span::styled("T", style)
        }
        DeckCell::ShipWheel => Span::styled("W", Style::default().fg(Color::Cyan)),
        DeckCell::Parrot => Span::styled("P", Style::default().fg(Color::Green)),
    }
}

/// Renders the deck, items and both walkers onto the frame.
fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let deck = &app.deck;
    let hostile = app.session.quest().phase().captain_hostile();
    let mut lines: Vec<Line> = Vec::with_capacity(deck.height());

    for y in 0..deck.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(deck.width());
        for x in 0..deck.width() {
            let pos = Position { x, y };
            if pos == app.player {
                spans.push(Span::styled("@", Style::default().fg(Color::White).bold()));
                continue;
            }
            if pos == app.captain {
                let color = if hostile { Color::Red } else { Color::LightBlue };
                spans.push(Span::styled("C", Style::default().fg(color).bold()));
                continue;
            }
            let item = app
                .session
                .placement_at(pos)
                .and_then(|placement| app.session.catalog().get(&placement.item))
                .map(|item| item_span(item.category));
            if let Some(item) = item {
                spans.push(item);
            } else {
                let tile = deck.cell(pos).unwrap_or(DeckCell::Floor);
                spans.push(tile_span(app, pos, tile));
            }
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("The Ship").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}

fn render_dashboard(frame: &mut Frame, area: Rect, session: &GameSession) {
    let text = session.dashboard().to_string();
    let dashboard = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Quest"));
    frame.render_widget(dashboard, area);
}

/// Renders what the player carries and what it lets them do.
fn render_inventory(frame: &mut Frame, area: Rect, session: &GameSession) {
    let ledger = session.ledger();
    let mut inventory_items: Vec<ListItem> = session
        .catalog()
        .iter()
        .filter(|item| ledger.count(&item.name) > 0)
        .map(|item| {
            let mut spans = vec![item_span(item.category), Span::raw(" ")];
            spans.push(Span::raw(format!(
                "{} x{}",
                item.display_name,
                ledger.count(&item.name)
            )));
            ListItem::from(Line::from(spans))
        })
        .collect();
    if inventory_items.is_empty() {
        inventory_items.push(ListItem::from("Pockets are empty"));
    }
    inventory_items.push(ListItem::from(""));
    inventory_items.extend(ledger.capabilities().iter().map(|capability| {
        ListItem::from(Line::from(Span::styled(
            capability.to_string(),
            Style::default().fg(Color::Green),
        )))
    }));

    let inventory_widget =
        List::new(inventory_items).block(Block::default().borders(Borders::ALL).title("Inventory"));
    frame.render_widget(inventory_widget, area);
}

fn render_bottom_panel(frame: &mut Frame, area: Rect, app: &App) {
    let hud = app.hud.borrow();

    let (title, lines): (String, Vec<Line>) = if hud.is_visible(Panel::Victory) {
        (
            "Victory".to_string(),
            vec![
                Line::styled(
                    match app.session.quest().state().end_reason {
                        Some(EndReason::CaptainDefeated) => "The captain is down. The ship is yours!",
                        _ => "You escaped the ship!",
                    },
                    Style::default().fg(Color::Green).bold(),
                ),
                Line::from("Press [R] to play again or [Q] to quit."),
            ],
        )
    } else if hud.is_visible(Panel::GameOver) {
        (
            "Game Over".to_string(),
            vec![
                Line::styled("The captain caught you.", Style::default().fg(Color::Red).bold()),
                Line::from("Press [R] to restart or [Q] to quit."),
            ],
        )
    } else if hud.is_visible(Panel::CombinationLock) {
        let digits = app.session.chest().digits();
        let entered: String = app
            .code_entry
            .chars()
            .chain(std::iter::repeat('_'))
            .take(digits)
            .collect();
        (
            "Combination Lock".to_string(),
            vec![
                Line::from(format!("Code: {}", entered)),
                Line::from(hud.text(Panel::CombinationLock).to_string()),
                Line::from("[0-9] enter digit  [Backspace] clear  [Esc] step away"),
            ],
        )
    } else if hud.is_visible(Panel::Dialogue) {
        let speaker = app
            .session
            .active_speaker()
            .map(|engine| engine.name().to_string())
            .unwrap_or_default();
        let mut lines = vec![Line::from(hud.text(Panel::Dialogue).to_string())];
        if hud.is_visible(Panel::Choices) {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "1) {}  2) General talk  3) Goodbye",
                app.session.ask_label()
            )));
        } else {
            lines.push(Line::styled(
                "[Enter] continue",
                Style::default().fg(Color::DarkGray),
            ));
        }
        (speaker, lines)
    } else {
        let mut lines = Vec::new();
        if hud.is_visible(Panel::LifeboatNotice) {
            lines.push(Line::styled(
                hud.text(Panel::LifeboatNotice).to_string(),
                Style::default().fg(Color::Green).bold(),
            ));
        }
        if let Some(prompt) = &hud.prompt {
            lines.push(Line::styled(prompt.clone(), Style::default().fg(Color::Yellow)));
        }
        lines.extend(hud.messages.iter().map(|message| Line::from(message.clone())));
        ("Log".to_string(), lines)
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(panel, area);
}
