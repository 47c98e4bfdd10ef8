use serde::{Deserialize, Serialize};

use crate::{
    Position, WorldPoint,
    map::{Grid, GridError},
    spawn::OccupancyOracle,
};

/// Static content of one deck cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckCell {
    #[default]
    Floor,
    Wall,
    Furniture,
    Door {
        /// Whether the door needs the configured door key.
        keyed: bool,
    },
    Lifeboat,
    Chest,
    ShipWheel,
    Parrot,
}

impl DeckCell {
    /// Whether a walker can stand here. Doors are handled by their state.
    pub fn is_walkable(&self) -> bool {
        matches!(self, DeckCell::Floor | DeckCell::Door { .. })
    }
}

/// Errors from parsing a deck map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    #[error("Deck map is empty.")]
    Empty,
    #[error("Deck map has zero width.")]
    ZeroWidth,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown deck code '{code}' at position ({x}, {y}).")]
    UnknownCode { code: String, x: usize, y: usize },
    #[error("Multiple '{0}' markers found.")]
    Repeated(&'static str),
    #[error("No '{0}' marker found in deck map.")]
    Missing(&'static str),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The ship deck: scenery plus where the player and captain start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckPlan {
    pub cells: Grid<DeckCell>,
    pub player_start: Position,
    pub captain_start: Position,
}

impl DeckPlan {
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn cell(&self, pos: Position) -> Option<DeckCell> {
        self.cells.get(pos.x, pos.y).copied()
    }

    /// Positions of every door, in row-major order, with their keyed flag.
    pub fn doors(&self) -> Vec<(Position, bool)> {
        self.cells
            .enumerate()
            .filter_map(|(pos, cell)| match cell {
                DeckCell::Door { keyed } => Some((pos, *keyed)),
                _ => None,
            })
            .collect()
    }

    /// First cell holding the given prop.
    pub fn locate(&self, prop: DeckCell) -> Option<Position> {
        self.cells.find(|cell| *cell == prop)
    }
}

impl OccupancyOracle for DeckPlan {
    /// Only open floor can hold an item.
    fn is_obstructed(&self, point: WorldPoint) -> bool {
        match Position::from_world(point) {
            Some(pos) => self.cell(pos) != Some(DeckCell::Floor),
            None => true,
        }
    }
}

/// Parses a deck from whitespace-separated two-letter codes, one row per line.
///
/// `BL` floor, `WL`/`WA` wall, `FN` furniture, `DR` keyed door, `DO` plain
/// door, `ST` player start, `CP` captain start, `LB` lifeboat, `CH` chest,
/// `SW` ship wheel, `PA` parrot.
pub fn load_deck_from_string(map_string: &str) -> Result<DeckPlan, DeckError> {
    let lines: Vec<&str> = map_string
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    if lines.is_empty() {
        return Err(DeckError::Empty);
    }

    let mut width = 0;
    let mut rows: Vec<Vec<&str>> = Vec::with_capacity(lines.len());
    for (y, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if y == 0 {
            width = tokens.len();
            if width == 0 {
                return Err(DeckError::ZeroWidth);
            }
        } else if tokens.len() != width {
            return Err(DeckError::RaggedRow {
                row: y,
                expected: width,
                found: tokens.len(),
            });
        }
        rows.push(tokens);
    }

    let mut cells: Grid<DeckCell> = Grid::new(width, rows.len());
    let mut player_start = None;
    let mut captain_start = None;

    for (y, tokens) in rows.iter().enumerate() {
        for (x, token) in tokens.iter().enumerate() {
            let pos = Position { x, y };
            let cell = match *token {
                "BL" => DeckCell::Floor,
                "WL" | "WA" => DeckCell::Wall,
                "FN" => DeckCell::Furniture,
                "DR" => DeckCell::Door { keyed: true },
                "DO" => DeckCell::Door { keyed: false },
                "LB" => DeckCell::Lifeboat,
                "CH" => DeckCell::Chest,
                "SW" => DeckCell::ShipWheel,
                "PA" => DeckCell::Parrot,
                "ST" => {
                    if player_start.replace(pos).is_some() {
                        return Err(DeckError::Repeated("ST"));
                    }
                    DeckCell::Floor
                }
                "CP" => {
                    if captain_start.replace(pos).is_some() {
                        return Err(DeckError::Repeated("CP"));
                    }
                    DeckCell::Floor
                }
                unknown => {
                    return Err(DeckError::UnknownCode {
                        code: unknown.to_string(),
                        x,
                        y,
                    });
                }
            };
            cells.set(x, y, cell)?;
        }
    }

    Ok(DeckPlan {
        cells,
        player_start: player_start.ok_or(DeckError::Missing("ST"))?,
        captain_start: captain_start.ok_or(DeckError::Missing("CP"))?,
    })
}
