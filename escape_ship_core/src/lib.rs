use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod chest;
pub mod config;
pub mod dashboard;
pub mod deck;
pub mod dialogue;
pub mod door;
pub mod error;
pub mod ledger;
pub mod map;
pub mod presentation;
pub mod quest;
pub mod scheduler;
pub mod session;
pub mod spawn;

/// Largest absolute world coordinate a room or distance may use.
pub const MAX_COORDINATE: f32 = 1.0e6;

/// Longest delay, in seconds, a timed setting may ask for.
pub const MAX_DELAY_SECS: f32 = 3600.0;

/// Seconds to a `Duration`, clamped to `[0, MAX_DELAY_SECS]`. NaN becomes zero.
pub(crate) fn duration_from_secs(secs: f32) -> Duration {
    if secs.is_nan() {
        warn!("NaN delay treated as zero");
        return Duration::ZERO;
    }
    Duration::from_secs_f32(secs.clamp(0.0, MAX_DELAY_SECS))
}

/// Name of an item type. Unique within a catalog and used as its id.
pub type ItemName = String;

/// Represents a cell coordinate on the deck plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// Centre of the cell in world space, lifted by `height`.
    pub fn to_world(self, height: f32) -> WorldPoint {
        WorldPoint::new(self.x as f32 + 0.5, height, self.y as f32 + 0.5)
    }

    /// The cell containing `point`, ignoring height.
    ///
    /// Returns `None` for points left of or above the deck origin.
    pub fn from_world(point: WorldPoint) -> Option<Position> {
        if point.x < 0.0 || point.z < 0.0 || !point.x.is_finite() || !point.z.is_finite() {
            return None;
        }
        Some(Position {
            x: point.x.floor() as usize,
            y: point.z.floor() as usize,
        })
    }

    /// Chebyshev distance, so diagonal neighbours count as adjacent.
    pub fn steps_to(self, other: Position) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// A point in world space. The deck lies in the x/z plane and `y` is height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        WorldPoint { x, y, z }
    }

    /// Distance on the deck plane.
    pub fn planar_distance(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Axis-aligned floor area of a room on the x/z plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl RoomBounds {
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        RoomBounds {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// True when both ranges are ordered and within [`MAX_COORDINATE`].
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_z, self.max_z]
            .iter()
            .all(|v| v.is_finite() && v.abs() <= MAX_COORDINATE)
            && self.min_x <= self.max_x
            && self.min_z <= self.max_z
    }

    /// Returns the bounds with each range ordered low to high.
    pub fn normalized(&self) -> RoomBounds {
        RoomBounds {
            min_x: self.min_x.min(self.max_x),
            max_x: self.min_x.max(self.max_x),
            min_z: self.min_z.min(self.max_z),
            max_z: self.min_z.max(self.max_z),
        }
    }

    /// Centre of the area at the given height.
    pub fn center(&self, height: f32) -> WorldPoint {
        WorldPoint::new(
            (self.min_x + self.max_x) / 2.0,
            height,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    pub fn contains(&self, point: &WorldPoint) -> bool {
        let b = self.normalized();
        point.x >= b.min_x && point.x <= b.max_x && point.z >= b.min_z && point.z <= b.max_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_points_map_to_cells() {
        let cell = Position { x: 3, y: 7 };
        let centre = cell.to_world(0.5);
        assert_eq!(Position::from_world(centre), Some(cell));
        assert_eq!(Position::from_world(WorldPoint::new(-0.1, 0.0, 2.0)), None);
    }

    #[test]
    fn bounds_normalize_and_contain() {
        let bounds = RoomBounds::new(5.0, 1.0, 2.0, 4.0);
        assert!(!bounds.is_valid());
        let fixed = bounds.normalized();
        assert!(fixed.is_valid());
        assert_eq!(fixed.center(0.0), WorldPoint::new(3.0, 0.0, 3.0));
        assert!(bounds.contains(&WorldPoint::new(4.5, 9.0, 3.5)));
        assert!(!bounds.contains(&WorldPoint::new(0.5, 0.0, 3.5)));

        assert!(!RoomBounds::new(-3.0e38, 3.0e38, 0.0, 1.0).is_valid());
        assert!(!RoomBounds::new(0.0, f32::INFINITY, 0.0, 1.0).is_valid());
    }

    #[test]
    fn delays_are_clamped_not_panicking() {
        assert_eq!(duration_from_secs(-2.0), Duration::ZERO);
        assert_eq!(duration_from_secs(f32::NAN), Duration::ZERO);
        assert_eq!(duration_from_secs(f32::INFINITY), Duration::from_secs(3600));
        assert_eq!(duration_from_secs(1.5), Duration::from_millis(1500));
    }

    #[test]
    fn steps_count_diagonals_once() {
        let a = Position { x: 2, y: 2 };
        assert_eq!(a.steps_to(Position { x: 3, y: 3 }), 1);
        assert_eq!(a.steps_to(Position { x: 5, y: 2 }), 3);
    }
}
