use serde::{Deserialize, Serialize};

use crate::Position;

/// Errors raised by checked grid writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Cell ({x}, {y}) is out of bounds for a {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A rectangular grid stored row-major in a flat vector.
///
/// The deck plan is a `Grid<DeckCell>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid filled with `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn coords_to_index(&self, x: usize, y: usize) -> Option<usize> {
        if self.is_valid(x, y) {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        let index = self.coords_to_index(x, y)?;
        self.cells.get(index)
    }

    /// Writes `value` at `(x, y)`, or reports the cell as out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<(), GridError> {
        let index = self.coords_to_index(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Yields `(position, &cell)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Position {
                    x: index % width,
                    y: index / width,
                },
                cell,
            )
        })
    }

    /// First position whose cell satisfies `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<Position> {
        self.enumerate()
            .find_map(|(pos, cell)| predicate(cell).then_some(pos))
    }

    /// The up to eight in-bounds cells around `pos`.
    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        (-1isize..=1)
            .flat_map(|dy| (-1isize..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| {
                let x = pos.x.checked_add_signed(dx)?;
                let y = pos.y.checked_add_signed(dy)?;
                self.is_valid(x, y).then_some(Position { x, y })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_respect_bounds() {
        let mut grid: Grid<u8> = Grid::new(3, 2);
        grid.set(2, 1, 7).unwrap();
        assert_eq!(grid.get(2, 1), Some(&7));
        assert_eq!(
            grid.set(3, 0, 1),
            Err(GridError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(grid.get(0, 2).is_none());
    }

    #[test]
    fn neighbours_clip_at_edges() {
        let grid: Grid<u8> = Grid::new(4, 4);
        assert_eq!(grid.neighbours(Position { x: 0, y: 0 }).count(), 3);
        assert_eq!(grid.neighbours(Position { x: 1, y: 1 }).count(), 8);
        assert_eq!(grid.neighbours(Position { x: 3, y: 1 }).count(), 5);
    }

    #[test]
    fn find_scans_row_major() {
        let mut grid: Grid<u8> = Grid::new(3, 3);
        grid.set(2, 0, 1).unwrap();
        grid.set(0, 1, 1).unwrap();
        assert_eq!(grid.find(|c| *c == 1), Some(Position { x: 2, y: 0 }));
    }
}
