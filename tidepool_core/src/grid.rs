use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Position ({x}, {y}) is outside the grid spanning ({min_x}, {min_y}) to ({max_x}, {max_y})")]
    OutOfBounds {
        x: i32,
        y: i32,
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    },
    #[error("A {width}x{height} grid exceeds the limit of {max} cells")]
    TooLarge {
        width: u64,
        height: u64,
        max: usize,
    },
}

/// A dense 2D grid over a rectangular window of positions.
///
/// Stores elements of type `T` in a flat vector using row-major order,
/// starting at `origin` (the lowest `x` and `y` covered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    origin: Position,
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Largest window [`Grid::covering`] will allocate.
    pub const MAX_CELLS: usize = 1 << 24;

    /// Creates a new grid with the specified window, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(origin: Position, width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            origin,
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    /// Creates the smallest grid covering every given position.
    ///
    /// An empty iterator yields an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::TooLarge`] when the window spans more than
    /// [`Grid::MAX_CELLS`] cells, which happens for a few far apart positions.
    pub fn covering<I>(positions: I) -> Result<Self, GridError>
    where
        T: Default + Clone,
        I: IntoIterator<Item = Position>,
    {
        let mut bounds: Option<(Position, Position)> = None;
        for p in positions {
            bounds = Some(match bounds {
                None => (p, p),
                Some((min, max)) => (
                    Position::new(min.x.min(p.x), min.y.min(p.y)),
                    Position::new(max.x.max(p.x), max.y.max(p.y)),
                ),
            });
        }

        let Some((min, max)) = bounds else {
            return Ok(Grid::new(Position::ZERO, 0, 0));
        };
        let width = (i64::from(max.x) - i64::from(min.x) + 1) as u64;
        let height = (i64::from(max.y) - i64::from(min.y) + 1) as u64;
        match width.checked_mul(height) {
            Some(size) if size <= Self::MAX_CELLS as u64 => {
                Ok(Grid::new(min, width as usize, height as usize))
            }
            _ => Err(GridError::TooLarge {
                width,
                height,
                max: Self::MAX_CELLS,
            }),
        }
    }

    /// The lowest `x` and `y` covered by the window.
    #[inline]
    pub fn origin(&self) -> Position {
        self.origin
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is outside the window.
    #[inline]
    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        let dx = i64::from(position.x) - i64::from(self.origin.x);
        let dy = i64::from(position.y) - i64::from(self.origin.y);
        let dx = usize::try_from(dx).ok().filter(|&dx| dx < self.width)?;
        let dy = usize::try_from(dy).ok().filter(|&dy| dy < self.height)?;
        Some(dy * self.width + dx)
    }

    /// Converts a flat vector index back to a position.
    #[inline]
    pub fn index_to_position(&self, index: usize) -> Option<Position> {
        if index < self.cells.len() {
            let dy = (index / self.width) as i32;
            let dx = (index % self.width) as i32;
            Some(Position::new(self.origin.x + dx, self.origin.y + dy))
        } else {
            None
        }
    }

    /// Whether `position` lies inside the window.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.position_to_index(position).is_some()
    }

    /// Returns a reference to the cell at `position`, or `None` outside the window.
    pub fn get(&self, position: Position) -> Option<&T> {
        let index = self.position_to_index(position)?;
        self.cells.get(index)
    }

    /// Mutable counterpart of [`Grid::get`].
    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        let index = self.position_to_index(position)?;
        self.cells.get_mut(index)
    }

    /// Sets the value of the cell at the given position.
    ///
    /// # Arguments
    ///
    /// * `position` - The cell to overwrite.
    /// * `value` - The new value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `position` is outside the window.
    pub fn set(&mut self, position: Position, value: T) -> Result<(), GridError> {
        let index = self
            .position_to_index(position)
            .ok_or_else(|| self.out_of_bounds(position))?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| Some((self.index_to_position(index)?, cell)))
    }

    fn out_of_bounds(&self, position: Position) -> GridError {
        GridError::OutOfBounds {
            x: position.x,
            y: position.y,
            min_x: self.origin.x,
            min_y: self.origin.y,
            max_x: self.origin.x + self.width as i32 - 1,
            max_y: self.origin.y + self.height as i32 - 1,
        }
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Position) -> &Self::Output {
        match self.position_to_index(index) {
            Some(idx) => &self.cells[idx],
            None => panic!("{}", self.out_of_bounds(index)),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, index: Position) -> &mut Self::Output {
        match self.position_to_index(index) {
            Some(idx) => &mut self.cells[idx],
            None => panic!("{}", self.out_of_bounds(index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covering_spans_negative_coordinates() {
        let grid: Grid<u8> = Grid::covering([Position::new(-2, 1), Position::new(3, -1)]).unwrap();
        assert_eq!(grid.origin(), Position::new(-2, -1));
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 3);
        assert!(grid.contains(Position::new(0, 0)));
        assert!(!grid.contains(Position::new(4, 0)));
        assert!(!grid.contains(Position::new(-3, 0)));
    }

    #[test]
    fn index_roundtrip() {
        let grid: Grid<u8> = Grid::new(Position::new(5, 5), 3, 2);
        for index in 0..6 {
            let p = grid.index_to_position(index).unwrap();
            assert_eq!(grid.position_to_index(p), Some(index));
        }
        assert_eq!(grid.index_to_position(6), None);
    }

    #[test]
    fn set_outside_reports_window() {
        let mut grid: Grid<u8> = Grid::new(Position::ZERO, 2, 2);
        assert!(grid.set(Position::new(1, 1), 9).is_ok());
        assert_eq!(grid[Position::new(1, 1)], 9);
        let err = grid.set(Position::new(2, 0), 1).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                x: 2,
                y: 0,
                min_x: 0,
                min_y: 0,
                max_x: 1,
                max_y: 1,
            }
        );
    }

    #[test]
    fn empty_covering_is_empty() {
        let grid: Grid<u8> = Grid::covering(std::iter::empty()).unwrap();
        assert_eq!(grid.width(), 0);
        assert!(grid.get(Position::ZERO).is_none());
        assert_eq!(grid.enumerate().count(), 0);
    }

    #[test]
    fn covering_far_apart_positions_is_refused() {
        let far = Position::new(200_000, 200_000);
        let err = Grid::<u8>::covering([Position::ZERO, far]).unwrap_err();
        assert_eq!(
            err,
            GridError::TooLarge {
                width: 200_001,
                height: 200_001,
                max: Grid::<u8>::MAX_CELLS,
            }
        );

        let extremes = [Position::new(i32::MIN, i32::MIN), Position::new(i32::MAX, i32::MAX)];
        assert!(matches!(
            Grid::<u8>::covering(extremes),
            Err(GridError::TooLarge { .. })
        ));
    }
}
