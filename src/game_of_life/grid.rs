//! Square board representation for Game of Life

use crate::error::{LifeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A square Game of Life board with a dead border
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub length: usize,
    pub cells: Vec<bool>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(length: usize) -> Self {
        Self {
            length,
            cells: vec![false; length * length],
        }
    }

    /// Create a grid from rows of booleans; the rows must form a square
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Self> {
        let length = cells.len();
        if length == 0 {
            return Err(LifeError::InvalidConfiguration(
                "grid cannot be empty".to_string(),
            ));
        }

        for (i, row) in cells.iter().enumerate() {
            if row.len() != length {
                return Err(LifeError::MalformedBoard(format!(
                    "row {} has length {}, expected {}",
                    i,
                    row.len(),
                    length
                )));
            }
        }

        Ok(Self {
            length,
            cells: cells.into_iter().flatten().collect(),
        })
    }

    /// Build a grid from flattened 0/1 values
    pub fn from_values(length: usize, values: &[u8]) -> Result<Self> {
        if values.len() != length * length {
            return Err(LifeError::MalformedBoard(format!(
                "expected {} values, got {}",
                length * length,
                values.len()
            )));
        }
        Ok(Self {
            length,
            cells: values.iter().map(|&v| v != 0).collect(),
        })
    }

    /// Flattened index, `row * length + col`
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.length + col
    }

    /// Get cell value at coordinates; out of range reads as dead
    pub fn get(&self, row: usize, col: usize) -> bool {
        if row < self.length && col < self.length {
            self.cells[self.index(row, col)]
        } else {
            false
        }
    }

    /// Set cell value at coordinates
    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<()> {
        if row >= self.length || col >= self.length {
            return Err(LifeError::CoordinateOutOfRange {
                row,
                col,
                length: self.length,
            });
        }
        let idx = self.index(row, col);
        self.cells[idx] = value;
        Ok(())
    }

    /// Whether (row, col) lies on the outermost ring
    pub fn is_border(&self, row: usize, col: usize) -> bool {
        is_border(self.length, row, col)
    }

    /// Count living cells in the Moore neighborhood, excluding the cell itself
    pub fn count_neighbors(&self, row: usize, col: usize) -> u8 {
        let mut count = 0;

        for dr in [-1isize, 0, 1] {
            for dc in [-1isize, 0, 1] {
                if dr == 0 && dc == 0 {
                    continue;
                }

                let r = row as isize + dr;
                let c = col as isize + dc;
                if r >= 0 && c >= 0 && self.get(r as usize, c as usize) {
                    count += 1;
                }
            }
        }

        count
    }

    /// Get all living cell coordinates
    pub fn living_cells(&self) -> Vec<(usize, usize)> {
        let mut living = Vec::new();
        for row in 0..self.length {
            for col in 0..self.length {
                if self.get(row, col) {
                    living.push((row, col));
                }
            }
        }
        living
    }

    /// Count total living cells
    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Check if the grid is empty (no living cells)
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| !cell)
    }

    /// Interior cells only, as (row, col, alive)
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let upper = self.length.saturating_sub(1);
        (1..upper).flat_map(move |row| (1..upper).map(move |col| (row, col, self.get(row, col))))
    }

    /// Cells as 0/1 values, row-major
    pub fn values(&self) -> Vec<u8> {
        self.cells.iter().map(|&cell| cell as u8).collect()
    }
}

/// Number of cells on a `length` x `length` board.
///
/// Both generations of a round get one solver variable per cell, and the
/// CNF backend numbers variables with `i32`, so `2 * length^2` must fit.
pub fn checked_cell_count(length: usize) -> Result<usize> {
    if length == 0 {
        return Err(LifeError::InvalidConfiguration(
            "board length must be positive".to_string(),
        ));
    }
    length
        .checked_mul(length)
        .filter(|cells| cells.checked_mul(2).is_some_and(|vars| vars <= i32::MAX as usize))
        .ok_or_else(|| {
            LifeError::InvalidConfiguration(format!("board length {} is too large", length))
        })
}

/// Whether (row, col) lies on the border of a `length` x `length` board
pub fn is_border(length: usize, row: usize, col: usize) -> bool {
    row == 0 || col == 0 || row + 1 == length || col + 1 == length
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.length {
            for col in 0..self.length {
                let symbol = if self.get(row, col) { "⬛" } else { "⬜" };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(3);
        assert_eq!(grid.length, 3);
        assert_eq!(grid.cells.len(), 9);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_grid_from_cells() {
        let cells = vec![
            vec![true, false, true],
            vec![false, true, false],
            vec![true, false, true],
        ];
        let grid = Grid::from_cells(cells).unwrap();
        assert_eq!(grid.length, 3);
        assert_eq!(grid.living_count(), 5);
    }

    #[test]
    fn test_non_square_rejected() {
        let cells = vec![vec![true, false], vec![false]];
        assert!(matches!(
            Grid::from_cells(cells),
            Err(LifeError::MalformedBoard(_))
        ));
        assert!(Grid::from_cells(Vec::new()).is_err());
    }

    #[test]
    fn test_cell_count_limits() {
        assert_eq!(checked_cell_count(5), Ok(25));
        assert_eq!(checked_cell_count(32_767), Ok(32_767 * 32_767));
        assert!(matches!(
            checked_cell_count(32_768),
            Err(LifeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            checked_cell_count(usize::MAX),
            Err(LifeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            checked_cell_count(0),
            Err(LifeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_neighbor_counting() {
        let cells = vec![
            vec![true, true, true],
            vec![true, false, true],
            vec![true, true, true],
        ];
        let grid = Grid::from_cells(cells).unwrap();

        assert_eq!(grid.count_neighbors(1, 1), 8);
        assert_eq!(grid.count_neighbors(0, 0), 2);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut grid = Grid::new(3);
        assert!(grid.set(1, 1, true).is_ok());
        assert_eq!(
            grid.set(3, 0, true),
            Err(LifeError::CoordinateOutOfRange {
                row: 3,
                col: 0,
                length: 3
            })
        );
    }

    #[test]
    fn test_border_and_interior() {
        let grid = Grid::new(4);
        assert!(grid.is_border(0, 2));
        assert!(grid.is_border(2, 3));
        assert!(!grid.is_border(1, 2));
        let interior: Vec<_> = grid.interior().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(interior, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);

        // Tiny boards have no interior at all
        assert_eq!(Grid::new(1).interior().count(), 0);
        assert_eq!(Grid::new(2).interior().count(), 0);
    }
}
