//! Records which cells of `current` are alive at the start of a round

use crate::error::{LifeError, Result};
use crate::game_of_life::{is_border, Grid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An equality `current[index] == value` to post with the round's constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pin {
    pub index: usize,
    pub value: u8,
}

/// Activation set of one round.
///
/// `alive` holds the flattened indices that were activated; `pins` holds the
/// equalities to post on `current`. Input activations only pin 1s, while a
/// transfer from a previous round pins every interior cell to its prior value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSet {
    length: usize,
    alive: BTreeSet<usize>,
    pins: BTreeSet<Pin>,
}

impl ActivationSet {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            alive: BTreeSet::new(),
            pins: BTreeSet::new(),
        }
    }

    /// Activation set with one `activate` per live cell of `grid`
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        let mut set = Self::new(grid.length);
        for (row, col) in grid.living_cells() {
            set.activate(row, col)?;
        }
        Ok(set)
    }

    /// Mark `current[row][col]` alive
    pub fn activate(&mut self, row: usize, col: usize) -> Result<()> {
        let index = self.index(row, col)?;
        self.alive.insert(index);
        self.pins.insert(Pin { index, value: 1 });
        Ok(())
    }

    /// Transfer the interior of a solved `next` grid onto `current`.
    /// Border cells are left to the border rule.
    pub fn activate_from_previous(&mut self, prior_next: &Grid) -> Result<()> {
        if prior_next.length != self.length {
            return Err(LifeError::InvalidConfiguration(format!(
                "previous board has length {}, expected {}",
                prior_next.length, self.length
            )));
        }

        for (row, col, alive) in prior_next.interior() {
            let index = row * self.length + col;
            self.pins.insert(Pin {
                index,
                value: alive as u8,
            });
            if alive {
                self.alive.insert(index);
            }
        }
        Ok(())
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.length || col >= self.length {
            return Err(LifeError::CoordinateOutOfRange {
                row,
                col,
                length: self.length,
            });
        }
        Ok(row * self.length + col)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.alive.contains(&index)
    }

    /// Activated indices in ascending order
    pub fn alive(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive.iter().copied()
    }

    pub fn pins(&self) -> impl Iterator<Item = Pin> + '_ {
        self.pins.iter().copied()
    }

    /// Activated cells lying on the border, which no round can satisfy
    pub fn border_activations(&self) -> Vec<(usize, usize)> {
        self.alive
            .iter()
            .map(|&index| (index / self.length, index % self.length))
            .filter(|&(row, col)| is_border(self.length, row, col))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The activated cells as a grid
    pub fn to_grid(&self) -> Grid {
        let mut grid = Grid::new(self.length);
        for &index in &self.alive {
            grid.cells[index] = true;
        }
        grid
    }
}
