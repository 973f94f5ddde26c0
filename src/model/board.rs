//! Two generations of cell variables for one round

use crate::csp::{DomainId, Space, Store};
use crate::error::{LifeError, Result};
use crate::game_of_life::{checked_cell_count, Grid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two grids of a round a cell belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    Current,
    Next,
}

impl Generation {
    pub fn as_str(self) -> &'static str {
        match self {
            Generation::Current => "current",
            Generation::Next => "next",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `current` and `next` grids of one round as {0,1} variables.
///
/// Cloning a model copies the in-progress domains, which is how search
/// derives the model for the other alternative of a decision.
#[derive(Debug, Clone)]
pub struct BoardModel {
    store: Store,
    length: usize,
    current: Vec<DomainId>,
    next: Vec<DomainId>,
}

impl BoardModel {
    pub fn new(length: usize) -> Result<Self> {
        let cells = checked_cell_count(length)?;

        let mut store = Store::new();
        let current = store.new_int_var_array(cells, 0, 1);
        let next = store.new_int_var_array(cells, 0, 1);

        Ok(Self {
            store,
            length,
            current,
            next,
        })
    }

    pub fn length(&self) -> usize {
        self.length
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

    /// Variable of `current[row][col]`
    pub fn current(&self, row: usize, col: usize) -> Result<DomainId> {
        Ok(self.current[self.index(row, col)?])
    }

    /// Variable of `next[row][col]`
    pub fn next(&self, row: usize, col: usize) -> Result<DomainId> {
        Ok(self.next[self.index(row, col)?])
    }

    pub fn cell(&self, generation: Generation, row: usize, col: usize) -> Result<DomainId> {
        match generation {
            Generation::Current => self.current(row, col),
            Generation::Next => self.next(row, col),
        }
    }

    pub fn current_vars(&self) -> &[DomainId] {
        &self.current
    }

    pub fn next_vars(&self) -> &[DomainId] {
        &self.next
    }

    /// Snapshot of `current`; `None` marks a cell that is still open
    pub fn current_values(&self) -> Vec<Option<u8>> {
        self.snapshot(&self.current)
    }

    /// Snapshot of `next`; `None` marks a cell that is still open
    pub fn next_values(&self) -> Vec<Option<u8>> {
        self.snapshot(&self.next)
    }

    fn snapshot(&self, vars: &[DomainId]) -> Vec<Option<u8>> {
        vars.iter()
            .map(|&v| self.store.value(v).map(|value| value as u8))
            .collect()
    }

    pub fn solved_current(&self) -> Result<Grid> {
        self.solved(Generation::Current)
    }

    pub fn solved_next(&self) -> Result<Grid> {
        self.solved(Generation::Next)
    }

    fn solved(&self, generation: Generation) -> Result<Grid> {
        let vars = match generation {
            Generation::Current => &self.current,
            Generation::Next => &self.next,
        };

        let mut grid = Grid::new(self.length);
        for (index, &var) in vars.iter().enumerate() {
            let value = self.store.value(var).ok_or(LifeError::Unassigned {
                generation: generation.as_str(),
                index,
            })?;
            grid.cells[index] = value != 0;
        }
        Ok(grid)
    }

    /// Whether every variable of both grids is assigned
    pub fn is_solved(&self) -> bool {
        self.current
            .iter()
            .chain(self.next.iter())
            .all(|&v| self.store.value(v).is_some())
    }
}

impl Space for BoardModel {
    fn store(&self) -> &Store {
        &self.store
    }

    fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::LinExpr;

    #[test]
    fn test_allocation() {
        let model = BoardModel::new(5).unwrap();
        assert_eq!(model.length(), 5);
        assert_eq!(model.current_vars().len(), 25);
        assert_eq!(model.next_vars().len(), 25);
        assert_eq!(model.store().variable_count(), 50);
        assert!(model.current_values().iter().all(Option::is_none));
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(
            BoardModel::new(0),
            Err(LifeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            BoardModel::new(1 << 40),
            Err(LifeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_accessors_are_bounds_checked() {
        let model = BoardModel::new(3).unwrap();
        assert_ne!(model.current(1, 1).unwrap(), model.next(1, 1).unwrap());
        assert_eq!(
            model.cell(Generation::Next, 2, 0).unwrap(),
            model.next(2, 0).unwrap()
        );
        assert_eq!(
            model.current(3, 0),
            Err(LifeError::CoordinateOutOfRange {
                row: 3,
                col: 0,
                length: 3
            })
        );
        assert!(model.next(0, 7).is_err());
    }

    #[test]
    fn test_unassigned_cells_reported() {
        let model = BoardModel::new(2).unwrap();
        assert_eq!(
            model.solved_next(),
            Err(LifeError::Unassigned {
                generation: "next",
                index: 0
            })
        );
        assert!(!model.is_solved());
    }

    #[test]
    fn test_derived_model_keeps_bindings() {
        let mut model = BoardModel::new(2).unwrap();
        let cell = model.current(0, 1).unwrap();
        model.store_mut().post(LinExpr::var(cell).equals(1)).unwrap();
        model.store_mut().propagate().unwrap();

        let derived = model.clone();
        assert_eq!(derived.current_values()[1], Some(1));
        assert_eq!(derived.current_values()[0], None);
    }
}
