//! Variable management for the CNF encoding of a round

use crate::error::{LifeError, Result};
use crate::model::Generation;
use std::collections::HashMap;

/// A cell of one of the two grids of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row: usize,
    pub col: usize,
    pub generation: Generation,
}

/// Maps cells to SAT variable ids (positive integers)
#[derive(Debug)]
pub struct VariableManager {
    variable_map: HashMap<CellKey, i32>,
    next_id: i32,
    length: usize,
}

impl VariableManager {
    pub fn new(length: usize) -> Self {
        Self {
            variable_map: HashMap::new(),
            next_id: 1, // SAT variables start from 1
            length,
        }
    }

    /// Get or create the variable of a cell
    pub fn cell_variable(&mut self, row: usize, col: usize, generation: Generation) -> Result<i32> {
        let key = CellKey {
            row,
            col,
            generation,
        };
        if let Some(&id) = self.variable_map.get(&key) {
            return Ok(id);
        }

        self.validate(&key)?;

        let id = self.next_id;
        self.next_id += 1;
        self.variable_map.insert(key, id);
        Ok(id)
    }

    pub fn current(&mut self, row: usize, col: usize) -> Result<i32> {
        self.cell_variable(row, col, Generation::Current)
    }

    pub fn next(&mut self, row: usize, col: usize) -> Result<i32> {
        self.cell_variable(row, col, Generation::Next)
    }

    /// Variable of a cell if it has been created
    pub fn lookup(&self, row: usize, col: usize, generation: Generation) -> Option<i32> {
        self.variable_map
            .get(&CellKey {
                row,
                col,
                generation,
            })
            .copied()
    }

    /// All variables of one grid in row-major order
    pub fn grid_variables(&mut self, generation: Generation) -> Result<Vec<i32>> {
        let mut variables = Vec::with_capacity(self.length * self.length);
        for row in 0..self.length {
            for col in 0..self.length {
                variables.push(self.cell_variable(row, col, generation)?);
            }
        }
        Ok(variables)
    }

    pub fn variable_count(&self) -> usize {
        (self.next_id - 1) as usize
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn validate(&self, key: &CellKey) -> Result<()> {
        if key.row >= self.length || key.col >= self.length {
            return Err(LifeError::CoordinateOutOfRange {
                row: key.row,
                col: key.col,
                length: self.length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_creation() {
        let mut vm = VariableManager::new(3);

        let var1 = vm.current(0, 0).unwrap();
        let var2 = vm.next(1, 1).unwrap();

        assert_eq!(var1, 1);
        assert_eq!(var2, 2);

        // Same cell, same id
        assert_eq!(vm.current(0, 0).unwrap(), var1);
        assert_eq!(vm.lookup(1, 1, Generation::Next), Some(var2));
        assert_eq!(vm.lookup(1, 1, Generation::Current), None);
    }

    #[test]
    fn test_generations_are_distinct() {
        let mut vm = VariableManager::new(2);
        assert_ne!(vm.current(1, 0).unwrap(), vm.next(1, 0).unwrap());
    }

    #[test]
    fn test_variable_bounds() {
        let mut vm = VariableManager::new(2);

        assert!(vm.current(1, 1).is_ok());
        assert_eq!(
            vm.current(2, 0),
            Err(LifeError::CoordinateOutOfRange {
                row: 2,
                col: 0,
                length: 2
            })
        );
        assert!(vm.next(0, 2).is_err());
    }

    #[test]
    fn test_grid_variables() {
        let mut vm = VariableManager::new(2);

        let vars = vm.grid_variables(Generation::Current).unwrap();
        assert_eq!(vars, vec![1, 2, 3, 4]);
        assert_eq!(vm.grid_variables(Generation::Next).unwrap(), vec![5, 6, 7, 8]);
        assert_eq!(vm.variable_count(), 8);
    }
}
