//! Clause generation for one round

use super::VariableManager;
use crate::error::Result;
use crate::game_of_life::is_border;
use crate::model::{Generation, Round};
use itertools::Itertools;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    pub fn unit(literal: i32) -> Self {
        Self {
            literals: vec![literal],
        }
    }

    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self {
            literals: vec![lit1, lit2],
        }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// Encodes the constraints of a round as CNF
pub struct ClauseGenerator {
    variable_manager: VariableManager,
    length: usize,
}

impl ClauseGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            variable_manager: VariableManager::new(length),
            length,
        }
    }

    /// Generate every clause of the round: pins, border, closure, transitions
    pub fn generate(&mut self, round: &Round) -> Result<Vec<Clause>> {
        let activations = round.activations();
        let mut clauses = Vec::new();

        // Allocate both grids up front so ids are stable row-major
        self.variable_manager.grid_variables(Generation::Current)?;
        self.variable_manager.grid_variables(Generation::Next)?;

        for pin in activations.pins() {
            let var = self
                .variable_manager
                .current(pin.index / self.length, pin.index % self.length)?;
            clauses.push(Clause::unit(if pin.value != 0 { var } else { -var }));
        }

        for row in 0..self.length {
            for col in 0..self.length {
                let current = self.variable_manager.current(row, col)?;
                let next = self.variable_manager.next(row, col)?;

                if is_border(self.length, row, col) {
                    clauses.push(Clause::unit(-current));
                    clauses.push(Clause::unit(-next));
                    continue;
                }

                if !activations.contains(row * self.length + col) {
                    clauses.push(Clause::unit(-current));
                }

                clauses.extend(self.transition_clauses(row, col, current, next)?);
            }
        }

        log::debug!(
            "generated {} clauses over {} variables for round {}",
            clauses.len(),
            self.variable_manager.variable_count(),
            round.number()
        );
        Ok(clauses)
    }

    /// One clause set per assignment of the neighborhood with exactly `k`
    /// live cells: the clause is satisfied unless the neighborhood matches
    /// the assignment, in which case it forces the outcome for `k`.
    fn transition_clauses(
        &mut self,
        row: usize,
        col: usize,
        current: i32,
        next: i32,
    ) -> Result<Vec<Clause>> {
        let neighbors = self.neighbor_variables(row, col)?;
        let mut clauses = Vec::new();

        for k in 0..=neighbors.len() {
            for alive in (0..neighbors.len()).combinations(k) {
                let antecedent: Vec<i32> = neighbors
                    .iter()
                    .enumerate()
                    .map(|(i, &var)| if alive.contains(&i) { -var } else { var })
                    .collect();

                let with = |extra: &[i32]| {
                    let mut literals = antecedent.clone();
                    literals.extend_from_slice(extra);
                    Clause::new(literals)
                };

                match k {
                    2 => {
                        clauses.push(with(&[-current, next]));
                        clauses.push(with(&[current, -next]));
                    }
                    3 => clauses.push(with(&[next])),
                    _ => clauses.push(with(&[-next])),
                }
            }
        }

        Ok(clauses)
    }

    fn neighbor_variables(&mut self, row: usize, col: usize) -> Result<Vec<i32>> {
        let mut neighbors = Vec::with_capacity(8);
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                if r != row || c != col {
                    neighbors.push(self.variable_manager.current(r, c)?);
                }
            }
        }
        Ok(neighbors)
    }

    pub fn variable_manager(&self) -> &VariableManager {
        &self.variable_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActivationSet;

    #[test]
    fn test_clause_creation() {
        let clause = Clause::new(vec![1, -2, 3]);
        assert_eq!(clause.literals, vec![1, -2, 3]);
        assert!(!clause.is_empty());
        assert!(!clause.is_unit());

        let unit_clause = Clause::unit(5);
        assert!(unit_clause.is_unit());
        assert_eq!(Clause::binary(1, -1).literals, vec![1, -1]);
    }

    #[test]
    fn test_border_only_board() {
        // Every cell of a 2x2 board is on the border
        let mut generator = ClauseGenerator::new(2);
        let clauses = generator
            .generate(&Round::initial(ActivationSet::new(2)))
            .unwrap();

        assert_eq!(clauses.len(), 8);
        assert!(clauses.iter().all(|c| c.is_unit() && c.literals[0] < 0));
    }

    #[test]
    fn test_clause_count_per_interior_cell() {
        // 3x3 board: one interior cell, closed by default
        let mut generator = ClauseGenerator::new(3);
        let clauses = generator
            .generate(&Round::initial(ActivationSet::new(3)))
            .unwrap();

        // 8 border cells x 2 units, 1 closure unit, and 2^8 neighborhood
        // assignments with the 28 two-neighbor ones producing two clauses
        assert_eq!(clauses.len(), 16 + 1 + 256 + 28);
    }

    #[test]
    fn test_pins_become_units() {
        let mut activations = ActivationSet::new(5);
        activations.activate(2, 2).unwrap();

        let mut generator = ClauseGenerator::new(5);
        let clauses = generator.generate(&Round::initial(activations)).unwrap();
        let var = generator
            .variable_manager()
            .lookup(2, 2, Generation::Current)
            .unwrap();

        assert!(clauses.contains(&Clause::unit(var)));
        assert!(!clauses.contains(&Clause::unit(-var)));
    }
}
