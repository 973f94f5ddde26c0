//! Direct evaluation of the Game of Life rules
//!
//! This is the reference the constraint models are checked against. The
//! universe is bounded: border cells never come alive.

use super::Grid;
use rayon::prelude::*;

/// Neighbor-count case of the transition rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Fewer than two neighbors: the cell dies or stays dead
    Underpopulation,
    /// Exactly two neighbors: the cell keeps its state
    Stasis,
    /// Exactly three neighbors: birth or survival
    Birth,
    /// More than three neighbors: the cell dies
    Overpopulation,
}

impl Transition {
    pub fn classify(neighbor_count: u8) -> Self {
        match neighbor_count {
            0 | 1 => Transition::Underpopulation,
            2 => Transition::Stasis,
            3 => Transition::Birth,
            _ => Transition::Overpopulation,
        }
    }

    /// Next state of a cell in this case
    pub fn apply(self, current_state: bool) -> bool {
        match self {
            Transition::Underpopulation | Transition::Overpopulation => false,
            Transition::Stasis => current_state,
            Transition::Birth => true,
        }
    }
}

/// Game of Life rules engine
pub struct GameOfLifeRules;

impl GameOfLifeRules {
    /// Evolve the grid one generation forward
    pub fn evolve(current: &Grid) -> Grid {
        let length = current.length;

        let cells: Vec<bool> = (0..length)
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..length).map(move |col| {
                    if current.is_border(row, col) {
                        return false;
                    }
                    let neighbors = current.count_neighbors(row, col);
                    Self::should_be_alive(current.get(row, col), neighbors)
                })
            })
            .collect();

        Grid { length, cells }
    }

    /// Evolve the grid for multiple generations
    pub fn evolve_generations(mut grid: Grid, generations: usize) -> Grid {
        for _ in 0..generations {
            grid = Self::evolve(&grid);
        }
        grid
    }

    /// Next state of an interior cell given its state and neighbor count
    pub fn should_be_alive(current_state: bool, neighbor_count: u8) -> bool {
        Transition::classify(neighbor_count).apply(current_state)
    }

    /// Copy of `grid` with every border cell cleared
    pub fn clear_border(grid: &Grid) -> Grid {
        let mut cleared = grid.clone();
        for row in 0..grid.length {
            for col in 0..grid.length {
                if grid.is_border(row, col) {
                    let idx = grid.index(row, col);
                    cleared.cells[idx] = false;
                }
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_cells(
            rows.iter()
                .map(|r| r.chars().map(|c| c == '1').collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_still_life_block() {
        let block = grid(&["0000", "0110", "0110", "0000"]);
        assert_eq!(GameOfLifeRules::evolve(&block), block);
    }

    #[test]
    fn test_oscillator_blinker() {
        let horizontal = grid(&["00000", "00000", "01110", "00000", "00000"]);
        let vertical = grid(&["00000", "00100", "00100", "00100", "00000"]);

        let evolved = GameOfLifeRules::evolve(&horizontal);
        assert_eq!(evolved, vertical);
        assert_eq!(GameOfLifeRules::evolve(&evolved), horizontal);
    }

    #[test]
    fn test_border_never_comes_alive() {
        // Three live cells along the inner ring would give birth on the
        // border in an unbounded universe
        let g = grid(&["00000", "01110", "00000", "00000", "00000"]);
        let next = GameOfLifeRules::evolve(&g);
        assert!(!next.get(0, 2));
        assert!(next.get(1, 2));
        assert!(next.get(2, 2));
    }

    #[test]
    fn test_rule_logic() {
        assert!(GameOfLifeRules::should_be_alive(true, 2));
        assert!(GameOfLifeRules::should_be_alive(true, 3));
        assert!(GameOfLifeRules::should_be_alive(false, 3));
        assert!(!GameOfLifeRules::should_be_alive(true, 1));
        assert!(!GameOfLifeRules::should_be_alive(true, 4));
        assert!(!GameOfLifeRules::should_be_alive(false, 2));
    }

    #[test]
    fn test_transition_classification() {
        assert_eq!(Transition::classify(0), Transition::Underpopulation);
        assert_eq!(Transition::classify(1), Transition::Underpopulation);
        assert_eq!(Transition::classify(2), Transition::Stasis);
        assert_eq!(Transition::classify(3), Transition::Birth);
        assert_eq!(Transition::classify(8), Transition::Overpopulation);
        assert!(Transition::Stasis.apply(true));
        assert!(!Transition::Stasis.apply(false));
    }

    #[test]
    fn test_clear_border() {
        let g = grid(&["111", "111", "111"]);
        let cleared = GameOfLifeRules::clear_border(&g);
        assert_eq!(cleared.living_count(), 1);
        assert!(cleared.get(1, 1));
    }
}
