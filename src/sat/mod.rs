//! CNF encoding of a round, solved with CaDiCaL

pub mod constraints;
pub mod solver;
pub mod variables;

pub use constraints::{Clause, ClauseGenerator};
pub use solver::{SatSolver, SolverSolution};
pub use variables::{CellKey, VariableManager};
