//! Game of Life computed by constraint satisfaction
//!
//! Each generation step is posted as a constraint model over {0,1} cell
//! variables and solved either by the built-in propagate-and-search engine
//! or by a CNF encoding handed to CaDiCaL. Solved generations are chained
//! round after round.

pub mod config;
pub mod csp;
pub mod error;
pub mod game_of_life;
pub mod model;
pub mod sat;
pub mod utils;
pub mod validator;

pub use config::Settings;
pub use error::{LifeError, Result};
pub use model::{ActivationSet, RunOutcome, RunReport, Simulation};

use game_of_life::Grid;

/// Run the configured number of rounds starting from `initial`
pub fn simulate(settings: &Settings, initial: &Grid) -> Result<RunReport> {
    if initial.length != settings.board.length {
        return Err(LifeError::InvalidConfiguration(format!(
            "board has length {}, settings expect {}",
            initial.length, settings.board.length
        )));
    }

    let activations = ActivationSet::from_grid(initial)?;
    Simulation::new(settings.solver).run(activations, settings.simulation.rounds)
}
