//! Driving rounds to a solution and chaining them into a run

use super::activation::ActivationSet;
use super::board::{BoardModel, Generation};
use super::poster::ConstraintPoster;
use crate::config::{SolverBackend, SolverConfig};
use crate::csp::{DepthFirstSearch, Space};
use crate::error::{LifeError, Result};
use crate::game_of_life::{checked_cell_count, Grid};
use crate::sat::{ClauseGenerator, SatSolver};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One generation step: the activation set of its `current` grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    number: usize,
    activations: ActivationSet,
}

impl Round {
    /// First round, built from input activations
    pub fn initial(activations: ActivationSet) -> Self {
        Self {
            number: 1,
            activations,
        }
    }

    /// Round `number`, whose `current` interior copies `prior_next`
    pub fn chained(number: usize, prior_next: &Grid) -> Result<Self> {
        let mut activations = ActivationSet::new(prior_next.length);
        activations.activate_from_previous(prior_next)?;
        Ok(Self {
            number,
            activations,
        })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn length(&self) -> usize {
        self.activations.length()
    }

    pub fn activations(&self) -> &ActivationSet {
        &self.activations
    }
}

/// Work done by the backend for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStatistics {
    pub backend: SolverBackend,
    pub variables: usize,
    /// Posted constraints, or clauses for the SAT backend
    pub constraints: usize,
    pub nodes: u64,
    pub failures: u64,
    pub propagations: u64,
    pub elapsed: Duration,
}

/// Solved grids of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: usize,
    pub current: Grid,
    pub next: Grid,
    pub statistics: RoundStatistics,
}

/// Solves single rounds with the configured backend
#[derive(Debug, Clone, Copy)]
pub struct SearchDriver {
    config: SolverConfig,
}

impl SearchDriver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// First solution of the round, `None` when it has none
    pub fn run_round(&self, round: &Round) -> Result<Option<RoundResult>> {
        checked_cell_count(round.length())?;

        let start = Instant::now();
        let result = match self.config.backend {
            SolverBackend::Propagation => self.run_propagation(round, start)?,
            SolverBackend::Cadical => self.run_cadical(round, start)?,
        };

        match &result {
            Some(solved) => log::debug!(
                "round {} solved in {:?} ({} nodes, {} propagations)",
                round.number(),
                solved.statistics.elapsed,
                solved.statistics.nodes,
                solved.statistics.propagations
            ),
            None => log::debug!("round {} has no solution", round.number()),
        }
        Ok(result)
    }

    fn run_propagation(&self, round: &Round, start: Instant) -> Result<Option<RoundResult>> {
        let mut model = BoardModel::new(round.length())?;
        match ConstraintPoster::post(&mut model, round.activations()) {
            Ok(()) => {}
            Err(LifeError::Inconsistent) => return Ok(None),
            Err(err) => return Err(err),
        }
        ConstraintPoster::post_branching(
            &mut model,
            self.config.variable_selection,
            self.config.value_selection,
        );

        let variables = model.store().variable_count();
        let constraints = model.store().constraint_count();

        let mut search = DepthFirstSearch::new(model, self.config.search_options());
        let solution = search.next()?;
        let stats = search.statistics();

        let Some(solution) = solution else {
            return Ok(None);
        };

        Ok(Some(RoundResult {
            round: round.number(),
            current: solution.solved_current()?,
            next: solution.solved_next()?,
            statistics: RoundStatistics {
                backend: SolverBackend::Propagation,
                variables,
                constraints,
                nodes: stats.nodes,
                failures: stats.failures,
                propagations: stats.propagations,
                elapsed: start.elapsed(),
            },
        }))
    }

    fn run_cadical(&self, round: &Round, start: Instant) -> Result<Option<RoundResult>> {
        let length = round.length();
        let mut generator = ClauseGenerator::new(length);
        let clauses = generator.generate(round)?;

        let mut solver = SatSolver::new();
        solver.add_clauses(&clauses)?;
        let Some(solution) = solver.solve()? else {
            return Ok(None);
        };

        let variables = generator.variable_manager();
        let mut current = Grid::new(length);
        let mut next = Grid::new(length);
        for row in 0..length {
            for col in 0..length {
                let index = row * length + col;
                let current_var = variables
                    .lookup(row, col, Generation::Current)
                    .ok_or(LifeError::Unassigned {
                        generation: "current",
                        index,
                    })?;
                let next_var = variables
                    .lookup(row, col, Generation::Next)
                    .ok_or(LifeError::Unassigned {
                        generation: "next",
                        index,
                    })?;
                current.cells[index] = solution.value(current_var);
                next.cells[index] = solution.value(next_var);
            }
        }

        Ok(Some(RoundResult {
            round: round.number(),
            current,
            next,
            statistics: RoundStatistics {
                backend: SolverBackend::Cadical,
                variables: solver.variable_count(),
                constraints: solver.clause_count(),
                nodes: 0,
                failures: 0,
                propagations: 0,
                elapsed: start.elapsed(),
            },
        }))
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    NoSolution { round: usize },
    /// The node cap fired before the round was decided
    SearchLimitExceeded { round: usize, nodes: u64 },
    /// The SAT backend failed on the round
    SolverFailed { round: usize, reason: String },
}

impl RunOutcome {
    /// Round at which the run stopped early, if it did
    pub fn stopped_at(&self) -> Option<usize> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::NoSolution { round }
            | RunOutcome::SearchLimitExceeded { round, .. }
            | RunOutcome::SolverFailed { round, .. } => Some(*round),
        }
    }

    /// Error equivalent of an early stop
    pub fn to_error(&self) -> Option<LifeError> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::NoSolution { round } => Some(LifeError::NoSolution { round: *round }),
            RunOutcome::SearchLimitExceeded { nodes, .. } => {
                Some(LifeError::SearchLimitExceeded { nodes: *nodes })
            }
            RunOutcome::SolverFailed { reason, .. } => Some(LifeError::Sat(reason.clone())),
        }
    }
}

/// Everything a run produced, in round order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub length: usize,
    pub requested_rounds: usize,
    pub initial: Grid,
    pub rounds: Vec<RoundResult>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// `next` grid of the last solved round
    pub fn final_grid(&self) -> Option<&Grid> {
        self.rounds.last().map(|r| &r.next)
    }

    pub fn total_elapsed(&self) -> Duration {
        self.rounds.iter().map(|r| r.statistics.elapsed).sum()
    }
}

/// Runs a sequence of chained rounds
pub struct Simulation {
    driver: SearchDriver,
}

impl Simulation {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            driver: SearchDriver::new(config),
        }
    }

    /// Compute `nb_rounds` generations starting from `initial`.
    ///
    /// A round without solution stops the run; the rounds solved before it
    /// are kept in the report.
    pub fn run(&self, initial: ActivationSet, nb_rounds: usize) -> Result<RunReport> {
        self.run_with(initial, nb_rounds, |round| self.driver.run_round(round))
    }

    /// Round loop over an arbitrary round solver. Solver failures that end
    /// the run early are recorded in the outcome so the rounds solved before
    /// them survive; any other error aborts the run.
    fn run_with<F>(
        &self,
        initial: ActivationSet,
        nb_rounds: usize,
        mut solve: F,
    ) -> Result<RunReport>
    where
        F: FnMut(&Round) -> Result<Option<RoundResult>>,
    {
        let length = initial.length();
        checked_cell_count(length)?;

        log::info!(
            "running {} rounds on a {}x{} board with {} activations",
            nb_rounds,
            length,
            length,
            initial.len()
        );

        let mut report = RunReport {
            length,
            requested_rounds: nb_rounds,
            initial: initial.to_grid(),
            rounds: Vec::with_capacity(nb_rounds),
            outcome: RunOutcome::Completed,
        };

        let mut round = Round::initial(initial);
        for number in 1..=nb_rounds {
            let result = match solve(&round) {
                Ok(Some(result)) => result,
                Ok(None) => {
                    log::warn!("no solution at round {}", number);
                    report.outcome = RunOutcome::NoSolution { round: number };
                    return Ok(report);
                }
                Err(LifeError::SearchLimitExceeded { nodes }) => {
                    log::warn!("round {} hit the search limit of {} nodes", number, nodes);
                    report.outcome = RunOutcome::SearchLimitExceeded {
                        round: number,
                        nodes,
                    };
                    return Ok(report);
                }
                Err(LifeError::Sat(reason)) => {
                    log::warn!("SAT solver failed at round {}: {}", number, reason);
                    report.outcome = RunOutcome::SolverFailed {
                        round: number,
                        reason,
                    };
                    return Ok(report);
                }
                Err(err) => return Err(err),
            };

            if number < nb_rounds {
                round = Round::chained(number + 1, &result.next)?;
            }
            report.rounds.push(result);
        }

        log::info!(
            "completed {} rounds in {:?}",
            report.rounds.len(),
            report.total_elapsed()
        );
        Ok(report)
    }

    /// Like [`run`](Self::run), but a round without solution is an error
    pub fn run_strict(&self, initial: ActivationSet, nb_rounds: usize) -> Result<RunReport> {
        let report = self.run(initial, nb_rounds)?;
        match report.outcome.to_error() {
            None => Ok(report),
            Some(err) => Err(err),
        }
    }
}
