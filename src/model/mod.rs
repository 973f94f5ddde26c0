//! A Game of Life generation step as a constraint model
//!
//! Each round owns a [`BoardModel`] with a `current` and a `next` grid of
//! {0,1} variables. The [`ActivationSet`] fixes `current`, the
//! [`ConstraintPoster`] encodes the transition rule, and the
//! [`SearchDriver`] solves the round. [`Simulation`] chains rounds by
//! feeding each solved `next` grid into the following round.

pub mod activation;
pub mod board;
pub mod poster;
pub mod round;

pub use activation::{ActivationSet, Pin};
pub use board::{BoardModel, Generation};
pub use poster::ConstraintPoster;
pub use round::{Round, RoundResult, RoundStatistics, RunOutcome, RunReport, SearchDriver, Simulation};
