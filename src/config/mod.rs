//! Configuration management for the Game of Life runner

pub mod settings;

pub use settings::{
    BoardConfig, CliOverrides, InputConfig, OutputConfig, OutputFormat, Settings,
    SimulationConfig, SolverBackend, SolverConfig,
};
