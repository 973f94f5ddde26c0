//! Configuration settings for the constraint-based Game of Life runner

use crate::csp::{SearchOptions, ValueSelection, VariableSelection};
use crate::error::LifeError;
use crate::game_of_life::checked_cell_count;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub board: BoardConfig,
    pub simulation: SimulationConfig,
    pub solver: SolverConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Side length L of the square board
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of generations to compute
    pub rounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    #[serde(default)]
    pub variable_selection: VariableSelection,
    #[serde(default)]
    pub value_selection: ValueSelection,
    /// Search nodes allowed per round; `None` means unbounded
    #[serde(default = "default_node_limit")]
    pub node_limit: Option<u64>,
}

fn default_node_limit() -> Option<u64> {
    Some(1_000_000)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Built-in propagate-and-search engine
    Propagation,
    /// CNF encoding solved by CaDiCaL
    Cadical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Board token file; stdin is read when absent
    pub board_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Where run reports are written, if anywhere
    pub directory: Option<PathBuf>,
    /// Also print the solved `current` grid of every round
    pub show_current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { length: 5 }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { rounds: 1 }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Propagation,
            variable_selection: VariableSelection::MaxRangeMaxValue,
            value_selection: ValueSelection::Max,
            node_limit: default_node_limit(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            directory: None,
            show_current: false,
        }
    }
}

impl SolverConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            node_limit: self.node_limit,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        checked_cell_count(self.board.length)?;

        if self.solver.node_limit == Some(0) {
            return Err(LifeError::InvalidConfiguration(
                "node limit must be positive when set".to_string(),
            )
            .into());
        }

        if let Some(ref board_file) = self.input.board_file {
            if !board_file.exists() {
                anyhow::bail!("Board file does not exist: {}", board_file.display());
            }
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(length) = cli_overrides.length {
            self.board.length = length;
        }
        if let Some(rounds) = cli_overrides.rounds {
            self.simulation.rounds = rounds;
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(node_limit) = cli_overrides.node_limit {
            self.solver.node_limit = Some(node_limit);
        }
        if let Some(ref board_file) = cli_overrides.board_file {
            self.input.board_file = Some(board_file.clone());
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.directory = Some(output_dir.clone());
        }
        if cli_overrides.show_current {
            self.output.show_current = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub length: Option<usize>,
    pub rounds: Option<usize>,
    pub backend: Option<SolverBackend>,
    pub node_limit: Option<u64>,
    pub board_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
    pub show_current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.board.length, 5);
        assert_eq!(settings.solver.backend, SolverBackend::Propagation);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut settings = Settings::default();
        settings.board.length = 0;

        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifeError>(),
            Some(LifeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            length: Some(usize::MAX),
            ..CliOverrides::default()
        });

        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifeError>(),
            Some(LifeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_missing_board_file_rejected() {
        let mut settings = Settings::default();
        settings.input.board_file = Some(PathBuf::from("/nonexistent/board.txt"));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/settings.yaml");

        let mut settings = Settings::default();
        settings.board.length = 8;
        settings.solver.backend = SolverBackend::Cadical;
        settings.solver.value_selection = ValueSelection::Min;
        settings.to_file(&path).unwrap();

        assert_eq!(Settings::from_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "board:\n  length: 6\nsimulation:\n  rounds: 3\nsolver:\n  backend: cadical\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(settings.board.length, 6);
        assert_eq!(settings.simulation.rounds, 3);
        assert_eq!(settings.solver.backend, SolverBackend::Cadical);
        assert_eq!(
            settings.solver.variable_selection,
            VariableSelection::MaxRangeMaxValue
        );
        assert_eq!(settings.solver.node_limit, Some(1_000_000));
        assert_eq!(settings.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_explicit_null_node_limit_is_unbounded() {
        let yaml = "board:\n  length: 5\nsimulation:\n  rounds: 1\nsolver:\n  backend: propagation\n  node_limit: null\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.solver.node_limit, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            length: Some(7),
            rounds: Some(0),
            backend: Some(SolverBackend::Cadical),
            format: Some(OutputFormat::Json),
            show_current: true,
            ..CliOverrides::default()
        });

        assert_eq!(settings.board.length, 7);
        assert_eq!(settings.simulation.rounds, 0);
        assert_eq!(settings.solver.backend, SolverBackend::Cadical);
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert!(settings.output.show_current);
        assert_eq!(settings.solver.node_limit, Some(1_000_000));
    }
}
