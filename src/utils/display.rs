//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::game_of_life::Grid;
use crate::model::{RoundResult, RunOutcome, RunReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Header printed above every board
pub const BOARD_HEADER: &str = ">> [BOARD] <------";

/// Format boards and runs for display
pub struct BoardFormatter;

impl BoardFormatter {
    /// Board as rows of `0`/`1` tokens, `E` for a cell that is still open
    pub fn format_board_values(values: &[Option<u8>], length: usize) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(BOARD_HEADER);
        output.push('\n');

        for row in values.chunks(length.max(1)) {
            for value in row {
                match value {
                    Some(v) => output.push_str(&format!("{} ", v)),
                    None => output.push_str("E "),
                }
            }
            output.push('\n');
        }
        output
    }

    /// Fully assigned grid in the board format
    pub fn format_grid_values(grid: &Grid) -> String {
        let values: Vec<Option<u8>> = grid.values().into_iter().map(Some).collect();
        Self::format_board_values(&values, grid.length)
    }

    /// `Round k` followed by the solved `next` board
    pub fn format_round(result: &RoundResult, show_current: bool) -> String {
        let mut output = String::new();
        if show_current {
            output.push_str(&format!("\nRound {} (current)", result.round));
            output.push_str(&Self::format_grid_values(&result.current));
        }
        output.push_str(&format!("\nRound {}", result.round));
        output.push_str(&Self::format_grid_values(&result.next));
        output
    }

    /// Every round of a report, in the order they were solved
    pub fn format_run(report: &RunReport, show_current: bool) -> String {
        let mut output = String::new();
        for result in &report.rounds {
            output.push_str(&Self::format_round(result, show_current));
        }
        match &report.outcome {
            RunOutcome::Completed => {}
            RunOutcome::NoSolution { .. } => output.push_str("Not any solution found.\n"),
            RunOutcome::SearchLimitExceeded { round, nodes } => output.push_str(&format!(
                "Search limit of {} nodes reached at round {}.\n",
                nodes, round
            )),
            RunOutcome::SolverFailed { round, reason } => {
                output.push_str(&format!("Solver failed at round {}: {}\n", round, reason))
            }
        }
        output
    }

    /// Per-round statistics as a table
    pub fn format_run_summary(report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Run Summary ({}x{} board, {} of {} rounds):\n",
            report.length,
            report.length,
            report.rounds.len(),
            report.requested_rounds
        ));
        output.push_str("Round | Living | Vars  | Constr. | Nodes | Props   | Time(ms)\n");
        output.push_str("------|--------|-------|---------|-------|---------|---------\n");

        for result in &report.rounds {
            let stats = &result.statistics;
            output.push_str(&format!(
                "{:5} | {:6} | {:5} | {:7} | {:5} | {:7} | {:8.3}\n",
                result.round,
                result.next.living_count(),
                stats.variables,
                stats.constraints,
                stats.nodes,
                stats.propagations,
                stats.elapsed.as_secs_f64() * 1000.0
            ));
        }

        match &report.outcome {
            RunOutcome::Completed => output.push_str("Outcome: completed\n"),
            RunOutcome::NoSolution { round } => {
                output.push_str(&format!("Outcome: no solution at round {}\n", round))
            }
            RunOutcome::SearchLimitExceeded { round, nodes } => output.push_str(&format!(
                "Outcome: search limit ({} nodes) at round {}\n",
                nodes, round
            )),
            RunOutcome::SolverFailed { round, reason } => output.push_str(&format!(
                "Outcome: solver failed at round {} ({})\n",
                round, reason
            )),
        }
        output
    }

    /// Format a grid in compact form
    pub fn format_grid_compact(grid: &Grid) -> String {
        let mut output = String::new();
        for row in 0..grid.length {
            for col in 0..grid.length {
                output.push(if grid.get(row, col) { '█' } else { '·' });
            }
            output.push('\n');
        }
        output
    }

    /// Format a grid with coordinates
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for col in 0..grid.length {
            output.push_str(&format!("{:2}", col % 10));
        }
        output.push('\n');

        for row in 0..grid.length {
            output.push_str(&format!("{:2} ", row));
            for col in 0..grid.length {
                output.push_str(if grid.get(row, col) { "██" } else { "··" });
            }
            output.push('\n');
        }

        output
    }

    /// Write a report to `output_dir` and return the path of the file written
    pub fn save_report<P: AsRef<Path>>(
        report: &RunReport,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let (path, content) = match format {
            OutputFormat::Text => {
                let mut content = String::new();
                content.push_str("Initial board:\n");
                content.push_str(&Self::format_grid_with_coords(&report.initial));
                for result in &report.rounds {
                    content.push_str(&format!(
                        "\nRound {} (living: {}):\n",
                        result.round,
                        result.next.living_count()
                    ));
                    content.push_str(&Self::format_grid_with_coords(&result.next));
                }
                content.push('\n');
                content.push_str(&Self::format_run_summary(report));
                (output_dir.join("run_report.txt"), content)
            }
            OutputFormat::Json => {
                let content = serde_json::to_string_pretty(report)
                    .context("Failed to serialize run report")?;
                (output_dir.join("run_report.json"), content)
            }
        };

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(path)
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::model::{ActivationSet, Simulation};
    use tempfile::tempdir;

    fn blinker_report(rounds: usize) -> RunReport {
        let mut activations = ActivationSet::new(5);
        for col in 1..=3 {
            activations.activate(2, col).unwrap();
        }
        Simulation::new(SolverConfig::default())
            .run(activations, rounds)
            .unwrap()
    }

    #[test]
    fn test_board_values_format() {
        let values = vec![Some(0), Some(1), None, Some(0)];
        assert_eq!(
            BoardFormatter::format_board_values(&values, 2),
            "\n>> [BOARD] <------\n0 1 \nE 0 \n"
        );
    }

    #[test]
    fn test_round_format() {
        let report = blinker_report(1);
        let text = BoardFormatter::format_round(&report.rounds[0], false);
        assert_eq!(
            text,
            "\nRound 1\n>> [BOARD] <------\n\
             0 0 0 0 0 \n\
             0 0 1 0 0 \n\
             0 0 1 0 0 \n\
             0 0 1 0 0 \n\
             0 0 0 0 0 \n"
        );

        let with_current = BoardFormatter::format_round(&report.rounds[0], true);
        assert!(with_current.starts_with("\nRound 1 (current)\n>> [BOARD] <------\n"));
    }

    #[test]
    fn test_run_format_reports_failure() {
        let mut report = blinker_report(2);
        report.outcome = RunOutcome::NoSolution { round: 3 };

        let text = BoardFormatter::format_run(&report, false);
        assert_eq!(text.matches("Round ").count(), 2);
        assert!(text.ends_with("Not any solution found.\n"));
        assert!(BoardFormatter::format_run_summary(&report).contains("no solution at round 3"));
    }

    #[test]
    fn test_run_format_reports_search_limit() {
        let mut report = blinker_report(1);
        report.outcome = RunOutcome::SearchLimitExceeded { round: 2, nodes: 10 };

        let text = BoardFormatter::format_run(&report, false);
        assert!(text.contains("\nRound 1\n"));
        assert!(text.ends_with("Search limit of 10 nodes reached at round 2.\n"));
        assert!(BoardFormatter::format_run_summary(&report)
            .contains("search limit (10 nodes) at round 2"));
    }

    #[test]
    fn test_grid_formatting() {
        let grid = Grid::from_values(3, &[1, 0, 1, 0, 1, 0, 1, 0, 1]).unwrap();

        let compact = BoardFormatter::format_grid_compact(&grid);
        assert_eq!(compact, "█·█\n·█·\n█·█\n");

        let with_coords = BoardFormatter::format_grid_with_coords(&grid);
        assert!(with_coords.contains(" 0 1 2"));
    }

    #[test]
    fn test_save_report() {
        let report = blinker_report(2);
        let dir = tempdir().unwrap();

        let json_path = BoardFormatter::save_report(&report, dir.path(), OutputFormat::Json).unwrap();
        let loaded: RunReport =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(loaded, report);

        let text_path = BoardFormatter::save_report(&report, dir.path(), OutputFormat::Text).unwrap();
        let text = std::fs::read_to_string(text_path).unwrap();
        assert!(text.contains("Round 2 (living: 3)"));
        assert!(text.contains("Outcome: completed"));
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::success("OK").contains("OK"));
    }
}
