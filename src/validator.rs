//! Cross-checks a run against direct evaluation of the rules

use crate::game_of_life::{GameOfLifeRules, Grid};
use crate::model::{Generation, RoundResult, RunReport};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Which property a violation breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// `next` differs from the rule applied to `current`
    Transition,
    /// A border cell is alive
    Border,
    /// Round 1 `current` differs from the input activations
    Closure,
    /// Round k+1 `current` differs from round k `next`
    Chain,
}

/// Represents a rule violation found during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub round: usize,
    pub generation: Generation,
    pub cell_position: (usize, usize),
    pub kind: ViolationKind,
    pub expected_state: bool,
    pub actual_state: bool,
    pub neighbor_count: Option<u8>,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |alive: bool| if alive { "alive" } else { "dead" };
        write!(
            f,
            "round {} {} cell ({}, {}) should be {} but is {} ({:?}",
            self.round,
            self.generation,
            self.cell_position.0,
            self.cell_position.1,
            state(self.expected_state),
            state(self.actual_state),
            self.kind
        )?;
        if let Some(count) = self.neighbor_count {
            write!(f, ", neighbors: {}", count)?;
        }
        write!(f, ")")
    }
}

/// Result of validating a run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub rounds_checked: usize,
    pub cells_checked: usize,
    pub violations: Vec<RuleViolation>,
    pub validation_time_ms: u64,
}

impl ValidationResult {
    /// Short description of what went wrong, `None` for a valid run
    pub fn error_message(&self) -> Option<String> {
        if self.is_valid {
            return None;
        }

        let mut message = format!("Found {} rule violations. ", self.violations.len());
        for (i, violation) in self.violations.iter().take(3).enumerate() {
            if i == 0 {
                message.push_str("Examples: ");
            }
            message.push_str(&format!("{}; ", violation));
        }
        if self.violations.len() > 3 {
            message.push_str(&format!("... and {} more", self.violations.len() - 3));
        }
        Some(message)
    }
}

/// Replays the rounds of a report with [`GameOfLifeRules`]
pub struct RoundValidator;

impl RoundValidator {
    pub fn validate(report: &RunReport) -> ValidationResult {
        let start_time = Instant::now();
        let mut violations = Vec::new();
        let mut cells_checked = 0;

        let expected_first = GameOfLifeRules::clear_border(&report.initial);
        let mut expected_current = &expected_first;
        for result in &report.rounds {
            let kind = if result.round == 1 {
                ViolationKind::Closure
            } else {
                ViolationKind::Chain
            };
            Self::compare(
                result.round,
                Generation::Current,
                kind,
                expected_current,
                &result.current,
                &mut violations,
            );
            Self::check_round(result, &mut violations);
            cells_checked += 2 * result.current.cells.len();
            expected_current = &result.next;
        }

        log::debug!(
            "validated {} rounds, {} violations",
            report.rounds.len(),
            violations.len()
        );

        ValidationResult {
            is_valid: violations.is_empty(),
            rounds_checked: report.rounds.len(),
            cells_checked,
            violations,
            validation_time_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Border and transition checks of a single round
    fn check_round(result: &RoundResult, violations: &mut Vec<RuleViolation>) {
        let current = &result.current;
        let next = &result.next;

        for row in 0..current.length {
            for col in 0..current.length {
                if current.is_border(row, col) {
                    for (generation, grid) in [(Generation::Current, current), (Generation::Next, next)] {
                        if grid.get(row, col) {
                            violations.push(RuleViolation {
                                round: result.round,
                                generation,
                                cell_position: (row, col),
                                kind: ViolationKind::Border,
                                expected_state: false,
                                actual_state: true,
                                neighbor_count: None,
                            });
                        }
                    }
                    continue;
                }

                let neighbor_count = current.count_neighbors(row, col);
                let expected = GameOfLifeRules::should_be_alive(current.get(row, col), neighbor_count);
                let actual = next.get(row, col);
                if expected != actual {
                    violations.push(RuleViolation {
                        round: result.round,
                        generation: Generation::Next,
                        cell_position: (row, col),
                        kind: ViolationKind::Transition,
                        expected_state: expected,
                        actual_state: actual,
                        neighbor_count: Some(neighbor_count),
                    });
                }
            }
        }
    }

    fn compare(
        round: usize,
        generation: Generation,
        kind: ViolationKind,
        expected: &Grid,
        actual: &Grid,
        violations: &mut Vec<RuleViolation>,
    ) {
        for row in 0..actual.length {
            for col in 0..actual.length {
                if actual.is_border(row, col) {
                    continue;
                }
                let (want, got) = (expected.get(row, col), actual.get(row, col));
                if want != got {
                    violations.push(RuleViolation {
                        round,
                        generation,
                        cell_position: (row, col),
                        kind,
                        expected_state: want,
                        actual_state: got,
                        neighbor_count: None,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SolverBackend, SolverConfig};
    use crate::model::{ActivationSet, Simulation};

    fn glider_report(backend: SolverBackend) -> RunReport {
        let mut activations = ActivationSet::new(8);
        for (row, col) in [(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)] {
            activations.activate(row, col).unwrap();
        }
        Simulation::new(SolverConfig {
            backend,
            ..SolverConfig::default()
        })
        .run_strict(activations, 4)
        .unwrap()
    }

    #[test]
    fn test_solved_runs_are_valid() {
        for backend in [SolverBackend::Propagation, SolverBackend::Cadical] {
            let result = RoundValidator::validate(&glider_report(backend));
            assert!(result.is_valid, "{:?}", result.error_message());
            assert_eq!(result.rounds_checked, 4);
            assert_eq!(result.cells_checked, 4 * 2 * 64);
            assert_eq!(result.error_message(), None);
        }
    }

    #[test]
    fn test_detects_transition_violation() {
        let mut report = glider_report(SolverBackend::Propagation);
        let alive = report.rounds[1].next.get(4, 4);
        report.rounds[1].next.set(4, 4, !alive).unwrap();

        let result = RoundValidator::validate(&report);
        assert!(!result.is_valid);
        assert!(result.violations.iter().any(|v| v.kind == ViolationKind::Transition
            && v.round == 2
            && v.cell_position == (4, 4)));
        // The tampered grid no longer matches round 3's current either
        assert!(result
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::Chain && v.round == 3));
        assert!(result.error_message().unwrap().starts_with("Found"));
    }

    #[test]
    fn test_detects_border_violation() {
        let mut report = glider_report(SolverBackend::Cadical);
        report.rounds[0].current.set(0, 5, true).unwrap();

        let result = RoundValidator::validate(&report);
        let border: Vec<_> = result
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::Border)
            .collect();
        assert_eq!(border.len(), 1);
        assert_eq!(border[0].generation, Generation::Current);
    }

    #[test]
    fn test_detects_closure_violation() {
        let mut report = glider_report(SolverBackend::Propagation);
        report.initial.set(5, 5, true).unwrap();

        let result = RoundValidator::validate(&report);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::Closure);
    }
}
