//! Branching heuristics and depth-first search

use super::store::Store;
use super::variables::{Domain, DomainId};
use crate::error::{LifeError, Result};
use serde::{Deserialize, Serialize};

/// Which open variable a brancher picks next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableSelection {
    /// Largest remaining domain, ties broken by the largest permissible
    /// value, then by position in the brancher
    #[default]
    MaxRangeMaxValue,
    /// First open variable in brancher order
    FirstUnassigned,
}

/// Which value of the chosen variable is tried first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueSelection {
    #[default]
    Max,
    Min,
}

/// Binary choice point: `var == value` on the left, `var != value` on the right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub var: DomainId,
    pub value: i32,
    pub selection: ValueSelection,
}

/// Branching strategy over a fixed list of variables
#[derive(Debug, Clone)]
pub struct Brancher {
    pub vars: Vec<DomainId>,
    pub variable_selection: VariableSelection,
    pub value_selection: ValueSelection,
}

impl Brancher {
    pub(crate) fn choose(&self, domains: &[Domain]) -> Option<Decision> {
        let open = self
            .vars
            .iter()
            .copied()
            .filter(|v| !domains[v.0].is_assigned());

        let var = match self.variable_selection {
            VariableSelection::FirstUnassigned => open.into_iter().next()?,
            VariableSelection::MaxRangeMaxValue => {
                let mut best: Option<(u64, i32, DomainId)> = None;
                for v in open {
                    let d = &domains[v.0];
                    let better = match best {
                        None => true,
                        Some((size, max, _)) => (d.size(), d.max()) > (size, max),
                    };
                    if better {
                        best = Some((d.size(), d.max(), v));
                    }
                }
                best?.2
            }
        };

        let domain = &domains[var.0];
        let value = match self.value_selection {
            ValueSelection::Max => domain.max(),
            ValueSelection::Min => domain.min(),
        };
        Some(Decision {
            var,
            value,
            selection: self.value_selection,
        })
    }
}

/// A model that search can explore. Cloning a space yields the derived
/// copy used for the alternative branch of a decision.
pub trait Space: Clone {
    fn store(&self) -> &Store;
    fn store_mut(&mut self) -> &mut Store;
}

impl Space for Store {
    fn store(&self) -> &Store {
        self
    }

    fn store_mut(&mut self) -> &mut Store {
        self
    }
}

/// Limits for a search run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Give up after this many nodes; `None` means unbounded
    pub node_limit: Option<u64>,
}

/// Counters collected while searching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub nodes: u64,
    pub failures: u64,
    pub solutions: u64,
    pub propagations: u64,
}

/// Depth-first enumeration of solutions, pulled one at a time with
/// [`next`](DepthFirstSearch::next)
pub struct DepthFirstSearch<S: Space> {
    stack: Vec<S>,
    options: SearchOptions,
    statistics: SearchStatistics,
}

impl<S: Space> DepthFirstSearch<S> {
    pub fn new(root: S, options: SearchOptions) -> Self {
        Self {
            stack: vec![root],
            options,
            statistics: SearchStatistics::default(),
        }
    }

    /// Next solution, `Ok(None)` once the search space is exhausted
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<S>> {
        while let Some(mut space) = self.stack.pop() {
            self.statistics.nodes += 1;
            if let Some(limit) = self.options.node_limit {
                if self.statistics.nodes > limit {
                    return Err(LifeError::SearchLimitExceeded { nodes: limit });
                }
            }

            let before = space.store().propagations();
            let status = space.store_mut().propagate();
            self.statistics.propagations += space.store().propagations() - before;
            if status.is_err() {
                self.statistics.failures += 1;
                continue;
            }

            let Some(decision) = space.store().decision() else {
                self.statistics.solutions += 1;
                log::trace!("solution found after {} nodes", self.statistics.nodes);
                return Ok(Some(space));
            };

            let mut right = space.clone();
            if right.store_mut().refute(decision).is_ok() {
                self.stack.push(right);
            } else {
                self.statistics.failures += 1;
            }
            if space.store_mut().commit(decision).is_ok() {
                self.stack.push(space);
            } else {
                self.statistics.failures += 1;
            }
        }
        Ok(None)
    }

    pub fn statistics(&self) -> SearchStatistics {
        self.statistics
    }
}
