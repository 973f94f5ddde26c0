//! Variable store: domains, posted constraints, branchers and propagation

use super::expr::{Formula, Truth};
use super::search::{Brancher, Decision, ValueSelection, VariableSelection};
use super::variables::{Domain, DomainId, EmptyDomain};
use std::collections::VecDeque;
use std::sync::Arc;

/// Outcome of a failed propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// Some variable was left without values
    EmptyDomain,
    /// A constraint is violated by the current assignment
    Conflict,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

/// Holds the domains of every variable together with the constraints over
/// them. Constraint and brancher lists are shared between clones and only
/// copied when a clone posts something new, so cloning a store for a search
/// branch costs one domain vector.
#[derive(Debug, Clone, Default)]
pub struct Store {
    domains: Vec<Domain>,
    constraints: Arc<Vec<Formula>>,
    watches: Arc<Vec<Vec<usize>>>,
    branchers: Arc<Vec<Brancher>>,
    pending: Vec<usize>,
    failed: bool,
    propagations: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an integer variable with domain `[min, max]`
    pub fn new_int_var(&mut self, min: i32, max: i32) -> DomainId {
        let id = DomainId(self.domains.len());
        self.domains.push(Domain::new(min, max));
        Arc::make_mut(&mut self.watches).push(Vec::new());
        id
    }

    /// Declare `count` variables sharing the domain `[min, max]`
    pub fn new_int_var_array(&mut self, count: usize, min: i32, max: i32) -> Vec<DomainId> {
        (0..count).map(|_| self.new_int_var(min, max)).collect()
    }

    /// Post a constraint. It is propagated on the next call to
    /// [`propagate`](Self::propagate); a formula that is already false under
    /// the current domains fails the store right away.
    pub fn post(&mut self, formula: Formula) -> Result<(), Inconsistency> {
        if self.failed {
            return Err(Inconsistency::Conflict);
        }
        if formula.truth(&self.domains) == Truth::False {
            self.failed = true;
            return Err(Inconsistency::Conflict);
        }

        let index = self.constraints.len();
        let watches = Arc::make_mut(&mut self.watches);
        for var in formula.variables() {
            watches[var.0].push(index);
        }
        Arc::make_mut(&mut self.constraints).push(formula);
        self.pending.push(index);
        Ok(())
    }

    /// Register a brancher. Branchers are consulted in posting order.
    pub fn branch(
        &mut self,
        vars: Vec<DomainId>,
        variable_selection: VariableSelection,
        value_selection: ValueSelection,
    ) {
        Arc::make_mut(&mut self.branchers).push(Brancher {
            vars,
            variable_selection,
            value_selection,
        });
    }

    /// Run every queued constraint until no domain changes any more
    pub fn propagate(&mut self) -> Result<(), Inconsistency> {
        if self.failed {
            return Err(Inconsistency::Conflict);
        }

        let constraints = Arc::clone(&self.constraints);
        let watches = Arc::clone(&self.watches);
        let mut queued = vec![false; constraints.len()];
        let mut queue = VecDeque::with_capacity(self.pending.len());
        for index in self.pending.drain(..) {
            if !queued[index] {
                queued[index] = true;
                queue.push_back(index);
            }
        }

        let mut changed = Vec::new();
        while let Some(index) = queue.pop_front() {
            queued[index] = false;
            self.propagations += 1;
            changed.clear();

            if let Err(failure) = constraints[index].enforce(true, &mut self.domains, &mut changed) {
                self.failed = true;
                return Err(failure);
            }

            for var in changed.iter() {
                for &watcher in &watches[var.0] {
                    if !queued[watcher] {
                        queued[watcher] = true;
                        queue.push_back(watcher);
                    }
                }
            }
        }
        Ok(())
    }

    /// Pick the next branching decision, or `None` when every brancher
    /// has assigned all of its variables
    pub fn decision(&self) -> Option<Decision> {
        self.branchers
            .iter()
            .find_map(|brancher| brancher.choose(&self.domains))
    }

    /// Apply the left alternative of a decision
    pub fn commit(&mut self, decision: Decision) -> Result<(), Inconsistency> {
        self.narrow(decision.var, |d| d.assign(decision.value as i64))
    }

    /// Apply the right alternative of a decision
    pub fn refute(&mut self, decision: Decision) -> Result<(), Inconsistency> {
        let value = decision.value as i64;
        match decision.selection {
            ValueSelection::Max => self.narrow(decision.var, |d| d.tighten_max(value - 1)),
            ValueSelection::Min => self.narrow(decision.var, |d| d.tighten_min(value + 1)),
        }
    }

    fn narrow<F>(&mut self, var: DomainId, update: F) -> Result<(), Inconsistency>
    where
        F: FnOnce(&mut Domain) -> Result<bool, EmptyDomain>,
    {
        match update(&mut self.domains[var.0]) {
            Ok(true) => {
                self.pending.extend(self.watches[var.0].iter().copied());
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(empty) => {
                self.failed = true;
                Err(empty.into())
            }
        }
    }

    pub fn domain(&self, var: DomainId) -> Domain {
        self.domains[var.0]
    }

    /// Assigned value of `var`, `None` while it is still open
    pub fn value(&self, var: DomainId) -> Option<i32> {
        self.domains[var.0].value()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraint executions performed by this store and its ancestors
    pub fn propagations(&self) -> u64 {
        self.propagations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::LinExpr;

    #[test]
    fn test_variable_declaration() {
        let mut store = Store::new();
        let x = store.new_int_var(0, 1);
        let ys = store.new_int_var_array(3, 0, 1);
        assert_eq!(x.index(), 0);
        assert_eq!(ys.len(), 3);
        assert_eq!(store.variable_count(), 4);
        assert_eq!(store.value(x), None);
    }

    #[test]
    fn test_propagation_chain() {
        let mut store = Store::new();
        let vars = store.new_int_var_array(4, 0, 1);
        for pair in vars.windows(2) {
            store.post(LinExpr::var(pair[1]).equals(pair[0])).unwrap();
        }
        store.post(LinExpr::var(vars[0]).equals(1)).unwrap();
        store.propagate().unwrap();

        assert!(vars.iter().all(|&v| store.value(v) == Some(1)));
    }

    #[test]
    fn test_post_refuted_formula_fails_store() {
        let mut store = Store::new();
        let x = store.new_int_var(0, 1);
        store.post(LinExpr::var(x).equals(1)).unwrap();
        store.propagate().unwrap();

        assert_eq!(
            store.post(LinExpr::var(x).equals(0)),
            Err(Inconsistency::Conflict)
        );
        assert!(store.is_failed());
        assert!(store.propagate().is_err());
    }

    #[test]
    fn test_conflict_during_propagation() {
        let mut store = Store::new();
        let x = store.new_int_var(0, 1);
        let y = store.new_int_var(0, 1);
        store.post(LinExpr::var(x).equals(y)).unwrap();
        store.post(LinExpr::var(x).differs(y)).unwrap();
        store.post(LinExpr::var(x).equals(1)).unwrap();

        assert!(store.propagate().is_err());
    }

    #[test]
    fn test_clone_shares_constraints_until_post() {
        let mut store = Store::new();
        let x = store.new_int_var(0, 1);
        store.post(LinExpr::var(x).at_most(1)).unwrap();

        let mut derived = store.clone();
        derived.post(LinExpr::var(x).equals(0)).unwrap();
        assert_eq!(store.constraint_count(), 1);
        assert_eq!(derived.constraint_count(), 2);

        derived.propagate().unwrap();
        assert_eq!(derived.value(x), Some(0));
        assert_eq!(store.value(x), None);
    }
}
