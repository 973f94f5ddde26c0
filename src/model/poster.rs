//! Posts the constraints of one round onto a board model

use super::activation::ActivationSet;
use super::board::BoardModel;
use crate::csp::{DomainId, Formula, LinExpr, Space, ValueSelection, VariableSelection};
use crate::error::{LifeError, Result};
use crate::game_of_life::is_border;

/// Builds the constraint system of a round
pub struct ConstraintPoster;

impl ConstraintPoster {
    /// Post activation pins, the border rule, the closure rule and the
    /// transition rule. A model that fails at the root while posting yields
    /// [`LifeError::Inconsistent`].
    pub fn post(model: &mut BoardModel, activations: &ActivationSet) -> Result<()> {
        let length = model.length();
        if activations.length() != length {
            return Err(LifeError::InvalidConfiguration(format!(
                "activation set has length {}, model has length {}",
                activations.length(),
                length
            )));
        }

        let mut posted = 0usize;
        for pin in activations.pins() {
            let var = model.current(pin.index / length, pin.index % length)?;
            Self::post_one(model, LinExpr::var(var).equals(i64::from(pin.value)))?;
            posted += 1;
        }

        for row in 0..length {
            for col in 0..length {
                let current = model.current(row, col)?;
                let next = model.next(row, col)?;

                if is_border(length, row, col) {
                    Self::post_one(model, LinExpr::var(current).equals(0))?;
                    Self::post_one(model, LinExpr::var(next).equals(0))?;
                    posted += 2;
                    continue;
                }

                if !activations.contains(row * length + col) {
                    Self::post_one(model, LinExpr::var(current).equals(0))?;
                    posted += 1;
                }

                let neighbors = LinExpr::sum(Self::neighborhood(model, row, col)?);
                let next = LinExpr::var(next);
                let rule = (neighbors.clone().less_than(2) & next.clone().equals(0))
                    ^ (neighbors.clone().equals(2) & next.clone().equals(current))
                    ^ (neighbors.clone().equals(3) & next.clone().equals(1))
                    ^ (neighbors.greater_than(3) & next.equals(0));
                Self::post_one(model, rule)?;
                posted += 1;
            }
        }

        log::debug!(
            "posted {} constraints on a {}x{} board ({} activations)",
            posted,
            length,
            length,
            activations.len()
        );
        Ok(())
    }

    /// Branch on `current` first, then on whatever is left open in `next`
    pub fn post_branching(
        model: &mut BoardModel,
        variable_selection: VariableSelection,
        value_selection: ValueSelection,
    ) {
        let current = model.current_vars().to_vec();
        let next = model.next_vars().to_vec();
        let store = model.store_mut();
        store.branch(current, variable_selection, value_selection);
        store.branch(next, variable_selection, value_selection);
    }

    fn post_one(model: &mut BoardModel, formula: Formula) -> Result<()> {
        model
            .store_mut()
            .post(formula)
            .map_err(|_| LifeError::Inconsistent)
    }

    /// The eight `current` cells around an interior cell
    fn neighborhood(model: &BoardModel, row: usize, col: usize) -> Result<Vec<DomainId>> {
        let mut cells = Vec::with_capacity(8);
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                if r != row || c != col {
                    cells.push(model.current(r, c)?);
                }
            }
        }
        Ok(cells)
    }
}
