//! Finite-domain propagate-and-search engine
//!
//! Integer variables live in a [`Store`] as interval domains. Constraints are
//! [`Formula`]s over linear expressions, combined with conjunction and n-ary
//! XOR. [`Store::propagate`] narrows domains to a fixpoint and
//! [`DepthFirstSearch`] branches on whatever propagation leaves open.

pub mod expr;
pub mod search;
pub mod store;
pub mod variables;

pub use expr::{Cmp, Formula, LinExpr, Relation, Truth};
pub use search::{
    Brancher, Decision, DepthFirstSearch, SearchOptions, SearchStatistics, Space, ValueSelection,
    VariableSelection,
};
pub use store::{Inconsistency, Store};
pub use variables::{Domain, DomainId, EmptyDomain};
