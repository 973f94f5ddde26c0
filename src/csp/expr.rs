//! Linear expressions and the relational formulas posted as constraints

use super::store::Inconsistency;
use super::variables::{Domain, DomainId};
use std::ops::{Add, BitAnd, BitXor, Sub};

/// `sum(coef * var) + constant`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinExpr {
    terms: Vec<(i64, DomainId)>,
    constant: i64,
}

impl LinExpr {
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn var(id: DomainId) -> Self {
        Self {
            terms: vec![(1, id)],
            constant: 0,
        }
    }

    /// Sum of the given variables, each with coefficient 1
    pub fn sum<I: IntoIterator<Item = DomainId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|id| (1, id)).collect(),
            constant: 0,
        }
    }

    pub fn terms(&self) -> &[(i64, DomainId)] {
        &self.terms
    }

    /// Smallest and largest value the expression can take under `domains`
    pub fn bounds(&self, domains: &[Domain]) -> (i64, i64) {
        let mut lo = self.constant;
        let mut hi = self.constant;
        for &(coef, id) in &self.terms {
            let (a, b) = term_bounds(coef, &domains[id.0]);
            lo += a;
            hi += b;
        }
        (lo, hi)
    }

    pub fn equals(self, rhs: impl Into<LinExpr>) -> Formula {
        Formula::rel(self, Cmp::Eq, rhs)
    }

    pub fn differs(self, rhs: impl Into<LinExpr>) -> Formula {
        Formula::rel(self, Cmp::Ne, rhs)
    }

    pub fn less_than(self, rhs: impl Into<LinExpr>) -> Formula {
        Formula::rel(self, Cmp::Lt, rhs)
    }

    pub fn at_most(self, rhs: impl Into<LinExpr>) -> Formula {
        Formula::rel(self, Cmp::Le, rhs)
    }

    pub fn greater_than(self, rhs: impl Into<LinExpr>) -> Formula {
        Formula::rel(self, Cmp::Gt, rhs)
    }

    pub fn at_least(self, rhs: impl Into<LinExpr>) -> Formula {
        Formula::rel(self, Cmp::Ge, rhs)
    }

    fn scaled(mut self, factor: i64) -> Self {
        for term in &mut self.terms {
            term.0 *= factor;
        }
        self.constant *= factor;
        self
    }
}

fn term_bounds(coef: i64, domain: &Domain) -> (i64, i64) {
    let a = coef * domain.min() as i64;
    let b = coef * domain.max() as i64;
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl From<DomainId> for LinExpr {
    fn from(id: DomainId) -> Self {
        LinExpr::var(id)
    }
}

impl From<i64> for LinExpr {
    fn from(value: i64) -> Self {
        LinExpr::constant(value)
    }
}

impl From<i32> for LinExpr {
    fn from(value: i32) -> Self {
        LinExpr::constant(value as i64)
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        self + rhs.into().scaled(-1)
    }
}

/// Comparison operator of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn negate(self) -> Self {
        match self {
            Cmp::Eq => Cmp::Ne,
            Cmp::Ne => Cmp::Eq,
            Cmp::Lt => Cmp::Ge,
            Cmp::Le => Cmp::Gt,
            Cmp::Gt => Cmp::Le,
            Cmp::Ge => Cmp::Lt,
        }
    }
}

/// Three-valued truth of a formula under the current domains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn from_bool(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }
}

/// `lhs - rhs cmp 0`, stored normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    diff: LinExpr,
    cmp: Cmp,
}

impl Relation {
    pub fn new(lhs: LinExpr, cmp: Cmp, rhs: LinExpr) -> Self {
        Self {
            diff: lhs - rhs,
            cmp,
        }
    }

    pub fn truth(&self, domains: &[Domain]) -> Truth {
        let (lo, hi) = self.diff.bounds(domains);
        match self.cmp {
            Cmp::Eq if lo == 0 && hi == 0 => Truth::True,
            Cmp::Eq if lo > 0 || hi < 0 => Truth::False,
            Cmp::Ne if lo > 0 || hi < 0 => Truth::True,
            Cmp::Ne if lo == 0 && hi == 0 => Truth::False,
            Cmp::Lt if hi < 0 => Truth::True,
            Cmp::Lt if lo >= 0 => Truth::False,
            Cmp::Le if hi <= 0 => Truth::True,
            Cmp::Le if lo > 0 => Truth::False,
            Cmp::Gt if lo > 0 => Truth::True,
            Cmp::Gt if hi <= 0 => Truth::False,
            Cmp::Ge if lo >= 0 => Truth::True,
            Cmp::Ge if hi < 0 => Truth::False,
            _ => Truth::Unknown,
        }
    }

    /// Narrow the domains so that the relation holds (or fails, when
    /// `holds` is false), using bounds reasoning on the linear sum.
    fn enforce(
        &self,
        holds: bool,
        domains: &mut [Domain],
        changed: &mut Vec<DomainId>,
    ) -> Result<(), Inconsistency> {
        let cmp = if holds { self.cmp } else { self.cmp.negate() };
        match cmp {
            Cmp::Eq => {
                at_most_zero(&self.diff, domains, changed)?;
                at_most_zero(&self.diff.clone().scaled(-1), domains, changed)
            }
            Cmp::Le => at_most_zero(&self.diff, domains, changed),
            Cmp::Lt => at_most_zero(&(self.diff.clone() + 1i64), domains, changed),
            Cmp::Ge => at_most_zero(&self.diff.clone().scaled(-1), domains, changed),
            Cmp::Gt => at_most_zero(&(self.diff.clone().scaled(-1) + 1i64), domains, changed),
            Cmp::Ne => not_zero(&self.diff, domains, changed),
        }
    }
}

/// Bounds propagation for `expr <= 0`, repeated until stable
fn at_most_zero(
    expr: &LinExpr,
    domains: &mut [Domain],
    changed: &mut Vec<DomainId>,
) -> Result<(), Inconsistency> {
    loop {
        let (lo, _) = expr.bounds(domains);
        if lo > 0 {
            return Err(Inconsistency::Conflict);
        }
        let mut progress = false;
        for &(coef, id) in &expr.terms {
            if coef == 0 {
                continue;
            }
            let (own_lo, _) = term_bounds(coef, &domains[id.0]);
            // coef * x <= -(lo - own_lo)
            let slack = -(lo - own_lo);
            let domain = &mut domains[id.0];
            let narrowed = if coef > 0 {
                domain.tighten_max(floor_div(slack, coef))?
            } else {
                domain.tighten_min(ceil_div(slack, coef))?
            };
            if narrowed {
                changed.push(id);
                progress = true;
            }
        }
        if !progress {
            return Ok(());
        }
    }
}

/// `expr != 0`: only prunes once a single variable is left open
fn not_zero(
    expr: &LinExpr,
    domains: &mut [Domain],
    changed: &mut Vec<DomainId>,
) -> Result<(), Inconsistency> {
    let mut open = None;
    let mut fixed_sum = expr.constant;
    for &(coef, id) in &expr.terms {
        match domains[id.0].value() {
            Some(v) => fixed_sum += coef * v as i64,
            None if coef == 0 => {}
            None => {
                if open.is_some_and(|(_, other)| other != id) {
                    return Ok(());
                }
                let merged = open.map_or(coef, |(c, _)| c + coef);
                open = Some((merged, id));
            }
        }
    }
    match open {
        None if fixed_sum == 0 => Err(Inconsistency::Conflict),
        None => Ok(()),
        Some((0, _)) if fixed_sum == 0 => Err(Inconsistency::Conflict),
        Some((0, _)) => Ok(()),
        Some((coef, id)) => {
            if (-fixed_sum) % coef == 0 && domains[id.0].remove(-fixed_sum / coef)? {
                changed.push(id);
            }
            Ok(())
        }
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    -floor_div(-a, b)
}

/// A constraint: a relation or a boolean combination of relations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Rel(Relation),
    /// All operands hold
    And(Vec<Formula>),
    /// An odd number of operands hold
    Xor(Vec<Formula>),
}

impl Formula {
    pub fn rel(lhs: impl Into<LinExpr>, cmp: Cmp, rhs: impl Into<LinExpr>) -> Self {
        Formula::Rel(Relation::new(lhs.into(), cmp, rhs.into()))
    }

    pub fn and(operands: Vec<Formula>) -> Self {
        Formula::And(operands)
    }

    pub fn xor(operands: Vec<Formula>) -> Self {
        Formula::Xor(operands)
    }

    pub fn truth(&self, domains: &[Domain]) -> Truth {
        match self {
            Formula::Rel(rel) => rel.truth(domains),
            Formula::And(operands) => {
                let mut all_true = true;
                for operand in operands {
                    match operand.truth(domains) {
                        Truth::False => return Truth::False,
                        Truth::Unknown => all_true = false,
                        Truth::True => {}
                    }
                }
                if all_true {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            Formula::Xor(operands) => {
                let mut odd = false;
                for operand in operands {
                    match operand.truth(domains) {
                        Truth::Unknown => return Truth::Unknown,
                        Truth::True => odd = !odd,
                        Truth::False => {}
                    }
                }
                Truth::from_bool(odd)
            }
        }
    }

    /// Variables mentioned anywhere in the formula
    pub fn variables(&self) -> Vec<DomainId> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, out: &mut Vec<DomainId>) {
        match self {
            Formula::Rel(rel) => out.extend(rel.diff.terms.iter().map(|&(_, id)| id)),
            Formula::And(operands) | Formula::Xor(operands) => {
                for operand in operands {
                    operand.collect_variables(out);
                }
            }
        }
    }

    /// Narrow `domains` so that the formula evaluates to `holds`.
    /// Every variable whose domain shrank is pushed onto `changed`.
    pub(crate) fn enforce(
        &self,
        holds: bool,
        domains: &mut [Domain],
        changed: &mut Vec<DomainId>,
    ) -> Result<(), Inconsistency> {
        match self {
            Formula::Rel(rel) => rel.enforce(holds, domains, changed),
            Formula::And(operands) if holds => {
                for operand in operands {
                    operand.enforce(true, domains, changed)?;
                }
                Ok(())
            }
            Formula::And(operands) => {
                let mut open = Vec::new();
                for operand in operands {
                    match operand.truth(domains) {
                        Truth::False => return Ok(()),
                        Truth::Unknown => open.push(operand),
                        Truth::True => {}
                    }
                }
                match open.as_slice() {
                    [] => Err(Inconsistency::Conflict),
                    [last] => last.enforce(false, domains, changed),
                    _ => Ok(()),
                }
            }
            Formula::Xor(operands) => {
                let mut odd = false;
                let mut open = Vec::new();
                for operand in operands {
                    match operand.truth(domains) {
                        Truth::True => odd = !odd,
                        Truth::Unknown => open.push(operand),
                        Truth::False => {}
                    }
                }
                match open.as_slice() {
                    [] if odd == holds => Ok(()),
                    [] => Err(Inconsistency::Conflict),
                    [last] => last.enforce(holds != odd, domains, changed),
                    _ => Ok(()),
                }
            }
        }
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Formula) -> Formula {
        match self {
            Formula::And(mut operands) => {
                operands.push(rhs);
                Formula::And(operands)
            }
            lhs => Formula::And(vec![lhs, rhs]),
        }
    }
}

impl BitXor for Formula {
    type Output = Formula;

    fn bitxor(self, rhs: Formula) -> Formula {
        match self {
            Formula::Xor(mut operands) => {
                operands.push(rhs);
                Formula::Xor(operands)
            }
            lhs => Formula::Xor(vec![lhs, rhs]),
        }
    }
}
