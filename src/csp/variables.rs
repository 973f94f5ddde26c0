//! Integer variables and their interval domains

use std::fmt;

/// Handle to an integer variable inside a [`Store`](super::Store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub(crate) usize);

impl DomainId {
    /// Position of the variable in its store
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Raised when a domain update would leave no value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDomain;

/// Interval domain `[min, max]`
///
/// Every variable in this engine ranges over a small contiguous interval,
/// so bounds are an exact representation of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    min: i32,
    max: i32,
}

impl Domain {
    /// Create a domain; `min` must not exceed `max`
    pub fn new(min: i32, max: i32) -> Self {
        debug_assert!(min <= max, "empty domain [{min}, {max}]");
        Self { min, max }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Number of values left in the domain
    pub fn size(&self) -> u64 {
        (self.max as i64 - self.min as i64 + 1) as u64
    }

    pub fn is_assigned(&self) -> bool {
        self.min == self.max
    }

    /// The assigned value, if the domain is a singleton
    pub fn value(&self) -> Option<i32> {
        self.is_assigned().then_some(self.min)
    }

    pub fn contains(&self, value: i32) -> bool {
        self.min <= value && value <= self.max
    }

    /// Raise the lower bound. Returns whether the domain changed.
    pub(crate) fn tighten_min(&mut self, min: i64) -> Result<bool, EmptyDomain> {
        if min > self.max as i64 {
            return Err(EmptyDomain);
        }
        if min > self.min as i64 {
            self.min = min as i32;
            return Ok(true);
        }
        Ok(false)
    }

    /// Lower the upper bound. Returns whether the domain changed.
    pub(crate) fn tighten_max(&mut self, max: i64) -> Result<bool, EmptyDomain> {
        if max < self.min as i64 {
            return Err(EmptyDomain);
        }
        if max < self.max as i64 {
            self.max = max as i32;
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove a single value. Only values at a bound can be removed
    /// from an interval; interior holes are ignored.
    pub(crate) fn remove(&mut self, value: i64) -> Result<bool, EmptyDomain> {
        if value == self.min as i64 {
            self.tighten_min(value + 1)
        } else if value == self.max as i64 {
            self.tighten_max(value - 1)
        } else {
            Ok(false)
        }
    }

    /// Fix the domain to a single value
    pub(crate) fn assign(&mut self, value: i64) -> Result<bool, EmptyDomain> {
        let lower = self.tighten_min(value)?;
        let upper = self.tighten_max(value)?;
        Ok(lower || upper)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "[{}..{}]", self.min, self.max),
        }
    }
}
