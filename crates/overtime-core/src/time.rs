//! Time values, intervals and path costs.
//!
//! [`Interval`] is closed (`[start, end]`) and is what callers pass to
//! windowing queries. [`Timespan`] is half-open (`[start, end)`) and is what
//! a temporal collection reports about itself. [`Distance`] is a duration or
//! length that may be infinite.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Discrete time instant.
pub type Time = i64;

/// Closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: Time,
    pub end: Time,
}

impl Interval {
    /// Creates an interval, rejecting `start > end`.
    pub fn new(start: Time, end: Time) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidInterval { start, end });
        }
        Ok(Interval { start, end })
    }

    /// Re-checks the bounds of an interval built with a struct literal.
    pub fn validate(&self) -> Result<(), CoreError> {
        Interval::new(self.start, self.end).map(|_| ())
    }

    /// Returns `true` if `t` lies in `[start, end]`.
    pub fn contains(&self, t: Time) -> bool {
        self.start <= t && t <= self.end
    }

    /// Returns `true` if `[start, end]` lies entirely inside this interval.
    pub fn encloses(&self, start: Time, end: Time) -> bool {
        self.start <= start && end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Half-open range `[start, end)` covered by a temporal edge collection.
///
/// `end` is one past the latest edge end, so a non-empty collection always
/// has a timespan of length at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timespan {
    pub start: Time,
    pub end: Time,
}

impl Timespan {
    /// Number of instants covered.
    pub fn len(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if `t` lies in `[start, end)`.
    pub fn contains(&self, t: Time) -> bool {
        self.start <= t && t < self.end
    }

    /// The latest instant covered (`end - 1`).
    pub fn last(&self) -> Time {
        self.end - 1
    }

    /// The same instants as a closed [`Interval`].
    pub fn as_interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.last(),
        }
    }

    /// Iterates every instant in the timespan.
    pub fn instants(&self) -> std::ops::Range<Time> {
        self.start..self.end
    }
}

/// A path duration or length; `Unreachable` stands for infinity.
///
/// Orders every finite value before `Unreachable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Distance {
    Finite(i64),
    Unreachable,
}

impl Distance {
    pub fn is_finite(&self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    /// The finite value, or `None` for `Unreachable`.
    pub fn finite(&self) -> Option<i64> {
        match self {
            Distance::Finite(d) => Some(*d),
            Distance::Unreachable => None,
        }
    }
}

impl From<Option<i64>> for Distance {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Distance::Unreachable, Distance::Finite)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{}", d),
            Distance::Unreachable => write!(f, "inf"),
        }
    }
}
