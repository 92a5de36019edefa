//! Child grammars of node kinds.
//!
//! A grammar is an ordered list of [`Part`]s. Each part accepts children of
//! one kind, or of any kind in one family, between `min` and `max` times.
//! Children must arrive in part order; a part may be skipped only once its
//! minimum is met.

use std::fmt;

use super::kind::{Family, Kind};

/// What a grammar part accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Kind(Kind),
    Any(Family),
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, "<{kind}>"),
            Self::Any(family) => f.write_str(family.describe()),
        }
    }
}

/// One position of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub expect: Expect,
    pub min: usize,
    pub max: Option<usize>,
}

impl Part {
    #[must_use]
    pub fn is_full(&self, count: usize) -> bool {
        self.max.is_some_and(|max| count >= max)
    }

    #[must_use]
    pub fn is_satisfied(&self, count: usize) -> bool {
        count >= self.min
    }
}

fn part(expect: Expect, min: usize, max: Option<usize>) -> Part {
    Part { expect, min, max }
}

/// Exactly one child of `kind`.
pub fn one(kind: Kind) -> Part {
    part(Expect::Kind(kind), 1, Some(1))
}

/// At most one child of `kind`.
pub fn opt(kind: Kind) -> Part {
    part(Expect::Kind(kind), 0, Some(1))
}

/// Any number of children of `kind`.
pub fn many(kind: Kind) -> Part {
    part(Expect::Kind(kind), 0, None)
}

/// One or more children of `kind`.
pub fn some(kind: Kind) -> Part {
    part(Expect::Kind(kind), 1, None)
}

/// Exactly `n` children of `kind`.
pub fn exactly(kind: Kind, n: usize) -> Part {
    part(Expect::Kind(kind), n, Some(n))
}

/// Exactly one child of any kind in `family`.
pub fn one_of(family: Family) -> Part {
    part(Expect::Any(family), 1, Some(1))
}

pub fn opt_of(family: Family) -> Part {
    part(Expect::Any(family), 0, Some(1))
}

pub fn many_of(family: Family) -> Part {
    part(Expect::Any(family), 0, None)
}

pub fn some_of(family: Family) -> Part {
    part(Expect::Any(family), 1, None)
}

pub fn exactly_of(family: Family, n: usize) -> Part {
    part(Expect::Any(family), n, Some(n))
}

pub fn at_least_of(family: Family, n: usize) -> Part {
    part(Expect::Any(family), n, None)
}

/// Describe a part and its cardinality for error messages.
pub fn describe_count(part: &Part) -> String {
    let bound = match (part.min, part.max) {
        (min, Some(max)) if min == max => format!("exactly {min}"),
        (0, Some(1)) => "optional".to_string(),
        (0, None) => "any number".to_string(),
        (min, None) => format!("at least {min}"),
        (min, Some(max)) => format!("{min} to {max}"),
    };
    format!("{} ({bound})", part.expect)
}
