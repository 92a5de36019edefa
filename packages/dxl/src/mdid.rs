//! Metadata identifiers.
//!
//! Catalog objects are referenced by typed ids whose first component names
//! the id system:
//!
//! - `0.<oid>.<major>.<minor>`: a GPDB catalog object
//! - `1.<rel>.<major>.<minor>.<attno>`: column statistics
//! - `2.<rel>.<major>.<minor>`: relation statistics
//! - `3.<src>.<major>.<minor>;<dst>.<major>.<minor>`: a cast
//! - `4.<left>.<major>.<minor>;<right>.<major>.<minor>;<cmp>`: a scalar comparison
//! - `6.<oid>.<major>.<minor>`: a relation

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Serialize, Serializer};

use crate::attrs::FromAttr;

/// Dotted identifier: system, oid, major, minor and an optional attno.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOTTED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)\.(\d+)(?:\.(\d+))?$").expect("valid regex")
});

/// Cast identifier: versioned source and destination types.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CAST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^3\.(\d+)\.(\d+)\.(\d+);(\d+)\.(\d+)\.(\d+)$").expect("valid regex")
});

/// Scalar comparison identifier: versioned left and right types and comparison type.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SCALAR_CMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^4\.(\d+)\.(\d+)\.(\d+);(\d+)\.(\d+)\.(\d+);(\d+)$").expect("valid regex")
});

/// A versioned catalog object inside a compound identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub oid: u32,
    pub major: u32,
    pub minor: u32,
}

impl ObjectRef {
    /// Object with version 1.0.
    #[must_use]
    pub fn new(oid: u32) -> Self {
        Self {
            oid,
            major: 1,
            minor: 0,
        }
    }

    /// Read `oid.major.minor` from three consecutive capture groups.
    fn from_captures(caps: &Captures<'_>, first: usize) -> Option<Self> {
        let num = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
        Some(Self {
            oid: num(first)?,
            major: num(first + 1)?,
            minor: num(first + 2)?,
        })
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.oid, self.major, self.minor)
    }
}

/// A typed catalog identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MdId {
    /// A GPDB catalog object (type, relation, function, operator, ...).
    Gpdb { oid: u32, major: u32, minor: u32 },
    /// Statistics of one column of a relation.
    ColumnStats {
        rel: u32,
        major: u32,
        minor: u32,
        attno: u32,
    },
    /// Statistics of a relation.
    RelationStats { rel: u32, major: u32, minor: u32 },
    /// A cast between two types.
    Cast { source: ObjectRef, dest: ObjectRef },
    /// A comparison between two types.
    ScalarComparison {
        left: ObjectRef,
        right: ObjectRef,
        cmp: u32,
    },
    /// A relation, as named by table descriptors and relation metadata.
    Relation { oid: u32, major: u32, minor: u32 },
}

impl MdId {
    /// Convenience constructor for a GPDB object id with version 1.0.
    #[must_use]
    pub fn gpdb(oid: u32) -> Self {
        Self::Gpdb {
            oid,
            major: 1,
            minor: 0,
        }
    }

    /// Parse the textual form of an identifier.
    ///
    /// # Examples
    /// ```
    /// use dxl_parser::MdId;
    ///
    /// assert_eq!(MdId::parse("0.23.1.0"), Some(MdId::gpdb(23)));
    /// assert!(MdId::parse("not-an-id").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(caps) = DOTTED_PATTERN.captures(raw) {
            let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            let (system, oid, major, minor) = (num(1)?, num(2)?, num(3)?, num(4)?);
            let attno = num(5);
            return match (system, attno) {
                (0, None) => Some(Self::Gpdb { oid, major, minor }),
                (1, Some(attno)) => Some(Self::ColumnStats {
                    rel: oid,
                    major,
                    minor,
                    attno,
                }),
                (2, None) => Some(Self::RelationStats {
                    rel: oid,
                    major,
                    minor,
                }),
                (6, None) => Some(Self::Relation { oid, major, minor }),
                _ => None,
            };
        }

        if let Some(caps) = CAST_PATTERN.captures(raw) {
            return Some(Self::Cast {
                source: ObjectRef::from_captures(&caps, 1)?,
                dest: ObjectRef::from_captures(&caps, 4)?,
            });
        }

        let caps = SCALAR_CMP_PATTERN.captures(raw)?;
        Some(Self::ScalarComparison {
            left: ObjectRef::from_captures(&caps, 1)?,
            right: ObjectRef::from_captures(&caps, 4)?,
            cmp: caps.get(7)?.as_str().parse().ok()?,
        })
    }

    /// The object id this identifier names (relation oid for statistics).
    #[must_use]
    pub fn oid(&self) -> u32 {
        match *self {
            Self::Gpdb { oid, .. } | Self::Relation { oid, .. } => oid,
            Self::ColumnStats { rel, .. } | Self::RelationStats { rel, .. } => rel,
            Self::Cast { source, .. } => source.oid,
            Self::ScalarComparison { left, .. } => left.oid,
        }
    }

    /// Whether this id refers to a real object (`0.0.0.0` is the invalid id).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.oid() != 0
    }
}

impl fmt::Display for MdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Gpdb { oid, major, minor } => write!(f, "0.{oid}.{major}.{minor}"),
            Self::ColumnStats {
                rel,
                major,
                minor,
                attno,
            } => write!(f, "1.{rel}.{major}.{minor}.{attno}"),
            Self::RelationStats { rel, major, minor } => write!(f, "2.{rel}.{major}.{minor}"),
            Self::Cast { source, dest } => write!(f, "3.{source};{dest}"),
            Self::ScalarComparison { left, right, cmp } => write!(f, "4.{left};{right};{cmp}"),
            Self::Relation { oid, major, minor } => write!(f, "6.{oid}.{major}.{minor}"),
        }
    }
}

impl Serialize for MdId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromAttr for MdId {
    const EXPECTED: &'static str = "metadata id (e.g. 0.23.1.0)";

    fn from_attr(raw: &str) -> Option<Self> {
        Self::parse(raw)
    }
}
