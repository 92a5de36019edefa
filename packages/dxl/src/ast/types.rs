//! Enumerations carried by DXL operators and metadata objects.
//!
//! All of them parse from their DXL attribute spelling through
//! [`FromAttr`](crate::attrs::FromAttr).

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::attrs::{from_attr_enum, FromAttr};

/// Join semantics of logical and physical joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum JoinType {
    Inner,
    Left,
    Full,
    Right,
    In,
    LeftAntiSemiJoin,
    LeftAntiSemiJoinNotIn,
}

/// Execution strategy of a physical aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum AggStrategy {
    Plain,
    Sorted,
    Hashed,
}

/// Stage of a (possibly split) aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum AggStage {
    Normal,
    Partial,
    Intermediate,
    Final,
}

/// Kind of an aggregate function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum AggKind {
    #[strum(serialize = "n")]
    Normal,
    #[strum(serialize = "o")]
    Ordered,
    #[strum(serialize = "h")]
    Hypothetical,
}

/// Scan direction of index scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum IndexScanDirection {
    Forward,
    Backward,
    NoMovement,
}

/// Kind of a correlated sub-plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum SubPlanType {
    ScalarSubPlan,
    ExistsSubPlan,
    NotExistsSubPlan,
    AnySubPlan,
    AllSubPlan,
}

/// Test performed by a `BooleanTest` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum BoolTestType {
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
    IsUnknown,
    IsNotUnknown,
}

/// Whether a `MinMax` expression computes the least or greatest argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum MinMaxType {
    Min,
    Max,
}

/// Quantifier of an array comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum ArrayCompType {
    Any,
    All,
}

/// Which bound an array index list describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum ArrayBound {
    Upper,
    Lower,
}

/// Frame unit of a window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum FrameSpec {
    Row,
    Range,
}

/// Exclusion strategy of a window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum FrameExclusion {
    None,
    Nulls,
    CurrentRow,
    Group,
    Ties,
}

/// Boundary of a window frame edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum FrameBoundary {
    UnboundedPreceding,
    BoundedPreceding,
    CurrentRow,
    UnboundedFollowing,
    BoundedFollowing,
    DelayedBoundedPreceding,
    DelayedBoundedFollowing,
}

/// Comparison class of an operator or comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum CmpType {
    Eq,
    NEq,
    #[strum(serialize = "LT")]
    Lt,
    #[strum(serialize = "LEq")]
    LEq,
    #[strum(serialize = "GT")]
    Gt,
    #[strum(serialize = "GEq")]
    GEq,
    #[strum(serialize = "IDF")]
    IsDistinctFrom,
    Other,
}

/// Access method of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum IndexType {
    #[strum(serialize = "B-tree")]
    BTree,
    Bitmap,
    Gist,
    Gin,
    Brin,
    Hash,
}

/// Physical storage of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum StorageType {
    Heap,
    AppendOnly,
    AppendOnlyRows,
    AppendOnlyCols,
    External,
    Virtual,
    Foreign,
    MixedPartitioned,
}

/// Distribution of a relation across segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum DistributionPolicy {
    Hash,
    Random,
    Replicated,
    Universal,
    MasterOnly,
}

/// Volatility class of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum FuncStability {
    Immutable,
    Stable,
    Volatile,
}

/// SQL data access class of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum FuncDataAccess {
    #[strum(serialize = "NoSQL")]
    NoSql,
    #[strum(serialize = "ContainsSQL")]
    ContainsSql,
    #[strum(serialize = "ReadsSQLData")]
    ReadsSqlData,
    #[strum(serialize = "ModifiesSQLData")]
    ModifiesSqlData,
}

/// Kind of a logical set operation; fixed by the registered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
pub enum SetOpKind {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Difference,
    DifferenceAll,
}

/// How a coercion appears in the original query; serialized as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
pub enum CoercionForm {
    ExplicitCall,
    ExplicitCast,
    ImplicitCast,
    DontCare,
}

impl FromAttr for CoercionForm {
    const EXPECTED: &'static str = "coercion form code (0-3)";

    fn from_attr(raw: &str) -> Option<Self> {
        match raw {
            "0" => Some(Self::ExplicitCall),
            "1" => Some(Self::ExplicitCast),
            "2" => Some(Self::ImplicitCast),
            "3" => Some(Self::DontCare),
            _ => None,
        }
    }
}

from_attr_enum! {
    JoinType => "join type",
    AggStrategy => "aggregation strategy (Plain/Sorted/Hashed)",
    AggStage => "aggregate stage",
    AggKind => "aggregate kind (n/o/h)",
    IndexScanDirection => "index scan direction",
    SubPlanType => "sub-plan type",
    BoolTestType => "boolean test type",
    MinMaxType => "Min or Max",
    ArrayCompType => "Any or All",
    ArrayBound => "Upper or Lower",
    FrameSpec => "frame spec (Row/Range)",
    FrameExclusion => "frame exclusion strategy",
    FrameBoundary => "frame boundary",
    CmpType => "comparison type",
    IndexType => "index type",
    StorageType => "storage type",
    DistributionPolicy => "distribution policy",
    FuncStability => "function stability",
    FuncDataAccess => "function data access",
}
