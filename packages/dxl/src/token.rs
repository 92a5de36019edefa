//! The closed vocabulary of DXL tag names.
//!
//! Every element name that can appear in a DXL document maps to exactly one
//! [`Token`]. Event sources hand the engine raw names; the engine resolves
//! them here before any handler sees them.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Identifier of a DXL tag name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Token {
    // Document structure
    #[strum(serialize = "DXLMessage")]
    DxlMessage,
    Plan,
    Query,
    ScalarExpr,
    Metadata,
    CostModelConfig,
    CostParams,
    CostParam,
    SearchStrategy,
    SearchStage,
    Xform,
    OptimizerConfig,
    EnumeratorConfig,
    StatisticsConfig,
    #[strum(serialize = "CTEConfig")]
    CteConfig,
    WindowOids,
    Hint,
    TraceFlags,
    Statistics,
    StatsDerivedRelation,
    StatsDerivedColumn,
    StatsBucket,
    LowerBound,
    UpperBound,

    // Auxiliary descriptors
    Properties,
    Cost,
    TableDescriptor,
    Columns,
    Column,
    IndexDescriptor,
    GroupingColumns,
    GroupingColumn,
    OutputColumns,
    #[strum(serialize = "CTEList")]
    CteList,
    ConstTuple,
    Datum,
    WindowSpecList,
    WindowSpec,
    WindowKeyList,
    WindowKey,
    ParamList,
    Param,

    // Metadata objects and their parts
    Type,
    Relation,
    Index,
    #[strum(serialize = "GPDBScalarOp")]
    GpdbScalarOp,
    #[strum(serialize = "GPDBFunc")]
    GpdbFunc,
    #[strum(serialize = "GPDBAgg")]
    GpdbAgg,
    #[strum(serialize = "GPDBCast")]
    GpdbCast,
    #[strum(serialize = "MDScalarComparison")]
    MdScalarComparison,
    #[strum(serialize = "GPDBTrigger")]
    GpdbTrigger,
    RelationStatistics,
    ColumnStatistics,
    DefaultValue,
    IndexInfoList,
    IndexInfo,
    Triggers,
    Trigger,
    CheckConstraints,
    CheckConstraint,
    Opfamilies,
    Opfamily,
    EqualityOp,
    InequalityOp,
    LessThanOp,
    LessThanEqualsOp,
    GreaterThanOp,
    GreaterThanEqualsOp,
    ComparisonOp,
    ArrayType,
    MinAgg,
    MaxAgg,
    AvgAgg,
    SumAgg,
    CountAgg,
    LeftType,
    RightType,
    ResultType,
    OpFunc,
    Commutator,
    InverseOp,
    IntermediateResultType,

    // Scalar expressions
    Ident,
    ConstValue,
    Comparison,
    IsDistinctFrom,
    OpExpr,
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    BooleanTest,
    NullIf,
    FuncExpr,
    AggFunc,
    WindowFunc,
    Cast,
    CoerceToDomain,
    #[strum(serialize = "CoerceViaIO")]
    CoerceViaIo,
    ArrayCoerceExpr,
    If,
    Switch,
    SwitchCase,
    CaseTest,
    Coalesce,
    MinMax,
    Array,
    ArrayRef,
    ArrayIndexList,
    ArrayRefExpr,
    ArrayRefAssignExpr,
    ArrayComp,
    SubPlan,
    TestExpr,
    ScalarSubquery,
    SubqueryAny,
    SubqueryAll,
    SubqueryExists,
    SubqueryNotExists,
    BitmapIndexProbe,
    BitmapAnd,
    BitmapOr,
    #[strum(serialize = "DMLAction")]
    DmlAction,
    PartOid,
    PartDefault,
    PartBound,
    PartBoundInclusion,
    PartBoundOpen,
    PartListValues,
    PartListNullTest,
    ValuesList,

    // Structural clauses
    ProjList,
    ProjElem,
    Filter,
    JoinFilter,
    OneTimeFilter,
    RecheckCond,
    HashCondList,
    MergeCondList,
    IndexCondList,
    LimitCount,
    LimitOffset,
    SortingColumnList,
    SortingColumn,
    HashExprList,
    HashExpr,
    WindowFrame,
    LeadingEdge,
    TrailingEdge,
    AssertConstraintList,
    AssertConstraint,

    // Logical operators
    LogicalGet,
    LogicalExternalGet,
    LogicalProject,
    LogicalSelect,
    LogicalJoin,
    LogicalGroupBy,
    LogicalLimit,
    LogicalConstTable,
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Difference,
    DifferenceAll,
    #[strum(serialize = "LogicalCTEProducer")]
    LogicalCteProducer,
    #[strum(serialize = "LogicalCTEConsumer")]
    LogicalCteConsumer,
    #[strum(serialize = "LogicalCTEAnchor")]
    LogicalCteAnchor,
    #[strum(serialize = "LogicalTVF")]
    LogicalTvf,
    LogicalWindow,
    LogicalInsert,
    LogicalDelete,
    LogicalUpdate,

    // Physical operators
    TableScan,
    ExternalScan,
    DynamicTableScan,
    IndexScan,
    IndexOnlyScan,
    DynamicIndexScan,
    BitmapTableScan,
    DynamicBitmapTableScan,
    HashJoin,
    NestedLoopJoin,
    MergeJoin,
    GatherMotion,
    BroadcastMotion,
    RedistributeMotion,
    RoutedDistributeMotion,
    RandomMotion,
    Result,
    Limit,
    Sort,
    Aggregate,
    Materialize,
    Append,
    Sequence,
    SubqueryScan,
    Window,
    TableFunctionScan,
    #[strum(serialize = "CTEProducer")]
    CteProducer,
    #[strum(serialize = "CTEConsumer")]
    CteConsumer,
    Assert,
    PartitionSelector,
    ValuesScan,
    #[strum(serialize = "DMLInsert")]
    DmlInsert,
    #[strum(serialize = "DMLDelete")]
    DmlDelete,
    #[strum(serialize = "DMLUpdate")]
    DmlUpdate,
    SplitUpdate,
}

impl Token {
    /// Resolve a tag name to its token, if the name is part of the vocabulary.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// The DXL spelling of this tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_lookup_known_tags() {
        assert_eq!(Token::lookup("HashJoin"), Some(Token::HashJoin));
        assert_eq!(Token::lookup("DXLMessage"), Some(Token::DxlMessage));
        assert_eq!(Token::lookup("CTEConfig"), Some(Token::CteConfig));
        assert_eq!(Token::lookup("CoerceViaIO"), Some(Token::CoerceViaIo));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(Token::lookup("hashjoin"), None);
        assert_eq!(Token::lookup("NoSuchTag"), None);
    }

    #[test]
    fn test_spelling_round_trips() {
        for token in Token::iter() {
            assert_eq!(Token::lookup(token.as_str()), Some(token));
            assert_eq!(token.to_string(), token.as_str());
        }
    }

    #[test]
    fn test_spellings_are_unique() {
        let names: HashSet<&str> = Token::iter().map(Token::as_str).collect();
        assert_eq!(names.len(), Token::iter().count());
    }
}
