//! Node kinds and their families.
//!
//! A [`Kind`] is one entry of the handler table. Most kinds are named after
//! the tag that opens them; the contextual kinds (`MdColumns`, `MdColumn`,
//! `FuncOutputColumns`) share a tag with another kind and are only reachable
//! through a parent grammar that names them directly.

use std::fmt;

use strum::{Display, EnumIter, IntoStaticStr};

use crate::token::Token;

/// Coarse classification used by grammar placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Family {
    Root,
    Section,
    Scalar,
    Clause,
    Logical,
    Physical,
    Metadata,
    Aux,
}

impl Family {
    /// Phrase used in error messages, e.g. "a Physical operator".
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Root => "a DXL message",
            Self::Section => "a document section",
            Self::Scalar => "a Scalar operator",
            Self::Clause => "a clause",
            Self::Logical => "a Logical operator",
            Self::Physical => "a Physical operator",
            Self::Metadata => "a metadata object",
            Self::Aux => "a descriptor",
        }
    }
}

macro_rules! tag_of {
    ($kind:ident) => {
        Token::$kind
    };
    ($kind:ident, $tag:ident) => {
        Token::$tag
    };
}

macro_rules! kinds {
    ($($family:ident: $($kind:ident $(= $tag:ident)?),+ ;)+) => {
        /// Every node kind the engine can build.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
        pub enum Kind {
            $($($kind,)+)+
        }

        impl Kind {
            /// Tag that opens a node of this kind.
            #[must_use]
            pub fn tag(self) -> Token {
                match self {
                    $($(Self::$kind => tag_of!($kind $(, $tag)?),)+)+
                }
            }

            #[must_use]
            pub fn family(self) -> Family {
                match self {
                    $($(Self::$kind => Family::$family,)+)+
                }
            }
        }
    };
}

kinds! {
    Root: DxlMessage;
    Section: Plan, Query, ScalarExpr, Metadata, CostModelConfig, CostParams, SearchStrategy,
        OptimizerConfig, Statistics;
    Aux: CostParam, SearchStage, Xform, EnumeratorConfig, StatisticsConfig, CteConfig, WindowOids,
        Hint, TraceFlags, StatsDerivedRelation, StatsDerivedColumn, StatsBucket, LowerBound,
        UpperBound, Properties, Cost, TableDescriptor, Columns, Column, IndexDescriptor,
        GroupingColumns, GroupingColumn, OutputColumns, CteList, ConstTuple, Datum, WindowSpecList,
        WindowSpec, WindowKeyList, WindowKey, ParamList, Param,
        MdColumns = Columns, MdColumn = Column, DefaultValue, IndexInfoList, IndexInfo, Triggers,
        Trigger, CheckConstraints, CheckConstraint, Opfamilies, Opfamily, EqualityOp, InequalityOp,
        LessThanOp, LessThanEqualsOp, GreaterThanOp, GreaterThanEqualsOp, ComparisonOp, ArrayType,
        MinAgg, MaxAgg, AvgAgg, SumAgg, CountAgg, LeftType, RightType, ResultType, OpFunc,
        Commutator, InverseOp, IntermediateResultType, FuncOutputColumns = OutputColumns;
    Metadata: Type, Relation, Index, GpdbScalarOp, GpdbFunc, GpdbAgg, GpdbCast, MdScalarComparison,
        GpdbTrigger, RelationStatistics, ColumnStatistics;
    Scalar: Ident, ConstValue, Comparison, IsDistinctFrom, OpExpr, And, Or, Not, IsNull, IsNotNull,
        BooleanTest, NullIf, FuncExpr, AggFunc, WindowFunc, Cast, CoerceToDomain, CoerceViaIo,
        ArrayCoerceExpr, If, Switch, CaseTest, Coalesce, MinMax, Array, ArrayRef, ArrayComp, SubPlan,
        ScalarSubquery, SubqueryAny, SubqueryAll, SubqueryExists, SubqueryNotExists,
        BitmapIndexProbe, BitmapAnd, BitmapOr, DmlAction, PartOid, PartDefault, PartBound,
        PartBoundInclusion, PartBoundOpen, PartListValues, PartListNullTest;
    Clause: SwitchCase, ArrayIndexList, ArrayRefExpr, ArrayRefAssignExpr, TestExpr, ValuesList,
        ProjList, ProjElem, Filter, JoinFilter, OneTimeFilter, RecheckCond, HashCondList,
        MergeCondList, IndexCondList, LimitCount, LimitOffset, SortingColumnList, SortingColumn,
        HashExprList, HashExpr, WindowFrame, LeadingEdge, TrailingEdge, AssertConstraintList,
        AssertConstraint;
    Logical: LogicalGet, LogicalExternalGet, LogicalProject, LogicalSelect, LogicalJoin,
        LogicalGroupBy, LogicalLimit, LogicalConstTable, Union, UnionAll, Intersect, IntersectAll,
        Difference, DifferenceAll, LogicalCteProducer, LogicalCteConsumer, LogicalCteAnchor,
        LogicalTvf, LogicalWindow, LogicalInsert, LogicalDelete, LogicalUpdate;
    Physical: TableScan, ExternalScan, DynamicTableScan, IndexScan, IndexOnlyScan, DynamicIndexScan,
        BitmapTableScan, DynamicBitmapTableScan, HashJoin, NestedLoopJoin, MergeJoin, GatherMotion,
        BroadcastMotion, RedistributeMotion, RoutedDistributeMotion, RandomMotion, Result, Limit,
        Sort, Aggregate, Materialize, Append, Sequence, SubqueryScan, Window, TableFunctionScan,
        CteProducer, CteConsumer, Assert, PartitionSelector, ValuesScan, DmlInsert, DmlDelete,
        DmlUpdate, SplitUpdate;
}

impl Kind {
    /// DXL spelling of the opening tag.
    #[must_use]
    pub fn tag_name(self) -> &'static str {
        self.tag().as_str()
    }

    /// Whether another kind shares this kind's tag, so it must be named by
    /// its parent's grammar.
    #[must_use]
    pub fn is_contextual(self) -> bool {
        matches!(self, Self::MdColumns | Self::MdColumn | Self::FuncOutputColumns)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}
