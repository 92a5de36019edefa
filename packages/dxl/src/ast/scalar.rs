//! Scalar operators and structural clauses.

use serde::Serialize;
use strum::IntoStaticStr;

use super::types::{
    AggKind, AggStage, ArrayBound, ArrayCompType, BoolTestType, CoercionForm, FrameBoundary,
    FrameExclusion, FrameSpec, MinMaxType, SubPlanType,
};
use super::{Datum, IndexDescriptor};
use crate::mdid::MdId;

/// Reference to a column by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColRef {
    pub col_id: u32,
    pub name: String,
    pub type_mdid: MdId,
    pub type_modifier: i32,
}

/// Target type and presentation of a coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coercion {
    pub type_mdid: MdId,
    pub type_modifier: i32,
    pub form: CoercionForm,
    pub location: i32,
}

/// Outer column passed into a correlated sub-plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubPlanParam {
    pub col_id: u32,
    pub name: String,
    pub type_mdid: MdId,
}

/// Operator of a quantified (`ANY` / `ALL`) subquery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantifiedSubquery {
    pub operator: String,
    pub operator_mdid: MdId,
    pub col_id: u32,
}

/// Scalar operators, including the clause containers that group them.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "op")]
pub enum ScalarOp {
    Ident(ColRef),
    ConstValue(Datum),
    Comparison {
        operator: String,
        operator_mdid: MdId,
    },
    IsDistinctFrom {
        operator_mdid: MdId,
    },
    OpExpr {
        operator: String,
        operator_mdid: MdId,
        return_type: Option<MdId>,
    },
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    BooleanTest {
        test: BoolTestType,
    },
    NullIf {
        operator_mdid: MdId,
        type_mdid: MdId,
    },
    FuncExpr {
        func: MdId,
        returns_set: bool,
        return_type: MdId,
        type_modifier: i32,
        variadic: bool,
    },
    AggFunc {
        agg: MdId,
        distinct: bool,
        stage: AggStage,
        kind: AggKind,
        return_type: Option<MdId>,
    },
    WindowFunc {
        func: MdId,
        return_type: MdId,
        distinct: bool,
        star_arg: bool,
        simple_agg: bool,
        win_spec_pos: u32,
    },
    Cast {
        type_mdid: MdId,
        func: MdId,
    },
    CoerceToDomain(Coercion),
    #[strum(serialize = "CoerceViaIO")]
    CoerceViaIo(Coercion),
    ArrayCoerceExpr {
        element_func: MdId,
        coercion: Coercion,
        is_explicit: bool,
    },
    If {
        type_mdid: MdId,
    },
    Switch {
        type_mdid: MdId,
    },
    SwitchCase,
    CaseTest {
        type_mdid: MdId,
    },
    Coalesce {
        type_mdid: MdId,
    },
    MinMax {
        kind: MinMaxType,
        type_mdid: MdId,
    },
    Array {
        element_type: MdId,
        array_type: MdId,
        multidimensional: bool,
    },
    ArrayRef {
        element_type: MdId,
        element_type_modifier: i32,
        array_type: MdId,
        return_type: MdId,
    },
    ArrayIndexList {
        bound: ArrayBound,
    },
    ArrayRefExpr,
    ArrayRefAssignExpr,
    ArrayComp {
        operator: String,
        operator_mdid: MdId,
        kind: ArrayCompType,
    },
    SubPlan {
        type_mdid: MdId,
        subplan_type: SubPlanType,
        params: Vec<SubPlanParam>,
    },
    TestExpr,
    #[strum(serialize = "ScalarSubquery")]
    Subquery {
        col_id: u32,
    },
    SubqueryAny(QuantifiedSubquery),
    SubqueryAll(QuantifiedSubquery),
    SubqueryExists,
    SubqueryNotExists,
    BitmapIndexProbe {
        index: IndexDescriptor,
    },
    BitmapAnd {
        type_mdid: MdId,
    },
    BitmapOr {
        type_mdid: MdId,
    },
    #[strum(serialize = "DMLAction")]
    DmlAction,
    PartOid {
        level: u32,
    },
    PartDefault {
        level: u32,
    },
    PartBound {
        level: u32,
        type_mdid: MdId,
        is_lower: bool,
    },
    PartBoundInclusion {
        level: u32,
        is_lower: bool,
    },
    PartBoundOpen {
        level: u32,
        is_lower: bool,
    },
    PartListValues {
        level: u32,
        result_type: MdId,
        element_type: MdId,
    },
    PartListNullTest {
        level: u32,
        is_null: bool,
    },
    ValuesList,

    ProjList,
    ProjElem {
        col_id: u32,
        alias: String,
    },
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
    SortingColumn {
        col_id: u32,
        sort_operator: MdId,
        sort_operator_name: String,
        nulls_first: bool,
    },
    HashExprList,
    HashExpr {
        opfamily: Option<MdId>,
    },
    WindowFrame {
        spec: FrameSpec,
        exclusion: FrameExclusion,
    },
    LeadingEdge {
        boundary: FrameBoundary,
    },
    TrailingEdge {
        boundary: FrameBoundary,
    },
    AssertConstraintList,
    AssertConstraint {
        message: String,
    },
}

impl ScalarOp {
    /// DXL name of the operator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Whether this is a clause container rather than an expression.
    #[must_use]
    pub fn is_clause(&self) -> bool {
        matches!(
            self,
            Self::ProjList
                | Self::ProjElem { .. }
                | Self::Filter
                | Self::JoinFilter
                | Self::OneTimeFilter
                | Self::RecheckCond
                | Self::HashCondList
                | Self::MergeCondList
                | Self::IndexCondList
                | Self::LimitCount
                | Self::LimitOffset
                | Self::SortingColumnList
                | Self::SortingColumn { .. }
                | Self::HashExprList
                | Self::HashExpr { .. }
                | Self::WindowFrame { .. }
                | Self::LeadingEdge { .. }
                | Self::TrailingEdge { .. }
                | Self::AssertConstraintList
                | Self::AssertConstraint { .. }
        )
    }
}
