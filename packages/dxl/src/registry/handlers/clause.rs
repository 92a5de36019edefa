//! Structural clauses: projection lists, filters, sort and hash keys,
//! window frames and the helper elements of scalar operators.

use super::scalar;
use crate::ast::scalar::ScalarOp;
use crate::ast::types::FrameExclusion;
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{exactly_of, many, many_of, one_of, opt, opt_of, some};
use crate::registry::kind::{Family, Kind};

const S: Family = Family::Scalar;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(Kind::SwitchCase, vec![exactly_of(S, 2)], |_, _| {
        scalar(ScalarOp::SwitchCase)
    });
    registry.register(Kind::ArrayIndexList, vec![many_of(S)], |attrs, _| {
        scalar(ScalarOp::ArrayIndexList {
            bound: attrs.required("OpType")?,
        })
    });
    registry.register(Kind::ArrayRefExpr, vec![one_of(S)], |_, _| {
        scalar(ScalarOp::ArrayRefExpr)
    });
    registry.register(Kind::ArrayRefAssignExpr, vec![one_of(S)], |_, _| {
        scalar(ScalarOp::ArrayRefAssignExpr)
    });
    registry.register(Kind::TestExpr, vec![opt_of(S)], |_, _| scalar(ScalarOp::TestExpr));
    registry.register(Kind::ValuesList, vec![many_of(S)], |_, _| {
        scalar(ScalarOp::ValuesList)
    });

    registry.register(Kind::ProjList, vec![many(Kind::ProjElem)], |_, _| {
        scalar(ScalarOp::ProjList)
    });
    registry.register(Kind::ProjElem, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::ProjElem {
            col_id: attrs.required("ColId")?,
            alias: attrs.required("Alias")?,
        })
    });

    // Optional single-expression wrappers
    registry.register(Kind::Filter, vec![opt_of(S)], |_, _| scalar(ScalarOp::Filter));
    registry.register(Kind::JoinFilter, vec![opt_of(S)], |_, _| {
        scalar(ScalarOp::JoinFilter)
    });
    registry.register(Kind::OneTimeFilter, vec![opt_of(S)], |_, _| {
        scalar(ScalarOp::OneTimeFilter)
    });
    registry.register(Kind::RecheckCond, vec![opt_of(S)], |_, _| {
        scalar(ScalarOp::RecheckCond)
    });
    registry.register(Kind::LimitCount, vec![opt_of(S)], |_, _| {
        scalar(ScalarOp::LimitCount)
    });
    registry.register(Kind::LimitOffset, vec![opt_of(S)], |_, _| {
        scalar(ScalarOp::LimitOffset)
    });

    // Condition lists
    registry.register(Kind::HashCondList, vec![many_of(S)], |_, _| {
        scalar(ScalarOp::HashCondList)
    });
    registry.register(Kind::MergeCondList, vec![many_of(S)], |_, _| {
        scalar(ScalarOp::MergeCondList)
    });
    registry.register(Kind::IndexCondList, vec![many_of(S)], |_, _| {
        scalar(ScalarOp::IndexCondList)
    });

    registry.register(Kind::SortingColumnList, vec![many(Kind::SortingColumn)], |_, _| {
        scalar(ScalarOp::SortingColumnList)
    });
    registry.register(Kind::SortingColumn, vec![], |attrs, _| {
        scalar(ScalarOp::SortingColumn {
            col_id: attrs.required("ColId")?,
            sort_operator: attrs.required("SortOperatorMdid")?,
            sort_operator_name: attrs.required("SortOperatorName")?,
            nulls_first: attrs.optional_or("SortNullsFirst", false)?,
        })
    });

    registry.register(Kind::HashExprList, vec![some(Kind::HashExpr)], |_, _| {
        scalar(ScalarOp::HashExprList)
    });
    registry.register(Kind::HashExpr, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::HashExpr {
            opfamily: attrs.optional("Opfamily")?,
        })
    });

    registry.register(
        Kind::WindowFrame,
        vec![opt(Kind::TrailingEdge), opt(Kind::LeadingEdge)],
        |attrs, _| {
            scalar(ScalarOp::WindowFrame {
                spec: attrs.required("FrameSpec")?,
                exclusion: attrs.optional_or("ExclusionStrategy", FrameExclusion::None)?,
            })
        },
    );
    registry.register(Kind::LeadingEdge, vec![opt_of(S)], |attrs, _| {
        scalar(ScalarOp::LeadingEdge {
            boundary: attrs.required("FrameBoundary")?,
        })
    });
    registry.register(Kind::TrailingEdge, vec![opt_of(S)], |attrs, _| {
        scalar(ScalarOp::TrailingEdge {
            boundary: attrs.required("FrameBoundary")?,
        })
    });

    registry.register(
        Kind::AssertConstraintList,
        vec![some(Kind::AssertConstraint)],
        |_, _| scalar(ScalarOp::AssertConstraintList),
    );
    registry.register(Kind::AssertConstraint, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::AssertConstraint {
            message: attrs.required("ErrorMessage")?,
        })
    });
}
