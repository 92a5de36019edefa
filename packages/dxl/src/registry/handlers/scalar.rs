//! Scalar expression kinds.

use super::{build, scalar};
use crate::ast::scalar::{ScalarOp, SubPlanParam};
use crate::ast::types::SubPlanType;
use crate::ast::{IndexDescriptor, Node};
use crate::factory;
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{
    at_least_of, exactly, exactly_of, many_of, one, one_of, opt, opt_of, some, some_of,
};
use crate::registry::kind::{Family, Kind};

const S: Family = Family::Scalar;
const L: Family = Family::Logical;

pub fn register(registry: &mut HandlerRegistry) {
    // Leaves
    registry.register(Kind::Ident, vec![], |attrs, _| {
        scalar(ScalarOp::Ident(factory::col_ref(attrs)?))
    });
    registry.register(Kind::ConstValue, vec![], |attrs, _| {
        scalar(ScalarOp::ConstValue(factory::datum(attrs)?))
    });
    registry.register(Kind::CaseTest, vec![], |attrs, _| {
        scalar(ScalarOp::CaseTest {
            type_mdid: attrs.required("TypeMdid")?,
        })
    });
    registry.register(Kind::DmlAction, vec![], |_, _| scalar(ScalarOp::DmlAction));

    // Comparisons and operators
    registry.register(Kind::Comparison, vec![exactly_of(S, 2)], |attrs, _| {
        scalar(ScalarOp::Comparison {
            operator: attrs.required("ComparisonOperator")?,
            operator_mdid: attrs.required("OperatorMdid")?,
        })
    });
    registry.register(Kind::IsDistinctFrom, vec![exactly_of(S, 2)], |attrs, _| {
        scalar(ScalarOp::IsDistinctFrom {
            operator_mdid: attrs.required("OperatorMdid")?,
        })
    });
    registry.register(Kind::OpExpr, vec![one_of(S), opt_of(S)], |attrs, _| {
        scalar(ScalarOp::OpExpr {
            operator: attrs.required("OperatorName")?,
            operator_mdid: attrs.required("OperatorMdid")?,
            return_type: attrs.optional("OperatorType")?,
        })
    });
    registry.register(Kind::NullIf, vec![exactly_of(S, 2)], |attrs, _| {
        scalar(ScalarOp::NullIf {
            operator_mdid: attrs.required("OperatorMdid")?,
            type_mdid: attrs.required("TypeMdid")?,
        })
    });
    registry.register(Kind::ArrayComp, vec![exactly_of(S, 2)], |attrs, _| {
        scalar(ScalarOp::ArrayComp {
            operator: attrs.required("OperatorName")?,
            operator_mdid: attrs.required("OperatorMdid")?,
            kind: attrs.required("OperatorType")?,
        })
    });

    // Boolean connectives and tests
    registry.register(Kind::And, vec![at_least_of(S, 2)], |_, _| scalar(ScalarOp::And));
    registry.register(Kind::Or, vec![at_least_of(S, 2)], |_, _| scalar(ScalarOp::Or));
    registry.register(Kind::Not, vec![one_of(S)], |_, _| scalar(ScalarOp::Not));
    registry.register(Kind::IsNull, vec![one_of(S)], |_, _| scalar(ScalarOp::IsNull));
    registry.register(Kind::IsNotNull, vec![one_of(S)], |_, _| {
        scalar(ScalarOp::IsNotNull)
    });
    registry.register(Kind::BooleanTest, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::BooleanTest {
            test: attrs.required("BooleanTestType")?,
        })
    });

    // Calls
    registry.register(Kind::FuncExpr, vec![many_of(S)], |attrs, _| {
        scalar(ScalarOp::FuncExpr {
            func: attrs.required("FuncId")?,
            returns_set: attrs.required("FuncRetSet")?,
            return_type: attrs.required("TypeMdid")?,
            type_modifier: attrs.optional_or("TypeModifier", factory::DEFAULT_TYPE_MODIFIER)?,
            variadic: attrs.optional_or("FuncVariadic", false)?,
        })
    });
    registry.register(Kind::AggFunc, vec![many_of(S)], |attrs, _| {
        scalar(ScalarOp::AggFunc {
            agg: attrs.required("AggMdid")?,
            distinct: attrs.required("AggDistinct")?,
            stage: attrs.required("AggStage")?,
            kind: attrs.optional_or("AggKind", crate::ast::types::AggKind::Normal)?,
            return_type: attrs.optional("TypeMdid")?,
        })
    });
    registry.register(Kind::WindowFunc, vec![many_of(S)], |attrs, _| {
        scalar(ScalarOp::WindowFunc {
            func: attrs.required("Mdid")?,
            return_type: attrs.required("TypeMdid")?,
            distinct: attrs.required("Distinct")?,
            star_arg: attrs.optional_or("WindowStarArg", false)?,
            simple_agg: attrs.optional_or("WindowSimpleAgg", false)?,
            win_spec_pos: attrs.required("WinSpecPos")?,
        })
    });

    // Casts and coercions
    registry.register(Kind::Cast, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::Cast {
            type_mdid: attrs.required("TypeMdid")?,
            func: attrs.required("FuncId")?,
        })
    });
    registry.register(Kind::CoerceToDomain, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::CoerceToDomain(factory::coercion(attrs)?))
    });
    registry.register(Kind::CoerceViaIo, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::CoerceViaIo(factory::coercion(attrs)?))
    });
    registry.register(Kind::ArrayCoerceExpr, vec![one_of(S)], |attrs, _| {
        scalar(ScalarOp::ArrayCoerceExpr {
            element_func: attrs.required("ElementFunc")?,
            coercion: factory::coercion(attrs)?,
            is_explicit: attrs.optional_or("IsExplicit", false)?,
        })
    });

    // Conditionals
    registry.register(Kind::If, vec![exactly_of(S, 3)], |attrs, _| {
        scalar(ScalarOp::If {
            type_mdid: attrs.required("TypeMdid")?,
        })
    });
    registry.register(
        Kind::Switch,
        vec![one_of(S), some(Kind::SwitchCase), opt_of(S)],
        |attrs, _| {
            scalar(ScalarOp::Switch {
                type_mdid: attrs.required("TypeMdid")?,
            })
        },
    );
    registry.register(Kind::Coalesce, vec![some_of(S)], |attrs, _| {
        scalar(ScalarOp::Coalesce {
            type_mdid: attrs.required("TypeMdid")?,
        })
    });
    registry.register(Kind::MinMax, vec![some_of(S)], |attrs, _| {
        scalar(ScalarOp::MinMax {
            kind: attrs.required("MinMaxType")?,
            type_mdid: attrs.required("TypeMdid")?,
        })
    });

    // Arrays
    registry.register(Kind::Array, vec![many_of(S)], |attrs, _| {
        scalar(ScalarOp::Array {
            element_type: attrs.required("ElementType")?,
            array_type: attrs.required("ArrayType")?,
            multidimensional: attrs.optional_or("MultiDimensional", false)?,
        })
    });
    registry.register(
        Kind::ArrayRef,
        vec![
            exactly(Kind::ArrayIndexList, 2),
            one(Kind::ArrayRefExpr),
            opt(Kind::ArrayRefAssignExpr),
        ],
        |attrs, _| {
            scalar(ScalarOp::ArrayRef {
                element_type: attrs.required("ElementType")?,
                element_type_modifier: attrs
                    .optional_or("ElementTypeModifier", factory::DEFAULT_TYPE_MODIFIER)?,
                array_type: attrs.required("ArrayType")?,
                return_type: attrs.required("TypeMdid")?,
            })
        },
    );

    // Sub-plans and subqueries
    registry.register(
        Kind::SubPlan,
        vec![one(Kind::TestExpr), one(Kind::ParamList), one_of(Family::Physical)],
        |attrs, _| {
            let type_mdid = attrs.required("TypeMdid")?;
            let subplan_type: SubPlanType = attrs.required("SubPlanType")?;
            build(move |mut slots| {
                let test_expr: Node = slots.one()?;
                let params: Vec<SubPlanParam> = slots.one()?;
                let plan: Node = slots.one()?;
                slots.finish()?;
                let op = ScalarOp::SubPlan {
                    type_mdid,
                    subplan_type,
                    params,
                };
                Ok(Node::scalar(op, vec![test_expr, plan]).into())
            })
        },
    );
    registry.register(Kind::ScalarSubquery, vec![one_of(L)], |attrs, _| {
        scalar(ScalarOp::Subquery {
            col_id: attrs.required("ColId")?,
        })
    });
    registry.register(Kind::SubqueryAny, vec![one_of(S), one_of(L)], |attrs, _| {
        scalar(ScalarOp::SubqueryAny(factory::quantified_subquery(attrs)?))
    });
    registry.register(Kind::SubqueryAll, vec![one_of(S), one_of(L)], |attrs, _| {
        scalar(ScalarOp::SubqueryAll(factory::quantified_subquery(attrs)?))
    });
    registry.register(Kind::SubqueryExists, vec![one_of(L)], |_, _| {
        scalar(ScalarOp::SubqueryExists)
    });
    registry.register(Kind::SubqueryNotExists, vec![one_of(L)], |_, _| {
        scalar(ScalarOp::SubqueryNotExists)
    });

    // Bitmap index access
    registry.register(
        Kind::BitmapIndexProbe,
        vec![one(Kind::IndexCondList), one(Kind::IndexDescriptor)],
        |_, _| {
            build(|mut slots| {
                let conditions: Node = slots.one()?;
                let index: IndexDescriptor = slots.one()?;
                slots.finish()?;
                Ok(Node::scalar(ScalarOp::BitmapIndexProbe { index }, vec![conditions]).into())
            })
        },
    );
    registry.register(Kind::BitmapAnd, vec![at_least_of(S, 2)], |attrs, _| {
        scalar(ScalarOp::BitmapAnd {
            type_mdid: attrs.required("TypeMdid")?,
        })
    });
    registry.register(Kind::BitmapOr, vec![at_least_of(S, 2)], |attrs, _| {
        scalar(ScalarOp::BitmapOr {
            type_mdid: attrs.required("TypeMdid")?,
        })
    });

    // Partition expressions
    registry.register(Kind::PartOid, vec![], |attrs, _| {
        scalar(ScalarOp::PartOid {
            level: attrs.required("Level")?,
        })
    });
    registry.register(Kind::PartDefault, vec![], |attrs, _| {
        scalar(ScalarOp::PartDefault {
            level: attrs.required("Level")?,
        })
    });
    registry.register(Kind::PartBound, vec![], |attrs, _| {
        scalar(ScalarOp::PartBound {
            level: attrs.required("Level")?,
            type_mdid: attrs.required("MDType")?,
            is_lower: attrs.required("IsLowerBound")?,
        })
    });
    registry.register(Kind::PartBoundInclusion, vec![], |attrs, _| {
        scalar(ScalarOp::PartBoundInclusion {
            level: attrs.required("Level")?,
            is_lower: attrs.required("IsLowerBound")?,
        })
    });
    registry.register(Kind::PartBoundOpen, vec![], |attrs, _| {
        scalar(ScalarOp::PartBoundOpen {
            level: attrs.required("Level")?,
            is_lower: attrs.required("IsLowerBound")?,
        })
    });
    registry.register(Kind::PartListValues, vec![], |attrs, _| {
        scalar(ScalarOp::PartListValues {
            level: attrs.required("Level")?,
            result_type: attrs.required("ResultType")?,
            element_type: attrs.required("ElementType")?,
        })
    });
    registry.register(Kind::PartListNullTest, vec![], |attrs, _| {
        scalar(ScalarOp::PartListNullTest {
            level: attrs.required("Level")?,
            is_null: attrs.required("IsNull")?,
        })
    });
}

#[cfg(test)]
mod tests {
    use crate::ast::scalar::ScalarOp;
    use crate::ast::types::{ArrayCompType, BoolTestType};
    use crate::ast::Node;
    use crate::config::ParseOptions;
    use crate::error::{DxlError, Result};
    use crate::event::Event;
    use crate::registry::engine::ParseEngine;
    use crate::registry::kind::Kind;

    fn parse(root: Kind, events: Vec<Event>) -> Result<Node> {
        let mut engine = ParseEngine::with_root(root, ParseOptions::new())?;
        engine.feed_all(events.into_iter().map(Ok))?;
        engine.finish_node()
    }

    fn ident(id: &str) -> Vec<Event> {
        vec![
            Event::open(
                "Ident",
                [("ColId", id), ("ColName", "c"), ("TypeMdid", "0.23.1.0")],
            ),
            Event::close("Ident"),
        ]
    }

    fn int4(value: &str) -> Vec<Event> {
        vec![
            Event::open(
                "ConstValue",
                [("TypeMdid", "0.23.1.0"), ("IsByValue", "true"), ("Value", value)],
            ),
            Event::close("ConstValue"),
        ]
    }

    fn wrap(tag: &str, attrs: &[(&str, &str)], inner: Vec<Vec<Event>>) -> Vec<Event> {
        let mut events = vec![Event::open(tag, attrs.iter().copied())];
        events.extend(inner.into_iter().flatten());
        events.push(Event::close(tag));
        events
    }

    #[test]
    fn test_comparison() {
        let events = wrap(
            "Comparison",
            &[("ComparisonOperator", "="), ("OperatorMdid", "0.96.1.0")],
            vec![ident("1"), int4("5")],
        );
        let node = parse(Kind::Comparison, events).unwrap();
        assert_eq!(node.arity(), 2);
        assert_eq!(node.children[0].name(), "Ident");
        assert_eq!(node.children[1].name(), "ConstValue");
    }

    #[test]
    fn test_comparison_with_one_operand_fails() {
        let events = wrap(
            "Comparison",
            &[("ComparisonOperator", "="), ("OperatorMdid", "0.96.1.0")],
            vec![ident("1")],
        );
        let err = parse(Kind::Comparison, events).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_third_comparison_operand_is_unexpected() {
        let events = wrap(
            "Comparison",
            &[("ComparisonOperator", "="), ("OperatorMdid", "0.96.1.0")],
            vec![ident("1"), ident("2"), ident("3")],
        );
        let err = parse(Kind::Comparison, events).unwrap_err();
        assert!(matches!(err, DxlError::UnexpectedTag { ref tag, .. } if tag == "Ident"));
    }

    #[test]
    fn test_not_takes_exactly_one() {
        let events = wrap("Not", &[], vec![ident("1")]);
        assert_eq!(parse(Kind::Not, events).unwrap().arity(), 1);
    }

    #[test]
    fn test_or_accepts_many() {
        let events = wrap("Or", &[], vec![ident("1"), ident("2"), ident("3"), ident("4")]);
        assert_eq!(parse(Kind::Or, events).unwrap().arity(), 4);
    }

    #[test]
    fn test_func_expr_accepts_zero_args() {
        let events = wrap(
            "FuncExpr",
            &[("FuncId", "0.1.1.0"), ("FuncRetSet", "false"), ("TypeMdid", "0.23.1.0")],
            vec![],
        );
        assert_eq!(parse(Kind::FuncExpr, events).unwrap().arity(), 0);
    }

    #[test]
    fn test_boolean_test_attribute() {
        let events = wrap("BooleanTest", &[("BooleanTestType", "IsFalse")], vec![ident("1")]);
        let node = parse(Kind::BooleanTest, events).unwrap();
        assert_eq!(
            node.as_scalar(),
            Some(&ScalarOp::BooleanTest {
                test: BoolTestType::IsFalse
            })
        );
    }

    #[test]
    fn test_switch_with_default() {
        let case = wrap("SwitchCase", &[], vec![int4("1"), int4("10")]);
        let events = wrap(
            "Switch",
            &[("TypeMdid", "0.23.1.0")],
            vec![ident("1"), case.clone(), case, int4("0")],
        );
        let node = parse(Kind::Switch, events).unwrap();
        let names: Vec<&str> = node.children.iter().map(Node::name).collect();
        assert_eq!(names, vec!["Ident", "SwitchCase", "SwitchCase", "ConstValue"]);
    }

    #[test]
    fn test_switch_requires_a_case() {
        let events = wrap("Switch", &[("TypeMdid", "0.23.1.0")], vec![ident("1")]);
        assert!(parse(Kind::Switch, events).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_array_comp() {
        let array = wrap(
            "Array",
            &[("ElementType", "0.23.1.0"), ("ArrayType", "0.1007.1.0")],
            vec![int4("1"), int4("2")],
        );
        let events = wrap(
            "ArrayComp",
            &[
                ("OperatorName", "="),
                ("OperatorMdid", "0.96.1.0"),
                ("OperatorType", "Any"),
            ],
            vec![ident("1"), array],
        );
        let node = parse(Kind::ArrayComp, events).unwrap();
        assert!(matches!(
            node.as_scalar(),
            Some(ScalarOp::ArrayComp {
                kind: ArrayCompType::Any,
                ..
            })
        ));
        assert_eq!(node.children[1].arity(), 2);
    }

    #[test]
    fn test_malformed_col_id() {
        let events = vec![
            Event::open(
                "Ident",
                [("ColId", "abc"), ("ColName", "c"), ("TypeMdid", "0.23.1.0")],
            ),
            Event::close("Ident"),
        ];
        let err = parse(Kind::Ident, events).unwrap_err();
        assert!(matches!(
            err,
            DxlError::MalformedAttributeValue { ref attribute, ref value, .. }
                if attribute == "ColId" && value == "abc"
        ));
    }
}
