//! Logical operators of a query tree.
//!
//! Descriptor children (table descriptors, column lists, grouping columns,
//! window specifications) are folded into the operator; only operator and
//! clause children remain in the node's child list.

use super::{build, logical};
use crate::ast::logical::{LogicalOp, WindowSpec};
use crate::ast::types::SetOpKind;
use crate::ast::{ColumnDescriptor, Node, TableDescriptor};
use crate::attrs::Attrs;
use crate::error::Result;
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{at_least_of, many, many_of, one, one_of};
use crate::registry::kind::{Family, Kind};
use crate::registry::types::{Build, GroupingColumns, Tuple};

const S: Family = Family::Scalar;
const L: Family = Family::Logical;

/// Builder for an operator whose first child is a table descriptor.
fn on_table<F>(make: F) -> Result<Build>
where
    F: FnOnce(TableDescriptor) -> LogicalOp + 'static,
{
    build(move |mut slots| {
        let table = slots.one()?;
        let children = slots.rest()?;
        Ok(Node::logical(make(table), children).into())
    })
}

/// Builder for an operator whose first child is a column list.
fn on_columns<F>(make: F) -> Result<Build>
where
    F: FnOnce(Vec<ColumnDescriptor>) -> LogicalOp + 'static,
{
    build(move |mut slots| {
        let columns = slots.one()?;
        let children = slots.rest()?;
        Ok(Node::logical(make(columns), children).into())
    })
}

/// Opener shared by the set operations; `kind` comes from the registered entry.
fn set_op(kind: SetOpKind, attrs: &Attrs) -> Result<Build> {
    let input_columns = attrs.list_of_lists("InputColumns")?;
    let cast_across_inputs = attrs.optional_or("CastAcrossInputs", false)?;
    on_columns(move |columns| LogicalOp::SetOp {
        kind,
        columns,
        input_columns,
        cast_across_inputs,
    })
}

macro_rules! register_set_ops {
    ($registry:expr, $($kind:ident),* $(,)?) => {
        $(
            $registry.register(
                Kind::$kind,
                vec![one(Kind::Columns), at_least_of(L, 2)],
                |attrs, _| set_op(SetOpKind::$kind, attrs),
            );
        )*
    };
}

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(Kind::LogicalGet, vec![one(Kind::TableDescriptor)], |_, _| {
        on_table(|table| LogicalOp::Get { table })
    });
    registry.register(Kind::LogicalExternalGet, vec![one(Kind::TableDescriptor)], |_, _| {
        on_table(|table| LogicalOp::ExternalGet { table })
    });
    registry.register(
        Kind::LogicalProject,
        vec![one(Kind::ProjList), one_of(L)],
        |_, _| logical(LogicalOp::Project),
    );
    registry.register(Kind::LogicalSelect, vec![one_of(S), one_of(L)], |_, _| {
        logical(LogicalOp::Select)
    });
    registry.register(
        Kind::LogicalJoin,
        vec![at_least_of(L, 2), one_of(S)],
        |attrs, _| {
            logical(LogicalOp::Join {
                join_type: attrs.required("JoinType")?,
            })
        },
    );
    registry.register(
        Kind::LogicalGroupBy,
        vec![one(Kind::GroupingColumns), one(Kind::ProjList), one_of(L)],
        |_, _| {
            build(|mut slots| {
                let GroupingColumns(grouping_columns) = slots.one()?;
                let op = LogicalOp::GroupBy { grouping_columns };
                Ok(Node::logical(op, slots.rest()?).into())
            })
        },
    );
    registry.register(
        Kind::LogicalLimit,
        vec![
            one(Kind::SortingColumnList),
            one(Kind::LimitCount),
            one(Kind::LimitOffset),
            one_of(L),
        ],
        |attrs, _| {
            logical(LogicalOp::Limit {
                top_limit_under_dml: attrs.optional_or("TopLimitUnderDML", false)?,
            })
        },
    );
    registry.register(
        Kind::LogicalConstTable,
        vec![one(Kind::Columns), many(Kind::ConstTuple)],
        |_, _| {
            build(|mut slots| {
                let columns = slots.one()?;
                let rows = slots
                    .many::<Tuple>()?
                    .into_iter()
                    .map(|Tuple(datums)| datums)
                    .collect();
                slots.finish()?;
                Ok(Node::logical(LogicalOp::ConstTable { columns, rows }, vec![]).into())
            })
        },
    );

    register_set_ops!(
        registry,
        Union,
        UnionAll,
        Intersect,
        IntersectAll,
        Difference,
        DifferenceAll,
    );

    registry.register(Kind::LogicalCteProducer, vec![one_of(L)], |attrs, _| {
        logical(LogicalOp::CteProducer {
            cte_id: attrs.required("CTEId")?,
            columns: attrs.list("Columns")?,
        })
    });
    registry.register(Kind::LogicalCteConsumer, vec![], |attrs, _| {
        logical(LogicalOp::CteConsumer {
            cte_id: attrs.required("CTEId")?,
            columns: attrs.list("Columns")?,
        })
    });
    registry.register(Kind::LogicalCteAnchor, vec![one_of(L)], |attrs, _| {
        logical(LogicalOp::CteAnchor {
            cte_id: attrs.required("CTEId")?,
        })
    });
    registry.register(
        Kind::LogicalTvf,
        vec![one(Kind::Columns), many_of(S)],
        |attrs, _| {
            let func = attrs.required("FuncId")?;
            let name = attrs.required("Name")?;
            let return_type = attrs.required("TypeMdid")?;
            on_columns(move |columns| LogicalOp::Tvf {
                func,
                name,
                return_type,
                columns,
            })
        },
    );
    registry.register(
        Kind::LogicalWindow,
        vec![one(Kind::WindowSpecList), one(Kind::ProjList), one_of(L)],
        |_, _| {
            build(|mut slots| {
                let specs: Vec<WindowSpec> = slots.one()?;
                Ok(Node::logical(LogicalOp::Window { specs }, slots.rest()?).into())
            })
        },
    );

    // DML
    registry.register(
        Kind::LogicalInsert,
        vec![one(Kind::TableDescriptor), one_of(L)],
        |attrs, _| {
            let source_columns = attrs.list("InsertColumns")?;
            on_table(move |table| LogicalOp::Insert {
                table,
                source_columns,
            })
        },
    );
    registry.register(
        Kind::LogicalDelete,
        vec![one(Kind::TableDescriptor), one_of(L)],
        |attrs, _| {
            let ctid_col = attrs.required("CtidCol")?;
            let segment_id_col = attrs.required("SegmentIdCol")?;
            let deletion_columns = attrs.list("DeleteColumns")?;
            on_table(move |table| LogicalOp::Delete {
                table,
                ctid_col,
                segment_id_col,
                deletion_columns,
            })
        },
    );
    registry.register(
        Kind::LogicalUpdate,
        vec![one(Kind::TableDescriptor), one_of(L)],
        |attrs, _| {
            let ctid_col = attrs.required("CtidCol")?;
            let segment_id_col = attrs.required("SegmentIdCol")?;
            let deletion_columns = attrs.list("DeleteColumns")?;
            let insertion_columns = attrs.list("InsertColumns")?;
            on_table(move |table| LogicalOp::Update {
                table,
                ctid_col,
                segment_id_col,
                deletion_columns,
                insertion_columns,
            })
        },
    );
}

#[cfg(test)]
mod tests {
    use crate::ast::logical::LogicalOp;
    use crate::ast::types::{JoinType, SetOpKind};
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

    fn columns() -> Vec<Event> {
        vec![
            Event::open_empty("Columns"),
            Event::open(
                "Column",
                [
                    ("ColId", "1"),
                    ("Attno", "1"),
                    ("ColName", "a"),
                    ("TypeMdid", "0.23.1.0"),
                ],
            ),
            Event::close("Column"),
            Event::close("Columns"),
        ]
    }

    fn get(table: &str) -> Vec<Event> {
        let mut events = vec![
            Event::open_empty("LogicalGet"),
            Event::open("TableDescriptor", [("Mdid", "6.16384.1.1"), ("TableName", table)]),
        ];
        events.extend(columns());
        events.push(Event::close("TableDescriptor"));
        events.push(Event::close("LogicalGet"));
        events
    }

    fn comparison() -> Vec<Event> {
        vec![
            Event::open(
                "Comparison",
                [("ComparisonOperator", "="), ("OperatorMdid", "0.96.1.0")],
            ),
            Event::open(
                "Ident",
                [("ColId", "1"), ("ColName", "a"), ("TypeMdid", "0.23.1.0")],
            ),
            Event::close("Ident"),
            Event::open(
                "Ident",
                [("ColId", "2"), ("ColName", "b"), ("TypeMdid", "0.23.1.0")],
            ),
            Event::close("Ident"),
            Event::close("Comparison"),
        ]
    }

    #[test]
    fn test_get_folds_table_descriptor() {
        let node = parse(Kind::LogicalGet, get("t1")).unwrap();
        assert_eq!(node.arity(), 0);
        match node.as_logical() {
            Some(LogicalOp::Get { table }) => {
                assert_eq!(table.name, "t1");
                assert_eq!(table.columns.len(), 1);
            }
            other => panic!("unexpected operator {other:?}"),
        }
    }

    #[test]
    fn test_join_children_in_document_order() {
        let mut events = vec![Event::open("LogicalJoin", [("JoinType", "Left")])];
        events.extend(get("t1"));
        events.extend(get("t2"));
        events.extend(comparison());
        events.push(Event::close("LogicalJoin"));

        let node = parse(Kind::LogicalJoin, events).unwrap();
        assert_eq!(
            node.as_logical(),
            Some(&LogicalOp::Join {
                join_type: JoinType::Left
            })
        );
        let names: Vec<&str> = node.children.iter().map(Node::name).collect();
        assert_eq!(names, vec!["LogicalGet", "LogicalGet", "Comparison"]);
    }

    #[test]
    fn test_join_condition_before_inputs_is_unexpected() {
        let mut events = vec![Event::open("LogicalJoin", [("JoinType", "Inner")])];
        events.extend(comparison());
        let err = parse(Kind::LogicalJoin, events).unwrap_err();
        assert!(matches!(err, DxlError::UnexpectedTag { ref tag, .. } if tag == "Comparison"));
    }

    #[test]
    fn test_union_all() {
        let mut events = vec![Event::open(
            "UnionAll",
            [("InputColumns", "1;1"), ("CastAcrossInputs", "false")],
        )];
        events.extend(columns());
        events.extend(get("t1"));
        events.extend(get("t2"));
        events.push(Event::close("UnionAll"));

        let node = parse(Kind::UnionAll, events).unwrap();
        assert_eq!(node.name(), "UnionAll");
        match node.as_logical() {
            Some(LogicalOp::SetOp {
                kind,
                input_columns,
                ..
            }) => {
                assert_eq!(*kind, SetOpKind::UnionAll);
                assert_eq!(input_columns, &vec![vec![1], vec![1]]);
            }
            other => panic!("unexpected operator {other:?}"),
        }
    }

    #[test]
    fn test_set_op_kind_follows_registered_element() {
        let cases = [
            (Kind::Union, SetOpKind::Union),
            (Kind::UnionAll, SetOpKind::UnionAll),
            (Kind::Intersect, SetOpKind::Intersect),
            (Kind::IntersectAll, SetOpKind::IntersectAll),
            (Kind::Difference, SetOpKind::Difference),
            (Kind::DifferenceAll, SetOpKind::DifferenceAll),
        ];
        for (root, expected) in cases {
            let mut events = vec![Event::open(root.tag_name(), [("InputColumns", "1;1")])];
            events.extend(columns());
            events.extend(get("t1"));
            events.extend(get("t2"));
            events.push(Event::close(root.tag_name()));

            let node = parse(root, events).unwrap();
            match node.as_logical() {
                Some(LogicalOp::SetOp { kind, .. }) => assert_eq!(*kind, expected, "{root}"),
                other => panic!("unexpected operator {other:?}"),
            }
        }
    }

    #[test]
    fn test_const_table_rows() {
        let mut events = vec![Event::open_empty("LogicalConstTable")];
        events.extend(columns());
        for value in ["1", "2"] {
            events.push(Event::open_empty("ConstTuple"));
            events.push(Event::open(
                "Datum",
                [("TypeMdid", "0.23.1.0"), ("IsByValue", "true"), ("Value", value)],
            ));
            events.push(Event::close("Datum"));
            events.push(Event::close("ConstTuple"));
        }
        events.push(Event::close("LogicalConstTable"));

        let node = parse(Kind::LogicalConstTable, events).unwrap();
        match node.as_logical() {
            Some(LogicalOp::ConstTable { rows, .. }) => {
                let values: Vec<Option<i64>> = rows.iter().map(|row| row[0].as_i64()).collect();
                assert_eq!(values, vec![Some(1), Some(2)]);
            }
            other => panic!("unexpected operator {other:?}"),
        }
    }

    #[test]
    fn test_select_requires_input() {
        let mut events = vec![Event::open_empty("LogicalSelect")];
        events.extend(comparison());
        events.push(Event::close("LogicalSelect"));
        assert!(parse(Kind::LogicalSelect, events)
            .unwrap_err()
            .is_invariant_violation());
    }
}
