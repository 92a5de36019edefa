//! Physical operators of a plan tree.
//!
//! Every physical grammar starts with `Properties`, which becomes the node's
//! properties. Table, index and window-key descriptors are folded into the
//! operator; the remaining clause and operator children keep their document
//! order.

use super::{build, physical};
use crate::ast::physical::{IndexScanInfo, PhysicalOp, Spool, WindowKey};
use crate::ast::types::IndexScanDirection;
use crate::ast::{IndexDescriptor, Node, PlanProperties, TableDescriptor};
use crate::error::Result;
use crate::factory;
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{exactly_of, many, many_of, one, one_of, opt_of, Part, some_of};
use crate::registry::kind::{Family, Kind};
use crate::registry::types::{Build, GroupingColumns};

const S: Family = Family::Scalar;
const P: Family = Family::Physical;

/// Grammar that starts with the properties, projection list and filter
/// shared by most physical operators.
fn common(rest: impl IntoIterator<Item = Part>) -> Vec<Part> {
    let mut grammar = vec![one(Kind::Properties), one(Kind::ProjList), one(Kind::Filter)];
    grammar.extend(rest);
    grammar
}

/// Builder for scans whose last child is a table descriptor.
fn table_scan<F>(make: F) -> Result<Build>
where
    F: FnOnce(TableDescriptor) -> PhysicalOp + 'static,
{
    build(move |mut slots| {
        let properties: PlanProperties = slots.one()?;
        let proj_list: Node = slots.one()?;
        let filter: Node = slots.one()?;
        let table = slots.one()?;
        slots.finish()?;
        Ok(Node::physical(make(table), properties, vec![proj_list, filter]).into())
    })
}

/// Builder for index scans: conditions, then index and table descriptors.
fn index_scan<F>(direction: IndexScanDirection, make: F) -> Result<Build>
where
    F: FnOnce(IndexScanInfo) -> PhysicalOp + 'static,
{
    build(move |mut slots| {
        let properties: PlanProperties = slots.one()?;
        let proj_list: Node = slots.one()?;
        let filter: Node = slots.one()?;
        let conditions: Node = slots.one()?;
        let index: IndexDescriptor = slots.one()?;
        let table: TableDescriptor = slots.one()?;
        slots.finish()?;
        let scan = IndexScanInfo {
            direction,
            index,
            table,
        };
        Ok(Node::physical(make(scan), properties, vec![proj_list, filter, conditions]).into())
    })
}

/// Builder for bitmap scans: recheck condition and access path, then table.
fn bitmap_scan<F>(make: F) -> Result<Build>
where
    F: FnOnce(TableDescriptor) -> PhysicalOp + 'static,
{
    build(move |mut slots| {
        let properties: PlanProperties = slots.one()?;
        let proj_list: Node = slots.one()?;
        let filter: Node = slots.one()?;
        let recheck: Node = slots.one()?;
        let access: Node = slots.one()?;
        let table = slots.one()?;
        slots.finish()?;
        let children = vec![proj_list, filter, recheck, access];
        Ok(Node::physical(make(table), properties, children).into())
    })
}

/// Builder for DML operators, whose table descriptor sits between the
/// projection list and the input.
fn dml<F>(make: F) -> Result<Build>
where
    F: FnOnce(TableDescriptor) -> PhysicalOp + 'static,
{
    build(move |mut slots| {
        let properties: PlanProperties = slots.one()?;
        let proj_list: Node = slots.one()?;
        let table = slots.one()?;
        let input: Node = slots.one()?;
        slots.finish()?;
        Ok(Node::physical(make(table), properties, vec![proj_list, input]).into())
    })
}

fn register_scans(registry: &mut HandlerRegistry) {
    registry.register(
        Kind::TableScan,
        common([one(Kind::TableDescriptor)]),
        |_, _| table_scan(|table| PhysicalOp::TableScan { table }),
    );
    registry.register(
        Kind::ExternalScan,
        common([one(Kind::TableDescriptor)]),
        |_, _| table_scan(|table| PhysicalOp::ExternalScan { table }),
    );
    registry.register(
        Kind::DynamicTableScan,
        common([one(Kind::TableDescriptor)]),
        |attrs, _| {
            let partitions = attrs.optional_list("Partitions")?;
            let selector_ids = attrs.optional_list("SelectorIds")?;
            table_scan(move |table| PhysicalOp::DynamicTableScan {
                table,
                partitions,
                selector_ids,
            })
        },
    );

    let index_grammar = || {
        common([
            one(Kind::IndexCondList),
            one(Kind::IndexDescriptor),
            one(Kind::TableDescriptor),
        ])
    };
    registry.register(Kind::IndexScan, index_grammar(), |attrs, _| {
        index_scan(attrs.required("IndexScanDirection")?, PhysicalOp::IndexScan)
    });
    registry.register(Kind::IndexOnlyScan, index_grammar(), |attrs, _| {
        index_scan(attrs.required("IndexScanDirection")?, PhysicalOp::IndexOnlyScan)
    });
    registry.register(Kind::DynamicIndexScan, index_grammar(), |attrs, _| {
        let partitions = attrs.optional_list("Partitions")?;
        let selector_ids = attrs.optional_list("SelectorIds")?;
        index_scan(attrs.required("IndexScanDirection")?, move |scan| {
            PhysicalOp::DynamicIndexScan {
                scan,
                partitions,
                selector_ids,
            }
        })
    });

    let bitmap_grammar = || {
        common([
            one(Kind::RecheckCond),
            one_of(S),
            one(Kind::TableDescriptor),
        ])
    };
    registry.register(Kind::BitmapTableScan, bitmap_grammar(), |_, _| {
        bitmap_scan(|table| PhysicalOp::BitmapTableScan { table })
    });
    registry.register(Kind::DynamicBitmapTableScan, bitmap_grammar(), |attrs, _| {
        let partitions = attrs.optional_list("Partitions")?;
        let selector_ids = attrs.optional_list("SelectorIds")?;
        bitmap_scan(move |table| PhysicalOp::DynamicBitmapTableScan {
            table,
            partitions,
            selector_ids,
        })
    });
}

fn register_joins(registry: &mut HandlerRegistry) {
    registry.register(
        Kind::HashJoin,
        common([one(Kind::JoinFilter), one(Kind::HashCondList), exactly_of(P, 2)]),
        |attrs, _| {
            physical(PhysicalOp::HashJoin {
                join_type: attrs.required("JoinType")?,
            })
        },
    );
    registry.register(
        Kind::NestedLoopJoin,
        common([one(Kind::JoinFilter), exactly_of(P, 2)]),
        |attrs, _| {
            physical(PhysicalOp::NestedLoopJoin {
                join_type: attrs.required("JoinType")?,
                index_nested_loop: attrs.optional_or("IndexNestedLoopJoin", false)?,
                outer_ref_as_param: attrs.optional_or("OuterRefAsParam", false)?,
            })
        },
    );
    registry.register(
        Kind::MergeJoin,
        common([one(Kind::JoinFilter), one(Kind::MergeCondList), exactly_of(P, 2)]),
        |attrs, _| {
            physical(PhysicalOp::MergeJoin {
                join_type: attrs.required("JoinType")?,
                unique_outer: attrs.optional_or("UniqueOuter", false)?,
            })
        },
    );
}

fn register_motions(registry: &mut HandlerRegistry) {
    let motion_grammar = || common([one(Kind::SortingColumnList), one_of(P)]);

    registry.register(Kind::GatherMotion, motion_grammar(), |attrs, _| {
        physical(PhysicalOp::GatherMotion(factory::motion(attrs)?))
    });
    registry.register(Kind::BroadcastMotion, motion_grammar(), |attrs, _| {
        physical(PhysicalOp::BroadcastMotion(factory::motion(attrs)?))
    });
    registry.register(
        Kind::RedistributeMotion,
        common([one(Kind::SortingColumnList), one(Kind::HashExprList), one_of(P)]),
        |attrs, _| {
            physical(PhysicalOp::RedistributeMotion {
                motion: factory::motion(attrs)?,
                duplicate_sensitive: attrs.optional_or("DuplicateSensitive", false)?,
            })
        },
    );
    registry.register(Kind::RoutedDistributeMotion, motion_grammar(), |attrs, _| {
        physical(PhysicalOp::RoutedDistributeMotion {
            motion: factory::motion(attrs)?,
            segment_id_col: attrs.required("SegmentIdCol")?,
        })
    });
    registry.register(Kind::RandomMotion, motion_grammar(), |attrs, _| {
        physical(PhysicalOp::RandomMotion {
            motion: factory::motion(attrs)?,
            duplicate_sensitive: attrs.optional_or("DuplicateSensitive", false)?,
        })
    });
}

fn register_dml(registry: &mut HandlerRegistry) {
    let dml_grammar = || {
        vec![
            one(Kind::Properties),
            one(Kind::ProjList),
            one(Kind::TableDescriptor),
            one_of(P),
        ]
    };
    registry.register(Kind::DmlInsert, dml_grammar(), |attrs, _| {
        let columns = factory::dml_columns(attrs)?;
        dml(move |table| PhysicalOp::DmlInsert(columns.with_table(table)))
    });
    registry.register(Kind::DmlDelete, dml_grammar(), |attrs, _| {
        let columns = factory::dml_columns(attrs)?;
        dml(move |table| PhysicalOp::DmlDelete(columns.with_table(table)))
    });
    registry.register(Kind::DmlUpdate, dml_grammar(), |attrs, _| {
        let columns = factory::dml_columns(attrs)?;
        dml(move |table| PhysicalOp::DmlUpdate(columns.with_table(table)))
    });
    registry.register(
        Kind::SplitUpdate,
        vec![one(Kind::Properties), one(Kind::ProjList), one_of(P)],
        |attrs, _| {
            physical(PhysicalOp::SplitUpdate {
                deletion_columns: attrs.list("DeleteColumns")?,
                insertion_columns: attrs.list("InsertColumns")?,
                action_col: attrs.required("ActionCol")?,
                ctid_col: attrs.required("CtidCol")?,
                segment_id_col: attrs.required("GpSegmentIdCol")?,
            })
        },
    );
}

pub fn register(registry: &mut HandlerRegistry) {
    register_scans(registry);
    register_joins(registry);
    register_motions(registry);
    register_dml(registry);

    registry.register(
        Kind::Result,
        common([one(Kind::OneTimeFilter), opt_of(P)]),
        |_, _| physical(PhysicalOp::Result),
    );
    registry.register(
        Kind::Limit,
        vec![
            one(Kind::Properties),
            one(Kind::ProjList),
            one_of(P),
            one(Kind::LimitCount),
            one(Kind::LimitOffset),
        ],
        |_, _| physical(PhysicalOp::Limit),
    );
    registry.register(
        Kind::Sort,
        common([
            one(Kind::SortingColumnList),
            one(Kind::LimitCount),
            one(Kind::LimitOffset),
            one_of(P),
        ]),
        |attrs, _| {
            physical(PhysicalOp::Sort {
                discard_duplicates: attrs.optional_or("SortDiscardDuplicates", false)?,
            })
        },
    );
    registry.register(
        Kind::Aggregate,
        vec![
            one(Kind::Properties),
            one(Kind::GroupingColumns),
            one(Kind::ProjList),
            one(Kind::Filter),
            one_of(P),
        ],
        |attrs, _| {
            let strategy = attrs.required("AggregationStrategy")?;
            let stream_safe = attrs.optional_or("StreamSafe", false)?;
            build(move |mut slots| {
                let properties = slots.one()?;
                let GroupingColumns(grouping_columns) = slots.one()?;
                let op = PhysicalOp::Aggregate {
                    strategy,
                    stream_safe,
                    grouping_columns,
                };
                Ok(Node::physical(op, properties, slots.rest()?).into())
            })
        },
    );
    registry.register(Kind::Materialize, common([one_of(P)]), |attrs, _| {
        let spool = match attrs.optional::<u32>("SpoolId")? {
            Some(spool_id) => Some(Spool {
                spool_id,
                executor_slice: attrs.required("ExecutorSlice")?,
                consumer_slice_count: attrs.optional_or("ConsumerSliceCount", 0)?,
            }),
            None => None,
        };
        physical(PhysicalOp::Materialize {
            eager: attrs.required("Eager")?,
            spool,
        })
    });
    registry.register(Kind::Append, common([many_of(P)]), |attrs, _| {
        physical(PhysicalOp::Append {
            is_target: attrs.optional_or("IsTarget", false)?,
            is_zapped: attrs.optional_or("IsZapped", false)?,
        })
    });
    registry.register(
        Kind::Sequence,
        vec![one(Kind::Properties), one(Kind::ProjList), some_of(P)],
        |_, _| physical(PhysicalOp::Sequence),
    );
    registry.register(Kind::SubqueryScan, common([one_of(P)]), |attrs, _| {
        physical(PhysicalOp::SubqueryScan {
            alias: attrs.required("Alias")?,
        })
    });
    registry.register(
        Kind::Window,
        common([one_of(P), one(Kind::WindowKeyList)]),
        |attrs, _| {
            let partition_columns = attrs.optional_list("PartitionColumns")?;
            build(move |mut slots| {
                let properties = slots.one()?;
                let proj_list: Node = slots.one()?;
                let filter: Node = slots.one()?;
                let input: Node = slots.one()?;
                let keys: Vec<WindowKey> = slots.one()?;
                slots.finish()?;
                let op = PhysicalOp::Window {
                    partition_columns,
                    keys,
                };
                Ok(Node::physical(op, properties, vec![proj_list, filter, input]).into())
            })
        },
    );
    registry.register(
        Kind::TableFunctionScan,
        vec![one(Kind::Properties), one(Kind::ProjList), many_of(S)],
        |attrs, _| {
            physical(PhysicalOp::TableFunctionScan {
                func: attrs.required("FuncId")?,
                name: attrs.required("Name")?,
                return_type: attrs.required("TypeMdid")?,
            })
        },
    );
    registry.register(
        Kind::CteProducer,
        vec![one(Kind::Properties), one(Kind::ProjList), one_of(P)],
        |attrs, _| {
            physical(PhysicalOp::CteProducer {
                cte_id: attrs.required("CTEId")?,
                columns: attrs.list("Columns")?,
            })
        },
    );
    registry.register(
        Kind::CteConsumer,
        vec![one(Kind::Properties), one(Kind::ProjList)],
        |attrs, _| {
            physical(PhysicalOp::CteConsumer {
                cte_id: attrs.required("CTEId")?,
                columns: attrs.list("Columns")?,
            })
        },
    );
    registry.register(
        Kind::Assert,
        vec![
            one(Kind::Properties),
            one(Kind::ProjList),
            one(Kind::AssertConstraintList),
            one_of(P),
        ],
        |attrs, _| {
            physical(PhysicalOp::Assert {
                error_code: attrs.required("ErrorCode")?,
            })
        },
    );
    registry.register(
        Kind::PartitionSelector,
        common([opt_of(P)]),
        |attrs, _| {
            physical(PhysicalOp::PartitionSelector {
                relation: attrs.required("RelationMdid")?,
                selector_id: attrs.required("SelectorId")?,
                scan_id: attrs.required("ScanId")?,
                partitions: attrs.optional_list("Partitions")?,
            })
        },
    );
    registry.register(
        Kind::ValuesScan,
        vec![one(Kind::Properties), one(Kind::ProjList), many(Kind::ValuesList)],
        |_, _| physical(PhysicalOp::ValuesScan),
    );
}

#[cfg(test)]
mod tests {
    use crate::ast::physical::PhysicalOp;
    use crate::ast::types::{AggStrategy, IndexScanDirection, JoinType};
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

    fn empty(tag: &str) -> Vec<Event> {
        vec![Event::open_empty(tag), Event::close(tag)]
    }

    fn properties(rows: &str) -> Vec<Event> {
        vec![
            Event::open_empty("Properties"),
            Event::open(
                "Cost",
                [
                    ("StartupCost", "0"),
                    ("TotalCost", "431.000"),
                    ("Rows", rows),
                    ("Width", "4"),
                ],
            ),
            Event::close("Cost"),
            Event::close("Properties"),
        ]
    }

    fn table_descriptor(name: &str) -> Vec<Event> {
        vec![
            Event::open("TableDescriptor", [("Mdid", "6.16384.1.1"), ("TableName", name)]),
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
            Event::close("TableDescriptor"),
        ]
    }

    fn table_scan(name: &str) -> Vec<Event> {
        let mut events = vec![Event::open_empty("TableScan")];
        events.extend(properties("10"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.extend(table_descriptor(name));
        events.push(Event::close("TableScan"));
        events
    }

    #[test]
    fn test_table_scan() {
        let node = parse(Kind::TableScan, table_scan("t1")).unwrap();
        assert_eq!(node.name(), "TableScan");
        assert_eq!(node.arity(), 2);
        let properties = node.properties.as_ref().unwrap();
        assert_eq!(properties.cost.rows, 10.0);
        assert_eq!(node.as_physical().and_then(|op| op.table()).unwrap().name, "t1");
    }

    #[test]
    fn test_table_scan_without_properties() {
        let mut events = vec![Event::open_empty("TableScan")];
        events.extend(empty("ProjList"));
        let err = parse(Kind::TableScan, events).unwrap_err();
        assert!(matches!(
            err,
            DxlError::UnexpectedTag { ref tag, ref expected }
                if tag == "ProjList" && expected.contains("<Properties>")
        ));
    }

    #[test]
    fn test_hash_join() {
        let mut events = vec![Event::open("HashJoin", [("JoinType", "Inner")])];
        events.extend(properties("100"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.extend(empty("JoinFilter"));
        events.extend(empty("HashCondList"));
        events.extend(table_scan("t1"));
        events.extend(table_scan("t2"));
        events.push(Event::close("HashJoin"));

        let node = parse(Kind::HashJoin, events).unwrap();
        assert_eq!(
            node.as_physical(),
            Some(&PhysicalOp::HashJoin {
                join_type: JoinType::Inner
            })
        );
        let names: Vec<&str> = node.children.iter().map(Node::name).collect();
        assert_eq!(
            names,
            vec!["ProjList", "Filter", "JoinFilter", "HashCondList", "TableScan", "TableScan"]
        );
    }

    #[test]
    fn test_hash_join_with_one_input() {
        let mut events = vec![Event::open("HashJoin", [("JoinType", "Inner")])];
        events.extend(properties("100"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.extend(empty("JoinFilter"));
        events.extend(empty("HashCondList"));
        events.extend(table_scan("t1"));
        events.push(Event::close("HashJoin"));

        let err = parse(Kind::HashJoin, events).unwrap_err();
        assert!(matches!(err, DxlError::ArityViolation { ref element, .. } if element == "HashJoin"));
    }

    #[test]
    fn test_unknown_operator_where_physical_expected() {
        let mut events = vec![Event::open("SubqueryScan", [("Alias", "s")])];
        events.extend(properties("1"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.push(Event::open_empty("HashJoinFancy"));

        let err = parse(Kind::SubqueryScan, events).unwrap_err();
        assert!(matches!(
            err,
            DxlError::UnrecognizedTag { ref tag, ref context }
                if tag == "HashJoinFancy" && context.as_deref() == Some("SubqueryScan")
        ));
    }

    #[test]
    fn test_scalar_where_physical_expected() {
        let mut events = vec![Event::open("SubqueryScan", [("Alias", "s")])];
        events.extend(properties("1"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.push(Event::open_empty("And"));

        let err = parse(Kind::SubqueryScan, events).unwrap_err();
        assert!(matches!(
            err,
            DxlError::UnexpectedTag { ref tag, ref expected }
                if tag == "And" && expected.contains("a Physical operator")
        ));
    }

    #[test]
    fn test_index_scan_folds_descriptors() {
        let mut events = vec![Event::open("IndexScan", [("IndexScanDirection", "Forward")])];
        events.extend(properties("1"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.extend(empty("IndexCondList"));
        events.push(Event::open(
            "IndexDescriptor",
            [("Mdid", "0.16400.1.0"), ("IndexName", "t1_a_idx")],
        ));
        events.push(Event::close("IndexDescriptor"));
        events.extend(table_descriptor("t1"));
        events.push(Event::close("IndexScan"));

        let node = parse(Kind::IndexScan, events).unwrap();
        match node.as_physical() {
            Some(PhysicalOp::IndexScan(scan)) => {
                assert_eq!(scan.direction, IndexScanDirection::Forward);
                assert_eq!(scan.index.name, "t1_a_idx");
                assert_eq!(scan.table.name, "t1");
            }
            other => panic!("unexpected operator {other:?}"),
        }
        assert_eq!(node.arity(), 3);
    }

    #[test]
    fn test_aggregate_grouping_columns() {
        let mut events = vec![Event::open(
            "Aggregate",
            [("AggregationStrategy", "Hashed"), ("StreamSafe", "false")],
        )];
        events.extend(properties("1"));
        events.push(Event::open_empty("GroupingColumns"));
        for id in ["1", "2"] {
            events.push(Event::open("GroupingColumn", [("ColId", id)]));
            events.push(Event::close("GroupingColumn"));
        }
        events.push(Event::close("GroupingColumns"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.extend(table_scan("t1"));
        events.push(Event::close("Aggregate"));

        let node = parse(Kind::Aggregate, events).unwrap();
        assert_eq!(
            node.as_physical(),
            Some(&PhysicalOp::Aggregate {
                strategy: AggStrategy::Hashed,
                stream_safe: false,
                grouping_columns: vec![1, 2],
            })
        );
        assert_eq!(node.arity(), 3);
    }

    #[test]
    fn test_append_accepts_zero_inputs() {
        let mut events = vec![Event::open_empty("Append")];
        events.extend(properties("0"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.push(Event::close("Append"));
        assert_eq!(parse(Kind::Append, events).unwrap().arity(), 2);
    }

    #[test]
    fn test_append_keeps_input_order() {
        let mut events = vec![Event::open_empty("Append")];
        events.extend(properties("0"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        for name in ["t1", "t2", "t3"] {
            events.extend(table_scan(name));
        }
        events.push(Event::close("Append"));

        let node = parse(Kind::Append, events).unwrap();
        let tables: Vec<&str> = node.children[2..]
            .iter()
            .filter_map(|child| child.as_physical().and_then(PhysicalOp::table))
            .map(|table| table.name.as_str())
            .collect();
        assert_eq!(tables, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_materialize_spool() {
        let mut events = vec![Event::open(
            "Materialize",
            [("Eager", "true"), ("SpoolId", "2"), ("ExecutorSlice", "1")],
        )];
        events.extend(properties("1"));
        events.extend(empty("ProjList"));
        events.extend(empty("Filter"));
        events.extend(table_scan("t1"));
        events.push(Event::close("Materialize"));

        let node = parse(Kind::Materialize, events).unwrap();
        match node.as_physical() {
            Some(PhysicalOp::Materialize { eager, spool }) => {
                assert!(*eager);
                assert_eq!(spool.as_ref().map(|s| s.spool_id), Some(2));
            }
            other => panic!("unexpected operator {other:?}"),
        }
    }
}
