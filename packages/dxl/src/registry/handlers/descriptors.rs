//! Auxiliary descriptors: plan properties, table and column descriptors,
//! grouping columns, datums, window specifications, sub-plan parameters,
//! derived statistics and optimizer configuration entries.

use super::{build, leaf};
use crate::ast::logical::WindowSpec;
use crate::ast::optimizer::{
    CostParam, CteConfig, EnumeratorConfig, Hint, SearchStage, StatisticsConfig, WindowOids,
};
use crate::ast::physical::WindowKey;
use crate::ast::scalar::SubPlanParam;
use crate::ast::statistics::{BucketBound, DerivedColumnStats, DerivedRelationStats, StatsBucket};
use crate::ast::{ColumnDescriptor, Node, PlanProperties, TableDescriptor};
use crate::factory;
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{many, one, opt};
use crate::registry::kind::Kind;
use crate::registry::types::{GroupingColumns, NodeList, TraceFlags, Tuple};

fn register_plan_descriptors(registry: &mut HandlerRegistry) {
    registry.register(
        Kind::Properties,
        vec![one(Kind::Cost), opt(Kind::StatsDerivedRelation)],
        |_, _| {
            build(|mut slots| {
                let cost = slots.one()?;
                let stats = slots.opt()?;
                slots.finish()?;
                Ok(PlanProperties { cost, stats }.into())
            })
        },
    );
    registry.register(Kind::Cost, vec![], |attrs, _| leaf(factory::cost(attrs)?));

    registry.register(Kind::TableDescriptor, vec![one(Kind::Columns)], |attrs, _| {
        let mdid = attrs.required("Mdid")?;
        let name = attrs.required("TableName")?;
        let lock_mode = attrs.optional("LockMode")?;
        let acl_mode = attrs.optional("AclMode")?;
        let execute_as_user = attrs.optional("ExecuteAsUser")?;
        build(move |mut slots| {
            let columns = slots.one()?;
            slots.finish()?;
            Ok(TableDescriptor {
                mdid,
                name,
                lock_mode,
                acl_mode,
                execute_as_user,
                columns,
            }
            .into())
        })
    });
    registry.register(Kind::Columns, vec![many(Kind::Column)], |_, _| {
        build(|mut slots| Ok(slots.rest::<ColumnDescriptor>()?.into()))
    });
    registry.register(Kind::Column, vec![], |attrs, _| {
        leaf(factory::column_descriptor(attrs)?)
    });
    registry.register(Kind::IndexDescriptor, vec![], |attrs, _| {
        leaf(factory::index_descriptor(attrs)?)
    });

    registry.register(Kind::GroupingColumns, vec![many(Kind::GroupingColumn)], |_, _| {
        build(|mut slots| Ok(GroupingColumns(slots.rest()?).into()))
    });
    registry.register(Kind::GroupingColumn, vec![], |attrs, _| {
        leaf(attrs.required::<u32>("ColId")?)
    });

    registry.register(Kind::OutputColumns, vec![many(Kind::Ident)], |_, _| {
        build(|mut slots| Ok(NodeList(slots.rest()?).into()))
    });
    registry.register(Kind::CteList, vec![many(Kind::LogicalCteProducer)], |_, _| {
        build(|mut slots| Ok(NodeList(slots.rest()?).into()))
    });

    registry.register(Kind::ConstTuple, vec![many(Kind::Datum)], |_, _| {
        build(|mut slots| Ok(Tuple(slots.rest()?).into()))
    });
    registry.register(Kind::Datum, vec![], |attrs, _| leaf(factory::datum(attrs)?));

    registry.register(Kind::WindowSpecList, vec![many(Kind::WindowSpec)], |_, _| {
        build(|mut slots| Ok(slots.rest::<WindowSpec>()?.into()))
    });
    registry.register(
        Kind::WindowSpec,
        vec![opt(Kind::SortingColumnList), opt(Kind::WindowFrame)],
        |attrs, _| {
            let partition_columns = attrs.optional_list("PartitionColumns")?;
            build(move |mut slots| {
                let sorting_columns: Option<Node> = slots.opt()?;
                let frame: Option<Node> = slots.opt()?;
                slots.finish()?;
                Ok(WindowSpec {
                    partition_columns,
                    sorting_columns,
                    frame,
                }
                .into())
            })
        },
    );
    registry.register(Kind::WindowKeyList, vec![many(Kind::WindowKey)], |_, _| {
        build(|mut slots| Ok(slots.rest::<WindowKey>()?.into()))
    });
    registry.register(
        Kind::WindowKey,
        vec![opt(Kind::SortingColumnList), opt(Kind::WindowFrame)],
        |_, _| {
            build(|mut slots| {
                let sorting_columns: Option<Node> = slots.opt()?;
                let frame: Option<Node> = slots.opt()?;
                slots.finish()?;
                Ok(WindowKey {
                    sorting_columns,
                    frame,
                }
                .into())
            })
        },
    );

    registry.register(Kind::ParamList, vec![many(Kind::Param)], |_, _| {
        build(|mut slots| Ok(slots.rest::<SubPlanParam>()?.into()))
    });
    registry.register(Kind::Param, vec![], |attrs, _| {
        leaf(SubPlanParam {
            col_id: attrs.required("ColId")?,
            name: attrs.required("ColName")?,
            type_mdid: attrs.required("TypeMdid")?,
        })
    });
}

fn register_statistics(registry: &mut HandlerRegistry) {
    registry.register(
        Kind::StatsDerivedRelation,
        vec![many(Kind::StatsDerivedColumn)],
        |attrs, _| {
            let rows = attrs.required("Rows")?;
            let empty = attrs.optional_or("EmptyRelation", false)?;
            build(move |mut slots| {
                Ok(DerivedRelationStats {
                    rows,
                    empty,
                    columns: slots.rest()?,
                }
                .into())
            })
        },
    );
    registry.register(
        Kind::StatsDerivedColumn,
        vec![many(Kind::StatsBucket)],
        |attrs, _| {
            let col_id = attrs.required("ColId")?;
            let width = attrs.required("Width")?;
            let null_freq = attrs.optional_or("NullFreq", 0.0)?;
            let ndv_remain = attrs.optional_or("NdvRemain", 0.0)?;
            let freq_remain = attrs.optional_or("FreqRemain", 0.0)?;
            build(move |mut slots| {
                Ok(DerivedColumnStats {
                    col_id,
                    width,
                    null_freq,
                    ndv_remain,
                    freq_remain,
                    buckets: slots.rest()?,
                }
                .into())
            })
        },
    );
    registry.register(
        Kind::StatsBucket,
        vec![one(Kind::LowerBound), one(Kind::UpperBound)],
        |attrs, _| {
            let frequency = attrs.required("Frequency")?;
            let distinct_values = attrs.required("DistinctValues")?;
            build(move |mut slots| {
                let lower = slots.one()?;
                let upper = slots.one()?;
                slots.finish()?;
                Ok(StatsBucket {
                    frequency,
                    distinct_values,
                    lower,
                    upper,
                }
                .into())
            })
        },
    );
    for kind in [Kind::LowerBound, Kind::UpperBound] {
        registry.register(kind, vec![one(Kind::Datum)], |attrs, _| {
            let closed = attrs.required("Closed")?;
            build(move |mut slots| {
                let datum = slots.one()?;
                slots.finish()?;
                Ok(BucketBound { closed, datum }.into())
            })
        });
    }
}

fn register_optimizer_config(registry: &mut HandlerRegistry) {
    registry.register(Kind::CostParam, vec![], |attrs, _| {
        leaf(CostParam {
            name: attrs.required("Name")?,
            value: attrs.required("Value")?,
            lower_bound: attrs.required("LowerBound")?,
            upper_bound: attrs.required("UpperBound")?,
        })
    });
    registry.register(Kind::SearchStage, vec![many(Kind::Xform)], |attrs, _| {
        let time_threshold = attrs.required("TimeThreshold")?;
        let cost_threshold = attrs.required("CostThreshold")?;
        build(move |mut slots| {
            Ok(SearchStage {
                xforms: slots.rest()?,
                time_threshold,
                cost_threshold,
            }
            .into())
        })
    });
    registry.register(Kind::Xform, vec![], |attrs, _| {
        leaf(attrs.required::<String>("Name")?)
    });
    registry.register(Kind::EnumeratorConfig, vec![], |attrs, _| {
        leaf(EnumeratorConfig {
            plan_id: attrs.optional_or("Id", 0)?,
            plan_samples: attrs.optional_or("PlanSamples", 0)?,
            cost_threshold: attrs.optional_or("CostThreshold", 0.0)?,
        })
    });
    registry.register(Kind::StatisticsConfig, vec![], |attrs, _| {
        leaf(StatisticsConfig {
            damping_factor_filter: attrs.required("DampingFactorFilter")?,
            damping_factor_join: attrs.required("DampingFactorJoin")?,
            damping_factor_groupby: attrs.required("DampingFactorGroupBy")?,
            max_stats_buckets: attrs.optional_or("MaxStatsBuckets", 100)?,
        })
    });
    registry.register(Kind::CteConfig, vec![], |attrs, _| {
        leaf(CteConfig {
            inlining_cutoff: attrs.required("CTEInliningCutoff")?,
        })
    });
    registry.register(Kind::WindowOids, vec![], |attrs, _| {
        leaf(WindowOids {
            row_number: attrs.required("RowNumber")?,
            rank: attrs.required("Rank")?,
        })
    });
    registry.register(Kind::Hint, vec![], |attrs, _| {
        let defaults = Hint::default();
        leaf(Hint {
            min_parts_for_sort_on_insert: attrs
                .optional_or("MinNumOfPartsToRequireSortOnInsert", defaults.min_parts_for_sort_on_insert)?,
            join_arity_for_associativity_commutativity: attrs.optional_or(
                "JoinArityForAssociativityCommutativity",
                defaults.join_arity_for_associativity_commutativity,
            )?,
            array_expansion_threshold: attrs
                .optional_or("ArrayExpansionThreshold", defaults.array_expansion_threshold)?,
            join_order_dp_threshold: attrs
                .optional_or("JoinOrderDynamicProgThreshold", defaults.join_order_dp_threshold)?,
            broadcast_threshold: attrs
                .optional_or("BroadcastThreshold", defaults.broadcast_threshold)?,
            enforce_constraints_on_dml: attrs
                .optional_or("EnforceConstraintsOnDML", defaults.enforce_constraints_on_dml)?,
            push_group_by_below_setop_threshold: attrs.optional_or(
                "PushGroupByBelowSetopThreshold",
                defaults.push_group_by_below_setop_threshold,
            )?,
            xform_bind_threshold: attrs
                .optional_or("XformBindThreshold", defaults.xform_bind_threshold)?,
            skew_factor: attrs.optional_or("SkewFactor", defaults.skew_factor)?,
        })
    });
    registry.register(Kind::TraceFlags, vec![], |attrs, _| {
        leaf(TraceFlags(attrs.optional_list("Value")?))
    });
}

pub fn register(registry: &mut HandlerRegistry) {
    register_plan_descriptors(registry);
    register_statistics(registry);
    register_optimizer_config(registry);
}

#[cfg(test)]
mod tests {
    use crate::ast::statistics::DerivedRelationStats;
    use crate::ast::PlanProperties;
    use crate::config::ParseOptions;
    use crate::error::{DxlError, Result};
    use crate::event::Event;
    use crate::registry::engine::ParseEngine;
    use crate::registry::kind::Kind;
    use crate::registry::types::{FromHarvest, Harvest};

    fn parse<T: FromHarvest>(root: Kind, events: Vec<Event>) -> Result<T> {
        let mut engine = ParseEngine::with_root(root, ParseOptions::new())?;
        engine.feed_all(events.into_iter().map(Ok))?;
        let harvest: Harvest = engine.finish_result()?;
        T::from_harvest(harvest)
            .map_err(|other| DxlError::arity(root.tag_name(), other.name()))
    }

    fn cost() -> Vec<Event> {
        vec![
            Event::open(
                "Cost",
                [
                    ("StartupCost", "0"),
                    ("TotalCost", "12.5"),
                    ("Rows", "3"),
                    ("Width", "8"),
                ],
            ),
            Event::close("Cost"),
        ]
    }

    fn bound(tag: &str, value: &str) -> Vec<Event> {
        vec![
            Event::open(tag, [("Closed", "true")]),
            Event::open(
                "Datum",
                [("TypeMdid", "0.23.1.0"), ("IsByValue", "true"), ("Value", value)],
            ),
            Event::close("Datum"),
            Event::close(tag),
        ]
    }

    #[test]
    fn test_properties_with_derived_statistics() {
        let mut events = vec![Event::open_empty("Properties")];
        events.extend(cost());
        events.push(Event::open(
            "StatsDerivedRelation",
            [("Rows", "3"), ("EmptyRelation", "false")],
        ));
        events.push(Event::open(
            "StatsDerivedColumn",
            [("ColId", "1"), ("Width", "4"), ("NullFreq", "0")],
        ));
        events.push(Event::open(
            "StatsBucket",
            [("Frequency", "1"), ("DistinctValues", "3")],
        ));
        events.extend(bound("LowerBound", "1"));
        events.extend(bound("UpperBound", "3"));
        events.push(Event::close("StatsBucket"));
        events.push(Event::close("StatsDerivedColumn"));
        events.push(Event::close("StatsDerivedRelation"));
        events.push(Event::close("Properties"));

        let properties: PlanProperties = parse(Kind::Properties, events).unwrap();
        assert_eq!(properties.cost.total_cost, 12.5);
        let stats: &DerivedRelationStats = properties.stats.as_ref().unwrap();
        let column = stats.column(1).unwrap();
        assert_eq!(column.buckets.len(), 1);
        assert_eq!(column.buckets[0].upper.datum.as_i64(), Some(3));
    }

    #[test]
    fn test_properties_require_cost() {
        let events = vec![Event::open_empty("Properties"), Event::close("Properties")];
        let err = parse::<PlanProperties>(Kind::Properties, events).unwrap_err();
        assert!(matches!(err, DxlError::ArityViolation { ref detail, .. } if detail.contains("<Cost>")));
    }

    #[test]
    fn test_bucket_bounds_in_order() {
        let mut events = vec![Event::open(
            "StatsBucket",
            [("Frequency", "1"), ("DistinctValues", "3")],
        )];
        events.extend(bound("UpperBound", "3"));
        let err = parse::<crate::ast::statistics::StatsBucket>(Kind::StatsBucket, events).unwrap_err();
        assert!(matches!(err, DxlError::UnexpectedTag { ref tag, .. } if tag == "UpperBound"));
    }

    #[test]
    fn test_hint_defaults() {
        let events = vec![
            Event::open("Hint", [("JoinOrderDynamicProgThreshold", "12")]),
            Event::close("Hint"),
        ];
        let hint: crate::ast::optimizer::Hint = parse(Kind::Hint, events).unwrap();
        assert_eq!(hint.join_order_dp_threshold, 12);
        assert_eq!(hint.array_expansion_threshold, 100);
        assert!(hint.enforce_constraints_on_dml);
    }

    #[test]
    fn test_table_descriptor_requires_columns() {
        let events = vec![
            Event::open("TableDescriptor", [("Mdid", "6.1.1.1"), ("TableName", "t")]),
            Event::close("TableDescriptor"),
        ];
        let err = parse::<crate::ast::TableDescriptor>(Kind::TableDescriptor, events).unwrap_err();
        assert!(err.is_invariant_violation());
    }
}
