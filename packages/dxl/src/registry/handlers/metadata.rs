//! Catalog metadata objects and their reference children.

use super::{build, leaf};
use crate::ast::metadata::{
    IndexInfo, MdAggregate, MdCast, MdColumn, MdColumnStats, MdFunction, MdIndex, MdObject,
    MdRelation, MdRelationStats, MdScalarComparison, MdScalarOp, MdTrigger, MdType,
    TypeOperators,
};
use crate::ast::Node;
use crate::factory;
use crate::mdid::MdId;
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{many, one, opt, opt_of};
use crate::registry::kind::{Family, Kind};
use crate::registry::types::{DefaultValue, OutputTypes};

/// Kinds whose only content is an `Mdid` attribute.
const REFERENCES: [Kind; 23] = [
    Kind::Trigger,
    Kind::CheckConstraint,
    Kind::Opfamily,
    Kind::EqualityOp,
    Kind::InequalityOp,
    Kind::LessThanOp,
    Kind::LessThanEqualsOp,
    Kind::GreaterThanOp,
    Kind::GreaterThanEqualsOp,
    Kind::ComparisonOp,
    Kind::ArrayType,
    Kind::MinAgg,
    Kind::MaxAgg,
    Kind::AvgAgg,
    Kind::SumAgg,
    Kind::CountAgg,
    Kind::LeftType,
    Kind::RightType,
    Kind::ResultType,
    Kind::OpFunc,
    Kind::Commutator,
    Kind::InverseOp,
    Kind::IntermediateResultType,
];

fn register_children(registry: &mut HandlerRegistry) {
    for kind in REFERENCES {
        registry.register(kind, vec![], |attrs, _| leaf(attrs.required::<MdId>("Mdid")?));
    }
    for (list, item) in [
        (Kind::Triggers, Kind::Trigger),
        (Kind::CheckConstraints, Kind::CheckConstraint),
        (Kind::Opfamilies, Kind::Opfamily),
    ] {
        registry.register(list, vec![many(item)], |_, _| {
            build(|mut slots| Ok(slots.rest::<MdId>()?.into()))
        });
    }

    registry.register(Kind::MdColumns, vec![many(Kind::MdColumn)], |_, _| {
        build(|mut slots| Ok(slots.rest::<MdColumn>()?.into()))
    });
    registry.register(Kind::MdColumn, vec![opt(Kind::DefaultValue)], |attrs, _| {
        let name = attrs.required("Name")?;
        let attno = attrs.required("Attno")?;
        let type_mdid = attrs.required("Mdid")?;
        let type_modifier = attrs.optional_or("TypeModifier", factory::DEFAULT_TYPE_MODIFIER)?;
        let nullable = attrs.optional_or("Nullable", true)?;
        let width = attrs.optional("ColWidth")?;
        let is_dropped = attrs.optional_or("IsDropped", false)?;
        build(move |mut slots| {
            let default_value = slots.opt::<DefaultValue>()?.and_then(|DefaultValue(expr)| expr);
            slots.finish()?;
            Ok(MdColumn {
                name,
                attno,
                type_mdid,
                type_modifier,
                nullable,
                width,
                is_dropped,
                default_value,
            }
            .into())
        })
    });
    registry.register(
        Kind::DefaultValue,
        vec![opt_of(Family::Scalar)],
        |_, _| {
            build(|mut slots| {
                let expr: Option<Node> = slots.opt()?;
                slots.finish()?;
                Ok(DefaultValue(expr).into())
            })
        },
    );

    registry.register(Kind::IndexInfoList, vec![many(Kind::IndexInfo)], |_, _| {
        build(|mut slots| Ok(slots.rest::<IndexInfo>()?.into()))
    });
    registry.register(Kind::IndexInfo, vec![], |attrs, _| {
        leaf(IndexInfo {
            mdid: attrs.required("Mdid")?,
            is_partial: attrs.optional_or("IsPartial", false)?,
        })
    });

    registry.register(Kind::FuncOutputColumns, vec![], |attrs, _| {
        leaf(OutputTypes(attrs.list("TypeMdids")?))
    });
}

fn register_types(registry: &mut HandlerRegistry) {
    let operator_slots = [
        Kind::EqualityOp,
        Kind::InequalityOp,
        Kind::LessThanOp,
        Kind::LessThanEqualsOp,
        Kind::GreaterThanOp,
        Kind::GreaterThanEqualsOp,
        Kind::ComparisonOp,
        Kind::ArrayType,
        Kind::MinAgg,
        Kind::MaxAgg,
        Kind::AvgAgg,
        Kind::SumAgg,
        Kind::CountAgg,
    ];
    registry.register(
        Kind::Type,
        operator_slots.into_iter().map(opt).collect(),
        |attrs, _| {
            let mdid = attrs.required("Mdid")?;
            let name = attrs.required("Name")?;
            let redistributable = attrs.optional_or("IsRedistributable", true)?;
            let hashable = attrs.optional_or("IsHashable", false)?;
            let merge_joinable = attrs.optional_or("IsMergeJoinable", false)?;
            let composite = attrs.optional_or("IsComposite", false)?;
            let text_related = attrs.optional_or("IsTextRelated", false)?;
            let fixed_length = attrs.required("IsFixedLength")?;
            let length = attrs.optional("Length")?;
            let by_value = attrs.required("PassByValue")?;
            let base_relation = attrs.optional("BaseRelationMdid")?;
            build(move |mut slots| {
                let operators = TypeOperators {
                    equality: slots.opt()?,
                    inequality: slots.opt()?,
                    less_than: slots.opt()?,
                    less_than_equals: slots.opt()?,
                    greater_than: slots.opt()?,
                    greater_than_equals: slots.opt()?,
                    comparison: slots.opt()?,
                    array_type: slots.opt()?,
                    min_agg: slots.opt()?,
                    max_agg: slots.opt()?,
                    avg_agg: slots.opt()?,
                    sum_agg: slots.opt()?,
                    count_agg: slots.opt()?,
                };
                slots.finish()?;
                Ok(MdObject::Type(MdType {
                    mdid,
                    name,
                    redistributable,
                    hashable,
                    merge_joinable,
                    composite,
                    text_related,
                    fixed_length,
                    length,
                    by_value,
                    base_relation,
                    operators,
                })
                .into())
            })
        },
    );
}

fn register_relations(registry: &mut HandlerRegistry) {
    registry.register(
        Kind::Relation,
        vec![
            one(Kind::MdColumns),
            opt(Kind::IndexInfoList),
            opt(Kind::Triggers),
            opt(Kind::CheckConstraints),
        ],
        |attrs, _| {
            let mdid = attrs.required("Mdid")?;
            let name = attrs.required("Name")?;
            let is_temporary = attrs.optional_or("IsTemporary", false)?;
            let storage = attrs.required("StorageType")?;
            let distribution = attrs.required("DistributionPolicy")?;
            let distribution_columns = attrs.optional_list("DistributionColumns")?;
            let keys = attrs.optional_list_of_lists("Keys")?;
            let partition_columns = attrs.optional_list("PartitionColumns")?;
            let convert_hash_to_random = attrs.optional_or("ConvertHashToRandom", false)?;
            build(move |mut slots| {
                let columns = slots.one()?;
                let indexes = slots.opt()?.unwrap_or_default();
                let triggers = slots.opt()?.unwrap_or_default();
                let check_constraints = slots.opt()?.unwrap_or_default();
                slots.finish()?;
                Ok(MdObject::Relation(MdRelation {
                    mdid,
                    name,
                    is_temporary,
                    storage,
                    distribution,
                    distribution_columns,
                    keys,
                    partition_columns,
                    convert_hash_to_random,
                    columns,
                    indexes,
                    triggers,
                    check_constraints,
                })
                .into())
            })
        },
    );
    registry.register(Kind::Index, vec![one(Kind::Opfamilies)], |attrs, _| {
        let mdid = attrs.required("Mdid")?;
        let name = attrs.required("Name")?;
        let is_clustered = attrs.optional_or("IsClustered", false)?;
        let index_type = attrs.required("IndexType")?;
        let item_type = attrs.optional("IndexItemType")?;
        let key_columns = attrs.list("KeyColumns")?;
        let included_columns = attrs.optional_list("IncludedColumns")?;
        build(move |mut slots| {
            let opfamilies = slots.one()?;
            slots.finish()?;
            Ok(MdObject::Index(MdIndex {
                mdid,
                name,
                is_clustered,
                index_type,
                item_type,
                key_columns,
                included_columns,
                opfamilies,
            })
            .into())
        })
    });
    registry.register(Kind::GpdbTrigger, vec![], |attrs, _| {
        leaf(MdObject::Trigger(MdTrigger {
            mdid: attrs.required("Mdid")?,
            name: attrs.required("Name")?,
            relation: attrs.required("RelId")?,
            func: attrs.required("FuncId")?,
            trigger_type: attrs.required("Type")?,
            is_enabled: attrs.optional_or("IsEnabled", true)?,
        }))
    });
}

fn register_callables(registry: &mut HandlerRegistry) {
    registry.register(
        Kind::GpdbScalarOp,
        vec![
            opt(Kind::LeftType),
            opt(Kind::RightType),
            one(Kind::ResultType),
            one(Kind::OpFunc),
            opt(Kind::Commutator),
            opt(Kind::InverseOp),
            opt(Kind::Opfamilies),
        ],
        |attrs, _| {
            let mdid = attrs.required("Mdid")?;
            let name = attrs.required("Name")?;
            let cmp_type = attrs.required("ComparisonType")?;
            let is_strict = attrs.optional_or("IsStrict", false)?;
            let is_ndv_preserving = attrs.optional_or("IsNDVPreserving", false)?;
            build(move |mut slots| {
                let op = MdScalarOp {
                    mdid,
                    name,
                    cmp_type,
                    is_strict,
                    is_ndv_preserving,
                    left_type: slots.opt()?,
                    right_type: slots.opt()?,
                    result_type: slots.one()?,
                    func: slots.one()?,
                    commutator: slots.opt()?,
                    inverse: slots.opt()?,
                    opfamilies: slots.opt()?.unwrap_or_default(),
                };
                slots.finish()?;
                Ok(MdObject::ScalarOp(op).into())
            })
        },
    );
    registry.register(
        Kind::GpdbFunc,
        vec![one(Kind::ResultType), opt(Kind::FuncOutputColumns)],
        |attrs, _| {
            let mdid = attrs.required("Mdid")?;
            let name = attrs.required("Name")?;
            let returns_set = attrs.optional_or("ReturnsSet", false)?;
            let stability = attrs.required("Stability")?;
            let data_access = attrs.required("DataAccess")?;
            let is_strict = attrs.optional_or("IsStrict", false)?;
            let is_ndv_preserving = attrs.optional_or("IsNDVPreserving", false)?;
            build(move |mut slots| {
                let result_type = slots.one()?;
                let output_types = slots
                    .opt::<OutputTypes>()?
                    .map(|OutputTypes(types)| types)
                    .unwrap_or_default();
                slots.finish()?;
                Ok(MdObject::Function(MdFunction {
                    mdid,
                    name,
                    returns_set,
                    stability,
                    data_access,
                    is_strict,
                    is_ndv_preserving,
                    result_type,
                    output_types,
                })
                .into())
            })
        },
    );
    registry.register(
        Kind::GpdbAgg,
        vec![one(Kind::ResultType), one(Kind::IntermediateResultType)],
        |attrs, _| {
            let mdid = attrs.required("Mdid")?;
            let name = attrs.required("Name")?;
            let is_splittable = attrs.optional_or("IsSplittable", false)?;
            let hash_agg_capable = attrs.optional_or("HashAggCapable", false)?;
            let is_ordered = attrs.optional_or("IsOrdered", false)?;
            build(move |mut slots| {
                let result_type = slots.one()?;
                let intermediate_type = slots.one()?;
                slots.finish()?;
                Ok(MdObject::Aggregate(MdAggregate {
                    mdid,
                    name,
                    is_splittable,
                    hash_agg_capable,
                    is_ordered,
                    result_type,
                    intermediate_type,
                })
                .into())
            })
        },
    );
    registry.register(Kind::GpdbCast, vec![], |attrs, _| {
        leaf(MdObject::Cast(MdCast {
            mdid: attrs.required("Mdid")?,
            name: attrs.required("Name")?,
            binary_coercible: attrs.optional_or("BinaryCoercible", false)?,
            source_type: attrs.required("SourceTypeId")?,
            dest_type: attrs.required("DestinationTypeId")?,
            func: attrs.required("CastFuncId")?,
            coerce_path: attrs.optional("CoercePathType")?,
        }))
    });
    registry.register(Kind::MdScalarComparison, vec![], |attrs, _| {
        leaf(MdObject::ScalarComparison(MdScalarComparison {
            mdid: attrs.required("Mdid")?,
            name: attrs.required("Name")?,
            cmp_type: attrs.required("ComparisonType")?,
            left_type: attrs.required("LeftType")?,
            right_type: attrs.required("RightType")?,
            operator: attrs.required("OperatorMdid")?,
        }))
    });
}

fn register_statistics(registry: &mut HandlerRegistry) {
    registry.register(Kind::RelationStatistics, vec![], |attrs, _| {
        leaf(MdObject::RelationStatistics(MdRelationStats {
            mdid: attrs.required("Mdid")?,
            name: attrs.required("Name")?,
            rows: attrs.required("Rows")?,
            is_empty: attrs.optional_or("EmptyRelation", false)?,
            relpages: attrs.optional("RelPages")?,
            relallvisible: attrs.optional("RelAllVisible")?,
        }))
    });
    registry.register(
        Kind::ColumnStatistics,
        vec![many(Kind::StatsBucket)],
        |attrs, _| {
            let mdid = attrs.required("Mdid")?;
            let name = attrs.required("Name")?;
            let width = attrs.required("Width")?;
            let null_freq = attrs.optional_or("NullFreq", 0.0)?;
            let ndv_remain = attrs.optional_or("NdvRemain", 0.0)?;
            let freq_remain = attrs.optional_or("FreqRemain", 0.0)?;
            let stats_missing = attrs.optional_or("ColStatsMissing", false)?;
            build(move |mut slots| {
                Ok(MdObject::ColumnStatistics(MdColumnStats {
                    mdid,
                    name,
                    width,
                    null_freq,
                    ndv_remain,
                    freq_remain,
                    stats_missing,
                    buckets: slots.rest()?,
                })
                .into())
            })
        },
    );
}

pub fn register(registry: &mut HandlerRegistry) {
    register_children(registry);
    register_types(registry);
    register_relations(registry);
    register_callables(registry);
    register_statistics(registry);
}

#[cfg(test)]
mod tests {
    use crate::ast::metadata::{MdObject, TypeOperators};
    use crate::ast::types::{DistributionPolicy, FuncStability, StorageType};
    use crate::config::ParseOptions;
    use crate::error::{DxlError, Result};
    use crate::event::Event;
    use crate::mdid::MdId;
    use crate::registry::engine::ParseEngine;
    use crate::registry::kind::Kind;
    use crate::registry::types::Harvest;

    fn parse(root: Kind, events: Vec<Event>) -> Result<MdObject> {
        let mut engine = ParseEngine::with_root(root, ParseOptions::new())?;
        engine.feed_all(events.into_iter().map(Ok))?;
        match engine.finish_result()? {
            Harvest::MdObject(object) => Ok(object),
            other => Err(DxlError::arity(root.tag_name(), other.name())),
        }
    }

    fn reference(tag: &str, mdid: &str) -> Vec<Event> {
        vec![Event::open(tag, [("Mdid", mdid)]), Event::close(tag)]
    }

    #[test]
    fn test_type_operators_by_position() {
        let mut events = vec![Event::open(
            "Type",
            [
                ("Mdid", "0.23.1.0"),
                ("Name", "int4"),
                ("IsRedistributable", "true"),
                ("IsHashable", "true"),
                ("IsFixedLength", "true"),
                ("Length", "4"),
                ("PassByValue", "true"),
            ],
        )];
        events.extend(reference("EqualityOp", "0.96.1.0"));
        events.extend(reference("LessThanOp", "0.97.1.0"));
        events.extend(reference("CountAgg", "0.2147.1.0"));
        events.push(Event::close("Type"));

        let MdObject::Type(ty) = parse(Kind::Type, events).unwrap() else {
            panic!("expected a type");
        };
        assert_eq!(ty.length, Some(4));
        assert_eq!(
            ty.operators,
            TypeOperators {
                equality: Some(MdId::gpdb(96)),
                less_than: Some(MdId::gpdb(97)),
                count_agg: Some(MdId::gpdb(2147)),
                ..TypeOperators::default()
            }
        );
    }

    #[test]
    fn test_type_operators_out_of_order() {
        let mut events = vec![Event::open(
            "Type",
            [
                ("Mdid", "0.23.1.0"),
                ("Name", "int4"),
                ("IsFixedLength", "true"),
                ("PassByValue", "true"),
            ],
        )];
        events.extend(reference("LessThanOp", "0.97.1.0"));
        events.extend(reference("EqualityOp", "0.96.1.0"));
        let err = parse(Kind::Type, events).unwrap_err();
        assert!(matches!(err, DxlError::UnexpectedTag { ref tag, .. } if tag == "EqualityOp"));
    }

    #[test]
    fn test_relation_columns_are_metadata_columns() {
        let events = vec![
            Event::open(
                "Relation",
                [
                    ("Mdid", "0.16384.1.0"),
                    ("Name", "t1"),
                    ("StorageType", "Heap"),
                    ("DistributionPolicy", "Hash"),
                    ("DistributionColumns", "0"),
                    ("Keys", "1,2;3"),
                ],
            ),
            Event::open_empty("Columns"),
            Event::open(
                "Column",
                [
                    ("Name", "a"),
                    ("Attno", "1"),
                    ("Mdid", "0.23.1.0"),
                    ("Nullable", "false"),
                ],
            ),
            Event::open_empty("DefaultValue"),
            Event::close("DefaultValue"),
            Event::close("Column"),
            Event::close("Columns"),
            Event::close("Relation"),
        ];

        let MdObject::Relation(rel) = parse(Kind::Relation, events).unwrap() else {
            panic!("expected a relation");
        };
        assert_eq!(rel.storage, StorageType::Heap);
        assert_eq!(rel.distribution, DistributionPolicy::Hash);
        assert_eq!(rel.keys, vec![vec![1, 2], vec![3]]);
        assert_eq!(rel.columns.len(), 1);
        assert!(!rel.columns[0].nullable);
        assert!(rel.columns[0].default_value.is_none());
        assert!(rel.indexes.is_empty());
    }

    #[test]
    fn test_function_output_columns() {
        let events = vec![
            Event::open(
                "GPDBFunc",
                [
                    ("Mdid", "0.1.1.0"),
                    ("Name", "generate_series"),
                    ("ReturnsSet", "true"),
                    ("Stability", "Immutable"),
                    ("DataAccess", "NoSQL"),
                ],
            ),
            Event::open("ResultType", [("Mdid", "0.23.1.0")]),
            Event::close("ResultType"),
            Event::open("OutputColumns", [("TypeMdids", "0.23.1.0,0.25.1.0")]),
            Event::close("OutputColumns"),
            Event::close("GPDBFunc"),
        ];

        let MdObject::Function(func) = parse(Kind::GpdbFunc, events).unwrap() else {
            panic!("expected a function");
        };
        assert_eq!(func.stability, FuncStability::Immutable);
        assert_eq!(func.output_types, vec![MdId::gpdb(23), MdId::gpdb(25)]);
    }

    #[test]
    fn test_scalar_op_requires_result_type() {
        let events = vec![
            Event::open(
                "GPDBScalarOp",
                [("Mdid", "0.96.1.0"), ("Name", "="), ("ComparisonType", "Eq")],
            ),
            Event::open("OpFunc", [("Mdid", "0.65.1.0")]),
        ];
        assert!(matches!(
            parse(Kind::GpdbScalarOp, events),
            Err(DxlError::UnexpectedTag { ref tag, .. }) if tag == "OpFunc"
        ));
    }
}
