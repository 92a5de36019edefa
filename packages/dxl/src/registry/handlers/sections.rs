//! The `DXLMessage` root and the document sections it may carry.

use super::build;
use crate::ast::metadata::{MdObject, MetadataCatalog};
use crate::ast::optimizer::{CostModelConfig, CostParam, OptimizerConfig, SearchStage};
use crate::ast::statistics::DerivedRelationStats;
use crate::ast::{Document, Node, Plan, Query};
use crate::error::{DxlError, Result};
use crate::registry::core::HandlerRegistry;
use crate::registry::grammar::{many, many_of, one, one_of, opt};
use crate::registry::kind::{Family, Kind};
use crate::registry::types::{NodeList, TraceFlags};

/// Unwrap a nested section that must be a cost-model configuration.
fn cost_model(element: &str, document: Document) -> Result<CostModelConfig> {
    match document {
        Document::CostModelConfig(config) => Ok(config),
        other => Err(DxlError::arity(
            element,
            format!("expected CostModelConfig, harvested {}", other.section_name()),
        )),
    }
}

fn cost_params(element: &str, document: Document) -> Result<Vec<CostParam>> {
    match document {
        Document::CostParams(params) => Ok(params),
        other => Err(DxlError::arity(
            element,
            format!("expected CostParams, harvested {}", other.section_name()),
        )),
    }
}

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(Kind::DxlMessage, vec![one_of(Family::Section)], |_, _| {
        build(|mut slots| {
            let document: Document = slots.one()?;
            slots.finish()?;
            Ok(document.into())
        })
    });

    registry.register(Kind::Plan, vec![one_of(Family::Physical)], |attrs, _| {
        let id = attrs.optional_or("Id", 0)?;
        let space_size = attrs.optional_or("SpaceSize", 0)?;
        build(move |mut slots| {
            let root = slots.one()?;
            slots.finish()?;
            Ok(Document::Plan(Plan {
                id,
                space_size,
                root,
            })
            .into())
        })
    });
    registry.register(
        Kind::Query,
        vec![
            one(Kind::OutputColumns),
            one(Kind::CteList),
            one_of(Family::Logical),
        ],
        |_, _| {
            build(|mut slots| {
                let NodeList(output_columns) = slots.one()?;
                let NodeList(ctes) = slots.one()?;
                let root = slots.one()?;
                slots.finish()?;
                Ok(Document::Query(Query {
                    output_columns,
                    ctes,
                    root,
                })
                .into())
            })
        },
    );
    registry.register(Kind::ScalarExpr, vec![one_of(Family::Scalar)], |_, _| {
        build(|mut slots| {
            let expr: Node = slots.one()?;
            slots.finish()?;
            Ok(Document::ScalarExpr(expr).into())
        })
    });
    registry.register(Kind::Metadata, vec![many_of(Family::Metadata)], |_, _| {
        build(|mut slots| {
            let objects: Vec<MdObject> = slots.rest()?;
            Ok(Document::Metadata(MetadataCatalog::new(objects)).into())
        })
    });

    registry.register(Kind::CostModelConfig, vec![one(Kind::CostParams)], |attrs, _| {
        let model_type = attrs.required("CostModelType")?;
        let segments = attrs.required("SegmentsForCosting")?;
        build(move |mut slots| {
            let params = cost_params("CostModelConfig", slots.one()?)?;
            slots.finish()?;
            Ok(Document::CostModelConfig(CostModelConfig {
                model_type,
                segments,
                params,
            })
            .into())
        })
    });
    registry.register(Kind::CostParams, vec![many(Kind::CostParam)], |_, _| {
        build(|mut slots| Ok(Document::CostParams(slots.rest()?).into()))
    });
    registry.register(Kind::SearchStrategy, vec![many(Kind::SearchStage)], |_, _| {
        build(|mut slots| {
            let stages: Vec<SearchStage> = slots.rest()?;
            Ok(Document::SearchStrategy(stages).into())
        })
    });
    registry.register(
        Kind::OptimizerConfig,
        vec![
            one(Kind::EnumeratorConfig),
            one(Kind::StatisticsConfig),
            one(Kind::CteConfig),
            one(Kind::WindowOids),
            opt(Kind::CostModelConfig),
            opt(Kind::Hint),
            one(Kind::TraceFlags),
        ],
        |_, _| {
            build(|mut slots| {
                let enumerator = slots.one()?;
                let statistics = slots.one()?;
                let cte = slots.one()?;
                let window_oids = slots.one()?;
                let cost_model = slots
                    .opt::<Document>()?
                    .map(|document| cost_model("OptimizerConfig", document))
                    .transpose()?;
                let hint = slots.opt()?.unwrap_or_default();
                let TraceFlags(trace_flags) = slots.one()?;
                slots.finish()?;
                Ok(Document::OptimizerConfig(OptimizerConfig {
                    enumerator,
                    statistics,
                    cte,
                    window_oids,
                    cost_model,
                    hint,
                    trace_flags,
                })
                .into())
            })
        },
    );
    registry.register(
        Kind::Statistics,
        vec![many(Kind::StatsDerivedRelation)],
        |_, _| {
            build(|mut slots| {
                let relations: Vec<DerivedRelationStats> = slots.rest()?;
                Ok(Document::Statistics(relations).into())
            })
        },
    );
}
