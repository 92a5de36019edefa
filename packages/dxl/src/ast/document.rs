//! The single result of a parse.

use serde::Serialize;
use strum::IntoStaticStr;

use super::metadata::MetadataCatalog;
use super::optimizer::{CostModelConfig, CostParam, OptimizerConfig, SearchStage};
use super::statistics::DerivedRelationStats;
use super::Node;

/// A physical plan with its identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub id: u64,
    pub space_size: u64,
    pub root: Node,
}

/// A logical query: its output columns, CTE producers and root operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub output_columns: Vec<Node>,
    pub ctes: Vec<Node>,
    pub root: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "section", content = "body")]
pub enum Document {
    Plan(Plan),
    Query(Query),
    ScalarExpr(Node),
    Metadata(MetadataCatalog),
    CostModelConfig(CostModelConfig),
    CostParams(Vec<CostParam>),
    SearchStrategy(Vec<SearchStage>),
    OptimizerConfig(OptimizerConfig),
    Statistics(Vec<DerivedRelationStats>),
}

impl Document {
    /// DXL tag of the section this document came from.
    #[must_use]
    pub fn section_name(&self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub fn as_plan(&self) -> Option<&Plan> {
        match self {
            Self::Plan(plan) => Some(plan),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_query(&self) -> Option<&Query> {
        match self {
            Self::Query(query) => Some(query),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_metadata(&self) -> Option<&MetadataCatalog> {
        match self {
            Self::Metadata(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// Root operator of a plan, query or scalar expression.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        match self {
            Self::Plan(plan) => Some(&plan.root),
            Self::Query(query) => Some(&query.root),
            Self::ScalarExpr(node) => Some(node),
            _ => None,
        }
    }

    /// One-paragraph human-readable description.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Plan(plan) => format!(
                "Plan {} (space size {}), {} nodes, depth {}\n{}",
                plan.id,
                plan.space_size,
                plan.root.size(),
                plan.root.depth(),
                plan.root.render_tree()
            ),
            Self::Query(query) => format!(
                "Query with {} output columns and {} CTEs, {} nodes\n{}",
                query.output_columns.len(),
                query.ctes.len(),
                query.root.size(),
                query.root.render_tree()
            ),
            Self::ScalarExpr(node) => format!("Scalar expression\n{}", node.render_tree()),
            Self::Metadata(catalog) => {
                let mut out = format!("Metadata with {} objects\n", catalog.len());
                for object in catalog.objects() {
                    out.push_str(&format!(
                        "  {} {} {}\n",
                        object.kind_name(),
                        object.mdid(),
                        object.name()
                    ));
                }
                out
            }
            Self::CostModelConfig(config) => format!(
                "Cost model type {} for {} segments, {} parameters\n",
                config.model_type,
                config.segments,
                config.params.len()
            ),
            Self::CostParams(params) => {
                let mut out = format!("{} cost parameters\n", params.len());
                for param in params {
                    out.push_str(&format!(
                        "  {} = {} [{}, {}]\n",
                        param.name, param.value, param.lower_bound, param.upper_bound
                    ));
                }
                out
            }
            Self::SearchStrategy(stages) => format!("Search strategy with {} stages\n", stages.len()),
            Self::OptimizerConfig(config) => format!(
                "Optimizer config: {} plan samples, {} trace flags\n",
                config.enumerator.plan_samples,
                config.trace_flags.len()
            ),
            Self::Statistics(relations) => {
                format!("Derived statistics for {} relations\n", relations.len())
            }
        }
    }
}
