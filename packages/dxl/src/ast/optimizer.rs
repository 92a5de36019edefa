//! Optimizer configuration documents: cost model, search strategy and
//! optimizer settings.

use serde::Serialize;

/// One named cost model parameter with its bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostParam {
    pub name: String,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostModelConfig {
    pub model_type: u32,
    pub segments: u32,
    pub params: Vec<CostParam>,
}

/// One stage of the search: the transformations it enables and its limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStage {
    pub xforms: Vec<String>,
    pub time_threshold: u64,
    pub cost_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnumeratorConfig {
    pub plan_id: u64,
    pub plan_samples: u64,
    pub cost_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticsConfig {
    pub damping_factor_filter: f64,
    pub damping_factor_join: f64,
    pub damping_factor_groupby: f64,
    pub max_stats_buckets: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CteConfig {
    pub inlining_cutoff: u32,
}

/// Oids of the window functions the optimizer generates itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowOids {
    pub row_number: u32,
    pub rank: u32,
}

/// Search hints; absent attributes take the optimizer's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hint {
    pub min_parts_for_sort_on_insert: u64,
    pub join_arity_for_associativity_commutativity: u64,
    pub array_expansion_threshold: u64,
    pub join_order_dp_threshold: u64,
    pub broadcast_threshold: u64,
    pub enforce_constraints_on_dml: bool,
    pub push_group_by_below_setop_threshold: u64,
    pub xform_bind_threshold: u64,
    pub skew_factor: u64,
}

impl Default for Hint {
    fn default() -> Self {
        Self {
            min_parts_for_sort_on_insert: u64::MAX,
            join_arity_for_associativity_commutativity: u64::MAX,
            array_expansion_threshold: 100,
            join_order_dp_threshold: 10,
            broadcast_threshold: 100_000,
            enforce_constraints_on_dml: true,
            push_group_by_below_setop_threshold: 10,
            xform_bind_threshold: 0,
            skew_factor: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerConfig {
    pub enumerator: EnumeratorConfig,
    pub statistics: StatisticsConfig,
    pub cte: CteConfig,
    pub window_oids: WindowOids,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_model: Option<CostModelConfig>,
    pub hint: Hint,
    pub trace_flags: Vec<u32>,
}
