//! Logical operators of an input query.

use serde::Serialize;
use strum::IntoStaticStr;

use super::types::{JoinType, SetOpKind};
use super::{ColumnDescriptor, Datum, Node, TableDescriptor};
use crate::mdid::MdId;

/// Window specification referenced by window functions of a logical window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSpec {
    pub partition_columns: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting_columns: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "op")]
pub enum LogicalOp {
    #[strum(serialize = "LogicalGet")]
    Get { table: TableDescriptor },
    #[strum(serialize = "LogicalExternalGet")]
    ExternalGet { table: TableDescriptor },
    #[strum(serialize = "LogicalProject")]
    Project,
    #[strum(serialize = "LogicalSelect")]
    Select,
    #[strum(serialize = "LogicalJoin")]
    Join { join_type: JoinType },
    #[strum(serialize = "LogicalGroupBy")]
    GroupBy { grouping_columns: Vec<u32> },
    #[strum(serialize = "LogicalLimit")]
    Limit { top_limit_under_dml: bool },
    #[strum(serialize = "LogicalConstTable")]
    ConstTable {
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Vec<Datum>>,
    },
    SetOp {
        kind: SetOpKind,
        columns: Vec<ColumnDescriptor>,
        input_columns: Vec<Vec<u32>>,
        cast_across_inputs: bool,
    },
    #[strum(serialize = "LogicalCTEProducer")]
    CteProducer { cte_id: u32, columns: Vec<u32> },
    #[strum(serialize = "LogicalCTEConsumer")]
    CteConsumer { cte_id: u32, columns: Vec<u32> },
    #[strum(serialize = "LogicalCTEAnchor")]
    CteAnchor { cte_id: u32 },
    #[strum(serialize = "LogicalTVF")]
    Tvf {
        func: MdId,
        name: String,
        return_type: MdId,
        columns: Vec<ColumnDescriptor>,
    },
    #[strum(serialize = "LogicalWindow")]
    Window { specs: Vec<WindowSpec> },
    #[strum(serialize = "LogicalInsert")]
    Insert {
        table: TableDescriptor,
        source_columns: Vec<u32>,
    },
    #[strum(serialize = "LogicalDelete")]
    Delete {
        table: TableDescriptor,
        ctid_col: u32,
        segment_id_col: u32,
        deletion_columns: Vec<u32>,
    },
    #[strum(serialize = "LogicalUpdate")]
    Update {
        table: TableDescriptor,
        ctid_col: u32,
        segment_id_col: u32,
        deletion_columns: Vec<u32>,
        insertion_columns: Vec<u32>,
    },
}

impl LogicalOp {
    /// DXL name of the operator; set operations report their kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetOp { kind, .. } => kind.into(),
            other => other.into(),
        }
    }
}
