//! Physical operators of an execution plan.

use serde::Serialize;
use strum::IntoStaticStr;

use super::types::{AggStrategy, IndexScanDirection, JoinType};
use super::{IndexDescriptor, Node, TableDescriptor};
use crate::mdid::MdId;

/// Segments a motion moves tuples between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Motion {
    pub input_segments: Vec<i32>,
    pub output_segments: Vec<i32>,
}

/// Index and relation read by an index scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexScanInfo {
    pub direction: IndexScanDirection,
    pub index: IndexDescriptor,
    pub table: TableDescriptor,
}

/// Shared-scan spool of a materialize operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spool {
    pub spool_id: u32,
    pub executor_slice: i32,
    pub consumer_slice_count: u32,
}

/// Target and bookkeeping columns of a DML operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dml {
    pub table: TableDescriptor,
    pub columns: Vec<u32>,
    pub action_col: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctid_col: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id_col: Option<u32>,
}

/// Partitioning and ordering of one physical window key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting_columns: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "op")]
pub enum PhysicalOp {
    TableScan {
        table: TableDescriptor,
    },
    ExternalScan {
        table: TableDescriptor,
    },
    DynamicTableScan {
        table: TableDescriptor,
        partitions: Vec<u32>,
        selector_ids: Vec<u32>,
    },
    IndexScan(IndexScanInfo),
    IndexOnlyScan(IndexScanInfo),
    DynamicIndexScan {
        scan: IndexScanInfo,
        partitions: Vec<u32>,
        selector_ids: Vec<u32>,
    },
    BitmapTableScan {
        table: TableDescriptor,
    },
    DynamicBitmapTableScan {
        table: TableDescriptor,
        partitions: Vec<u32>,
        selector_ids: Vec<u32>,
    },
    HashJoin {
        join_type: JoinType,
    },
    NestedLoopJoin {
        join_type: JoinType,
        index_nested_loop: bool,
        outer_ref_as_param: bool,
    },
    MergeJoin {
        join_type: JoinType,
        unique_outer: bool,
    },
    GatherMotion(Motion),
    BroadcastMotion(Motion),
    RedistributeMotion {
        motion: Motion,
        duplicate_sensitive: bool,
    },
    RoutedDistributeMotion {
        motion: Motion,
        segment_id_col: u32,
    },
    RandomMotion {
        motion: Motion,
        duplicate_sensitive: bool,
    },
    Result,
    Limit,
    Sort {
        discard_duplicates: bool,
    },
    Aggregate {
        strategy: AggStrategy,
        stream_safe: bool,
        grouping_columns: Vec<u32>,
    },
    Materialize {
        eager: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        spool: Option<Spool>,
    },
    Append {
        is_target: bool,
        is_zapped: bool,
    },
    Sequence,
    SubqueryScan {
        alias: String,
    },
    Window {
        partition_columns: Vec<u32>,
        keys: Vec<WindowKey>,
    },
    TableFunctionScan {
        func: MdId,
        name: String,
        return_type: MdId,
    },
    #[strum(serialize = "CTEProducer")]
    CteProducer {
        cte_id: u32,
        columns: Vec<u32>,
    },
    #[strum(serialize = "CTEConsumer")]
    CteConsumer {
        cte_id: u32,
        columns: Vec<u32>,
    },
    Assert {
        error_code: String,
    },
    PartitionSelector {
        relation: MdId,
        selector_id: u32,
        scan_id: u32,
        partitions: Vec<u32>,
    },
    ValuesScan,
    #[strum(serialize = "DMLInsert")]
    DmlInsert(Dml),
    #[strum(serialize = "DMLDelete")]
    DmlDelete(Dml),
    #[strum(serialize = "DMLUpdate")]
    DmlUpdate(Dml),
    SplitUpdate {
        deletion_columns: Vec<u32>,
        insertion_columns: Vec<u32>,
        action_col: u32,
        ctid_col: u32,
        segment_id_col: u32,
    },
}

impl PhysicalOp {
    /// DXL name of the operator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Whether the operator moves tuples between segments.
    #[must_use]
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Self::GatherMotion(_)
                | Self::BroadcastMotion(_)
                | Self::RedistributeMotion { .. }
                | Self::RoutedDistributeMotion { .. }
                | Self::RandomMotion { .. }
        )
    }

    /// Relation read or written by the operator, if any.
    #[must_use]
    pub fn table(&self) -> Option<&TableDescriptor> {
        match self {
            Self::TableScan { table }
            | Self::ExternalScan { table }
            | Self::DynamicTableScan { table, .. }
            | Self::BitmapTableScan { table }
            | Self::DynamicBitmapTableScan { table, .. } => Some(table),
            Self::IndexScan(scan)
            | Self::IndexOnlyScan(scan)
            | Self::DynamicIndexScan { scan, .. } => Some(&scan.table),
            Self::DmlInsert(dml) | Self::DmlDelete(dml) | Self::DmlUpdate(dml) => Some(&dml.table),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_names() {
        assert_eq!(PhysicalOp::Limit.name(), "Limit");
        assert_eq!(
            PhysicalOp::CteConsumer {
                cte_id: 0,
                columns: vec![]
            }
            .name(),
            "CTEConsumer"
        );
    }

    #[test]
    fn test_motion_classification() {
        let motion = Motion {
            input_segments: vec![0, 1],
            output_segments: vec![-1],
        };
        assert!(PhysicalOp::GatherMotion(motion).is_motion());
        assert!(!PhysicalOp::Sequence.is_motion());
    }
}
