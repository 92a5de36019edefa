//! The owned, immutable tree produced by a parse.
//!
//! A [`Node`] owns its operator, its optional plan properties and its
//! children. Back-references (columns, CTEs) are integer ids and catalog
//! references are [`MdId`] values, so the tree never needs shared ownership.

pub mod document;
pub mod logical;
pub mod metadata;
pub mod optimizer;
pub mod physical;
pub mod scalar;
pub mod statistics;
pub mod types;

use serde::Serialize;

use crate::mdid::MdId;

pub use document::{Document, Plan, Query};
pub use logical::LogicalOp;
pub use physical::PhysicalOp;
pub use scalar::ScalarOp;
pub use statistics::DerivedRelationStats;

/// Operator carried by a tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Scalar(ScalarOp),
    Logical(LogicalOp),
    Physical(PhysicalOp),
}

impl Operator {
    /// DXL name of the operator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar(op) => op.name(),
            Self::Logical(op) => op.name(),
            Self::Physical(op) => op.name(),
        }
    }
}

/// Cost estimate attached to a physical operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatorCost {
    pub startup_cost: f64,
    pub total_cost: f64,
    pub rows: f64,
    pub width: f64,
}

/// Plan properties of a physical operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanProperties {
    pub cost: OperatorCost,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DerivedRelationStats>,
}

/// One node of the operator tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub op: Operator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PlanProperties>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(op: Operator, properties: Option<PlanProperties>, children: Vec<Node>) -> Self {
        Self {
            op,
            properties,
            children,
        }
    }

    #[must_use]
    pub fn scalar(op: ScalarOp, children: Vec<Node>) -> Self {
        Self::new(Operator::Scalar(op), None, children)
    }

    #[must_use]
    pub fn logical(op: LogicalOp, children: Vec<Node>) -> Self {
        Self::new(Operator::Logical(op), None, children)
    }

    #[must_use]
    pub fn physical(op: PhysicalOp, properties: PlanProperties, children: Vec<Node>) -> Self {
        Self::new(Operator::Physical(op), Some(properties), children)
    }

    /// DXL name of this node's operator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&ScalarOp> {
        match &self.op {
            Operator::Scalar(op) => Some(op),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_logical(&self) -> Option<&LogicalOp> {
        match &self.op {
            Operator::Logical(op) => Some(op),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_physical(&self) -> Option<&PhysicalOp> {
        match &self.op {
            Operator::Physical(op) => Some(op),
            _ => None,
        }
    }

    /// Pre-order traversal of this subtree, paired with each node's depth
    /// (the node itself has depth 1).
    pub fn walk(&self) -> impl Iterator<Item = (usize, &Node)> {
        let mut pending = vec![(1, self)];
        std::iter::from_fn(move || {
            let (depth, node) = pending.pop()?;
            pending.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
            Some((depth, node))
        })
    }

    /// Number of levels in this subtree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or(1)
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        self.walk().count()
    }

    /// Indented one-line-per-node rendering of the subtree.
    #[must_use]
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.walk() {
            out.push_str(&"  ".repeat(depth - 1));
            out.push_str(node.name());
            if let Some(props) = &node.properties {
                out.push_str(&format!(
                    "  (cost={:.2}..{:.2} rows={} width={})",
                    props.cost.startup_cost, props.cost.total_cost, props.cost.rows, props.cost.width
                ));
            }
            out.push('\n');
        }
        out
    }
}

/// Column of a table descriptor or const table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub col_id: u32,
    pub attno: i32,
    pub name: String,
    pub type_mdid: MdId,
    pub type_modifier: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub is_dropped: bool,
}

/// Relation referenced by a scan or DML operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescriptor {
    pub mdid: MdId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_mode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_as_user: Option<u32>,
    pub columns: Vec<ColumnDescriptor>,
}

/// Index referenced by an index scan or bitmap probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub mdid: MdId,
    pub name: String,
}

/// Well-known GPDB type oids with typed datum values.
pub mod oids {
    pub const BOOL: u32 = 16;
    pub const INT8: u32 = 20;
    pub const INT2: u32 = 21;
    pub const INT4: u32 = 23;
    pub const OID: u32 = 26;
}

/// Value of a datum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatumValue {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Oid(u32),
    /// Any other type: the encoded value plus its optional statistics mappings.
    Encoded {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lint_value: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        double_value: Option<f64>,
    },
}

/// A typed constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datum {
    pub type_mdid: MdId,
    pub type_modifier: i32,
    pub is_null: bool,
    pub by_value: bool,
    pub value: DatumValue,
}

impl Datum {
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// Integer view of the value, when it has one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            DatumValue::Int2(v) => Some(i64::from(v)),
            DatumValue::Int4(v) => Some(i64::from(v)),
            DatumValue::Int8(v) => Some(v),
            DatumValue::Oid(v) => Some(i64::from(v)),
            DatumValue::Encoded { lint_value, .. } => lint_value,
            _ => None,
        }
    }
}
