//! Catalog metadata objects.
//!
//! A `Metadata` section is a flat list of objects, each identified by an
//! [`MdId`]. [`MetadataCatalog`] keeps them in document order and indexes
//! them by id.

use std::collections::HashMap;

use serde::Serialize;
use strum::IntoStaticStr;

use super::statistics::StatsBucket;
use super::types::{
    CmpType, DistributionPolicy, FuncDataAccess, FuncStability, IndexType, StorageType,
};
use super::Node;
use crate::mdid::MdId;

/// Comparison and aggregate operators registered for a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeOperators {
    pub equality: Option<MdId>,
    pub inequality: Option<MdId>,
    pub less_than: Option<MdId>,
    pub less_than_equals: Option<MdId>,
    pub greater_than: Option<MdId>,
    pub greater_than_equals: Option<MdId>,
    pub comparison: Option<MdId>,
    pub array_type: Option<MdId>,
    pub min_agg: Option<MdId>,
    pub max_agg: Option<MdId>,
    pub avg_agg: Option<MdId>,
    pub sum_agg: Option<MdId>,
    pub count_agg: Option<MdId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdType {
    pub mdid: MdId,
    pub name: String,
    pub redistributable: bool,
    pub hashable: bool,
    pub merge_joinable: bool,
    pub composite: bool,
    pub text_related: bool,
    pub fixed_length: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<i32>,
    pub by_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_relation: Option<MdId>,
    pub operators: TypeOperators,
}

/// Column of a catalog relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdColumn {
    pub name: String,
    pub attno: i32,
    pub type_mdid: MdId,
    pub type_modifier: i32,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub is_dropped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Node>,
}

/// Index of a relation, as listed on the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexInfo {
    pub mdid: MdId,
    pub is_partial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdRelation {
    pub mdid: MdId,
    pub name: String,
    pub is_temporary: bool,
    pub storage: StorageType,
    pub distribution: DistributionPolicy,
    pub distribution_columns: Vec<u32>,
    pub keys: Vec<Vec<u32>>,
    pub partition_columns: Vec<u32>,
    pub convert_hash_to_random: bool,
    pub columns: Vec<MdColumn>,
    pub indexes: Vec<IndexInfo>,
    pub triggers: Vec<MdId>,
    pub check_constraints: Vec<MdId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdIndex {
    pub mdid: MdId,
    pub name: String,
    pub is_clustered: bool,
    pub index_type: IndexType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<MdId>,
    pub key_columns: Vec<u32>,
    pub included_columns: Vec<u32>,
    pub opfamilies: Vec<MdId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdScalarOp {
    pub mdid: MdId,
    pub name: String,
    pub cmp_type: CmpType,
    pub is_strict: bool,
    pub is_ndv_preserving: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_type: Option<MdId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_type: Option<MdId>,
    pub result_type: MdId,
    pub func: MdId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commutator: Option<MdId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<MdId>,
    pub opfamilies: Vec<MdId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdFunction {
    pub mdid: MdId,
    pub name: String,
    pub returns_set: bool,
    pub stability: FuncStability,
    pub data_access: FuncDataAccess,
    pub is_strict: bool,
    pub is_ndv_preserving: bool,
    pub result_type: MdId,
    pub output_types: Vec<MdId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdAggregate {
    pub mdid: MdId,
    pub name: String,
    pub is_splittable: bool,
    pub hash_agg_capable: bool,
    pub is_ordered: bool,
    pub result_type: MdId,
    pub intermediate_type: MdId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdCast {
    pub mdid: MdId,
    pub name: String,
    pub binary_coercible: bool,
    pub source_type: MdId,
    pub dest_type: MdId,
    pub func: MdId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coerce_path: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdScalarComparison {
    pub mdid: MdId,
    pub name: String,
    pub cmp_type: CmpType,
    pub left_type: MdId,
    pub right_type: MdId,
    pub operator: MdId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdTrigger {
    pub mdid: MdId,
    pub name: String,
    pub relation: MdId,
    pub func: MdId,
    pub trigger_type: i32,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdRelationStats {
    pub mdid: MdId,
    pub name: String,
    pub rows: f64,
    pub is_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relpages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relallvisible: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdColumnStats {
    pub mdid: MdId,
    pub name: String,
    pub width: f64,
    pub null_freq: f64,
    pub ndv_remain: f64,
    pub freq_remain: f64,
    pub stats_missing: bool,
    pub buckets: Vec<StatsBucket>,
}

/// A catalog object of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "object")]
pub enum MdObject {
    Type(MdType),
    Relation(MdRelation),
    Index(MdIndex),
    #[strum(serialize = "GPDBScalarOp")]
    ScalarOp(MdScalarOp),
    #[strum(serialize = "GPDBFunc")]
    Function(MdFunction),
    #[strum(serialize = "GPDBAgg")]
    Aggregate(MdAggregate),
    #[strum(serialize = "GPDBCast")]
    Cast(MdCast),
    #[strum(serialize = "MDScalarComparison")]
    ScalarComparison(MdScalarComparison),
    #[strum(serialize = "GPDBTrigger")]
    Trigger(MdTrigger),
    RelationStatistics(MdRelationStats),
    ColumnStatistics(MdColumnStats),
}

impl MdObject {
    #[must_use]
    pub fn mdid(&self) -> MdId {
        match self {
            Self::Type(o) => o.mdid,
            Self::Relation(o) => o.mdid,
            Self::Index(o) => o.mdid,
            Self::ScalarOp(o) => o.mdid,
            Self::Function(o) => o.mdid,
            Self::Aggregate(o) => o.mdid,
            Self::Cast(o) => o.mdid,
            Self::ScalarComparison(o) => o.mdid,
            Self::Trigger(o) => o.mdid,
            Self::RelationStatistics(o) => o.mdid,
            Self::ColumnStatistics(o) => o.mdid,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Type(o) => &o.name,
            Self::Relation(o) => &o.name,
            Self::Index(o) => &o.name,
            Self::ScalarOp(o) => &o.name,
            Self::Function(o) => &o.name,
            Self::Aggregate(o) => &o.name,
            Self::Cast(o) => &o.name,
            Self::ScalarComparison(o) => &o.name,
            Self::Trigger(o) => &o.name,
            Self::RelationStatistics(o) => &o.name,
            Self::ColumnStatistics(o) => &o.name,
        }
    }

    /// DXL tag of the object.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }
}

/// Catalog objects of one metadata section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataCatalog {
    objects: Vec<MdObject>,
    #[serde(skip)]
    by_id: HashMap<MdId, usize>,
}

impl MetadataCatalog {
    /// Index objects by id. A repeated id keeps the first object.
    #[must_use]
    pub fn new(objects: Vec<MdObject>) -> Self {
        let mut by_id = HashMap::with_capacity(objects.len());
        for (pos, object) in objects.iter().enumerate() {
            let mdid = object.mdid();
            if by_id.contains_key(&mdid) {
                tracing::warn!(%mdid, kind = object.kind_name(), "Duplicate metadata id, keeping first");
                continue;
            }
            by_id.insert(mdid, pos);
        }
        Self { objects, by_id }
    }

    #[must_use]
    pub fn get(&self, mdid: &MdId) -> Option<&MdObject> {
        self.by_id.get(mdid).and_then(|&pos| self.objects.get(pos))
    }

    #[must_use]
    pub fn relation(&self, mdid: &MdId) -> Option<&MdRelation> {
        match self.get(mdid)? {
            MdObject::Relation(rel) => Some(rel),
            _ => None,
        }
    }

    #[must_use]
    pub fn md_type(&self, mdid: &MdId) -> Option<&MdType> {
        match self.get(mdid)? {
            MdObject::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Objects in document order.
    #[must_use]
    pub fn objects(&self) -> &[MdObject] {
        &self.objects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
