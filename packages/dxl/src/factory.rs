//! Construction of leaf values and shared operator descriptors from
//! attribute sets.
//!
//! Each function reads one element's attributes and returns the typed value
//! it describes; the handlers combine these with harvested children.

use crate::ast::physical::{Dml, Motion};
use crate::ast::scalar::{ColRef, Coercion, QuantifiedSubquery};
use crate::ast::{oids, ColumnDescriptor, Datum, DatumValue, IndexDescriptor, OperatorCost};
use crate::attrs::Attrs;
use crate::error::Result;
use crate::mdid::MdId;

/// Type modifier used when the attribute is absent.
pub const DEFAULT_TYPE_MODIFIER: i32 = -1;

/// Build a datum from `TypeMdid`, `IsNull`, `IsByValue` and the value
/// attributes.
///
/// # Errors
/// Attribute errors; a non-null datum of a well-known type requires `Value`.
pub fn datum(attrs: &Attrs) -> Result<Datum> {
    let type_mdid: MdId = attrs.required("TypeMdid")?;
    let type_modifier = attrs.optional_or("TypeModifier", DEFAULT_TYPE_MODIFIER)?;
    let is_null = attrs.optional_or("IsNull", false)?;
    let by_value = attrs.optional_or("IsByValue", false)?;

    let value = match type_mdid {
        _ if is_null => DatumValue::Null,
        MdId::Gpdb { oid, .. } => match oid {
            oids::BOOL => DatumValue::Bool(attrs.required("Value")?),
            oids::INT2 => DatumValue::Int2(attrs.required("Value")?),
            oids::INT4 => DatumValue::Int4(attrs.required("Value")?),
            oids::INT8 => DatumValue::Int8(attrs.required("Value")?),
            oids::OID => DatumValue::Oid(attrs.required("Value")?),
            _ => encoded(attrs)?,
        },
        _ => encoded(attrs)?,
    };

    Ok(Datum {
        type_mdid,
        type_modifier,
        is_null,
        by_value,
        value,
    })
}

fn encoded(attrs: &Attrs) -> Result<DatumValue> {
    Ok(DatumValue::Encoded {
        value: attrs.optional("Value")?,
        lint_value: attrs.optional("LintValue")?,
        double_value: attrs.optional("DoubleValue")?,
    })
}

/// Column reference of an `Ident`.
///
/// # Errors
/// Attribute errors.
pub fn col_ref(attrs: &Attrs) -> Result<ColRef> {
    Ok(ColRef {
        col_id: attrs.required("ColId")?,
        name: attrs.required("ColName")?,
        type_mdid: attrs.required("TypeMdid")?,
        type_modifier: attrs.optional_or("TypeModifier", DEFAULT_TYPE_MODIFIER)?,
    })
}

/// Column of a table descriptor or column list.
///
/// # Errors
/// Attribute errors.
pub fn column_descriptor(attrs: &Attrs) -> Result<ColumnDescriptor> {
    Ok(ColumnDescriptor {
        col_id: attrs.required("ColId")?,
        attno: attrs.required("Attno")?,
        name: attrs.required("ColName")?,
        type_mdid: attrs.required("TypeMdid")?,
        type_modifier: attrs.optional_or("TypeModifier", DEFAULT_TYPE_MODIFIER)?,
        width: attrs.optional("ColWidth")?,
        is_dropped: attrs.optional_or("IsDropped", false)?,
    })
}

/// Cost estimate of a `Cost` element.
///
/// # Errors
/// Attribute errors.
pub fn cost(attrs: &Attrs) -> Result<OperatorCost> {
    Ok(OperatorCost {
        startup_cost: attrs.required("StartupCost")?,
        total_cost: attrs.required("TotalCost")?,
        rows: attrs.required("Rows")?,
        width: attrs.required("Width")?,
    })
}

/// Index named by an `IndexDescriptor`.
///
/// # Errors
/// Attribute errors.
pub fn index_descriptor(attrs: &Attrs) -> Result<IndexDescriptor> {
    Ok(IndexDescriptor {
        mdid: attrs.required("Mdid")?,
        name: attrs.required("IndexName")?,
    })
}

/// Segments of a motion.
///
/// # Errors
/// Attribute errors.
pub fn motion(attrs: &Attrs) -> Result<Motion> {
    Ok(Motion {
        input_segments: attrs.list("InputSegments")?,
        output_segments: attrs.list("OutputSegments")?,
    })
}

/// Target of a domain or I/O coercion.
///
/// # Errors
/// Attribute errors.
pub fn coercion(attrs: &Attrs) -> Result<Coercion> {
    Ok(Coercion {
        type_mdid: attrs.required("TypeMdid")?,
        type_modifier: attrs.optional_or("TypeModifier", DEFAULT_TYPE_MODIFIER)?,
        form: attrs.required("CoercionForm")?,
        location: attrs.optional_or("Location", -1)?,
    })
}

/// Operator and column of an `ANY` / `ALL` subquery.
///
/// # Errors
/// Attribute errors.
pub fn quantified_subquery(attrs: &Attrs) -> Result<QuantifiedSubquery> {
    Ok(QuantifiedSubquery {
        operator: attrs.required("OperatorName")?,
        operator_mdid: attrs.required("OperatorMdid")?,
        col_id: attrs.required("ColId")?,
    })
}

/// Bookkeeping columns of a DML operator; the table comes from a child.
///
/// # Errors
/// Attribute errors.
pub fn dml_columns(attrs: &Attrs) -> Result<DmlColumns> {
    Ok(DmlColumns {
        columns: attrs.list("Columns")?,
        action_col: attrs.required("ActionCol")?,
        ctid_col: attrs.optional("CtidCol")?,
        segment_id_col: attrs.optional("SegmentIdCol")?,
    })
}

/// Attribute half of a [`Dml`], completed once the table descriptor arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmlColumns {
    pub columns: Vec<u32>,
    pub action_col: u32,
    pub ctid_col: Option<u32>,
    pub segment_id_col: Option<u32>,
}

impl DmlColumns {
    #[must_use]
    pub fn with_table(self, table: crate::ast::TableDescriptor) -> Dml {
        Dml {
            table,
            columns: self.columns,
            action_col: self.action_col,
            ctid_col: self.ctid_col,
            segment_id_col: self.segment_id_col,
        }
    }
}
