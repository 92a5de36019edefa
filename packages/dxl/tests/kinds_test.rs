//! Table-driven checks over every registered node kind.
//!
//! Each kind is fed the smallest child sequence its grammar allows, built
//! from the registry itself, so a kind added to the table is covered here
//! without a hand-written fixture.

use strum::IntoEnumIterator;

use dxl_parser::registry::{Expect, Family, Harvest, REGISTRY};
use dxl_parser::{DxlError, Event, Kind, ParseEngine, ParseOptions, Result};

/// Attribute values accepted by every opener that reads the name.
const SAMPLE_ATTRS: &[(&str, &str)] = &[
    // metadata ids
    ("Mdid", "0.23.1.0"),
    ("TypeMdid", "0.23.1.0"),
    ("TypeMdids", "0.23.1.0"),
    ("OperatorMdid", "0.96.1.0"),
    ("FuncId", "0.65.1.0"),
    ("AggMdid", "0.2108.1.0"),
    ("ElementType", "0.23.1.0"),
    ("ElementFunc", "0.65.1.0"),
    ("ArrayType", "0.1007.1.0"),
    ("MDType", "0.23.1.0"),
    ("ResultType", "0.16.1.0"),
    ("LeftType", "0.23.1.0"),
    ("RightType", "0.23.1.0"),
    ("RelId", "0.16384.1.0"),
    ("RelationMdid", "0.16384.1.0"),
    ("SourceTypeId", "0.23.1.0"),
    ("DestinationTypeId", "0.20.1.0"),
    ("CastFuncId", "0.481.1.0"),
    ("SortOperatorMdid", "0.97.1.0"),
    // numbers
    ("Value", "1"),
    ("LowerBound", "1"),
    ("UpperBound", "1"),
    ("ColId", "1"),
    ("Attno", "1"),
    ("Level", "1"),
    ("Rows", "1"),
    ("Width", "1"),
    ("StartupCost", "1"),
    ("TotalCost", "1"),
    ("Frequency", "1"),
    ("DistinctValues", "1"),
    ("CTEId", "1"),
    ("SegmentIdCol", "1"),
    ("CtidCol", "1"),
    ("ActionCol", "1"),
    ("GpSegmentIdCol", "1"),
    ("SelectorId", "1"),
    ("ScanId", "1"),
    ("WinSpecPos", "0"),
    ("Type", "1"),
    ("TimeThreshold", "1"),
    ("CostThreshold", "1"),
    ("DampingFactorFilter", "1"),
    ("DampingFactorJoin", "1"),
    ("DampingFactorGroupBy", "1"),
    ("CTEInliningCutoff", "1"),
    ("RowNumber", "1"),
    ("Rank", "1"),
    ("CostModelType", "1"),
    ("SegmentsForCosting", "1"),
    // lists
    ("Columns", "1"),
    ("InsertColumns", "1"),
    ("DeleteColumns", "1"),
    ("KeyColumns", "1"),
    ("InputSegments", "1"),
    ("OutputSegments", "1"),
    ("InputColumns", "1;1"),
    // flags
    ("IsNull", "false"),
    ("IsLowerBound", "true"),
    ("FuncRetSet", "false"),
    ("AggDistinct", "false"),
    ("Distinct", "false"),
    ("Eager", "false"),
    ("Closed", "true"),
    ("IsFixedLength", "true"),
    ("PassByValue", "true"),
    // text
    ("Name", "n"),
    ("ColName", "c"),
    ("TableName", "t"),
    ("IndexName", "i"),
    ("Alias", "a"),
    ("ErrorMessage", "failed"),
    ("ErrorCode", "P0001"),
    ("ComparisonOperator", "="),
    ("OperatorName", "="),
    ("SortOperatorName", "<"),
    // enumerations
    ("JoinType", "Inner"),
    ("AggStage", "Normal"),
    ("AggregationStrategy", "Plain"),
    ("IndexScanDirection", "Forward"),
    ("SubPlanType", "ScalarSubPlan"),
    ("BooleanTestType", "IsTrue"),
    ("MinMaxType", "Min"),
    ("OpType", "Upper"),
    ("FrameSpec", "Row"),
    ("FrameBoundary", "CurrentRow"),
    ("ComparisonType", "Eq"),
    ("IndexType", "Bitmap"),
    ("StorageType", "Heap"),
    ("DistributionPolicy", "Random"),
    ("Stability", "Immutable"),
    ("DataAccess", "NoSQL"),
    ("CoercionForm", "0"),
];

/// `OperatorType` is a return type on `OpExpr` but a quantifier on `ArrayComp`.
fn sample_attrs(kind: Kind) -> Vec<(&'static str, &'static str)> {
    let mut attrs = SAMPLE_ATTRS.to_vec();
    if kind == Kind::ArrayComp {
        attrs.push(("OperatorType", "Any"));
    }
    attrs
}

/// A kind that completes without children, or with only fixed ones.
fn representative(family: Family) -> Kind {
    match family {
        Family::Section => Kind::CostParams,
        Family::Scalar => Kind::Ident,
        Family::Logical => Kind::LogicalCteConsumer,
        Family::Physical => Kind::CteConsumer,
        Family::Metadata => Kind::GpdbCast,
        other => panic!("no grammar accepts any {other} element"),
    }
}

/// Emit `kind` with the minimum number of children each grammar part needs.
fn minimal(kind: Kind, events: &mut Vec<Event>) {
    let spec = REGISTRY
        .spec(kind)
        .unwrap_or_else(|| panic!("{kind} has no table entry"));
    events.push(Event::open(kind.tag_name(), sample_attrs(kind)));
    for part in &spec.grammar {
        let child = match part.expect {
            Expect::Kind(child) => child,
            Expect::Any(family) => representative(family),
        };
        for _ in 0..part.min {
            minimal(child, events);
        }
    }
    events.push(Event::close(kind.tag_name()));
}

fn run(root: Kind, events: Vec<Event>) -> Result<Harvest> {
    let mut engine = ParseEngine::with_root(root, ParseOptions::new())?;
    engine.feed_all(events.into_iter().map(Ok))?;
    engine.finish_result()
}

fn has_required_child(kind: Kind) -> bool {
    REGISTRY
        .spec(kind)
        .is_some_and(|spec| spec.grammar.iter().any(|part| part.min > 0))
}

#[test]
fn test_every_kind_has_a_table_entry() {
    let missing: Vec<Kind> = Kind::iter().filter(|k| REGISTRY.spec(*k).is_none()).collect();
    assert!(missing.is_empty(), "unregistered kinds: {missing:?}");
}

#[test]
fn test_every_kind_accepts_minimal_children() {
    let mut failures = Vec::new();
    for kind in Kind::iter() {
        let mut events = Vec::new();
        minimal(kind, &mut events);
        if let Err(err) = run(kind, events) {
            failures.push(format!("{kind}: {err}"));
        }
    }
    assert!(failures.is_empty(), "rejected minimal input:\n{}", failures.join("\n"));
}

#[test]
fn test_required_children_cannot_be_omitted() {
    let mut checked = 0;
    for kind in Kind::iter().filter(|k| has_required_child(*k)) {
        let events = vec![
            Event::open(kind.tag_name(), sample_attrs(kind)),
            Event::close(kind.tag_name()),
        ];
        let err = run(kind, events).unwrap_err();
        assert!(
            matches!(err, DxlError::ArityViolation { ref element, .. } if element == kind.tag_name()),
            "{kind}: {err}"
        );
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn test_each_family_rejects_a_foreign_child() {
    let families = [
        Family::Root,
        Family::Section,
        Family::Scalar,
        Family::Clause,
        Family::Logical,
        Family::Physical,
        Family::Metadata,
        Family::Aux,
    ];
    for family in families {
        let kinds: Vec<Kind> = Kind::iter().filter(|k| k.family() == family).collect();
        assert!(!kinds.is_empty(), "no kinds in {family}");
        for kind in kinds {
            let events = vec![
                Event::open(kind.tag_name(), sample_attrs(kind)),
                Event::open_empty("DXLMessage"),
            ];
            let err = run(kind, events).unwrap_err();
            assert!(
                matches!(err, DxlError::UnexpectedTag { ref tag, .. } if tag == "DXLMessage"),
                "{kind}: {err}"
            );
        }
    }
}

#[test]
fn test_each_family_rejects_an_unknown_child() {
    for kind in Kind::iter() {
        let events = vec![
            Event::open(kind.tag_name(), sample_attrs(kind)),
            Event::open_empty("NoSuchElement"),
        ];
        let err = run(kind, events).unwrap_err();
        assert!(
            matches!(err, DxlError::UnrecognizedTag { ref tag, .. } if tag == "NoSuchElement"),
            "{kind}: {err}"
        );
    }
}
