//! End-to-end tests parsing DXL fixture documents.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use dxl_parser::ast::metadata::MdObject;
use dxl_parser::ast::ScalarOp;
use dxl_parser::{
    parse_file, parse_reader, parse_str, parse_str_with, CostModelParams, Document, DxlError, MdId,
    ParseOptions,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn child_names(node: &dxl_parser::Node) -> Vec<&'static str> {
    node.children.iter().map(|child| child.name()).collect()
}

#[test]
fn test_limit_sort_table_scan_plan() {
    let document = parse_file(&fixture_path("plan_limit_sort.xml"), &ParseOptions::new()).unwrap();
    let plan = document.as_plan().expect("plan section");

    assert_eq!(plan.space_size, 2);
    assert_eq!(plan.root.name(), "Limit");
    assert_eq!(plan.root.depth(), 4);
    assert_eq!(
        child_names(&plan.root),
        vec!["ProjList", "Sort", "LimitCount", "LimitOffset"]
    );

    let sort = &plan.root.children[1];
    assert_eq!(
        child_names(sort),
        vec![
            "ProjList",
            "Filter",
            "SortingColumnList",
            "LimitCount",
            "LimitOffset",
            "TableScan"
        ]
    );

    let scan = &sort.children[5];
    let table = scan.as_physical().and_then(|op| op.table()).expect("table");
    assert_eq!(table.name, "t1");
    assert_eq!(table.columns.len(), 1);
    assert_eq!(scan.properties.as_ref().map(|p| p.cost.rows), Some(100.0));
}

#[test]
fn test_limit_count_holds_constant() {
    let document = parse_str(&load_fixture("plan_limit_sort.xml")).unwrap();
    let root = document.root().expect("root");
    let count = &root.children[2];
    assert_eq!(count.arity(), 1);
    assert!(matches!(
        count.children[0].as_scalar(),
        Some(ScalarOp::ConstValue(datum)) if datum.as_i64() == Some(10)
    ));
}

#[test]
fn test_query_select() {
    let document = parse_str(&load_fixture("query_select.xml")).unwrap();
    let query = document.as_query().expect("query section");

    assert_eq!(query.output_columns.len(), 2);
    assert!(query.ctes.is_empty());
    assert_eq!(query.root.name(), "LogicalSelect");
    assert_eq!(child_names(&query.root), vec!["Comparison", "LogicalGet"]);
}

#[test]
fn test_metadata_catalog() {
    let document = parse_str(&load_fixture("metadata_catalog.xml")).unwrap();
    let catalog = document.as_metadata().expect("metadata section");
    assert_eq!(catalog.len(), 3);

    let int4 = catalog.md_type(&MdId::gpdb(23)).expect("int4 type");
    assert_eq!(int4.name, "int4");
    assert_eq!(int4.operators.equality, Some(MdId::gpdb(96)));
    assert_eq!(int4.operators.count_agg, Some(MdId::gpdb(2147)));
    assert!(int4.operators.sum_agg.is_none());

    let relation_id = MdId::parse("6.16384.1.1").expect("relation id");
    let relation = catalog.relation(&relation_id).expect("relation");
    assert_eq!(relation.columns.len(), 2);
    assert!(!relation.columns[1].nullable);
    assert!(relation.columns[1].default_value.is_some());
    assert_eq!(relation.keys, vec![vec![6, 2]]);
    assert_eq!(relation.indexes.len(), 1);

    let Some(MdObject::ScalarOp(eq)) = catalog.get(&MdId::gpdb(96)) else {
        panic!("expected the equality operator");
    };
    assert_eq!(eq.result_type, MdId::gpdb(16));
    assert_eq!(eq.opfamilies, vec![MdId::gpdb(1976)]);
}

#[test]
fn test_cost_model_config_installs() {
    let document = parse_str(&load_fixture("cost_params.xml")).unwrap();
    let Document::CostModelConfig(config) = document else {
        panic!("expected a cost model configuration");
    };
    assert_eq!(config.segments, 3);

    let table = CostModelParams::install(&config.params).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get_by_id(0).map(|p| p.name.as_str()), Some("NLJFactor"));

    let mut defaults = CostModelParams::gpdb_defaults();
    defaults.apply(&config.params).unwrap();
    assert_eq!(defaults.value("NLJFactor"), Some(1.0));
}

#[test]
fn test_out_of_bounds_cost_param_parses_but_is_rejected() {
    let document = parse_str(&load_fixture("cost_param_out_of_bounds.xml")).unwrap();
    let Document::CostParams(params) = document else {
        panic!("expected cost parameters");
    };
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].value, 11.0);

    let err = CostModelParams::install(&params).unwrap_err();
    assert!(matches!(err, DxlError::CostParamOutOfBounds { .. }));
}

#[test]
fn test_unknown_operator_names_tag() {
    let err = parse_str(&load_fixture("unknown_operator.xml")).unwrap_err();
    assert!(matches!(
        err,
        DxlError::UnrecognizedTag { ref tag, ref context }
            if tag == "HashJoinFancy" && context.as_deref() == Some("Plan")
    ));
}

#[test]
fn test_truncated_document() {
    let xml = load_fixture("plan_limit_sort.xml");
    let truncated = xml.replace("</dxl:DXLMessage>", "");
    assert!(matches!(parse_str(&truncated), Err(DxlError::Xml(_))));

    let streamed = parse_reader(truncated.as_bytes(), &ParseOptions::new());
    assert!(matches!(
        streamed,
        Err(DxlError::IncompleteDocument { .. } | DxlError::XmlStream(_))
    ));
}

#[test]
fn test_streamed_and_in_memory_parses_agree() {
    for name in [
        "plan_limit_sort.xml",
        "query_select.xml",
        "metadata_catalog.xml",
        "cost_params.xml",
    ] {
        let xml = load_fixture(name);
        let file = File::open(fixture_path(name)).unwrap();
        let streamed = parse_reader(BufReader::new(file), &ParseOptions::new()).unwrap();
        assert_eq!(streamed, parse_str(&xml).unwrap(), "{name}");
    }
}

#[test]
fn test_strict_namespace_rejects_foreign_elements() {
    let xml = r#"<dxl:DXLMessage xmlns:dxl="http://greenplum.com/dxl/2010/12/" xmlns:x="urn:other">
        <x:CostParams/>
    </dxl:DXLMessage>"#;

    let strict = ParseOptions::new().with_strict_namespace(true);
    assert!(matches!(
        parse_str_with(xml, &strict),
        Err(DxlError::UnrecognizedTag { ref tag, .. }) if tag.contains("urn:other")
    ));
    assert!(parse_str(xml).is_ok());
}

#[test]
fn test_missing_required_attribute() {
    let xml = load_fixture("query_select.xml").replace(r#" ColName="b""#, "");
    let err = parse_str(&xml).unwrap_err();
    assert!(matches!(
        err,
        DxlError::MissingRequiredAttribute { ref element, ref attribute }
            if element == "Ident" && attribute == "ColName"
    ));
}
