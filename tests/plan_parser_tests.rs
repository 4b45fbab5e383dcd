//! Plan parsing and classification across the three response shapes.

use optcal_core::plan::PlanType;
use optcal_plan::{
    cache_hit_ratio, classify, detect_shape, is_contaminated, parse_plan, resource_cost,
    ParseError, PlanShape, RawPlan,
};

fn raw(rows: &[&[&str]]) -> RawPlan {
    RawPlan::new(
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

#[test]
fn test_executed_index_lookup_is_index_access() {
    let plan = raw(&[
        &[
            "IndexLookUp_10",
            "100.00",
            "100",
            "root",
            "",
            "time:1.2ms, loops:2, RU:3.50",
            "",
            "21.3 KB",
            "N/A",
        ],
        &[
            "├─IndexRangeScan_8(Build)",
            "100.00",
            "100",
            "cop[tikv]",
            "table:t1K, index:idx_b(b)",
            "time:0.4ms, loops:3, cop_task: {num: 1, copr_cache_hit_ratio: 0.00}",
            "range:[100,100]",
            "N/A",
            "N/A",
        ],
    ]);
    assert_eq!(detect_shape(&plan).unwrap(), PlanShape::Analyze);
    let root = parse_plan(&plan).unwrap();
    assert_eq!(root.id, "IndexLookUp_10");
    assert_eq!(root.act_rows, Some(100));
    assert_eq!(root.children[0].id, "IndexRangeScan_8(Build)");
    assert_eq!(classify(&root), PlanType::IndexAccess);
    assert_eq!(resource_cost(&root), 3.5);
    assert_eq!(cache_hit_ratio(&root), Some(0.0));
    assert!(!is_contaminated(&root));
}

#[test]
fn test_static_table_reader_is_full_scan() {
    let plan = raw(&[
        &["TableReader_7", "100.00", "root", "", "data:Selection_6"],
        &["└─Selection_6", "100.00", "cop[tikv]", "", "eq(t1K.b, 100)"],
        &["  └─TableFullScan_5", "1000.00", "cop[tikv]", "table:t1K", "keep order:false"],
    ]);
    assert_eq!(detect_shape(&plan).unwrap(), PlanShape::Brief);
    let root = parse_plan(&plan).unwrap();
    assert_eq!(root.node_count(), 3);
    assert_eq!(root.act_rows, None);
    assert_eq!(classify(&root), PlanType::FullScan);
}

#[test]
fn test_structured_plan_with_mixed_numeric_encodings() {
    let doc = r#"[{
        "id": "Projection_4",
        "estRows": 100,
        "taskType": "root",
        "operatorInfo": "t1K.id, t1K.b",
        "subOperators": [{
            "id": "IndexLookUp_10",
            "estRows": "100.00",
            "actRows": "98",
            "taskType": "root",
            "executeInfo": "time:2ms, RU:1.25"
        }]
    }]"#;
    let plan = RawPlan::single(doc);
    assert_eq!(detect_shape(&plan).unwrap(), PlanShape::Structured);
    let root = parse_plan(&plan).unwrap();
    assert_eq!(root.est_rows, 100.0);
    assert_eq!(root.task, "root");
    let child = &root.children[0];
    assert_eq!(child.est_rows, 100.0);
    assert_eq!(child.act_rows, Some(98));
    assert_eq!(classify(&root), PlanType::IndexAccess);
    assert_eq!(resource_cost(&root), 1.25);
}

#[test]
fn test_unknown_column_count_is_rejected() {
    let plan = raw(&[&["TableReader_7", "100.00", "root", "", "data", "extra", "x"]]);
    assert!(matches!(
        parse_plan(&plan),
        Err(ParseError::UnsupportedFormat { columns: 7 })
    ));
}

#[test]
fn test_malformed_json_is_an_error() {
    let plan = RawPlan::single("[{\"id\": ");
    assert!(matches!(parse_plan(&plan), Err(ParseError::Json(_))));
}

#[test]
fn test_classification_is_deterministic_and_total() {
    for (id, expected) in [
        ("IndexReader_6", PlanType::IndexAccess),
        ("IndexMerge_9", PlanType::IndexAccess),
        ("TableReader_7", PlanType::FullScan),
        ("Point_Get_1", PlanType::Unknown),
        ("HashAgg_5", PlanType::Unknown),
    ] {
        let plan = raw(&[&[id, "1", "root", "", ""]]);
        let root = parse_plan(&plan).unwrap();
        assert_eq!(classify(&root), expected, "{id}");
        assert_eq!(classify(&root), classify(&root));
    }
}

#[test]
fn test_cache_hits_mark_the_plan_contaminated() {
    let plan = raw(&[&[
        "TableReader_7",
        "1000.00",
        "1000",
        "root",
        "",
        "time:0.1ms, cop_task: {num: 1, copr_cache_hit_ratio: 1.00}",
        "",
        "N/A",
        "N/A",
    ]]);
    let root = parse_plan(&plan).unwrap();
    assert_eq!(cache_hit_ratio(&root), Some(1.0));
    assert!(is_contaminated(&root));
}
