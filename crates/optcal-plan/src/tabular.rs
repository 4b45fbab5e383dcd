//! Tabular plan rows.
//!
//! Brief plans have 5 columns:
//!   id | estRows | task | access object | operator info
//! Executed plans have 9:
//!   id | estRows | actRows | task | access object | execution info |
//!   operator info | memory | disk
//!
//! Rows are chained in order; each row becomes the only child of the row
//! above it.

use optcal_core::plan::PlanNode;

use crate::error::{ParseError, Result};

pub const BRIEF_COLUMNS: usize = 5;
pub const ANALYZE_COLUMNS: usize = 9;

/// Strip the tree-drawing prefix (`└─`, `├─`, `│ `) from an operator id.
pub fn strip_tree_glyphs(id: &str) -> &str {
    id.trim_start_matches(|c: char| matches!(c, '└' | '├' | '│' | '─' | ' ' | '\t'))
        .trim_end()
}

fn number(cell: &str) -> f64 {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn identity(cell: &str) -> Result<String> {
    let id = strip_tree_glyphs(cell);
    if id.is_empty() {
        return Err(ParseError::MissingIdentity { depth: 0 });
    }
    Ok(id.to_string())
}

pub fn brief_row(cols: &[String]) -> Result<PlanNode> {
    if cols.len() != BRIEF_COLUMNS {
        return Err(ParseError::UnsupportedFormat { columns: cols.len() });
    }
    Ok(PlanNode {
        id: identity(&cols[0])?,
        est_rows: number(&cols[1]),
        task: cols[2].trim().to_string(),
        access_object: cols[3].trim().to_string(),
        operator_info: cols[4].trim().to_string(),
        ..Default::default()
    })
}

pub fn analyze_row(cols: &[String]) -> Result<PlanNode> {
    if cols.len() != ANALYZE_COLUMNS {
        return Err(ParseError::UnsupportedFormat { columns: cols.len() });
    }
    let act = number(&cols[2]);
    Ok(PlanNode {
        id: identity(&cols[0])?,
        est_rows: number(&cols[1]),
        act_rows: Some(if act > 0.0 { act as u64 } else { 0 }),
        task: cols[3].trim().to_string(),
        access_object: cols[4].trim().to_string(),
        execution_info: cols[5].trim().to_string(),
        operator_info: cols[6].trim().to_string(),
        memory: cols[7].trim().to_string(),
        disk: cols[8].trim().to_string(),
        ..Default::default()
    })
}

/// Decode every row with `decode` and chain the results.
pub fn chain_rows(
    rows: &[Vec<String>],
    decode: impl Fn(&[String]) -> Result<PlanNode>,
) -> Result<PlanNode> {
    let nodes = rows
        .iter()
        .enumerate()
        .map(|(depth, row)| {
            decode(row).map_err(|e| match e {
                ParseError::MissingIdentity { .. } => ParseError::MissingIdentity { depth },
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    PlanNode::chain(nodes).ok_or(ParseError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_glyphs_are_stripped() {
        assert_eq!(strip_tree_glyphs("└─IndexRangeScan_8"), "IndexRangeScan_8");
        assert_eq!(strip_tree_glyphs("  ├─TableRowIDScan_9(Probe)"), "TableRowIDScan_9(Probe)");
        assert_eq!(strip_tree_glyphs("│ └─TableFullScan_5"), "TableFullScan_5");
        assert_eq!(strip_tree_glyphs("Projection_4"), "Projection_4");
    }

    #[test]
    fn test_brief_chain() {
        let rows = vec![
            row(&["TableReader_7", "100.00", "root", "", "data:Selection_6"]),
            row(&["└─Selection_6", "100.00", "cop[tikv]", "", "eq(t1K.b, 100)"]),
            row(&["  └─TableFullScan_5", "1000.00", "cop[tikv]", "table:t1K", "keep order:false"]),
        ];
        let root = chain_rows(&rows, brief_row).unwrap();
        assert_eq!(root.id, "TableReader_7");
        assert_eq!(root.depth(), 3);
        let leaf = root.iter().last().unwrap();
        assert_eq!(leaf.id, "TableFullScan_5");
        assert_eq!(leaf.est_rows, 1000.0);
        assert_eq!(leaf.access_object, "table:t1K");
        assert_eq!(leaf.act_rows, None);
    }

    #[test]
    fn test_analyze_row_fields() {
        let node = analyze_row(&row(&[
            "IndexLookUp_10",
            "100.00",
            "100",
            "root",
            "",
            "time:812.4µs, loops:2, RU:3.21",
            "",
            "19.1 KB",
            "N/A",
        ]))
        .unwrap();
        assert_eq!(node.act_rows, Some(100));
        assert_eq!(node.execution_info, "time:812.4µs, loops:2, RU:3.21");
        assert_eq!(node.memory, "19.1 KB");
        assert_eq!(node.disk, "N/A");
    }

    #[test]
    fn test_blank_identity_reports_row() {
        let rows = vec![
            row(&["TableReader_7", "1", "root", "", ""]),
            row(&["└─", "1", "cop[tikv]", "", ""]),
        ];
        assert!(matches!(
            chain_rows(&rows, brief_row),
            Err(ParseError::MissingIdentity { depth: 1 })
        ));
    }
}
