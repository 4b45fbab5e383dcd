//! Shape detection and dispatch.
//!
//! The shape is read off the response itself: a single-column response whose
//! text is a JSON array is structured, otherwise the column count picks the
//! tabular decoder. Callers never say which format they asked for.

use optcal_core::plan::PlanNode;

use crate::error::{ParseError, Result};
use crate::json::parse_json;
use crate::tabular::{analyze_row, brief_row, chain_rows, ANALYZE_COLUMNS, BRIEF_COLUMNS};

/// Rows of a plan response as returned by the server, every cell as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlan {
    pub rows: Vec<Vec<String>>,
}

impl RawPlan {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Single-cell response, as the structured format returns.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            rows: vec![vec![text.into()]],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanShape {
    /// 5 columns, static plan.
    Brief,
    /// 9 columns, executed plan.
    Analyze,
    /// JSON array of operator trees.
    Structured,
}

pub fn detect_shape(raw: &RawPlan) -> Result<PlanShape> {
    let first = raw.rows.first().ok_or(ParseError::Empty)?;
    let columns = first.len();
    if let Some(other) = raw.rows.iter().map(Vec::len).find(|&n| n != columns) {
        return Err(ParseError::RaggedRows {
            first: columns,
            other,
        });
    }
    match columns {
        1 if first[0].trim_start().starts_with('[') => Ok(PlanShape::Structured),
        BRIEF_COLUMNS => Ok(PlanShape::Brief),
        ANALYZE_COLUMNS => Ok(PlanShape::Analyze),
        columns => Err(ParseError::UnsupportedFormat { columns }),
    }
}

pub fn parse_plan(raw: &RawPlan) -> Result<PlanNode> {
    match detect_shape(raw)? {
        PlanShape::Brief => chain_rows(&raw.rows, brief_row),
        PlanShape::Analyze => chain_rows(&raw.rows, analyze_row),
        // Some drivers split long documents over several rows.
        PlanShape::Structured => {
            let text: String = raw.rows.iter().map(|r| r[0].as_str()).collect();
            parse_json(&text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> RawPlan {
        RawPlan::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_detects_each_shape() {
        let brief = raw(&[&["TableReader_7", "1", "root", "", ""]]);
        assert_eq!(detect_shape(&brief).unwrap(), PlanShape::Brief);

        let analyze = raw(&[&["IndexLookUp_10", "1", "1", "root", "", "", "", "", ""]]);
        assert_eq!(detect_shape(&analyze).unwrap(), PlanShape::Analyze);

        let json = RawPlan::single("  [{\"id\": \"Point_Get_1\"}]");
        assert_eq!(detect_shape(&json).unwrap(), PlanShape::Structured);
    }

    #[test]
    fn test_unknown_shapes_fail() {
        assert!(matches!(
            detect_shape(&raw(&[&["a", "b", "c", "d"]])),
            Err(ParseError::UnsupportedFormat { columns: 4 })
        ));
        assert!(matches!(
            detect_shape(&RawPlan::single("TableReader_7")),
            Err(ParseError::UnsupportedFormat { columns: 1 })
        ));
        assert!(matches!(
            detect_shape(&RawPlan::default()),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            detect_shape(&raw(&[&["a", "1", "root", "", ""], &["b", "1", "root", ""]])),
            Err(ParseError::RaggedRows { first: 5, other: 4 })
        ));
    }

    #[test]
    fn test_structured_split_across_rows() {
        let plan = raw(&[&["[{\"id\": \"TableReader_7\", "], &["\"children\": []}]"]]);
        assert_eq!(parse_plan(&plan).unwrap().id, "TableReader_7");
    }
}
