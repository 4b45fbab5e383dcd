//! Structured (JSON) plan responses.
//!
//! The document is an array whose first element is the root operator. Field
//! names differ between server versions, so each field accepts both the
//! spaced names of the brief format and the camel-cased JSON names.

use serde::Deserialize;

use optcal_core::plan::PlanNode;

use crate::error::{ParseError, Result};
use crate::numeric::{IdentityField, NumericField};

#[derive(Debug, Clone, Deserialize)]
pub struct JsonPlanNode {
    #[serde(default)]
    pub id: Option<IdentityField>,

    #[serde(default, rename = "estRows")]
    pub est_rows: Option<NumericField>,

    /// Older servers report estimated rows as `count`.
    #[serde(default)]
    pub count: Option<NumericField>,

    #[serde(default, rename = "actRows")]
    pub act_rows: Option<NumericField>,

    #[serde(default, rename = "estCost")]
    pub est_cost: Option<NumericField>,

    #[serde(default, alias = "taskType")]
    pub task: Option<String>,

    #[serde(default, rename = "access object", alias = "accessObject")]
    pub access_object: Option<String>,

    #[serde(default, rename = "operator info", alias = "operatorInfo")]
    pub operator_info: Option<String>,

    #[serde(default, rename = "execution info", alias = "executeInfo")]
    pub execution_info: Option<String>,

    #[serde(default, alias = "memoryInfo")]
    pub memory: Option<String>,

    #[serde(default, alias = "diskInfo")]
    pub disk: Option<String>,

    #[serde(default, alias = "subOperators")]
    pub children: Vec<JsonPlanNode>,
}

impl JsonPlanNode {
    pub fn into_node(self) -> Result<PlanNode> {
        self.into_node_at(0)
    }

    fn into_node_at(self, depth: usize) -> Result<PlanNode> {
        let id = self
            .id
            .and_then(IdentityField::into_label)
            .ok_or(ParseError::MissingIdentity { depth })?;

        let est_rows = self
            .est_rows
            .or(self.count)
            .map(|f| f.as_f64())
            .unwrap_or(0.0);

        let children = self
            .children
            .into_iter()
            .map(|child| child.into_node_at(depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(PlanNode {
            id,
            task: self.task.unwrap_or_default(),
            est_rows,
            act_rows: self.act_rows.map(|f| f.as_rows()),
            est_cost: self.est_cost.map(|f| f.as_f64()).unwrap_or(0.0),
            access_object: self.access_object.unwrap_or_default(),
            operator_info: self.operator_info.unwrap_or_default(),
            execution_info: self.execution_info.unwrap_or_default(),
            memory: self.memory.unwrap_or_default(),
            disk: self.disk.unwrap_or_default(),
            children,
        })
    }
}

/// Decode a JSON plan document into its root node.
pub fn parse_json(text: &str) -> Result<PlanNode> {
    let nodes: Vec<JsonPlanNode> = serde_json::from_str(text.trim())?;
    nodes
        .into_iter()
        .next()
        .ok_or(ParseError::Empty)?
        .into_node()
}
