//! Normalized execution-plan model.
//!
//! All three wire shapes (5-column brief, 9-column analyze, JSON tree) are
//! parsed into `PlanNode`. The tabular shapes become a degenerate tree where
//! every node has at most one child, so classification only has to handle
//! one representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse access-path category of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanType {
    IndexAccess,
    FullScan,
    Unknown,
}

impl PlanType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::IndexAccess => "index_access",
            PlanType::FullScan => "full_scan",
            PlanType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operator of a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    /// Operator label, e.g. `IndexLookUp_10`.
    pub id: String,
    pub task: String,
    pub est_rows: f64,
    /// Only present in executed plans.
    pub act_rows: Option<u64>,
    pub est_cost: f64,
    pub access_object: String,
    pub operator_info: String,
    pub execution_info: String,
    pub memory: String,
    pub disk: String,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Link nodes into a chain: each node becomes the only child of the one
    /// before it. Returns `None` for an empty input.
    pub fn chain(nodes: Vec<PlanNode>) -> Option<PlanNode> {
        nodes.into_iter().rev().fold(None, |below, mut node| {
            if let Some(child) = below {
                node.children = vec![child];
            }
            Some(node)
        })
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn iter(&self) -> PlanIter<'_> {
        PlanIter { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(PlanNode::depth).max().unwrap_or(0)
    }
}

pub struct PlanIter<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> Iterator for PlanIter<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_links_in_order() {
        let root = PlanNode::chain(vec![
            PlanNode::new("Projection_4"),
            PlanNode::new("IndexLookUp_10"),
            PlanNode::new("IndexRangeScan_8"),
        ])
        .expect("non-empty chain");
        assert_eq!(root.id, "Projection_4");
        assert_eq!(root.depth(), 3);
        let ids: Vec<&str> = root.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["Projection_4", "IndexLookUp_10", "IndexRangeScan_8"]);
    }

    #[test]
    fn test_chain_of_nothing() {
        assert!(PlanNode::chain(Vec::new()).is_none());
    }

    #[test]
    fn test_iter_is_preorder() {
        let root = PlanNode::new("a")
            .with_child(PlanNode::new("b").with_child(PlanNode::new("c")))
            .with_child(PlanNode::new("d"));
        let ids: Vec<&str> = root.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        assert_eq!(root.node_count(), 4);
    }
}
