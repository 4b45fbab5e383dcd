//! Lexical access-path classification.
//!
//! Operator names drift between server versions (`IndexLookUp`,
//! `IndexReader`, `IndexMerge`, `TableReader`, `TableFullScan`...), so the
//! rule only looks for substrings of the lowercased operator id.

use optcal_core::plan::{PlanNode, PlanType};

/// Classify a single operator id, `Unknown` when it says nothing either way.
pub fn classify_id(id: &str) -> PlanType {
    let id = id.to_ascii_lowercase();
    if id.contains("index") && !id.contains("table") {
        PlanType::IndexAccess
    } else if id.contains("tablereader") {
        PlanType::FullScan
    } else {
        PlanType::Unknown
    }
}

/// Root first, then the first conclusive child in order.
pub fn classify(node: &PlanNode) -> PlanType {
    match classify_id(&node.id) {
        PlanType::Unknown => node
            .children
            .iter()
            .map(classify)
            .find(|t| *t != PlanType::Unknown)
            .unwrap_or(PlanType::Unknown),
        decided => decided,
    }
}
