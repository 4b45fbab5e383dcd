//! Figures pulled out of the free-form execution-info text of executed plans,
//! e.g. `cop_task: {num: 1, max: 1.1ms, copr_cache_hit_ratio: 0.00}` or
//! `time:3.1ms, loops:2, RU:4.83`.

use once_cell::sync::Lazy;
use regex::Regex;

use optcal_core::plan::PlanNode;

static HIT_RATIO_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)hit[_ ]ratio:\s*([0-9]*\.?[0-9]+)").expect("hit ratio pattern compiles")
});

static RU_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bRU:\s*([0-9]*\.?[0-9]+)").expect("RU pattern compiles"));

fn captures<'a>(re: &'a Regex, text: &'a str) -> impl Iterator<Item = f64> + 'a {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
}

/// Highest cache hit ratio reported anywhere in the plan, `None` when no node
/// reports one.
pub fn cache_hit_ratio(plan: &PlanNode) -> Option<f64> {
    plan.iter()
        .flat_map(|node| captures(&HIT_RATIO_REGEX, &node.execution_info))
        .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))
}

/// A measurement served (even partly) from a result cache does not reflect
/// the access path's real cost.
pub fn is_contaminated(plan: &PlanNode) -> bool {
    cache_hit_ratio(plan).is_some_and(|r| r > 0.0)
}

/// Resource units of the first node that reports them, zero when absent.
pub fn resource_cost(plan: &PlanNode) -> f64 {
    plan.iter()
        .find_map(|node| captures(&RU_REGEX, &node.execution_info).next())
        .unwrap_or(0.0)
}
