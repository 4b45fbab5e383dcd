//! Plain-text rendering of an [`Aggregation`].

use std::fmt::Write as _;
use std::time::Duration;

use optcal_core::prelude::PlanType;

use crate::aggregate::{Aggregation, ScenarioSummary, TypeStats};

/// Left-aligned text table with a dashed rule under the header.
struct TextTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }
        let line = |cells: &[String], out: &mut String| {
            let text: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:<w$}")
                })
                .collect();
            let _ = writeln!(out, "{}", text.join("  ").trim_end());
        };
        line(&self.header, out);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("  "));
        for row in &self.rows {
            line(row, out);
        }
    }
}

fn ms(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64() * 1000.0)
}

fn stats_cell(stats: Option<&TypeStats>) -> [String; 2] {
    match stats {
        Some(s) => [
            format!("{}/{}/{}", ms(s.min), ms(s.avg), ms(s.max)),
            format!("{:.2}", s.avg_resource_cost),
        ],
        None => ["-".to_string(), "-".to_string()],
    }
}

/// Plan types with at least one executed run anywhere in the aggregation.
fn measured_types(agg: &Aggregation) -> Vec<PlanType> {
    agg.overall.by_type.keys().copied().collect()
}

/// One row per executed run, ordered by scenario id then variant.
pub fn render_detail(agg: &Aggregation) -> String {
    let mut table = TextTable::new([
        "scenario", "variant", "plan", "time_ms", "rows", "ru", "retried",
    ]);
    for r in &agg.details {
        table.push(vec![
            r.scenario_id.to_string(),
            r.variant.to_string(),
            r.plan_type.to_string(),
            ms(r.duration),
            r.rows_returned.to_string(),
            format!("{:.2}", r.resource_cost),
            if r.retried { "yes" } else { "" }.to_string(),
        ]);
    }
    let mut out = String::from("== Results ==\n");
    table.render(&mut out);
    out
}

fn summary_row(s: &ScenarioSummary, types: &[PlanType]) -> Vec<String> {
    let mut row = vec![
        s.id.to_string(),
        s.optimizer_choice
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ];
    for t in types {
        row.extend(stats_cell(s.by_type.get(t)));
    }
    row.push(match s.chose_fastest() {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => "-".to_string(),
    });
    row.push(if s.coverage_gap() { "GAP" } else { "" }.to_string());
    row
}

/// Per-scenario min/avg/max milliseconds and average RU per plan type.
pub fn render_summary(agg: &Aggregation) -> String {
    let types = measured_types(agg);
    let mut header = vec!["scenario".to_string(), "optimizer".to_string()];
    for t in &types {
        header.push(format!("{t} min/avg/max ms"));
        header.push(format!("{t} ru"));
    }
    header.push("chose_fastest".to_string());
    header.push("coverage".to_string());
    let mut table = TextTable::new(header);
    for s in &agg.scenarios {
        table.push(summary_row(s, &types));
    }
    let mut out = String::from("== Summary by scenario ==\n");
    table.render(&mut out);
    out
}

pub fn render_overall(agg: &Aggregation) -> String {
    let o = &agg.overall;
    let mut out = String::from("== Overall ==\n");
    let _ = writeln!(out, "scenarios:        {}", o.scenarios);
    let _ = writeln!(out, "executed runs:    {}", o.executed_runs);
    for (t, s) in &o.by_type {
        let _ = writeln!(
            out,
            "{:<17} runs={} avg_ms={} avg_ru={:.2}",
            format!("{t}:"),
            s.runs,
            ms(s.avg),
            s.avg_resource_cost
        );
    }
    let _ = writeln!(
        out,
        "optimizer choice: index_access {:.1}%, full_scan {:.1}%",
        o.index_choice_pct, o.full_scan_choice_pct
    );
    if o.comparable > 0 {
        let _ = writeln!(
            out,
            "chose fastest:    {}/{} ({:.1}%)",
            o.chose_fastest,
            o.comparable,
            o.chose_fastest as f64 * 100.0 / o.comparable as f64
        );
    } else {
        let _ = writeln!(out, "chose fastest:    -");
    }
    let _ = writeln!(out, "coverage gaps:    {}", o.coverage_gaps.len());
    for id in &o.coverage_gaps {
        let _ = writeln!(out, "  {id}");
    }
    out
}

/// Detail table, per-scenario summary and overall summary, in that order.
pub fn render_report(agg: &Aggregation) -> String {
    [render_detail(agg), render_summary(agg), render_overall(agg)].join("\n")
}
