//! Output rendering for plans and run reports.
//!
//! Supports two plan formats:
//! - Listing: numbered, colored command lines (what `--dry-run` prints)
//! - JSON: an array of invocation records, for piping into other tools

mod colors;

pub use colors::{Colorizer, OutcomeBadge};

use crate::enumerate::Plan;
use crate::runner::{Outcome, RunReport};
use crate::types::InvocationRecord;

/// Numbered listing of every invocation in `plan`.
pub fn render_listing(plan: Plan, program: &[String], color: Colorizer) -> String {
    let total = plan.len();
    let width = total.to_string().len();
    let mut out = color.header(&format!("# Plan: {} invocations ({})", total, plan.shape()));
    out.push('\n');

    for (i, record) in plan.enumerate() {
        out.push_str(&format!("{:>width$}. {}\n", i + 1, color.command(program, &record), width = width));
    }
    out
}

/// Plan as a pretty-printed JSON array.
pub fn render_json(plan: Plan) -> serde_json::Result<String> {
    let records: Vec<InvocationRecord> = plan.collect();
    serde_json::to_string_pretty(&records)
}

/// One-line summary of a finished run.
pub fn render_report(report: &RunReport, color: Colorizer) -> String {
    let mut line = format!(
        "{} {}/{} succeeded",
        color.badge(if report.failed == 0 { OutcomeBadge::Ok } else { OutcomeBadge::Failed }),
        report.succeeded,
        report.planned,
    );
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    if report.attempted < report.planned {
        line.push_str(&color.dim(&format!(" ({} not attempted)", report.planned - report.attempted)));
    }
    line
}

/// The call a halted run stopped on, badged by its outcome.
pub fn render_halt(index: usize, command: &str, outcome: &Outcome, color: Colorizer) -> String {
    format!(
        "{} #{} {}\n  {}",
        color.badge(OutcomeBadge::of(outcome)),
        index,
        outcome,
        color.dim(command)
    )
}
