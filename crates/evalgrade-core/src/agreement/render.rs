use std::fmt::Write;

use super::{AgreementReport, Aggregator};

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Counts, percentages and per-bucket reasoning for one aggregator.
pub fn render_summary(title: &str, agg: &Aggregator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    for (sub, s) in agg.summaries() {
        let total = s.total();
        let _ = writeln!(out, "{}:", sub);
        let _ = writeln!(out, "  Agree: {} ({:.2}%)", s.agree, percent(s.agree, total));
        let _ = writeln!(out, "  Disagree: {} ({:.2}%)", s.disagree, percent(s.disagree, total));
        for (key, bucket) in &s.buckets {
            let _ = writeln!(
                out,
                "    {}: {} ({:.2}%)",
                key,
                bucket.count,
                percent(bucket.count, s.disagree)
            );
            if !bucket.reasoning.is_empty() {
                let _ = writeln!(out, "      Reasoning:");
                for r in &bucket.reasoning {
                    let _ = writeln!(out, "        - {}", r.replace('\n', " "));
                }
            }
        }
    }
    out
}

pub fn render_report(report: &AgreementReport, per_case: bool) -> String {
    let mut out = String::new();
    if per_case {
        for case in &report.cases {
            out.push_str(&render_summary(
                &format!("Summary for {}", case.report.display()),
                &case.summary,
            ));
            out.push('\n');
        }
    }
    out.push_str(&render_summary(
        &format!("Overall agreement across {} report(s)", report.cases.len()),
        &report.overall,
    ));
    out
}
