// fil-fuzzing/src/reporters/mod.rs
//! Console audit trail and result artifacts

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::harness::{CaseOutcome, CaseReport, RunSummary};

/// Print one case: name, category, full payload and verdict
pub fn print_case(index: usize, total: usize, report: &CaseReport) {
    println!("\n[{}/{}] {} ({})", index, total, report.name, report.category);

    if let Some(payload) = &report.payload {
        let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        println!("Payload ({} bytes):\n{}", report.payload_bytes, pretty);
    }

    match &report.outcome {
        CaseOutcome::Classified(classification) => {
            println!("Verdict: {} ({})", classification.verdict(), classification)
        }
        CaseOutcome::Skipped(reason) => println!("Skipped: {}", reason),
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", summary);
}

/// Write the summary to `<dir>/<target>_results.txt`, creating `dir`
pub fn save_summary(dir: &Path, summary: &RunSummary) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_results.txt", summary.target));
    fs::write(&path, summary.to_string())?;
    Ok(path)
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} Fuzzing Results ===", self.target)?;
        writeln!(f, "Endpoint: {}", self.endpoint)?;
        writeln!(f, "Total cases: {}", self.total())?;
        writeln!(f, "Expected rejections: {}", self.rejected())?;
        writeln!(f, "Unexpected acceptances: {}", self.accepted())?;
        writeln!(f, "Transport failures: {}", self.transport_failures())?;
        writeln!(f, "Connection failures: {}", self.unreachable())?;
        writeln!(f, "Skipped: {}", self.skipped())?;

        let mut per_category: BTreeMap<_, (usize, usize)> = BTreeMap::new();
        for report in &self.reports {
            let entry = per_category.entry(report.category).or_default();
            entry.0 += 1;
            if report.verdict() == Some(crate::harness::Verdict::UnexpectedAcceptance) {
                entry.1 += 1;
            }
        }
        if !per_category.is_empty() {
            writeln!(f, "\nCases by category:")?;
            for (category, (count, accepted)) in &per_category {
                writeln!(f, "  {}: {} ({} accepted)", category, count, accepted)?;
            }
        }

        let acceptances: Vec<_> = self.acceptances().collect();
        if !acceptances.is_empty() {
            writeln!(f, "\nUnexpected acceptances:")?;
            for report in acceptances {
                if let CaseOutcome::Classified(c) = &report.outcome {
                    writeln!(f, "  {} ({}): {}", report.name, report.category, c)?;
                }
            }
        }

        let skipped: Vec<_> = self
            .reports
            .iter()
            .filter_map(|r| match &r.outcome {
                CaseOutcome::Skipped(reason) => Some((r.name.as_str(), reason)),
                CaseOutcome::Classified(_) => None,
            })
            .collect();
        if !skipped.is_empty() {
            writeln!(f, "\nSkipped cases:")?;
            for (name, reason) in skipped {
                writeln!(f, "  {}: {}", name, reason)?;
            }
        }

        Ok(())
    }
}
