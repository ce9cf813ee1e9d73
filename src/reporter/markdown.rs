//! Markdown reporter, suitable for CI job summaries and pull requests.

use crate::report::ScanReport;
use crate::reporter::Reporter;
use crate::rules::{get_rule, Severity};

pub struct MarkdownReporter;

impl MarkdownReporter {
    fn severity_marker(severity: &Severity) -> &'static str {
        match severity {
            Severity::Critical => "\u{1F6A8}",    // 🚨
            Severity::High => "\u{26A0}\u{FE0F}", // ⚠️
            Severity::Medium => "\u{1F7E1}",      // 🟡
            Severity::Low => "\u{1F535}",         // 🔵
        }
    }
}

impl Reporter for MarkdownReporter {
    fn render(&self, report: &ScanReport) -> String {
        let mut output = String::from("# Configuration scan report\n\n");

        let counts = &report.counts;
        output.push_str("| Severity | Count |\n|---|---|\n");
        output.push_str(&format!("| Critical | {} |\n", counts.critical));
        output.push_str(&format!("| High | {} |\n", counts.high));
        output.push_str(&format!("| Medium | {} |\n", counts.medium));
        output.push_str(&format!("| Low | {} |\n\n", counts.low));

        output.push_str(&format!(
            "{} file(s) scanned, {} finding(s), {} suppressed.\n\n",
            report.files_scanned,
            counts.total(),
            report.suppressed
        ));

        if !report.issues.is_empty() {
            output.push_str("## Findings\n\n");
            for finding in &report.issues {
                output.push_str(&format!(
                    "### {} {} `{}` — {}:{}\n\n",
                    Self::severity_marker(&finding.severity),
                    finding.severity,
                    finding.rule_id,
                    finding.file,
                    finding.line
                ));
                output.push_str(&format!("{}\n\n", finding.message));
                output.push_str(&format!("```\n{}\n```\n\n", finding.matched_text.trim()));
                if !finding.fix_hint.is_empty() {
                    output.push_str(&format!("**Fix:** {}\n\n", finding.fix_hint));
                }
                if let Some(rule) = get_rule(&finding.rule_id) {
                    if !rule.compliance.is_empty() {
                        output.push_str(&format!("**Refs:** {}\n\n", rule.compliance.join(", ")));
                    }
                }
            }
        }

        if !report.diagnostics.is_empty() {
            output.push_str("## Skipped or degraded files\n\n");
            for diag in &report.diagnostics {
                match diag.line {
                    Some(line) => output.push_str(&format!(
                        "- `{}` line {}: {}\n",
                        diag.file, line, diag.message
                    )),
                    None => output.push_str(&format!("- `{}`: {}\n", diag.file, diag.message)),
                }
            }
            output.push('\n');
        }

        output
    }
}
