use crate::report::ScanReport;
use crate::reporter::Reporter;
use crate::rules::{get_rule, Finding, Severity};
use colored::Colorize;

pub struct TextReporter {
    show_fix_hints: bool,
}

impl TextReporter {
    pub fn new() -> Self {
        Self {
            show_fix_hints: true,
        }
    }

    fn severity_label(&self, severity: &Severity) -> colored::ColoredString {
        let label = format!("[{}]", severity);
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.yellow().bold(),
            Severity::Medium => label.cyan(),
            Severity::Low => label.white(),
        }
    }

    /// Lint-style block: location header, offending line, message.
    fn format_finding(&self, finding: &Finding) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}:{}: {} {}: {}\n",
            finding.file,
            finding.line,
            self.severity_label(&finding.severity),
            finding.rule_id.bold(),
            finding.message
        ));
        output.push_str(&format!(
            "  {} {}\n",
            "|".dimmed(),
            finding.matched_text.trim()
        ));
        if let Some(rule) = get_rule(&finding.rule_id) {
            if !rule.compliance.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    "=".dimmed(),
                    format!("ref: {}", rule.compliance.join(", ")).blue()
                ));
            }
        }
        if self.show_fix_hints && !finding.fix_hint.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "=".dimmed(),
                format!("fix: {}", finding.fix_hint).green()
            ));
        }
        output
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TextReporter {
    fn render(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        for finding in &report.issues {
            output.push_str(&self.format_finding(finding));
            output.push('\n');
        }

        if !report.diagnostics.is_empty() {
            output.push_str(&format!("{}\n", "Skipped or degraded files:".dimmed()));
            for diag in &report.diagnostics {
                match diag.line {
                    Some(line) => {
                        output.push_str(&format!("  {}:{}: {}\n", diag.file, line, diag.message))
                    }
                    None => output.push_str(&format!("  {}: {}\n", diag.file, diag.message)),
                }
            }
            output.push('\n');
        }

        let counts = &report.counts;
        output.push_str(&format!(
            "{} file(s) scanned: {} critical, {} high, {} medium, {} low",
            report.files_scanned, counts.critical, counts.high, counts.medium, counts.low
        ));
        if report.suppressed > 0 {
            output.push_str(&format!(" ({} suppressed)", report.suppressed));
        }
        output.push('\n');

        let verdict = if report.issues.is_empty() {
            "PASS".green().bold().to_string()
        } else {
            "FAIL".red().bold().to_string()
        };
        output.push_str(&format!("Result: {}\n", verdict));

        output
    }
}
