//! Scan report: the terminal, immutable artifact of one invocation.

use crate::document::Diagnostic;
use crate::rules::{Finding, Severity};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Exit code when the scan could not run at all (broken registry or
/// ignore file). Distinct from the severity-derived codes.
pub const EXIT_FATAL: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings.iter().fold(Self::default(), |mut counts, f| {
            match f.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_date: String,
    pub files_scanned: usize,
    pub issues: Vec<Finding>,
    #[serde(default)]
    pub suppressed: usize,
    #[serde(default)]
    pub counts: SeverityCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
    /// Assemble the report from merged per-file results. Issues are sorted
    /// deterministically so completion order across workers never shows.
    pub fn build(
        files_scanned: usize,
        mut issues: Vec<Finding>,
        suppressed: usize,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Self {
        issues.sort_by_key(Finding::sort_key);
        diagnostics.sort_by(|a, b| (&a.file, a.line).cmp(&(&b.file, b.line)));
        let counts = SeverityCounts::from_findings(&issues);
        Self {
            scan_date: Utc::now().to_rfc3339(),
            files_scanned,
            issues,
            suppressed,
            counts,
            diagnostics,
        }
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|f| f.severity).max()
    }

    /// 0: nothing at or above the threshold survived. 1: worst surviving
    /// finding is low or medium. 2: high or critical.
    pub fn exit_code(&self) -> u8 {
        match self.highest_severity() {
            None => 0,
            Some(Severity::Low | Severity::Medium) => 1,
            Some(Severity::High | Severity::Critical) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str, severity: Severity, file: &str, line: usize) -> Finding {
        Finding {
            rule_id: id.to_string(),
            severity,
            file: file.to_string(),
            line,
            matched_text: "code".to_string(),
            message: "message".to_string(),
            fix_hint: "fix".to_string(),
        }
    }

    #[test]
    fn test_counts_by_severity() {
        let findings = vec![
            finding("A1001", Severity::Critical, "a.yml", 1),
            finding("A1002", Severity::High, "a.yml", 2),
            finding("A1003", Severity::High, "b.yml", 3),
            finding("A1004", Severity::Low, "c.yml", 4),
        ];
        let counts = SeverityCounts::from_findings(&findings);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.low, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_build_sorts_issues() {
        let report = ScanReport::build(
            2,
            vec![
                finding("B2001", Severity::Low, "a.yml", 1),
                finding("C3001", Severity::Critical, "z.yml", 5),
                finding("C3002", Severity::Critical, "a.yml", 9),
            ],
            0,
            vec![],
        );
        let order: Vec<_> = report.issues.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(order, vec!["C3002", "C3001", "B2001"]);
    }

    #[test]
    fn test_build_is_insertion_order_insensitive() {
        let a = vec![
            finding("B2001", Severity::Low, "a.yml", 1),
            finding("C3001", Severity::Critical, "z.yml", 5),
        ];
        let mut b = a.clone();
        b.reverse();
        let ra = ScanReport::build(1, a, 0, vec![]);
        let rb = ScanReport::build(1, b, 0, vec![]);
        assert_eq!(ra.issues, rb.issues);
    }

    #[test]
    fn test_exit_codes() {
        let empty = ScanReport::build(1, vec![], 0, vec![]);
        assert_eq!(empty.exit_code(), 0);

        let low = ScanReport::build(1, vec![finding("A1001", Severity::Low, "a.yml", 1)], 0, vec![]);
        assert_eq!(low.exit_code(), 1);

        let medium = ScanReport::build(
            1,
            vec![finding("A1001", Severity::Medium, "a.yml", 1)],
            0,
            vec![],
        );
        assert_eq!(medium.exit_code(), 1);

        let high = ScanReport::build(
            1,
            vec![finding("A1001", Severity::High, "a.yml", 1)],
            0,
            vec![],
        );
        assert_eq!(high.exit_code(), 2);

        let critical = ScanReport::build(
            1,
            vec![finding("A1001", Severity::Critical, "a.yml", 1)],
            0,
            vec![],
        );
        assert_eq!(critical.exit_code(), 2);
    }

    #[test]
    fn test_diagnostics_do_not_affect_exit_code() {
        let report = ScanReport::build(
            0,
            vec![],
            0,
            vec![Diagnostic::new("bad.yml", None, "unreadable")],
        );
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let report = ScanReport::build(
            3,
            vec![
                finding("DC001", Severity::Critical, "docker-compose.yml", 4),
                finding("KS008", Severity::Low, "pod.yaml", 9),
            ],
            1,
            vec![],
        );
        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.issues, report.issues);
        assert_eq!(parsed.files_scanned, 3);
        assert_eq!(parsed.suppressed, 1);

        // The documented field names are stable.
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("scan_date").is_some());
        assert!(value.get("files_scanned").is_some());
        let issue = &value["issues"][0];
        for field in ["id", "severity", "file", "line", "message", "fix"] {
            assert!(issue.get(field).is_some(), "missing field {}", field);
        }
    }
}
