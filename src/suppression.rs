//! Suppression handling: ignore-file entries and inline annotations.
//!
//! Suppressed findings are dropped from the report but counted, so a scan
//! never silently conflates "suppressed" with "not found".

use crate::document::Document;
use crate::error::{Result, ScanError};
use crate::rules::Finding;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// The literal annotation recognized in any dialect's comment syntax:
/// `security-scan: ignore DC001` (comma-separated ids, or `*` for all).
static INLINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"security-scan:\s*ignore\s+([A-Za-z0-9*,-]+)").expect("inline suppression regex")
});

/// One entry of the ignore file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuppressionEntry {
    /// Rule id, or `*` to match every rule.
    pub rule: String,
    /// Exact path or glob; absent means every file.
    #[serde(default)]
    pub file: Option<String>,
    /// Free-text justification. Documentation only, never interpreted.
    #[serde(default)]
    pub reason: Option<String>,
}

/// The ignore file, loaded once per scan and shared read-only by all
/// file workers.
#[derive(Debug, Default)]
pub struct SuppressionSet {
    entries: Vec<(SuppressionEntry, Option<glob::Pattern>)>,
}

impl SuppressionSet {
    /// Load the ignore file. An absent file is an empty set; a present
    /// but malformed file is fatal, since silently ignoring it would make
    /// suppressed rules reappear (or stay hidden) without warning.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No ignore file, suppression set is empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let entries: Vec<SuppressionEntry> =
            serde_yaml::from_str(&content).map_err(|e| ScanError::SuppressionLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::from_entries(entries).map_err(|e| match e {
            ScanError::SuppressionLoad { message, .. } => ScanError::SuppressionLoad {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_entries(entries: Vec<SuppressionEntry>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(entries.len());
        for entry in entries {
            let pattern = match &entry.file {
                Some(file) => Some(glob::Pattern::new(file).map_err(|e| {
                    ScanError::SuppressionLoad {
                        path: String::new(),
                        message: format!("invalid file glob {:?}: {}", file, e),
                    }
                })?),
                None => None,
            };
            compiled.push((entry, pattern));
        }
        Ok(Self { entries: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry suppresses `rule_id` in `file`.
    pub fn matches(&self, rule_id: &str, file: &str) -> bool {
        self.entries.iter().any(|(entry, pattern)| {
            let rule_hit = entry.rule == "*" || entry.rule == rule_id;
            let file_hit = match (&entry.file, pattern) {
                (None, _) => true,
                (Some(exact), Some(glob)) => exact == file || glob.matches(file),
                (Some(exact), None) => exact == file,
            };
            rule_hit && file_hit
        })
    }

    /// Files matched by a `rule: "*"` entry are skipped wholesale; the
    /// walker uses this to prune excluded paths before parsing.
    pub fn excludes_file(&self, file: &str) -> bool {
        self.entries
            .iter()
            .any(|(entry, pattern)| match (&entry.rule == "*", &entry.file, pattern) {
                (true, Some(exact), Some(glob)) => exact == file || glob.matches(file),
                _ => false,
            })
    }
}

/// Rule ids named by an inline annotation on `line`, if any.
fn inline_rules(line: &str) -> Option<Vec<String>> {
    INLINE_PATTERN.captures(line).map(|caps| {
        caps[1]
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

/// Whether the finding's own line, or the line immediately preceding or
/// trailing it, carries an annotation naming the rule (or `*`).
fn inline_suppressed(doc: &Document, line: usize, rule_id: &str) -> bool {
    let adjacent = [line.saturating_sub(1), line, line + 1];
    for candidate in adjacent {
        if candidate == 0 {
            continue;
        }
        if let Some(text) = doc.line(candidate) {
            if let Some(rules) = inline_rules(text) {
                if rules.iter().any(|r| r == "*" || r == rule_id) {
                    return true;
                }
            }
        }
    }
    false
}

/// Drop suppressed findings for one document. Findings are never edited;
/// the suppressed count is returned for the report summary.
pub fn filter(
    findings: Vec<Finding>,
    doc: &Document,
    set: &SuppressionSet,
) -> (Vec<Finding>, usize) {
    let before = findings.len();
    let surviving: Vec<Finding> = findings
        .into_iter()
        .filter(|f| {
            !set.matches(&f.rule_id, &f.file) && !inline_suppressed(doc, f.line, &f.rule_id)
        })
        .collect();
    let suppressed = before - surviving.len();
    if suppressed > 0 {
        debug!(file = %doc.path, suppressed, "Findings suppressed");
    }
    (surviving, suppressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Dialect;
    use crate::matcher::evaluate;
    use crate::parser::parse_document;
    use crate::rules::all_rules;

    fn entry(rule: &str, file: Option<&str>) -> SuppressionEntry {
        SuppressionEntry {
            rule: rule.to_string(),
            file: file.map(str::to_string),
            reason: None,
        }
    }

    #[test]
    fn test_entry_matches_by_rule_and_file() {
        let set =
            SuppressionSet::from_entries(vec![entry("DC001", Some("docker-compose.yml"))]).unwrap();
        assert!(set.matches("DC001", "docker-compose.yml"));
        assert!(!set.matches("DC001", "other.yml"));
        assert!(!set.matches("DC002", "docker-compose.yml"));
    }

    #[test]
    fn test_entry_without_file_applies_everywhere() {
        let set = SuppressionSet::from_entries(vec![entry("KS008", None)]).unwrap();
        assert!(set.matches("KS008", "a.yaml"));
        assert!(set.matches("KS008", "deep/nested/b.yaml"));
    }

    #[test]
    fn test_entry_glob_matching() {
        let set = SuppressionSet::from_entries(vec![entry("DC002", Some("deploy/**"))]).unwrap();
        assert!(set.matches("DC002", "deploy/docker-compose.yml"));
        assert!(set.matches("DC002", "deploy/stage/docker-compose.yml"));
        assert!(!set.matches("DC002", "docker-compose.yml"));
    }

    #[test]
    fn test_wildcard_rule_excludes_file() {
        let set = SuppressionSet::from_entries(vec![entry("*", Some("fixtures/**"))]).unwrap();
        assert!(set.excludes_file("fixtures/bad-compose.yml"));
        assert!(!set.excludes_file("src/docker-compose.yml"));
        // Rule-scoped entries never exclude whole files.
        let scoped = SuppressionSet::from_entries(vec![entry("DC001", Some("fixtures/**"))]).unwrap();
        assert!(!scoped.excludes_file("fixtures/bad-compose.yml"));
    }

    #[test]
    fn test_invalid_glob_is_fatal() {
        let err = SuppressionSet::from_entries(vec![entry("DC001", Some("[bad"))]).unwrap_err();
        assert!(matches!(err, ScanError::SuppressionLoad { .. }));
    }

    #[test]
    fn test_load_absent_file_is_empty_set() {
        let dir = tempfile::TempDir::new().unwrap();
        let set = SuppressionSet::load(&dir.path().join(".security-scan-ignore")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".security-scan-ignore");
        std::fs::write(&path, "rule: DC001\n  badly: [indented\n").unwrap();
        let err = SuppressionSet::load(&path).unwrap_err();
        assert!(matches!(err, ScanError::SuppressionLoad { .. }));
    }

    #[test]
    fn test_load_yaml_entries() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".security-scan-ignore");
        std::fs::write(
            &path,
            "- rule: DC001\n  file: docker-compose.yml\n  reason: dev-only stack\n- rule: KS008\n",
        )
        .unwrap();
        let set = SuppressionSet::load(&path).unwrap();
        assert!(set.matches("DC001", "docker-compose.yml"));
        assert!(set.matches("KS008", "anything.yaml"));
    }

    #[test]
    fn test_inline_same_line() {
        let doc = parse_document(
            "services:\n  app:\n    privileged: true # security-scan: ignore DC001\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());
        assert!(findings.iter().any(|f| f.rule_id == "DC001"));

        let (surviving, suppressed) = filter(findings, &doc, &SuppressionSet::default());
        assert!(!surviving.iter().any(|f| f.rule_id == "DC001"));
        assert_eq!(suppressed, 1);
    }

    #[test]
    fn test_inline_preceding_line() {
        let doc = parse_document(
            "services:\n  app:\n    # security-scan: ignore DC001\n    privileged: true\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());
        let (surviving, suppressed) = filter(findings, &doc, &SuppressionSet::default());
        assert!(!surviving.iter().any(|f| f.rule_id == "DC001"));
        assert_eq!(suppressed, 1);
    }

    #[test]
    fn test_inline_trailing_line() {
        let doc = parse_document(
            "services:\n  app:\n    privileged: true\n    # security-scan: ignore DC001\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());
        let (surviving, _) = filter(findings, &doc, &SuppressionSet::default());
        assert!(!surviving.iter().any(|f| f.rule_id == "DC001"));
    }

    #[test]
    fn test_inline_wrong_rule_id_keeps_finding() {
        let doc = parse_document(
            "services:\n  app:\n    privileged: true # security-scan: ignore DC002\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());
        let (surviving, _) = filter(findings, &doc, &SuppressionSet::default());
        assert!(surviving.iter().any(|f| f.rule_id == "DC001"));
    }

    #[test]
    fn test_inline_distance_two_does_not_suppress() {
        let doc = parse_document(
            "services:\n  # security-scan: ignore DC001\n  app:\n    privileged: true\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());
        let (surviving, _) = filter(findings, &doc, &SuppressionSet::default());
        assert!(surviving.iter().any(|f| f.rule_id == "DC001"));
    }

    #[test]
    fn test_inline_wildcard_and_list() {
        let doc = parse_document(
            "services:\n  app:\n    privileged: true # security-scan: ignore *\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());
        let (surviving, _) = filter(findings, &doc, &SuppressionSet::default());
        assert!(!surviving.iter().any(|f| f.rule_id == "DC001"));

        assert_eq!(
            inline_rules("# security-scan: ignore DC001,DC002"),
            Some(vec!["DC001".to_string(), "DC002".to_string()])
        );
    }

    #[test]
    fn test_suppression_round_trip() {
        // With the entry the finding disappears; without it, it is back.
        let doc = parse_document(
            "services:\n  app:\n    privileged: true\n",
            "docker-compose.yml",
            Dialect::Compose,
        );
        let findings = evaluate(&doc, all_rules());

        let set = SuppressionSet::from_entries(vec![entry("DC001", Some("docker-compose.yml"))])
            .unwrap();
        let (surviving, suppressed) = filter(findings.clone(), &doc, &set);
        assert!(!surviving.iter().any(|f| f.rule_id == "DC001"));
        assert_eq!(suppressed, 1);

        let (surviving, suppressed) = filter(findings, &doc, &SuppressionSet::default());
        assert!(surviving.iter().any(|f| f.rule_id == "DC001"));
        assert_eq!(suppressed, 0);
    }
}
