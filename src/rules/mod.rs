//! Builtin rule registry.
//!
//! Rules are declarative data grouped by dialect; adding a dialect means
//! adding a catalog module, not new control flow. The registry is built
//! once and validated before any scan starts.

mod compose;
mod kubernetes;
mod secrets;
mod terraform;
pub mod types;

pub use types::{Finding, PathPattern, Rule, RuleKind, Severity};

use crate::error::{Result, ScanError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ALL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = Vec::with_capacity(32);
    rules.extend(compose::rules());
    rules.extend(kubernetes::rules());
    rules.extend(terraform::rules());
    rules.extend(secrets::rules());
    rules
});

pub fn all_rules() -> &'static [Rule] {
    &ALL_RULES
}

static RULE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,3}\d{3}$").expect("rule id regex"));

/// Validate the registry before scanning. A broken rule set cannot
/// guarantee correct detection, so this fails the whole run rather than
/// silently skipping rules.
pub fn validate(rules: &[Rule]) -> Result<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !RULE_ID.is_match(rule.id) {
            return Err(ScanError::RuleConfig(format!(
                "malformed rule id: {}",
                rule.id
            )));
        }
        if !seen.insert(rule.id) {
            return Err(ScanError::RuleConfig(format!(
                "duplicate rule id: {}",
                rule.id
            )));
        }
        if let RuleKind::PatternPresent { pattern, .. } = &rule.kind {
            if pattern.as_str().is_empty() {
                return Err(ScanError::RuleConfig(format!(
                    "rule {} has an empty match expression",
                    rule.id
                )));
            }
        }
    }
    Ok(())
}

/// Look up a rule by id.
pub fn get_rule(id: &str) -> Option<&'static Rule> {
    all_rules().iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Dialect;

    #[test]
    fn test_registry_is_valid() {
        validate(all_rules()).unwrap();
    }

    #[test]
    fn test_registry_covers_every_dialect() {
        for dialect in [
            Dialect::Compose,
            Dialect::Kubernetes,
            Dialect::Terraform,
            Dialect::Generic,
        ] {
            assert!(
                all_rules().iter().any(|r| r.dialect == dialect),
                "no rules for {}",
                dialect
            );
        }
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut rules = all_rules().to_vec();
        rules.push(rules[0].clone());
        let err = validate(&rules).unwrap_err();
        assert!(err.to_string().contains("duplicate rule id"));
    }

    #[test]
    fn test_malformed_id_rejected() {
        let mut bad = all_rules()[0].clone();
        bad.id = "not-a-rule-id";
        let err = validate(&[bad]).unwrap_err();
        assert!(err.to_string().contains("malformed rule id"));
    }

    #[test]
    fn test_get_rule() {
        assert!(get_rule("DC001").is_some());
        assert!(get_rule("ZZ999").is_none());
    }
}
