//! Rule evaluation against parsed documents.
//!
//! Evaluation is pure: the same document and rule set always produce the
//! same finding set, independent of rule iteration order. Context checks
//! are block-local; a sibling block's key never satisfies another block's
//! requirement.

use crate::document::Document;
use crate::rules::{Finding, PathPattern, Rule, RuleKind};
use std::collections::BTreeMap;
use tracing::trace;

/// Evaluate every applicable rule against one document.
pub fn evaluate(doc: &Document, rules: &[Rule]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for rule in rules.iter().filter(|r| r.applies_to(doc.dialect)) {
        match &rule.kind {
            RuleKind::PatternPresent {
                pattern,
                exclude,
                scope,
            } => {
                for node in &doc.nodes {
                    if let Some(scope) = scope {
                        if !scope.matches_prefix(&node.key_path) {
                            continue;
                        }
                    }
                    let Some(m) = pattern.find(&node.raw) else {
                        continue;
                    };
                    if exclude.as_ref().is_some_and(|e| e.is_match(&node.raw)) {
                        continue;
                    }
                    findings.push(Finding::new(
                        rule,
                        &doc.path,
                        node.line,
                        m.as_str().to_string(),
                    ));
                }
            }
            RuleKind::RequiredKeyMissing { context, required } => {
                for ((doc_index, prefix), line) in context_instances(doc, context) {
                    let satisfied = doc.nodes.iter().any(|n| {
                        n.doc == doc_index
                            && n.key_path.len() > prefix.len()
                            && n.key_path.starts_with(&prefix)
                            && required.matches_prefix(&n.key_path[prefix.len()..])
                    });
                    if !satisfied {
                        let anchor = doc.line(line).unwrap_or_default().trim().to_string();
                        findings.push(Finding::new(rule, &doc.path, line, anchor));
                    }
                }
            }
            RuleKind::AttributeMissingInBlock {
                block_type,
                required_expr,
            } => {
                for node in &doc.nodes {
                    let is_block = node.key_path.len() == 3
                        && node.key_path[0] == "resource"
                        && node.key_path[1] == *block_type;
                    if !is_block {
                        continue;
                    }
                    let satisfied = doc.subtree(&node.key_path).any(|n| {
                        required_expr.is_match(&n.raw)
                    });
                    if !satisfied {
                        findings.push(Finding::new(
                            rule,
                            &doc.path,
                            node.line,
                            node.raw.trim().to_string(),
                        ));
                    }
                }
            }
        }
    }

    trace!(
        file = %doc.path,
        nodes = doc.nodes.len(),
        findings = findings.len(),
        "Evaluated rules against document"
    );

    findings
}

/// Concrete blocks matching a context pattern, keyed by YAML sub-document
/// and key path, anchored at the first line the block appears on.
///
/// A block is identified by the shortest prefix of any node's key path
/// that the pattern matches; list items (which have no node of their own)
/// are anchored at their first child line. "No matching context" simply
/// yields no instances, and therefore no findings.
fn context_instances(
    doc: &Document,
    context: &PathPattern,
) -> BTreeMap<(usize, Vec<String>), usize> {
    let mut instances: BTreeMap<(usize, Vec<String>), usize> = BTreeMap::new();
    for node in &doc.nodes {
        for len in 1..=node.key_path.len() {
            if context.matches(&node.key_path[..len]) {
                let key = (node.doc, node.key_path[..len].to_vec());
                let line = instances.entry(key).or_insert(node.line);
                *line = (*line).min(node.line);
                break;
            }
        }
    }
    instances
}
