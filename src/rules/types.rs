use crate::document::Dialect;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Key-path pattern used for rule scoping and required-key checks.
///
/// Dot-separated segments; `*` matches exactly one segment, `**` matches
/// any number of segments (including none). List indices are plain numeric
/// segments and can be matched with `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Deep,
}

impl PathPattern {
    pub fn new(spec: &str) -> Self {
        let segments = spec
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => Segment::Any,
                "**" => Segment::Deep,
                other => Segment::Literal(other.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Match the whole of `path`.
    pub fn matches(&self, path: &[String]) -> bool {
        Self::match_from(&self.segments, path)
    }

    /// Match some prefix of `path`. Used for scoping: a node is in scope
    /// when the pattern covers any ancestor (or the node itself).
    pub fn matches_prefix(&self, path: &[String]) -> bool {
        (0..=path.len()).any(|i| self.matches(&path[..i]))
    }

    fn match_from(segments: &[Segment], path: &[String]) -> bool {
        match segments.split_first() {
            None => path.is_empty(),
            Some((Segment::Deep, rest)) => {
                (0..=path.len()).any(|i| Self::match_from(rest, &path[i..]))
            }
            Some((segment, rest)) => match path.split_first() {
                Some((head, tail)) => {
                    let hit = match segment {
                        Segment::Literal(lit) => lit == head,
                        Segment::Any => true,
                        Segment::Deep => unreachable!("handled above"),
                    };
                    hit && Self::match_from(rest, tail)
                }
                None => false,
            },
        }
    }
}

/// The three detection shapes a rule can take.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// A regex that, when present on a node's raw text, is a finding.
    /// `exclude` matching the same line cancels it; `scope` restricts
    /// matching to nodes under a key-path prefix.
    PatternPresent {
        pattern: Regex,
        exclude: Option<Regex>,
        scope: Option<PathPattern>,
    },
    /// For every block matching `context`, the `required` key path must
    /// exist somewhere inside that block. Absence is one finding anchored
    /// at the block's first line.
    RequiredKeyMissing {
        context: PathPattern,
        required: PathPattern,
    },
    /// For every Terraform resource block of `block_type`, some line inside
    /// the block must match `required_expr`.
    AttributeMissingInBlock {
        block_type: &'static str,
        required_expr: Regex,
    },
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub dialect: Dialect,
    pub severity: Severity,
    pub kind: RuleKind,
    pub message: &'static str,
    pub fix_hint: &'static str,
    /// External benchmark references (CIS sections, CWE ids).
    pub compliance: &'static [&'static str],
}

impl Rule {
    /// Whether this rule applies to a document of the given dialect.
    /// Generic rules (secret patterns) apply everywhere.
    pub fn applies_to(&self, dialect: Dialect) -> bool {
        self.dialect == dialect || self.dialect == Dialect::Generic
    }
}

/// One located rule violation. Immutable once created; suppression drops
/// findings, it never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "id")]
    pub rule_id: String,
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    #[serde(rename = "code")]
    pub matched_text: String,
    pub message: String,
    #[serde(rename = "fix")]
    pub fix_hint: String,
}

impl Finding {
    pub fn new(rule: &Rule, file: &str, line: usize, matched_text: String) -> Self {
        Self {
            rule_id: rule.id.to_string(),
            severity: rule.severity,
            file: file.to_string(),
            line,
            matched_text,
            message: rule.message.to_string(),
            fix_hint: rule.fix_hint.to_string(),
        }
    }

    /// Deterministic report ordering: severity descending, then file,
    /// line, and rule id.
    pub fn sort_key(&self) -> (std::cmp::Reverse<Severity>, String, usize, String) {
        (
            std::cmp::Reverse(self.severity),
            self.file.clone(),
            self.line,
            self.rule_id.clone(),
        )
    }
}
