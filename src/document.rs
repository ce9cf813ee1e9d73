//! Parsed document model shared by all dialect parsers.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file family a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Compose,
    Kubernetes,
    Terraform,
    Generic,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Compose => "compose",
            Dialect::Kubernetes => "kubernetes",
            Dialect::Terraform => "terraform",
            Dialect::Generic => "generic",
        }
    }

    /// Detect the dialect for a file from its name and content.
    ///
    /// Returns `None` for files the scanner has no business reading
    /// (unknown extensions, binaries, and so on).
    pub fn detect(path: &Path, content: &str) -> Option<Dialect> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            match ext.to_lowercase().as_str() {
                "tf" | "tfvars" => return Some(Dialect::Terraform),
                "yml" | "yaml" => {
                    if file_name.starts_with("docker-compose") || file_name.starts_with("compose") {
                        return Some(Dialect::Compose);
                    }
                    if is_kubernetes_manifest(content) {
                        return Some(Dialect::Kubernetes);
                    }
                    return Some(Dialect::Generic);
                }
                _ => {}
            }
        }

        None
    }

    /// File extensions the scanner considers candidates.
    pub fn candidate_extensions() -> &'static [&'static str] {
        &["yml", "yaml", "tf", "tfvars"]
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kubernetes manifests are YAML with both `apiVersion` and `kind` at the
/// top level. Structured parse first; fall back to a line probe so a file
/// with one malformed document is still recognized.
fn is_kubernetes_manifest(content: &str) -> bool {
    for doc in content.split("\n---") {
        if let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(doc) {
            if value.get("apiVersion").is_some() && value.get("kind").is_some() {
                return true;
            }
        }
    }

    let mut has_api = false;
    let mut has_kind = false;
    for line in content.lines() {
        if line.starts_with("apiVersion:") {
            has_api = true;
        } else if line.starts_with("kind:") {
            has_kind = true;
        }
        if has_api && has_kind {
            return true;
        }
    }
    false
}

/// One addressable line of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// 1-based line number in the source file.
    pub line: usize,
    /// Keys and list indices from the document root down to this node.
    pub key_path: Vec<String>,
    /// Raw source text of the line, trailing whitespace stripped.
    pub raw: String,
    /// Set when the parser could not make structural sense of the line.
    /// The raw text is preserved so pattern rules still see it.
    pub unparsed: bool,
    /// YAML document index within the file (`---` separated). Key paths
    /// restart per document, so block-local checks must not cross this.
    pub doc: usize,
}

impl Node {
    pub fn new(line: usize, key_path: Vec<String>, raw: &str) -> Self {
        Self {
            line,
            key_path,
            raw: raw.trim_end().to_string(),
            unparsed: false,
            doc: 0,
        }
    }

    pub fn unparsed(line: usize, key_path: Vec<String>, raw: &str) -> Self {
        Self {
            unparsed: true,
            ..Self::new(line, key_path, raw)
        }
    }

    pub fn in_doc(mut self, doc: usize) -> Self {
        self.doc = doc;
        self
    }
}

/// A soft problem encountered while reading or parsing a file.
/// Diagnostics are informational: they appear in the report but are not
/// findings and never affect the severity-derived exit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// A parsed configuration file. Built once per scan, immutable afterwards.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    pub dialect: Dialect,
    /// Every source line, for adjacency checks (inline suppressions).
    pub lines: Vec<String>,
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    /// Source line by 1-based number, if it exists.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Nodes strictly inside the subtree rooted at `prefix`.
    pub fn subtree<'a>(&'a self, prefix: &'a [String]) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.key_path.len() > prefix.len() && n.key_path.starts_with(prefix))
    }
}
