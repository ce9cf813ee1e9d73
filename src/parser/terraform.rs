//! Brace-tracking scanner for Terraform (HCL) files.
//!
//! Recognizes labeled blocks (`resource "aws_ebs_volume" "data" { ... }`),
//! nested blocks (`ingress { ... }`), and `key = value` attributes, giving
//! every line a key path. Unbalanced braces and stray syntax degrade to
//! diagnostics; the raw text of every line is preserved for pattern rules.

use crate::document::{Diagnostic, Dialect, Document, Node};
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z_][\w-]*)((?:\s+"[^"]*")*)\s*\{$"#).expect("block-open regex")
});

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][\w-]*)\s*=\s*(.*)$").expect("attribute regex"));

static HEREDOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<-?([A-Za-z_][A-Za-z0-9_]*)\s*$").expect("heredoc regex"));

/// What a multi-line construct is currently swallowing.
enum Pending {
    None,
    /// Heredoc body until the terminator line.
    Heredoc { terminator: String, path: Vec<String> },
    /// Multi-line list/object value; tracks unclosed bracket depth.
    Value { depth: i32, path: Vec<String> },
    /// Inside a `/* ... */` comment.
    Comment,
}

fn bracket_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut in_string = false;
    let mut prev = '\0';
    for c in line.chars() {
        match c {
            '"' if prev != '\\' => in_string = !in_string,
            '[' | '{' | '(' if !in_string => delta += 1,
            ']' | '}' | ')' if !in_string => delta -= 1,
            _ => {}
        }
        prev = c;
    }
    delta
}

pub fn parse(content: &str, path: &str) -> Document {
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    let mut nodes: Vec<Node> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    // Each frame is the group of segments one block contributed.
    let mut frames: Vec<Vec<String>> = Vec::new();
    let mut pending = Pending::None;

    let current_path = |frames: &[Vec<String>]| -> Vec<String> {
        frames.iter().flatten().cloned().collect()
    };

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        match std::mem::replace(&mut pending, Pending::None) {
            Pending::Heredoc { terminator, path: hpath } => {
                if trimmed != terminator {
                    nodes.push(Node::new(line_no, hpath.clone(), line));
                    pending = Pending::Heredoc {
                        terminator,
                        path: hpath,
                    };
                }
                continue;
            }
            Pending::Value {
                mut depth,
                path: vpath,
            } => {
                nodes.push(Node::new(line_no, vpath.clone(), line));
                depth += bracket_delta(trimmed);
                if depth > 0 {
                    pending = Pending::Value { depth, path: vpath };
                }
                continue;
            }
            Pending::Comment => {
                if !trimmed.contains("*/") {
                    pending = Pending::Comment;
                }
                continue;
            }
            Pending::None => {}
        }

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with("/*") {
            if !trimmed.contains("*/") {
                pending = Pending::Comment;
            }
            continue;
        }

        if trimmed == "}" {
            if frames.pop().is_none() {
                diagnostics.push(Diagnostic::new(
                    path,
                    Some(line_no),
                    "unmatched closing brace",
                ));
            }
            continue;
        }

        // Block opening: `resource "type" "name" {`, `ingress {`, ...
        if let Some(caps) = BLOCK_OPEN.captures(trimmed) {
            let mut segments = vec![caps[1].to_string()];
            for label in caps[2].split('"').filter(|s| !s.trim().is_empty()) {
                segments.push(label.to_string());
            }
            frames.push(segments);
            nodes.push(Node::new(line_no, current_path(&frames), line));
            continue;
        }

        // Attribute: `key = value`
        if let Some(caps) = ATTRIBUTE.captures(trimmed) {
            let mut key_path = current_path(&frames);
            key_path.push(caps[1].to_string());
            nodes.push(Node::new(line_no, key_path.clone(), line));

            let value = caps[2].trim();
            if let Some(heredoc) = HEREDOC.captures(value) {
                pending = Pending::Heredoc {
                    terminator: heredoc[1].to_string(),
                    path: key_path,
                };
            } else if value == "{" {
                // Object value opens a scope like a nested block.
                frames.push(vec![caps[1].to_string()]);
            } else {
                let depth = bracket_delta(value);
                if depth > 0 {
                    pending = Pending::Value {
                        depth,
                        path: key_path,
                    };
                }
            }
            continue;
        }

        nodes.push(Node::unparsed(line_no, current_path(&frames), line));
        diagnostics.push(Diagnostic::new(
            path,
            Some(line_no),
            "unrecognized terraform syntax",
        ));
    }

    for frame in frames.iter().rev() {
        diagnostics.push(Diagnostic::new(
            path,
            None,
            format!("unclosed block: {}", frame.join(".")),
        ));
    }

    Document {
        path: path.to_string(),
        dialect: Dialect::Terraform,
        lines,
        nodes,
        diagnostics,
    }
}
