//! Line-indexed YAML scanner for the Compose, Kubernetes, and generic
//! dialects.
//!
//! This is not a full YAML parser. The scanner walks the file line by line,
//! tracking indentation to assign each content line a key path from the
//! document root. Anything it cannot make sense of degrades to an unparsed
//! node with the raw text preserved, so pattern rules still see every line
//! and one malformed region never aborts the rest of the file.

use crate::document::{Diagnostic, Dialect, Document, Node};

#[derive(Debug)]
enum Frame {
    Key { indent: usize, name: String },
    Seq { indent: usize, index: usize },
}

impl Frame {
    fn indent(&self) -> usize {
        match self {
            Frame::Key { indent, .. } | Frame::Seq { indent, .. } => *indent,
        }
    }
}

fn current_path(frames: &[Frame]) -> Vec<String> {
    frames
        .iter()
        .map(|f| match f {
            Frame::Key { name, .. } => name.clone(),
            Frame::Seq { index, .. } => index.to_string(),
        })
        .collect()
}

/// Split `key: value` / `key:` into key and value. Returns `None` for
/// lines that are not mapping entries. Trailing comments are stripped
/// from the value so `services: # note` still opens a block.
fn split_key(content: &str) -> Option<(&str, &str)> {
    let (key, value) = match content.find(": ") {
        Some(i) => (&content[..i], content[i + 2..].trim()),
        None => {
            if let Some(stripped) = content.strip_suffix(':') {
                (stripped, "")
            } else {
                return None;
            }
        }
    };

    let key = key.trim().trim_matches('"').trim_matches('\'');
    if key.is_empty() || key.starts_with('-') || key.contains(':') {
        return None;
    }

    let value = if value.starts_with('#') {
        ""
    } else if let Some(i) = value.find(" #") {
        value[..i].trim_end()
    } else {
        value
    };
    Some((key, value))
}

fn is_block_scalar(value: &str) -> bool {
    matches!(value, "|" | ">" | "|-" | ">-" | "|+" | ">+")
}

pub fn parse(content: &str, path: &str, dialect: Dialect) -> Document {
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    let mut nodes: Vec<Node> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    // Index of the current `---`-separated document within the file.
    let mut doc_index = 0usize;
    // (indent of the owning key, key path) while inside a literal block
    let mut block_scalar: Option<(usize, Vec<String>)> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if let Some((scalar_indent, scalar_path)) = block_scalar.take() {
            if trimmed.is_empty() {
                block_scalar = Some((scalar_indent, scalar_path));
                continue;
            }
            let indent = line.len() - line.trim_start().len();
            if indent > scalar_indent {
                nodes.push(Node::new(line_no, scalar_path.clone(), line).in_doc(doc_index));
                block_scalar = Some((scalar_indent, scalar_path));
                continue;
            }
            // Scalar block ended; this line is processed normally.
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "---" || trimmed == "..." {
            frames.clear();
            doc_index += 1;
            continue;
        }

        let ws_len = line.len() - line.trim_start().len();
        if line[..ws_len].contains('\t') {
            nodes.push(Node::unparsed(line_no, current_path(&frames), line).in_doc(doc_index));
            diagnostics.push(Diagnostic::new(
                path,
                Some(line_no),
                "tab character in indentation",
            ));
            continue;
        }
        let indent = ws_len;
        let content_part = line[ws_len..].trim_end();

        // Sequence item
        if let Some(item) = content_part
            .strip_prefix("- ")
            .or_else(|| (content_part == "-").then_some(""))
        {
            while frames.last().is_some_and(|f| f.indent() > indent) {
                frames.pop();
            }
            // A key at the same indent is the sequence's parent; a sequence
            // at the same indent is this item's own list.
            let same_seq = matches!(frames.last(), Some(Frame::Seq { indent: i, .. }) if *i == indent);
            if same_seq {
                if let Some(Frame::Seq { index, .. }) = frames.last_mut() {
                    *index += 1;
                }
            } else {
                frames.push(Frame::Seq { indent, index: 0 });
            }
            let item_path = current_path(&frames);

            if let Some((key, value)) = split_key(item) {
                let mut key_path = item_path;
                key_path.push(key.to_string());
                nodes.push(Node::new(line_no, key_path.clone(), line).in_doc(doc_index));
                // Keys inside a list item sit two columns past the dash.
                let virtual_indent = indent + 2;
                if is_block_scalar(value) {
                    block_scalar = Some((virtual_indent, key_path));
                } else if value.is_empty() {
                    frames.push(Frame::Key {
                        indent: virtual_indent,
                        name: key.to_string(),
                    });
                }
            } else {
                nodes.push(Node::new(line_no, item_path, line).in_doc(doc_index));
            }
            continue;
        }

        // Mapping entry
        if let Some((key, value)) = split_key(content_part) {
            while frames.last().is_some_and(|f| f.indent() >= indent) {
                frames.pop();
            }
            let mut key_path = current_path(&frames);
            key_path.push(key.to_string());
            nodes.push(Node::new(line_no, key_path.clone(), line).in_doc(doc_index));

            if is_block_scalar(value) {
                block_scalar = Some((indent, key_path));
            } else if value.is_empty() {
                frames.push(Frame::Key {
                    indent,
                    name: key.to_string(),
                });
            }
            continue;
        }

        // Neither item nor mapping entry: keep the raw text around for
        // pattern rules and record a soft diagnostic.
        nodes.push(Node::unparsed(line_no, current_path(&frames), line).in_doc(doc_index));
        diagnostics.push(Diagnostic::new(
            path,
            Some(line_no),
            format!("unrecognized {} syntax", dialect),
        ));
    }

    Document {
        path: path.to_string(),
        dialect,
        lines,
        nodes,
        diagnostics,
    }
}
