//! Dialect parsers: raw file content in, line-indexed [`Document`] out.
//!
//! Parsers are pure and tolerant of partial validity; they never fail a
//! whole file. Problems surface as soft diagnostics on the document.

pub mod terraform;
pub mod yaml;

use crate::document::{Dialect, Document};

/// Parse `content` under the given dialect.
pub fn parse_document(content: &str, path: &str, dialect: Dialect) -> Document {
    match dialect {
        Dialect::Terraform => terraform::parse(content, path),
        Dialect::Compose | Dialect::Kubernetes | Dialect::Generic => {
            yaml::parse(content, path, dialect)
        }
    }
}
