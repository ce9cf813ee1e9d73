pub mod cli;
pub mod document;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod report;
pub mod reporter;
pub mod rules;
pub mod scanner;
pub mod suppression;

pub use cli::{Cli, OutputFormat};
pub use document::{Dialect, Diagnostic, Document, Node};
pub use error::{Result, ScanError};
pub use report::{ScanReport, SeverityCounts, EXIT_FATAL};
pub use reporter::Reporter;
pub use rules::{all_rules, Finding, Rule, RuleKind, Severity};
pub use scanner::{Orchestrator, ScanOptions};
pub use suppression::{SuppressionEntry, SuppressionSet};
