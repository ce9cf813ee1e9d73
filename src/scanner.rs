//! Scan orchestration: path expansion, per-file pipeline, parallel merge.
//!
//! Scanning is embarrassingly parallel across files. Each worker runs the
//! parse → match → suppress pipeline against the shared, read-only rule
//! registry and suppression set; a single merge step then builds the
//! report, whose deterministic sort hides completion order.

use crate::document::{Diagnostic, Dialect};
use crate::error::{Result, ScanError};
use crate::matcher;
use crate::parser;
use crate::report::ScanReport;
use crate::rules::{self, Finding, Rule, Severity};
use crate::suppression::{self, SuppressionSet};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directory names never descended into.
const PRUNED_DIRS: &[&str] = &[".git", "node_modules", "vendor", "target", ".terraform"];

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub min_severity: Severity,
    pub ignore_file: PathBuf,
    pub max_file_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            min_severity: Severity::Low,
            ignore_file: PathBuf::from(".security-scan-ignore"),
            max_file_size: 2 * 1024 * 1024,
        }
    }
}

/// Result of one file's pipeline run.
struct FileOutcome {
    findings: Vec<Finding>,
    suppressed: usize,
    diagnostics: Vec<Diagnostic>,
    scanned: bool,
}

impl FileOutcome {
    fn diagnostic_only(diagnostic: Diagnostic) -> Self {
        Self {
            findings: Vec::new(),
            suppressed: 0,
            diagnostics: vec![diagnostic],
            scanned: false,
        }
    }
}

/// Holds the immutable per-scan state: validated rule registry, loaded
/// suppression set, and options. Construction fails fast on a broken
/// registry or ignore file; per-file problems never fail a scan.
pub struct Orchestrator {
    rules: &'static [Rule],
    suppressions: SuppressionSet,
    options: ScanOptions,
}

impl Orchestrator {
    pub fn new(options: ScanOptions) -> Result<Self> {
        let rules = rules::all_rules();
        rules::validate(rules)?;
        let suppressions = SuppressionSet::load(&options.ignore_file)?;
        Ok(Self {
            rules,
            suppressions,
            options,
        })
    }

    /// With an explicit suppression set (for testing and embedding).
    pub fn with_suppressions(options: ScanOptions, suppressions: SuppressionSet) -> Result<Self> {
        let rules = rules::all_rules();
        rules::validate(rules)?;
        Ok(Self {
            rules,
            suppressions,
            options,
        })
    }

    pub fn scan(&self, paths: &[PathBuf]) -> ScanReport {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut candidates = self.collect_candidates(paths, &mut diagnostics);
        candidates.sort();
        candidates.dedup();

        info!(files = candidates.len(), "Starting scan");

        let outcomes: Vec<FileOutcome> = candidates
            .par_iter()
            .map(|path| self.scan_file(path))
            .collect();

        let mut findings = Vec::new();
        let mut suppressed = 0;
        let mut files_scanned = 0;
        for outcome in outcomes {
            findings.extend(outcome.findings);
            suppressed += outcome.suppressed;
            diagnostics.extend(outcome.diagnostics);
            if outcome.scanned {
                files_scanned += 1;
            }
        }

        findings.retain(|f| f.severity >= self.options.min_severity);

        ScanReport::build(files_scanned, findings, suppressed, diagnostics)
    }

    fn collect_candidates(
        &self,
        paths: &[PathBuf],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        for path in paths {
            if path.is_file() {
                candidates.push(path.clone());
            } else if path.is_dir() {
                let walker = WalkDir::new(path).into_iter().filter_entry(|entry| {
                    if !entry.file_type().is_dir() {
                        return true;
                    }
                    let name = entry.file_name().to_string_lossy();
                    let hidden = entry.depth() > 0 && name.starts_with('.');
                    !(hidden || PRUNED_DIRS.contains(&name.as_ref()))
                });
                for entry in walker.filter_map(|e| e.ok()) {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let has_candidate_ext = entry
                        .path()
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| {
                            Dialect::candidate_extensions().contains(&ext.to_lowercase().as_str())
                        });
                    if has_candidate_ext {
                        candidates.push(entry.path().to_path_buf());
                    }
                }
            } else {
                diagnostics.push(Diagnostic::new(
                    display_path(path),
                    None,
                    "path does not exist",
                ));
            }
        }

        candidates.retain(|path| {
            let excluded = self.suppressions.excludes_file(&display_path(path));
            if excluded {
                debug!(path = %path.display(), "Excluded by ignore entry");
            }
            !excluded
        });
        candidates
    }

    /// Parse → match → suppress for one file. Unreadable or oversized
    /// files degrade to a diagnostic-only outcome; the scan continues.
    fn scan_file(&self, path: &Path) -> FileOutcome {
        let rel_path = display_path(path);

        match fs::metadata(path) {
            Ok(meta) if meta.len() > self.options.max_file_size => {
                warn!(path = %rel_path, size = meta.len(), "File exceeds size guard, skipping");
                return FileOutcome::diagnostic_only(Diagnostic::new(
                    &rel_path,
                    None,
                    format!(
                        "file exceeds size guard ({} > {} bytes)",
                        meta.len(),
                        self.options.max_file_size
                    ),
                ));
            }
            Ok(_) => {}
            Err(e) => {
                return FileOutcome::diagnostic_only(Diagnostic::new(
                    &rel_path,
                    None,
                    ScanError::Io {
                        path: rel_path.clone(),
                        source: e,
                    }
                    .to_string(),
                ));
            }
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %rel_path, error = %e, "Unreadable file");
                return FileOutcome::diagnostic_only(Diagnostic::new(
                    &rel_path,
                    None,
                    format!("unreadable: {}", e),
                ));
            }
        };

        let Some(dialect) = Dialect::detect(path, &content) else {
            return FileOutcome::diagnostic_only(Diagnostic::new(
                &rel_path,
                None,
                "unrecognized file type",
            ));
        };

        debug!(path = %rel_path, dialect = %dialect, "Scanning file");
        let doc = parser::parse_document(&content, &rel_path, dialect);
        let findings = matcher::evaluate(&doc, self.rules);
        let (findings, suppressed) = suppression::filter(findings, &doc, &self.suppressions);

        FileOutcome {
            findings,
            suppressed,
            diagnostics: doc.diagnostics,
            scanned: true,
        }
    }
}

fn display_path(path: &Path) -> String {
    let display = path.display().to_string();
    display.strip_prefix("./").unwrap_or(&display).to_string()
}
