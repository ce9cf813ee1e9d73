use crate::rules::Severity;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(
    name = "confscan",
    version,
    about = "Static security scanner for Docker Compose, Kubernetes, and Terraform configuration",
    long_about = "confscan scans configuration trees for insecure settings and committed \
secrets, reporting findings by severity with CI-friendly exit codes."
)]
pub struct Cli {
    /// Paths to scan (files or directories, recursive)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Drop findings below this severity
    #[arg(long, value_enum, default_value_t = Severity::Low)]
    pub min_severity: Severity,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppression file with rule/file ignore entries
    #[arg(long, default_value = ".security-scan-ignore")]
    pub ignore_file: PathBuf,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = 2 * 1024 * 1024)]
    pub max_file_size: u64,

    /// Print the rule catalog and exit
    #[arg(long)]
    pub list_rules: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
