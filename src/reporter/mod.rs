//! Report rendering. Rendering is a pure function of the report and the
//! requested format; every format shows the same findings because all
//! filtering happens before the report is built.

pub mod json;
pub mod markdown;
pub mod text;

use crate::cli::OutputFormat;
use crate::report::ScanReport;

pub trait Reporter {
    fn render(&self, report: &ScanReport) -> String;
}

pub fn render(report: &ScanReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => text::TextReporter::new().render(report),
        OutputFormat::Json => json::JsonReporter.render(report),
        OutputFormat::Markdown => markdown::MarkdownReporter.render(report),
    }
}
