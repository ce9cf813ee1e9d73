use crate::report::ScanReport;
use crate::reporter::Reporter;

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, report: &ScanReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!(r#"{{"error": "failed to serialize report: {}"}}"#, e))
    }
}
