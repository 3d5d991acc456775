//! Output formatter trait

use crate::cli::commands::OutputFormat;
use council_domain::CouncilResult;

/// Trait for formatting council results
pub trait OutputFormatter {
    /// Format the complete result
    fn format(&self, result: &CouncilResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &CouncilResult) -> String;

    /// Format the overall assessment only (concise output)
    fn format_summary(&self, result: &CouncilResult) -> String;

    fn render(&self, result: &CouncilResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(result),
            OutputFormat::Summary => self.format_summary(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
