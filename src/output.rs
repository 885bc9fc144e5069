//! Simple Output and Reporting
//!
//! This module provides output formatting for batch application results.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::validator::{ApplyResults, RecordResult, RecordStatus};

/// Output formatter for human-readable, JSON and summary results
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Formatter that never emits color codes
    pub fn plain(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_results(&self, results: &ApplyResults) -> String {
        match self.format {
            OutputFormat::Json => self.format_json(results),
            OutputFormat::Summary => self.format_summary(results),
            OutputFormat::Human => self.format_human(results),
        }
    }

    fn format_human(&self, results: &ApplyResults) -> String {
        let mut output = String::new();

        match self.verbosity {
            VerbosityLevel::Quiet => {
                for record in results.record_results.iter().filter(|r| !r.status.is_passed()) {
                    output.push_str(&self.format_record_result(record));
                    output.push('\n');
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose | VerbosityLevel::Debug => {
                for record in &results.record_results {
                    let shown = self.verbosity >= VerbosityLevel::Verbose || !record.status.is_passed();
                    if shown {
                        output.push_str(&self.format_record_result(record));
                        output.push('\n');
                    }
                }
                output.push_str(&self.format_summary(results));
            }
        }

        output
    }

    /// Every record's cleaned output (or failure) in one JSON document
    fn format_json(&self, results: &ApplyResults) -> String {
        let value = if self.verbosity == VerbosityLevel::Quiet {
            serde_json::json!({
                "failed_records": results.failed_records,
                "error_records": results.error_records,
                "failures": results
                    .record_results
                    .iter()
                    .filter(|r| !r.status.is_passed())
                    .collect::<Vec<_>>(),
            })
        } else {
            serde_json::to_value(results).unwrap_or_default()
        };
        serde_json::to_string_pretty(&value).unwrap_or_default() + "\n"
    }

    pub fn format_record_result(&self, result: &RecordResult) -> String {
        let duration_str = format_duration(result.duration);

        match &result.status {
            RecordStatus::Passed { score } => {
                let mut output = format!(
                    "{}  {} ({}) - quality {:.3}",
                    self.colorize("✓ PASSED", "32"),
                    result.source,
                    duration_str,
                    score
                );
                if self.verbosity == VerbosityLevel::Debug
                    && let Some(cleaned) = &result.output
                {
                    output.push_str(&format!("\n    {}", cleaned));
                }
                output
            }
            RecordStatus::Failed { failure_count } => {
                let mut output = format!(
                    "{}  {} ({}) - {} failure{}",
                    self.colorize("✗ FAILED", "31"),
                    result.source,
                    duration_str,
                    failure_count,
                    if *failure_count == 1 { "" } else { "s" }
                );

                if self.verbosity >= VerbosityLevel::Normal {
                    for error_detail in &result.error_details {
                        output.push_str(&format!("\n    {}", error_detail));
                    }
                }
                output
            }
            RecordStatus::Error { message } => {
                format!(
                    "{}  {} - {}",
                    self.colorize("⚠ ERROR", "33"),
                    result.source,
                    message
                )
            }
        }
    }

    fn format_summary(&self, results: &ApplyResults) -> String {
        let mut output = String::new();
        output.push_str("Summary:\n");
        output.push_str(&format!("  Total records: {}\n", results.total_records));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Passed:", "32"),
            results.passed_records
        ));

        if results.failed_records > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "31"),
                results.failed_records
            ));
        }
        if results.error_records > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_records
            ));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
        if let (Some(average), Some(minimum)) = (results.average_score, results.min_score) {
            output.push_str(&format!(
                "  Quality: average {:.3}, minimum {:.3}\n",
                average, minimum
            ));
        }
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(results.wall_time)
        ));

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!(
                "  Average per record: {}\n",
                format_duration(results.average_duration)
            ));
        }

        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
