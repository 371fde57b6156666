use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{grade_or_unavailable, GradingOutcome, UNAVAILABLE};

/// Machine-readable record of one grading run
#[derive(Debug, Clone, Serialize)]
pub struct GradingReport {
    /// The grading record, or `{"error": ...}`
    pub result: GradingOutcome,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub run_id: String,
    pub source_file: String,
    pub document_kind: String,
    pub extracted_chars: usize,
    pub provider: String,
    pub model: String,
    /// RFC 3339 timestamp
    pub graded_at: String,
}

impl GradingReport {
    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Options for the extracted-text preview
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Characters shown before the preview is cut off
    pub max_chars: usize,
    /// Wrap width for preview lines
    pub width: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_chars: 3000,
            width: 80,
        }
    }
}

/// Format extracted text for display, wrapped and cut to `max_chars`
pub fn format_preview(text: &str, config: &PreviewConfig) -> String {
    let total = text.chars().count();
    let shown: String = text.chars().take(config.max_chars).collect();

    let mut output = shown
        .lines()
        .map(|line| wrap_text(line, config.width))
        .collect::<Vec<_>>()
        .join("\n");

    if total > config.max_chars {
        output.push_str(&format!(
            "\n... [{} more characters not shown]",
            total - config.max_chars
        ));
    }

    output
}

/// Render a grading outcome as a key-value view
pub fn format_outcome(outcome: &GradingOutcome, width: usize) -> String {
    match outcome {
        GradingOutcome::Failed { error } => format!("Error: {}\n", error),
        GradingOutcome::Graded(result) => {
            let mut output = String::new();
            let marks = match result.marks {
                Some(marks) => format!("{}/100", marks),
                None => UNAVAILABLE.to_string(),
            };
            output.push_str(&format!("Marks: {}\n", marks));
            output.push_str(&format!("Grade: {}\n", grade_or_unavailable(result.grade)));
            output.push_str(&format!("Rationale: {}\n", result.rationale));
            output.push('\n');
            push_section(&mut output, "Feedback", &result.feedback, width);
            push_section(&mut output, "Grade Justification", &result.grade_justification, width);
            output
        }
    }
}

fn push_section(output: &mut String, title: &str, body: &str, width: usize) {
    output.push_str(title);
    output.push_str(":\n");
    for paragraph in body.lines() {
        output.push_str(&wrap_text(paragraph, width));
        output.push('\n');
    }
    output.push('\n');
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
