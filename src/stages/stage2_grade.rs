use tracing::{debug, info};

use super::Stage;
use crate::error::GraderResult;
use crate::llm::{build_grader_message, parse_grader_output, GraderFields};
use crate::models::{grade_or_unavailable, marks_or_unavailable};

/// Result of the grade stage
#[derive(Debug, Clone)]
pub struct GradeStageResult {
    /// Unmodified grader answer
    pub raw_output: String,
    /// Score and grade parsed from the answer
    pub fields: GraderFields,
}

/// Execute the grade stage: score the cleaned text against the rubric and
/// parse the answer.
///
/// Parsing never fails the stage; unparseable fields come back as `None`.
pub async fn execute_grade(grader: &Stage<'_>, cleaned_text: &str) -> GraderResult<GradeStageResult> {
    let raw_output = grader.respond(&build_grader_message(cleaned_text)).await?;
    debug!("Grader raw output: {:?}", raw_output);
    let fields = parse_grader_output(&raw_output);

    info!(
        "Grader: marks={}, grade={}",
        marks_or_unavailable(fields.marks),
        grade_or_unavailable(fields.grade)
    );

    Ok(GradeStageResult { raw_output, fields })
}
