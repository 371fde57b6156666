use tracing::debug;

use super::Stage;
use crate::error::GraderResult;
use crate::llm::{build_justifier_message, strip_label, JUSTIFICATION_LABEL};
use crate::models::{grade_or_unavailable, Grade};

/// Execute the justify stage.
///
/// Returns the justification with a leading "Grade Justification:" label and
/// surrounding whitespace removed. Its length is not checked.
pub async fn execute_justify(
    justifier: &Stage<'_>,
    cleaned_text: &str,
    grade: Option<Grade>,
) -> GraderResult<String> {
    if grade.is_some_and(|g| g.is_low()) {
        debug!("Justifier: low grade, expecting a detailed critique");
    }

    let message = build_justifier_message(cleaned_text, &grade_or_unavailable(grade));
    let output = justifier.respond(&message).await?;
    Ok(strip_label(&output, JUSTIFICATION_LABEL).to_string())
}
