use super::Stage;
use crate::error::GraderResult;
use crate::llm::{build_feedback_message, strip_label, FEEDBACK_LABEL};
use crate::models::{grade_or_unavailable, Grade};

/// Execute the feedback stage.
///
/// Returns the feedback with a leading "Feedback:" label and surrounding
/// whitespace removed.
pub async fn execute_feedback(
    feedback_generator: &Stage<'_>,
    cleaned_text: &str,
    grade: Option<Grade>,
) -> GraderResult<String> {
    let message = build_feedback_message(cleaned_text, &grade_or_unavailable(grade));
    let output = feedback_generator.respond(&message).await?;
    Ok(strip_label(&output, FEEDBACK_LABEL).to_string())
}
