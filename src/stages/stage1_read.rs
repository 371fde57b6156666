use tracing::warn;

use super::Stage;
use crate::error::GraderResult;
use crate::llm::build_reader_message;

/// Execute the read stage: ask the reader to clean the raw assignment text.
///
/// An empty or whitespace-only answer is passed downstream as-is; only a
/// failed model call is an error here.
pub async fn execute_read(reader: &Stage<'_>, assignment_text: &str) -> GraderResult<String> {
    let cleaned_text = reader.respond(&build_reader_message(assignment_text)).await?;

    if cleaned_text.trim().is_empty() {
        warn!("Reader returned empty text; continuing with degenerate input");
    }

    Ok(cleaned_text)
}
