/// Instructions for the reader role
pub const READER_INSTRUCTIONS: &str = r#"You are an assistant that extracts and cleans the text from a student's assignment.
Output only the relevant clean text for grading. Do not add any introductory or concluding remarks."#;

/// Instructions for the grader role, including the rubric and the two-line answer format
pub const GRADER_INSTRUCTIONS: &str = r#"You are a strict but fair grading assistant.
Use this rubric:
- Content relevance: 30%
- Accuracy: 30%
- Structure and clarity: 20%
- Grammar and presentation: 20%
Output ONLY the total score (0-100) and grade (A/B/C/D/F) in the format:
Score: <number>/100
Grade: <letter>"#;

/// Instructions for the feedback role
pub const FEEDBACK_INSTRUCTIONS: &str = r#"You generate constructive feedback on the student's assignment.
Mention: strengths, weaknesses, and improvement suggestions.
Output ONLY the feedback, starting with "Feedback:"."#;

/// Instructions for the justifier role.
///
/// The word limits here are guidance for the model; nothing checks them.
pub const JUSTIFIER_INSTRUCTIONS: &str = r#"You review grading decisions and provide additional justification for scores.
If the input grade is C or below, explain in detail why the answer was marked low,
provide what the correct answer should include, and offer specific improvement suggestions.
This detailed analysis should be a single paragraph between 100-150 words.

If the input grade is B or above, simply acknowledge the good work and suggest minor changes.
This acknowledgment should be under 50 words.

Output ONLY the justification, starting with "Grade Justification:"."#;

/// Label the feedback role is asked to start with
pub const FEEDBACK_LABEL: &str = "Feedback:";

/// Label the justifier role is asked to start with
pub const JUSTIFICATION_LABEL: &str = "Grade Justification:";

pub fn build_reader_message(assignment_text: &str) -> String {
    format!("Clean and extract text from: {}", assignment_text)
}

pub fn build_grader_message(cleaned_text: &str) -> String {
    format!(
        "Grade the following assignment based on the rubric:\n{}",
        cleaned_text
    )
}

/// `grade` is the display form of the parsed grade, or "N/A"
pub fn build_feedback_message(cleaned_text: &str, grade: &str) -> String {
    format!(
        "Generate constructive feedback for the following assignment, which received a grade of {}:\n{}",
        grade, cleaned_text
    )
}

/// `grade` is the display form of the parsed grade, or "N/A"
pub fn build_justifier_message(cleaned_text: &str, grade: &str) -> String {
    format!(
        "Provide justification for this grade: {} on the following assignment:\n{}",
        grade, cleaned_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grader_instructions_carry_rubric() {
        assert!(GRADER_INSTRUCTIONS.contains("Content relevance: 30%"));
        assert!(GRADER_INSTRUCTIONS.contains("Accuracy: 30%"));
        assert!(GRADER_INSTRUCTIONS.contains("Structure and clarity: 20%"));
        assert!(GRADER_INSTRUCTIONS.contains("Grammar and presentation: 20%"));
        assert!(GRADER_INSTRUCTIONS.contains("Score: <number>/100"));
    }

    #[test]
    fn test_messages_embed_inputs() {
        let reader = build_reader_message("raw essay");
        assert!(reader.ends_with("raw essay"));

        let grader = build_grader_message("clean essay");
        assert!(grader.ends_with("\nclean essay"));

        let feedback = build_feedback_message("clean essay", "N/A");
        assert!(feedback.contains("received a grade of N/A"));
        assert!(feedback.ends_with("clean essay"));

        let justifier = build_justifier_message("clean essay", "B+");
        assert!(justifier.contains("this grade: B+ on"));
    }
}
