use serde::{Deserialize, Serialize};

use super::grade::{grade_or_unavailable, Grade};

/// Aggregated output of a successful grading run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Total score out of 100 (`None` when the grader's score could not be parsed)
    pub marks: Option<u8>,
    /// Letter grade (`None` when the grader's grade could not be parsed)
    pub grade: Option<Grade>,
    pub rationale: String,
    pub feedback: String,
    pub grade_justification: String,
}

impl GradingResult {
    /// Fixed-template rationale referencing the grade
    pub fn rationale_for(grade: Option<Grade>) -> String {
        format!(
            "Overall assessment: {}. See detailed feedback and justification below.",
            grade_or_unavailable(grade)
        )
    }
}

/// Outcome of one pipeline run: the full record, or only an error message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradingOutcome {
    Graded(GradingResult),
    Failed { error: String },
}

impl GradingOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn is_graded(&self) -> bool {
        matches!(self, Self::Graded(_))
    }

    pub fn result(&self) -> Option<&GradingResult> {
        match self {
            Self::Graded(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Graded(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}
