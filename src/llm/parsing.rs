//! Best-effort extraction of structured fields from free-text model output.
//!
//! Nothing here fails: a field that cannot be found degrades to `None` and
//! the caller substitutes the "N/A" placeholder.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::models::{Grade, GradeLetter};

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Score:\s*(\d+)").expect("valid score regex"));

static GRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Grade:\s*([A-F])(\+?)").expect("valid grade regex"));

/// Fields parsed from the grader's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraderFields {
    pub marks: Option<u8>,
    pub grade: Option<Grade>,
}

/// Parse both fields independently; their order in the output does not matter
pub fn parse_grader_output(output: &str) -> GraderFields {
    let fields = GraderFields {
        marks: parse_marks(output),
        grade: parse_grade(output),
    };

    if fields.marks.is_none() {
        warn!("Grader output has no usable \"Score:\" field");
    }
    if fields.grade.is_none() {
        warn!("Grader output has no usable \"Grade:\" field");
    }

    fields
}

/// First integer after "Score:". Values above 100 are treated as unparseable.
pub fn parse_marks(output: &str) -> Option<u8> {
    SCORE_RE
        .captures(output)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|&marks| marks <= 100)
        .and_then(|marks| u8::try_from(marks).ok())
}

/// First letter A-F (with optional "+") after "Grade:". "E" is not a grade.
pub fn parse_grade(output: &str) -> Option<Grade> {
    let caps = GRADE_RE.captures(output)?;
    let letter = caps[1].chars().next().and_then(GradeLetter::from_char)?;

    Some(Grade {
        letter,
        plus: !caps[2].is_empty(),
    })
}

/// Trim `output`, drop a leading `label` if present, and trim again
pub fn strip_label<'a>(output: &'a str, label: &str) -> &'a str {
    let trimmed = output.trim();
    trimmed.strip_prefix(label).unwrap_or(trimmed).trim()
}
