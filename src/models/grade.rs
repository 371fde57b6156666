use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder shown when a field could not be parsed from model output
pub const UNAVAILABLE: &str = "N/A";

/// Letter component of a grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GradeLetter {
    A,
    B,
    C,
    D,
    F,
}

impl GradeLetter {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'F' => Some(Self::F),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::F => 'F',
        }
    }
}

/// A letter grade, optionally with a "+" modifier (e.g. "B+")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grade {
    pub letter: GradeLetter,
    pub plus: bool,
}

impl Grade {
    pub fn new(letter: GradeLetter) -> Self {
        Self {
            letter,
            plus: false,
        }
    }

    pub fn with_plus(letter: GradeLetter) -> Self {
        Self { letter, plus: true }
    }

    /// C, D and F. The justifier is asked for a detailed critique in this band.
    pub fn is_low(&self) -> bool {
        self.letter >= GradeLetter::C
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        if self.plus {
            write!(f, "+")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid grade: {0:?}")]
pub struct InvalidGrade(pub String);

impl FromStr for Grade {
    type Err = InvalidGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let letter = chars
            .next()
            .and_then(GradeLetter::from_char)
            .ok_or_else(|| InvalidGrade(s.to_string()))?;

        match (chars.next(), chars.next()) {
            (None, _) => Ok(Self::new(letter)),
            (Some('+'), None) => Ok(Self::with_plus(letter)),
            _ => Err(InvalidGrade(s.to_string())),
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display an optional grade, substituting the placeholder when missing
pub fn grade_or_unavailable(grade: Option<Grade>) -> String {
    grade
        .map(|g| g.to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Display optional marks, substituting the placeholder when missing
pub fn marks_or_unavailable(marks: Option<u8>) -> String {
    marks
        .map(|m| m.to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}
