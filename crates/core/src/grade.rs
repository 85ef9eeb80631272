//! Letter grades derived from a weighted quality score.

use serde::{Deserialize, Serialize};

/// Quality grade.
///
/// Thresholds are inclusive lower bounds on the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// >= 0.95, exceptional
    S,
    /// >= 0.90, production ready
    A,
    /// >= 0.80, minor improvements needed
    B,
    /// >= 0.70, improvements required
    C,
    /// >= 0.60, major improvements required
    D,
    /// < 0.60, failing
    F,
}

impl Grade {
    /// Grades with their inclusive lower bounds, best first.
    pub const THRESHOLDS: [(Grade, f64); 5] = [
        (Grade::S, 0.95),
        (Grade::A, 0.90),
        (Grade::B, 0.80),
        (Grade::C, 0.70),
        (Grade::D, 0.60),
    ];

    /// Grade a weighted score.
    pub fn from_score(score: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(_, floor)| score >= *floor)
            .map(|(grade, _)| *grade)
            .unwrap_or(Grade::F)
    }

    /// Single-letter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a grade letter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grade: {0}")]
pub struct ParseGradeError(pub String);

impl std::str::FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "F" => Ok(Self::F),
            _ => Err(ParseGradeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries_are_exact() {
        assert_eq!(Grade::from_score(0.95), Grade::S);
        assert_eq!(Grade::from_score(0.9499), Grade::A);
        assert_eq!(Grade::from_score(0.90), Grade::A);
        assert_eq!(Grade::from_score(0.80), Grade::B);
        assert_eq!(Grade::from_score(0.7999), Grade::C);
        assert_eq!(Grade::from_score(0.70), Grade::C);
        assert_eq!(Grade::from_score(0.60), Grade::D);
        assert_eq!(Grade::from_score(0.5999), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::S).unwrap(), "\"S\"");
        let g: Grade = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(g, Grade::C);
        assert_eq!("b".parse::<Grade>().unwrap(), Grade::B);
        assert!("E".parse::<Grade>().is_err());
    }
}
