//! Evolution cycle records and trend classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::grade::Grade;

/// Dimension name -> score (0-1).
pub type DimensionScores = BTreeMap<String, f64>;

/// Dimension name -> weight (0-1, summing to 1.0).
pub type DimensionWeights = BTreeMap<String, f64>;

/// A single evolution cycle record.
///
/// Cycles are created once per completed pipeline run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionCycle {
    /// Cycle number within the domain, starting at 1
    pub cycle: u32,

    /// Creation time in unix seconds
    pub timestamp: f64,

    /// Dimension scores measured in this cycle
    pub quality_scores: DimensionScores,

    /// Derived grade
    pub grade: Grade,

    /// Derived weighted score
    pub grade_score: f64,

    /// Recommendations issued for this cycle
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Comparison with the previous cycle
    #[serde(default)]
    pub learning: Option<String>,

    /// Additional metrics
    #[serde(default)]
    pub metrics: serde_json::Map<String, serde_json::Value>,
}

/// Direction of the quality trend over recent cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Slope above the threshold
    Improving,
    /// Slope below the negative threshold
    Degrading,
    /// Slope within the threshold band
    Stable,
    /// Fewer than two cycles available
    InsufficientData,
}

impl Trend {
    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Degrading => "degrading",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_json_shape() {
        let cycle = EvolutionCycle {
            cycle: 1,
            timestamp: 1_700_000_000.25,
            quality_scores: [("correctness".to_string(), 0.9)].into_iter().collect(),
            grade: Grade::A,
            grade_score: 0.9,
            recommendations: vec!["keep going".to_string()],
            learning: None,
            metrics: Default::default(),
        };

        let value = serde_json::to_value(&cycle).unwrap();
        assert_eq!(value["grade"], "A");
        assert!(value["learning"].is_null());
        assert!(value["metrics"].as_object().unwrap().is_empty());

        let back: EvolutionCycle = serde_json::from_value(value).unwrap();
        assert_eq!(back, cycle);
    }

    #[test]
    fn test_cycle_tolerates_missing_optional_fields() {
        let json = r#"{"cycle":2,"timestamp":1.5,"quality_scores":{},"grade":"F","grade_score":0.1}"#;
        let cycle: EvolutionCycle = serde_json::from_str(json).unwrap();
        assert!(cycle.recommendations.is_empty());
        assert!(cycle.learning.is_none());
        assert!(cycle.metrics.is_empty());
    }

    #[test]
    fn test_trend_names() {
        assert_eq!(serde_json::to_string(&Trend::InsufficientData).unwrap(), "\"insufficient_data\"");
        assert_eq!(Trend::Improving.to_string(), "improving");
    }
}
