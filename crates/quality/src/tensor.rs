//! N-dimensional quality tensor.
//!
//! `Q = Σ score[d] * weight[d]`, graded S/A/B/C/D/F by fixed thresholds.

use serde::Serialize;
use sovereign_core::{DimensionScores, DimensionWeights, Grade};

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Error type for quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Quality validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QualityError {
    /// A scored dimension has no weight
    #[error("Dimension '{0}' missing weight")]
    MissingWeight(String),

    /// Weights do not sum to 1.0
    #[error("Weights must sum to 1.0, got {0}")]
    WeightSum(f64),

    /// Score outside [0, 1]
    #[error("Score for '{dimension}' out of range: {score}")]
    ScoreOutOfRange {
        /// Dimension name
        dimension: String,
        /// Offending score
        score: f64,
    },

    /// Nothing was scored
    #[error("No quality dimensions were scored")]
    NoDimensions,

    /// A profile dimension has no measured signal
    #[error("No signal measured for dimension '{0}'")]
    MissingSignal(String),
}

/// Grade and weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    /// Letter grade
    pub grade: Grade,
    /// Weighted score
    pub score: f64,
}

/// Serializable view of a tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TensorReport {
    /// Dimension scores
    pub dimensions: DimensionScores,
    /// Dimension weights
    pub weights: DimensionWeights,
    /// Letter grade
    pub grade: Grade,
    /// Weighted score
    pub score: f64,
    /// Per-dimension contribution to the score
    pub contributions: DimensionScores,
    /// Dimensions below 0.90, highest impact first
    pub weak_dimensions: Vec<(String, f64)>,
}

/// Validated set of dimension scores and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityTensor {
    dimensions: DimensionScores,
    weights: DimensionWeights,
}

impl QualityTensor {
    /// Default threshold for weak-dimension reporting.
    pub const WEAK_THRESHOLD: f64 = 0.90;

    /// Build a tensor, validating its invariants.
    pub fn new(dimensions: DimensionScores, weights: DimensionWeights) -> Result<Self> {
        let tensor = Self { dimensions, weights };
        tensor.validate()?;
        Ok(tensor)
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(QualityError::NoDimensions);
        }

        for dim in self.dimensions.keys() {
            if !self.weights.contains_key(dim) {
                return Err(QualityError::MissingWeight(dim.clone()));
            }
        }

        let total: f64 = self.weights.values().sum();
        if !((total - 1.0).abs() <= WEIGHT_TOLERANCE) {
            return Err(QualityError::WeightSum(total));
        }

        for (dim, &score) in &self.dimensions {
            // NaN fails the range check too
            if !(0.0..=1.0).contains(&score) {
                return Err(QualityError::ScoreOutOfRange {
                    dimension: dim.clone(),
                    score,
                });
            }
        }

        Ok(())
    }

    /// Dimension scores.
    pub fn dimensions(&self) -> &DimensionScores {
        &self.dimensions
    }

    /// Dimension weights.
    pub fn weights(&self) -> &DimensionWeights {
        &self.weights
    }

    /// Weighted score over the scored dimensions.
    pub fn score(&self) -> f64 {
        self.dimensions
            .iter()
            .map(|(dim, score)| score * self.weights[dim])
            .sum()
    }

    /// Overall grade and score.
    pub fn calculate_grade(&self) -> Assessment {
        let score = self.score();
        Assessment {
            grade: Grade::from_score(score),
            score,
        }
    }

    /// Dimensions scoring below `threshold`, ordered by `weight * gap`
    /// descending. Equal priorities keep dimension-name order.
    pub fn weakest_dimensions(&self, threshold: f64) -> Vec<(String, f64)> {
        let mut weak: Vec<_> = self
            .dimensions
            .iter()
            .filter(|(_, &score)| score < threshold)
            .map(|(dim, &score)| {
                let priority = self.weights[dim] * (threshold - score);
                (dim.clone(), score, priority)
            })
            .collect();

        weak.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

        weak.into_iter().map(|(dim, score, _)| (dim, score)).collect()
    }

    /// Additive contribution of each dimension to the score.
    pub fn contribution_breakdown(&self) -> DimensionScores {
        self.dimensions
            .iter()
            .map(|(dim, score)| (dim.clone(), score * self.weights[dim]))
            .collect()
    }

    /// Grade the tensor would receive with some scores replaced.
    ///
    /// Replacement scores are capped at 1.0; dimensions the tensor does not
    /// score are ignored. `self` is left untouched.
    pub fn predict_grade_with_improvement(&self, improvements: &DimensionScores) -> Result<Assessment> {
        let mut dimensions = self.dimensions.clone();
        for (dim, &new_score) in improvements {
            if let Some(slot) = dimensions.get_mut(dim) {
                *slot = new_score.min(1.0);
            }
        }

        let hypothetical = QualityTensor::new(dimensions, self.weights.clone())?;
        Ok(hypothetical.calculate_grade())
    }

    /// Export the tensor with derived values.
    pub fn report(&self) -> TensorReport {
        let Assessment { grade, score } = self.calculate_grade();
        TensorReport {
            dimensions: self.dimensions.clone(),
            weights: self.weights.clone(),
            grade,
            score,
            contributions: self.contribution_breakdown(),
            weak_dimensions: self.weakest_dimensions(Self::WEAK_THRESHOLD),
        }
    }
}

impl std::fmt::Display for QualityTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Assessment { grade, score } = self.calculate_grade();
        write!(f, "QualityTensor(grade={}, score={:.2}", grade, score)?;
        for (dim, value) in &self.dimensions {
            write!(f, ", {}={:.2}", dim, value)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> DimensionScores {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn code_weights() -> DimensionWeights {
        map(&[
            ("correctness", 0.30),
            ("readability", 0.25),
            ("performance", 0.20),
            ("security", 0.15),
            ("maintainability", 0.10),
        ])
    }

    fn uniform(score: f64) -> DimensionScores {
        code_weights().keys().map(|k| (k.clone(), score)).collect()
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let scores = map(&[("a", 0.5), ("b", 0.5)]);

        let err = QualityTensor::new(scores.clone(), map(&[("a", 0.5), ("b", 0.52)])).unwrap_err();
        assert!(matches!(err, QualityError::WeightSum(_)));

        let err = QualityTensor::new(scores.clone(), map(&[("a", 0.5), ("b", 0.3)])).unwrap_err();
        assert!(matches!(err, QualityError::WeightSum(_)));

        // within tolerance
        assert!(QualityTensor::new(scores.clone(), map(&[("a", 0.5), ("b", 0.505)])).is_ok());
        assert!(QualityTensor::new(scores, map(&[("a", 0.5), ("b", 0.495)])).is_ok());
    }

    #[test]
    fn test_scores_must_be_in_range() {
        let weights = map(&[("a", 0.5), ("b", 0.5)]);

        for bad in [-0.01, 1.01, f64::NAN] {
            let err = QualityTensor::new(map(&[("a", 0.5), ("b", bad)]), weights.clone()).unwrap_err();
            assert!(matches!(err, QualityError::ScoreOutOfRange { ref dimension, .. } if dimension == "b"));
        }

        assert!(QualityTensor::new(map(&[("a", 0.0), ("b", 1.0)]), weights).is_ok());
    }

    #[test]
    fn test_scored_dimension_needs_weight() {
        let err = QualityTensor::new(map(&[("a", 0.5), ("c", 0.5)]), map(&[("a", 0.5), ("b", 0.5)])).unwrap_err();
        assert_eq!(err, QualityError::MissingWeight("c".to_string()));
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        let err = QualityTensor::new(DimensionScores::new(), code_weights()).unwrap_err();
        assert_eq!(err, QualityError::NoDimensions);
    }

    #[test]
    fn test_calculate_grade() {
        let tensor = QualityTensor::new(
            map(&[
                ("correctness", 0.90),
                ("readability", 0.85),
                ("performance", 0.88),
                ("security", 0.92),
                ("maintainability", 0.87),
            ]),
            code_weights(),
        )
        .unwrap();

        let a = tensor.calculate_grade();
        // 0.27 + 0.2125 + 0.176 + 0.138 + 0.087
        assert!((a.score - 0.8835).abs() < 1e-9);
        assert_eq!(a.grade, Grade::B);
    }

    #[test]
    fn test_uniform_scores_grade() {
        for (score, grade) in [(0.97, Grade::S), (0.85, Grade::B), (0.65, Grade::D), (0.59, Grade::F)] {
            let tensor = QualityTensor::new(uniform(score), code_weights()).unwrap();
            assert_eq!(tensor.calculate_grade().grade, grade, "score {}", score);
        }
    }

    #[test]
    fn test_weakest_dimensions_ranked_by_impact() {
        let tensor = QualityTensor::new(
            map(&[
                ("correctness", 0.85),     // 0.30 * 0.05 = 0.015
                ("readability", 0.95),     // not weak
                ("performance", 0.70),     // 0.20 * 0.20 = 0.040
                ("security", 0.82),        // 0.15 * 0.08 = 0.012
                ("maintainability", 0.40), // 0.10 * 0.50 = 0.050
            ]),
            code_weights(),
        )
        .unwrap();

        let weak = tensor.weakest_dimensions(0.90);
        let names: Vec<_> = weak.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(names, vec!["maintainability", "performance", "correctness", "security"]);
        assert_eq!(weak[0].1, 0.40);
    }

    #[test]
    fn test_contributions_sum_to_score() {
        let tensor = QualityTensor::new(uniform(0.8), code_weights()).unwrap();
        let contributions = tensor.contribution_breakdown();
        let total: f64 = contributions.values().sum();
        assert!((total - tensor.score()).abs() < 1e-12);
        assert!((contributions["correctness"] - 0.24).abs() < 1e-12);
    }

    #[test]
    fn test_predict_does_not_mutate() {
        let tensor = QualityTensor::new(uniform(0.85), code_weights()).unwrap();
        let before = tensor.clone();

        let predicted = tensor
            .predict_grade_with_improvement(&map(&[("correctness", 1.4), ("unknown", 0.1)]))
            .unwrap();

        // correctness capped at 1.0: 0.85 + 0.30 * 0.15 = 0.895
        assert!((predicted.score - 0.895).abs() < 1e-9);
        assert_eq!(predicted.grade, Grade::B);
        assert_eq!(tensor, before);
    }

    #[test]
    fn test_predict_rejects_negative_hypothesis() {
        let tensor = QualityTensor::new(uniform(0.85), code_weights()).unwrap();
        assert!(tensor.predict_grade_with_improvement(&map(&[("security", -0.5)])).is_err());
    }

    #[test]
    fn test_report_and_display() {
        let tensor = QualityTensor::new(uniform(0.85), code_weights()).unwrap();
        let report = tensor.report();
        assert_eq!(report.grade, Grade::B);
        assert_eq!(report.weak_dimensions.len(), 5);
        assert_eq!(report.weak_dimensions[0].0, "correctness");

        let text = tensor.to_string();
        assert!(text.starts_with("QualityTensor(grade=B, score=0.85"));
    }
}
