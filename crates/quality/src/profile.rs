//! Domain quality profiles - which dimensions a domain is graded on.

use serde::{Deserialize, Serialize};
use sovereign_core::{DimensionScores, DimensionWeights};

use crate::tensor::{QualityError, QualityTensor, Result, WEIGHT_TOLERANCE};

/// A single quality dimension definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Dimension name
    pub name: String,

    /// Weight, 0-1
    pub weight: f64,

    /// Human readable description
    pub description: String,

    /// Raw signal measures a defect (lower is better) and is inverted
    #[serde(default)]
    pub inverted: bool,
}

impl DimensionSpec {
    /// Create a dimension where higher raw values are better.
    pub fn new(name: impl Into<String>, weight: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            description: description.into(),
            inverted: false,
        }
    }

    /// Mark the raw signal as inverted (quality = 1 - signal).
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

/// Ordered dimension set and weights for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    /// Domain name
    pub domain: String,

    /// Dimensions in presentation order
    pub dimensions: Vec<DimensionSpec>,
}

impl DomainProfile {
    /// Create a profile, checking that weights sum to 1.0.
    pub fn new(domain: impl Into<String>, dimensions: Vec<DimensionSpec>) -> Result<Self> {
        let total: f64 = dimensions.iter().map(|d| d.weight).sum();
        if !((total - 1.0).abs() <= WEIGHT_TOLERANCE) {
            return Err(QualityError::WeightSum(total));
        }
        Ok(Self {
            domain: domain.into(),
            dimensions,
        })
    }

    /// Code generation: correctness, readability, performance, security,
    /// maintainability.
    pub fn code() -> Self {
        Self {
            domain: "code".to_string(),
            dimensions: vec![
                DimensionSpec::new("correctness", 0.30, "Logic correctness, type safety"),
                DimensionSpec::new("readability", 0.25, "Code clarity, naming, structure"),
                DimensionSpec::new("performance", 0.20, "Time/space complexity"),
                DimensionSpec::new("security", 0.15, "Vulnerability-free, OWASP compliance"),
                DimensionSpec::new("maintainability", 0.10, "Modular, testable, documented"),
            ],
        }
    }

    /// Debugging: root cause accuracy, fix effectiveness, regression risk
    /// (inverted), time efficiency, learning.
    pub fn debug() -> Self {
        Self {
            domain: "debug".to_string(),
            dimensions: vec![
                DimensionSpec::new("root_cause_accuracy", 0.30, "Correctly identified root cause"),
                DimensionSpec::new("fix_effectiveness", 0.25, "Problem fully resolved"),
                DimensionSpec::new("regression_risk", 0.20, "Low chance of new bugs").inverted(),
                DimensionSpec::new("time_efficiency", 0.15, "Fast resolution"),
                DimensionSpec::new("learning", 0.10, "Knowledge captured for future"),
            ],
        }
    }

    /// Refactoring: simplicity, cohesion, coupling (inverted), testability,
    /// performance.
    pub fn refactor() -> Self {
        Self {
            domain: "refactor".to_string(),
            dimensions: vec![
                DimensionSpec::new("simplicity", 0.30, "Reduced complexity"),
                DimensionSpec::new("cohesion", 0.25, "High cohesion within modules"),
                DimensionSpec::new("coupling", 0.20, "Low coupling between modules").inverted(),
                DimensionSpec::new("testability", 0.15, "Easier to test"),
                DimensionSpec::new("performance", 0.10, "No performance regression"),
            ],
        }
    }

    /// Dimension names in order.
    pub fn dimension_names(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name.clone()).collect()
    }

    /// Weight mapping.
    pub fn weights(&self) -> DimensionWeights {
        self.dimensions
            .iter()
            .map(|d| (d.name.clone(), d.weight))
            .collect()
    }

    /// Convert raw signals into dimension scores.
    ///
    /// Every profile dimension must be present in `signals`; extra signals
    /// are ignored. Inverted dimensions are flipped to `1 - signal`.
    pub fn scores_from_signals(&self, signals: &DimensionScores) -> Result<DimensionScores> {
        self.dimensions
            .iter()
            .map(|spec| {
                let raw = signals
                    .get(&spec.name)
                    .copied()
                    .ok_or_else(|| QualityError::MissingSignal(spec.name.clone()))?;
                let score = if spec.inverted { 1.0 - raw } else { raw };
                Ok((spec.name.clone(), score))
            })
            .collect()
    }

    /// Build a validated tensor from dimension scores.
    pub fn tensor(&self, scores: DimensionScores) -> Result<QualityTensor> {
        QualityTensor::new(scores, self.weights())
    }
}
