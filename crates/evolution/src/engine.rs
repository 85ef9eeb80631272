//! Evolution engine - per-domain cycle history with trend analysis.

use serde::Serialize;
use sovereign_core::{
    unix_timestamp, DimensionScores, DimensionWeights, EvolutionConfig, EvolutionCycle, Grade,
    Trend,
};
use sovereign_storage::{HistoryDocument, HistoryStorage, StorageError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::regression::{ols_slope, residual_variance};
use crate::summary::EvolutionSummary;

/// Error type for evolution operations.
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Evolution errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    /// Persisting history failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cycle data is unusable
    #[error("Invalid cycle: {0}")]
    InvalidCycle(String),
}

/// Input for a new cycle. Number, timestamp and learning note are assigned
/// by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCycle {
    /// Measured dimension scores
    pub quality_scores: DimensionScores,
    /// Grade for the run
    pub grade: Grade,
    /// Weighted score for the run
    pub grade_score: f64,
    /// Recommendations issued with the run
    pub recommendations: Vec<String>,
    /// Additional metrics
    pub metrics: serde_json::Map<String, serde_json::Value>,
}

impl NewCycle {
    /// Create a cycle input without recommendations or metrics.
    pub fn new(quality_scores: DimensionScores, grade: Grade, grade_score: f64) -> Self {
        Self {
            quality_scores,
            grade,
            grade_score,
            recommendations: Vec::new(),
            metrics: serde_json::Map::new(),
        }
    }

    /// Attach recommendations.
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Attach metrics.
    pub fn with_metrics(mut self, metrics: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Reject scores that are non-finite or outside [0, 1].
    ///
    /// Non-finite values would be written as `null` and make the whole
    /// history undecodable.
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.grade_score) {
            return Err(EvolutionError::InvalidCycle(format!(
                "grade score {} outside [0, 1]",
                self.grade_score
            )));
        }
        if let Some((name, score)) = self
            .quality_scores
            .iter()
            .find(|(_, score)| !(0.0..=1.0).contains(*score))
        {
            return Err(EvolutionError::InvalidCycle(format!(
                "score {} for {} outside [0, 1]",
                score, name
            )));
        }
        Ok(())
    }
}

/// Cycles-to-target estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergencePrediction {
    /// Estimated cycles to reach the target, `None` when no estimate is possible
    pub cycles_needed: Option<u32>,
    /// Heuristic confidence, 0-1
    pub confidence: f64,
}

impl ConvergencePrediction {
    fn unknown() -> Self {
        Self {
            cycles_needed: None,
            confidence: 0.0,
        }
    }
}

/// Tracks quality cycles for one domain.
///
/// The engine is the only writer of its domain's history. Appends take the
/// storage's domain lock and reload before writing, so engines sharing a
/// storage never lose each other's cycles.
pub struct EvolutionEngine {
    storage: Arc<dyn HistoryStorage>,
    domain: String,
    config: EvolutionConfig,
    cycles: Vec<EvolutionCycle>,
}

impl EvolutionEngine {
    /// Open the engine for a domain, loading its persisted history.
    ///
    /// Unreadable history is treated as empty.
    pub async fn open(
        storage: Arc<dyn HistoryStorage>,
        domain: impl Into<String>,
        config: EvolutionConfig,
    ) -> Self {
        let domain = domain.into();
        let cycles = match storage.load_history(&domain).await {
            Ok(Some(document)) => document.cycles,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Evolution history for {} unreadable, starting empty: {}", domain, e);
                Vec::new()
            }
        };
        debug!("Loaded {} cycles for {}", cycles.len(), domain);

        Self {
            storage,
            domain,
            config,
            cycles,
        }
    }

    /// Domain name.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Tuning constants.
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Ordered cycle history.
    pub fn history(&self) -> &[EvolutionCycle] {
        &self.cycles
    }

    /// Append a cycle and persist the full history.
    ///
    /// On a failed write the in-memory history is left as it was.
    pub async fn add_cycle(&mut self, input: NewCycle) -> Result<EvolutionCycle> {
        input.validate()?;

        let _guard = self.storage.lock_domain(&self.domain).await?;

        let mut cycles = match self.storage.load_history(&self.domain).await {
            Ok(Some(document)) => document.cycles,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Reloading history for {} failed, using memory: {}", self.domain, e);
                self.cycles.clone()
            }
        };

        let learning = cycles
            .last()
            .map(|prev| learning_note(prev, input.grade, input.grade_score));

        let cycle = EvolutionCycle {
            cycle: cycles.len() as u32 + 1,
            timestamp: unix_timestamp(),
            quality_scores: input.quality_scores,
            grade: input.grade,
            grade_score: input.grade_score,
            recommendations: input.recommendations,
            learning,
            metrics: input.metrics,
        };
        cycles.push(cycle.clone());

        let document = HistoryDocument::new(self.domain.clone(), cycles);
        self.storage.save_history(&document).await?;
        self.cycles = document.cycles;

        info!(
            "Recorded cycle {} for {}: grade {} ({:.3})",
            cycle.cycle, self.domain, cycle.grade, cycle.grade_score
        );
        Ok(cycle)
    }

    fn recent_scores(&self, window: usize) -> Vec<f64> {
        let start = self.cycles.len().saturating_sub(window);
        self.cycles[start..].iter().map(|c| c.grade_score).collect()
    }

    /// Trend over the trailing `window` cycles.
    pub fn get_trend(&self, window: usize) -> Trend {
        let scores = self.recent_scores(window);
        if scores.len() < 2 {
            return Trend::InsufficientData;
        }

        match ols_slope(&scores) {
            Some(slope) if slope > self.config.slope_threshold => Trend::Improving,
            Some(slope) if slope < -self.config.slope_threshold => Trend::Degrading,
            _ => Trend::Stable,
        }
    }

    /// Trend over the configured window.
    pub fn trend(&self) -> Trend {
        self.get_trend(self.config.trend_window)
    }

    /// Estimate cycles until the latest score reaches `target`.
    pub fn predict_convergence(&self, target: f64) -> ConvergencePrediction {
        if self.cycles.len() < self.config.min_cycles_for_prediction {
            return ConvergencePrediction::unknown();
        }

        let scores = self.recent_scores(self.config.convergence_window);
        let Some(&current) = scores.last() else {
            return ConvergencePrediction::unknown();
        };
        if current >= target {
            return ConvergencePrediction {
                cycles_needed: Some(0),
                confidence: 1.0,
            };
        }

        let slope = match ols_slope(&scores) {
            Some(slope) if slope > 0.0 => slope,
            _ => return ConvergencePrediction::unknown(),
        };

        let cycles_needed = ((target - current) / slope).floor() as u32;
        let mut confidence = (self.cycles.len() as f64 / self.config.confidence_horizon).min(1.0);
        if residual_variance(&scores, slope) > self.config.variance_threshold {
            confidence *= self.config.variance_penalty;
        }

        ConvergencePrediction {
            cycles_needed: Some(cycles_needed),
            confidence,
        }
    }

    /// Recommendations from the current scores and the history.
    pub fn generate_recommendations(
        &self,
        scores: &DimensionScores,
        weights: &DimensionWeights,
    ) -> Vec<String> {
        let weak_threshold = self.config.weak_threshold;

        let mut weak: Vec<(&str, f64, f64)> = scores
            .iter()
            .filter_map(|(dim, &score)| {
                let weight = weights.get(dim).copied().unwrap_or(0.0);
                (score < weak_threshold && weight > self.config.high_weight)
                    .then(|| (dim.as_str(), score, weight * (weak_threshold - score)))
            })
            .collect();
        weak.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

        let mut recommendations: Vec<String> = weak
            .iter()
            .take(3)
            .map(|(dim, score, _)| format!("Improve {} from {:.2} to {:.2}", dim, score, weak_threshold))
            .collect();

        if self.cycles.len() >= 3 {
            let last_grade = self.cycles.last().map(|c| c.grade);
            match self.trend() {
                Trend::Degrading => recommendations
                    .push("Quality degrading - review recent changes and revert if needed".to_string()),
                Trend::Stable if matches!(last_grade, Some(Grade::B) | Some(Grade::C)) => recommendations
                    .push("Quality plateau detected - try new optimization strategies".to_string()),
                _ => {}
            }
        }

        let prediction = self.predict_convergence(self.config.target_score);
        if let Some(cycles) = prediction.cycles_needed {
            if prediction.confidence > 0.5 {
                recommendations.push(match cycles {
                    0 => "S-grade achieved! Focus on maintaining excellence".to_string(),
                    1..=3 => format!(
                        "S-grade achievable in {} cycles (confidence: {:.0}%)",
                        cycles,
                        prediction.confidence * 100.0
                    ),
                    _ => format!("Estimated {} cycles to S-grade - stay consistent", cycles),
                });
            }
        }

        recommendations
    }

    /// Summary statistics.
    pub fn summary(&self) -> EvolutionSummary {
        EvolutionSummary::from_engine(self)
    }
}

fn learning_note(prev: &EvolutionCycle, grade: Grade, score: f64) -> String {
    // Relative change; against a zero baseline report percentage points
    let change = |delta: f64| {
        if prev.grade_score > 0.0 {
            delta / prev.grade_score * 100.0
        } else {
            delta * 100.0
        }
    };

    if score > prev.grade_score {
        format!(
            "Quality improved by {:.1}% ({} → {})",
            change(score - prev.grade_score),
            prev.grade,
            grade
        )
    } else if score < prev.grade_score {
        format!(
            "Quality degraded by {:.1}% - review recent changes",
            change(prev.grade_score - score)
        )
    } else {
        "Quality stable - consider new optimization strategies".to_string()
    }
}
