//! Run reports.

use serde::Serialize;
use sovereign_core::{DimensionScores, Grade, Policy, RunId, RuntimeMode, Trend, ValidationOutcome};
use sovereign_knowledge::OptimizedContext;

/// Pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Build the intent and its complexity
    AnalyzeIntent,
    /// Check the intent
    Validate,
    /// Pick the runtime tier
    ResolvePolicy,
    /// Build the step plan
    GeneratePlan,
    /// Run the task
    Execute,
    /// Score the outcome
    MeasureQuality,
    /// Record the cycle
    TrackEvolution,
    /// Assemble the report
    Explain,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::AnalyzeIntent => "analyze_intent",
            Phase::Validate => "validate",
            Phase::ResolvePolicy => "resolve_policy",
            Phase::GeneratePlan => "generate_plan",
            Phase::Execute => "execute",
            Phase::MeasureQuality => "measure_quality",
            Phase::TrackEvolution => "track_evolution",
            Phase::Explain => "explain",
        };
        f.write_str(name)
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All phases completed
    Success,
    /// The intent was rejected
    ValidationFailed,
    /// A phase failed
    Faulted,
}

/// Grade, score and dimension scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitySummary {
    /// Letter grade
    pub grade: Grade,
    /// Weighted score
    pub score: f64,
    /// Dimension scores
    pub dimensions: DimensionScores,
}

/// Evolution state after the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvolutionStatus {
    /// Recorded cycle number
    pub cycle: u32,
    /// Trend including this cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

/// Timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Performance {
    /// Wall-clock duration of the run
    pub duration_ms: f64,
    /// Policy estimate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_ms: Option<f64>,
    /// `min(1, estimated / actual)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
}

impl Performance {
    pub(crate) fn elapsed(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            estimated_duration_ms: None,
            efficiency: None,
        }
    }

    pub(crate) fn against_estimate(duration_ms: f64, estimated_seconds: f64) -> Self {
        let estimated_ms = estimated_seconds * 1000.0;
        let efficiency = if duration_ms > 0.0 {
            (estimated_ms / duration_ms).min(1.0)
        } else {
            1.0
        };
        Self {
            duration_ms,
            estimated_duration_ms: Some(estimated_ms),
            efficiency: Some(efficiency),
        }
    }
}

/// Packed reference material used by the run, without its content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSummary {
    /// Tier the context was packed for
    pub mode: RuntimeMode,
    /// Included references
    pub included_references: Vec<String>,
    /// Estimated tokens
    pub total_tokens: usize,
    /// Budget
    pub budget_tokens: usize,
}

impl From<&OptimizedContext> for ContextSummary {
    fn from(context: &OptimizedContext) -> Self {
        Self {
            mode: context.mode,
            included_references: context.included_references.clone(),
            total_tokens: context.total_tokens,
            budget_tokens: context.budget_tokens,
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// Run identifier
    pub run_id: RunId,
    /// Domain
    pub domain: String,
    /// Terminal state
    pub status: RunStatus,
    /// `status == Success`
    pub success: bool,
    /// Task output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Quality; never present unless the run succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualitySummary>,
    /// Recommendations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    /// Evolution state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolution: Option<EvolutionStatus>,
    /// Resolved policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    /// Packed context summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextSummary>,
    /// Validation details when validation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationOutcome>,
    /// Phase that faulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    /// Error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Timing
    pub performance: Performance,
}

impl ExecutionReport {
    pub(crate) fn failed(run_id: RunId, domain: &str, status: RunStatus, error: String, duration_ms: f64) -> Self {
        Self {
            run_id,
            domain: domain.to_string(),
            status,
            success: false,
            result: None,
            quality: None,
            recommendations: Vec::new(),
            evolution: None,
            policy: None,
            context: None,
            validation: None,
            failed_phase: None,
            error: Some(error),
            performance: Performance::elapsed(duration_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_is_capped() {
        let fast = Performance::against_estimate(100.0, 5.0);
        assert_eq!(fast.estimated_duration_ms, Some(5000.0));
        assert_eq!(fast.efficiency, Some(1.0));

        let slow = Performance::against_estimate(10_000.0, 5.0);
        assert_eq!(slow.efficiency, Some(0.5));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::AnalyzeIntent.to_string(), "analyze_intent");
        assert_eq!(Phase::MeasureQuality.to_string(), "measure_quality");
    }

    #[test]
    fn test_failed_report_serializes_without_quality() {
        let report = ExecutionReport::failed(RunId::new(), "code", RunStatus::Faulted, "boom".into(), 1.5);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["status"], "faulted");
        assert!(value.get("quality").is_none());
        assert_eq!(value["performance"]["duration_ms"], 1.5);
    }
}
