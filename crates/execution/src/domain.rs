//! Domain capability interface.

use async_trait::async_trait;
use sovereign_core::{ContextMap, DimensionScores, DimensionWeights, ExecutionPlan, Intent};
use sovereign_knowledge::OptimizedContext;
use sovereign_quality::{DomainProfile, Result as QualityResult};

use crate::executor::TaskOutcome;

/// Domain-specific behaviour plugged into the pipeline.
///
/// Quality dimensions, weights and measurement default to the domain's
/// [`DomainProfile`].
#[async_trait]
pub trait DomainEngine: Send + Sync {
    /// Domain name, also the history key.
    fn domain(&self) -> &str;

    /// Quality profile for the domain.
    fn profile(&self) -> &DomainProfile;

    /// Build an intent from raw user input.
    fn analyze_intent(&self, user_input: &str, context: &ContextMap) -> Intent;

    /// Task complexity, nominally 0-1.
    fn calculate_complexity(&self, intent: &Intent) -> f64;

    /// Quality dimension names.
    fn get_quality_dimensions(&self) -> Vec<String> {
        self.profile().dimension_names()
    }

    /// Quality dimension weights.
    fn get_quality_weights(&self) -> DimensionWeights {
        self.profile().weights()
    }

    /// Turn an outcome's raw signals into dimension scores.
    fn measure_quality(&self, outcome: &TaskOutcome, _intent: &Intent) -> QualityResult<DimensionScores> {
        self.profile().scores_from_signals(&outcome.signals)
    }

    /// Perform the task.
    async fn execute_task(
        &self,
        plan: &ExecutionPlan,
        intent: &Intent,
        context: Option<&OptimizedContext>,
    ) -> anyhow::Result<TaskOutcome>;
}
