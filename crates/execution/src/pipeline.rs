//! The orchestration pipeline.
//!
//! Phases run strictly in order. A rejected intent ends the run as
//! `ValidationFailed`; any other failure ends it as `Faulted` with the
//! elapsed time and the error, never a partial quality score, and no cycle
//! is recorded. A panicking executor counts as a fault.

use futures::FutureExt;
use serde_json::json;
use sovereign_core::{ContextMap, EvolutionConfig, Grade, RunId, Trend, ValidationOutcome};
use sovereign_evolution::{EvolutionEngine, EvolutionError, NewCycle};
use sovereign_knowledge::{ContextOptimizer, KnowledgeError, ModeSelection};
use sovereign_quality::{QualityError, QualityTensor};
use sovereign_storage::HistoryStorage;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::domain::DomainEngine;
use crate::plan::generate_plan;
use crate::policy::{validate_intent, PolicyResolver};
use crate::report::{
    ContextSummary, EvolutionStatus, ExecutionReport, Performance, Phase, QualitySummary, RunStatus,
};

/// Pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The executor failed
    #[error("Task execution failed: {0:#}")]
    Execution(anyhow::Error),

    /// Measured quality was unusable
    #[error(transparent)]
    Quality(#[from] QualityError),

    /// Reference material could not be loaded
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// The cycle could not be recorded
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
}

enum Interrupted {
    Rejected(ValidationOutcome),
    Fault(Phase, PipelineError),
}

fn fault<E: Into<PipelineError>>(phase: Phase) -> impl FnOnce(E) -> Interrupted {
    move |e| Interrupted::Fault(phase, e.into())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn grade_note(grade: Grade) -> &'static str {
    match grade {
        Grade::F => "Major improvements needed across all dimensions",
        Grade::C | Grade::D => "Focus on highest-weight dimensions first",
        Grade::B => "Close to A-grade - refine weak dimensions",
        Grade::A => "Optimize for S-grade - aim for 0.95+ on all dimensions",
        Grade::S => "S-grade reached - maintain current practices",
    }
}

/// Runs tasks for one domain and tracks their quality.
pub struct MetaCognitivePipeline {
    engine: Arc<dyn DomainEngine>,
    evolution: EvolutionEngine,
    resolver: PolicyResolver,
    optimizer: Option<ContextOptimizer>,
}

impl MetaCognitivePipeline {
    /// Create a pipeline from a domain engine and its evolution engine.
    pub fn new(engine: Arc<dyn DomainEngine>, evolution: EvolutionEngine) -> Self {
        Self {
            engine,
            evolution,
            resolver: PolicyResolver::default(),
            optimizer: None,
        }
    }

    /// Create a pipeline, opening the domain's history in `storage`.
    pub async fn open(
        engine: Arc<dyn DomainEngine>,
        storage: Arc<dyn HistoryStorage>,
        config: EvolutionConfig,
    ) -> Self {
        let evolution = EvolutionEngine::open(storage, engine.domain(), config).await;
        Self::new(engine, evolution)
    }

    /// Use a custom policy resolver.
    pub fn with_resolver(mut self, resolver: PolicyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Pack reference material for the executor.
    pub fn with_optimizer(mut self, optimizer: ContextOptimizer) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Domain name.
    pub fn domain(&self) -> &str {
        self.engine.domain()
    }

    /// Evolution engine for the domain.
    pub fn evolution(&self) -> &EvolutionEngine {
        &self.evolution
    }

    /// Run all phases for one task.
    pub async fn execute(&mut self, user_input: &str, context: ContextMap) -> ExecutionReport {
        let run_id = RunId::new();
        let started = Instant::now();
        info!(%run_id, domain = self.domain(), "Starting run");

        let outcome = self.run(run_id, user_input, &context, started).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(report) => report,
            Err(Interrupted::Rejected(validation)) => {
                warn!(%run_id, errors = ?validation.errors, "Validation failed");
                let mut report = ExecutionReport::failed(
                    run_id,
                    self.domain(),
                    RunStatus::ValidationFailed,
                    "Validation failed".to_string(),
                    elapsed_ms,
                );
                report.failed_phase = Some(Phase::Validate);
                report.validation = Some(validation);
                report
            }
            Err(Interrupted::Fault(phase, e)) => {
                error!(%run_id, %phase, "Run faulted: {}", e);
                let mut report = ExecutionReport::failed(
                    run_id,
                    self.domain(),
                    RunStatus::Faulted,
                    e.to_string(),
                    elapsed_ms,
                );
                report.failed_phase = Some(phase);
                report
            }
        }
    }

    async fn run(
        &mut self,
        run_id: RunId,
        user_input: &str,
        context: &ContextMap,
        started: Instant,
    ) -> Result<ExecutionReport, Interrupted> {
        debug!(%run_id, phase = %Phase::AnalyzeIntent);
        let intent = self.engine.analyze_intent(user_input, context);
        let complexity = self.engine.calculate_complexity(&intent);
        let intent = intent.with_complexity(complexity);

        debug!(%run_id, phase = %Phase::Validate);
        let validation = validate_intent(&intent);
        if !validation.valid {
            return Err(Interrupted::Rejected(validation));
        }
        for warning in &validation.warnings {
            warn!(%run_id, "{}", warning);
        }

        debug!(%run_id, phase = %Phase::ResolvePolicy);
        let policy = self.resolver.resolve(&intent, self.engine.get_quality_weights());

        debug!(%run_id, phase = %Phase::GeneratePlan, mode = %policy.mode);
        let plan = generate_plan(&policy);

        debug!(%run_id, phase = %Phase::Execute);
        let packed = match &self.optimizer {
            Some(optimizer) => Some(
                optimizer
                    .optimize_context(&intent.task, intent.complexity, ModeSelection::Fixed(policy.mode))
                    .await
                    .map_err(fault::<KnowledgeError>(Phase::Execute))?,
            ),
            None => None,
        };
        let outcome = AssertUnwindSafe(self.engine.execute_task(&plan, &intent, packed.as_ref()))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(anyhow::anyhow!("executor panicked: {}", panic_message(&*panic))))
            .map_err(|e| Interrupted::Fault(Phase::Execute, PipelineError::Execution(e)))?;

        debug!(%run_id, phase = %Phase::MeasureQuality);
        let scores = self
            .engine
            .measure_quality(&outcome, &intent)
            .map_err(fault::<QualityError>(Phase::MeasureQuality))?;
        let tensor = QualityTensor::new(scores.clone(), policy.quality_weights.clone())
            .map_err(fault::<QualityError>(Phase::MeasureQuality))?;
        let assessment = tensor.calculate_grade();

        debug!(%run_id, phase = %Phase::TrackEvolution);
        let mut recommendations = self
            .evolution
            .generate_recommendations(&scores, &policy.quality_weights);
        recommendations.push(grade_note(assessment.grade).to_string());

        let mut metrics = serde_json::Map::new();
        metrics.insert("run_id".to_string(), json!(run_id.to_string()));
        metrics.insert("mode".to_string(), json!(policy.mode));
        metrics.insert("complexity".to_string(), json!(intent.complexity));
        metrics.insert("task".to_string(), json!(intent.task));

        let cycle = self
            .evolution
            .add_cycle(
                NewCycle::new(scores.clone(), assessment.grade, assessment.score)
                    .with_recommendations(recommendations.clone())
                    .with_metrics(metrics),
            )
            .await
            .map_err(fault::<EvolutionError>(Phase::TrackEvolution))?;
        let trend = match self.evolution.trend() {
            Trend::InsufficientData => None,
            trend => Some(trend),
        };

        debug!(%run_id, phase = %Phase::Explain);
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            %run_id,
            grade = %assessment.grade,
            score = assessment.score,
            cycle = cycle.cycle,
            "Run complete"
        );

        Ok(ExecutionReport {
            run_id,
            domain: self.domain().to_string(),
            status: RunStatus::Success,
            success: true,
            result: Some(outcome.output),
            quality: Some(QualitySummary {
                grade: assessment.grade,
                score: assessment.score,
                dimensions: scores,
            }),
            recommendations,
            evolution: Some(EvolutionStatus {
                cycle: cycle.cycle,
                trend,
            }),
            context: packed.as_ref().map(ContextSummary::from),
            performance: Performance::against_estimate(duration_ms, policy.estimated_duration),
            policy: Some(policy),
            validation: None,
            failed_phase: None,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::{CodeDomain, DebugDomain};
    use crate::executor::{placeholder_signals, StaticExecutor, TaskExecutor, TaskOutcome};
    use async_trait::async_trait;
    use sovereign_core::{DimensionScores, ExecutionPlan, Intent, RuntimeMode};
    use sovereign_knowledge::{OptimizedContext, StaticReferenceLoader};
    use sovereign_storage::MemoryHistoryStorage;

    struct FailingExecutor;

    #[async_trait]
    impl TaskExecutor for FailingExecutor {
        async fn execute(
            &self,
            _plan: &ExecutionPlan,
            _intent: &Intent,
            _context: Option<&OptimizedContext>,
        ) -> anyhow::Result<TaskOutcome> {
            anyhow::bail!("executor unavailable")
        }
    }

    struct PanickingExecutor;

    #[async_trait]
    impl TaskExecutor for PanickingExecutor {
        async fn execute(
            &self,
            _plan: &ExecutionPlan,
            _intent: &Intent,
            _context: Option<&OptimizedContext>,
        ) -> anyhow::Result<TaskOutcome> {
            panic!("backend crashed")
        }
    }

    async fn pipeline_with(
        executor: Arc<dyn TaskExecutor>,
        storage: Arc<MemoryHistoryStorage>,
    ) -> MetaCognitivePipeline {
        MetaCognitivePipeline::open(
            Arc::new(CodeDomain::new(executor)),
            storage,
            EvolutionConfig::default(),
        )
        .await
    }

    fn code_executor() -> Arc<dyn TaskExecutor> {
        Arc::new(StaticExecutor::new(placeholder_signals("code").unwrap_or_default()))
    }

    #[tokio::test]
    async fn test_successful_run_records_cycle() {
        let storage = Arc::new(MemoryHistoryStorage::new());
        let mut pipeline = pipeline_with(code_executor(), storage.clone()).await;

        let report = pipeline.execute("Create Redis cache layer", ContextMap::new()).await;

        assert!(report.success);
        assert_eq!(report.status, RunStatus::Success);
        let quality = report.quality.as_ref().unwrap();
        // 0.27 + 0.2125 + 0.176 + 0.138 + 0.087
        assert!((quality.score - 0.8835).abs() < 1e-9);
        assert_eq!(quality.grade, Grade::B);
        assert_eq!(report.evolution.unwrap().cycle, 1);
        assert_eq!(report.evolution.unwrap().trend, None);
        assert_eq!(
            report.recommendations.last().map(String::as_str),
            Some("Close to A-grade - refine weak dimensions")
        );
        assert_eq!(report.policy.as_ref().unwrap().mode, RuntimeMode::Balanced);
        assert!(report.performance.efficiency.is_some());

        let cycle = &pipeline.evolution().history()[0];
        assert_eq!(cycle.metrics["run_id"], json!(report.run_id.to_string()));
        assert_eq!(cycle.recommendations, report.recommendations);
        assert!(storage.raw("code").await.is_some());
    }

    #[tokio::test]
    async fn test_second_run_reports_trend() {
        let storage = Arc::new(MemoryHistoryStorage::new());
        let mut pipeline = pipeline_with(code_executor(), storage).await;

        pipeline.execute("Add a helper", ContextMap::new()).await;
        let report = pipeline.execute("Add another helper", ContextMap::new()).await;

        assert_eq!(report.evolution.unwrap().cycle, 2);
        assert_eq!(report.evolution.unwrap().trend, Some(Trend::Stable));
        let learning = pipeline.evolution().history()[1].learning.clone();
        assert_eq!(learning.as_deref(), Some("Quality stable - consider new optimization strategies"));
    }

    #[tokio::test]
    async fn test_empty_task_fails_validation() {
        let storage = Arc::new(MemoryHistoryStorage::new());
        let mut pipeline = pipeline_with(code_executor(), storage.clone()).await;

        let report = pipeline.execute("   ", ContextMap::new()).await;

        assert!(!report.success);
        assert_eq!(report.status, RunStatus::ValidationFailed);
        assert_eq!(report.validation.as_ref().unwrap().errors, vec!["Empty task"]);
        assert!(report.quality.is_none());
        assert_eq!(storage.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_executor_fault_records_nothing() {
        let storage = Arc::new(MemoryHistoryStorage::new());
        let mut pipeline = pipeline_with(Arc::new(FailingExecutor), storage.clone()).await;

        let report = pipeline.execute("Create Redis cache layer", ContextMap::new()).await;

        assert_eq!(report.status, RunStatus::Faulted);
        assert_eq!(report.failed_phase, Some(Phase::Execute));
        assert!(report.error.as_deref().unwrap().contains("executor unavailable"));
        assert!(report.quality.is_none());
        assert!(report.performance.duration_ms >= 0.0);
        assert!(pipeline.evolution().history().is_empty());
        assert_eq!(storage.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_executor_panic_becomes_fault() {
        let storage = Arc::new(MemoryHistoryStorage::new());
        let mut pipeline = pipeline_with(Arc::new(PanickingExecutor), storage.clone()).await;

        let report = pipeline.execute("Create Redis cache layer", ContextMap::new()).await;

        assert_eq!(report.status, RunStatus::Faulted);
        assert!(!report.success);
        assert_eq!(report.failed_phase, Some(Phase::Execute));
        assert!(report.error.as_deref().unwrap().contains("backend crashed"));
        assert!(pipeline.evolution().history().is_empty());
        assert_eq!(storage.save_count().await, 0);

        let mut pipeline = pipeline_with(code_executor(), storage).await;
        let report = pipeline.execute("Create Redis cache layer", ContextMap::new()).await;
        assert!(report.success);
    }

    #[tokio::test]
    async fn test_missing_or_invalid_signals_fault_in_measurement() {
        let storage = Arc::new(MemoryHistoryStorage::new());

        let empty = Arc::new(StaticExecutor::new(DimensionScores::new()));
        let mut pipeline = pipeline_with(empty, storage.clone()).await;
        let report = pipeline.execute("Add a helper", ContextMap::new()).await;
        assert_eq!(report.failed_phase, Some(Phase::MeasureQuality));

        let mut signals = placeholder_signals("code").unwrap_or_default();
        signals.insert("security".to_string(), 1.5);
        let mut pipeline = pipeline_with(Arc::new(StaticExecutor::new(signals)), storage.clone()).await;
        let report = pipeline.execute("Add a helper", ContextMap::new()).await;
        assert_eq!(report.failed_phase, Some(Phase::MeasureQuality));
        assert!(report.quality.is_none());

        assert_eq!(storage.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_optimizer_packs_context_at_policy_tier() {
        let loader = StaticReferenceLoader::new("# Code skill")
            .with_reference("redis.md", "redis cache layer design")
            .with_reference("birds.md", "unrelated text about birds");
        let storage = Arc::new(MemoryHistoryStorage::new());
        let mut pipeline = pipeline_with(code_executor(), storage)
            .await
            .with_optimizer(ContextOptimizer::new(Arc::new(loader)));

        let report = pipeline.execute("Create Redis cache layer", ContextMap::new()).await;

        let context = report.context.unwrap();
        assert_eq!(context.mode, RuntimeMode::Balanced);
        assert_eq!(context.included_references[0], "redis.md");
        assert_eq!(report.result.unwrap()["references"][0], "redis.md");
    }

    #[tokio::test]
    async fn test_out_of_range_complexity_warns_but_runs() {
        let storage = Arc::new(MemoryHistoryStorage::new());
        let executor = Arc::new(StaticExecutor::new(placeholder_signals("debug").unwrap_or_default()));
        let mut pipeline = MetaCognitivePipeline::open(
            Arc::new(DebugDomain::new(executor)),
            storage,
            EvolutionConfig::default(),
        )
        .await;

        let mut context = ContextMap::new();
        context.insert("complexity".to_string(), json!(1.5));
        let report = pipeline.execute("Crash on startup", context).await;

        assert!(report.success);
        assert_eq!(report.policy.unwrap().mode, RuntimeMode::Strict);
        assert_eq!(report.domain, "debug");
        assert_eq!(report.quality.unwrap().grade, Grade::B);
    }
}
