//! Execution layer - the eight-phase orchestration pipeline.
//!
//! ```text
//! AnalyzeIntent → Validate → ResolvePolicy → GeneratePlan → Execute
//!   → MeasureQuality → TrackEvolution → Explain
//! ```

#![warn(missing_docs)]

pub mod executor;
pub mod domain;
pub mod domains;
pub mod policy;
pub mod plan;
pub mod report;
pub mod pipeline;

pub use executor::{TaskExecutor, TaskOutcome, StaticExecutor, placeholder_signals};
pub use domain::DomainEngine;
pub use domains::{CodeDomain, DebugDomain, RefactorDomain, domain_engine};
pub use policy::{PolicyResolver, validate_intent};
pub use plan::generate_plan;
pub use report::{ExecutionReport, Phase, RunStatus, QualitySummary, EvolutionStatus, Performance, ContextSummary};
pub use pipeline::{MetaCognitivePipeline, PipelineError};
