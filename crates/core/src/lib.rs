//! Sovereign core data models.
//!
//! This crate defines the data structures shared by the context optimizer,
//! the quality tensor, the evolution engine and the orchestration pipeline.

#![warn(missing_docs)]

// Identities
mod id;

// Pipeline inputs and derived artifacts
mod intent;
mod policy;
mod plan;

// Quality and evolution records
mod grade;
mod cycle;

// Tunable defaults
pub mod config;

// Re-exports
pub use id::RunId;

pub use intent::{Intent, ValidationOutcome, ContextMap};
pub use policy::{Policy, RuntimeMode, ResourceAllocation, ParseModeError};
pub use plan::{ExecutionPlan, PlanStep};

pub use grade::{Grade, ParseGradeError};
pub use cycle::{EvolutionCycle, Trend, DimensionScores, DimensionWeights};

pub use config::{RerankerConfig, PackerConfig, ModeBudgets, EvolutionConfig};

/// Current wall-clock time as fractional unix seconds.
///
/// Cycle records persist timestamps in this form.
pub fn unix_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp_micros() as f64 / 1_000_000.0
}
