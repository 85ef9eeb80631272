//! Evolution layer - longitudinal quality tracking per domain.

#![warn(missing_docs, unused_crate_dependencies)]

mod regression;
mod engine;
mod summary;

pub use regression::{ols_slope, residual_variance};
pub use engine::{EvolutionEngine, NewCycle, ConvergencePrediction, EvolutionError, Result};
pub use summary::EvolutionSummary;
