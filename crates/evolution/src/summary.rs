//! Evolution summary statistics.

use serde::Serialize;
use sovereign_core::{Grade, Trend};

use crate::engine::{ConvergencePrediction, EvolutionEngine};

/// Summary of a domain's evolution history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionSummary {
    /// Domain name
    pub domain: String,
    /// Number of recorded cycles
    pub total_cycles: usize,
    /// Grade of the latest cycle
    pub current_grade: Option<Grade>,
    /// Score of the latest cycle
    pub current_score: Option<f64>,
    /// Trend over the configured window
    pub trend: Trend,
    /// Convergence to the target score, when an estimate exists
    pub convergence: Option<ConvergencePrediction>,
    /// Cycle with the highest score (earliest on ties)
    pub best_cycle: Option<u32>,
    /// Highest score
    pub best_score: Option<f64>,
}

impl EvolutionSummary {
    pub(crate) fn from_engine(engine: &EvolutionEngine) -> Self {
        let history = engine.history();
        let current = history.last();

        let best = history.iter().fold(None, |best: Option<(u32, f64)>, c| match best {
            Some((_, score)) if score >= c.grade_score => best,
            _ => Some((c.cycle, c.grade_score)),
        });

        let prediction = engine.predict_convergence(engine.config().target_score);

        Self {
            domain: engine.domain().to_string(),
            total_cycles: history.len(),
            current_grade: current.map(|c| c.grade),
            current_score: current.map(|c| c.grade_score),
            trend: engine.trend(),
            convergence: prediction.cycles_needed.is_some().then_some(prediction),
            best_cycle: best.map(|(cycle, _)| cycle),
            best_score: best.map(|(_, score)| score),
        }
    }
}
