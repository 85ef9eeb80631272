//! Tunable defaults shared across crates.
//!
//! Every value here is a behavioural default, not a derived constant; the
//! `sovereign-config` crate loads overrides from `sovereign.toml`.

use serde::{Deserialize, Serialize};
use crate::policy::RuntimeMode;

/// Hybrid reranker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    /// Weight of the lexical signal; the overlap signal gets `1 - alpha`
    pub alpha: f64,

    /// How many ranked references are offered to the packer
    pub top_k: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            top_k: 3,
        }
    }
}

/// Budget packer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Estimated tokens per character (~4 characters per token)
    pub tokens_per_char: f64,

    /// Separator placed between packed payloads
    pub separator: String,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            tokens_per_char: 0.25,
            separator: "\n\n".to_string(),
        }
    }
}

/// Context token budget per runtime tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeBudgets {
    /// Minimal tier: base payload only
    pub minimal: u32,
    /// Balanced tier: base plus ranked references
    pub balanced: u32,
    /// Strict tier: execution is delegated, nothing is loaded
    pub strict: u32,
}

impl ModeBudgets {
    /// Budget for a tier.
    pub fn for_mode(&self, mode: RuntimeMode) -> u32 {
        match mode {
            RuntimeMode::Minimal => self.minimal,
            RuntimeMode::Balanced => self.balanced,
            RuntimeMode::Strict => self.strict,
        }
    }
}

impl Default for ModeBudgets {
    fn default() -> Self {
        Self {
            minimal: 100,
            balanced: 400,
            strict: 0,
        }
    }
}

/// Evolution engine thresholds.
///
/// OLS over a handful of cycles is a heuristic; these values are kept for
/// behavioural parity and may be tuned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Trailing window for trend detection
    pub trend_window: usize,

    /// Slope magnitude separating a trend from stability
    pub slope_threshold: f64,

    /// Trailing window for convergence prediction
    pub convergence_window: usize,

    /// History length required before predicting convergence
    pub min_cycles_for_prediction: usize,

    /// Residual variance above which confidence is penalised
    pub variance_threshold: f64,

    /// Multiplier applied to confidence on high variance
    pub variance_penalty: f64,

    /// History length at which confidence saturates
    pub confidence_horizon: f64,

    /// Default convergence target (S-grade)
    pub target_score: f64,

    /// Score below which a dimension is considered weak
    pub weak_threshold: f64,

    /// Weight above which a weak dimension earns a recommendation
    pub high_weight: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            trend_window: 5,
            slope_threshold: 0.01,
            convergence_window: 5,
            min_cycles_for_prediction: 3,
            variance_threshold: 0.01,
            variance_penalty: 0.7,
            confidence_horizon: 10.0,
            target_score: 0.95,
            weak_threshold: 0.90,
            high_weight: 0.15,
        }
    }
}
