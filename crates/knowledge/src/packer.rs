//! Greedy token-budget packer.

use serde::Serialize;
use sovereign_core::PackerConfig;

use crate::reranker::RankedReference;

/// Character-based token estimate: `floor(chars * tokens_per_char)`.
///
/// An approximation; it is applied identically to base and optional payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenEstimator {
    tokens_per_char: f64,
}

impl TokenEstimator {
    /// Create an estimator.
    pub fn new(tokens_per_char: f64) -> Self {
        Self { tokens_per_char }
    }

    /// Estimate tokens for a text.
    pub fn estimate(&self, text: &str) -> usize {
        (text.chars().count() as f64 * self.tokens_per_char).floor() as usize
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(PackerConfig::default().tokens_per_char)
    }
}

/// Result of packing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackedContext {
    /// Base followed by included payloads, joined by the separator
    pub content: String,

    /// Included payload names, in ranking order
    pub included: Vec<String>,

    /// Estimated tokens of base plus included payloads
    pub total_tokens: usize,
}

/// One-pass greedy packer.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPacker {
    estimator: TokenEstimator,
    separator: String,
}

impl BudgetPacker {
    /// Create a packer from configuration.
    pub fn from_config(config: &PackerConfig) -> Self {
        Self {
            estimator: TokenEstimator::new(config.tokens_per_char),
            separator: config.separator.clone(),
        }
    }

    /// Token estimator in use.
    pub fn estimator(&self) -> TokenEstimator {
        self.estimator
    }

    /// Pack the base and as many ranked payloads as fit in `budget`.
    ///
    /// The base is always included. If it alone meets or exceeds the budget,
    /// nothing else is added. Otherwise each candidate is taken if it still
    /// fits; skipped candidates are not revisited.
    pub fn pack(&self, base: &str, ranked: &[RankedReference], budget: usize) -> PackedContext {
        let base_tokens = self.estimator.estimate(base);
        if base_tokens >= budget {
            tracing::debug!(base_tokens, budget, "Base payload fills budget");
            return PackedContext {
                content: base.to_string(),
                included: Vec::new(),
                total_tokens: base_tokens,
            };
        }

        let mut parts = vec![base];
        let mut included = Vec::new();
        let mut total = base_tokens;

        for candidate in ranked {
            let tokens = self.estimator.estimate(&candidate.content);
            if total + tokens <= budget {
                parts.push(&candidate.content);
                included.push(candidate.name.clone());
                total += tokens;
            }
        }

        PackedContext {
            content: parts.join(&self.separator),
            included,
            total_tokens: total,
        }
    }
}

impl Default for BudgetPacker {
    fn default() -> Self {
        Self::from_config(&PackerConfig::default())
    }
}
