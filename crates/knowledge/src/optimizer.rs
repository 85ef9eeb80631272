//! Mode-aware context optimizer.
//!
//! Minimal mode loads only the base payload, Balanced ranks and packs
//! references behind it, and Strict loads nothing and hands the task to the
//! CLI instead.

use serde::Serialize;
use sovereign_core::{ModeBudgets, PackerConfig, ParseModeError, RerankerConfig, RuntimeMode};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::loader::ReferenceLoader;
use crate::packer::BudgetPacker;
use crate::reranker::HybridReranker;
use crate::Result;

/// Content placeholder returned in Strict mode.
pub const DELEGATION_MARKER: &str = "[CLI DELEGATION MODE]";

/// How the runtime mode is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSelection {
    /// Derive from complexity
    #[default]
    Auto,
    /// Use the given mode
    Fixed(RuntimeMode),
}

impl ModeSelection {
    /// Resolve to a concrete mode.
    pub fn resolve(self, complexity: f64) -> RuntimeMode {
        match self {
            ModeSelection::Auto => RuntimeMode::from_complexity(complexity),
            ModeSelection::Fixed(mode) => mode,
        }
    }
}

impl FromStr for ModeSelection {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(ModeSelection::Auto)
        } else {
            s.parse().map(ModeSelection::Fixed)
        }
    }
}

/// Optimized context for a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedContext {
    /// Resolved mode
    pub mode: RuntimeMode,

    /// Content to hand to the executor
    pub packed_content: String,

    /// Included reference names, in ranking order
    pub included_references: Vec<String>,

    /// Estimated tokens of the packed content
    pub total_tokens: usize,

    /// Budget for the mode
    pub budget_tokens: usize,

    /// `100 * (1 - total / budget)`, absent for a zero budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_percent: Option<f64>,

    /// Command to run the task through the CLI (Strict only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_command: Option<String>,
}

/// Loader + reranker + packer.
#[derive(Clone)]
pub struct ContextOptimizer {
    loader: Arc<dyn ReferenceLoader>,
    reranker: HybridReranker,
    packer: BudgetPacker,
    budgets: ModeBudgets,
    top_k: usize,
}

impl ContextOptimizer {
    /// Create an optimizer with default settings.
    pub fn new(loader: Arc<dyn ReferenceLoader>) -> Self {
        let reranker = RerankerConfig::default();
        Self {
            loader,
            reranker: HybridReranker::from_config(&reranker),
            packer: BudgetPacker::default(),
            budgets: ModeBudgets::default(),
            top_k: reranker.top_k,
        }
    }

    /// Use the given reranker settings.
    pub fn with_reranker(mut self, config: &RerankerConfig) -> Self {
        self.reranker = HybridReranker::from_config(config);
        self.top_k = config.top_k;
        self
    }

    /// Use the given packer settings.
    pub fn with_packer(mut self, config: &PackerConfig) -> Self {
        self.packer = BudgetPacker::from_config(config);
        self
    }

    /// Use the given per-mode budgets.
    pub fn with_budgets(mut self, budgets: ModeBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    /// Select and pack reference material for a task.
    pub async fn optimize_context(
        &self,
        query: &str,
        complexity: f64,
        selection: ModeSelection,
    ) -> Result<OptimizedContext> {
        let mode = selection.resolve(complexity);
        let budget = self.budgets.for_mode(mode) as usize;
        debug!(%mode, budget, "Optimizing context");

        if mode == RuntimeMode::Strict {
            return Ok(OptimizedContext {
                mode,
                packed_content: DELEGATION_MARKER.to_string(),
                included_references: Vec::new(),
                total_tokens: 0,
                budget_tokens: budget,
                savings_percent: None,
                delegation_command: Some(format!("sovereign code {:?}", query)),
            });
        }

        let base = self.loader.load_base().await?;
        let references = match mode {
            RuntimeMode::Balanced => self.loader.load_references().await?,
            _ => Vec::new(),
        };

        let (packed_content, included_references, total_tokens) = if references.is_empty() {
            let tokens = self.packer.estimator().estimate(&base);
            (base, Vec::new(), tokens)
        } else {
            let ranked = self.reranker.rank_references(query, &references, self.top_k);
            let packed = self.packer.pack(&base, &ranked, budget);
            (packed.content, packed.included, packed.total_tokens)
        };

        let savings_percent =
            (budget > 0).then(|| 100.0 * (1.0 - total_tokens as f64 / budget as f64));

        Ok(OptimizedContext {
            mode,
            packed_content,
            included_references,
            total_tokens,
            budget_tokens: budget,
            savings_percent,
            delegation_command: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticReferenceLoader;

    fn optimizer() -> ContextOptimizer {
        let loader = StaticReferenceLoader::new("b".repeat(80))
            .with_reference("birds.md", "unrelated text about birds")
            .with_reference("redis.md", "redis cache layer design")
            .with_reference("huge.md", "redis ".repeat(400));
        ContextOptimizer::new(Arc::new(loader))
    }

    #[test]
    fn test_mode_selection_parse() {
        assert_eq!("auto".parse::<ModeSelection>().unwrap(), ModeSelection::Auto);
        assert_eq!(
            "strict".parse::<ModeSelection>().unwrap(),
            ModeSelection::Fixed(RuntimeMode::Strict)
        );
        assert!("turbo".parse::<ModeSelection>().is_err());
        assert_eq!(ModeSelection::Auto.resolve(0.5), RuntimeMode::Balanced);
    }

    #[tokio::test]
    async fn test_minimal_loads_base_only() {
        let context = optimizer()
            .optimize_context("redis cache", 0.1, ModeSelection::Auto)
            .await
            .unwrap();

        assert_eq!(context.mode, RuntimeMode::Minimal);
        assert_eq!(context.packed_content, "b".repeat(80));
        assert!(context.included_references.is_empty());
        assert_eq!(context.total_tokens, 20);
        assert_eq!(context.budget_tokens, 100);
        assert!((context.savings_percent.unwrap() - 80.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_balanced_ranks_and_packs() {
        let context = optimizer()
            .optimize_context("redis cache layer", 0.5, ModeSelection::Auto)
            .await
            .unwrap();

        assert_eq!(context.mode, RuntimeMode::Balanced);
        // huge.md ranks but does not fit; birds.md scores zero but fits
        assert_eq!(context.included_references, vec!["redis.md", "birds.md"]);
        assert!(context.total_tokens <= 400);
        assert!(context.packed_content.contains("redis cache layer design"));
        assert!(context.delegation_command.is_none());
    }

    #[tokio::test]
    async fn test_strict_delegates() {
        let context = optimizer()
            .optimize_context("rewrite auth", 0.2, ModeSelection::Fixed(RuntimeMode::Strict))
            .await
            .unwrap();

        assert_eq!(context.mode, RuntimeMode::Strict);
        assert_eq!(context.packed_content, DELEGATION_MARKER);
        assert_eq!(context.total_tokens, 0);
        assert_eq!(context.budget_tokens, 0);
        assert_eq!(context.savings_percent, None);
        assert_eq!(context.delegation_command.as_deref(), Some("sovereign code \"rewrite auth\""));
    }
}
