//! Validation and policy resolution.

use sovereign_core::{DimensionWeights, Intent, ModeBudgets, Policy, ResourceAllocation, RuntimeMode, ValidationOutcome};

/// Check that an intent is runnable.
///
/// An empty task fails; complexity outside [0, 1] only warns.
pub fn validate_intent(intent: &Intent) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::valid();

    if !intent.has_task() {
        outcome.reject("Empty task");
    }

    if !(0.0..=1.0).contains(&intent.complexity) {
        outcome.warn(format!("Complexity out of range: {}", intent.complexity));
    }

    outcome
}

/// Maps complexity to a runtime tier.
#[derive(Debug, Clone, Default)]
pub struct PolicyResolver {
    budgets: ModeBudgets,
}

impl PolicyResolver {
    /// Create a resolver with per-tier packing budgets.
    pub fn new(budgets: ModeBudgets) -> Self {
        Self { budgets }
    }

    /// Resolve the policy for an intent.
    pub fn resolve(&self, intent: &Intent, weights: DimensionWeights) -> Policy {
        let mode = RuntimeMode::from_complexity(intent.complexity);

        let (checks, estimated_duration): (&[&str], f64) = match mode {
            RuntimeMode::Minimal => (&["basic_validation"], 5.0),
            RuntimeMode::Balanced => (&["validation", "basic_testing"], 20.0),
            RuntimeMode::Strict => (&["validation", "security", "performance", "testing"], 60.0),
        };

        let strict = mode == RuntimeMode::Strict;

        Policy {
            mode,
            complexity: intent.complexity,
            checks: checks.iter().map(|c| c.to_string()).collect(),
            resource_allocation: ResourceAllocation {
                use_cli: strict,
                parallel: strict,
                context_budget_tokens: self.budgets.for_mode(mode),
            },
            quality_weights: weights,
            estimated_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(complexity: f64) -> Intent {
        Intent::new("task", "code").with_complexity(complexity)
    }

    #[test]
    fn test_tiers() {
        let resolver = PolicyResolver::default();

        let minimal = resolver.resolve(&intent(0.1), DimensionWeights::new());
        assert_eq!(minimal.mode, RuntimeMode::Minimal);
        assert_eq!(minimal.checks, vec!["basic_validation"]);
        assert_eq!(minimal.estimated_duration, 5.0);
        assert_eq!(minimal.resource_allocation.context_budget_tokens, 100);
        assert!(!minimal.resource_allocation.parallel);

        let balanced = resolver.resolve(&intent(0.5), DimensionWeights::new());
        assert_eq!(balanced.mode, RuntimeMode::Balanced);
        assert_eq!(balanced.checks, vec!["validation", "basic_testing"]);
        assert_eq!(balanced.resource_allocation.context_budget_tokens, 400);

        let strict = resolver.resolve(&intent(0.9), DimensionWeights::new());
        assert_eq!(strict.mode, RuntimeMode::Strict);
        assert!(strict.requires("testing"));
        assert_eq!(strict.estimated_duration, 60.0);
        assert!(strict.resource_allocation.use_cli && strict.resource_allocation.parallel);
        assert_eq!(strict.resource_allocation.context_budget_tokens, 0);
    }

    #[test]
    fn test_validation() {
        assert!(validate_intent(&intent(0.5)).valid);

        let empty = validate_intent(&Intent::new("   ", "code"));
        assert!(!empty.valid);
        assert_eq!(empty.confidence, 0.0);
        assert_eq!(empty.errors, vec!["Empty task"]);

        let out_of_range = validate_intent(&intent(1.3));
        assert!(out_of_range.valid);
        assert_eq!(out_of_range.confidence, 0.95);
        assert_eq!(out_of_range.warnings.len(), 1);
    }
}
