//! Plan generation.

use sovereign_core::{ExecutionPlan, PlanStep, Policy};

/// Build the standard plan for a policy.
pub fn generate_plan(policy: &Policy) -> ExecutionPlan {
    let mut actions = vec![
        ("validate_input", 1.0),
        ("prepare_resources", 2.0),
        ("execute_primary", policy.estimated_duration * 0.8),
        ("validate_output", 2.0),
    ];
    if policy.requires("testing") {
        actions.push(("run_tests", 10.0));
    }

    ExecutionPlan {
        steps: actions
            .into_iter()
            .enumerate()
            .map(|(i, (action, timeout))| PlanStep {
                step: i + 1,
                action: action.to_string(),
                timeout,
            })
            .collect(),
        estimated_duration: policy.estimated_duration,
        resource_requirements: policy.resource_allocation,
        validation_points: vec!["input_validated".to_string(), "output_validated".to_string()],
        rollback_strategy: vec!["restore_state".to_string(), "cleanup_resources".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyResolver;
    use sovereign_core::{DimensionWeights, Intent};

    fn plan_for(complexity: f64) -> ExecutionPlan {
        let intent = Intent::new("task", "code").with_complexity(complexity);
        generate_plan(&PolicyResolver::default().resolve(&intent, DimensionWeights::new()))
    }

    #[test]
    fn test_balanced_plan() {
        let plan = plan_for(0.5);
        assert_eq!(
            plan.actions(),
            vec!["validate_input", "prepare_resources", "execute_primary", "validate_output"]
        );
        assert_eq!(plan.steps[2].timeout, 16.0);
        assert_eq!(plan.estimated_duration, 20.0);
        assert_eq!(plan.validation_points, vec!["input_validated", "output_validated"]);
        assert_eq!(plan.rollback_strategy, vec!["restore_state", "cleanup_resources"]);
    }

    #[test]
    fn test_strict_plan_runs_tests() {
        let plan = plan_for(0.9);
        assert_eq!(plan.steps.len(), 5);
        assert_eq!(plan.steps[4].action, "run_tests");
        assert_eq!(plan.steps[4].step, 5);
        assert_eq!(plan.steps[4].timeout, 10.0);
        assert!(plan.resource_requirements.use_cli);
    }
}
