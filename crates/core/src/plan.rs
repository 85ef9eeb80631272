//! Execution plan model.

use serde::{Deserialize, Serialize};
use crate::policy::ResourceAllocation;

/// One step of an execution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based step index
    pub step: usize,

    /// Action name
    pub action: String,

    /// Advisory timeout in seconds; not enforced by the pipeline
    pub timeout: f64,
}

/// Detailed execution plan for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Ordered steps
    pub steps: Vec<PlanStep>,

    /// Total estimated duration in seconds
    pub estimated_duration: f64,

    /// Resources copied from the policy
    pub resource_requirements: ResourceAllocation,

    /// Validation checkpoint names
    pub validation_points: Vec<String>,

    /// Ordered remediation actions
    pub rollback_strategy: Vec<String>,
}

impl ExecutionPlan {
    /// Names of the planned actions, in order.
    pub fn actions(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.action.as_str()).collect()
    }
}
