//! Governance threshold checks.
//!
//! Drift must stay below its ceiling; omega and compliance must reach their
//! floors. IRF and principle coverage thresholds are carried for reporting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Governance thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceThresholds {
    /// Drift score must be strictly below this
    pub drift_score: f64,
    /// Omega score floor
    pub omega_score: f64,
    /// IRF floor for reasoning-heavy work
    pub irf_score: f64,
    /// Compliance floor
    pub compliance: f64,
    /// Principle coverage floor
    pub principle_coverage: f64,
}

impl Default for GovernanceThresholds {
    fn default() -> Self {
        Self {
            drift_score: 0.3,
            omega_score: 0.90,
            irf_score: 0.78,
            compliance: 0.80,
            principle_coverage: 0.80,
        }
    }
}

/// Outcome of a governance check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    /// No violations found
    pub compliant: bool,
    /// Human readable violations
    pub violations: Vec<String>,
}

impl GovernanceThresholds {
    /// Check metrics against the thresholds.
    ///
    /// A missing drift score counts as 1.0; missing omega or compliance
    /// scores count as 0.0.
    pub fn validate(&self, metrics: &BTreeMap<String, f64>) -> ComplianceReport {
        let mut violations = Vec::new();

        let drift = metrics.get("drift_score").copied().unwrap_or(1.0);
        if drift >= self.drift_score {
            violations.push(format!("Drift Score {:.3} >= {} (VIOLATION)", drift, self.drift_score));
        }

        let omega = metrics.get("omega_score").copied().unwrap_or(0.0);
        if omega < self.omega_score {
            violations.push(format!("Omega Score {:.3} < {} (VIOLATION)", omega, self.omega_score));
        }

        let compliance = metrics.get("compliance").copied().unwrap_or(0.0);
        if compliance < self.compliance {
            violations.push(format!("Compliance {:.3} < {} (VIOLATION)", compliance, self.compliance));
        }

        ComplianceReport {
            compliant: violations.is_empty(),
            violations,
        }
    }
}
