//! Execution policy - runtime tier and resources derived from an intent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Adaptive runtime tiers, ordered by validation depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuntimeMode {
    /// complexity < 0.3
    Minimal,
    /// 0.3 <= complexity <= 0.7
    Balanced,
    /// complexity > 0.7
    Strict,
}

impl RuntimeMode {
    /// Upper bound (exclusive) of the minimal tier.
    pub const MINIMAL_BELOW: f64 = 0.3;
    /// Lower bound (exclusive) of the strict tier.
    pub const STRICT_ABOVE: f64 = 0.7;

    /// Select the tier for a complexity score.
    pub fn from_complexity(complexity: f64) -> Self {
        if complexity < Self::MINIMAL_BELOW {
            Self::Minimal
        } else if complexity > Self::STRICT_ABOVE {
            Self::Strict
        } else {
            Self::Balanced
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "MINIMAL",
            Self::Balanced => "BALANCED",
            Self::Strict => "STRICT",
        }
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a runtime mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown runtime mode: {0}")]
pub struct ParseModeError(pub String);

impl std::str::FromStr for RuntimeMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "balanced" => Ok(Self::Balanced),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Resources requested from the execution collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceAllocation {
    /// Delegate to the external CLI
    pub use_cli: bool,

    /// Request parallel execution (advisory)
    pub parallel: bool,

    /// Token budget for packed reference material
    pub context_budget_tokens: u32,
}

/// Execution policy resolved from an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Runtime tier
    pub mode: RuntimeMode,

    /// Complexity that produced the tier
    pub complexity: f64,

    /// Required checks, in order
    pub checks: Vec<String>,

    /// Resource allocation
    pub resource_allocation: ResourceAllocation,

    /// Quality dimension weights for the domain
    pub quality_weights: BTreeMap<String, f64>,

    /// Estimated duration in seconds
    pub estimated_duration: f64,
}

impl Policy {
    /// Whether a named check is required.
    pub fn requires(&self, check: &str) -> bool {
        self.checks.iter().any(|c| c == check)
    }
}
