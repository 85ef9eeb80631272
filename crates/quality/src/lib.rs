//! Quality measurement.
//!
//! Weighted multi-dimensional quality tensors, per-domain dimension profiles,
//! and governance threshold checks.

#![warn(missing_docs)]

pub mod tensor;
pub mod profile;
pub mod registry;
pub mod governance;

pub use tensor::{QualityTensor, Assessment, TensorReport, QualityError, Result, WEIGHT_TOLERANCE};
pub use profile::{DomainProfile, DimensionSpec};
pub use registry::DimensionRegistry;
pub use governance::{GovernanceThresholds, ComplianceReport};
