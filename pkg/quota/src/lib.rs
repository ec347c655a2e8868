//! Quota accounting for shoots: what a shoot consumes, which quotas govern
//! it, and whether a create or update still fits.

pub mod allocation;
pub mod error;
pub mod evaluator;
pub mod references;
pub mod resources;
pub mod workers;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::QuotaError;
pub use evaluator::{Decision, DenyReasons, ExceededMetric, LifetimeViolation, QuotaEvaluator};
