//! The disaggregation pipelines: spatial join, weight computation,
//! normalization, and value assignment, in that order.

mod density;
mod distance;
mod join;
mod normalize;
mod output;

pub use density::{disaggregate_by_density, DensityParams};
pub use distance::{disaggregate_by_distance, DistanceParams};
pub use output::write_output;

use anyhow::{ensure, Result};
use polars::frame::DataFrame;

/// One derived record per target zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRecord {
    /// Row in the target layer.
    pub target: u32,
    /// Row of the parent zone in the source layer.
    pub source: u32,
    /// Ancillary ratio: count share (density) or distance share (distance).
    pub ratio: f64,
    /// Weight of the target zone within its source zone.
    pub weight: f64,
    /// Disaggregated value.
    pub value: f64,
}

/// Per-source normalization constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceAggregate {
    /// Sum of child weights, after any fallback substitution.
    pub sum_weight: f64,
    /// Scaling constant: known quantity divided by `sum_weight`.
    pub scale: f64,
    /// True when an all-zero weight group was replaced by uniform weights.
    pub uniform_fallback: bool,
}

/// Result of a pipeline run: the augmented target table plus the derived
/// per-target and per-source entities it was assembled from.
#[derive(Debug)]
pub struct Disaggregation {
    pub table: DataFrame,
    pub records: Vec<TargetRecord>,
    pub aggregates: Vec<SourceAggregate>,
}

pub(crate) fn check_exponent(q: f64) -> Result<()> {
    ensure!(q.is_finite() && q > 0.0, "exponent q must be a positive finite number, got {q}");
    Ok(())
}
