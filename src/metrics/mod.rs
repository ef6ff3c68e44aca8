//! Distance metrics for optimization residuals.
//!
//! A metric measures the difference between two points of the same space and returns it
//! as a residual vector, together with the Jacobians of that residual with respect to
//! each input. Pose-graph and calibration optimizers linearize pose-difference
//! constraints with these residuals.
//!
//! ```text
//! r = d(lhs, rhs)
//! J_lhs = ∂r/∂lhs,  J_rhs = ∂r/∂rhs
//! ```
//!
//! # Metric Types
//!
//! - [`SE3Metric`]: geodesic distance `Log(lhs ∘ rhs⁻¹)` between two SE(3) poses, with
//!   Jacobians under any [`JacobianConvention`](crate::manifold::JacobianConvention)
//! - [`EuclideanMetric`]: plain vector difference `lhs - rhs`
//!
//! # Raw buffers
//!
//! The [`Metric`] trait works on flat `f64` slices so an optimizer can drive every
//! metric through one interface:
//! - inputs hold `input_size()` scalars each (the parameter block)
//! - the output holds `output_size()` scalars
//! - each Jacobian holds `output_size() * tangent_size()` scalars in column-major order
//!
//! Slice lengths are checked on every call; a mismatch is reported as a [`MetricError`]
//! and logged.

use thiserror::Error;
use tracing::error;

use crate::manifold::ManifoldError;

pub mod batch;
pub mod euclidean;
pub mod manifold;

pub use batch::{BatchEvaluation, JacobianRequest, evaluate_batch};
pub use euclidean::EuclideanMetric;
pub use manifold::SE3Metric;

/// Metric-specific error types for apex-metrics
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// Input parameter block has the wrong length
    #[error("Invalid input size: expected {expected}, got {actual}")]
    InvalidInputSize { expected: usize, actual: usize },

    /// Residual buffer has the wrong length
    #[error("Invalid output size: expected {expected}, got {actual}")]
    InvalidOutputSize { expected: usize, actual: usize },

    /// Jacobian buffer has the wrong length
    #[error("Invalid Jacobian size: expected {expected}, got {actual}")]
    InvalidJacobianSize { expected: usize, actual: usize },

    /// Batch sides hold a different number of scalars
    #[error("Batch size mismatch: lhs has {lhs} values, rhs has {rhs}")]
    BatchSizeMismatch { lhs: usize, rhs: usize },

    /// Input is not a valid manifold element
    #[error("Invalid manifold input")]
    Manifold(#[from] ManifoldError),
}

impl MetricError {
    /// Log the error with tracing::error and return self for chaining
    ///
    /// # Example
    /// ```ignore
    /// check_size(buffer)
    ///     .map_err(|e| MetricError::from(e).log())?;
    /// ```
    #[must_use]
    pub fn log(self) -> Self {
        error!("{}", self);
        self
    }
}

/// Result type for metric operations
pub type MetricResult<T> = Result<T, MetricError>;

/// Trait for distance metrics evaluated on raw parameter buffers.
///
/// # Thread Safety
///
/// Metrics must be `Send + Sync` so residual blocks can be evaluated in parallel.
///
/// # Example
///
/// ```
/// use apex_metrics::metrics::{Metric, SE3Metric};
///
/// let metric = SE3Metric::default();
/// let identity = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
/// let shifted = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
///
/// let mut residual = [0.0; 6];
/// let mut jacobian_lhs = [0.0; 36];
/// metric
///     .evaluate(&identity, &shifted, &mut residual, Some(&mut jacobian_lhs[..]), None)
///     .unwrap();
///
/// assert!((residual[0] + 1.0).abs() < 1e-12);
/// ```
pub trait Metric: Send + Sync {
    /// Number of scalars in one input parameter block.
    fn input_size(&self) -> usize;

    /// Number of scalars in the residual.
    fn output_size(&self) -> usize;

    /// Dimension of the perturbation each Jacobian is taken against.
    fn tangent_size(&self) -> usize {
        self.input_size()
    }

    /// Number of scalars in one Jacobian buffer.
    fn jacobian_size(&self) -> usize {
        self.output_size() * self.tangent_size()
    }

    /// Compute the residual between `lhs` and `rhs` and any requested Jacobians.
    ///
    /// # Arguments
    /// * `lhs` - Left parameter block, `input_size()` scalars
    /// * `rhs` - Right parameter block, `input_size()` scalars
    /// * `output` - Residual, `output_size()` scalars
    /// * `jacobian_lhs` - Optional ∂r/∂lhs, `jacobian_size()` scalars, column-major
    /// * `jacobian_rhs` - Optional ∂r/∂rhs, `jacobian_size()` scalars, column-major
    fn evaluate(
        &self,
        lhs: &[f64],
        rhs: &[f64],
        output: &mut [f64],
        jacobian_lhs: Option<&mut [f64]>,
        jacobian_rhs: Option<&mut [f64]>,
    ) -> MetricResult<()>;
}

/// Check every buffer of one evaluation against the sizes of `metric`.
pub(crate) fn validate_buffers<M: Metric + ?Sized>(
    metric: &M,
    lhs: &[f64],
    rhs: &[f64],
    output: &[f64],
    jacobian_lhs: Option<&[f64]>,
    jacobian_rhs: Option<&[f64]>,
) -> MetricResult<()> {
    let input_size = metric.input_size();
    for side in [lhs, rhs] {
        if side.len() != input_size {
            return Err(MetricError::InvalidInputSize {
                expected: input_size,
                actual: side.len(),
            }
            .log());
        }
    }

    if output.len() != metric.output_size() {
        return Err(MetricError::InvalidOutputSize {
            expected: metric.output_size(),
            actual: output.len(),
        }
        .log());
    }

    let jacobian_size = metric.jacobian_size();
    for jacobian in [jacobian_lhs, jacobian_rhs].into_iter().flatten() {
        if jacobian.len() != jacobian_size {
            return Err(MetricError::InvalidJacobianSize {
                expected: jacobian_size,
                actual: jacobian.len(),
            }
            .log());
        }
    }

    Ok(())
}

/// Closed set of metrics, dispatched without a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Euclidean(EuclideanMetric),
    SE3(SE3Metric),
}

impl From<EuclideanMetric> for MetricKind {
    fn from(metric: EuclideanMetric) -> Self {
        MetricKind::Euclidean(metric)
    }
}

impl From<SE3Metric> for MetricKind {
    fn from(metric: SE3Metric) -> Self {
        MetricKind::SE3(metric)
    }
}

impl Metric for MetricKind {
    fn input_size(&self) -> usize {
        match self {
            MetricKind::Euclidean(metric) => metric.input_size(),
            MetricKind::SE3(metric) => Metric::input_size(metric),
        }
    }

    fn output_size(&self) -> usize {
        match self {
            MetricKind::Euclidean(metric) => metric.output_size(),
            MetricKind::SE3(metric) => Metric::output_size(metric),
        }
    }

    fn tangent_size(&self) -> usize {
        match self {
            MetricKind::Euclidean(metric) => metric.tangent_size(),
            MetricKind::SE3(metric) => metric.tangent_size(),
        }
    }

    fn evaluate(
        &self,
        lhs: &[f64],
        rhs: &[f64],
        output: &mut [f64],
        jacobian_lhs: Option<&mut [f64]>,
        jacobian_rhs: Option<&mut [f64]>,
    ) -> MetricResult<()> {
        match self {
            MetricKind::Euclidean(metric) => {
                metric.evaluate(lhs, rhs, output, jacobian_lhs, jacobian_rhs)
            }
            MetricKind::SE3(metric) => metric.evaluate(lhs, rhs, output, jacobian_lhs, jacobian_rhs),
        }
    }
}
