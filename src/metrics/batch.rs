//! Batch evaluation of many residual pairs.
//!
//! Pairs are packed contiguously: pair `i` reads `lhs[i * n..(i + 1) * n]` and
//! `rhs[i * n..(i + 1) * n]` with `n = metric.input_size()`. Results are packed the same
//! way. With the `parallel` feature, pairs are evaluated on the rayon thread pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::metrics::{Metric, MetricError, MetricResult};

/// Which Jacobians a batch evaluation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JacobianRequest {
    /// Residuals only
    #[default]
    None,
    /// Residuals and ∂r/∂lhs
    Lhs,
    /// Residuals and ∂r/∂rhs
    Rhs,
    /// Residuals and both Jacobians
    Both,
}

impl JacobianRequest {
    /// Whether ∂r/∂lhs is requested.
    pub fn lhs(self) -> bool {
        matches!(self, JacobianRequest::Lhs | JacobianRequest::Both)
    }

    /// Whether ∂r/∂rhs is requested.
    pub fn rhs(self) -> bool {
        matches!(self, JacobianRequest::Rhs | JacobianRequest::Both)
    }
}

/// Packed results of [`evaluate_batch`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchEvaluation {
    /// Residuals, `output_size` scalars per pair
    pub residuals: Vec<f64>,
    /// ∂r/∂lhs per pair, column-major, if requested
    pub jacobians_lhs: Option<Vec<f64>>,
    /// ∂r/∂rhs per pair, column-major, if requested
    pub jacobians_rhs: Option<Vec<f64>>,
    output_size: usize,
    jacobian_size: usize,
}

impl BatchEvaluation {
    /// Number of evaluated pairs.
    pub fn len(&self) -> usize {
        if self.output_size == 0 {
            0
        } else {
            self.residuals.len() / self.output_size
        }
    }

    /// Whether no pairs were evaluated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Residual of pair `index`.
    pub fn residual(&self, index: usize) -> Option<&[f64]> {
        chunk(&self.residuals, self.output_size, index)
    }

    /// ∂r/∂lhs of pair `index`.
    pub fn jacobian_lhs(&self, index: usize) -> Option<&[f64]> {
        chunk(self.jacobians_lhs.as_deref()?, self.jacobian_size, index)
    }

    /// ∂r/∂rhs of pair `index`.
    pub fn jacobian_rhs(&self, index: usize) -> Option<&[f64]> {
        chunk(self.jacobians_rhs.as_deref()?, self.jacobian_size, index)
    }
}

fn chunk(data: &[f64], size: usize, index: usize) -> Option<&[f64]> {
    data.get(index * size..(index + 1) * size)
}

/// One pair's results before packing.
struct PairEvaluation {
    residual: Vec<f64>,
    jacobian_lhs: Option<Vec<f64>>,
    jacobian_rhs: Option<Vec<f64>>,
}

fn evaluate_pair<M: Metric + ?Sized>(
    metric: &M,
    lhs: &[f64],
    rhs: &[f64],
    request: JacobianRequest,
) -> MetricResult<PairEvaluation> {
    let mut residual = vec![0.0; metric.output_size()];
    let mut jacobian_lhs = request.lhs().then(|| vec![0.0; metric.jacobian_size()]);
    let mut jacobian_rhs = request.rhs().then(|| vec![0.0; metric.jacobian_size()]);

    metric.evaluate(
        lhs,
        rhs,
        &mut residual,
        jacobian_lhs.as_deref_mut(),
        jacobian_rhs.as_deref_mut(),
    )?;

    Ok(PairEvaluation {
        residual,
        jacobian_lhs,
        jacobian_rhs,
    })
}

/// Evaluate `metric` on every packed pair of `lhs` and `rhs`.
///
/// # Errors
/// - [`MetricError::BatchSizeMismatch`] if the sides hold different numbers of scalars
/// - [`MetricError::InvalidInputSize`] if a side is not a whole number of parameter blocks
pub fn evaluate_batch<M: Metric + ?Sized>(
    metric: &M,
    lhs: &[f64],
    rhs: &[f64],
    request: JacobianRequest,
) -> MetricResult<BatchEvaluation> {
    if lhs.len() != rhs.len() {
        return Err(MetricError::BatchSizeMismatch {
            lhs: lhs.len(),
            rhs: rhs.len(),
        }
        .log());
    }

    let input_size = metric.input_size();
    if input_size == 0 || lhs.len() % input_size != 0 {
        return Err(MetricError::InvalidInputSize {
            expected: lhs.len().next_multiple_of(input_size.max(1)),
            actual: lhs.len(),
        }
        .log());
    }

    let count = lhs.len() / input_size;
    debug!("Evaluating {} metric pairs ({:?})", count, request);

    #[cfg(feature = "parallel")]
    let pairs: MetricResult<Vec<PairEvaluation>> = lhs
        .par_chunks(input_size)
        .zip(rhs.par_chunks(input_size))
        .map(|(l, r)| evaluate_pair(metric, l, r, request))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let pairs: MetricResult<Vec<PairEvaluation>> = lhs
        .chunks(input_size)
        .zip(rhs.chunks(input_size))
        .map(|(l, r)| evaluate_pair(metric, l, r, request))
        .collect();

    let pairs = pairs?;

    let jacobian_size = metric.jacobian_size();
    let mut evaluation = BatchEvaluation {
        residuals: Vec::with_capacity(count * metric.output_size()),
        jacobians_lhs: request
            .lhs()
            .then(|| Vec::with_capacity(count * jacobian_size)),
        jacobians_rhs: request
            .rhs()
            .then(|| Vec::with_capacity(count * jacobian_size)),
        output_size: metric.output_size(),
        jacobian_size,
    };

    for pair in pairs {
        evaluation.residuals.extend(pair.residual);
        if let (Some(packed), Some(jacobian)) = (evaluation.jacobians_lhs.as_mut(), pair.jacobian_lhs)
        {
            packed.extend(jacobian);
        }
        if let (Some(packed), Some(jacobian)) = (evaluation.jacobians_rhs.as_mut(), pair.jacobian_rhs)
        {
            packed.extend(jacobian);
        }
    }

    Ok(evaluation)
}
