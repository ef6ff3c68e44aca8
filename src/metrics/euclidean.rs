//! Vector-space distance.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::metrics::{Metric, MetricResult, validate_buffers};

/// Euclidean metric on Rⁿ.
///
/// # Mathematical Formulation
///
/// ```text
/// r = lhs - rhs
/// ```
///
/// The Jacobians are constant: `J_lhs = I`, `J_rhs = -I`.
///
/// # Example
///
/// ```
/// use apex_metrics::metrics::{EuclideanMetric, Metric};
///
/// let metric = EuclideanMetric::new(2);
/// let mut residual = [0.0; 2];
/// metric
///     .evaluate(&[1.5, 2.3], &[1.0, 2.0], &mut residual, None, None)
///     .unwrap();
///
/// assert!((residual[0] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EuclideanMetric {
    dim: usize,
}

impl EuclideanMetric {
    /// Create a metric on R^`dim`.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Dimension of the space.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Residual and Jacobians on nalgebra vectors.
    ///
    /// Returns `(lhs - rhs, I, -I)`; the Jacobians are `None` when not requested.
    pub fn linearize(
        &self,
        lhs: &DVector<f64>,
        rhs: &DVector<f64>,
        compute_jacobian: bool,
    ) -> (DVector<f64>, Option<(DMatrix<f64>, DMatrix<f64>)>) {
        let residual = lhs - rhs;
        let jacobians = compute_jacobian.then(|| {
            let identity = DMatrix::<f64>::identity(residual.nrows(), residual.nrows());
            (identity.clone(), -identity)
        });
        (residual, jacobians)
    }
}

/// Overwrite a column-major `dim × dim` buffer with `value · I`.
fn fill_scaled_identity(buffer: &mut [f64], dim: usize, value: f64) {
    buffer.fill(0.0);
    for i in 0..dim {
        buffer[i * dim + i] = value;
    }
}

impl Metric for EuclideanMetric {
    fn input_size(&self) -> usize {
        self.dim
    }

    fn output_size(&self) -> usize {
        self.dim
    }

    fn evaluate(
        &self,
        lhs: &[f64],
        rhs: &[f64],
        output: &mut [f64],
        jacobian_lhs: Option<&mut [f64]>,
        jacobian_rhs: Option<&mut [f64]>,
    ) -> MetricResult<()> {
        validate_buffers(
            self,
            lhs,
            rhs,
            output,
            jacobian_lhs.as_deref(),
            jacobian_rhs.as_deref(),
        )?;

        for ((out, l), r) in output.iter_mut().zip(lhs).zip(rhs) {
            *out = l - r;
        }
        if let Some(buffer) = jacobian_lhs {
            fill_scaled_identity(buffer, self.dim, 1.0);
        }
        if let Some(buffer) = jacobian_rhs {
            fill_scaled_identity(buffer, self.dim, -1.0);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricError;

    #[test]
    fn test_euclidean_residual_and_jacobians() {
        let metric = EuclideanMetric::new(3);
        assert_eq!(metric.dim(), 3);
        let mut output = [0.0; 3];
        let mut j_lhs = [5.0; 9];
        let mut j_rhs = [5.0; 9];
        metric
            .evaluate(
                &[1.0, 2.0, 3.0],
                &[0.5, 2.5, -1.0],
                &mut output,
                Some(&mut j_lhs[..]),
                Some(&mut j_rhs[..]),
            )
            .unwrap();

        assert_eq!(output, [0.5, -0.5, 4.0]);
        assert_eq!(j_lhs, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(j_rhs, [-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_euclidean_linearize_matches_evaluate() {
        let metric = EuclideanMetric::new(2);
        let lhs = DVector::from_vec(vec![1.5, 2.3]);
        let rhs = DVector::from_vec(vec![1.0, 2.0]);

        let (residual, jacobians) = metric.linearize(&lhs, &rhs, true);
        let (j_lhs, j_rhs) = jacobians.unwrap();

        let mut output = [0.0; 2];
        metric
            .evaluate(lhs.as_slice(), rhs.as_slice(), &mut output, None, None)
            .unwrap();

        assert_eq!(residual.as_slice(), &output);
        assert_eq!(j_lhs, DMatrix::identity(2, 2));
        assert_eq!(j_rhs, -DMatrix::<f64>::identity(2, 2));
        assert!(metric.linearize(&lhs, &rhs, false).1.is_none());
    }

    #[test]
    fn test_euclidean_size_mismatch() {
        let metric = EuclideanMetric::new(3);
        let mut output = [0.0; 3];
        assert_eq!(
            metric.evaluate(&[1.0, 2.0], &[1.0, 2.0, 3.0], &mut output, None, None),
            Err(MetricError::InvalidInputSize {
                expected: 3,
                actual: 2
            })
        );
    }
}
