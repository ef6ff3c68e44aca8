//! SE(3) manifold distance.
//!
//! The residual between two poses is their geodesic difference in the tangent space:
//!
//! ```text
//! r = Log(lhs ∘ rhs⁻¹) ∈ R⁶,  r = [ρ, θ]
//! ```
//!
//! Jacobians are assembled with the chain rule from the Jacobians of the three group
//! operations involved:
//!
//! ```text
//! J_lhs = J_r_c · J_c_lhs
//! J_rhs = J_r_c · J_c_irhs · J_irhs_rhs
//! ```
//!
//! with `c = lhs ∘ irhs` and `irhs = rhs⁻¹`. Every operation is evaluated under the same
//! [`JacobianConvention`], so the products are exact for all four conventions.

use nalgebra::Matrix6;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::manifold::{
    JacobianConvention, LieGroup, ManifoldError,
    se3::{SE3, SE3Tangent},
};
use crate::metrics::{Metric, MetricError, MetricResult, validate_buffers};

/// Geodesic distance between SE(3) poses with analytic Jacobians.
///
/// Holds only the Jacobian convention; evaluation is reentrant and allocation free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SE3Metric {
    convention: JacobianConvention,
}

impl SE3Metric {
    /// Size of one pose parameter block `[tx, ty, tz, qw, qx, qy, qz]`.
    pub const INPUT_SIZE: usize = <SE3 as LieGroup>::REP_SIZE;

    /// Size of the residual `[ρ, θ]`.
    pub const OUTPUT_SIZE: usize = <SE3 as LieGroup>::DOF;

    /// Number of scalars in a raw Jacobian buffer.
    pub const JACOBIAN_SIZE: usize = Self::OUTPUT_SIZE * Self::OUTPUT_SIZE;

    /// Create a metric bound to `convention`.
    pub fn new(convention: JacobianConvention) -> Self {
        debug!(
            "SE3 metric created (global: {}, coupled: {})",
            convention.global, convention.coupled
        );
        Self { convention }
    }

    /// Create a metric from the two convention flags.
    pub fn with_flags(global: bool, coupled: bool) -> Self {
        Self::new(JacobianConvention::new(global, coupled))
    }

    /// The convention used by the instance-bound entry points.
    pub fn convention(&self) -> JacobianConvention {
        self.convention
    }

    /// Number of scalars per input pose.
    pub const fn input_size() -> usize {
        Self::INPUT_SIZE
    }

    /// Number of scalars in the residual.
    pub const fn output_size() -> usize {
        Self::OUTPUT_SIZE
    }

    /// Residual `Log(lhs ∘ rhs⁻¹)` and the requested Jacobians.
    ///
    /// Each Jacobian is only computed when its output is `Some`. With neither requested,
    /// the group operations run without any Jacobian work.
    ///
    /// # Arguments
    /// * `lhs` - Left pose
    /// * `rhs` - Right pose
    /// * `jacobian_lhs` - Optional ∂r/∂lhs
    /// * `jacobian_rhs` - Optional ∂r/∂rhs
    /// * `convention` - Perturbation model of both inputs
    pub fn compute(
        lhs: &SE3,
        rhs: &SE3,
        jacobian_lhs: Option<&mut Matrix6<f64>>,
        jacobian_rhs: Option<&mut Matrix6<f64>>,
        convention: JacobianConvention,
    ) -> SE3Tangent {
        let want_lhs = jacobian_lhs.is_some();
        let want_rhs = jacobian_rhs.is_some();

        // Step 1: rhs.inverse()
        let mut j_irhs_rhs = Matrix6::zeros();
        let rhs_inv = rhs.inverse(want_rhs.then_some(&mut j_irhs_rhs), convention);

        // Step 2: lhs * rhs_inv
        let mut j_c_lhs = Matrix6::zeros();
        let mut j_c_irhs = Matrix6::zeros();
        let composite = lhs.compose(
            &rhs_inv,
            want_lhs.then_some(&mut j_c_lhs),
            want_rhs.then_some(&mut j_c_irhs),
            convention,
        );

        // Step 3: composite.log()
        let mut j_r_c = Matrix6::zeros();
        let residual = composite.log((want_lhs || want_rhs).then_some(&mut j_r_c), convention);

        if let Some(jac) = jacobian_lhs {
            *jac = j_r_c * j_c_lhs;
        }
        if let Some(jac) = jacobian_rhs {
            *jac = j_r_c * j_c_irhs * j_irhs_rhs;
        }

        residual
    }

    /// Raw-buffer form of [`SE3Metric::compute`].
    ///
    /// Poses are parameter blocks `[tx, ty, tz, qw, qx, qy, qz]` with a unit quaternion.
    /// The residual is written to `output`; Jacobians are written column-major.
    pub fn compute_raw(
        lhs: &[f64; 7],
        rhs: &[f64; 7],
        output: &mut [f64; 6],
        jacobian_lhs: Option<&mut [f64; 36]>,
        jacobian_rhs: Option<&mut [f64; 36]>,
        convention: JacobianConvention,
    ) {
        let mut j_lhs = Matrix6::zeros();
        let mut j_rhs = Matrix6::zeros();

        let residual = Self::compute(
            &SE3::from_parameters(lhs),
            &SE3::from_parameters(rhs),
            jacobian_lhs.is_some().then_some(&mut j_lhs),
            jacobian_rhs.is_some().then_some(&mut j_rhs),
            convention,
        );

        output.copy_from_slice(residual.coeffs().as_slice());
        if let Some(buffer) = jacobian_lhs {
            buffer.copy_from_slice(j_lhs.as_slice());
        }
        if let Some(buffer) = jacobian_rhs {
            buffer.copy_from_slice(j_rhs.as_slice());
        }
    }

    /// [`SE3Metric::compute`] with this metric's convention.
    pub fn distance(
        &self,
        lhs: &SE3,
        rhs: &SE3,
        jacobian_lhs: Option<&mut Matrix6<f64>>,
        jacobian_rhs: Option<&mut Matrix6<f64>>,
    ) -> SE3Tangent {
        Self::compute(lhs, rhs, jacobian_lhs, jacobian_rhs, self.convention)
    }

    /// [`SE3Metric::compute_raw`] with this metric's convention.
    pub fn distance_raw(
        &self,
        lhs: &[f64; 7],
        rhs: &[f64; 7],
        output: &mut [f64; 6],
        jacobian_lhs: Option<&mut [f64; 36]>,
        jacobian_rhs: Option<&mut [f64; 36]>,
    ) {
        Self::compute_raw(lhs, rhs, output, jacobian_lhs, jacobian_rhs, self.convention);
    }
}

impl Metric for SE3Metric {
    fn input_size(&self) -> usize {
        Self::INPUT_SIZE
    }

    fn output_size(&self) -> usize {
        Self::OUTPUT_SIZE
    }

    fn tangent_size(&self) -> usize {
        <SE3 as LieGroup>::DOF
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
        if lhs.iter().chain(rhs).any(|value| !value.is_finite()) {
            return Err(MetricError::from(ManifoldError::InvalidNumber).log());
        }

        let mut lhs_block = [0.0; 7];
        let mut rhs_block = [0.0; 7];
        lhs_block.copy_from_slice(lhs);
        rhs_block.copy_from_slice(rhs);

        let mut residual = [0.0; 6];
        let mut j_lhs = [0.0; 36];
        let mut j_rhs = [0.0; 36];
        self.distance_raw(
            &lhs_block,
            &rhs_block,
            &mut residual,
            jacobian_lhs.is_some().then_some(&mut j_lhs),
            jacobian_rhs.is_some().then_some(&mut j_rhs),
        );

        output.copy_from_slice(&residual);
        if let Some(buffer) = jacobian_lhs {
            buffer.copy_from_slice(&j_lhs);
        }
        if let Some(buffer) = jacobian_rhs {
            buffer.copy_from_slice(&j_rhs);
        }

        Ok(())
    }
}
