//! Lie group primitives for rigid-body poses.
//!
//! This module provides the group operations the distance metrics are built from:
//! - **SE(3)**: Special Euclidean group (rigid body transformations)
//! - **SO(3)**: Special Orthogonal group (rotations), used as the rotation factor of SE(3)
//!
//! Lie group M,° | size   | dim | X ∈ M             | Constraint | T_E M        | T_X M      | Exp(T)         | Comp. | Action
//! ------------- | ------ | --- | ----------------- | ---------- | ------------ | ---------- | -------------- | ----- | ------
//! Rotation      | SO(3),.| 3   | R                 | RᵀR = I    | [θ]x ∈ so(3) | [θ] ∈ R³   | R = exp([θ]x)  | R₁R₂  | Rx
//! Rigid motion  | SE(3),.| 6   | M = [R t; 0 1]    | RᵀR = I    | [v̂] ∈ se(3)  | [v̂] ∈ R⁶   | Exp([v̂])       | M₁M₂  | Rx+t
//!
//! # Jacobian conventions
//!
//! Every primitive that can return a Jacobian takes a [`JacobianConvention`]. The
//! convention fixes the perturbation model `X ⊕ δ` used for the inputs *and* the output
//! of the primitive, so Jacobians of chained primitives compose by plain matrix products.
//! With `δ = [ρ, θ]`:
//!
//! | global | coupled | X ⊕ δ                   |
//! |--------|---------|-------------------------|
//! | false  | true    | X ∘ Exp(δ)              |
//! | true   | true    | Exp(δ) ∘ X              |
//! | false  | false   | (R Exp(θ), t + ρ)       |
//! | true   | false   | (Exp(θ) R, t + ρ)       |
//!
//! The coupled conventions treat SE(3) as one 6-DoF group. The decoupled ones treat the
//! pose as the product SO(3) × R³, perturbing rotation and translation independently.
//!
//! The design is inspired by the [manif](https://github.com/artivis/manif) C++ library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod se3;
pub mod so3;

/// Default for [`JacobianConvention::global`]: derivatives w.r.t. local (body-frame) perturbations.
pub const DEFAULT_GLOBAL: bool = false;

/// Default for [`JacobianConvention::coupled`]: full SE(3) derivatives.
pub const DEFAULT_COUPLED: bool = true;

/// Squared angle below which closed-form trigonometric coefficients are replaced by
/// their Taylor expansions.
pub(crate) const SMALL_ANGLE_SQUARED: f64 = 1e-10;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Dimension validation failed during conversion
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// NaN or Inf detected in manifold element
    #[error("Invalid number: NaN or Inf detected")]
    InvalidNumber,

    /// Normalization failed for manifold element
    #[error("Normalization failed: {0}")]
    NormalizationFailed(String),
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Derivative convention shared by every primitive of one evaluation.
///
/// `global` selects a perturbation applied on the global (left) side of the element
/// instead of the local (right, body-frame) side. `coupled` selects exact SE(3)
/// derivatives instead of derivatives of the decoupled SO(3) × R³ product. Neither flag
/// changes any value, only the representation of the Jacobians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JacobianConvention {
    /// Derivatives w.r.t. global perturbations.
    pub global: bool,
    /// Derivatives of SE(3) instead of SO(3) × R³.
    pub coupled: bool,
}

impl Default for JacobianConvention {
    fn default() -> Self {
        Self {
            global: DEFAULT_GLOBAL,
            coupled: DEFAULT_COUPLED,
        }
    }
}

impl JacobianConvention {
    /// All four conventions, mostly useful for exhaustive checks.
    pub const ALL: [JacobianConvention; 4] = [
        JacobianConvention::new(false, true),
        JacobianConvention::new(true, true),
        JacobianConvention::new(false, false),
        JacobianConvention::new(true, false),
    ];

    /// Create a convention from both flags.
    pub const fn new(global: bool, coupled: bool) -> Self {
        Self { global, coupled }
    }

    /// Local (right) SE(3) perturbations.
    pub const fn local() -> Self {
        Self::new(false, true)
    }

    /// Global (left) SE(3) perturbations.
    pub const fn global() -> Self {
        Self::new(true, true)
    }

    /// Set the global flag.
    pub const fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Set the coupled flag.
    pub const fn with_coupled(mut self, coupled: bool) -> Self {
        self.coupled = coupled;
        self
    }
}

/// Core trait for Lie group operations.
///
/// Provides the group operations used to build residuals, each with an optional
/// analytic Jacobian written into caller-provided storage. A `None` Jacobian argument
/// means "not requested" and skips its computation entirely.
///
/// # Dimensions
///
/// - `DIM`: Space dimension - dimension of ambient space (e.g., 3 for SE(3))
/// - `DOF`: Degrees of freedom - tangent space dimension (e.g., 6 for SE(3))
/// - `REP_SIZE`: Representation size - parameter block size (e.g., 7 for SE(3))
pub trait LieGroup: Clone + PartialEq {
    /// The tangent space vector type
    type TangentVector: Tangent<Self>;

    /// The Jacobian matrix type
    type JacobianMatrix: Clone + PartialEq;

    /// Associated Lie algebra type
    type LieAlgebra: Clone + PartialEq;

    /// Space dimension
    const DIM: usize;

    /// Degrees of freedom
    const DOF: usize;

    /// Representation size
    const REP_SIZE: usize;

    /// Get the identity element of the group.
    fn identity() -> Self;

    /// Compute the inverse of this element.
    ///
    /// # Arguments
    /// * `jacobian` - Optional Jacobian ∂(g⁻¹)/∂g
    /// * `convention` - Perturbation model of input and output
    fn inverse(
        &self,
        jacobian: Option<&mut Self::JacobianMatrix>,
        convention: JacobianConvention,
    ) -> Self;

    /// Compose this element with another (group multiplication) g₁ ∘ g₂.
    ///
    /// # Arguments
    /// * `other` - The right operand for composition
    /// * `jacobian_self` - Optional Jacobian ∂(g₁ ∘ g₂)/∂g₁
    /// * `jacobian_other` - Optional Jacobian ∂(g₁ ∘ g₂)/∂g₂
    /// * `convention` - Perturbation model of inputs and output
    fn compose(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
        convention: JacobianConvention,
    ) -> Self;

    /// Logarithmic map from the group to its tangent space.
    ///
    /// # Arguments
    /// * `jacobian` - Optional Jacobian ∂log(g)^∨/∂g
    /// * `convention` - Perturbation model of the input
    fn log(
        &self,
        jacobian: Option<&mut Self::JacobianMatrix>,
        convention: JacobianConvention,
    ) -> Self::TangentVector;

    /// Apply a tangent perturbation using the perturbation model of `convention`.
    ///
    /// This is the update an optimizer applies to a pose after solving for a step in the
    /// same convention its Jacobians were computed in.
    fn oplus(&self, delta: &Self::TangentVector, convention: JacobianConvention) -> Self;

    /// Inverse of [`LieGroup::oplus`]: the perturbation δ with `other ⊕ δ = self`.
    fn ominus(&self, other: &Self, convention: JacobianConvention) -> Self::TangentVector;

    /// Adjoint matrix Ad(g).
    fn adjoint(&self) -> Self::JacobianMatrix;

    /// Generate a random element (useful for testing and initialization).
    fn random() -> Self;

    /// Check if the element is approximately on the manifold.
    fn is_valid(&self, tolerance: f64) -> bool;

    /// Check if the element is approximately equal to another element.
    fn is_approx(&self, other: &Self, tolerance: f64) -> bool;
}

/// Trait for Lie algebra (tangent space) operations.
pub trait Tangent<Group: LieGroup>: Clone + PartialEq {
    /// Dimension of the tangent space
    const DIM: usize;

    /// Exponential map to the group: exp(φ^∧).
    fn exp(&self) -> Group;

    /// Right Jacobian Jr such that exp((φ + δφ)^∧) ≈ exp(φ^∧) ∘ exp((Jr δφ)^∧).
    fn right_jacobian(&self) -> Group::JacobianMatrix;

    /// Left Jacobian Jl such that exp((φ + δφ)^∧) ≈ exp((Jl δφ)^∧) ∘ exp(φ^∧).
    fn left_jacobian(&self) -> Group::JacobianMatrix;

    /// Inverse of right Jacobian Jr⁻¹.
    fn right_jacobian_inv(&self) -> Group::JacobianMatrix;

    /// Inverse of left Jacobian Jl⁻¹.
    fn left_jacobian_inv(&self) -> Group::JacobianMatrix;

    /// Hat operator: φ^∧ (vector to matrix).
    fn hat(&self) -> Group::LieAlgebra;

    /// Small adjoint ad(φ).
    fn small_adj(&self) -> Group::JacobianMatrix;

    /// Zero tangent vector.
    fn zero() -> Self;

    /// Check if the tangent vector is approximately zero.
    fn is_zero(&self, tolerance: f64) -> bool;

    /// Check if the tangent vector is approximately equal to another tangent vector.
    fn is_approx(&self, other: &Self, tolerance: f64) -> bool;
}
