//! SE(3) - Special Euclidean Group in 3D
//!
//! This module implements the Special Euclidean group SE(3), which represents
//! rigid body transformations in 3D space (rotation + translation).
//!
//! SE(3) elements are represented as a combination of SO(3) rotation and Vector3 translation.
//! SE(3) tangent elements are represented as [rho(3), theta(3)] = 6 components,
//! where rho is the translational component and theta is the rotational component.
//!
//! Every Jacobian-carrying operation takes a [`JacobianConvention`] and returns its
//! derivative w.r.t. the matching perturbation model (see the [`crate::manifold`]
//! module docs). Equation numbers refer to "A micro Lie theory for state estimation in
//! robotics" (Solà et al.).

use crate::manifold::{
    JacobianConvention, LieGroup, ManifoldError, ManifoldResult, Tangent,
    so3::{SO3, SO3Tangent, skew},
};
use nalgebra::{Isometry3, Matrix3, Matrix4, Matrix6, Translation3, UnitQuaternion, Vector3, Vector6};
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// Squared rotation angle below which the Q block uses its Taylor expansion.
const Q_BLOCK_TAYLOR_THRESHOLD: f64 = 1e-4;

/// SE(3) group element representing rigid body transformations in 3D.
///
/// Represented as a combination of SO(3) rotation and Vector3 translation.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3 {
    /// Rotation part as SO(3) element
    rotation: SO3,
    /// Translation part as Vector3
    translation: Vector3<f64>,
}

impl Display for SE3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let t = self.translation;
        let q = self.rotation.coeffs();
        write!(
            f,
            "SE3(translation: [{:.4}, {:.4}, {:.4}], rotation: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            t.x, t.y, t.z, q[0], q[1], q[2], q[3]
        )
    }
}

impl SE3 {
    /// Create a new SE3 element from translation and rotation.
    ///
    /// # Arguments
    /// * `translation` - Translation vector [x, y, z]
    /// * `rotation` - Unit quaternion representing rotation
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        SE3 {
            rotation: SO3::new(rotation),
            translation,
        }
    }

    /// Create SE3 from translation components and Euler angles.
    pub fn from_translation_euler(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        SE3 {
            rotation: SO3::from_euler_angles(roll, pitch, yaw),
            translation: Vector3::new(x, y, z),
        }
    }

    /// Create SE3 from SO3 and Vector3 components.
    pub fn from_translation_so3(translation: Vector3<f64>, rotation: SO3) -> Self {
        SE3 {
            rotation,
            translation,
        }
    }

    /// Create SE3 directly from an Isometry3.
    pub fn from_isometry(isometry: Isometry3<f64>) -> Self {
        SE3::new(isometry.translation.vector, isometry.rotation)
    }

    /// View a parameter block `[tx, ty, tz, qw, qx, qy, qz]` as a pose.
    ///
    /// The quaternion is taken as is; the caller guarantees it is normalized.
    pub fn from_parameters(parameters: &[f64; 7]) -> Self {
        SE3 {
            rotation: SO3::from_unit_coeffs_unchecked(
                parameters[3],
                parameters[4],
                parameters[5],
                parameters[6],
            ),
            translation: Vector3::new(parameters[0], parameters[1], parameters[2]),
        }
    }

    /// Validate and convert a parameter block `[tx, ty, tz, qw, qx, qy, qz]`.
    ///
    /// The quaternion is normalized. Fails on a wrong length, on NaN/Inf entries and on a
    /// zero quaternion.
    pub fn try_from_parameters(parameters: &[f64]) -> ManifoldResult<Self> {
        if parameters.len() != Self::REP_SIZE {
            return Err(ManifoldError::DimensionMismatch {
                expected: Self::REP_SIZE,
                actual: parameters.len(),
            });
        }
        if parameters.iter().any(|value| !value.is_finite()) {
            return Err(ManifoldError::InvalidNumber);
        }

        let quaternion_norm = parameters[3..].iter().map(|v| v * v).sum::<f64>().sqrt();
        if quaternion_norm < f64::EPSILON {
            return Err(ManifoldError::NormalizationFailed(format!(
                "quaternion norm {quaternion_norm:e} is too small to normalize"
            )));
        }

        Ok(SE3 {
            rotation: SO3::from_quaternion_coeffs(
                parameters[3],
                parameters[4],
                parameters[5],
                parameters[6],
            ),
            translation: Vector3::new(parameters[0], parameters[1], parameters[2]),
        })
    }

    /// Get the parameter block `[tx, ty, tz, qw, qx, qy, qz]`.
    pub fn parameters(&self) -> [f64; 7] {
        let q = self.rotation.coeffs();
        [
            self.translation.x,
            self.translation.y,
            self.translation.z,
            q[0],
            q[1],
            q[2],
            q[3],
        ]
    }

    /// Get the translation part as a Vector3.
    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    /// Get the rotation part as SO3.
    pub fn rotation_so3(&self) -> &SO3 {
        &self.rotation
    }

    /// Get the rotation part as a UnitQuaternion.
    pub fn rotation_quaternion(&self) -> UnitQuaternion<f64> {
        self.rotation.quaternion()
    }

    /// Get as an Isometry3.
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.translation),
            self.rotation_quaternion(),
        )
    }

    /// Get the transformation matrix (4x4 homogeneous matrix).
    pub fn matrix(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }

    /// Transform a point: R v + t.
    pub fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.act(vector) + self.translation
    }

    /// Re-normalize the rotation quaternion.
    pub fn normalize(&mut self) {
        self.rotation.normalize();
    }
}

impl From<Isometry3<f64>> for SE3 {
    fn from(isometry: Isometry3<f64>) -> Self {
        SE3::from_isometry(isometry)
    }
}

impl From<SE3> for Isometry3<f64> {
    fn from(se3: SE3) -> Self {
        se3.isometry()
    }
}

/// 6x6 block matrix [[a, b], [c, d]] from 3x3 blocks.
fn block_matrix(
    a: &Matrix3<f64>,
    b: &Matrix3<f64>,
    c: &Matrix3<f64>,
    d: &Matrix3<f64>,
) -> Matrix6<f64> {
    let mut m = Matrix6::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(a);
    m.fixed_view_mut::<3, 3>(0, 3).copy_from(b);
    m.fixed_view_mut::<3, 3>(3, 0).copy_from(c);
    m.fixed_view_mut::<3, 3>(3, 3).copy_from(d);
    m
}

impl LieGroup for SE3 {
    type TangentVector = SE3Tangent;
    type JacobianMatrix = Matrix6<f64>;
    type LieAlgebra = Matrix4<f64>;

    const DIM: usize = 3;
    const DOF: usize = 6;
    const REP_SIZE: usize = 7;

    fn identity() -> Self {
        SE3 {
            rotation: SO3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Get the inverse.
    ///
    /// # Notes
    /// # Equation 170: Inverse of SE(3) matrix
    /// M⁻¹ = [ Rᵀ -Rᵀt ]
    ///       [ 0    1   ]
    ///
    /// # Jacobian of the inverse
    /// - coupled, local:    J = -Ad(M)                          (Eq. 176)
    /// - coupled, global:   J = -Ad(M⁻¹)
    /// - decoupled, local:  J = [ -Rᵀ  -[Rᵀt]ₓ ; 0  -R  ]
    /// - decoupled, global: J = [ -Rᵀ  -Rᵀ[t]ₓ ; 0  -Rᵀ ]
    fn inverse(
        &self,
        jacobian: Option<&mut Self::JacobianMatrix>,
        convention: JacobianConvention,
    ) -> Self {
        let rotation_inv = self.rotation.inverse();
        let translation_inv = -rotation_inv.act(&self.translation);
        let result = SE3::from_translation_so3(translation_inv, rotation_inv);

        if let Some(jac) = jacobian {
            *jac = match (convention.coupled, convention.global) {
                (true, false) => -self.adjoint(),
                (true, true) => -result.adjoint(),
                (false, false) => {
                    let r = self.rotation.rotation_matrix();
                    let rt = r.transpose();
                    block_matrix(
                        &-rt,
                        &-skew(&(rt * self.translation)),
                        &Matrix3::zeros(),
                        &-r,
                    )
                }
                (false, true) => {
                    let rt = self.rotation.rotation_matrix().transpose();
                    block_matrix(
                        &-rt,
                        &(-rt * skew(&self.translation)),
                        &Matrix3::zeros(),
                        &-rt,
                    )
                }
            };
        }

        result
    }

    /// Composition of this and another SE3 element.
    ///
    /// # Notes
    /// # Equation 171: Composition of SE(3) matrices
    /// M_a M_b = [ R_a*R_b   R_a*t_b + t_a ]
    ///           [ 0             1         ]
    ///
    /// # Jacobians wrt M_a and M_b
    /// - coupled, local:    J_a = Ad(M_b⁻¹),                J_b = I      (Eqs. 177-178)
    /// - coupled, global:   J_a = I,                        J_b = Ad(M_a)
    /// - decoupled, local:  J_a = [ I  -R_a[t_b]ₓ ; 0 R_bᵀ ], J_b = diag(R_a, I)
    /// - decoupled, global: J_a = [ I  -[R_a t_b]ₓ ; 0 I ],  J_b = diag(R_a, R_a)
    fn compose(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
        convention: JacobianConvention,
    ) -> Self {
        let rotated = self.rotation.act(&other.translation);
        let result = SE3::from_translation_so3(
            rotated + self.translation,
            self.rotation.compose(&other.rotation),
        );

        if let Some(jac_self) = jacobian_self {
            *jac_self = match (convention.coupled, convention.global) {
                (true, false) => other.inverse(None, convention).adjoint(),
                (true, true) => Matrix6::identity(),
                (false, false) => block_matrix(
                    &Matrix3::identity(),
                    &(-self.rotation.rotation_matrix() * skew(&other.translation)),
                    &Matrix3::zeros(),
                    &other.rotation.rotation_matrix().transpose(),
                ),
                (false, true) => block_matrix(
                    &Matrix3::identity(),
                    &-skew(&rotated),
                    &Matrix3::zeros(),
                    &Matrix3::identity(),
                ),
            };
        }

        if let Some(jac_other) = jacobian_other {
            *jac_other = match (convention.coupled, convention.global) {
                (true, false) => Matrix6::identity(),
                (true, true) => self.adjoint(),
                (false, false) => block_matrix(
                    &self.rotation.rotation_matrix(),
                    &Matrix3::zeros(),
                    &Matrix3::zeros(),
                    &Matrix3::identity(),
                ),
                (false, true) => {
                    let r = self.rotation.rotation_matrix();
                    block_matrix(&r, &Matrix3::zeros(), &Matrix3::zeros(), &r)
                }
            };
        }

        result
    }

    /// Get the SE3 corresponding Lie algebra element in vector form.
    ///
    /// # Notes
    /// # Equation 173: SE(3) logarithmic map
    /// τ = log(M) = [ V⁻¹(θ) t ]
    ///              [ Log(R)  ]
    ///
    /// # Jacobian of the log
    /// - coupled, local:    J = Jr⁻¹(τ)
    /// - coupled, global:   J = Jl⁻¹(τ)
    /// - decoupled, local:  J = Jr⁻¹(τ) diag(Rᵀ, I)
    /// - decoupled, global: J = Jl⁻¹(τ) [ I [t]ₓ ; 0 I ]
    fn log(
        &self,
        jacobian: Option<&mut Self::JacobianMatrix>,
        convention: JacobianConvention,
    ) -> Self::TangentVector {
        let theta = self.rotation.log();
        let rho = theta.left_jacobian_inv() * self.translation;
        let result = SE3Tangent::new(rho, theta.coeffs());

        if let Some(jac) = jacobian {
            *jac = match (convention.coupled, convention.global) {
                (true, false) => result.right_jacobian_inv(),
                (true, true) => result.left_jacobian_inv(),
                (false, false) => {
                    result.right_jacobian_inv()
                        * block_matrix(
                            &self.rotation.rotation_matrix().transpose(),
                            &Matrix3::zeros(),
                            &Matrix3::zeros(),
                            &Matrix3::identity(),
                        )
                }
                (false, true) => {
                    result.left_jacobian_inv()
                        * block_matrix(
                            &Matrix3::identity(),
                            &skew(&self.translation),
                            &Matrix3::zeros(),
                            &Matrix3::identity(),
                        )
                }
            };
        }

        result
    }

    fn oplus(&self, delta: &Self::TangentVector, convention: JacobianConvention) -> Self {
        match (convention.coupled, convention.global) {
            (true, false) => self.compose(&delta.exp(), None, None, convention),
            (true, true) => delta.exp().compose(self, None, None, convention),
            (false, false) => SE3::from_translation_so3(
                self.translation + delta.rho(),
                self.rotation.compose(&SO3Tangent::new(delta.theta()).exp()),
            ),
            (false, true) => SE3::from_translation_so3(
                self.translation + delta.rho(),
                SO3Tangent::new(delta.theta()).exp().compose(&self.rotation),
            ),
        }
    }

    fn ominus(&self, other: &Self, convention: JacobianConvention) -> Self::TangentVector {
        match (convention.coupled, convention.global) {
            (true, false) => other
                .inverse(None, convention)
                .compose(self, None, None, convention)
                .log(None, convention),
            (true, true) => self
                .compose(&other.inverse(None, convention), None, None, convention)
                .log(None, convention),
            (false, false) => SE3Tangent::new(
                self.translation - other.translation,
                other.rotation.inverse().compose(&self.rotation).log().coeffs(),
            ),
            (false, true) => SE3Tangent::new(
                self.translation - other.translation,
                self.rotation.compose(&other.rotation.inverse()).log().coeffs(),
            ),
        }
    }

    /// Adjoint matrix.
    ///
    /// # Notes
    /// Ad(M) = [ R  [t]ₓR ]
    ///         [ 0    R   ]
    fn adjoint(&self) -> Self::JacobianMatrix {
        let rotation_matrix = self.rotation.rotation_matrix();
        block_matrix(
            &rotation_matrix,
            &(skew(&self.translation) * rotation_matrix),
            &Matrix3::zeros(),
            &rotation_matrix,
        )
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        // Random translation in [-1, 1]³
        let translation = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );

        SE3::from_translation_so3(translation, SO3::random())
    }

    fn is_valid(&self, tolerance: f64) -> bool {
        self.rotation.is_valid(tolerance)
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        self.ominus(other, JacobianConvention::default())
            .is_zero(tolerance)
    }
}

/// SE(3) tangent space element representing elements in the Lie algebra se(3).
///
/// Internally represented as [rho(3), theta(3)] where:
/// - rho: translational component [rho_x, rho_y, rho_z]
/// - theta: rotational component [theta_x, theta_y, theta_z]
#[derive(Clone, Debug, PartialEq)]
pub struct SE3Tangent {
    /// Internal data: [rho_x, rho_y, rho_z, theta_x, theta_y, theta_z]
    data: Vector6<f64>,
}

impl Display for SE3Tangent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rho = self.rho();
        let theta = self.theta();
        write!(
            f,
            "se3(rho: [{:.4}, {:.4}, {:.4}], theta: [{:.4}, {:.4}, {:.4}])",
            rho.x, rho.y, rho.z, theta.x, theta.y, theta.z
        )
    }
}

impl From<Vector6<f64>> for SE3Tangent {
    fn from(data: Vector6<f64>) -> Self {
        SE3Tangent { data }
    }
}

impl From<SE3Tangent> for Vector6<f64> {
    fn from(tangent: SE3Tangent) -> Self {
        tangent.data
    }
}

impl SE3Tangent {
    /// Create a new SE3Tangent from rho (translational) and theta (rotational) components.
    pub fn new(rho: Vector3<f64>, theta: Vector3<f64>) -> Self {
        let mut data = Vector6::zeros();
        data.fixed_rows_mut::<3>(0).copy_from(&rho);
        data.fixed_rows_mut::<3>(3).copy_from(&theta);
        SE3Tangent { data }
    }

    /// Create SE3Tangent from individual components.
    pub fn from_components(
        rho_x: f64,
        rho_y: f64,
        rho_z: f64,
        theta_x: f64,
        theta_y: f64,
        theta_z: f64,
    ) -> Self {
        SE3Tangent {
            data: Vector6::new(rho_x, rho_y, rho_z, theta_x, theta_y, theta_z),
        }
    }

    /// Get the rho (translational) part.
    pub fn rho(&self) -> Vector3<f64> {
        self.data.fixed_rows::<3>(0).into_owned()
    }

    /// Get the theta (rotational) part.
    pub fn theta(&self) -> Vector3<f64> {
        self.data.fixed_rows::<3>(3).into_owned()
    }

    /// Get the full 6-vector [rho, theta].
    pub fn coeffs(&self) -> Vector6<f64> {
        self.data
    }

    /// Q(ρ, θ) block of the SE(3) left Jacobian.
    ///
    /// # Notes
    /// # Equation 180
    /// Q(ρ, θ) = (1/2)ρₓ
    ///         + (θ - sin θ)/θ³ (θₓρₓ + ρₓθₓ + θₓρₓθₓ)
    ///         + (θ² + 2cos θ - 2)/(2θ⁴) (θ²ₓρₓ + ρₓθ²ₓ - 3θₓρₓθₓ)
    ///         + (2θ - 3sin θ + θcos θ)/(2θ⁵) (θₓρₓθ²ₓ + θ²ₓρₓθₓ)
    pub fn q_block_jacobian_matrix(rho: Vector3<f64>, theta: Vector3<f64>) -> Matrix3<f64> {
        let rho_skew = skew(&rho);
        let theta_skew = skew(&theta);
        let theta_squared = theta.norm_squared();

        let (b, c, d) = if theta_squared < Q_BLOCK_TAYLOR_THRESHOLD {
            (
                1.0 / 6.0 - theta_squared / 120.0,
                1.0 / 24.0 - theta_squared / 720.0,
                1.0 / 120.0 - theta_squared / 2520.0,
            )
        } else {
            let theta_norm = theta_squared.sqrt();
            let theta_norm_3 = theta_norm * theta_squared;
            let theta_norm_4 = theta_squared * theta_squared;
            let theta_norm_5 = theta_norm_4 * theta_norm;
            let (sin_theta, cos_theta) = theta_norm.sin_cos();
            (
                (theta_norm - sin_theta) / theta_norm_3,
                (theta_squared + 2.0 * cos_theta - 2.0) / (2.0 * theta_norm_4),
                (2.0 * theta_norm - 3.0 * sin_theta + theta_norm * cos_theta)
                    / (2.0 * theta_norm_5),
            )
        };

        let theta_rho = theta_skew * rho_skew;
        let rho_theta = rho_skew * theta_skew;
        let theta_rho_theta = theta_rho * theta_skew;
        let theta_theta = theta_skew * theta_skew;

        let m1 = rho_skew;
        let m2 = theta_rho + rho_theta + theta_rho_theta;
        let m3 = theta_theta * rho_skew + rho_skew * theta_theta - 3.0 * theta_rho_theta;
        let m4 = theta_rho_theta * theta_skew + theta_theta * rho_skew * theta_skew;

        m1 * 0.5 + m2 * b + m3 * c + m4 * d
    }
}

impl Tangent<SE3> for SE3Tangent {
    const DIM: usize = 6;

    /// Exponential map.
    ///
    /// # Notes
    /// # Equation 172: SE(3) exponential map
    /// M = exp(τ) = [ Exp(θ)  V(θ) ρ ]
    ///              [ 0         1    ]
    /// with V(θ) = J_l(θ) of SO(3).
    fn exp(&self) -> SE3 {
        let theta = SO3Tangent::new(self.theta());
        SE3::from_translation_so3(theta.left_jacobian() * self.rho(), theta.exp())
    }

    /// Right Jacobian, Jr(τ) = Jl(-τ).
    fn right_jacobian(&self) -> Matrix6<f64> {
        SE3Tangent { data: -self.data }.left_jacobian()
    }

    /// Left Jacobian.
    ///
    /// # Notes
    /// # Equation 179b
    /// Jl(τ) = [ Jl(θ)  Q(ρ, θ) ]
    ///         [ 0      Jl(θ)   ]
    fn left_jacobian(&self) -> Matrix6<f64> {
        let jl = SO3Tangent::new(self.theta()).left_jacobian();
        let q = SE3Tangent::q_block_jacobian_matrix(self.rho(), self.theta());
        block_matrix(&jl, &q, &Matrix3::zeros(), &jl)
    }

    /// Right Jacobian inverse, Jr⁻¹(τ) = Jl⁻¹(-τ).
    fn right_jacobian_inv(&self) -> Matrix6<f64> {
        SE3Tangent { data: -self.data }.left_jacobian_inv()
    }

    /// Left Jacobian inverse.
    ///
    /// # Notes
    /// Jl⁻¹(τ) = [ Jl⁻¹(θ)  -Jl⁻¹(θ) Q(ρ, θ) Jl⁻¹(θ) ]
    ///           [ 0         Jl⁻¹(θ)                ]
    fn left_jacobian_inv(&self) -> Matrix6<f64> {
        let jl_inv = SO3Tangent::new(self.theta()).left_jacobian_inv();
        let q = SE3Tangent::q_block_jacobian_matrix(self.rho(), self.theta());
        block_matrix(&jl_inv, &(-jl_inv * q * jl_inv), &Matrix3::zeros(), &jl_inv)
    }

    /// Hat map.
    ///
    /// # Notes
    /// τ^∧ = [ [θ]ₓ  ρ ]
    ///       [ 0     0 ]
    fn hat(&self) -> Matrix4<f64> {
        let mut lie_algebra = Matrix4::zeros();
        lie_algebra
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&skew(&self.theta()));
        lie_algebra
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.rho());
        lie_algebra
    }

    /// Small adjoint.
    ///
    /// # Notes
    /// ad(τ) = [ [θ]ₓ  [ρ]ₓ ]
    ///         [ 0     [θ]ₓ ]
    fn small_adj(&self) -> Matrix6<f64> {
        let theta_skew = skew(&self.theta());
        block_matrix(
            &theta_skew,
            &skew(&self.rho()),
            &Matrix3::zeros(),
            &theta_skew,
        )
    }

    fn zero() -> Self {
        SE3Tangent {
            data: Vector6::zeros(),
        }
    }

    fn is_zero(&self, tolerance: f64) -> bool {
        self.data.norm() < tolerance
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        (self.data - other.data).norm() < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    const TOLERANCE: f64 = 1e-9;
    const FD_EPSILON: f64 = 1e-6;
    const FD_TOLERANCE: f64 = 1e-6;

    fn random_pose(rng: &mut StdRng) -> SE3 {
        let translation = Vector3::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
        );
        let axis_angle = Vector3::new(
            rng.random_range(-0.8..0.8),
            rng.random_range(-0.8..0.8),
            rng.random_range(-0.8..0.8),
        );
        SE3::from_translation_so3(translation, SO3::from_scaled_axis(axis_angle))
    }

    fn basis(k: usize, scale: f64) -> SE3Tangent {
        let mut data = Vector6::zeros();
        data[k] = scale;
        SE3Tangent::from(data)
    }

    /// Central-difference Jacobian of a group-valued map under `convention`.
    fn numeric_group_jacobian(
        x: &SE3,
        convention: JacobianConvention,
        f: impl Fn(&SE3) -> SE3,
    ) -> Matrix6<f64> {
        let base = f(x);
        let mut jacobian = Matrix6::zeros();
        for k in 0..6 {
            let plus = f(&x.oplus(&basis(k, FD_EPSILON), convention));
            let minus = f(&x.oplus(&basis(k, -FD_EPSILON), convention));
            let column = (plus.ominus(&base, convention).coeffs()
                - minus.ominus(&base, convention).coeffs())
                / (2.0 * FD_EPSILON);
            jacobian.set_column(k, &column);
        }
        jacobian
    }

    #[test]
    fn test_se3_tangent_basic() {
        let rho = Vector3::new(1.0, 2.0, 3.0);
        let theta = Vector3::new(0.1, 0.2, 0.3);
        let tangent = SE3Tangent::new(rho, theta);

        assert_eq!(tangent.rho(), rho);
        assert_eq!(tangent.theta(), theta);
        assert_eq!(
            tangent.coeffs(),
            Vector6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3)
        );
    }

    #[test]
    fn test_se3_tangent_zero() {
        assert!(SE3Tangent::zero().is_zero(1e-15));
        assert!(SE3Tangent::from_components(0.0, 0.0, 0.0, 0.0, 0.0, 0.0).is_zero(1e-15));
    }

    #[test]
    fn test_se3_identity() {
        let identity = SE3::identity();
        assert!(identity.is_valid(TOLERANCE));
        assert_eq!(identity.parameters(), [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert!(
            identity
                .log(None, JacobianConvention::default())
                .is_zero(TOLERANCE)
        );
    }

    #[test]
    fn test_se3_parameters() {
        let se3 = SE3::from_translation_euler(1.0, -2.0, 3.0, 0.1, 0.2, 0.3);
        let parameters = se3.parameters();
        assert_eq!(&parameters[..3], &[1.0, -2.0, 3.0]);
        assert!(SE3::from_parameters(&parameters).is_approx(&se3, TOLERANCE));
        let checked = SE3::try_from_parameters(&parameters).unwrap();
        assert!(checked.is_approx(&se3, TOLERANCE));
    }

    #[test]
    fn test_se3_accessors() {
        let se3 = SE3::from_translation_euler(1.0, -2.0, 3.0, 0.1, 0.2, 0.3);
        assert_eq!(se3.translation(), Vector3::new(1.0, -2.0, 3.0));
        let expected = SO3::from_euler_angles(0.1, 0.2, 0.3);
        assert!(se3.rotation_so3().compose(&expected.inverse()).log().coeffs().norm() < TOLERANCE);
    }

    #[test]
    fn test_se3_normalize_restores_unit_quaternion() {
        let mut se3 = SE3::from_parameters(&[1.0, 2.0, 3.0, 2.0, 0.0, 0.0, 0.0]);
        assert!(!se3.is_valid(TOLERANCE));

        se3.normalize();
        assert!(se3.is_valid(TOLERANCE));
        assert!(se3.rotation_so3().log().coeffs().norm() < TOLERANCE);
        assert_eq!(se3.translation(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_se3_normalize_after_repeated_compose() {
        let step = SE3::from_translation_euler(0.1, 0.0, -0.1, 0.3, -0.2, 0.7);
        let mut pose = SE3::identity();
        for _ in 0..1000 {
            pose = pose.compose(&step, None, None, JacobianConvention::default());
        }

        pose.normalize();
        assert!(pose.is_valid(1e-12));
    }

    #[test]
    fn test_se3_try_from_parameters_normalizes() {
        let se3 = SE3::try_from_parameters(&[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(se3.is_valid(TOLERANCE));
        assert!(se3.is_approx(&SE3::identity(), TOLERANCE));
    }

    #[test]
    fn test_se3_try_from_parameters_errors() {
        assert_eq!(
            SE3::try_from_parameters(&[0.0; 6]),
            Err(ManifoldError::DimensionMismatch {
                expected: 7,
                actual: 6
            })
        );
        assert_eq!(
            SE3::try_from_parameters(&[0.0, f64::NAN, 0.0, 1.0, 0.0, 0.0, 0.0]),
            Err(ManifoldError::InvalidNumber)
        );
        assert!(matches!(
            SE3::try_from_parameters(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]),
            Err(ManifoldError::NormalizationFailed(_))
        ));
    }

    #[test]
    fn test_se3_inverse() {
        let se3 = SE3::from_translation_euler(1.0, 2.0, 3.0, 0.4, -0.2, 0.9);
        for convention in JacobianConvention::ALL {
            let composed = se3.compose(&se3.inverse(None, convention), None, None, convention);
            assert!(composed.is_approx(&SE3::identity(), TOLERANCE));
        }
    }

    #[test]
    fn test_se3_compose_matches_matrix_product() {
        let a = SE3::from_translation_euler(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let b = SE3::from_translation_euler(-0.5, 0.25, 4.0, 0.4, 0.5, 0.6);
        let composed = a.compose(&b, None, None, JacobianConvention::default());
        assert!((composed.matrix() - a.matrix() * b.matrix()).norm() < TOLERANCE);
    }

    #[test]
    fn test_se3_act() {
        let se3 = SE3::from_translation_euler(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let point = Vector3::new(1.0, -1.0, 0.5);
        let homogeneous = se3.matrix() * point.push(1.0);
        assert!((se3.act(&point) - homogeneous.fixed_rows::<3>(0)).norm() < TOLERANCE);
    }

    #[test]
    fn test_se3_adjoint() {
        let se3 = SE3::from_translation_euler(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let adj = se3.adjoint();
        assert!((adj.determinant() - 1.0).abs() < TOLERANCE);
        // Ad(M⁻¹) = Ad(M)⁻¹
        let adj_inv = se3.inverse(None, JacobianConvention::default()).adjoint();
        assert!((adj * adj_inv - Matrix6::identity()).norm() < TOLERANCE);
    }

    #[test]
    fn test_se3_exp_log() {
        let tangent = SE3Tangent::from_components(0.1, 0.2, 0.3, 0.01, 0.02, 0.03);
        let recovered = tangent.exp().log(None, JacobianConvention::default());
        assert!(recovered.is_approx(&tangent, TOLERANCE));

        let large = SE3Tangent::from_components(1.0, -2.0, 0.5, 1.2, -0.7, 0.9);
        let recovered = large.exp().log(None, JacobianConvention::default());
        assert!(recovered.is_approx(&large, TOLERANCE));
    }

    #[test]
    fn test_se3_exp_zero() {
        assert!(SE3Tangent::zero().exp().is_approx(&SE3::identity(), TOLERANCE));
    }

    #[test]
    fn test_se3_hat() {
        let tangent = SE3Tangent::from_components(1.0, 2.0, 3.0, 0.4, 0.5, 0.6);
        let hat = tangent.hat();
        assert_eq!(hat[(0, 3)], 1.0);
        assert_eq!(hat[(2, 3)], 3.0);
        assert_eq!(hat[(2, 1)], 0.4);
        assert_eq!(hat.row(3).norm(), 0.0);
    }

    #[test]
    fn test_se3_small_adj_is_lie_bracket() {
        let a = SE3Tangent::from_components(1.0, 2.0, 3.0, 0.4, 0.5, 0.6);
        let b = SE3Tangent::from_components(-0.3, 0.7, 0.1, 0.2, -0.1, 0.9);
        let bracket = a.hat() * b.hat() - b.hat() * a.hat();
        let via_adj = SE3Tangent::from(a.small_adj() * b.coeffs()).hat();
        assert!((bracket - via_adj).norm() < TOLERANCE);
    }

    #[test]
    fn test_se3_oplus_ominus_roundtrip() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = random_pose(&mut rng);
        let delta = SE3Tangent::from_components(0.1, -0.2, 0.3, 0.05, -0.1, 0.2);
        for convention in JacobianConvention::ALL {
            let y = x.oplus(&delta, convention);
            assert!(y.ominus(&x, convention).is_approx(&delta, TOLERANCE));
        }
    }

    #[test]
    fn test_se3_left_jacobian_matches_finite_differences() {
        // exp(τ + δ) ≈ exp(Jl δ) exp(τ)
        for tangent in [
            SE3Tangent::from_components(0.5, -1.0, 2.0, 0.7, -0.4, 1.1),
            SE3Tangent::from_components(1.0, 2.0, -0.5, 1e-3, 2e-3, -1e-3),
        ] {
            let base = tangent.exp();
            let jacobian = tangent.left_jacobian();
            for k in 0..6 {
                let plus = SE3Tangent::from(tangent.coeffs() + basis(k, FD_EPSILON).coeffs());
                let minus = SE3Tangent::from(tangent.coeffs() - basis(k, FD_EPSILON).coeffs());
                let global = JacobianConvention::global();
                let column = (plus.exp().ominus(&base, global).coeffs()
                    - minus.exp().ominus(&base, global).coeffs())
                    / (2.0 * FD_EPSILON);
                assert!((column - jacobian.column(k)).norm() < FD_TOLERANCE);
            }
        }
    }

    #[test]
    fn test_se3_jacobian_inverses() {
        for tangent in [
            SE3Tangent::zero(),
            SE3Tangent::from_components(1.0, 2.0, 3.0, 1e-4, 0.0, -1e-4),
            SE3Tangent::from_components(0.5, -1.0, 2.0, 0.7, -0.4, 1.1),
        ] {
            let left = tangent.left_jacobian() * tangent.left_jacobian_inv();
            let right = tangent.right_jacobian() * tangent.right_jacobian_inv();
            assert!((left - Matrix6::identity()).norm() < 1e-10);
            assert!((right - Matrix6::identity()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_se3_inverse_jacobian_all_conventions() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5 {
            let x = random_pose(&mut rng);
            for convention in JacobianConvention::ALL {
                let mut analytic = Matrix6::zeros();
                x.inverse(Some(&mut analytic), convention);
                let numeric =
                    numeric_group_jacobian(&x, convention, |p| p.inverse(None, convention));
                assert!(
                    (analytic - numeric).norm() < FD_TOLERANCE,
                    "{convention:?}: {analytic} vs {numeric}"
                );
            }
        }
    }

    #[test]
    fn test_se3_compose_jacobians_all_conventions() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..5 {
            let x = random_pose(&mut rng);
            let y = random_pose(&mut rng);
            for convention in JacobianConvention::ALL {
                let mut jac_x = Matrix6::zeros();
                let mut jac_y = Matrix6::zeros();
                x.compose(&y, Some(&mut jac_x), Some(&mut jac_y), convention);
                let numeric_x =
                    numeric_group_jacobian(&x, convention, |p| p.compose(&y, None, None, convention));
                let numeric_y =
                    numeric_group_jacobian(&y, convention, |p| x.compose(p, None, None, convention));
                assert!((jac_x - numeric_x).norm() < FD_TOLERANCE, "{convention:?}");
                assert!((jac_y - numeric_y).norm() < FD_TOLERANCE, "{convention:?}");
            }
        }
    }

    #[test]
    fn test_se3_log_jacobian_all_conventions() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..5 {
            let x = random_pose(&mut rng);
            for convention in JacobianConvention::ALL {
                let mut analytic = Matrix6::zeros();
                x.log(Some(&mut analytic), convention);
                let mut numeric = Matrix6::zeros();
                for k in 0..6 {
                    let plus = x.oplus(&basis(k, FD_EPSILON), convention).log(None, convention);
                    let minus = x.oplus(&basis(k, -FD_EPSILON), convention).log(None, convention);
                    numeric.set_column(k, &((plus.coeffs() - minus.coeffs()) / (2.0 * FD_EPSILON)));
                }
                assert!((analytic - numeric).norm() < FD_TOLERANCE, "{convention:?}");
            }
        }
    }

    #[test]
    fn test_se3_values_do_not_depend_on_convention() {
        let x = SE3::from_translation_euler(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let y = SE3::from_translation_euler(-1.0, 0.5, 2.0, -0.3, 0.4, 0.1);
        let reference = JacobianConvention::default();
        for convention in JacobianConvention::ALL {
            assert_eq!(x.inverse(None, convention), x.inverse(None, reference));
            assert_eq!(
                x.compose(&y, None, None, convention),
                x.compose(&y, None, None, reference)
            );
            assert_eq!(x.log(None, convention), x.log(None, reference));
        }
    }
}
