//! SO3 - Special Orthogonal Group in 3D
//!
//! This module implements the rotation factor of SE(3).
//!
//! SO(3) elements are represented using nalgebra's UnitQuaternion internally.
//! SO(3) tangent elements are represented as axis-angle vectors in R³,
//! where the direction gives the axis of rotation and the magnitude gives the angle.
//!
//! The Jacobian-carrying group operations live on SE(3); this module provides the
//! rotation algebra they are assembled from (exp/log, left/right Jacobians and their
//! inverses, hat operator).

use crate::manifold::SMALL_ANGLE_SQUARED;
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// SO(3) group element representing rotations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO3 {
    /// Internal representation as a unit quaternion
    quaternion: UnitQuaternion<f64>,
}

impl Display for SO3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let q = self.quaternion.quaternion();
        write!(
            f,
            "SO3(quaternion: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            q.w, q.i, q.j, q.k
        )
    }
}

impl SO3 {
    /// Identity rotation.
    pub fn identity() -> Self {
        SO3 {
            quaternion: UnitQuaternion::identity(),
        }
    }

    /// Create from a unit quaternion.
    pub fn new(quaternion: UnitQuaternion<f64>) -> Self {
        SO3 { quaternion }
    }

    /// Create from quaternion coefficients, normalizing them.
    pub fn from_quaternion_coeffs(w: f64, x: f64, y: f64, z: f64) -> Self {
        SO3 {
            quaternion: UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
        }
    }

    /// Create from quaternion coefficients that are already normalized.
    ///
    /// No normalization or validation is performed.
    pub fn from_unit_coeffs_unchecked(w: f64, x: f64, y: f64, z: f64) -> Self {
        SO3 {
            quaternion: UnitQuaternion::new_unchecked(Quaternion::new(w, x, y, z)),
        }
    }

    /// Create from roll, pitch and yaw.
    pub fn from_euler_angles(roll: f64, pitch: f64, yaw: f64) -> Self {
        SO3 {
            quaternion: UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        }
    }

    /// Create from an axis-angle vector.
    pub fn from_scaled_axis(axis_angle: Vector3<f64>) -> Self {
        SO3Tangent::new(axis_angle).exp()
    }

    /// Get the underlying unit quaternion.
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Get the rotation matrix R.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.quaternion.to_rotation_matrix().into_inner()
    }

    /// Quaternion coefficients [w, x, y, z].
    pub fn coeffs(&self) -> [f64; 4] {
        let q = self.quaternion.quaternion();
        [q.w, q.i, q.j, q.k]
    }

    /// Inverse rotation Rᵀ.
    pub fn inverse(&self) -> Self {
        SO3 {
            quaternion: self.quaternion.inverse(),
        }
    }

    /// Composition R₁R₂.
    pub fn compose(&self, other: &Self) -> Self {
        SO3 {
            quaternion: self.quaternion * other.quaternion,
        }
    }

    /// Rotate a vector: Rv.
    pub fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion * vector
    }

    /// Logarithmic map to the axis-angle vector.
    ///
    /// # Notes
    /// θu = Log(q) = (2 / ||v||) * v * arctan(||v||, w) ∈ R³, taking the shortest
    /// rotation (angle in [0, π]) for either sign of the quaternion.
    pub fn log(&self) -> SO3Tangent {
        let q = self.quaternion.quaternion();
        let sin_angle_squared = q.i * q.i + q.j * q.j + q.k * q.k;

        let log_coeff = if sin_angle_squared > SMALL_ANGLE_SQUARED {
            let sin_angle = sin_angle_squared.sqrt();
            let cos_angle = q.w;

            // q and -q are the same rotation; fold w < 0 onto the shortest arc
            let two_angle = 2.0
                * if cos_angle < 0.0 {
                    f64::atan2(-sin_angle, -cos_angle)
                } else {
                    f64::atan2(sin_angle, cos_angle)
                };

            two_angle / sin_angle
        } else {
            // Small-angle approximation
            2.0 / q.w
        };

        SO3Tangent::new(Vector3::new(
            q.i * log_coeff,
            q.j * log_coeff,
            q.k * log_coeff,
        ))
    }

    /// Generate a random rotation with angle up to √3 rad.
    pub fn random() -> Self {
        SO3::from_scaled_axis(Vector3::new(
            rand::random::<f64>() * 2.0 - 1.0,
            rand::random::<f64>() * 2.0 - 1.0,
            rand::random::<f64>() * 2.0 - 1.0,
        ))
    }

    /// Re-normalize the quaternion.
    pub fn normalize(&mut self) {
        let q = self.quaternion.into_inner().normalize();
        self.quaternion = UnitQuaternion::new_unchecked(q);
    }

    /// Check if the quaternion is normalized.
    pub fn is_valid(&self, tolerance: f64) -> bool {
        (self.quaternion.norm() - 1.0).abs() < tolerance
    }
}

/// SO(3) tangent space element (axis-angle vector).
#[derive(Clone, Debug, PartialEq)]
pub struct SO3Tangent {
    /// Internal data: axis-angle vector [θx, θy, θz]
    data: Vector3<f64>,
}

impl Display for SO3Tangent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "so3(axis-angle: [{:.4}, {:.4}, {:.4}])",
            self.data.x, self.data.y, self.data.z
        )
    }
}

impl SO3Tangent {
    /// Create a new SO3Tangent from an axis-angle vector.
    pub fn new(axis_angle: Vector3<f64>) -> Self {
        SO3Tangent { data: axis_angle }
    }

    /// Get the axis-angle vector.
    pub fn coeffs(&self) -> Vector3<f64> {
        self.data
    }

    /// Exponential map.
    ///
    /// # Notes
    /// q = Exp(θu) = cos(θ/2) + u sin(θ/2) ∈ H
    pub fn exp(&self) -> SO3 {
        let theta_squared = self.data.norm_squared();

        let quaternion = if theta_squared > SMALL_ANGLE_SQUARED {
            UnitQuaternion::from_scaled_axis(self.data)
        } else {
            UnitQuaternion::from_quaternion(Quaternion::new(
                1.0,
                self.data.x / 2.0,
                self.data.y / 2.0,
                self.data.z / 2.0,
            ))
        };

        SO3 { quaternion }
    }

    /// Hat map.
    ///
    /// # Notes
    /// [θ]ₓ = [0 -θz θy; θz 0 -θx; -θy θx 0]
    pub fn hat(&self) -> Matrix3<f64> {
        skew(&self.data)
    }

    /// Left Jacobian.
    ///
    /// # Notes
    /// J_l(θ) = I + (1 - cos θ)/θ² [θ]ₓ + (θ - sin θ)/θ³ [θ]ₓ²
    pub fn left_jacobian(&self) -> Matrix3<f64> {
        let theta_squared = self.data.norm_squared();
        let w = self.hat();

        if theta_squared <= SMALL_ANGLE_SQUARED {
            Matrix3::identity() + 0.5 * w + (w * w) / 6.0
        } else {
            let theta = theta_squared.sqrt();
            let (sin_theta, cos_theta) = theta.sin_cos();

            Matrix3::identity()
                + (1.0 - cos_theta) / theta_squared * w
                + (theta - sin_theta) / (theta_squared * theta) * w * w
        }
    }

    /// Right Jacobian, J_r(θ) = J_l(-θ) = J_l(θ)ᵀ.
    pub fn right_jacobian(&self) -> Matrix3<f64> {
        self.left_jacobian().transpose()
    }

    /// Left Jacobian inverse.
    ///
    /// # Notes
    /// J_l⁻¹(θ) = I - (1/2) [θ]ₓ + (1/θ² - (1 + cos θ)/(2θ sin θ)) [θ]ₓ²
    pub fn left_jacobian_inv(&self) -> Matrix3<f64> {
        let theta_squared = self.data.norm_squared();
        let w = self.hat();

        if theta_squared <= SMALL_ANGLE_SQUARED {
            Matrix3::identity() - 0.5 * w + (w * w) / 12.0
        } else {
            let theta = theta_squared.sqrt();
            let (sin_theta, cos_theta) = theta.sin_cos();

            Matrix3::identity() - 0.5 * w
                + (1.0 / theta_squared - (1.0 + cos_theta) / (2.0 * theta * sin_theta)) * w * w
        }
    }

    /// Right Jacobian inverse, J_r⁻¹(θ) = J_l⁻¹(θ)ᵀ.
    pub fn right_jacobian_inv(&self) -> Matrix3<f64> {
        self.left_jacobian_inv().transpose()
    }
}

/// Skew-symmetric matrix [v]ₓ such that [v]ₓ u = v × u.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_so3_identity() {
        let so3 = SO3::identity();
        assert_eq!(so3.coeffs(), [1.0, 0.0, 0.0, 0.0]);
        assert!(so3.log().coeffs().norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_normalize() {
        let mut so3 = SO3::from_unit_coeffs_unchecked(0.0, 0.0, 3.0, 4.0);
        assert!(!so3.is_valid(TOLERANCE));

        so3.normalize();
        assert!(so3.is_valid(TOLERANCE));
        for (value, expected) in so3.coeffs().iter().zip([0.0, 0.0, 0.6, 0.8]) {
            assert!((value - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_so3_from_quaternion_coeffs_normalizes() {
        let so3 = SO3::from_quaternion_coeffs(0.4, 0.1, 0.2, 0.3);
        let expected = Quaternion::new(0.4, 0.1, 0.2, 0.3).normalize();
        let coeffs = so3.coeffs();
        assert!((coeffs[0] - expected.w).abs() < TOLERANCE);
        assert!((coeffs[1] - expected.i).abs() < TOLERANCE);
        assert!((coeffs[2] - expected.j).abs() < TOLERANCE);
        assert!((coeffs[3] - expected.k).abs() < TOLERANCE);
        assert!(so3.is_valid(TOLERANCE));
    }

    #[test]
    fn test_so3_exp_log() {
        let theta = Vector3::new(0.3, -1.1, 0.7);
        let rotation = SO3Tangent::new(theta).exp();
        assert!((rotation.log().coeffs() - theta).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_log_takes_shortest_arc() {
        let theta = Vector3::new(0.0, 0.0, 0.5);
        let rotation = SO3Tangent::new(theta).exp();
        // Same rotation, negated quaternion
        let q = rotation.coeffs();
        let flipped = SO3::from_unit_coeffs_unchecked(-q[0], -q[1], -q[2], -q[3]);
        assert!((flipped.log().coeffs() - theta).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_log_near_pi() {
        let theta = Vector3::new(PI - 1e-3, 0.0, 0.0);
        let rotation = SO3Tangent::new(theta).exp();
        assert!((rotation.log().coeffs() - theta).norm() < 1e-9);
    }

    #[test]
    fn test_so3_small_angle_log() {
        let theta = Vector3::new(1e-7, -2e-7, 3e-8);
        let rotation = SO3Tangent::new(theta).exp();
        assert!((rotation.log().coeffs() - theta).norm() < 1e-15);
    }

    #[test]
    fn test_so3_act_matches_rotation_matrix() {
        let rotation = SO3::from_euler_angles(0.1, 0.2, 0.3);
        let v = Vector3::new(1.0, -2.0, 0.5);
        assert!((rotation.act(&v) - rotation.rotation_matrix() * v).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_compose_inverse_is_identity() {
        let rotation = SO3::from_euler_angles(0.4, -0.2, 1.3);
        let product = rotation.compose(&rotation.inverse());
        assert!(product.log().coeffs().norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_jacobian_inverses() {
        for theta in [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1e-6, 0.0, -1e-6),
            Vector3::new(0.5, -0.3, 0.2),
            Vector3::new(1.5, 1.0, -0.8),
        ] {
            let tangent = SO3Tangent::new(theta);
            let left = tangent.left_jacobian() * tangent.left_jacobian_inv();
            let right = tangent.right_jacobian() * tangent.right_jacobian_inv();
            assert!((left - Matrix3::identity()).norm() < 1e-10);
            assert!((right - Matrix3::identity()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_so3_left_jacobian_matches_finite_differences() {
        // Exp(θ + δ) ≈ Exp(J_l δ) Exp(θ)
        let tangent = SO3Tangent::new(Vector3::new(0.7, -0.4, 1.1));
        let base = tangent.exp();
        let jacobian = tangent.left_jacobian();
        let eps = 1e-6;
        for k in 0..3 {
            let mut delta = Vector3::zeros();
            delta[k] = eps;
            let plus = SO3Tangent::new(tangent.coeffs() + delta).exp();
            let minus = SO3Tangent::new(tangent.coeffs() - delta).exp();
            let numeric = (plus.compose(&base.inverse()).log().coeffs()
                - minus.compose(&base.inverse()).log().coeffs())
                / (2.0 * eps);
            assert!((numeric - jacobian.column(k)).norm() < 1e-8);
        }
    }

    #[test]
    fn test_skew_is_cross_product() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let u = Vector3::new(-0.5, 0.25, 4.0);
        assert!((skew(&v) * u - v.cross(&u)).norm() < TOLERANCE);
    }
}
