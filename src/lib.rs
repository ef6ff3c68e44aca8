//! # Apex Metrics
//!
//! SE(3) distance metrics with analytic Jacobians for pose-graph and calibration
//! optimizers.
//!
//! The central operation is the geodesic distance between two poses,
//!
//! ```text
//! r = Log(lhs ∘ rhs⁻¹) ∈ R⁶
//! ```
//!
//! together with `∂r/∂lhs` and `∂r/∂rhs`, computed in closed form by chaining the
//! Jacobians of the inverse, composition and logarithm of SE(3).
//!
//! ## Features
//!
//! - **Four Jacobian conventions**: local or global perturbations, on SE(3) (coupled) or
//!   on SO(3) × R³ (decoupled), see [`JacobianConvention`]
//! - **Typed and raw entry points**: nalgebra types, or fixed-size `f64` parameter blocks
//!   `[tx, ty, tz, qw, qx, qy, qz]` as stored by optimizers
//! - **Uniform metric interface**: the [`Metric`] trait and [`MetricKind`] enum
//! - **Batch evaluation**: many pairs at once, in parallel with the `parallel` feature
//!
//! ## Example
//!
//! ```
//! use apex_metrics::{JacobianConvention, SE3Metric};
//! use apex_metrics::manifold::se3::SE3;
//! use nalgebra::Matrix6;
//!
//! let lhs = SE3::from_translation_euler(1.0, 0.0, 0.0, 0.0, 0.0, 0.1);
//! let rhs = SE3::from_translation_euler(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
//!
//! let metric = SE3Metric::new(JacobianConvention::local());
//! let mut jacobian_lhs = Matrix6::zeros();
//! let residual = metric.distance(&lhs, &rhs, Some(&mut jacobian_lhs), None);
//!
//! assert!((residual.theta().z - 0.1).abs() < 1e-12);
//! ```

pub mod error;
#[cfg(feature = "logging")]
pub mod logger;
pub mod manifold;
pub mod metrics;

pub use error::{ApexMetricsError, ApexMetricsResult};
#[cfg(feature = "logging")]
pub use logger::{init_logger, init_logger_with_level};
pub use manifold::{DEFAULT_COUPLED, DEFAULT_GLOBAL, JacobianConvention, LieGroup, Tangent};
pub use metrics::{
    BatchEvaluation, EuclideanMetric, JacobianRequest, Metric, MetricKind, SE3Metric,
    evaluate_batch,
};
