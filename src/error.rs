//! Error types for the apex-metrics library
//!
//! This module provides the main error and result types used throughout the library.
//! All errors use the `thiserror` crate for automatic trait implementations.
//!
//! # Error Hierarchy
//!
//! - **`ApexMetricsError`** is the top-level error exposed to users via public APIs
//! - **Module errors** (`ManifoldError`, `MetricError`) are wrapped inside ApexMetricsError
//! - **Error sources** are preserved, allowing full error chain inspection
//!
//! Example error chain:
//! ```text
//! ApexMetricsError::Metric(
//!     MetricError::Manifold(
//!         ManifoldError::InvalidNumber
//!     )
//! )
//! ```

use crate::{manifold::ManifoldError, metrics::MetricError};
use std::error::Error as StdError;
use thiserror::Error;

/// Main result type used throughout the apex-metrics library
pub type ApexMetricsResult<T> = Result<T, ApexMetricsError>;

/// Main error type for the apex-metrics library
///
/// # Error Chain Access
///
/// ```rust,ignore
/// if let Err(e) = evaluate_batch(&metric, &lhs, &rhs, JacobianRequest::Both) {
///     let e = ApexMetricsError::from(e);
///     warn!("Full chain: {}", e.chain());
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApexMetricsError {
    /// Manifold operation errors
    #[error(transparent)]
    Manifold(#[from] ManifoldError),

    /// Metric evaluation errors
    #[error(transparent)]
    Metric(#[from] MetricError),
}

impl ApexMetricsError {
    /// Get the full error chain as a string for logging and debugging.
    ///
    /// One line per error, from the top-level error down to the root cause.
    pub fn chain(&self) -> String {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();

        while let Some(err) = source {
            chain.push(format!("  → {}", err));
            source = err.source();
        }

        chain.join("\n")
    }

    /// Get a compact single-line error chain for logging
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// error!("Evaluation failed: {}", apex_err.chain_compact());
    /// // Output: "Invalid manifold input → Invalid number: NaN or Inf detected"
    /// ```
    pub fn chain_compact(&self) -> String {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();

        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }

        chain.join(" → ")
    }
}
