//! Ordinary least squares linear regression
//!
//! Closed-form fit via the normal equations; standard errors from
//! `s^2 (X^T X)^-1`. The Gaussian log-likelihood at the ML variance
//! estimate supports likelihood-ratio tests against the reduced model.

use crate::algorithm::association::linalg::{invert, solve};
use crate::algorithm::association::types::NotTestableReason;
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// A completed least-squares fit
#[derive(Debug, Clone)]
pub struct LinearFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Array1<f64>,
    /// Standard errors, one per design column
    pub standard_errors: Array1<f64>,
    /// Residual degrees of freedom (n - p)
    pub df_residual: usize,
    /// Gaussian log-likelihood at the ML variance estimate
    pub log_likelihood: f64,
}

/// Fit a linear model of `y` on the design matrix `x`
pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearFit, NotTestableReason> {
    let n = x.nrows();
    let p = x.ncols();
    if n <= p {
        return Err(NotTestableReason::TooFewSamples);
    }

    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let beta = solve(&xtx, &xty).ok_or(NotTestableReason::SingularDesign)?;

    let residuals = y - &x.dot(&beta);
    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    let df_residual = n - p;
    let s2 = rss / df_residual as f64;

    let xtx_inv = invert(&xtx).ok_or(NotTestableReason::SingularDesign)?;
    let standard_errors = Array1::from_iter((0..p).map(|i| (s2 * xtx_inv[(i, i)]).sqrt()));

    // ML log-likelihood uses sigma^2 = rss / n
    let n_f = n as f64;
    let log_likelihood = -0.5 * n_f * ((2.0 * PI * rss / n_f).ln() + 1.0);

    Ok(LinearFit {
        coefficients: beta,
        standard_errors,
        df_residual,
        log_likelihood,
    })
}
