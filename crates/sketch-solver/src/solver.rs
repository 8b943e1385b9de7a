use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

/// Halvings tried before a Newton step is declared stalled.
const MAX_BACKTRACK: usize = 20;

/// Result of running the solver.
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub converged: bool,
    pub iterations: usize,
    /// Largest absolute residual at the final point.
    pub final_residual: f64,
    /// Numerical rank of the Jacobian at the final point.
    pub rank: usize,
    pub equations: usize,
    /// Final values of the unknowns, in input order.
    pub params: Vec<f64>,
}

impl SolverResult {
    pub fn unknowns(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, Error)]
pub enum SolverError {
    #[error("residual is not finite at the initial guess (equation {equation})")]
    NonFiniteResidual { equation: usize },

    #[error("linear step failed: {reason}")]
    StepFailed { reason: String },
}

/// Configuration for the damped Gauss-Newton iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Converged once every residual is below this in absolute value.
    pub tolerance: f64,
    /// Singular values below this count as zero when ranking the Jacobian.
    pub rank_tolerance: f64,
    /// Relative step for the central-difference Jacobian.
    pub finite_difference_step: f64,
    /// Fraction of the full Newton step tried first.
    pub damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-9,
            rank_tolerance: 1e-8,
            finite_difference_step: 1e-6,
            damping: 1.0,
        }
    }
}

/// Drive `residuals` to zero starting from `initial`.
///
/// `residuals(x, out)` must write exactly `equations` values into `out`.
/// Each iteration solves the linearized system in the least-squares sense
/// through an SVD, so under- and over-determined systems are both accepted;
/// the step is halved until the sum of squares decreases.
#[instrument(skip(initial, config, residuals), fields(unknowns = initial.len()))]
pub fn solve_least_squares<F>(
    initial: Vec<f64>,
    equations: usize,
    config: &SolverConfig,
    mut residuals: F,
) -> Result<SolverResult, SolverError>
where
    F: FnMut(&[f64], &mut [f64]),
{
    let n = initial.len();
    let mut x = initial;
    let mut r = vec![0.0; equations];
    residuals(&x, &mut r);
    if let Some(equation) = r.iter().position(|v| !v.is_finite()) {
        return Err(SolverError::NonFiniteResidual { equation });
    }

    let mut iterations = 0;
    let mut norm = max_abs(&r);
    let mut trial = vec![0.0; n];
    let mut r_trial = vec![0.0; equations];

    while norm >= config.tolerance && iterations < config.max_iterations && n > 0 {
        iterations += 1;

        let jac = jacobian(&mut residuals, &x, equations, config.finite_difference_step);
        let step = jac
            .svd(true, true)
            .solve(&DVector::from_column_slice(&r), config.rank_tolerance)
            .map_err(|reason| SolverError::StepFailed {
                reason: reason.to_string(),
            })?;

        let current = sum_sq(&r);
        let mut scale = config.damping;
        let mut improved = false;
        for _ in 0..MAX_BACKTRACK {
            for i in 0..n {
                trial[i] = x[i] - scale * step[i];
            }
            residuals(&trial, &mut r_trial);
            let candidate = sum_sq(&r_trial);
            if candidate.is_finite() && candidate < current {
                x.copy_from_slice(&trial);
                r.copy_from_slice(&r_trial);
                improved = true;
                break;
            }
            scale *= 0.5;
        }

        norm = max_abs(&r);
        trace!(iterations, residual = norm, scale, "newton step");
        if !improved {
            debug!(iterations, residual = norm, "newton iteration stalled");
            break;
        }
    }

    let rank = if n == 0 || equations == 0 {
        0
    } else {
        jacobian(&mut residuals, &x, equations, config.finite_difference_step)
            .rank(config.rank_tolerance)
    };

    Ok(SolverResult {
        converged: norm < config.tolerance,
        iterations,
        final_residual: norm,
        rank,
        equations,
        params: x,
    })
}

/// Central-difference Jacobian of `residuals` at `x`.
fn jacobian<F>(residuals: &mut F, x: &[f64], equations: usize, h: f64) -> DMatrix<f64>
where
    F: FnMut(&[f64], &mut [f64]),
{
    let n = x.len();
    let mut jac = DMatrix::zeros(equations, n);
    let mut probe = x.to_vec();
    let mut plus = vec![0.0; equations];
    let mut minus = vec![0.0; equations];

    for j in 0..n {
        let orig = probe[j];
        let step = h * orig.abs().max(1.0);
        probe[j] = orig + step;
        residuals(&probe, &mut plus);
        probe[j] = orig - step;
        residuals(&probe, &mut minus);
        probe[j] = orig;
        for i in 0..equations {
            jac[(i, j)] = (plus[i] - minus[i]) / (2.0 * step);
        }
    }
    jac
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

fn sum_sq(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}
