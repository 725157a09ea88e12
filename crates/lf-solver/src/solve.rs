//! High-level solver interface.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use crate::newton::{NewtonConfig, newton_solve};
use crate::problem::NetworkProblem;
use lf_core::Real;
use nalgebra::{DMatrix, DVector};
use tracing::info;

/// Starting value for every unknown when no guess is supplied.
pub const DEFAULT_GUESS: Real = 0.01;

/// Converged state of a network.
#[derive(Clone, Debug)]
pub struct NetworkSolution {
    /// Solved unknowns
    pub unknowns: Vec<Real>,
    /// Element through-quantities, indexed by element
    pub flows: Vec<Real>,
    /// Residuals at the solution, loops first then node rows
    pub residuals: Vec<Real>,
    /// Residual norm at convergence
    pub residual_norm: Real,
    /// Number of iterations
    pub iterations: usize,
}

impl NetworkSolution {
    /// Largest residual magnitude.
    pub fn max_residual(&self) -> Real {
        self.residuals.iter().fold(0.0, |m, r| m.max(r.abs()))
    }

    /// Check that every loop and node residual is within `tol` of zero.
    pub fn check_residuals(&self, tol: Real) -> SolverResult<()> {
        match self.residuals.iter().position(|r| r.abs() > tol) {
            Some(i) => Err(SolverError::Numeric {
                what: format!(
                    "residual {i} is {:.3e}, above tolerance {tol:.1e}",
                    self.residuals[i]
                ),
            }),
            None => Ok(()),
        }
    }
}

/// Solve a network problem.
///
/// This function:
/// 1. Validates the problem setup (branches, flow map, square system)
/// 2. Starts from `initial_guess`, or `DEFAULT_GUESS` for every unknown
/// 3. Runs damped Newton on the loop and node residuals
/// 4. Writes the solved element flows back onto the problem
///
/// # Arguments
/// * `problem` - The network problem to solve
/// * `config` - Optional Newton solver configuration
/// * `initial_guess` - Optional starting unknowns
pub fn solve(
    problem: &mut NetworkProblem,
    config: Option<NewtonConfig>,
    initial_guess: Option<&[Real]>,
) -> SolverResult<NetworkSolution> {
    problem.validate()?;

    let n = problem.num_unknowns();
    let x0 = match initial_guess {
        Some(guess) if guess.len() != n => {
            return Err(SolverError::ProblemSetup {
                what: format!("initial guess has {} values for {n} unknowns", guess.len()),
            });
        }
        Some(guess) if guess.iter().any(|v| !v.is_finite()) => {
            return Err(SolverError::ProblemSetup {
                what: "initial guess contains a non-finite value".to_string(),
            });
        }
        Some(guess) => DVector::from_column_slice(guess),
        None => DVector::from_element(n, DEFAULT_GUESS),
    };

    let cfg = config.unwrap_or_default();

    let result = {
        let problem: &NetworkProblem = problem;
        let residual_fn =
            |x: &DVector<f64>| -> SolverResult<DVector<f64>> { problem.residuals(x) };
        let jacobian_fn = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            finite_difference_jacobian(x, residual_fn, cfg.jacobian_step)
        };
        newton_solve(x0, residual_fn, jacobian_fn, &cfg)?
    };

    let flows = problem.flow_map().apply(&result.x)?;
    problem.store_flows(flows.clone());

    info!(
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        unknowns = n,
        "network solved"
    );

    Ok(NetworkSolution {
        unknowns: result.x.iter().copied().collect(),
        flows,
        residuals: result.residual.iter().copied().collect(),
        residual_norm: result.residual_norm,
        iterations: result.iterations,
    })
}
