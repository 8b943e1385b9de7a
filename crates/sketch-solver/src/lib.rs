//! Nonlinear least-squares solver behind the regeneration engine's solver boundary.
//!
//! The solver knows nothing about entities or constraints: it drives a
//! residual function of a flat unknown vector to zero and reports how well
//! conditioned the system was, which [`status::diagnose`] turns into a verdict.

pub mod solver;
pub mod status;

pub use solver::{solve_least_squares, SolverConfig, SolverError, SolverResult};
pub use status::{diagnose, Diagnosis};
