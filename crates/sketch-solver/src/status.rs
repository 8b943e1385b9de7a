use crate::solver::SolverResult;

/// What a finished solve says about the system it was given.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// Converged with independent equations; `dof` unknowns remain free.
    Solved { dof: usize },
    /// Converged, but some equations duplicate others.
    Redundant,
    /// Dependent equations that disagree; no point satisfies them all.
    Inconsistent,
    DidNotConverge { iterations: usize, residual: f64 },
}

/// Classify a SolverResult by convergence and Jacobian rank.
pub fn diagnose(result: &SolverResult) -> Diagnosis {
    let deficient = result.rank < result.equations;
    match (result.converged, deficient) {
        (true, false) => Diagnosis::Solved {
            dof: result.unknowns().saturating_sub(result.rank),
        },
        (true, true) => Diagnosis::Redundant,
        (false, true) => Diagnosis::Inconsistent,
        (false, false) => Diagnosis::DidNotConverge {
            iterations: result.iterations,
            residual: result.final_residual,
        },
    }
}
