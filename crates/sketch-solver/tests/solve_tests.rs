use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use sketch_solver::*;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn solve<F>(initial: Vec<f64>, equations: usize, residuals: F) -> SolverResult
where
    F: FnMut(&[f64], &mut [f64]),
{
    solve_least_squares(initial, equations, &SolverConfig::default(), residuals)
        .expect("solver error")
}

// ── Diagnosis ───────────────────────────────────────────────────────────────

#[test]
fn fully_determined_system_is_solved_with_no_freedom() {
    let result = solve(vec![0.0, 0.0], 2, |x, out| {
        out[0] = x[0] + x[1] - 3.0;
        out[1] = x[0] - x[1] - 1.0;
    });
    assert_eq!(diagnose(&result), Diagnosis::Solved { dof: 0 });
    assert_abs_diff_eq!(result.params[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.params[1], 1.0, epsilon = 1e-9);
}

#[test]
fn under_determined_system_reports_remaining_freedom() {
    let result = solve(vec![5.0, 5.0, 5.0], 1, |x, out| {
        out[0] = x[0] - 1.0;
    });
    assert_eq!(diagnose(&result), Diagnosis::Solved { dof: 2 });
    assert_abs_diff_eq!(result.params[1], 5.0, epsilon = 1e-12);
}

#[test]
fn duplicated_equation_is_redundant() {
    let result = solve(vec![0.0], 2, |x, out| {
        out[0] = x[0] - 1.0;
        out[1] = 2.0 * x[0] - 2.0;
    });
    assert!(result.converged);
    assert_eq!(diagnose(&result), Diagnosis::Redundant);
}

#[test]
fn contradictory_equations_are_inconsistent() {
    let result = solve(vec![0.0], 2, |x, out| {
        out[0] = x[0] - 1.0;
        out[1] = x[0] - 2.0;
    });
    assert!(!result.converged);
    assert_eq!(diagnose(&result), Diagnosis::Inconsistent);
    // The iteration still lands on the least-squares compromise.
    assert_abs_diff_eq!(result.params[0], 1.5, epsilon = 1e-9);
}

#[test]
fn iteration_budget_exhausted_is_did_not_converge() {
    let config = SolverConfig {
        max_iterations: 0,
        ..SolverConfig::default()
    };
    let result = solve_least_squares(vec![0.0], 1, &config, |x, out| {
        out[0] = x[0] - 1.0;
    })
    .unwrap();
    assert_eq!(
        diagnose(&result),
        Diagnosis::DidNotConverge {
            iterations: 0,
            residual: 1.0
        }
    );
}

#[test]
fn unit_quaternion_equation_converges_from_unnormalized_guess() {
    let result = solve(vec![2.0, 0.5, 0.0, 0.0], 1, |q, out| {
        out[0] = q.iter().map(|v| v * v).sum::<f64>() - 1.0;
    });
    assert!(result.converged);
    let norm: f64 = result.params.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-9);
}

// ── Properties ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn distance_from_origin_always_reaches_radius(
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        radius in 0.5f64..50.0,
    ) {
        prop_assume!((x * x + y * y).sqrt() > 1e-3);
        let result = solve(vec![x, y], 1, |p, out| {
            out[0] = (p[0] * p[0] + p[1] * p[1]).sqrt() - radius;
        });
        prop_assert!(result.converged, "{:?}", result);
        let dist = (result.params[0].powi(2) + result.params[1].powi(2)).sqrt();
        prop_assert!((dist - radius).abs() < 1e-8);
    }
}
