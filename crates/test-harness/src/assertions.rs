//! Assertion helpers with diagnostic output.
//!
//! Failures carry the context string, expected vs actual, and for model-wide
//! checks the detail of every failed oracle.

use model_types::GroupId;
use regen_engine::Model;

use crate::helpers::HarnessError;
use crate::oracle::{self, OracleVerdict};

fn verdict_to_result(verdict: OracleVerdict, ctx: &str) -> Result<(), HarnessError> {
    if verdict.passed {
        Ok(())
    } else {
        Err(HarnessError::OracleFailure {
            oracle: verdict.oracle_name,
            detail: format!("[{}] {}", ctx, verdict.detail),
        })
    }
}

/// Assert every whole-model oracle passes.
pub fn assert_consistent(model: &Model, ctx: &str) -> Result<(), HarnessError> {
    let failures: Vec<String> = oracle::check_all(model)
        .into_iter()
        .filter(|v| !v.passed)
        .map(|v| format!("{}: {}", v.oracle_name, v.detail))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{}] {}", ctx, failures.join(" | ")),
        })
    }
}

pub fn assert_reference_frames(model: &Model, ctx: &str) -> Result<(), HarnessError> {
    verdict_to_result(oracle::check_reference_frames(model), ctx)
}

pub fn assert_group_params_known(
    model: &Model,
    group: GroupId,
    known: bool,
    ctx: &str,
) -> Result<(), HarnessError> {
    verdict_to_result(oracle::check_group_params_known(model, group, known), ctx)
}

/// Assert a point lies within `tol` of `expected` on every axis.
pub fn assert_point_near(
    actual: [f64; 3],
    expected: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    for i in 0..3 {
        if (actual[i] - expected[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] axis {}: expected {:?}, got {:?} (tol={})",
                    ctx, i, expected, actual, tol,
                ),
            });
        }
    }
    Ok(())
}
