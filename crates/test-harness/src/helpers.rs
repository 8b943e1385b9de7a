use std::collections::HashMap;

use model_types::{GroupId, ParamId, SolveStatus};
use regen_engine::{EngineError, GroupSolver, NumericSolver, System};
use tracing_subscriber::EnvFilter;

/// Errors from harness operations.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("no object named {name}")]
    NameNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
/// Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Recording Solver ────────────────────────────────────────────────────────

/// What one solver invocation was handed and what it returned.
#[derive(Debug, Clone)]
pub struct SolveCall {
    pub group: GroupId,
    /// Unknowns in solver order.
    pub unknowns: Vec<ParamId>,
    /// Values the unknowns held when the solver was called.
    pub initial: Vec<f64>,
    /// True when no param in the system was marked known.
    pub all_unknown: bool,
    pub equations: usize,
    pub status: SolveStatus,
}

/// A [`GroupSolver`] that logs every call.
///
/// Delegates to [`NumericSolver`], or when built with [`RecordingSolver::keeping`]
/// reports success without moving anything. Individual groups can be forced
/// to a given status.
pub struct RecordingSolver {
    inner: Option<NumericSolver>,
    forced: HashMap<GroupId, SolveStatus>,
    pub calls: Vec<SolveCall>,
}

impl RecordingSolver {
    pub fn numeric(inner: NumericSolver) -> Self {
        Self {
            inner: Some(inner),
            forced: HashMap::new(),
            calls: Vec::new(),
        }
    }

    pub fn keeping() -> Self {
        Self {
            inner: None,
            forced: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Make every solve of `group` return `status` without touching values.
    pub fn force(&mut self, group: GroupId, status: SolveStatus) {
        self.forced.insert(group, status);
    }

    pub fn calls_for(&self, group: GroupId) -> impl Iterator<Item = &SolveCall> {
        self.calls.iter().filter(move |c| c.group == group)
    }

    pub fn solved_groups(&self) -> Vec<GroupId> {
        self.calls.iter().map(|c| c.group).collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for RecordingSolver {
    fn default() -> Self {
        Self::numeric(NumericSolver::default())
    }
}

impl GroupSolver for RecordingSolver {
    fn solve(&mut self, system: &mut System<'_>) -> SolveStatus {
        let unknowns: Vec<ParamId> = system.params().keys().collect();
        let initial = system.initial_guess();
        let all_unknown = system.params().iter().all(|p| !p.known);
        let equations = system.equation_count();

        let status = match (self.forced.get(&system.group()), &mut self.inner) {
            (Some(status), _) => status.clone(),
            (None, Some(inner)) => inner.solve(system),
            (None, None) => SolveStatus::Okay {
                dof: unknowns.len(),
            },
        };
        self.calls.push(SolveCall {
            group: system.group(),
            unknowns,
            initial,
            all_unknown,
            equations,
            status: status.clone(),
        });
        status
    }
}
