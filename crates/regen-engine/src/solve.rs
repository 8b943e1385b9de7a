use tracing::{debug, instrument, warn};

use model_types::{ParamId, SolveFailure, SolveStatus};
use sketch_solver::{diagnose, solve_least_squares, Diagnosis, SolverConfig};

use crate::config::RegenConfig;
use crate::generate::{generate_group, generate_request, Generated};
use crate::model::Model;
use crate::store::{EntityStore, ParamStore};
use crate::system::System;

/// Solves one group's equation system.
///
/// On success the solver must leave the solved values in the system's params;
/// they are copied back into the live model. On failure nothing is copied.
pub trait GroupSolver {
    fn solve(&mut self, system: &mut System<'_>) -> SolveStatus;
}

/// The default solver: damped Gauss-Newton over the system's residuals.
#[derive(Debug, Clone)]
pub struct NumericSolver {
    pub config: SolverConfig,
    pub max_unknowns: usize,
}

impl NumericSolver {
    pub fn new(config: SolverConfig, max_unknowns: usize) -> Self {
        Self {
            config,
            max_unknowns,
        }
    }

    pub fn from_config(config: &RegenConfig) -> Self {
        Self::new(config.solver.clone(), config.max_unknowns)
    }
}

impl Default for NumericSolver {
    fn default() -> Self {
        Self::from_config(&RegenConfig::default())
    }
}

/// Map the solver's diagnosis onto a group status.
pub fn status_from_diagnosis(diagnosis: Diagnosis) -> SolveStatus {
    match diagnosis {
        Diagnosis::Solved { dof } => SolveStatus::Okay { dof },
        Diagnosis::Redundant => SolveStatus::Failed {
            failure: SolveFailure::RedundantConstraints,
        },
        Diagnosis::Inconsistent => SolveStatus::Failed {
            failure: SolveFailure::Inconsistent,
        },
        Diagnosis::DidNotConverge {
            iterations,
            residual,
        } => SolveStatus::Failed {
            failure: SolveFailure::DidNotConverge {
                iterations,
                residual,
            },
        },
    }
}

impl GroupSolver for NumericSolver {
    #[instrument(skip_all, fields(group = %system.group()))]
    fn solve(&mut self, system: &mut System<'_>) -> SolveStatus {
        let unknowns = system.unknown_count();
        if unknowns > self.max_unknowns {
            return SolveStatus::Failed {
                failure: SolveFailure::TooManyUnknowns {
                    unknowns,
                    max: self.max_unknowns,
                },
            };
        }
        let equations = system.equation_count();
        if equations == 0 {
            return SolveStatus::Okay { dof: unknowns };
        }

        let result = solve_least_squares(system.initial_guess(), equations, &self.config, |x, out| {
            system.evaluate(x, out)
        });
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                return SolveStatus::Failed {
                    failure: SolveFailure::Other {
                        reason: e.to_string(),
                    },
                }
            }
        };
        debug!(
            unknowns,
            equations,
            iterations = result.iterations,
            residual = result.final_residual,
            "group solve finished"
        );
        let status = status_from_diagnosis(diagnose(&result));
        if status.is_okay() {
            system.apply(&result.params);
        }
        status
    }
}

impl Model {
    /// Rebuild group `index` in isolation, solve it and write the solved
    /// values back into the live params.
    pub(crate) fn solve_group(&mut self, index: usize, solver: &mut dyn GroupSolver) -> SolveStatus {
        let group_id = self.groups[index].id;
        let mut generated = Generated::default();
        for request in self.requests.iter().filter(|r| r.group == group_id) {
            generate_request(request, &mut generated);
        }
        generate_group(&mut self.groups[index], &self.entities, &mut generated);

        let mut entities = EntityStore::new();
        let mut params = ParamStore::new();
        generated.insert_into(&mut entities, &mut params);
        for param in params.iter_mut() {
            param.known = false;
            if let Some(live) = self.params.get(param.id) {
                param.val = live.val;
            }
        }
        let constraints = self
            .constraints
            .iter()
            .filter(|c| c.group == group_id && !c.reference)
            .cloned()
            .collect();

        let mut system = System::new(
            group_id,
            entities,
            params,
            constraints,
            &self.entities,
            &self.params,
        );
        let status = solver.solve(&mut system);
        let solved: Vec<(ParamId, f64)> = if status.is_okay() {
            system.params().iter().map(|p| (p.id, p.val)).collect()
        } else {
            Vec::new()
        };
        drop(system);

        for (id, val) in solved {
            if let Some(param) = self.params.get_mut(id) {
                param.val = val;
            }
        }
        if let SolveStatus::Failed { failure } = &status {
            warn!(group = %group_id, ?failure, "group did not solve");
        }
        status
    }
}
