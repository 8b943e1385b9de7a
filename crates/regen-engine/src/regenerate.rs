//! The regeneration pass.
//!
//! Every pass rebuilds all entities and params from the construction
//! history. Params survive only as warm-start guesses: values from the
//! previous pass seed the new ones. Whenever the pruner removes an object
//! the pass is abandoned and restarted, so a finished pass never sees a
//! dangling handle.

use std::ops::RangeInclusive;

use tracing::{debug, info, instrument};

use model_types::{GroupId, SolveStatus};

use crate::generate::{generate_group, generate_request, Generated};
use crate::mesh::{generate_mesh, generate_polygon};
use crate::model::Model;
use crate::solve::GroupSolver;
use crate::store::ParamStore;
use crate::system::measure;
use crate::types::{DeletionNotice, EngineError, RegenReport, Selection};

enum Pass {
    Complete,
    /// Something was pruned; the pass must start over.
    Pruned,
}

impl Model {
    /// Regenerate, solving every group from the first dirty one up to the
    /// active group.
    ///
    /// Nothing is solved when no group is dirty or the active group is the
    /// references group.
    pub fn regenerate(&mut self, solver: &mut dyn GroupSolver) -> Result<RegenReport, EngineError> {
        let first_dirty = self
            .groups
            .iter()
            .position(|g| !g.clean || !g.solved.is_okay());
        let last_visible = self.active_group_index().unwrap_or(0);
        match first_dirty {
            Some(first) if last_visible != 0 => {
                self.regenerate_range(solver, Some(first..=last_visible))
            }
            _ => self.regenerate_range(solver, None),
        }
    }

    /// Regenerate, solving only the groups whose history positions fall in `range`.
    #[instrument(skip(self, solver))]
    pub fn regenerate_range(
        &mut self,
        solver: &mut dyn GroupSolver,
        range: Option<RangeInclusive<usize>>,
    ) -> Result<RegenReport, EngineError> {
        let budget = self.object_count() + 1;
        let mut restarts = 0;
        let mut solved = Vec::new();

        while let Pass::Pruned = self.generate_pass(solver, range.as_ref(), &mut solved)? {
            restarts += 1;
            if restarts > budget {
                return Err(EngineError::Invariant {
                    detail: format!("regeneration still pruning after {} restarts", restarts),
                });
            }
            solved.clear();
            debug!(restarts, "pruned an object, restarting pass");
        }

        self.update_reference_constraints();
        self.clear_nonexistent_selection();
        let deletions = self.take_deletion_notice();
        self.all_consistent = true;
        self.later.regenerate = false;

        Ok(RegenReport {
            repaint: true,
            deletions,
            restarts,
            solved,
        })
    }

    fn generate_pass(
        &mut self,
        solver: &mut dyn GroupSolver,
        range: Option<&RangeInclusive<usize>>,
        solved: &mut Vec<(GroupId, SolveStatus)>,
    ) -> Result<Pass, EngineError> {
        while self.prune_orphans() {}

        let prev = self.params.take();
        self.entities.clear();

        for index in 0..self.groups.len() {
            let group_id = self.groups[index].id;
            if self.prune_group(group_id) {
                return Ok(self.abandon_pass(prev));
            }

            let mut generated = Generated::default();
            for request in self.requests.iter().filter(|r| r.group == group_id) {
                generate_request(request, &mut generated);
            }
            generate_group(&mut self.groups[index], &self.entities, &mut generated);
            let fresh = generated.param_ids();
            generated.insert_into(&mut self.entities, &mut self.params);

            let pruned = match self.prune_requests(group_id) {
                Ok(pruned) => pruned || self.prune_constraints(group_id),
                Err(e) => {
                    self.abandon_pass(prev);
                    return Err(e);
                }
            };
            if pruned {
                return Ok(self.abandon_pass(prev));
            }

            for id in &fresh {
                if let (Some(param), Some(old)) = (self.params.get_mut(*id), prev.get(*id)) {
                    if !param.known {
                        param.val = old.val;
                    }
                }
            }

            if group_id == GroupId::REFERENCES {
                if let Err(e) = self.force_references() {
                    self.abandon_pass(prev);
                    return Err(e);
                }
                let group = &mut self.groups[index];
                group.solved = SolveStatus::Okay { dof: 0 };
                group.clean = true;
            } else if range.map_or(false, |r| r.contains(&index)) {
                let status = self.solve_group(index, solver);
                self.regenerate_caches(index);
                let group = &mut self.groups[index];
                group.solved = status.clone();
                group.clean = true;
                solved.push((group_id, status));
            } else {
                for id in &fresh {
                    if let Some(param) = self.params.get_mut(*id) {
                        param.known = true;
                    }
                }
            }
        }
        Ok(Pass::Complete)
    }

    /// Put the previous pass's params back so the retry warm-starts from them.
    fn abandon_pass(&mut self, prev: ParamStore) -> Pass {
        self.params = prev;
        Pass::Pruned
    }

    fn regenerate_caches(&mut self, index: usize) {
        let geometry = self.geometry();
        let group = &self.groups[index];
        let polygon = generate_polygon(group, &self.entities, &geometry);
        let mesh = generate_mesh(group, &self.entities, &geometry);
        let group = &mut self.groups[index];
        group.polygon = polygon;
        group.mesh = mesh;
    }

    /// Reference dimensions show what the geometry currently measures.
    fn update_reference_constraints(&mut self) {
        let geometry = self.geometry();
        let measured: Vec<(usize, f64)> = self
            .constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| c.reference)
            .filter_map(|(i, c)| measure(c, &geometry).map(|v| (i, v)))
            .collect();
        for (i, value) in measured {
            self.constraints[i].value = value;
        }
    }

    fn clear_nonexistent_selection(&mut self) {
        let before = self.selection.len();
        let selection = std::mem::take(&mut self.selection);
        self.selection = selection
            .into_iter()
            .filter(|s| match s {
                Selection::Entity(e) => self.entity_exists(*e),
                Selection::Constraint(c) => self.constraint(*c).is_some(),
            })
            .collect();
        if self.selection.len() != before {
            debug!(dropped = before - self.selection.len(), "cleared stale selection");
        }
    }

    fn take_deletion_notice(&mut self) -> Option<DeletionNotice> {
        if !self.deleted.any() {
            return None;
        }
        let counts = std::mem::take(&mut self.deleted);
        if self.active_group.map_or(true, |id| !self.group_exists(id)) {
            self.active_group = self.groups.last().map(|g| g.id);
        }
        self.selection.clear();
        let notice = DeletionNotice { counts };
        info!(
            requests = counts.requests,
            constraints = counts.constraints,
            groups = counts.groups,
            "{}",
            notice
        );
        Some(notice)
    }

    /// Ask for a regeneration the next time [`Model::do_later`] runs.
    pub fn schedule_regenerate(&mut self) {
        self.later.regenerate = true;
    }

    /// Run any deferred regeneration.
    pub fn do_later(
        &mut self,
        solver: &mut dyn GroupSolver,
    ) -> Result<Option<RegenReport>, EngineError> {
        if !self.later.regenerate {
            return Ok(None);
        }
        self.regenerate(solver).map(Some)
    }

    /// Bring a freshly loaded or created model up to date: generate
    /// everything without solving, then solve every group.
    pub fn after_new_file(
        &mut self,
        solver: &mut dyn GroupSolver,
    ) -> Result<RegenReport, EngineError> {
        self.regenerate_range(solver, None)?;
        let last = self.groups.len().saturating_sub(1);
        let report = self.regenerate_range(solver, Some(0..=last))?;
        self.unsaved = false;
        Ok(report)
    }
}
