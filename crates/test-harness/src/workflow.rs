//! ModelBuilder: a named-object API for scripting editing sessions in tests.
//!
//! Every method goes through the engine's public editing operations, and
//! objects are addressed by the names given when they were created.

use std::collections::HashMap;

use model_types::{
    Constraint, ConstraintId, ConstraintKind, EntityId, GroupId, GroupKind, Predef, Request,
    RequestId, RequestKind,
};
use regen_engine::{Model, NumericSolver, ReferencePlane, RegenConfig, RegenReport};
use tracing::debug;

use crate::assertions;
use crate::helpers::{HarnessError, RecordingSolver};

#[derive(Debug, Clone, Copy)]
enum Named {
    Group(GroupId),
    Request(RequestId),
    Constraint(ConstraintId),
}

/// A builder for constructing, editing and regenerating models in tests.
///
/// Wraps a [`Model`] and a [`RecordingSolver`], so tests can inspect both
/// the model and every solver call made on its behalf.
pub struct ModelBuilder {
    pub model: Model,
    pub solver: RecordingSolver,
    pub last_report: Option<RegenReport>,
    named: HashMap<String, Named>,
    auto_check: bool,
}

impl ModelBuilder {
    /// A new model solved with the numeric solver. The initial 3D sketch is
    /// named "sketch-in-3d".
    pub fn new() -> Result<Self, HarnessError> {
        Self::with_solver(Model::new(), RecordingSolver::default())
    }

    /// A new model whose solver accepts every system without moving anything.
    pub fn keeping() -> Result<Self, HarnessError> {
        Self::with_solver(Model::new(), RecordingSolver::keeping())
    }

    pub fn with_config(config: RegenConfig) -> Result<Self, HarnessError> {
        let solver = RecordingSolver::numeric(NumericSolver::from_config(&config));
        Self::with_solver(Model::with_config(config), solver)
    }

    fn with_solver(mut model: Model, mut solver: RecordingSolver) -> Result<Self, HarnessError> {
        let report = model.after_new_file(&mut solver)?;
        let mut named = HashMap::new();
        if let Some(g) = model.groups.get(1) {
            named.insert(g.name.clone(), Named::Group(g.id));
        }
        Ok(Self {
            model,
            solver,
            last_report: Some(report),
            named,
            auto_check: false,
        })
    }

    /// After every regeneration, check all model oracles.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    // ── Names ───────────────────────────────────────────────────────────

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.named.contains_key(name) {
            return Err(HarnessError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Named, HarnessError> {
        self.named
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::NameNotFound {
                name: name.to_string(),
            })
    }

    pub fn group_id(&self, name: &str) -> Result<GroupId, HarnessError> {
        match self.lookup(name)? {
            Named::Group(id) => Ok(id),
            _ => Err(HarnessError::NameNotFound {
                name: format!("group {}", name),
            }),
        }
    }

    pub fn request_id(&self, name: &str) -> Result<RequestId, HarnessError> {
        match self.lookup(name)? {
            Named::Request(id) => Ok(id),
            _ => Err(HarnessError::NameNotFound {
                name: format!("request {}", name),
            }),
        }
    }

    pub fn constraint_id(&self, name: &str) -> Result<ConstraintId, HarnessError> {
        match self.lookup(name)? {
            Named::Constraint(id) => Ok(id),
            _ => Err(HarnessError::NameNotFound {
                name: format!("constraint {}", name),
            }),
        }
    }

    /// Workplane of a named group, or free 3D for groups without one.
    pub fn workplane_of(&self, group: &str) -> Result<EntityId, HarnessError> {
        let id = self.group_id(group)?;
        Ok(self
            .model
            .group(id)
            .and_then(|g| g.workplane())
            .unwrap_or(EntityId::None))
    }

    // ── Groups ──────────────────────────────────────────────────────────

    fn add_group(
        &mut self,
        name: &str,
        kind: GroupKind,
        op_a: Option<GroupId>,
        predef: Predef,
    ) -> Result<GroupId, HarnessError> {
        self.check_name_available(name)?;
        let id = self.model.add_group(name, kind, op_a, predef)?;
        self.named.insert(name.to_string(), Named::Group(id));
        debug!(name, group = %id, "builder added group");
        Ok(id)
    }

    /// A sketch group drawing in one of the reference planes.
    pub fn workplane_group(
        &mut self,
        name: &str,
        plane: ReferencePlane,
    ) -> Result<GroupId, HarnessError> {
        let predef = Predef {
            origin: plane.origin(),
            entity_b: plane.normal(),
            entity_c: EntityId::None,
        };
        self.add_group(name, GroupKind::DrawingWorkplane, None, predef)
    }

    pub fn drawing_3d(&mut self, name: &str) -> Result<GroupId, HarnessError> {
        self.add_group(name, GroupKind::Drawing3d, None, Predef::default())
    }

    pub fn extrude(
        &mut self,
        name: &str,
        operand: &str,
        translation: [f64; 3],
    ) -> Result<GroupId, HarnessError> {
        let op_a = self.group_id(operand)?;
        self.add_group(
            name,
            GroupKind::Extrude { translation },
            Some(op_a),
            Predef::default(),
        )
    }

    pub fn activate(&mut self, group: &str) -> Result<(), HarnessError> {
        let id = self.group_id(group)?;
        self.model.set_active_group(id)?;
        Ok(())
    }

    pub fn delete_group(&mut self, name: &str) -> Result<(), HarnessError> {
        let id = self.group_id(name)?;
        self.model.delete_group(id)?;
        self.named.remove(name);
        Ok(())
    }

    // ── Requests ────────────────────────────────────────────────────────

    fn add_request(
        &mut self,
        name: &str,
        group: &str,
        kind: RequestKind,
        seeds: &[f64],
    ) -> Result<RequestId, HarnessError> {
        self.check_name_available(name)?;
        let group_id = self.group_id(group)?;
        let request = Request::new(RequestId::new_v4(), group_id, kind)
            .in_workplane(self.workplane_of(group)?)
            .with_seeds(seeds.to_vec());
        let id = self.model.add_request(request)?;
        self.named.insert(name.to_string(), Named::Request(id));
        Ok(id)
    }

    /// A line segment in the group's workplane (or in 3D). Seeds are the
    /// coordinates of both endpoints, in order.
    pub fn line(&mut self, name: &str, group: &str, seeds: &[f64]) -> Result<RequestId, HarnessError> {
        self.add_request(name, group, RequestKind::LineSegment, seeds)
    }

    pub fn point(&mut self, name: &str, group: &str, seeds: &[f64]) -> Result<RequestId, HarnessError> {
        self.add_request(name, group, RequestKind::DatumPoint, seeds)
    }

    pub fn delete_request(&mut self, name: &str) -> Result<(), HarnessError> {
        let id = self.request_id(name)?;
        self.model.delete_request(id)?;
        self.named.remove(name);
        Ok(())
    }

    // ── Constraints ─────────────────────────────────────────────────────

    /// A constraint of `kind` in `group`, measured in the group's workplane.
    pub fn new_constraint(
        &self,
        group: &str,
        kind: ConstraintKind,
    ) -> Result<Constraint, HarnessError> {
        Ok(
            Constraint::new(ConstraintId::new_v4(), self.group_id(group)?, kind)
                .in_workplane(self.workplane_of(group)?),
        )
    }

    pub fn constrain(
        &mut self,
        name: &str,
        constraint: Constraint,
    ) -> Result<ConstraintId, HarnessError> {
        self.check_name_available(name)?;
        let id = self.model.add_constraint(constraint)?;
        self.named.insert(name.to_string(), Named::Constraint(id));
        Ok(id)
    }

    /// Hold the line `line` horizontal in its group's workplane.
    pub fn horizontal(&mut self, name: &str, group: &str, line: &str) -> Result<ConstraintId, HarnessError> {
        let line = self.request_id(line)?;
        let c = self
            .new_constraint(group, ConstraintKind::Horizontal)?
            .entities(line.entity(0), EntityId::None);
        self.constrain(name, c)
    }

    /// Fix the distance between the endpoints of `line`.
    pub fn length(
        &mut self,
        name: &str,
        group: &str,
        line: &str,
        value: f64,
    ) -> Result<ConstraintId, HarnessError> {
        let line = self.request_id(line)?;
        let c = self
            .new_constraint(group, ConstraintKind::PtPtDistance)?
            .points(line.entity(1), line.entity(2))
            .value(value);
        self.constrain(name, c)
    }

    pub fn delete_constraint(&mut self, name: &str) -> Result<(), HarnessError> {
        let id = self.constraint_id(name)?;
        self.model.delete_constraint(id)?;
        self.named.remove(name);
        Ok(())
    }

    // ── Regeneration ────────────────────────────────────────────────────

    pub fn regenerate(&mut self) -> Result<&RegenReport, HarnessError> {
        let report = self.model.regenerate(&mut self.solver)?;
        self.finish(report)
    }

    pub fn regenerate_range(
        &mut self,
        range: Option<std::ops::RangeInclusive<usize>>,
    ) -> Result<&RegenReport, HarnessError> {
        let report = self.model.regenerate_range(&mut self.solver, range)?;
        self.finish(report)
    }

    fn finish(&mut self, report: RegenReport) -> Result<&RegenReport, HarnessError> {
        if self.auto_check {
            assertions::assert_consistent(&self.model, "after regenerate")?;
        }
        Ok(self.last_report.insert(report))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// World position of point `index` of a named request: 0 for a datum
    /// point, 1 and 2 for a line's endpoints.
    pub fn point_at(&self, request: &str, index: u16) -> Result<[f64; 3], HarnessError> {
        let id = self.request_id(request)?.entity(index);
        self.model
            .point_position(id)
            .ok_or_else(|| HarnessError::AssertionFailed {
                detail: format!("{} point {} does not resolve", request, index),
            })
    }
}
