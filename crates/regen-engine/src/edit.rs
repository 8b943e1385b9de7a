//! User edits. Each one records an undo snapshot, marks the affected groups
//! dirty and schedules a regeneration.

use tracing::debug;

use model_types::{
    Constraint, ConstraintId, EntityId, Group, GroupId, GroupKind, ParamId, Predef, Request,
    RequestId,
};

use crate::model::Model;
use crate::types::{EngineError, Selection};
use crate::undo::Snapshot;

impl Model {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            groups: self.groups.clone(),
            requests: self.requests.clone(),
            constraints: self.constraints.clone(),
            params: self.params.clone(),
            active_group: self.active_group,
        }
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        self.undo.push(snapshot);
    }

    fn touched(&mut self) {
        self.unsaved = true;
        self.all_consistent = false;
        self.schedule_regenerate();
    }

    /// Mark group `id` and every later group as needing a solve.
    pub fn mark_group_dirty(&mut self, id: GroupId) -> Result<(), EngineError> {
        let index = self
            .group_index(id)
            .ok_or(EngineError::GroupNotFound { id })?;
        self.mark_dirty_from(index);
        Ok(())
    }

    fn mark_dirty_from(&mut self, index: usize) {
        for group in self.groups.iter_mut().skip(index) {
            group.clean = false;
        }
        self.unsaved = true;
    }

    /// Mark dirty the group that generated entity `id`.
    pub fn mark_group_dirty_by_entity(&mut self, id: EntityId) -> Result<(), EngineError> {
        let group = self
            .entity(id)
            .map(|e| e.group)
            .ok_or(EngineError::EntityNotFound { id })?;
        self.mark_group_dirty(group)
    }

    /// Insert a new group right after the active one and make it active.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        kind: GroupKind,
        op_a: Option<GroupId>,
        predef: Predef,
    ) -> Result<GroupId, EngineError> {
        let position = self
            .active_group_index()
            .map_or(self.groups.len(), |i| i + 1);
        let id = GroupId::new_v4();
        if let Some(operand) = op_a {
            let operand_index = self
                .group_index(operand)
                .ok_or(EngineError::GroupNotFound { id: operand })?;
            if operand_index >= position {
                return Err(EngineError::OperandNotEarlier { group: id, operand });
            }
        }

        self.record();
        let mut group = Group::new(id, name, kind);
        group.op_a = op_a;
        group.predef = predef;
        debug!(group = %id, name = %group.name, position, "added group");
        self.groups.insert(position, group);
        self.active_group = Some(id);
        self.mark_dirty_from(position);
        self.touched();
        Ok(id)
    }

    pub fn add_request(&mut self, request: Request) -> Result<RequestId, EngineError> {
        let group = request.group;
        let index = self
            .group_index(group)
            .ok_or(EngineError::GroupNotFound { id: group })?;
        self.record();
        let id = request.id;
        self.requests.push(request);
        self.mark_dirty_from(index);
        self.touched();
        Ok(id)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, EngineError> {
        let group = constraint.group;
        let index = self
            .group_index(group)
            .ok_or(EngineError::GroupNotFound { id: group })?;
        self.record();
        let id = constraint.id;
        self.constraints.push(constraint);
        self.mark_dirty_from(index);
        self.touched();
        Ok(id)
    }

    /// Delete a group. Its requests and constraints, and anything built on
    /// its geometry, are pruned by the next regeneration.
    pub fn delete_group(&mut self, id: GroupId) -> Result<(), EngineError> {
        if id == GroupId::REFERENCES {
            return Err(EngineError::CannotDeleteReferences);
        }
        let index = self
            .group_index(id)
            .ok_or(EngineError::GroupNotFound { id })?;
        self.record();
        self.groups.remove(index);
        if self.active_group == Some(id) {
            self.active_group = self.groups.get(index.saturating_sub(1)).map(|g| g.id);
        }
        self.selection.clear();
        self.mark_dirty_from(index);
        self.touched();
        Ok(())
    }

    pub fn delete_request(&mut self, id: RequestId) -> Result<(), EngineError> {
        if id.is_reference() {
            return Err(EngineError::CannotDeleteReferences);
        }
        let position = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::RequestNotFound { id })?;
        self.record();
        let request = self.requests.remove(position);
        self.mark_group_dirty(request.group)?;
        self.touched();
        Ok(())
    }

    pub fn delete_constraint(&mut self, id: ConstraintId) -> Result<(), EngineError> {
        let position = self
            .constraints
            .iter()
            .position(|c| c.id == id)
            .ok_or(EngineError::ConstraintNotFound { id })?;
        self.record();
        let constraint = self.constraints.remove(position);
        self.mark_group_dirty(constraint.group)?;
        self.touched();
        Ok(())
    }

    /// Move a param, as a drag would. The new value becomes the warm start
    /// for the owning group's next solve.
    pub fn set_param_value(&mut self, id: ParamId, val: f64) -> Result<(), EngineError> {
        let owner = self
            .param(id)
            .map(|p| p.owner)
            .ok_or(EngineError::ParamNotFound { id })?;
        self.record();
        if let Some(param) = self.params.get_mut(id) {
            param.val = val;
        }
        self.mark_group_dirty_by_entity(owner)?;
        self.touched();
        Ok(())
    }

    /// Change a dimension, in millimeters.
    pub fn set_dimension(&mut self, id: ConstraintId, value: f64) -> Result<(), EngineError> {
        let group = self
            .constraint(id)
            .map(|c| c.group)
            .ok_or(EngineError::ConstraintNotFound { id })?;
        self.record();
        if let Some(constraint) = self.constraints.iter_mut().find(|c| c.id == id) {
            constraint.value = value;
        }
        self.mark_group_dirty(group)?;
        self.touched();
        Ok(())
    }

    /// Change a dimension to a value typed in the view units.
    pub fn set_dimension_from_user(
        &mut self,
        id: ConstraintId,
        value: f64,
    ) -> Result<(), EngineError> {
        let mm = self.config.length_from_user(value);
        self.set_dimension(id, mm)
    }

    /// Make `id` the active group. Groups after it are not solved until it
    /// moves forward again.
    pub fn set_active_group(&mut self, id: GroupId) -> Result<(), EngineError> {
        if !self.group_exists(id) {
            return Err(EngineError::GroupNotFound { id });
        }
        self.active_group = Some(id);
        self.schedule_regenerate();
        Ok(())
    }

    pub fn select(&mut self, item: Selection) {
        if !self.selection.contains(&item) {
            self.selection.push(item);
        }
    }

    /// Restore the state before the last edit. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.pop_undo() else {
            return false;
        };
        let current = self.snapshot();
        self.undo.push_redo(current);
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.undo.pop_redo() else {
            return false;
        };
        let current = self.snapshot();
        self.undo.push_undo_only(current);
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.groups = snapshot.groups;
        self.requests = snapshot.requests;
        self.constraints = snapshot.constraints;
        self.params = snapshot.params;
        self.active_group = snapshot.active_group;
        self.selection.clear();
        self.mark_dirty_from(0);
        self.touched();
    }
}
