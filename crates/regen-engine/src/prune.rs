//! Removal of objects whose dependencies no longer exist.
//!
//! Each sweep removes at most one object and reports whether it did, so the
//! regeneration pass can restart from a consistent state.

use tracing::debug;

use model_types::{EntityId, GroupId};

use crate::model::Model;
use crate::types::EngineError;

impl Model {
    pub fn group_exists(&self, id: GroupId) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    /// True when the handle resolves to a live entity. The "no entity"
    /// sentinel always resolves.
    pub fn entity_exists(&self, id: EntityId) -> bool {
        id.is_none() || self.entities.contains(id)
    }

    /// True when `before` is absent or sits strictly earlier in history than `after`.
    pub fn groups_in_order(&self, before: Option<GroupId>, after: GroupId) -> bool {
        let Some(before) = before else {
            return true;
        };
        match (self.group_index(before), self.group_index(after)) {
            (Some(b), Some(a)) => b < a,
            _ => false,
        }
    }

    /// Remove the first request or constraint whose group is gone.
    pub fn prune_orphans(&mut self) -> bool {
        if let Some(i) = self
            .requests
            .iter()
            .position(|r| !self.group_exists(r.group))
        {
            let request = self.requests.remove(i);
            debug!(request = %request.id, group = %request.group, "pruned orphaned request");
            self.deleted.requests += 1;
            return true;
        }
        if let Some(i) = self
            .constraints
            .iter()
            .position(|c| !self.group_exists(c.group))
        {
            let constraint = self.constraints.remove(i);
            debug!(constraint = %constraint.id, group = %constraint.group, "pruned orphaned constraint");
            self.deleted.constraints += 1;
            return true;
        }
        false
    }

    /// Remove group `id` if its operand is out of order or a predefined
    /// entity no longer resolves.
    pub fn prune_group(&mut self, id: GroupId) -> bool {
        let Some(index) = self.group_index(id) else {
            return false;
        };
        let group = &self.groups[index];
        let predef = group.predef;
        let valid = self.groups_in_order(group.op_a, id)
            && [predef.origin, predef.entity_b, predef.entity_c]
                .into_iter()
                .all(|e| self.entity_exists(e));
        if valid {
            return false;
        }
        let group = self.groups.remove(index);
        debug!(group = %group.id, name = %group.name, "pruned group with missing dependencies");
        self.deleted.groups += 1;
        true
    }

    /// Remove the request behind the first entity of group `id` whose
    /// workplane no longer resolves.
    ///
    /// Only request-derived entities can be repaired this way; a group-derived
    /// entity with a dangling workplane is an internal error.
    pub fn prune_requests(&mut self, id: GroupId) -> Result<bool, EngineError> {
        let offender = self
            .entities
            .iter()
            .find(|e| e.group == id && !self.entity_exists(e.workplane))
            .map(|e| e.id);
        let Some(entity) = offender else {
            return Ok(false);
        };
        let request = entity.request().ok_or_else(|| EngineError::Invariant {
            detail: format!("group-derived entity {} lies in a missing workplane", entity),
        })?;
        let before = self.requests.len();
        self.requests.retain(|r| r.id != request);
        if self.requests.len() == before {
            return Err(EngineError::Invariant {
                detail: format!("entity {} outlived its request", entity),
            });
        }
        debug!(request = %request, group = %id, "pruned request in a deleted workplane");
        self.deleted.requests += 1;
        Ok(true)
    }

    /// Remove the first constraint of group `id` that references a missing entity.
    pub fn prune_constraints(&mut self, id: GroupId) -> bool {
        let Some(i) = self.constraints.iter().position(|c| {
            c.group == id
                && !c
                    .referenced_entities()
                    .into_iter()
                    .all(|e| self.entity_exists(e))
        }) else {
            return false;
        };
        let constraint = self.constraints.remove(i);
        debug!(constraint = %constraint.id, group = %id, "pruned constraint on deleted geometry");
        self.deleted.constraints += 1;
        true
    }
}
