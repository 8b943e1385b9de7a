use model_types::{
    Constraint, ConstraintId, Entity, EntityId, Group, GroupId, GroupKind, Param, ParamId,
    Request, RequestId, RequestKind,
};

use crate::config::RegenConfig;
use crate::geometry::Geometry;
use crate::references::ReferencePlane;
use crate::store::{EntityStore, ParamStore};
use crate::types::{DeletionCounts, EngineError, Selection};
use crate::undo::UndoStack;

/// Work deferred until the caller next runs [`Model::do_later`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Later {
    pub regenerate: bool,
}

/// The whole sketch: construction history plus everything regenerated from it.
#[derive(Debug)]
pub struct Model {
    /// Groups in history order. The references group is always first.
    pub groups: Vec<Group>,
    pub requests: Vec<Request>,
    pub constraints: Vec<Constraint>,
    /// Rebuilt from scratch on every regeneration pass.
    pub entities: EntityStore,
    pub params: ParamStore,
    pub active_group: Option<GroupId>,
    pub selection: Vec<Selection>,
    pub config: RegenConfig,
    /// Set whenever the history changes; cleared by the caller on save.
    pub unsaved: bool,
    /// True once a regeneration has completed since the last edit.
    pub all_consistent: bool,
    pub(crate) deleted: DeletionCounts,
    pub(crate) later: Later,
    pub(crate) undo: UndoStack,
}

impl Model {
    pub fn new() -> Self {
        Self::with_config(RegenConfig::default())
    }

    /// A fresh model holding the reference planes and one empty 3D sketch,
    /// which is made active.
    pub fn with_config(config: RegenConfig) -> Self {
        let references = Group::new(GroupId::REFERENCES, "#references", GroupKind::References);
        let sketch = Group::new(GroupId::new_v4(), "sketch-in-3d", GroupKind::Drawing3d);
        let active = sketch.id;

        let requests = ReferencePlane::ALL
            .iter()
            .map(|plane| {
                let mut seeds = vec![0.0; 3];
                seeds.extend(plane.quaternion());
                Request::new(plane.request(), GroupId::REFERENCES, RequestKind::Workplane)
                    .with_seeds(seeds)
            })
            .collect();

        let undo = UndoStack::new(config.max_undo);
        Self {
            groups: vec![references, sketch],
            requests,
            constraints: Vec::new(),
            entities: EntityStore::new(),
            params: ParamStore::new(),
            active_group: Some(active),
            selection: Vec::new(),
            config,
            unsaved: false,
            all_consistent: false,
            deleted: DeletionCounts::default(),
            later: Later::default(),
            undo,
        }
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// History position of a group.
    pub fn group_index(&self, id: GroupId) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    pub fn active_group_index(&self) -> Option<usize> {
        self.active_group.and_then(|id| self.group_index(id))
    }

    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.params.get(id)
    }

    /// Number of user-authored objects; bounds the restarts a single
    /// regeneration may need.
    pub fn object_count(&self) -> usize {
        self.groups.len() + self.requests.len() + self.constraints.len()
    }

    pub fn geometry(&self) -> Geometry<'_> {
        Geometry::new(&self.entities, &self.params)
    }

    /// World position of a point entity.
    pub fn point_position(&self, id: EntityId) -> Option<[f64; 3]> {
        self.geometry().point(id).map(|v| [v.x, v.y, v.z])
    }

    /// The group an export would be taken from: the active one, which must
    /// be clean, solved, and have produced a mesh or polygon.
    pub fn export_ready(&self) -> Result<&Group, EngineError> {
        let id = self.active_group.ok_or_else(|| EngineError::NothingToExport {
            reason: "no active group".into(),
        })?;
        let group = self.group(id).ok_or(EngineError::GroupNotFound { id })?;
        if !group.clean || !group.solved.is_okay() {
            return Err(EngineError::NothingToExport {
                reason: format!("group {} is not solved", group.name),
            });
        }
        if group.mesh.is_empty() && group.polygon.is_empty() {
            return Err(EngineError::NothingToExport {
                reason: format!("group {} has no mesh or polygon", group.name),
            });
        }
        Ok(group)
    }

    /// Removal counts not yet reported in a deletion notice.
    pub fn pending_deletions(&self) -> DeletionCounts {
        self.deleted
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_model_has_references_first_and_sketch_active() {
        let model = Model::new();
        assert_eq!(model.groups[0].id, GroupId::REFERENCES);
        assert_eq!(model.active_group_index(), Some(1));
        assert_eq!(model.requests.len(), 3);
        assert!(model.requests.iter().all(|r| r.id.is_reference()));
        assert_eq!(model.object_count(), 5);
    }

    #[test]
    fn export_needs_geometry() {
        let model = Model::new();
        assert!(matches!(
            model.export_ready(),
            Err(EngineError::NothingToExport { .. })
        ));
    }
}
