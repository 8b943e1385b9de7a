use serde::{Deserialize, Serialize};

use crate::handle::{ConstraintId, EntityId, GroupId};

/// A relation between entities, solved together with the group that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub group: GroupId,
    pub kind: ConstraintKind,
    /// Workplane the relation is measured in; `EntityId::None` means in 3D.
    pub workplane: EntityId,
    pub pt_a: EntityId,
    pub pt_b: EntityId,
    pub pt_c: EntityId,
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// Dimension for dimensional constraints; the measured value for reference ones.
    pub value: f64,
    /// Reference constraints report the current value instead of restricting it.
    pub reference: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConstraintKind {
    /// `pt_a` and `pt_b` coincide.
    PointsCoincident,
    /// `pt_a` and `pt_b` are `value` apart.
    PtPtDistance,
    /// Line `entity_a` (or `pt_a`→`pt_b`) runs along the workplane's u axis.
    Horizontal,
    /// Line `entity_a` (or `pt_a`→`pt_b`) runs along the workplane's v axis.
    Vertical,
    /// Lines `entity_a` and `entity_b` have the same length.
    EqualLength,
    /// `pt_a` lies in workplane `entity_a`.
    PointInPlane,
}

impl Constraint {
    pub fn new(id: ConstraintId, group: GroupId, kind: ConstraintKind) -> Self {
        Self {
            id,
            group,
            kind,
            workplane: EntityId::None,
            pt_a: EntityId::None,
            pt_b: EntityId::None,
            pt_c: EntityId::None,
            entity_a: EntityId::None,
            entity_b: EntityId::None,
            value: 0.0,
            reference: false,
        }
    }

    pub fn in_workplane(mut self, workplane: EntityId) -> Self {
        self.workplane = workplane;
        self
    }

    pub fn points(mut self, a: EntityId, b: EntityId) -> Self {
        self.pt_a = a;
        self.pt_b = b;
        self
    }

    pub fn entities(mut self, a: EntityId, b: EntityId) -> Self {
        self.entity_a = a;
        self.entity_b = b;
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn as_reference(mut self) -> Self {
        self.reference = true;
        self
    }

    /// Every entity handle this constraint depends on, workplane first.
    pub fn referenced_entities(&self) -> [EntityId; 6] {
        [
            self.workplane,
            self.pt_a,
            self.pt_b,
            self.pt_c,
            self.entity_a,
            self.entity_b,
        ]
    }
}
