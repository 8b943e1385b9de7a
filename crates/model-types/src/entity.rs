use serde::{Deserialize, Serialize};

use crate::handle::{EntityId, GroupId, ParamId};

/// A derived geometric object produced during regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// The group whose regeneration produced this entity.
    pub group: GroupId,
    /// Workplane the entity lives in; `EntityId::None` means free in 3D.
    pub workplane: EntityId,
    /// Construction geometry is solved but never contributes to polygons or meshes.
    pub construction: bool,
    pub kind: EntityKind,
}

/// The geometric shape of an entity and the params or entities it is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityKind {
    /// A free point, params are (x, y, z).
    Point3d { params: [ParamId; 3] },
    /// A point in the entity's workplane, params are (u, v).
    PointInWorkplane { params: [ParamId; 2] },
    /// `base` moved by the vector entity `delta`.
    PointTranslated { base: EntityId, delta: EntityId },
    /// An orientation, params are the quaternion (w, x, y, z).
    Normal3d { params: [ParamId; 4] },
    /// An orientation borrowed from another normal.
    NormalCopy { source: EntityId },
    Workplane { origin: EntityId, normal: EntityId },
    LineSegment { points: [EntityId; 2] },
    /// A free vector, params are (dx, dy, dz).
    Vector { params: [ParamId; 3] },
}

impl Entity {
    /// Params owned by this entity, in generation order.
    pub fn params(&self) -> &[ParamId] {
        match &self.kind {
            EntityKind::Point3d { params } | EntityKind::Vector { params } => &params[..],
            EntityKind::PointInWorkplane { params } => &params[..],
            EntityKind::Normal3d { params } => &params[..],
            _ => &[],
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Point3d { .. }
                | EntityKind::PointInWorkplane { .. }
                | EntityKind::PointTranslated { .. }
        )
    }

    pub fn is_line(&self) -> bool {
        matches!(self.kind, EntityKind::LineSegment { .. })
    }
}

/// A scalar value fed to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub id: ParamId,
    /// The entity this param belongs to.
    pub owner: EntityId,
    /// Known params are fixed inputs, never unknowns.
    pub known: bool,
    pub val: f64,
}

impl Param {
    pub fn new(id: ParamId, owner: EntityId, val: f64) -> Self {
        Self {
            id,
            owner,
            known: false,
            val,
        }
    }
}
