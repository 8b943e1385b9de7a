use serde::{Deserialize, Serialize};

use crate::handle::{EntityId, GroupId, RequestId};

/// A user-authored primitive definition, owned by exactly one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub group: GroupId,
    pub kind: RequestKind,
    /// Workplane the generated geometry lives in; `EntityId::None` means free in 3D.
    pub workplane: EntityId,
    pub construction: bool,
    /// Initial values for params that have no warm-start guess yet, in
    /// param generation order.
    #[serde(default)]
    pub seeds: Vec<f64>,
}

impl Request {
    pub fn new(id: RequestId, group: GroupId, kind: RequestKind) -> Self {
        Self {
            id,
            group,
            kind,
            workplane: EntityId::None,
            construction: false,
            seeds: Vec::new(),
        }
    }

    pub fn in_workplane(mut self, workplane: EntityId) -> Self {
        self.workplane = workplane;
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<f64>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn construction(mut self) -> Self {
        self.construction = true;
        self
    }

    /// Seed for the `index`-th param, or `default` when none was given.
    pub fn seed(&self, index: usize, default: f64) -> f64 {
        self.seeds.get(index).copied().unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestKind {
    /// A coordinate system: origin point, 3D normal and the workplane itself.
    Workplane,
    DatumPoint,
    LineSegment,
}
