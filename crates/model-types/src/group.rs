use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cache::{Mesh, Polygon};
use crate::handle::{EntityId, GroupId};

/// Serde helper for the remap table.
/// JSON maps need string keys, so the table is stored as a list of pairs.
mod remap_entries {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use crate::handle::EntityId;

    pub fn serialize<S>(map: &BTreeMap<EntityId, u16>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<(EntityId, u16)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<EntityId, u16>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(EntityId, u16)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// One step in construction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub kind: GroupKind,
    /// Operand group; must come strictly earlier in history.
    pub op_a: Option<GroupId>,
    /// Entities this group's own geometry is defined from.
    #[serde(default)]
    pub predef: Predef,
    /// False once anything at or before this group changed.
    pub clean: bool,
    pub solved: SolveStatus,
    /// Copy index assigned to each operand entity, so copies keep their
    /// handles across regenerations.
    #[serde(default, with = "remap_entries")]
    pub remap: BTreeMap<EntityId, u16>,
    /// Closed and open contours drawn in this group.
    #[serde(default)]
    pub polygon: Polygon,
    #[serde(default)]
    pub mesh: Mesh,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            op_a: None,
            predef: Predef::default(),
            clean: false,
            solved: SolveStatus::NotSolved,
            remap: BTreeMap::new(),
            polygon: Polygon::default(),
            mesh: Mesh::default(),
        }
    }

    /// The workplane this group draws in, if it defines one.
    pub fn workplane(&self) -> Option<EntityId> {
        match self.kind {
            GroupKind::DrawingWorkplane => Some(self.id.entity(1)),
            _ => None,
        }
    }

    /// Index of the copy of `source`, assigning the next free one on first use.
    pub fn remap_index(&mut self, source: EntityId) -> u16 {
        if let Some(index) = self.remap.get(&source) {
            return *index;
        }
        // Index 0 is reserved for the group's own first entity.
        let next = self.remap.values().max().map_or(1, |max| max + 1);
        self.remap.insert(source, next);
        next
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GroupKind {
    /// The three fixed reference workplanes.
    References,
    /// Free geometry in 3D.
    Drawing3d,
    /// A workplane built from `predef.origin` and the normal `predef.entity_b`.
    DrawingWorkplane,
    /// Translated copies of the operand group's points and lines.
    Extrude { translation: [f64; 3] },
}

/// Entities predefined by the user when the group was created.
/// `EntityId::None` marks an unused slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predef {
    pub origin: EntityId,
    pub entity_b: EntityId,
    pub entity_c: EntityId,
}

/// Outcome of the last solve of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SolveStatus {
    NotSolved,
    Okay { dof: usize },
    Failed { failure: SolveFailure },
}

impl SolveStatus {
    pub fn is_okay(&self) -> bool {
        matches!(self, SolveStatus::Okay { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SolveFailure {
    RedundantConstraints,
    Inconsistent,
    TooManyUnknowns { unknowns: usize, max: usize },
    DidNotConverge { iterations: usize, residual: f64 },
    Other { reason: String },
}
