use model_types::{EntityId, EntityKind, RequestId};

use crate::model::Model;
use crate::types::EngineError;

/// One of the three fixed coordinate planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferencePlane {
    XY,
    YZ,
    ZX,
}

impl ReferencePlane {
    pub const ALL: [ReferencePlane; 3] = [ReferencePlane::XY, ReferencePlane::YZ, ReferencePlane::ZX];

    pub fn request(self) -> RequestId {
        match self {
            ReferencePlane::XY => RequestId::REFERENCE_XY,
            ReferencePlane::YZ => RequestId::REFERENCE_YZ,
            ReferencePlane::ZX => RequestId::REFERENCE_ZX,
        }
    }

    pub fn workplane(self) -> EntityId {
        self.request().entity(0)
    }

    pub fn origin(self) -> EntityId {
        self.request().entity(1)
    }

    pub fn normal(self) -> EntityId {
        self.request().entity(2)
    }

    /// Orientation as a (w, x, y, z) quaternion taking the x, y, z axes to
    /// the plane's u, v and normal.
    pub fn quaternion(self) -> [f64; 4] {
        match self {
            ReferencePlane::XY => [1.0, 0.0, 0.0, 0.0],
            ReferencePlane::YZ => [0.5, 0.5, 0.5, 0.5],
            ReferencePlane::ZX => [0.5, -0.5, -0.5, -0.5],
        }
    }
}

impl Model {
    /// Pin the reference planes to the world origin and axes and mark their
    /// params known.
    pub(crate) fn force_references(&mut self) -> Result<(), EngineError> {
        for plane in ReferencePlane::ALL {
            self.force_params(plane.origin(), &[0.0; 3])?;
            self.force_params(plane.normal(), &plane.quaternion())?;
        }
        Ok(())
    }

    fn force_params(&mut self, entity: EntityId, values: &[f64]) -> Result<(), EngineError> {
        let params = match self.entities.get(entity).map(|e| &e.kind) {
            Some(EntityKind::Point3d { params }) => params.to_vec(),
            Some(EntityKind::Normal3d { params }) => params.to_vec(),
            _ => {
                return Err(EngineError::Invariant {
                    detail: format!("reference entity {} was not generated", entity),
                })
            }
        };
        for (id, val) in params.into_iter().zip(values) {
            let param = self
                .params
                .get_mut(id)
                .ok_or(EngineError::ParamNotFound { id })?;
            param.val = *val;
            param.known = true;
        }
        Ok(())
    }
}
