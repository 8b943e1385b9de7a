//! Evaluation of entities to world-space geometry.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use model_types::{Entity, EntityId, EntityKind, ParamId};

use crate::store::{EntityStore, ParamStore};

/// Anything that can look up the current value of a param.
pub trait ParamSource {
    fn param_value(&self, id: ParamId) -> Option<f64>;
}

impl ParamSource for ParamStore {
    fn param_value(&self, id: ParamId) -> Option<f64> {
        self.get(id).map(|p| p.val)
    }
}

/// A workplane resolved to an origin and orthonormal basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Vector3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub n: Vector3<f64>,
}

impl Plane {
    pub fn from_rotation(origin: Vector3<f64>, rotation: &UnitQuaternion<f64>) -> Self {
        Self {
            origin,
            u: rotation * Vector3::x(),
            v: rotation * Vector3::y(),
            n: rotation * Vector3::z(),
        }
    }

    /// Components of the direction `d` along the plane's u and v axes.
    pub fn project(&self, d: &Vector3<f64>) -> (f64, f64) {
        (d.dot(&self.u), d.dot(&self.v))
    }

    /// World position of the in-plane coordinates (u, v).
    pub fn point_at(&self, u: f64, v: f64) -> Vector3<f64> {
        self.origin + self.u * u + self.v * v
    }
}

/// Read-only view that resolves entity handles to positions and orientations.
///
/// An optional overlay store is consulted before the main store, which lets
/// the solver evaluate a group's freshly generated entities against the
/// already-solved geometry of earlier groups.
pub struct Geometry<'a> {
    entities: &'a EntityStore,
    overlay: Option<&'a EntityStore>,
    params: &'a dyn ParamSource,
}

impl<'a> Geometry<'a> {
    pub fn new(entities: &'a EntityStore, params: &'a dyn ParamSource) -> Self {
        Self {
            entities,
            overlay: None,
            params,
        }
    }

    pub fn with_overlay(mut self, overlay: &'a EntityStore) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn entity(&self, id: EntityId) -> Option<&'a Entity> {
        self.overlay
            .and_then(|store| store.get(id))
            .or_else(|| self.entities.get(id))
    }

    fn value(&self, id: ParamId) -> Option<f64> {
        self.params.param_value(id)
    }

    fn vector3(&self, params: &[ParamId; 3]) -> Option<Vector3<f64>> {
        Some(Vector3::new(
            self.value(params[0])?,
            self.value(params[1])?,
            self.value(params[2])?,
        ))
    }

    pub fn point(&self, id: EntityId) -> Option<Vector3<f64>> {
        let entity = self.entity(id)?;
        match &entity.kind {
            EntityKind::Point3d { params } => self.vector3(params),
            EntityKind::PointInWorkplane { params } => {
                let plane = self.workplane(entity.workplane)?;
                Some(plane.point_at(self.value(params[0])?, self.value(params[1])?))
            }
            EntityKind::PointTranslated { base, delta } => {
                Some(self.point(*base)? + self.vector(*delta)?)
            }
            _ => None,
        }
    }

    pub fn vector(&self, id: EntityId) -> Option<Vector3<f64>> {
        match &self.entity(id)?.kind {
            EntityKind::Vector { params } => self.vector3(params),
            _ => None,
        }
    }

    /// The raw (w, x, y, z) params of a quaternion normal, not normalized.
    pub fn raw_quaternion(&self, id: EntityId) -> Option<[f64; 4]> {
        match &self.entity(id)?.kind {
            EntityKind::Normal3d { params } => Some([
                self.value(params[0])?,
                self.value(params[1])?,
                self.value(params[2])?,
                self.value(params[3])?,
            ]),
            EntityKind::NormalCopy { source } => self.raw_quaternion(*source),
            _ => None,
        }
    }

    pub fn normal(&self, id: EntityId) -> Option<UnitQuaternion<f64>> {
        let [w, x, y, z] = self.raw_quaternion(id)?;
        UnitQuaternion::try_new(Quaternion::new(w, x, y, z), 1e-12)
    }

    pub fn workplane(&self, id: EntityId) -> Option<Plane> {
        match &self.entity(id)?.kind {
            EntityKind::Workplane { origin, normal } => Some(Plane::from_rotation(
                self.point(*origin)?,
                &self.normal(*normal)?,
            )),
            _ => None,
        }
    }

    pub fn line(&self, id: EntityId) -> Option<(Vector3<f64>, Vector3<f64>)> {
        match &self.entity(id)?.kind {
            EntityKind::LineSegment { points } => Some((self.point(points[0])?, self.point(points[1])?)),
            _ => None,
        }
    }
}
