//! The equation system handed to a [`GroupSolver`](crate::solve::GroupSolver).

use std::collections::BTreeMap;

use nalgebra::Vector3;

use model_types::{Constraint, ConstraintKind, EntityId, EntityKind, GroupId, ParamId};

use crate::geometry::{Geometry, ParamSource, Plane};
use crate::store::{EntityStore, ParamStore};

/// One block of residual rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Equation {
    Constraint(Constraint),
    /// Keeps the quaternion of a free normal at unit length.
    UnitNormal(EntityId),
}

impl Equation {
    pub fn rows(&self) -> usize {
        match self {
            Equation::Constraint(c) => constraint_rows(c),
            Equation::UnitNormal(_) => 1,
        }
    }

    /// Push this equation's residuals onto `out`. Rows that cannot be
    /// evaluated because geometry does not resolve come out as NaN.
    pub fn evaluate(&self, geometry: &Geometry, out: &mut Vec<f64>) {
        let values = match self {
            Equation::Constraint(c) => constraint_residuals(c, geometry),
            Equation::UnitNormal(normal) => geometry
                .raw_quaternion(*normal)
                .map(|q| vec![q.iter().map(|v| v * v).sum::<f64>() - 1.0]),
        };
        match values {
            Some(values) => out.extend(values),
            None => out.extend(std::iter::repeat(f64::NAN).take(self.rows())),
        }
    }
}

fn constraint_rows(c: &Constraint) -> usize {
    match c.kind {
        ConstraintKind::PointsCoincident if c.workplane.is_none() => 3,
        ConstraintKind::PointsCoincident => 2,
        _ => 1,
    }
}

/// Length of `d`, projected into `plane` when one is given.
fn length_in(d: &Vector3<f64>, plane: Option<&Plane>) -> f64 {
    match plane {
        Some(p) => {
            let (u, v) = p.project(d);
            (u * u + v * v).sqrt()
        }
        None => d.norm(),
    }
}

fn endpoints(c: &Constraint, geo: &Geometry) -> Option<(Vector3<f64>, Vector3<f64>)> {
    if c.entity_a.is_none() {
        Some((geo.point(c.pt_a)?, geo.point(c.pt_b)?))
    } else {
        geo.line(c.entity_a)
    }
}

fn constraint_residuals(c: &Constraint, geo: &Geometry) -> Option<Vec<f64>> {
    let plane = if c.workplane.is_none() {
        None
    } else {
        Some(geo.workplane(c.workplane)?)
    };
    let residuals = match c.kind {
        ConstraintKind::PointsCoincident => {
            let d = geo.point(c.pt_b)? - geo.point(c.pt_a)?;
            match &plane {
                Some(p) => {
                    let (u, v) = p.project(&d);
                    vec![u, v]
                }
                None => vec![d.x, d.y, d.z],
            }
        }
        ConstraintKind::PtPtDistance => {
            let d = geo.point(c.pt_b)? - geo.point(c.pt_a)?;
            vec![length_in(&d, plane.as_ref()) - c.value]
        }
        ConstraintKind::Horizontal | ConstraintKind::Vertical => {
            let p = plane?;
            let (a, b) = endpoints(c, geo)?;
            let (du, dv) = p.project(&(b - a));
            if c.kind == ConstraintKind::Horizontal {
                vec![dv]
            } else {
                vec![du]
            }
        }
        ConstraintKind::EqualLength => {
            let (a0, a1) = geo.line(c.entity_a)?;
            let (b0, b1) = geo.line(c.entity_b)?;
            vec![length_in(&(a1 - a0), plane.as_ref()) - length_in(&(b1 - b0), plane.as_ref())]
        }
        ConstraintKind::PointInPlane => {
            let p = geo.workplane(c.entity_a)?;
            vec![(geo.point(c.pt_a)? - p.origin).dot(&p.n)]
        }
    };
    Some(residuals)
}

/// The current value a reference constraint reports, for kinds that measure one.
pub fn measure(c: &Constraint, geo: &Geometry) -> Option<f64> {
    match c.kind {
        ConstraintKind::PtPtDistance => {
            let plane = if c.workplane.is_none() {
                None
            } else {
                Some(geo.workplane(c.workplane)?)
            };
            let d = geo.point(c.pt_b)? - geo.point(c.pt_a)?;
            Some(length_in(&d, plane.as_ref()))
        }
        _ => None,
    }
}

/// Solver unknowns laid over the live params.
struct Unknowns<'a> {
    index: &'a BTreeMap<ParamId, usize>,
    x: &'a [f64],
    live: &'a ParamStore,
}

impl ParamSource for Unknowns<'_> {
    fn param_value(&self, id: ParamId) -> Option<f64> {
        match self.index.get(&id) {
            Some(i) => self.x.get(*i).copied(),
            None => self.live.param_value(id),
        }
    }
}

/// A freshly generated copy of one group's entities and params, all params
/// unknown, together with the equations they must satisfy.
///
/// Geometry from earlier groups is read from the live stores and treated as
/// fixed.
pub struct System<'a> {
    group: GroupId,
    entities: EntityStore,
    params: ParamStore,
    equations: Vec<Equation>,
    index: BTreeMap<ParamId, usize>,
    live_entities: &'a EntityStore,
    live_params: &'a ParamStore,
}

impl<'a> System<'a> {
    pub fn new(
        group: GroupId,
        entities: EntityStore,
        params: ParamStore,
        constraints: Vec<Constraint>,
        live_entities: &'a EntityStore,
        live_params: &'a ParamStore,
    ) -> Self {
        let mut equations: Vec<Equation> = constraints
            .into_iter()
            .filter(|c| !c.reference)
            .map(Equation::Constraint)
            .collect();
        equations.extend(
            entities
                .iter()
                .filter(|e| matches!(e.kind, EntityKind::Normal3d { .. }))
                .map(|e| Equation::UnitNormal(e.id)),
        );
        let index = params.keys().enumerate().map(|(i, id)| (id, i)).collect();
        Self {
            group,
            entities,
            params,
            equations,
            index,
            live_entities,
            live_params,
        }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn unknown_count(&self) -> usize {
        self.params.len()
    }

    pub fn equation_count(&self) -> usize {
        self.equations.iter().map(Equation::rows).sum()
    }

    /// Current param values, in unknown order.
    pub fn initial_guess(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.val).collect()
    }

    /// Residuals of every equation with the unknowns set to `x`.
    pub fn evaluate(&self, x: &[f64], out: &mut [f64]) {
        let unknowns = Unknowns {
            index: &self.index,
            x,
            live: self.live_params,
        };
        let geometry = Geometry::new(self.live_entities, &unknowns).with_overlay(&self.entities);
        let mut rows = Vec::with_capacity(out.len());
        for equation in &self.equations {
            equation.evaluate(&geometry, &mut rows);
        }
        for (slot, value) in out.iter_mut().zip(rows) {
            *slot = value;
        }
    }

    /// Store solved values back into this system's params.
    pub fn apply(&mut self, x: &[f64]) {
        for (param, val) in self.params.iter_mut().zip(x) {
            param.val = *val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_types::{ConstraintId, Entity, Param, RequestId};

    fn free_point(r: RequestId, g: GroupId, xyz: [f64; 3]) -> (Entity, Vec<Param>) {
        let params = [0, 1, 2].map(|k| r.param(k));
        let entity = Entity {
            id: r.entity(0),
            group: g,
            workplane: EntityId::None,
            construction: false,
            kind: EntityKind::Point3d { params },
        };
        let params = params
            .iter()
            .zip(xyz)
            .map(|(id, v)| Param::new(*id, r.entity(0), v))
            .collect();
        (entity, params)
    }

    #[test]
    fn distance_residual_reads_unknowns_and_live_params() {
        let g = GroupId::new_v4();
        let (fixed, fixed_params) = free_point(RequestId::new_v4(), GroupId::new_v4(), [0.0; 3]);
        let live_entities: EntityStore = [fixed.clone()].into_iter().collect();
        let live_params: ParamStore = fixed_params.into_iter().collect();

        let (moving, moving_params) = free_point(RequestId::new_v4(), g, [3.0, 4.0, 0.0]);
        let constraint = Constraint::new(ConstraintId::new_v4(), g, ConstraintKind::PtPtDistance)
            .points(fixed.id, moving.id)
            .value(10.0);
        let system = System::new(
            g,
            [moving].into_iter().collect(),
            moving_params.into_iter().collect(),
            vec![constraint],
            &live_entities,
            &live_params,
        );

        assert_eq!(system.unknown_count(), 3);
        assert_eq!(system.equation_count(), 1);
        let mut out = [0.0];
        system.evaluate(&system.initial_guess(), &mut out);
        assert!((out[0] + 5.0).abs() < 1e-12);
        system.evaluate(&[6.0, 8.0, 0.0], &mut out);
        assert!(out[0].abs() < 1e-12);
    }

    #[test]
    fn reference_constraints_add_no_rows() {
        let g = GroupId::new_v4();
        let c = Constraint::new(ConstraintId::new_v4(), g, ConstraintKind::PtPtDistance).as_reference();
        let live = EntityStore::new();
        let params = ParamStore::new();
        let system = System::new(g, EntityStore::new(), ParamStore::new(), vec![c], &live, &params);
        assert_eq!(system.equation_count(), 0);
    }

    #[test]
    fn unresolved_geometry_evaluates_to_nan() {
        let g = GroupId::new_v4();
        let c = Constraint::new(ConstraintId::new_v4(), g, ConstraintKind::PointsCoincident)
            .points(RequestId::new_v4().entity(0), RequestId::new_v4().entity(0));
        let live = EntityStore::new();
        let params = ParamStore::new();
        let system = System::new(g, EntityStore::new(), ParamStore::new(), vec![c], &live, &params);
        let mut out = [0.0; 3];
        system.evaluate(&[], &mut out);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
