//! Expansion of requests and groups into entities and params.

use model_types::{
    Entity, EntityId, EntityKind, Group, GroupKind, Param, ParamId, Request, RequestKind,
};

use crate::store::{EntityStore, ParamStore};

/// Entities and params produced for one group, before they join the live stores.
#[derive(Debug, Default)]
pub struct Generated {
    pub entities: Vec<Entity>,
    pub params: Vec<Param>,
}

impl Generated {
    pub fn param_ids(&self) -> Vec<ParamId> {
        self.params.iter().map(|p| p.id).collect()
    }

    pub fn insert_into(self, entities: &mut EntityStore, params: &mut ParamStore) {
        for entity in self.entities {
            entities.add(entity);
        }
        for param in self.params {
            params.add(param);
        }
    }
}

/// Emit a point for `request` at entity slot `index`, taking params from
/// `first_param` on. Returns the number of params used.
fn request_point(request: &Request, index: u16, first_param: u16, out: &mut Generated) -> u16 {
    let r = request.id;
    let owner = r.entity(index);
    let param = |k: u16| {
        Param::new(
            r.param(first_param + k),
            owner,
            request.seed((first_param + k) as usize, 0.0),
        )
    };

    let (kind, count) = if request.workplane.is_none() {
        let params = [0, 1, 2].map(|k| r.param(first_param + k));
        (EntityKind::Point3d { params }, 3)
    } else {
        let params = [0, 1].map(|k| r.param(first_param + k));
        (EntityKind::PointInWorkplane { params }, 2)
    };
    for k in 0..count {
        out.params.push(param(k));
    }
    out.entities.push(Entity {
        id: owner,
        group: request.group,
        workplane: request.workplane,
        construction: request.construction,
        kind,
    });
    count
}

/// Generate the entities and params of one request.
pub fn generate_request(request: &Request, out: &mut Generated) {
    let r = request.id;
    match request.kind {
        RequestKind::Workplane => {
            // Slot 0 is the workplane, 1 its origin, 2 its normal.
            out.entities.push(Entity {
                id: r.entity(0),
                group: request.group,
                workplane: EntityId::None,
                construction: request.construction,
                kind: EntityKind::Workplane {
                    origin: r.entity(1),
                    normal: r.entity(2),
                },
            });
            let params = [0, 1, 2].map(|k| r.param(k));
            for (k, id) in params.iter().enumerate() {
                out.params.push(Param::new(*id, r.entity(1), request.seed(k, 0.0)));
            }
            out.entities.push(Entity {
                id: r.entity(1),
                group: request.group,
                workplane: EntityId::None,
                construction: request.construction,
                kind: EntityKind::Point3d { params },
            });
            let quat = [3, 4, 5, 6].map(|k| r.param(k));
            for (k, id) in quat.iter().enumerate() {
                let identity = if k == 0 { 1.0 } else { 0.0 };
                out.params
                    .push(Param::new(*id, r.entity(2), request.seed(3 + k, identity)));
            }
            out.entities.push(Entity {
                id: r.entity(2),
                group: request.group,
                workplane: EntityId::None,
                construction: request.construction,
                kind: EntityKind::Normal3d { params: quat },
            });
        }
        RequestKind::DatumPoint => {
            request_point(request, 0, 0, out);
        }
        RequestKind::LineSegment => {
            out.entities.push(Entity {
                id: r.entity(0),
                group: request.group,
                workplane: request.workplane,
                construction: request.construction,
                kind: EntityKind::LineSegment {
                    points: [r.entity(1), r.entity(2)],
                },
            });
            let used = request_point(request, 1, 0, out);
            request_point(request, 2, used, out);
        }
    }
}

/// Generate the entities and params that a group creates on its own.
///
/// `live` holds everything generated so far in this pass, so an operand
/// group's entities are already present. Copies of operand entities take
/// their slot from the group's remap table.
pub fn generate_group(group: &mut Group, live: &EntityStore, out: &mut Generated) {
    let g = group.id;
    match group.kind {
        GroupKind::References | GroupKind::Drawing3d => {}
        GroupKind::DrawingWorkplane => {
            out.entities.push(Entity {
                id: g.entity(0),
                group: g,
                workplane: EntityId::None,
                construction: false,
                kind: EntityKind::NormalCopy {
                    source: group.predef.entity_b,
                },
            });
            out.entities.push(Entity {
                id: g.entity(1),
                group: g,
                workplane: EntityId::None,
                construction: false,
                kind: EntityKind::Workplane {
                    origin: group.predef.origin,
                    normal: g.entity(0),
                },
            });
        }
        GroupKind::Extrude { translation } => {
            let Some(operand) = group.op_a else {
                return;
            };
            let delta = g.entity(0);
            let params = [0, 1, 2].map(|k| g.param(k));
            for (k, id) in params.iter().enumerate() {
                out.params.push(Param::new(*id, delta, translation[k]));
            }
            out.entities.push(Entity {
                id: delta,
                group: g,
                workplane: EntityId::None,
                construction: false,
                kind: EntityKind::Vector { params },
            });

            let sources: Vec<&Entity> = live.iter().filter(|e| e.group == operand).collect();
            for source in sources.iter().filter(|e| e.is_point()) {
                let index = group.remap_index(source.id);
                out.entities.push(Entity {
                    id: g.entity(index),
                    group: g,
                    workplane: EntityId::None,
                    construction: source.construction,
                    kind: EntityKind::PointTranslated {
                        base: source.id,
                        delta,
                    },
                });
            }
            for source in &sources {
                let EntityKind::LineSegment { points } = source.kind else {
                    continue;
                };
                let copied = |p: EntityId| sources.iter().any(|e| e.id == p && e.is_point());
                if !copied(points[0]) || !copied(points[1]) {
                    continue;
                }
                let index = group.remap_index(source.id);
                let a = group.remap_index(points[0]);
                let b = group.remap_index(points[1]);
                out.entities.push(Entity {
                    id: g.entity(index),
                    group: g,
                    workplane: EntityId::None,
                    construction: source.construction,
                    kind: EntityKind::LineSegment {
                        points: [g.entity(a), g.entity(b)],
                    },
                });
            }
        }
    }
}
