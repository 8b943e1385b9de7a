//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a test collect all failures in one pass.

use model_types::{EntityKind, Group, GroupId};
use regen_engine::{Model, ReferencePlane};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
        }
    }

    fn from_problems(name: &str, checked: usize, problems: Vec<String>) -> Self {
        if problems.is_empty() {
            Self::pass(name, format!("{} checked", checked))
        } else {
            Self::fail(name, problems.join("; "))
        }
    }
}

// ── Reference Frames ────────────────────────────────────────────────────────

/// The three reference origins are exactly zero, their normals exactly the
/// fixed quaternions, and all seven params of each frame are known.
pub fn check_reference_frames(model: &Model) -> OracleVerdict {
    let mut problems = Vec::new();
    for plane in ReferencePlane::ALL {
        let expected = [0.0, 0.0, 0.0]
            .into_iter()
            .map(|v| (plane.origin(), v))
            .chain(plane.quaternion().into_iter().map(|v| (plane.normal(), v)));
        let mut slots: Vec<_> = Vec::new();
        for entity in [plane.origin(), plane.normal()] {
            match model.entity(entity) {
                Some(e) => slots.extend(e.params().iter().copied()),
                None => problems.push(format!("{:?} entity {} missing", plane, entity)),
            }
        }
        for ((entity, want), id) in expected.zip(slots) {
            match model.param(id) {
                Some(p) if p.val == want && p.known => {}
                Some(p) => problems.push(format!(
                    "{:?} {} param {}: val={} known={}, want {}",
                    plane, entity, id, p.val, p.known, want
                )),
                None => problems.push(format!("{:?} param {} missing", plane, id)),
            }
        }
    }
    OracleVerdict::from_problems("reference_frames", 3, problems)
}

// ── Handle Integrity ────────────────────────────────────────────────────────

/// Every handle stored anywhere in the model resolves, and every operand
/// group comes strictly earlier in history.
pub fn check_handles_resolve(model: &Model) -> OracleVerdict {
    let mut problems = Vec::new();

    if model.groups.first().map(|g| g.id) != Some(GroupId::REFERENCES) {
        problems.push("references group is not first".to_string());
    }
    for group in &model.groups {
        if !model.groups_in_order(group.op_a, group.id) {
            problems.push(format!("group {} operand out of order", group.name));
        }
    }
    for request in &model.requests {
        if !model.group_exists(request.group) {
            problems.push(format!("request {} in missing group", request.id));
        }
    }
    for entity in model.entities.iter() {
        if !model.entity_exists(entity.workplane) {
            problems.push(format!("entity {} in missing workplane", entity.id));
        }
        let children = match &entity.kind {
            EntityKind::PointTranslated { base, delta } => vec![*base, *delta],
            EntityKind::NormalCopy { source } => vec![*source],
            EntityKind::Workplane { origin, normal } => vec![*origin, *normal],
            EntityKind::LineSegment { points } => points.to_vec(),
            _ => Vec::new(),
        };
        for child in children {
            if !model.entity_exists(child) {
                problems.push(format!("entity {} refers to missing {}", entity.id, child));
            }
        }
        for param in entity.params() {
            if model.param(*param).is_none() {
                problems.push(format!("entity {} lost param {}", entity.id, param));
            }
        }
    }
    for constraint in &model.constraints {
        if !model.group_exists(constraint.group) {
            problems.push(format!("constraint {} in missing group", constraint.id));
        }
        for e in constraint.referenced_entities() {
            if !model.entity_exists(e) {
                problems.push(format!("constraint {} refers to missing {}", constraint.id, e));
            }
        }
    }

    let checked = model.entities.len() + model.constraints.len() + model.requests.len();
    OracleVerdict::from_problems("handles_resolve", checked, problems)
}

/// Every param belongs to a live entity.
pub fn check_params_owned(model: &Model) -> OracleVerdict {
    let problems = model
        .params
        .iter()
        .filter(|p| !model.entity_exists(p.owner))
        .map(|p| format!("param {} owned by missing {}", p.id, p.owner))
        .collect();
    OracleVerdict::from_problems("params_owned", model.params.len(), problems)
}

// ── Group State ─────────────────────────────────────────────────────────────

/// Every param owned by `group`'s entities has the given known flag.
pub fn check_group_params_known(model: &Model, group: GroupId, known: bool) -> OracleVerdict {
    let name = "group_params_known";
    let mut count = 0;
    let mut problems = Vec::new();
    for entity in model.entities.iter().filter(|e| e.group == group) {
        for id in entity.params() {
            count += 1;
            match model.param(*id) {
                Some(p) if p.known == known => {}
                Some(_) => problems.push(format!("param {} known != {}", id, known)),
                None => problems.push(format!("param {} missing", id)),
            }
        }
    }
    OracleVerdict::from_problems(name, count, problems)
}

/// The cached polygon and mesh of a group did not change.
pub fn check_caches_unchanged(before: &Group, after: &Group) -> OracleVerdict {
    let name = "caches_unchanged";
    if before.polygon == after.polygon && before.mesh == after.mesh {
        OracleVerdict::pass(
            name,
            format!(
                "{}: {} contours, {} triangles",
                after.name,
                after.polygon.contours.len(),
                after.mesh.triangles.len()
            ),
        )
    } else {
        OracleVerdict::fail(name, format!("{}: polygon or mesh changed", after.name))
    }
}

/// Run every whole-model oracle.
pub fn check_all(model: &Model) -> Vec<OracleVerdict> {
    vec![
        check_reference_frames(model),
        check_handles_resolve(model),
        check_params_owned(model),
    ]
}
