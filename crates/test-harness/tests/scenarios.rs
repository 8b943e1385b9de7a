//! End-to-end regeneration scenarios driven through the ModelBuilder.

use model_types::*;
use regen_engine::ReferencePlane;
use test_harness::assertions::*;
use test_harness::oracle::check_caches_unchanged;
use test_harness::{init_test_logging, ModelBuilder};

/// A closed triangle in the XY plane followed by an extrusion of it.
fn triangle_and_extrusion() -> ModelBuilder {
    init_test_logging();
    let mut m = ModelBuilder::new().unwrap().with_auto_check();
    m.workplane_group("base", ReferencePlane::XY).unwrap();
    m.line("a", "base", &[0.0, 0.0, 4.0, 0.0]).unwrap();
    m.line("b", "base", &[4.0, 0.0, 0.0, 3.0]).unwrap();
    m.line("c", "base", &[0.0, 3.0, 0.0, 0.0]).unwrap();
    m.horizontal("a-flat", "base", "a").unwrap();
    m.length("a-len", "base", "a", 4.0).unwrap();
    m.extrude("prism", "base", [0.0, 0.0, 2.0]).unwrap();
    m.regenerate().unwrap();
    m
}

// ── Idempotence ─────────────────────────────────────────────────────────────

#[test]
fn second_regeneration_changes_nothing() {
    let mut m = triangle_and_extrusion();
    let last = m.model.groups.len() - 1;
    m.regenerate_range(Some(0..=last)).unwrap();
    let entities = m.model.entities.clone();
    let params = m.model.params.clone();
    let constraints = m.model.constraints.clone();
    let groups = m.model.groups.clone();

    m.regenerate_range(Some(0..=last)).unwrap();
    assert_eq!(m.model.entities, entities);
    assert_eq!(m.model.params, params);
    assert_eq!(m.model.constraints, constraints);
    assert_eq!(m.model.groups, groups);
}

// ── Solver boundary ─────────────────────────────────────────────────────────

#[test]
fn solver_sees_only_unknowns_of_its_group() {
    let mut m = triangle_and_extrusion();
    m.solver.clear();
    let base = m.group_id("base").unwrap();
    m.model.mark_group_dirty(base).unwrap();
    m.regenerate().unwrap();

    let prism = m.group_id("prism").unwrap();
    assert_eq!(m.solver.solved_groups(), vec![base, prism]);
    let base_call = m.solver.calls_for(base).next().unwrap();
    assert!(base_call.all_unknown);
    // Three lines in a workplane, two params per endpoint.
    assert_eq!(base_call.unknowns.len(), 12);
    assert_eq!(base_call.equations, 2);
    let prism_call = m.solver.calls_for(prism).next().unwrap();
    assert_eq!(prism_call.unknowns.len(), 3);
    assert_eq!(prism_call.equations, 0);
}

#[test]
fn warm_start_feeds_the_solver_and_survives_it() {
    let mut m = ModelBuilder::keeping().unwrap();
    m.line("edge", "sketch-in-3d", &[0.0; 6]).unwrap();
    m.regenerate().unwrap();
    let edge = m.request_id("edge").unwrap();

    m.model.set_param_value(edge.param(5), -3.5).unwrap();
    m.solver.clear();
    m.regenerate().unwrap();

    let call = &m.solver.calls[0];
    let slot = call.unknowns.iter().position(|p| *p == edge.param(5)).unwrap();
    assert_eq!(call.initial[slot], -3.5);
    assert_eq!(m.model.param(edge.param(5)).unwrap().val, -3.5);
}

#[test]
fn forced_failure_keeps_previous_values() {
    let mut m = ModelBuilder::new().unwrap();
    m.line("edge", "sketch-in-3d", &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]).unwrap();
    m.length("len", "sketch-in-3d", "edge", 10.0).unwrap();
    let sketch = m.group_id("sketch-in-3d").unwrap();
    m.solver.force(
        sketch,
        SolveStatus::Failed {
            failure: SolveFailure::Other {
                reason: "forced".into(),
            },
        },
    );
    let report = m.regenerate().unwrap().clone();

    assert!(!report.status_of(sketch).unwrap().is_okay());
    assert_point_near(m.point_at("edge", 2).unwrap(), [2.0, 2.0, 2.0], 0.0, "unsolved").unwrap();
}

#[test]
fn failed_group_does_not_stop_later_groups() {
    let mut m = ModelBuilder::new().unwrap();
    m.workplane_group("base", ReferencePlane::XY).unwrap();
    m.line("edge", "base", &[0.0, 0.0, 3.0, 1.0]).unwrap();
    m.drawing_3d("later").unwrap();
    m.point("p", "later", &[1.0, 2.0, 3.0]).unwrap();
    let base = m.group_id("base").unwrap();
    let later = m.group_id("later").unwrap();
    m.solver.force(
        base,
        SolveStatus::Failed {
            failure: SolveFailure::Inconsistent,
        },
    );
    m.solver.clear();
    let report = m.regenerate().unwrap().clone();

    assert_eq!(m.solver.solved_groups(), vec![base, later]);
    assert_eq!(
        report.status_of(base),
        Some(&SolveStatus::Failed {
            failure: SolveFailure::Inconsistent
        })
    );
    assert_eq!(report.status_of(later), Some(&SolveStatus::Okay { dof: 3 }));
    let later_group = m.model.group(later).unwrap();
    assert!(later_group.clean);
    assert!(later_group.solved.is_okay());
    assert_point_near(m.point_at("p", 0).unwrap(), [1.0, 2.0, 3.0], 1e-12, "later point").unwrap();
}

// ── Out-of-range freeze ─────────────────────────────────────────────────────

#[test]
fn groups_before_the_range_keep_caches_and_become_known() {
    let mut m = triangle_and_extrusion();
    let base = m.group_id("base").unwrap();
    let before = m.model.group(base).unwrap().clone();
    assert_eq!(before.polygon.contours.len(), 1);

    m.drawing_3d("later").unwrap();
    m.point("p", "later", &[1.0, 2.0, 3.0]).unwrap();
    m.solver.clear();
    m.regenerate().unwrap();

    let later = m.group_id("later").unwrap();
    assert_eq!(m.solver.solved_groups(), vec![later]);
    let after = m.model.group(base).unwrap();
    let verdict = check_caches_unchanged(&before, after);
    assert!(verdict.passed, "{}", verdict.detail);
    assert_group_params_known(&m.model, base, true, "frozen base").unwrap();
    assert_group_params_known(&m.model, later, false, "solved later").unwrap();
}

#[test]
fn groups_after_the_active_one_are_not_solved() {
    let mut m = triangle_and_extrusion();
    m.activate("base").unwrap();
    let base = m.group_id("base").unwrap();
    m.model.mark_group_dirty(base).unwrap();
    m.solver.clear();
    m.regenerate().unwrap();

    let prism = m.group_id("prism").unwrap();
    assert_eq!(m.solver.solved_groups(), vec![base]);
    assert_group_params_known(&m.model, prism, true, "beyond active").unwrap();
    // Still dirty, so it is solved once it becomes visible again.
    assert!(!m.model.group(prism).unwrap().clean);
    m.activate("prism").unwrap();
    m.solver.clear();
    m.regenerate().unwrap();
    assert_eq!(m.solver.solved_groups(), vec![prism]);
}

// ── Reference frames ────────────────────────────────────────────────────────

#[test]
fn reference_frames_hold_through_edits_and_undo() {
    let mut m = triangle_and_extrusion();
    for (i, id) in [
        RequestId::REFERENCE_XY.param(0),
        RequestId::REFERENCE_YZ.param(4),
        RequestId::REFERENCE_ZX.param(6),
    ]
    .into_iter()
    .enumerate()
    {
        m.model.set_param_value(id, 10.0 + i as f64).unwrap();
    }
    m.regenerate().unwrap();
    assert_reference_frames(&m.model, "after edits").unwrap();

    m.delete_group("base").unwrap();
    m.regenerate().unwrap();
    assert_reference_frames(&m.model, "after delete").unwrap();

    while m.model.undo() {}
    m.regenerate().unwrap();
    assert_reference_frames(&m.model, "after undo").unwrap();
    assert!(m.model.group_exists(m.group_id("sketch-in-3d").unwrap()));
}

// ── Dependency ordering ─────────────────────────────────────────────────────

#[test]
fn operand_moved_after_its_user_prunes_the_user() {
    let mut m = triangle_and_extrusion();
    let base = m.model.group_index(m.group_id("base").unwrap()).unwrap();
    let prism = m.model.group_index(m.group_id("prism").unwrap()).unwrap();
    m.model.groups.swap(base, prism);
    m.model.mark_group_dirty(GroupId::REFERENCES).unwrap();

    let report = m.regenerate().unwrap().clone();
    let notice = report.deletions.unwrap();
    assert_eq!(notice.counts.groups, 1);
    assert!(notice.message().contains("1 group"));
    assert!(m.model.group(m.group_id("prism").unwrap()).is_none());
    assert!(m.model.group(m.group_id("base").unwrap()).is_some());
}

// ── Cascading deletion ──────────────────────────────────────────────────────

#[test]
fn deleting_a_sketch_removes_everything_built_on_it() {
    let mut m = triangle_and_extrusion();
    m.drawing_3d("detail").unwrap();
    m.line("on-base", "detail", &[]).unwrap();
    let base = m.group_id("base").unwrap();
    let on_base = m.request_id("on-base").unwrap();
    if let Some(r) = m.model.requests.iter_mut().find(|r| r.id == on_base) {
        r.workplane = base.entity(1);
    }
    let c = m
        .new_constraint("detail", ConstraintKind::Horizontal)
        .unwrap()
        .in_workplane(base.entity(1))
        .entities(on_base.entity(0), EntityId::None);
    m.constrain("on-base-flat", c).unwrap();
    m.regenerate().unwrap();

    m.delete_group("base").unwrap();
    let report = m.regenerate().unwrap().clone();

    let counts = report.deletions.unwrap().counts;
    // base's three lines and two constraints, the extrusion, then the
    // request and constraint in "detail" that used base's workplane.
    assert_eq!(counts.requests, 4);
    assert_eq!(counts.constraints, 3);
    assert_eq!(counts.groups, 1);
    assert!(m.model.group_exists(m.group_id("detail").unwrap()));
    assert!(m.model.request(on_base).is_none());
    assert!(m.model.constraints.is_empty());

    // One notice per regeneration; the next pass has nothing to report.
    assert!(m.regenerate().unwrap().deletions.is_none());
}

#[test]
fn retried_pass_does_not_revive_pruned_params() {
    let mut m = ModelBuilder::keeping().unwrap();
    m.workplane_group("plane", ReferencePlane::XY).unwrap();
    m.drawing_3d("user").unwrap();
    m.point("pt", "user", &[]).unwrap();
    let plane = m.group_id("plane").unwrap();
    let pt = m.request_id("pt").unwrap();
    if let Some(r) = m.model.requests.iter_mut().find(|r| r.id == pt) {
        r.workplane = plane.entity(1);
    }
    m.regenerate().unwrap();
    assert!(m.model.param(pt.param(0)).is_some());

    m.delete_group("plane").unwrap();
    let report = m.regenerate().unwrap().clone();
    assert_eq!(report.restarts, 1);
    assert!(m.model.params.iter().all(|p| p.id != pt.param(0) && p.id != pt.param(1)));
    assert_consistent(&m.model, "after prune").unwrap();
}
