//! Tests for the verification oracles.

use model_types::{GroupId, RequestId};
use regen_engine::ReferencePlane;
use test_harness::oracle::*;
use test_harness::ModelBuilder;

#[test]
fn healthy_model_passes_every_oracle() {
    let mut m = ModelBuilder::new().unwrap();
    m.workplane_group("base", ReferencePlane::YZ).unwrap();
    m.line("edge", "base", &[1.0, 1.0, 2.0, 3.0]).unwrap();
    m.regenerate().unwrap();
    for verdict in check_all(&m.model) {
        assert!(verdict.passed, "{}: {}", verdict.oracle_name, verdict.detail);
    }
}

#[test]
fn moved_reference_origin_is_caught() {
    let mut m = ModelBuilder::new().unwrap();
    if let Some(p) = m.model.params.get_mut(RequestId::REFERENCE_ZX.param(1)) {
        p.val = 0.25;
    }
    let verdict = check_reference_frames(&m.model);
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("ZX"), "{}", verdict.detail);
}

#[test]
fn unknown_reference_param_is_caught() {
    let mut m = ModelBuilder::new().unwrap();
    if let Some(p) = m.model.params.get_mut(RequestId::REFERENCE_XY.param(3)) {
        p.known = false;
    }
    assert!(!check_reference_frames(&m.model).passed);
}

#[test]
fn dangling_workplane_is_caught_only_when_referenced() {
    let mut m = ModelBuilder::new().unwrap();
    m.workplane_group("base", ReferencePlane::XY).unwrap();
    m.drawing_3d("uses").unwrap();
    m.line("edge", "uses", &[]).unwrap();
    m.regenerate().unwrap();

    let base = m.group_id("base").unwrap();
    m.model.entities.remove(base.entity(1));
    let verdict = check_handles_resolve(&m.model);
    assert!(verdict.passed, "{}", verdict.detail);

    let edge = m.request_id("edge").unwrap();
    if let Some(e) = m.model.entities.get_mut(edge.entity(0)) {
        e.workplane = base.entity(1);
    }
    assert!(!check_handles_resolve(&m.model).passed);
}

#[test]
fn group_params_known_reports_both_states() {
    let mut m = ModelBuilder::new().unwrap();
    m.line("edge", "sketch-in-3d", &[]).unwrap();
    m.regenerate().unwrap();
    let sketch = m.group_id("sketch-in-3d").unwrap();
    assert!(check_group_params_known(&m.model, sketch, false).passed);
    assert!(!check_group_params_known(&m.model, sketch, true).passed);
    assert!(check_group_params_known(&m.model, GroupId::REFERENCES, true).passed);
}
