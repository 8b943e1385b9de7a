//! Tests for the ModelBuilder workflow API.

use regen_engine::ReferencePlane;
use test_harness::{HarnessError, ModelBuilder};

#[test]
fn default_sketch_is_named() {
    let m = ModelBuilder::new().unwrap();
    let id = m.group_id("sketch-in-3d").unwrap();
    assert_eq!(m.model.active_group, Some(id));
}

#[test]
fn named_lookup_returns_correct_handles() {
    let mut m = ModelBuilder::new().unwrap();
    let g = m.workplane_group("base", ReferencePlane::XY).unwrap();
    let l = m.line("edge", "base", &[0.0, 0.0, 1.0, 0.0]).unwrap();
    assert_eq!(m.group_id("base").unwrap(), g);
    assert_eq!(m.request_id("edge").unwrap(), l);
    assert!(m.group_id("edge").is_err());
    assert!(m.request_id("nonexistent").is_err());
}

#[test]
fn duplicate_name_returns_error() {
    let mut m = ModelBuilder::new().unwrap();
    m.drawing_3d("sk").unwrap();
    let result = m.drawing_3d("sk");
    assert!(matches!(result, Err(HarnessError::DuplicateName { .. })));
}

#[test]
fn lines_inherit_the_group_workplane() {
    let mut m = ModelBuilder::new().unwrap();
    let g = m.workplane_group("base", ReferencePlane::ZX).unwrap();
    let l = m.line("edge", "base", &[]).unwrap();
    assert_eq!(m.model.request(l).unwrap().workplane, g.entity(1));
}

#[test]
fn engine_errors_pass_through() {
    let mut m = ModelBuilder::new().unwrap();
    m.activate("sketch-in-3d").unwrap();
    m.model.set_active_group(model_types::GroupId::REFERENCES).unwrap();
    let result = m.extrude("ex", "sketch-in-3d", [0.0, 0.0, 1.0]);
    assert!(matches!(result, Err(HarnessError::Engine(_))));
}

#[test]
fn auto_check_passes_on_a_healthy_model() {
    let mut m = ModelBuilder::new().unwrap().with_auto_check();
    m.workplane_group("base", ReferencePlane::XY).unwrap();
    m.line("edge", "base", &[0.0, 0.0, 3.0, 1.0]).unwrap();
    m.horizontal("flat", "base", "edge").unwrap();
    m.regenerate().unwrap();
    let start = m.point_at("edge", 1).unwrap();
    let end = m.point_at("edge", 2).unwrap();
    assert!((end[1] - start[1]).abs() < 1e-9);
}
