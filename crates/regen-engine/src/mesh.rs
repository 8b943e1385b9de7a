//! Polygon and mesh caches derived from solved geometry.

use nalgebra::Vector3;

use model_types::{Contour, EntityKind, Group, GroupKind, Mesh, Polygon, Triangle};

use crate::geometry::Geometry;
use crate::store::EntityStore;

/// Endpoints closer than this are joined into one contour.
pub const CHAIN_EPS: f64 = 1e-6;

fn to_array(v: Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Chain a drawing group's non-construction line segments into contours.
pub fn generate_polygon(group: &Group, entities: &EntityStore, geometry: &Geometry) -> Polygon {
    match group.kind {
        GroupKind::Drawing3d | GroupKind::DrawingWorkplane => {}
        _ => return Polygon::default(),
    }
    let edges: Vec<(Vector3<f64>, Vector3<f64>)> = entities
        .iter()
        .filter(|e| e.group == group.id && e.is_line() && !e.construction)
        .filter_map(|e| geometry.line(e.id))
        .collect();
    assemble_contours(edges)
}

/// Greedily join edges end to end.
pub fn assemble_contours(mut edges: Vec<(Vector3<f64>, Vector3<f64>)>) -> Polygon {
    let close = |a: &Vector3<f64>, b: &Vector3<f64>| (a - b).norm() < CHAIN_EPS;
    let mut contours = Vec::new();

    while !edges.is_empty() {
        let (start, mut tail) = edges.remove(0);
        let mut points = vec![start];
        let mut closed = false;
        loop {
            if close(&tail, &start) {
                closed = true;
                break;
            }
            points.push(tail);
            let next = edges
                .iter()
                .position(|(a, b)| close(a, &tail) || close(b, &tail));
            let Some(i) = next else { break };
            let (a, b) = edges.remove(i);
            tail = if close(&a, &tail) { b } else { a };
        }
        contours.push(Contour {
            points: points.into_iter().map(to_array).collect(),
            closed,
        });
    }
    Polygon { contours }
}

/// Side faces of an extrusion: one quad per copied line, as two triangles.
pub fn generate_mesh(group: &Group, entities: &EntityStore, geometry: &Geometry) -> Mesh {
    let GroupKind::Extrude { .. } = group.kind else {
        return Mesh::default();
    };
    let Some(t) = geometry.vector(group.id.entity(0)) else {
        return Mesh::default();
    };

    let mut triangles = Vec::new();
    for entity in entities.iter().filter(|e| e.group == group.id && !e.construction) {
        let EntityKind::LineSegment { .. } = entity.kind else {
            continue;
        };
        let Some((top_a, top_b)) = geometry.line(entity.id) else {
            continue;
        };
        let (a, b) = (top_a - t, top_b - t);
        triangles.push(Triangle {
            a: to_array(a),
            b: to_array(b),
            c: to_array(top_b),
        });
        triangles.push(Triangle {
            a: to_array(a),
            b: to_array(top_b),
            c: to_array(top_a),
        });
    }
    Mesh { triangles }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector3<f64> {
        Vector3::new(x, y, 0.0)
    }

    #[test]
    fn square_edges_in_any_order_close() {
        let edges = vec![
            (v(0.0, 0.0), v(1.0, 0.0)),
            (v(1.0, 1.0), v(0.0, 1.0)),
            (v(1.0, 1.0), v(1.0, 0.0)),
            (v(0.0, 1.0), v(0.0, 0.0)),
        ];
        let polygon = assemble_contours(edges);
        assert_eq!(polygon.contours.len(), 1);
        assert!(polygon.contours[0].closed);
        assert_eq!(polygon.contours[0].points.len(), 4);
    }

    #[test]
    fn disjoint_edges_stay_open() {
        let edges = vec![(v(0.0, 0.0), v(1.0, 0.0)), (v(5.0, 5.0), v(6.0, 5.0))];
        let polygon = assemble_contours(edges);
        assert_eq!(polygon.contours.len(), 2);
        assert!(polygon.contours.iter().all(|c| !c.closed && c.points.len() == 2));
    }

    #[test]
    fn no_edges_no_contours() {
        assert!(assemble_contours(Vec::new()).is_empty());
    }
}
