use serde::{Deserialize, Serialize};

/// Contours traced through a group's line segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub contours: Vec<Contour>,
}

impl Polygon {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[f64; 3]>,
    /// True when the last point meets the first.
    pub closed: bool,
}

/// Triangles generated by a group from its solved geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: [f64; 3],
    pub b: [f64; 3],
    pub c: [f64; 3],
}
