//! Computational geometry used by shape storage and hit testing.
//!
//! All functions here work on 2-D points in the displayed plane, stored as
//! `[f32; 2]` in data axis order.

mod boxes;
mod polygon;
mod triangulate;

pub use boxes::{
    bounding_box, expand_bounding_box, expand_box, nudge_degenerate, point_in_box, selection_box,
    selection_box_from_frame,
};
pub use polygon::{inside_polygon, inside_triangles, is_permutation};
pub use triangulate::{
    EdgeMesh, FillMesh, ellipse_outline, triangulate_box, triangulate_edge, triangulate_ellipse,
    triangulate_polygon,
};

/// A point in the displayed plane.
pub type Point2 = [f32; 2];

#[inline]
pub fn sub(a: Point2, b: Point2) -> Point2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub fn add(a: Point2, b: Point2) -> Point2 {
    [a[0] + b[0], a[1] + b[1]]
}

#[inline]
pub fn scaled(a: Point2, s: f32) -> Point2 {
    [a[0] * s, a[1] * s]
}

#[inline]
pub fn dot(a: Point2, b: Point2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline]
pub fn norm(a: Point2) -> f32 {
    dot(a, a).sqrt()
}

/// Midpoint between two points.
#[inline]
pub fn midpoint(a: Point2, b: Point2) -> Point2 {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

/// Angle in degrees of a handle offset, zero when pointing towards negative
/// second coordinate (above the box).
#[inline]
pub fn handle_angle(offset: Point2) -> f32 {
    -offset[0].atan2(-offset[1]).to_degrees()
}

/// 2x2 rotation matrix that advances [`handle_angle`] by `degrees`.
pub fn rotation_matrix(degrees: f32) -> [[f32; 2]; 2] {
    let (s, c) = degrees.to_radians().sin_cos();
    [[c, s], [-s, c]]
}

/// Apply a 2x2 matrix to a point.
#[inline]
pub fn apply_matrix(m: &[[f32; 2]; 2], p: Point2) -> Point2 {
    [
        m[0][0] * p[0] + m[0][1] * p[1],
        m[1][0] * p[0] + m[1][1] * p[1],
    ]
}
