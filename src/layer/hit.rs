//! Pointer hit testing against handles and shape meshes.

use ndarray::{Array2, Array3};

use crate::constants::handle;
use crate::geometry::{Point2, bounding_box, inside_triangles, point_in_box};
use crate::model::FlatMesh;

/// Whether `point` lies within half of `size` of `target` on both axes.
fn near(point: Point2, target: Point2, size: f32) -> bool {
    let half = size / 2.0;
    (point[0] - target[0]).abs() <= half && (point[1] - target[1]).abs() <= half
}

/// Selection box handle under the pointer.
///
/// Tests the 8 box handles and the rotation handle; the last match wins.
/// The rotation handle is reported as [`handle::ROTATION_HIT`].
pub fn handle_at(selection_box: &Array2<f32>, coord: Point2, vertex_size: f32) -> Option<usize> {
    (0..handle::BOX_HANDLES)
        .chain([handle::ROTATION])
        .filter(|&i| i < selection_box.nrows())
        .filter(|&i| {
            near(
                coord,
                [selection_box[[i, 0]], selection_box[[i, 1]]],
                vertex_size,
            )
        })
        .last()
        .map(|i| {
            if i == handle::ROTATION {
                handle::ROTATION_HIT
            } else {
                i
            }
        })
}

/// Vertex of a point list under the pointer; the last match wins.
pub fn vertex_at(points: &[Point2], coord: Point2, vertex_size: f32) -> Option<usize> {
    points
        .iter()
        .rposition(|&p| near(coord, p, vertex_size))
}

/// Frontmost shape whose visible mesh contains the pointer.
///
/// `faces` lists the mesh faces that are currently drawn; `z_order[0]` is the
/// frontmost shape.
pub fn shape_at(mesh: &FlatMesh, faces: &[usize], z_order: &[usize], coord: Point2) -> Option<usize> {
    if faces.is_empty() {
        return None;
    }
    let corners: Vec<[Point2; 3]> = faces.iter().map(|&f| mesh.triangle(f)).collect();
    let triangles = Array3::from_shape_fn((faces.len(), 3, 2), |(t, k, d)| {
        corners[t][k][d] - coord[d]
    });
    let hits = inside_triangles(triangles.view());

    let mut hit_shapes: Vec<usize> = faces
        .iter()
        .zip(hits)
        .filter(|(_, hit)| *hit)
        .map(|(&f, _)| mesh.faces_index[[f, 0]])
        .collect();
    hit_shapes.sort_unstable();
    hit_shapes.dedup();

    z_order
        .iter()
        .copied()
        .find(|shape| hit_shapes.binary_search(shape).is_ok())
}

/// Shapes with any drawn mesh vertex inside the box spanned by two corners,
/// in ascending index order.
pub fn shapes_in_box(mesh: &FlatMesh, faces: &[usize], corners: [Point2; 2]) -> Vec<usize> {
    let Some([min, max]) = bounding_box(corners) else {
        return Vec::new();
    };
    let mut shapes: Vec<usize> = faces
        .iter()
        .filter(|&&f| {
            mesh.triangle(f)
                .iter()
                .any(|&p| point_in_box(p, min, max))
        })
        .map(|&f| mesh.faces_index[[f, 0]])
        .collect();
    shapes.sort_unstable();
    shapes.dedup();
    shapes
}
