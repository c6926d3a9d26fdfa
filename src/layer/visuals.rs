//! Arrays handed to the rendering collaborator.
//!
//! Every refresh replaces these wholesale. Face indices always refer to rows
//! of the vertex array they are packaged with.

use ndarray::Array2;

use crate::color_utils::Color;
use crate::constants::{OUTLINE_WIDTH, handle};
use crate::geometry::{Point2, expand_box};
use crate::model::{MeshRole, ShapesData};

/// Triangle mesh with one RGBA color per face.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshVisual {
    /// `V x 2` vertex positions
    pub vertices: Array2<f32>,
    /// `F x 3` triangles, in paint order
    pub faces: Array2<u32>,
    /// `F x 4` RGBA colors
    pub face_colors: Array2<f32>,
}

impl MeshVisual {
    pub fn empty() -> Self {
        Self {
            vertices: Array2::zeros((0, 2)),
            faces: Array2::zeros((0, 3)),
            face_colors: Array2::zeros((0, 4)),
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.nrows() == 0
    }
}

impl Default for MeshVisual {
    fn default() -> Self {
        Self::empty()
    }
}

/// Handle markers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVisual {
    /// `N x 2` marker positions
    pub points: Array2<f32>,
    pub size: f32,
    pub face_color: Color,
    pub edge_color: Color,
}

/// An open polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct LineVisual {
    /// `N x 2` polyline points
    pub points: Array2<f32>,
    pub color: Color,
    pub width: f32,
}

/// Everything the layer draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerVisuals {
    /// Shape fills and borders
    pub shapes: MeshVisual,
    /// Highlighted borders of hovered and selected shapes
    pub highlight: MeshVisual,
    /// Selection box handles or shape vertices
    pub markers: Option<MarkerVisual>,
    /// Selection box outline or marquee outline
    pub outline: Option<LineVisual>,
}

/// Faces that are drawn, shape by shape in the given order.
///
/// A face is drawn when its shape is in the current slice and its role (fill
/// or border) is shown for that shape.
pub fn drawn_faces(data: &ShapesData, order: &[usize], in_slice: &[bool]) -> Vec<usize> {
    let mesh = data.mesh();
    let records = data.records();
    mesh.z_order_faces(order)
        .into_iter()
        .filter(|&f| {
            let shape = mesh.faces_index[[f, 0]];
            let role = role_of(mesh.faces_index[[f, 2]]);
            in_slice.get(shape).copied().unwrap_or(false)
                && records
                    .get(shape)
                    .is_some_and(|r| r.style.is_shown(role))
        })
        .collect()
}

/// Shape mesh painted back to front, so `z_order[0]` ends up on top.
pub fn shapes_mesh(data: &ShapesData, z_order: &[usize], in_slice: &[bool]) -> MeshVisual {
    let mesh = data.mesh();
    let records = data.records();
    let back_to_front: Vec<usize> = z_order.iter().rev().copied().collect();
    let painted = drawn_faces(data, &back_to_front, in_slice);

    let colors: Vec<Color> = painted
        .iter()
        .map(|&f| {
            let shape = mesh.faces_index[[f, 0]];
            let role = role_of(mesh.faces_index[[f, 2]]);
            records
                .get(shape)
                .map_or(Color::TRANSPARENT, |r| r.style.color(role))
        })
        .collect();

    MeshVisual {
        vertices: mesh.vertices.clone(),
        faces: Array2::from_shape_fn((painted.len(), 3), |(i, j)| mesh.faces[[painted[i], j]]),
        face_colors: Array2::from_shape_fn((colors.len(), 4), |(i, j)| colors[i].0[j]),
    }
}

/// Border highlight of the given shapes, drawn at `thickness`.
pub fn highlight_mesh(
    data: &ShapesData,
    shapes: &[usize],
    in_slice: &[bool],
    thickness: f32,
    color: Color,
) -> MeshVisual {
    let mesh = data.mesh();
    let faces: Vec<usize> = shapes
        .iter()
        .filter(|&&s| in_slice.get(s).copied().unwrap_or(false))
        .flat_map(|&s| mesh.faces_of(s, Some(MeshRole::Edge)))
        .collect();
    if faces.is_empty() {
        return MeshVisual::empty();
    }

    let vertices = &mesh.vertices_centers + &(&mesh.vertices_offsets * thickness);
    MeshVisual {
        vertices,
        faces: Array2::from_shape_fn((faces.len(), 3), |(i, j)| mesh.faces[[faces[i], j]]),
        face_colors: Array2::from_shape_fn((faces.len(), 4), |(_, j)| color.0[j]),
    }
}

/// Markers on the 8 box handles and the rotation handle.
pub fn box_markers(selection_box: &Array2<f32>, size: f32, face: Color, edge: Color) -> MarkerVisual {
    let rows: Vec<usize> = (0..handle::BOX_HANDLES).chain([handle::ROTATION]).collect();
    MarkerVisual {
        points: Array2::from_shape_fn((rows.len(), 2), |(i, j)| selection_box[[rows[i], j]]),
        size,
        face_color: face,
        edge_color: edge,
    }
}

/// Markers on arbitrary points.
pub fn point_markers(points: &[Point2], size: f32, face: Color, edge: Color) -> MarkerVisual {
    MarkerVisual {
        points: points_array(points),
        size,
        face_color: face,
        edge_color: edge,
    }
}

/// Box outline plus the stick up to the rotation handle.
pub fn box_outline(selection_box: &Array2<f32>, color: Color) -> LineVisual {
    const PATH: [usize; 7] = [1, 2, 4, 6, 0, 1, handle::ROTATION];
    LineVisual {
        points: Array2::from_shape_fn((PATH.len(), 2), |(i, j)| selection_box[[PATH[i], j]]),
        color,
        width: OUTLINE_WIDTH,
    }
}

/// Closed outline of a marquee rectangle.
pub fn marquee_outline(corners: [Point2; 2], color: Color) -> LineVisual {
    let [tl, tr, br, bl] = expand_box(corners);
    LineVisual {
        points: points_array(&[tl, tr, br, bl, tl]),
        color,
        width: OUTLINE_WIDTH,
    }
}

fn role_of(code: usize) -> MeshRole {
    if code == MeshRole::Edge.code() {
        MeshRole::Edge
    } else {
        MeshRole::Face
    }
}

fn points_array(points: &[Point2]) -> Array2<f32> {
    Array2::from_shape_fn((points.len(), 2), |(i, j)| points[i][j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::selection_box;
    use crate::model::{IndexSelector, ShapeKind, ShapeStyle};
    use ndarray::array;

    fn two_rects() -> ShapesData {
        let mut data = ShapesData::new(2);
        let red = ShapeStyle::new(Color::rgb(1.0, 0.0, 0.0), Color::BLACK);
        let blue = ShapeStyle::new(Color::rgb(0.0, 0.0, 1.0), Color::BLACK);
        data.add(ShapeKind::Rectangle, array![[0.0, 0.0], [10.0, 10.0]], 1.0, red)
            .unwrap();
        data.add(ShapeKind::Rectangle, array![[5.0, 5.0], [15.0, 15.0]], 1.0, blue)
            .unwrap();
        data
    }

    #[test]
    fn test_front_shape_painted_last() {
        let data = two_rects();
        let visual = shapes_mesh(&data, &[0, 1], &[true, true]);
        assert_eq!(visual.face_count(), data.mesh().face_count());
        // last face belongs to shape 0, the front shape
        let last = visual.face_count() - 1;
        assert_eq!(visual.face_colors.row(last).to_vec(), Color::BLACK.0.to_vec());
        let first_fill = visual
            .face_colors
            .rows()
            .into_iter()
            .position(|c| c.to_vec() != Color::BLACK.0.to_vec());
        assert_eq!(
            first_fill.map(|i| visual.face_colors.row(i).to_vec()),
            Some(Color::rgb(0.0, 0.0, 1.0).0.to_vec())
        );
    }

    #[test]
    fn test_hidden_fill_and_slice_are_skipped() {
        let mut data = two_rects();
        data.set_visibility(&IndexSelector::One(0), Some(MeshRole::Face), false)
            .unwrap();
        let faces = drawn_faces(&data, &[0, 1], &[true, false]);
        assert!(!faces.is_empty());
        assert!(faces.iter().all(|&f| data.mesh().faces_index[[f, 0]] == 0
            && data.mesh().faces_index[[f, 2]] == MeshRole::Edge.code()));
    }

    #[test]
    fn test_highlight_uses_its_own_thickness() {
        let data = two_rects();
        let visual = highlight_mesh(&data, &[1], &[true, true], 3.0, Color::WHITE);
        assert_eq!(visual.face_count(), data.mesh().faces_of(1, Some(MeshRole::Edge)).len());
        let mesh = data.mesh();
        let v = 4;
        let expected = mesh.vertices_centers[[v, 0]] + 3.0 * mesh.vertices_offsets[[v, 0]];
        assert!((visual.vertices[[v, 0]] - expected).abs() < 1e-5);

        assert!(highlight_mesh(&data, &[1], &[true, false], 3.0, Color::WHITE).is_empty());
    }

    #[test]
    fn test_box_overlays() {
        let b = selection_box([[0.0, 0.0], [10.0, 10.0]], 5.0);
        let markers = box_markers(&b, 8.0, Color::WHITE, Color::BLACK);
        assert_eq!(markers.points.nrows(), 9);
        assert_eq!(markers.points.row(8).to_vec(), vec![5.0, -5.0]);

        let outline = box_outline(&b, Color::BLACK);
        assert_eq!(outline.points.nrows(), 7);
        assert_eq!(outline.points.row(0).to_vec(), vec![5.0, 0.0]);

        let marquee = marquee_outline([[10.0, 10.0], [0.0, 0.0]], Color::BLACK);
        assert_eq!(marquee.points.row(0), marquee.points.row(4));
        assert_eq!(marquee.points.row(2).to_vec(), vec![10.0, 10.0]);
    }
}
