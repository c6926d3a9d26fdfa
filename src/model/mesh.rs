//! Per-shape meshes and the flattened buffers handed to the renderer.

use ndarray::Array2;

use super::selector::MeshRole;
use super::shape::ShapeKind;
use crate::geometry::{EdgeMesh, FillMesh, Point2, add, scaled};

/// Fill and border triangulation of one shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeMesh {
    pub fill: FillMesh,
    pub edge: EdgeMesh,
}

impl ShapeMesh {
    pub fn face_count(&self) -> usize {
        self.fill.faces.len() + self.edge.faces.len()
    }
}

/// Concatenation of every shape's mesh, in shape index order.
///
/// Each vertex and face carries a `(shape, face_group, role)` tag where
/// `face_group` is the shape kind code and `role` is 0 for fill and 1 for
/// border. Border vertices are `center + thickness * offset`; fill vertices
/// have a zero offset.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMesh {
    /// `V x 2` vertex positions
    pub vertices: Array2<f32>,
    /// `V x 2` vertex centers
    pub vertices_centers: Array2<f32>,
    /// `V x 2` unit border offsets
    pub vertices_offsets: Array2<f32>,
    /// `V x 3` vertex tags
    pub vertices_index: Array2<usize>,
    /// `F x 3` triangle vertex indices into `vertices`
    pub faces: Array2<u32>,
    /// `F x 3` face tags
    pub faces_index: Array2<usize>,
    /// Face ranges per shape: faces of shape `i` are `face_offsets[i]..face_offsets[i + 1]`
    face_offsets: Vec<usize>,
}

impl Default for FlatMesh {
    fn default() -> Self {
        Self {
            vertices: Array2::zeros((0, 2)),
            vertices_centers: Array2::zeros((0, 2)),
            vertices_offsets: Array2::zeros((0, 2)),
            vertices_index: Array2::zeros((0, 3)),
            faces: Array2::zeros((0, 3)),
            faces_index: Array2::zeros((0, 3)),
            face_offsets: vec![0],
        }
    }
}

#[derive(Default)]
struct Builder {
    centers: Vec<Point2>,
    offsets: Vec<Point2>,
    positions: Vec<Point2>,
    vertex_tags: Vec<[usize; 3]>,
    faces: Vec<[u32; 3]>,
    face_tags: Vec<[usize; 3]>,
    face_offsets: Vec<usize>,
}

impl Builder {
    fn push_part(
        &mut self,
        tag: [usize; 3],
        centers: &[Point2],
        offsets: Option<(&[Point2], f32)>,
        faces: &[[u32; 3]],
    ) {
        let base = self.positions.len() as u32;
        for (i, c) in centers.iter().enumerate() {
            let offset = offsets.map_or([0.0, 0.0], |(o, _)| o[i]);
            let thickness = offsets.map_or(0.0, |(_, t)| t);
            self.centers.push(*c);
            self.offsets.push(offset);
            self.positions.push(add(*c, scaled(offset, thickness)));
            self.vertex_tags.push(tag);
        }
        for f in faces {
            self.faces.push([f[0] + base, f[1] + base, f[2] + base]);
            self.face_tags.push(tag);
        }
    }

    fn finish(self) -> FlatMesh {
        FlatMesh {
            vertices: points_array(&self.positions),
            vertices_centers: points_array(&self.centers),
            vertices_offsets: points_array(&self.offsets),
            vertices_index: Array2::from_shape_fn((self.vertex_tags.len(), 3), |(i, j)| {
                self.vertex_tags[i][j]
            }),
            faces: Array2::from_shape_fn((self.faces.len(), 3), |(i, j)| self.faces[i][j]),
            faces_index: Array2::from_shape_fn((self.face_tags.len(), 3), |(i, j)| {
                self.face_tags[i][j]
            }),
            face_offsets: self.face_offsets,
        }
    }
}

fn points_array(points: &[Point2]) -> Array2<f32> {
    Array2::from_shape_fn((points.len(), 2), |(i, j)| points[i][j])
}

impl FlatMesh {
    /// Concatenate shape meshes; the position in the iterator is the shape index.
    pub fn build<'a, I>(shapes: I) -> FlatMesh
    where
        I: IntoIterator<Item = (ShapeKind, &'a ShapeMesh, f32)>,
    {
        let mut builder = Builder {
            face_offsets: vec![0],
            ..Default::default()
        };
        for (index, (kind, mesh, thickness)) in shapes.into_iter().enumerate() {
            let group = kind.code();
            builder.push_part(
                [index, group, MeshRole::Face.code()],
                &mesh.fill.vertices,
                None,
                &mesh.fill.faces,
            );
            builder.push_part(
                [index, group, MeshRole::Edge.code()],
                &mesh.edge.centers,
                Some((&mesh.edge.offsets, thickness)),
                &mesh.edge.faces,
            );
            builder.face_offsets.push(builder.faces.len());
        }
        builder.finish()
    }

    /// Number of shapes covered by the buffers.
    pub fn shape_count(&self) -> usize {
        self.face_offsets.len() - 1
    }

    pub fn face_count(&self) -> usize {
        self.faces.nrows()
    }

    /// Face indices belonging to a shape, optionally restricted to one role.
    pub fn faces_of(&self, shape: usize, role: Option<MeshRole>) -> Vec<usize> {
        if shape >= self.shape_count() {
            return Vec::new();
        }
        (self.face_offsets[shape]..self.face_offsets[shape + 1])
            .filter(|&f| role.is_none_or(|r| self.faces_index[[f, 2]] == r.code()))
            .collect()
    }

    /// Face permutation that paints shapes in the given order.
    pub fn z_order_faces(&self, z_order: &[usize]) -> Vec<usize> {
        z_order
            .iter()
            .filter(|&&shape| shape < self.shape_count())
            .flat_map(|&shape| self.face_offsets[shape]..self.face_offsets[shape + 1])
            .collect()
    }

    /// Corner coordinates of a face.
    pub fn triangle(&self, face: usize) -> [Point2; 3] {
        let f = self.faces.row(face);
        let vertex = |k: usize| {
            let v = f[k] as usize;
            [self.vertices[[v, 0]], self.vertices[[v, 1]]]
        };
        [vertex(0), vertex(1), vertex(2)]
    }
}
