//! Triangulation of shape fills and borders.
//!
//! Fills are triangle lists. Borders are stroked into a quad strip where each
//! polyline vertex contributes two mesh vertices, `center + thickness * offset`
//! and `center - thickness * offset`, so border width and the highlight
//! overlay can be changed without re-triangulating.

use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor, VertexBuffers,
};

use super::{Point2, add, dot, midpoint, norm, scaled, sub};
use crate::constants::MITER_LIMIT;
use crate::error::{Result, ShapesError};

/// Triangulated fill of a shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillMesh {
    pub vertices: Vec<Point2>,
    pub faces: Vec<[u32; 3]>,
}

/// Triangulated border of a shape, split into centers and unit offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeMesh {
    pub centers: Vec<Point2>,
    pub offsets: Vec<Point2>,
    pub faces: Vec<[u32; 3]>,
}

impl EdgeMesh {
    /// Border vertices at the given thickness.
    pub fn vertices(&self, thickness: f32) -> Vec<Point2> {
        self.centers
            .iter()
            .zip(&self.offsets)
            .map(|(c, o)| add(*c, scaled(*o, thickness)))
            .collect()
    }
}

struct PositionOnly;

impl FillVertexConstructor<Point2> for PositionOnly {
    fn new_vertex(&mut self, vertex: FillVertex) -> Point2 {
        vertex.position().to_array()
    }
}

/// Triangulate the fill of an arbitrary (possibly concave) polygon.
pub fn triangulate_polygon(vertices: &[Point2]) -> Result<FillMesh> {
    if vertices.len() < 3 {
        return Ok(FillMesh::default());
    }

    let mut builder = Path::builder();
    builder.begin(point(vertices[0][0], vertices[0][1]));
    for v in &vertices[1..] {
        builder.line_to(point(v[0], v[1]));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<Point2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    tessellator
        .tessellate_path(
            &path,
            &FillOptions::default(),
            &mut BuffersBuilder::new(&mut buffers, PositionOnly),
        )
        .map_err(|e| ShapesError::Tessellation(format!("{:?}", e)))?;

    let faces = buffers
        .indices
        .chunks_exact(3)
        .map(|f| [f[0], f[1], f[2]])
        .collect();
    Ok(FillMesh {
        vertices: buffers.vertices,
        faces,
    })
}

/// Two-triangle fill of a 4-corner box (which may be rotated or sheared).
pub fn triangulate_box(corners: &[Point2; 4]) -> FillMesh {
    FillMesh {
        vertices: corners.to_vec(),
        faces: vec![[0, 1, 2], [0, 2, 3]],
    }
}

/// Points on the ellipse inscribed in a 4-corner box.
///
/// The box may be any parallelogram; the ellipse follows its axes so rotated
/// and sheared ellipses stay consistent with their box.
pub fn ellipse_outline(corners: &[Point2; 4], segments: usize) -> Vec<Point2> {
    let segments = segments.max(3);
    let center = midpoint(corners[0], corners[2]);
    let axis_a = scaled(sub(corners[1], corners[0]), 0.5);
    let axis_b = scaled(sub(corners[3], corners[0]), 0.5);
    (0..segments)
        .map(|i| {
            let t = std::f32::consts::TAU * i as f32 / segments as f32;
            let (s, c) = t.sin_cos();
            add(center, add(scaled(axis_a, c), scaled(axis_b, s)))
        })
        .collect()
}

/// Triangle fan fill of an ellipse, plus its outline for the border.
pub fn triangulate_ellipse(corners: &[Point2; 4], segments: usize) -> (FillMesh, Vec<Point2>) {
    let outline = ellipse_outline(corners, segments);
    let n = outline.len() as u32;
    let mut vertices = Vec::with_capacity(outline.len() + 1);
    vertices.push(midpoint(corners[0], corners[2]));
    vertices.extend_from_slice(&outline);
    let faces = (0..n).map(|i| [0, i + 1, (i + 1) % n + 1]).collect();
    (FillMesh { vertices, faces }, outline)
}

/// Stroke a polyline into a quad strip with mitered joins.
///
/// Offsets are scaled so that `thickness` is the full border width.
pub fn triangulate_edge(path: &[Point2], closed: bool) -> EdgeMesh {
    let mut points: Vec<Point2> = Vec::with_capacity(path.len());
    for p in path {
        if points.last() != Some(p) {
            points.push(*p);
        }
    }
    if closed && points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 2 {
        return EdgeMesh::default();
    }

    let segment_normal = |a: Point2, b: Point2| -> Point2 {
        let d = sub(b, a);
        let len = norm(d);
        [-d[1] / len, d[0] / len]
    };

    let mut mesh = EdgeMesh {
        centers: Vec::with_capacity(2 * n),
        offsets: Vec::with_capacity(2 * n),
        faces: Vec::new(),
    };

    for i in 0..n {
        let prev = if i > 0 {
            Some(segment_normal(points[i - 1], points[i]))
        } else if closed {
            Some(segment_normal(points[n - 1], points[0]))
        } else {
            None
        };
        let next = if i + 1 < n {
            Some(segment_normal(points[i], points[i + 1]))
        } else if closed {
            Some(segment_normal(points[n - 1], points[0]))
        } else {
            None
        };

        let miter = match (prev, next) {
            (Some(a), Some(b)) => {
                let sum = add(a, b);
                let len = norm(sum);
                if len < 1e-6 {
                    a
                } else {
                    let m = scaled(sum, 1.0 / len);
                    let cos = dot(m, b).max(1.0 / MITER_LIMIT);
                    scaled(m, 1.0 / cos)
                }
            }
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => [0.0, 0.0],
        };

        let offset = scaled(miter, 0.5);
        mesh.centers.push(points[i]);
        mesh.offsets.push(offset);
        mesh.centers.push(points[i]);
        mesh.offsets.push(scaled(offset, -1.0));
    }

    let segments = if closed { n } else { n - 1 };
    for k in 0..segments {
        let a = (2 * k) as u32;
        let b = (2 * ((k + 1) % n)) as u32;
        mesh.faces.push([a, a + 1, b]);
        mesh.faces.push([a + 1, b, b + 1]);
    }
    mesh
}
