//! Shape kinds and per-shape geometry.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::mesh::ShapeMesh;
use crate::error::{Result, ShapesError};
use crate::geometry::{
    Point2, bounding_box, expand_box, nudge_degenerate, triangulate_box, triangulate_edge,
    triangulate_ellipse, triangulate_polygon,
};

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum number of vertices required for a valid path.
pub const MIN_PATH_VERTICES: usize = 2;

/// Kinds of shape a layer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Line,
    Path,
    Polygon,
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    /// Numeric tag stored as the face group in mesh index buffers.
    pub fn code(&self) -> usize {
        match self {
            ShapeKind::Line => 0,
            ShapeKind::Path => 1,
            ShapeKind::Polygon => 2,
            ShapeKind::Rectangle => 3,
            ShapeKind::Ellipse => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Path => "path",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
        }
    }

    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Line,
            ShapeKind::Path,
            ShapeKind::Polygon,
            ShapeKind::Rectangle,
            ShapeKind::Ellipse,
        ]
    }

    /// Closed shapes have a fill and a border that wraps around.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ShapeKind::Polygon | ShapeKind::Rectangle | ShapeKind::Ellipse
        )
    }

    /// Shapes stored as a 4-corner box.
    pub fn is_box(&self) -> bool {
        matches!(self, ShapeKind::Rectangle | ShapeKind::Ellipse)
    }

    fn check_vertex_count(&self, count: usize) -> Result<()> {
        let ok = match self {
            ShapeKind::Line => count == 2,
            ShapeKind::Path => count >= MIN_PATH_VERTICES,
            ShapeKind::Polygon => count >= MIN_POLYGON_VERTICES,
            ShapeKind::Rectangle | ShapeKind::Ellipse => count == 4,
        };
        if ok {
            return Ok(());
        }
        let expected = match self {
            ShapeKind::Line => "exactly 2 vertices".to_string(),
            ShapeKind::Path => format!("at least {} vertices", MIN_PATH_VERTICES),
            ShapeKind::Polygon => format!("at least {} vertices", MIN_POLYGON_VERTICES),
            ShapeKind::Rectangle | ShapeKind::Ellipse => "2 corners or 4 box vertices".to_string(),
        };
        Err(ShapesError::invalid_vertices(
            self.name(),
            format!("expected {}, got {}", expected, count),
        ))
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = ShapesError;

    fn from_str(s: &str) -> Result<Self> {
        ShapeKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ShapesError::invalid_vertices("shape", format!("unknown kind '{}'", s)))
    }
}

/// Vertices and border thickness of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGeometry {
    /// `N x ndim` vertex coordinates
    pub data: Array2<f32>,
    /// Border thickness
    pub thickness: f32,
}

/// A shape with its kind-specific geometry.
///
/// Rectangles and ellipses always hold 4 box vertices (tl, tr, br, bl in the
/// displayed plane), so they stay consistent after rotation or shear.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(ShapeGeometry),
    Path(ShapeGeometry),
    Polygon(ShapeGeometry),
    Rectangle(ShapeGeometry),
    Ellipse(ShapeGeometry),
}

impl Shape {
    /// Build a shape, validating the vertex count for its kind.
    ///
    /// Rectangles and ellipses given as 2 corners are expanded into their
    /// 4-vertex box; a box with no extent on a displayed axis is nudged by one
    /// unit.
    pub fn new(
        kind: ShapeKind,
        data: Array2<f32>,
        thickness: f32,
        displayed: [usize; 2],
    ) -> Result<Self> {
        check_displayed(&data, displayed)?;
        let data = if kind.is_box() && data.nrows() == 2 {
            let plane = plane_points(&data, displayed);
            let corners = expand_box(nudge_degenerate([plane[0], plane[1]]));
            points_to_rows(data.row(0), displayed, &corners)
        } else {
            data
        };
        kind.check_vertex_count(data.nrows())?;
        Ok(Self::from_parts(kind, ShapeGeometry { data, thickness }))
    }

    pub(crate) fn from_parts(kind: ShapeKind, geometry: ShapeGeometry) -> Self {
        match kind {
            ShapeKind::Line => Shape::Line(geometry),
            ShapeKind::Path => Shape::Path(geometry),
            ShapeKind::Polygon => Shape::Polygon(geometry),
            ShapeKind::Rectangle => Shape::Rectangle(geometry),
            ShapeKind::Ellipse => Shape::Ellipse(geometry),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Line(_) => ShapeKind::Line,
            Shape::Path(_) => ShapeKind::Path,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
        }
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        match self {
            Shape::Line(g)
            | Shape::Path(g)
            | Shape::Polygon(g)
            | Shape::Rectangle(g)
            | Shape::Ellipse(g) => g,
        }
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut ShapeGeometry {
        match self {
            Shape::Line(g)
            | Shape::Path(g)
            | Shape::Polygon(g)
            | Shape::Rectangle(g)
            | Shape::Ellipse(g) => g,
        }
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.geometry().data
    }

    pub fn thickness(&self) -> f32 {
        self.geometry().thickness
    }

    pub fn ndim(&self) -> usize {
        self.data().ncols()
    }

    pub fn vertex_count(&self) -> usize {
        self.data().nrows()
    }

    /// Vertices projected onto the displayed plane.
    pub fn plane(&self, displayed: [usize; 2]) -> Vec<Point2> {
        plane_points(self.data(), displayed)
    }

    /// Frame of the shape in the displayed plane, as tl, tr, br, bl: the box
    /// vertices for rectangles and ellipses, the axis-aligned bounds otherwise.
    pub fn bounding_frame(&self, displayed: [usize; 2]) -> [Point2; 4] {
        let plane = self.plane(displayed);
        match (self.kind().is_box(), box_corners(&plane)) {
            (true, Some(corners)) => corners,
            _ => {
                let bounds = bounding_box(plane).unwrap_or([[0.0, 0.0], [0.0, 0.0]]);
                expand_box(bounds)
            }
        }
    }

    /// Map every vertex through `f` on the displayed axes.
    pub(crate) fn map_plane<F>(&mut self, displayed: [usize; 2], f: F)
    where
        F: Fn(Point2) -> Point2,
    {
        let data = &mut self.geometry_mut().data;
        for mut row in data.rows_mut() {
            let [a, b] = f([row[displayed[0]], row[displayed[1]]]);
            row[displayed[0]] = a;
            row[displayed[1]] = b;
        }
    }

    /// Triangulate fill and border in the displayed plane.
    pub fn triangulate(&self, displayed: [usize; 2], ellipse_segments: usize) -> Result<ShapeMesh> {
        let plane = self.plane(displayed);
        let mesh = match self {
            Shape::Line(_) | Shape::Path(_) => ShapeMesh {
                fill: Default::default(),
                edge: triangulate_edge(&plane, false),
            },
            Shape::Polygon(_) => ShapeMesh {
                fill: triangulate_polygon(&plane)?,
                edge: triangulate_edge(&plane, true),
            },
            Shape::Rectangle(_) => {
                let corners = self.corners(&plane)?;
                ShapeMesh {
                    fill: triangulate_box(&corners),
                    edge: triangulate_edge(&plane, true),
                }
            }
            Shape::Ellipse(_) => {
                let corners = self.corners(&plane)?;
                let (fill, outline) = triangulate_ellipse(&corners, ellipse_segments);
                ShapeMesh {
                    fill,
                    edge: triangulate_edge(&outline, true),
                }
            }
        };
        Ok(mesh)
    }

    fn corners(&self, plane: &[Point2]) -> Result<[Point2; 4]> {
        box_corners(plane).ok_or_else(|| {
            ShapesError::invalid_vertices(self.kind().name(), "box must have 4 vertices")
        })
    }
}

fn box_corners(plane: &[Point2]) -> Option<[Point2; 4]> {
    <[Point2; 4]>::try_from(plane).ok()
}

fn check_displayed(data: &Array2<f32>, displayed: [usize; 2]) -> Result<()> {
    let needed = displayed[0].max(displayed[1]) + 1;
    if data.ncols() < needed {
        return Err(ShapesError::DimensionMismatch {
            expected: needed,
            found: data.ncols(),
        });
    }
    Ok(())
}

/// Rows of `data` projected onto the displayed axes.
pub(crate) fn plane_points(data: &Array2<f32>, displayed: [usize; 2]) -> Vec<Point2> {
    data.rows()
        .into_iter()
        .map(|row| [row[displayed[0]], row[displayed[1]]])
        .collect()
}

/// Build full-dimensional rows from plane points, copying the non-displayed
/// coordinates from `template`.
pub(crate) fn points_to_rows(
    template: ArrayView1<f32>,
    displayed: [usize; 2],
    points: &[Point2],
) -> Array2<f32> {
    let mut rows = Array2::zeros((points.len(), template.len()));
    for (mut row, p) in rows.rows_mut().into_iter().zip(points) {
        row.assign(&template);
        row[displayed[0]] = p[0];
        row[displayed[1]] = p[1];
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const PLANE: [usize; 2] = [0, 1];

    #[test]
    fn test_kind_codes_and_names() {
        for (i, kind) in ShapeKind::all().iter().enumerate() {
            assert_eq!(kind.code(), i);
            assert_eq!(kind.name().parse::<ShapeKind>().unwrap(), *kind);
        }
        assert!("triangle".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn test_rectangle_from_two_corners() {
        let shape = Shape::new(
            ShapeKind::Rectangle,
            array![[50.0, 50.0], [10.0, 10.0]],
            1.0,
            PLANE,
        )
        .unwrap();
        assert_eq!(
            shape.plane(PLANE),
            vec![[10.0, 10.0], [50.0, 10.0], [50.0, 50.0], [10.0, 50.0]]
        );
    }

    #[test]
    fn test_degenerate_box_is_nudged() {
        let shape = Shape::new(
            ShapeKind::Ellipse,
            array![[5.0, 5.0], [5.0, 5.0]],
            1.0,
            PLANE,
        )
        .unwrap();
        assert_eq!(shape.bounding_frame(PLANE)[2], [6.0, 6.0]);
    }

    #[test]
    fn test_box_keeps_non_displayed_coordinates() {
        let shape = Shape::new(
            ShapeKind::Rectangle,
            array![[2.0, 0.0, 0.0], [2.0, 4.0, 8.0]],
            1.0,
            [1, 2],
        )
        .unwrap();
        assert_eq!(shape.vertex_count(), 4);
        assert!(shape.data().column(0).iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_vertex_counts_validated() {
        assert!(Shape::new(ShapeKind::Line, array![[0.0, 0.0]], 1.0, PLANE).is_err());
        assert!(
            Shape::new(
                ShapeKind::Polygon,
                array![[0.0, 0.0], [1.0, 1.0]],
                1.0,
                PLANE
            )
            .is_err()
        );
        assert!(
            Shape::new(
                ShapeKind::Rectangle,
                array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]],
                1.0,
                PLANE
            )
            .is_err()
        );
        assert!(matches!(
            Shape::new(ShapeKind::Path, array![[0.0], [1.0]], 1.0, PLANE),
            Err(ShapesError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_triangulate_by_kind() {
        let line = Shape::new(ShapeKind::Line, array![[0.0, 0.0], [10.0, 0.0]], 1.0, PLANE)
            .unwrap()
            .triangulate(PLANE, 100)
            .unwrap();
        assert!(line.fill.faces.is_empty());
        assert_eq!(line.edge.faces.len(), 2);

        let rect = Shape::new(
            ShapeKind::Rectangle,
            array![[0.0, 0.0], [10.0, 10.0]],
            1.0,
            PLANE,
        )
        .unwrap()
        .triangulate(PLANE, 100)
        .unwrap();
        assert_eq!(rect.fill.faces.len(), 2);
        assert_eq!(rect.edge.faces.len(), 8);

        let ellipse = Shape::new(
            ShapeKind::Ellipse,
            array![[0.0, 0.0], [10.0, 10.0]],
            1.0,
            PLANE,
        )
        .unwrap()
        .triangulate(PLANE, 16)
        .unwrap();
        assert_eq!(ellipse.fill.faces.len(), 16);
        assert_eq!(ellipse.edge.faces.len(), 32);
    }

    #[test]
    fn test_map_plane() {
        let mut shape = Shape::new(
            ShapeKind::Path,
            array![[1.0, 0.0, 0.0], [1.0, 2.0, 2.0]],
            1.0,
            [1, 2],
        )
        .unwrap();
        shape.map_plane([1, 2], |p| [p[0] + 1.0, p[1] * 2.0]);
        let expected: Array2<f32> = array![[1.0, 1.0, 0.0], [1.0, 3.0, 4.0]];
        assert_eq!(shape.data(), &expected);
    }
}
